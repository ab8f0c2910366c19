//! This crate provides a longest-prefix-match (LPM) table for IPv4 prefixes, built as a
//! path-compressed binary trie. It stores a set of prefixes and answers, for any address or
//! prefix, which stored prefixes contain it. The trie works with
//! [ipnet](https://docs.rs/ipnet/2.10.0) (`Ipv4Net`), [ipnetwork](https://crates.io/crates/ipnetwork)
//! (`Ipv4Network`), or any tuple `(R, u8)` where `R` is an unsigned primitive integer.
//!
//! # Description of the Tree
//!
//! Each node holds a prefix and two optional children, `low` and `high`. To go down from a node,
//! we look at the most significant bit that is **not** part of the node's prefix. If it is not
//! set, we take the `low` child, otherwise the `high` one.
//!
//! There are two kinds of nodes:
//!
//! - A *leaf* holds a prefix that was inserted. Leaves may still have children, namely the
//!   more-specific prefixes they contain.
//! - A *branch* holds the supernet of two prefixes that contain neither each other. It exists only
//!   to tell both apart, always has two children, and is never reported by any lookup.
//!
//! The tree is path-compressed: no node is created for bits on which all prefixes below agree.
//! Each node caches its `skip`, the number of address bits between the branching bit of its parent
//! and the end of its own prefix. Because every step down the tree strictly increases the prefix
//! length, any descent takes at most 33 steps.
//!
//! The shape of the tree only depends on the set of stored prefixes, not on the order of
//! insertions and removals. [`LpmTrie::remove`] exactly reverts [`LpmTrie::insert`].
//!
//! # Operations on the tree
//!
//! | Operation                                   | Complexity |
//! |---------------------------------------------|------------|
//! | `insert`, `remove`, `contains`              | `O(w)`     |
//! | `longest_prefix_match`, `longest_match`     | `O(w)`     |
//! | `get` without more-specifics                | `O(w)`     |
//! | `get` with more-specifics                   | `O(w + k)` |
//! | `dump`, `iter`                              | `O(n)`     |
//! | `count`, `len` and `is_empty`               | `O(1)`     |
//!
//! Here, `w` is the address width (32), `n` the number of stored prefixes, and `k` the number of
//! returned prefixes.
//!
//! ```
//! # use lpm_trie::*;
//! # use ipnet::Ipv4Net;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut trie: LpmTrie<Ipv4Net> = LpmTrie::new();
//! trie.insert("10.0.0.0/8".parse()?);
//! trie.insert("10.0.0.0/9".parse()?);
//! trie.insert("10.128.0.0/9".parse()?);
//! assert_eq!(trie.longest_match(&"10.1.2.3/32".parse()?), Some(&"10.0.0.0/9".parse()?));
//! assert_eq!(trie.remove(&"10.0.0.0/8".parse()?), Some("10.0.0.0/8".parse()?));
//! assert_eq!(trie.count(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! The trie is not synchronized. Writers take `&mut self`; to share it between threads, wrap it in
//! a lock or publish immutable copies.
//!
//! # Logging
//!
//! Every restructuring of the tree is reported at `trace` level through the
//! [log](https://docs.rs/log) facade.

#![deny(missing_docs)]

mod error;
mod fmt;
mod prefix;
#[cfg(test)]
mod fuzzing;

pub mod trie;

pub use error::PrefixError;
pub use prefix::{address_width, bit_at, mask_from_prefix_len, Prefix};
pub use trie::LpmTrie;

/// Whether `child_p` hangs on the high side of a node for `branch_p`.
#[inline(always)]
pub(crate) fn to_high<P: Prefix>(branch_p: &P, child_p: &P) -> bool {
    child_p.is_bit_set(branch_p.prefix_len())
}
