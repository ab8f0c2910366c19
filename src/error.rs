//! Errors raised when constructing prefixes.

use thiserror::Error;

/// Reasons for rejecting an address/length pair as a [`crate::Prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PrefixError {
    /// The prefix length is larger than the number of bits in the address.
    #[error("prefix length {len} exceeds the address width of {width} bits")]
    LengthOutOfRange {
        /// The requested prefix length.
        len: u8,
        /// Number of bits in the address representation.
        width: u8,
    },
    /// The address has bits set after the first `len` bits.
    #[error("address has host bits set beyond prefix length {len}")]
    HostBitsSet {
        /// The requested prefix length.
        len: u8,
    },
}
