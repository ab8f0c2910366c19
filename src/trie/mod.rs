//! Implementation of the longest-prefix-match trie.

use std::fmt::Debug;

use log::trace;

use crate::{address_width, to_high, Prefix};

mod iter;
mod node;

pub use iter::*;
pub(crate) use node::*;

/// Path-compressed binary trie storing a set of prefixes.
///
/// Every node is either a *leaf*, holding a prefix that was inserted, or a *branch*, holding the
/// supernet of two prefixes that diverge at the next bit. Branches always have both children and
/// are never reported by any lookup.
#[derive(Clone)]
pub struct LpmTrie<P> {
    pub(crate) table: Vec<Node<P>>,
    pub(crate) root: Option<usize>,
    free: Vec<usize>,
    count: usize,
}

impl<P> Default for LpmTrie<P> {
    fn default() -> Self {
        Self {
            table: Vec::new(),
            root: None,
            free: Vec::new(),
            count: 0,
        }
    }
}

impl<P> LpmTrie<P> {
    /// Number of prefixes stored in the trie. Branch nodes are not counted.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of prefixes stored in the trie (same as [`Self::count`]).
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no prefix is stored.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// All stored prefixes, in pre-order (a prefix before its more-specifics, the low half of the
    /// address space before the high half).
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let trie: LpmTrie<Ipv4Net> = ["11.100.123.0/24", "10.0.0.0/12", "10.0.0.0/8"]
    ///     .into_iter()
    ///     .map(|p| p.parse::<Ipv4Net>())
    ///     .collect::<Result<_, _>>()?;
    /// assert_eq!(
    ///     trie.dump(),
    ///     vec![
    ///         &"10.0.0.0/8".parse::<Ipv4Net>()?,
    ///         &"10.0.0.0/12".parse()?,
    ///         &"11.100.123.0/24".parse()?,
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn dump(&self) -> Vec<&P> {
        self.iter().collect()
    }

    /// Iterate over all stored prefixes in the same order as [`Self::dump`].
    pub fn iter(&self) -> Iter<'_, P> {
        Iter {
            trie: self,
            nodes: self.root.into_iter().collect(),
        }
    }

    /// Remove all prefixes but keep the allocated memory.
    pub fn clear(&mut self) {
        self.table.clear();
        self.free.clear();
        self.root = None;
        self.count = 0;
    }

    /// Iterate over the leaves of the subtree rooted at `idx`.
    fn iter_from(&self, idx: usize) -> Iter<'_, P> {
        Iter {
            trie: self,
            nodes: vec![idx],
        }
    }
}

impl<P> LpmTrie<P>
where
    P: Prefix,
{
    /// All stored prefixes that contain `needle`, ordered from the least to the most specific.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: LpmTrie<Ipv4Net> = LpmTrie::new();
    /// trie.insert("10.0.0.0/8".parse()?);
    /// trie.insert("10.0.0.0/9".parse()?);
    /// trie.insert("10.128.0.0/9".parse()?);
    /// assert_eq!(
    ///     trie.longest_prefix_match(&"10.0.0.0/32".parse()?),
    ///     vec![&"10.0.0.0/8".parse::<Ipv4Net>()?, &"10.0.0.0/9".parse()?]
    /// );
    /// assert!(trie.longest_prefix_match(&"11.0.0.0/32".parse()?).is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn longest_prefix_match(&self, needle: &P) -> Vec<&P> {
        self.matches(needle).collect()
    }

    /// The most specific stored prefix that contains `needle`.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: LpmTrie<Ipv4Net> = LpmTrie::new();
    /// trie.insert("192.168.1.0/24".parse()?);
    /// trie.insert("192.168.0.0/23".parse()?);
    /// assert_eq!(trie.longest_match(&"192.168.1.1/32".parse()?), Some(&"192.168.1.0/24".parse()?));
    /// assert_eq!(trie.longest_match(&"192.168.0.0/24".parse()?), Some(&"192.168.0.0/23".parse()?));
    /// assert_eq!(trie.longest_match(&"192.168.2.0/24".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn longest_match(&self, needle: &P) -> Option<&P> {
        self.matches(needle).last()
    }

    /// Iterate over all stored prefixes containing `needle`, from the least to the most
    /// specific.
    pub fn matches<'a, 'b>(&'a self, needle: &'b P) -> Matches<'a, 'b, P> {
        Matches {
            trie: self,
            needle,
            next: self.root,
        }
    }

    /// Exact-match lookup. Returns `None` unless `prefix` was inserted. Otherwise, returns
    /// `prefix` itself, followed by all stored prefixes it contains (in pre-order) if
    /// `include_more_specific` is set.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: LpmTrie<Ipv4Net> = LpmTrie::new();
    /// trie.insert("10.0.0.0/8".parse()?);
    /// trie.insert("11.100.123.0/24".parse()?);
    /// trie.insert("10.0.0.0/12".parse()?);
    /// let slash8: Ipv4Net = "10.0.0.0/8".parse()?;
    /// assert_eq!(trie.get(&slash8, false), Some(vec![&slash8]));
    /// assert_eq!(trie.get(&slash8, true), Some(vec![&slash8, &"10.0.0.0/12".parse()?]));
    /// // the common supernet of both /8 and /24 is not a stored prefix.
    /// assert_eq!(trie.get(&"10.0.0.0/7".parse()?, false), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, prefix: &P, include_more_specific: bool) -> Option<Vec<&P>> {
        let idx = self.find(prefix)?;
        if include_more_specific {
            Some(self.iter_from(idx).collect())
        } else {
            Some(vec![self.table[idx].label.prefix()])
        }
    }

    /// Check if `prefix` is stored in the trie.
    pub fn contains(&self, prefix: &P) -> bool {
        self.find(prefix).is_some()
    }

    /// Index of the leaf storing exactly `prefix`.
    fn find(&self, prefix: &P) -> Option<usize> {
        let mut idx = self.root?;
        // children are strictly longer than their parent, so this takes at most width + 1 steps.
        loop {
            match self.direction(idx, prefix) {
                Direction::Reached => return (!self.table[idx].label.is_branch()).then_some(idx),
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing => return None,
            }
        }
    }

    /// Get the directions from node `cur` to get to `prefix`.
    #[inline(always)]
    fn direction(&self, cur: usize, prefix: &P) -> Direction {
        let cur_p = self.table[cur].label.prefix();
        if cur_p.eq(prefix) {
            Direction::Reached
        } else if cur_p.contains(prefix) {
            let high = to_high(cur_p, prefix);
            match self.table[cur].child(high) {
                Some(next) => Direction::Enter { next, high },
                None => Direction::Missing,
            }
        } else {
            Direction::Missing
        }
    }
}

impl<P> LpmTrie<P>
where
    P: Prefix + Debug,
{
    /// Create an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prefix into the trie. Returns `false` if it was already present, in which case
    /// the trie is left untouched.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: LpmTrie<Ipv4Net> = LpmTrie::new();
    /// assert!(trie.insert("10.0.0.0/8".parse()?));
    /// assert!(trie.insert("10.0.0.0/9".parse()?));
    /// assert!(!trie.insert("10.0.0.0/8".parse()?));
    /// assert_eq!(trie.count(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, prefix: P) -> bool {
        let max_depth = address_width::<P::R>() as usize + 1;
        let mut depth = 0;
        let mut slot = Slot::Root;
        loop {
            debug_assert!(depth <= max_depth, "descent deeper than the address width");
            depth += 1;
            match self.direction_for_insert(slot, &prefix) {
                DirectionForInsert::Enter(next) => slot = next,
                DirectionForInsert::Reached(idx) => {
                    if !self.table[idx].label.is_branch() {
                        return false;
                    }
                    trace!("branch {prefix:?} becomes a leaf");
                    self.table[idx].label = Label::Leaf(prefix);
                    self.count += 1;
                    return true;
                }
                DirectionForInsert::NewLeaf => {
                    trace!("new leaf {prefix:?}");
                    let new = self.new_node(Label::Leaf(prefix));
                    self.set_slot(slot, new);
                    self.count += 1;
                    return true;
                }
                DirectionForInsert::NewParent { child, child_high } => {
                    trace!(
                        "insert {prefix:?} above {:?}",
                        self.table[child].label.prefix()
                    );
                    let new = self.new_node(Label::Leaf(prefix));
                    self.set_slot(slot, new);
                    self.set_slot(
                        Slot::Child {
                            parent: new,
                            high: child_high,
                        },
                        child,
                    );
                    self.count += 1;
                    return true;
                }
                DirectionForInsert::NewBranch {
                    child,
                    supernet,
                    prefix_high,
                } => {
                    trace!(
                        "split {prefix:?} and {:?} at branch {supernet:?}",
                        self.table[child].label.prefix()
                    );
                    let branch = self.new_node(Label::Branch(supernet));
                    let new = self.new_node(Label::Leaf(prefix));
                    self.set_slot(slot, branch);
                    self.set_slot(
                        Slot::Child {
                            parent: branch,
                            high: prefix_high,
                        },
                        new,
                    );
                    self.set_slot(
                        Slot::Child {
                            parent: branch,
                            high: !prefix_high,
                        },
                        child,
                    );
                    self.count += 1;
                    return true;
                }
            }
        }
    }

    /// Remove `prefix` from the trie and return it, or return `None` if it is not stored. The
    /// tree is restructured as if `prefix` was never inserted.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: LpmTrie<Ipv4Net> = LpmTrie::new();
    /// let prefix: Ipv4Net = "192.168.1.0/24".parse()?;
    /// trie.insert(prefix);
    /// assert_eq!(trie.remove(&prefix), Some(prefix));
    /// assert_eq!(trie.remove(&prefix), None);
    /// assert!(trie.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn remove(&mut self, prefix: &P) -> Option<P> {
        let mut idx = self.root?;
        let mut slot = Slot::Root;
        let mut parent_slot = None;
        // bounded like `find`: every step goes to a strictly longer prefix.
        loop {
            match self.direction(idx, prefix) {
                Direction::Reached => break,
                Direction::Enter { next, high } => {
                    parent_slot = Some(slot);
                    slot = Slot::Child { parent: idx, high };
                    idx = next;
                }
                Direction::Missing => return None,
            }
        }
        if self.table[idx].label.is_branch() {
            return None;
        }
        Some(self.remove_node(idx, slot, parent_slot))
    }
}

/// Private function implementations
impl<P> LpmTrie<P>
where
    P: Prefix + Debug,
{
    /// Unlink the leaf `idx` hanging at `slot` (whose parent hangs at `parent_slot`), and
    /// restore the invariants around it.
    fn remove_node(&mut self, idx: usize, slot: Slot, parent_slot: Option<Slot>) -> P {
        self.count -= 1;
        let node = &self.table[idx];
        match (node.low, node.high) {
            (Some(_), Some(_)) => {
                // both children differ at our branching bit, so we are exactly their supernet.
                let prefix = node.label.prefix();
                let branch = P::from_repr_len(prefix.mask(), prefix.prefix_len());
                trace!("leaf {prefix:?} becomes a branch");
                std::mem::replace(&mut self.table[idx].label, Label::Branch(branch)).into_prefix()
            }
            (Some(child), None) | (None, Some(child)) => {
                trace!(
                    "splice {:?} into the place of {:?}",
                    self.table[child].label.prefix(),
                    node.label.prefix()
                );
                self.set_slot(slot, child);
                self.free_node(idx).into_prefix()
            }
            (None, None) => {
                self.clear_slot(slot);
                let prefix = self.free_node(idx).into_prefix();
                if let (Slot::Child { parent, high }, Some(parent_slot)) = (slot, parent_slot) {
                    if self.table[parent].label.is_branch() {
                        self.collapse_branch(parent, !high, parent_slot);
                    }
                }
                prefix
            }
        }
    }

    /// Replace the branch `idx` (hanging at `slot`) by its only remaining child on side `high`.
    fn collapse_branch(&mut self, idx: usize, high: bool, slot: Slot) {
        let Some(child) = self.clear_slot(Slot::Child { parent: idx, high }) else {
            return;
        };
        trace!(
            "collapse branch {:?} into {:?}",
            self.table[idx].label.prefix(),
            self.table[child].label.prefix()
        );
        self.set_slot(slot, child);
        self.free_node(idx);
    }

    /// Index of the node at `slot`.
    #[inline(always)]
    fn get_slot(&self, slot: Slot) -> Option<usize> {
        match slot {
            Slot::Root => self.root,
            Slot::Child { parent, high } => self.table[parent].child(high),
        }
    }

    /// Hang `idx` at `slot`, update its skip, and return the node that was there before.
    fn set_slot(&mut self, slot: Slot, idx: usize) -> Option<usize> {
        let len = self.table[idx].label.prefix().prefix_len();
        match slot {
            Slot::Root => {
                self.table[idx].skip = len;
                self.root.replace(idx)
            }
            Slot::Child { parent, high } => {
                let parent_len = self.table[parent].label.prefix().prefix_len();
                self.table[idx].skip = len.saturating_sub(parent_len + 1);
                let parent = &mut self.table[parent];
                if high {
                    parent.high.replace(idx)
                } else {
                    parent.low.replace(idx)
                }
            }
        }
    }

    /// Empty `slot` (just the reference), returning the node that was there.
    #[inline(always)]
    fn clear_slot(&mut self, slot: Slot) -> Option<usize> {
        match slot {
            Slot::Root => self.root.take(),
            Slot::Child { parent, high: true } => self.table[parent].high.take(),
            Slot::Child { parent, high: false } => self.table[parent].low.take(),
        }
    }

    /// insert a new node into the table and return its index.
    #[inline(always)]
    fn new_node(&mut self, label: Label<P>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.table[idx] = Node::new(label);
            idx
        } else {
            self.table.push(Node::new(label));
            self.table.len() - 1
        }
    }

    /// Release the node `idx` to the free list and return its label.
    fn free_node(&mut self, idx: usize) -> Label<P> {
        self.free.push(idx);
        let node = &mut self.table[idx];
        node.low = None;
        node.high = None;
        std::mem::replace(&mut node.label, Label::Branch(P::zero()))
    }

    /// Get the directions from `slot` to the place where `prefix` belongs.
    #[inline(always)]
    fn direction_for_insert(&self, slot: Slot, prefix: &P) -> DirectionForInsert<P> {
        let Some(cur) = self.get_slot(slot) else {
            return DirectionForInsert::NewLeaf;
        };
        let cur_p = self.table[cur].label.prefix();
        if cur_p.eq(prefix) {
            DirectionForInsert::Reached(cur)
        } else if cur_p.contains(prefix) {
            DirectionForInsert::Enter(Slot::Child {
                parent: cur,
                high: to_high(cur_p, prefix),
            })
        } else if prefix.contains(cur_p) {
            DirectionForInsert::NewParent {
                child: cur,
                child_high: to_high(prefix, cur_p),
            }
        } else {
            let supernet = prefix.supernet(cur_p);
            let prefix_high = to_high(&supernet, prefix);
            DirectionForInsert::NewBranch {
                child: cur,
                supernet,
                prefix_high,
            }
        }
    }
}

impl<P> PartialEq for LpmTrie<P>
where
    P: Prefix,
{
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| Prefix::eq(a, b))
    }
}

impl<P> Eq for LpmTrie<P> where P: Prefix {}

impl<P> FromIterator<P> for LpmTrie<P>
where
    P: Prefix + Debug,
{
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<P> Extend<P> for LpmTrie<P>
where
    P: Prefix + Debug,
{
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for prefix in iter {
            self.insert(prefix);
        }
    }
}

#[cfg(test)]
impl<P> LpmTrie<P>
where
    P: Prefix + Debug,
{
    /// Walk the whole tree and check every structural invariant.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        let mut leaves = 0;
        let mut reachable = 0;
        let mut stack: Vec<(usize, Option<usize>, bool)> =
            self.root.into_iter().map(|r| (r, None, false)).collect();
        while let Some((idx, parent, high)) = stack.pop() {
            reachable += 1;
            let node = &self.table[idx];
            let p = node.label.prefix();
            match parent {
                None => {
                    if node.skip != p.prefix_len() {
                        return Err(format!("root {p:?} has skip {}", node.skip));
                    }
                }
                Some(parent) => {
                    let parent_p = self.table[parent].label.prefix();
                    if !parent_p.contains(p) || parent_p.eq(p) {
                        return Err(format!("{parent_p:?} is no proper supernet of {p:?}"));
                    }
                    if to_high(parent_p, p) != high {
                        return Err(format!("{p:?} hangs on the wrong side of {parent_p:?}"));
                    }
                    if node.skip + parent_p.prefix_len() + 1 != p.prefix_len() {
                        return Err(format!("{p:?} has skip {}", node.skip));
                    }
                }
            }
            match node.label {
                Label::Leaf(_) => leaves += 1,
                Label::Branch(_) if node.low.is_none() || node.high.is_none() => {
                    return Err(format!("branch {p:?} has less than two children"));
                }
                Label::Branch(_) => {}
            }
            stack.extend(node.low.map(|c| (c, Some(idx), false)));
            stack.extend(node.high.map(|c| (c, Some(idx), true)));
        }
        if leaves != self.count {
            return Err(format!("{leaves} leaves, but count is {}", self.count));
        }
        if reachable + self.free.len() != self.table.len() {
            return Err(format!(
                "{reachable} reachable and {} free nodes, but the table has {}",
                self.free.len(),
                self.table.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg(feature = "ipnetwork")]
mod ipnetwork_test {
    use ipnetwork::Ipv4Network;

    use super::*;

    fn net(s: &str) -> Ipv4Network {
        s.parse().unwrap()
    }

    #[test]
    fn branch_supernet_is_not_stored() {
        let mut trie: LpmTrie<Ipv4Network> =
            [net("10.0.0.0/8"), net("11.100.123.0/24")].into_iter().collect();
        trie.check_invariants().unwrap();
        assert!(trie.table[trie.root.unwrap()].label.is_branch());
        assert_eq!(trie.table[trie.root.unwrap()].label.prefix(), &net("10.0.0.0/7"));
        assert_eq!(trie.get(&net("10.0.0.0/7"), false), None);
        assert_eq!(trie.get(&net("10.0.0.0/8"), false), Some(vec![&net("10.0.0.0/8")]));
        assert_eq!(
            trie.longest_match(&net("11.100.123.42/32")),
            Some(&net("11.100.123.0/24"))
        );
        assert_eq!(trie.count(), 2);

        assert_eq!(trie.remove(&net("10.0.0.0/8")), Some(net("10.0.0.0/8")));
        trie.check_invariants().unwrap();
        assert_eq!(trie.dump(), vec![&net("11.100.123.0/24")]);
    }
}
