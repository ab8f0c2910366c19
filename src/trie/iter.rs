//! Module that contains the implementation for the iterators

use crate::*;

/// An iterator over all prefixes of an [`LpmTrie`] in pre-order, created by [`LpmTrie::iter`].
#[derive(Clone)]
pub struct Iter<'a, P> {
    pub(crate) trie: &'a LpmTrie<P>,
    pub(crate) nodes: Vec<usize>,
}

impl<'a, P> Iterator for Iter<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        while let Some(cur) = self.nodes.pop() {
            let node = &self.trie.table[cur];
            if let Some(high) = node.high {
                self.nodes.push(high);
            }
            if let Some(low) = node.low {
                self.nodes.push(low);
            }
            if let Some(p) = node.label.leaf() {
                return Some(p);
            }
        }
        None
    }
}

impl<'a, P> IntoIterator for &'a LpmTrie<P> {
    type Item = &'a P;

    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over all prefixes of an [`LpmTrie`] that contain a given prefix, from the least to
/// the most specific. Created by [`LpmTrie::matches`].
#[derive(Clone)]
pub struct Matches<'a, 'b, P> {
    pub(crate) trie: &'a LpmTrie<P>,
    pub(crate) needle: &'b P,
    pub(crate) next: Option<usize>,
}

impl<'a, P: Prefix> Iterator for Matches<'a, '_, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        while let Some(cur) = self.next.take() {
            let node = &self.trie.table[cur];
            let p = node.label.prefix();
            if !p.contains(self.needle) {
                return None;
            }
            // sibling subtrees are disjoint, so only one side can contain the needle.
            self.next = node.child(to_high(p, self.needle));
            if let Some(p) = node.label.leaf() {
                return Some(p);
            }
        }
        None
    }
}
