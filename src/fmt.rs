//! Formatting implementation for the LpmTrie

use std::fmt::{Debug, Formatter, Result};

use crate::trie::Label;
use crate::LpmTrie;

impl<P: Debug> Debug for LpmTrie<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.root {
            Some(root) => DebugNode(self, root).fmt(f),
            None => f.debug_map().finish(),
        }
    }
}

/// Renders a node as `prefix (skip n)`, or `branch prefix (skip n)`, followed by its children.
struct DebugNode<'a, P>(&'a LpmTrie<P>, usize);

impl<P: Debug> Debug for DebugNode<'_, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let trie = self.0;
        let node = &trie.table[self.1];
        let label = match &node.label {
            Label::Leaf(p) => format!("{p:?} (skip {})", node.skip),
            Label::Branch(p) => format!("branch {p:?} (skip {})", node.skip),
        };
        let mut s = f.debug_struct(&label);
        if let Some(low) = node.low {
            s.field("low", &Self(trie, low));
        }
        if let Some(high) = node.high {
            s.field("high", &Self(trie, high));
        }
        s.finish()
    }
}
