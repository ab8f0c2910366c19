//! Nodes of the trie. They live in a single table and refer to each other by index.

/// What a node stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Label<P> {
    /// A prefix inserted by the user.
    Leaf(P),
    /// The supernet of both children, created where two stored prefixes diverge. It is never
    /// reported as a match.
    Branch(P),
}

impl<P> Label<P> {
    /// The prefix of the node, regardless of its kind.
    pub(crate) fn prefix(&self) -> &P {
        match self {
            Label::Leaf(p) | Label::Branch(p) => p,
        }
    }

    /// The prefix, but only if it was inserted by the user.
    pub(crate) fn leaf(&self) -> Option<&P> {
        match self {
            Label::Leaf(p) => Some(p),
            Label::Branch(_) => None,
        }
    }

    pub(crate) fn is_branch(&self) -> bool {
        matches!(self, Label::Branch(_))
    }

    pub(crate) fn into_prefix(self) -> P {
        match self {
            Label::Leaf(p) | Label::Branch(p) => p,
        }
    }
}

#[derive(Clone)]
pub(crate) struct Node<P> {
    pub(crate) label: Label<P>,
    /// Address bits consumed between the parent's branching bit and this node. For the root, this
    /// is its prefix length.
    pub(crate) skip: u8,
    pub(crate) low: Option<usize>,
    pub(crate) high: Option<usize>,
}

impl<P> Node<P> {
    pub(crate) fn new(label: Label<P>) -> Self {
        Self {
            label,
            skip: 0,
            low: None,
            high: None,
        }
    }

    /// Get the child of a node, either to the low or the high side.
    #[inline(always)]
    pub(crate) fn child(&self, high: bool) -> Option<usize> {
        if high {
            self.high
        } else {
            self.low
        }
    }
}

/// A place in the tree where a node can hang: the root, or one side of a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Root,
    Child { parent: usize, high: bool },
}

pub(crate) enum Direction {
    /// The prefix is already reached.
    Reached,
    /// Enter the next index and search again.
    Enter { next: usize, high: bool },
    /// The node was not found.
    Missing,
}

pub(crate) enum DirectionForInsert<P> {
    /// The node at this index carries the prefix already.
    Reached(usize),
    /// The node in the slot contains the prefix; continue in the given child slot.
    Enter(Slot),
    /// The slot is empty. Put a new leaf there.
    NewLeaf,
    /// The new prefix contains the node in the slot. The new leaf takes the slot, and the old
    /// node `child` becomes its child on side `child_high`.
    NewParent { child: usize, child_high: bool },
    /// Neither contains the other. A branch for `supernet` takes the slot, the new leaf goes to
    /// `prefix_high` and the old node `child` to the opposite side.
    NewBranch {
        child: usize,
        supernet: P,
        prefix_high: bool,
    },
}
