use derivative::Derivative;
use log::debug;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::frequency::FrequencyMap;

/// A node of a Huffman tree.
///
/// Nodes order by `(weight, seq)` only, which is what the priority queue
/// needs. `seq` is the creation order: leaves are numbered in ascending
/// symbol order, internal nodes as they are merged. Equal weights therefore
/// always pop in the same order and a given input maps to exactly one tree.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
pub struct Node<Symbol> {
    weight: usize,

    seq: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    symbol: Option<Symbol>,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    left: Option<Box<Node<Symbol>>>,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    right: Option<Box<Node<Symbol>>>,
}

impl<Symbol> Node<Symbol> {
    fn new(s: Symbol, weight: usize, seq: usize) -> Self {
        Self {
            weight,
            seq,
            symbol: Some(s),
            left: None,
            right: None,
        }
    }

    fn from_children(left: Node<Symbol>, right: Node<Symbol>, seq: usize) -> Self {
        Self {
            weight: left.weight + right.weight,
            seq,
            symbol: None,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    /// Summed frequency of every leaf below this node.
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// The symbol carried by a leaf, `None` for internal nodes.
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn left(&self) -> Option<&Node<Symbol>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node<Symbol>> {
        self.right.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.symbol.is_some()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children().map(Node::leaf_count).sum()
    }

    pub fn internal_count(&self) -> usize {
        if self.is_leaf() {
            return 0;
        }
        1 + self.children().map(Node::internal_count).sum::<usize>()
    }

    fn children(&self) -> impl Iterator<Item = &Node<Symbol>> {
        self.left().into_iter().chain(self.right())
    }
}

/// Builds the Huffman tree for `freq`.
///
/// Returns `None` when there are no symbols to build from. A map with a
/// single symbol yields a lone leaf.
pub fn huffman<Symbol: Ord>(freq: FrequencyMap<Symbol>) -> Option<Node<Symbol>> {
    let distinct = freq.len();

    let mut pq: BinaryHeap<_> = freq
        .into_iter()
        .enumerate()
        .map(|(seq, (s, count))| Reverse(Node::new(s, count, seq)))
        .collect();

    let mut seq = distinct;
    let root = loop {
        let Reverse(left) = pq.pop()?;
        let Some(Reverse(right)) = pq.pop() else {
            break left;
        };
        pq.push(Reverse(Node::from_children(left, right, seq)));
        seq += 1;
    };

    debug!(
        "built huffman tree: {} leaves, total weight {}",
        distinct, root.weight
    );

    Some(root)
}
