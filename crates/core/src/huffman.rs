//! Huffman tree construction, code generation, and per-symbol decoding.
//!
//! The tree always spans the full symbol alphabet: unobserved symbols get a
//! leaf too, so the decoder can derive the internal node count from the
//! symbol width alone and rebuild the topology from its Catalan id.
//!
//! # Randomized tie-breaking
//!
//! Leaf weights are not raw frequencies. Each leaf draws a uniform weight
//! from `[1, frequency + 1]`, which keeps every weight strictly positive
//! and makes code lengths unpredictable across runs. The random source is
//! passed in explicitly; seed it to make construction deterministic.
//!
//! # Decode semantics
//!
//! `decode_symbol` walks root-to-leaf, reading one bit per internal node.
//! Bit reads past the end of the stream yield 0. A corrupted table or
//! payload therefore produces arbitrary symbols rather than a structural
//! error; the plaintext checksum is the detector for that case.

use crate::bitpack::{BitBuf, BitBufSlice};
use crate::error::{HuffmanError, Result};
use crate::treenum::Shape;
use rand::Rng;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A node of the code tree. Internal nodes never carry a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Leaf { symbol: u8 },
    Internal { left: Box<Node>, right: Box<Node> },
}

/// An immutable Huffman tree over a fixed symbol alphabet.
#[derive(Debug, Clone)]
pub struct Tree {
    root: Node,
    alphabet: usize,
}

/// A rooted subtree awaiting merging, ordered by `(weight, symbol)`.
///
/// The representative symbol is the smallest symbol beneath the subtree;
/// it exists only to make the ordering total, since weights collide.
#[derive(Debug)]
struct Subtree {
    weight: u64,
    symbol: u8,
    node: Node,
}

impl PartialEq for Subtree {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.symbol == other.symbol
    }
}

impl Eq for Subtree {}

impl PartialOrd for Subtree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Subtree {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weight, self.symbol).cmp(&(other.weight, other.symbol))
    }
}

impl Tree {
    /// Build a tree from a frequency table, one entry per symbol.
    ///
    /// Zero frequencies are allowed and expected: the whole alphabet
    /// participates regardless of what the input contains.
    ///
    /// # Errors
    /// - `HuffmanError::AlphabetTooSmall` for fewer than 2 symbols
    /// - `HuffmanError::AlphabetTooLarge` for more than 256 symbols
    pub fn build<R: Rng + ?Sized>(freqs: &[u64], rng: &mut R) -> Result<Tree> {
        let size = freqs.len();
        if size < 2 {
            return Err(HuffmanError::AlphabetTooSmall { size }.into());
        }
        if size > 256 {
            return Err(HuffmanError::AlphabetTooLarge { size }.into());
        }

        let mut heap = BinaryHeap::with_capacity(size);
        for (symbol, &freq) in freqs.iter().enumerate() {
            let symbol = symbol as u8;
            heap.push(Reverse(Subtree {
                weight: rng.gen_range(1..=freq.saturating_add(1)),
                symbol,
                node: Node::Leaf { symbol },
            }));
        }

        // Standard Huffman merging: repeatedly join the two lightest
        // subtrees, the lighter of the pair becoming the left child.
        while heap.len() > 1 {
            let Reverse(first) = heap.pop().unwrap();
            let Reverse(second) = heap.pop().unwrap();
            heap.push(Reverse(Subtree {
                weight: first.weight + second.weight,
                symbol: first.symbol.min(second.symbol),
                node: Node::Internal {
                    left: Box::new(first.node),
                    right: Box::new(second.node),
                },
            }));
        }

        let Reverse(root) = heap.pop().unwrap();
        Ok(Tree {
            root: root.node,
            alphabet: size,
        })
    }

    /// Rebuild a tree by attaching symbols to a reconstructed skeleton.
    ///
    /// Symbols are consumed in the same depth-first (left before right)
    /// order that [`Tree::leaf_symbols`] produces.
    ///
    /// # Errors
    /// Returns `HuffmanError::SymbolCountMismatch` if the symbol list does
    /// not cover the skeleton's leaves exactly.
    pub fn from_shape(shape: &Shape, symbols: &[u8]) -> Result<Tree> {
        let expected = shape.leaves();
        if symbols.len() != expected {
            return Err(HuffmanError::SymbolCountMismatch {
                expected,
                actual: symbols.len(),
            }
            .into());
        }

        let mut next = 0;
        let root = attach(shape, symbols, &mut next);
        Ok(Tree {
            root,
            alphabet: symbols.len(),
        })
    }

    /// Extract the unlabeled topology for shape serialization.
    pub fn to_shape(&self) -> Shape {
        shape_of(&self.root)
    }

    /// Per-symbol prefix codes, indexed by symbol value.
    ///
    /// A code is the root-to-leaf path with 0 for left edges and 1 for
    /// right edges; its length is the leaf's depth.
    pub fn codes(&self) -> Vec<BitBuf> {
        let mut codes = vec![BitBuf::new(); self.alphabet];
        let mut path = BitBuf::new();
        assign_codes(&self.root, &mut path, &mut codes);
        codes
    }

    /// Leaf symbols in depth-first order: the container's content table.
    pub fn leaf_symbols(&self) -> Vec<u8> {
        let mut symbols = Vec::with_capacity(self.alphabet);
        collect_symbols(&self.root, &mut symbols);
        symbols
    }

    /// Decode one symbol starting at bit `pos`; returns the symbol and the
    /// position of the first unconsumed bit.
    ///
    /// Reads past the end of `bits` behave as 0 and still advance the
    /// cursor, so the caller must bound how far it decodes.
    pub fn decode_symbol(&self, bits: &BitBufSlice, mut pos: usize) -> (u8, usize) {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { symbol } => return (*symbol, pos),
                Node::Internal { left, right } => {
                    let bit = bits.get(pos).map(|b| *b).unwrap_or(false);
                    node = if bit { right } else { left };
                    pos += 1;
                }
            }
        }
    }

    /// Longest root-to-leaf path: an upper bound on codeword length, used
    /// by the chunk driver to decide when a full codeword is available.
    pub fn depth(&self) -> usize {
        depth_of(&self.root)
    }

    /// Alphabet size the tree was built over.
    pub fn alphabet(&self) -> usize {
        self.alphabet
    }
}

fn attach(shape: &Shape, symbols: &[u8], next: &mut usize) -> Node {
    match shape {
        Shape::Leaf => {
            let symbol = symbols[*next];
            *next += 1;
            Node::Leaf { symbol }
        }
        Shape::Node(left, right) => {
            let left = Box::new(attach(left, symbols, next));
            let right = Box::new(attach(right, symbols, next));
            Node::Internal { left, right }
        }
    }
}

fn shape_of(node: &Node) -> Shape {
    match node {
        Node::Leaf { .. } => Shape::Leaf,
        Node::Internal { left, right } => {
            Shape::Node(Box::new(shape_of(left)), Box::new(shape_of(right)))
        }
    }
}

fn assign_codes(node: &Node, path: &mut BitBuf, codes: &mut [BitBuf]) {
    match node {
        Node::Leaf { symbol } => codes[*symbol as usize] = path.clone(),
        Node::Internal { left, right } => {
            path.push(false);
            assign_codes(left, path, codes);
            path.pop();
            path.push(true);
            assign_codes(right, path, codes);
            path.pop();
        }
    }
}

fn collect_symbols(node: &Node, symbols: &mut Vec<u8>) {
    match node {
        Node::Leaf { symbol } => symbols.push(*symbol),
        Node::Internal { left, right } => {
            collect_symbols(left, symbols);
            collect_symbols(right, symbols);
        }
    }
}

fn depth_of(node: &Node) -> usize {
    match node {
        Node::Leaf { .. } => 0,
        Node::Internal { left, right } => 1 + depth_of(left).max(depth_of(right)),
    }
}
