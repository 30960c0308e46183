//! puff-core: Huffman symbol codec with tree-shape serialization
//!
//! This library implements a symbol-substitution codec:
//! - Reinterprets input bytes as fixed-width symbols (1-7 bits)
//! - Builds a prefix-free Huffman code with randomized tie-breaking
//! - Serializes the code tree's topology as a single Catalan-number id
//!   instead of storing the shape node by node
//! - Packs the encoded bitstream into a container masked with a
//!   repeating-key XOR
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bitpack`: byte/bit-vector/integer conversions, LSB-first
//! - `treenum`: bijection between full binary tree shapes and dense ids
//! - `huffman`: code tree construction, code generation, symbol decode
//! - `container`: file format (header, masked table region, payload)
//! - `mask`: repeating-key XOR over the masked regions
//! - `codec`: chunked drivers with allocation backoff
//! - `stats`: observable run behavior
//!
//! # Design Principles
//!
//! - **No panics**: all errors are structured and recoverable
//! - **Bounded memory**: chunked processing with explicit allocation
//!   results and halving backoff
//! - **Deterministic**: the randomized tie-break takes an injected,
//!   seedable source
//! - **Honest checksums**: a mismatch is reported with the output, never
//!   silently swallowed

pub mod bitpack;
pub mod codec;
pub mod container;
pub mod error;
pub mod huffman;
pub mod mask;
pub mod stats;
pub mod treenum;

// Re-export commonly used types
pub use codec::{DecodeOptions, DecodeReport, Decoder, EncodeOptions, EncodeReport, Encoder};
pub use error::{Error, Result};
