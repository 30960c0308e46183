//! Container file format.
//!
//! A container packages everything the decoder needs: a plain header, a
//! fixed-width masked region describing the code tree, and the encoded
//! payload.
//!
//! # Layout
//!
//! ```text
//! +--------------------+
//! | Magic (4 bytes)    |  0x50 0x55 0x46 0x46 ("PUFF")
//! +--------------------+
//! | width (1)          |  symbol width in bits, 1-7
//! +--------------------+
//! | output_len (4)     |  u32 big-endian, decoded byte count
//! +--------------------+
//! | checksum (4)       |  u32 big-endian, CRC-32 of the plaintext
//! +--------------------+
//! | table region       |  tree id ++ leaf content, XOR-masked
//! | (table_len(width)) |
//! +--------------------+
//! | payload            |  encoded symbols, XOR-masked, key offset
//! | (remainder)        |  continues from the table region
//! +--------------------+
//! ```
//!
//! The table region packs two fixed-width bit fields back to back and
//! zero-pads to a byte boundary:
//! - tree id: `tree_id_bits(2^w - 1)` bits, the Catalan id of the shape
//! - content: `2^w * w` bits, leaf symbols in depth-first order
//!
//! Fixed field widths are what make the region parseable before any tree
//! exists on the decode side: both sizes depend only on `width`, which is
//! in the clear header.

use crate::bitpack::{self, BitBuf};
use crate::error::{ContainerError, Result};
use crate::huffman::Tree;
use crate::treenum;
use num_bigint::BigUint;

/// File signature: "PUFF"
pub const MAGIC: [u8; 4] = *b"PUFF";

/// Size of the plain (unmasked) header in bytes
pub const HEADER_SIZE: usize = 13;

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Symbol width in bits (1-7)
    pub width: u8,

    /// Decoded output length in bytes
    pub output_len: u32,

    /// CRC-32 over the decoded plaintext
    pub checksum: u32,
}

impl Header {
    /// Serialize the header into its wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4] = self.width;
        bytes[5..9].copy_from_slice(&self.output_len.to_be_bytes());
        bytes[9..13].copy_from_slice(&self.checksum.to_be_bytes());
        bytes
    }

    /// Parse and validate a header from the front of a container.
    ///
    /// # Errors
    /// - `ContainerError::Truncated` if fewer than `HEADER_SIZE` bytes
    /// - `ContainerError::InvalidMagic` on a wrong signature
    /// - `ContainerError::InvalidWidth` for a width byte outside 1-7
    pub fn parse(bytes: &[u8]) -> Result<Header> {
        if bytes.len() < HEADER_SIZE {
            return Err(ContainerError::Truncated {
                required: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        }

        let magic: [u8; 4] = bytes[0..4].try_into().unwrap();
        if magic != MAGIC {
            return Err(ContainerError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let width = bytes[4];
        if !(1..=7).contains(&width) {
            return Err(ContainerError::InvalidWidth(width).into());
        }

        let output_len = u32::from_be_bytes(bytes[5..9].try_into().unwrap());
        let checksum = u32::from_be_bytes(bytes[9..13].try_into().unwrap());

        Ok(Header {
            width,
            output_len,
            checksum,
        })
    }
}

/// Alphabet size for a symbol width: `2^width`.
pub fn alphabet_size(width: u8) -> usize {
    1 << width
}

/// Internal node count of the full-alphabet tree: `2^width - 1`.
pub fn internal_nodes(width: u8) -> usize {
    alphabet_size(width) - 1
}

/// Bit width of the tree-id field for a symbol width.
pub fn tree_id_bits(width: u8) -> usize {
    treenum::tree_id_bits(internal_nodes(width))
}

/// Bit width of the whole fixed-width region (tree id + content table).
pub fn table_bits(width: u8) -> usize {
    tree_id_bits(width) + alphabet_size(width) * width as usize
}

/// Byte length of the table region as stored (zero-padded).
pub fn table_len(width: u8) -> usize {
    (table_bits(width) + 7) / 8
}

/// Serialize a tree's shape id and leaf content into the unmasked table
/// region bytes.
pub fn serialize_table(tree: &Tree, width: u8) -> Result<Vec<u8>> {
    let id = treenum::shape_to_id(&tree.to_shape());
    let id_bits = bitpack::from_integer(&id);
    let content_bits = bitpack::pack_symbols(&tree.leaf_symbols(), width)?;

    let table = bitpack::concat(&[
        (&id_bits, tree_id_bits(width)),
        (&content_bits, alphabet_size(width) * width as usize),
    ]);
    bitpack::unpack(&table, 8, table_len(width))
}

/// Parse an unmasked table region into the tree id and the depth-first
/// leaf symbols.
///
/// The id is range-checked later by shape reconstruction; this layer only
/// validates the region's size.
pub fn parse_table(bytes: &[u8], width: u8) -> Result<(BigUint, Vec<u8>)> {
    let required = table_len(width);
    if bytes.len() < required {
        return Err(ContainerError::Truncated {
            required,
            actual: bytes.len(),
        }
        .into());
    }

    let bits = BitBuf::from_slice(&bytes[..required]);
    let id_bits = tree_id_bits(width);
    let id = bitpack::to_integer(&bits[..id_bits]);

    let content = &bits[id_bits..id_bits + alphabet_size(width) * width as usize];
    let symbols: Vec<u8> = bitpack::symbols(content, width).collect();

    Ok((id, symbols))
}
