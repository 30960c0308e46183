//! Error types for the puff codec.
//!
//! All operations return structured errors rather than panicking.
//! Each component owns its own error enum; the top-level `Error` collects
//! them so that callers can use a single `Result` alias throughout.
//!
//! Note that a checksum mismatch after decode is deliberately NOT an error:
//! output is written regardless and the mismatch is surfaced through
//! `DecodeReport`. Only logically invalid input and unrecoverable resource
//! exhaustion travel through these types.

use num_bigint::BigUint;
use thiserror::Error;

/// Top-level error type for all operations in the codec.
///
/// Each variant corresponds to a failure domain:
/// - BitPack: bit-level buffer/integer conversions
/// - Tree: tree-shape enumeration (Catalan ids)
/// - Huffman: tree construction or symbol attachment
/// - Container: file format parsing/validation
/// - Codec: chunk driver configuration and resource exhaustion
/// - Key: XOR key validation
/// - I/O: file system operations
#[derive(Debug, Error)]
pub enum Error {
    /// Bit packing or integer conversion failed
    #[error("bit packing error: {0}")]
    BitPack(#[from] BitPackError),

    /// Tree enumeration error (e.g., id outside the valid range)
    #[error("tree enumeration error: {0}")]
    Tree(#[from] TreeError),

    /// Huffman tree construction or reconstruction error
    #[error("huffman error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Container format error (bad signature, truncation)
    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    /// Chunk driver error (bad options, memory exhaustion)
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// XOR key error
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bit-level packing errors.
#[derive(Debug, Error)]
pub enum BitPackError {
    /// Symbol width outside the supported range
    #[error("invalid symbol width: {0} (expected 1-8)")]
    InvalidWidth(u8),

    /// Unpacking would drop meaningful bits
    #[error("bit vector of {bits} bits does not fit in {capacity_bits} bits of output")]
    WouldTruncate { bits: usize, capacity_bits: usize },
}

/// Tree-shape enumeration errors.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Tree id is outside `[0, Catalan(n))` for the node count in use
    #[error("tree id {id} out of range: must be below {max}")]
    IdOutOfRange { id: BigUint, max: BigUint },
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// Alphabet must contain at least two symbols to form a full tree
    #[error("alphabet of {size} symbols is too small (minimum 2)")]
    AlphabetTooSmall { size: usize },

    /// Symbols are stored as `u8`, capping the alphabet at 256 entries
    #[error("alphabet of {size} symbols is too large (maximum 256)")]
    AlphabetTooLarge { size: usize },

    /// Leaf count of a reconstructed skeleton disagrees with the symbol list
    #[error("symbol count mismatch: skeleton has {expected} leaves, got {actual} symbols")]
    SymbolCountMismatch { expected: usize, actual: usize },
}

/// Container format errors.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Invalid file signature
    #[error("invalid file signature: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Container is too short for the region being parsed
    #[error("container too short: need at least {required} bytes, got {actual}")]
    Truncated { required: usize, actual: usize },

    /// Width byte in the header is outside 1-7
    #[error("invalid symbol width in header: {0} (expected 1-7)")]
    InvalidWidth(u8),
}

/// Chunk driver errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Encoder options carry a width outside 1-7
    #[error("invalid symbol width: {0} (expected 1-7)")]
    InvalidWidth(u8),

    /// Chunk size must be strictly positive
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// Allocation failed at the minimum chunk size; no further backoff possible
    #[error("out of memory: failed to allocate {requested} bytes at minimum chunk size")]
    OutOfMemory { requested: usize },

    /// The container header stores the output length as u32
    #[error("input of {len} bytes exceeds the container size limit")]
    InputTooLarge { len: usize },
}

/// XOR key errors.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A repeating mask cannot be built from an empty key
    #[error("key is empty")]
    EmptyKey,
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
