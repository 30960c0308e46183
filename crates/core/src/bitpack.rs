//! Bit packing: conversions between byte buffers, bit vectors, and integers.
//!
//! Every other component builds on this module. The codec's bit order is
//! least-significant-bit-first throughout: bit `i` of a buffer is bit
//! `i % 8` of byte `i / 8`, and bit `i` of a vector corresponds to bit `i`
//! of an integer.
//!
//! # Padding Rules
//! - `pack`: pads the bit expansion with zeros up to the next multiple of
//!   the symbol width, so the final partial symbol is well defined
//! - `unpack`: zero-fills output bytes the vector does not cover, and
//!   refuses to drop meaningful bits
//!
//! # Example
//! ```
//! use puff_core::bitpack;
//!
//! let bits = bitpack::pack(&[0b0000_0110], 3).unwrap();
//! assert_eq!(bits.len(), 9); // 8 bits padded up to a multiple of 3
//!
//! let symbols: Vec<u8> = bitpack::symbols(&bits, 3).collect();
//! assert_eq!(symbols, vec![0b110, 0b000, 0b000]);
//! ```

use crate::error::{BitPackError, Result};
use bitvec::prelude::*;
use num_bigint::BigUint;

/// Bit vector in the codec's canonical order (LSB-first, byte-backed).
pub type BitBuf = BitVec<u8, Lsb0>;

/// Borrowed view of a [`BitBuf`].
pub type BitBufSlice = BitSlice<u8, Lsb0>;

/// Reinterpret a byte buffer as a sequence of `width`-bit symbols.
///
/// The result is the LSB-first bit expansion of `bytes`, zero-padded up to
/// the next multiple of `width`. The padding bits belong to the final
/// (partial) symbol; nothing is ever truncated.
///
/// # Errors
/// Returns `BitPackError::InvalidWidth` if `width` is outside 1-8.
pub fn pack(bytes: &[u8], width: u8) -> Result<BitBuf> {
    check_width(width)?;

    let mut bits = BitBuf::from_slice(bytes);
    let width = width as usize;
    let rem = bits.len() % width;
    if rem != 0 {
        bits.resize(bits.len() + width - rem, false);
    }
    Ok(bits)
}

/// Inverse of [`pack`]: write a bit vector back into `out_len` bytes.
///
/// Bytes the vector does not reach are zero-filled. The vector may carry
/// up to `width - 1` trailing padding bits beyond `out_len * 8`; any more
/// than that would silently drop data and is rejected instead.
///
/// # Errors
/// - `BitPackError::InvalidWidth` if `width` is outside 1-8
/// - `BitPackError::WouldTruncate` if the vector is too long for the output
pub fn unpack(bits: &BitBufSlice, width: u8, out_len: usize) -> Result<Vec<u8>> {
    check_width(width)?;

    let capacity_bits = out_len * 8;
    if bits.len() >= capacity_bits + width as usize {
        return Err(BitPackError::WouldTruncate {
            bits: bits.len(),
            capacity_bits,
        }
        .into());
    }

    let mut bytes = vec![0u8; out_len];
    for (i, bit) in bits.iter().by_vals().enumerate().take(capacity_bits) {
        if bit {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    Ok(bytes)
}

/// Iterate the `width`-bit symbol values stored in a bit vector.
///
/// Each symbol is the little-endian load of one `width`-bit group; a final
/// group shorter than `width` bits is zero-extended. `width` must already
/// be validated to lie in 1-8 (symbols are `u8`).
pub fn symbols(bits: &BitBufSlice, width: u8) -> impl Iterator<Item = u8> + '_ {
    debug_assert!((1..=8).contains(&width));
    bits.chunks(width as usize).map(|chunk| chunk.load_le::<u8>())
}

/// Pack a slice of symbol values into a bit vector, `width` bits each.
///
/// Only the low `width` bits of each value are stored. This is the
/// serialization direction of [`symbols`].
pub fn pack_symbols(values: &[u8], width: u8) -> Result<BitBuf> {
    check_width(width)?;

    let width = width as usize;
    let mut bits = BitBuf::with_capacity(values.len() * width);
    for &value in values {
        for i in 0..width {
            bits.push(value >> i & 1 == 1);
        }
    }
    Ok(bits)
}

/// Convert a bit vector to an arbitrary-precision integer.
///
/// Bit `i` of the vector becomes bit `i` of the integer, so trailing zero
/// bits do not change the value. Exact for vectors of any length.
pub fn to_integer(bits: &BitBufSlice) -> BigUint {
    let mut bytes = vec![0u8; (bits.len() + 7) / 8];
    for (i, bit) in bits.iter().by_vals().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    BigUint::from_bytes_le(&bytes)
}

/// Convert an arbitrary-precision integer to a bit vector.
///
/// The vector's length is the integer's bit length (zero maps to the empty
/// vector); callers that need a fixed field width zero-extend via [`concat`].
pub fn from_integer(value: &BigUint) -> BitBuf {
    let mut bits = BitBuf::from_vec(value.to_bytes_le());
    bits.truncate(value.bits() as usize);
    bits
}

/// Concatenate fixed-length bit segments into one vector.
///
/// Each segment contributes exactly `len` bits: extra bits are not read,
/// and segments shorter than `len` are zero-extended. This is the assembly
/// primitive for the container's fixed-width region; disassembly is plain
/// slicing on the reader side.
pub fn concat(segments: &[(&BitBufSlice, usize)]) -> BitBuf {
    let total: usize = segments.iter().map(|(_, len)| *len).sum();
    let mut out = BitBuf::with_capacity(total);
    for (bits, len) in segments {
        for i in 0..*len {
            out.push(bits.get(i).map(|b| *b).unwrap_or(false));
        }
    }
    out
}

fn check_width(width: u8) -> Result<()> {
    if (1..=8).contains(&width) {
        Ok(())
    } else {
        Err(BitPackError::InvalidWidth(width).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_pads_to_symbol_boundary() {
        // 8 bits at width 3 pad up to 9; at width 8 no padding is needed.
        let bits = pack(&[0xFF], 3).unwrap();
        assert_eq!(bits.len(), 9);
        assert!(!bits[8]);

        let bits = pack(&[0xFF], 8).unwrap();
        assert_eq!(bits.len(), 8);
    }

    #[test]
    fn test_pack_empty() {
        for width in 1..=8 {
            assert!(pack(&[], width).unwrap().is_empty());
        }
    }

    #[test]
    fn test_pack_is_lsb_first() {
        let bits = pack(&[0b0000_0001, 0b1000_0000], 8).unwrap();
        assert!(bits[0]);
        assert!(!bits[1]);
        assert!(!bits[8]);
        assert!(bits[15]);
    }

    #[test]
    fn test_unpack_round_trip_all_widths() {
        let data: Vec<u8> = (0..=255).collect();
        for width in 1..=7 {
            let bits = pack(&data, width).unwrap();
            let back = unpack(&bits, width, data.len()).unwrap();
            assert_eq!(back, data, "width {width}");
        }
    }

    #[test]
    fn test_unpack_zero_fills_short_vector() {
        let bits = pack(&[0xFF], 8).unwrap();
        let bytes = unpack(&bits, 8, 3).unwrap();
        assert_eq!(bytes, vec![0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_unpack_rejects_truncation() {
        let bits = pack(&[0xFF, 0xFF], 8).unwrap();
        let result = unpack(&bits, 8, 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_width() {
        assert!(pack(&[1], 0).is_err());
        assert!(pack(&[1], 9).is_err());
        assert!(pack_symbols(&[1], 0).is_err());
    }

    #[test]
    fn test_symbols_width_3() {
        // 0x06 = bits 011 00000 -> symbols (LSB-first groups) 110, 000, 000
        let bits = pack(&[0x06], 3).unwrap();
        let syms: Vec<u8> = symbols(&bits, 3).collect();
        assert_eq!(syms, vec![0b110, 0b000, 0b000]);
    }

    #[test]
    fn test_pack_symbols_inverts_symbols() {
        let values = [5u8, 0, 7, 3, 1];
        for width in 3..=7 {
            let bits = pack_symbols(&values, width).unwrap();
            assert_eq!(bits.len(), values.len() * width as usize);
            let back: Vec<u8> = symbols(&bits, width).collect();
            assert_eq!(back, values, "width {width}");
        }
    }

    #[test]
    fn test_integer_round_trip_small() {
        for n in [0u64, 1, 2, 127, 128, 255, 256, u64::MAX] {
            let value = BigUint::from(n);
            let bits = from_integer(&value);
            assert_eq!(to_integer(&bits), value);
        }
    }

    #[test]
    fn test_integer_round_trip_beyond_64_bits() {
        // 2^200 + 12345 does not fit any fixed-width integer.
        let value = BigUint::from(2u32).pow(200) + BigUint::from(12345u32);
        let bits = from_integer(&value);
        assert_eq!(bits.len(), 201);
        assert_eq!(to_integer(&bits), value);
    }

    #[test]
    fn test_integer_zero() {
        let bits = from_integer(&BigUint::from(0u32));
        assert!(bits.is_empty());
        assert_eq!(to_integer(&bits), BigUint::from(0u32));
    }

    #[test]
    fn test_integer_ignores_trailing_zero_bits() {
        let mut bits = from_integer(&BigUint::from(5u32));
        bits.resize(64, false);
        assert_eq!(to_integer(&bits), BigUint::from(5u32));
    }

    #[test]
    fn test_concat_fixed_widths() {
        let a = pack_symbols(&[0b101], 3).unwrap();
        let b = pack_symbols(&[0b11], 2).unwrap();
        let joined = concat(&[(&a, 3), (&b, 2)]);
        assert_eq!(joined.len(), 5);
        let values: Vec<u8> = symbols(&joined, 5).collect();
        assert_eq!(values, vec![0b11101]);
    }

    #[test]
    fn test_concat_zero_extends_short_segments() {
        // A 2-bit segment written into a 6-bit field reads back unchanged.
        let short = pack_symbols(&[0b11], 2).unwrap();
        let joined = concat(&[(&short, 6)]);
        assert_eq!(joined.len(), 6);
        assert_eq!(to_integer(&joined), BigUint::from(0b11u32));
    }

    #[test]
    fn test_concat_truncates_long_segments() {
        let long = pack_symbols(&[0xFF], 8).unwrap();
        let joined = concat(&[(&long, 4)]);
        assert_eq!(joined.len(), 4);
        assert_eq!(to_integer(&joined), BigUint::from(0b1111u32));
    }
}
