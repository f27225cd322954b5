//! Canonical JPEG Huffman table construction, and symbol/magnitude codecs
//! built on top of [`crate::bitstream`].
//!
//! Canonical code assignment follows ITU-T T.81 Annex C (Figures C.1/C.2):
//! codes are assigned in ascending length order, incrementing within a
//! length and left-shifting by one on every length increase.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{DctdmError, HuffmanClass, Result};

const LUT_BITS: u32 = 8;
const LUT_SIZE: usize = 1 << LUT_BITS;

/// The wire form of a DHT entry: how many codes exist at each length, and
/// the symbols assigned to them in canonical order.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    pub class: HuffmanClass,
    pub id: u8,
    /// counts[i] = number of codes of length i+1 (i in 0..16).
    pub counts: [u8; 16],
    /// Flat symbol list in canonical code order, length = sum(counts).
    pub values: Vec<u8>,
}

impl HuffmanTable {
    pub fn new(class: HuffmanClass, id: u8, counts: [u8; 16], values: Vec<u8>) -> Self {
        HuffmanTable {
            class,
            id,
            counts,
            values,
        }
    }

    pub fn build_decode(&self) -> Result<HuffmanDecodeTable> {
        HuffmanDecodeTable::from_table(self)
    }

    pub fn build_encode(&self) -> Result<HuffmanEncodeTable> {
        HuffmanEncodeTable::from_table(self)
    }
}

/// Assigns canonical `(code, length)` pairs to each symbol, in table order.
fn derive_huffman_codes(counts: &[u8; 16]) -> Result<(Vec<u16>, Vec<u8>)> {
    let total: usize = counts.iter().map(|&c| c as usize).sum();
    let mut codes = Vec::with_capacity(total);
    let mut lengths = Vec::with_capacity(total);
    let mut code: u32 = 0;
    for (len_idx, &count) in counts.iter().enumerate() {
        let length = (len_idx + 1) as u8;
        for _ in 0..count {
            if code >= (1u32 << length) {
                return Err(DctdmError::InvalidHuffmanCode {
                    class: HuffmanClass::Dc,
                    id: 0,
                });
            }
            codes.push(code as u16);
            lengths.push(length);
            code += 1;
        }
        code <<= 1;
    }
    Ok((codes, lengths))
}

/// Fast decode form: an 8-bit direct lookup for short codes, falling back to
/// a linear scan over `(code, length)` pairs for anything longer.
pub struct HuffmanDecodeTable {
    class: HuffmanClass,
    id: u8,
    /// (symbol, length) for codes that fit in LUT_BITS; length 0 means "no match".
    lut: Vec<(u8, u8)>,
    codes: Vec<u16>,
    lengths: Vec<u8>,
    values: Vec<u8>,
}

impl HuffmanDecodeTable {
    fn from_table(table: &HuffmanTable) -> Result<Self> {
        let (codes, lengths) = derive_huffman_codes(&table.counts)?;
        let mut lut = vec![(0u8, 0u8); LUT_SIZE];
        for (i, (&code, &length)) in codes.iter().zip(lengths.iter()).enumerate() {
            if length as u32 > LUT_BITS {
                continue;
            }
            let shift = LUT_BITS - length as u32;
            let base = (code as u32) << shift;
            let fill = 1u32 << shift;
            for suffix in 0..fill {
                lut[(base + suffix) as usize] = (table.values[i], length);
            }
        }
        Ok(HuffmanDecodeTable {
            class: table.class,
            id: table.id,
            lut,
            codes,
            lengths,
            values: table.values.clone(),
        })
    }

    /// Decodes one symbol from the bitstream.
    ///
    /// Reads one bit at a time; the LUT entries are replicated across every
    /// suffix of their code so a match can be found as soon as enough bits
    /// have accumulated, without needing to peek ahead.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        let mut code: u32 = 0;
        let mut length: u8 = 0;
        loop {
            let bit = reader.read_bit()?;
            code = (code << 1) | bit as u32;
            length += 1;
            if length as u32 <= LUT_BITS {
                let shift = LUT_BITS - length as u32;
                let index = (code << shift) as usize;
                let (symbol, matched_len) = self.lut[index];
                if matched_len == length {
                    return Ok(symbol);
                }
            }
            if length as u32 > LUT_BITS {
                for (i, (&c, &l)) in self.codes.iter().zip(self.lengths.iter()).enumerate() {
                    if l == length && c as u32 == code {
                        return Ok(self.values[i]);
                    }
                }
            }
            if length >= 16 {
                return Err(DctdmError::InvalidHuffmanCode {
                    class: self.class,
                    id: self.id,
                });
            }
        }
    }
}

/// Encode form: symbol -> (code, length), indexed directly by symbol value.
pub struct HuffmanEncodeTable {
    encode_map: [Option<(u16, u8)>; 256],
}

impl HuffmanEncodeTable {
    fn from_table(table: &HuffmanTable) -> Result<Self> {
        let (codes, lengths) = derive_huffman_codes(&table.counts)?;
        let mut encode_map = [None; 256];
        for (i, &symbol) in table.values.iter().enumerate() {
            encode_map[symbol as usize] = Some((codes[i], lengths[i]));
        }
        Ok(HuffmanEncodeTable { encode_map })
    }

    pub fn encode(&self, writer: &mut BitWriter, symbol: u8) -> Result<()> {
        match self.encode_map[symbol as usize] {
            Some((code, length)) => {
                writer.write_bits(code as u32, length);
                Ok(())
            }
            None => Err(DctdmError::InvalidHuffmanCode {
                class: HuffmanClass::Dc,
                id: 0,
            }),
        }
    }
}

/// JPEG sign-extension rule (T.81 Figure F.12): given a magnitude category
/// `size` and the raw bits read for it, recover the signed coefficient.
pub fn receive_extend(bits: u32, size: u8) -> i32 {
    if size == 0 {
        return 0;
    }
    let vt = 1i32 << (size - 1);
    let value = bits as i32;
    if value < vt {
        value + (-1i32 << size) + 1
    } else {
        value
    }
}

/// Inverse of [`receive_extend`]: category size and magnitude bits for a
/// signed coefficient difference or AC value.
pub fn encode_coefficient(value: i32) -> (u8, u32) {
    if value == 0 {
        return (0, 0);
    }
    let abs = value.unsigned_abs();
    let size = 32 - abs.leading_zeros();
    let bits = if value > 0 {
        abs
    } else {
        abs ^ ((1u32 << size) - 1)
    };
    (size as u8, bits)
}
