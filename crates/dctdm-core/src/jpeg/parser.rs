//! Segment walk: SOI -> (APPn/COM/DQT/DHT/SOF0/DRI)* -> SOS -> scan data -> EOI.

use crate::error::{DctdmError, HuffmanClass, Result};
use crate::huffman::HuffmanTable;
use crate::jpeg::marker::Marker;
use crate::jpeg::segment::{Component, FrameHeader, JpegImage, PreservedSegment, QuantTable};

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(DctdmError::UnexpectedEndOfStream { offset: self.pos });
        }
        let b = self.data[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let hi = self.read_u8()?;
        let lo = self.read_u8()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Reads a marker's 2-byte length, including itself, and returns the
    /// remaining payload length.
    fn read_segment_length(&mut self) -> Result<usize> {
        let len = self.read_u16()? as usize;
        if len < 2 {
            return Err(DctdmError::InvalidSegmentLength {
                marker: 0,
                declared: len,
                available: self.data.len() - self.pos,
            });
        }
        Ok(len - 2)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(DctdmError::InvalidSegmentLength {
                marker: 0,
                declared: len,
                available: self.data.len() - self.pos,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads the next marker, skipping any fill `0xFF` bytes that precede it.
    fn read_marker(&mut self) -> Result<Marker> {
        loop {
            let b = self.read_u8()?;
            if b != 0xFF {
                return Err(DctdmError::InvalidMarker {
                    byte: b,
                    offset: self.pos - 1,
                });
            }
            let code = self.read_u8()?;
            if code == 0xFF {
                // Fill byte; the next byte is re-examined as the marker code.
                self.pos -= 1;
                continue;
            }
            return Marker::from_u8(code).ok_or(DctdmError::InvalidMarker {
                byte: code,
                offset: self.pos - 1,
            });
        }
    }
}

pub fn parse_jpeg(data: &[u8]) -> Result<JpegImage> {
    let mut cursor = Cursor::new(data);
    let soi = cursor.read_marker()?;
    if soi != Marker::Soi {
        return Err(DctdmError::InvalidMarker {
            byte: 0,
            offset: 0,
        });
    }

    let mut image = JpegImage::default();

    loop {
        let marker = cursor.read_marker()?;
        match marker {
            Marker::Eoi => break,
            Marker::Sos => {
                parse_sos_and_scan(&mut cursor, &mut image)?;
                break;
            }
            Marker::App(n) => {
                let len = cursor.read_segment_length()?;
                let payload = cursor.take(len)?.to_vec();
                image.preserved.push(PreservedSegment {
                    marker_code: Marker::App(n).to_u8(),
                    payload,
                });
            }
            Marker::Com => {
                let len = cursor.read_segment_length()?;
                let payload = cursor.take(len)?.to_vec();
                image.preserved.push(PreservedSegment {
                    marker_code: Marker::Com.to_u8(),
                    payload,
                });
            }
            Marker::Dqt => parse_dqt(&mut cursor, &mut image)?,
            Marker::Dht => parse_dht(&mut cursor, &mut image)?,
            Marker::Sof(0) => parse_sof0(&mut cursor, &mut image)?,
            Marker::Sof(n) => {
                return Err(DctdmError::UnsupportedMode {
                    marker: 0xC0 + n,
                })
            }
            Marker::Dri => {
                let len = cursor.read_segment_length()?;
                let payload = cursor.take(len)?;
                image.restart_interval = u16::from_be_bytes([payload[0], payload[1]]);
            }
            other if other.has_length() => {
                // Unrecognized-but-lengthed segment: skip it.
                let len = cursor.read_segment_length()?;
                cursor.take(len)?;
            }
            _ => {}
        }
    }

    if image.frame.is_none() {
        return Err(DctdmError::InvalidMarker {
            byte: 0,
            offset: cursor.pos,
        });
    }

    Ok(image)
}

fn parse_dqt(cursor: &mut Cursor<'_>, image: &mut JpegImage) -> Result<()> {
    let len = cursor.read_segment_length()?;
    let end = cursor.pos + len;
    while cursor.pos < end {
        let pq_tq = cursor.read_u8()?;
        let precision_16_bit = (pq_tq >> 4) != 0;
        let id = pq_tq & 0x0F;
        let mut values_zigzag = [0u16; 64];
        for v in values_zigzag.iter_mut() {
            *v = if precision_16_bit {
                cursor.read_u16()?
            } else {
                cursor.read_u8()? as u16
            };
        }
        if (id as usize) < image.quant_tables.len() {
            image.quant_tables[id as usize] = Some(QuantTable {
                id,
                precision_16_bit,
                values_zigzag,
            });
        }
    }
    Ok(())
}

fn parse_dht(cursor: &mut Cursor<'_>, image: &mut JpegImage) -> Result<()> {
    let len = cursor.read_segment_length()?;
    let end = cursor.pos + len;
    while cursor.pos < end {
        let tc_th = cursor.read_u8()?;
        let class = if (tc_th >> 4) == 0 {
            HuffmanClass::Dc
        } else {
            HuffmanClass::Ac
        };
        let id = tc_th & 0x0F;
        let mut counts = [0u8; 16];
        for c in counts.iter_mut() {
            *c = cursor.read_u8()?;
        }
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        let values = cursor.take(total)?.to_vec();
        let table = HuffmanTable::new(class, id, counts, values);
        let slot = match class {
            HuffmanClass::Dc => &mut image.dc_tables,
            HuffmanClass::Ac => &mut image.ac_tables,
        };
        if (id as usize) < slot.len() {
            slot[id as usize] = Some(table);
        }
    }
    Ok(())
}

fn parse_sof0(cursor: &mut Cursor<'_>, image: &mut JpegImage) -> Result<()> {
    let _len = cursor.read_segment_length()?;
    let precision = cursor.read_u8()?;
    if precision != 8 {
        return Err(DctdmError::UnsupportedPrecision { precision });
    }
    let height = cursor.read_u16()?;
    let width = cursor.read_u16()?;
    let n = cursor.read_u8()?;
    let mut components = Vec::with_capacity(n as usize);
    for _ in 0..n {
        let id = cursor.read_u8()?;
        let sampling = cursor.read_u8()?;
        let quant_table_id = cursor.read_u8()?;
        components.push(Component {
            id,
            h_sampling: sampling >> 4,
            v_sampling: sampling & 0x0F,
            quant_table_id,
            dc_table_id: 0,
            ac_table_id: 0,
        });
    }
    image.frame = Some(FrameHeader {
        precision,
        height,
        width,
        components,
    });
    Ok(())
}

fn parse_sos_and_scan(cursor: &mut Cursor<'_>, image: &mut JpegImage) -> Result<()> {
    let _len = cursor.read_segment_length()?;
    let n = cursor.read_u8()?;
    let frame = image
        .frame
        .as_mut()
        .ok_or(DctdmError::InvalidMarker { byte: 0, offset: cursor.pos })?;
    for _ in 0..n {
        let component_id = cursor.read_u8()?;
        let tables = cursor.read_u8()?;
        if let Some(component) = frame.components.iter_mut().find(|c| c.id == component_id) {
            component.dc_table_id = tables >> 4;
            component.ac_table_id = tables & 0x0F;
        }
    }
    // Ss, Se, Ah/Al: fixed for baseline (0, 63, 0, 0); skip without validating.
    let _ss = cursor.read_u8()?;
    let _se = cursor.read_u8()?;
    let _ah_al = cursor.read_u8()?;

    image.scan_data = read_scan_data(cursor)?;
    Ok(())
}

/// Collects raw entropy-coded bytes up to (but not including) the marker
/// that terminates the scan, preserving restart markers for the entropy
/// decoder to consume.
fn read_scan_data(cursor: &mut Cursor<'_>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let b = cursor.read_u8()?;
        if b != 0xFF {
            out.push(b);
            continue;
        }
        let next = cursor.read_u8()?;
        if next == 0x00 {
            out.push(0xFF);
            out.push(0x00);
            continue;
        }
        if (0xD0..=0xD7).contains(&next) {
            out.push(0xFF);
            out.push(next);
            continue;
        }
        if next == 0xFF {
            // Fill byte; re-examine it as the marker candidate.
            out.push(0xFF);
            cursor.pos -= 1;
            continue;
        }
        // A real terminating marker: un-consume it so the caller sees it.
        cursor.pos -= 2;
        return Ok(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_data_without_soi() {
        let data = [0x00, 0x01, 0x02];
        assert!(parse_jpeg(&data).is_err());
    }

    #[test]
    fn rejects_progressive_sof2() {
        // SOI, SOF2 (minimal/garbage body causes an error either way, but we
        // only care that SOF2 is rejected before anything else trips).
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xC2, 0x00, 0x0B];
        data.extend_from_slice(&[8, 0, 1, 0, 1, 1, 1, 1, 0]);
        let err = parse_jpeg(&data).unwrap_err();
        assert!(matches!(err, DctdmError::UnsupportedMode { marker: 0xC2 }));
    }
}
