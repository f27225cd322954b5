//! Reassembles a complete JPEG byte stream from a [`JpegImage`]'s segments
//! and a freshly entropy-encoded scan.

use crate::jpeg::segment::JpegImage;

/// Writes `SOI`, every preserved `APPn`/`COM` segment (in original order),
/// `DQT`/`DHT`/`SOF0`/`DRI`, `SOS`, the entropy-coded scan, and `EOI`.
pub fn write_jpeg(image: &JpegImage, scan_data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(scan_data.len() + 1024);
    out.extend_from_slice(&[0xFF, 0xD8]); // SOI

    for segment in &image.preserved {
        write_segment(&mut out, segment.marker_code, &segment.payload);
    }

    for table in image.quant_tables.iter().flatten() {
        write_dqt(&mut out, table);
    }

    let frame = image.frame();
    write_sof0(&mut out, frame);

    for table in image.dc_tables.iter().flatten() {
        write_dht(&mut out, table);
    }
    for table in image.ac_tables.iter().flatten() {
        write_dht(&mut out, table);
    }

    if image.restart_interval > 0 {
        write_dri(&mut out, image.restart_interval);
    }

    write_sos(&mut out, frame);
    out.extend_from_slice(scan_data);

    out.extend_from_slice(&[0xFF, 0xD9]); // EOI
    out
}

fn write_segment(out: &mut Vec<u8>, marker_code: u8, payload: &[u8]) {
    out.push(0xFF);
    out.push(marker_code);
    let len = payload.len() as u16 + 2;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
}

fn write_dqt(out: &mut Vec<u8>, table: &crate::jpeg::segment::QuantTable) {
    out.push(0xFF);
    out.push(0xDB);
    let entry_size = if table.precision_16_bit { 2 } else { 1 };
    let len = 2 + 1 + 64 * entry_size;
    out.extend_from_slice(&(len as u16).to_be_bytes());
    let pq_tq = ((table.precision_16_bit as u8) << 4) | table.id;
    out.push(pq_tq);
    for &v in &table.values_zigzag {
        if table.precision_16_bit {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.push(v as u8);
        }
    }
}

fn write_dht(out: &mut Vec<u8>, table: &crate::huffman::HuffmanTable) {
    out.push(0xFF);
    out.push(0xC4);
    let len = 2 + 1 + 16 + table.values.len();
    out.extend_from_slice(&(len as u16).to_be_bytes());
    let class_bit = match table.class {
        crate::error::HuffmanClass::Dc => 0u8,
        crate::error::HuffmanClass::Ac => 1u8,
    };
    out.push((class_bit << 4) | table.id);
    out.extend_from_slice(&table.counts);
    out.extend_from_slice(&table.values);
}

fn write_sof0(out: &mut Vec<u8>, frame: &crate::jpeg::segment::FrameHeader) {
    out.push(0xFF);
    out.push(0xC0);
    let len = 2 + 1 + 2 + 2 + 1 + frame.components.len() * 3;
    out.extend_from_slice(&(len as u16).to_be_bytes());
    out.push(frame.precision);
    out.extend_from_slice(&frame.height.to_be_bytes());
    out.extend_from_slice(&frame.width.to_be_bytes());
    out.push(frame.components.len() as u8);
    for component in &frame.components {
        out.push(component.id);
        out.push((component.h_sampling << 4) | component.v_sampling);
        out.push(component.quant_table_id);
    }
}

fn write_dri(out: &mut Vec<u8>, interval: u16) {
    out.push(0xFF);
    out.push(0xDD);
    out.extend_from_slice(&4u16.to_be_bytes());
    out.extend_from_slice(&interval.to_be_bytes());
}

fn write_sos(out: &mut Vec<u8>, frame: &crate::jpeg::segment::FrameHeader) {
    out.push(0xFF);
    out.push(0xDA);
    let len = 2 + 1 + frame.components.len() * 2 + 3;
    out.extend_from_slice(&(len as u16).to_be_bytes());
    out.push(frame.components.len() as u8);
    for component in &frame.components {
        out.push(component.id);
        out.push((component.dc_table_id << 4) | component.ac_table_id);
    }
    out.push(0); // Ss
    out.push(63); // Se
    out.push(0); // Ah/Al
}
