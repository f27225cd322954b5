//! Entropy encode: per-component coefficient planes -> Huffman-coded scan data.
//!
//! Unlike a bare re-encode, this emits an actual `RSTn` marker at every
//! restart interval boundary (not just a counter) so a restart interval
//! declared via `DRI` round-trips through an edit instead of silently
//! becoming unparsable.

use log::trace;

use crate::bitstream::BitWriter;
use crate::cancel::{self, CancellationToken};
use crate::error::Result;
use crate::huffman::{encode_coefficient, HuffmanEncodeTable};
use crate::jpeg::plane::CoefficientPlane;
use crate::jpeg::segment::JpegImage;

pub fn encode_scan(
    image: &JpegImage,
    plane: &CoefficientPlane,
    cancel: Option<&dyn CancellationToken>,
) -> Result<Vec<u8>> {
    let frame = image.frame();
    let mcu_cols = frame.mcu_cols();
    let mcu_rows = frame.mcu_rows();

    let mut dc_encoders: [Option<HuffmanEncodeTable>; 4] = Default::default();
    let mut ac_encoders: [Option<HuffmanEncodeTable>; 4] = Default::default();
    for (slot, table) in dc_encoders.iter_mut().zip(image.dc_tables.iter()) {
        if let Some(t) = table {
            *slot = Some(t.build_encode()?);
        }
    }
    for (slot, table) in ac_encoders.iter_mut().zip(image.ac_tables.iter()) {
        if let Some(t) = table {
            *slot = Some(t.build_encode()?);
        }
    }

    let mut writer = BitWriter::with_capacity(image.scan_data.len());
    let mut dc_predictors = vec![0i32; frame.components.len()];
    let mut mcus_since_restart = 0u16;
    let mut restart_cycle = 0u8;

    for mcu_row in 0..mcu_rows {
        for mcu_col in 0..mcu_cols {
            cancel::check(cancel)?;

            if image.restart_interval > 0 && mcus_since_restart == image.restart_interval {
                writer.flush_with_padding();
                writer.write_marker_byte(0xD0 + restart_cycle);
                restart_cycle = (restart_cycle + 1) % 8;
                dc_predictors.iter_mut().for_each(|p| *p = 0);
                mcus_since_restart = 0;
            }

            for (ci, component) in frame.components.iter().enumerate() {
                let dc_enc = dc_encoders[component.dc_table_id as usize]
                    .as_ref()
                    .expect("dc table present for every component after a successful parse");
                let ac_enc = ac_encoders[component.ac_table_id as usize]
                    .as_ref()
                    .expect("ac table present for every component after a successful parse");

                for sub_v in 0..component.v_sampling as usize {
                    for sub_h in 0..component.h_sampling as usize {
                        let row = mcu_row * component.v_sampling as usize + sub_v;
                        let col = mcu_col * component.h_sampling as usize + sub_h;
                        let block = *plane.component(ci).block(row, col);
                        encode_block(&mut writer, dc_enc, ac_enc, &block, &mut dc_predictors[ci])?;
                    }
                }
            }

            mcus_since_restart += 1;
        }
    }

    writer.flush_with_padding();
    let bytes = writer.into_bytes();
    trace!("encoded scan: {} bytes", bytes.len());
    Ok(bytes)
}

fn encode_block(
    writer: &mut BitWriter,
    dc_enc: &HuffmanEncodeTable,
    ac_enc: &HuffmanEncodeTable,
    block_zigzag: &[i16; 64],
    dc_predictor: &mut i32,
) -> Result<()> {
    let dc_value = block_zigzag[0] as i32;
    let diff = dc_value - *dc_predictor;
    *dc_predictor = dc_value;
    let (size, bits) = encode_coefficient(diff);
    dc_enc.encode(writer, size)?;
    writer.write_bits(bits, size);

    let mut run = 0u8;
    for k in 1..64 {
        let value = block_zigzag[k] as i32;
        if value == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            ac_enc.encode(writer, 0xF0)?; // ZRL
            run -= 16;
        }
        let (size, bits) = encode_coefficient(value);
        let rs = (run << 4) | size;
        ac_enc.encode(writer, rs)?;
        writer.write_bits(bits, size);
        run = 0;
    }
    if run > 0 {
        ac_enc.encode(writer, 0x00)?; // EOB: remaining coefficients are zero
    }
    Ok(())
}
