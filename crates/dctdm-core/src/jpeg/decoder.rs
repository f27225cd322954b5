//! Entropy decode: Huffman-coded scan data -> per-component coefficient planes.

use log::trace;

use crate::bitstream::BitReader;
use crate::cancel::{self, CancellationToken};
use crate::error::{DctdmError, Result};
use crate::huffman::{receive_extend, HuffmanDecodeTable};
use crate::jpeg::plane::{CoefficientPlane, ComponentPlane};
use crate::jpeg::segment::{JpegImage, ZIGZAG_TO_NATURAL};

pub fn decode_scan(
    image: &JpegImage,
    cancel: Option<&dyn CancellationToken>,
) -> Result<CoefficientPlane> {
    let frame = image.frame();
    let h_max = frame.h_max();
    let v_max = frame.v_max();
    let mcu_cols = frame.mcu_cols();
    let mcu_rows = frame.mcu_rows();

    let mut dc_decoders: [Option<HuffmanDecodeTable>; 4] = Default::default();
    let mut ac_decoders: [Option<HuffmanDecodeTable>; 4] = Default::default();
    for (slot, table) in dc_decoders.iter_mut().zip(image.dc_tables.iter()) {
        if let Some(t) = table {
            *slot = Some(t.build_decode()?);
        }
    }
    for (slot, table) in ac_decoders.iter_mut().zip(image.ac_tables.iter()) {
        if let Some(t) = table {
            *slot = Some(t.build_decode()?);
        }
    }

    let mut components = Vec::with_capacity(frame.components.len());
    for component in &frame.components {
        let cols = mcu_cols * component.h_sampling as usize;
        let rows = mcu_rows * component.v_sampling as usize;
        components.push(ComponentPlane::new(cols, rows));
    }
    let mut plane = CoefficientPlane { components };

    let mut dc_predictors = vec![0i32; frame.components.len()];
    let mut reader = BitReader::new(&image.scan_data);
    let mut mcus_since_restart = 0u16;

    for mcu_row in 0..mcu_rows {
        for mcu_col in 0..mcu_cols {
            cancel::check(cancel)?;

            if image.restart_interval > 0 && mcus_since_restart == image.restart_interval {
                reader.consume_restart_marker()?;
                dc_predictors.iter_mut().for_each(|p| *p = 0);
                mcus_since_restart = 0;
            }

            for (ci, component) in frame.components.iter().enumerate() {
                let dc_table = dc_decoders[component.dc_table_id as usize]
                    .as_ref()
                    .ok_or(DctdmError::InvalidHuffmanCode {
                        class: crate::error::HuffmanClass::Dc,
                        id: component.dc_table_id,
                    })?;
                let ac_table = ac_decoders[component.ac_table_id as usize]
                    .as_ref()
                    .ok_or(DctdmError::InvalidHuffmanCode {
                        class: crate::error::HuffmanClass::Ac,
                        id: component.ac_table_id,
                    })?;

                for sub_v in 0..component.v_sampling as usize {
                    for sub_h in 0..component.h_sampling as usize {
                        let block = decode_block(
                            &mut reader,
                            dc_table,
                            ac_table,
                            &mut dc_predictors[ci],
                        )?;
                        let row = mcu_row * component.v_sampling as usize + sub_v;
                        let col = mcu_col * component.h_sampling as usize + sub_h;
                        *plane.component_mut(ci).block_mut(row, col) = block;
                    }
                }
            }

            mcus_since_restart += 1;
        }
    }

    trace!(
        "decoded scan: {}x{} MCUs, h_max={} v_max={}",
        mcu_cols,
        mcu_rows,
        h_max,
        v_max
    );
    Ok(plane)
}

fn decode_block(
    reader: &mut BitReader<'_>,
    dc_table: &HuffmanDecodeTable,
    ac_table: &HuffmanDecodeTable,
    dc_predictor: &mut i32,
) -> Result<[i16; 64]> {
    let mut block_zigzag = [0i16; 64];

    let size = dc_table.decode(reader)?;
    let diff = if size == 0 {
        0
    } else {
        let bits = reader.read_bits(size)?;
        receive_extend(bits, size)
    };
    *dc_predictor += diff;
    block_zigzag[0] = *dc_predictor as i16;

    let mut k = 1usize;
    while k < 64 {
        let rs = ac_table.decode(reader)?;
        let run = (rs >> 4) as usize;
        let size = rs & 0x0F;
        if rs == 0x00 {
            break; // EOB
        }
        if rs == 0xF0 {
            k += 16; // ZRL
            continue;
        }
        k += run;
        if k >= 64 {
            break;
        }
        let bits = reader.read_bits(size)?;
        block_zigzag[k] = receive_extend(bits, size) as i16;
        k += 1;
    }

    let _ = &ZIGZAG_TO_NATURAL; // natural order is never materialized on this path
    Ok(block_zigzag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::HuffmanTable;
    use crate::error::HuffmanClass;
    use crate::jpeg::segment::{Component, FrameHeader};

    fn standard_dc_luma() -> HuffmanTable {
        HuffmanTable::new(
            HuffmanClass::Dc,
            0,
            [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        )
    }

    fn standard_ac_luma() -> HuffmanTable {
        // A small, valid (not the full Annex K table) AC table: enough
        // symbols to cover EOB and a couple of short runs, used only to
        // exercise the decode loop structure in isolation.
        HuffmanTable::new(
            HuffmanClass::Ac,
            0,
            [0, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![0x00, 0x01, 0x11],
        )
    }

    #[test]
    fn decodes_single_zero_block_to_eob() {
        use crate::bitstream::BitWriter;
        let dc = standard_dc_luma().build_encode().unwrap();
        let ac = standard_ac_luma().build_encode().unwrap();
        let mut writer = BitWriter::new();
        dc.encode(&mut writer, 0).unwrap(); // DC size 0 -> diff 0
        ac.encode(&mut writer, 0x00).unwrap(); // EOB
        writer.flush_with_padding();
        let bytes = writer.into_bytes();

        let dc_dec = standard_dc_luma().build_decode().unwrap();
        let ac_dec = standard_ac_luma().build_decode().unwrap();
        let mut reader = BitReader::new(&bytes);
        let mut predictor = 0;
        let block = decode_block(&mut reader, &dc_dec, &ac_dec, &mut predictor).unwrap();
        assert_eq!(block, [0i16; 64]);
    }

    #[test]
    fn mcu_grid_dimensions_for_4_2_0() {
        let frame = FrameHeader {
            precision: 8,
            height: 16,
            width: 16,
            components: vec![
                Component {
                    id: 1,
                    h_sampling: 2,
                    v_sampling: 2,
                    quant_table_id: 0,
                    dc_table_id: 0,
                    ac_table_id: 0,
                },
                Component {
                    id: 2,
                    h_sampling: 1,
                    v_sampling: 1,
                    quant_table_id: 1,
                    dc_table_id: 0,
                    ac_table_id: 0,
                },
            ],
        };
        assert_eq!(frame.mcu_cols(), 1);
        assert_eq!(frame.mcu_rows(), 1);
        assert_eq!(frame.h_max(), 2);
    }
}
