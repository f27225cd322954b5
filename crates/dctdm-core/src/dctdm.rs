//! DCT Difference Modulation: embeds and extracts payload bits in the
//! differences between pairs of AC coefficients of a targeted component.

use log::{debug, trace};

use crate::cancel::{self, CancellationToken};
use crate::config::{EmbedConfig, DEFAULT_LUMA_COMPONENT};
use crate::error::{DctdmError, Result};
use crate::jpeg::plane::CoefficientPlane;
use crate::jpeg::segment::FrameHeader;

const COEFF_MIN: i32 = -1024;
const COEFF_MAX: i32 = 1023;
const LENGTH_HEADER_BYTES: usize = 4;

fn resolve_component_index(frame: &FrameHeader, config: &EmbedConfig) -> Result<usize> {
    let id = config.component.unwrap_or(DEFAULT_LUMA_COMPONENT);
    frame
        .component_index(id)
        .ok_or(DctdmError::UnknownComponent { component: id })
}

fn zigzag_pairs(config: &EmbedConfig) -> Vec<(usize, usize)> {
    (1..=config.pairs_per_block)
        .step_by(2)
        .map(|z| (z, z + 1))
        .collect()
}

/// Number of whole payload bytes (after the 4-byte length header) the carrier
/// can hold, assuming no pair is skipped for clamping.
pub fn capacity(frame: &FrameHeader, config: &EmbedConfig, component_index: usize) -> usize {
    let plane_blocks = {
        let component = &frame.components[component_index];
        let cols = frame.mcu_cols() * component.h_sampling as usize;
        let rows = frame.mcu_rows() * component.v_sampling as usize;
        cols * rows
    };
    // Each pair carries two bits (b1, b2), so this is `plane_blocks * pairs_per_block`.
    let total_bits = plane_blocks * config.pairs() * 2;
    let total_bytes = total_bits / 8;
    total_bytes.saturating_sub(LENGTH_HEADER_BYTES)
}

/// Round-half-to-even division, matching the JPEG-adjacent convention used
/// for recomputing `k = round(D/delta)` at embed time.
fn round_half_even_div(d: i32, delta: i32) -> i32 {
    let delta = delta as i64;
    let d = d as i64;
    let q = d.div_euclid(delta);
    let r = d.rem_euclid(delta);
    let twice = r * 2;
    let k = if twice < delta {
        q
    } else if twice > delta {
        q + 1
    } else if q % 2 == 0 {
        q
    } else {
        q + 1
    };
    k as i32
}

fn ceil_div2(a: i32) -> i32 {
    if a >= 0 {
        (a + 1) / 2
    } else {
        a / 2
    }
}

fn floor_div2(a: i32) -> i32 {
    if a >= 0 {
        a / 2
    } else {
        (a - 1) / 2
    }
}

/// The four candidate target differences for the bucket `d` currently falls
/// in, in `(0,0) (0,1) (1,0) (1,1)` order. Depends only on `d` and `delta`,
/// never on which bits are being embedded.
fn pair_targets(d: i32, delta: i32) -> [i32; 4] {
    let eps1 = delta / 4;
    let eps2 = (3 * delta) / 4;
    let k = round_half_even_div(d, delta);
    [k * delta + eps1, k * delta + eps2, k * delta - eps2, k * delta - eps1]
}

/// Whether modifying this pair towards *any* of its four candidate targets
/// would require clamping. Evaluated purely from the pair's own coefficients
/// so embed and extract reach the same verdict without needing to agree on
/// which bits (if any) the pair carries: a pair embed skips for this reason
/// is left with its original coefficients, so extract sees the same `ac1`,
/// `ac2` and skips it too.
fn pair_would_clamp(ac1: i32, ac2: i32, delta: i32) -> bool {
    let d = ac1 - ac2;
    pair_targets(d, delta).iter().any(|&target| {
        let diff = target - d;
        let proposed_ac1 = ac1 + ceil_div2(diff);
        let proposed_ac2 = ac2 - floor_div2(diff);
        proposed_ac1.clamp(COEFF_MIN, COEFF_MAX) != proposed_ac1
            || proposed_ac2.clamp(COEFF_MIN, COEFF_MAX) != proposed_ac2
    })
}

struct BitProducer<'a> {
    bytes: &'a [u8],
    byte_index: usize,
    bit_index: u8,
}

impl<'a> BitProducer<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitProducer {
            bytes,
            byte_index: 0,
            bit_index: 0,
        }
    }

    fn next_bit(&mut self) -> Option<u8> {
        if self.byte_index >= self.bytes.len() {
            return None;
        }
        let byte = self.bytes[self.byte_index];
        let bit = (byte >> (7 - self.bit_index)) & 1;
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.byte_index += 1;
        }
        Some(bit)
    }

    fn is_exhausted(&self) -> bool {
        self.byte_index >= self.bytes.len()
    }
}

struct BitConsumer {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitConsumer {
    fn new() -> Self {
        BitConsumer {
            bytes: Vec::new(),
            current: 0,
            filled: 0,
        }
    }

    fn push_bit(&mut self, bit: u8) {
        self.current = (self.current << 1) | (bit & 1);
        self.filled += 1;
        if self.filled == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }
}

/// Embeds `payload` (preceded by its 4-byte big-endian length) into the
/// targeted component's AC coefficient pairs, in place.
pub fn embed(
    plane: &mut CoefficientPlane,
    frame: &FrameHeader,
    payload: &[u8],
    config: &EmbedConfig,
    cancel: Option<&dyn CancellationToken>,
) -> Result<()> {
    config.validate()?;
    let component_index = resolve_component_index(frame, config)?;
    let cap = capacity(frame, config, component_index);
    if payload.len() > cap {
        return Err(DctdmError::PayloadTooLarge {
            payload_len: payload.len(),
            capacity: cap,
        });
    }

    let mut framed = Vec::with_capacity(LENGTH_HEADER_BYTES + payload.len());
    framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    framed.extend_from_slice(payload);

    let pairs = zigzag_pairs(config);
    let mut bits = BitProducer::new(&framed);
    let mut clamped_pairs = 0usize;
    let mut pair_index = 0usize;

    let component = plane.component_mut(component_index);
    'blocks: for row in 0..component.rows {
        for col in 0..component.cols {
            cancel::check(cancel)?;
            let block = component.block_mut(row, col);
            for &(z1, z2) in &pairs {
                if bits.is_exhausted() {
                    break 'blocks;
                }
                let ac1 = block[z1] as i32;
                let ac2 = block[z2] as i32;
                if config.skip_zero_pairs && ac1 == 0 && ac2 == 0 {
                    pair_index += 1;
                    continue;
                }

                let delta = config.delta as i32;

                // The clamp/skip verdict is decided from the pair's own
                // coefficients before any bit is read: a skipped pair keeps
                // its original ac1/ac2, so extract can reach the same
                // verdict from the coefficients it observes without ever
                // needing to know which bits would have been embedded.
                if pair_would_clamp(ac1, ac2, delta) {
                    clamped_pairs += 1;
                    pair_index += 1;
                    continue;
                }

                let b1 = bits.next_bit().unwrap_or(0);
                let b2 = bits.next_bit().unwrap_or(0);

                let eps1 = delta / 4;
                let eps2 = (3 * delta) / 4;
                let d = ac1 - ac2;
                let k = round_half_even_div(d, delta);
                let target = match (b1, b2) {
                    (0, 0) => k * delta + eps1,
                    (0, 1) => k * delta + eps2,
                    (1, 0) => k * delta - eps2,
                    _ => k * delta - eps1,
                };
                let diff = target - d;
                let proposed_ac1 = ac1 + ceil_div2(diff);
                let proposed_ac2 = ac2 - floor_div2(diff);

                // pair_would_clamp already established that every candidate
                // target for this pair fits in range, so this is a no-op;
                // kept as a defensive bound rather than trusted blindly.
                block[z1] = proposed_ac1.clamp(COEFF_MIN, COEFF_MAX) as i16;
                block[z2] = proposed_ac2.clamp(COEFF_MIN, COEFF_MAX) as i16;
                pair_index += 1;
            }
        }
    }

    if !bits.is_exhausted() {
        let remaining_bits = (framed.len() - bits.byte_index) * 8 - bits.bit_index as usize;
        return Err(DctdmError::ClampingExhausted {
            needed: (remaining_bits + 7) / 8,
            available: 0,
        });
    }

    debug!(
        "embedded {} payload bytes across {} pairs ({} clamped)",
        payload.len(),
        pair_index,
        clamped_pairs
    );
    Ok(())
}

/// Extracts a length-prefixed payload from the targeted component's AC
/// coefficient pairs.
pub fn extract(
    plane: &CoefficientPlane,
    frame: &FrameHeader,
    config: &EmbedConfig,
    cancel: Option<&dyn CancellationToken>,
) -> Result<Vec<u8>> {
    config.validate()?;
    let component_index = resolve_component_index(frame, config)?;
    let pairs = zigzag_pairs(config);
    let component = plane.component(component_index);

    let delta = config.delta as i32;
    let eps1 = delta / 4;
    let eps2 = (3 * delta) / 4;
    let targets = [
        (eps1.rem_euclid(delta), (0u8, 0u8)),
        (eps2.rem_euclid(delta), (0u8, 1u8)),
        ((delta - eps2).rem_euclid(delta), (1u8, 0u8)),
        ((delta - eps1).rem_euclid(delta), (1u8, 1u8)),
    ];

    let mut consumer = BitConsumer::new();
    let mut header = [0u8; LENGTH_HEADER_BYTES];
    let mut header_filled = 0usize;
    let mut declared_len: Option<usize> = None;
    let mut payload_out = Vec::new();

    'blocks: for row in 0..component.rows {
        for col in 0..component.cols {
            cancel::check(cancel)?;
            let block = component.block(row, col);
            for &(z1, z2) in &pairs {
                let ac1 = block[z1] as i32;
                let ac2 = block[z2] as i32;
                if config.skip_zero_pairs && ac1 == 0 && ac2 == 0 {
                    continue;
                }
                if pair_would_clamp(ac1, ac2, delta) {
                    continue;
                }

                let d = ac1 - ac2;
                let p = d.rem_euclid(delta);
                let (_, &(b1, b2)) = targets
                    .iter()
                    .map(|&(t, bits)| {
                        let dist = (p - t).rem_euclid(delta).min((t - p).rem_euclid(delta));
                        (dist, &bits)
                    })
                    .min_by_key(|&(dist, _)| dist)
                    .expect("targets is non-empty");

                for bit in [b1, b2] {
                    if header_filled < LENGTH_HEADER_BYTES * 8 {
                        let byte_idx = header_filled / 8;
                        let bit_idx = header_filled % 8;
                        header[byte_idx] |= bit << (7 - bit_idx);
                        header_filled += 1;
                        if header_filled == LENGTH_HEADER_BYTES * 8 {
                            declared_len = Some(u32::from_be_bytes(header) as usize);
                        }
                    } else {
                        consumer.push_bit(bit);
                        if let Some(len) = declared_len {
                            if consumer.bytes.len() >= len {
                                payload_out = consumer.bytes[..len].to_vec();
                                break 'blocks;
                            }
                        }
                    }
                }
            }
        }
    }

    let declared_len = declared_len.ok_or(DctdmError::PayloadTruncated {
        declared: LENGTH_HEADER_BYTES,
        available: header_filled / 8,
    })?;

    let cap = capacity(frame, config, component_index);
    if declared_len > cap {
        return Err(DctdmError::InvalidLength {
            declared: declared_len,
            capacity: cap,
        });
    }

    if payload_out.len() < declared_len {
        return Err(DctdmError::PayloadTruncated {
            declared: declared_len,
            available: consumer.bytes.len(),
        });
    }

    trace!("extracted {} payload bytes", payload_out.len());
    Ok(payload_out)
}
