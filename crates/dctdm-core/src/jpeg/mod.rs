//! Baseline JPEG parse/decode/encode/write, and the high-level operations
//! that tie the codec to the DCTDM engine and a payload transform.

mod decoder;
mod encoder;
mod marker;
mod parser;
pub mod plane;
mod segment;
mod writer;

pub use parser::parse_jpeg;
pub use plane::{CoefficientPlane, ComponentPlane};
pub use segment::{Component, FrameHeader, JpegImage, PreservedSegment, QuantTable};

use crate::cancel::CancellationToken;
use crate::config::EmbedConfig;
use crate::dctdm;
use crate::error::Result;
use crate::framing::Transform;

/// Decodes `cover`, embeds `payload` (after sealing it through `transform`)
/// using `config`, and re-encodes the result as a complete JPEG byte stream.
pub fn embed_in_jpeg(
    cover: &[u8],
    payload: &[u8],
    config: &EmbedConfig,
    transform: &dyn Transform,
    cancel: Option<&dyn CancellationToken>,
) -> Result<Vec<u8>> {
    let image = parser::parse_jpeg(cover)?;
    let mut plane = decoder::decode_scan(&image, cancel)?;
    let sealed = transform.seal(payload)?;
    dctdm::embed(&mut plane, image.frame(), &sealed, config, cancel)?;
    let scan_data = encoder::encode_scan(&image, &plane, cancel)?;
    Ok(writer::write_jpeg(&image, &scan_data))
}

/// Decodes `stego`, extracts the framed payload using `config`, and opens it
/// through `transform`.
pub fn extract_from_jpeg(
    stego: &[u8],
    config: &EmbedConfig,
    transform: &dyn Transform,
    cancel: Option<&dyn CancellationToken>,
) -> Result<Vec<u8>> {
    let image = parser::parse_jpeg(stego)?;
    let plane = decoder::decode_scan(&image, cancel)?;
    let sealed = dctdm::extract(&plane, image.frame(), config, cancel)?;
    transform.open(&sealed)
}

/// Usable payload capacity, in bytes, for embedding into `cover` under `config`.
pub fn jpeg_capacity(cover: &[u8], config: &EmbedConfig) -> Result<usize> {
    let image = parser::parse_jpeg(cover)?;
    let frame = image.frame();
    let id = config.component.unwrap_or(crate::config::DEFAULT_LUMA_COMPONENT);
    let component_index = frame
        .component_index(id)
        .ok_or(crate::error::DctdmError::UnknownComponent { component: id })?;
    Ok(dctdm::capacity(frame, config, component_index))
}
