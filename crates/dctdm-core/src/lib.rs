//! Baseline JPEG codec and DCT Difference Modulation steganography engine.
//!
//! The public surface is intentionally small: parse/decode/encode a baseline
//! JPEG into an owned coefficient plane, embed or extract a length-prefixed
//! payload in that plane's AC coefficients, and re-serialize it. Everything
//! else (passphrase sealing, CLI ergonomics) lives in sibling crates that
//! depend on this one, never the reverse.

pub mod bitstream;
pub mod cancel;
pub mod config;
pub mod dctdm;
pub mod error;
pub mod framing;
pub mod huffman;
pub mod jpeg;

pub use cancel::{CancellationToken, NeverCancelled};
pub use config::EmbedConfig;
pub use error::{DctdmError, Result};
pub use framing::{Identity, Transform};
pub use jpeg::{embed_in_jpeg, extract_from_jpeg, jpeg_capacity, JpegImage};
