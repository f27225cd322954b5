use std::fmt;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, DctdmError>;

/// Every way a parse, embed, extract, or control-flow operation can fail.
///
/// Variants are grouped the way the design groups them: segment/entropy
/// parsing, embedding, extraction, and cooperative cancellation. A
/// passphrase-based transform lives in a separate crate and reports its own
/// errors through [`DctdmError::Transform`].
#[derive(thiserror::Error)]
pub enum DctdmError {
    /// The entropy reader ran out of bits while decoding a symbol.
    #[error("unexpected end of entropy stream at byte offset {offset}")]
    UnexpectedEndOfStream { offset: usize },

    /// A marker byte did not match any known JPEG marker.
    #[error("invalid marker byte 0x{byte:02X} at offset {offset}")]
    InvalidMarker { byte: u8, offset: usize },

    /// A Huffman-coded symbol had no assignment in the active table.
    #[error("invalid huffman code in table (class={class:?}, id={id})")]
    InvalidHuffmanCode { class: HuffmanClass, id: u8 },

    /// A segment's declared length did not agree with its contents.
    #[error("invalid segment length for marker 0x{marker:02X}: declared {declared}, available {available}")]
    InvalidSegmentLength {
        marker: u8,
        declared: usize,
        available: usize,
    },

    /// A restart interval boundary was reached without an `RSTn` marker.
    #[error("expected restart marker after MCU {mcu_index}, found none")]
    MissingRestartMarker { mcu_index: usize },

    /// The frame header named something other than SOF0 (baseline sequential).
    #[error("unsupported SOF marker 0x{marker:02X}; only baseline sequential (SOF0) is supported")]
    UnsupportedMode { marker: u8 },

    /// The frame header declared a sample precision other than 8 bits.
    #[error("unsupported sample precision {precision} bits; only 8-bit precision is supported")]
    UnsupportedPrecision { precision: u8 },

    /// The stream used arithmetic entropy coding instead of Huffman coding.
    #[error("arithmetic-coded JPEGs are not supported")]
    UnsupportedArithmeticCoding,

    /// The payload plus its 4-byte length header does not fit in the carrier's capacity.
    #[error("payload of {payload_len} bytes (+4 byte header) exceeds capacity of {capacity} bytes")]
    PayloadTooLarge { payload_len: usize, capacity: usize },

    /// Too many coefficient pairs required clamping to faithfully represent the message.
    #[error("clamping exhausted usable pairs: needed {needed} more pairs, only {available} remained unclamped")]
    ClampingExhausted { needed: usize, available: usize },

    /// The coefficient plane ran out before the declared payload length was fully read.
    #[error("payload truncated: declared {declared} bytes, only {available} bytes of carrier remained")]
    PayloadTruncated { declared: usize, available: usize },

    /// The decoded length prefix is larger than the carrier could possibly hold.
    #[error("declared payload length {declared} exceeds remaining carrier capacity of {capacity}")]
    InvalidLength { declared: usize, capacity: usize },

    /// The configured component id does not appear in the frame header.
    #[error("component id {component} is not present in the frame header")]
    UnknownComponent { component: u8 },

    /// `pairs_per_block` was zero, odd, or otherwise not a valid K.
    #[error("invalid pairs_per_block value {value}: must be even and at least 2")]
    InvalidConfig { value: usize },

    /// Raised by a passphrase transform; boxed so this crate never names a crypto crate.
    #[error("payload transform failed: {0}")]
    Transform(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A caller-supplied cancellation token tripped mid-operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// DC or AC Huffman table class, used only to annotate errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanClass {
    Dc,
    Ac,
}

// Use Display for Debug so `unwrap()`/`expect()` panics print the friendly message.
impl fmt::Debug for DctdmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
