//! Structural errors raised while walking an MM1 capture
//!
//! Every variant carries the byte offset of the record that failed so the
//! caller can point at it. Decoding never resynchronises after an error.

use thiserror::Error;

/// MM1 decode errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A record extends past the end of the capture
    #[error(
        "record needs {needed} halves but only {available} remain at offset 0x{offset:08x}"
    )]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Buffer or pixel mode is not mapping mode 1
    #[error("unsupported mode {mode} (expected 1) at offset 0x{offset:08x}")]
    BadMode { offset: usize, mode: u16 },

    /// Buffer id outside {0, 1}
    #[error("invalid buffer id {buffer_id} (expected 0 or 1) at offset 0x{offset:08x}")]
    BadBufferId { offset: usize, buffer_id: u16 },

    /// Detector channel beyond the supported channel count
    #[error("detector channel {det_chan} out of range (max {max}) at offset 0x{offset:08x}")]
    ChannelOutOfRange {
        offset: usize,
        det_chan: u16,
        max: usize,
    },

    /// Pixel numbering on a channel is not contiguous
    #[error(
        "pixel {found} on detChan {det_chan} out of order (expected {expected}) at offset 0x{offset:08x}"
    )]
    PixelOrderViolation {
        offset: usize,
        det_chan: u16,
        expected: u32,
        found: u32,
    },

    /// Pixel record tag words missing
    #[error("bad pixel tag 0x{tag_lo:04x} 0x{tag_hi:04x} at offset 0x{offset:08x}")]
    BadPixelTag {
        offset: usize,
        tag_lo: u16,
        tag_hi: u16,
    },

    /// Pixel block size disagrees with header and channel-data sizes
    #[error(
        "size mismatch: block {block_size} - header {header_size} != channel data {channel_data_size} at offset 0x{offset:08x}"
    )]
    SizeMismatch {
        offset: usize,
        block_size: u32,
        header_size: u16,
        channel_data_size: u16,
    },

    /// Declared header size smaller than the fields the header carries
    #[error("header size {header_size} below minimum {minimum} at offset 0x{offset:08x}")]
    BadHeaderSize {
        offset: usize,
        header_size: u16,
        minimum: u16,
    },
}

impl DecodeError {
    /// Byte offset of the offending record
    pub fn offset(&self) -> usize {
        match *self {
            Self::OutOfBounds { offset, .. }
            | Self::BadMode { offset, .. }
            | Self::BadBufferId { offset, .. }
            | Self::ChannelOutOfRange { offset, .. }
            | Self::PixelOrderViolation { offset, .. }
            | Self::BadPixelTag { offset, .. }
            | Self::SizeMismatch { offset, .. }
            | Self::BadHeaderSize { offset, .. } => offset,
        }
    }

    /// Short name of the error kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "OutOfBounds",
            Self::BadMode { .. } => "BadMode",
            Self::BadBufferId { .. } => "BadBufferId",
            Self::ChannelOutOfRange { .. } => "ChannelOutOfRange",
            Self::PixelOrderViolation { .. } => "PixelOrderViolation",
            Self::BadPixelTag { .. } => "BadPixelTag",
            Self::SizeMismatch { .. } => "SizeMismatch",
            Self::BadHeaderSize { .. } => "BadHeaderSize",
        }
    }
}
