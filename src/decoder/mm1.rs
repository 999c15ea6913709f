//! MM1 decoder for list-mode mapping captures
//!
//! Walks a capture produced by a multi-channel pulse processor in mapping
//! mode 1 and validates every record as it goes.
//!
//! # Data Format
//!
//! The capture is a concatenation of groups:
//! Buffer Header → Pixel Record × pixel_count
//!
//! - No file header, footer or end marker: the stream ends at the first
//!   position that does not carry the buffer tag pair.
//! - Records are sized in 16-bit halves and always start on a word.
//! - Pixel numbers on each detector channel run 0, 1, 2, ... across all
//!   buffers, independently of the other channels.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::common::{BufferHeader, PixelRecord};
use super::error::DecodeError;
use super::frame::{FrameCursor, WordFrame};

/// Number of detector channels a capture may address
pub const MAX_CHANNELS: usize = 8;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

mod constants {
    /// Only acquisition mode accepted
    pub const MAPPING_MODE: u16 = 1;

    pub mod buffer_header {
        pub const TAG_LO: u16 = 0x55AA;
        pub const TAG_HI: u16 = 0xAA55;
        /// Halves needed to read every field up to the detector channel
        pub const MIN_SIZE_HALVES: u16 = 13;
        /// Smallest header size that moves the cursor by a word
        pub const MIN_ADVANCE_HALVES: u16 = 2;

        // Half-word indices
        pub const TAG_LO_INDEX: usize = 0;
        pub const TAG_HI_INDEX: usize = 1;
        pub const HEADER_SIZE: usize = 2;
        pub const MODE: usize = 3;
        pub const RUN_NUMBER: usize = 4;
        pub const BUFFER_NUMBER: usize = 5;
        pub const BUFFER_ID: usize = 7;
        pub const PIXEL_COUNT: usize = 8;
        pub const START_PIXEL: usize = 9;
        pub const DET_CHAN: usize = 12;
    }

    pub mod pixel {
        pub const TAG_LO: u16 = 0x33CC;
        pub const TAG_HI: u16 = 0xCC33;
        /// Halves needed to read every statistics field
        pub const MIN_SIZE_HALVES: u16 = 40;

        // Half-word indices
        pub const TAG_LO_INDEX: usize = 0;
        pub const TAG_HI_INDEX: usize = 1;
        pub const HEADER_SIZE: usize = 2;
        pub const MODE: usize = 3;
        pub const PIXEL_NUMBER: usize = 4;
        pub const BLOCK_SIZE: usize = 6;
        pub const CHANNEL_DATA_SIZE: usize = 8;
        pub const REALTIME: usize = 32;
        pub const LIVETIME: usize = 34;
        pub const TRIGGERS: usize = 36;
        pub const OUTPUT_EVENTS: usize = 38;
    }
}

// ---------------------------------------------------------------------------
// Configuration & events
// ---------------------------------------------------------------------------

/// MM1 decoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Also require each pixel's own mode field to be 1
    ///
    /// When disabled only the owning buffer's mode is checked.
    pub strict_pixel_mode: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            strict_pixel_mode: true,
        }
    }
}

/// One validated item of the capture
#[derive(Debug, Clone, PartialEq)]
pub enum Mm1Event<'a> {
    Buffer(BufferHeader),
    Pixel(PixelRecord<'a>),
    /// Bytes left after the last buffer group; informational only
    TrailingBytes { offset: usize, remaining: usize },
}

/// Everything decoded from a capture that validated cleanly
#[derive(Debug, Clone, Default)]
pub struct DecodeReport<'a> {
    pub buffers: Vec<BufferHeader>,
    pub pixels: Vec<PixelRecord<'a>>,
    pub trailing_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Next record must be a buffer header (or the stream ends)
    ExpectBuffer,
    /// Pixels still owed by the current buffer header
    ExpectPixels {
        remaining: u16,
        det_chan: u16,
        mode: u16,
    },
    Finished,
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Forward-only MM1 decoder
///
/// Yields buffer headers, pixel records and a final trailing-bytes notice.
/// The first structural error is yielded once and ends the iteration.
pub struct Mm1Decoder<'a> {
    frame: WordFrame<'a>,
    cursor: FrameCursor,
    config: DecoderConfig,
    expected_pixel: [u32; MAX_CHANNELS],
    state: DecodeState,
    trailing_bytes: Option<usize>,
}

impl<'a> Mm1Decoder<'a> {
    /// Create a decoder over a complete capture
    pub fn new(data: &'a [u8], config: DecoderConfig) -> Self {
        Self {
            frame: WordFrame::new(data),
            cursor: FrameCursor::new(),
            config,
            expected_pixel: [0; MAX_CHANNELS],
            state: DecodeState::ExpectBuffer,
            trailing_bytes: None,
        }
    }

    /// Create a decoder with default configuration
    pub fn with_defaults(data: &'a [u8]) -> Self {
        Self::new(data, DecoderConfig::default())
    }

    /// Next pixel number expected on `det_chan`
    pub fn expected_pixel(&self, det_chan: usize) -> Option<u32> {
        self.expected_pixel.get(det_chan).copied()
    }

    /// Current byte offset of the cursor
    pub fn offset(&self) -> usize {
        self.cursor.byte_offset()
    }

    /// Unconsumed byte count, known once the stream has ended cleanly
    pub fn trailing_bytes(&self) -> Option<usize> {
        self.trailing_bytes
    }

    /// Decode the whole capture, stopping at the first error
    pub fn decode_all(mut self) -> Result<DecodeReport<'a>, DecodeError> {
        let mut report = DecodeReport::default();
        for event in &mut self {
            match event? {
                Mm1Event::Buffer(header) => report.buffers.push(header),
                Mm1Event::Pixel(pixel) => report.pixels.push(pixel),
                Mm1Event::TrailingBytes { .. } => {}
            }
        }
        report.trailing_bytes = self.trailing_bytes.unwrap_or(0);
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Buffer level
    // -----------------------------------------------------------------------

    /// Parse one buffer header; `Ok(None)` marks the end of the stream
    fn parse_buffer_header(&mut self) -> Result<Option<BufferHeader>, DecodeError> {
        use constants::buffer_header as bh;

        let at = self.cursor.word();
        let offset = self.cursor.byte_offset();

        if self.frame.halves_from(at) < 2 {
            return Ok(None);
        }
        let tag_lo = self.frame.read16(at, bh::TAG_LO_INDEX)?;
        let tag_hi = self.frame.read16(at, bh::TAG_HI_INDEX)?;
        if tag_lo != bh::TAG_LO || tag_hi != bh::TAG_HI {
            return Ok(None);
        }

        self.frame.ensure_halves(at, bh::MIN_SIZE_HALVES as usize)?;

        let header = BufferHeader {
            offset,
            header_size: self.frame.read16(at, bh::HEADER_SIZE)?,
            mode: self.frame.read16(at, bh::MODE)?,
            run_number: self.frame.read16(at, bh::RUN_NUMBER)?,
            buffer_number: self.frame.read32(at, bh::BUFFER_NUMBER)?,
            buffer_id: self.frame.read16(at, bh::BUFFER_ID)?,
            pixel_count: self.frame.read16(at, bh::PIXEL_COUNT)?,
            start_pixel: self.frame.read32(at, bh::START_PIXEL)?,
            det_chan: self.frame.read16(at, bh::DET_CHAN)?,
        };

        if header.mode != constants::MAPPING_MODE {
            return Err(DecodeError::BadMode {
                offset,
                mode: header.mode,
            });
        }
        if header.buffer_id > 1 {
            return Err(DecodeError::BadBufferId {
                offset,
                buffer_id: header.buffer_id,
            });
        }
        let expected = self.expected_for(offset, header.det_chan)?;
        if header.start_pixel != expected {
            return Err(DecodeError::PixelOrderViolation {
                offset,
                det_chan: header.det_chan,
                expected,
                found: header.start_pixel,
            });
        }
        // A header that advances by zero words would be parsed forever
        if header.header_size < bh::MIN_ADVANCE_HALVES {
            return Err(DecodeError::BadHeaderSize {
                offset,
                header_size: header.header_size,
                minimum: bh::MIN_ADVANCE_HALVES,
            });
        }

        self.cursor.advance(&self.frame, header.header_size as usize)?;

        debug!(
            offset,
            buffer = header.buffer_number,
            det_chan = header.det_chan,
            pixels = header.pixel_count,
            start_pixel = header.start_pixel,
            "buffer header"
        );

        Ok(Some(header))
    }

    /// Expected pixel number for `det_chan`, rejecting unknown channels
    fn expected_for(&self, offset: usize, det_chan: u16) -> Result<u32, DecodeError> {
        self.expected_pixel
            .get(det_chan as usize)
            .copied()
            .ok_or(DecodeError::ChannelOutOfRange {
                offset,
                det_chan,
                max: MAX_CHANNELS,
            })
    }

    // -----------------------------------------------------------------------
    // Pixel level
    // -----------------------------------------------------------------------

    fn parse_pixel(
        &mut self,
        det_chan: u16,
        buffer_mode: u16,
    ) -> Result<PixelRecord<'a>, DecodeError> {
        use constants::pixel as px;

        let at = self.cursor.word();
        let offset = self.cursor.byte_offset();

        self.frame.ensure_halves(at, 2)?;
        let tag_lo = self.frame.read16(at, px::TAG_LO_INDEX)?;
        let tag_hi = self.frame.read16(at, px::TAG_HI_INDEX)?;
        if tag_lo != px::TAG_LO || tag_hi != px::TAG_HI {
            return Err(DecodeError::BadPixelTag {
                offset,
                tag_lo,
                tag_hi,
            });
        }

        self.frame.ensure_halves(at, px::MIN_SIZE_HALVES as usize)?;

        let header_size = self.frame.read16(at, px::HEADER_SIZE)?;
        let mode = self.frame.read16(at, px::MODE)?;
        let pixel_number = self.frame.read32(at, px::PIXEL_NUMBER)?;
        let block_size = self.frame.read32(at, px::BLOCK_SIZE)?;
        let channel_data_size = self.frame.read16(at, px::CHANNEL_DATA_SIZE)?;

        if buffer_mode != constants::MAPPING_MODE {
            return Err(DecodeError::BadMode {
                offset,
                mode: buffer_mode,
            });
        }
        if self.config.strict_pixel_mode && mode != constants::MAPPING_MODE {
            return Err(DecodeError::BadMode { offset, mode });
        }

        let expected = self.expected_for(offset, det_chan)?;
        if pixel_number != expected {
            return Err(DecodeError::PixelOrderViolation {
                offset,
                det_chan,
                expected,
                found: pixel_number,
            });
        }

        let consistent = block_size / 2 != 0
            && block_size
                .checked_sub(header_size as u32)
                .is_some_and(|data| data == channel_data_size as u32);
        if !consistent {
            return Err(DecodeError::SizeMismatch {
                offset,
                block_size,
                header_size,
                channel_data_size,
            });
        }

        self.frame.ensure_halves(at, block_size as usize)?;

        let pixel = PixelRecord {
            offset,
            det_chan,
            header_size,
            mode,
            pixel_number,
            block_size,
            channel_data_size,
            realtime_ticks: self.frame.read32(at, px::REALTIME)?,
            livetime_ticks: self.frame.read32(at, px::LIVETIME)?,
            triggers: self.frame.read32(at, px::TRIGGERS)?,
            output_events: self.frame.read32(at, px::OUTPUT_EVENTS)?,
            spectrum: self
                .frame
                .spectrum(at, header_size as usize, channel_data_size as usize)?,
        };

        self.cursor.advance(&self.frame, block_size as usize)?;
        self.expected_pixel[det_chan as usize] = expected.wrapping_add(1);

        debug!(
            offset,
            det_chan,
            pixel = pixel.pixel_number,
            bins = pixel.spectrum.len(),
            icr = pixel.input_count_rate(),
            ocr = pixel.output_count_rate(),
            dead_time = pixel.dead_time_percent(),
            "pixel record"
        );

        Ok(pixel)
    }

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    fn finish(&mut self) -> Option<Mm1Event<'a>> {
        self.state = DecodeState::Finished;
        let offset = self.cursor.byte_offset();
        let remaining = self.frame.len_bytes() - offset;
        self.trailing_bytes = Some(remaining);

        if remaining == 0 {
            info!(offset, "end of capture");
            return None;
        }
        warn!(offset, remaining, "trailing bytes after last buffer");
        Some(Mm1Event::TrailingBytes { offset, remaining })
    }

    fn fail(&mut self, err: DecodeError) -> Option<Result<Mm1Event<'a>, DecodeError>> {
        self.state = DecodeState::Finished;
        debug!(offset = err.offset(), kind = err.kind(), "decode stopped");
        Some(Err(err))
    }
}

impl<'a> Iterator for Mm1Decoder<'a> {
    type Item = Result<Mm1Event<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            DecodeState::Finished => None,
            DecodeState::ExpectBuffer => match self.parse_buffer_header() {
                Ok(Some(header)) => {
                    if header.pixel_count > 0 {
                        self.state = DecodeState::ExpectPixels {
                            remaining: header.pixel_count,
                            det_chan: header.det_chan,
                            mode: header.mode,
                        };
                    }
                    Some(Ok(Mm1Event::Buffer(header)))
                }
                Ok(None) => self.finish().map(Ok),
                Err(err) => self.fail(err),
            },
            DecodeState::ExpectPixels {
                remaining,
                det_chan,
                mode,
            } => match self.parse_pixel(det_chan, mode) {
                Ok(pixel) => {
                    self.state = if remaining > 1 {
                        DecodeState::ExpectPixels {
                            remaining: remaining - 1,
                            det_chan,
                            mode,
                        }
                    } else {
                        DecodeState::ExpectBuffer
                    };
                    Some(Ok(Mm1Event::Pixel(pixel)))
                }
                Err(err) => self.fail(err),
            },
        }
    }
}

impl std::iter::FusedIterator for Mm1Decoder<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
