//! Record types produced by the MM1 decoder

use std::fmt;

use super::frame::{HALVES_PER_WORD, WORD_SIZE};

/// Seconds per realtime/livetime tick (3.2e-7 s)
pub const TICK_SECONDS: f64 = 3.2e-7;

/// Buffer Header: opens a group of `pixel_count` pixel records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferHeader {
    /// Byte offset of the header in the capture
    pub offset: usize,
    /// Declared header size (halves)
    pub header_size: u16,
    pub mode: u16,
    pub run_number: u16,
    pub buffer_number: u32,
    /// 0 = buffer A, 1 = buffer B
    pub buffer_id: u16,
    pub pixel_count: u16,
    /// First pixel number carried by this buffer
    pub start_pixel: u32,
    pub det_chan: u16,
}

impl BufferHeader {
    /// 'A' for buffer 0, 'B' for buffer 1
    pub fn id_letter(&self) -> char {
        if self.buffer_id == 0 {
            'A'
        } else {
            'B'
        }
    }

    /// Bytes the cursor advances past this header
    pub fn byte_len(&self) -> usize {
        (self.header_size as usize / HALVES_PER_WORD) * WORD_SIZE
    }
}

impl fmt::Display for BufferHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BUFFER: [0x{:08x}:0x{:08x}] num:{} id:{} detChan:{} pixels:{} pixel:{}",
            self.offset,
            self.offset + self.byte_len(),
            self.buffer_number,
            self.id_letter(),
            self.det_chan,
            self.pixel_count,
            self.start_pixel
        )
    }
}

/// Pixel Record: one spectrum acquisition on one detector channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelRecord<'a> {
    /// Byte offset of the record in the capture
    pub offset: usize,
    /// Channel inherited from the owning buffer header
    pub det_chan: u16,
    /// Pixel header size (halves)
    pub header_size: u16,
    pub mode: u16,
    pub pixel_number: u32,
    /// Total record length (halves)
    pub block_size: u32,
    /// Spectrum payload length (halves)
    pub channel_data_size: u16,
    pub realtime_ticks: u32,
    pub livetime_ticks: u32,
    pub triggers: u32,
    pub output_events: u32,
    pub spectrum: Spectrum<'a>,
}

impl PixelRecord<'_> {
    pub fn realtime_seconds(&self) -> f64 {
        self.realtime_ticks as f64 * TICK_SECONDS
    }

    pub fn livetime_seconds(&self) -> f64 {
        self.livetime_ticks as f64 * TICK_SECONDS
    }

    /// Bytes the cursor advances past this record
    pub fn byte_len(&self) -> usize {
        (self.block_size as usize / HALVES_PER_WORD) * WORD_SIZE
    }

    /// Triggers per second of livetime (0 when livetime is 0)
    pub fn input_count_rate(&self) -> f64 {
        rate(self.triggers, self.livetime_seconds())
    }

    /// Output events per second of realtime (0 when realtime is 0)
    pub fn output_count_rate(&self) -> f64 {
        rate(self.output_events, self.realtime_seconds())
    }

    /// Dead time as a percentage of realtime
    pub fn dead_time_percent(&self) -> f64 {
        if self.realtime_ticks == 0 {
            return 0.0;
        }
        let dead = self.realtime_ticks.saturating_sub(self.livetime_ticks);
        dead as f64 / self.realtime_ticks as f64 * 100.0
    }
}

impl fmt::Display for PixelRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PIXEL: [0x{:08x}:0x{:08x}] num:{} size:{} chsize:{} realtime:{:.6} livetime:{:.6} triggers:{} output-events:{}",
            self.offset,
            self.offset + self.byte_len(),
            self.pixel_number,
            self.block_size,
            self.channel_data_size,
            self.realtime_seconds(),
            self.livetime_seconds(),
            self.triggers,
            self.output_events
        )
    }
}

fn rate(count: u32, seconds: f64) -> f64 {
    if seconds > 0.0 {
        count as f64 / seconds
    } else {
        0.0
    }
}

/// Spectrum payload borrowed from the capture (32-bit LE bin counts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spectrum<'a> {
    bytes: &'a [u8],
}

impl<'a> Spectrum<'a> {
    /// `bytes` must hold whole 32-bit words; a ragged tail is ignored
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.bytes.len() / WORD_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, bin: usize) -> Option<u32> {
        let start = bin.checked_mul(WORD_SIZE)?;
        let chunk = self.bytes.get(start..start.checked_add(WORD_SIZE)?)?;
        Some(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        self.bytes
            .chunks_exact(WORD_SIZE)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Sum of all bins
    pub fn total_counts(&self) -> u64 {
        self.iter().map(u64::from).sum()
    }
}
