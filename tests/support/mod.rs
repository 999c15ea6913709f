//! Synthetic MM1 capture builder shared by the integration tests
#![allow(dead_code)]

pub const BUFFER_HEADER_HALVES: u16 = 32;
pub const PIXEL_HEADER_HALVES: u16 = 64;

/// Logical pixel record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSpec {
    pub number: u32,
    pub realtime: u32,
    pub livetime: u32,
    pub triggers: u32,
    pub output_events: u32,
    pub bins: Vec<u32>,
}

impl PixelSpec {
    pub fn new(number: u32, bins: Vec<u32>) -> Self {
        Self {
            number,
            realtime: 1000,
            livetime: 1000,
            triggers: 0,
            output_events: 0,
            bins,
        }
    }
}

/// Logical buffer group: header plus its pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSpec {
    pub number: u32,
    pub buffer_id: u16,
    pub det_chan: u16,
    pub start_pixel: u32,
    pub pixels: Vec<PixelSpec>,
}

pub fn push_halves(buf: &mut Vec<u8>, halves: &[u16]) {
    for h in halves {
        buf.extend_from_slice(&h.to_le_bytes());
    }
}

pub fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn split(value: u32) -> [u16; 2] {
    [value as u16, (value >> 16) as u16]
}

pub fn encode_buffer_header(spec: &BufferSpec) -> Vec<u8> {
    let mut halves = vec![0u16; BUFFER_HEADER_HALVES as usize];
    halves[0] = 0x55AA;
    halves[1] = 0xAA55;
    halves[2] = BUFFER_HEADER_HALVES;
    halves[3] = 1;
    halves[5..7].copy_from_slice(&split(spec.number));
    halves[7] = spec.buffer_id;
    halves[8] = spec.pixels.len() as u16;
    halves[9..11].copy_from_slice(&split(spec.start_pixel));
    halves[12] = spec.det_chan;
    let mut buf = Vec::new();
    push_halves(&mut buf, &halves);
    buf
}

pub fn encode_pixel(spec: &PixelSpec) -> Vec<u8> {
    let data_halves = (spec.bins.len() * 2) as u16;
    let block = PIXEL_HEADER_HALVES as u32 + data_halves as u32;
    let mut halves = vec![0u16; PIXEL_HEADER_HALVES as usize];
    halves[0] = 0x33CC;
    halves[1] = 0xCC33;
    halves[2] = PIXEL_HEADER_HALVES;
    halves[3] = 1;
    halves[4..6].copy_from_slice(&split(spec.number));
    halves[6..8].copy_from_slice(&split(block));
    halves[8] = data_halves;
    halves[32..34].copy_from_slice(&split(spec.realtime));
    halves[34..36].copy_from_slice(&split(spec.livetime));
    halves[36..38].copy_from_slice(&split(spec.triggers));
    halves[38..40].copy_from_slice(&split(spec.output_events));
    let mut buf = Vec::new();
    push_halves(&mut buf, &halves);
    for &bin in &spec.bins {
        push_u32(&mut buf, bin);
    }
    buf
}

/// Concatenate `(BufferHeader, PixelRecord × n)` groups
pub fn encode_capture(buffers: &[BufferSpec]) -> Vec<u8> {
    let mut data = Vec::new();
    for buffer in buffers {
        data.extend(encode_buffer_header(buffer));
        for pixel in &buffer.pixels {
            data.extend(encode_pixel(pixel));
        }
    }
    data
}

/// One buffer with one pixel on `det_chan`
pub fn single(det_chan: u16, number: u32, pixel: u32) -> BufferSpec {
    BufferSpec {
        number,
        buffer_id: (number % 2) as u16,
        det_chan,
        start_pixel: pixel,
        pixels: vec![PixelSpec::new(pixel, vec![1, 2, 3, 4])],
    }
}

/// Scenario A: the halves as a digitizer writes them, 64 bins of zero
pub fn scenario_a() -> Vec<u8> {
    let mut data = Vec::new();
    let mut buffer = vec![0u16; 32];
    buffer[..13].copy_from_slice(&[
        0x55AA, 0xAA55, 0x0020, 0x0001, 0x0000, 0x0000, 0x0000, 0x0000, 0x0001, 0x0000, 0x0000,
        0x0000, 0x0000,
    ]);
    push_halves(&mut data, &buffer);

    let mut pixel = vec![0u16; 128];
    pixel[..9].copy_from_slice(&[
        0x33CC, 0xCC33, 0x0080, 0x0001, 0x0000, 0x0000, 0x0100, 0x0000, 0x0080,
    ]);
    pixel[32] = 1000;
    pixel[34] = 1000;
    push_halves(&mut data, &pixel);
    data.resize(data.len() + 64 * 4, 0);
    data
}
