//! Human-readable trace of an MM1 capture
//!
//! Drives the decoder and writes one line per buffer header and pixel
//! record, optionally followed by a plot of each pixel's spectrum. Lines
//! written before a validation failure are kept; the failure itself is
//! returned to the caller.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::common::{TraceError, TraceResult};
use crate::config::Config;
use crate::decoder::{DecoderConfig, Mm1Decoder, Mm1Event};
use crate::plot::{PlotConfig, SpectrumPlot};

/// What to trace and how
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceOptions {
    /// Plot every pixel's spectrum after its PIXEL line
    pub plot: bool,
    pub decoder: DecoderConfig,
    pub plot_config: PlotConfig,
}

impl TraceOptions {
    pub fn from_config(config: &Config, plot: bool) -> Self {
        Self {
            plot,
            decoder: config.decoder.clone(),
            plot_config: config.plot.clone(),
        }
    }
}

/// Counts for a completed trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceSummary {
    pub buffers: usize,
    pub pixels: usize,
    pub trailing_bytes: usize,
}

/// Read a capture from disk and trace it
pub fn trace_file<P: AsRef<Path>, W: Write>(
    path: P,
    options: &TraceOptions,
    out: &mut W,
) -> TraceResult<TraceSummary> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| TraceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = data.len(), "loaded capture");
    trace_buffer(&data, options, out)
}

/// Trace a capture already in memory
pub fn trace_buffer<W: Write>(
    data: &[u8],
    options: &TraceOptions,
    out: &mut W,
) -> TraceResult<TraceSummary> {
    let plotter = SpectrumPlot::new(options.plot_config.clone());
    let mut decoder = Mm1Decoder::new(data, options.decoder.clone());
    let mut summary = TraceSummary::default();

    for event in decoder.by_ref() {
        match event? {
            Mm1Event::Buffer(header) => {
                writeln!(out, "{header}")?;
                summary.buffers += 1;
            }
            Mm1Event::Pixel(pixel) => {
                writeln!(out, "{pixel}")?;
                if options.plot {
                    let bins = pixel.spectrum.to_vec();
                    out.write_all(plotter.render(&bins, None).as_bytes())?;
                }
                summary.pixels += 1;
            }
            Mm1Event::TrailingBytes { remaining, .. } => {
                writeln!(out, "BUFFER: 0x{remaining:08x} bytes in file remaining")?;
            }
        }
    }
    summary.trailing_bytes = decoder.trailing_bytes().unwrap_or(0);

    info!(
        buffers = summary.buffers,
        pixels = summary.pixels,
        trailing_bytes = summary.trailing_bytes,
        "trace complete"
    );
    Ok(summary)
}
