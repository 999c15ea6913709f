//! Decoder module for MM1 mapping-mode captures
//!
//! Converts a complete capture into validated buffer headers and pixel
//! records.

pub mod common;
pub mod error;
pub mod frame;
pub mod mm1;

pub use common::{BufferHeader, PixelRecord, Spectrum, TICK_SECONDS};
pub use error::DecodeError;
pub use frame::{FrameCursor, WordFrame};
pub use mm1::{DecodeReport, DecoderConfig, Mm1Decoder, Mm1Event, MAX_CHANNELS};
