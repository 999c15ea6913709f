//! MM1-TRACE: diagnostic tracer for MM1 list-mode mapping captures
//!
//! Walks the buffer/pixel frame structure of a capture written by a
//! multi-channel digital pulse processor in mapping mode 1, validates every
//! structural invariant and renders a readable trace with optional ASCII
//! spectrum plots.

pub mod common;
pub mod config;
pub mod decoder;
pub mod plot;
pub mod trace;
