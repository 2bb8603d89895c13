//! Knowledge graph compactor — lossless term abbreviation for node/link graphs.
//!
//! Passes:
//! 1. Collector — gather every distinct term, rank them, assign `T<rank>` codes
//! 2. Encoder — emit codebook header, then `N|...` and `L|...` lines using codes only
//!
//! The decoder reverses the encoder; scalar types are not kept (`1` and `"1"` read back alike).

pub mod codebook;
pub mod collector;
pub mod decoder;
pub mod encoder;
pub mod pipeline;

pub use codebook::CodeTable;
pub use decoder::DecodedGraph;
pub use pipeline::{CompactionResult, GraphCompactor};

#[cfg(test)]
mod tests;
