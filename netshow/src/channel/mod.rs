//! Channel layer: output accumulation and prompt search.

mod buffer;

pub use buffer::PatternBuffer;
