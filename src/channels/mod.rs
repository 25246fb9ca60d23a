//! Batch I/O at the edges of the filter.

pub mod json_io;

pub use json_io::{Batch, filter_stream, read_batch, write_batch};
