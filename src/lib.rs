//! Email alarm filter: decides which fetched emails should raise an alert.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
