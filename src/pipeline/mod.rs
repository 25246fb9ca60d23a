//! Email alarm pipeline.
//!
//! Every batch flows through:
//! 1. `time_gate::is_active()`: once per batch, may bypass everything
//! 2. `Classifier::classify()`: per record, pure function of record + config
//!
//! `AlarmFilter::run()` ties the two together.

pub mod processor;
pub mod rules;
pub mod time_gate;
pub mod types;

pub use processor::{AlarmFilter, filter_batch};
pub use rules::Classifier;
pub use types::{Check, InputRecord, OutputRecord, Verdict};
