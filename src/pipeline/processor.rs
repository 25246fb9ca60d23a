//! Batch processor: the single entry point of the filter.
//!
//! Flow per invocation:
//! 1. Time gate (once) → outside the window, return nothing
//! 2. Classifier (per record, in order) → keep important records

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::FilterConfig;
use crate::pipeline::rules::Classifier;
use crate::pipeline::time_gate::{self, format_hm};
use crate::pipeline::types::{InputRecord, OutputRecord};

/// Filters record batches down to the ones worth an alert.
#[derive(Debug, Clone)]
pub struct AlarmFilter {
    classifier: Classifier,
}

impl AlarmFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            classifier: Classifier::new(config),
        }
    }

    pub fn config(&self) -> &FilterConfig {
        self.classifier.config()
    }

    /// Whether alerts may fire at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        time_gate::is_active(now, &self.config().active_window)
    }

    /// Process one batch at instant `now`.
    ///
    /// Output order follows input order. Outside the active window no
    /// record is examined and the result is empty.
    pub fn run(&self, now: DateTime<Utc>, records: &[InputRecord]) -> Vec<OutputRecord> {
        let window = &self.config().active_window;
        let local = time_gate::local_minutes(now);

        if !window.contains(local) {
            debug!(
                local_time = %format_hm(local),
                window_start = %format_hm(window.start()),
                window_end = %format_hm(window.end()),
                skipped = records.len(),
                "Outside active window, bypassing batch"
            );
            return Vec::new();
        }

        let results: Vec<OutputRecord> = records
            .iter()
            .filter_map(|record| self.classifier.classify(record))
            .collect();

        info!(
            local_time = %format_hm(local),
            total = records.len(),
            flagged = results.len(),
            "Batch filtered"
        );
        results
    }
}

/// Filter a batch with a one-off configuration.
pub fn filter_batch(
    config: &FilterConfig,
    now: DateTime<Utc>,
    records: &[InputRecord],
) -> Vec<OutputRecord> {
    AlarmFilter::new(config.clone()).run(now, records)
}
