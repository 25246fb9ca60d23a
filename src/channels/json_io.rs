//! JSON batch I/O for the hosting automation.
//!
//! Items arrive either as bare record objects or wrapped in the host's item
//! envelope (`{"json": {...}}`). Output mirrors the input shape.

use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::ChannelError;
use crate::pipeline::processor::AlarmFilter;
use crate::pipeline::types::{InputRecord, OutputRecord};

/// Key under which the host nests each item's fields.
const ENVELOPE_KEY: &str = "json";

/// A decoded input batch.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub records: Vec<InputRecord>,
    /// At least one item arrived wrapped in an envelope.
    pub enveloped: bool,
}

/// Read a batch from a JSON array.
pub fn read_batch<R: Read>(reader: R) -> Result<Batch, ChannelError> {
    let doc: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = doc else {
        return Err(ChannelError::InvalidBatch(
            "expected a JSON array of records".into(),
        ));
    };

    let mut batch = Batch {
        records: Vec::with_capacity(items.len()),
        enveloped: false,
    };
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(ChannelError::InvalidBatch(format!(
                "item {i} is not an object"
            )));
        };
        let (fields, wrapped) = unwrap_envelope(fields);
        batch.enveloped |= wrapped;
        batch.records.push(InputRecord::new(fields));
    }
    Ok(batch)
}

/// Write output records as a JSON array, wrapping each in an envelope when asked.
pub fn write_batch<W: Write>(
    mut writer: W,
    records: &[OutputRecord],
    enveloped: bool,
) -> Result<(), ChannelError> {
    let items = records
        .iter()
        .map(|r| -> Result<Value, serde_json::Error> {
            let value = serde_json::to_value(r)?;
            Ok(if enveloped {
                let mut wrapper = Map::new();
                wrapper.insert(ENVELOPE_KEY.into(), value);
                Value::Object(wrapper)
            } else {
                value
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    serde_json::to_writer_pretty(&mut writer, &items)?;
    writeln!(writer)?;
    Ok(())
}

/// Read a batch, filter it at `now`, and write the alerts back out.
///
/// Returns the number of alerts written.
pub fn filter_stream<R: Read, W: Write>(
    filter: &AlarmFilter,
    now: DateTime<Utc>,
    reader: R,
    writer: W,
) -> crate::error::Result<usize> {
    let batch = read_batch(reader)?;
    let alerts = filter.run(now, &batch.records);
    write_batch(writer, &alerts, batch.enveloped)?;
    Ok(alerts.len())
}

/// Strip a `{"json": {...}}` wrapper, if present.
fn unwrap_envelope(mut fields: Map<String, Value>) -> (Map<String, Value>, bool) {
    if fields.len() == 1
        && matches!(fields.get(ENVELOPE_KEY), Some(Value::Object(_)))
        && let Some(Value::Object(inner)) = fields.remove(ENVELOPE_KEY)
    {
        return (inner, true);
    }
    (fields, false)
}
