use std::io::{self, BufReader, BufWriter, Write};

use anyhow::Context;
use chrono::{DateTime, Utc};

use email_alarm_filter::channels::filter_stream;
use email_alarm_filter::config::FilterConfig;
use email_alarm_filter::pipeline::AlarmFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the output batch
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = FilterConfig::from_env().context("loading filter configuration")?;
    let now = current_instant()?;

    tracing::debug!(
        whitelist = config.whitelist.len(),
        keywords = config.keywords.len(),
        %now,
        "Filter configured"
    );

    let filter = AlarmFilter::new(config);
    let input = BufReader::new(io::stdin().lock());
    let mut out = BufWriter::new(io::stdout().lock());

    let alerts = filter_stream(&filter, now, input, &mut out).context("filtering batch")?;
    out.flush().context("flushing output batch")?;

    tracing::debug!(alerts, "Output batch written");

    Ok(())
}

/// Current instant, overridable with `ALARM_NOW` (RFC 3339) for dry runs.
fn current_instant() -> anyhow::Result<DateTime<Utc>> {
    match std::env::var("ALARM_NOW") {
        Ok(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("ALARM_NOW is not an RFC 3339 timestamp: '{raw}'")),
        Err(_) => Ok(Utc::now()),
    }
}
