//! Configuration types.
//!
//! The filter configuration is built once, before any batch is processed,
//! and handed to the pipeline by value. Nothing in the pipeline reads the
//! environment.

use tracing::debug;

use crate::error::ConfigError;

/// Senders whose alerts always fire.
const DEFAULT_WHITELIST: &[&str] = &["sender1@example.com", "sender2@example.com"];

/// Subject keywords that mark a message as important.
const DEFAULT_KEYWORDS: &[&str] = &[
    "job",
    "interview",
    "visa",
    "immigration",
    "application status",
    "offer",
    "urgent",
    "chat",
    "call",
    "status",
    "employer",
    "connect",
];

const MINUTES_PER_DAY: u16 = 1440;

/// Inclusive local-time window in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    start: u16,
    end: u16,
}

impl ActiveWindow {
    /// Build a window from minutes since midnight.
    ///
    /// Windows that cross midnight (`start > end`) are rejected.
    pub fn new(start: u16, end: u16) -> Result<Self, ConfigError> {
        if start >= MINUTES_PER_DAY || end >= MINUTES_PER_DAY {
            return Err(ConfigError::InvalidValue {
                key: "active_window".into(),
                message: format!("bounds must be below {MINUTES_PER_DAY} minutes"),
            });
        }
        if start > end {
            return Err(ConfigError::InvalidValue {
                key: "active_window".into(),
                message: format!(
                    "start {} is after end {}; windows crossing midnight are not supported",
                    crate::pipeline::time_gate::format_hm(start),
                    crate::pipeline::time_gate::format_hm(end),
                ),
            });
        }
        Ok(Self { start, end })
    }

    /// Build a window from hour/minute pairs.
    pub fn from_hm(
        start_hour: u16,
        start_min: u16,
        end_hour: u16,
        end_min: u16,
    ) -> Result<Self, ConfigError> {
        let start = hm_to_minutes("active_start", start_hour, start_min)?;
        let end = hm_to_minutes("active_end", end_hour, end_min)?;
        Self::new(start, end)
    }

    /// Build a window from `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        let start = parse_hm("active_start", start)?;
        let end = parse_hm("active_end", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }
}

impl Default for ActiveWindow {
    fn default() -> Self {
        // 01:30 to 11:00 local time
        Self {
            start: 90,
            end: 660,
        }
    }
}

/// Filter configuration: who and what counts as important, and when.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Substrings matched against the lowercased sender address.
    pub whitelist: Vec<String>,
    /// Substrings matched against the lowercased subject.
    pub keywords: Vec<String>,
    /// Local-time window during which alerts may fire.
    pub active_window: ActiveWindow,
}

impl FilterConfig {
    /// Build a configuration, normalizing every entry to trimmed lowercase.
    ///
    /// Empty entries are dropped: an empty substring would match everything.
    pub fn new<W, K>(whitelist: W, keywords: K, active_window: ActiveWindow) -> Self
    where
        W: IntoIterator,
        W::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Self {
            whitelist: normalize_entries("whitelist", whitelist),
            keywords: normalize_entries("keywords", keywords),
            active_window,
        }
    }

    /// Build config from environment variables.
    ///
    /// - `ALARM_WHITELIST`: comma-separated sender substrings
    /// - `ALARM_KEYWORDS`: comma-separated subject keywords
    /// - `ALARM_ACTIVE_START` / `ALARM_ACTIVE_END`: `HH:MM` local time
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let whitelist = lookup("ALARM_WHITELIST")
            .map(|s| split_list(&s))
            .unwrap_or(defaults.whitelist);

        let keywords = lookup("ALARM_KEYWORDS")
            .map(|s| split_list(&s))
            .unwrap_or(defaults.keywords);

        let window = defaults.active_window;
        let start = match lookup("ALARM_ACTIVE_START") {
            Some(s) => parse_hm("ALARM_ACTIVE_START", &s)?,
            None => window.start(),
        };
        let end = match lookup("ALARM_ACTIVE_END") {
            Some(s) => parse_hm("ALARM_ACTIVE_END", &s)?,
            None => window.end(),
        };

        Ok(Self::new(whitelist, keywords, ActiveWindow::new(start, end)?))
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_WHITELIST.iter(),
            DEFAULT_KEYWORDS.iter(),
            ActiveWindow::default(),
        )
    }
}

fn normalize_entries<I>(list: &str, entries: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, s)| {
            let entry = s.as_ref().trim().to_lowercase();
            if entry.is_empty() {
                debug!(list, index, "Dropping empty configuration entry");
                None
            } else {
                Some(entry)
            }
        })
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn hm_to_minutes(key: &str, hour: u16, minute: u16) -> Result<u16, ConfigError> {
    if hour >= 24 || minute >= 60 {
        return Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("{hour:02}:{minute:02} is not a valid time of day"),
        });
    }
    Ok(hour * 60 + minute)
}

/// Parse an `HH:MM` string into minutes since midnight.
fn parse_hm(key: &str, raw: &str) -> Result<u16, ConfigError> {
    let raw = raw.trim();
    let Some((h, m)) = raw.split_once(':') else {
        return Err(ConfigError::ParseError(format!(
            "{key}: expected HH:MM, got '{raw}'"
        )));
    };
    let hour: u16 = h
        .trim()
        .parse()
        .map_err(|e| ConfigError::ParseError(format!("{key}: bad hour '{h}': {e}")))?;
    let minute: u16 = m
        .trim()
        .parse()
        .map_err(|e| ConfigError::ParseError(format!("{key}: bad minute '{m}': {e}")))?;
    hm_to_minutes(key, hour, minute)
}
