//! Shared types for the alarm filter pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Input record ────────────────────────────────────────────────────

/// A loosely-typed email record as handed over by the mail fetcher.
///
/// Header names come in case variants (`From`/`from`, `Subject`/`subject`).
/// A field that is missing, not a string, or empty falls through to the
/// next variant. The same holds for `snippet`: a non-string value (a number,
/// an object) is treated as absent and the alert carries an empty snippet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputRecord(Map<String, Value>);

impl InputRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw sender header, e.g. `"Alice" <alice@example.com>`.
    pub fn from_header(&self) -> Option<&str> {
        self.first_present(&["From", "from"])
    }

    /// Raw subject line.
    pub fn subject(&self) -> Option<&str> {
        self.first_present(&["Subject", "subject"])
    }

    pub fn snippet(&self) -> Option<&str> {
        self.first_present(&["snippet"])
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn first_present(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.0.get(*k).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }
}

impl From<Map<String, Value>> for InputRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<&OutputRecord> for InputRecord {
    fn from(out: &OutputRecord) -> Self {
        let mut fields = Map::new();
        fields.insert("From".into(), Value::String(out.from.clone()));
        fields.insert("Subject".into(), Value::String(out.subject.clone()));
        fields.insert("snippet".into(), Value::String(out.snippet.clone()));
        Self(fields)
    }
}

// ── Output record ───────────────────────────────────────────────────

/// An alert-worthy record, handed to the alerting channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Original subject, or `"No subject"`.
    #[serde(rename = "Subject")]
    pub subject: String,
    /// Original sender header, or `"Unknown"`.
    #[serde(rename = "From")]
    pub from: String,
    pub snippet: String,
    /// Triggered checks joined with `" + "`.
    pub reason: String,
}

// ── Checks ──────────────────────────────────────────────────────────

/// One of the importance checks. Declaration order is reason order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Check {
    Whitelisted,
    NzDomain,
    Keyword,
}

impl Check {
    /// Human-readable label used in the reason string.
    pub fn label(&self) -> &'static str {
        match self {
            Check::Whitelisted => "Whitelisted sender",
            Check::NzDomain => ".nz domain",
            Check::Keyword => "Keyword in subject",
        }
    }
}

/// Outcome of evaluating every check against one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub whitelisted: bool,
    pub nz_domain: bool,
    pub keyword: bool,
}

impl Verdict {
    /// At least one check fired.
    pub fn is_important(&self) -> bool {
        self.whitelisted || self.nz_domain || self.keyword
    }

    /// Triggered checks in fixed order.
    pub fn triggered(&self) -> Vec<Check> {
        [
            (self.whitelisted, Check::Whitelisted),
            (self.nz_domain, Check::NzDomain),
            (self.keyword, Check::Keyword),
        ]
        .into_iter()
        .filter_map(|(hit, check)| hit.then_some(check))
        .collect()
    }

    /// Reason string, e.g. `"Whitelisted sender + Keyword in subject"`.
    pub fn reason(&self) -> String {
        self.triggered()
            .iter()
            .map(Check::label)
            .collect::<Vec<_>>()
            .join(" + ")
    }
}
