//! Importance rules: the per-record email classifier.
//!
//! Three independent checks, any of which flags a record:
//! - sender address contains a whitelisted substring
//! - sender domain ends in `.nz`
//! - lowercased subject contains a keyword
//!
//! Every check is total. Missing headers degrade to empty strings and
//! simply fail to match.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::FilterConfig;
use crate::pipeline::types::{InputRecord, OutputRecord, Verdict};

/// First `<...>` group in a sender header.
static ANGLE_ADDR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(.+?)>").expect("angle address regex is valid"));

const NZ_SUFFIX: &str = ".nz";
const DEFAULT_SUBJECT: &str = "No subject";
const DEFAULT_FROM: &str = "Unknown";

/// Classifies records against a fixed configuration.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: FilterConfig,
}

impl Classifier {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Run every check against a record.
    pub fn evaluate(&self, record: &InputRecord) -> Verdict {
        let sender = extract_sender(record.from_header().unwrap_or_default());
        let domain = extract_domain(&sender);
        let subject = record.subject().unwrap_or_default().to_lowercase();

        Verdict {
            whitelisted: self
                .config
                .whitelist
                .iter()
                .any(|w| sender.contains(w.as_str())),
            nz_domain: domain.ends_with(NZ_SUFFIX),
            keyword: self
                .config
                .keywords
                .iter()
                .any(|k| subject.contains(k.as_str())),
        }
    }

    /// Classify a record, returning an alert only when it is important.
    pub fn classify(&self, record: &InputRecord) -> Option<OutputRecord> {
        let verdict = self.evaluate(record);
        if !verdict.is_important() {
            return None;
        }

        let reason = verdict.reason();
        debug!(
            sender = record.from_header().unwrap_or_default(),
            reason = %reason,
            "Record flagged as important"
        );

        Some(OutputRecord {
            subject: record.subject().unwrap_or(DEFAULT_SUBJECT).to_string(),
            from: record.from_header().unwrap_or(DEFAULT_FROM).to_string(),
            snippet: record.snippet().unwrap_or_default().to_string(),
            reason,
        })
    }
}

/// Extract the lowercased bare address from a sender header.
///
/// `"Alice" <Alice@Example.com>` → `alice@example.com`. Without angle
/// brackets the whole (trimmed, lowercased) header is the address.
pub fn extract_sender(header: &str) -> String {
    let lowered = header.to_lowercase();
    let addr = ANGLE_ADDR
        .captures(&lowered)
        .and_then(|c| c.get(1))
        .map_or(lowered.as_str(), |m| m.as_str());
    addr.trim().to_string()
}

/// The piece between the first and second `@`, or empty when there is none.
///
/// `odd@sub@host.nz` → `sub`.
pub fn extract_domain(sender: &str) -> &str {
    sender.split('@').nth(1).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ActiveWindow;

    fn make_record(from: Option<&str>, subject: Option<&str>) -> InputRecord {
        let mut value = json!({});
        if let Some(f) = from {
            value["From"] = json!(f);
        }
        if let Some(s) = subject {
            value["Subject"] = json!(s);
        }
        serde_json::from_value(value).unwrap()
    }

    fn classifier() -> Classifier {
        Classifier::new(FilterConfig::default())
    }

    // ── Extraction tests ────────────────────────────────────────────

    #[test]
    fn sender_from_display_name_form() {
        assert_eq!(
            extract_sender(r#""Alice Smith" <Alice@Example.COM>"#),
            "alice@example.com"
        );
    }

    #[test]
    fn sender_bare_address_trimmed() {
        assert_eq!(extract_sender("  Bob@Company.NZ  "), "bob@company.nz");
    }

    #[test]
    fn sender_inner_whitespace_trimmed() {
        assert_eq!(extract_sender("Carol < carol@x.com >"), "carol@x.com");
    }

    #[test]
    fn sender_uses_first_bracket_pair() {
        assert_eq!(extract_sender("<a@x.com> via <b@y.com>"), "a@x.com");
    }

    #[test]
    fn sender_empty_brackets_fall_back_to_header() {
        assert_eq!(extract_sender("nobody <>"), "nobody <>");
    }

    #[test]
    fn sender_unclosed_bracket_falls_back_to_header() {
        assert_eq!(extract_sender("Dave <dave@x.com"), "dave <dave@x.com");
    }

    #[test]
    fn domain_after_first_at() {
        assert_eq!(extract_domain("bob@company.nz"), "company.nz");
        assert_eq!(extract_domain("odd@sub@host.nz"), "sub");
        assert_eq!(extract_domain("trailing@"), "");
    }

    #[test]
    fn domain_empty_without_at() {
        assert_eq!(extract_domain("not-an-address"), "");
        assert_eq!(extract_domain(""), "");
    }

    // ── Check tests ─────────────────────────────────────────────────

    #[test]
    fn whitelist_matches_inside_brackets() {
        let v = classifier().evaluate(&make_record(
            Some("Alice <sender1@example.com>"),
            Some("lunch"),
        ));
        assert!(v.whitelisted);
        assert!(!v.nz_domain);
        assert!(!v.keyword);
    }

    #[test]
    fn whitelist_is_substring_match() {
        let v = classifier().evaluate(&make_record(Some("xsender1@example.com.au"), None));
        assert!(v.whitelisted);
    }

    #[test]
    fn whitelist_case_insensitive() {
        let v = classifier().evaluate(&make_record(Some("SENDER2@EXAMPLE.COM"), None));
        assert!(v.whitelisted);
    }

    #[test]
    fn nz_domain_detected() {
        let v = classifier().evaluate(&make_record(Some("bob@company.co.nz"), Some("newsletter")));
        assert!(v.nz_domain);
        assert_eq!(v.reason(), ".nz domain");
    }

    #[test]
    fn nz_suffix_must_be_on_domain() {
        // ".nz" in the local part, domain is .com
        let v = classifier().evaluate(&make_record(Some("team.nz@company.com"), None));
        assert!(!v.nz_domain);
        // no '@' → empty domain
        let v = classifier().evaluate(&make_record(Some("example.nz"), None));
        assert!(!v.nz_domain);
    }

    #[test]
    fn second_at_cuts_domain_short() {
        let record = make_record(Some("odd@sub@host.nz"), Some("hello"));
        let v = classifier().evaluate(&record);
        assert!(!v.nz_domain);
        assert!(classifier().classify(&record).is_none());
    }

    #[test]
    fn keyword_case_insensitive_substring() {
        let v = classifier().evaluate(&make_record(
            Some("x@y.com"),
            Some("Your INTERVIEW is scheduled"),
        ));
        assert!(v.keyword);
    }

    #[test]
    fn keyword_matches_inside_words() {
        // "call" inside "recall"
        let v = classifier().evaluate(&make_record(Some("x@y.com"), Some("Product recall")));
        assert!(v.keyword);
    }

    #[test]
    fn multi_word_keyword() {
        let v = classifier().evaluate(&make_record(
            Some("x@y.com"),
            Some("Application Status changed"),
        ));
        assert!(v.keyword);
    }

    #[test]
    fn no_checks_match() {
        let v = classifier().evaluate(&make_record(Some("x@y.com"), Some("weekly digest")));
        assert!(!v.is_important());
    }

    // ── Classification tests ────────────────────────────────────────

    #[test]
    fn classify_preserves_original_casing() {
        let out = classifier()
            .classify(&make_record(
                Some(r#""Recruiter" <HR@Company.NZ>"#),
                Some("Job Offer"),
            ))
            .unwrap();
        assert_eq!(out.from, r#""Recruiter" <HR@Company.NZ>"#);
        assert_eq!(out.subject, "Job Offer");
        assert_eq!(out.snippet, "");
        assert_eq!(out.reason, ".nz domain + Keyword in subject");
    }

    #[test]
    fn classify_all_three_reasons() {
        let out = classifier()
            .classify(&make_record(
                Some("sender1@example.com.nz"),
                Some("urgent: call me"),
            ))
            .unwrap();
        assert_eq!(
            out.reason,
            "Whitelisted sender + .nz domain + Keyword in subject"
        );
    }

    #[test]
    fn classify_defaults_missing_subject() {
        let out = classifier()
            .classify(&make_record(Some("sender1@example.com"), None))
            .unwrap();
        assert_eq!(out.subject, "No subject");
        assert_eq!(out.reason, "Whitelisted sender");
    }

    #[test]
    fn classify_defaults_missing_sender() {
        let out = classifier()
            .classify(&make_record(None, Some("visa appointment")))
            .unwrap();
        assert_eq!(out.from, "Unknown");
    }

    #[test]
    fn classify_passes_snippet_through() {
        let record: InputRecord = serde_json::from_value(json!({
            "from": "bob@company.nz",
            "subject": "hello",
            "snippet": "  Kia ora, Bob  "
        }))
        .unwrap();
        let out = classifier().classify(&record).unwrap();
        assert_eq!(out.snippet, "  Kia ora, Bob  ");
        assert_eq!(out.from, "bob@company.nz");
        assert_eq!(out.subject, "hello");
    }

    #[test]
    fn classify_unimportant_is_none() {
        assert!(classifier()
            .classify(&make_record(Some("x@y.com"), Some("weekly digest")))
            .is_none());
        assert!(classifier().classify(&make_record(None, None)).is_none());
    }

    #[test]
    fn custom_config_lists() {
        let config = FilterConfig::new(["@trusted.org"], ["Invoice"], ActiveWindow::default());
        let c = Classifier::new(config);
        assert!(c.evaluate(&make_record(Some("ceo@trusted.org"), None)).whitelisted);
        assert!(c.evaluate(&make_record(None, Some("INVOICE #12"))).keyword);
        assert!(!c.evaluate(&make_record(None, Some("job offer"))).keyword);
    }

    #[test]
    fn empty_lists_never_match() {
        let empty: [&str; 0] = [];
        let c = Classifier::new(FilterConfig::new(empty, empty, ActiveWindow::default()));
        let v = c.evaluate(&make_record(Some("sender1@example.com"), Some("job")));
        assert!(!v.whitelisted);
        assert!(!v.keyword);
    }

    #[test]
    fn reclassifying_output_keeps_decision() {
        let c = classifier();
        let record = make_record(Some("Alice <sender1@example.com>"), Some("Interview"));
        let out = c.classify(&record).unwrap();
        let again = c.classify(&InputRecord::from(&out)).unwrap();
        assert_eq!(again.reason, out.reason);
        assert_eq!(again, out);
    }
}
