use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ReportError, Result};
use crate::logs::{LogEntry, LogSink};

pub const BUNDLE_VERSION: &str = "1.0";
pub const NO_DESCRIPTION: &str = "(no description provided)";

/// Keys the builder writes itself.
pub const RESERVED_SECTIONS: &[&str] = &["version", "timestamp", "userError", "logs"];

/// Assembles a report bundle.
///
/// Layout, in order: `version`, `timestamp`, `userError`, host fact sections in insertion
/// order, then `logs`.
#[derive(Debug, Clone, Default)]
pub struct BundleBuilder {
    user_error: String,
    timestamp: Option<DateTime<Utc>>,
    sections: Map<String, Value>,
    logs: Vec<LogEntry>,
}

impl BundleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What the user says went wrong. Blank text becomes [`NO_DESCRIPTION`].
    #[must_use]
    pub fn user_error(mut self, description: impl Into<String>) -> Self {
        self.user_error = description.into();
        self
    }

    /// Fix the capture time instead of using the time of [`build`](Self::build).
    #[must_use]
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Add or replace one host fact section.
    pub fn section(mut self, key: impl Into<String>, value: Value) -> Result<Self> {
        let key = key.into();
        if RESERVED_SECTIONS.contains(&key.as_str()) {
            return Err(ReportError::ReservedSection(key));
        }
        self.sections.insert(key, value);
        Ok(self)
    }

    pub fn section_from<T: Serialize + ?Sized>(
        self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        self.section(key, value)
    }

    /// Add every entry of a facts mapping as its own section.
    pub fn facts(self, facts: Value) -> Result<Self> {
        let Value::Object(map) = facts else {
            return Err(ReportError::FactsNotAnObject(value_kind(&facts)));
        };
        map.into_iter()
            .try_fold(self, |builder, (key, value)| builder.section(key, value))
    }

    /// Take a frozen copy of everything `sink` holds right now.
    #[must_use]
    pub fn logs_from(mut self, sink: &dyn LogSink) -> Self {
        self.logs = sink.snapshot();
        self
    }

    #[must_use]
    pub fn logs(mut self, logs: Vec<LogEntry>) -> Self {
        self.logs = logs;
        self
    }

    pub fn build(self) -> Result<Value> {
        let timestamp = self
            .timestamp
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let user_error = match self.user_error.trim() {
            "" => NO_DESCRIPTION.to_string(),
            trimmed => trimmed.to_string(),
        };

        let mut bundle = Map::new();
        bundle.insert("version".to_string(), Value::from(BUNDLE_VERSION));
        bundle.insert("timestamp".to_string(), Value::from(timestamp));
        bundle.insert("userError".to_string(), Value::from(user_error));
        bundle.extend(self.sections);
        bundle.insert("logs".to_string(), serde_json::to_value(&self.logs)?);

        log::debug!(
            "assembled bundle with {} sections and {} log entries",
            bundle.len(),
            self.logs.len()
        );
        Ok(Value::Object(bundle))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{LogLevel, SharedLogRing};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .single()
            .expect("valid time")
    }

    #[test]
    fn builds_sections_in_order() {
        let sink = SharedLogRing::new(8);
        sink.record(LogEntry::new(LogLevel::Warn, "slow").with_time("t0"));

        let bundle = BundleBuilder::new()
            .user_error("  page is blank \n")
            .timestamp(fixed_time())
            .facts(json!({ "location": { "href": "https://a.test/" }, "timezone": "UTC" }))
            .expect("facts")
            .section("screen", json!({ "width": 800 }))
            .expect("section")
            .logs_from(&sink)
            .build()
            .expect("build");

        assert_eq!(
            bundle,
            json!({
                "version": "1.0",
                "timestamp": "2024-05-01T12:30:00.000Z",
                "userError": "page is blank",
                "location": { "href": "https://a.test/" },
                "timezone": "UTC",
                "screen": { "width": 800 },
                "logs": [{ "level": "warn", "message": "slow", "time": "t0" }]
            })
        );
        let keys: Vec<&str> = bundle
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["version", "timestamp", "userError", "location", "timezone", "screen", "logs"]
        );
    }

    #[test]
    fn blank_description_gets_placeholder() {
        let bundle = BundleBuilder::new().user_error("   ").build().expect("build");
        assert_eq!(bundle["userError"], json!(NO_DESCRIPTION));
        assert_eq!(bundle["logs"], json!([]));
    }

    #[test]
    fn reserved_sections_are_rejected() {
        for key in RESERVED_SECTIONS {
            let err = BundleBuilder::new()
                .section(*key, json!(1))
                .expect_err("reserved");
            assert!(matches!(err, ReportError::ReservedSection(ref k) if k == key));
        }
        assert!(matches!(
            BundleBuilder::new().facts(json!({ "logs": [] })),
            Err(ReportError::ReservedSection(_))
        ));
    }

    #[test]
    fn facts_must_be_an_object() {
        assert!(matches!(
            BundleBuilder::new().facts(json!([1, 2])),
            Err(ReportError::FactsNotAnObject("an array"))
        ));
    }

    #[test]
    fn serializable_sections() {
        #[derive(Serialize)]
        struct Viewport {
            #[serde(rename = "innerWidth")]
            inner_width: u32,
        }
        let bundle = BundleBuilder::new()
            .section_from("viewport", &Viewport { inner_width: 1280 })
            .expect("section")
            .build()
            .expect("build");
        assert_eq!(bundle["viewport"], json!({ "innerWidth": 1280 }));
    }

    #[test]
    fn default_timestamp_is_now() {
        let before = Utc::now();
        let bundle = BundleBuilder::new().build().expect("build");
        let stamp = bundle["timestamp"].as_str().expect("string");
        let parsed = DateTime::parse_from_rfc3339(stamp).expect("rfc3339");
        assert!(parsed.with_timezone(&Utc) >= before - chrono::Duration::seconds(1));
    }
}
