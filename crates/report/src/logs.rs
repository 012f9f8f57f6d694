//! Captured host log lines.
//!
//! The host records into a [`LogSink`]; bundle assembly takes a [`LogSink::snapshot`] and never
//! sees the live buffer again.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entries kept before the oldest ones are dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" | "debug" | "trace" => Ok(Self::Log),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// One captured line. Optional fields are omitted from the bundle when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    /// RFC 3339, UTC
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl LogEntry {
    /// Entry stamped with the current time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            args: Vec::new(),
            time: now_rfc3339(),
            source: None,
            line: None,
            column: None,
            stack: None,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_location(mut self, source: impl Into<String>, line: u32, column: u32) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Bounded FIFO of log entries. Pushing past capacity drops the oldest entry.
#[derive(Debug, Clone)]
pub struct LogRing {
    capacity: usize,
    entries: VecDeque<LogEntry>,
    dropped: u64,
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            dropped: 0,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(entry);
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries evicted since creation
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Where a host records log lines for later bundling.
pub trait LogSink: Send + Sync {
    fn record(&self, entry: LogEntry);

    /// Frozen copy of the current contents, oldest first.
    fn snapshot(&self) -> Vec<LogEntry>;

    fn clear(&self);
}

/// Thread-safe [`LogRing`]. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedLogRing {
    inner: Arc<Mutex<LogRing>>,
}

impl SharedLogRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogRing::new(capacity))),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.lock().dropped()
    }

    // Ring updates never leave partial state behind, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, LogRing> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for SharedLogRing {
    fn record(&self, entry: LogEntry) {
        self.lock().push(entry);
    }

    fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().snapshot()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(i: usize) -> LogEntry {
        LogEntry::new(LogLevel::Info, format!("line {i}")).with_time("2024-01-01T00:00:00.000Z")
    }

    #[test]
    fn ring_drops_oldest_past_capacity() {
        let mut ring = LogRing::new(3);
        for i in 0..5 {
            ring.push(entry(i));
        }
        let messages: Vec<String> = ring.snapshot().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
        assert_eq!(ring.dropped(), 2);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn default_capacity_is_eighty() {
        let mut ring = LogRing::default();
        for i in 0..100 {
            ring.push(entry(i));
        }
        assert_eq!(ring.capacity(), DEFAULT_LOG_CAPACITY);
        assert_eq!(ring.len(), 80);
        assert_eq!(ring.snapshot()[0].message, "line 20");
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut ring = LogRing::new(0);
        ring.push(entry(0));
        assert!(ring.is_empty());
        assert_eq!(ring.dropped(), 1);
    }

    #[test]
    fn snapshot_is_frozen() {
        let sink = SharedLogRing::new(4);
        sink.record(entry(0));
        let snapshot = sink.snapshot();
        sink.record(entry(1));
        sink.clear();
        assert_eq!(snapshot.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn shared_ring_accepts_concurrent_writers() {
        let sink = SharedLogRing::new(1000);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sink.record(entry(t * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert_eq!(sink.len(), 200);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn entry_serializes_without_absent_fields() {
        let plain = entry(1);
        assert_eq!(
            serde_json::to_value(&plain).expect("serialize"),
            json!({ "level": "info", "message": "line 1", "time": "2024-01-01T00:00:00.000Z" })
        );

        let located = LogEntry::new(LogLevel::Error, "boom")
            .with_time("t")
            .with_location("app.js", 10, 4)
            .with_stack("Error: boom");
        assert_eq!(
            serde_json::to_value(&located).expect("serialize"),
            json!({
                "level": "error",
                "message": "boom",
                "time": "t",
                "source": "app.js",
                "line": 10,
                "column": 4,
                "stack": "Error: boom"
            })
        );
    }

    #[test]
    fn entry_time_is_rfc3339_utc() {
        let time = LogEntry::new(LogLevel::Log, "x").time;
        assert!(chrono::DateTime::parse_from_rfc3339(&time).is_ok(), "{time}");
        assert!(time.ends_with('Z'));
    }

    proptest::proptest! {
        #[test]
        fn proptest_ring_keeps_the_newest_entries(capacity in 0usize..16, pushes in 0usize..64) {
            let mut ring = LogRing::new(capacity);
            for i in 0..pushes {
                ring.push(entry(i));
            }
            let kept = pushes.min(capacity);
            proptest::prop_assert_eq!(ring.len(), kept);
            proptest::prop_assert_eq!(ring.dropped(), (pushes - kept) as u64);
            let expected: Vec<String> =
                (pushes - kept..pushes).map(|i| format!("line {i}")).collect();
            let actual: Vec<String> = ring.snapshot().into_iter().map(|e| e.message).collect();
            proptest::prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn parses_levels_leniently() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Log));
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
