//! # TroubleCode Report
//!
//! Producer-side assembly of a report bundle:
//!
//! - [`SharedLogRing`] is the bounded log sink a host records into (oldest entries drop first)
//! - [`BundleBuilder`] lays out `version`, `timestamp`, `userError`, host facts and `logs`
//! - [`build_prompt`] wraps a bundle into a prompt that asks for `[[ref:path]]` callbacks
//!
//! ```rust
//! use troublecode_report::{BundleBuilder, LogEntry, LogLevel, LogSink, SharedLogRing};
//!
//! let sink = SharedLogRing::default();
//! sink.record(LogEntry::new(LogLevel::Error, "fetch failed"));
//!
//! let bundle = BundleBuilder::new()
//!     .user_error("checkout hangs")
//!     .facts(serde_json::json!({ "timezone": "Europe/Berlin" }))
//!     .unwrap()
//!     .logs_from(&sink)
//!     .build()
//!     .unwrap();
//! assert_eq!(bundle["logs"][0]["message"], "fetch failed");
//! ```

mod builder;
mod error;
mod logs;
mod prompt;

pub use builder::{BundleBuilder, BUNDLE_VERSION, NO_DESCRIPTION, RESERVED_SECTIONS};
pub use error::{ReportError, Result};
pub use logs::{LogEntry, LogLevel, LogRing, LogSink, SharedLogRing, DEFAULT_LOG_CAPACITY};
pub use prompt::{build_prompt, PromptMode};
