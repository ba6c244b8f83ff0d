//! Severity-gated structured logging.
//!
//! # Responsibilities
//! - Gate log calls against a minimum level that can change at runtime
//! - Format lines as `[LEVEL] message key1=value1 key2=value2`
//! - Hand formatted records to a pluggable sink (tracing by default)
//!
//! # Design Decisions
//! - The minimum level is an `AtomicU8`; concurrent request tasks read it
//!   while an operator may lower or raise it
//! - The logger is an explicit instance shared through `Arc`, never a global
//! - Each call loads the level exactly once, so a `set_level` only affects
//!   calls issued after it

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::LoggingConfig;

/// Log severity, totally ordered: `Debug < Info < Warn < Error`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Parse a configured level, falling back to `Info` on anything unrecognized.
    pub fn from_config(value: &str) -> Self {
        value.parse().unwrap_or(LogLevel::Info)
    }
}

impl From<u8> for LogLevel {
    fn from(val: u8) -> Self {
        match val {
            0 => LogLevel::Debug,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown log level: {0} (valid: DEBUG, INFO, WARN, ERROR)")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Output rendering for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `[LEVEL] message key=value ...`
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

#[derive(Debug, Error)]
#[error("unknown log format: {0} (valid: JSON, TEXT)")]
pub struct ParseFormatError(pub String);

impl FromStr for LogFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Ok(LogFormat::Text),
            "JSON" => Ok(LogFormat::Json),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Field carrying the request correlation ID.
pub const REQUEST_ID_FIELD: &str = "request_id";

/// Field carrying the text of an underlying error.
pub const CAUSE_FIELD: &str = "cause";

/// Ordered key/value pairs attached to a log call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Build from a flat `key, value, key, value, ...` sequence.
    ///
    /// A trailing key without a value is dropped.
    pub fn from_flat<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = Self::new();
        let mut iter = items.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            fields.0.push((key.into(), value.into()));
        }
        fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single log call that passed the severity gate.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub message: &'a str,
    pub fields: &'a Fields,
}

impl LogRecord<'_> {
    /// Render as `[LEVEL] message key1=value1 key2=value2`.
    pub fn to_line(&self) -> String {
        let mut line = format!("[{}] {}", self.level, self.message);
        for (key, value) in self.fields.iter() {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    /// Render as a JSON object tagged with the owning service and version.
    ///
    /// `request_id` is lifted to a top-level `trace_id` and `cause` to a
    /// top-level `error`; every other field stays under `fields`.
    pub fn to_json(&self, service: &str, version: &str) -> String {
        let mut entry = Map::new();
        entry.insert("timestamp".into(), Value::String(Utc::now().to_rfc3339()));
        entry.insert("level".into(), Value::String(self.level.as_str().into()));
        entry.insert("message".into(), Value::String(self.message.into()));
        entry.insert("service".into(), Value::String(service.into()));
        entry.insert("version".into(), Value::String(version.into()));

        let mut fields = Map::new();
        for (key, value) in self.fields.iter() {
            let value = Value::String(value.to_string());
            match key {
                REQUEST_ID_FIELD => entry.insert("trace_id".into(), value),
                CAUSE_FIELD => entry.insert("error".into(), value),
                _ => fields.insert(key.to_string(), value),
            };
        }
        if !fields.is_empty() {
            entry.insert("fields".into(), Value::Object(fields));
        }
        Value::Object(entry).to_string()
    }
}

/// Destination for records that passed the gate.
pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord<'_>);
}

/// Forwards records to the `tracing` subscriber at the matching level.
#[derive(Debug, Clone)]
pub struct TracingSink {
    format: LogFormat,
    service: String,
    version: String,
}

impl TracingSink {
    pub fn new(format: LogFormat, service: impl Into<String>) -> Self {
        Self {
            format,
            service: service.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl LogSink for TracingSink {
    fn write(&self, record: &LogRecord<'_>) {
        let line = match self.format {
            LogFormat::Text => record.to_line(),
            LogFormat::Json => record.to_json(&self.service, &self.version),
        };
        match record.level {
            LogLevel::Debug => tracing::debug!(target: "app", "{}", line),
            LogLevel::Info => tracing::info!(target: "app", "{}", line),
            LogLevel::Warn => tracing::warn!(target: "app", "{}", line),
            LogLevel::Error => tracing::error!(target: "app", "{}", line),
        }
    }
}

/// Keeps rendered text lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(record.to_line());
        }
    }
}

/// Logger with a runtime-adjustable severity gate.
pub struct LeveledLogger {
    min_level: AtomicU8,
    sink: Arc<dyn LogSink>,
}

impl LeveledLogger {
    pub fn new(min_level: LogLevel, sink: Arc<dyn LogSink>) -> Self {
        Self {
            min_level: AtomicU8::new(min_level as u8),
            sink,
        }
    }

    /// Build the service logger from the logging section of the config.
    pub fn from_config(config: &LoggingConfig, service: &str, version: &str) -> Self {
        let format = config.format.parse().unwrap_or_default();
        Self::new(
            LogLevel::from_config(&config.level),
            Arc::new(TracingSink::new(format, service).with_version(version)),
        )
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from(self.min_level.load(Ordering::Acquire))
    }

    pub fn set_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Release);
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.should_log(LogLevel::Debug)
    }

    pub fn log(&self, level: LogLevel, message: &str, fields: &Fields) {
        if !self.should_log(level) {
            return;
        }
        self.sink.write(&LogRecord {
            level,
            message,
            fields,
        });
    }

    /// Log with a flat `key, value, ...` list; a trailing unpaired key is dropped.
    pub fn log_kv<I, S>(&self, level: LogLevel, message: &str, kv: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.should_log(level) {
            self.log(level, message, &Fields::from_flat(kv));
        }
    }

    pub fn debug(&self, message: &str, fields: Fields) {
        self.log(LogLevel::Debug, message, &fields);
    }

    pub fn info(&self, message: &str, fields: Fields) {
        self.log(LogLevel::Info, message, &fields);
    }

    pub fn warn(&self, message: &str, fields: Fields) {
        self.log(LogLevel::Warn, message, &fields);
    }

    pub fn error(&self, message: &str, fields: Fields) {
        self.log(LogLevel::Error, message, &fields);
    }
}

impl fmt::Debug for LeveledLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeveledLogger")
            .field("min_level", &self.level())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_logger(level: LogLevel) -> (LeveledLogger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (LeveledLogger::new(level, sink.clone()), sink)
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn from_config_falls_back_to_info() {
        assert_eq!(LogLevel::from_config("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_config(" DEBUG "), LogLevel::Debug);
        assert_eq!(LogLevel::from_config("verbose"), LogLevel::Info);
        assert_eq!(LogLevel::from_config(""), LogLevel::Info);
    }

    #[test]
    fn warn_gate_suppresses_debug_and_info() {
        let (logger, sink) = memory_logger(LogLevel::Warn);

        logger.debug("debug message", Fields::new());
        logger.info("info message", Fields::new());
        assert!(sink.lines().is_empty());

        logger.warn("warn message", Fields::new());
        logger.error("error message", Fields::new());
        assert_eq!(
            sink.lines(),
            vec!["[WARN] warn message", "[ERROR] error message"]
        );
    }

    #[test]
    fn set_level_affects_only_later_calls() {
        let (logger, sink) = memory_logger(LogLevel::Warn);

        logger.info("before", Fields::new());
        logger.set_level(LogLevel::Debug);
        assert_eq!(logger.level(), LogLevel::Debug);
        assert!(logger.is_debug_enabled());
        logger.info("after", Fields::new());

        logger.set_level(LogLevel::Error);
        assert_eq!(sink.lines(), vec!["[INFO] after"]);
    }

    #[test]
    fn line_format_includes_fields_in_order() {
        let (logger, sink) = memory_logger(LogLevel::Debug);
        logger.info(
            "Client error occurred",
            Fields::new().with("code", "INVALID_REQUEST").with("statusCode", 400),
        );
        assert_eq!(
            sink.lines(),
            vec!["[INFO] Client error occurred code=INVALID_REQUEST statusCode=400"]
        );
    }

    #[test]
    fn unpaired_trailing_key_is_dropped() {
        let (logger, sink) = memory_logger(LogLevel::Debug);
        logger.log_kv(LogLevel::Info, "msg", ["a", "1", "b", "2", "dangling"]);
        assert_eq!(sink.lines(), vec!["[INFO] msg a=1 b=2"]);
    }

    #[test]
    fn json_rendering_carries_service_and_fields() {
        let fields = Fields::new().with("code", "INTERNAL_ERROR");
        let record = LogRecord {
            level: LogLevel::Error,
            message: "boom",
            fields: &fields,
        };
        let value: Value = serde_json::from_str(&record.to_json("svc", "1.2.3")).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["service"], "svc");
        assert_eq!(value["version"], "1.2.3");
        assert_eq!(value["fields"]["code"], "INTERNAL_ERROR");
        assert!(value.get("trace_id").is_none());
    }

    #[test]
    fn json_lifts_request_id_and_cause() {
        let fields = Fields::new()
            .with("code", "INTERNAL_ERROR")
            .with("cause", "connection refused")
            .with("request_id", "req-7");
        let record = LogRecord {
            level: LogLevel::Error,
            message: "Server error occurred",
            fields: &fields,
        };
        let value: Value = serde_json::from_str(&record.to_json("svc", "1.0.0")).unwrap();
        assert_eq!(value["trace_id"], "req-7");
        assert_eq!(value["error"], "connection refused");
        assert_eq!(value["fields"], serde_json::json!({"code": "INTERNAL_ERROR"}));
    }

    #[test]
    fn concurrent_level_changes_are_race_free() {
        let (logger, _sink) = memory_logger(LogLevel::Info);
        let logger = Arc::new(logger);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        if i % 2 == 0 {
                            logger.set_level(LogLevel::Error);
                        } else {
                            logger.info("tick", Fields::new());
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(logger.level(), LogLevel::Error);
    }
}
