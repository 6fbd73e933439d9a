//! Logging abstraction for driver and runner progress.
//!
//! Drivers run on their own threads, so loggers are `Send + Sync` and are
//! shared by reference. Messages from one entity are tagged with its label
//! through [`EntityLogger`].

use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock};

/// Verbosity level for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Case results (always shown)
    Normal,
    /// Verifier progress (-v flag)
    Verbose,
    /// Stage transitions (-vv flag)
    Debug,
}

impl Verbosity {
    /// Create verbosity from CLI flag count.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }
}

/// Trait for logging output.
pub trait Logger: Send + Sync {
    /// Log a message at the given verbosity level.
    fn log(&self, level: Verbosity, message: &str);

    /// Log at normal level (always visible).
    fn info(&self, message: &str) {
        self.log(Verbosity::Normal, message);
    }

    /// Log at verbose level (requires -v).
    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    /// Log at debug level (requires -vv).
    fn debug(&self, message: &str) {
        self.log(Verbosity::Debug, message);
    }
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, level: Verbosity, message: &str) {
        (**self).log(level, message);
    }
}

/// Logger that writes to stderr, keeping stdout free for results.
#[derive(Debug)]
pub struct StderrLogger {
    level: Verbosity,
}

impl StderrLogger {
    /// Create a new stderr logger showing messages up to `level`.
    pub fn new(level: Verbosity) -> Self {
        Self { level }
    }

    /// The most detailed level this logger prints.
    pub fn level(&self) -> Verbosity {
        self.level
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level <= self.level {
            let _ = writeln!(std::io::stderr().lock(), "{}", message);
        }
    }
}

/// Prefixes every message with an entity label such as `P0` or `S1`.
pub struct EntityLogger<'a> {
    inner: &'a dyn Logger,
    label: String,
}

impl<'a> EntityLogger<'a> {
    /// Wrap `inner`, tagging messages with `label`.
    pub fn new(inner: &'a dyn Logger, label: impl Into<String>) -> Self {
        Self {
            inner,
            label: label.into(),
        }
    }

    /// The entity label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Logger for EntityLogger<'_> {
    fn log(&self, level: Verbosity, message: &str) {
        self.inner
            .log(level, &format!("{}: {}", self.label, message));
    }
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Verbosity,
    pub message: String,
}

/// Mock logger for testing that captures every message at every level.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    messages: Arc<RwLock<Vec<LogEntry>>>,
}

impl MockLogger {
    /// Create an empty mock logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured log entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get all captured messages (just the text).
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Get messages at a specific level.
    pub fn messages_at_level(&self, level: Verbosity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Check if any message contains the given substring.
    pub fn contains(&self, substring: &str) -> bool {
        self.messages().iter().any(|m| m.contains(substring))
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Verbosity, message: &str) {
        self.messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                level,
                message: message.to_string(),
            });
    }
}

/// A no-op logger that discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Verbosity, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // Verbosity
    // ===========================================

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Normal < Verbosity::Verbose);
        assert!(Verbosity::Verbose < Verbosity::Debug);
    }

    #[test]
    fn test_verbosity_from_count() {
        assert_eq!(Verbosity::from_count(0), Verbosity::Normal);
        assert_eq!(Verbosity::from_count(1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_count(2), Verbosity::Debug);
        assert_eq!(Verbosity::from_count(255), Verbosity::Debug);
    }

    // ===========================================
    // MockLogger
    // ===========================================

    #[test]
    fn test_mock_logger_captures_all_levels() {
        let logger = MockLogger::new();
        logger.info("case passed");
        logger.verbose("waiting for samples");
        logger.debug("topic created");

        let entries = logger.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, Verbosity::Normal);
        assert_eq!(entries[1].level, Verbosity::Verbose);
        assert_eq!(entries[2].level, Verbosity::Debug);
    }

    #[test]
    fn test_mock_logger_messages_at_level() {
        let logger = MockLogger::new();
        logger.info("one");
        logger.verbose("two");
        logger.info("three");

        assert_eq!(logger.messages_at_level(Verbosity::Normal), vec!["one", "three"]);
    }

    #[test]
    fn test_mock_logger_clone_shares_entries() {
        let logger = MockLogger::new();
        let clone = logger.clone();
        clone.info("from clone");
        assert!(logger.contains("from clone"));
    }

    #[test]
    fn test_mock_logger_across_threads() {
        let logger = MockLogger::new();
        std::thread::scope(|s| {
            for i in 0..4 {
                let logger = &logger;
                s.spawn(move || logger.info(&format!("thread {}", i)));
            }
        });
        assert_eq!(logger.messages().len(), 4);
    }

    // ===========================================
    // EntityLogger
    // ===========================================

    #[test]
    fn test_entity_logger_prefixes_label() {
        let logger = MockLogger::new();
        let entity = EntityLogger::new(&logger, "S0");
        entity.verbose("waiting for samples");

        assert_eq!(entity.label(), "S0");
        assert_eq!(
            logger.entries(),
            vec![LogEntry {
                level: Verbosity::Verbose,
                message: "S0: waiting for samples".to_string(),
            }]
        );
    }

    #[test]
    fn test_logger_by_reference() {
        let logger = MockLogger::new();
        let by_ref: &dyn Logger = &logger;
        (&by_ref).info("via reference");
        assert!(logger.contains("via reference"));
    }

    // ===========================================
    // StderrLogger / NullLogger
    // ===========================================

    #[test]
    fn test_stderr_logger_level() {
        let logger = StderrLogger::new(Verbosity::Verbose);
        assert_eq!(logger.level(), Verbosity::Verbose);
        logger.debug("filtered out");
    }

    #[test]
    fn test_null_logger_discards() {
        let logger = NullLogger;
        logger.info("discarded");
        logger.debug("discarded");
    }
}
