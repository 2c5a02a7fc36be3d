//! Structured Retarget Log
//!
//! Initialization reports its outcome as a success flag plus a list of
//! [`LogEntry`] values, each carrying a severity and a machine-readable
//! [`LogCode`]. Every entry is also forwarded to the `log` facade so that
//! applications using `env_logger` (or any other backend) see it as well.

use std::fmt;

use log::Level;
use serde::{Deserialize, Serialize};

/// Cause codes for retarget diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogCode {
    // Prerequisite assets
    MissingSourceSkeleton,
    MissingTargetSkeleton,
    MissingSourceRig,
    MissingTargetRig,
    InvalidSkeleton,

    // Root
    MissingSourceRoot,
    MissingTargetRoot,
    BadRootHeight,

    // Chains
    MissingStartBone,
    MissingEndBone,
    EndNotChildOfStart,
    IncompatibleSourceChain,
    IncompatibleTargetChain,
    TinyBoneChain,
    BadFkEncoder,
    BadFkDecoder,
    MissingSourceChain,
    MissingTargetChain,
    NoMappedChains,

    SuccessfulInit,
}

impl fmt::Display for LogCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single diagnostic produced while setting up a retargeter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub code: LogCode,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.code, self.message)
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RetargetLog {
    entries: Vec<LogEntry>,
    /// When set, entries are still recorded but not forwarded to the `log` facade.
    suppress_warnings: bool,
}

impl RetargetLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_suppress_warnings(&mut self, suppress: bool) {
        self.suppress_warnings = suppress;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, level: Level, code: LogCode, message: impl Into<String>) {
        let entry = LogEntry {
            level,
            code,
            message: message.into(),
        };

        if !self.suppress_warnings || level == Level::Error {
            log::log!(level, "{}: {}", entry.code, entry.message);
        }

        self.entries.push(entry);
    }

    pub fn info(&mut self, code: LogCode, message: impl Into<String>) {
        self.push(Level::Info, code, message);
    }

    pub fn warning(&mut self, code: LogCode, message: impl Into<String>) {
        self.push(Level::Warn, code, message);
    }

    pub fn error(&mut self, code: LogCode, message: impl Into<String>) {
        self.push(Level::Error, code, message);
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Removes and returns all recorded entries.
    pub fn drain(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.entries)
    }

    #[must_use]
    pub fn contains(&self, code: LogCode) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    #[must_use]
    pub fn count_at(&self, level: Level) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count_at(Level::Error) > 0
    }
}
