use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// What the collector did for each domain, kept alongside the score so a
/// reader can tell measured numbers from fallback constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub domain: Domain,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    BackendUnit,
    BackendIntegration,
    FrontendUnit,
    EndToEnd,
    Security,
    Quality,
    Performance,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendUnit => write!(f, "backend_unit"),
            Self::BackendIntegration => write!(f, "backend_integration"),
            Self::FrontendUnit => write!(f, "frontend_unit"),
            Self::EndToEnd => write!(f, "end_to_end"),
            Self::Security => write!(f, "security"),
            Self::Quality => write!(f, "quality"),
            Self::Performance => write!(f, "performance"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionLog {
    entries: Vec<LogEntry>,
}

impl CollectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, domain: Domain, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => info!("[{}] {}", domain, message),
            LogLevel::Warn => warn!("[{}] {}", domain, message),
        }
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            domain,
            level,
            message,
        });
    }

    pub fn measured(&mut self, domain: Domain, message: impl Into<String>) {
        self.emit(domain, LogLevel::Info, message);
    }

    pub fn fallback(&mut self, domain: Domain, message: impl Into<String>) {
        self.emit(domain, LogLevel::Warn, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of fallbacks recorded for `domain`.
    pub fn fallbacks_for(&self, domain: Domain) -> usize {
        self.entries
            .iter()
            .filter(|e| e.domain == domain && e.level == LogLevel::Warn)
            .count()
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}
