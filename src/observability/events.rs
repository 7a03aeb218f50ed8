//! Event bus for external subscribers.
//!
//! Payloads mirror what the host process consumes: structured log events
//! and project status changes. Every emission is also written through the
//! JSON logger, so the bus can go unconsumed without losing visibility.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::logger::{Logger, Severity};

/// Severity of a `log:event` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

impl EventLevel {
    fn severity(self) -> Severity {
        match self {
            EventLevel::Info => Severity::Info,
            EventLevel::Warn => Severity::Warn,
            EventLevel::Error => Severity::Error,
        }
    }
}

/// A structured log event as delivered to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub level: EventLevel,
    pub message: String,
    pub source: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// Everything the bus can carry. The serialized tag matches the wire
/// names subscribers listen on.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum AppEvent {
    #[serde(rename = "log:event")]
    Log(LogEvent),
    #[serde(rename = "project:status_changed")]
    ProjectStatusChanged { project_id: Uuid, status: String },
}

/// Broadcast channel handle shared across the control plane.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Attach a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Emit a log event at `info` level.
    pub fn info(&self, message: &str, source: &str, fields: &[(&str, &str)]) {
        self.emit(EventLevel::Info, message, source, fields);
    }

    /// Emit a log event at `warn` level.
    pub fn warn(&self, message: &str, source: &str, fields: &[(&str, &str)]) {
        self.emit(EventLevel::Warn, message, source, fields);
    }

    /// Emit a log event at `error` level.
    pub fn error(&self, message: &str, source: &str, fields: &[(&str, &str)]) {
        self.emit(EventLevel::Error, message, source, fields);
    }

    /// Emit a project status change.
    pub fn project_status_changed(&self, project_id: Uuid, status: &str) {
        Logger::info(
            "project status changed",
            &[
                ("project_id", &project_id.to_string()),
                ("status", status),
            ],
        );
        let _ = self.tx.send(AppEvent::ProjectStatusChanged {
            project_id,
            status: status.to_string(),
        });
    }

    fn emit(&self, level: EventLevel, message: &str, source: &str, fields: &[(&str, &str)]) {
        let mut logged: Vec<(&str, &str)> = vec![("source", source)];
        logged.extend_from_slice(fields);
        Logger::log(level.severity(), message, &logged);

        let event = LogEvent {
            level,
            message: message.to_string(),
            source: source.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timestamp: Utc::now(),
        };
        let _ = self.tx.send(AppEvent::Log(event));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
