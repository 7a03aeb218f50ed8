//! Logging and event emission.
//!
//! Two surfaces share one vocabulary:
//! - a synchronous structured JSON logger writing to stdout/stderr
//! - a broadcast event bus surfacing `log:event` and
//!   `project:status_changed` payloads to external subscribers
//!
//! Emission is fire-and-forget: the core never depends on a subscriber
//! being attached.

mod events;
mod logger;

pub use events::{AppEvent, EventBus, EventLevel, LogEvent};
pub use logger::{Logger, Severity};
