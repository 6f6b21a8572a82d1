//! Structured alerts handed back to the view layer.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A titled, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Caller-supplied sink for alerts.
pub trait AlertReporter: Send + Sync {
    fn report(&self, alert: Alert);
}

/// Reporter that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl AlertReporter for LogReporter {
    fn report(&self, alert: Alert) {
        match alert.severity {
            Severity::Error => tracing::error!(title = %alert.title, "{}", alert.message),
            Severity::Warning => tracing::warn!(title = %alert.title, "{}", alert.message),
            Severity::Success | Severity::Info => {
                tracing::info!(title = %alert.title, "{}", alert.message)
            }
        }
    }
}

/// Reporter that keeps every alert, in order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    alerts: Mutex<Vec<Alert>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the alerts reported so far.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl AlertReporter for CollectingReporter {
    fn report(&self, alert: Alert) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert);
        }
    }
}

impl<F> AlertReporter for F
where
    F: Fn(Alert) + Send + Sync,
{
    fn report(&self, alert: Alert) {
        self(alert)
    }
}
