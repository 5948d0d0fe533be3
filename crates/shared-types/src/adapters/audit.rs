use parking_lot::Mutex;

use crate::ports::{AuditEvent, AuditOutcome, AuditSink};

/// Forwards audit events to the `audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match &event.outcome {
            AuditOutcome::Success => tracing::info!(
                target: "audit",
                action = %event.action,
                network_id = event.network_id,
                details = %event.details,
                "operation succeeded"
            ),
            AuditOutcome::Failure { message } => tracing::warn!(
                target: "audit",
                action = %event.action,
                network_id = event.network_id,
                details = %event.details,
                error = %message,
                "operation failed"
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.action.clone()).collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().push(event);
    }
}
