//! Audit sink implementations.
//!
//! Records admission decisions, releases and registrations made by the scheduler.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// Scheduler action captured by an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Tenant registered or overwritten.
    Register,
    /// Request admitted and committed.
    Schedule,
    /// Request denied.
    Reject,
    /// Resources returned.
    Release,
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related task identifier, empty for tenant-level actions.
    pub task_id: String,
    /// Tenant identifier.
    pub tenant: String,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Reason string or other context.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an audit event with a fresh id and timestamp.
pub fn build_audit_event(
    task_id: impl Into<String>,
    tenant: impl Into<String>,
    action: AuditAction,
    payload: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        task_id: task_id.into(),
        tenant: tenant.into(),
        action,
        created_at_ms: now_ms(),
        payload,
    }
}
