//! Tests for the audit trail

use std::sync::Arc;

use drf_scheduler::core::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, DrfScheduler, InMemoryAuditSink,
    ResourceVector, TaskRequest,
};
use parking_lot::Mutex;

/// Sink sharing its buffer with the test.
struct SharedSink(Arc<Mutex<Vec<AuditEvent>>>);

impl AuditSink for SharedSink {
    fn record(&mut self, event: AuditEvent) {
        self.0.lock().push(event);
    }
}

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    sink.record(build_audit_event(
        "task1",
        "tenant1",
        AuditAction::Schedule,
        Some("scheduled".to_string()),
    ));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].task_id, "task1");
    assert_eq!(events[0].tenant, "tenant1");
    assert_eq!(events[0].action, AuditAction::Schedule);
}

#[test]
fn test_scheduler_records_each_decision() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let scheduler = DrfScheduler::new(ResourceVector::new(10.0, 10.0, 0.0, 0.0))
        .with_audit(Box::new(SharedSink(Arc::clone(&events))));

    scheduler.register_tenant("a", "A", ResourceVector::new(5.0, 5.0, 0.0, 0.0), 1.0);
    let ok = TaskRequest::new("a", "t1", ResourceVector::new(2.0, 2.0, 0.0, 0.0));
    let too_big = TaskRequest::new("a", "t2", ResourceVector::new(9.0, 0.0, 0.0, 0.0));
    assert!(scheduler.schedule_task(&ok).is_allowed());
    assert!(!scheduler.schedule_task(&too_big).is_allowed());
    scheduler
        .release_resources("a", &ok.resources)
        .expect("release");
    scheduler
        .release_resources("ghost", &ok.resources)
        .expect("release");

    let actions: Vec<AuditAction> = events.lock().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Register,
            AuditAction::Schedule,
            AuditAction::Reject,
            AuditAction::Release,
        ]
    );
    assert_eq!(events.lock()[2].payload.as_deref(), Some("quota exceeded"));
}
