//! Tests for audit sink

use batch_dispatch::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("B1", Some("JK1"), AuditAction::Fire, Some("payload".to_string()));

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].scheduler, "B1");
    assert_eq!(events[0].job_key.as_deref(), Some("JK1"));
    assert_eq!(events[0].action, AuditAction::Fire);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("B1", Some("JK1"), AuditAction::Fire, None));
    sink.record(build_audit_event("B1", Some("JK2"), AuditAction::Fire, None));
    sink.record(build_audit_event("B1", Some("JK3"), AuditAction::Fire, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job_key.as_deref(), Some("JK2")); // First one popped
    assert_eq!(events[1].job_key.as_deref(), Some("JK3"));
}

#[test]
fn test_clones_share_buffer() {
    let reader = InMemoryAuditSink::new(10);
    let mut writer = reader.clone();

    writer.record(build_audit_event("B1", None, AuditAction::Pause, None));
    writer.record(build_audit_event("B1", None, AuditAction::Resume, None));

    assert_eq!(reader.events().len(), 2);
    assert_eq!(reader.events_for(AuditAction::Pause).len(), 1);
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event("B1", None, AuditAction::Shutdown, Some("drain".to_string()));

    assert_eq!(event.scheduler, "B1");
    assert_eq!(event.job_key, None);
    assert_eq!(event.action.as_str(), "shutdown");
    assert_eq!(event.payload, Some("drain".to_string()));
    assert!(!event.event_id.is_empty());
    assert!(event.created_at_ms > 0);

    let other = build_audit_event("B1", None, AuditAction::Shutdown, None);
    assert_ne!(event.event_id, other.event_id);
}
