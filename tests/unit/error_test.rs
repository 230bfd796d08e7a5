//! Tests for error types

use drf_scheduler::core::{ResourceKind, ScheduleDecision, SchedulerError};

#[test]
fn test_tenant_not_found_error() {
    let err = SchedulerError::TenantNotFound("team-a".to_string());
    assert_eq!(format!("{}", err), "tenant not found: team-a");
}

#[test]
fn test_insufficient_capacity_error() {
    let err = SchedulerError::InsufficientCapacity;
    assert_eq!(format!("{}", err), "insufficient cluster resources");
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("no cluster".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: no cluster");
}

#[test]
fn test_quota_denial_maps_to_error() {
    let err = ScheduleDecision::QuotaExceeded(ResourceKind::Memory)
        .into_result("team-a")
        .unwrap_err();
    assert_eq!(
        format!("{}", err),
        "quota exceeded: Memory quota exceeded for tenant team-a"
    );
}
