//! Tests for the admission API

use std::sync::Arc;

use drf_scheduler::core::{
    DrfScheduler, EnforcementMode, PreemptionPolicy, QuotaEnforcer, ResourceVector, TaskRequest,
};
use drf_scheduler::runtime::{admit, list_tenants, AdmissionStage};
use tokio_util::sync::CancellationToken;

fn enforcer() -> QuotaEnforcer {
    let scheduler = Arc::new(DrfScheduler::new(ResourceVector::new(
        100.0, 1000.0, 10.0, 5000.0,
    )));
    scheduler.register_tenant("a", "A", ResourceVector::new(20.0, 200.0, 2.0, 100.0), 1.0);
    scheduler.register_tenant("b", "B", ResourceVector::new(20.0, 200.0, 2.0, 100.0), 1.0);
    QuotaEnforcer::new(scheduler, EnforcementMode::Hard, PreemptionPolicy::Never)
}

#[test]
fn test_admit_commits_when_both_layers_agree() {
    let e = enforcer();
    let req = TaskRequest::new("a", "t1", ResourceVector::new(5.0, 50.0, 1.0, 10.0));
    let resp = admit(&e, &CancellationToken::new(), &req);
    assert!(resp.admitted);
    assert_eq!(resp.stage, AdmissionStage::Admitted);
    assert_eq!(resp.reason, "scheduled");
    assert!((e.scheduler().tenant("a").unwrap().allocated_cpu - 5.0).abs() < f64::EPSILON);
}

#[test]
fn test_admit_stops_at_enforcement() {
    let e = enforcer();
    let req = TaskRequest::new("a", "t1", ResourceVector::new(25.0, 0.0, 0.0, 0.0));
    let resp = admit(&e, &CancellationToken::new(), &req);
    assert!(!resp.admitted);
    assert_eq!(resp.stage, AdmissionStage::Enforcement);
    assert!(resp.reason.contains("CPU quota exceeded"));
    assert_eq!(resp.suggested_wait_secs, 600);
    assert!(e.scheduler().tenant("a").unwrap().allocated_cpu.abs() < f64::EPSILON);
}

#[test]
fn test_admit_disk_only_denied_by_scheduler() {
    let e = enforcer();
    let req = TaskRequest::new("a", "t1", ResourceVector::new(1.0, 1.0, 0.0, 500.0));
    let resp = admit(&e, &CancellationToken::new(), &req);
    assert!(!resp.admitted);
    assert_eq!(resp.stage, AdmissionStage::Scheduling);
    assert_eq!(resp.reason, "quota exceeded");
}

#[test]
fn test_list_tenants_in_scheduling_order() {
    let e = enforcer();
    let req = TaskRequest::new("a", "t1", ResourceVector::new(10.0, 0.0, 0.0, 0.0));
    assert!(admit(&e, &CancellationToken::new(), &req).admitted);

    let listing = list_tenants(&e);
    let ids: Vec<&str> = listing.tenants.iter().map(|t| t.tenant_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert!((listing.cluster.cpu_utilization - 0.1).abs() < 1e-12);
    assert_eq!(listing.cluster.tenant_count, 2);
}
