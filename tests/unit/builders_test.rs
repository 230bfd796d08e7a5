//! Tests for builder modules

use drf_scheduler::builders::{build_enforcer, build_scheduler};
use drf_scheduler::config::{SchedulerConfig, TenantConfig};
use drf_scheduler::core::{
    EnforcementMode, InMemoryAuditSink, PreemptionPolicy, ResourceVector, SchedulerError,
};

fn config() -> SchedulerConfig {
    let mut cfg = SchedulerConfig::new(ResourceVector::new(100.0, 1000.0, 10.0, 5000.0));
    cfg.enforcement_mode = EnforcementMode::Soft;
    cfg.preemption_policy = PreemptionPolicy::Oldest;
    cfg.tenants = vec![
        TenantConfig {
            id: "a".into(),
            name: "Team A".into(),
            quota: ResourceVector::new(20.0, 200.0, 2.0, 1000.0),
            weight: 2.0,
        },
        TenantConfig {
            id: "b".into(),
            name: String::new(),
            quota: ResourceVector::new(10.0, 100.0, 1.0, 500.0),
            weight: 0.0,
        },
    ];
    cfg
}

#[test]
fn test_build_scheduler_registers_tenants() {
    let scheduler = build_scheduler(&config(), None).expect("build");
    assert_eq!(scheduler.get_cluster_utilization().tenant_count, 2);

    let a = scheduler.tenant("a").expect("tenant a");
    assert_eq!(a.name, "Team A");
    assert!((a.weight - 2.0).abs() < f64::EPSILON);

    let b = scheduler.tenant("b").expect("tenant b");
    assert_eq!(b.name, "b");
    assert!((b.weight - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_build_scheduler_with_audit() {
    let scheduler =
        build_scheduler(&config(), Some(Box::new(InMemoryAuditSink::new(16)))).expect("build");
    assert_eq!(scheduler.cluster_total(), ResourceVector::new(100.0, 1000.0, 10.0, 5000.0));
}

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let mut cfg = config();
    cfg.cluster.memory = f64::INFINITY;
    assert!(matches!(
        build_scheduler(&cfg, None),
        Err(SchedulerError::InvalidConfig(_))
    ));
}

#[test]
fn test_build_enforcer_uses_config_policy() {
    let cfg = config();
    let scheduler = build_scheduler(&cfg, None).expect("build");
    let enforcer = build_enforcer(&cfg, scheduler);
    assert_eq!(enforcer.enforcement_mode(), EnforcementMode::Soft);
    assert_eq!(enforcer.preemption_policy(), PreemptionPolicy::Oldest);
}
