//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use drf_scheduler::config::scheduler::MAX_MONITOR_INTERVAL_SECS;
use drf_scheduler::config::{SchedulerConfig, TenantConfig};
use drf_scheduler::core::{EnforcementMode, PreemptionPolicy, ResourceVector};

fn tenant(id: &str) -> TenantConfig {
    TenantConfig {
        id: id.to_string(),
        name: String::new(),
        quota: ResourceVector::new(10.0, 100.0, 1.0, 100.0),
        weight: 1.0,
    }
}

fn config() -> SchedulerConfig {
    let mut cfg = SchedulerConfig::new(ResourceVector::new(100.0, 1000.0, 10.0, 5000.0));
    cfg.tenants = vec![tenant("a"), tenant("b")];
    cfg
}

#[test]
fn test_scheduler_config_validation() {
    assert!(config().validate().is_ok());
}

#[test]
fn test_negative_capacity_rejected() {
    let mut cfg = config();
    cfg.cluster.cpu = -1.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_nan_quota_rejected() {
    let mut cfg = config();
    cfg.tenants[0].quota.memory = f64::NAN;
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("tenant `a`"), "{err}");
}

#[test]
fn test_duplicate_tenant_rejected() {
    let mut cfg = config();
    cfg.tenants.push(tenant("a"));
    assert!(cfg.validate().is_err());
}

#[test]
fn test_empty_tenant_id_rejected() {
    let mut cfg = config();
    cfg.tenants.push(tenant(""));
    assert!(cfg.validate().is_err());
}

#[test]
fn test_zero_monitor_interval_rejected() {
    let mut cfg = config();
    cfg.monitor_interval_secs = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_monitor_interval_upper_bound() {
    let mut cfg = config();
    cfg.monitor_interval_secs = MAX_MONITOR_INTERVAL_SECS;
    assert!(cfg.validate().is_ok());

    cfg.monitor_interval_secs = MAX_MONITOR_INTERVAL_SECS + 1;
    assert!(cfg.validate().is_err());

    let err = SchedulerConfig::from_json_str(
        r#"{"cluster":{"cpu":1,"memory":1},"monitor_interval_secs":18446744073709551615}"#,
    )
    .unwrap_err();
    assert!(err.contains("monitor_interval_secs"), "{err}");
}

#[test]
fn test_non_positive_weight_is_accepted() {
    let mut cfg = config();
    cfg.tenants[0].weight = -2.0;
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "cluster": {"cpu": 100, "memory": 1000, "gpu": 10, "disk": 5000},
        "tenants": [
            {"id": "a", "name": "Team A", "quota": {"cpu": 20, "memory": 200, "gpu": 2, "disk": 1000}, "weight": 2.0},
            {"id": "b", "quota": {"cpu": 10}}
        ],
        "enforcement_mode": "adaptive",
        "preemption_policy": "low_priority",
        "monitor_interval_secs": 30
    }"#;

    let cfg = SchedulerConfig::from_json_str(json).expect("valid config");
    assert_eq!(cfg.tenants.len(), 2);
    assert_eq!(cfg.enforcement_mode, EnforcementMode::Adaptive);
    assert_eq!(cfg.preemption_policy, PreemptionPolicy::LowPriority);
    assert_eq!(cfg.monitor_interval(), Duration::from_secs(30));
    assert_eq!(cfg.tenants[0].display_name(), "Team A");
    assert_eq!(cfg.tenants[1].display_name(), "b");
    assert!((cfg.tenants[1].weight - 1.0).abs() < f64::EPSILON);
    assert_eq!(cfg.tenants[1].quota, ResourceVector::new(10.0, 0.0, 0.0, 0.0));
}

#[test]
fn test_json_defaults() {
    let cfg = SchedulerConfig::from_json_str(r#"{"cluster": {"cpu": 8, "memory": 32}}"#)
        .expect("valid config");
    assert!(cfg.tenants.is_empty());
    assert_eq!(cfg.enforcement_mode, EnforcementMode::Hard);
    assert_eq!(cfg.preemption_policy, PreemptionPolicy::Never);
    assert_eq!(cfg.monitor_interval_secs, 60);
}

#[test]
fn test_malformed_json_rejected() {
    let err = SchedulerConfig::from_json_str("{not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_overrides_applied() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("DRF_ENFORCEMENT_MODE", "soft"),
        ("DRF_MONITOR_INTERVAL_SECS", "15"),
    ]);
    let mut cfg = config();
    cfg.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()))
        .expect("overrides apply");
    assert_eq!(cfg.enforcement_mode, EnforcementMode::Soft);
    assert_eq!(cfg.monitor_interval_secs, 15);
}

#[test]
fn test_bad_override_rejected() {
    let mut cfg = config();
    assert!(cfg
        .apply_overrides(|key| (key == "DRF_ENFORCEMENT_MODE").then(|| "strict".to_string()))
        .is_err());

    let mut cfg = config();
    assert!(cfg
        .apply_overrides(|key| (key == "DRF_MONITOR_INTERVAL_SECS").then(|| "0".to_string()))
        .is_err());
}
