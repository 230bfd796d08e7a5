//! Builders to construct the scheduler and enforcer from configuration.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{AuditSink, DrfScheduler, QuotaEnforcer, SchedulerError};

/// Build a scheduler and register every configured tenant.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidConfig`] if the configuration fails validation.
pub fn build_scheduler(
    cfg: &SchedulerConfig,
    audit: Option<Box<dyn AuditSink>>,
) -> Result<Arc<DrfScheduler>, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let mut scheduler = DrfScheduler::new(cfg.cluster);
    if let Some(audit) = audit {
        scheduler = scheduler.with_audit(audit);
    }
    for tenant in &cfg.tenants {
        scheduler.register_tenant(&tenant.id, tenant.display_name(), tenant.quota, tenant.weight);
    }
    tracing::info!(
        "scheduler built with {} tenants, cluster {:?}",
        cfg.tenants.len(),
        cfg.cluster
    );
    Ok(Arc::new(scheduler))
}

/// Wrap a scheduler in an enforcer using the configured mode and policy.
#[must_use]
pub fn build_enforcer(cfg: &SchedulerConfig, scheduler: Arc<DrfScheduler>) -> QuotaEnforcer {
    QuotaEnforcer::new(scheduler, cfg.enforcement_mode, cfg.preemption_policy)
}
