//! Caller-facing admission models.
//!
//! [`admit`] is an explicit composition of the two admission layers: the
//! advisory [`QuotaEnforcer::enforce_quota`] first, then the committing
//! [`DrfScheduler::schedule_task`](crate::core::DrfScheduler::schedule_task).
//! Either layer can still be called on its own.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::core::{ClusterUtilization, QuotaEnforcer, TaskRequest, TenantStats};

/// Which layer produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStage {
    /// Denied by the quota enforcer.
    Enforcement,
    /// Passed enforcement, denied by the scheduler.
    Scheduling,
    /// Committed.
    Admitted,
}

/// Admission response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionResponse {
    /// Task identifier.
    pub task_id: String,
    /// Tenant identifier.
    pub tenant_id: String,
    /// Whether resources were committed.
    pub admitted: bool,
    /// Layer that decided.
    pub stage: AdmissionStage,
    /// Reason from the deciding layer.
    pub reason: String,
    /// Suggested retry delay in seconds.
    pub suggested_wait_secs: u64,
    /// Tasks preempted during enforcement.
    pub preempted_tasks: Vec<String>,
}

/// Consult the enforcer, then commit through the scheduler if allowed.
pub fn admit(
    enforcer: &QuotaEnforcer,
    cancel: &CancellationToken,
    request: &TaskRequest,
) -> AdmissionResponse {
    let advice = enforcer.enforce_quota(cancel, request);
    let mut response = AdmissionResponse {
        task_id: request.task_id.clone(),
        tenant_id: request.tenant_id.clone(),
        admitted: false,
        stage: AdmissionStage::Enforcement,
        reason: advice.reason,
        suggested_wait_secs: advice.suggested_wait.as_secs(),
        preempted_tasks: advice.preempted_tasks,
    };
    if !advice.allowed {
        return response;
    }

    let decision = enforcer.scheduler().schedule_task(request);
    response.admitted = decision.is_allowed();
    response.stage = if response.admitted {
        AdmissionStage::Admitted
    } else {
        AdmissionStage::Scheduling
    };
    response.reason = decision.reason().to_string();
    response
}

/// Cluster listing payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantListing {
    /// Tenant stats in scheduling order.
    pub tenants: Vec<TenantStats>,
    /// Cluster summary.
    pub cluster: ClusterUtilization,
}

/// Snapshot of every tenant, next-to-serve first.
#[must_use]
pub fn list_tenants(enforcer: &QuotaEnforcer) -> TenantListing {
    let scheduler = enforcer.scheduler();
    TenantListing {
        tenants: scheduler
            .get_scheduling_order()
            .iter()
            .map(crate::core::Tenant::stats)
            .collect(),
        cluster: scheduler.get_cluster_utilization(),
    }
}
