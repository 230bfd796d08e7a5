//! Weighted Dominant Resource Fairness scheduler.
//!
//! The scheduler owns the tenant table and the fixed cluster capacity. A single
//! `parking_lot::RwLock` guards the whole table: registration, scheduling and
//! release take it exclusively, queries take it shared. Every critical section is
//! pure in-memory work bounded by the tenant count.
//!
//! Admission through [`DrfScheduler::schedule_task`] checks, in order:
//!
//! 1. the tenant exists,
//! 2. `usage + request <= quota` on all four dimensions (CPU, memory, GPU, disk),
//! 3. the cluster-wide sum of allocated CPU, memory and GPU plus the request fits
//!    the cluster capacity. Disk is not part of the cluster check.
//!
//! Fairness ranks tenants by weighted dominant share, lowest first.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::resources::{ResourceKind, ResourceVector, TaskRequest};
use crate::core::tenant::{ClusterUtilization, Tenant, TenantStats};
use crate::core::SchedulerError;

/// Outcome of [`DrfScheduler::schedule_task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// Resources were committed to the tenant.
    Scheduled,
    /// No tenant with the requested id.
    TenantNotFound,
    /// The request would exceed the tenant quota on this dimension.
    QuotaExceeded(ResourceKind),
    /// The cluster lacks capacity on this dimension.
    InsufficientCapacity(ResourceKind),
}

impl ScheduleDecision {
    /// Whether the request was admitted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Scheduled)
    }

    /// Short human-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::TenantNotFound => "tenant not found",
            Self::QuotaExceeded(_) => "quota exceeded",
            Self::InsufficientCapacity(_) => "insufficient cluster resources",
        }
    }

    /// Map a denial onto [`SchedulerError`] for callers that propagate with `?`.
    ///
    /// # Errors
    ///
    /// Returns the error matching the denial; `Scheduled` is `Ok(())`.
    pub fn into_result(self, tenant_id: &str) -> Result<(), SchedulerError> {
        match self {
            Self::Scheduled => Ok(()),
            Self::TenantNotFound => Err(SchedulerError::TenantNotFound(tenant_id.to_string())),
            Self::QuotaExceeded(kind) => Err(SchedulerError::QuotaExceeded(format!(
                "{kind} quota exceeded for tenant {tenant_id}"
            ))),
            Self::InsufficientCapacity(_) => Err(SchedulerError::InsufficientCapacity),
        }
    }
}

/// Multi-tenant DRF allocator with per-tenant quotas.
pub struct DrfScheduler {
    cluster_total: ResourceVector,
    tenants: RwLock<HashMap<String, Tenant>>,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
}

impl DrfScheduler {
    /// Create a scheduler with an empty tenant table and fixed capacity.
    #[must_use]
    pub fn new(cluster_total: ResourceVector) -> Self {
        Self {
            cluster_total,
            tenants: RwLock::new(HashMap::new()),
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Mutex::new(audit));
        self
    }

    /// Fixed cluster capacity.
    #[must_use]
    pub const fn cluster_total(&self) -> ResourceVector {
        self.cluster_total
    }

    /// Register a tenant, silently replacing any tenant with the same id.
    ///
    /// Weights `<= 0` are normalized to `1.0`.
    pub fn register_tenant(&self, id: &str, name: &str, quota: ResourceVector, weight: f64) {
        let tenant = Tenant::new(id, name, quota, weight);
        let replaced = {
            let mut tenants = self.tenants.write();
            tenants.insert(id.to_string(), tenant).is_some()
        };
        if replaced {
            tracing::warn!("tenant {} re-registered, previous accounting discarded", id);
        } else {
            tracing::info!("registered tenant {} ({})", id, name);
        }
        self.record_audit("", id, AuditAction::Register, None);
    }

    /// Admit and commit a request, or explain why not.
    pub fn schedule_task(&self, request: &TaskRequest) -> ScheduleDecision {
        let decision = {
            let mut tenants = self.tenants.write();
            let decision = self.admit(&tenants, request);
            if decision.is_allowed() {
                if let Some(tenant) = tenants.get_mut(&request.tenant_id) {
                    tenant.allocate(&request.resources);
                    tenant.update_shares(&self.cluster_total);
                }
            }
            decision
        };

        match decision {
            ScheduleDecision::Scheduled => {
                tracing::debug!(
                    "task {} scheduled for tenant {}",
                    request.task_id,
                    request.tenant_id
                );
                self.record_audit(
                    &request.task_id,
                    &request.tenant_id,
                    AuditAction::Schedule,
                    None,
                );
            }
            denied => {
                tracing::warn!(
                    tenant = %request.tenant_id,
                    task = %request.task_id,
                    detail = ?denied,
                    "task rejected: {}",
                    denied.reason()
                );
                self.record_audit(
                    &request.task_id,
                    &request.tenant_id,
                    AuditAction::Reject,
                    Some(denied.reason().to_string()),
                );
            }
        }
        decision
    }

    /// Quota and capacity checks against a locked table.
    fn admit(&self, tenants: &HashMap<String, Tenant>, request: &TaskRequest) -> ScheduleDecision {
        let Some(tenant) = tenants.get(&request.tenant_id) else {
            return ScheduleDecision::TenantNotFound;
        };

        if let Some(kind) = (tenant.usage + request.resources).first_exceeding(&tenant.quota) {
            return ScheduleDecision::QuotaExceeded(kind);
        }

        let allocated = tenants
            .values()
            .fold(ResourceVector::ZERO, |acc, t| acc + t.allocated());
        let wanted = allocated + request.resources;
        for kind in ResourceKind::FAIRNESS {
            if wanted.get(kind) > self.cluster_total.get(kind) {
                return ScheduleDecision::InsufficientCapacity(kind);
            }
        }
        ScheduleDecision::Scheduled
    }

    /// Return resources held by a tenant.
    ///
    /// Allocation and usage are floored at zero. An unknown tenant is a no-op.
    ///
    /// # Errors
    ///
    /// Never returns an error at present; an unknown tenant is logged at debug level.
    pub fn release_resources(
        &self,
        tenant_id: &str,
        resources: &ResourceVector,
    ) -> Result<(), SchedulerError> {
        let found = {
            let mut tenants = self.tenants.write();
            tenants.get_mut(tenant_id).map(|tenant| {
                tenant.release(resources);
                tenant.update_shares(&self.cluster_total);
            })
        };

        if found.is_some() {
            tracing::debug!("released resources for tenant {}", tenant_id);
            self.record_audit("", tenant_id, AuditAction::Release, None);
        } else {
            tracing::debug!("release for unknown tenant {} ignored", tenant_id);
        }
        Ok(())
    }

    /// All tenants ordered by ascending weighted share, then tenant id.
    ///
    /// The head of the list is the tenant that should be served next.
    #[must_use]
    pub fn get_scheduling_order(&self) -> Vec<Tenant> {
        let mut order: Vec<Tenant> = self.tenants.read().values().cloned().collect();
        order.sort_by(|a, b| {
            a.weighted_share
                .total_cmp(&b.weighted_share)
                .then_with(|| a.id.cmp(&b.id))
        });
        order
    }

    /// Derived statistics for one tenant, `None` if unknown.
    #[must_use]
    pub fn get_tenant_stats(&self, tenant_id: &str) -> Option<TenantStats> {
        self.tenants.read().get(tenant_id).map(Tenant::stats)
    }

    /// Copy of a tenant record, `None` if unknown.
    #[must_use]
    pub fn tenant(&self, tenant_id: &str) -> Option<Tenant> {
        self.tenants.read().get(tenant_id).cloned()
    }

    /// Cluster-wide allocated / capacity over CPU, memory and GPU.
    ///
    /// Zero-capacity dimensions yield `NaN` (or `Inf`).
    #[must_use]
    pub fn get_cluster_utilization(&self) -> ClusterUtilization {
        let tenants = self.tenants.read();
        let allocated = tenants
            .values()
            .fold(ResourceVector::ZERO, |acc, t| acc + t.allocated());
        ClusterUtilization {
            cpu_utilization: allocated.cpu / self.cluster_total.cpu,
            memory_utilization: allocated.memory / self.cluster_total.memory,
            gpu_utilization: allocated.gpu / self.cluster_total.gpu,
            tenant_count: tenants.len(),
        }
    }

    fn record_audit(
        &self,
        task_id: &str,
        tenant: &str,
        action: AuditAction,
        payload: Option<String>,
    ) {
        if let Some(audit) = &self.audit {
            audit
                .lock()
                .record(build_audit_event(task_id, tenant, action, payload));
        }
    }
}

impl std::fmt::Debug for DrfScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrfScheduler")
            .field("cluster_total", &self.cluster_total)
            .field("tenants", &self.tenants.read().len())
            .field("audit", &self.audit.is_some())
            .finish()
    }
}
