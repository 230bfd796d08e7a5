//! Quota enforcement policy layer on top of [`DrfScheduler`].
//!
//! [`QuotaEnforcer::enforce_quota`] gives an advisory admission decision. It only
//! reads scheduler state and never commits resources; callers that want the
//! allocation still go through [`DrfScheduler::schedule_task`]. The two layers
//! check different things: the enforcer looks at CPU, memory and GPU quota
//! headroom only, while the scheduler also checks disk quota and cluster capacity.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::drf::DrfScheduler;
use crate::core::resources::{ResourceKind, TaskRequest};
use crate::core::tenant::ClusterUtilization;
use crate::core::SchedulerError;

/// Wait suggested to callers denied for quota reasons.
pub const DEFAULT_SUGGESTED_WAIT: Duration = Duration::from_secs(10 * 60);

/// Reserved grace period before violations escalate. Not consulted yet.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5 * 60);

/// Adaptive mode admits over-quota requests while CPU and memory utilization stay below this.
pub const ADAPTIVE_UTILIZATION_THRESHOLD: f64 = 0.7;

/// How quota breaches are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    /// Deny any request that would exceed quota.
    #[default]
    Hard,
    /// Record the violation, admit anyway.
    Soft,
    /// Admit over-quota requests only while the cluster is lightly loaded.
    Adaptive,
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
            Self::Adaptive => "adaptive",
        })
    }
}

impl FromStr for EnforcementMode {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "soft" => Ok(Self::Soft),
            "adaptive" => Ok(Self::Adaptive),
            other => Err(SchedulerError::InvalidConfig(format!(
                "unknown enforcement mode `{other}`"
            ))),
        }
    }
}

/// Which running tasks a [`Preemptor`] should reclaim first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreemptionPolicy {
    /// Never preempt.
    #[default]
    Never,
    /// Lowest-priority tasks first.
    LowPriority,
    /// Oldest running task first.
    Oldest,
}

/// Extension point for reclaiming resources from running tasks.
///
/// An implementation selects tasks according to the policy (`LowPriority`: lowest
/// priority first, `Oldest`: oldest running task first), terminates them, and
/// returns their ids. An empty list means nothing was preempted.
pub trait Preemptor: Send + Sync {
    /// Try to free room for `request`.
    fn preempt(&self, policy: PreemptionPolicy, request: &TaskRequest) -> Vec<String>;
}

/// Default preemptor that never reclaims anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPreemptor;

impl Preemptor for NoopPreemptor {
    fn preempt(&self, _policy: PreemptionPolicy, _request: &TaskRequest) -> Vec<String> {
        Vec::new()
    }
}

/// Advisory decision returned by [`QuotaEnforcer::enforce_quota`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementResult {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Human-readable reason.
    pub reason: String,
    /// How long a denied caller should wait before retrying; zero when allowed.
    pub suggested_wait: Duration,
    /// Ids of tasks preempted to make room.
    pub preempted_tasks: Vec<String>,
}

impl EnforcementResult {
    fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            suggested_wait: Duration::ZERO,
            preempted_tasks: Vec::new(),
        }
    }

    fn deny(reason: impl Into<String>, suggested_wait: Duration) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            suggested_wait,
            preempted_tasks: Vec::new(),
        }
    }
}

/// One tenant's line in a [`QuotaReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantQuotaStatus {
    /// Tenant identifier.
    pub tenant_id: String,
    /// CPU usage / quota.
    pub cpu_utilization: f64,
    /// Memory usage / quota.
    pub memory_utilization: f64,
    /// GPU usage / quota.
    pub gpu_utilization: f64,
    /// Weighted dominant share.
    pub weighted_share: f64,
    /// Recorded violations.
    pub violations: u64,
}

/// Snapshot logged on every monitoring tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaReport {
    /// Tenants in scheduling order.
    pub tenants: Vec<TenantQuotaStatus>,
    /// Cluster summary.
    pub cluster: ClusterUtilization,
}

/// Policy wrapper giving advisory admission decisions and tracking violations.
pub struct QuotaEnforcer {
    scheduler: Arc<DrfScheduler>,
    enforcement_mode: RwLock<EnforcementMode>,
    preemption_policy: PreemptionPolicy,
    violation_counts: Mutex<HashMap<String, u64>>,
    grace_period: Duration,
    preemptor: Box<dyn Preemptor>,
}

impl QuotaEnforcer {
    /// Create an enforcer over a shared scheduler.
    #[must_use]
    pub fn new(
        scheduler: Arc<DrfScheduler>,
        mode: EnforcementMode,
        policy: PreemptionPolicy,
    ) -> Self {
        Self {
            scheduler,
            enforcement_mode: RwLock::new(mode),
            preemption_policy: policy,
            violation_counts: Mutex::new(HashMap::new()),
            grace_period: DEFAULT_GRACE_PERIOD,
            preemptor: Box::new(NoopPreemptor),
        }
    }

    /// Replace the default no-op preemptor.
    #[must_use]
    pub fn with_preemptor(mut self, preemptor: Box<dyn Preemptor>) -> Self {
        self.preemptor = preemptor;
        self
    }

    /// Scheduler consulted by this enforcer.
    #[must_use]
    pub const fn scheduler(&self) -> &Arc<DrfScheduler> {
        &self.scheduler
    }

    /// Current enforcement mode.
    #[must_use]
    pub fn enforcement_mode(&self) -> EnforcementMode {
        *self.enforcement_mode.read()
    }

    /// Switch enforcement mode for subsequent calls.
    pub fn set_enforcement_mode(&self, mode: EnforcementMode) {
        *self.enforcement_mode.write() = mode;
        tracing::info!("quota enforcement mode set to {}", mode);
    }

    /// Configured preemption policy.
    #[must_use]
    pub const fn preemption_policy(&self) -> PreemptionPolicy {
        self.preemption_policy
    }

    /// Reserved grace period.
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Decide whether `request` may proceed under the current mode.
    ///
    /// Purely advisory: scheduler state is never touched. `_cancel` is accepted
    /// for signature symmetry with [`Self::monitor_quotas`] and is not inspected.
    ///
    /// Dimensions are checked CPU, then memory, then GPU. When several are over
    /// quota the reason names the last one checked. Disk is not checked.
    pub fn enforce_quota(
        &self,
        _cancel: &CancellationToken,
        request: &TaskRequest,
    ) -> EnforcementResult {
        let Some(stats) = self.scheduler.get_tenant_stats(&request.tenant_id) else {
            return EnforcementResult::deny("tenant not found", Duration::ZERO);
        };

        let mut exceed_reason = None;
        for kind in ResourceKind::FAIRNESS {
            let requested = request.resources.get(kind);
            let remaining = stats.quota_remaining.get(kind);
            if requested > remaining {
                exceed_reason = Some(format!(
                    "{kind} quota exceeded: requested {requested:.2}, remaining {remaining:.2}"
                ));
            }
        }

        let Some(exceed_reason) = exceed_reason else {
            return EnforcementResult::allow("within quota limits");
        };

        match self.enforcement_mode() {
            EnforcementMode::Hard => {
                self.record_violation(&request.tenant_id);
                tracing::warn!(
                    "hard quota denial for tenant {}: {}",
                    request.tenant_id,
                    exceed_reason
                );
                return EnforcementResult::deny(exceed_reason, self.estimate_wait_time(request));
            }
            EnforcementMode::Soft => {
                self.record_violation(&request.tenant_id);
                tracing::warn!(
                    "soft quota violation for tenant {}: {}",
                    request.tenant_id,
                    exceed_reason
                );
            }
            EnforcementMode::Adaptive => {
                let cluster = self.scheduler.get_cluster_utilization();
                if cluster.cpu_utilization < ADAPTIVE_UTILIZATION_THRESHOLD
                    && cluster.memory_utilization < ADAPTIVE_UTILIZATION_THRESHOLD
                {
                    tracing::debug!(
                        "adaptive mode admitting tenant {} over quota, cluster cpu={:.2} mem={:.2}",
                        request.tenant_id,
                        cluster.cpu_utilization,
                        cluster.memory_utilization
                    );
                    return EnforcementResult::allow(
                        "within quota limits (adaptive mode, cluster at low utilization)",
                    );
                }
                self.record_violation(&request.tenant_id);
                return EnforcementResult::deny(
                    format!("{exceed_reason} (adaptive mode, cluster at high utilization)"),
                    self.estimate_wait_time(request),
                );
            }
        }

        if self.preemption_policy != PreemptionPolicy::Never {
            let preempted = self.attempt_preemption(request);
            if !preempted.is_empty() {
                tracing::info!(
                    "preempted {} task(s) for tenant {}",
                    preempted.len(),
                    request.tenant_id
                );
                return EnforcementResult {
                    preempted_tasks: preempted,
                    ..EnforcementResult::allow("scheduled after preemption")
                };
            }
        }

        EnforcementResult::allow("within quota limits")
    }

    /// Increment a tenant's violation counter.
    pub fn record_violation(&self, tenant_id: &str) {
        let mut counts = self.violation_counts.lock();
        *counts.entry(tenant_id.to_string()).or_insert(0) += 1;
    }

    /// Violations recorded for a tenant.
    #[must_use]
    pub fn get_violation_count(&self, tenant_id: &str) -> u64 {
        self.violation_counts
            .lock()
            .get(tenant_id)
            .copied()
            .unwrap_or(0)
    }

    /// Clear a tenant's violation counter.
    pub fn reset_violations(&self, tenant_id: &str) {
        self.violation_counts.lock().remove(tenant_id);
    }

    /// Suggested retry delay for a denied request.
    // TODO: derive from observed task durations once release timestamps are tracked.
    #[must_use]
    pub const fn estimate_wait_time(&self, _request: &TaskRequest) -> Duration {
        DEFAULT_SUGGESTED_WAIT
    }

    /// Ask the configured [`Preemptor`] to reclaim room for `request`.
    #[must_use]
    pub fn attempt_preemption(&self, request: &TaskRequest) -> Vec<String> {
        self.preemptor.preempt(self.preemption_policy, request)
    }

    /// Per-tenant quota status in scheduling order plus a cluster summary.
    #[must_use]
    pub fn quota_report(&self) -> QuotaReport {
        let tenants = self
            .scheduler
            .get_scheduling_order()
            .into_iter()
            .map(|tenant| {
                let stats = tenant.stats();
                TenantQuotaStatus {
                    violations: self.get_violation_count(&tenant.id),
                    tenant_id: tenant.id,
                    cpu_utilization: stats.cpu_utilization,
                    memory_utilization: stats.memory_utilization,
                    gpu_utilization: stats.gpu_utilization,
                    weighted_share: stats.weighted_share,
                }
            })
            .collect();
        QuotaReport {
            tenants,
            cluster: self.scheduler.get_cluster_utilization(),
        }
    }

    /// Log one line per tenant and one cluster summary line.
    pub fn log_quota_status(&self) {
        let report = self.quota_report();
        for t in &report.tenants {
            tracing::info!(
                "tenant {}: cpu={:.1}% mem={:.1}% gpu={:.1}% weighted_share={:.3} violations={}",
                t.tenant_id,
                t.cpu_utilization * 100.0,
                t.memory_utilization * 100.0,
                t.gpu_utilization * 100.0,
                t.weighted_share,
                t.violations
            );
        }
        tracing::info!(
            "cluster: cpu={:.1}% mem={:.1}% gpu={:.1}% tenants={}",
            report.cluster.cpu_utilization * 100.0,
            report.cluster.memory_utilization * 100.0,
            report.cluster.gpu_utilization * 100.0,
            report.cluster.tenant_count
        );
    }

    /// Log quota status every `interval` until `cancel` fires.
    ///
    /// The first report is emitted one interval after the call. A zero interval,
    /// or one too large to schedule, returns immediately.
    pub async fn monitor_quotas(&self, cancel: CancellationToken, interval: Duration) {
        if interval.is_zero() {
            tracing::warn!("quota monitor not started: zero interval");
            return;
        }
        let Some(start) = tokio::time::Instant::now().checked_add(interval) else {
            tracing::warn!("quota monitor not started: interval {:?} out of range", interval);
            return;
        };
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("quota monitor stopped");
                    return;
                }
                _ = ticker.tick() => self.log_quota_status(),
            }
        }
    }
}

impl fmt::Debug for QuotaEnforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotaEnforcer")
            .field("scheduler", &self.scheduler)
            .field("enforcement_mode", &self.enforcement_mode())
            .field("preemption_policy", &self.preemption_policy)
            .field("grace_period", &self.grace_period)
            .finish_non_exhaustive()
    }
}
