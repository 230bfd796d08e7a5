//! Tenant accounting records and derived statistics.

use serde::{Deserialize, Serialize};

use crate::core::resources::ResourceVector;

/// One tenant's quota, weight and live consumption.
///
/// `allocated_cpu`, `allocated_memory` and `allocated_gpu` mirror the matching
/// `usage` fields and feed fairness. Disk has no mirror and never affects shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// DRF weight, always > 0.
    pub weight: f64,
    /// Hard per-tenant ceiling, fixed at registration.
    pub quota: ResourceVector,
    /// Current consumption across all four dimensions.
    pub usage: ResourceVector,
    /// Allocated CPU cores.
    pub allocated_cpu: f64,
    /// Allocated memory.
    pub allocated_memory: f64,
    /// Allocated GPUs.
    pub allocated_gpu: f64,
    /// Max over CPU/Memory/GPU of allocated / cluster total.
    pub dominant_share: f64,
    /// `dominant_share / weight`.
    pub weighted_share: f64,
}

impl Tenant {
    /// Create an empty tenant. Weights `<= 0` are normalized to `1.0`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        quota: ResourceVector,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight: normalize_weight(weight),
            quota,
            usage: ResourceVector::ZERO,
            allocated_cpu: 0.0,
            allocated_memory: 0.0,
            allocated_gpu: 0.0,
            dominant_share: 0.0,
            weighted_share: 0.0,
        }
    }

    /// Add an admitted request to the allocation mirrors and usage.
    pub(crate) fn allocate(&mut self, request: &ResourceVector) {
        self.allocated_cpu += request.cpu;
        self.allocated_memory += request.memory;
        self.allocated_gpu += request.gpu;
        self.usage += *request;
    }

    /// Return resources. Every field is floored at zero and residue smaller than
    /// [`RELEASE_EPSILON`] snaps to exactly zero.
    pub(crate) fn release(&mut self, resources: &ResourceVector) {
        self.allocated_cpu = settle(self.allocated_cpu - resources.cpu);
        self.allocated_memory = settle(self.allocated_memory - resources.memory);
        self.allocated_gpu = settle(self.allocated_gpu - resources.gpu);
        let usage = self.usage.saturating_sub(*resources);
        self.usage = ResourceVector::new(
            settle(usage.cpu),
            settle(usage.memory),
            settle(usage.gpu),
            settle(usage.disk),
        );
    }

    /// Recompute dominant and weighted share against the cluster capacity.
    ///
    /// CPU and memory divide unguarded, so a zero-capacity dimension yields
    /// `NaN`/`Inf`. GPU contributes `0` when the cluster has no GPUs.
    pub(crate) fn update_shares(&mut self, cluster_total: &ResourceVector) {
        let cpu_share = self.allocated_cpu / cluster_total.cpu;
        let mem_share = self.allocated_memory / cluster_total.memory;
        let gpu_share = if cluster_total.gpu > 0.0 {
            self.allocated_gpu / cluster_total.gpu
        } else {
            0.0
        };
        self.dominant_share = nan_max(cpu_share, nan_max(mem_share, gpu_share));
        self.weighted_share = self.dominant_share / self.weight;
    }

    /// Allocated CPU/Memory/GPU as a vector with zero disk.
    #[must_use]
    pub const fn allocated(&self) -> ResourceVector {
        ResourceVector::new(self.allocated_cpu, self.allocated_memory, self.allocated_gpu, 0.0)
    }

    /// Derive a stats snapshot.
    #[must_use]
    pub fn stats(&self) -> TenantStats {
        TenantStats {
            tenant_id: self.id.clone(),
            name: self.name.clone(),
            weight: self.weight,
            dominant_share: self.dominant_share,
            weighted_share: self.weighted_share,
            usage: self.usage,
            quota: self.quota,
            cpu_utilization: self.usage.cpu / self.quota.cpu,
            memory_utilization: self.usage.memory / self.quota.memory,
            gpu_utilization: self.usage.gpu / self.quota.gpu,
            disk_utilization: self.usage.disk / self.quota.disk,
            quota_remaining: self.quota - self.usage,
        }
    }
}

/// Weight normalization applied at registration.
#[must_use]
pub fn normalize_weight(weight: f64) -> f64 {
    if weight <= 0.0 {
        1.0
    } else {
        weight
    }
}

/// Residue below this after a release is rounding error and snaps to zero.
const RELEASE_EPSILON: f64 = 1e-9;

/// Floor a post-release amount at zero, dropping floating-point residue.
fn settle(value: f64) -> f64 {
    if value.abs() < RELEASE_EPSILON {
        0.0
    } else {
        value.max(0.0)
    }
}

/// `max` that propagates `NaN` instead of discarding it.
fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

/// Point-in-time copy of a tenant's derived statistics.
///
/// Utilization ratios are `usage / quota` per dimension and are `NaN`/`Inf`
/// when the matching quota is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantStats {
    /// Tenant identifier.
    pub tenant_id: String,
    /// Human-readable name.
    pub name: String,
    /// Normalized weight.
    pub weight: f64,
    /// Dominant share.
    pub dominant_share: f64,
    /// Weighted share.
    pub weighted_share: f64,
    /// Current usage.
    pub usage: ResourceVector,
    /// Configured quota.
    pub quota: ResourceVector,
    /// CPU usage / quota.
    pub cpu_utilization: f64,
    /// Memory usage / quota.
    pub memory_utilization: f64,
    /// GPU usage / quota.
    pub gpu_utilization: f64,
    /// Disk usage / quota.
    pub disk_utilization: f64,
    /// `quota - usage`, unclamped.
    pub quota_remaining: ResourceVector,
}

/// Cluster-wide allocation ratios over CPU, memory and GPU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterUtilization {
    /// Total allocated CPU / cluster CPU.
    pub cpu_utilization: f64,
    /// Total allocated memory / cluster memory.
    pub memory_utilization: f64,
    /// Total allocated GPU / cluster GPU.
    pub gpu_utilization: f64,
    /// Number of registered tenants.
    pub tenant_count: usize,
}
