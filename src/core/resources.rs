//! Multi-dimensional resource quantities and task requests.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Resource dimension tracked by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// CPU cores.
    Cpu,
    /// Memory in GB.
    Memory,
    /// GPU device count (fractional allowed).
    Gpu,
    /// Disk in GB.
    Disk,
}

impl ResourceKind {
    /// Every dimension, in the order quota checks visit them.
    pub const ALL: [Self; 4] = [Self::Cpu, Self::Memory, Self::Gpu, Self::Disk];

    /// Dimensions that take part in dominant share and cluster capacity accounting.
    pub const FAIRNESS: [Self; 3] = [Self::Cpu, Self::Memory, Self::Gpu];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cpu => "CPU",
            Self::Memory => "Memory",
            Self::Gpu => "GPU",
            Self::Disk => "Disk",
        };
        f.write_str(label)
    }
}

/// Quantity of each resource dimension.
///
/// Dimensions are accounted independently; nothing ties them together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceVector {
    /// CPU cores.
    #[serde(default)]
    pub cpu: f64,
    /// Memory in GB.
    #[serde(default)]
    pub memory: f64,
    /// GPU count.
    #[serde(default)]
    pub gpu: f64,
    /// Disk in GB.
    #[serde(default)]
    pub disk: f64,
}

impl ResourceVector {
    /// The all-zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a vector from its four components.
    #[must_use]
    pub const fn new(cpu: f64, memory: f64, gpu: f64, disk: f64) -> Self {
        Self {
            cpu,
            memory,
            gpu,
            disk,
        }
    }

    /// Read a single dimension.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Memory => self.memory,
            ResourceKind::Gpu => self.gpu,
            ResourceKind::Disk => self.disk,
        }
    }

    /// Component-wise subtraction floored at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self {
            cpu: (self.cpu - rhs.cpu).max(0.0),
            memory: (self.memory - rhs.memory).max(0.0),
            gpu: (self.gpu - rhs.gpu).max(0.0),
            disk: (self.disk - rhs.disk).max(0.0),
        }
    }

    /// First dimension (in [`ResourceKind::ALL`] order) where `self` exceeds `limit`.
    #[must_use]
    pub fn first_exceeding(&self, limit: &Self) -> Option<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| self.get(*kind) > limit.get(*kind))
    }

    /// True when every component is finite and non-negative.
    #[must_use]
    pub fn is_valid_quantity(&self) -> bool {
        ResourceKind::ALL.into_iter().all(|kind| {
            let v = self.get(kind);
            v.is_finite() && v >= 0.0
        })
    }
}

impl Add for ResourceVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cpu: self.cpu + rhs.cpu,
            memory: self.memory + rhs.memory,
            gpu: self.gpu + rhs.gpu,
            disk: self.disk + rhs.disk,
        }
    }
}

impl AddAssign for ResourceVector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for ResourceVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            cpu: self.cpu - rhs.cpu,
            memory: self.memory - rhs.memory,
            gpu: self.gpu - rhs.gpu,
            disk: self.disk - rhs.disk,
        }
    }
}

/// A single task's resource request on behalf of a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Owning tenant.
    pub tenant_id: String,
    /// Caller-assigned task id. Carried through, never stored.
    pub task_id: String,
    /// Requested amounts.
    pub resources: ResourceVector,
}

impl TaskRequest {
    /// Build a request.
    pub fn new(
        tenant_id: impl Into<String>,
        task_id: impl Into<String>,
        resources: ResourceVector,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            task_id: task_id.into(),
            resources,
        }
    }
}
