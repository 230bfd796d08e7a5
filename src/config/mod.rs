//! Configuration models for cluster capacity, tenants and enforcement policy.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, TenantConfig};
