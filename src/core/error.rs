//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No tenant is registered under the given id.
    #[error("tenant not found: {0}")]
    TenantNotFound(String),
    /// Request would push a tenant past its quota.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Request would push the cluster past its capacity.
    #[error("insufficient cluster resources")]
    InsufficientCapacity,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
