//! Core scheduling abstractions and capacity accounting.

pub mod audit;
pub mod drf;
pub mod error;
pub mod quota;
pub mod resources;
pub mod tenant;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use drf::{DrfScheduler, ScheduleDecision};
pub use error::{AppResult, SchedulerError};
pub use quota::{
    EnforcementMode, EnforcementResult, NoopPreemptor, PreemptionPolicy, Preemptor, QuotaEnforcer,
    QuotaReport, TenantQuotaStatus, ADAPTIVE_UTILIZATION_THRESHOLD, DEFAULT_GRACE_PERIOD,
    DEFAULT_SUGGESTED_WAIT,
};
pub use resources::{ResourceKind, ResourceVector, TaskRequest};
pub use tenant::{ClusterUtilization, Tenant, TenantStats};
