//! # DRF Scheduler
//!
//! Multi-tenant fair resource scheduling for the Prometheus AI Platform.
//!
//! This library decides, for each incoming task resource request, whether a tenant may
//! consume cluster resources. It tracks per-tenant consumption across CPU, memory, GPU
//! and disk, and ranks tenants for fair turn-taking using weighted Dominant Resource
//! Fairness (DRF).
//!
//! ## Two Admission Layers
//!
//! - **`DrfScheduler`**: the single in-memory authority. `schedule_task` checks the
//!   tenant's quota on all four dimensions and the cluster capacity on CPU, memory and
//!   GPU, then commits the allocation.
//! - **`QuotaEnforcer`**: an advisory policy layer. `enforce_quota` reads scheduler
//!   state and answers under one of three modes (hard, soft, adaptive) without
//!   committing anything. It also counts violations and runs a periodic status monitor.
//!
//! The layers are not composed automatically. `runtime::admit` shows the usual
//! combination: ask the enforcer, then commit through the scheduler.
//!
//! ```rust
//! use std::sync::Arc;
//! use drf_scheduler::core::{
//!     DrfScheduler, EnforcementMode, PreemptionPolicy, QuotaEnforcer, ResourceVector,
//!     TaskRequest,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let scheduler = Arc::new(DrfScheduler::new(ResourceVector::new(100.0, 1000.0, 10.0, 5000.0)));
//! scheduler.register_tenant("a", "Team A", ResourceVector::new(20.0, 200.0, 2.0, 1000.0), 1.0);
//!
//! let enforcer = QuotaEnforcer::new(
//!     Arc::clone(&scheduler),
//!     EnforcementMode::Hard,
//!     PreemptionPolicy::Never,
//! );
//! let request = TaskRequest::new("a", "task-1", ResourceVector::new(5.0, 50.0, 0.5, 100.0));
//!
//! assert!(enforcer.enforce_quota(&CancellationToken::new(), &request).allowed);
//! assert!(scheduler.schedule_task(&request).is_allowed());
//! ```
//!
//! ## Numeric Edge Cases
//!
//! Shares and utilization ratios are plain divisions. A zero-capacity cluster
//! dimension or a zero-quota tenant dimension yields `NaN` or `Inf`; callers must
//! check `is_finite` before acting on them.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and capacity accounting.
pub mod core;
/// Configuration models for capacity, tenants and policy.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Runtime adapters and admission API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
