//! Runtime adapters and the caller-facing admission API.

pub mod api;
pub mod monitor;
pub mod tokio_spawner;

pub use api::{admit, list_tenants, AdmissionResponse, AdmissionStage, TenantListing};
pub use monitor::spawn_quota_monitor;
pub use tokio_spawner::{Spawn, TokioSpawner};
