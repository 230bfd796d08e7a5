//! Background quota monitoring.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::QuotaEnforcer;
use crate::runtime::Spawn;

/// Start one periodic quota monitor on `spawner`.
///
/// The task logs per-tenant and cluster status every `interval` and exits once
/// `cancel` fires. Each call starts an independent monitor.
pub fn spawn_quota_monitor<S: Spawn>(
    enforcer: Arc<QuotaEnforcer>,
    spawner: &S,
    cancel: CancellationToken,
    interval: Duration,
) {
    tracing::info!("starting quota monitor every {:?}", interval);
    spawner.spawn(async move {
        enforcer.monitor_quotas(cancel, interval).await;
    });
}
