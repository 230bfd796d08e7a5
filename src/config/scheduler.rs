//! Scheduler configuration structures.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, EnforcementMode, PreemptionPolicy, ResourceVector};

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "DRF_CONFIG";
/// Environment override for the enforcement mode.
pub const ENFORCEMENT_MODE_ENV: &str = "DRF_ENFORCEMENT_MODE";
/// Environment override for the monitor interval in seconds.
pub const MONITOR_INTERVAL_ENV: &str = "DRF_MONITOR_INTERVAL_SECS";
/// Longest accepted monitor interval (one week).
pub const MAX_MONITOR_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

const fn default_weight() -> f64 {
    1.0
}

const fn default_monitor_interval_secs() -> u64 {
    60
}

/// A tenant to register at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Tenant identifier.
    pub id: String,
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: String,
    /// Hard resource ceiling.
    pub quota: ResourceVector,
    /// DRF weight. Values `<= 0` are normalized to `1.0` on registration.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl TenantConfig {
    /// Name to register, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Total cluster capacity.
    pub cluster: ResourceVector,
    /// Tenants registered at startup.
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
    /// Quota enforcement mode.
    #[serde(default)]
    pub enforcement_mode: EnforcementMode,
    /// Preemption policy.
    #[serde(default)]
    pub preemption_policy: PreemptionPolicy,
    /// Quota monitor interval in seconds.
    #[serde(default = "default_monitor_interval_secs")]
    pub monitor_interval_secs: u64,
}

impl SchedulerConfig {
    /// Config with the given capacity and defaults elsewhere.
    #[must_use]
    pub const fn new(cluster: ResourceVector) -> Self {
        Self {
            cluster,
            tenants: Vec::new(),
            enforcement_mode: EnforcementMode::Hard,
            preemption_policy: PreemptionPolicy::Never,
            monitor_interval_secs: default_monitor_interval_secs(),
        }
    }

    /// Monitor interval as a `Duration`.
    #[must_use]
    pub const fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    /// Validate capacities, quotas, tenant ids and the monitor interval.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if !self.cluster.is_valid_quantity() {
            return Err("cluster capacity must be finite and non-negative".into());
        }
        if self.monitor_interval_secs == 0 {
            return Err("monitor_interval_secs must be greater than 0".into());
        }
        if self.monitor_interval_secs > MAX_MONITOR_INTERVAL_SECS {
            return Err(format!(
                "monitor_interval_secs must be at most {MAX_MONITOR_INTERVAL_SECS}"
            ));
        }
        let mut seen = HashSet::new();
        for tenant in &self.tenants {
            if tenant.id.is_empty() {
                return Err("tenant id must not be empty".into());
            }
            if !seen.insert(tenant.id.as_str()) {
                return Err(format!("tenant `{}` defined more than once", tenant.id));
            }
            if !tenant.quota.is_valid_quantity() {
                return Err(format!(
                    "tenant `{}` invalid: quota must be finite and non-negative",
                    tenant.id
                ));
            }
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// # Errors
    ///
    /// Fails when an override is present but unparsable, or the result is invalid.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENFORCEMENT_MODE_ENV) {
            self.enforcement_mode = mode
                .parse()
                .with_context(|| format!("{ENFORCEMENT_MODE_ENV}={mode}"))?;
        }
        if let Some(secs) = lookup(MONITOR_INTERVAL_ENV) {
            self.monitor_interval_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{MONITOR_INTERVAL_ENV}={secs}"))?;
        }
        self.validate().map_err(anyhow::Error::msg)
    }

    /// Load `.env` if present, read the JSON file named by `DRF_CONFIG`, then
    /// apply environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if the variable is unset, the file is unreadable, or parsing or
    /// validation fails.
    pub fn from_env() -> AppResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env loaded: {}", e);
        }
        let path = std::env::var(CONFIG_PATH_ENV)
            .with_context(|| format!("{CONFIG_PATH_ENV} is not set"))?;
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading scheduler config {path}"))?;
        let mut cfg = Self::from_json_str(&raw).map_err(anyhow::Error::msg)?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        tracing::info!(
            "loaded scheduler config from {} ({} tenants, {} mode)",
            path,
            cfg.tenants.len(),
            cfg.enforcement_mode
        );
        Ok(cfg)
    }
}
