//! Scheduler and dependency-gate configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable prefix read by [`DispatchConfig::from_env`].
pub const ENV_PREFIX: &str = "BATCH_DISPATCH_";

/// Options applied to every scheduler instance the assembler creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    /// Block shutdown until in-flight units finish.
    pub wait_for_jobs_on_shutdown: bool,
    /// Start firing as soon as units are registered.
    pub auto_startup: bool,
    /// Worker threads for a dedicated runtime.
    pub thread_count: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            wait_for_jobs_on_shutdown: true,
            auto_startup: false,
            thread_count: num_cpus::get(),
        }
    }
}

/// Predecessor gate applied inside the job execution entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Hold fired units until their predecessors complete.
    pub enabled: bool,
    /// Interval between status tracker polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 500,
        }
    }
}

impl GateConfig {
    /// Poll interval as a duration.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Root dispatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Scheduler instance options.
    pub scheduler: SchedulerOptions,
    /// Predecessor gate options.
    pub gate: GateConfig,
}

impl SchedulerOptions {
    /// Validate scheduler option values.
    pub fn validate(&self) -> Result<(), String> {
        if self.thread_count == 0 {
            return Err("thread_count must be greater than 0".into());
        }
        Ok(())
    }
}

impl GateConfig {
    /// Validate gate option values.
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0 when the gate is enabled".into());
        }
        Ok(())
    }
}

impl DispatchConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.scheduler
            .validate()
            .map_err(|e| format!("scheduler invalid: {e}"))?;
        self.gate.validate().map_err(|e| format!("gate invalid: {e}"))?;
        Ok(())
    }

    /// Parse dispatch configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `.env` if present, then read `BATCH_DISPATCH_*` variables over the defaults.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup, e.g. a map in tests.
    ///
    /// Recognised keys (after the `BATCH_DISPATCH_` prefix): `WAIT_ON_SHUTDOWN`,
    /// `AUTO_STARTUP`, `THREADS`, `GATE_ENABLED`, `GATE_POLL_MS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut cfg = Self::default();

        if let Some(v) = get("WAIT_ON_SHUTDOWN") {
            cfg.scheduler.wait_for_jobs_on_shutdown = parse_var("WAIT_ON_SHUTDOWN", &v)?;
        }
        if let Some(v) = get("AUTO_STARTUP") {
            cfg.scheduler.auto_startup = parse_var("AUTO_STARTUP", &v)?;
        }
        if let Some(v) = get("THREADS") {
            cfg.scheduler.thread_count = parse_var("THREADS", &v)?;
        }
        if let Some(v) = get("GATE_ENABLED") {
            cfg.gate.enabled = parse_var("GATE_ENABLED", &v)?;
        }
        if let Some(v) = get("GATE_POLL_MS") {
            cfg.gate.poll_interval_ms = parse_var("GATE_POLL_MS", &v)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("{ENV_PREFIX}{name}=`{value}`: {e}"))
}
