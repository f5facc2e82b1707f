//! Builder that wires an assembler from configuration.

use crate::config::DispatchConfig;
use crate::core::{
    AuditFactory, AuditSink, BatchRunIdentity, BatchSchedulerAssembler, DispatchError,
    GatedLauncher, JobLauncher, Spawn, TaskRegistry,
};

/// Collects the assembler's collaborators and validates configuration.
///
/// The built assembler wraps the launcher in a [`GatedLauncher`] configured
/// from [`DispatchConfig::gate`], so fired units honor the batch's
/// predecessor graph.
pub struct AssemblerBuilder<R, L, S> {
    config: DispatchConfig,
    registry: R,
    launcher: L,
    spawner: S,
    audit_factory: Option<AuditFactory>,
}

impl<R, L, S> AssemblerBuilder<R, L, S>
where
    R: TaskRegistry,
    L: JobLauncher,
    S: Spawn + Clone,
{
    /// Start a builder.
    pub const fn new(config: DispatchConfig, registry: R, launcher: L, spawner: S) -> Self {
        Self {
            config,
            registry,
            launcher,
            spawner,
            audit_factory: None,
        }
    }

    /// Configuration the assembler will use.
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Give every assembled instance a sink produced by `factory`.
    #[must_use]
    pub fn with_audit<F>(mut self, factory: F) -> Self
    where
        F: Fn(&BatchRunIdentity) -> Box<dyn AuditSink> + Send + Sync + 'static,
    {
        self.audit_factory = Some(Box::new(factory));
        self
    }

    /// Validate configuration and build the assembler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the configuration is invalid.
    pub fn build(self) -> Result<BatchSchedulerAssembler<R, GatedLauncher<L>, S>, DispatchError> {
        self.config
            .validate()
            .map_err(|e| DispatchError::Configuration(format!("config invalid: {e}")))?;

        let launcher = GatedLauncher::from_config(self.launcher, &self.config.gate);
        let assembler =
            BatchSchedulerAssembler::new(self.registry, launcher, self.spawner, self.config);
        Ok(match self.audit_factory {
            Some(factory) => assembler.with_audit_factory(factory),
            None => assembler,
        })
    }
}
