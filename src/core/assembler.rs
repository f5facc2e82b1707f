//! Per-run assembly of a paused batch scheduler.
//!
//! [`BatchSchedulerAssembler::assemble`] is the only place schedulable units
//! are created. For one batch identity it:
//!
//! 1. indexes the batch's task definitions and job keys (fresh, local values),
//! 2. resolves every job key to a declared task and every predecessor to a
//!    job key of the run, failing the whole call on the first dangling
//!    reference or dependency cycle,
//! 3. builds one durable, one-shot unit per job key sharing the bundle's
//!    tracker and resolver,
//! 4. pauses the instance, registers all units in one batch, starts it,
//!    and returns it.
//!
//! On any error the half-built instance is dropped before the caller sees it.

use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::config::DispatchConfig;
use crate::core::audit::AuditSink;
use crate::core::context::ExecutionContext;
use crate::core::executor::JobLauncher;
use crate::core::index::{JobKeyIndex, TaskDefinitionIndex};
use crate::core::model::BatchRunIdentity;
use crate::core::scheduler::{BatchScheduler, JobDescriptor, ScheduledUnit, Spawn};
use crate::core::services::{ResourceBundle, TaskRegistry};
use crate::core::DispatchError;

/// Builds a fresh audit sink for each assembled instance.
pub type AuditFactory = Box<dyn Fn(&BatchRunIdentity) -> Box<dyn AuditSink> + Send + Sync>;

/// Assembles one paused [`BatchScheduler`] per batch run.
///
/// Holds only immutable collaborators; concurrent `assemble` calls for
/// different batches share nothing but what the caller injects.
pub struct BatchSchedulerAssembler<R, L, S> {
    registry: R,
    launcher: L,
    spawner: S,
    config: DispatchConfig,
    audit_factory: Option<AuditFactory>,
}

impl<R, L, S> BatchSchedulerAssembler<R, L, S>
where
    R: TaskRegistry,
    L: JobLauncher,
    S: Spawn + Clone,
{
    /// Create an assembler from its collaborators.
    pub const fn new(registry: R, launcher: L, spawner: S, config: DispatchConfig) -> Self {
        Self {
            registry,
            launcher,
            spawner,
            config,
            audit_factory: None,
        }
    }

    /// Give every assembled instance its own audit sink.
    #[must_use]
    pub fn with_audit_factory(mut self, factory: AuditFactory) -> Self {
        self.audit_factory = Some(factory);
        self
    }

    /// Configuration applied to assembled instances.
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Build the paused scheduler instance for one batch run.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Configuration`] for a blank domain or batch id
    /// - [`DispatchError::Service`] if the registry or bundle read fails
    /// - [`DispatchError::DuplicateJobKey`], [`DispatchError::EmptyJobKey`],
    ///   [`DispatchError::DuplicateTaskDefinition`],
    ///   [`DispatchError::MissingTaskDefinition`],
    ///   [`DispatchError::UnknownPredecessor`] or
    ///   [`DispatchError::DependencyCycle`] for inconsistent data
    /// - [`DispatchError::SchedulerInit`] if unit registration fails
    pub fn assemble<B>(
        &self,
        identity: &BatchRunIdentity,
        bundle: &B,
    ) -> Result<BatchScheduler<L, S>, DispatchError>
    where
        B: ResourceBundle + ?Sized,
    {
        identity.validate()?;
        let span = info_span!("assemble", domain = %identity.domain_id, batch = %identity.batch_id);
        let _entered = span.enter();

        let tasks = TaskDefinitionIndex::build(&self.registry, identity)?;
        let job_keys = JobKeyIndex::build(bundle.job_keys().map_err(DispatchError::Service)?)?;
        debug!(tasks = tasks.len(), job_keys = job_keys.len(), "indices built");

        let status_tracker = bundle.status_tracker();
        job_keys.check_dependencies(|job_key| status_tracker.predecessors(job_key))?;

        let units = self.build_units(&tasks, &job_keys, bundle)?;

        let mut scheduler = BatchScheduler::new(
            identity.scheduler_name(),
            self.config.scheduler.clone(),
            self.launcher.clone(),
            self.spawner.clone(),
        );
        if let Some(factory) = &self.audit_factory {
            scheduler = scheduler.with_audit(factory(identity));
        }

        // Hold triggers before registering so auto_startup cannot fire anything.
        scheduler.pause_all();
        let count = scheduler.register_units(units)?;
        scheduler.start()?;

        info!(
            scheduler = %scheduler.name(),
            instance = %scheduler.instance_id(),
            units = count,
            "batch scheduler assembled and paused"
        );
        Ok(scheduler)
    }

    fn build_units<B>(
        &self,
        tasks: &TaskDefinitionIndex,
        job_keys: &JobKeyIndex,
        bundle: &B,
    ) -> Result<Vec<ScheduledUnit>, DispatchError>
    where
        B: ResourceBundle + ?Sized,
    {
        let status_tracker = bundle.status_tracker();
        let argument_resolver = bundle.argument_resolver();

        let mut units = Vec::with_capacity(job_keys.len());
        for entry in job_keys.iter() {
            let definition =
                tasks
                    .get(&entry.task_id)
                    .ok_or_else(|| DispatchError::MissingTaskDefinition {
                        job_key: entry.job_key.clone(),
                        task_id: entry.task_id.clone(),
                    })?;
            debug!(
                job_key = %entry.job_key,
                task_id = %definition.id,
                kind = %definition.kind,
                group = ?entry.group_id,
                "registering job"
            );

            let context = ExecutionContext::new(
                entry.job_key.clone(),
                Arc::clone(&status_tracker),
                Arc::clone(&argument_resolver),
            );
            units.push(ScheduledUnit::new(JobDescriptor::durable(context)));
        }
        Ok(units)
    }
}
