//! One-shot triggers, durable job descriptors, and the batch scheduler instance.
//!
//! A [`BatchScheduler`] owns the units of exactly one batch run. Units are
//! registered as a single batch, fire at most once each, and run on whatever
//! runtime the [`Spawn`] implementation targets. Firing only happens while the
//! instance is started, not paused, and not shut down.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::SchedulerOptions;
use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::context::ExecutionContext;
use crate::core::executor::JobLauncher;
use crate::core::DispatchError;

/// Abstraction for spawning fired units on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Lifecycle state of a unit's trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    /// Registered but held.
    Paused,
    /// Eligible to fire on the next start/resume.
    Waiting,
    /// Already fired; never fires again.
    Fired,
}

/// Trigger that fires its job exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotTrigger {
    name: String,
    group: String,
    repeat_count: u32,
}

impl OneShotTrigger {
    /// Trigger named and grouped by the job key.
    #[must_use]
    pub fn for_job(job_key: &str) -> Self {
        Self {
            name: job_key.to_owned(),
            group: job_key.to_owned(),
            repeat_count: 0,
        }
    }

    /// Trigger name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trigger group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Number of repeats after the first firing; always zero.
    #[must_use]
    pub const fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Whether the trigger fires more than once.
    #[must_use]
    pub const fn is_repeating(&self) -> bool {
        self.repeat_count > 0
    }
}

/// Job identity plus the context it runs with.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    name: String,
    durable: bool,
    context: ExecutionContext,
}

impl JobDescriptor {
    /// Durable descriptor named by the context's job key.
    ///
    /// Durable descriptors stay registered after their trigger fires, until
    /// explicitly removed.
    #[must_use]
    pub fn durable(context: ExecutionContext) -> Self {
        Self {
            name: context.job_key.clone(),
            durable: true,
            context,
        }
    }

    /// Job name (the job key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the descriptor outlives its trigger.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        self.durable
    }

    /// Execution context handed to the launcher.
    #[must_use]
    pub const fn context(&self) -> &ExecutionContext {
        &self.context
    }
}

/// A job descriptor bound to its one-shot trigger.
#[derive(Debug, Clone)]
pub struct ScheduledUnit {
    trigger: OneShotTrigger,
    job: JobDescriptor,
}

impl ScheduledUnit {
    /// Bind a descriptor to a one-shot trigger of the same name.
    #[must_use]
    pub fn new(job: JobDescriptor) -> Self {
        Self {
            trigger: OneShotTrigger::for_job(job.name()),
            job,
        }
    }

    /// Job key identifying the unit.
    #[must_use]
    pub fn job_key(&self) -> &str {
        self.job.name()
    }

    /// The unit's trigger.
    #[must_use]
    pub const fn trigger(&self) -> &OneShotTrigger {
        &self.trigger
    }

    /// The unit's job descriptor.
    #[must_use]
    pub const fn job(&self) -> &JobDescriptor {
        &self.job
    }

    /// Shortcut for the descriptor's execution context.
    #[must_use]
    pub const fn context(&self) -> &ExecutionContext {
        self.job.context()
    }
}

struct UnitSlot {
    unit: ScheduledUnit,
    state: TriggerState,
}

type SharedAudit = Arc<Mutex<Box<dyn AuditSink>>>;

/// Decrements the in-flight count when a fired unit ends, even on panic.
struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_waiters();
        }
    }
}

/// Named, isolated container of one-shot units for a single batch run.
///
/// Uses a `parking_lot::Mutex` over the unit table for state transitions,
/// lock-free atomics for lifecycle flags and the in-flight count, and a
/// `tokio::sync::Notify` to wake a draining shutdown.
pub struct BatchScheduler<L, S> {
    name: String,
    instance_id: Uuid,
    options: SchedulerOptions,
    units: Mutex<BTreeMap<String, UnitSlot>>,
    paused: AtomicBool,
    started: AtomicBool,
    shut_down: AtomicBool,
    in_flight: Arc<AtomicUsize>,
    drained: Arc<Notify>,
    launcher: L,
    spawner: S,
    audit: Option<SharedAudit>,
}

impl<L, S> BatchScheduler<L, S>
where
    L: JobLauncher,
    S: Spawn,
{
    /// Create an empty instance. Starts immediately only if `auto_startup` is set.
    pub fn new(name: impl Into<String>, options: SchedulerOptions, launcher: L, spawner: S) -> Self {
        let started = options.auto_startup;
        Self {
            name: name.into(),
            instance_id: Uuid::new_v4(),
            options,
            units: Mutex::new(BTreeMap::new()),
            paused: AtomicBool::new(false),
            started: AtomicBool::new(started),
            shut_down: AtomicBool::new(false),
            in_flight: Arc::new(AtomicUsize::new(0)),
            drained: Arc::new(Notify::new()),
            launcher,
            spawner,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Register a single unit.
    ///
    /// # Errors
    ///
    /// See [`Self::register_units`].
    pub fn register_one_shot_unit(&self, unit: ScheduledUnit) -> Result<(), DispatchError> {
        self.register_units(vec![unit]).map(|_| ())
    }

    /// Register a batch of units atomically: either all are added or none.
    ///
    /// New units start `Paused` if the instance is paused, otherwise
    /// `Waiting`, and fire right away when the instance is running.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SchedulerInit`] if the instance is shut down
    /// or a unit name collides with another unit in the batch or the instance.
    pub fn register_units(&self, units: Vec<ScheduledUnit>) -> Result<usize, DispatchError> {
        let count = units.len();
        {
            let mut slots = self.units.lock();
            if self.shut_down.load(Ordering::Acquire) {
                return Err(DispatchError::SchedulerInit(format!(
                    "scheduler `{}` is shut down",
                    self.name
                )));
            }

            {
                let mut seen = HashSet::with_capacity(count);
                for unit in &units {
                    let key = unit.job_key();
                    if slots.contains_key(key) || !seen.insert(key) {
                        return Err(DispatchError::SchedulerInit(format!(
                            "trigger `{key}` already registered in scheduler `{}`",
                            self.name
                        )));
                    }
                }
            }

            let initial = if self.paused.load(Ordering::Acquire) {
                TriggerState::Paused
            } else {
                TriggerState::Waiting
            };
            for unit in units {
                slots.insert(unit.job_key().to_owned(), UnitSlot { unit, state: initial });
            }
        }

        self.record(AuditAction::Register, None, Some(format!("{count} units")));
        info!(scheduler = %self.name, units = count, "units registered");
        self.fire_ready();
        Ok(count)
    }

    /// Hold every trigger that has not fired yet.
    pub fn pause_all(&self) {
        {
            let mut slots = self.units.lock();
            self.paused.store(true, Ordering::Release);
            for slot in slots.values_mut() {
                if slot.state == TriggerState::Waiting {
                    slot.state = TriggerState::Paused;
                }
            }
        }
        self.record(AuditAction::Pause, None, None);
        info!(scheduler = %self.name, "all triggers paused");
    }

    /// Release every paused trigger; fires them if the instance is started.
    pub fn resume_all(&self) {
        {
            let mut slots = self.units.lock();
            if self.shut_down.load(Ordering::Acquire) {
                warn!(scheduler = %self.name, "resume ignored: scheduler is shut down");
                return;
            }
            self.paused.store(false, Ordering::Release);
            for slot in slots.values_mut() {
                if slot.state == TriggerState::Paused {
                    slot.state = TriggerState::Waiting;
                }
            }
        }
        self.record(AuditAction::Resume, None, None);
        info!(scheduler = %self.name, "all triggers resumed");
        self.fire_ready();
    }

    /// Mark the instance started. Nothing fires while it is paused.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SchedulerInit`] if the instance is shut down.
    pub fn start(&self) -> Result<(), DispatchError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(DispatchError::SchedulerInit(format!(
                "scheduler `{}` is shut down",
                self.name
            )));
        }
        self.started.store(true, Ordering::Release);
        debug!(
            scheduler = %self.name,
            paused = self.paused.load(Ordering::Acquire),
            "scheduler started"
        );
        self.fire_ready();
        Ok(())
    }

    /// Stop firing. With `drain_in_flight`, waits until every fired unit ends.
    pub async fn shutdown(&self, drain_in_flight: bool) {
        {
            let _slots = self.units.lock();
            self.paused.store(true, Ordering::Release);
        }
        if !self.shut_down.swap(true, Ordering::AcqRel) {
            self.record(AuditAction::Shutdown, None, None);
            info!(
                scheduler = %self.name,
                in_flight = self.in_flight(),
                drain = drain_in_flight,
                "scheduler shutting down"
            );
        }
        if drain_in_flight {
            self.wait_for_drain().await;
            debug!(scheduler = %self.name, "in-flight units drained");
        }
    }

    /// Shut down using the configured `wait_for_jobs_on_shutdown`.
    pub async fn close(&self) {
        self.shutdown(self.options.wait_for_jobs_on_shutdown).await;
    }

    /// Remove a unit's descriptor and trigger. In-flight runs are unaffected.
    pub fn remove_unit(&self, job_key: &str) -> Option<ScheduledUnit> {
        let removed = self.units.lock().remove(job_key).map(|slot| slot.unit);
        if removed.is_some() {
            debug!(scheduler = %self.name, job_key = %job_key, "unit removed");
        }
        removed
    }

    async fn wait_for_drain(&self) {
        loop {
            let notified = self.drained.notified();
            if self.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn fire_ready(&self) {
        // Fired units are counted in flight before the lock is released, so a
        // concurrent draining shutdown always waits for them.
        let ready: Vec<(ExecutionContext, InFlightGuard)> = {
            let mut slots = self.units.lock();
            if !self.started.load(Ordering::Acquire)
                || self.paused.load(Ordering::Acquire)
                || self.shut_down.load(Ordering::Acquire)
            {
                return;
            }
            let ready: Vec<ExecutionContext> = slots
                .values_mut()
                .filter(|slot| slot.state == TriggerState::Waiting)
                .map(|slot| {
                    slot.state = TriggerState::Fired;
                    slot.unit.context().clone()
                })
                .collect();
            self.in_flight.fetch_add(ready.len(), Ordering::AcqRel);
            ready
                .into_iter()
                .map(|ctx| {
                    let guard = InFlightGuard {
                        in_flight: Arc::clone(&self.in_flight),
                        drained: Arc::clone(&self.drained),
                    };
                    (ctx, guard)
                })
                .collect()
        };
        for (ctx, guard) in ready {
            self.fire(ctx, guard);
        }
    }

    fn fire(&self, ctx: ExecutionContext, guard: InFlightGuard) {
        self.record(AuditAction::Fire, Some(&ctx.job_key), None);
        info!(scheduler = %self.name, job_key = %ctx.job_key, "unit fired");

        let launcher = self.launcher.clone();
        let audit = self.audit.clone();
        let scheduler = self.name.clone();

        self.spawner.spawn(async move {
            let _guard = guard;
            let job_key = ctx.job_key.clone();
            let (action, payload) = match launcher.launch(ctx).await {
                Ok(()) => {
                    info!(scheduler = %scheduler, job_key = %job_key, "unit completed");
                    (AuditAction::Complete, None)
                }
                Err(e) => {
                    let err = DispatchError::Launch {
                        job_key: job_key.clone(),
                        reason: format!("{e:#}"),
                    };
                    error!(scheduler = %scheduler, error = %err, "unit failed");
                    (AuditAction::Fail, Some(err.to_string()))
                }
            };
            if let Some(sink) = audit.as_ref() {
                sink.lock()
                    .record(build_audit_event(&scheduler, Some(&job_key), action, payload));
            }
        });
    }

    fn record(&self, action: AuditAction, job_key: Option<&str>, payload: Option<String>) {
        if let Some(sink) = &self.audit {
            sink.lock()
                .record(build_audit_event(&self.name, job_key, action, payload));
        }
    }
}

impl<L, S> BatchScheduler<L, S> {
    /// Instance name, derived from the batch identity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of this particular instance; differs on every assembly.
    #[must_use]
    pub const fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Options the instance was created with.
    #[must_use]
    pub const fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// Whether triggers are currently held.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Whether the instance has been started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Whether the instance has been shut down.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Fired units that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of registered units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.lock().len()
    }

    /// Registered job keys, sorted.
    #[must_use]
    pub fn unit_names(&self) -> Vec<String> {
        self.units.lock().keys().cloned().collect()
    }

    /// Trigger state of a job key.
    #[must_use]
    pub fn trigger_state(&self, job_key: &str) -> Option<TriggerState> {
        self.units.lock().get(job_key).map(|slot| slot.state)
    }

    /// Clone of a registered unit.
    #[must_use]
    pub fn unit(&self, job_key: &str) -> Option<ScheduledUnit> {
        self.units.lock().get(job_key).map(|slot| slot.unit.clone())
    }

    /// Every registered unit with its trigger state, sorted by job key.
    #[must_use]
    pub fn units(&self) -> Vec<(ScheduledUnit, TriggerState)> {
        self.units
            .lock()
            .values()
            .map(|slot| (slot.unit.clone(), slot.state))
            .collect()
    }
}

impl<L, S> fmt::Debug for BatchScheduler<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("name", &self.name)
            .field("instance_id", &self.instance_id)
            .field("paused", &self.is_paused())
            .field("started", &self.is_started())
            .field("shut_down", &self.is_shut_down())
            .field("units", &self.unit_count())
            .finish_non_exhaustive()
    }
}

impl<L, S> Drop for BatchScheduler<L, S> {
    fn drop(&mut self) {
        // Signal shutdown but don't wait; explicit shutdown() is required to drain.
        if !self.shut_down.swap(true, Ordering::AcqRel) {
            debug!(scheduler = %self.name, "scheduler dropped without explicit shutdown");
        }
    }
}
