//! Job execution entry point and the predecessor gate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::GateConfig;
use crate::core::context::ExecutionContext;
use crate::core::model::JobStatus;
use crate::core::{AppResult, DispatchError};

/// Entry point invoked when a scheduled unit fires.
///
/// Implementations resolve job key → task → executable from the context and
/// run it. The scheduler clones the launcher into every fired unit.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use batch_dispatch::core::{AppResult, ExecutionContext, JobLauncher};
///
/// #[derive(Clone)]
/// struct EchoLauncher;
///
/// #[async_trait]
/// impl JobLauncher for EchoLauncher {
///     async fn launch(&self, ctx: ExecutionContext) -> AppResult<()> {
///         println!("running {}", ctx.job_key);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait JobLauncher: Send + Sync + Clone + 'static {
    /// Run the job behind `ctx.job_key` to completion.
    ///
    /// # Errors
    ///
    /// Any failure of the job; the scheduler logs and audits it.
    async fn launch(&self, ctx: ExecutionContext) -> AppResult<()>;
}

/// Launcher wrapper that holds a unit until its predecessors complete.
///
/// Units fire in no particular order; this wrapper enforces the batch's
/// dependency graph by polling the run's status tracker. It also records
/// `Pending` while the unit waits, then `Running`, `Completed` or `Failed`,
/// so failures cascade to dependants.
#[derive(Clone)]
pub struct GatedLauncher<L> {
    inner: L,
    enabled: bool,
    poll_interval: Duration,
}

impl<L: JobLauncher> GatedLauncher<L> {
    /// Wrap a launcher with a fixed poll interval.
    pub const fn new(inner: L, poll_interval: Duration) -> Self {
        Self {
            inner,
            enabled: true,
            poll_interval,
        }
    }

    /// Wrap a launcher using gate configuration.
    pub const fn from_config(inner: L, cfg: &GateConfig) -> Self {
        Self {
            inner,
            enabled: cfg.enabled,
            poll_interval: cfg.poll_interval(),
        }
    }

    /// Wait until every predecessor of `ctx.job_key` reports `Completed`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PredecessorFailed`] as soon as any predecessor
    /// reports `Failed`.
    pub async fn await_predecessors(&self, ctx: &ExecutionContext) -> Result<(), DispatchError> {
        if !self.enabled {
            return Ok(());
        }
        let predecessors = ctx.status_tracker.predecessors(&ctx.job_key);
        loop {
            let mut waiting_on = None;
            for predecessor in &predecessors {
                match ctx.status_tracker.status(predecessor) {
                    Some(JobStatus::Completed) => {}
                    Some(JobStatus::Failed(_)) => {
                        return Err(DispatchError::PredecessorFailed {
                            job_key: ctx.job_key.clone(),
                            predecessor: predecessor.clone(),
                        });
                    }
                    _ => {
                        waiting_on = Some(predecessor);
                        break;
                    }
                }
            }
            let Some(waiting_on) = waiting_on else {
                return Ok(());
            };
            debug!(job_key = %ctx.job_key, waiting_on = %waiting_on, "predecessor not complete");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl<L: JobLauncher> JobLauncher for GatedLauncher<L> {
    async fn launch(&self, ctx: ExecutionContext) -> AppResult<()> {
        let tracker = Arc::clone(&ctx.status_tracker);
        let job_key = ctx.job_key.clone();

        tracker.set_status(&job_key, JobStatus::Pending);
        if let Err(e) = self.await_predecessors(&ctx).await {
            warn!(job_key = %job_key, error = %e, "job key refused by gate");
            tracker.set_status(&job_key, JobStatus::Failed(e.to_string()));
            return Err(e.into());
        }

        tracker.set_status(&job_key, JobStatus::Running);
        info!(job_key = %job_key, "job key released by gate");
        match self.inner.launch(ctx).await {
            Ok(()) => {
                tracker.set_status(&job_key, JobStatus::Completed);
                Ok(())
            }
            Err(e) => {
                tracker.set_status(&job_key, JobStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StatusTracker;
    use crate::infra::memory::{InMemoryArgumentResolver, InMemoryStatusTracker};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct CountingLauncher {
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl JobLauncher for CountingLauncher {
        async fn launch(&self, _ctx: ExecutionContext) -> AppResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("exit status 1");
            }
            Ok(())
        }
    }

    fn context(tracker: &Arc<InMemoryStatusTracker>, job_key: &str) -> ExecutionContext {
        ExecutionContext::new(
            job_key,
            Arc::clone(tracker) as Arc<dyn StatusTracker>,
            Arc::new(InMemoryArgumentResolver::new()),
        )
    }

    #[tokio::test]
    async fn test_gate_runs_job_without_predecessors() {
        let tracker = Arc::new(InMemoryStatusTracker::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let gate = GatedLauncher::new(
            CountingLauncher { runs: Arc::clone(&runs), fail: false },
            Duration::from_millis(5),
        );

        gate.launch(context(&tracker, "JK1")).await.unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.status("JK1"), Some(JobStatus::Completed));
    }

    #[tokio::test]
    async fn test_gate_waits_for_predecessor() {
        let tracker = Arc::new(InMemoryStatusTracker::new());
        tracker.add_dependency("JK2", "JK1");
        let runs = Arc::new(AtomicUsize::new(0));
        let gate = GatedLauncher::new(
            CountingLauncher { runs: Arc::clone(&runs), fail: false },
            Duration::from_millis(5),
        );

        let handle = tokio::spawn({
            let gate = gate.clone();
            let ctx = context(&tracker, "JK2");
            async move { gate.launch(ctx).await }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.status("JK2"), Some(JobStatus::Pending));

        tracker.set_status("JK1", JobStatus::Completed);
        handle.await.unwrap().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gate_refuses_after_failed_predecessor() {
        let tracker = Arc::new(InMemoryStatusTracker::new());
        tracker.add_dependency("JK2", "JK1");
        tracker.set_status("JK1", JobStatus::Failed("boom".into()));
        let runs = Arc::new(AtomicUsize::new(0));
        let gate = GatedLauncher::new(
            CountingLauncher { runs: Arc::clone(&runs), fail: false },
            Duration::from_millis(5),
        );

        let err = gate.launch(context(&tracker, "JK2")).await.unwrap_err();

        assert!(err.to_string().contains("predecessor `JK1` failed"));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(matches!(tracker.status("JK2"), Some(JobStatus::Failed(_))));
    }

    #[tokio::test]
    async fn test_gate_records_launch_failure() {
        let tracker = Arc::new(InMemoryStatusTracker::new());
        let gate = GatedLauncher::new(
            CountingLauncher { runs: Arc::new(AtomicUsize::new(0)), fail: true },
            Duration::from_millis(5),
        );

        assert!(gate.launch(context(&tracker, "JK1")).await.is_err());
        assert_eq!(
            tracker.status("JK1"),
            Some(JobStatus::Failed("exit status 1".into()))
        );
    }

    #[tokio::test]
    async fn test_disabled_gate_skips_waiting() {
        let tracker = Arc::new(InMemoryStatusTracker::new());
        tracker.add_dependency("JK2", "JK1");
        let runs = Arc::new(AtomicUsize::new(0));
        let cfg = GateConfig { enabled: false, poll_interval_ms: 5 };
        let gate = GatedLauncher::from_config(
            CountingLauncher { runs: Arc::clone(&runs), fail: false },
            &cfg,
        );

        gate.launch(context(&tracker, "JK2")).await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
