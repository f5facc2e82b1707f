//! Typed execution context handed to the job execution entry point.

use std::fmt;
use std::sync::Arc;

use crate::core::services::{ArgumentResolver, StatusTracker};

/// Everything a fired unit needs: its job key plus the run's shared services.
///
/// Cloning shares the tracker and resolver; it never copies them.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Job key of the unit.
    pub job_key: String,
    /// Status tracker of the batch run.
    pub status_tracker: Arc<dyn StatusTracker>,
    /// Argument resolver of the batch run.
    pub argument_resolver: Arc<dyn ArgumentResolver>,
}

impl ExecutionContext {
    /// Bundle a job key with the run's services.
    pub fn new(
        job_key: impl Into<String>,
        status_tracker: Arc<dyn StatusTracker>,
        argument_resolver: Arc<dyn ArgumentResolver>,
    ) -> Self {
        Self {
            job_key: job_key.into(),
            status_tracker,
            argument_resolver,
        }
    }

    /// Whether both contexts point at the same tracker and resolver instances.
    #[must_use]
    pub fn shares_services_with(&self, other: &Self) -> bool {
        same_instance(&self.status_tracker, &other.status_tracker)
            && same_instance(&self.argument_resolver, &other.argument_resolver)
    }
}

// Compare data pointers only; vtable pointers may differ across codegen units.
fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("job_key", &self.job_key)
            .finish_non_exhaustive()
    }
}
