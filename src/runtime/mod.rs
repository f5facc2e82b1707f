//! Runtime adapters and the orchestrator-facing snapshot surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{snapshot, SchedulerSnapshot, UnitSnapshot};
pub use tokio_spawner::TokioSpawner;
