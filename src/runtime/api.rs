//! Orchestrator-facing snapshot models.

use serde::{Deserialize, Serialize};

use crate::core::{BatchScheduler, TriggerState};

/// State of one registered unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Job key (also trigger and descriptor name).
    pub job_key: String,
    /// Trigger group.
    pub trigger_group: String,
    /// Repeats after the first firing.
    pub repeat_count: u32,
    /// Whether the descriptor outlives its trigger.
    pub durable: bool,
    /// Current trigger state.
    pub state: TriggerState,
}

/// State of one scheduler instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Instance name.
    pub name: String,
    /// Instance identity.
    pub instance_id: String,
    /// Whether triggers are held.
    pub paused: bool,
    /// Whether the instance was started.
    pub started: bool,
    /// Whether the instance was shut down.
    pub shut_down: bool,
    /// Fired units still running.
    pub in_flight: usize,
    /// Registered units, sorted by job key.
    pub units: Vec<UnitSnapshot>,
}

impl SchedulerSnapshot {
    /// Units in the given state.
    pub fn units_in(&self, state: TriggerState) -> impl Iterator<Item = &UnitSnapshot> {
        self.units.iter().filter(move |u| u.state == state)
    }
}

/// Capture the current state of a scheduler instance.
pub fn snapshot<L, S>(scheduler: &BatchScheduler<L, S>) -> SchedulerSnapshot {
    let units = scheduler
        .units()
        .into_iter()
        .map(|(unit, state)| UnitSnapshot {
            job_key: unit.job_key().to_owned(),
            trigger_group: unit.trigger().group().to_owned(),
            repeat_count: unit.trigger().repeat_count(),
            durable: unit.job().is_durable(),
            state,
        })
        .collect();

    SchedulerSnapshot {
        name: scheduler.name().to_owned(),
        instance_id: scheduler.instance_id().to_string(),
        paused: scheduler.is_paused(),
        started: scheduler.is_started(),
        shut_down: scheduler.is_shut_down(),
        in_flight: scheduler.in_flight(),
        units,
    }
}
