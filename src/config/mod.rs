//! Configuration models for scheduler instances and the predecessor gate.

pub mod dispatch;

pub use dispatch::{DispatchConfig, GateConfig, SchedulerOptions};
