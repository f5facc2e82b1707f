//! # Batch Dispatch
//!
//! Per-run assembly of isolated, paused batch schedulers.
//!
//! A batch run is a named collection of tasks (stored procedures, shell or
//! cmd scripts, executable jars, binaries) wired into a graph of job keys.
//! Before anything runs, this crate assembles exactly one scheduler instance
//! for the run:
//!
//! - task definitions for the `(domain, batch)` are read and indexed,
//! - job keys from the caller's resource bundle are indexed and checked,
//! - every job key becomes one durable, one-shot unit carrying the run's
//!   shared status tracker and argument resolver,
//! - the instance is returned paused; an external orchestrator resumes it.
//!
//! Dangling task references and duplicate job keys fail the whole assembly.
//! No partially built instance is ever handed out.
//!
//! ## Example
//!
//! ```rust,ignore
//! use batch_dispatch::builders::AssemblerBuilder;
//! use batch_dispatch::config::DispatchConfig;
//! use batch_dispatch::core::BatchRunIdentity;
//! use batch_dispatch::runtime::TokioSpawner;
//!
//! let assembler = AssemblerBuilder::new(
//!     DispatchConfig::from_env()?,
//!     my_registry,      // implements TaskRegistry
//!     my_launcher,      // implements JobLauncher
//!     TokioSpawner::new(tokio::runtime::Handle::current()),
//! )
//! .build()?;
//!
//! let scheduler = assembler.assemble(&BatchRunIdentity::new("D1", "B1"), &bundle)?;
//! assert!(scheduler.is_paused());
//!
//! scheduler.resume_all();
//! // ...
//! scheduler.shutdown(true).await;
//! ```
//!
//! Ordering between job keys is not enforced by the scheduler itself; the
//! [`core::GatedLauncher`] holds each fired unit until the status tracker
//! reports its predecessors complete.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Batch assembly, scheduling abstractions, and collaborator contracts.
pub mod core;
/// Configuration models for scheduler instances and the predecessor gate.
pub mod config;
/// Builders to construct assemblers from configuration.
pub mod builders;
/// In-memory adapters for registries, status tracking, and arguments.
pub mod infra;
/// Runtime adapters and orchestrator-facing snapshots.
pub mod runtime;
/// Shared utilities.
pub mod util;
