//! Infrastructure adapters for task registries, status tracking, and arguments.

pub mod memory;

pub use memory::{
    InMemoryArgumentResolver, InMemoryResourceBundle, InMemoryStatusTracker, InMemoryTaskRegistry,
};
