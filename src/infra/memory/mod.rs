//! In-memory collaborators for development and tests.

pub mod arguments;
pub mod bundle;
pub mod registry;
pub mod status;

pub use arguments::InMemoryArgumentResolver;
pub use bundle::InMemoryResourceBundle;
pub use registry::InMemoryTaskRegistry;
pub use status::InMemoryStatusTracker;
