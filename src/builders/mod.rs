//! Builders to construct assemblers from configuration.

pub mod assembler_builder;

pub use assembler_builder::AssemblerBuilder;
