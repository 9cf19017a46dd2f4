//! Infrastructure adapters for Pyhex.
//!
//! This crate implements the ports defined in `pyhex-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod renderer;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::{MiniJinjaRenderer, RendererOptions};
