//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate a layer" or "sync a registry".

pub mod config_processor;
pub mod domain_manager;
pub mod layer_generator;
pub mod template_linter;

pub use config_processor::{ConfigProcessor, RegistryLock};
pub use domain_manager::DomainManager;
pub use layer_generator::LayerGenerator;
pub use template_linter::{LintFinding, LintReport, TemplateLinter};
