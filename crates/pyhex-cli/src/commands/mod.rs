//! Command handlers, one module per subcommand.
//!
//! Handlers receive already-parsed arguments, the loaded [`AppConfig`] and
//! the [`OutputManager`]; they never parse flags or touch the subscriber.

use pyhex_adapters::{LocalFilesystem, MiniJinjaRenderer};
use pyhex_core::application::{ConfigProcessor, DomainManager, LayerGenerator};
use pyhex_core::domain::GenerationResult;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::output::OutputManager;

pub mod completions;
pub mod config;
pub mod domain;
pub mod generate;
pub mod generate_all;
pub mod init;
pub mod lint;
pub mod regenerate;
pub mod sync;

/// Wire the local filesystem and the Jinja renderer into the core services.
pub(crate) fn domain_manager(config: &AppConfig) -> DomainManager {
    let processor = ConfigProcessor::new(Box::new(LocalFilesystem::new()));
    let renderer = MiniJinjaRenderer::with_options(config.renderer_options());
    DomainManager::new(LayerGenerator::new(
        processor,
        Box::new(renderer),
        config.layout(),
    ))
}

/// Print a result and turn recorded errors into a failing exit code.
pub(crate) fn finish(output: &OutputManager, title: &str, result: &GenerationResult) -> CliResult<()> {
    output.report(title, result)?;
    if result.success {
        Ok(())
    } else {
        Err(CliError::GenerationFailed {
            errors: result.errors.len(),
        })
    }
}
