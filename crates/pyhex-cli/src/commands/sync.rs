//! `pyhex sync`: rebuild a layer registry from the directories on disk.
//!
//! Resyncing discards registry-only data (descriptions, statuses of domains
//! whose directories are gone), so it asks first unless `--yes` is given.

use std::io::IsTerminal as _;

use tracing::instrument;

use pyhex_core::domain::Layer;

use crate::{
    cli::SyncArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(layer = ?args.layer))]
pub fn execute(args: SyncArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let layer = Layer::from(args.layer);
    if !args.yes && !confirm(layer)? {
        return Err(CliError::Cancelled);
    }

    let manager = super::domain_manager(&config);
    let root = manager.generator().layout().layer_root(layer);
    let registry = manager
        .generator()
        .processor()
        .sync_domain_registry(layer, &root)?;

    if output.is_json() {
        output.json(&registry)?;
        return Ok(());
    }
    output.success(&format!(
        "Synced {layer} registry: {} domain(s)",
        registry.domains.len()
    ))?;
    for domain in &registry.domains {
        output.print(&format!("  {:<24} {}", domain.name, domain.status))?;
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm(layer: Layer) -> CliResult<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(non_interactive());
    }
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Rebuild the {layer} registry from disk? Registry-only data will be lost"
        ))
        .default(false)
        .interact()
        .map_err(|e| CliError::InvalidInput {
            message: "could not read confirmation".into(),
            source: Some(Box::new(e)),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(_layer: Layer) -> CliResult<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(non_interactive());
    }
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

fn non_interactive() -> CliError {
    CliError::InvalidInput {
        message: "sync needs confirmation; pass --yes when stdin is not a terminal".into(),
        source: None,
    }
}
