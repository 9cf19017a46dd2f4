//! `pyhex domain`: add and list domains.

use std::collections::BTreeMap;

use tracing::instrument;

use pyhex_core::domain::{DomainInfo, Layer};

use crate::{
    cli::DomainCommands,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

pub fn execute(cmd: DomainCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        DomainCommands::Add { name, layers } => {
            let layers = selected_layers(layers.into_iter().map(Layer::from).collect());
            add(&name, &layers, &config, &output)
        }
        DomainCommands::List { layer } => {
            let layers = selected_layers(layer.map(Layer::from).into_iter().collect());
            list(&layers, &config, &output)
        }
    }
}

/// No `--layer` flag means every layer.
fn selected_layers(layers: Vec<Layer>) -> Vec<Layer> {
    if layers.is_empty() {
        Layer::ALL.to_vec()
    } else {
        layers
    }
}

#[instrument(skip(config, output))]
fn add(name: &str, layers: &[Layer], config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let manager = super::domain_manager(config);
    let result = manager
        .add_domain(name, layers)
        .with_cli_context(|| format!("adding domain {name}"))?;
    super::finish(output, &format!("Added domain {name}"), &result)?;

    if !output.is_json() {
        output.info(&format!(
            "Fill in the config files, then run 'pyhex generate-all {name}'"
        ))?;
    }
    Ok(())
}

fn list(layers: &[Layer], config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let manager = super::domain_manager(config);
    let listing: BTreeMap<&'static str, Vec<DomainInfo>> = layers
        .iter()
        .map(|&layer| (layer.as_str(), manager.list_domains(layer)))
        .collect();

    if output.is_json() {
        output.json(&listing)?;
        return Ok(());
    }

    for (layer, domains) in &listing {
        output.header(&format!("{layer} ({})", domains.len()))?;
        if domains.is_empty() {
            output.print("  (no domains)")?;
        }
        for domain in domains {
            output.print(&format!("  {:<24} {}", domain.name, domain.status))?;
        }
    }
    Ok(())
}
