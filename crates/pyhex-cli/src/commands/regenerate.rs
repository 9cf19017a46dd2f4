//! `pyhex regenerate`: resync a layer registry and regenerate its domains.

use tracing::instrument;

use pyhex_core::domain::Layer;

use crate::{cli::RegenerateArgs, config::AppConfig, error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(layer = ?args.layer))]
pub fn execute(args: RegenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let layer = Layer::from(args.layer);
    let manager = super::domain_manager(&config);

    let mut bar = None;
    let result = manager.generator().regenerate_all_with(layer, |index, total, domain| {
        let bar = bar.get_or_insert_with(|| output.progress(total as u64));
        bar.set_position(index as u64);
        bar.set_message(domain.to_string());
    });
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    super::finish(&output, &format!("Regenerated {layer}"), &result?)
}
