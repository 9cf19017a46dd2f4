//! `pyhex generate`: render one layer of one domain.

use tracing::{info, instrument};

use pyhex_core::domain::Layer;

use crate::{
    cli::GenerateArgs,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(layer = ?args.layer, domain = %args.name))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let layer = Layer::from(args.layer);
    let manager = super::domain_manager(&config);
    let generator = manager.generator();

    let result = match &args.from_config {
        Some(file) => {
            info!(file = %file.display(), "Generating from config file");
            let payload = generator
                .processor()
                .load_layer_file(layer, file)
                .with_cli_context(|| format!("loading {}", file.display()))?;
            generator.generate_from_config(&payload, &args.name, None)?
        }
        None => generator.generate(layer, &args.name)?,
    };

    super::finish(&output, &format!("{layer}/{}", args.name), &result)
}
