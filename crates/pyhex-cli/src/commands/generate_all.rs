//! `pyhex generate-all`: render every layer of one domain.

use tracing::instrument;

use crate::{
    cli::GenerateAllArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(domain = %args.name))]
pub fn execute(args: GenerateAllArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let manager = super::domain_manager(&config);

    let result = match &args.config_file {
        Some(file) => {
            let comprehensive = manager
                .generator()
                .processor()
                .load_comprehensive(file)
                .with_cli_context(|| format!("loading {}", file.display()))?;
            if comprehensive.domain.name != args.name {
                return Err(CliError::InvalidInput {
                    message: format!(
                        "'{}' declares domain '{}', not '{}'",
                        file.display(),
                        comprehensive.domain.name,
                        args.name
                    ),
                    source: None,
                });
            }
            manager.generate_all_from_config(&comprehensive)?
        }
        None => manager.generate_all_layers(&args.name)?,
    };

    super::finish(&output, &format!("All layers of {}", args.name), &result)
}
