//! `pyhex init`: write a default configuration file.

use std::path::PathBuf;

use crate::{
    cli::InitArgs,
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Write the default configuration as TOML.
///
/// Goes to `.pyhex.toml` in the project root, or to the platform config
/// directory with `--global`.
pub fn execute(args: InitArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let config_path = target_path(&args, &config);

    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    let toml = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| CliError::config("Failed to serialise default config", e))?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }
    std::fs::write(&config_path, &toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", config_path.display()))?;

    output.success(&format!("Configuration created at {}", config_path.display()))?;
    Ok(())
}

fn target_path(args: &InitArgs, config: &AppConfig) -> PathBuf {
    if args.global {
        AppConfig::config_path()
    } else {
        config.project.root.join(LOCAL_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_target_is_in_project_root() {
        let mut config = AppConfig::default();
        config.project.root = PathBuf::from("/work/app");
        let args = InitArgs {
            global: false,
            force: false,
        };
        assert_eq!(target_path(&args, &config), PathBuf::from("/work/app/.pyhex.toml"));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
