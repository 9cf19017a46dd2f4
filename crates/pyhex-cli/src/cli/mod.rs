//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use pyhex_core::domain::Layer;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "pyhex",
    bin_name = "pyhex",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Hexagonal FastAPI application generator",
    long_about = "Pyhex generates FastAPI/SQLModel applications with a hexagonal \
                  layout (core, repository, usecase, service, interface) from \
                  layered YAML configuration and Jinja templates.",
    after_help = "EXAMPLES:\n\
        \x20 pyhex domain add Order\n\
        \x20 pyhex generate core Order\n\
        \x20 pyhex generate-all Order --config-file order.yaml\n\
        \x20 pyhex regenerate core\n\
        \x20 pyhex completions bash > /usr/share/bash-completion/completions/pyhex",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add or list domains.
    #[command(
        subcommand,
        about = "Manage domains",
        after_help = "EXAMPLES:\n\
            \x20 pyhex domain add Order\n\
            \x20 pyhex domain add Billing --layer core --layer service\n\
            \x20 pyhex domain list --layer core"
    )]
    Domain(DomainCommands),

    /// Generate one layer of one domain.
    #[command(
        visible_alias = "g",
        about = "Generate a layer of a domain",
        after_help = "EXAMPLES:\n\
            \x20 pyhex generate core Order\n\
            \x20 pyhex generate service Order --from-config service.yaml"
    )]
    Generate(GenerateArgs),

    /// Generate every layer of one domain.
    #[command(
        about = "Generate all layers of a domain",
        after_help = "EXAMPLES:\n\
            \x20 pyhex generate-all Order\n\
            \x20 pyhex generate-all Order --config-file order.yaml"
    )]
    GenerateAll(GenerateAllArgs),

    /// Regenerate every configured domain of a layer.
    #[command(
        about = "Regenerate all domains of a layer",
        after_help = "EXAMPLES:\n\
            \x20 pyhex regenerate core"
    )]
    Regenerate(RegenerateArgs),

    /// Rebuild a layer registry from the directories on disk.
    #[command(
        about = "Resync a layer registry (destructive)",
        after_help = "EXAMPLES:\n\
            \x20 pyhex sync core\n\
            \x20 pyhex sync service --yes"
    )]
    Sync(SyncArgs),

    /// Check preservation markers in templates.
    #[command(
        about = "Lint template preservation markers",
        after_help = "EXAMPLES:\n\
            \x20 pyhex lint\n\
            \x20 pyhex lint templates/core"
    )]
    Lint(LintArgs),

    /// Initialise a Pyhex configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 pyhex init           # .pyhex.toml in the project root\n\
            \x20 pyhex init --global  # global config"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 pyhex completions bash > ~/.local/share/bash-completion/completions/pyhex\n\
            \x20 pyhex completions zsh  > ~/.zfunc/_pyhex\n\
            \x20 pyhex completions fish > ~/.config/fish/completions/pyhex.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Pyhex configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 pyhex config get templates.root\n\
            \x20 pyhex config list\n\
            \x20 pyhex config path"
    )]
    Config(ConfigCommands),
}

// ── domain ────────────────────────────────────────────────────────────────────

/// Subcommands for `pyhex domain`.
#[derive(Debug, Subcommand)]
pub enum DomainCommands {
    /// Create a domain directory from the template skeleton and register it.
    Add {
        /// Domain name in PascalCase, e.g. `Order`.
        #[arg(value_name = "NAME")]
        name: String,

        /// Layers to add the domain to (default: all).
        #[arg(short = 'l', long = "layer", value_enum, value_name = "LAYER")]
        layers: Vec<LayerArg>,
    },
    /// List registered domains.
    #[command(visible_alias = "ls")]
    List {
        /// Only this layer (default: all).
        #[arg(short = 'l', long = "layer", value_enum, value_name = "LAYER")]
        layer: Option<LayerArg>,
    },
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `pyhex generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(value_enum, value_name = "LAYER")]
    pub layer: LayerArg,

    #[arg(value_name = "NAME", help = "Domain name")]
    pub name: String,

    /// Render from this config file and the template source tree instead
    /// of the domain directory.
    #[arg(long = "from-config", value_name = "FILE")]
    pub from_config: Option<PathBuf>,
}

/// Arguments for `pyhex generate-all`.
#[derive(Debug, Args)]
pub struct GenerateAllArgs {
    #[arg(value_name = "NAME", help = "Domain name")]
    pub name: String,

    /// Comprehensive config holding every layer's settings.
    #[arg(long = "config-file", visible_alias = "from-config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

/// Arguments for `pyhex regenerate`.
#[derive(Debug, Args)]
pub struct RegenerateArgs {
    #[arg(value_enum, value_name = "LAYER")]
    pub layer: LayerArg,
}

/// Arguments for `pyhex sync`.
#[derive(Debug, Args)]
pub struct SyncArgs {
    #[arg(value_enum, value_name = "LAYER")]
    pub layer: LayerArg,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation")]
    pub yes: bool,
}

/// Arguments for `pyhex lint`.
#[derive(Debug, Args)]
pub struct LintArgs {
    /// Template root to scan (default: `templates.root`).
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `pyhex init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the global config location.
    #[arg(long = "global", help = "Create global configuration")]
    pub global: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `pyhex completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `pyhex config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `templates.root`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the configuration files that are consulted.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Architecture layers, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayerArg {
    Core,
    Repository,
    /// Also accepted as `use-case`.
    #[value(alias = "use-case")]
    Usecase,
    Service,
    Interface,
}

impl From<LayerArg> for Layer {
    fn from(arg: LayerArg) -> Self {
        match arg {
            LayerArg::Core => Layer::Core,
            LayerArg::Repository => Layer::Repository,
            LayerArg::Usecase => Layer::UseCase,
            LayerArg::Service => Layer::Service,
            LayerArg::Interface => Layer::Interface,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn layer_arg_converts_in_order() {
        let layers: Vec<Layer> = LayerArg::value_variants()
            .iter()
            .map(|&arg| arg.into())
            .collect();
        assert_eq!(layers, Layer::ALL);
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from(["pyhex", "generate", "core", "Order"]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.layer, LayerArg::Core);
                assert_eq!(args.name, "Order");
                assert!(args.from_config.is_none());
            }
            other => panic!("expected Generate, got {other:?}"),
        }
    }

    #[test]
    fn use_case_alias() {
        let cli = Cli::parse_from(["pyhex", "regenerate", "use-case"]);
        if let Commands::Regenerate(args) = cli.command {
            assert_eq!(args.layer, LayerArg::Usecase);
        } else {
            panic!("expected Regenerate command");
        }
    }

    #[test]
    fn domain_add_collects_layers() {
        let cli = Cli::parse_from([
            "pyhex", "domain", "add", "Order", "-l", "core", "--layer", "service",
        ]);
        match cli.command {
            Commands::Domain(DomainCommands::Add { name, layers }) => {
                assert_eq!(name, "Order");
                assert_eq!(layers, [LayerArg::Core, LayerArg::Service]);
            }
            other => panic!("expected domain add, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "pyhex",
            "sync",
            "core",
            "--yes",
            "--output-format",
            "json",
            "-C",
            "/tmp/app",
        ]);
        assert_eq!(cli.global.output_format, OutputFormat::Json);
        assert_eq!(cli.global.project_root, Some(PathBuf::from("/tmp/app")));
    }

    #[test]
    fn unknown_layer_is_rejected() {
        assert!(Cli::try_parse_from(["pyhex", "generate", "domain", "Order"]).is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["pyhex", "--quiet", "--verbose", "lint"]);
        assert!(result.is_err());
    }
}
