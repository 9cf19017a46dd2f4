//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only receives the [`ProjectLayout`]
//! and renderer options derived from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (`--project-root`, `--no-color`; applied by [`AppConfig::apply_overrides`])
//! 2. Environment variables (`PYHEX__TEMPLATES__ROOT=...`)
//! 3. Config files: `--config FILE` if given, otherwise the global file and
//!    then `.pyhex.toml` in the working directory
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use pyhex_adapters::RendererOptions;
use pyhex_core::domain::ProjectLayout;

use crate::cli::global::GlobalArgs;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = ".pyhex.toml";

const ENV_PREFIX: &str = "PYHEX";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub project: ProjectConfig,
    pub templates: TemplateConfig,
    pub output: OutputConfig,
}

/// Where the generated application lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub root: PathBuf,
    /// Directory under `root` holding one directory per layer.
    pub layers_dir: PathBuf,
}

/// Template source tree and Jinja options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Relative paths resolve against `project.root`.
    pub root: PathBuf,
    pub trim_blocks: bool,
    pub lstrip_blocks: bool,
    pub strict_undefined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                root: PathBuf::from("."),
                layers_dir: PathBuf::from("src"),
            },
            templates: TemplateConfig {
                root: PathBuf::from("templates"),
                trim_blocks: true,
                lstrip_blocks: true,
                strict_undefined: false,
            },
            output: OutputConfig {
                no_color: false,
                format: "auto".into(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration by layering files and environment over defaults.
    ///
    /// An explicit `config_file` must exist; the default locations are
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml).required(true)),
            None => builder
                .add_source(
                    File::from(Self::config_path())
                        .format(FileFormat::Toml)
                        .required(false),
                )
                .add_source(
                    File::from(Path::new(LOCAL_CONFIG_FILE))
                        .format(FileFormat::Toml)
                        .required(false),
                ),
        };

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Apply the CLI flags that shadow configuration values.
    pub fn apply_overrides(&mut self, args: &GlobalArgs) {
        if let Some(root) = &args.project_root {
            self.project.root = root.clone();
        }
        if args.no_color {
            self.output.no_color = true;
        }
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.pyhex.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "pyhex", "pyhex")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Config files consulted when no `--config` flag is given, in load order.
    pub fn search_paths() -> Vec<PathBuf> {
        vec![Self::config_path(), PathBuf::from(LOCAL_CONFIG_FILE)]
    }

    /// Directory layout of the project this configuration points at.
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(
            &self.project.root,
            &self.project.layers_dir,
            self.template_root(),
        )
    }

    /// `templates.root`, resolved against the project root.
    pub fn template_root(&self) -> PathBuf {
        self.project.root.join(&self.templates.root)
    }

    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            trim_blocks: self.templates.trim_blocks,
            lstrip_blocks: self.templates.lstrip_blocks,
            strict_undefined: self.templates.strict_undefined,
        }
    }

    /// Look up a dotted key such as `templates.root`.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut value = serde_json::to_value(self).ok()?;
        for part in key.split('.') {
            value = value.get_mut(part)?.take();
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_describe_a_conventional_project() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.project.layers_dir, PathBuf::from("src"));
        assert_eq!(cfg.templates.root, PathBuf::from("templates"));
        assert!(cfg.templates.trim_blocks);
        assert!(!cfg.templates.strict_undefined);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pyhex.toml");
        fs::write(
            &path,
            "[project]\nlayers_dir = \"app\"\n\n[templates]\nstrict_undefined = true\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.project.layers_dir, PathBuf::from("app"));
        assert_eq!(cfg.project.root, PathBuf::from("."));
        assert!(cfg.templates.strict_undefined);
        assert!(cfg.templates.lstrip_blocks);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&tmp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[project\nroot = ").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn layout_resolves_templates_under_project_root() {
        let mut cfg = AppConfig::default();
        cfg.project.root = PathBuf::from("/work/app");
        let layout = cfg.layout();
        assert_eq!(layout.template_root(), Path::new("/work/app/templates"));

        cfg.templates.root = PathBuf::from("/shared/templates");
        assert_eq!(cfg.template_root(), PathBuf::from("/shared/templates"));
    }

    #[test]
    fn get_walks_dotted_keys() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.get("project.layers_dir"),
            Some(serde_json::Value::String("src".into()))
        );
        assert_eq!(
            cfg.get("templates.trim_blocks"),
            Some(serde_json::Value::Bool(true))
        );
        assert!(cfg.get("templates.missing").is_none());
        assert!(cfg.get("project").unwrap().is_object());
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
