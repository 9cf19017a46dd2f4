//! Config Processor - the single point that reads layer configs from disk.
//!
//! Responsibilities:
//! 1. Read YAML documents through the `Filesystem` port
//! 2. Merge multi-file configs per layer convention
//! 3. Validate them into typed configs
//! 4. Maintain the per-layer registry (`layer_config.yaml`)

use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{
        ComprehensiveConfig, DomainError, DomainInfo, DomainStatus, EntityDomainConfig,
        InterfaceConfig, Layer, LayerConfig, LayerPayload, ProjectLayout, RepositoryConfig,
        ServiceConfig, UseCaseConfig,
        config::merge::{merge_core_documents, merge_usecase_documents},
        paths::DOMAIN_PLACEHOLDER,
    },
    error::PyhexResult,
};

/// Holds the registry lock file; removing it on drop releases the lock.
#[must_use = "the registry lock is released as soon as the guard is dropped"]
pub struct RegistryLock<'a> {
    fs: &'a dyn Filesystem,
    path: PathBuf,
}

impl Drop for RegistryLock<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.fs.remove_file(&self.path) {
            warn!(error = %e, path = %self.path.display(), "Failed to release registry lock");
        }
    }
}

/// Loads, merges and validates layer configs, and owns the layer registries.
pub struct ConfigProcessor {
    fs: Box<dyn Filesystem>,
}

impl ConfigProcessor {
    pub fn new(fs: Box<dyn Filesystem>) -> Self {
        Self { fs }
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    // -------------------------------------------------------------------------
    // Document loading
    // -------------------------------------------------------------------------

    /// Read and parse a YAML file. `Ok(None)` when the file does not exist.
    fn read_yaml(&self, path: &Path, operation: &'static str) -> PyhexResult<Option<Value>> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        let text = self.fs.read_to_string(path)?;
        let value: Value = serde_yaml::from_str(&text).map_err(|e| {
            ApplicationError::config(path, operation, DomainError::validation("", e.to_string()))
        })?;
        Ok(Some(value))
    }

    /// A config path may name the file itself or the domain directory
    /// holding the conventional filename.
    fn resolve_file(&self, path: &Path, filename: &str) -> PathBuf {
        if self.fs.is_dir(path) {
            path.join(filename)
        } else {
            path.to_path_buf()
        }
    }

    /// Load `domain.yaml` + `entities.yaml` from a core domain directory.
    ///
    /// Either file may be missing (logged as a warning); only validation of
    /// the merged document can fail.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn load_domain_config(&self, dir: &Path) -> PyhexResult<EntityDomainConfig> {
        const OPERATION: &str = "loading core config";
        let domain_path = dir.join("domain.yaml");
        let entities_path = dir.join("entities.yaml");

        let domain = self.read_yaml(&domain_path, OPERATION)?;
        if domain.is_none() {
            warn!(path = %domain_path.display(), "domain.yaml not found, using empty domain settings");
        }
        let entities = self.read_yaml(&entities_path, OPERATION)?;
        if entities.is_none() {
            warn!(path = %entities_path.display(), "entities.yaml not found, using empty entity list");
        }

        let merged = merge_core_documents(domain.as_ref(), entities.as_ref())
            .map_err(|e| ApplicationError::config(dir, OPERATION, e))?;
        let config = EntityDomainConfig::from_value(merged)
            .map_err(|e| ApplicationError::config(dir, OPERATION, e))?;

        for warning in config.warnings() {
            warn!(domain = %config.name, "{warning}");
        }
        debug!(
            domain = %config.name,
            entities = config.entities.len(),
            endpoints = config.endpoints.len(),
            "Core config loaded"
        );
        Ok(config)
    }

    /// Load `usecase.yaml` (required) overlaid with `business-rules.yaml` (optional).
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn load_usecase_config(&self, dir: &Path) -> PyhexResult<UseCaseConfig> {
        const OPERATION: &str = "loading use case config";
        let usecase_path = self.resolve_file(dir, "usecase.yaml");
        let rules_path = usecase_path.with_file_name("business-rules.yaml");

        let usecase = self.read_yaml(&usecase_path, OPERATION)?.ok_or_else(|| {
            ApplicationError::config(
                &usecase_path,
                OPERATION,
                DomainError::validation("", "usecase.yaml is required but missing"),
            )
        })?;
        let rules = self.read_yaml(&rules_path, OPERATION)?;

        let merged = merge_usecase_documents(&usecase, rules.as_ref())
            .map_err(|e| ApplicationError::config(&usecase_path, OPERATION, e))?;
        Ok(UseCaseConfig::from_value(merged)
            .map_err(|e| ApplicationError::config(&usecase_path, OPERATION, e))?)
    }

    fn load_single<T>(
        &self,
        path: &Path,
        filename: &str,
        operation: &'static str,
        parse: impl FnOnce(Value) -> Result<T, DomainError>,
    ) -> PyhexResult<T> {
        let file = self.resolve_file(path, filename);
        let value = self.read_yaml(&file, operation)?.ok_or_else(|| {
            ApplicationError::config(
                &file,
                operation,
                DomainError::validation("", format!("{filename} not found")),
            )
        })?;
        Ok(parse(value).map_err(|e| ApplicationError::config(&file, operation, e))?)
    }

    pub fn load_service_config(&self, path: &Path) -> PyhexResult<ServiceConfig> {
        self.load_single(path, "service.yaml", "loading service config", ServiceConfig::from_value)
    }

    pub fn load_interface_config(&self, path: &Path) -> PyhexResult<InterfaceConfig> {
        self.load_single(
            path,
            "interface.yaml",
            "loading interface config",
            InterfaceConfig::from_value,
        )
    }

    pub fn load_repository_config(&self, path: &Path) -> PyhexResult<RepositoryConfig> {
        self.load_single(
            path,
            "repository.yaml",
            "loading repository config",
            RepositoryConfig::from_value,
        )
    }

    /// Load the config of one layer from a domain directory.
    pub fn load_layer(&self, layer: Layer, dir: &Path) -> PyhexResult<LayerPayload> {
        Ok(match layer {
            Layer::Core => LayerPayload::Core(self.load_domain_config(dir)?),
            Layer::Repository => LayerPayload::Repository(self.load_repository_config(dir)?),
            Layer::UseCase => LayerPayload::UseCase(self.load_usecase_config(dir)?),
            Layer::Service => LayerPayload::Service(self.load_service_config(dir)?),
            Layer::Interface => LayerPayload::Interface(self.load_interface_config(dir)?),
        })
    }

    /// Load a single-document config for one layer (`generate --from-config`).
    pub fn load_layer_file(&self, layer: Layer, file: &Path) -> PyhexResult<LayerPayload> {
        const OPERATION: &str = "loading config file";
        let value = self.read_yaml(file, OPERATION)?.ok_or_else(|| {
            ApplicationError::config(file, OPERATION, DomainError::validation("", "file not found"))
        })?;
        let value = if layer == Layer::Core {
            merge_core_documents(Some(&value), value.get("entities"))
                .map_err(|e| ApplicationError::config(file, OPERATION, e))?
        } else {
            value
        };
        Ok(LayerPayload::from_value(layer, value)
            .map_err(|e| ApplicationError::config(file, OPERATION, e))?)
    }

    /// Load a whole-domain config carrying every layer.
    #[instrument(skip(self, file), fields(file = %file.display()))]
    pub fn load_comprehensive(&self, file: &Path) -> PyhexResult<ComprehensiveConfig> {
        const OPERATION: &str = "loading comprehensive config";
        let value = self.read_yaml(file, OPERATION)?.ok_or_else(|| {
            ApplicationError::config(file, OPERATION, DomainError::validation("", "file not found"))
        })?;
        let config = ComprehensiveConfig::from_value(value)
            .map_err(|e| ApplicationError::config(file, OPERATION, e))?;
        for warning in config.domain.warnings() {
            warn!(domain = %config.domain.name, "{warning}");
        }
        Ok(config)
    }

    // -------------------------------------------------------------------------
    // Layer registry
    // -------------------------------------------------------------------------

    /// Read a layer registry. A missing file yields an empty registry.
    pub fn load_registry(&self, layer: Layer, layer_root: &Path) -> PyhexResult<LayerConfig> {
        let path = ProjectLayout::registry_path(layer_root);
        if !self.fs.exists(&path) {
            return Ok(LayerConfig::new(layer));
        }
        let text = self.fs.read_to_string(&path)?;
        Ok(LayerConfig::from_yaml(&text)
            .map_err(|e| ApplicationError::config(&path, "reading layer registry", e))?)
    }

    fn save_registry(&self, layer_root: &Path, registry: &LayerConfig) -> PyhexResult<()> {
        let path = ProjectLayout::registry_path(layer_root);
        let text = registry
            .to_yaml()
            .map_err(|e| ApplicationError::config(&path, "writing layer registry", e))?;
        self.fs.write_file(&path, &text)
    }

    /// Take the advisory registry lock of a layer.
    ///
    /// Fails with `RegistryLocked` when another invocation holds it.
    pub fn lock_registry(&self, layer_root: &Path) -> PyhexResult<RegistryLock<'_>> {
        self.fs.create_dir_all(layer_root)?;
        let path = ProjectLayout::lock_path(layer_root);
        let owner = format!("pid {}\n", std::process::id());
        if !self.fs.create_new(&path, &owner)? {
            return Err(ApplicationError::RegistryLocked { path }.into());
        }
        Ok(RegistryLock {
            fs: self.fs.as_ref(),
            path,
        })
    }

    /// Locked read-modify-write of one registry.
    fn modify_registry<T>(
        &self,
        layer: Layer,
        layer_root: &Path,
        change: impl FnOnce(&mut LayerConfig) -> (bool, T),
    ) -> PyhexResult<T> {
        let _lock = self.lock_registry(layer_root)?;
        let mut registry = self.load_registry(layer, layer_root)?;
        let (dirty, out) = change(&mut registry);
        if dirty {
            self.save_registry(layer_root, &registry)?;
        }
        Ok(out)
    }

    /// Domains recorded in a layer registry.
    ///
    /// Never fails: an unreadable registry is logged and reads as empty.
    pub fn get_all_domains(&self, layer: Layer, layer_root: &Path) -> Vec<DomainInfo> {
        match self.load_registry(layer, layer_root) {
            Ok(registry) => registry.domains,
            Err(e) => {
                warn!(layer = %layer, error = %e, "Could not read layer registry");
                Vec::new()
            }
        }
    }

    /// Register a blank domain.
    ///
    /// Returns `false`, leaving the registry untouched, if the name exists.
    #[instrument(skip(self, layer, layer_root), fields(layer = %layer))]
    pub fn create_blank_domain(
        &self,
        layer: Layer,
        layer_root: &Path,
        name: &str,
    ) -> PyhexResult<bool> {
        let added = self.modify_registry(layer, layer_root, |registry| {
            let added = registry.add_blank(name);
            (added, added)
        })?;
        if added {
            info!(domain = name, "Registered blank domain");
        }
        Ok(added)
    }

    /// Set the status of a registered domain. Returns `false` if unknown.
    #[instrument(skip(self, layer, layer_root), fields(layer = %layer))]
    pub fn update_domain_status(
        &self,
        layer: Layer,
        layer_root: &Path,
        name: &str,
        status: DomainStatus,
    ) -> PyhexResult<bool> {
        self.modify_registry(layer, layer_root, |registry| {
            let found = registry.set_status(name, status);
            (found, found)
        })
    }

    /// Rebuild a layer registry from the directories on disk.
    ///
    /// **Destructive.** The filesystem is the ground truth: the domain list
    /// is replaced by a fresh scan of the layer root, so registry entries
    /// without a directory disappear and every status is recomputed from
    /// config files (`configured` if present, else `blank`). Anything beyond
    /// name, status and config files is lost. Layer-level settings
    /// (`layer`, `generation`, `metadata`) are kept.
    ///
    /// A missing layer root yields an empty registry and nothing is written.
    #[instrument(skip(self, layer, layer_root), fields(layer = %layer))]
    pub fn sync_domain_registry(&self, layer: Layer, layer_root: &Path) -> PyhexResult<LayerConfig> {
        if !self.fs.is_dir(layer_root) {
            info!(root = %layer_root.display(), "Layer root does not exist, nothing to sync");
            return Ok(LayerConfig::new(layer));
        }

        // Scan under the lock so the snapshot cannot go stale before the write.
        let _lock = self.lock_registry(layer_root)?;
        let scanned = self.scan_domains(layer, layer_root)?;
        let count = scanned.len();
        let mut registry = self.load_registry(layer, layer_root)?;
        registry.replace_domains(scanned);
        self.save_registry(layer_root, &registry)?;

        info!(domains = count, "Layer registry synced from filesystem");
        Ok(registry)
    }

    fn scan_domains(&self, layer: Layer, layer_root: &Path) -> PyhexResult<Vec<DomainInfo>> {
        let mut domains = Vec::new();
        for dir in self.fs.list_dirs(layer_root)? {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || name == DOMAIN_PLACEHOLDER {
                continue;
            }
            let config_files: Vec<String> = layer
                .config_files()
                .iter()
                .filter(|f| self.fs.exists(&dir.join(f)))
                .map(|f| f.to_string())
                .collect();
            let configured = layer
                .status_files()
                .iter()
                .any(|f| self.fs.exists(&dir.join(f)));
            domains.push(DomainInfo {
                name: name.to_string(),
                status: if configured {
                    DomainStatus::Configured
                } else {
                    DomainStatus::Blank
                },
                config_files,
                description: None,
            });
        }
        Ok(domains)
    }
}
