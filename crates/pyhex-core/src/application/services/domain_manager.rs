//! Domain Manager - multi-layer orchestration.
//!
//! Layers always run in dependency order (core → repository → usecase →
//! service → interface). The first failing layer stops the run; layers
//! with nothing to generate are skipped.

use std::path::Path;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ports::Filesystem,
        services::{ConfigProcessor, LayerGenerator},
    },
    domain::{
        naming, paths, ComprehensiveConfig, DomainInfo, EntityDomainConfig, GenerationResult,
        Layer, ProjectLayout, WriteOutcome,
    },
    error::PyhexResult,
};

pub struct DomainManager {
    generator: LayerGenerator,
}

impl DomainManager {
    pub fn new(generator: LayerGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &LayerGenerator {
        &self.generator
    }

    fn processor(&self) -> &ConfigProcessor {
        self.generator.processor()
    }

    fn layout(&self) -> &ProjectLayout {
        self.generator.layout()
    }

    fn fs(&self) -> &dyn Filesystem {
        self.processor().filesystem()
    }

    /// Bootstrap a domain in the given layers.
    ///
    /// Creates each domain directory, copies the layer's template skeleton
    /// into it (existing files are left alone and reported as skipped) and
    /// registers the domain as `blank`.
    #[instrument(skip(self, layers))]
    pub fn add_domain(&self, name: &str, layers: &[Layer]) -> PyhexResult<GenerationResult> {
        LayerGenerator::check_domain_name(name)?;

        let mut result = GenerationResult::new().with_metadata("domain", name);
        for &layer in layers {
            let dir = self.layout().domain_dir(layer, name);
            self.fs().create_dir_all(&dir)?;
            self.copy_skeleton(layer, name, &dir, &mut result)?;

            let root = self.layout().layer_root(layer);
            if !self.processor().create_blank_domain(layer, &root, name)? {
                result.add_warning(format!("'{name}' is already registered in layer {layer}"));
            }
        }
        info!(layers = layers.len(), files = result.generated.len(), "Domain added");
        Ok(result)
    }

    fn copy_skeleton(
        &self,
        layer: Layer,
        name: &str,
        dir: &Path,
        result: &mut GenerationResult,
    ) -> PyhexResult<()> {
        let source = self.layout().template_dir(layer);
        if !self.fs().is_dir(&source) {
            result.add_warning(format!(
                "no template skeleton for layer {layer} at {}",
                source.display()
            ));
            return Ok(());
        }
        let package = naming::to_snake_case(name);
        for file in self.fs().list_files_recursive(&source)? {
            let Ok(relative) = file.strip_prefix(&source) else {
                continue;
            };
            let target = dir.join(paths::substitute_placeholder(relative, &package));
            if self.fs().exists(&target) {
                result.record(WriteOutcome::Skipped, target);
                continue;
            }
            if let Some(parent) = target.parent() {
                self.fs().create_dir_all(parent)?;
            }
            let content = self.fs().read_to_string(&file)?;
            self.fs().write_file(&target, &content)?;
            result.record(WriteOutcome::Generated, target);
        }
        Ok(())
    }

    /// Registered domains of a layer (empty when the registry is unreadable).
    pub fn list_domains(&self, layer: Layer) -> Vec<DomainInfo> {
        self.processor()
            .get_all_domains(layer, &self.layout().layer_root(layer))
    }

    /// Generate every layer of a domain from its config files on disk.
    ///
    /// A layer is attempted only when the domain directory carries that
    /// layer's config file(s) and the config has content for it: core and
    /// repository need entities in the core config, use case needs methods.
    /// A core config that fails to load stops the run before any layer.
    #[instrument(skip(self))]
    pub fn generate_all_layers(&self, name: &str) -> PyhexResult<GenerationResult> {
        LayerGenerator::check_domain_name(name)?;
        let mut all = GenerationResult::new().with_metadata("domain", name);
        let mut ran = Vec::new();

        let core = match self.load_core(name) {
            Ok(core) => core,
            Err(e) => {
                Self::absorb(&mut all, Layer::Core, Err(e));
                all.metadata.insert("layers".into(), String::new());
                return Ok(all);
            }
        };

        for layer in Layer::ALL {
            let dir = self.layout().domain_dir(layer, name);
            if !self.is_configured(layer, &dir) {
                info!(layer = %layer, "No config for layer, skipping");
                continue;
            }
            if !self.has_content(layer, &dir, core.as_ref()) {
                info!(layer = %layer, "Nothing to generate for layer, skipping");
                continue;
            }
            let step = self.generator.generate(layer, name);
            if !Self::absorb(&mut all, layer, step) {
                break;
            }
            ran.push(layer.as_str());
        }

        all.metadata.insert("layers".into(), ran.join(","));
        Ok(all)
    }

    fn is_configured(&self, layer: Layer, dir: &Path) -> bool {
        layer
            .status_files()
            .iter()
            .any(|f| self.fs().exists(&dir.join(f)))
    }

    fn load_core(&self, name: &str) -> PyhexResult<Option<EntityDomainConfig>> {
        let dir = self.layout().domain_dir(Layer::Core, name);
        if !self.is_configured(Layer::Core, &dir) {
            return Ok(None);
        }
        self.processor().load_domain_config(&dir).map(Some)
    }

    /// Same content rules as [`ComprehensiveConfig::applies_to`]. A use case
    /// config that does not load is left for the generator to report.
    fn has_content(&self, layer: Layer, dir: &Path, core: Option<&EntityDomainConfig>) -> bool {
        match layer {
            Layer::Core | Layer::Repository => core.is_some_and(|c| !c.entities.is_empty()),
            Layer::UseCase => self
                .processor()
                .load_usecase_config(dir)
                .map_or(true, |usecase| usecase.has_methods()),
            Layer::Service | Layer::Interface => true,
        }
    }

    /// Generate every applicable layer from one comprehensive config.
    #[instrument(skip(self, config), fields(domain = %config.domain.name))]
    pub fn generate_all_from_config(
        &self,
        config: &ComprehensiveConfig,
    ) -> PyhexResult<GenerationResult> {
        let name = config.domain.name.as_str();
        let mut all = GenerationResult::new().with_metadata("domain", name);
        let mut ran = Vec::new();

        for layer in Layer::ALL {
            let Some(payload) = config.payload(layer) else {
                info!(layer = %layer, "Nothing to generate for layer, skipping");
                continue;
            };
            let step = self
                .generator
                .generate_from_config(&payload, name, Some(&config.domain));
            if !Self::absorb(&mut all, layer, step) {
                break;
            }
            ran.push(layer.as_str());
        }

        all.metadata.insert("layers".into(), ran.join(","));
        Ok(all)
    }

    /// Fold one layer's outcome in. Returns `false` when the run must stop.
    fn absorb(
        all: &mut GenerationResult,
        layer: Layer,
        step: PyhexResult<GenerationResult>,
    ) -> bool {
        match step {
            Ok(result) => {
                let ok = result.success;
                all.merge(result);
                if !ok {
                    warn!(layer = %layer, "Layer reported errors, stopping");
                    all.add_error(format!("stopped after layer {layer} failed"));
                }
                ok
            }
            Err(e) => {
                warn!(layer = %layer, error = %e, "Layer failed, stopping");
                all.add_error(format!("layer {layer}: {}", e.detail()));
                false
            }
        }
    }
}
