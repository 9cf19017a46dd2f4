//! Layer Generator - renders one layer of one domain.
//!
//! Every layer follows the same sequence:
//! 1. Check the domain directory (generate from scaffold only)
//! 2. Load, merge and validate the layer config
//! 3. Build the template context
//! 4. Discover `.j2` templates
//! 5. Render and write each template, preserving marked regions
//! 6. Mark the domain `generated` in the layer registry (best effort)
//!
//! Steps 1-4 abort the call with an `Err`. In step 5 a failing template is
//! recorded in the result and its siblings still render. A registry failure
//! in step 6 only adds a warning, since the files are already written.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, field, info, instrument, warn, Span};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
        services::ConfigProcessor,
    },
    domain::{
        markers, naming, paths, DomainError, DomainStatus, EntityDomainConfig, GenerationResult, Layer,
        LayerPayload, ProjectLayout, TemplateContext, WriteOutcome,
    },
    error::PyhexResult,
};

/// One template that made it to disk (or was found up to date).
#[derive(Debug)]
struct RenderedFile {
    path: PathBuf,
    outcome: WriteOutcome,
    warnings: Vec<String>,
}

pub struct LayerGenerator {
    processor: ConfigProcessor,
    renderer: Box<dyn TemplateRenderer>,
    layout: ProjectLayout,
}

impl LayerGenerator {
    pub fn new(
        processor: ConfigProcessor,
        renderer: Box<dyn TemplateRenderer>,
        layout: ProjectLayout,
    ) -> Self {
        Self {
            processor,
            renderer,
            layout,
        }
    }

    pub fn processor(&self) -> &ConfigProcessor {
        &self.processor
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn fs(&self) -> &dyn Filesystem {
        self.processor.filesystem()
    }

    /// Domain names become path segments, so they must be type identifiers.
    pub(crate) fn check_domain_name(name: &str) -> Result<(), DomainError> {
        match naming::type_name_violation(name) {
            Some(reason) => Err(DomainError::InvalidIdentifier {
                path: "domain".into(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn new_result(layer: Layer, name: &str) -> GenerationResult {
        let result = GenerationResult::new()
            .with_metadata("layer", layer.as_str())
            .with_metadata("domain", name);
        Span::current().record("run_id", field::display(result.run_id));
        result
    }

    /// Generate a layer from the config files already in its domain directory.
    ///
    /// Templates are taken from the domain directory itself.
    #[instrument(skip(self, layer), fields(layer = %layer, run_id = field::Empty))]
    pub fn generate(&self, layer: Layer, name: &str) -> PyhexResult<GenerationResult> {
        Self::check_domain_name(name)?;
        let mut result = Self::new_result(layer, name);
        let dir = self.layout.domain_dir(layer, name);
        if !self.fs().is_dir(&dir) {
            return Err(ApplicationError::DomainNotFound {
                layer,
                name: name.to_string(),
                path: dir,
            }
            .into());
        }

        let payload = self.processor.load_layer(layer, &dir)?;
        let core = self.companion_core(layer, name, &mut result);

        self.render_batch(&payload, name, core.as_ref(), &dir, &dir, &mut result)?;
        self.record_generation(layer, name, &mut result);
        info!(
            generated = result.generated.len(),
            modified = result.modified.len(),
            skipped = result.skipped.len(),
            errors = result.errors.len(),
            "Layer generated"
        );
        Ok(result)
    }

    /// Generate a layer from an in-memory config.
    ///
    /// The output directory is created if needed and templates come from the
    /// template source tree (`<template_root>/<layer>/{{domain}}`). Without
    /// an explicit `core`, a non-core layer falls back to the domain's core
    /// config on disk, if there is one. A core payload must describe the
    /// domain named by `name`.
    #[instrument(skip(self, payload, core), fields(layer = %payload.layer(), run_id = field::Empty))]
    pub fn generate_from_config(
        &self,
        payload: &LayerPayload,
        name: &str,
        core: Option<&EntityDomainConfig>,
    ) -> PyhexResult<GenerationResult> {
        Self::check_domain_name(name)?;
        if let LayerPayload::Core(config) = payload {
            if config.name != name {
                return Err(DomainError::validation(
                    "name",
                    format!("config describes domain '{}' but '{name}' was requested", config.name),
                )
                .into());
            }
        }
        let layer = payload.layer();
        let mut result = Self::new_result(layer, name);

        let source = self.layout.template_dir(layer);
        if !self.fs().is_dir(&source) {
            return Err(ApplicationError::TemplateResolution {
                path: source,
                reason: "template source directory not found".into(),
            }
            .into());
        }
        let output = self.layout.domain_dir(layer, name);
        self.fs().create_dir_all(&output)?;

        let companion = match core {
            Some(_) => None,
            None => self.companion_core(layer, name, &mut result),
        };
        let core = core.or(companion.as_ref());

        self.render_batch(payload, name, core, &source, &output, &mut result)?;
        self.record_generation(layer, name, &mut result);
        info!(
            generated = result.generated.len(),
            modified = result.modified.len(),
            errors = result.errors.len(),
            "Layer generated from config"
        );
        Ok(result)
    }

    /// Resync a layer registry, then regenerate every configured or
    /// generated domain. See [`ConfigProcessor::sync_domain_registry`]:
    /// the resync discards registry-only data.
    pub fn regenerate_all(&self, layer: Layer) -> PyhexResult<GenerationResult> {
        self.regenerate_all_with(layer, |_, _, _| {})
    }

    /// [`Self::regenerate_all`] with a callback `(index, total, domain)`
    /// invoked before each domain.
    #[instrument(skip(self, layer, progress), fields(layer = %layer))]
    pub fn regenerate_all_with(
        &self,
        layer: Layer,
        mut progress: impl FnMut(usize, usize, &str),
    ) -> PyhexResult<GenerationResult> {
        let root = self.layout.layer_root(layer);
        let registry = self.processor.sync_domain_registry(layer, &root)?;

        let (targets, blank): (Vec<_>, Vec<_>) = registry
            .domains
            .iter()
            .partition(|d| d.status.is_generatable());
        for domain in &blank {
            debug!(domain = %domain.name, "Skipping blank domain");
        }

        let mut batch = GenerationResult::new()
            .with_metadata("layer", layer.as_str())
            .with_metadata("domain", "*")
            .with_metadata("domains", targets.len().to_string());

        for (i, domain) in targets.iter().enumerate() {
            progress(i, targets.len(), &domain.name);
            match self.generate(layer, &domain.name) {
                Ok(result) => batch.merge(result),
                Err(e) => {
                    warn!(domain = %domain.name, error = %e, "Domain regeneration failed");
                    batch.add_error(format!("{}: {}", domain.name, e.detail()));
                }
            }
        }
        Ok(batch)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Core config of the same domain, giving other layers their entities.
    fn companion_core(
        &self,
        layer: Layer,
        name: &str,
        result: &mut GenerationResult,
    ) -> Option<EntityDomainConfig> {
        if layer == Layer::Core {
            return None;
        }
        let dir = self.layout.domain_dir(Layer::Core, name);
        let present = Layer::Core
            .status_files()
            .iter()
            .any(|f| self.fs().exists(&dir.join(f)));
        if !present {
            return None;
        }
        match self.processor.load_domain_config(&dir) {
            Ok(core) => Some(core),
            Err(e) => {
                result.add_warning(format!(
                    "core config of '{name}' could not be loaded, rendering without entities: {}",
                    e.detail()
                ));
                None
            }
        }
    }

    fn render_batch(
        &self,
        payload: &LayerPayload,
        name: &str,
        core: Option<&EntityDomainConfig>,
        source_dir: &Path,
        output_dir: &Path,
        result: &mut GenerationResult,
    ) -> PyhexResult<()> {
        let ctx = TemplateContext::build(payload, name, core, Utc::now())?;

        let templates: Vec<PathBuf> = self
            .fs()
            .list_files_recursive(source_dir)?
            .into_iter()
            .filter(|p| paths::is_template(p))
            .collect();
        if templates.is_empty() {
            result.add_warning(format!("no templates found in {}", source_dir.display()));
        }
        debug!(count = templates.len(), source = %source_dir.display(), "Templates discovered");

        for template in &templates {
            match self.render_template(&ctx, source_dir, template, output_dir) {
                Ok(file) => {
                    debug!(path = %file.path.display(), outcome = ?file.outcome, "Template written");
                    for warning in file.warnings {
                        result.add_warning(warning);
                    }
                    result.record(file.outcome, file.path);
                }
                Err(e) => {
                    warn!(template = %template.display(), error = %e, "Template failed");
                    result.add_error(format!("{}: {}", template.display(), e.detail()));
                }
            }
        }
        Ok(())
    }

    fn render_template(
        &self,
        ctx: &TemplateContext,
        source_dir: &Path,
        template: &Path,
        output_dir: &Path,
    ) -> PyhexResult<RenderedFile> {
        let relative = template
            .strip_prefix(source_dir)
            .map_err(|_| DomainError::PathEscapesBase {
                path: template.display().to_string(),
                base: source_dir.display().to_string(),
            })?;
        let resolved = paths::contained_in(source_dir, relative)?;
        if !self.fs().exists(&resolved) {
            return Err(ApplicationError::TemplateResolution {
                path: resolved,
                reason: "template file does not exist".into(),
            }
            .into());
        }

        let source = self.fs().read_to_string(&resolved)?;
        let rendered = self
            .renderer
            .render(&relative.to_string_lossy(), &source, ctx)?;
        markers::parse_regions(&rendered)?;

        let target = paths::output_path(
            output_dir,
            &paths::substitute_placeholder(relative, &ctx.package_name),
        );
        self.write_preserving(target, rendered)
    }

    /// Write `rendered` to `target`, keeping preserved regions of an
    /// existing file. Identical content is not rewritten.
    fn write_preserving(&self, target: PathBuf, rendered: String) -> PyhexResult<RenderedFile> {
        if !self.fs().exists(&target) {
            if let Some(parent) = target.parent() {
                self.fs().create_dir_all(parent)?;
            }
            self.fs().write_file(&target, &rendered)?;
            return Ok(RenderedFile {
                path: target,
                outcome: WriteOutcome::Generated,
                warnings: Vec::new(),
            });
        }

        let existing = self.fs().read_to_string(&target)?;
        let merged = markers::preserve_regions(&existing, &rendered).map_err(|e| {
            ApplicationError::RenderingFailed {
                template: target.display().to_string(),
                reason: format!("existing file has broken preservation markers, not overwritten: {e}"),
            }
        })?;
        let warnings = merged
            .dropped
            .iter()
            .map(|region| {
                format!(
                    "{}: preserved region '{region}' is no longer in the template and was dropped",
                    target.display()
                )
            })
            .collect();

        if merged.content == existing {
            return Ok(RenderedFile {
                path: target,
                outcome: WriteOutcome::Skipped,
                warnings,
            });
        }
        self.fs().write_file(&target, &merged.content)?;
        Ok(RenderedFile {
            path: target,
            outcome: WriteOutcome::Modified,
            warnings,
        })
    }

    /// Mark the domain `generated`, registering it first if needed.
    fn record_generation(&self, layer: Layer, name: &str, result: &mut GenerationResult) {
        if !result.success {
            result.add_warning(format!(
                "registry status of '{name}' left unchanged because generation reported errors"
            ));
            return;
        }
        let root = self.layout.layer_root(layer);
        let update = || -> PyhexResult<()> {
            let status = DomainStatus::Generated;
            if !self.processor.update_domain_status(layer, &root, name, status)? {
                self.processor.create_blank_domain(layer, &root, name)?;
                self.processor.update_domain_status(layer, &root, name, status)?;
            }
            Ok(())
        };
        if let Err(e) = update() {
            warn!(layer = %layer, domain = name, error = %e, "Layer registry update failed");
            result.add_warning(format!("layer registry not updated: {}", e.detail()));
        }
    }
}
