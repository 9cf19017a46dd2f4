//! Where layers, domains and templates live on disk.

use std::path::{Path, PathBuf};

use crate::domain::{
    config::REGISTRY_FILE,
    paths::DOMAIN_PLACEHOLDER,
    value_objects::Layer,
};

/// Lock file guarding registry read-modify-write cycles.
pub const REGISTRY_LOCK_FILE: &str = ".layer_config.yaml.lock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    project_root: PathBuf,
    layers_dir: PathBuf,
    template_root: PathBuf,
}

impl ProjectLayout {
    pub fn new(
        project_root: impl Into<PathBuf>,
        layers_dir: impl Into<PathBuf>,
        template_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            layers_dir: layers_dir.into(),
            template_root: template_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// `<root>/<layers_dir>/<layer>`
    pub fn layer_root(&self, layer: Layer) -> PathBuf {
        self.project_root
            .join(&self.layers_dir)
            .join(layer.dir_name())
    }

    /// `<root>/<layers_dir>/<layer>/<Domain>`
    pub fn domain_dir(&self, layer: Layer, domain: &str) -> PathBuf {
        self.layer_root(layer).join(domain)
    }

    /// Template source tree of a layer: `<template_root>/<layer>/{{domain}}`.
    pub fn template_dir(&self, layer: Layer) -> PathBuf {
        self.template_root
            .join(layer.dir_name())
            .join(DOMAIN_PLACEHOLDER)
    }

    pub fn registry_path(layer_root: &Path) -> PathBuf {
        layer_root.join(REGISTRY_FILE)
    }

    pub fn lock_path(layer_root: &Path) -> PathBuf {
        layer_root.join(REGISTRY_LOCK_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_layer_convention() {
        let layout = ProjectLayout::new("/app", "src", "/tpl");
        assert_eq!(
            layout.domain_dir(Layer::UseCase, "Order"),
            PathBuf::from("/app/src/usecase/Order")
        );
        assert_eq!(
            layout.template_dir(Layer::Core),
            PathBuf::from("/tpl/core/{{domain}}")
        );
        assert_eq!(
            ProjectLayout::registry_path(&layout.layer_root(Layer::Core)),
            PathBuf::from("/app/src/core/layer_config.yaml")
        );
    }
}
