//! Jinja template rendering backed by MiniJinja.
//!
//! Templates are rendered from source text, not from a loader: the core
//! resolves and reads every template itself, so the environment only
//! carries syntax options and the naming filters.

use minijinja::{Environment, UndefinedBehavior, Value};
use tracing::{debug, instrument};

use pyhex_core::{
    application::{ports::TemplateRenderer, ApplicationError},
    domain::{naming, TemplateContext},
    error::PyhexResult,
};

/// Whitespace and undefined-variable handling for the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    pub trim_blocks: bool,
    pub lstrip_blocks: bool,
    /// Fail on undefined variables instead of rendering them empty.
    pub strict_undefined: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            trim_blocks: true,
            lstrip_blocks: true,
            strict_undefined: false,
        }
    }
}

/// Renders `.j2` sources with the `to_snake_case`, `to_pascal_case` and
/// `pluralize` filters installed.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        Self::with_options(RendererOptions::default())
    }

    pub fn with_options(options: RendererOptions) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(options.trim_blocks);
        env.set_lstrip_blocks(options.lstrip_blocks);
        env.set_keep_trailing_newline(true);
        if options.strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        env.add_filter("to_snake_case", snake_case);
        env.add_filter("to_pascal_case", pascal_case);
        env.add_filter("pluralize", plural);

        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn snake_case(value: &str) -> String {
    naming::to_snake_case(value)
}

fn pascal_case(value: &str) -> String {
    naming::to_pascal_case(value)
}

fn plural(value: &str) -> String {
    naming::pluralize(value)
}

impl TemplateRenderer for MiniJinjaRenderer {
    #[instrument(skip(self, source, context), fields(domain = %context.domain))]
    fn render(&self, name: &str, source: &str, context: &TemplateContext) -> PyhexResult<String> {
        let rendered = self
            .env
            .render_named_str(name, source, Value::from_serialize(context))
            .map_err(|e| ApplicationError::RenderingFailed {
                template: name.to_string(),
                reason: e.to_string(),
            })?;
        debug!(bytes = rendered.len(), "Template rendered");
        Ok(rendered)
    }
}
