//! Template loading and rendering.
//!
//! Templates use Handlebars syntax in strict mode: referencing a variable
//! that is not part of [`TemplateVariables`](crate::TemplateVariables) is a
//! render error rather than an empty string. Output is never HTML-escaped.

use crate::error::{Error, Result};
use crate::helpers;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

/// A compiled template bound to its own registry.
#[derive(Debug)]
pub struct Template {
    name: String,
    registry: Handlebars<'static>,
}

impl Template {
    /// Compile `source` with the version helpers bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateParse`] on invalid syntax.
    pub fn with_helpers(name: &str, source: &str) -> Result<Self> {
        let mut registry = base_registry();
        helpers::register(&mut registry);
        Self::compile(registry, name, source)
    }

    /// Compile `source` with no custom helpers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateParse`] on invalid syntax.
    pub fn plain(name: &str, source: &str) -> Result<Self> {
        Self::compile(base_registry(), name, source)
    }

    /// Read a template file and compile it with the version helpers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateRead`] if the file cannot be read and
    /// [`Error::TemplateParse`] on invalid syntax.
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        let source =
            std::fs::read_to_string(path).map_err(|source| Error::template_read(path, source))?;
        tracing::debug!(template = name, path = %path.display(), "Loaded template");
        Self::with_helpers(name, &source)
    }

    fn compile(mut registry: Handlebars<'static>, name: &str, source: &str) -> Result<Self> {
        registry
            .register_template_string(name, source)
            .map_err(|e| Error::template_parse(name, e))?;
        Ok(Self {
            name: name.to_string(),
            registry,
        })
    }

    /// Registered name of this template.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateRender`] if a variable is undefined or a
    /// helper receives an argument of the wrong type.
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        self.registry
            .render(&self.name, data)
            .map_err(|e| Error::template_render(&self.name, e))
    }
}

fn base_registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry
}
