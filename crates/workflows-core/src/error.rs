//! Error types for workflow generation.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for workflow generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating job files.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The job template file could not be read.
    #[error("Failed to read template {}", path.display())]
    #[diagnostic(
        code(workflows::template_read),
        help("Template paths are resolved relative to the directory of the config file")
    )]
    TemplateRead {
        /// Resolved template path
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },

    /// A template has invalid syntax.
    #[error("Failed to parse template {name}")]
    #[diagnostic(code(workflows::template_parse))]
    TemplateParse {
        /// Registered template name
        name: String,
        /// The underlying source error
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// A template failed to render, typically an undefined variable.
    #[error("Failed to render template {name}")]
    #[diagnostic(
        code(workflows::template_render),
        help("Templates may only reference the job variables and the version helpers")
    )]
    TemplateRender {
        /// Registered template name
        name: String,
        /// The underlying source error
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// The rendered document is not well-formed YAML.
    #[error("Generated document is not valid YAML: {message}\n{content}\n")]
    #[diagnostic(code(workflows::validation))]
    Validation {
        /// Parser message
        message: String,
        /// The complete rendered document
        content: String,
    },

    /// A version string could not be parsed.
    #[error("Invalid version: {version}")]
    #[diagnostic(
        code(workflows::invalid_version),
        help("Versions look like 1.30, v1.30.2 or the sentinel 'latest'")
    )]
    InvalidVersion {
        /// The offending version string
        version: String,
    },

    /// The job-group configuration file could not be read.
    #[error("Failed to read config {}", path.display())]
    #[diagnostic(code(workflows::config_read))]
    ConfigRead {
        /// Config file path
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },

    /// The job-group configuration file is not valid YAML for the schema.
    #[error("Failed to parse config {}", path.display())]
    #[diagnostic(code(workflows::config_parse))]
    ConfigParse {
        /// Config file path
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: serde_yaml::Error,
    },

    /// Semantic configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(workflows::config))]
    Config {
        /// The error message
        message: String,
    },

    /// Writing the generated file failed.
    #[error("I/O {operation} failed on {}", path.display())]
    #[diagnostic(
        code(workflows::io),
        help("Check file permissions and ensure the output directory exists")
    )]
    Io {
        /// What was being attempted
        operation: String,
        /// Path involved
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a template read error.
    #[must_use]
    pub fn template_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TemplateRead {
            path: path.into(),
            source,
        }
    }

    /// Create a template parse error.
    #[must_use]
    pub fn template_parse(name: impl Into<String>, source: handlebars::TemplateError) -> Self {
        Self::TemplateParse {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Create a template render error.
    #[must_use]
    pub fn template_render(name: impl Into<String>, source: handlebars::RenderError) -> Self {
        Self::TemplateRender {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Create a validation error carrying the rendered document.
    #[must_use]
    pub fn validation(message: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            content: content.into(),
        }
    }

    /// Create an invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with operation and path context.
    #[must_use]
    pub fn io(operation: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.to_path_buf(),
            source,
        }
    }
}
