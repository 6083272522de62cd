//! # workflows-core
//!
//! Generation of test-infra periodic job files for kinder workflows.
//!
//! A job group names a Handlebars job template and a list of job entries,
//! one per version combination under test. For every entry still inside the
//! supported version window the template is rendered with a flat set of
//! [`TemplateVariables`]; the blocks are concatenated under a `periodics:`
//! root, validated as YAML and written in one step.
//!
//! ## Example
//!
//! ```no_run
//! use workflows_core::{Config, Settings, process_test_infra};
//! use std::path::Path;
//!
//! # fn example(settings: &Settings) -> workflows_core::Result<()> {
//! let config = Config::load(Path::new("config.yaml"))?;
//! let oldest = settings.oldest_version();
//! for group in &config.job_groups {
//!     let min = group.minimum_version()?;
//!     process_test_infra(settings, group, &oldest, min.as_ref())?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod error;
pub mod helpers;
pub mod settings;
pub mod template;
pub mod testinfra;
pub mod version;

pub use config::{Config, JobEntry, JobGroup, TemplateSpec};
pub use error::{Error, Result};
pub use settings::Settings;
pub use template::Template;
pub use testinfra::{Outcome, TemplateVariables, process_test_infra};
pub use version::{JobVersion, KubeVersion, should_skip};
