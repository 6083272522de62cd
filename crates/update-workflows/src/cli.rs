use crate::logging::{LogLevel, TracingConfig, TracingFormat};
use clap::Parser;
use std::path::PathBuf;
use workflows_core::settings::{DEFAULT_IMAGE_TEST_INFRA, DEFAULT_SKEW_SIZE};
use workflows_core::{KubeVersion, Settings};

#[derive(Parser, Debug)]
#[command(name = "update-workflows")]
#[command(about = "Regenerate test-infra periodic jobs for kinder workflows")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        env = "UPDATE_WORKFLOWS_CONFIG",
        help = "Path to the job group config file",
        default_value = "./config.yaml"
    )]
    pub config: PathBuf,

    #[arg(
        long,
        env = "UPDATE_WORKFLOWS_PATH_TEST_INFRA",
        help = "Directory the test-infra job files are written to"
    )]
    pub path_test_infra: PathBuf,

    #[arg(
        long,
        env = "UPDATE_WORKFLOWS_IMAGE_TEST_INFRA",
        help = "Image used by the generated jobs",
        default_value = DEFAULT_IMAGE_TEST_INFRA
    )]
    pub image_test_infra: String,

    #[arg(
        long,
        env = "UPDATE_WORKFLOWS_KUBERNETES_VERSION",
        help = "Latest stable Kubernetes release, e.g. 1.31",
        value_parser = parse_version
    )]
    pub kubernetes_version: KubeVersion,

    #[arg(
        long,
        env = "UPDATE_WORKFLOWS_SKEW_SIZE",
        help = "Number of supported minors below --kubernetes-version",
        default_value_t = DEFAULT_SKEW_SIZE
    )]
    pub skew_size: u64,

    #[arg(
        long = "group",
        short = 'g',
        action = clap::ArgAction::Append,
        help = "Only process the named job group (repeatable)",
        value_name = "NAME"
    )]
    pub groups: Vec<String>,

    #[arg(
        short = 'l',
        long,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        env = "UPDATE_WORKFLOWS_LOG_FILTER",
        help = "Tracing filter directive, overrides --level and RUST_LOG",
        value_name = "DIRECTIVE"
    )]
    pub log_filter: Option<String>,

    #[arg(long, help = "Output logs in JSON format")]
    pub json: bool,
}

impl Cli {
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: if self.json {
                TracingFormat::Json
            } else {
                TracingFormat::Compact
            },
            level: self.level.into(),
            filter: self.log_filter.clone(),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            path_config: self.config.clone(),
            path_test_infra: self.path_test_infra.clone(),
            image_test_infra: self.image_test_infra.clone(),
            kubernetes_version: self.kubernetes_version.clone(),
            skew_size: self.skew_size,
        }
    }
}

fn parse_version(s: &str) -> Result<KubeVersion, String> {
    s.parse().map_err(|e: workflows_core::Error| e.to_string())
}

pub fn parse() -> Cli {
    Cli::parse()
}
