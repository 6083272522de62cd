//! Caller-supplied settings for a generation run.

use crate::version::KubeVersion;
use std::path::{Path, PathBuf};

/// Default test-infra image exposed to templates as `TestInfraImage`.
pub const DEFAULT_IMAGE_TEST_INFRA: &str =
    "gcr.io/k8s-staging-test-infra/kubekins-e2e:latest-master";

/// Default number of supported minors below the latest stable release.
pub const DEFAULT_SKEW_SIZE: u64 = 3;

/// Paths and versions shared by all job groups of one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path of the job-group config file
    pub path_config: PathBuf,
    /// Directory the test-infra job files are written to
    pub path_test_infra: PathBuf,
    /// Image reference used inside job definitions
    pub image_test_infra: String,
    /// Latest stable Kubernetes release
    pub kubernetes_version: KubeVersion,
    /// Number of supported minors below `kubernetes_version`
    pub skew_size: u64,
}

impl Settings {
    /// Directory that relative template paths are resolved against.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        self.path_config.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Resolve a template reference against [`Settings::config_dir`].
    #[must_use]
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir().join(path)
        }
    }

    /// Oldest release still covered by the skew window.
    #[must_use]
    pub const fn oldest_version(&self) -> KubeVersion {
        self.kubernetes_version.minus_minors(self.skew_size)
    }
}
