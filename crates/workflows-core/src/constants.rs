//! Policy constants shared by the generator.
//!
//! Every literal that shapes the generated document lives here so the
//! thresholds and header text have a single source of truth.

/// Version sentinel meaning "track the moving release".
pub const LATEST_VERSION: &str = "latest";

/// Header written at the top of every generated file.
pub const AUTOGENERATED_HEADER: &str = "\
# AUTOGENERATED by https://git.k8s.io/kubeadm/kinder/ci/tools/update-workflows
# DO NOT EDIT. Changes to this file will be overwritten.
";

/// Root key under which all rendered jobs are nested.
pub const PERIODICS_ROOT_KEY: &str = "periodics:";

/// Suffix stripped from the rendered workflow file name.
pub const WORKFLOW_FILE_SUFFIX: &str = ".yaml";

/// Indentation of each alert annotation line.
pub const ALERT_ANNOTATION_INDENT: &str = "      ";

/// Name under which the job template is registered.
pub const JOB_TEMPLATE_NAME: &str = "job-template";

/// Name under which the file-name template is registered.
pub const FILE_NAME_TEMPLATE_NAME: &str = "file-name";

/// Unix permissions of the generated file.
pub const OUTPUT_FILE_MODE: u32 = 0o644;

/// Schedule and alerting thresholds applied to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    /// Value of the `interval` field of the periodic job.
    pub interval: &'static str,
    /// Consecutive failures before testgrid alerts.
    pub failures_to_alert: u32,
    /// Hours without results before testgrid alerts.
    pub stale_results_hours: u32,
}

/// Policy for jobs tracking the `latest` release.
pub const LATEST_POLICY: AlertPolicy = AlertPolicy {
    interval: "2h",
    failures_to_alert: 8,
    stale_results_hours: 16,
};

/// Policy for jobs pinned to a released version.
pub const PINNED_POLICY: AlertPolicy = AlertPolicy {
    interval: "12h",
    failures_to_alert: 4,
    stale_results_hours: 48,
};
