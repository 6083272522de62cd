//! Test-infra periodic job generation.
//!
//! For one job group this renders the job template once per supported job
//! entry, concatenates the blocks under a `periodics:` root, checks that the
//! result parses as YAML and only then replaces the output file.

use crate::config::{JobEntry, JobGroup};
use crate::constants::{
    ALERT_ANNOTATION_INDENT, AUTOGENERATED_HEADER, AlertPolicy, FILE_NAME_TEMPLATE_NAME,
    JOB_TEMPLATE_NAME, LATEST_POLICY, LATEST_VERSION, OUTPUT_FILE_MODE, PERIODICS_ROOT_KEY,
    PINNED_POLICY, WORKFLOW_FILE_SUFFIX,
};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::template::Template;
use crate::version::{JobVersion, KubeVersion, should_skip};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Variables available to the job and file-name templates.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateVariables {
    /// Kubernetes version of the entry
    pub kubernetes_version: String,
    /// kubeadm version of the entry
    pub kubeadm_version: String,
    /// kubelet version of the entry
    pub kubelet_version: String,
    /// Initial version for upgrade jobs
    pub init_version: String,
    /// Target version for upgrade jobs
    pub upgrade_version: String,
    /// Test-infra target file of the group
    pub target_file: String,
    /// Image used by the job
    pub test_infra_image: String,
    /// Quoted workflow file name without `.yaml`
    pub workflow_file: String,
    /// Job period
    pub job_interval: String,
    /// Indented testgrid annotation lines
    pub alert_annotations: String,
}

/// Result of processing one job group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The group has no test-infra template
    Skipped,
    /// The job file was written
    Written {
        /// Output path
        path: PathBuf,
        /// Rendered job blocks
        jobs: usize,
        /// Entries filtered out by version
        skipped: usize,
    },
}

/// Alert policy for an entry: the latest tier if either its Kubernetes or
/// kubeadm version tracks `latest`.
#[must_use]
pub fn alert_policy(job: &JobEntry) -> AlertPolicy {
    if job.kubernetes_version == LATEST_VERSION || job.kubeadm_version == LATEST_VERSION {
        LATEST_POLICY
    } else {
        PINNED_POLICY
    }
}

/// The two testgrid annotation lines for `policy`.
#[must_use]
pub fn alert_annotations(policy: &AlertPolicy) -> String {
    format!(
        "{indent}testgrid-num-failures-to-alert: \"{}\"\n\
         {indent}testgrid-alert-stale-results-hours: \"{}\"",
        policy.failures_to_alert,
        policy.stale_results_hours,
        indent = ALERT_ANNOTATION_INDENT,
    )
}

/// Quote a rendered workflow file name, dropping one `.yaml` suffix.
#[must_use]
pub fn quote_workflow_file(rendered: &str) -> String {
    let stem = rendered
        .strip_suffix(WORKFLOW_FILE_SUFFIX)
        .unwrap_or(rendered);
    format!("\"{stem}\"")
}

/// Build the template variables for one entry.
///
/// # Errors
///
/// Returns [`Error::TemplateRender`] if the file-name template fails.
pub fn resolve_variables(
    settings: &Settings,
    group: &JobGroup,
    job: &JobEntry,
    file_name: &Template,
) -> Result<TemplateVariables> {
    let mut vars = TemplateVariables {
        kubernetes_version: job.kubernetes_version.clone(),
        kubeadm_version: job.kubeadm_version.clone(),
        kubelet_version: job.kubelet_version.clone(),
        init_version: job.init_version.clone(),
        upgrade_version: job.upgrade_version.clone(),
        target_file: group.test_infra_job_spec.target_file.clone(),
        test_infra_image: settings.image_test_infra.clone(),
        ..Default::default()
    };

    vars.workflow_file = quote_workflow_file(&file_name.render(&vars)?);

    let policy = alert_policy(job);
    vars.job_interval = policy.interval.to_string();
    vars.alert_annotations = alert_annotations(&policy);

    Ok(vars)
}

/// Fresh output buffer: header followed by the root key.
#[must_use]
pub fn document_preamble() -> String {
    format!("{AUTOGENERATED_HEADER}\n{PERIODICS_ROOT_KEY}\n")
}

/// Check that `content` parses as YAML.
///
/// # Errors
///
/// Returns [`Error::Validation`] carrying the whole of `content`.
pub fn validate(content: &str) -> Result<()> {
    serde_yaml::from_str::<serde_yaml::Value>(content)
        .map(|_| ())
        .map_err(|e| Error::validation(e.to_string(), content))
}

/// Output path of a group: base name of its target file inside the
/// test-infra directory.
///
/// # Errors
///
/// Returns [`Error::Config`] if the target file has no file name.
pub fn output_path(settings: &Settings, group: &JobGroup) -> Result<PathBuf> {
    let target = &group.test_infra_job_spec.target_file;
    let base = Path::new(target).file_name().ok_or_else(|| {
        Error::config(format!(
            "job group '{}' has no usable testInfraJobSpec.targetFile: {target:?}",
            group.name
        ))
    })?;
    Ok(settings.path_test_infra.join(base))
}

/// Replace `path` with `content`.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers never see a partial file. An existing
/// symlink is followed and its target replaced; the link stays in place.
///
/// # Errors
///
/// Returns [`Error::Io`] if any step fails.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let resolved = resolve_existing(path)?;
    let path = resolved.as_path();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::io("create temporary file", dir, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::io("write", file.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(
            file.path(),
            std::fs::Permissions::from_mode(OUTPUT_FILE_MODE),
        )
        .map_err(|e| Error::io("set permissions", file.path(), e))?;
    }

    file.persist(path)
        .map_err(|e| Error::io("rename", path, e.error))?;
    Ok(())
}

/// Follow `path` to its final target if it is a symlink.
fn resolve_existing(path: &Path) -> Result<PathBuf> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::canonicalize(path).map_err(|e| Error::io("resolve symlink", path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Generate the test-infra job file of one group.
///
/// `oldest` is the oldest release still in the skew window; `min` is the
/// group's own lower bound, if any.
///
/// # Errors
///
/// Returns the first error from template loading, version parsing,
/// rendering, validation or writing. Nothing is written on error.
pub fn process_test_infra(
    settings: &Settings,
    group: &JobGroup,
    oldest: &KubeVersion,
    min: Option<&KubeVersion>,
) -> Result<Outcome> {
    tracing::info!(group = %group.name, "Processing test-infra jobs");

    if group.test_infra_job_spec.template.is_empty() {
        tracing::info!(
            group = %group.name,
            "Empty testInfraJobSpec.template; skipping test-infra jobs"
        );
        return Ok(Outcome::Skipped);
    }

    let template_path = settings.resolve(&group.test_infra_job_spec.template);
    let job_template = Template::load(JOB_TEMPLATE_NAME, &template_path)?;
    let file_name = Template::plain(
        FILE_NAME_TEMPLATE_NAME,
        &group.kinder_workflow_spec.target_file,
    )?;

    let mut document = document_preamble();
    let mut jobs = 0;
    let mut skipped = 0;

    for (index, job) in group.jobs.iter().enumerate() {
        tracing::info!(index, job = ?job, "Processing job");

        let version: JobVersion = job.kubernetes_version.parse()?;
        if should_skip(oldest, min, &version) {
            tracing::info!(index, version = %version, "Skipping job outside supported versions");
            skipped += 1;
            continue;
        }

        let vars = resolve_variables(settings, group, job, &file_name)?;
        let block = job_template.render(&vars)?;
        document.push('\n');
        document.push_str(&block);
        jobs += 1;
    }

    validate(&document)?;

    let path = output_path(settings, group)?;
    tracing::info!(path = %path.display(), jobs, skipped, "Writing test-infra jobs");
    write_atomic(&path, &document)?;

    Ok(Outcome::Written {
        path,
        jobs,
        skipped,
    })
}
