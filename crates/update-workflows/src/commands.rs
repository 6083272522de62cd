//! Group selection and the generation loop.

use workflows_core::{Config, Error, JobGroup, Outcome, Result, Settings, process_test_infra};

/// Outcome of one processed group.
#[derive(Debug)]
pub struct GroupReport {
    pub name: String,
    pub outcome: Outcome,
}

impl std::fmt::Display for GroupReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            Outcome::Skipped => write!(f, "skipped {}", self.name),
            Outcome::Written {
                path,
                jobs,
                skipped,
            } => write!(
                f,
                "wrote {} ({jobs} jobs, {skipped} filtered) for {}",
                path.display(),
                self.name
            ),
        }
    }
}

/// Pick the groups to process, preserving config order.
pub fn select_groups<'a>(config: &'a Config, names: &[String]) -> Result<Vec<&'a JobGroup>> {
    if names.is_empty() {
        return Ok(config.job_groups.iter().collect());
    }
    if let Some(unknown) = names.iter().find(|n| config.group(n).is_none()) {
        return Err(Error::config(format!("unknown job group '{unknown}'")));
    }
    Ok(config
        .job_groups
        .iter()
        .filter(|g| names.contains(&g.name))
        .collect())
}

/// Load the config and generate every selected group in order.
///
/// Stops at the first failing group.
#[tracing::instrument(skip_all, fields(config = %settings.path_config.display()))]
pub fn execute_generate(settings: &Settings, names: &[String]) -> Result<Vec<GroupReport>> {
    let config = Config::load(&settings.path_config)?;
    let oldest = settings.oldest_version();
    tracing::info!(
        kubernetes_version = %settings.kubernetes_version,
        oldest = %oldest,
        "Supported version window"
    );

    let mut reports = Vec::new();
    for group in select_groups(&config, names)? {
        let min = group.minimum_version()?;
        let outcome = process_test_infra(settings, group, &oldest, min.as_ref())?;
        reports.push(GroupReport {
            name: group.name.clone(),
            outcome,
        });
    }
    Ok(reports)
}
