//! Job-group configuration types.
//!
//! The configuration file is YAML with a top-level `jobGroups` list. Each
//! group pairs a kinder workflow spec (whose `targetFile` doubles as the
//! workflow file-name template) with a test-infra job spec and the version
//! matrix of jobs to generate.

use crate::error::{Error, Result};
use crate::version::KubeVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Ordered job groups
    #[serde(default)]
    pub job_groups: Vec<JobGroup>,
}

/// A named set of job variants sharing one template and one output file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobGroup {
    /// Group name
    pub name: String,

    /// Entries older than this version are skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_kubernetes_version: Option<String>,

    /// Kinder workflow files the jobs point at
    #[serde(default)]
    pub kinder_workflow_spec: TemplateSpec,

    /// Test-infra periodic job file
    #[serde(default)]
    pub test_infra_job_spec: TemplateSpec,

    /// One entry per generated job
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

/// A template paired with the file it generates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    /// Output file name; may itself be a template
    #[serde(default)]
    pub target_file: String,
    /// Template path, absolute or relative to the config file
    #[serde(default)]
    pub template: String,
}

/// Versions under test for a single job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobEntry {
    /// Kubernetes version of the cluster
    #[serde(default)]
    pub kubernetes_version: String,
    /// kubeadm binary version
    #[serde(default)]
    pub kubeadm_version: String,
    /// kubelet version
    #[serde(default)]
    pub kubelet_version: String,
    /// Version the cluster is initialized with (upgrade jobs)
    #[serde(default)]
    pub init_version: String,
    /// Version the cluster is upgraded to (upgrade jobs)
    #[serde(default)]
    pub upgrade_version: String,
}

impl Config {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML for
    /// the schema, or fails [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            groups = config.job_groups.len(),
            "Loaded job group config"
        );
        Ok(config)
    }

    /// Check group names and minimum versions.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty or duplicate group name, or an
    /// unparsable `minimumKubernetesVersion`.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for group in &self.job_groups {
            if group.name.trim().is_empty() {
                return Err(Error::config("job group with empty name"));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(Error::config(format!(
                    "duplicate job group '{}'",
                    group.name
                )));
            }
            group.minimum_version()?;
        }
        Ok(())
    }

    /// Find a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&JobGroup> {
        self.job_groups.iter().find(|g| g.name == name)
    }
}

impl JobGroup {
    /// The parsed `minimumKubernetesVersion`, if set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVersion`] if the value does not parse.
    pub fn minimum_version(&self) -> Result<Option<KubeVersion>> {
        self.minimum_kubernetes_version
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(str::parse::<KubeVersion>)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
jobGroups:
- name: regular
  minimumKubernetesVersion: "1.29"
  kinderWorkflowSpec:
    targetFile: regular-{{KubernetesVersion}}.yaml
    template: ./templates/workflows/regular.yaml
  testInfraJobSpec:
    targetFile: ./testinfra/kubeadm-kinder.yaml
    template: ./templates/testinfra/kubeadm-kinder.yaml
  jobs:
  - kubernetesVersion: latest
  - kubernetesVersion: "1.30"
    kubeletVersion: "1.29"
- name: external-etcd
  jobs: []
"#;

    #[test]
    fn test_parse_sample() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.job_groups.len(), 2);

        let regular = &config.job_groups[0];
        assert_eq!(regular.name, "regular");
        assert_eq!(
            regular.test_infra_job_spec.target_file,
            "./testinfra/kubeadm-kinder.yaml"
        );
        assert_eq!(regular.jobs.len(), 2);
        assert_eq!(regular.jobs[0].kubernetes_version, "latest");
        assert_eq!(regular.jobs[1].kubelet_version, "1.29");
        assert_eq!(regular.jobs[1].kubeadm_version, "");
        assert_eq!(
            regular.minimum_version().unwrap(),
            Some(KubeVersion::new(1, 29, 0))
        );

        let etcd = config.group("external-etcd").unwrap();
        assert!(etcd.test_infra_job_spec.template.is_empty());
        assert_eq!(etcd.minimum_version().unwrap(), None);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let config = Config {
            job_groups: vec![
                JobGroup {
                    name: "a".to_string(),
                    ..Default::default()
                },
                JobGroup {
                    name: "a".to_string(),
                    ..Default::default()
                },
            ],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate job group 'a'"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let config = Config {
            job_groups: vec![JobGroup::default()],
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_minimum() {
        let config = Config {
            job_groups: vec![JobGroup {
                name: "a".to_string(),
                minimum_kubernetes_version: Some("soon".to_string()),
                ..Default::default()
            }],
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.group("regular").is_some());
        assert!(config.group("missing").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "jobGroups: [name: {").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(Error::ConfigParse { .. })
        ));
    }
}
