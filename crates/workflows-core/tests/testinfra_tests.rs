//! End-to-end tests for test-infra job generation

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use workflows_core::{
    Error, JobEntry, JobGroup, KubeVersion, Outcome, Settings, TemplateSpec, process_test_infra,
};

const JOB_TEMPLATE: &str = r#"  - name: ci-kubernetes-e2e-kubeadm-kinder-{{dashVer KubernetesVersion}}
    interval: {{JobInterval}}
    decorate: true
    annotations:
      testgrid-dashboards: sig-cluster-lifecycle-kubeadm, sig-release-{{sigReleaseVer KubernetesVersion}}-informing
      testgrid-tab-name: kubeadm-kinder-{{dashVer KubernetesVersion}}
{{AlertAnnotations}}
    extra_refs:
    - org: kubernetes
      repo: kubeadm
      base_ref: main
    spec:
      containers:
      - image: {{TestInfraImage}}
        command:
        - runner.sh
        - ./kinder/ci/kinder-run.sh
        args:
        - {{WorkflowFile}}
        env:
        - name: CI_LABEL
          value: {{ciLabelFor KubernetesVersion}}
        - name: BRANCH
          value: {{branchFor KubernetesVersion}}
        - name: IMAGE_VERSION
          value: "{{imageVer KubernetesVersion}}"
"#;

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    out: PathBuf,
}

impl Fixture {
    fn new(template: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let out = root.join("out");
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(root.join("templates/kinder.yaml"), template).unwrap();
        Self {
            _dir: dir,
            root,
            out,
        }
    }

    fn settings(&self) -> Settings {
        Settings {
            path_config: self.root.join("config.yaml"),
            path_test_infra: self.out.clone(),
            image_test_infra: "gcr.io/k8s-staging-test-infra/kubekins-e2e:latest-master"
                .to_string(),
            kubernetes_version: KubeVersion::new(1, 31, 0),
            skew_size: 3,
        }
    }

    fn output(&self) -> PathBuf {
        self.out.join("kubeadm-kinder.yaml")
    }
}

fn group(jobs: Vec<JobEntry>) -> JobGroup {
    JobGroup {
        name: "regular".to_string(),
        minimum_kubernetes_version: None,
        kinder_workflow_spec: TemplateSpec {
            target_file: "regular-{{KubernetesVersion}}.yaml".to_string(),
            template: "./templates/workflows/regular.yaml".to_string(),
        },
        test_infra_job_spec: TemplateSpec {
            target_file: "./testinfra/kubeadm-kinder.yaml".to_string(),
            template: "./templates/kinder.yaml".to_string(),
        },
        jobs,
    }
}

fn k8s(version: &str) -> JobEntry {
    JobEntry {
        kubernetes_version: version.to_string(),
        ..Default::default()
    }
}

fn periodics(path: &Path) -> Vec<serde_yaml::Value> {
    let content = fs::read_to_string(path).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
    doc["periodics"].as_sequence().cloned().unwrap_or_default()
}

fn oldest() -> KubeVersion {
    KubeVersion::new(1, 28, 0)
}

#[test]
fn test_empty_template_writes_nothing() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let mut g = group(vec![k8s("latest")]);
    g.test_infra_job_spec.template = String::new();

    let outcome = process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    assert_eq!(outcome, Outcome::Skipped);
    assert_eq!(fs::read_dir(&fx.out).unwrap().count(), 0);
}

#[test]
fn test_pinned_entry_below_minimum_is_filtered() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("latest"), k8s("1.28")]);
    let min = KubeVersion::new(1, 29, 0);

    let outcome = process_test_infra(&fx.settings(), &g, &oldest(), Some(&min)).unwrap();

    assert_eq!(
        outcome,
        Outcome::Written {
            path: fx.output(),
            jobs: 1,
            skipped: 1,
        }
    );
    let jobs = periodics(&fx.output());
    assert_eq!(jobs.len(), 1);
    assert_eq!(
        jobs[0]["name"].as_str(),
        Some("ci-kubernetes-e2e-kubeadm-kinder-latest")
    );
    let content = fs::read_to_string(fx.output()).unwrap();
    assert!(!content.contains("1-28"));
}

#[test]
fn test_entries_older_than_skew_window_are_filtered() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("1.27"), k8s("1.28"), k8s("1.30")]);

    let outcome = process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    assert!(matches!(outcome, Outcome::Written { jobs: 2, skipped: 1, .. }));
    let names: Vec<_> = periodics(&fx.output())
        .iter()
        .map(|j| j["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "ci-kubernetes-e2e-kubeadm-kinder-1-28",
            "ci-kubernetes-e2e-kubeadm-kinder-1-30",
        ]
    );
}

#[test]
fn test_latest_entry_uses_latest_policy() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("latest")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    let content = fs::read_to_string(fx.output()).unwrap();
    assert!(content.contains("      testgrid-num-failures-to-alert: \"8\"\n"));
    assert!(content.contains("      testgrid-alert-stale-results-hours: \"16\"\n"));

    let job = &periodics(&fx.output())[0];
    assert_eq!(job["interval"].as_str(), Some("2h"));
    assert_eq!(
        job["annotations"]["testgrid-num-failures-to-alert"].as_str(),
        Some("8")
    );
    assert_eq!(
        job["annotations"]["testgrid-dashboards"].as_str(),
        Some("sig-cluster-lifecycle-kubeadm, sig-release-master-informing")
    );
}

#[test]
fn test_kubeadm_latest_selects_latest_policy() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![JobEntry {
        kubernetes_version: "1.30".to_string(),
        kubeadm_version: "latest".to_string(),
        ..Default::default()
    }]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    let job = &periodics(&fx.output())[0];
    assert_eq!(job["interval"].as_str(), Some("2h"));
    assert_eq!(
        job["annotations"]["testgrid-alert-stale-results-hours"].as_str(),
        Some("16")
    );
}

#[test]
fn test_pinned_entry_uses_pinned_policy() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("1.30")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    let job = &periodics(&fx.output())[0];
    assert_eq!(job["interval"].as_str(), Some("12h"));
    assert_eq!(
        job["annotations"]["testgrid-num-failures-to-alert"].as_str(),
        Some("4")
    );
    assert_eq!(
        job["annotations"]["testgrid-alert-stale-results-hours"].as_str(),
        Some("48")
    );

    let env = job["spec"]["containers"][0]["env"].as_sequence().unwrap();
    let values: Vec<_> = env.iter().map(|e| e["value"].as_str().unwrap()).collect();
    assert_eq!(values, vec!["ci/latest-1.30", "release-1.30", "1.30"]);
}

#[test]
fn test_workflow_file_is_quoted_without_suffix() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("latest"), k8s("1.30")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    let content = fs::read_to_string(fx.output()).unwrap();
    assert!(content.contains("        - \"regular-latest\"\n"));
    assert!(content.contains("        - \"regular-1.30\"\n"));
    assert!(!content.contains(".yaml\""));

    let jobs = periodics(&fx.output());
    assert_eq!(
        jobs[1]["spec"]["containers"][0]["args"][0].as_str(),
        Some("regular-1.30")
    );
}

#[test]
fn test_output_starts_with_header_and_root_key() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("latest")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    let content = fs::read_to_string(fx.output()).unwrap();
    assert!(content.starts_with("# AUTOGENERATED"));
    assert!(content.contains("DO NOT EDIT"));
    assert!(content.contains("\nperiodics:\n\n  - name: "));
}

#[test]
fn test_generation_is_deterministic() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("latest"), k8s("1.30"), k8s("1.29")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();
    let first = fs::read(fx.output()).unwrap();
    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();
    let second = fs::read(fx.output()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_malformed_output_is_rejected_and_not_written() {
    let fx = Fixture::new("  - name: job-{{KubernetesVersion}}\n     interval: {{JobInterval}}\n");
    fs::write(fx.output(), "previous: content\n").unwrap();
    let g = group(vec![k8s("latest")]);

    let err = process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap_err();

    match &err {
        Error::Validation { content, .. } => {
            assert!(content.contains("  - name: job-latest\n     interval: 2h\n"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(err.to_string().contains("     interval: 2h"));
    assert_eq!(
        fs::read_to_string(fx.output()).unwrap(),
        "previous: content\n"
    );
}

#[test]
fn test_undefined_variable_aborts_group() {
    let fx = Fixture::new("  - name: {{KubernetesVersion}}\n    owner: {{Owner}}\n");
    let g = group(vec![k8s("latest")]);

    let err = process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap_err();

    assert!(matches!(err, Error::TemplateRender { .. }));
    assert!(!fx.output().exists());
}

#[test]
fn test_missing_template_file() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let mut g = group(vec![k8s("latest")]);
    g.test_infra_job_spec.template = "./templates/missing.yaml".to_string();

    let err = process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap_err();

    match err {
        Error::TemplateRead { path, .. } => {
            assert_eq!(path, fx.root.join("./templates/missing.yaml"));
        }
        other => panic!("expected template read error, got {other:?}"),
    }
}

#[test]
fn test_absolute_template_path() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let mut g = group(vec![k8s("latest")]);
    g.test_infra_job_spec.template = fx
        .root
        .join("templates/kinder.yaml")
        .to_string_lossy()
        .into_owned();
    let settings = Settings {
        path_config: PathBuf::from("/nonexistent/config.yaml"),
        ..fx.settings()
    };

    let outcome = process_test_infra(&settings, &g, &oldest(), None).unwrap();
    assert!(matches!(outcome, Outcome::Written { jobs: 1, .. }));
}

#[test]
fn test_template_syntax_error() {
    let fx = Fixture::new("  - name: {{#if KubernetesVersion}}\n");
    let g = group(vec![k8s("latest")]);

    let err = process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap_err();
    assert!(matches!(err, Error::TemplateParse { .. }));
}

#[test]
fn test_invalid_job_version() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("latest"), k8s("next")]);

    let err = process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap_err();
    assert!(matches!(err, Error::InvalidVersion { ref version } if version == "next"));
    assert!(!fx.output().exists());
}

#[test]
fn test_existing_output_is_overwritten() {
    let fx = Fixture::new(JOB_TEMPLATE);
    fs::write(fx.output(), "stale").unwrap();
    let g = group(vec![k8s("latest")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    let content = fs::read_to_string(fx.output()).unwrap();
    assert!(content.starts_with("# AUTOGENERATED"));
}

#[cfg(unix)]
#[test]
fn test_output_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new(JOB_TEMPLATE);
    let g = group(vec![k8s("latest")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    let mode = fs::metadata(fx.output()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

#[test]
fn test_missing_output_directory_is_io_error() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let settings = Settings {
        path_test_infra: fx.root.join("does/not/exist"),
        ..fx.settings()
    };
    let g = group(vec![k8s("latest")]);

    let err = process_test_infra(&settings, &g, &oldest(), None).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[cfg(unix)]
#[test]
fn test_symlinked_output_writes_through_to_target() {
    let fx = Fixture::new(JOB_TEMPLATE);
    let shared = fx.root.join("shared");
    fs::create_dir_all(&shared).unwrap();
    let target = shared.join("kubeadm-kinder.yaml");
    fs::write(&target, "stale").unwrap();
    std::os::unix::fs::symlink(&target, fx.output()).unwrap();
    let g = group(vec![k8s("latest")]);

    process_test_infra(&fx.settings(), &g, &oldest(), None).unwrap();

    assert!(
        fs::symlink_metadata(fx.output())
            .unwrap()
            .file_type()
            .is_symlink()
    );
    let content = fs::read_to_string(&target).unwrap();
    assert!(content.starts_with("# AUTOGENERATED"));
    assert!(content.contains("kubeadm-kinder-latest"));
}
