//! Version helpers available to job templates.
//!
//! Each helper is a pure string transform of a version-like value, so a job
//! template can write `{{branchFor KubernetesVersion}}` and get
//! `release-1.30` (or `master` for `latest`).

use crate::constants::LATEST_VERSION;
use handlebars::{Handlebars, handlebars_helper};

fn is_latest(v: &str) -> bool {
    v == LATEST_VERSION
}

fn unprefixed(v: &str) -> &str {
    v.strip_prefix('v').unwrap_or(v)
}

/// `1.30` -> `1-30`; used in job and dashboard names.
#[must_use]
pub fn dash_ver(v: &str) -> String {
    v.replace('.', "-")
}

/// CI build label: `ci/latest` or `ci/latest-1.30`.
#[must_use]
pub fn ci_label_for(v: &str) -> String {
    if is_latest(v) {
        "ci/latest".to_string()
    } else {
        format!("ci/latest-{}", unprefixed(v))
    }
}

/// Tag suffix of the test-infra image: `master` or `1.30`.
#[must_use]
pub fn image_ver(v: &str) -> String {
    if is_latest(v) {
        "master".to_string()
    } else {
        unprefixed(v).to_string()
    }
}

/// Git branch: `master` or `release-1.30`.
#[must_use]
pub fn branch_for(v: &str) -> String {
    if is_latest(v) {
        "master".to_string()
    } else {
        format!("release-{}", unprefixed(v))
    }
}

/// SIG release dashboard version: `master` or `1.30`.
#[must_use]
pub fn sig_release_ver(v: &str) -> String {
    if is_latest(v) {
        "master".to_string()
    } else {
        unprefixed(v).to_string()
    }
}

handlebars_helper!(dash_ver_helper: |v: str| dash_ver(v));
handlebars_helper!(ci_label_for_helper: |v: str| ci_label_for(v));
handlebars_helper!(image_ver_helper: |v: str| image_ver(v));
handlebars_helper!(branch_for_helper: |v: str| branch_for(v));
handlebars_helper!(sig_release_ver_helper: |v: str| sig_release_ver(v));

/// Bind the version helpers into a registry.
pub fn register(registry: &mut Handlebars<'_>) {
    registry.register_helper("dashVer", Box::new(dash_ver_helper));
    registry.register_helper("ciLabelFor", Box::new(ci_label_for_helper));
    registry.register_helper("imageVer", Box::new(image_ver_helper));
    registry.register_helper("branchFor", Box::new(branch_for_helper));
    registry.register_helper("sigReleaseVer", Box::new(sig_release_ver_helper));
}
