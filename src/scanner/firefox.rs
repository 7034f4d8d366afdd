//! Firefox add-on scanning.
//!
//! Unlike the Chromium browsers, Firefox keeps a single `extensions.json`
//! index per profile listing every installed add-on with its declared and
//! granted permissions.

use crate::model::{Browser, ExtensionMetadata, ExtensionRecord, Platform, ScanWarning};
use crate::platform::{firefox_profile_dirs, firefox_profiles_dir};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ScanOutcome, Scanner};

pub struct FirefoxScanner;

#[derive(Deserialize)]
struct AddonsJson {
    #[serde(default)]
    addons: Vec<FirefoxAddon>,
}

#[derive(Deserialize)]
struct FirefoxAddon {
    id: Option<String>,
    version: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(default, rename = "installDate")]
    install_date: Option<i64>,
    #[serde(default, rename = "updateDate")]
    update_date: Option<i64>,
    path: Option<PathBuf>,
    #[serde(default, rename = "defaultLocale")]
    default_locale: DefaultLocale,
    #[serde(default, rename = "userPermissions")]
    user_permissions: Option<PermissionSet>,
    #[serde(default, rename = "optionalPermissions")]
    optional_permissions: Option<PermissionSet>,
}

#[derive(Deserialize, Default)]
struct DefaultLocale {
    name: Option<String>,
    description: Option<String>,
    creator: Option<String>,
    #[serde(rename = "homepageURL")]
    homepage_url: Option<String>,
}

#[derive(Deserialize, Default)]
struct PermissionSet {
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    origins: Vec<String>,
}

impl Scanner for FirefoxScanner {
    fn name(&self) -> &'static str {
        "Firefox Add-ons"
    }

    fn browser(&self) -> Browser {
        Browser::Firefox
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Linux, Platform::MacOS, Platform::Windows]
    }

    fn scan(&self) -> ScanOutcome {
        let profiles_dir = match firefox_profiles_dir() {
            Some(dir) => dir,
            None => return ScanOutcome::default(),
        };

        scan_firefox_profiles(&profiles_dir)
    }
}

/// Scans every profile under a Firefox profiles root.
pub(crate) fn scan_firefox_profiles(profiles_dir: &Path) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for (profile, profile_path) in firefox_profile_dirs(profiles_dir) {
        scan_firefox_profile(&profile, &profile_path, &mut outcome);
    }

    outcome
}

fn scan_firefox_profile(profile: &str, profile_path: &Path, outcome: &mut ScanOutcome) {
    let index_path = profile_path.join("extensions.json");
    // Not every profile directory holds an add-on index.
    if !index_path.exists() {
        return;
    }

    let content = match fs::read_to_string(&index_path) {
        Ok(c) => c,
        Err(e) => {
            outcome.warn(ScanWarning::new(
                Browser::Firefox,
                &index_path,
                format!("cannot read add-on index: {}", e),
            ));
            return;
        }
    };

    let data: AddonsJson = match serde_json::from_str(&content) {
        Ok(d) => d,
        Err(e) => {
            outcome.warn(ScanWarning::new(
                Browser::Firefox,
                &index_path,
                format!("malformed add-on index: {}", e),
            ));
            return;
        }
    };

    for addon in data.addons {
        let id = match addon.id {
            Some(ref id) => id.clone(),
            None => {
                outcome.warn(ScanWarning::new(
                    Browser::Firefox,
                    &index_path,
                    "add-on entry missing id",
                ));
                continue;
            }
        };

        // Built-in system add-ons ship with every install.
        if id.ends_with("@mozilla.org") || id.ends_with("@shield.mozilla.org") {
            continue;
        }

        outcome.extensions.push(build_record(id, addon, profile));
    }
}

fn build_record(id: String, addon: FirefoxAddon, profile: &str) -> ExtensionRecord {
    let name = addon.default_locale.name.unwrap_or_else(|| id.clone());
    let version = addon.version.unwrap_or_else(|| "unknown".to_string());

    let metadata = ExtensionMetadata {
        description: addon.default_locale.description,
        author: addon.default_locale.creator,
        homepage: addon.default_locale.homepage_url,
    };

    let (permissions, origins) = match addon.user_permissions {
        Some(set) => (set.permissions, set.origins),
        None => (Vec::new(), Vec::new()),
    };
    let optional = addon
        .optional_permissions
        .map(|set| set.permissions)
        .unwrap_or_default();

    let mut record = ExtensionRecord::new(id, name, version, Browser::Firefox)
        .with_profile(profile)
        .with_permissions(permissions)
        .with_host_permissions(origins)
        .with_optional_permissions(optional)
        .with_metadata(metadata);

    record.active = addon.active;
    record.install_date = addon.install_date.and_then(millis_to_datetime);
    record.update_date = addon.update_date.and_then(millis_to_datetime);
    record.install_path = addon.path;
    record
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
