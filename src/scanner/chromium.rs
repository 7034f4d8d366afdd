//! Shared scan logic for Chromium-format extension storage.
//!
//! Chrome and Edge lay extensions out the same way: per profile, an
//! `Extensions` directory holding one subdirectory per extension ID,
//! which in turn holds one subdirectory per installed version with the
//! `manifest.json` inside.

use crate::model::{Browser, ExtensionMetadata, ExtensionRecord, ScanWarning};
use crate::platform::chromium_profile_dirs;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::ScanOutcome;

#[derive(Deserialize)]
struct ChromiumManifest {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    homepage_url: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    host_permissions: Vec<String>,
    #[serde(default)]
    optional_permissions: Vec<String>,
}

/// Scans every profile under a Chromium user data directory.
pub(crate) fn scan_chromium_extensions(user_data_dir: &Path, browser: Browser) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for (profile, extensions_dir) in chromium_profile_dirs(user_data_dir) {
        scan_extensions_dir(&extensions_dir, &profile, browser, &mut outcome);
    }

    outcome
}

fn scan_extensions_dir(
    extensions_dir: &Path,
    profile: &str,
    browser: Browser,
    outcome: &mut ScanOutcome,
) {
    let entries = match fs::read_dir(extensions_dir) {
        Ok(entries) => entries,
        Err(e) => {
            outcome.warn(ScanWarning::new(
                browser,
                extensions_dir,
                format!("cannot list extensions directory: {}", e),
            ));
            return;
        }
    };

    let mut ext_dirs: Vec<_> = entries
        .flatten()
        .filter(|e| e.path().is_dir() && e.file_name() != "Temp")
        .collect();
    ext_dirs.sort_by_key(|e| e.file_name());

    for entry in ext_dirs {
        let ext_path = entry.path();
        let extension_id = entry.file_name().to_string_lossy().to_string();

        // Each extension has version subdirectories; take the latest.
        let version_dirs: Vec<_> = match fs::read_dir(&ext_path) {
            Ok(entries) => entries.flatten().filter(|e| e.path().is_dir()).collect(),
            Err(e) => {
                outcome.warn(ScanWarning::new(
                    browser,
                    &ext_path,
                    format!("cannot list extension directory: {}", e),
                ));
                continue;
            }
        };

        let latest_version_dir = version_dirs.into_iter().max_by_key(|e| e.file_name());
        let version_dir = match latest_version_dir {
            Some(dir) => dir,
            None => continue,
        };
        let version_path = version_dir.path();

        let manifest_path = version_path.join("manifest.json");
        let content = match fs::read_to_string(&manifest_path) {
            Ok(c) => c,
            Err(e) => {
                outcome.warn(ScanWarning::new(
                    browser,
                    &manifest_path,
                    format!("cannot read manifest: {}", e),
                ));
                continue;
            }
        };

        let manifest: ChromiumManifest = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                outcome.warn(ScanWarning::new(
                    browser,
                    &manifest_path,
                    format!("malformed manifest: {}", e),
                ));
                continue;
            }
        };

        let name = manifest.name.unwrap_or_else(|| extension_id.clone());
        // Chrome stores localized names as __MSG_xxx__ placeholders.
        let name = if name.starts_with("__MSG_") {
            localized_message(&version_path, &name).unwrap_or_else(|| extension_id.clone())
        } else {
            name
        };

        let description = manifest.description.and_then(|d| {
            if d.starts_with("__MSG_") {
                localized_message(&version_path, &d)
            } else {
                Some(d)
            }
        });

        let version = manifest.version.unwrap_or_else(|| {
            version_dir
                .file_name()
                .to_string_lossy()
                .trim_end_matches("_0")
                .to_string()
        });

        let (install_date, update_date) = dir_timestamps(&ext_path);

        let metadata = ExtensionMetadata {
            description,
            author: manifest.author,
            homepage: manifest.homepage_url,
        };

        let record = ExtensionRecord::new(&extension_id, name, version, browser)
            .with_profile(profile)
            .with_permissions(manifest.permissions)
            .with_host_permissions(manifest.host_permissions)
            .with_optional_permissions(manifest.optional_permissions)
            .with_path(version_path)
            .with_metadata(metadata);

        outcome.extensions.push(ExtensionRecord {
            install_date,
            update_date,
            ..record
        });
    }
}

/// Extension install and update times, approximated from the extension
/// directory's created and modified times. Created time is unavailable
/// on some filesystems; both default to `None`.
fn dir_timestamps(path: &Path) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return (None, None),
    };
    let created = metadata.created().ok().map(DateTime::<Utc>::from);
    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
    (created, modified)
}

/// Resolves a `__MSG_xxx__` placeholder from the extension's `_locales`.
fn localized_message(version_path: &Path, msg_key: &str) -> Option<String> {
    let key = msg_key.trim_start_matches("__MSG_").trim_end_matches("__");

    let locales_dir = version_path.join("_locales");

    for locale in &["en", "en_US", "en_GB"] {
        let messages_path = locales_dir.join(locale).join("messages.json");
        let content = match fs::read_to_string(&messages_path) {
            Ok(c) => c,
            Err(_) => continue,
        };
        let messages: serde_json::Value = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => continue,
        };
        if let Some(msg) = messages
            .get(key)
            .or_else(|| messages.get(key.to_lowercase()))
        {
            if let Some(message) = msg.get("message").and_then(|m| m.as_str()) {
                return Some(message.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_extension(
        user_data: &Path,
        profile: &str,
        id: &str,
        version: &str,
        manifest: &str,
    ) -> std::path::PathBuf {
        let version_dir = user_data
            .join(profile)
            .join("Extensions")
            .join(id)
            .join(version);
        fs::create_dir_all(&version_dir).unwrap();
        fs::write(version_dir.join("manifest.json"), manifest).unwrap();
        version_dir
    }

    #[test]
    fn test_scan_parses_manifest_fields() {
        let dir = TempDir::new().unwrap();
        write_extension(
            dir.path(),
            "Default",
            "abcdefghijklmnop",
            "2.1.0_0",
            r#"{
                "name": "Example Extension",
                "version": "2.1.0",
                "description": "Does things",
                "permissions": ["tabs", "storage", "tabs"],
                "host_permissions": ["https://example.com/*"]
            }"#,
        );

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.extensions.len(), 1);

        let ext = &outcome.extensions[0];
        assert_eq!(ext.id, "abcdefghijklmnop");
        assert_eq!(ext.name, "Example Extension");
        assert_eq!(ext.version, "2.1.0");
        assert_eq!(ext.profile, "Default");
        assert_eq!(ext.permissions, vec!["tabs", "storage"]);
        assert_eq!(ext.host_permissions, vec!["https://example.com/*"]);
        assert!(ext.risk_flags.is_empty());
        assert_eq!(ext.metadata.description.as_deref(), Some("Does things"));
    }

    #[test]
    fn test_malformed_manifest_is_skipped_with_warning() {
        let dir = TempDir::new().unwrap();
        write_extension(
            dir.path(),
            "Default",
            "goodextension000",
            "1.0_0",
            r#"{"name": "Good", "version": "1.0", "permissions": []}"#,
        );
        write_extension(dir.path(), "Default", "badextension0000", "1.0_0", "{not json");

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        assert_eq!(outcome.extensions.len(), 1);
        assert_eq!(outcome.extensions[0].name, "Good");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].message.contains("malformed manifest"));
    }

    #[test]
    fn test_missing_user_data_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-browser-here");

        let outcome = scan_chromium_extensions(&missing, Browser::Edge);
        assert!(outcome.extensions.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_temp_directory_is_ignored() {
        let dir = TempDir::new().unwrap();
        write_extension(
            dir.path(),
            "Default",
            "realextension000",
            "1.0_0",
            r#"{"name": "Real", "version": "1.0"}"#,
        );
        fs::create_dir_all(dir.path().join("Default").join("Extensions").join("Temp")).unwrap();

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        assert_eq!(outcome.extensions.len(), 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_latest_version_directory_wins() {
        let dir = TempDir::new().unwrap();
        write_extension(
            dir.path(),
            "Default",
            "versionedext0000",
            "1.0.0_0",
            r#"{"name": "Old", "version": "1.0.0"}"#,
        );
        write_extension(
            dir.path(),
            "Default",
            "versionedext0000",
            "2.0.0_0",
            r#"{"name": "New", "version": "2.0.0"}"#,
        );

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        assert_eq!(outcome.extensions.len(), 1);
        assert_eq!(outcome.extensions[0].version, "2.0.0");
    }

    #[test]
    fn test_localized_name_resolved_from_locales() {
        let dir = TempDir::new().unwrap();
        let version_dir = write_extension(
            dir.path(),
            "Default",
            "localizedext0000",
            "1.0_0",
            r#"{"name": "__MSG_appName__", "version": "1.0"}"#,
        );
        let locale_dir = version_dir.join("_locales").join("en");
        fs::create_dir_all(&locale_dir).unwrap();
        fs::write(
            locale_dir.join("messages.json"),
            r#"{"appName": {"message": "Localized Name"}}"#,
        )
        .unwrap();

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        assert_eq!(outcome.extensions[0].name, "Localized Name");
    }

    #[test]
    fn test_name_falls_back_to_id() {
        let dir = TempDir::new().unwrap();
        write_extension(
            dir.path(),
            "Default",
            "namelessext00000",
            "1.0_0",
            r#"{"version": "1.0"}"#,
        );

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        assert_eq!(outcome.extensions[0].name, "namelessext00000");
    }

    #[test]
    fn test_scan_then_classify_flags_risky_permissions() {
        use crate::checker::{classify, RiskTable};

        let dir = TempDir::new().unwrap();
        write_extension(
            dir.path(),
            "Default",
            "riskyextension00",
            "1.0_0",
            r#"{"name": "Risky", "version": "1.0", "permissions": ["tabs", "storage"]}"#,
        );

        let table = RiskTable::from_entries([
            ("tabs", "can read all open tabs"),
            ("<all_urls>", "can access all websites"),
        ]);

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        let classified: Vec<_> = outcome
            .extensions
            .into_iter()
            .map(|e| classify(e, &table))
            .collect();

        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].risk_flags.len(), 1);
        assert_eq!(classified[0].risk_flags[0].permission, "tabs");
        assert_eq!(
            classified[0].risk_flags[0].description,
            "can read all open tabs"
        );
    }

    #[test]
    fn test_multiple_profiles_scanned() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Local State"),
            r#"{"profile": {"info_cache": {"Default": {}, "Profile 1": {}}}}"#,
        )
        .unwrap();
        write_extension(
            dir.path(),
            "Default",
            "defaultext000000",
            "1.0_0",
            r#"{"name": "In Default", "version": "1.0"}"#,
        );
        write_extension(
            dir.path(),
            "Profile 1",
            "profileext000000",
            "1.0_0",
            r#"{"name": "In Profile 1", "version": "1.0"}"#,
        );

        let outcome = scan_chromium_extensions(dir.path(), Browser::Chrome);
        assert_eq!(outcome.extensions.len(), 2);
        let profiles: Vec<&str> = outcome
            .extensions
            .iter()
            .map(|e| e.profile.as_str())
            .collect();
        assert!(profiles.contains(&"Default"));
        assert!(profiles.contains(&"Profile 1"));
    }
}
