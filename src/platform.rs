//! Cross-platform path resolution.
//!
//! This module provides functions for finding platform-specific paths
//! where browsers store their installed extensions, and for enumerating
//! the profile directories inside them.
//!
//! Base-directory functions return `Option<PathBuf>` - returning `None`
//! if the directory doesn't exist or can't be determined. A missing
//! browser is a normal condition, never an error.

use crate::model::{Browser, Platform};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the path to the Firefox profiles directory.
///
/// Platform-specific locations:
/// - Linux: `~/.mozilla/firefox/`
/// - macOS: `~/Library/Application Support/Firefox/Profiles/`
/// - Windows: `%APPDATA%\Mozilla\Firefox\Profiles\`
///
/// Returns `None` if the directory doesn't exist.
pub fn firefox_profiles_dir() -> Option<PathBuf> {
    let path = match Platform::current() {
        Platform::Linux => {
            let home = dirs::home_dir()?;
            home.join(".mozilla").join("firefox")
        }
        Platform::MacOS => {
            let home = dirs::home_dir()?;
            home.join("Library")
                .join("Application Support")
                .join("Firefox")
                .join("Profiles")
        }
        Platform::Windows => {
            let roaming = dirs::data_dir()?;
            roaming.join("Mozilla").join("Firefox").join("Profiles")
        }
    };
    path.exists().then_some(path)
}

/// Returns the path to the Chrome user data directory.
///
/// Platform-specific locations:
/// - Linux: `~/.config/google-chrome/`
/// - macOS: `~/Library/Application Support/Google/Chrome/`
/// - Windows: `%LOCALAPPDATA%\Google\Chrome\User Data\`
///
/// Returns `None` if the directory doesn't exist.
pub fn chrome_user_data_dir() -> Option<PathBuf> {
    let path = match Platform::current() {
        Platform::Linux => {
            let config = dirs::config_dir()?;
            config.join("google-chrome")
        }
        Platform::MacOS => {
            let home = dirs::home_dir()?;
            home.join("Library")
                .join("Application Support")
                .join("Google")
                .join("Chrome")
        }
        Platform::Windows => {
            let local = dirs::data_local_dir()?;
            local.join("Google").join("Chrome").join("User Data")
        }
    };
    path.exists().then_some(path)
}

/// Returns the path to the Edge user data directory.
///
/// Platform-specific locations:
/// - Linux: `~/.config/microsoft-edge/`
/// - macOS: `~/Library/Application Support/Microsoft Edge/`
/// - Windows: `%LOCALAPPDATA%\Microsoft\Edge\User Data\`
///
/// Returns `None` if the directory doesn't exist.
pub fn edge_user_data_dir() -> Option<PathBuf> {
    let path = match Platform::current() {
        Platform::Linux => {
            let config = dirs::config_dir()?;
            config.join("microsoft-edge")
        }
        Platform::MacOS => {
            let home = dirs::home_dir()?;
            home.join("Library")
                .join("Application Support")
                .join("Microsoft Edge")
        }
        Platform::Windows => {
            let local = dirs::data_local_dir()?;
            local.join("Microsoft").join("Edge").join("User Data")
        }
    };
    path.exists().then_some(path)
}

#[derive(Deserialize)]
struct LocalState {
    profile: Option<LocalStateProfile>,
}

#[derive(Deserialize)]
struct LocalStateProfile {
    // BTreeMap keeps profile iteration order stable across runs.
    #[serde(default)]
    info_cache: BTreeMap<String, serde_json::Value>,
}

/// Enumerates Chromium profiles and their `Extensions` directories.
///
/// Profile names come from the `Local State` file's `profile.info_cache`;
/// when that file is missing or unparsable the `Default` profile is
/// assumed. Only profiles whose `Extensions` directory exists are
/// returned.
pub fn chromium_profile_dirs(user_data_dir: &Path) -> Vec<(String, PathBuf)> {
    let mut profiles: Vec<String> = Vec::new();

    let local_state_path = user_data_dir.join("Local State");
    if let Ok(content) = fs::read_to_string(&local_state_path) {
        if let Ok(state) = serde_json::from_str::<LocalState>(&content) {
            if let Some(profile) = state.profile {
                profiles.extend(profile.info_cache.into_keys());
            }
        }
    }
    if profiles.is_empty() {
        profiles.push("Default".to_string());
    }

    profiles
        .into_iter()
        .filter_map(|name| {
            let extensions = user_data_dir.join(&name).join("Extensions");
            extensions.is_dir().then_some((name, extensions))
        })
        .collect()
}

/// Enumerates Firefox profile directories under the profiles root.
///
/// Every immediate subdirectory is a candidate profile; whether it holds
/// an add-on index is the scanner's concern.
pub fn firefox_profile_dirs(profiles_dir: &Path) -> Vec<(String, PathBuf)> {
    let entries = match fs::read_dir(profiles_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut profiles: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .collect();
    profiles.sort_by(|a, b| a.0.cmp(&b.0));
    profiles
}

/// Resolves the extension storage directories for a browser, one entry
/// per profile. Empty when the browser is not installed.
pub fn resolve_profile_dirs(browser: Browser) -> Vec<(String, PathBuf)> {
    match browser {
        Browser::Firefox => match firefox_profiles_dir() {
            Some(dir) => firefox_profile_dirs(&dir),
            None => Vec::new(),
        },
        Browser::Chrome => match chrome_user_data_dir() {
            Some(dir) => chromium_profile_dirs(&dir),
            None => Vec::new(),
        },
        Browser::Edge => match edge_user_data_dir() {
            Some(dir) => chromium_profile_dirs(&dir),
            None => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_chromium_profiles_from_local_state() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Local State"),
            r#"{"profile": {"info_cache": {"Default": {}, "Profile 1": {}}}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("Default").join("Extensions")).unwrap();
        fs::create_dir_all(dir.path().join("Profile 1").join("Extensions")).unwrap();

        let profiles = chromium_profile_dirs(dir.path());
        let names: Vec<&str> = profiles.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Default", "Profile 1"]);
    }

    #[test]
    fn test_chromium_falls_back_to_default_profile() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Default").join("Extensions")).unwrap();

        let profiles = chromium_profile_dirs(dir.path());
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].0, "Default");
    }

    #[test]
    fn test_chromium_skips_profiles_without_extensions_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Local State"),
            r#"{"profile": {"info_cache": {"Default": {}, "Profile 1": {}}}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("Profile 1").join("Extensions")).unwrap();

        let profiles = chromium_profile_dirs(dir.path());
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].0, "Profile 1");
    }

    #[test]
    fn test_chromium_empty_when_nothing_exists() {
        let dir = TempDir::new().unwrap();
        assert!(chromium_profile_dirs(dir.path()).is_empty());
    }

    #[test]
    fn test_firefox_profiles_sorted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("zzzz.default-release")).unwrap();
        fs::create_dir(dir.path().join("aaaa.default")).unwrap();
        fs::write(dir.path().join("profiles.ini"), "").unwrap();

        let profiles = firefox_profile_dirs(dir.path());
        let names: Vec<&str> = profiles.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["aaaa.default", "zzzz.default-release"]);
    }

    #[test]
    fn test_firefox_profiles_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(firefox_profile_dirs(&missing).is_empty());
    }
}
