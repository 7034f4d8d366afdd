//! Permission risk table and extension classification.
//!
//! The risk table is a flat mapping from permission identifier to a
//! human-readable description of what the permission exposes. It is built
//! once at process start, either from the embedded reference list or from
//! an operator-supplied TOML file, and stays immutable for the process
//! lifetime. Classification is exact, case-sensitive string matching; no
//! severity scale is attached.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::model::{ExtensionRecord, RiskFlag};

/// Reference list of permissions capable of significant user-data
/// exposure, with what each one grants.
const BUILTIN_RISKS: &[(&str, &str)] = &[
    ("debugger", "Can read and modify all data on all websites via the debugger"),
    ("proxy", "Can intercept all network traffic through proxy settings"),
    ("tabs", "Can see URLs and titles of all open tabs"),
    ("webNavigation", "Can observe every page navigation"),
    ("history", "Can read and modify browsing history"),
    ("bookmarks", "Can read and modify bookmarks"),
    ("topSites", "Can see the most visited websites"),
    ("sessions", "Can access recently closed tabs and windows"),
    ("cookies", "Can read and modify cookies for any website"),
    ("webRequest", "Can observe and analyze network requests"),
    ("webRequestBlocking", "Can block or modify network requests"),
    ("declarativeNetRequest", "Can redirect or modify network requests"),
    ("pageCapture", "Can capture full page content"),
    ("tabCapture", "Can capture video and audio from tabs"),
    ("desktopCapture", "Can capture the entire screen"),
    ("nativeMessaging", "Can communicate with programs on the computer"),
    ("management", "Can manage other installed extensions"),
    ("privacy", "Can modify browser privacy settings"),
    ("browsingData", "Can delete browsing history and site data"),
    ("contentSettings", "Can change per-site content permissions"),
    ("downloads", "Can manage downloaded files"),
    ("clipboardRead", "Can read copied data"),
    ("scripting", "Can inject JavaScript into web pages"),
    ("<all_urls>", "Can access all websites"),
    ("*://*/*", "Can access all websites"),
    ("http://*/*", "Can access all insecure websites"),
    ("https://*/*", "Can access all secure websites"),
];

/// Errors loading an operator-supplied risk table.
#[derive(Debug, thiserror::Error)]
pub enum RiskTableError {
    #[error("failed to read risk table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse risk table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("risk table {path} has no [permissions] entries")]
    Empty { path: String },
}

#[derive(Deserialize)]
struct RiskTableFile {
    #[serde(default)]
    permissions: HashMap<String, String>,
}

/// Immutable mapping from permission identifier to risk description.
#[derive(Debug, Clone)]
pub struct RiskTable {
    entries: HashMap<String, String>,
}

impl RiskTable {
    /// Builds the embedded reference table.
    pub fn builtin() -> Self {
        let entries = BUILTIN_RISKS
            .iter()
            .map(|(perm, desc)| (perm.to_string(), desc.to_string()))
            .collect();
        Self { entries }
    }

    /// Loads a custom table from a TOML file with a `[permissions]` map.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid TOML, or defines
    /// no permissions. Callers treat this as fatal: without a risk table
    /// the classifier cannot function meaningfully.
    pub fn from_toml_file(path: &Path) -> Result<Self, RiskTableError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| RiskTableError::Read {
            path: display.clone(),
            source,
        })?;
        let file: RiskTableFile =
            toml::from_str(&content).map_err(|source| RiskTableError::Parse {
                path: display.clone(),
                source,
            })?;
        if file.permissions.is_empty() {
            return Err(RiskTableError::Empty { path: display });
        }
        Ok(Self {
            entries: file.permissions,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn describe(&self, permission: &str) -> Option<&str> {
        self.entries.get(permission).map(String::as_str)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.entries.contains_key(permission)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Annotates a record with the risk flags its declared permissions match.
///
/// Pure function of its inputs: `risk_flags` is recomputed from
/// `permissions` in their declared order, and no other field changes.
/// Classifying an already-classified record yields the same flags.
pub fn classify(record: ExtensionRecord, table: &RiskTable) -> ExtensionRecord {
    let risk_flags = record
        .permissions
        .iter()
        .filter_map(|perm| {
            table.describe(perm).map(|desc| RiskFlag {
                permission: perm.clone(),
                description: desc.to_string(),
            })
        })
        .collect();

    ExtensionRecord {
        risk_flags,
        ..record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Browser;

    fn sample_table() -> RiskTable {
        RiskTable::from_entries([
            ("tabs", "can read all open tabs"),
            ("<all_urls>", "can access all websites"),
        ])
    }

    fn record_with(permissions: &[&str]) -> ExtensionRecord {
        ExtensionRecord::new("ext-id", "Example", "1.0", Browser::Chrome)
            .with_permissions(permissions.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_flags_are_intersection_in_permission_order() {
        let table = RiskTable::from_entries([
            ("tabs", "tabs risk"),
            ("cookies", "cookies risk"),
            ("history", "history risk"),
        ]);
        let record = record_with(&["history", "storage", "tabs", "alarms", "cookies"]);

        let classified = classify(record, &table);
        let perms: Vec<&str> = classified
            .risk_flags
            .iter()
            .map(|f| f.permission.as_str())
            .collect();
        assert_eq!(perms, vec!["history", "tabs", "cookies"]);
    }

    #[test]
    fn test_classify_scenario_tabs_storage() {
        let record = record_with(&["tabs", "storage"]);

        let classified = classify(record, &sample_table());
        assert_eq!(
            classified.risk_flags,
            vec![RiskFlag {
                permission: "tabs".to_string(),
                description: "can read all open tabs".to_string(),
            }]
        );
    }

    #[test]
    fn test_classify_empty_permissions() {
        let classified = classify(record_with(&[]), &sample_table());
        assert!(classified.risk_flags.is_empty());
    }

    #[test]
    fn test_classify_is_idempotent() {
        let once = classify(record_with(&["tabs", "storage"]), &sample_table());
        let twice = classify(once.clone(), &sample_table());
        assert_eq!(once.risk_flags, twice.risk_flags);
        assert_eq!(once.permissions, twice.permissions);
    }

    #[test]
    fn test_classify_does_not_touch_other_fields() {
        let record = record_with(&["tabs"]).with_profile("Default");
        let classified = classify(record.clone(), &sample_table());
        assert_eq!(classified.id, record.id);
        assert_eq!(classified.name, record.name);
        assert_eq!(classified.version, record.version);
        assert_eq!(classified.profile, record.profile);
        assert_eq!(classified.permissions, record.permissions);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let classified = classify(record_with(&["Tabs", "TABS"]), &sample_table());
        assert!(classified.risk_flags.is_empty());
    }

    #[test]
    fn test_builtin_table_contents() {
        let table = RiskTable::builtin();
        assert!(table.contains("tabs"));
        assert!(table.contains("<all_urls>"));
        assert!(table.contains("nativeMessaging"));
        assert!(!table.contains("storage"));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("risks.toml");
        std::fs::write(
            &path,
            "[permissions]\ntabs = \"can read all open tabs\"\n",
        )
        .unwrap();

        let table = RiskTable::from_toml_file(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.describe("tabs"), Some("can read all open tabs"));
    }

    #[test]
    fn test_from_toml_file_missing_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            RiskTable::from_toml_file(&missing),
            Err(RiskTableError::Read { .. })
        ));
    }

    #[test]
    fn test_from_toml_file_empty_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("risks.toml");
        std::fs::write(&path, "[permissions]\n").unwrap();
        assert!(matches!(
            RiskTable::from_toml_file(&path),
            Err(RiskTableError::Empty { .. })
        ));
    }
}
