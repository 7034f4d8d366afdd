use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Firefox,
    Chrome,
    Edge,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Firefox => "firefox",
            Browser::Chrome => "chrome",
            Browser::Edge => "edge",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Browser::Firefox => "Firefox",
            Browser::Chrome => "Chrome",
            Browser::Edge => "Edge",
        }
    }

    /// All supported browsers, in report order.
    pub fn all() -> [Browser; 3] {
        [Browser::Firefox, Browser::Chrome, Browser::Edge]
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "linux")]
        return Platform::Linux;
        #[cfg(target_os = "macos")]
        return Platform::MacOS;
        #[cfg(target_os = "windows")]
        return Platform::Windows;
    }
}

/// A permission that matched the risk table, with its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub permission: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

/// One installed browser extension, normalized across manifest formats.
///
/// Records are built fresh on each scan and live only for the duration of
/// one scan-and-report pass. `risk_flags` starts empty and is populated
/// exclusively by [`classify`](crate::checker::classify).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub browser: Browser,
    pub id: String,
    pub name: String,
    pub version: String,
    /// Profile the extension was found in (directory name or profile key).
    #[serde(default)]
    pub profile: String,
    /// Declared API permissions, deduplicated, manifest order preserved.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Declared host/origin patterns the extension may contact.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_permissions: Vec<String>,
    /// Permissions the extension may request later; never classified.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_permissions: Vec<String>,
    /// High-risk permissions matched against the risk table.
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_path: Option<PathBuf>,
    #[serde(flatten)]
    pub metadata: ExtensionMetadata,
}

fn default_active() -> bool {
    true
}

impl ExtensionRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        browser: Browser,
    ) -> Self {
        Self {
            browser,
            id: id.into(),
            name: name.into(),
            version: version.into(),
            profile: String::new(),
            permissions: Vec::new(),
            host_permissions: Vec::new(),
            optional_permissions: Vec::new(),
            risk_flags: Vec::new(),
            active: true,
            install_date: None,
            update_date: None,
            install_path: None,
            metadata: ExtensionMetadata::default(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Sets declared permissions, dropping duplicates while keeping the
    /// first occurrence's position.
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = dedup_preserving_order(permissions);
        self
    }

    pub fn with_host_permissions(mut self, hosts: Vec<String>) -> Self {
        self.host_permissions = dedup_preserving_order(hosts);
        self
    }

    pub fn with_optional_permissions(mut self, permissions: Vec<String>) -> Self {
        self.optional_permissions = dedup_preserving_order(permissions);
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.install_path = Some(path);
        self
    }

    pub fn with_metadata(mut self, metadata: ExtensionMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_flagged(&self) -> bool {
        !self.risk_flags.is_empty()
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_deduplicated_in_order() {
        let ext = ExtensionRecord::new("id", "name", "1.0", Browser::Chrome).with_permissions(vec![
            "tabs".to_string(),
            "storage".to_string(),
            "tabs".to_string(),
            "cookies".to_string(),
        ]);

        assert_eq!(ext.permissions, vec!["tabs", "storage", "cookies"]);
    }

    #[test]
    fn test_new_record_has_no_flags() {
        let ext = ExtensionRecord::new("id", "name", "1.0", Browser::Firefox);
        assert!(ext.risk_flags.is_empty());
        assert!(!ext.is_flagged());
        assert!(ext.active);
    }

    #[test]
    fn test_browser_roundtrip() {
        assert_eq!(Browser::Edge.as_str(), "edge");
        assert_eq!(Browser::Edge.display_name(), "Edge");
        assert_eq!(Browser::all().len(), 3);
    }
}
