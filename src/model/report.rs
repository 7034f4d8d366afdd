use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Browser, ExtensionRecord};

/// A recoverable failure encountered while reading manifests.
///
/// Warnings never abort a scan; the affected extension or directory is
/// skipped and the rest of the scan continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    pub browser: Browser,
    pub path: PathBuf,
    pub message: String,
}

impl ScanWarning {
    pub fn new(browser: Browser, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            browser,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.browser,
            self.message,
            self.path.display()
        )
    }
}

/// Complete results of one scan-and-classify pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_time: DateTime<Utc>,
    pub extensions: Vec<ExtensionRecord>,
    #[serde(default)]
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    pub fn new(extensions: Vec<ExtensionRecord>, warnings: Vec<ScanWarning>) -> Self {
        Self {
            scan_time: Utc::now(),
            extensions,
            warnings,
        }
    }

    /// Extensions belonging to one browser, in scan order.
    pub fn extensions_for(&self, browser: Browser) -> Vec<&ExtensionRecord> {
        self.extensions
            .iter()
            .filter(|e| e.browser == browser)
            .collect()
    }

    pub fn flagged_count(&self) -> usize {
        self.extensions.iter().filter(|e| e.is_flagged()).count()
    }
}
