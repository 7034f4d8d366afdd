//! Browser extension scanners.
//!
//! This module provides the [`Scanner`] trait and implementations for
//! reading installed-extension manifests from each supported browser.
//!
//! # Available Scanners
//!
//! | Scanner | Browser | Manifest format |
//! |---------|---------|-----------------|
//! | [`FirefoxScanner`] | Firefox | `extensions.json` index per profile |
//! | [`ChromeScanner`] | Chrome | `manifest.json` per extension version dir |
//! | [`EdgeScanner`] | Edge | `manifest.json` per extension version dir |
//!
//! Scanning is read-only and tolerant: a malformed manifest or an
//! unlistable directory becomes a [`ScanWarning`] on the outcome, never
//! an abort. A browser that is not installed yields an empty outcome.
//!
//! # Example
//!
//! ```no_run
//! use extaudit::scanner::{all_scanners, Scanner};
//!
//! for scanner in all_scanners() {
//!     if scanner.is_supported() {
//!         let outcome = scanner.scan();
//!         println!("{}: {} extensions", scanner.name(), outcome.extensions.len());
//!     }
//! }
//! ```

mod chrome;
pub(crate) mod chromium;
mod edge;
mod firefox;

pub use chrome::ChromeScanner;
pub use edge::EdgeScanner;
pub use firefox::FirefoxScanner;

use crate::model::{Browser, ExtensionRecord, Platform, ScanWarning};

/// Result of scanning one browser: the records that parsed cleanly plus
/// a warning for every candidate that had to be skipped.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub extensions: Vec<ExtensionRecord>,
    pub warnings: Vec<ScanWarning>,
}

impl ScanOutcome {
    /// Records a skip, logging it as it happens.
    pub fn warn(&mut self, warning: ScanWarning) {
        tracing::warn!(
            browser = warning.browser.as_str(),
            path = %warning.path.display(),
            "{}",
            warning.message
        );
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: ScanOutcome) {
        self.extensions.extend(other.extensions);
        self.warnings.extend(other.warnings);
    }
}

/// Trait for reading installed extensions from a specific browser.
pub trait Scanner {
    /// Returns the human-readable name of this scanner.
    fn name(&self) -> &'static str;

    /// Returns the browser this scanner handles.
    fn browser(&self) -> Browser;

    /// Returns the platforms this scanner supports.
    fn supported_platforms(&self) -> &[Platform];

    /// Returns true if this scanner is supported on the current platform.
    fn is_supported(&self) -> bool {
        let current = Platform::current();
        self.supported_platforms().contains(&current)
    }

    /// Scans the browser's profile directories for installed extensions.
    ///
    /// Never fails: unreadable candidates are reported as warnings on the
    /// outcome, and a browser that is not installed yields an empty one.
    fn scan(&self) -> ScanOutcome;
}

/// Returns a list of all available scanners, in report order.
pub fn all_scanners() -> Vec<Box<dyn Scanner>> {
    vec![
        Box::new(FirefoxScanner),
        Box::new(ChromeScanner),
        Box::new(EdgeScanner),
    ]
}

/// Returns the scanner for a specific browser.
pub fn get_scanner(browser: Browser) -> Box<dyn Scanner> {
    match browser {
        Browser::Firefox => Box::new(FirefoxScanner),
        Browser::Chrome => Box::new(ChromeScanner),
        Browser::Edge => Box::new(EdgeScanner),
    }
}
