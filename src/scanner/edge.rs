use crate::model::{Browser, Platform};
use crate::platform::edge_user_data_dir;

use super::{ScanOutcome, Scanner};

pub struct EdgeScanner;

impl Scanner for EdgeScanner {
    fn name(&self) -> &'static str {
        "Edge Extensions"
    }

    fn browser(&self) -> Browser {
        Browser::Edge
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Linux, Platform::MacOS, Platform::Windows]
    }

    fn scan(&self) -> ScanOutcome {
        let user_data_dir = match edge_user_data_dir() {
            Some(dir) => dir,
            None => return ScanOutcome::default(),
        };

        // Edge uses the same Chromium extension format
        super::chromium::scan_chromium_extensions(&user_data_dir, Browser::Edge)
    }
}
