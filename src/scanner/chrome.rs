use crate::model::{Browser, Platform};
use crate::platform::chrome_user_data_dir;

use super::{ScanOutcome, Scanner};

pub struct ChromeScanner;

impl Scanner for ChromeScanner {
    fn name(&self) -> &'static str {
        "Chrome Extensions"
    }

    fn browser(&self) -> Browser {
        Browser::Chrome
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Linux, Platform::MacOS, Platform::Windows]
    }

    fn scan(&self) -> ScanOutcome {
        let user_data_dir = match chrome_user_data_dir() {
            Some(dir) => dir,
            None => return ScanOutcome::default(),
        };

        super::chromium::scan_chromium_extensions(&user_data_dir, Browser::Chrome)
    }
}
