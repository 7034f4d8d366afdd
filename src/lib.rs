pub mod checker;
pub mod config;
pub mod model;
pub mod output;
pub mod platform;
pub mod scanner;

pub use checker::{classify, RiskTable};
pub use config::Config;
pub use model::{Browser, ExtensionRecord, Platform, RiskFlag, ScanReport, ScanWarning};
pub use scanner::Scanner;
