use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extaudit::{
    checker::{classify, default_risk_table, RiskTable},
    config::Config,
    model::{Browser, ScanReport},
    output::{format_report_to_string, print_report, OutputFormat},
    scanner::{all_scanners, get_scanner, ScanOutcome, Scanner},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for scripting
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "extaudit")]
#[command(
    author,
    version,
    about = "Audit installed browser extensions for high-risk permissions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan installed browser extensions (the default)
    Scan {
        /// Filter by browser (firefox, chrome, edge)
        #[arg(short, long)]
        browser: Option<String>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,

        /// Use a custom risk table (TOML with a [permissions] map)
        #[arg(long)]
        risk_table: Option<String>,
    },

    /// List supported browsers and their manifest locations
    ListBrowsers,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    match cli.command.unwrap_or(Commands::Scan {
        browser: None,
        format: None,
        output: None,
        risk_table: None,
    }) {
        Commands::Scan {
            browser,
            format,
            output,
            risk_table,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            run_scan(&config, browser, format_str, output, risk_table)
        }
        Commands::ListBrowsers => {
            list_browsers();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_scan(
    config: &Config,
    browser_filter: Option<String>,
    format: String,
    output_file: Option<String>,
    risk_table_path: Option<String>,
) -> Result<u8> {
    let format = OutputFormat::from_str(&format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table && output_file.is_none();

    // Without the risk table the classifier cannot function; failing to
    // load it is the one fatal error in the pipeline.
    let risk_table = load_risk_table(config, risk_table_path)?;

    let scanners: Vec<Box<dyn Scanner>> = if let Some(browser_name) = browser_filter {
        let browser = parse_browser(&browser_name)?;
        vec![get_scanner(browser)]
    } else {
        all_scanners()
            .into_iter()
            .filter(|s| config.default_browsers.contains(&s.browser()))
            .collect()
    };

    let outcome = scan_all(&scanners, is_interactive);

    let extensions = outcome
        .extensions
        .into_iter()
        .filter(|e| !config.ignore.should_ignore(&e.id))
        .map(|e| classify(e, &risk_table))
        .collect();

    let report = ScanReport::new(extensions, outcome.warnings);

    if let Some(path) = output_file {
        let rendered = format_report_to_string(&report, format)?;
        std::fs::write(&path, rendered)
            .with_context(|| format!("failed to write report to {}", path))?;
        if is_interactive {
            println!("Report written to: {}", path);
        }
    } else {
        print_report(&report, format)?;
    }

    Ok(exit_codes::SUCCESS)
}

fn load_risk_table(config: &Config, override_path: Option<String>) -> Result<RiskTable> {
    let path = override_path
        .map(std::path::PathBuf::from)
        .or_else(|| config.risk_table.clone());

    match path {
        Some(path) => RiskTable::from_toml_file(&path).context("cannot load risk table"),
        None => Ok(default_risk_table()),
    }
}

/// Scan browsers one after another, with a progress bar in interactive
/// table mode.
fn scan_all(scanners: &[Box<dyn Scanner>], is_interactive: bool) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    let progress = if is_interactive {
        let pb = ProgressBar::new(scanners.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    for scanner in scanners {
        if let Some(ref pb) = progress {
            pb.set_message(format!("Scanning {}...", scanner.name()));
        }

        if scanner.is_supported() {
            tracing::debug!(scanner = scanner.name(), "scanning");
            outcome.merge(scanner.scan());
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Found {} extensions", outcome.extensions.len()));
    }

    outcome
}

fn list_browsers() {
    println!("Supported browsers:");
    println!();

    let browsers = [
        ("firefox", "Firefox Add-ons", "extensions.json per profile"),
        ("chrome", "Chrome Extensions", "manifest.json per extension"),
        ("edge", "Edge Extensions", "manifest.json per extension"),
    ];

    for (id, name, manifests) in browsers {
        let browser = parse_browser(id).unwrap();
        let scanner = get_scanner(browser);
        let supported = if scanner.is_supported() { "yes" } else { "no" };
        let profiles = extaudit::platform::resolve_profile_dirs(browser);

        println!("  {:<10} {:<20} [supported: {}]", id, name, supported);
        println!("  {:<10} Manifests: {}", "", manifests);
        if profiles.is_empty() {
            println!("  {:<10} Profiles: not installed", "");
        } else {
            println!("  {:<10} Profiles: {}", "", profiles.len());
        }
        println!();
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'extaudit config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

fn parse_browser(s: &str) -> Result<Browser> {
    match s.to_lowercase().as_str() {
        "firefox" => Ok(Browser::Firefox),
        "chrome" => Ok(Browser::Chrome),
        "edge" => Ok(Browser::Edge),
        _ => Err(anyhow::anyhow!(
            "Unknown browser: {}. Use: firefox, chrome, edge",
            s
        )),
    }
}
