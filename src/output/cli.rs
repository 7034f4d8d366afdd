use crate::model::{Browser, ExtensionRecord, ScanReport};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ExtensionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Risky Permissions")]
    risky: String,
}

pub fn print_cli_table(report: &ScanReport) -> Result<()> {
    print!("{}", render_report(report));
    Ok(())
}

fn render_report(report: &ScanReport) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!(
        "Scan completed at: {}\n",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for browser in Browser::all() {
        let extensions = report.extensions_for(browser);
        out.push('\n');

        if extensions.is_empty() {
            out.push_str(&format!("{}: no extensions found.\n", browser));
            continue;
        }

        let flagged = extensions.iter().filter(|e| e.is_flagged()).count();
        out.push_str(&format!(
            "{}: {} extension(s), {} flagged:\n",
            browser,
            extensions.len(),
            flagged
        ));

        let rows: Vec<ExtensionRow> = extensions.iter().map(|e| extension_row(e)).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        out.push_str(&table);
        out.push('\n');
    }

    let detail = render_flag_details(report);
    if !detail.is_empty() {
        out.push('\n');
        out.push_str("High-risk permissions:\n");
        out.push_str(&detail);
    }

    out.push('\n');
    out.push_str(&render_summary(report));
    out
}

fn extension_row(ext: &ExtensionRecord) -> ExtensionRow {
    let risky = if ext.risk_flags.is_empty() {
        "-".to_string()
    } else {
        let perms: Vec<&str> = ext
            .risk_flags
            .iter()
            .map(|f| f.permission.as_str())
            .collect();
        truncate(&perms.join(", "), 40)
    };

    ExtensionRow {
        name: truncate(&ext.name, 35),
        version: format_version(&ext.version),
        id: truncate(&ext.id, 40),
        profile: truncate(&ext.profile, 25),
        risky,
    }
}

fn render_flag_details(report: &ScanReport) -> String {
    let mut out = String::new();
    for ext in report.extensions.iter().filter(|e| e.is_flagged()) {
        out.push_str(&format!("  {} ({})\n", ext.name, ext.browser));
        for flag in &ext.risk_flags {
            out.push_str(&format!("    {:<28} {}\n", flag.permission, flag.description));
        }
    }
    out
}

fn render_summary(report: &ScanReport) -> String {
    let mut out = String::new();
    out.push_str("Summary:\n");
    out.push_str(&format!("  Total extensions: {}\n", report.extensions.len()));

    let by_browser: Vec<String> = Browser::all()
        .iter()
        .map(|b| format!("{} {}", report.extensions_for(*b).len(), b.display_name()))
        .collect();
    out.push_str(&format!("  By browser: {}\n", by_browser.join(", ")));
    out.push_str(&format!("  Flagged: {}\n", report.flagged_count()));

    if !report.warnings.is_empty() {
        out.push_str(&format!(
            "  Skipped with warnings: {} (see stderr)\n",
            report.warnings.len()
        ));
    }
    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}

fn format_version(version: &str) -> String {
    if version == "unknown" {
        "-".to_string()
    } else {
        version.to_string()
    }
}
