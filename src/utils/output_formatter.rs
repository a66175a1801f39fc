/// Output formatter for scan results
///
/// This module handles presenting analysis results: console result cards,
/// scan summaries, and JSON, HTML and CSV exports.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use handlebars::Handlebars;
use serde_json::json;

use crate::app::ScanSummary;
use crate::core::analyzer::{AnalysisResult, ThreatLevel};

/// Message shown for a file without findings
pub const NO_FINDINGS: &str = "No suspicious patterns detected";

/// Format a byte count for humans, e.g. `1.5 KB`
///
/// Uses powers of 1024 and one decimal place, dropping a trailing `.0`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, UNITS[unit])
    }
}

/// Level name as an uppercase badge in the level's colour
fn level_badge(level: ThreatLevel) -> ColoredString {
    let label = level.as_str().to_uppercase();
    match level {
        ThreatLevel::Safe => label.green().bold(),
        ThreatLevel::Low => label.yellow(),
        ThreatLevel::Medium => label.yellow().bold(),
        ThreatLevel::High => label.red(),
        ThreatLevel::Critical => label.red().bold(),
    }
}

/// Format one result as a console card
///
/// # Arguments
///
/// * `result` - Result to format
/// * `use_markdown` - Whether to wrap the card in markdown triple backticks
///
/// # Returns
///
/// Formatted string for console output
pub fn format_result(result: &AnalysisResult, use_markdown: bool) -> String {
    let mut output = String::new();

    if use_markdown {
        output.push_str("```\n");
    }

    output.push_str(&format!("{}\n", result.name.bold()));
    output.push_str(&format!("  {}\n", format_bytes(result.size).dimmed()));
    output.push_str(&format!("  {}\n", level_badge(result.level)));
    output.push_str(&format!("  Score: {}\n", result.score.to_string().bold()));

    if result.findings.is_empty() {
        output.push_str(&format!("  {}\n", NO_FINDINGS.green()));
    } else {
        for finding in &result.findings {
            output.push_str(&format!("    - {}\n", finding.red()));
        }
    }

    if use_markdown {
        output.push_str("```\n");
    }

    output
}

/// Create a summary of a finished scan
pub fn create_summary(summary: &ScanSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", "Scan Summary".yellow().bold()));
    output.push_str(&format!("Files analyzed: {}\n", summary.files));
    output.push_str(&format!("{} {}\n", "Safe:".green(), summary.safe));
    output.push_str(&format!("{} {}\n", "Suspicious:".yellow(), summary.suspicious));
    output.push_str(&format!("{} {}\n", "Threats:".red(), summary.threats));

    output
}

/// Export results to a JSON file
///
/// # Arguments
///
/// * `results` - Results for all scanned files
/// * `output_path` - Path where the JSON file will be written
pub fn export_results_json(results: &[AnalysisResult], output_path: &Path) -> Result<()> {
    let json_output = json!({
        "version": crate::VERSION,
        "summary": ScanSummary::from_results(results),
        "results": results,
    });

    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    serde_json::to_writer_pretty(file, &json_output).context("Failed to write JSON data")?;

    Ok(())
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ZeroThreat Scan Report</title>
    <style>
        body { font-family: Arial, sans-serif; background: #0f172a; color: #e2e8f0; max-width: 1100px; margin: 0 auto; padding: 20px; }
        h1 { border-bottom: 2px solid #3b82f6; padding-bottom: 10px; }
        .timestamp { color: #94a3b8; font-size: 0.9em; margin-bottom: 30px; }
        .summary { display: flex; gap: 20px; margin-bottom: 30px; }
        .summary div { background: #1e293b; border-radius: 6px; padding: 12px 20px; }
        .result-card { background: #1e293b; border-left: 6px solid #10b981; border-radius: 6px; padding: 15px; margin-bottom: 16px; }
        .result-card.low, .result-card.medium { border-left-color: #f59e0b; }
        .result-card.high, .result-card.critical { border-left-color: #ef4444; }
        .size { color: #94a3b8; margin: 0.4rem 0; }
        .level-badge { display: inline-block; border-radius: 12px; padding: 2px 10px; font-size: 0.8em; font-weight: bold; background: #10b981; }
        .level-badge.low, .level-badge.medium { background: #f59e0b; }
        .level-badge.high, .level-badge.critical { background: #ef4444; }
        .findings { color: #f87171; padding-left: 1.4rem; }
        .clean { color: #10b981; font-weight: 500; }
    </style>
</head>
<body>
    <h1>ZeroThreat Scan Report</h1>
    <div class="timestamp">Generated on: {{timestamp}}</div>

    <div class="summary">
        <div>Files: {{summary.files}}</div>
        <div>Safe: {{summary.safe}}</div>
        <div>Suspicious: {{summary.suspicious}}</div>
        <div>Threats: {{summary.threats}}</div>
    </div>

    {{#each results}}
    <div class="result-card {{level}}">
        <h4>{{name}}</h4>
        <div class="size">{{size_display}}</div>
        <div class="level-badge {{level}}">{{level_label}}</div>
        <div>Score: <strong>{{score}}</strong></div>
        {{#if findings}}
        <ul class="findings">
            {{#each findings}}
            <li>{{this}}</li>
            {{/each}}
        </ul>
        {{else}}
        <div class="clean">No suspicious patterns detected</div>
        {{/if}}
    </div>
    {{/each}}
</body>
</html>
"#;

/// Render results as an HTML report
///
/// Names and findings are HTML-escaped by the template engine.
pub fn render_html_report(results: &[AnalysisResult]) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("report", HTML_TEMPLATE)
        .context("Failed to register HTML template")?;

    let cards: Vec<_> = results
        .iter()
        .map(|result| {
            json!({
                "name": result.name,
                "size_display": format_bytes(result.size),
                "level": result.level,
                "level_label": result.level.as_str().to_uppercase(),
                "score": result.score,
                "findings": result.findings,
            })
        })
        .collect();

    let template_data = json!({
        "timestamp": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "summary": ScanSummary::from_results(results),
        "results": cards,
    });

    handlebars
        .render("report", &template_data)
        .context("Failed to render HTML template")
}

/// Create an HTML report file
pub fn create_html_report(results: &[AnalysisResult], output_path: &Path) -> Result<()> {
    let html = render_html_report(results)?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create HTML output file: {}", output_path.display()))?;

    file.write_all(html.as_bytes())
        .context("Failed to write HTML data")?;

    Ok(())
}

/// Create a CSV report, one row per finding
///
/// A file without findings still gets one row, with an empty finding column.
pub fn create_csv_report(results: &[AnalysisResult], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["File", "Size", "Level", "Score", "Finding"])
        .context("Failed to write CSV header")?;

    for result in results {
        let size = result.size.to_string();
        let score = result.score.to_string();
        let level = result.level.as_str();

        if result.findings.is_empty() {
            writer
                .write_record([result.name.as_str(), size.as_str(), level, score.as_str(), ""])
                .context("Failed to write CSV record")?;
        }

        for finding in &result.findings {
            writer
                .write_record([result.name.as_str(), size.as_str(), level, score.as_str(), finding.as_str()])
                .context("Failed to write CSV record")?;
        }
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}
