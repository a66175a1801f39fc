/// ZeroThreat - heuristic file triage from the command line
///
/// The main entry point for the scanner application. It parses command-line
/// arguments, collects the files to scan and hands them to the scan driver,
/// presenting progress and results on the terminal.

use anyhow::Result;
use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, warn, LevelFilter};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use zerothreat::app::{self, Presenter, ScanSummary};
use zerothreat::config::{self, ScanConfig};
use zerothreat::utils::output_formatter;
use zerothreat::{AnalysisResult, FileAnalyzer, ThreatLevel};

/// Exit status when a result reaches the `--fail-on` level
const EXIT_THREAT_FOUND: i32 = 2;

/// Threat level accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<LevelArg> for ThreatLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Low => ThreatLevel::Low,
            LevelArg::Medium => ThreatLevel::Medium,
            LevelArg::High => ThreatLevel::High,
            LevelArg::Critical => ThreatLevel::Critical,
        }
    }
}

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "zerothreat",
    version,
    about = "Heuristic file triage: spoofed extensions and suspicious content",
    long_about = "Scores each file by checking:
- magic bytes against the claimed extension
- suspicious strings such as eval(), encoded payloads, keylogger words,
  Windows shell references and .exe download links (files under 2 MB)
and classifies it as safe, low, medium, high or critical."
)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .multiple(true)
        .args(["file_paths", "dir"]),
))]
struct Args {
    /// Path(s) to the file(s) to scan
    #[arg(name = "file_paths")]
    file_paths: Vec<String>,

    /// Scan all files in directory (recursively)
    #[arg(long = "dir")]
    dir: Option<String>,

    /// Maximum number of files collected from --dir (overrides config)
    #[arg(long = "max-files")]
    max_files: Option<usize>,

    /// Output in markdown format (wrapped in triple backticks)
    #[arg(long = "md", action = ArgAction::SetTrue)]
    md: bool,

    /// Export results to JSON file
    #[arg(long = "json")]
    json: Option<String>,

    /// Export results to HTML report
    #[arg(long = "html")]
    html: Option<String>,

    /// Export results to CSV file
    #[arg(long = "csv")]
    csv: Option<String>,

    /// Suppress terminal output
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Show only summary information
    #[arg(long = "summary-only", action = ArgAction::SetTrue)]
    summary_only: bool,

    /// Path to JSON configuration file
    #[arg(long = "config")]
    config: Option<String>,

    /// Set logging level (overrides config, default: warn)
    #[arg(long = "log-level")]
    log_level: Option<LevelFilter>,

    /// Log file path (overrides config, default: stderr)
    #[arg(long = "log-file")]
    log_file: Option<String>,

    /// Exit with status 2 if any file is at or above this level
    #[arg(long = "fail-on", value_enum)]
    fail_on: Option<LevelArg>,
}

/// Terminal presenter: progress bar on stderr, a card per file on `out`
struct ConsolePresenter<W: Write> {
    out: W,
    progress_bar: Option<ProgressBar>,
    quiet: bool,
    summary_only: bool,
    markdown: bool,
}

impl<W: Write> ConsolePresenter<W> {
    fn new(args: &Args, out: W) -> Self {
        Self {
            out,
            progress_bar: None,
            quiet: args.quiet,
            summary_only: args.summary_only,
            markdown: args.md,
        }
    }

    /// Write to `out` with the progress bar lifted, if one is drawn
    fn emit(&mut self, text: &str) {
        let out = &mut self.out;
        let written = match &self.progress_bar {
            Some(pb) => pb.suspend(|| writeln!(out, "{}", text)),
            None => writeln!(out, "{}", text),
        };
        if let Err(e) = written {
            warn!("Could not write scan output: {}", e);
        }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn file_started(&mut self, index: usize, total: usize, name: &str) {
        if self.quiet {
            return;
        }

        let pb = self.progress_bar.get_or_insert_with(|| {
            let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });
        pb.set_position(index as u64);
        pb.set_message(format!("Analyzing: {}", name));
    }

    fn file_finished(&mut self, result: &AnalysisResult) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
        }
        if !self.quiet && !self.summary_only {
            let card = output_formatter::format_result(result, self.markdown);
            self.emit(&card);
        }
    }

    fn scan_finished(&mut self, summary: &ScanSummary) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
        if !self.quiet {
            let text = output_formatter::create_summary(summary);
            self.emit(&text);
        }
    }
}

/// Main entry point function
fn main() -> Result<()> {
    let start_time = Instant::now();

    let args = Args::parse();

    let config = config::load_config(args.config.as_deref().map(Path::new));

    setup_logging(&args, &config);

    let files_to_scan = get_files_to_scan(&args, &config);

    if files_to_scan.is_empty() {
        eprintln!("{}", "Error: No files specified or found for scanning".red());
        eprintln!("Run with --help for usage information");
        process::exit(1);
    }

    if !args.quiet {
        println!("\n{} {} files...", "Scanning".bold(), files_to_scan.len());
    }

    let cancel = AtomicBool::new(false);
    let mut presenter = ConsolePresenter::new(&args, io::stdout());
    let results = app::scan_paths(&FileAnalyzer::new(), &files_to_scan, &mut presenter, &cancel);

    export_all_results(&results, &args)?;

    if !args.quiet {
        println!(
            "{} {:.2} seconds",
            "Time elapsed:".green(),
            start_time.elapsed().as_secs_f64()
        );
    }

    if let Some(fail_on) = args.fail_on {
        let threshold = ThreatLevel::from(fail_on);
        if results.iter().any(|result| result.level >= threshold) {
            process::exit(EXIT_THREAT_FOUND);
        }
    }

    Ok(())
}

/// Set up logging with an optional file target
fn setup_logging(args: &Args, config: &ScanConfig) {
    let mut builder = env_logger::Builder::new();

    let level = args
        .log_level
        .or_else(|| config.log_level.parse().ok())
        .unwrap_or(LevelFilter::Warn);
    builder.filter_level(level);

    builder.format(|buf, record| {
        use chrono::Local;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(log_file) = args.log_file.as_ref().or(config.log_file.as_ref()) {
        match File::create(log_file) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Could not open log file {}: {}", log_file, e),
        }
    }

    builder.init();
}

/// Get list of files to scan based on command line arguments
fn get_files_to_scan(args: &Args, config: &ScanConfig) -> Vec<PathBuf> {
    let mut files_to_scan = Vec::new();
    let max_files = args.max_files.unwrap_or(config.max_files);

    for file_path in &args.file_paths {
        let path = PathBuf::from(file_path);
        if !path.exists() {
            error!("File not found: {}", path.display());
        } else if !path.is_file() {
            warn!("Skipping {}: not a file", path.display());
        } else {
            files_to_scan.push(path);
        }
    }

    if let Some(dir_path) = &args.dir {
        let dir_path = PathBuf::from(dir_path);
        if !dir_path.is_dir() {
            error!("Directory not found: {}", dir_path.display());
            return files_to_scan;
        }

        use walkdir::WalkDir;
        let mut collected = 0;
        for entry in WalkDir::new(&dir_path)
            .follow_links(config.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if collected >= max_files {
                warn!("Reached maximum file limit ({})", max_files);
                break;
            }

            if entry.file_type().is_file() {
                files_to_scan.push(entry.into_path());
                collected += 1;
            }
        }
    }

    files_to_scan
}

/// Write the requested report files
fn export_all_results(results: &[AnalysisResult], args: &Args) -> Result<()> {
    if let Some(json_path) = &args.json {
        output_formatter::export_results_json(results, Path::new(json_path))?;
    }

    if let Some(html_path) = &args.html {
        output_formatter::create_html_report(results, Path::new(html_path))?;
    }

    if let Some(csv_path) = &args.csv {
        output_formatter::create_csv_report(results, Path::new(csv_path))?;
    }

    Ok(())
}
