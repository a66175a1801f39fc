/// ZeroThreat - heuristic file triage
///
/// This library inspects files for signs of disguised or malicious content:
/// magic bytes that contradict the file extension, and suspicious strings such
/// as `eval(` calls or keylogger references. Each file gets a score, a threat
/// level and a list of findings.

pub mod core;
pub mod utils;

pub use crate::core::analyzer::{AnalysisResult, Analyzer, FileAnalyzer, ThreatLevel};
pub use crate::core::magic::{detect_type, FileTypeTag};
pub use crate::core::patterns::scan_content;
pub use crate::utils::file_utils::{DiskFile, FileHandle, HandleError, MemoryFile};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyze a single file handle with the default analyzer
///
/// This is a convenience function for simple use cases.
pub fn analyze(file: &dyn FileHandle) -> AnalysisResult {
    FileAnalyzer::new().analyze_file(file)
}

/// Analyze a file on disk
///
/// # Arguments
///
/// * `file_path` - Path to the file to analyze
///
/// # Returns
///
/// The verdict, or an error if the file's metadata cannot be read
pub fn analyze_path<P: AsRef<std::path::Path>>(file_path: P) -> anyhow::Result<AnalysisResult> {
    let handle = DiskFile::open(file_path.as_ref())?;
    Ok(analyze(&handle))
}

/// Library configuration
pub mod config {
    use log::{error, info};
    use serde::{Deserialize, Serialize};
    use std::path::Path;

    /// Settings that can be supplied through a JSON config file
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ScanConfig {
        pub log_level: String,
        pub log_file: Option<String>,
        /// Upper bound on files collected from a directory walk
        pub max_files: usize,
        pub follow_links: bool,
    }

    impl Default for ScanConfig {
        fn default() -> Self {
            Self {
                log_level: "warn".to_string(),
                log_file: None,
                max_files: 1000,
                follow_links: false,
            }
        }
    }

    /// Create default configuration
    pub fn default_config() -> ScanConfig {
        ScanConfig::default()
    }

    /// Load configuration from a JSON file
    ///
    /// A missing or malformed file is logged and replaced by the defaults.
    pub fn load_config(config_path: Option<&Path>) -> ScanConfig {
        let path = match config_path {
            Some(path) => path,
            None => return ScanConfig::default(),
        };

        if !path.exists() {
            error!("Configuration file not found: {}", path.display());
            return ScanConfig::default();
        }

        let config_str = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                error!("Could not read configuration file {}: {}", path.display(), e);
                return ScanConfig::default();
            }
        };

        match serde_json::from_str(&config_str) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                error!("Invalid JSON in configuration file: {}", e);
                ScanConfig::default()
            }
        }
    }

}

/// Scan driver used by the command-line application
pub mod app {
    use crate::core::analyzer::{AnalysisResult, Analyzer, ThreatLevel};
    use crate::utils::file_utils::{DiskFile, FileHandle};
    use log::{error, info, warn};
    use serde::{Deserialize, Serialize};
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Per-bucket totals for a finished scan
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ScanSummary {
        pub files: usize,
        pub safe: usize,
        /// Low or medium
        pub suspicious: usize,
        /// High or critical
        pub threats: usize,
    }

    impl ScanSummary {
        pub fn record(&mut self, level: ThreatLevel) {
            self.files += 1;
            match level {
                ThreatLevel::Safe => self.safe += 1,
                ThreatLevel::Low | ThreatLevel::Medium => self.suspicious += 1,
                ThreatLevel::High | ThreatLevel::Critical => self.threats += 1,
            }
        }

        pub fn from_results(results: &[AnalysisResult]) -> Self {
            let mut summary = Self::default();
            for result in results {
                summary.record(result.level);
            }
            summary
        }
    }

    /// Receives scan progress; owns all visual state
    pub trait Presenter {
        /// Called before file `index` (zero based) of `total` is analyzed
        fn file_started(&mut self, _index: usize, _total: usize, _name: &str) {}

        fn file_finished(&mut self, _result: &AnalysisResult) {}

        fn scan_finished(&mut self, _summary: &ScanSummary) {}
    }

    /// Presenter that ignores everything
    #[derive(Debug, Default)]
    pub struct NullPresenter;

    impl Presenter for NullPresenter {}

    /// Analyze files one at a time, in order
    ///
    /// # Arguments
    ///
    /// * `analyzer` - Analyzer applied to each file
    /// * `files` - Handles to analyze
    /// * `presenter` - Progress and result sink
    /// * `cancel` - Checked before each file; once set, no further file starts
    ///
    /// # Returns
    ///
    /// Results for every file that was analyzed, in input order
    pub fn run_scan<A, H, P>(
        analyzer: &A,
        files: &[H],
        presenter: &mut P,
        cancel: &AtomicBool,
    ) -> Vec<AnalysisResult>
    where
        A: Analyzer + ?Sized,
        H: FileHandle,
        P: Presenter + ?Sized,
    {
        let total = files.len();
        let mut results = Vec::with_capacity(total);
        let mut summary = ScanSummary::default();

        for (index, file) in files.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                warn!("Scan cancelled after {} of {} files", index, total);
                break;
            }

            presenter.file_started(index, total, file.name());
            let result = analyzer.analyze(file);
            summary.record(result.level);
            presenter.file_finished(&result);
            results.push(result);
        }

        info!(
            "Scanned {} files: {} safe, {} suspicious, {} threats",
            summary.files, summary.safe, summary.suspicious, summary.threats
        );
        presenter.scan_finished(&summary);

        results
    }

    /// Open paths from disk and scan them
    ///
    /// Paths whose metadata cannot be read are logged and skipped.
    pub fn scan_paths<A, P, Q>(
        analyzer: &A,
        paths: &[Q],
        presenter: &mut P,
        cancel: &AtomicBool,
    ) -> Vec<AnalysisResult>
    where
        A: Analyzer + ?Sized,
        P: Presenter + ?Sized,
        Q: AsRef<Path>,
    {
        let handles: Vec<DiskFile> = paths
            .iter()
            .filter_map(|path| match DiskFile::open(path.as_ref()) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    error!("Skipping {}: {}", path.as_ref().display(), e);
                    None
                }
            })
            .collect();

        run_scan(analyzer, &handles, presenter, cancel)
    }

}
