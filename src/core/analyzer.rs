/// Core file analyzer implementation
///
/// This file contains the FileAnalyzer which combines extension parsing, magic
/// byte detection and content rules into a scored verdict for one file.

use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::magic::{self, FileTypeTag, HEADER_LEN};
use crate::core::patterns::{self, CONTENT_SCAN_LIMIT};
use crate::utils::file_utils::{extension_of, FileHandle};

/// Score added when the detected type contradicts the extension
pub const SPOOFING_WEIGHT: u64 = 40;

/// Finding recorded when the header cannot be read
pub const HEADER_READ_FAILED: &str = "Could not read file header";

/// Discrete risk classification derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// Classify a score, highest band first
    pub fn from_score(score: u64) -> Self {
        if score >= 80 {
            ThreatLevel::Critical
        } else if score >= 50 {
            ThreatLevel::High
        } else if score >= 25 {
            ThreatLevel::Medium
        } else if score >= 10 {
            ThreatLevel::Low
        } else {
            ThreatLevel::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Safe => "safe",
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub name: String,
    pub size: u64,
    /// Uppercased extension, empty when the name has none
    pub extension: String,
    pub detected_type: FileTypeTag,
    /// Sum of every triggered weight, never clamped
    pub score: u64,
    pub level: ThreatLevel,
    pub findings: Vec<String>,
}

impl AnalysisResult {
    fn new(name: &str, size: u64, extension: String) -> Self {
        Self {
            name: name.to_string(),
            size,
            extension,
            detected_type: FileTypeTag::Unknown,
            score: 0,
            level: ThreatLevel::Safe,
            findings: Vec::new(),
        }
    }

    fn add(&mut self, weight: u64, finding: impl Into<String>) {
        self.score = self.score.saturating_add(weight);
        self.findings.push(finding.into());
    }
}

/// Anything that can turn a file handle into a verdict
pub trait Analyzer {
    fn analyze(&self, file: &dyn FileHandle) -> AnalysisResult;
}

/// Heuristic analyzer backed by the static magic and content rule tables
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAnalyzer;

impl FileAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one file
    ///
    /// Header and text reads degrade gracefully, so every handle yields a
    /// complete result.
    ///
    /// # Arguments
    ///
    /// * `file` - Handle to the file under analysis
    ///
    /// # Returns
    ///
    /// The scored and classified result
    pub fn analyze_file(&self, file: &dyn FileHandle) -> AnalysisResult {
        info!("Analyzing file: {}", file.name());

        let mut result = AnalysisResult::new(file.name(), file.size(), extension_of(file.name()));

        self.check_header(file, &mut result);

        if file.size() < CONTENT_SCAN_LIMIT {
            self.check_content(file, &mut result);
        } else {
            debug!(
                "Skipping content scan for {} ({} bytes is over the limit)",
                file.name(),
                file.size()
            );
        }

        result.level = ThreatLevel::from_score(result.score);
        info!(
            "Finished {}: score {} ({})",
            result.name, result.score, result.level
        );

        result
    }

    /// Compare magic bytes with the claimed extension
    fn check_header(&self, file: &dyn FileHandle, result: &mut AnalysisResult) {
        let header = match file.read_bytes(0, HEADER_LEN) {
            Ok(header) => header,
            Err(e) => {
                warn!("Could not read header of {}: {}", file.name(), e);
                result.findings.push(HEADER_READ_FAILED.to_string());
                return;
            }
        };

        let detected = magic::detect_type_from_bytes(&header);
        debug!("Detected file type for {}: {}", file.name(), detected);
        result.detected_type = detected;

        if detected.is_known() && detected.as_str() != result.extension {
            let finding = format!(
                "Possible extension spoofing: claims .{} but detected {}",
                result.extension, detected
            );
            result.add(SPOOFING_WEIGHT, finding);
        }
    }

    /// Apply content rules to the decoded text, if it decodes
    fn check_content(&self, file: &dyn FileHandle, result: &mut AnalysisResult) {
        let text = match file.read_all_as_text() {
            Ok(text) => text,
            Err(e) => {
                debug!("Content of {} not scanned: {}", file.name(), e);
                return;
            }
        };

        for rule_match in patterns::scan_content(&text) {
            result.add(rule_match.weight, rule_match.message);
        }
    }
}

impl Analyzer for FileAnalyzer {
    fn analyze(&self, file: &dyn FileHandle) -> AnalysisResult {
        self.analyze_file(file)
    }
}
