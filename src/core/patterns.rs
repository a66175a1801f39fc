/// Content rule definitions for the scanner
///
/// This module holds the fixed, ordered table of suspicious-content rules and
/// the scanner that applies them to decoded file text. Scores are additive, so
/// table order only decides the order of findings.

use lazy_static::lazy_static;
use log::{debug, error};
use regex::Regex;

/// Files at or above this size are never decoded or content scanned
pub const CONTENT_SCAN_LIMIT: u64 = 2 * 1024 * 1024;

/// A pattern, the score it adds when found, and the finding it reports
#[derive(Debug, Clone, Copy)]
pub struct ContentRule {
    pub pattern: &'static str,
    pub weight: u64,
    pub message: &'static str,
}

/// A rule that fired against some content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub weight: u64,
    pub message: &'static str,
}

/// Suspicious content indicators, in reporting order
pub static CONTENT_RULES: &[ContentRule] = &[
    ContentRule {
        pattern: r"(?i)eval\s*\(",
        weight: 35,
        message: "Suspicious use of eval()",
    },
    ContentRule {
        pattern: r"(?i)fromCharCode",
        weight: 30,
        message: "Possible encoded payload",
    },
    ContentRule {
        pattern: r"(?i)keylogger|keystroke|hookkeyboard",
        weight: 50,
        message: "Keylogger-like strings found",
    },
    ContentRule {
        pattern: r"(?i)cmd\.exe|powershell\.exe",
        weight: 25,
        message: "Windows command execution reference",
    },
    ContentRule {
        pattern: r"(?i)base64_decode|atob\s*\(",
        weight: 20,
        message: "Base64 decoding detected",
    },
    ContentRule {
        pattern: r#"(?i)https?://[^\s"'<>]*\.exe(?:[\s"'<>)\],;]|$)"#,
        weight: 28,
        message: "Download link to .exe found",
    },
];

/// Helper function to compile a rule pattern
pub fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("Error compiling pattern {}: {}", pattern, e);
            None
        }
    }
}

/// Compile every content rule, keeping table order
fn precompile_rules() -> Vec<(ContentRule, Regex)> {
    CONTENT_RULES
        .iter()
        .filter_map(|rule| compile_pattern(rule.pattern).map(|regex| (*rule, regex)))
        .collect()
}

lazy_static! {
    /// Rules compiled once per process
    static ref COMPILED_RULES: Vec<(ContentRule, Regex)> = precompile_rules();
}

/// Run every content rule against decoded text
///
/// # Arguments
///
/// * `text` - Decoded file content
///
/// # Returns
///
/// One match per rule found anywhere in `text`, in table order
pub fn scan_content(text: &str) -> Vec<RuleMatch> {
    COMPILED_RULES
        .iter()
        .filter(|(_, regex)| regex.is_match(text))
        .map(|(rule, _)| {
            debug!("Content rule matched: {}", rule.message);
            RuleMatch {
                weight: rule.weight,
                message: rule.message,
            }
        })
        .collect()
}
