/// Utility modules for the scanner
///
/// This module contains file handle implementations and output formatting.

pub mod file_utils;
pub mod output_formatter;
