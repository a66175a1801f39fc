/// Core module for file analysis
///
/// This module contains the magic byte detector, the content rule scanner and
/// the analyzer that combines them into a verdict.

pub mod analyzer;
pub mod magic;
pub mod patterns;
