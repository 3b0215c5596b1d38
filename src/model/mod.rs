//! Core data types for findings, severities, and validation reports.
//!
//! This module contains the fundamental types used throughout storelint:
//!
//! - [`Severity`] - The five ordered finding levels
//! - [`Finding`] - A single reported compliance issue
//! - [`Summary`] - Per-severity counts derived from a finding sequence
//! - [`ValidationReport`] - Complete result of one validation run
//!
//! # Example
//!
//! ```
//! use storelint::model::{Finding, Severity, ValidationReport};
//!
//! let finding = Finding::new("bundle-keys", Severity::Critical, "Missing CFBundleIdentifier");
//! let report = ValidationReport::new(vec![finding], vec!["bundle-keys".to_string()]);
//!
//! assert_eq!(report.summary.critical, 1);
//! ```

mod finding;
mod report;
mod severity;

pub use finding::*;
pub use report::*;
pub use severity::*;
