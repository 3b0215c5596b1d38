//! Validation engine orchestration.
//!
//! One engine drives one run through a fixed, linear state machine:
//!
//! `Created → InputValidated → Extracted → MetadataLoaded → RulesExecuted → Reported`
//!
//! with a terminal `Failed` state reachable on fatal input or extraction
//! errors. The entry point always returns a well-formed report: fatal errors
//! become a single synthetic Critical finding, metadata failures a Medium
//! finding, and an individual rule fault a Medium finding naming that rule.

use std::path::Path;

use tracing::{debug, error, warn};

use crate::error::{error_chain, ValidationError};
use crate::extract::{extract, PackageRef};
use crate::metadata::load_metadata;
use crate::model::{Finding, Severity, ValidationReport};
use crate::rules::{RuleRegistry, ValidationContext};

/// Rule name attributed to synthetic fatal findings.
const VALIDATOR_RULE: &str = "validator";
/// Rule name attributed to metadata load failures.
const METADATA_LOADER_RULE: &str = "metadata-loader";

/// Pipeline position of a run. States are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Created,
    InputValidated,
    Extracted,
    MetadataLoaded,
    RulesExecuted,
    Reported,
    Failed,
}

/// Single-shot validation run over one package.
///
/// The engine owns its registry and mutable result state; `run` consumes the
/// engine, so a run can never be repeated or resumed.
pub struct ValidationEngine {
    registry: RuleRegistry,
    state: EngineState,
}

impl ValidationEngine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry,
            state: EngineState::Created,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Runs the full pipeline and always yields a report.
    pub async fn run(
        mut self,
        package_path: &Path,
        metadata_path: Option<&Path>,
    ) -> ValidationReport {
        let package = match PackageRef::from_path(package_path) {
            Ok(package) => {
                self.state = EngineState::InputValidated;
                package
            }
            Err(err) => {
                self.state = EngineState::Failed;
                return fatal_report(&err);
            }
        };

        let artifacts = match extract(&package) {
            Ok(artifacts) => {
                self.state = EngineState::Extracted;
                artifacts
            }
            Err(err) => {
                self.state = EngineState::Failed;
                return fatal_report(&ValidationError::from(err));
            }
        };

        let mut findings: Vec<Finding> = Vec::new();

        let metadata = match load_metadata(metadata_path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(error = %err, "continuing without metadata");
                findings.push(
                    Finding::new(METADATA_LOADER_RULE, Severity::Medium, err.to_string())
                        .with_details(error_chain(&err)),
                );
                None
            }
        };
        self.state = EngineState::MetadataLoaded;

        let ctx = ValidationContext::new(&package, &artifacts, metadata.as_ref());
        let mut executed = Vec::new();

        for rule in self.registry.iter() {
            debug!(rule = rule.name(), "evaluating rule");
            match rule.evaluate(&ctx).await {
                Ok(rule_findings) => findings.extend(rule_findings),
                Err(err) => {
                    // An individual rule fault never aborts the run.
                    warn!(rule = rule.name(), error = %err, "rule failed to execute");
                    findings.push(
                        Finding::new(
                            rule.name(),
                            Severity::Medium,
                            format!("Rule '{}' failed to execute", rule.name()),
                        )
                        .with_details(err.to_string()),
                    );
                }
            }
            executed.push(rule.name().to_string());
        }
        self.state = EngineState::RulesExecuted;

        let report = ValidationReport::new(findings, executed);
        self.state = EngineState::Reported;
        report
    }
}

fn fatal_report(err: &ValidationError) -> ValidationReport {
    error!(error = %err, "validation aborted");
    let finding = Finding::new(VALIDATOR_RULE, Severity::Critical, err.to_string())
        .with_details(error_chain(err));
    ValidationReport::new(vec![finding], Vec::new())
}
