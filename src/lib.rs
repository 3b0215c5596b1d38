pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod model;
pub mod output;
pub mod rules;

pub use config::Config;
pub use engine::ValidationEngine;
pub use error::ValidationError;
pub use extract::PackageRef;
pub use model::{Finding, Severity, ValidationReport};
pub use rules::{Rule, RuleRegistry};
