//! a11y-rules - Accessibility rule engine for UI element trees
//!
//! Evaluates accessibility rules against a snapshot of the elements exposed
//! by a platform accessibility API.
//!
//! # Architecture
//!
//! ```text
//! snapshot -> ElementTree -> Engine -> RuleRegistry -> Rule -> Condition
//! ```
//!
//! A [`Rule`] pairs an applicability [`Condition`] with a verdict. When the
//! applicability condition is false the result is
//! [`EvaluationCode::NotApplicable`] and the verdict never runs. Otherwise the
//! verdict decides between `Pass` and the rule's declared failing code, or
//! reports `Unknown` when a human has to judge.
//!
//! ```
//! use a11y_rules::element::{ControlType, ElementSpec, ElementTree, Pattern};
//! use a11y_rules::{EvaluationCode, RuleRegistry};
//!
//! let spec = ElementSpec::new(1, ControlType::Spreadsheet)
//!     .with_pattern(Pattern::Spreadsheet)
//!     .with_child(ElementSpec::new(2, ControlType::DataItem));
//! let tree = ElementTree::from_spec(spec).unwrap();
//! let registry = RuleRegistry::builtin().unwrap();
//!
//! let rule = registry.lookup("spreadsheet-item-pattern").unwrap();
//! let cell = tree.get(a11y_rules::ElementId(2)).unwrap();
//! assert_eq!(rule.evaluate(cell), EvaluationCode::Error);
//! ```

pub mod condition;
pub mod config;
pub mod element;
pub mod engine;
pub mod evaluation;
pub mod library;
pub mod output;
pub mod predicates;
pub mod registry;
pub mod rule;
pub mod snapshot;

// Re-export main types
pub use condition::{evaluate, CompareOp, Condition, Navigator};
pub use config::{Config, ConfigError};
pub use element::{
    ControlType, Element, ElementId, ElementSpec, ElementTree, Pattern, PropertyId, PropertyValue,
};
pub use engine::{Engine, RuleTiming, ScanResult};
pub use evaluation::{Check, EvaluationCode, RuleResult, Severity};
pub use output::{JsonFormatter, OutputFormatter, TextFormatter};
pub use predicates::Matcher;
pub use registry::{RegistryError, RuleRegistry};
pub use rule::{Criterion, Rule, RuleBuilder, RuleError, RuleMetadata, Verdict};
pub use snapshot::SnapshotError;
