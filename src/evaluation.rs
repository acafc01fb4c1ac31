//! Verdict types produced by rule evaluation

use crate::element::{ControlType, ElementId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating one rule against one element, ordered by gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationCode {
    /// The element was never in scope for the rule
    NotApplicable,
    /// The element satisfies the rule
    Pass,
    /// Advisory finding, not blocking
    Note,
    /// The rule cannot decide mechanically; needs human judgment
    Unknown,
    /// The element fails the rule
    Fail,
    /// A required condition is not satisfied; blocking
    Error,
}

impl EvaluationCode {
    pub const ALL: [EvaluationCode; 6] = [
        EvaluationCode::NotApplicable,
        EvaluationCode::Pass,
        EvaluationCode::Note,
        EvaluationCode::Unknown,
        EvaluationCode::Fail,
        EvaluationCode::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationCode::NotApplicable => "not-applicable",
            EvaluationCode::Pass => "pass",
            EvaluationCode::Note => "note",
            EvaluationCode::Unknown => "unknown",
            EvaluationCode::Fail => "fail",
            EvaluationCode::Error => "error",
        }
    }

    /// Fail and Error block compliance
    pub fn is_blocking(&self) -> bool {
        matches!(self, EvaluationCode::Fail | EvaluationCode::Error)
    }

    /// Anything a report should surface: not a pass, and in scope
    pub fn is_finding(&self) -> bool {
        !matches!(self, EvaluationCode::Pass | EvaluationCode::NotApplicable)
    }
}

impl fmt::Display for EvaluationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EvaluationCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not-applicable" | "notapplicable" | "n/a" => Ok(EvaluationCode::NotApplicable),
            "pass" => Ok(EvaluationCode::Pass),
            "note" => Ok(EvaluationCode::Note),
            "unknown" => Ok(EvaluationCode::Unknown),
            "fail" => Ok(EvaluationCode::Fail),
            "error" => Ok(EvaluationCode::Error),
            _ => Err(format!("Unknown evaluation code: {}", s)),
        }
    }
}

/// Declared severity policy: the code a rule reports when its verdict fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory deviation (structure rules)
    Note,
    /// Ordinary failure
    #[default]
    Fail,
    /// Missing required support (pattern rules)
    Error,
}

impl Severity {
    pub fn failing_code(&self) -> EvaluationCode {
        match self {
            Severity::Note => EvaluationCode::Note,
            Severity::Fail => EvaluationCode::Fail,
            Severity::Error => EvaluationCode::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Fail => write!(f, "fail"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Outcome of a custom verdict procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Satisfied,
    Violated,
    /// Cannot be decided mechanically
    Undetermined,
}

impl Check {
    /// Map onto an evaluation code under the given severity
    pub fn code(&self, severity: Severity) -> EvaluationCode {
        match self {
            Check::Satisfied => EvaluationCode::Pass,
            Check::Violated => severity.failing_code(),
            Check::Undetermined => EvaluationCode::Unknown,
        }
    }
}

impl From<bool> for Check {
    fn from(satisfied: bool) -> Self {
        if satisfied {
            Check::Satisfied
        } else {
            Check::Violated
        }
    }
}

/// Verdict for one (element, rule) pair, with context for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,

    pub element: ElementId,

    pub control_type: ControlType,

    /// Element name, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_name: Option<String>,

    pub code: EvaluationCode,

    /// Node that established the verdict condition (e.g. the child that
    /// exposed a required pattern)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<ElementId>,
}
