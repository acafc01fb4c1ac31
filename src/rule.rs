//! Rule definition and evaluation
//!
//! A rule pairs an applicability condition with a verdict. The verdict is
//! either a required [`Condition`] (true passes, false reports the rule's
//! declared [`Severity`]) or a custom procedure returning a [`Check`].

use crate::condition::Condition;
use crate::element::{Element, ElementId, ElementTree};
use crate::evaluation::{Check, EvaluationCode, RuleResult, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Rule construction and invocation errors
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Accessibility standard criterion a rule checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    /// WCAG 1.1.1
    NonTextContent,
    /// WCAG 1.3.1
    InfoAndRelationships,
    /// WCAG 4.1.2
    NameRoleValue,
    /// Section 508 502.3.10
    AvailableActions,
}

impl Criterion {
    pub fn reference(&self) -> &'static str {
        match self {
            Criterion::NonTextContent => "WCAG 1.1.1",
            Criterion::InfoAndRelationships => "WCAG 1.3.1",
            Criterion::NameRoleValue => "WCAG 4.1.2",
            Criterion::AvailableActions => "Section 508 502.3.10",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Criterion::NonTextContent => "Non-text Content",
            Criterion::InfoAndRelationships => "Info and Relationships",
            Criterion::NameRoleValue => "Name, Role, Value",
            Criterion::AvailableActions => "Availability of Actions",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.reference(), self.title())
    }
}

/// Custom verdict procedure
pub type VerdictFn = Arc<dyn Fn(Element<'_>) -> Check + Send + Sync>;

/// How an applicable element is judged
#[derive(Clone)]
pub enum Verdict {
    /// Pass when the condition holds, otherwise the declared failing code
    Requires(Condition),

    /// Custom procedure, for checks the algebra cannot express
    Procedure { label: String, check: VerdictFn },
}

impl fmt::Debug for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Requires(c) => f.debug_tuple("Requires").field(c).finish(),
            Verdict::Procedure { label, .. } => f.debug_tuple("Procedure").field(label).finish(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Requires(c) => write!(f, "{}", c),
            Verdict::Procedure { label, .. } => write!(f, "procedure: {}", label),
        }
    }
}

/// An accessibility rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable identifier (e.g., "checkbox-structure"); never reused
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// What the rule checks
    pub description: String,

    /// Standard reference
    pub criterion: Option<Criterion>,

    /// How to fix a finding
    pub help: Option<String>,

    /// Code reported when the verdict fails
    pub severity: Severity,

    pub tags: Vec<String>,

    /// Which elements the rule is relevant to
    pub applicability: Condition,

    pub verdict: Verdict,
}

impl Rule {
    pub fn builder(id: &str) -> RuleBuilder {
        RuleBuilder::new(id)
    }

    pub fn is_applicable(&self, element: Element<'_>) -> bool {
        self.applicability.matches(element)
    }

    /// Verdict for one element
    pub fn evaluate(&self, element: Element<'_>) -> EvaluationCode {
        self.judge(element).0
    }

    /// Verdict with reporting context
    pub fn evaluate_detailed(&self, element: Element<'_>) -> RuleResult {
        let (code, witness) = self.judge(element);
        RuleResult {
            rule_id: self.id.clone(),
            element: element.id(),
            control_type: element.control_type(),
            element_name: element.name().map(String::from),
            code,
            witness,
        }
    }

    /// Evaluate the element with the given id
    pub fn evaluate_id(&self, tree: &ElementTree, id: ElementId) -> Result<RuleResult, RuleError> {
        let element = tree.get(id).ok_or_else(|| {
            RuleError::InvalidArgument(format!("element {} is not in the tree", id))
        })?;
        Ok(self.evaluate_detailed(element))
    }

    fn judge(&self, element: Element<'_>) -> (EvaluationCode, Option<ElementId>) {
        if !self.is_applicable(element) {
            return (EvaluationCode::NotApplicable, None);
        }

        match &self.verdict {
            Verdict::Requires(condition) => match condition.witness(element) {
                Some(witness) => (EvaluationCode::Pass, Some(witness.id())),
                None => (self.severity.failing_code(), None),
            },
            Verdict::Procedure { check, .. } => (check(element).code(self.severity), None),
        }
    }

    /// Check if rule has the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Serializable metadata, queryable without evaluating anything
    pub fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            reference: self.criterion.map(|c| c.reference().to_string()),
            criterion: self.criterion.map(|c| c.title().to_string()),
            severity: self.severity,
            help: self.help.clone(),
            tags: self.tags.clone(),
            applicability: self.applicability.to_string(),
            verdict: self.verdict.to_string(),
        }
    }
}

/// Rule metadata for listings and reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub applicability: String,
    pub verdict: String,
}

/// Builder for [`Rule`]
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    id: String,
    name: Option<String>,
    description: Option<String>,
    criterion: Option<Criterion>,
    help: Option<String>,
    severity: Severity,
    tags: Vec<String>,
    applicability: Option<Condition>,
    verdict: Option<Verdict>,
}

impl RuleBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            description: None,
            criterion: None,
            help: None,
            severity: Severity::default(),
            tags: Vec::new(),
            applicability: None,
            verdict: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = Some(criterion);
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Applicability condition
    pub fn applies_to(mut self, condition: Condition) -> Self {
        self.applicability = Some(condition);
        self
    }

    /// Verdict condition
    pub fn requires(mut self, condition: Condition) -> Self {
        self.verdict = Some(Verdict::Requires(condition));
        self
    }

    /// Custom verdict procedure
    pub fn procedure<F>(mut self, label: &str, check: F) -> Self
    where
        F: Fn(Element<'_>) -> Check + Send + Sync + 'static,
    {
        self.verdict = Some(Verdict::Procedure {
            label: label.to_string(),
            check: Arc::new(check),
        });
        self
    }

    pub fn build(self) -> Result<Rule, RuleError> {
        if self.id.trim().is_empty() {
            return Err(RuleError::InvalidArgument("rule id is empty".to_string()));
        }
        let applicability = self.applicability.ok_or_else(|| {
            RuleError::InvalidArgument(format!("rule '{}' has no applicability", self.id))
        })?;
        let verdict = self.verdict.ok_or_else(|| {
            RuleError::InvalidArgument(format!("rule '{}' has no verdict", self.id))
        })?;

        Ok(Rule {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            description: self.description.unwrap_or_default(),
            id: self.id,
            criterion: self.criterion,
            help: self.help,
            severity: self.severity,
            tags: self.tags,
            applicability,
            verdict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ControlType, ElementSpec, Pattern};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn grid() -> ElementTree {
        let spec = ElementSpec::new(1, ControlType::Spreadsheet)
            .with_pattern(Pattern::Spreadsheet)
            .with_child(
                ElementSpec::new(2, ControlType::DataItem)
                    .with_child(ElementSpec::new(3, ControlType::Text).with_pattern(Pattern::SpreadsheetItem)),
            )
            .with_child(ElementSpec::new(4, ControlType::DataItem))
            .with_child(ElementSpec::new(5, ControlType::Button));
        ElementTree::from_spec(spec).unwrap()
    }

    fn item_rule(severity: Severity) -> Rule {
        Rule::builder("item")
            .with_severity(severity)
            .applies_to(Condition::control_type(ControlType::DataItem))
            .requires(
                Condition::pattern(Pattern::SpreadsheetItem)
                    | Condition::any_child(Condition::pattern(Pattern::SpreadsheetItem)),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_requires_maps_to_declared_severity() {
        let tree = grid();
        let empty_cell = tree.get(ElementId(4)).unwrap();

        assert_eq!(item_rule(Severity::Error).evaluate(empty_cell), EvaluationCode::Error);
        assert_eq!(item_rule(Severity::Note).evaluate(empty_cell), EvaluationCode::Note);
        assert_eq!(item_rule(Severity::Fail).evaluate(empty_cell), EvaluationCode::Fail);
    }

    #[test]
    fn test_pass_reports_witness() {
        let tree = grid();
        let result = item_rule(Severity::Error).evaluate_detailed(tree.get(ElementId(2)).unwrap());

        assert_eq!(result.code, EvaluationCode::Pass);
        assert_eq!(result.witness, Some(ElementId(3)));
        assert_eq!(result.control_type, ControlType::DataItem);
    }

    #[test]
    fn test_procedure_not_invoked_when_not_applicable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let rule = Rule::builder("counted")
            .applies_to(Condition::control_type(ControlType::DataItem))
            .procedure("always violated", move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                Check::Violated
            })
            .build()
            .unwrap();
        let tree = grid();

        assert_eq!(rule.evaluate(tree.get(ElementId(5)).unwrap()), EvaluationCode::NotApplicable);
        assert_eq!(rule.evaluate(tree.get(ElementId(1)).unwrap()), EvaluationCode::NotApplicable);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(rule.evaluate(tree.get(ElementId(4)).unwrap()), EvaluationCode::Fail);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_undetermined_procedure_is_unknown() {
        let rule = Rule::builder("manual")
            .with_severity(Severity::Error)
            .applies_to(Condition::Always)
            .procedure("needs review", |_| Check::Undetermined)
            .build()
            .unwrap();
        let tree = grid();

        assert_eq!(rule.evaluate(tree.root().unwrap()), EvaluationCode::Unknown);
    }

    #[test]
    fn test_builder_rejects_incomplete_rules() {
        let missing_verdict = Rule::builder("x").applies_to(Condition::Always).build();
        assert!(matches!(missing_verdict, Err(RuleError::InvalidArgument(_))));

        let missing_scope = Rule::builder("x").requires(Condition::Always).build();
        assert!(matches!(missing_scope, Err(RuleError::InvalidArgument(_))));

        let empty_id = Rule::builder("  ")
            .applies_to(Condition::Always)
            .requires(Condition::Always)
            .build();
        assert!(matches!(empty_id, Err(RuleError::InvalidArgument(_))));
    }

    #[test]
    fn test_evaluate_unknown_element_id() {
        let tree = grid();
        let rule = item_rule(Severity::Error);

        let err = rule.evaluate_id(&tree, ElementId(99)).unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument(_)));

        let ok = rule.evaluate_id(&tree, ElementId(4)).unwrap();
        assert_eq!(ok.code, EvaluationCode::Error);
    }

    #[test]
    fn test_metadata() {
        let rule = Rule::builder("hyperlink-invoke")
            .with_name("Hyperlink exposes Invoke")
            .with_criterion(Criterion::AvailableActions)
            .with_tag("pattern")
            .applies_to(Condition::control_type(ControlType::Hyperlink))
            .requires(Condition::pattern(Pattern::Invoke))
            .build()
            .unwrap();
        let meta = rule.metadata();

        assert_eq!(meta.reference.as_deref(), Some("Section 508 502.3.10"));
        assert_eq!(meta.applicability, "ControlType == Hyperlink");
        assert_eq!(meta.verdict, "supports Invoke");
        assert!(rule.has_tag("pattern"));
        assert_eq!(Criterion::NameRoleValue.to_string(), "WCAG 4.1.2 Name, Role, Value");
    }
}
