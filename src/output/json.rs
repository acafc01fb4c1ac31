//! JSON output formatter

use super::OutputFormatter;
use crate::element::{ControlType, ElementId};
use crate::engine::ScanResult;
use crate::evaluation::{EvaluationCode, RuleResult};
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    results: Vec<JsonResult<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    rule_id: &'a str,
    code: EvaluationCode,
    element: ElementId,
    control_type: ControlType,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    witness: Option<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'static str>,
}

#[derive(Serialize)]
struct JsonSummary {
    elements_scanned: usize,
    rules_run: usize,
    counts: BTreeMap<EvaluationCode, usize>,
    exit_code: i32,
    duration_ms: u128,
}

fn json_result<'a>(result: &'a RuleResult, rule: Option<&'a Rule>) -> JsonResult<'a> {
    JsonResult {
        rule_id: &result.rule_id,
        code: result.code,
        element: result.element,
        control_type: result.control_type,
        element_name: result.element_name.as_deref(),
        witness: result.witness,
        description: rule.map(|r| r.description.as_str()),
        reference: rule.and_then(|r| r.criterion).map(|c| c.reference()),
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ScanResult, registry: &RuleRegistry) -> String {
        let output = JsonOutput {
            results: result
                .results
                .iter()
                .map(|r| json_result(r, registry.lookup(&r.rule_id).ok()))
                .collect(),
            summary: JsonSummary {
                elements_scanned: result.elements_scanned,
                rules_run: result.rules_run,
                counts: result.counts.clone(),
                exit_code: result.exit_code(),
                duration_ms: result.duration.as_millis(),
            },
        };

        self.render(&output)
    }

    fn format_result(&self, result: &RuleResult, rule: Option<&Rule>) -> String {
        self.render(&json_result(result, rule))
    }

    fn format_results(&self, results: &[RuleResult], registry: &RuleRegistry) -> String {
        let results: Vec<JsonResult<'_>> = results
            .iter()
            .map(|r| json_result(r, registry.lookup(&r.rule_id).ok()))
            .collect();
        self.render(&results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::element::{ElementSpec, ElementTree, Pattern};
    use crate::engine::Engine;
    use std::sync::Arc;

    #[test]
    fn test_json_output() {
        let spec = ElementSpec::new(1, ControlType::Document)
            .with_child(ElementSpec::new(2, ControlType::Hyperlink).with_name("Docs"))
            .with_child(ElementSpec::new(3, ControlType::Hyperlink).with_pattern(Pattern::Invoke));
        let tree = ElementTree::from_spec(spec).unwrap();
        let registry = Arc::new(RuleRegistry::builtin().unwrap());
        let result = Engine::new(Arc::clone(&registry), Config::new()).scan(&tree);

        let json = JsonFormatter::new().format(&result, &registry);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["results"][0]["rule_id"], "hyperlink-invoke-pattern");
        assert_eq!(value["results"][0]["code"], "error");
        assert_eq!(value["results"][0]["element"], 2);
        assert_eq!(value["results"][0]["element_name"], "Docs");
        assert_eq!(value["results"][0]["reference"], "Section 508 502.3.10");
        assert_eq!(value["results"][1]["code"], "pass");
        assert_eq!(value["results"][1]["witness"], 3);
        assert_eq!(value["summary"]["counts"]["error"], 1);
        assert_eq!(value["summary"]["exit_code"], 2);
    }

    #[test]
    fn test_pretty_single_result() {
        let result = RuleResult {
            rule_id: "checkbox-structure".to_string(),
            element: ElementId(7),
            control_type: ControlType::CheckBox,
            element_name: None,
            code: EvaluationCode::Note,
            witness: None,
        };

        let json = JsonFormatter::new().pretty().format_result(&result, None);
        assert!(json.contains("\n  \"code\": \"note\""));
        assert!(!json.contains("element_name"));
    }

    #[test]
    fn test_element_results_are_one_array() {
        let spec = ElementSpec::new(1, ControlType::Pane).with_child(
            ElementSpec::new(2, ControlType::CheckBox)
                .with_child(ElementSpec::new(3, ControlType::Text).with_name("Bold")),
        );
        let tree = ElementTree::from_spec(spec).unwrap();
        let registry = Arc::new(RuleRegistry::builtin().unwrap());
        let results = Engine::new(Arc::clone(&registry), Config::new())
            .evaluate_element(&tree, ElementId(2))
            .unwrap();

        let json = JsonFormatter::new().pretty().format_results(&results, &registry);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let array = value.as_array().unwrap();

        assert_eq!(array.len(), results.len());
        assert_eq!(array[0]["rule_id"], "checkbox-structure");
        assert_eq!(array[0]["code"], "pass");
        assert_eq!(array[0]["witness"], 2);
    }
}
