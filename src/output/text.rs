//! Human-readable text output formatter

use super::OutputFormatter;
use crate::element::ElementId;
use crate::engine::ScanResult;
use crate::evaluation::{EvaluationCode, RuleResult};
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use colored::*;

/// Text formatter with optional color support
pub struct TextFormatter {
    pub colored: bool,

    /// Also list Pass and NotApplicable results
    pub show_passes: bool,

    /// Show rule help text
    pub show_help: bool,

    /// Show the summary block
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_passes: false,
            show_help: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    pub fn with_passes(mut self, show: bool) -> Self {
        self.show_passes = show;
        self
    }

    pub fn with_stats(mut self, show: bool) -> Self {
        self.show_stats = show;
        self
    }

    fn code_str(&self, code: EvaluationCode) -> ColoredString {
        let s = code.to_string();
        if !self.colored {
            return s.normal();
        }
        match code {
            EvaluationCode::Error => s.red().bold(),
            EvaluationCode::Fail => s.red(),
            EvaluationCode::Unknown => s.magenta(),
            EvaluationCode::Note => s.yellow(),
            EvaluationCode::Pass => s.green(),
            EvaluationCode::NotApplicable => s.dimmed(),
        }
    }

    fn paint(&self, s: String, color: Color) -> String {
        if self.colored {
            s.color(color).to_string()
        } else {
            s
        }
    }

    fn element_header(&self, result: &RuleResult) -> String {
        let header = match &result.element_name {
            Some(name) => format!("{} {} \"{}\"", result.element, result.control_type, name),
            None => format!("{} {}", result.element, result.control_type),
        };
        if self.colored {
            header.underline().to_string()
        } else {
            header
        }
    }

    fn summary(&self, result: &ScanResult) -> String {
        let mut output = format!(
            "\n{} {} scanned with {} {}",
            result.elements_scanned,
            if result.elements_scanned == 1 {
                "element"
            } else {
                "elements"
            },
            result.rules_run,
            if result.rules_run == 1 { "rule" } else { "rules" }
        );

        let counts: Vec<String> = [
            (EvaluationCode::Error, Color::Red),
            (EvaluationCode::Fail, Color::Red),
            (EvaluationCode::Unknown, Color::Magenta),
            (EvaluationCode::Note, Color::Yellow),
        ]
        .into_iter()
        .filter(|(code, _)| result.count(*code) > 0)
        .map(|(code, color)| self.paint(format!("{} {}", result.count(code), code), color))
        .collect();

        if !counts.is_empty() {
            output.push_str(&format!(": {}", counts.join(", ")));
        }
        output.push('\n');

        output.push_str(&format!(
            "Finished in {:.2}s\n",
            result.duration.as_secs_f64()
        ));
        output
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &ScanResult, registry: &RuleRegistry) -> String {
        let mut output = String::new();
        let mut current: Option<ElementId> = None;

        // Results arrive grouped by element in tree order
        for r in result
            .results
            .iter()
            .filter(|r| self.show_passes || r.code.is_finding())
        {
            if current != Some(r.element) {
                if current.is_some() {
                    output.push('\n');
                }
                output.push_str(&self.element_header(r));
                output.push('\n');
                current = Some(r.element);
            }
            output.push_str(&self.format_result(r, registry.lookup(&r.rule_id).ok()));
        }

        if self.show_stats {
            output.push_str(&self.summary(result));
        }

        output
    }

    fn format_result(&self, result: &RuleResult, rule: Option<&Rule>) -> String {
        let rule_id = if self.colored {
            result.rule_id.cyan().to_string()
        } else {
            result.rule_id.clone()
        };
        let description = rule.map(|r| r.description.as_str()).unwrap_or("");

        let mut output = format!(
            "  {}[{}]: {}\n",
            self.code_str(result.code),
            rule_id,
            description
        );

        if let Some(reference) = rule.and_then(|r| r.criterion) {
            output.push_str(&format!("    = see: {}\n", reference));
        }
        if let Some(witness) = result.witness.filter(|w| *w != result.element) {
            output.push_str(&format!("    = satisfied by: {}\n", witness));
        }
        if self.show_help && result.code.is_finding() {
            if let Some(help) = rule.and_then(|r| r.help.as_deref()) {
                output.push_str(&format!("    = help: {}\n", help));
            }
        }

        output
    }
}
