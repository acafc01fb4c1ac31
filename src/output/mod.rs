//! Output formatters for scan results

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::engine::ScanResult;
use crate::evaluation::RuleResult;
use crate::registry::RuleRegistry;
use crate::rule::Rule;

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire scan result; rule metadata comes from the registry
    fn format(&self, result: &ScanResult, registry: &RuleRegistry) -> String;

    /// Format a single result
    fn format_result(&self, result: &RuleResult, rule: Option<&Rule>) -> String;

    /// Format the results of a single element as one document
    fn format_results(&self, results: &[RuleResult], registry: &RuleRegistry) -> String {
        results
            .iter()
            .map(|r| self.format_result(r, registry.lookup(&r.rule_id).ok()) + "\n")
            .collect()
    }
}
