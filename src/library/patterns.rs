//! Pattern-support rules: interactive elements must expose their actions

use crate::condition::Condition;
use crate::element::{ControlType, Pattern};
use crate::evaluation::Severity;
use crate::predicates::is_spreadsheet;
use crate::rule::{Criterion, Rule, RuleError};

/// The element, or one of its children, supports `pattern`
pub fn supports_here_or_in_child(pattern: Pattern) -> Condition {
    Condition::pattern(pattern) | Condition::any_child(Condition::pattern(pattern))
}

pub fn spreadsheet_item_pattern_rule() -> Result<Rule, RuleError> {
    Rule::builder("spreadsheet-item-pattern")
        .with_name("Spreadsheet cell supports SpreadsheetItem")
        .with_description(
            "A DataItem inside a spreadsheet should support the SpreadsheetItem pattern.",
        )
        .with_criterion(Criterion::AvailableActions)
        .with_severity(Severity::Error)
        .with_help("Implement SpreadsheetItem on the cell or on its content child.")
        .with_tag("pattern")
        .applies_to(
            Condition::control_type(ControlType::DataItem) & Condition::parent(is_spreadsheet()),
        )
        .requires(supports_here_or_in_child(Pattern::SpreadsheetItem))
        .build()
}

pub fn hyperlink_invoke_pattern_rule() -> Result<Rule, RuleError> {
    Rule::builder("hyperlink-invoke-pattern")
        .with_name("Hyperlink supports Invoke")
        .with_description("A Hyperlink element should support the Invoke pattern.")
        .with_criterion(Criterion::AvailableActions)
        .with_severity(Severity::Error)
        .with_tag("pattern")
        .applies_to(Condition::control_type(ControlType::Hyperlink))
        .requires(Condition::pattern(Pattern::Invoke))
        .build()
}
