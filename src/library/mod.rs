//! Built-in accessibility rules
//!
//! The list is fixed and enumerated here; its order is the registration
//! order and therefore the order of every scan report.

mod names;
mod patterns;
mod structure;

pub use patterns::supports_here_or_in_child;
pub use structure::{button_structure, checkbox_structure};

use crate::rule::{Rule, RuleError};

/// Get all built-in rules, in registration order
pub fn builtin_rules() -> Result<Vec<Rule>, RuleError> {
    Ok(vec![
        structure::checkbox_structure_rule()?,
        structure::button_structure_rule()?,
        patterns::spreadsheet_item_pattern_rule()?,
        patterns::hyperlink_invoke_pattern_rule()?,
        names::focusable_name_not_empty_rule()?,
        structure::table_has_headers_rule()?,
        structure::radio_button_grouped_rule()?,
        names::image_name_informative_rule()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids() {
        let ids: Vec<String> = builtin_rules()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(
            ids,
            vec![
                "checkbox-structure",
                "button-structure",
                "spreadsheet-item-pattern",
                "hyperlink-invoke-pattern",
                "focusable-name-not-empty",
                "table-has-headers",
                "radio-button-grouped",
                "image-name-informative",
            ]
        );
    }

    #[test]
    fn test_every_rule_has_metadata() {
        let rules = builtin_rules().unwrap();
        let unique: HashSet<&str> = rules.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(unique.len(), rules.len());
        for rule in &rules {
            assert!(!rule.description.is_empty(), "{} has no description", rule.id);
            assert!(rule.criterion.is_some(), "{} has no criterion", rule.id);
        }
    }

    #[test]
    fn test_every_criterion_is_checked() {
        use crate::rule::Criterion;

        let checked: HashSet<Criterion> = builtin_rules()
            .unwrap()
            .into_iter()
            .filter_map(|r| r.criterion)
            .collect();

        assert_eq!(
            checked,
            HashSet::from([
                Criterion::NonTextContent,
                Criterion::InfoAndRelationships,
                Criterion::NameRoleValue,
                Criterion::AvailableActions,
            ])
        );
    }
}
