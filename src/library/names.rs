//! Naming rules

use crate::condition::Condition;
use crate::element::ControlType;
use crate::evaluation::{Check, Severity};
use crate::predicates::{
    is_control_element, is_keyboard_focusable, is_offscreen, name_looks_like_file_name,
    name_not_empty,
};
use crate::rule::{Criterion, Rule, RuleError};

pub fn focusable_name_not_empty_rule() -> Result<Rule, RuleError> {
    Rule::builder("focusable-name-not-empty")
        .with_name("Focusable element has a name")
        .with_description("A keyboard-focusable control element should have a non-empty Name.")
        .with_criterion(Criterion::NameRoleValue)
        .with_severity(Severity::Error)
        .with_help("Set Name to the text a screen reader should announce.")
        .with_tag("name")
        .applies_to(is_keyboard_focusable() & is_control_element() & !is_offscreen())
        .requires(name_not_empty())
        .build()
}

/// File-like names are wrong; anything else needs a human to judge
pub fn image_name_informative_rule() -> Result<Rule, RuleError> {
    let file_like = name_looks_like_file_name()?;
    Rule::builder("image-name-informative")
        .with_name("Image name is informative")
        .with_description(
            "The Name of an Image should describe it, not repeat its file name.",
        )
        .with_criterion(Criterion::NonTextContent)
        .with_severity(Severity::Fail)
        .with_tag("name")
        .applies_to(
            Condition::control_type(ControlType::Image) & name_not_empty() & is_control_element(),
        )
        .procedure("name is not a file name", move |element| {
            if file_like.matches(element) {
                Check::Violated
            } else {
                Check::Undetermined
            }
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, ElementSpec, ElementTree, PropertyId};
    use crate::evaluation::EvaluationCode;

    fn tree() -> ElementTree {
        let spec = ElementSpec::new(1, ControlType::Window)
            .with_child(
                ElementSpec::new(2, ControlType::Edit)
                    .with_property(PropertyId::IsKeyboardFocusable, true)
                    .with_name(" "),
            )
            .with_child(
                ElementSpec::new(3, ControlType::Edit)
                    .with_property(PropertyId::IsKeyboardFocusable, true)
                    .with_name("Search"),
            )
            .with_child(
                ElementSpec::new(4, ControlType::Edit)
                    .with_property(PropertyId::IsKeyboardFocusable, true)
                    .with_property(PropertyId::IsOffscreen, true),
            )
            .with_child(ElementSpec::new(5, ControlType::Image).with_name("banner.jpg"))
            .with_child(ElementSpec::new(6, ControlType::Image).with_name("Company logo"))
            .with_child(ElementSpec::new(7, ControlType::Image));
        ElementTree::from_spec(spec).unwrap()
    }

    fn eval(rule: &Rule, tree: &ElementTree, id: u64) -> EvaluationCode {
        rule.evaluate(tree.get(ElementId(id)).unwrap())
    }

    #[test]
    fn test_focusable_name() {
        let tree = tree();
        let rule = focusable_name_not_empty_rule().unwrap();

        assert_eq!(eval(&rule, &tree, 2), EvaluationCode::Error);
        assert_eq!(eval(&rule, &tree, 3), EvaluationCode::Pass);
        assert_eq!(eval(&rule, &tree, 4), EvaluationCode::NotApplicable);
        assert_eq!(eval(&rule, &tree, 1), EvaluationCode::NotApplicable);
    }

    #[test]
    fn test_image_names() {
        let tree = tree();
        let rule = image_name_informative_rule().unwrap();

        assert_eq!(eval(&rule, &tree, 5), EvaluationCode::Fail);
        assert_eq!(eval(&rule, &tree, 6), EvaluationCode::Unknown);
        assert_eq!(eval(&rule, &tree, 7), EvaluationCode::NotApplicable);
    }
}
