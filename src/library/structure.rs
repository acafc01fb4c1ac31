//! Structural rules: expected child shapes and grouping

use crate::condition::Condition;
use crate::element::ControlType;
use crate::evaluation::Severity;
use crate::rule::{Criterion, Rule, RuleError};

fn text() -> Condition {
    Condition::control_type(ControlType::Text)
}

fn image() -> Condition {
    Condition::control_type(ControlType::Image)
}

/// Expected children of a CheckBox: a label, optionally preceded by a glyph
pub fn checkbox_structure() -> Condition {
    Condition::structure([text()]) | Condition::structure([image(), text()])
}

/// Expected children of a Button: nothing, or an image and/or a label
pub fn button_structure() -> Condition {
    Condition::any([
        Condition::Structure(Vec::new()),
        Condition::structure([image()]),
        Condition::structure([text()]),
        Condition::structure([image(), text()]),
    ])
}

fn describe_structure(control: ControlType, structure: &Condition) -> String {
    format!("A {} element should have the structure {}.", control, structure)
}

pub fn checkbox_structure_rule() -> Result<Rule, RuleError> {
    let structure = checkbox_structure();
    Rule::builder("checkbox-structure")
        .with_name("CheckBox structure")
        .with_description(describe_structure(ControlType::CheckBox, &structure))
        .with_criterion(Criterion::InfoAndRelationships)
        .with_severity(Severity::Note)
        .with_help("Expose the label as a Text child, optionally after an Image glyph.")
        .with_tag("structure")
        .applies_to(Condition::control_type(ControlType::CheckBox))
        .requires(structure)
        .build()
}

pub fn button_structure_rule() -> Result<Rule, RuleError> {
    let structure = button_structure();
    Rule::builder("button-structure")
        .with_name("Button structure")
        .with_description(describe_structure(ControlType::Button, &structure))
        .with_criterion(Criterion::InfoAndRelationships)
        .with_severity(Severity::Note)
        .with_tag("structure")
        .applies_to(Condition::control_type(ControlType::Button))
        .requires(structure)
        .build()
}

pub fn table_has_headers_rule() -> Result<Rule, RuleError> {
    Rule::builder("table-has-headers")
        .with_name("Table exposes headers")
        .with_description("A DataGrid or Table element should contain a Header or HeaderItem.")
        .with_criterion(Criterion::InfoAndRelationships)
        .with_severity(Severity::Fail)
        .with_help("Expose column or row headers so cells can be related to them.")
        .with_tag("structure")
        .applies_to(Condition::control_type_in([
            ControlType::DataGrid,
            ControlType::Table,
        ]))
        .requires(Condition::any_descendant(Condition::control_type_in([
            ControlType::Header,
            ControlType::HeaderItem,
        ])))
        .build()
}

pub fn radio_button_grouped_rule() -> Result<Rule, RuleError> {
    Rule::builder("radio-button-grouped")
        .with_name("RadioButton is grouped")
        .with_description(
            "A RadioButton should have RadioButton siblings or sit inside a Group or List.",
        )
        .with_criterion(Criterion::InfoAndRelationships)
        .with_severity(Severity::Note)
        .with_tag("structure")
        .applies_to(Condition::control_type(ControlType::RadioButton))
        .requires(
            Condition::any_sibling(Condition::control_type(ControlType::RadioButton))
                | Condition::parent(Condition::control_type_in([
                    ControlType::Group,
                    ControlType::List,
                ])),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, ElementSpec, ElementTree};
    use crate::evaluation::EvaluationCode;

    fn eval(rule: &Rule, tree: &ElementTree, id: u64) -> EvaluationCode {
        rule.evaluate(tree.get(ElementId(id)).unwrap())
    }

    #[test]
    fn test_checkbox_shapes() {
        let spec = ElementSpec::new(1, ControlType::Pane)
            .with_child(
                ElementSpec::new(2, ControlType::CheckBox)
                    .with_child(ElementSpec::new(3, ControlType::Text)),
            )
            .with_child(
                ElementSpec::new(4, ControlType::CheckBox)
                    .with_child(ElementSpec::new(5, ControlType::Image))
                    .with_child(ElementSpec::new(6, ControlType::Text)),
            )
            .with_child(
                ElementSpec::new(7, ControlType::CheckBox)
                    .with_child(ElementSpec::new(8, ControlType::Text))
                    .with_child(ElementSpec::new(9, ControlType::Image)),
            );
        let tree = ElementTree::from_spec(spec).unwrap();
        let rule = checkbox_structure_rule().unwrap();

        assert_eq!(eval(&rule, &tree, 2), EvaluationCode::Pass);
        assert_eq!(eval(&rule, &tree, 4), EvaluationCode::Pass);
        assert_eq!(eval(&rule, &tree, 7), EvaluationCode::Note);
        assert_eq!(eval(&rule, &tree, 1), EvaluationCode::NotApplicable);
    }

    #[test]
    fn test_button_shapes() {
        let spec = ElementSpec::new(1, ControlType::ToolBar)
            .with_child(ElementSpec::new(2, ControlType::Button))
            .with_child(
                ElementSpec::new(3, ControlType::Button)
                    .with_child(ElementSpec::new(4, ControlType::Image)),
            )
            .with_child(
                ElementSpec::new(5, ControlType::Button)
                    .with_child(ElementSpec::new(6, ControlType::Edit)),
            );
        let tree = ElementTree::from_spec(spec).unwrap();
        let rule = button_structure_rule().unwrap();

        assert_eq!(eval(&rule, &tree, 2), EvaluationCode::Pass);
        assert_eq!(eval(&rule, &tree, 3), EvaluationCode::Pass);
        assert_eq!(eval(&rule, &tree, 5), EvaluationCode::Note);
    }

    #[test]
    fn test_table_headers_found_at_any_depth() {
        let spec = ElementSpec::new(1, ControlType::Window)
            .with_child(
                ElementSpec::new(2, ControlType::DataGrid).with_child(
                    ElementSpec::new(3, ControlType::Pane)
                        .with_child(ElementSpec::new(4, ControlType::HeaderItem)),
                ),
            )
            .with_child(
                ElementSpec::new(5, ControlType::Table)
                    .with_child(ElementSpec::new(6, ControlType::DataItem)),
            );
        let tree = ElementTree::from_spec(spec).unwrap();
        let rule = table_has_headers_rule().unwrap();

        let result = rule.evaluate_detailed(tree.get(ElementId(2)).unwrap());
        assert_eq!(result.code, EvaluationCode::Pass);
        assert_eq!(result.witness, Some(ElementId(4)));
        assert_eq!(eval(&rule, &tree, 5), EvaluationCode::Fail);
    }

    #[test]
    fn test_radio_button_grouping() {
        let spec = ElementSpec::new(1, ControlType::Window)
            .with_child(
                ElementSpec::new(2, ControlType::Group)
                    .with_child(ElementSpec::new(3, ControlType::RadioButton)),
            )
            .with_child(ElementSpec::new(4, ControlType::RadioButton))
            .with_child(
                ElementSpec::new(5, ControlType::Pane)
                    .with_child(ElementSpec::new(6, ControlType::RadioButton))
                    .with_child(ElementSpec::new(7, ControlType::RadioButton)),
            );
        let tree = ElementTree::from_spec(spec).unwrap();
        let rule = radio_button_grouped_rule().unwrap();

        assert_eq!(eval(&rule, &tree, 3), EvaluationCode::Pass);
        assert_eq!(eval(&rule, &tree, 4), EvaluationCode::Note);
        assert_eq!(eval(&rule, &tree, 6), EvaluationCode::Pass);
    }

    #[test]
    fn test_description_shows_structure() {
        let rule = checkbox_structure_rule().unwrap();
        assert_eq!(
            rule.description,
            "A CheckBox element should have the structure \
             (Children [ControlType == Text] || Children [ControlType == Image, ControlType == Text])."
        );
    }
}
