//! Condition algebra
//!
//! Conditions are immutable predicates over an [`Element`]. Leaves test a
//! property, the control type, supported patterns or the child list; `And`,
//! `Or` and `Not` combine them; relational conditions re-anchor an inner
//! condition on the element's parent, children, ancestors, descendants or
//! siblings.
//!
//! ```
//! use a11y_rules::condition::Condition;
//! use a11y_rules::element::{ControlType, Pattern};
//!
//! let cell = Condition::control_type(ControlType::DataItem)
//!     & Condition::parent(Condition::pattern(Pattern::Spreadsheet));
//! let exposes_item = Condition::pattern(Pattern::SpreadsheetItem)
//!     | Condition::any_child(Condition::pattern(Pattern::SpreadsheetItem));
//! # let _ = (cell, exposes_item);
//! ```
//!
//! Evaluation is total: a navigator that reaches no node is simply false.
//! `And` and `Or` evaluate left to right and skip the right operand once the
//! result is known. Quantified navigators stop at the first satisfying node.

use crate::element::{ControlType, Element, Pattern, PropertyId};
use crate::predicates::Matcher;
use std::collections::BTreeSet;
use std::fmt;

/// A composable, stateless predicate over an element
#[derive(Debug, Clone)]
pub enum Condition {
    /// Always true
    Always,

    /// Always false
    Never,

    /// Property test: `{ id: Name, matcher: NonEmpty }`
    Property { id: PropertyId, matcher: Matcher },

    /// Control type is one of the set
    ControlTypeIs(BTreeSet<ControlType>),

    /// Element supports at least one pattern of the set
    HasPattern(BTreeSet<Pattern>),

    /// Child count comparison: `{ op: Gt, count: 1 }`
    ChildCount { op: CompareOp, count: usize },

    /// Children match the sequence exactly, one condition per child, in order
    Structure(Vec<Condition>),

    And(Box<Condition>, Box<Condition>),

    Or(Box<Condition>, Box<Condition>),

    Not(Box<Condition>),

    /// Inner condition evaluated at node(s) reached through `navigator`
    Relational {
        navigator: Navigator,
        inner: Box<Condition>,
    },
}

/// Tree relation used to re-anchor a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigator {
    /// The parent, if any
    Parent,
    /// Some child
    AnyChild,
    /// Some ancestor, nearest first
    AnyAncestor,
    /// Some descendant, in pre-order
    AnyDescendant,
    /// Some other child of the parent
    AnySibling,
}

impl Navigator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Navigator::Parent => "Parent",
            Navigator::AnyChild => "AnyChild",
            Navigator::AnyAncestor => "AnyAncestor",
            Navigator::AnyDescendant => "AnyDescendant",
            Navigator::AnySibling => "AnySibling",
        }
    }

    /// First node reached from `element` that satisfies `inner`
    fn find<'t>(&self, inner: &Condition, element: Element<'t>) -> Option<Element<'t>> {
        match self {
            Navigator::Parent => element.parent().filter(|p| inner.matches(*p)),
            Navigator::AnyChild => element.children().find(|c| inner.matches(*c)),
            Navigator::AnyAncestor => element.ancestors().find(|a| inner.matches(*a)),
            Navigator::AnyDescendant => element.descendants().find(|d| inner.matches(*d)),
            Navigator::AnySibling => element.siblings().find(|s| inner.matches(*s)),
        }
    }
}

/// Comparison operators for numeric conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn evaluate(&self, left: usize, right: usize) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl std::str::FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" | "=" => Ok(CompareOp::Eq),
            "!=" | "<>" => Ok(CompareOp::Ne),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            _ => Err(format!("Unknown comparison operator: {}", s)),
        }
    }
}

impl Condition {
    pub fn property(id: PropertyId, matcher: Matcher) -> Self {
        Condition::Property { id, matcher }
    }

    pub fn control_type(control_type: ControlType) -> Self {
        Condition::ControlTypeIs(BTreeSet::from([control_type]))
    }

    pub fn control_type_in(types: impl IntoIterator<Item = ControlType>) -> Self {
        Condition::ControlTypeIs(types.into_iter().collect())
    }

    pub fn pattern(pattern: Pattern) -> Self {
        Condition::HasPattern(BTreeSet::from([pattern]))
    }

    pub fn pattern_in(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        Condition::HasPattern(patterns.into_iter().collect())
    }

    pub fn child_count(op: CompareOp, count: usize) -> Self {
        Condition::ChildCount { op, count }
    }

    /// Exact ordered match of the child list
    pub fn structure(children: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Structure(children.into_iter().collect())
    }

    /// Conjunction of all conditions; `Always` when empty
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        conditions
            .into_iter()
            .reduce(|acc, c| acc & c)
            .unwrap_or(Condition::Always)
    }

    /// Disjunction of all conditions; `Never` when empty
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        conditions
            .into_iter()
            .reduce(|acc, c| acc | c)
            .unwrap_or(Condition::Never)
    }

    pub fn relational(navigator: Navigator, inner: Condition) -> Self {
        Condition::Relational {
            navigator,
            inner: Box::new(inner),
        }
    }

    pub fn parent(inner: Condition) -> Self {
        Self::relational(Navigator::Parent, inner)
    }

    pub fn any_child(inner: Condition) -> Self {
        Self::relational(Navigator::AnyChild, inner)
    }

    pub fn any_ancestor(inner: Condition) -> Self {
        Self::relational(Navigator::AnyAncestor, inner)
    }

    pub fn any_descendant(inner: Condition) -> Self {
        Self::relational(Navigator::AnyDescendant, inner)
    }

    pub fn any_sibling(inner: Condition) -> Self {
        Self::relational(Navigator::AnySibling, inner)
    }

    /// No child satisfies `inner` (true for a childless element)
    pub fn no_child(inner: Condition) -> Self {
        !Self::any_child(inner)
    }

    /// Evaluate against an element
    pub fn matches(&self, element: Element<'_>) -> bool {
        match self {
            Condition::Always => true,

            Condition::Never => false,

            Condition::Property { id, matcher } => matcher.matches(element.property(*id)),

            Condition::ControlTypeIs(types) => types.contains(&element.control_type()),

            Condition::HasPattern(patterns) => patterns.iter().any(|p| element.supports(*p)),

            Condition::ChildCount { op, count } => op.evaluate(element.child_count(), *count),

            Condition::Structure(expected) => {
                element.child_count() == expected.len()
                    && element
                        .children()
                        .zip(expected)
                        .all(|(child, c)| c.matches(child))
            }

            Condition::And(left, right) => left.matches(element) && right.matches(element),

            Condition::Or(left, right) => left.matches(element) || right.matches(element),

            Condition::Not(inner) => !inner.matches(element),

            Condition::Relational { navigator, inner } => {
                navigator.find(inner, element).is_some()
            }
        }
    }

    /// The node at which the condition was established, if it holds.
    ///
    /// For a navigator this is the reached node that satisfied the inner
    /// condition; `Or` reports the branch that held, `And` prefers a reached
    /// node from either operand over the element itself, and every other
    /// condition reports the element itself.
    pub fn witness<'t>(&self, element: Element<'t>) -> Option<Element<'t>> {
        match self {
            Condition::And(left, right) => {
                let left = left.witness(element)?;
                let right = right.witness(element)?;
                if right.id() == element.id() {
                    Some(left)
                } else {
                    Some(right)
                }
            }
            Condition::Or(left, right) => left
                .witness(element)
                .or_else(|| right.witness(element)),
            Condition::Relational { navigator, inner } => navigator.find(inner, element),
            _ => self.matches(element).then_some(element),
        }
    }
}

/// Evaluate `condition` at `element`
pub fn evaluate(condition: &Condition, element: Element<'_>) -> bool {
    condition.matches(element)
}

impl std::ops::BitAnd for Condition {
    type Output = Condition;

    fn bitand(self, rhs: Condition) -> Condition {
        Condition::And(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::BitOr for Condition {
    type Output = Condition;

    fn bitor(self, rhs: Condition) -> Condition {
        Condition::Or(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        Condition::Not(Box::new(self))
    }
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("true"),
            Condition::Never => f.write_str("false"),
            Condition::Property { id, matcher } => write!(f, "{} {}", id, matcher),
            Condition::ControlTypeIs(types) if types.len() == 1 => {
                write!(f, "ControlType == {}", join(types))
            }
            Condition::ControlTypeIs(types) => write!(f, "ControlType in [{}]", join(types)),
            Condition::HasPattern(patterns) if patterns.len() == 1 => {
                write!(f, "supports {}", join(patterns))
            }
            Condition::HasPattern(patterns) => write!(f, "supports any of [{}]", join(patterns)),
            Condition::ChildCount { op, count } => {
                write!(f, "ChildCount {} {}", op.symbol(), count)
            }
            Condition::Structure(children) if children.is_empty() => f.write_str("no children"),
            Condition::Structure(children) => write!(f, "Children [{}]", join(children)),
            Condition::And(left, right) => write!(f, "({} && {})", left, right),
            Condition::Or(left, right) => write!(f, "({} || {})", left, right),
            Condition::Not(inner) => write!(f, "!{}", inner),
            Condition::Relational { navigator, inner } => {
                write!(f, "{}({})", navigator.as_str(), inner)
            }
        }
    }
}
