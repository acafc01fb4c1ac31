//! Element model for accessibility trees
//!
//! An [`ElementTree`] is an immutable snapshot of the nodes exposed by the
//! platform accessibility layer. Nodes are stored in an arena in pre-order;
//! each node keeps its parent as an index (a relation, not ownership) and its
//! children as an ordered index list. [`Element`] is a cheap `Copy` handle
//! into the arena used by conditions and rules.

use crate::snapshot::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Declares a closed identifier enum with `as_str`, `Display` and `FromStr`.
/// Serde names are the variant names, identical to `as_str`.
macro_rules! identifier_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every identifier, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .copied()
                    .ok_or_else(|| format!("Unknown {}: {}", stringify!($name), s))
            }
        }
    };
}

identifier_enum! {
    /// Role of an element (UI Automation control type)
    ControlType {
        AppBar,
        Button,
        Calendar,
        CheckBox,
        ComboBox,
        Custom,
        DataGrid,
        DataItem,
        Document,
        Edit,
        Group,
        Header,
        HeaderItem,
        Hyperlink,
        Image,
        List,
        ListItem,
        Menu,
        MenuBar,
        MenuItem,
        Pane,
        ProgressBar,
        RadioButton,
        ScrollBar,
        SemanticZoom,
        Separator,
        Slider,
        Spinner,
        SplitButton,
        Spreadsheet,
        StatusBar,
        Tab,
        TabItem,
        Table,
        Text,
        Thumb,
        TitleBar,
        ToolBar,
        ToolTip,
        Tree,
        TreeItem,
        Window,
    }
}

identifier_enum! {
    /// Interaction pattern an element can support
    Pattern {
        Annotation,
        CustomNavigation,
        Dock,
        Drag,
        DropTarget,
        ExpandCollapse,
        Grid,
        GridItem,
        Invoke,
        ItemContainer,
        LegacyIAccessible,
        MultipleView,
        RangeValue,
        Scroll,
        ScrollItem,
        Selection,
        SelectionItem,
        Spreadsheet,
        SpreadsheetItem,
        Styles,
        SynchronizedInput,
        Table,
        TableItem,
        Text,
        TextChild,
        TextEdit,
        Toggle,
        Transform,
        Value,
        VirtualizedItem,
        Window,
    }
}

identifier_enum! {
    /// Property identifiers an element may carry
    PropertyId {
        AcceleratorKey,
        AccessKey,
        AutomationId,
        ClassName,
        FrameworkId,
        HasKeyboardFocus,
        HeadingLevel,
        HelpText,
        IsContentElement,
        IsControlElement,
        IsEnabled,
        IsKeyboardFocusable,
        IsOffscreen,
        IsPassword,
        IsRequiredForForm,
        ItemStatus,
        ItemType,
        LocalizedControlType,
        Name,
        Orientation,
        ProcessId,
    }
}

/// Typed property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
    /// Enumerated value, written as `{"enum": "Horizontal"}`
    Enum {
        #[serde(rename = "enum")]
        name: String,
    },
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Str(s) => write!(f, "\"{}\"", s),
            PropertyValue::Enum { name } => write!(f, "{}", name),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

/// Opaque element identifier, unique within one tree snapshot
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Nested description of an element and its subtree, as supplied by a tree provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    pub id: ElementId,

    pub control_type: ControlType,

    #[serde(default)]
    pub patterns: BTreeSet<Pattern>,

    #[serde(default)]
    pub properties: BTreeMap<PropertyId, PropertyValue>,

    /// Children in accessibility-tree traversal order
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(id: u64, control_type: ControlType) -> Self {
        Self {
            id: ElementId(id),
            control_type,
            patterns: BTreeSet::new(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.insert(pattern);
        self
    }

    pub fn with_property(mut self, id: PropertyId, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(id, value.into());
        self
    }

    pub fn with_name(self, name: &str) -> Self {
        self.with_property(PropertyId::Name, name)
    }

    pub fn with_child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A node stored in the tree arena
#[derive(Debug, Clone)]
struct ElementNode {
    id: ElementId,
    control_type: ControlType,
    patterns: BTreeSet<Pattern>,
    properties: BTreeMap<PropertyId, PropertyValue>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Immutable snapshot of an accessibility tree
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    /// Nodes in pre-order
    nodes: Vec<ElementNode>,

    /// Element id -> arena position
    index: HashMap<ElementId, usize>,
}

impl ElementTree {
    /// Build a tree from a nested spec. Fails if two elements share an id.
    pub fn from_spec(spec: ElementSpec) -> Result<Self, SnapshotError> {
        let mut tree = Self::default();

        // Children are pushed in reverse so they pop in traversal order.
        let mut stack: Vec<(ElementSpec, Option<usize>)> = vec![(spec, None)];
        while let Some((spec, parent)) = stack.pop() {
            let position = tree.nodes.len();
            if tree.index.insert(spec.id, position).is_some() {
                return Err(SnapshotError::DuplicateElementId(spec.id));
            }
            if let Some(parent) = parent {
                tree.nodes[parent].children.push(position);
            }

            let ElementSpec {
                id,
                control_type,
                patterns,
                properties,
                children,
            } = spec;

            tree.nodes.push(ElementNode {
                id,
                control_type,
                patterns,
                properties,
                parent,
                children: Vec::with_capacity(children.len()),
            });

            for child in children.into_iter().rev() {
                stack.push((child, Some(position)));
            }
        }

        Ok(tree)
    }

    pub fn root(&self) -> Option<Element<'_>> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(Element {
                tree: self,
                index: 0,
            })
        }
    }

    /// Look up an element by id
    pub fn get(&self, id: ElementId) -> Option<Element<'_>> {
        self.index
            .get(&id)
            .map(|&index| Element { tree: self, index })
    }

    /// All elements in pre-order
    pub fn iter(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        (0..self.nodes.len()).map(move |index| Element { tree: self, index })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Handle to one element of an [`ElementTree`]
#[derive(Clone, Copy)]
pub struct Element<'t> {
    tree: &'t ElementTree,
    index: usize,
}

impl<'t> Element<'t> {
    fn node(&self) -> &'t ElementNode {
        &self.tree.nodes[self.index]
    }

    fn at(&self, index: usize) -> Element<'t> {
        Element {
            tree: self.tree,
            index,
        }
    }

    pub fn id(&self) -> ElementId {
        self.node().id
    }

    pub fn control_type(&self) -> ControlType {
        self.node().control_type
    }

    pub fn patterns(&self) -> &'t BTreeSet<Pattern> {
        &self.node().patterns
    }

    pub fn supports(&self, pattern: Pattern) -> bool {
        self.node().patterns.contains(&pattern)
    }

    /// Property value, or `None` when the element does not carry it
    pub fn property(&self, id: PropertyId) -> Option<&'t PropertyValue> {
        self.node().properties.get(&id)
    }

    pub fn properties(&self) -> &'t BTreeMap<PropertyId, PropertyValue> {
        &self.node().properties
    }

    /// The Name property when it is a string
    pub fn name(&self) -> Option<&'t str> {
        self.property(PropertyId::Name).and_then(|v| v.as_str())
    }

    pub fn parent(&self) -> Option<Element<'t>> {
        self.node().parent.map(|index| self.at(index))
    }

    pub fn children(&self) -> Children<'t> {
        Children {
            tree: self.tree,
            inner: self.node().children.iter(),
        }
    }

    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self) -> Ancestors<'t> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Descendants in pre-order, excluding this element
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: self.node().children.iter().rev().copied().collect(),
        }
    }

    /// The parent's other children, in traversal order
    pub fn siblings(&self) -> impl Iterator<Item = Element<'t>> + 't {
        let index = self.index;
        self.parent()
            .into_iter()
            .flat_map(|parent| parent.children())
            .filter(move |sibling| sibling.index != index)
    }

    /// Number of edges between this element and the root
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for Element<'_> {}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id())
            .field("control_type", &self.control_type())
            .finish()
    }
}

impl fmt::Display for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} {} \"{}\"", self.id(), self.control_type(), name),
            None => write!(f, "{} {}", self.id(), self.control_type()),
        }
    }
}

/// Iterator over an element's children
pub struct Children<'t> {
    tree: &'t ElementTree,
    inner: std::slice::Iter<'t, usize>,
}

impl<'t> Iterator for Children<'t> {
    type Item = Element<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|&index| Element {
            tree: self.tree,
            index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator walking parent links up to the root
pub struct Ancestors<'t> {
    next: Option<Element<'t>>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = Element<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// Lazy pre-order walk over a subtree, driven by an explicit stack
pub struct Descendants<'t> {
    tree: &'t ElementTree,
    stack: Vec<usize>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Element<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        self.stack.extend(node.children.iter().rev().copied());
        Some(Element {
            tree: self.tree,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ElementTree {
        let spec = ElementSpec::new(1, ControlType::Window)
            .with_name("Main")
            .with_child(
                ElementSpec::new(2, ControlType::Pane)
                    .with_child(ElementSpec::new(3, ControlType::Button).with_name("OK"))
                    .with_child(ElementSpec::new(4, ControlType::Button).with_name("Cancel")),
            )
            .with_child(ElementSpec::new(5, ControlType::StatusBar));
        ElementTree::from_spec(spec).unwrap()
    }

    fn ids<'t>(elements: impl Iterator<Item = Element<'t>>) -> Vec<u64> {
        elements.map(|e| e.id().0).collect()
    }

    #[test]
    fn test_tree_is_stored_in_pre_order() {
        let tree = sample();
        assert_eq!(tree.len(), 5);
        assert_eq!(ids(tree.iter()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parent_and_children() {
        let tree = sample();
        let pane = tree.get(ElementId(2)).unwrap();

        assert_eq!(pane.parent().unwrap().id(), ElementId(1));
        assert_eq!(ids(pane.children()), vec![3, 4]);
        assert_eq!(pane.child_count(), 2);
        assert!(tree.root().unwrap().parent().is_none());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let tree = sample();
        let ok = tree.get(ElementId(3)).unwrap();

        assert_eq!(ids(ok.ancestors()), vec![2, 1]);
        assert_eq!(ok.depth(), 2);
        assert_eq!(tree.root().unwrap().depth(), 0);
    }

    #[test]
    fn test_descendants_pre_order() {
        let tree = sample();
        let root = tree.root().unwrap();

        assert_eq!(ids(root.descendants()), vec![2, 3, 4, 5]);
        assert_eq!(tree.get(ElementId(5)).unwrap().descendants().count(), 0);
    }

    #[test]
    fn test_siblings_exclude_self() {
        let tree = sample();

        assert_eq!(ids(tree.get(ElementId(3)).unwrap().siblings()), vec![4]);
        assert_eq!(ids(tree.get(ElementId(2)).unwrap().siblings()), vec![5]);
        assert_eq!(tree.root().unwrap().siblings().count(), 0);
    }

    #[test]
    fn test_properties_and_patterns() {
        let spec = ElementSpec::new(1, ControlType::CheckBox)
            .with_name("Remember me")
            .with_property(PropertyId::IsKeyboardFocusable, true)
            .with_pattern(Pattern::Toggle);
        let tree = ElementTree::from_spec(spec).unwrap();
        let check = tree.root().unwrap();

        assert_eq!(check.name(), Some("Remember me"));
        assert_eq!(
            check.property(PropertyId::IsKeyboardFocusable),
            Some(&PropertyValue::Bool(true))
        );
        assert!(check.property(PropertyId::HelpText).is_none());
        assert!(check.supports(Pattern::Toggle));
        assert!(!check.supports(Pattern::Invoke));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let spec = ElementSpec::new(1, ControlType::Window)
            .with_child(ElementSpec::new(2, ControlType::Button))
            .with_child(ElementSpec::new(2, ControlType::Text));

        let err = ElementTree::from_spec(spec).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateElementId(ElementId(2))));
    }

    #[test]
    fn test_identifier_parsing() {
        assert_eq!("checkbox".parse::<ControlType>(), Ok(ControlType::CheckBox));
        assert_eq!("SpreadsheetItem".parse::<Pattern>(), Ok(Pattern::SpreadsheetItem));
        assert_eq!("name".parse::<PropertyId>(), Ok(PropertyId::Name));
        assert!("Widget".parse::<ControlType>().is_err());
        assert_eq!(ControlType::DataItem.to_string(), "DataItem");
    }

    #[test]
    fn test_element_display() {
        let tree = sample();
        assert_eq!(tree.get(ElementId(3)).unwrap().to_string(), "#3 Button \"OK\"");
        assert_eq!(tree.get(ElementId(5)).unwrap().to_string(), "#5 StatusBar");
    }
}
