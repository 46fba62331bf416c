//! Element trees for the unit page and rendered block fragments.
//!
//! Both the page the user navigates and the fragments a block renderer
//! returns are plain element trees carrying CSS-like classes and `data-*`
//! attributes. The modal reads its inputs from these attributes: block
//! identity from `locator`/`category`/`display-name`, the settings payload
//! from `metadata`, the requested mode from `mode`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class.push(class.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.iter().any(|c| c == class)
    }

    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// A data attribute as a string. Numbers and booleans are stringified;
    /// objects, arrays and null are not.
    pub fn data_str(&self, key: &str) -> Option<String> {
        match self.data(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Whether a data attribute is present and truthy.
    pub fn data_flag(&self, key: &str) -> bool {
        match self.data(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s != "false",
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }

    /// First element, in document order, carrying `class` (self included).
    pub fn find_class(&self, class: &str) -> Option<&Self> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_class(class))
    }

    /// Every text node in document order, skipping subtrees whose root
    /// carries one of the `skip` classes.
    pub fn text_lines(&self, skip: &[&str]) -> Vec<String> {
        let mut lines = Vec::new();
        self.collect_text(skip, &mut lines);
        lines
    }

    fn collect_text(&self, skip: &[&str], lines: &mut Vec<String>) {
        if skip.iter().any(|class| self.has_class(class)) {
            return;
        }
        if let Some(text) = &self.text {
            lines.extend(text.lines().map(str::to_string));
        }
        for child in &self.children {
            child.collect_text(skip, lines);
        }
    }

    /// Depth-first walk yielding each element with its child-index path.
    pub fn walk(&self) -> Vec<(Vec<usize>, &Self)> {
        let mut out = Vec::new();
        let mut stack = vec![(Vec::new(), self)];
        while let Some((path, element)) = stack.pop() {
            for (i, child) in element.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child_path, child));
            }
            out.push((path, element));
        }
        out
    }
}

/// The element a user action originated from, with its ancestors.
///
/// Resolving a path against a root element captures the chain
/// `[target, parent, ..., root]`, which is what `closest`-style lookups
/// walk.
#[derive(Debug, Clone, Default)]
pub struct Trigger<'a> {
    chain: Vec<&'a Element>,
}

impl<'a> Trigger<'a> {
    /// Resolve a child-index path from `root`. Returns `None` if the path
    /// leaves the tree.
    pub fn at(root: &'a Element, path: &[usize]) -> Option<Self> {
        let mut chain = vec![root];
        let mut current = root;
        for &index in path {
            current = current.children.get(index)?;
            chain.push(current);
        }
        chain.reverse();
        Some(Self { chain })
    }

    /// A trigger with no originating element, e.g. a global shortcut.
    pub const fn detached() -> Self {
        Self { chain: Vec::new() }
    }

    pub fn target(&self) -> Option<&'a Element> {
        self.chain.first().copied()
    }

    pub fn parent(&self) -> Option<&'a Element> {
        self.chain.get(1).copied()
    }

    /// Nearest ancestor-or-self matching `predicate`.
    pub fn closest(&self, predicate: impl Fn(&Element) -> bool) -> Option<&'a Element> {
        self.chain.iter().copied().find(|element| predicate(element))
    }

    /// Nearest ancestor-or-self carrying the `key` data attribute.
    pub fn closest_with_data(&self, key: &str) -> Option<&'a Element> {
        self.closest(|element| element.data.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Element {
        Element::default().with_child(
            Element::default()
                .with_class("studio-xblock-wrapper")
                .with_data("locator", "block-42")
                .with_data("category", "html")
                .with_data("display-name", "Intro")
                .with_child(
                    Element::default()
                        .with_class("header")
                        .with_child(Element::default().with_class("edit-button").with_text("Edit")),
                )
                .with_child(Element::default().with_text("Hello\nWorld")),
        )
    }

    #[test]
    fn test_closest_walks_ancestors_or_self() {
        let root = page();
        let trigger = Trigger::at(&root, &[0, 0, 0]).unwrap();

        assert!(trigger.target().unwrap().has_class("edit-button"));
        assert!(trigger.parent().unwrap().has_class("header"));
        let wrapper = trigger.closest_with_data("locator").unwrap();
        assert_eq!(wrapper.data_str("locator").as_deref(), Some("block-42"));

        let on_wrapper = Trigger::at(&root, &[0]).unwrap();
        assert_eq!(
            on_wrapper.closest_with_data("locator").map(|e| e.has_class("studio-xblock-wrapper")),
            Some(true)
        );
    }

    #[test]
    fn test_invalid_path_and_detached_trigger() {
        let root = page();
        assert!(Trigger::at(&root, &[3]).is_none());
        assert!(Trigger::detached().closest_with_data("locator").is_none());
        assert!(Trigger::detached().target().is_none());
    }

    #[test]
    fn test_text_lines_skip_classes() {
        let root = page();
        assert_eq!(root.text_lines(&[]), vec!["Edit", "Hello", "World"]);
        assert_eq!(root.text_lines(&["header"]), vec!["Hello", "World"]);
    }

    #[test]
    fn test_walk_is_document_order() {
        let root = page();
        let paths: Vec<Vec<usize>> = root.walk().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![vec![], vec![0], vec![0, 0], vec![0, 0, 0], vec![0, 1]]
        );
    }

    #[test]
    fn test_data_conversions() {
        let element = Element::default()
            .with_data("locator", 7)
            .with_data("metadata-editor", true)
            .with_data("off", "false")
            .with_data("metadata", serde_json::json!({"a": 1}));

        assert_eq!(element.data_str("locator").as_deref(), Some("7"));
        assert_eq!(element.data_str("metadata"), None);
        assert!(element.data_flag("metadata-editor"));
        assert!(!element.data_flag("off"));
        assert!(!element.data_flag("missing"));
    }
}
