//! Identity of the content block a modal edits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::page::Element;

/// Data attribute naming a block's locator.
pub const LOCATOR_ATTR: &str = "locator";
/// Data attribute naming a block's category (`html`, `problem`, `vertical`, ...).
pub const CATEGORY_ATTR: &str = "category";
/// Data attribute naming a block's human-readable title.
pub const DISPLAY_NAME_ATTR: &str = "display-name";

/// The `{id, category, display name}` triple identifying a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub id: String,
    pub category: String,
    #[serde(rename = "display-name", alias = "display_name")]
    pub display_name: String,
}

impl BlockDescriptor {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            display_name: display_name.into(),
        }
    }

    /// Build a descriptor from an element's data attributes.
    ///
    /// Returns `None` unless the element carries a locator. Missing category
    /// or display name attributes become empty strings.
    pub fn from_element(element: &Element) -> Option<Self> {
        let id = element.data_str(LOCATOR_ATTR)?;
        Some(Self::new(
            id,
            element.data_str(CATEGORY_ATTR).unwrap_or_default(),
            element.data_str(DISPLAY_NAME_ATTR).unwrap_or_default(),
        ))
    }

    /// Descriptor for the container modal that edits a split test as a
    /// whole, rather than one of its children.
    pub fn split_test(locator: impl Into<String>) -> Self {
        Self::new(locator, "vertical", "A/B Test")
    }

    /// Name to show the user, falling back to the locator.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}

impl fmt::Display for BlockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}: {})", self.label(), self.category, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_element_reads_data_attributes() {
        let element = Element::default()
            .with_data(LOCATOR_ATTR, "block-42")
            .with_data(CATEGORY_ATTR, "html")
            .with_data(DISPLAY_NAME_ATTR, "Intro");

        assert_eq!(
            BlockDescriptor::from_element(&element),
            Some(BlockDescriptor::new("block-42", "html", "Intro"))
        );
    }

    #[test]
    fn test_from_element_requires_locator() {
        let element = Element::default().with_data(CATEGORY_ATTR, "html");
        assert_eq!(BlockDescriptor::from_element(&element), None);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let descriptor = BlockDescriptor::new("b7", "problem", "");
        assert_eq!(descriptor.label(), "b7");
        assert_eq!(descriptor.to_string(), "b7 (problem: b7)");
    }

    #[test]
    fn test_deserialize_accepts_hyphenated_display_name() {
        let descriptor: BlockDescriptor = serde_json::from_str(
            r#"{"id": "v1", "category": "vertical", "display-name": "A/B Test"}"#,
        )
        .unwrap();
        assert_eq!(descriptor, BlockDescriptor::split_test("v1"));
    }
}
