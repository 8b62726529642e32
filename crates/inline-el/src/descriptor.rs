//! Root element descriptor and its data attribute encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{ATTRIBUTES_ATTR, CLASS_NAME_ATTR, DEFAULT_TAG_NAME, ID_ATTR, TAG_NAME_ATTR};

/// Parsed definition of a view's root element.
///
/// `tag_name` is always lower case. `class_name` and `id` hold the raw
/// values as written (trimmed), `attributes` every other attribute. Empty
/// attribute values are kept, so boolean attributes such as `hidden` map
/// to `""`.
///
/// # Example
///
/// ```
/// use inline_el::ElementDescriptor;
///
/// let el = ElementDescriptor::new("section").with_class_name("card wide");
/// let encoded = el.data_attributes();
/// assert_eq!(encoded[0], ("data-tag-name", "section".to_owned()));
/// assert_eq!(encoded[1], ("data-class-name", "card wide".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    /// Lower-case tag name.
    pub tag_name: String,
    /// Class list as written, not split into tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Element id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// All other attributes, excluding `class` and `id`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Default for ElementDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_NAME)
    }
}

impl ElementDescriptor {
    /// Create a descriptor for a bare element.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            class_name: None,
            id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the class list. An empty or blank value clears it.
    #[must_use]
    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.class_name = non_empty(class_name);
        self
    }

    /// Set the id. An empty or blank value clears it.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = non_empty(id);
        self
    }

    /// Add a catch-all attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Whether the tag is the framework default (`div`).
    #[must_use]
    pub fn has_default_tag(&self) -> bool {
        self.tag_name == DEFAULT_TAG_NAME
    }

    /// Encode the descriptor as data attributes, in a fixed order.
    ///
    /// The tag name is omitted when it is the default tag, class and id when
    /// absent, and the JSON catch-all when there are no other attributes.
    #[must_use]
    pub fn data_attributes(&self) -> Vec<(&'static str, String)> {
        let mut encoded = Vec::with_capacity(4);

        if !self.has_default_tag() {
            encoded.push((TAG_NAME_ATTR, self.tag_name.clone()));
        }
        if let Some(class_name) = &self.class_name {
            encoded.push((CLASS_NAME_ATTR, class_name.clone()));
        }
        if let Some(id) = &self.id {
            encoded.push((ID_ATTR, id.clone()));
        }
        if !self.attributes.is_empty() {
            encoded.push((ATTRIBUTES_ATTR, self.attributes_json()));
        }

        encoded
    }

    /// Catch-all attributes as a JSON object string.
    #[must_use]
    pub fn attributes_json(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
            .collect();
        serde_json::Value::Object(object).to_string()
    }
}

/// Trim a raw attribute value, mapping blank values to `None`.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
