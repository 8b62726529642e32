//! Cached template entries.

use std::collections::BTreeMap;

use inline_el::consts::{ATTRIBUTES_ATTR, CLASS_NAME_ATTR, DEFAULT_TAG_NAME, ID_ATTR, TAG_NAME_ATTR};
use inline_el::{ElementDescriptor, TemplateContainer};
use serde::Serialize;

use crate::error::CacheError;

/// Template data read off a loaded container.
///
/// The element fields are `None` when the container does not define them;
/// the view then falls back to its own root element settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTemplate {
    /// Template source handed to the template engine.
    pub html: String,
    /// Root element tag name.
    pub tag_name: Option<String>,
    /// Root element class list.
    pub class_name: Option<String>,
    /// Root element id.
    pub id: Option<String>,
    /// Other root element attributes.
    pub attributes: Option<BTreeMap<String, String>>,
}

impl CachedTemplate {
    /// Read the data attribute encoding and content of a container.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Attributes`] if the catch-all attribute is not a
    /// JSON object.
    pub fn from_container(
        container: &TemplateContainer,
        identifier: &str,
    ) -> Result<Self, CacheError> {
        let read = |name: &str| {
            container
                .attribute(name)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };

        let attributes = match container.attribute(ATTRIBUTES_ATTR) {
            Some(json) => Some(parse_attributes(json).map_err(|source| {
                CacheError::Attributes {
                    identifier: identifier.to_owned(),
                    attribute: ATTRIBUTES_ATTR,
                    source,
                }
            })?),
            None => None,
        };

        Ok(Self {
            html: container.content().to_owned(),
            tag_name: read(TAG_NAME_ATTR),
            class_name: read(CLASS_NAME_ATTR),
            id: read(ID_ATTR),
            attributes,
        })
    }

    /// Whether the entry defines any part of the root element.
    #[must_use]
    pub fn has_el_definition(&self) -> bool {
        self.tag_name.is_some()
            || self.class_name.is_some()
            || self.id.is_some()
            || self.attributes.is_some()
    }

    /// Root element for a view using this template.
    #[must_use]
    pub fn root_element(&self) -> ElementDescriptor {
        let mut el = ElementDescriptor::new(self.tag_name.as_deref().unwrap_or(DEFAULT_TAG_NAME));
        el.class_name.clone_from(&self.class_name);
        el.id.clone_from(&self.id);
        if let Some(attributes) = &self.attributes {
            el.attributes.clone_from(attributes);
        }
        el
    }
}

/// Parse the JSON catch-all attribute. Non-string values are stringified.
fn parse_attributes(json: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect())
}
