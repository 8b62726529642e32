//! Deciding which templates define their `el` inline.

use crate::consts::{EL_DEFINITION_ATTR, EL_DEFINITION_INLINE};
use crate::container::TemplateContainer;

/// Policy that flags a container as holding an inline `el`.
///
/// Any `Fn(&TemplateContainer) -> bool` closure is a marker as well, so a
/// custom check can be installed without a named type:
///
/// ```
/// use inline_el::{InlineMarker, TemplateContainer};
///
/// let by_type = |c: &TemplateContainer| c.attribute("type") == Some("text/x-inline-template");
/// let container = TemplateContainer::new("script").with_attribute("type", "text/x-inline-template");
/// assert!(by_type.has_inline_el(&container));
/// ```
pub trait InlineMarker: Send + Sync {
    /// Whether the container should be processed for an inline `el`.
    fn has_inline_el(&self, container: &TemplateContainer) -> bool;
}

impl<F> InlineMarker for F
where
    F: Fn(&TemplateContainer) -> bool + Send + Sync,
{
    fn has_inline_el(&self, container: &TemplateContainer) -> bool {
        self(container)
    }
}

/// Marker that compares one attribute against a sentinel value.
///
/// The default checks `data-el-definition="inline"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMarker {
    name: String,
    value: String,
}

impl AttributeMarker {
    /// Create a marker for `name="value"`.
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            value: value.to_owned(),
        }
    }
}

impl Default for AttributeMarker {
    fn default() -> Self {
        Self::new(EL_DEFINITION_ATTR, EL_DEFINITION_INLINE)
    }
}

impl InlineMarker for AttributeMarker {
    fn has_inline_el(&self, container: &TemplateContainer) -> bool {
        container.attribute(&self.name) == Some(self.value.as_str())
    }
}

/// Marker that treats every template as having an inline `el`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTemplates;

impl InlineMarker for AllTemplates {
    fn has_inline_el(&self, _container: &TemplateContainer) -> bool {
        true
    }
}

/// Whether a container was already rewritten in place.
///
/// Checked before any marker: a normalized container is never processed
/// again, whatever the configured marker says.
#[must_use]
pub fn is_already_normalized(container: &TemplateContainer) -> bool {
    container.status().is_normalized()
}
