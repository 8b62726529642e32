//! Template containers and their processing status.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use regex::Regex;

use crate::consts::{
    DETACHED_CONTAINER_TAG, DETACHED_CONTAINER_TYPE, STATUS_ATTR, STATUS_UPDATED,
};
use crate::descriptor::ElementDescriptor;
use crate::entities::decode_references;

/// Comment at the very start of a template, e.g. `<!-- data-el-definition="inline" -->`.
static LEADING_COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<!--([\s\S]*?)-->").expect("invalid comment regex"));

/// `data-*` attribute inside a leading comment, single or double quoted.
static DATA_ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(data-[a-zA-Z0-9_.:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("invalid data attribute regex")
});

/// Processing state of a container.
///
/// The transition `Unprocessed -> Normalized` happens at most once and is
/// never reversed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemplateStatus {
    /// The container still holds its original template.
    #[default]
    Unprocessed,
    /// The inline `el` was extracted and written back into the container.
    Normalized,
}

impl TemplateStatus {
    /// Whether the container was already rewritten.
    #[must_use]
    pub fn is_normalized(self) -> bool {
        self == Self::Normalized
    }
}

/// A template node: tag, attributes and text content.
///
/// Attribute names are unique and keep their insertion order. Setting the
/// internal status attribute to its sentinel value moves the container to
/// [`TemplateStatus::Normalized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContainer {
    tag: String,
    attributes: Vec<(String, String)>,
    content: String,
    status: TemplateStatus,
}

impl TemplateContainer {
    /// Create an empty container with the given tag.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            content: String::new(),
            status: TemplateStatus::Unprocessed,
        }
    }

    /// Create an empty `<script type="text/x-template">` container.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(DETACHED_CONTAINER_TAG).with_attribute("type", DETACHED_CONTAINER_TYPE)
    }

    /// Create a detached container for raw template markup.
    ///
    /// The markup becomes the content as-is. `data-*` attributes written
    /// inside a comment at the very start of the markup are copied onto the
    /// container, so raw markup can carry markers. The status attribute is
    /// not copied: only an in-place update normalizes a container.
    ///
    /// ```
    /// use inline_el::TemplateContainer;
    ///
    /// let container = TemplateContainer::from_markup(r#"<!-- data-el-definition="inline" --><p></p>"#);
    /// assert_eq!(container.attribute("data-el-definition"), Some("inline"));
    /// assert!(container.content().starts_with("<!--"));
    /// ```
    #[must_use]
    pub fn from_markup(markup: &str) -> Self {
        let mut container = Self::detached().with_content(markup);
        if let Some(comment) = leading_comment_attributes(markup) {
            for (name, value) in comment.attributes {
                if name != STATUS_ATTR {
                    container.set_attribute(&name, &value);
                }
            }
        }
        container
    }

    /// Builder variant of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder variant of [`set_content`](Self::set_content).
    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.set_content(content);
        self
    }

    /// Tag name of the container.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Value of an attribute, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == STATUS_ATTR && value == STATUS_UPDATED {
            self.status = TemplateStatus::Normalized;
        }
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => self.attributes.push((name, value.to_owned())),
        }
    }

    /// Text content of the container.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the text content.
    pub fn set_content(&mut self, content: &str) {
        content.clone_into(&mut self.content);
    }

    /// Current processing status.
    #[must_use]
    pub fn status(&self) -> TemplateStatus {
        self.status
    }

    /// Write the data attribute encoding of a root element onto the container.
    ///
    /// Existing attributes other than the encoded ones are left alone.
    pub fn write_descriptor(&mut self, descriptor: &ElementDescriptor) {
        for (name, value) in descriptor.data_attributes() {
            self.set_attribute(name, &value);
        }
    }

    /// Flag the container as normalized, permanently.
    pub(crate) fn mark_normalized(&mut self) {
        self.set_attribute(STATUS_ATTR, STATUS_UPDATED);
    }
}

/// Shared, lockable reference to a [`TemplateContainer`].
///
/// Clones refer to the same container; [`ptr_eq`](Self::ptr_eq) compares
/// identity.
#[derive(Debug, Clone)]
pub struct ContainerHandle(Arc<Mutex<TemplateContainer>>);

impl ContainerHandle {
    /// Wrap a container in a new handle.
    #[must_use]
    pub fn new(container: TemplateContainer) -> Self {
        Self(Arc::new(Mutex::new(container)))
    }

    /// Lock the container for reading or mutation.
    ///
    /// # Panics
    ///
    /// Panics if the internal `Mutex` is poisoned.
    pub fn lock(&self) -> MutexGuard<'_, TemplateContainer> {
        self.0.lock().unwrap()
    }

    /// Copy of the current container state.
    ///
    /// # Panics
    ///
    /// Panics if the internal `Mutex` is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> TemplateContainer {
        self.lock().clone()
    }

    /// Whether both handles refer to the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<TemplateContainer> for ContainerHandle {
    fn from(container: TemplateContainer) -> Self {
        Self::new(container)
    }
}

/// `data-*` attributes declared in a comment at the start of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAttributes {
    /// Attributes in declaration order, values decoded.
    pub attributes: Vec<(String, String)>,
    /// Byte offset just past the comment.
    pub end: usize,
}

/// Read `data-*` attributes from a comment at the very start of `markup`.
///
/// Returns `None` if the markup does not start with a comment or the
/// comment declares no `data-*` attributes.
#[must_use]
pub fn leading_comment_attributes(markup: &str) -> Option<CommentAttributes> {
    let caps = LEADING_COMMENT_PATTERN.captures(markup)?;
    let body = caps.get(1)?.as_str();

    let attributes: Vec<(String, String)> = DATA_ATTRIBUTE_PATTERN
        .captures_iter(body)
        .map(|attr| {
            let value = attr.get(2).or_else(|| attr.get(3)).map_or("", |m| m.as_str());
            (attr[1].to_ascii_lowercase(), decode_references(value))
        })
        .collect();

    if attributes.is_empty() {
        return None;
    }

    Some(CommentAttributes {
        attributes,
        end: caps.get(0)?.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detached_container() {
        let container = TemplateContainer::detached();
        assert_eq!(container.tag(), "script");
        assert_eq!(container.attribute("type"), Some("text/x-template"));
        assert_eq!(container.content(), "");
        assert_eq!(container.status(), TemplateStatus::Unprocessed);
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut container = TemplateContainer::new("template")
            .with_attribute("id", "a")
            .with_attribute("lang", "fr");
        container.set_attribute("ID", "b");

        let attributes: Vec<_> = container.attributes().collect();
        assert_eq!(attributes, vec![("id", "b"), ("lang", "fr")]);
    }

    #[test]
    fn test_status_attribute_normalizes() {
        let container =
            TemplateContainer::new("script").with_attribute("data-inline-el-status", "updated");
        assert!(container.status().is_normalized());
    }

    #[test]
    fn test_other_status_value_does_not_normalize() {
        let container =
            TemplateContainer::new("script").with_attribute("data-inline-el-status", "pending");
        assert_eq!(container.status(), TemplateStatus::Unprocessed);
    }

    #[test]
    fn test_mark_normalized_sets_attribute() {
        let mut container = TemplateContainer::new("script");
        container.mark_normalized();
        assert_eq!(container.status(), TemplateStatus::Normalized);
        assert_eq!(container.attribute("data-inline-el-status"), Some("updated"));
    }

    #[test]
    fn test_write_descriptor_keeps_other_attributes() {
        let mut container = TemplateContainer::new("script")
            .with_attribute("id", "tpl")
            .with_attribute("data-el-definition", "inline");
        container.write_descriptor(
            &ElementDescriptor::new("p")
                .with_id("fooId")
                .with_attribute("lang", "fr"),
        );

        let attributes: Vec<_> = container.attributes().collect();
        assert_eq!(
            attributes,
            vec![
                ("id", "tpl"),
                ("data-el-definition", "inline"),
                ("data-tag-name", "p"),
                ("data-id", "fooId"),
                ("data-attributes", r#"{"lang":"fr"}"#),
            ]
        );
    }

    #[test]
    fn test_handle_identity() {
        let a = ContainerHandle::new(TemplateContainer::detached());
        let b = a.clone();
        let c = ContainerHandle::new(TemplateContainer::detached());
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));

        b.lock().set_content("shared");
        assert_eq!(a.snapshot().content(), "shared");
    }

    #[test]
    fn test_leading_comment_attributes() {
        let markup = "  <!-- data-el-definition=\"inline\" data-tag-name='li' -->\n<p></p>";
        let comment = leading_comment_attributes(markup).unwrap();
        assert_eq!(
            comment.attributes,
            vec![
                ("data-el-definition".to_owned(), "inline".to_owned()),
                ("data-tag-name".to_owned(), "li".to_owned()),
            ]
        );
        assert_eq!(&markup[comment.end..], "\n<p></p>");
    }

    #[test]
    fn test_leading_comment_decodes_values() {
        let comment =
            leading_comment_attributes(r#"<!-- data-attributes="{&quot;lang&quot;:&quot;fr&quot;}" -->"#)
                .unwrap();
        assert_eq!(comment.attributes[0].1, r#"{"lang":"fr"}"#);
    }

    #[test]
    fn test_plain_comment_has_no_attributes() {
        assert_eq!(leading_comment_attributes("<!-- just a note --><p></p>"), None);
        assert_eq!(leading_comment_attributes("<p><!-- data-x=\"y\" --></p>"), None);
    }

    #[test]
    fn test_from_markup_reads_marker() {
        let markup = "<!-- data-el-definition=\"inline\" --><p>x</p>";
        let container = TemplateContainer::from_markup(markup);
        assert_eq!(container.attribute("data-el-definition"), Some("inline"));
        assert_eq!(container.content(), markup);
    }

    #[test]
    fn test_from_markup_ignores_status_attribute() {
        let container = TemplateContainer::from_markup(
            r#"<!-- data-inline-el-status="updated" data-el-definition="inline" --><p class="a">Hello</p>"#,
        );
        assert_eq!(container.attribute("data-inline-el-status"), None);
        assert_eq!(container.attribute("data-el-definition"), Some("inline"));
        assert_eq!(container.status(), TemplateStatus::Unprocessed);
    }

    #[test]
    fn test_from_markup_without_comment() {
        let container = TemplateContainer::from_markup("<p>x</p>");
        assert_eq!(container.attribute("data-el-definition"), None);
        assert_eq!(container.attribute("type"), Some("text/x-template"));
    }
}
