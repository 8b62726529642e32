//! Template loading with inline `el` processing.
//!
//! [`DocumentLoader`] is the plain loader: it resolves an identifier to a
//! container. [`InlineTemplate`] wraps any loader and processes templates
//! that define their `el` inline before handing them to the cache.

use std::sync::{Arc, RwLock};

use crate::container::{ContainerHandle, TemplateContainer};
use crate::document::Document;
use crate::error::TemplateError;
use crate::extract::extract;
use crate::marker::{AttributeMarker, InlineMarker, is_already_normalized};
use crate::update::{DetachedUpdate, InPlaceUpdate, apply_update};

/// Loader version, for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolves a template identifier to a container.
pub trait TemplateLoader: Send + Sync {
    /// Load the container for `identifier`.
    ///
    /// The identifier is either a `#id` selector or raw template markup.
    fn load_template(&self, identifier: &str) -> Result<ContainerHandle, TemplateError>;
}

/// Loader backed by a [`Document`].
///
/// A `#id` selector that resolves yields the attached container. Anything
/// else is treated as raw markup and yields a new detached container, see
/// [`TemplateContainer::from_markup`].
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    document: Arc<Document>,
}

impl DocumentLoader {
    /// Create a loader resolving selectors in `document`.
    #[must_use]
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }

    /// The document selectors are resolved against.
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }
}

impl TemplateLoader for DocumentLoader {
    fn load_template(&self, identifier: &str) -> Result<ContainerHandle, TemplateError> {
        Ok(self
            .document
            .resolve(identifier)
            .unwrap_or_else(|| ContainerHandle::new(TemplateContainer::from_markup(identifier))))
    }
}

/// Settings read by [`InlineTemplate`] on every load.
#[derive(Clone)]
pub struct LoaderSettings {
    /// Which containers hold an inline `el`.
    pub marker: Arc<dyn InlineMarker>,
    /// Rewrite attached containers in place instead of producing detached
    /// replacements.
    pub update_template_source: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            marker: Arc::new(AttributeMarker::default()),
            update_template_source: false,
        }
    }
}

impl std::fmt::Debug for LoaderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderSettings")
            .field("update_template_source", &self.update_template_source)
            .finish_non_exhaustive()
    }
}

/// Loader that extracts inline `el` definitions.
///
/// Wraps a base loader. For every container the base loader returns:
///
/// 1. A normalized container, or one the marker does not flag, is returned
///    unchanged.
/// 2. Otherwise the container text is run through [`extract`].
/// 3. The extraction is written to a detached replacement, or into the
///    container itself when `update_template_source` is enabled.
///
/// Settings can be changed at any time and apply from the next load.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use inline_el::{Document, DocumentLoader, InlineTemplate, TemplateContainer, TemplateLoader};
///
/// let document = Arc::new(Document::new());
/// document.insert(
///     TemplateContainer::new("script")
///         .with_attribute("id", "item")
///         .with_attribute("data-el-definition", "inline")
///         .with_content(r#"<li class="item">{{name}}</li>"#),
/// );
///
/// let loader = InlineTemplate::new(DocumentLoader::new(Arc::clone(&document)), document);
/// let container = loader.load_template("#item").unwrap().snapshot();
/// assert_eq!(container.attribute("data-tag-name"), Some("li"));
/// assert_eq!(container.attribute("data-class-name"), Some("item"));
/// assert_eq!(container.content(), "{{name}}");
/// ```
pub struct InlineTemplate<L> {
    base: L,
    document: Arc<Document>,
    settings: RwLock<LoaderSettings>,
}

impl<L: TemplateLoader> InlineTemplate<L> {
    /// Wrap `base`, checking in-place updates against `document`.
    #[must_use]
    pub fn new(base: L, document: Arc<Document>) -> Self {
        Self::with_settings(base, document, LoaderSettings::default())
    }

    /// Wrap `base` with explicit settings.
    #[must_use]
    pub fn with_settings(base: L, document: Arc<Document>, settings: LoaderSettings) -> Self {
        Self {
            base,
            document,
            settings: RwLock::new(settings),
        }
    }

    /// Current settings.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn settings(&self) -> LoaderSettings {
        self.settings.read().unwrap().clone()
    }

    /// Replace the marker. The previous marker is discarded, not combined.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn set_marker(&self, marker: impl InlineMarker + 'static) {
        self.settings.write().unwrap().marker = Arc::new(marker);
    }

    /// Restore the default `data-el-definition="inline"` marker.
    pub fn reset_marker(&self) {
        self.set_marker(AttributeMarker::default());
    }

    /// Enable or disable rewriting attached containers in place.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn set_update_template_source(&self, enabled: bool) {
        self.settings.write().unwrap().update_template_source = enabled;
    }

    /// Whether attached containers are rewritten in place.
    #[must_use]
    pub fn update_template_source(&self) -> bool {
        self.settings().update_template_source
    }

    /// The wrapped loader.
    #[must_use]
    pub fn base(&self) -> &L {
        &self.base
    }
}

impl<L: TemplateLoader> TemplateLoader for InlineTemplate<L> {
    fn load_template(&self, identifier: &str) -> Result<ContainerHandle, TemplateError> {
        let settings = self.settings();
        let handle = self.base.load_template(identifier)?;

        let text = {
            let container = handle.lock();
            if is_already_normalized(&container) {
                tracing::debug!(identifier, "Template already normalized, skipping");
                return Ok(handle.clone());
            }
            if !settings.marker.has_inline_el(&container) {
                tracing::debug!(identifier, "Template has no inline el marker, skipping");
                return Ok(handle.clone());
            }
            container.content().to_owned()
        };

        let extraction = extract(&text).map_err(|source| TemplateError::Parse {
            identifier: identifier.to_owned(),
            source,
        })?;
        tracing::debug!(
            identifier,
            tag = %extraction.descriptor.tag_name,
            content_len = extraction.content.len(),
            "Extracted inline el"
        );

        if settings.update_template_source {
            let result = apply_update(
                &InPlaceUpdate::new(&self.document),
                &handle,
                &extraction,
                identifier,
            )?;
            tracing::debug!(identifier, "Updated template source in place");
            Ok(result)
        } else {
            apply_update(&DetachedUpdate, &handle, &extraction, identifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::TemplateStatus;
    use crate::marker::AllTemplates;
    use crate::error::ParseError;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r#"<p class="fooClass barClass" id="fooId" lang="fr" contenteditable="true">Hello {{name}}</p>"#;

    fn setup(
        marker_attrs: &[(&str, &str)],
        content: &str,
    ) -> (Arc<Document>, InlineTemplate<DocumentLoader>) {
        let document = Arc::new(Document::new());
        let mut container = TemplateContainer::new("script")
            .with_attribute("id", "tpl")
            .with_attribute("type", "text/x-template");
        for (name, value) in marker_attrs {
            container.set_attribute(name, value);
        }
        container.set_content(content);
        document.insert(container);

        let loader = InlineTemplate::new(
            DocumentLoader::new(Arc::clone(&document)),
            Arc::clone(&document),
        );
        (document, loader)
    }

    fn expected_attributes() -> Vec<(&'static str, &'static str)> {
        vec![
            ("data-tag-name", "p"),
            ("data-class-name", "fooClass barClass"),
            ("data-id", "fooId"),
            ("data-attributes", r#"{"contenteditable":"true","lang":"fr"}"#),
        ]
    }

    #[test]
    fn test_document_loader_resolves_selector() {
        let (document, _) = setup(&[], TEMPLATE);
        let loader = DocumentLoader::new(Arc::clone(&document));

        let handle = loader.load_template("#tpl").unwrap();
        assert!(document.contains(&handle));
        assert_eq!(handle.snapshot().content(), TEMPLATE);
    }

    #[test]
    fn test_document_loader_wraps_raw_markup() {
        let document = Arc::new(Document::new());
        let loader = DocumentLoader::new(Arc::clone(&document));

        let handle = loader.load_template("<p>raw</p>").unwrap();
        assert!(!document.contains(&handle));
        assert_eq!(handle.snapshot().content(), "<p>raw</p>");
    }

    #[test]
    fn test_detached_mode_leaves_source_untouched() {
        let (document, loader) = setup(&[("data-el-definition", "inline")], TEMPLATE);
        let source = document.resolve("#tpl").unwrap();
        let before = source.snapshot();

        let result = loader.load_template("#tpl").unwrap();

        assert!(!result.ptr_eq(&source));
        assert_eq!(source.snapshot(), before);

        let replacement = result.snapshot();
        let attributes: Vec<_> = replacement.attributes().skip(1).collect();
        assert_eq!(attributes, expected_attributes());
        assert_eq!(replacement.content(), "Hello {{name}}");
    }

    #[test]
    fn test_in_place_mode_rewrites_source() {
        let (document, loader) = setup(&[("data-el-definition", "inline")], TEMPLATE);
        loader.set_update_template_source(true);
        let source = document.resolve("#tpl").unwrap();

        let result = loader.load_template("#tpl").unwrap();

        assert!(result.ptr_eq(&source));
        let container = source.snapshot();
        assert_eq!(container.content(), "Hello {{name}}");
        assert_eq!(container.status(), TemplateStatus::Normalized);
        for (name, value) in expected_attributes() {
            assert_eq!(container.attribute(name), Some(value), "attribute {name}");
        }
        assert_eq!(container.attribute("id"), Some("tpl"));
        assert_eq!(container.attribute("data-el-definition"), Some("inline"));
    }

    #[test]
    fn test_in_place_mode_is_idempotent() {
        let (document, loader) = setup(&[("data-el-definition", "inline")], TEMPLATE);
        loader.set_update_template_source(true);
        let source = document.resolve("#tpl").unwrap();

        let first = loader.load_template("#tpl").unwrap();
        let after_first = source.snapshot();
        let second = loader.load_template("#tpl").unwrap();

        assert!(first.ptr_eq(&second));
        assert!(second.ptr_eq(&source));
        assert_eq!(source.snapshot(), after_first);
    }

    #[test]
    fn test_normalized_container_skips_custom_marker() {
        let (document, loader) = setup(&[("data-el-definition", "inline")], TEMPLATE);
        loader.set_update_template_source(true);
        loader.load_template("#tpl").unwrap();
        let after_first = document.resolve("#tpl").unwrap().snapshot();

        loader.set_marker(AllTemplates);
        loader.set_update_template_source(false);
        let result = loader.load_template("#tpl").unwrap();

        assert_eq!(result.snapshot(), after_first);
    }

    #[test]
    fn test_in_place_mode_rejects_raw_markup() {
        let document = Arc::new(Document::new());
        let loader = InlineTemplate::new(DocumentLoader::new(Arc::clone(&document)), document);
        loader.set_marker(AllTemplates);
        loader.set_update_template_source(true);

        let err = loader.load_template(TEMPLATE).unwrap_err();
        assert!(matches!(err, TemplateError::State { .. }));
        assert!(err.to_string().contains(TEMPLATE));
    }

    #[test]
    fn test_in_place_mode_rejects_detached_container() {
        let (document, _) = setup(&[("data-el-definition", "inline")], TEMPLATE);
        let source = document.resolve("#tpl").unwrap();
        document.remove(&source);
        let before = source.snapshot();

        let inner = InlineTemplate::new(FixedLoader(source.clone()), Arc::clone(&document));
        inner.set_update_template_source(true);
        let err = inner.load_template("#tpl").unwrap_err();

        assert!(matches!(err, TemplateError::State { .. }));
        assert_eq!(source.snapshot(), before);
    }

    #[test]
    fn test_unmarked_template_is_returned_unchanged() {
        let (document, loader) = setup(&[], TEMPLATE);
        let source = document.resolve("#tpl").unwrap();
        let before = source.snapshot();

        let result = loader.load_template("#tpl").unwrap();

        assert!(result.ptr_eq(&source));
        assert_eq!(result.snapshot(), before);
        assert_eq!(before.attribute("data-tag-name"), None);
    }

    #[test]
    fn test_custom_marker_replaces_default() {
        let (_, loader) = setup(&[("data-el-definition", "inline")], TEMPLATE);
        loader.set_marker(|c: &TemplateContainer| c.attribute("type") == Some("text/x-inline-template"));

        let result = loader.load_template("#tpl").unwrap();
        assert_eq!(result.snapshot().content(), TEMPLATE);

        loader.reset_marker();
        let result = loader.load_template("#tpl").unwrap();
        assert_eq!(result.snapshot().content(), "Hello {{name}}");
    }

    #[test]
    fn test_raw_markup_with_marker_comment() {
        let document = Arc::new(Document::new());
        let loader = InlineTemplate::new(DocumentLoader::new(Arc::clone(&document)), document);
        let markup = format!("<!-- data-el-definition=\"inline\" -->{TEMPLATE}");

        let result = loader.load_template(&markup).unwrap().snapshot();

        assert_eq!(result.attribute("data-tag-name"), Some("p"));
        assert_eq!(result.content(), "Hello {{name}}");
    }

    #[test]
    fn test_raw_markup_cannot_claim_normalized_status() {
        let document = Arc::new(Document::new());
        let loader = InlineTemplate::new(DocumentLoader::new(Arc::clone(&document)), document);
        loader.set_marker(AllTemplates);

        let result = loader
            .load_template(r#"<!-- data-inline-el-status="updated" --><p class="a">Hello</p>"#)
            .unwrap()
            .snapshot();

        assert_eq!(result.attribute("data-tag-name"), Some("p"));
        assert_eq!(result.attribute("data-class-name"), Some("a"));
        assert_eq!(result.content(), "Hello");
    }

    #[test]
    fn test_concurrent_in_place_loads_write_once() {
        let (document, loader) =
            setup(&[("data-el-definition", "inline")], r#"<p class="a"><b>x</b></p>"#);
        loader.set_update_template_source(true);
        let source = document.resolve("#tpl").unwrap();
        let loader = Arc::new(loader);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let loader = Arc::clone(&loader);
                std::thread::spawn(move || loader.load_template("#tpl").unwrap())
            })
            .collect();
        let results: Vec<ContainerHandle> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        for result in &results {
            assert!(result.ptr_eq(&source));
        }
        let container = source.snapshot();
        assert_eq!(container.content(), "<b>x</b>");
        assert_eq!(container.attribute("data-class-name"), Some("a"));
        assert_eq!(container.status(), TemplateStatus::Normalized);
    }

    #[test]
    fn test_parse_error_names_identifier() {
        let (_, loader) = setup(&[("data-el-definition", "inline")], "no element here");

        let err = loader.load_template("#tpl").unwrap_err();

        match err {
            TemplateError::Parse { identifier, source } => {
                assert_eq!(identifier, "#tpl");
                assert!(matches!(source, ParseError::NoElement { .. }));
            }
            TemplateError::State { .. } => panic!("expected parse error"),
        }
    }

    #[test]
    fn test_parse_error_leaves_container_unchanged() {
        let (document, loader) = setup(&[("data-el-definition", "inline")], "<p class=\"x>y</p>");
        loader.set_update_template_source(true);
        let source = document.resolve("#tpl").unwrap();
        let before = source.snapshot();

        assert!(loader.load_template("#tpl").is_err());
        assert_eq!(source.snapshot(), before);
    }

    #[test]
    fn test_settings_debug_and_defaults() {
        let settings = LoaderSettings::default();
        assert!(!settings.update_template_source);
        assert!(format!("{settings:?}").contains("update_template_source: false"));
        assert!(!VERSION.is_empty());
    }

    struct FixedLoader(ContainerHandle);

    impl TemplateLoader for FixedLoader {
        fn load_template(&self, _identifier: &str) -> Result<ContainerHandle, TemplateError> {
            Ok(self.0.clone())
        }
    }
}
