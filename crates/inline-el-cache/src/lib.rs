//! Template cache for inline-el templates.
//!
//! [`TemplateCache`] sits in front of a [`TemplateLoader`] and keeps one
//! [`CachedTemplate`] per identifier. The loader runs once per identifier
//! until the entry is evicted with [`TemplateCache::remove`] or
//! [`TemplateCache::clear`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use inline_el::{Document, DocumentLoader, InlineTemplate, TemplateContainer};
//! use inline_el_cache::TemplateCache;
//!
//! let document = Arc::new(Document::new());
//! document.insert(
//!     TemplateContainer::new("script")
//!         .with_attribute("id", "item")
//!         .with_attribute("data-el-definition", "inline")
//!         .with_content(r#"<li class="item">{{name}}</li>"#),
//! );
//! let loader = InlineTemplate::new(DocumentLoader::new(Arc::clone(&document)), document);
//!
//! let cache = TemplateCache::new(Arc::new(loader));
//! let entry = cache.get("#item").unwrap().unwrap();
//! assert_eq!(entry.tag_name.as_deref(), Some("li"));
//! assert_eq!(entry.html, "{{name}}");
//! ```

mod entry;
mod error;

pub use entry::CachedTemplate;
pub use error::CacheError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use inline_el::TemplateLoader;

/// Identifier-keyed cache of loaded templates.
pub struct TemplateCache {
    loader: Arc<dyn TemplateLoader>,
    entries: Mutex<HashMap<String, Arc<CachedTemplate>>>,
}

impl TemplateCache {
    /// Create an empty cache filled through `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get the entry for `identifier`, loading it on a miss.
    ///
    /// An empty identifier yields `Ok(None)` without calling the loader.
    /// Repeated hits return the same `Arc`. Failed loads are not cached.
    ///
    /// The loader runs without the cache lock held. If two threads miss on
    /// the same identifier, the first inserted entry wins.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Template`] if the loader fails, or
    /// [`CacheError::Attributes`] if the loaded container carries malformed
    /// attribute JSON.
    ///
    /// # Panics
    ///
    /// Panics if the internal `Mutex` is poisoned.
    pub fn get(&self, identifier: &str) -> Result<Option<Arc<CachedTemplate>>, CacheError> {
        if identifier.is_empty() {
            return Ok(None);
        }

        if let Some(entry) = self.entries.lock().unwrap().get(identifier) {
            tracing::debug!(identifier, "Template cache hit");
            return Ok(Some(Arc::clone(entry)));
        }

        let handle = self.loader.load_template(identifier)?;
        let entry = CachedTemplate::from_container(&handle.lock(), identifier)?;
        tracing::debug!(
            identifier,
            has_el = entry.has_el_definition(),
            "Template cached"
        );

        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .entry(identifier.to_owned())
            .or_insert_with(|| Arc::new(entry));
        Ok(Some(Arc::clone(entry)))
    }

    /// Evict one entry. Returns `true` if it was cached.
    ///
    /// # Panics
    ///
    /// Panics if the internal `Mutex` is poisoned.
    pub fn remove(&self, identifier: &str) -> bool {
        self.entries.lock().unwrap().remove(identifier).is_some()
    }

    /// Evict every entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal `Mutex` is poisoned.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap();
        tracing::debug!(count = entries.len(), "Clearing template cache");
        entries.clear();
    }

    /// Number of cached entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal `Mutex` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use inline_el::{
        ContainerHandle, Document, DocumentLoader, InlineTemplate, TemplateContainer,
        TemplateError,
    };
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str =
        r#"<p class="fooClass barClass" id="fooId" lang="fr">Hello {{name}}</p>"#;

    /// Loader wrapper counting calls into the base loader.
    struct Counting<L> {
        inner: L,
        calls: AtomicUsize,
    }

    impl<L: TemplateLoader> TemplateLoader for Counting<L> {
        fn load_template(&self, identifier: &str) -> Result<ContainerHandle, TemplateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.load_template(identifier)
        }
    }

    fn document(marked: bool) -> Arc<Document> {
        let document = Arc::new(Document::new());
        let mut container = TemplateContainer::new("script")
            .with_attribute("id", "tpl")
            .with_content(TEMPLATE);
        if marked {
            container.set_attribute("data-el-definition", "inline");
        }
        document.insert(container);
        document
    }

    fn inline_loader(document: &Arc<Document>) -> InlineTemplate<DocumentLoader> {
        InlineTemplate::new(
            DocumentLoader::new(Arc::clone(document)),
            Arc::clone(document),
        )
    }

    #[test]
    fn test_hit_returns_same_entry() {
        let document = document(true);
        let loader = Arc::new(Counting {
            inner: inline_loader(&document),
            calls: AtomicUsize::new(0),
        });
        let cache = TemplateCache::new(Arc::clone(&loader) as Arc<dyn TemplateLoader>);

        let first = cache.get("#tpl").unwrap().unwrap();
        let second = cache.get("#tpl").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_from_inline_template() {
        let document = document(true);
        let cache = TemplateCache::new(Arc::new(inline_loader(&document)));

        let entry = cache.get("#tpl").unwrap().unwrap();

        assert_eq!(entry.html, "Hello {{name}}");
        assert_eq!(entry.tag_name.as_deref(), Some("p"));
        assert_eq!(entry.class_name.as_deref(), Some("fooClass barClass"));
        assert_eq!(entry.id.as_deref(), Some("fooId"));
        assert_eq!(entry.attributes.as_ref().unwrap()["lang"], "fr");
    }

    #[test]
    fn test_clear_reloads_identical_entry_from_normalized_source() {
        let document = document(true);
        let loader = inline_loader(&document);
        loader.set_update_template_source(true);
        let cache = TemplateCache::new(Arc::new(loader));

        let first = cache.get("#tpl").unwrap().unwrap();
        let source_after_first = document.resolve("#tpl").unwrap().snapshot();

        cache.clear();
        assert!(cache.is_empty());
        let second = cache.get("#tpl").unwrap().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(document.resolve("#tpl").unwrap().snapshot(), source_after_first);
    }

    #[test]
    fn test_empty_identifier_skips_loader() {
        let loader = Arc::new(Counting {
            inner: inline_loader(&document(true)),
            calls: AtomicUsize::new(0),
        });
        let cache = TemplateCache::new(Arc::clone(&loader) as Arc<dyn TemplateLoader>);

        assert!(cache.get("").unwrap().is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unmarked_template_has_no_el() {
        let document = document(false);
        let cache = TemplateCache::new(Arc::new(inline_loader(&document)));

        let entry = cache.get("#tpl").unwrap().unwrap();

        assert_eq!(entry.html, TEMPLATE);
        assert!(!entry.has_el_definition());
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let document = Arc::new(Document::new());
        document.insert(
            TemplateContainer::new("script")
                .with_attribute("id", "bad")
                .with_attribute("data-el-definition", "inline")
                .with_content("no element"),
        );
        let cache = TemplateCache::new(Arc::new(inline_loader(&document)));

        let err = cache.get("#bad").unwrap_err();

        assert!(matches!(err, CacheError::Template(TemplateError::Parse { .. })));
        assert!(err.to_string().contains("#bad"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove() {
        let cache = TemplateCache::new(Arc::new(inline_loader(&document(true))));
        cache.get("#tpl").unwrap();

        assert!(cache.remove("#tpl"));
        assert!(!cache.remove("#tpl"));
        assert!(format!("{cache:?}").contains("len: 0"));
    }
}
