//! Live document of template containers.
//!
//! The document is the set of containers that selectors can reach. A
//! container is attached by [`Document::insert`] or [`Document::attach`] and
//! stays reachable until [`Document::remove`].

use std::sync::RwLock;

use crate::container::{ContainerHandle, TemplateContainer};

/// Attached template containers, queryable by `#id` selector.
#[derive(Debug, Default)]
pub struct Document {
    containers: RwLock<Vec<ContainerHandle>>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new container and return its handle.
    pub fn insert(&self, container: TemplateContainer) -> ContainerHandle {
        let handle = ContainerHandle::new(container);
        self.attach(handle.clone());
        handle
    }

    /// Attach an existing container. Attaching twice is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn attach(&self, handle: ContainerHandle) {
        let mut containers = self.containers.write().unwrap();
        if !containers.iter().any(|c| c.ptr_eq(&handle)) {
            containers.push(handle);
        }
    }

    /// Detach a container. Returns `false` if it was not attached.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn remove(&self, handle: &ContainerHandle) -> bool {
        let mut containers = self.containers.write().unwrap();
        let before = containers.len();
        containers.retain(|c| !c.ptr_eq(handle));
        containers.len() != before
    }

    /// Whether this exact container is attached.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn contains(&self, handle: &ContainerHandle) -> bool {
        self.containers
            .read()
            .unwrap()
            .iter()
            .any(|c| c.ptr_eq(handle))
    }

    /// Resolve a `#id` selector to the first attached container with that id.
    ///
    /// Returns `None` for anything that is not an id selector, such as raw
    /// template markup.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn resolve(&self, selector: &str) -> Option<ContainerHandle> {
        let id = parse_id_selector(selector)?;

        // Snapshot the handles so no container is locked under the document lock
        let containers = self.containers.read().unwrap().clone();
        containers
            .into_iter()
            .find(|handle| handle.lock().attribute("id") == Some(id))
    }

    /// Number of attached containers.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.read().unwrap().len()
    }

    /// Whether no container is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `id` can be reached through a `#id` selector.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// Extract the id from a `#id` selector.
fn parse_id_selector(selector: &str) -> Option<&str> {
    let id = selector.trim().strip_prefix('#')?;
    is_valid_id(id).then_some(id)
}
