//! Writing an extraction back to a template container.
//!
//! Two strategies implement [`ContainerUpdateStrategy`]:
//!
//! - [`DetachedUpdate`]: builds a new container and leaves the source alone
//! - [`InPlaceUpdate`]: rewrites an attached container and marks it normalized
//!
//! Both are driven through [`apply_update`], which holds the container lock
//! across the normalized check and the write.

use crate::container::{ContainerHandle, TemplateContainer};
use crate::document::Document;
use crate::error::TemplateError;
use crate::extract::Extraction;

/// Way of making an extraction visible to the template cache.
pub trait ContainerUpdateStrategy: Send + Sync {
    /// Apply the extraction and return the container the cache should use.
    ///
    /// Called by [`apply_update`] with the container locked and known to be
    /// unprocessed.
    fn update(
        &self,
        handle: &ContainerHandle,
        container: &mut TemplateContainer,
        extraction: &Extraction,
        identifier: &str,
    ) -> Result<ContainerHandle, TemplateError>;
}

/// Produce a new detached container, never touching the source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedUpdate;

impl ContainerUpdateStrategy for DetachedUpdate {
    fn update(
        &self,
        _handle: &ContainerHandle,
        _container: &mut TemplateContainer,
        extraction: &Extraction,
        _identifier: &str,
    ) -> Result<ContainerHandle, TemplateError> {
        let mut replacement = TemplateContainer::detached();
        replacement.write_descriptor(&extraction.descriptor);
        replacement.set_content(&extraction.content);
        Ok(ContainerHandle::new(replacement))
    }
}

/// Rewrite the source container, which must be attached to `document`.
#[derive(Debug, Clone, Copy)]
pub struct InPlaceUpdate<'a> {
    document: &'a Document,
}

impl<'a> InPlaceUpdate<'a> {
    /// Create an in-place strategy checking attachment against `document`.
    #[must_use]
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }
}

impl ContainerUpdateStrategy for InPlaceUpdate<'_> {
    fn update(
        &self,
        handle: &ContainerHandle,
        container: &mut TemplateContainer,
        extraction: &Extraction,
        identifier: &str,
    ) -> Result<ContainerHandle, TemplateError> {
        if !self.document.contains(handle) {
            return Err(TemplateError::State {
                identifier: identifier.to_owned(),
            });
        }

        container.write_descriptor(&extraction.descriptor);
        container.set_content(&extraction.content);
        container.mark_normalized();
        Ok(handle.clone())
    }
}

/// Apply `strategy` to the container unless it is already normalized.
///
/// A normalized container is returned as-is. The check and the write happen
/// under one lock, so concurrent loads of the same container write once.
///
/// # Errors
///
/// Propagates the strategy's error; the container is left unchanged.
pub fn apply_update(
    strategy: &dyn ContainerUpdateStrategy,
    handle: &ContainerHandle,
    extraction: &Extraction,
    identifier: &str,
) -> Result<ContainerHandle, TemplateError> {
    let mut container = handle.lock();
    if container.status().is_normalized() {
        return Ok(handle.clone());
    }
    strategy.update(handle, &mut container, extraction, identifier)
}
