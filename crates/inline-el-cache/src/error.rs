//! Error types for the template cache.

use inline_el::TemplateError;

/// Error while filling a cache entry.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Loading the template failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The catch-all attribute of a container is not a JSON object.
    #[error("Invalid JSON in `{attribute}` of template \"{identifier}\"")]
    Attributes {
        /// Template identifier the entry was requested for.
        identifier: String,
        /// Attribute holding the JSON.
        attribute: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
