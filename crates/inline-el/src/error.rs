//! Error types for inline `el` processing.

/// Failure to read an inline element definition out of template text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Neither an element with content nor a self-closing element was found.
    #[error(
        "Failed to parse template with inline `el` definition. No matching content found.\nTemplate text is \"{text}\""
    )]
    NoElement {
        /// Full template text.
        text: String,
    },

    /// The matched tag could not be read back as a single element.
    #[error(
        "Failed to parse template with inline `el` definition. Extracted `el` could not be turned into a sample node ({reason}).\nExtracted `el` definition string is \"{definition}\", full template text is \"{text}\""
    )]
    InvalidElement {
        /// Opening and closing tag text that was matched.
        definition: String,
        /// Full template text.
        text: String,
        /// What went wrong while reading the tag.
        reason: String,
    },
}

/// Error raised at the template loading boundary.
///
/// Every variant names the template identifier so a failure can be traced
/// back to the template that was requested.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template text has no usable inline `el`.
    #[error("{source}\nThe template was requested for template property \"{identifier}\"")]
    Parse {
        /// Template identifier passed to the loader.
        identifier: String,
        /// Underlying parse failure.
        source: ParseError,
    },

    /// In-place updating was requested for a container outside the document.
    #[error(
        "Can't update the template container because it doesn't exist in the document. The template property must be a selector of an attached template (and not, for instance, a raw HTML string). Instead, we got \"{identifier}\""
    )]
    State {
        /// Template identifier passed to the loader.
        identifier: String,
    },
}

impl TemplateError {
    /// Template identifier the failing request was made for.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Parse { identifier, .. } | Self::State { identifier } => identifier,
        }
    }
}
