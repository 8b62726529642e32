//! Template directories as documents.
//!
//! Every file with the template extension becomes a `<script>` container
//! whose id is the file stem. `data-*` attributes in a comment at the start
//! of the file become container attributes, so a file rewritten by
//! [`TemplateSet::write_back`] is recognized as normalized on the next run:
//!
//! ```text
//! <!-- data-el-definition="inline" data-tag-name="li" data-inline-el-status="updated" -->
//! {{name}}
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use inline_el::consts::{DETACHED_CONTAINER_TAG, DETACHED_CONTAINER_TYPE};
use inline_el::{
    ContainerHandle, Document, TemplateContainer, is_valid_id, leading_comment_attributes,
};
use inline_el_config::TemplatesConfig;

use crate::error::CliError;

/// A template file attached to the document.
#[derive(Debug)]
struct TemplateFile {
    path: PathBuf,
    id: String,
    handle: ContainerHandle,
    normalized_on_read: bool,
}

/// Templates read from one directory.
#[derive(Debug)]
pub(crate) struct TemplateSet {
    document: Arc<Document>,
    files: Vec<TemplateFile>,
}

impl TemplateSet {
    /// Read every template file in the configured directory, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or a file cannot be read.
    pub(crate) fn read(templates: &TemplatesConfig) -> Result<Self, CliError> {
        if !templates.dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Template directory not found: {}",
                templates.dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&templates.dir)? {
            let path = entry?.path();
            if path.is_file() && templates.matches(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let document = Arc::new(Document::new());
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
                tracing::warn!(path = %path.display(), "Skipping template with non UTF-8 name");
                continue;
            };
            if !is_valid_id(&id) {
                tracing::warn!(path = %path.display(), "Skipping template whose name is not a valid id");
                continue;
            }
            let text = std::fs::read_to_string(&path)?;
            let container = parse_template_file(&id, &text);
            let normalized_on_read = container.status().is_normalized();
            tracing::debug!(id, normalized = normalized_on_read, "Read template");

            let handle = document.insert(container);
            files.push(TemplateFile {
                path,
                id,
                handle,
                normalized_on_read,
            });
        }

        Ok(Self { document, files })
    }

    /// Document holding the template containers.
    pub(crate) fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// `#id` selector of every template, in path order.
    pub(crate) fn identifiers(&self) -> Vec<String> {
        self.files.iter().map(|f| format!("#{}", f.id)).collect()
    }

    /// Number of template files.
    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }

    /// Write containers normalized since they were read back to their files.
    ///
    /// Returns the paths written.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub(crate) fn write_back(&self) -> Result<Vec<PathBuf>, CliError> {
        let mut written = Vec::new();
        for file in &self.files {
            let container = file.handle.snapshot();
            if file.normalized_on_read || !container.status().is_normalized() {
                continue;
            }
            std::fs::write(&file.path, render_template_file(&container))?;
            tracing::debug!(path = %file.path.display(), "Wrote normalized template");
            written.push(file.path.clone());
        }
        Ok(written)
    }
}

/// Build the container for a template file.
///
/// The leading attribute comment, and one line break after it, are not part
/// of the content.
fn parse_template_file(id: &str, text: &str) -> TemplateContainer {
    let mut container = TemplateContainer::new(DETACHED_CONTAINER_TAG)
        .with_attribute("id", id)
        .with_attribute("type", DETACHED_CONTAINER_TYPE);

    let content = match leading_comment_attributes(text) {
        Some(comment) => {
            for (name, value) in &comment.attributes {
                container.set_attribute(name, value);
            }
            let rest = &text[comment.end..];
            rest.strip_prefix("\r\n")
                .or_else(|| rest.strip_prefix('\n'))
                .unwrap_or(rest)
        }
        None => text,
    };
    container.with_content(content)
}

/// Serialize a container back to template file text.
fn render_template_file(container: &TemplateContainer) -> String {
    let attributes: Vec<String> = container
        .attributes()
        .filter(|(name, _)| name.starts_with("data-"))
        .map(|(name, value)| format!("{name}=\"{}\"", escape_attribute(value)))
        .collect();

    if attributes.is_empty() {
        return container.content().to_owned();
    }
    format!("<!-- {} -->\n{}", attributes.join(" "), container.content())
}

/// Escape a value for a double-quoted attribute inside a comment.
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('>', "&gt;")
}

/// Path of a template relative to `base`, for messages.
pub(crate) fn display_path<'a>(path: &'a Path, base: &Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}
