//! Extraction of an inline `el` from template text.
//!
//! The template text is expected to consist of a single element, optionally
//! surrounded by HTML comments and whitespace:
//!
//! ```text
//! <!-- optional comments -->
//! <section class="card" data-role="item">
//!   {{ content }}
//! </section>
//! ```
//!
//! The split between tag and content is a pattern match, not a tree parse.
//! The content runs from the end of the first opening tag up to the last
//! closing tag in the text. The closing tag is not checked against the
//! opening tag: anything between the outer element and the last closing tag
//! ends up in the content, and text after the last closing tag is dropped.

use std::ops::Range;
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use serde::Serialize;

use crate::descriptor::ElementDescriptor;
use crate::entities::decode_references;
use crate::error::ParseError;

/// A single HTML comment, matched lazily so adjacent comments stay separate.
static COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--[\s\S]*?-->").expect("invalid comment regex"));

/// Opening tag, content, and the last closing tag in the text.
static TAG_WITH_CONTENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(<\s*[a-zA-Z][\s\S]*?>)([\s\S]*)(<\s*/\s*[a-zA-Z]+\s*>)")
        .expect("invalid tag regex")
});

/// A lone tag, with or without the closing slash.
static SELF_CLOSING_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*[a-zA-Z][\s\S]*?/?\s*>").expect("invalid tag regex"));

/// Result of extracting an inline `el` from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Root element definition.
    #[serde(rename = "el")]
    pub descriptor: ElementDescriptor,
    /// Template content inside the root element. Empty for self-closing tags.
    pub content: String,
}

/// Extract the inline `el` and its content from raw template text.
///
/// # Example
///
/// ```
/// use inline_el::extract;
///
/// let extraction = extract(r#"<p class="a" data-x="y">Hello {{name}}</p>"#).unwrap();
/// assert_eq!(extraction.descriptor.tag_name, "p");
/// assert_eq!(extraction.descriptor.class_name.as_deref(), Some("a"));
/// assert_eq!(extraction.descriptor.attributes["data-x"], "y");
/// assert_eq!(extraction.content, "Hello {{name}}");
/// ```
///
/// # Errors
///
/// Returns [`ParseError::NoElement`] if the text contains no tag at all, and
/// [`ParseError::InvalidElement`] if the matched tag is not a well-formed
/// element.
pub fn extract(text: &str) -> Result<Extraction, ParseError> {
    let normalized = strip_outer_comments(text);

    let (opening_tag, definition, content) =
        if let Some(caps) = TAG_WITH_CONTENT_PATTERN.captures(normalized) {
            let opening = caps[1].to_owned();
            let definition = format!("{}{}", &caps[1], &caps[3]);
            (opening, definition, caps[2].to_owned())
        } else if let Some(m) = SELF_CLOSING_TAG_PATTERN.find(normalized) {
            (m.as_str().to_owned(), m.as_str().to_owned(), String::new())
        } else {
            return Err(ParseError::NoElement {
                text: text.to_owned(),
            });
        };

    let descriptor =
        read_element(&opening_tag).map_err(|reason| ParseError::InvalidElement {
            definition,
            text: text.to_owned(),
            reason,
        })?;

    Ok(Extraction {
        descriptor,
        content,
    })
}

/// Remove the run of comments at the start and at the end of the text.
///
/// Only comments separated from the text boundary by whitespace or other
/// boundary comments are removed; everything in between is kept verbatim.
fn strip_outer_comments(text: &str) -> &str {
    let comments: Vec<Range<usize>> = COMMENT_PATTERN
        .find_iter(text)
        .map(|m| m.range())
        .collect();

    let mut start = 0;
    for comment in &comments {
        if !text[start..comment.start].trim().is_empty() {
            break;
        }
        start = comment.end;
    }

    let mut end = text.len();
    for comment in comments.iter().rev() {
        if comment.start < start || !text[comment.end..end].trim().is_empty() {
            break;
        }
        end = comment.start;
    }

    &text[start..end]
}

/// Read a matched opening tag back as an element.
///
/// The tag body is rebuilt without padding or a trailing slash and handed to
/// the XML reader in HTML attribute mode, which accepts unquoted and
/// valueless attributes.
fn read_element(opening_tag: &str) -> Result<ElementDescriptor, String> {
    let body = opening_tag
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>');
    if body.starts_with(char::is_whitespace) {
        return Err("whitespace after '<' does not start a tag".to_owned());
    }
    let body = body.trim_end();

    // A trailing slash closes the tag unless it ends an unquoted value
    let tag = if ends_in_unquoted_value(body) {
        format!("<{body} >")
    } else {
        let body = body.strip_suffix('/').unwrap_or(body).trim_end();
        format!("<{body}>")
    };

    let mut reader = Reader::from_str(&tag);
    match reader.read_event() {
        Ok(Event::Start(start)) => descriptor_from_start(&start),
        Ok(other) => Err(format!("expected an element, found {other:?}")),
        Err(e) => Err(e.to_string()),
    }
}

fn descriptor_from_start(start: &BytesStart<'_>) -> Result<ElementDescriptor, String> {
    let tag_name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_ascii_lowercase();
    if !is_valid_name(&tag_name) {
        return Err(format!("invalid tag name \"{tag_name}\""));
    }

    let mut descriptor = ElementDescriptor::new(&tag_name);
    let mut class_name = None;
    let mut id = None;

    let mut attributes = start.html_attributes();
    attributes.with_checks(false);

    for attr in attributes {
        let attr = attr.map_err(|e| e.to_string())?;
        let name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_ascii_lowercase();
        if !is_valid_attribute_name(&name) {
            return Err(format!("invalid attribute name \"{name}\""));
        }
        let raw_value = std::str::from_utf8(&attr.value).map_err(|e| e.to_string())?;
        let value = decode_references(raw_value);

        // First occurrence wins, as in the DOM
        if name == "class" {
            class_name.get_or_insert(value);
        } else if name == "id" {
            id.get_or_insert(value);
        } else {
            descriptor.attributes.entry(name).or_insert(value);
        }
    }

    if let Some(class_name) = class_name {
        descriptor = descriptor.with_class_name(&class_name);
    }
    if let Some(id) = id {
        descriptor = descriptor.with_id(&id);
    }

    Ok(descriptor)
}

/// Whether the tag body ends inside an unquoted attribute value.
fn ends_in_unquoted_value(body: &str) -> bool {
    let mut quote = None;
    let mut after_equals = false;
    let mut unquoted = false;

    for c in body.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
        } else if unquoted {
            unquoted = !c.is_whitespace();
        } else if after_equals {
            if !c.is_whitespace() {
                after_equals = false;
                if matches!(c, '"' | '\'') {
                    quote = Some(c);
                } else {
                    unquoted = true;
                }
            }
        } else if c == '=' {
            after_equals = true;
        }
    }

    unquoted
}

fn is_valid_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '='))
}
