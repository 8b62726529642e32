//! Character reference decoding for attribute values.
//!
//! Attribute values read from an `el` tag are decoded the way a browser
//! would: numeric references and every HTML5 named reference become their
//! characters. Unknown references and bare ampersands stay as written.

use std::sync::LazyLock;

use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

/// Named, decimal and hexadecimal character references.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);")
        .expect("invalid reference regex")
});

/// Decode character references in an attribute value.
pub(crate) fn decode_references(value: &str) -> String {
    if !value.contains('&') {
        return value.to_owned();
    }

    REFERENCE_PATTERN
        .replace_all(value, |caps: &Captures| {
            decode_reference(&caps[1]).unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

fn decode_reference(reference: &str) -> Option<String> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => numeric.parse::<u32>().ok(),
        };
        return code.and_then(char::from_u32).map(String::from);
    }

    resolve_html5_entity(reference).map(String::from)
}
