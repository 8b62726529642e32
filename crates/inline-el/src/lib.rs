//! Inline root element definitions for declarative templates.
//!
//! A template may start with the tag of the element that should become the
//! view's root (`el`), with the template content inside it:
//!
//! ```html
//! <script id="item" type="text/x-template" data-el-definition="inline">
//!   <li class="item" data-id="{{id}}">{{name}}</li>
//! </script>
//! ```
//!
//! This crate extracts the `el` definition and the inner content, and hands
//! both to the template cache as data attributes on a template container.
//!
//! # Architecture
//!
//! - [`extract`]: splits template text into an [`ElementDescriptor`] and content
//! - [`InlineMarker`]: decides which containers are processed
//! - [`ContainerUpdateStrategy`]: writes the result to a detached replacement
//!   ([`DetachedUpdate`]) or back into the source ([`InPlaceUpdate`])
//! - [`InlineTemplate`]: the [`TemplateLoader`] tying the pieces together
//!
//! A container rewritten in place is marked [`TemplateStatus::Normalized`]
//! and never processed again.

pub mod consts;
mod container;
mod descriptor;
mod document;
mod entities;
mod error;
mod extract;
mod loader;
mod marker;
mod update;

pub use container::{
    CommentAttributes, ContainerHandle, TemplateContainer, TemplateStatus,
    leading_comment_attributes,
};
pub use descriptor::ElementDescriptor;
pub use document::{Document, is_valid_id};
pub use error::{ParseError, TemplateError};
pub use extract::{Extraction, extract};
pub use loader::{DocumentLoader, InlineTemplate, LoaderSettings, TemplateLoader, VERSION};
pub use marker::{AllTemplates, AttributeMarker, InlineMarker, is_already_normalized};
pub use update::{ContainerUpdateStrategy, DetachedUpdate, InPlaceUpdate, apply_update};
