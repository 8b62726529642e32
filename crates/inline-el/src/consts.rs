//! Attribute names and sentinel values shared by the loader and the cache.

/// Tag used for a view root when no tag is configured.
pub const DEFAULT_TAG_NAME: &str = "div";

/// Attribute carrying the root element tag name.
pub const TAG_NAME_ATTR: &str = "data-tag-name";

/// Attribute carrying the raw class list of the root element.
pub const CLASS_NAME_ATTR: &str = "data-class-name";

/// Attribute carrying the id of the root element.
pub const ID_ATTR: &str = "data-id";

/// Attribute carrying every other root element attribute as a JSON object.
pub const ATTRIBUTES_ATTR: &str = "data-attributes";

/// Marker attribute checked by the default inline marker.
pub const EL_DEFINITION_ATTR: &str = "data-el-definition";

/// Value of [`EL_DEFINITION_ATTR`] that flags an inline `el`.
pub const EL_DEFINITION_INLINE: &str = "inline";

/// Internal attribute recording that a container was rewritten in place.
pub const STATUS_ATTR: &str = "data-inline-el-status";

/// Value of [`STATUS_ATTR`] once a container is normalized.
pub const STATUS_UPDATED: &str = "updated";

/// Tag of containers created outside the document.
pub const DETACHED_CONTAINER_TAG: &str = "script";

/// `type` attribute of containers created outside the document.
pub const DETACHED_CONTAINER_TYPE: &str = "text/x-template";
