//! CLI command implementations.

pub(crate) mod extract;
pub(crate) mod load;

pub(crate) use extract::ExtractArgs;
pub(crate) use load::LoadArgs;
