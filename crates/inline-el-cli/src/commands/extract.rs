//! `inline-el extract` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use inline_el::extract;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the extract command.
#[derive(Args)]
pub(crate) struct ExtractArgs {
    /// Template file (default: read from stdin).
    file: Option<PathBuf>,
}

impl ExtractArgs {
    /// Execute the extract command.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be read or has no element
    /// definition.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let text = read_input(self.file.as_deref())?;
        let extraction = extract(&text)?;
        tracing::debug!(tag = %extraction.descriptor.tag_name, "Extracted element");
        Output::new().json(&extraction)
    }
}

/// Read the template from `file`, or from stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    Ok(text)
}
