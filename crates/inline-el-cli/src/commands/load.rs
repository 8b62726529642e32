//! `inline-el load` command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use inline_el::{
    AllTemplates, AttributeMarker, DocumentLoader, ElementDescriptor, InlineMarker,
    InlineTemplate, LoaderSettings,
};
use inline_el_cache::{CachedTemplate, TemplateCache};
use inline_el_config::{CliSettings, Config, MarkerMode};
use serde::Serialize;

use crate::error::CliError;
use crate::output::Output;
use crate::templates::{TemplateSet, display_path};

/// Arguments for the load command.
#[derive(Args)]
pub(crate) struct LoadArgs {
    /// Template identifiers, `#id` or raw markup (default: every template file).
    identifiers: Vec<String>,

    /// Path to configuration file (default: auto-discover inline-el.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(short, long, env = "INLINE_EL_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Rewrite template containers in place.
    #[arg(long)]
    update_source: bool,

    /// Treat every template as defining its root element inline.
    #[arg(long)]
    all: bool,

    /// Write templates rewritten in place back to their files.
    #[arg(long)]
    write: bool,

    /// Enable verbose output (debug logging).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// One cache entry as printed.
#[derive(Serialize)]
struct LoadedTemplate<'a> {
    #[serde(flatten)]
    template: &'a CachedTemplate,
    el: ElementDescriptor,
}

/// Result of loading a template directory.
#[derive(Debug)]
struct LoadReport {
    entries: BTreeMap<String, Arc<CachedTemplate>>,
    written: Vec<PathBuf>,
    write_skipped: bool,
}

impl LoadArgs {
    /// Execute the load command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading templates or loading any
    /// identifier fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            templates_dir: self.templates.clone(),
            update_template_source: self.update_source.then_some(true),
            process_all: self.all.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        output.info(&format!(
            "Loading templates from {}...",
            config.templates_resolved.dir.display()
        ));

        let report = self.run(&config)?;

        let printed: BTreeMap<&str, LoadedTemplate<'_>> = report
            .entries
            .iter()
            .map(|(identifier, entry)| {
                (
                    identifier.as_str(),
                    LoadedTemplate {
                        template: entry,
                        el: entry.root_element(),
                    },
                )
            })
            .collect();
        output.json(&printed)?;

        if report.write_skipped {
            output.warning("--write has no effect without in-place updates (--update-source)");
        }
        for path in &report.written {
            output.info(&format!(
                "  -> wrote {}",
                display_path(path, &config.templates_resolved.dir).display()
            ));
        }
        output.success(&format!("Loaded {} template(s)", report.entries.len()));
        Ok(())
    }

    /// Load every requested identifier through the cache.
    fn run(&self, config: &Config) -> Result<LoadReport, CliError> {
        let set = TemplateSet::read(&config.templates_resolved)?;
        tracing::debug!(count = set.len(), "Read template directory");

        let document = Arc::clone(set.document());
        let loader = InlineTemplate::with_settings(
            DocumentLoader::new(Arc::clone(&document)),
            document,
            loader_settings(config),
        );
        let cache = TemplateCache::new(Arc::new(loader));

        let identifiers = if self.identifiers.is_empty() {
            set.identifiers()
        } else {
            self.identifiers.clone()
        };

        let mut entries = BTreeMap::new();
        for identifier in identifiers {
            if let Some(entry) = cache.get(&identifier)? {
                entries.insert(identifier, entry);
            }
        }

        let update_source = config.loader.update_template_source;
        let written = if self.write && update_source {
            set.write_back()?
        } else {
            Vec::new()
        };

        Ok(LoadReport {
            entries,
            written,
            write_skipped: self.write && !update_source,
        })
    }
}

/// Loader settings for the configured marker and update mode.
fn loader_settings(config: &Config) -> LoaderSettings {
    let marker: Arc<dyn InlineMarker> = match config.marker.mode {
        MarkerMode::Attribute => Arc::new(AttributeMarker::new(
            &config.marker.attribute,
            &config.marker.value,
        )),
        MarkerMode::All => Arc::new(AllTemplates),
    };
    LoaderSettings {
        marker,
        update_template_source: config.loader.update_template_source,
    }
}
