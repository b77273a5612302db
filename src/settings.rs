//! Settings read with the `config` crate, and the logging bootstrap.
//!
//! Sources are layered: built-in defaults, then an optional settings file
//! (any format `config` recognizes by extension), then environment variables
//! prefixed with `TABLEWALK_`, nested keys separated by `__`, e.g.
//! `TABLEWALK_LOG_FILTER=debug` or `TABLEWALK_LETTER_CASE__TABLE=strict`.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::construct::LetterCase;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// A `tracing_subscriber` filter directive; `RUST_LOG` takes precedence.
    pub log_filter: String,
    pub letter_case: LetterCase,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            letter_case: LetterCase::default(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("TABLEWALK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }
}

/// Installs the global `fmt` subscriber. Calling it again is harmless.
pub fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
