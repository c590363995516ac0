//! Settings infrastructure for spellsp.
//!
//! This module provides support for loading and parsing `spellsp.toml` files
//! to configure the checking service, debounce delay, finding filters and the
//! content handlers used for each mimetype.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::checker::{CheckError, LanguageToolClient};
use crate::registry::{EditorDescriptor, EditorRegistry};

/// Name of the settings file searched for in the workspace.
pub const SETTINGS_FILE_NAME: &str = "spellsp.toml";

/// Root settings structure loaded from `spellsp.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub check: CheckSettings,
    #[serde(default)]
    pub editors: EditorSettings,
}

/// Settings for talking to the checking service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    /// Check endpoint, e.g. `http://localhost:8081/v2/check`.
    pub url: String,

    /// Language code, or `auto` to let the service detect it.
    pub language: String,

    /// Debounce delay after an edit. Values below 250 are raised to 250.
    pub delay_ms: u64,

    /// Only run rules that are enabled by default.
    pub enabled_only: bool,

    /// Timeout for a single check request.
    pub timeout_secs: u64,

    /// Issue types that are never reported.
    pub ignored_issue_types: Vec<String>,

    /// Maximum number of replacement quick fixes offered per finding.
    pub max_suggestions: usize,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            url: "https://api.languagetool.org/v2/check".to_string(),
            language: "auto".to_string(),
            delay_ms: 500,
            enabled_only: false,
            timeout_secs: 30,
            ignored_issue_types: vec!["whitespace".to_string()],
            max_suggestions: 5,
        }
    }
}

impl CheckSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Content handler selection.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Handler names to prefer, in order.
    pub preferred: Vec<String>,

    /// Handler names never to use.
    pub forbidden: Vec<String>,

    /// Extra handlers registered after the built-ins.
    pub custom: Vec<EditorDescriptor>,
}

/// Load settings from a `spellsp.toml` file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse settings");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Find the `spellsp.toml` that governs a workspace.
///
/// The nearest file at or above `start_dir` wins, so a checkout nested in a
/// larger project picks up the project's checker URL and language. Failing
/// that, a file in an immediate child of `start_dir` is used; this covers
/// editors opened on a parent folder of the prose project. The first child
/// found in directory order wins.
///
/// Returns the settings together with the directory holding the file, or
/// `(Settings::default(), start_dir)` when none exists. A file that fails to
/// parse yields the defaults (see [`load_settings`]).
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let enclosing = start_dir
        .ancestors()
        .find(|dir| dir.join(SETTINGS_FILE_NAME).is_file())
        .map(Path::to_path_buf);
    let found = enclosing.or_else(|| {
        std::fs::read_dir(start_dir)
            .ok()?
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
            .map(|entry| entry.path())
            .find(|dir| dir.join(SETTINGS_FILE_NAME).is_file())
    });

    match found {
        Some(dir) => (load_settings(&dir.join(SETTINGS_FILE_NAME)), dir),
        None => (Settings::default(), start_dir.to_path_buf()),
    }
}

/// Build the content handler registry: built-ins plus any custom handlers.
pub fn build_registry(settings: &Settings) -> EditorRegistry {
    let mut registry = EditorRegistry::with_builtins();
    for descriptor in &settings.editors.custom {
        registry.register(descriptor.clone());
    }
    registry
}

/// Build the HTTP checker for the configured endpoint.
pub fn build_checker(settings: &CheckSettings) -> Result<LanguageToolClient, CheckError> {
    LanguageToolClient::new(settings.url.clone(), settings.timeout())
}
