//! Registry of content handlers keyed by mimetype.
//!
//! Each handler decides how a document of a given mimetype is sent for
//! checking. Several handlers may claim the same mimetype; `resolve` picks one
//! by explicit preference, then priority, then name.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Deserialize;

/// How a document's content is submitted for checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Send the raw text.
    Plain,
    /// Split into text and markup fragments first.
    Markup,
}

/// A registered content handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditorDescriptor {
    pub name: String,
    pub mimetypes: Vec<String>,
    /// Lower values win. Handlers without a priority rank after all that have one.
    #[serde(default)]
    pub priority: Option<i32>,
    pub mode: ContentMode,
}

#[derive(Debug, Clone, Default)]
pub struct EditorRegistry {
    by_mimetype: HashMap<String, Vec<EditorDescriptor>>,
}

impl EditorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in plain-text and markup handlers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(EditorDescriptor {
            name: "plain-text".to_string(),
            mimetypes: vec!["text/plain".to_string()],
            priority: None,
            mode: ContentMode::Plain,
        });
        registry.register(EditorDescriptor {
            name: "markup".to_string(),
            mimetypes: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
                "application/xml".to_string(),
                "text/xml".to_string(),
            ],
            priority: Some(100),
            mode: ContentMode::Markup,
        });
        registry
    }

    /// Register a handler for each of its mimetypes.
    ///
    /// Returns `false` and registers nothing if the name or mimetype list is empty.
    pub fn register(&mut self, descriptor: EditorDescriptor) -> bool {
        if descriptor.name.is_empty() || descriptor.mimetypes.is_empty() {
            tracing::warn!(name = %descriptor.name, "ignoring incomplete editor descriptor");
            return false;
        }

        for mimetype in &descriptor.mimetypes {
            self.by_mimetype
                .entry(mimetype.clone())
                .or_default()
                .push(descriptor.clone());
        }
        true
    }

    /// Pick the best handler for `mimetype`.
    ///
    /// Handlers named in `forbidden` are skipped. Handlers named in `preferred`
    /// rank first, in list order.
    pub fn resolve(
        &self,
        mimetype: &str,
        preferred: &[String],
        forbidden: &[String],
    ) -> Option<&EditorDescriptor> {
        self.by_mimetype
            .get(mimetype)?
            .iter()
            .filter(|d| !forbidden.contains(&d.name))
            .min_by(|a, b| compare(a, b, preferred))
    }

    /// Content mode for `mimetype`.
    ///
    /// Unclaimed `text/*` mimetypes are checked as plain text; anything else
    /// unclaimed is not checked at all.
    pub fn mode_for(
        &self,
        mimetype: &str,
        preferred: &[String],
        forbidden: &[String],
    ) -> Option<ContentMode> {
        match self.resolve(mimetype, preferred, forbidden) {
            Some(descriptor) => Some(descriptor.mode),
            None if mimetype.starts_with("text/") => Some(ContentMode::Plain),
            None => None,
        }
    }
}

fn compare(a: &EditorDescriptor, b: &EditorDescriptor, preferred: &[String]) -> Ordering {
    let preference = |d: &EditorDescriptor| {
        preferred
            .iter()
            .position(|name| *name == d.name)
            .unwrap_or(usize::MAX)
    };
    // (0, p) sorts before (1, 0): any priority beats none.
    let priority = |d: &EditorDescriptor| d.priority.map_or((1, 0), |p| (0, p));

    preference(a)
        .cmp(&preference(b))
        .then_with(|| priority(a).cmp(&priority(b)))
        .then_with(|| a.name.cmp(&b.name))
}
