//! Document state management for spellsp.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use crate::lsp::Finding;
use crate::registry::ContentMode;

use super::text::LineIndex;

/// State for a single open document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// The full document text.
    pub source: String,
    /// Pre-computed line index for position conversion.
    pub line_index: LineIndex,
    /// Document version from the client.
    pub version: i32,
    /// How the document is checked, or `None` if it isn't.
    pub mode: Option<ContentMode>,
    /// Findings of the latest completed check of this version.
    pub findings: Vec<Finding>,
}

impl DocumentState {
    pub fn new(source: String, version: i32, mode: Option<ContentMode>) -> Self {
        let line_index = LineIndex::new(&source);
        Self {
            source,
            line_index,
            version,
            mode,
            findings: Vec::new(),
        }
    }

    /// Copy of this state carrying new findings.
    pub fn with_findings(&self, findings: Vec<Finding>) -> Self {
        Self {
            findings,
            ..self.clone()
        }
    }
}

/// Thread-safe storage for open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentState>>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open or update a document with the given source text.
    pub fn open(
        &self,
        uri: Url,
        source: String,
        version: i32,
        mode: Option<ContentMode>,
    ) -> Arc<DocumentState> {
        let state = Arc::new(DocumentState::new(source, version, mode));
        self.documents.insert(uri, Arc::clone(&state));
        state
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Get a document's state.
    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }

    /// Store check findings for `version` of a document.
    ///
    /// Returns the updated state, or `None` if the document was closed or has
    /// moved on to a newer version in the meantime.
    pub fn update_findings(
        &self,
        uri: &Url,
        version: i32,
        findings: Vec<Finding>,
    ) -> Option<Arc<DocumentState>> {
        let mut entry = self.documents.get_mut(uri)?;
        if entry.version != version {
            return None;
        }
        let updated = Arc::new(entry.with_findings(findings));
        *entry = Arc::clone(&updated);
        Some(updated)
    }
}

/// Guess a document's mimetype from its LSP language id, then its file extension.
pub fn mimetype_for(language_id: Option<&str>, uri: &Url) -> Option<&'static str> {
    let by_language = language_id.and_then(|id| match id {
        "plaintext" | "text" => Some("text/plain"),
        "html" => Some("text/html"),
        "xhtml" => Some("application/xhtml+xml"),
        "xml" | "xsl" | "svg" => Some("application/xml"),
        "markdown" => Some("text/markdown"),
        "restructuredtext" => Some("text/x-rst"),
        "latex" | "tex" => Some("text/x-tex"),
        "git-commit" => Some("text/plain"),
        _ => None,
    });
    if by_language.is_some() {
        return by_language;
    }

    let extension = uri.path().rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "txt" | "text" => Some("text/plain"),
        "html" | "htm" => Some("text/html"),
        "xhtml" => Some("application/xhtml+xml"),
        "xml" | "xsl" | "svg" => Some("application/xml"),
        "md" | "markdown" => Some("text/markdown"),
        "rst" => Some("text/x-rst"),
        "tex" => Some("text/x-tex"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Match;
    use tower_lsp::lsp_types::{Position, Range};

    fn url(path: &str) -> Url {
        Url::parse(&format!("file://{path}")).unwrap()
    }

    fn finding() -> Finding {
        Finding {
            range: Range::new(Position::new(0, 0), Position::new(0, 4)),
            issue: Match {
                offset: 0,
                length: 4,
                ..Match::default()
            },
        }
    }

    #[test]
    fn open_builds_line_index() {
        let store = DocumentStore::new();
        let state = store.open(url("/a.txt"), "a\nb".to_string(), 1, Some(ContentMode::Plain));
        assert_eq!(state.line_index.line_count(), 2);
        assert!(state.findings.is_empty());
        assert_eq!(store.get(&url("/a.txt")).unwrap().version, 1);
    }

    #[test]
    fn findings_stored_for_current_version() {
        let store = DocumentStore::new();
        store.open(url("/a.txt"), "Helo".to_string(), 3, Some(ContentMode::Plain));
        let updated = store.update_findings(&url("/a.txt"), 3, vec![finding()]).unwrap();
        assert_eq!(updated.findings.len(), 1);
        assert_eq!(store.get(&url("/a.txt")).unwrap().findings.len(), 1);
    }

    #[test]
    fn stale_findings_are_discarded() {
        let store = DocumentStore::new();
        store.open(url("/a.txt"), "Helo".to_string(), 3, Some(ContentMode::Plain));
        store.open(url("/a.txt"), "Hello".to_string(), 4, Some(ContentMode::Plain));
        assert!(store.update_findings(&url("/a.txt"), 3, vec![finding()]).is_none());
        assert!(store.get(&url("/a.txt")).unwrap().findings.is_empty());
    }

    #[test]
    fn findings_for_closed_document_are_discarded() {
        let store = DocumentStore::new();
        store.open(url("/a.txt"), "Helo".to_string(), 1, None);
        store.close(&url("/a.txt"));
        assert!(store.update_findings(&url("/a.txt"), 1, vec![finding()]).is_none());
    }

    #[test]
    fn mimetype_from_language_id() {
        assert_eq!(mimetype_for(Some("html"), &url("/x")), Some("text/html"));
        assert_eq!(mimetype_for(Some("plaintext"), &url("/x")), Some("text/plain"));
    }

    #[test]
    fn mimetype_from_extension() {
        assert_eq!(mimetype_for(None, &url("/site/index.HTM")), Some("text/html"));
        assert_eq!(mimetype_for(Some("unknown"), &url("/doc.xml")), Some("application/xml"));
        assert_eq!(mimetype_for(Some("rust"), &url("/main.rs")), None);
        assert_eq!(mimetype_for(None, &url("/README")), None);
    }
}
