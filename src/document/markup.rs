//! Markup-aware splitting of SGML-like documents into checkable text and markup.
//!
//! The checking service accepts "annotated text": a list of fragments where
//! only `text` fragments are spell/grammar checked while `markup` fragments
//! are carried along so reported offsets still line up with the document.

use serde::Serialize;

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// A contiguous run of a document, tagged as checkable text or markup.
///
/// Serializes as `{"text": "..."}` or `{"markup": "..."}`, the shape the
/// checking service expects inside its `annotation` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fragment {
    Text(String),
    Markup(String),
}

impl Fragment {
    pub fn content(&self) -> &str {
        match self {
            Fragment::Text(content) | Fragment::Markup(content) => content,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Fragment::Text(_))
    }
}

/// Split `source` into text and markup fragments.
///
/// Tags and comments become markup. CDATA delimiters are markup but the
/// payload between them is text. Newlines inside text fragments are replaced
/// by spaces; markup is kept verbatim. A tag, comment or CDATA section without
/// its closer runs to the end of the input as one markup fragment.
pub fn annotate(source: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let Some(tag_start) = rest.find('<') else {
            push_text(&mut fragments, rest);
            break;
        };
        push_text(&mut fragments, &rest[..tag_start]);

        let tag = &rest[tag_start..];
        let consumed = if let Some(after_open) = tag.strip_prefix(CDATA_OPEN) {
            match after_open.find(CDATA_CLOSE) {
                Some(payload_end) => {
                    fragments.push(Fragment::Markup(CDATA_OPEN.to_string()));
                    push_text(&mut fragments, &after_open[..payload_end]);
                    fragments.push(Fragment::Markup(CDATA_CLOSE.to_string()));
                    CDATA_OPEN.len() + payload_end + CDATA_CLOSE.len()
                }
                None => push_markup(&mut fragments, tag),
            }
        } else if tag.starts_with(COMMENT_OPEN) {
            let end = tag[COMMENT_OPEN.len()..]
                .find(COMMENT_CLOSE)
                .map_or(tag.len(), |i| COMMENT_OPEN.len() + i + COMMENT_CLOSE.len());
            push_markup(&mut fragments, &tag[..end])
        } else {
            let end = tag.find('>').map_or(tag.len(), |i| i + 1);
            push_markup(&mut fragments, &tag[..end])
        };

        pos += tag_start + consumed;
    }

    fragments
}

/// Concatenate fragment contents back into one string.
pub fn flatten(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::content).collect()
}

fn push_text(fragments: &mut Vec<Fragment>, text: &str) {
    if !text.is_empty() {
        fragments.push(Fragment::Text(text.replace('\n', " ")));
    }
}

/// Push a markup fragment and return how many bytes it covered.
fn push_markup(fragments: &mut Vec<Fragment>, markup: &str) -> usize {
    fragments.push(Fragment::Markup(markup.to_string()));
    markup.len()
}
