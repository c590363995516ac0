//! Remote text checking.
//!
//! This module provides:
//! - `CheckRequest`/`CheckResponse` and the match types the checking service reports
//! - The `TextChecker` trait the server talks to
//! - `LanguageToolClient`, the HTTP implementation of `TextChecker`

mod client;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Fragment;

pub use client::{service_message, LanguageToolClient};

/// What gets sent for checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The raw document text.
    Text(String),
    /// The document split into text and markup fragments.
    Annotated(Vec<Fragment>),
}

/// A single check request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// Language code such as `en-US`, or `auto`.
    pub language: String,
    pub payload: Payload,
    /// Only run rules that are enabled by default.
    pub enabled_only: bool,
}

/// Wire shape of an annotated payload.
#[derive(Debug, Serialize)]
struct AnnotatedText<'a> {
    annotation: &'a [Fragment],
}

impl CheckRequest {
    /// Form fields for the `/v2/check` endpoint.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, CheckError> {
        let mut fields = Vec::with_capacity(3);
        match &self.payload {
            Payload::Text(text) => fields.push(("text", text.clone())),
            Payload::Annotated(fragments) => {
                let data = serde_json::to_string(&AnnotatedText {
                    annotation: fragments,
                })?;
                fields.push(("data", data));
            }
        }
        fields.push(("language", self.language.clone()));
        fields.push(("enabledOnly", self.enabled_only.to_string()));
        Ok(fields)
    }
}

/// Response body of a check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub matches: Vec<Match>,
}

/// A potential issue reported by the checking service.
///
/// `offset` and `length` are in UTF-16 code units of the checked document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub message: String,
    #[serde(default)]
    pub short_message: Option<String>,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    pub rule: Rule,
}

/// A suggested replacement for a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    pub value: String,
}

/// The rule that produced a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Issue category such as `misspelling`, `grammar` or `whitespace`.
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Errors from talking to the checking service.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("could not reach the checking service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Service { status: u16, message: String },
    #[error("could not encode annotated text: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Something that can check text.
#[tower_lsp::async_trait]
pub trait TextChecker: Send + Sync {
    async fn check(&self, request: CheckRequest) -> Result<CheckResponse, CheckError>;
}
