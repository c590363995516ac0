//! Running a check for a document.

use crate::checker::{CheckError, CheckRequest, Payload, TextChecker};
use crate::document::{annotate, DocumentState};
use crate::registry::ContentMode;
use crate::settings::CheckSettings;

use super::diagnostics::{map_matches, Finding};

/// Build the request for a document, or `None` if it isn't checked.
pub fn build_request(state: &DocumentState, settings: &CheckSettings) -> Option<CheckRequest> {
    let payload = match state.mode? {
        ContentMode::Plain => Payload::Text(state.source.clone()),
        ContentMode::Markup => Payload::Annotated(annotate(&state.source)),
    };
    Some(CheckRequest {
        language: settings.language.clone(),
        payload,
        enabled_only: settings.enabled_only,
    })
}

/// Check a document and map the reported matches onto it.
///
/// Documents without a content mode, or with no text at all, yield no
/// findings without contacting the checker.
pub async fn run_check(
    state: &DocumentState,
    settings: &CheckSettings,
    checker: &dyn TextChecker,
) -> Result<Vec<Finding>, CheckError> {
    if state.source.is_empty() {
        return Ok(Vec::new());
    }
    let Some(request) = build_request(state, settings) else {
        return Ok(Vec::new());
    };

    let response = checker.check(request).await?;
    let reported = response.matches.len();
    let findings = map_matches(
        &state.line_index,
        response.matches,
        &settings.ignored_issue_types,
    );
    tracing::debug!(
        version = state.version,
        reported,
        kept = findings.len(),
        "check finished"
    );
    Ok(findings)
}
