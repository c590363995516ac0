//! Conversion from checker matches to findings and LSP diagnostics.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Range};

use crate::checker::Match;
use crate::document::{LineIndex, SpanMapper};

/// Value of `Diagnostic::source` for everything this server publishes.
pub const DIAGNOSTIC_SOURCE: &str = "spellsp";

/// A reportable match together with its range in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub range: Range,
    pub issue: Match,
}

/// Whether a match should be reported at all.
///
/// Code and markup produce plenty of repeated whitespace, so issue types such
/// as `whitespace` are usually listed in `ignored_issue_types`.
pub fn is_reportable(issue: &Match, ignored_issue_types: &[String]) -> bool {
    !ignored_issue_types.contains(&issue.rule.issue_type)
}

/// Filter matches and map the survivors onto document ranges.
///
/// Matches are mapped in offset order with one shared cursor. Matches whose
/// span runs past the end of the text (e.g. a response for an older version
/// of the document) are dropped.
pub fn map_matches(
    line_index: &LineIndex,
    matches: Vec<Match>,
    ignored_issue_types: &[String],
) -> Vec<Finding> {
    let mut matches: Vec<Match> = matches
        .into_iter()
        .filter(|m| is_reportable(m, ignored_issue_types))
        .collect();
    matches.sort_by_key(|m| m.offset);

    let mut mapper = SpanMapper::new(line_index);
    matches
        .into_iter()
        .filter_map(|issue| match mapper.map(issue.offset, issue.length) {
            Some(range) => Some(Finding { range, issue }),
            None => {
                tracing::debug!(
                    offset = issue.offset,
                    length = issue.length,
                    rule = %issue.rule.id,
                    "dropping match outside the document"
                );
                None
            }
        })
        .collect()
}

/// Severity for an issue type.
fn severity_for(issue_type: &str) -> DiagnosticSeverity {
    match issue_type {
        "misspelling" | "typographical" | "grammar" | "inconsistency" => {
            DiagnosticSeverity::WARNING
        }
        // style, register, locale-violation, ...
        _ => DiagnosticSeverity::INFORMATION,
    }
}

/// Convert one finding to an LSP diagnostic.
pub fn finding_to_diagnostic(finding: &Finding) -> Diagnostic {
    let issue = &finding.issue;
    Diagnostic {
        range: finding.range,
        severity: Some(severity_for(&issue.rule.issue_type)),
        code: (!issue.rule.id.is_empty()).then(|| NumberOrString::String(issue.rule.id.clone())),
        code_description: None,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: issue.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Convert findings to LSP diagnostics.
pub fn to_diagnostics(findings: &[Finding]) -> Vec<Diagnostic> {
    findings.iter().map(finding_to_diagnostic).collect()
}
