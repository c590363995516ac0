//! Hover text for findings.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::checker::Match;
use crate::document::DocumentState;

/// Short annotation shown for a match.
///
/// Uses the short message when the service sent one, else the full message.
/// Misspellings list their replacements: `Spelling mistake: "Hello", "Help"`.
pub fn annotation_text(issue: &Match) -> String {
    let mut text = match issue.short_message.as_deref() {
        Some(short) if !short.is_empty() => short.to_string(),
        _ => issue.message.clone(),
    };

    if issue.rule.issue_type == "misspelling" && !issue.replacements.is_empty() {
        let suggestions: Vec<String> = issue
            .replacements
            .iter()
            .map(|r| format!("\"{}\"", r.value))
            .collect();
        text.push_str(": ");
        text.push_str(&suggestions.join(", "));
    }
    text
}

/// Hover for the findings under `position`.
///
/// A position right after the last character of a finding still counts as
/// on it, so hovering at the end of a word works.
pub fn hover_at_position(state: &DocumentState, position: Position) -> Option<Hover> {
    let offset = state.line_index.position_to_offset(position)?;
    let hits: Vec<_> = state
        .findings
        .iter()
        .filter(|f| f.issue.offset <= offset && offset <= f.issue.offset + f.issue.length)
        .collect();
    let first = hits.first()?;

    let value = hits
        .iter()
        .map(|f| annotation_text(&f.issue))
        .collect::<Vec<_>>()
        .join("\n\n");

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::PlainText,
            value,
        }),
        range: Some(first.range),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Replacement, Rule};
    use crate::lsp::map_matches;
    use crate::registry::ContentMode;

    fn misspelling(offset: usize, length: usize, replacements: &[&str]) -> Match {
        Match {
            message: "Possible spelling mistake found.".to_string(),
            short_message: Some("Spelling mistake".to_string()),
            offset,
            length,
            replacements: replacements
                .iter()
                .map(|v| Replacement {
                    value: v.to_string(),
                })
                .collect(),
            rule: Rule {
                id: "MORFOLOGIK_RULE_EN_US".to_string(),
                issue_type: "misspelling".to_string(),
                ..Rule::default()
            },
        }
    }

    fn state_with(source: &str, matches: Vec<Match>) -> DocumentState {
        let state = DocumentState::new(source.to_string(), 1, Some(ContentMode::Plain));
        let findings = map_matches(&state.line_index, matches, &[]);
        state.with_findings(findings)
    }

    #[test]
    fn misspelling_lists_replacements() {
        assert_eq!(
            annotation_text(&misspelling(0, 4, &["Hello", "Help"])),
            r#"Spelling mistake: "Hello", "Help""#
        );
    }

    #[test]
    fn falls_back_to_full_message() {
        let issue = Match {
            message: "This sentence does not start with an uppercase letter.".to_string(),
            short_message: Some(String::new()),
            rule: Rule {
                issue_type: "typographical".to_string(),
                ..Rule::default()
            },
            ..Match::default()
        };
        assert_eq!(
            annotation_text(&issue),
            "This sentence does not start with an uppercase letter."
        );
    }

    #[test]
    fn misspelling_without_replacements_has_no_suffix() {
        assert_eq!(annotation_text(&misspelling(0, 4, &[])), "Spelling mistake");
    }

    #[test]
    fn hover_on_finding() {
        let state = state_with("Say helo\nagain", vec![misspelling(4, 4, &["hello"])]);
        let hover = hover_at_position(&state, Position::new(0, 6)).unwrap();
        let HoverContents::Markup(content) = hover.contents else {
            panic!("expected markup hover");
        };
        assert_eq!(content.value, r#"Spelling mistake: "hello""#);
        assert_eq!(hover.range.unwrap().start, Position::new(0, 4));
    }

    #[test]
    fn hover_at_end_of_finding() {
        let state = state_with("Say helo", vec![misspelling(4, 4, &["hello"])]);
        assert!(hover_at_position(&state, Position::new(0, 8)).is_some());
    }

    #[test]
    fn no_hover_away_from_findings() {
        let state = state_with("Say helo\nagain", vec![misspelling(4, 4, &["hello"])]);
        assert!(hover_at_position(&state, Position::new(0, 1)).is_none());
        assert!(hover_at_position(&state, Position::new(1, 2)).is_none());
        assert!(hover_at_position(&state, Position::new(9, 0)).is_none());
    }
}
