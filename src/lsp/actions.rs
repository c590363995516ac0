//! Quick fixes that apply suggested replacements.

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Range, TextEdit, Url, WorkspaceEdit,
};

use crate::document::DocumentState;

use super::diagnostics::finding_to_diagnostic;

fn intersects(a: &Range, b: &Range) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Replacement quick fixes for findings that touch `range`.
///
/// At most `max_suggestions` fixes are offered per finding; the first
/// suggestion of each finding is marked preferred.
pub fn code_actions_for_range(
    uri: &Url,
    state: &DocumentState,
    range: Range,
    max_suggestions: usize,
) -> Vec<CodeActionOrCommand> {
    let mut actions = Vec::new();

    for finding in state.findings.iter().filter(|f| intersects(&f.range, &range)) {
        let diagnostic = finding_to_diagnostic(finding);
        for (i, replacement) in finding
            .issue
            .replacements
            .iter()
            .take(max_suggestions)
            .enumerate()
        {
            let edit = TextEdit::new(finding.range, replacement.value.clone());
            actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                title: format!("Replace with \"{}\"", replacement.value),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![diagnostic.clone()]),
                edit: Some(WorkspaceEdit {
                    changes: Some(HashMap::from([(uri.clone(), vec![edit])])),
                    ..Default::default()
                }),
                is_preferred: Some(i == 0),
                ..Default::default()
            }));
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Match, Replacement, Rule};
    use crate::lsp::map_matches;
    use crate::registry::ContentMode;
    use tower_lsp::lsp_types::Position;

    fn state() -> DocumentState {
        let issue = Match {
            message: "Possible spelling mistake found.".to_string(),
            offset: 4,
            length: 4,
            replacements: ["hello", "help", "hell"]
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
            ..Match::default()
        };
        let state = DocumentState::new("Say helo\nagain".to_string(), 1, Some(ContentMode::Plain));
        let findings = map_matches(&state.line_index, vec![issue], &[]);
        state.with_findings(findings)
    }

    fn uri() -> Url {
        Url::parse("file:///tmp/note.txt").unwrap()
    }

    fn titles(actions: &[CodeActionOrCommand]) -> Vec<String> {
        actions
            .iter()
            .map(|a| match a {
                CodeActionOrCommand::CodeAction(action) => action.title.clone(),
                CodeActionOrCommand::Command(command) => command.title.clone(),
            })
            .collect()
    }

    #[test]
    fn offers_replacements_for_cursor_inside_finding() {
        let cursor = Range::new(Position::new(0, 5), Position::new(0, 5));
        let actions = code_actions_for_range(&uri(), &state(), cursor, 5);
        assert_eq!(
            titles(&actions),
            vec![
                "Replace with \"hello\"",
                "Replace with \"help\"",
                "Replace with \"hell\""
            ]
        );

        let CodeActionOrCommand::CodeAction(first) = &actions[0] else {
            panic!("expected code action");
        };
        assert_eq!(first.is_preferred, Some(true));
        let edits = &first.edit.as_ref().unwrap().changes.as_ref().unwrap()[&uri()];
        assert_eq!(edits[0].new_text, "hello");
        assert_eq!(
            edits[0].range,
            Range::new(Position::new(0, 4), Position::new(0, 8))
        );
    }

    #[test]
    fn suggestions_are_capped() {
        let cursor = Range::new(Position::new(0, 4), Position::new(0, 4));
        assert_eq!(code_actions_for_range(&uri(), &state(), cursor, 1).len(), 1);
    }

    #[test]
    fn nothing_outside_findings() {
        let elsewhere = Range::new(Position::new(1, 0), Position::new(1, 3));
        assert!(code_actions_for_range(&uri(), &state(), elsewhere, 5).is_empty());
    }
}
