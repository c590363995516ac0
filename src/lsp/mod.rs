//! LSP protocol feature implementations.
//!
//! This module provides implementations for LSP features:
//! - Running checks and mapping matches to findings
//! - Diagnostics conversion from findings
//! - Hover text for findings
//! - Quick fixes for suggested replacements

mod actions;
mod check;
mod diagnostics;
mod hover;

pub use actions::code_actions_for_range;
pub use check::{build_request, run_check};
pub use diagnostics::{
    finding_to_diagnostic, is_reportable, map_matches, to_diagnostics, Finding, DIAGNOSTIC_SOURCE,
};
pub use hover::{annotation_text, hover_at_position};
