//! Document state management and text utilities.
//!
//! This module provides:
//! - `LineIndex`, `PositionCursor` and `SpanMapper` for offset <-> position conversion
//! - `annotate` for splitting markup documents into text and markup fragments
//! - `DocumentState` and `DocumentStore` for document lifecycle management

mod markup;
mod state;
mod text;

pub use markup::{annotate, flatten, Fragment};
pub use state::{mimetype_for, DocumentState, DocumentStore};
pub use text::{LineIndex, PositionCursor, SpanMapper};
