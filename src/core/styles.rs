//! Style normalization
//!
//! Trigger-consuming edits must not let an old inline style leak into the
//! text typed next, so they toggle every active style off before applying a
//! new one.

use super::model::EditorState;
use super::operations::toggle_pending_style;

/// Toggle every active inline style off once
///
/// An empty active set leaves the state untouched.
pub fn remove_active_inline_styles(state: &EditorState) -> EditorState {
    let active = state.current_inline_style();
    if !active.is_empty() {
        tracing::debug!("Clearing {} active inline style(s)", active.len());
    }
    active
        .iter()
        .fold(state.clone(), |next, style| toggle_pending_style(&next, style))
}
