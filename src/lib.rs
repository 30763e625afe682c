//! Inkblock - block-based rich text editing core
//!
//! Documents are ordered blocks of styled text. Typing `#`, `*`, `**`, `***`
//! or ```` ``` ```` followed by a space turns the current block into a
//! heading, a styled run or a code block instead of inserting the text.

pub mod app;
pub mod core;

pub use app::{EditorApp, KeyResult};
pub use crate::core::interpreter::{Key, KeyEvent};
pub use crate::core::model::{
    Block, BlockKey, BlockType, Document, EditorState, InlineStyle, Selection,
};
