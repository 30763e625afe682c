//! Editor host: current state, title and save handling

use crate::core::config::EditorConfig;
use crate::core::error::PersistenceError;
use crate::core::interpreter::{
    block_style_class, handle_key_command, key_binding, Key, KeyEvent, KeyHandling,
};
use crate::core::model::{BlockType, EditorState};
use crate::core::operations::{
    delete_backward, delete_forward, insert_text, move_caret_down, move_caret_left,
    move_caret_right, move_caret_up,
};
use crate::core::persistence::{PersistenceAdapter, SavedContent};

/// Outcome of a key press as reported to the edit surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// A command consumed the key
    Handled,
    /// The key got its default behavior
    NotHandled,
}

impl KeyResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyResult::Handled => "handled",
            KeyResult::NotHandled => "not-handled",
        }
    }
}

/// Main application state
pub struct EditorApp<P> {
    /// Current editor value, replaced on every change
    state: EditorState,
    /// Document title
    title: String,
    /// Where content is saved
    persistence: P,
    /// Editor settings
    config: EditorConfig,
}

impl<P: PersistenceAdapter> EditorApp<P> {
    /// Start from saved content, or an empty document and title
    pub fn new(persistence: P, config: EditorConfig) -> Self {
        let (state, title) = match persistence.load() {
            Some(saved) => match saved.document() {
                Ok(document) => (EditorState::create_with_document(document), saved.title),
                Err(e) => {
                    tracing::warn!("Starting empty, saved document unusable: {}", e);
                    (EditorState::create_empty(), String::new())
                }
            },
            None => (EditorState::create_empty(), String::new()),
        };

        Self {
            state,
            title,
            persistence,
            config,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Placeholder text for an empty document
    pub fn placeholder(&self) -> Option<&str> {
        let empty = self.state.document().len() == 1
            && self.state.document().first_block().is_some_and(|b| b.is_empty());
        empty.then_some(self.config.placeholder.as_str())
    }

    /// Placeholder text for an empty title
    pub fn title_placeholder(&self) -> Option<&str> {
        self.title
            .is_empty()
            .then_some(self.config.title_placeholder.as_str())
    }

    /// Replace the current state wholesale
    pub fn on_change(&mut self, state: EditorState) {
        self.state = state;
    }

    pub fn on_title_change(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Save the title and document
    pub fn on_save_content(&mut self) -> Result<(), PersistenceError> {
        let saved = SavedContent::new(self.title.clone(), self.state.document());
        self.persistence.save(&saved)
    }

    /// Presentation class for a block type
    pub fn block_style(&self, block_type: BlockType) -> Option<&'static str> {
        block_style_class(block_type)
    }

    /// Handle a key press: semantic commands first, default editing otherwise
    pub fn on_key(&mut self, event: KeyEvent) -> KeyResult {
        if let Some(command) = key_binding(&self.state, &event) {
            if let KeyHandling::Handled(next) = handle_key_command(&self.state, command) {
                self.on_change(next);
                return KeyResult::Handled;
            }
        }
        self.default_key_handling(&event);
        KeyResult::NotHandled
    }

    fn default_key_handling(&mut self, event: &KeyEvent) {
        let state = &self.state;
        let result = match event.key {
            Key::Char(c) => insert_text(state, c.encode_utf8(&mut [0; 4])),
            Key::Space => insert_text(state, " "),
            Key::Tab => insert_text(state, "\t"),
            Key::Backspace => delete_backward(state),
            Key::Delete => delete_forward(state),
            Key::Left => Ok(move_caret_left(state)),
            Key::Right => Ok(move_caret_right(state)),
            Key::Up => Ok(move_caret_up(state)),
            Key::Down => Ok(move_caret_down(state)),
            Key::Enter | Key::Escape => return,
        };
        match result {
            Ok(next) => self.on_change(next),
            Err(e) => tracing::warn!("Ignoring key {:?}: {}", event.key, e),
        }
    }

    /// Type each character of `text` as a key press
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.on_key(KeyEvent::from_char(c));
        }
    }
}
