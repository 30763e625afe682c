//! Key event interpretation
//!
//! Maps raw key events to semantic commands. A space typed right after one of
//! the trigger sequences (`#`, `*`, `**`, `***`, ```` ``` ````) becomes a
//! formatting command for the current block instead of literal text.

use super::model::{BlockType, EditorState, InlineStyle};
use super::operations::{apply_edit, EditCommand};

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Platform-independent key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
}

/// A key press delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// Translate a typed character
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => Self::new(Key::Space),
            '\n' | '\r' => Self::new(Key::Enter),
            '\t' => Self::new(Key::Tab),
            c => Self::new(Key::Char(c)),
        }
    }

    /// Translate a DOM-style key code for non-character keys
    pub fn from_key_code(code: u32) -> Option<Self> {
        let key = match code {
            8 => Key::Backspace,
            9 => Key::Tab,
            13 => Key::Enter,
            27 => Key::Escape,
            32 => Key::Space,
            37 => Key::Left,
            38 => Key::Up,
            39 => Key::Right,
            40 => Key::Down,
            46 => Key::Delete,
            _ => return None,
        };
        Some(Self::new(key))
    }

    /// Word-break key that completes a trigger sequence
    pub fn is_word_break(&self) -> bool {
        self.key == Key::Space
    }
}

/// Command produced by key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    Heading,
    Bold,
    RedLine,
    UnderLine,
    CodeBlock,
    SplitBlock,
    Backspace,
    Delete,
}

impl KeyCommand {
    /// The edit this command performs, if it is one of the semantic commands
    pub fn edit_command(&self) -> Option<EditCommand> {
        let command = match self {
            KeyCommand::Heading => EditCommand::ChangeBlockType {
                new_type: BlockType::HeaderOne,
            },
            KeyCommand::CodeBlock => EditCommand::ChangeBlockType {
                new_type: BlockType::CodeBlock,
            },
            KeyCommand::Bold => EditCommand::ToggleInlineStyle {
                style: InlineStyle::Bold,
            },
            KeyCommand::RedLine => EditCommand::ToggleInlineStyle {
                style: InlineStyle::Red,
            },
            KeyCommand::UnderLine => EditCommand::ToggleInlineStyle {
                style: InlineStyle::Underline,
            },
            KeyCommand::SplitBlock => EditCommand::SplitBlock,
            KeyCommand::Backspace | KeyCommand::Delete => return None,
        };
        Some(command)
    }
}

/// Trigger sequences, matched against the trimmed text of the caret's block
const TRIGGERS: [(&str, KeyCommand); 5] = [
    ("#", KeyCommand::Heading),
    ("*", KeyCommand::Bold),
    ("**", KeyCommand::RedLine),
    ("***", KeyCommand::UnderLine),
    ("```", KeyCommand::CodeBlock),
];

/// Exact, case-sensitive lookup of a trigger sequence
///
/// Leading whitespace is ignored. Trailing whitespace is not: a block that
/// already ends in a space has had that space inserted as text, so it no
/// longer holds a bare trigger.
pub fn match_trigger(block_text: &str) -> Option<KeyCommand> {
    let trimmed = block_text.trim_start();
    TRIGGERS
        .iter()
        .find(|(trigger, _)| *trigger == trimmed)
        .map(|(_, command)| *command)
}

/// Bindings that apply regardless of block content
pub fn default_key_binding(event: &KeyEvent) -> Option<KeyCommand> {
    match event.key {
        Key::Enter => Some(KeyCommand::SplitBlock),
        Key::Backspace => Some(KeyCommand::Backspace),
        Key::Delete => Some(KeyCommand::Delete),
        _ => None,
    }
}

/// Decide which command, if any, a key press maps to
pub fn key_binding(state: &EditorState, event: &KeyEvent) -> Option<KeyCommand> {
    if event.is_word_break() {
        let text = state.anchor_block().map(|block| block.text()).unwrap_or_default();
        if let Some(command) = match_trigger(text) {
            return Some(command);
        }
    }
    default_key_binding(event)
}

/// Result of offering a command to the editor
#[derive(Debug, Clone, PartialEq)]
pub enum KeyHandling {
    /// The command was consumed and produced this state
    Handled(EditorState),
    /// The host should apply its default behavior for the key
    NotHandled,
}

impl KeyHandling {
    pub fn is_handled(&self) -> bool {
        matches!(self, KeyHandling::Handled(_))
    }

    /// Host-facing name of the outcome
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyHandling::Handled(_) => "handled",
            KeyHandling::NotHandled => "not-handled",
        }
    }
}

/// Apply one of the semantic commands
///
/// Edits that fail against the current state (for example a caret in a block
/// that no longer exists) still count as handled and leave the state as is.
pub fn handle_key_command(state: &EditorState, command: KeyCommand) -> KeyHandling {
    let Some(edit) = command.edit_command() else {
        return KeyHandling::NotHandled;
    };
    tracing::debug!("Handling key command {:?}", command);
    KeyHandling::Handled(apply_edit(state, &edit))
}

/// Presentation class for a block type
pub fn block_style_class(block_type: BlockType) -> Option<&'static str> {
    match block_type {
        BlockType::CodeBlock => Some("richEditorCodeBlock"),
        _ => None,
    }
}
