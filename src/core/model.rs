//! Document model: blocks of styled text, selection and editor state
//!
//! A [`Document`] is a value. Every edit produces a new revision that shares
//! untouched blocks with the previous one, so a host can keep old revisions
//! around cheaply.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque block identifier, unique within a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encode a generator seed as a 5 character base-36 key
    fn from_seed(seed: u64) -> Self {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut n = seed;
        let mut buf = Vec::new();
        loop {
            buf.push(DIGITS[(n % 36) as usize]);
            n /= 36;
            if n == 0 {
                break;
            }
        }
        while buf.len() < 5 {
            buf.push(b'0');
        }
        buf.reverse();
        Self(buf.into_iter().map(char::from).collect())
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block type, named as in the persisted form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Unstyled,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    HeaderFour,
    HeaderFive,
    HeaderSix,
    Blockquote,
    CodeBlock,
    UnorderedListItem,
    OrderedListItem,
    Atomic,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::HeaderOne => "header-one",
            BlockType::HeaderTwo => "header-two",
            BlockType::HeaderThree => "header-three",
            BlockType::HeaderFour => "header-four",
            BlockType::HeaderFive => "header-five",
            BlockType::HeaderSix => "header-six",
            BlockType::Blockquote => "blockquote",
            BlockType::CodeBlock => "code-block",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::Atomic => "atomic",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character-level formatting tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Code,
    Strikethrough,
    /// Custom style rendered in red
    Red,
}

impl InlineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            InlineStyle::Bold => "BOLD",
            InlineStyle::Italic => "ITALIC",
            InlineStyle::Underline => "UNDERLINE",
            InlineStyle::Code => "CODE",
            InlineStyle::Strikethrough => "STRIKETHROUGH",
            InlineStyle::Red => "RED",
        }
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of inline styles
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StyleSet(BTreeSet<InlineStyle>);

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, style: InlineStyle) -> bool {
        self.0.contains(&style)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = InlineStyle> + '_ {
        self.0.iter().copied()
    }

    pub fn insert(&mut self, style: InlineStyle) {
        self.0.insert(style);
    }

    pub fn remove(&mut self, style: InlineStyle) {
        self.0.remove(&style);
    }

    /// Return a copy with `style` flipped
    pub fn toggled(&self, style: InlineStyle) -> Self {
        let mut next = self.clone();
        if !next.0.remove(&style) {
            next.0.insert(style);
        }
        next
    }
}

impl FromIterator<InlineStyle> for StyleSet {
    fn from_iter<I: IntoIterator<Item = InlineStyle>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A run of characters sharing one style set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRun {
    pub styles: StyleSet,
    /// Length in characters
    pub length: usize,
}

/// One paragraph-like unit of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    key: BlockKey,
    block_type: BlockType,
    text: String,
    style_runs: Vec<StyleRun>,
}

impl Block {
    /// Create an empty unstyled block
    pub fn empty(key: BlockKey) -> Self {
        Self {
            key,
            block_type: BlockType::Unstyled,
            text: String::new(),
            style_runs: Vec::new(),
        }
    }

    /// Create a block whose characters all carry `styles`
    pub fn with_text(key: BlockKey, block_type: BlockType, text: &str, styles: StyleSet) -> Self {
        let length = text.chars().count();
        Self::from_char_styles(key, block_type, text.to_string(), vec![styles; length])
    }

    /// Build a block from one style set per character, compressing into runs
    ///
    /// `char_styles` must have one entry per character of `text`.
    pub fn from_char_styles(
        key: BlockKey,
        block_type: BlockType,
        text: String,
        char_styles: Vec<StyleSet>,
    ) -> Self {
        debug_assert_eq!(text.chars().count(), char_styles.len());
        let mut style_runs: Vec<StyleRun> = Vec::new();
        for styles in char_styles {
            match style_runs.last_mut() {
                Some(run) if run.styles == styles => run.length += 1,
                _ => style_runs.push(StyleRun { styles, length: 1 }),
            }
        }
        Self {
            key,
            block_type,
            text,
            style_runs,
        }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style_runs(&self) -> &[StyleRun] {
        &self.style_runs
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Styles of the character at `offset`, empty when out of range
    pub fn style_at(&self, offset: usize) -> StyleSet {
        let mut start = 0;
        for run in &self.style_runs {
            if offset < start + run.length {
                return run.styles.clone();
            }
            start += run.length;
        }
        StyleSet::new()
    }

    /// Expand the runs into one style set per character
    pub fn char_styles(&self) -> Vec<StyleSet> {
        self.style_runs
            .iter()
            .flat_map(|run| std::iter::repeat(run.styles.clone()).take(run.length))
            .collect()
    }

    pub(crate) fn with_type(&self, block_type: BlockType) -> Self {
        Self {
            block_type,
            ..self.clone()
        }
    }

    /// Replace characters `start..end` with `text`, each inserted character
    /// carrying `styles`
    pub(crate) fn replace_range(
        &self,
        start: usize,
        end: usize,
        text: &str,
        styles: &StyleSet,
    ) -> Self {
        let chars: Vec<char> = self.text.chars().collect();
        let mut char_styles = self.char_styles();
        let inserted: Vec<char> = text.chars().collect();

        let mut new_text: String = chars[..start].iter().collect();
        new_text.extend(inserted.iter());
        new_text.extend(chars[end..].iter());

        char_styles.splice(start..end, std::iter::repeat(styles.clone()).take(inserted.len()));
        Self::from_char_styles(self.key.clone(), self.block_type, new_text, char_styles)
    }

    /// Apply `f` to the styles of characters `start..end`
    pub(crate) fn restyle_range(
        &self,
        start: usize,
        end: usize,
        f: impl Fn(&StyleSet) -> StyleSet,
    ) -> Self {
        let char_styles = self
            .char_styles()
            .into_iter()
            .enumerate()
            .map(|(i, styles)| if i >= start && i < end { f(&styles) } else { styles })
            .collect();
        Self::from_char_styles(self.key.clone(), self.block_type, self.text.clone(), char_styles)
    }

    /// Append another block's characters and styles to this one
    pub(crate) fn joined_with(&self, other: &Block) -> Self {
        let mut char_styles = self.char_styles();
        char_styles.extend(other.char_styles());
        let text = format!("{}{}", self.text, other.text);
        Self::from_char_styles(self.key.clone(), self.block_type, text, char_styles)
    }
}

/// Ordered sequence of blocks with O(1) lookup by key
///
/// Cloning copies the key order lazily and the block map eagerly, so a new
/// revision costs a key and pointer copy per block; block contents are only
/// copied for the blocks an edit touches.
#[derive(Debug, Clone)]
pub struct Document {
    order: Arc<Vec<BlockKey>>,
    blocks: HashMap<BlockKey, Arc<Block>>,
    next_seed: u64,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.blocks == other.blocks
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding a single empty block
    pub fn new() -> Self {
        let mut doc = Self {
            order: Arc::new(Vec::new()),
            blocks: HashMap::new(),
            next_seed: 0,
        };
        let key = doc.fresh_key();
        doc.insert_block_after(None, Block::empty(key));
        doc
    }

    /// Build a document from blocks in reading order
    ///
    /// Returns `None` when two blocks share a key. An empty list yields a
    /// document with a single empty block.
    pub fn from_blocks(blocks: Vec<Block>) -> Option<Self> {
        if blocks.is_empty() {
            return Some(Self::new());
        }
        let mut order = Vec::with_capacity(blocks.len());
        let mut map = HashMap::with_capacity(blocks.len());
        for block in blocks {
            let key = block.key().clone();
            if map.insert(key.clone(), Arc::new(block)).is_some() {
                return None;
            }
            order.push(key);
        }
        Some(Self {
            order: Arc::new(order),
            blocks: map,
            next_seed: 0,
        })
    }

    pub fn get_block(&self, key: &BlockKey) -> Option<&Block> {
        self.blocks.get(key).map(|block| block.as_ref())
    }

    pub fn contains(&self, key: &BlockKey) -> bool {
        self.blocks.contains_key(key)
    }

    pub fn blocks_in_order(&self) -> impl Iterator<Item = &Block> + '_ {
        self.order.iter().filter_map(|key| self.get_block(key))
    }

    pub fn keys(&self) -> &[BlockKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn first_block(&self) -> Option<&Block> {
        self.order.first().and_then(|key| self.get_block(key))
    }

    fn position(&self, key: &BlockKey) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }

    /// The block immediately after `key` in reading order
    pub fn block_after(&self, key: &BlockKey) -> Option<&Block> {
        let index = self.position(key)?;
        self.order.get(index + 1).and_then(|k| self.get_block(k))
    }

    /// The block immediately before `key` in reading order
    pub fn block_before(&self, key: &BlockKey) -> Option<&Block> {
        let index = self.position(key)?;
        index
            .checked_sub(1)
            .and_then(|i| self.order.get(i))
            .and_then(|k| self.get_block(k))
    }

    /// Generate a key not present in this document and never handed out by
    /// this document's generator before
    pub(crate) fn fresh_key(&mut self) -> BlockKey {
        loop {
            let key = BlockKey::from_seed(self.next_seed);
            self.next_seed += 1;
            if !self.blocks.contains_key(&key) {
                return key;
            }
        }
    }

    /// Replace an existing block, keeping its position
    pub(crate) fn replace_block(&mut self, block: Block) {
        self.blocks.insert(block.key().clone(), Arc::new(block));
    }

    /// Insert `block` after `after`, or at the front when `after` is `None`
    pub(crate) fn insert_block_after(&mut self, after: Option<&BlockKey>, block: Block) {
        let index = after
            .and_then(|key| self.position(key))
            .map(|i| i + 1)
            .unwrap_or(0);
        let key = block.key().clone();
        Arc::make_mut(&mut self.order).insert(index, key.clone());
        self.blocks.insert(key, Arc::new(block));
    }

    pub(crate) fn remove_block(&mut self, key: &BlockKey) {
        if self.blocks.remove(key).is_some() {
            Arc::make_mut(&mut self.order).retain(|k| k != key);
        }
    }

    /// Whether two revisions share the same allocation for `key`
    #[cfg(test)]
    pub(crate) fn shares_block_with(&self, other: &Document, key: &BlockKey) -> bool {
        match (self.blocks.get(key), other.blocks.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Anchor/focus selection within the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
    pub is_backward: bool,
}

impl Selection {
    /// Caret at `offset` in block `key`
    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
            is_backward: false,
        }
    }

    /// Range within a single block
    pub fn range(key: BlockKey, anchor_offset: usize, focus_offset: usize) -> Self {
        Self {
            anchor_key: key.clone(),
            anchor_offset,
            focus_key: key,
            focus_offset,
            is_backward: focus_offset < anchor_offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    pub fn is_single_block(&self) -> bool {
        self.anchor_key == self.focus_key
    }

    pub fn start_offset(&self) -> usize {
        self.anchor_offset.min(self.focus_offset)
    }

    pub fn end_offset(&self) -> usize {
        self.anchor_offset.max(self.focus_offset)
    }
}

/// Tag describing the kind of the last edit, for host-side history grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditKind {
    InsertCharacters,
    BackspaceCharacter,
    DeleteCharacter,
    RemoveRange,
    ChangeBlockType,
    SplitBlock,
    ChangeInlineStyle,
    JoinBlocks,
}

/// Complete editor value: document, selection and pending inline styles
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    document: Document,
    selection: Selection,
    inline_style_override: Option<StyleSet>,
    last_change: Option<EditKind>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::create_empty()
    }
}

impl EditorState {
    /// Empty document with the caret in its only block
    pub fn create_empty() -> Self {
        Self::create_with_document(Document::new())
    }

    /// Caret at the start of the document's first block
    pub fn create_with_document(document: Document) -> Self {
        let key = document
            .first_block()
            .map(|block| block.key().clone())
            .unwrap_or_else(|| BlockKey::new(""));
        Self {
            document,
            selection: Selection::collapsed(key, 0),
            inline_style_override: None,
            last_change: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn last_change(&self) -> Option<EditKind> {
        self.last_change
    }

    pub fn inline_style_override(&self) -> Option<&StyleSet> {
        self.inline_style_override.as_ref()
    }

    /// The block under the caret
    pub fn anchor_block(&self) -> Option<&Block> {
        self.document.get_block(&self.selection.anchor_key)
    }

    /// Styles the next typed character will carry
    pub fn current_inline_style(&self) -> StyleSet {
        if let Some(styles) = &self.inline_style_override {
            return styles.clone();
        }
        let Some(block) = self.anchor_block() else {
            return StyleSet::new();
        };
        let offset = self.selection.start_offset();
        if offset > 0 {
            return block.style_at(offset - 1);
        }
        if !block.is_empty() {
            return block.style_at(0);
        }
        self.look_upward_for_inline_style(block.key())
    }

    /// Style of the last character of the nearest non-empty block above `key`
    fn look_upward_for_inline_style(&self, key: &BlockKey) -> StyleSet {
        let Some(index) = self.document.position(key) else {
            return StyleSet::new();
        };
        self.document.keys()[..index]
            .iter()
            .rev()
            .filter_map(|k| self.document.get_block(k))
            .find(|block| !block.is_empty())
            .map(|block| block.style_at(block.len() - 1))
            .unwrap_or_default()
    }

    /// Commit a new document, clearing the style override
    pub fn push(&self, document: Document, selection: Selection, kind: EditKind) -> Self {
        Self {
            document,
            selection,
            inline_style_override: None,
            last_change: Some(kind),
        }
    }

    pub fn with_selection(&self, selection: Selection) -> Self {
        Self {
            selection,
            inline_style_override: None,
            ..self.clone()
        }
    }

    pub fn with_inline_style_override(&self, styles: StyleSet) -> Self {
        Self {
            inline_style_override: Some(styles),
            ..self.clone()
        }
    }
}
