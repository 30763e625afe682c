//! Block editing operations
//!
//! Document-level functions take a [`Document`] and return a new revision.
//! State-level functions take an [`EditorState`] and return the next state,
//! tagged with the [`EditKind`] of the change. Nothing here mutates its input.

use super::error::EditError;
use super::model::{
    Block, BlockKey, BlockType, Document, EditKind, EditorState, InlineStyle, Selection, StyleSet,
};
use super::styles::remove_active_inline_styles;

/// Semantic edit applied to an [`EditorState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    ChangeBlockType { new_type: BlockType },
    ToggleInlineStyle { style: InlineStyle },
    SplitBlock,
    ReplaceText { range: Selection, text: String },
    NoOp,
}

fn block<'a>(doc: &'a Document, key: &BlockKey) -> Result<&'a Block, EditError> {
    doc.get_block(key)
        .ok_or_else(|| EditError::BlockNotFound(key.clone()))
}

/// Check that `selection` addresses one existing block and fits inside it
fn single_block<'a>(doc: &'a Document, selection: &Selection) -> Result<&'a Block, EditError> {
    if !selection.is_single_block() {
        return Err(EditError::MultiBlockSelection {
            anchor: selection.anchor_key.clone(),
            focus: selection.focus_key.clone(),
        });
    }
    let target = block(doc, &selection.anchor_key)?;
    let len = target.len();
    if selection.end_offset() > len {
        return Err(EditError::OffsetOutOfBounds {
            key: selection.anchor_key.clone(),
            offset: selection.end_offset(),
            len,
        });
    }
    Ok(target)
}

/// Empty the text of block `key`, dropping all of its style runs
pub fn clear_block_text(doc: &Document, key: &BlockKey) -> Result<Document, EditError> {
    let target = block(doc, key)?;
    let cleared = target.replace_range(0, target.len(), "", &StyleSet::new());
    let mut next = doc.clone();
    next.replace_block(cleared);
    Ok(next)
}

/// Set the type of block `key`, leaving its text and runs alone
pub fn set_block_type(
    doc: &Document,
    key: &BlockKey,
    new_type: BlockType,
) -> Result<Document, EditError> {
    let retyped = block(doc, key)?.with_type(new_type);
    let mut next = doc.clone();
    next.replace_block(retyped);
    Ok(next)
}

/// Open a new empty `unstyled` block directly below the anchor block
///
/// The anchor block itself is left untouched. The returned selection is a
/// caret at the start of the new block.
pub fn split_block(
    doc: &Document,
    selection: &Selection,
) -> Result<(Document, Selection), EditError> {
    let anchor = block(doc, &selection.anchor_key)?.key().clone();
    let mut next = doc.clone();
    let key = next.fresh_key();
    next.insert_block_after(Some(&anchor), Block::empty(key.clone()));
    Ok((next, Selection::collapsed(key, 0)))
}

/// Replace the selected range of a single block with `text`
///
/// Inserted characters carry `styles`.
pub fn replace_text_in_selection(
    doc: &Document,
    selection: &Selection,
    text: &str,
    styles: &StyleSet,
) -> Result<Document, EditError> {
    let target = single_block(doc, selection)?;
    let replaced =
        target.replace_range(selection.start_offset(), selection.end_offset(), text, styles);
    let mut next = doc.clone();
    next.replace_block(replaced);
    Ok(next)
}

/// Remove all text from the block under the caret and put the caret at its start
pub fn remove_text_from_block(state: &EditorState) -> Result<EditorState, EditError> {
    let key = state.selection().anchor_key.clone();
    let len = block(state.document(), &key)?.len();
    let whole_block = Selection::range(key.clone(), 0, len);
    let document = replace_text_in_selection(state.document(), &whole_block, "", &StyleSet::new())?;
    Ok(state.push(document, Selection::collapsed(key, 0), EditKind::RemoveRange))
}

/// Clear the anchor block and change its type
pub fn change_block_type_for_current_content(
    state: &EditorState,
    new_type: BlockType,
) -> Result<EditorState, EditError> {
    let cleared = remove_text_from_block(state)?;
    let key = cleared.selection().anchor_key.clone();
    let document = set_block_type(cleared.document(), &key, new_type)?;
    Ok(state.push(document, cleared.selection().clone(), EditKind::ChangeBlockType))
}

/// Flip `style` in the pending set for the next typed character
pub fn toggle_pending_style(state: &EditorState, style: InlineStyle) -> EditorState {
    let styles = state.current_inline_style().toggled(style);
    state.with_inline_style_override(styles)
}

/// Toggle `style` for the current selection
///
/// A caret toggles the pending style set. A range gains `style` on every
/// character, unless every character already carries it, in which case it is
/// removed from all of them.
pub fn toggle_inline_style(
    state: &EditorState,
    style: InlineStyle,
) -> Result<EditorState, EditError> {
    let selection = state.selection();
    if selection.is_collapsed() {
        return Ok(toggle_pending_style(state, style));
    }

    let target = single_block(state.document(), selection)?;
    let (start, end) = (selection.start_offset(), selection.end_offset());
    let fully_styled = (start..end).all(|offset| target.style_at(offset).contains(style));
    let restyled = target.restyle_range(start, end, |styles| {
        let mut next = styles.clone();
        if fully_styled {
            next.remove(style);
        } else {
            next.insert(style);
        }
        next
    });

    let mut document = state.document().clone();
    document.replace_block(restyled);
    Ok(state.push(document, selection.clone(), EditKind::ChangeInlineStyle))
}

/// Clear the anchor block and make `style` the only pending style
pub fn toggle_inline_style_over_selection(
    state: &EditorState,
    style: InlineStyle,
) -> Result<EditorState, EditError> {
    let cleared = remove_text_from_block(state)?;
    let normalized = remove_active_inline_styles(&cleared);
    toggle_inline_style(&normalized, style)
}

/// Open an empty block below the caret with no inherited inline styles
pub fn create_empty_block(state: &EditorState) -> Result<EditorState, EditError> {
    let (document, selection) = split_block(state.document(), state.selection())?;
    let split = state.push(document, selection, EditKind::SplitBlock);
    Ok(remove_active_inline_styles(&split))
}

/// Type `text` over the selection using the current inline style
pub fn insert_text(state: &EditorState, text: &str) -> Result<EditorState, EditError> {
    let selection = state.selection();
    let styles = state.current_inline_style();
    let document = replace_text_in_selection(state.document(), selection, text, &styles)?;
    let caret = Selection::collapsed(
        selection.anchor_key.clone(),
        selection.start_offset() + text.chars().count(),
    );
    Ok(state.push(document, caret, EditKind::InsertCharacters))
}

/// Remove the selected range, or the character before the caret
///
/// At the start of a block the block is joined onto the previous one.
pub fn delete_backward(state: &EditorState) -> Result<EditorState, EditError> {
    let selection = state.selection();
    let target = single_block(state.document(), selection)?;
    if !selection.is_collapsed() {
        return remove_range(state);
    }

    let offset = selection.anchor_offset;
    if offset > 0 {
        let range = Selection::range(target.key().clone(), offset - 1, offset);
        let document = replace_text_in_selection(state.document(), &range, "", &StyleSet::new())?;
        let caret = Selection::collapsed(target.key().clone(), offset - 1);
        return Ok(state.push(document, caret, EditKind::BackspaceCharacter));
    }

    match state.document().block_before(target.key()) {
        Some(previous) => {
            let caret = Selection::collapsed(previous.key().clone(), previous.len());
            let document = join_blocks(state.document(), previous, target);
            Ok(state.push(document, caret, EditKind::BackspaceCharacter))
        }
        None => Ok(state.clone()),
    }
}

/// Remove the selected range, or the character after the caret
///
/// At the end of a block the next block is joined onto this one.
pub fn delete_forward(state: &EditorState) -> Result<EditorState, EditError> {
    let selection = state.selection();
    let target = single_block(state.document(), selection)?;
    if !selection.is_collapsed() {
        return remove_range(state);
    }

    let offset = selection.anchor_offset;
    if offset < target.len() {
        let range = Selection::range(target.key().clone(), offset, offset + 1);
        let document = replace_text_in_selection(state.document(), &range, "", &StyleSet::new())?;
        return Ok(state.push(document, selection.clone(), EditKind::DeleteCharacter));
    }

    match state.document().block_after(target.key()) {
        Some(next) => {
            let document = join_blocks(state.document(), target, next);
            Ok(state.push(document, selection.clone(), EditKind::DeleteCharacter))
        }
        None => Ok(state.clone()),
    }
}

fn remove_range(state: &EditorState) -> Result<EditorState, EditError> {
    let selection = state.selection();
    let document = replace_text_in_selection(state.document(), selection, "", &StyleSet::new())?;
    let caret = Selection::collapsed(selection.anchor_key.clone(), selection.start_offset());
    Ok(state.push(document, caret, EditKind::RemoveRange))
}

/// Append `second` onto `first` and drop `second`
fn join_blocks(doc: &Document, first: &Block, second: &Block) -> Document {
    let mut next = doc.clone();
    next.replace_block(first.joined_with(second));
    next.remove_block(second.key());
    next
}

/// Move the caret one character left, crossing into the previous block
pub fn move_caret_left(state: &EditorState) -> EditorState {
    let selection = state.selection();
    if !selection.is_collapsed() {
        return state.with_selection(Selection::collapsed(
            selection.anchor_key.clone(),
            selection.start_offset(),
        ));
    }
    if selection.anchor_offset > 0 {
        return state.with_selection(Selection::collapsed(
            selection.anchor_key.clone(),
            selection.anchor_offset - 1,
        ));
    }
    match state.document().block_before(&selection.anchor_key) {
        Some(previous) => {
            state.with_selection(Selection::collapsed(previous.key().clone(), previous.len()))
        }
        None => state.clone(),
    }
}

/// Move the caret one character right, crossing into the next block
pub fn move_caret_right(state: &EditorState) -> EditorState {
    let selection = state.selection();
    let Some(current) = state.anchor_block() else {
        return state.clone();
    };
    if !selection.is_collapsed() {
        return state.with_selection(Selection::collapsed(
            selection.anchor_key.clone(),
            selection.end_offset().min(current.len()),
        ));
    }
    if selection.anchor_offset < current.len() {
        return state.with_selection(Selection::collapsed(
            selection.anchor_key.clone(),
            selection.anchor_offset + 1,
        ));
    }
    match state.document().block_after(&selection.anchor_key) {
        Some(next) => state.with_selection(Selection::collapsed(next.key().clone(), 0)),
        None => state.clone(),
    }
}

/// Move the caret to the previous block, keeping the offset where possible
pub fn move_caret_up(state: &EditorState) -> EditorState {
    let selection = state.selection();
    match state.document().block_before(&selection.anchor_key) {
        Some(previous) => state.with_selection(Selection::collapsed(
            previous.key().clone(),
            selection.anchor_offset.min(previous.len()),
        )),
        None => state.clone(),
    }
}

/// Move the caret to the next block, keeping the offset where possible
pub fn move_caret_down(state: &EditorState) -> EditorState {
    let selection = state.selection();
    match state.document().block_after(&selection.anchor_key) {
        Some(next) => state.with_selection(Selection::collapsed(
            next.key().clone(),
            selection.anchor_offset.min(next.len()),
        )),
        None => state.clone(),
    }
}

/// Apply `command`, leaving the state unchanged if it cannot be applied
pub fn apply_edit(state: &EditorState, command: &EditCommand) -> EditorState {
    tracing::debug!("Applying edit command {:?}", command);
    let result = match command {
        EditCommand::ChangeBlockType { new_type } => {
            change_block_type_for_current_content(state, *new_type)
        }
        EditCommand::ToggleInlineStyle { style } => {
            toggle_inline_style_over_selection(state, *style)
        }
        EditCommand::SplitBlock => create_empty_block(state),
        EditCommand::ReplaceText { range, text } => {
            let styles = state.current_inline_style();
            replace_text_in_selection(state.document(), range, text, &styles).map(|document| {
                let offset = range.start_offset() + text.chars().count();
                let caret = Selection::collapsed(range.anchor_key.clone(), offset);
                let kind = if text.is_empty() {
                    EditKind::RemoveRange
                } else {
                    EditKind::InsertCharacters
                };
                state.push(document, caret, kind)
            })
        }
        EditCommand::NoOp => Ok(state.clone()),
    };

    match result {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!("Ignoring edit command {:?}: {}", command, e);
            state.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(list: &[InlineStyle]) -> StyleSet {
        list.iter().copied().collect()
    }

    fn runs_cover_text(doc: &Document) -> bool {
        doc.blocks_in_order()
            .all(|b| b.style_runs().iter().map(|r| r.length).sum::<usize>() == b.len())
    }

    fn doc_with(blocks: &[(&str, BlockType, &str)]) -> Document {
        Document::from_blocks(
            blocks
                .iter()
                .map(|(key, ty, text)| {
                    Block::with_text(BlockKey::new(*key), *ty, text, StyleSet::new())
                })
                .collect(),
        )
        .unwrap()
    }

    fn state_at(doc: Document, key: &str, offset: usize) -> EditorState {
        EditorState::create_with_document(doc)
            .with_selection(Selection::collapsed(BlockKey::new(key), offset))
    }

    #[test]
    fn test_clear_then_set_type_keeps_key_and_position() {
        let doc = doc_with(&[
            ("a", BlockType::Unstyled, "first"),
            ("b", BlockType::Unstyled, "#"),
            ("c", BlockType::Unstyled, "last"),
        ]);
        let key = BlockKey::new("b");
        let cleared = clear_block_text(&doc, &key).unwrap();
        let typed = set_block_type(&cleared, &key, BlockType::HeaderOne).unwrap();

        let block = typed.get_block(&key).unwrap();
        assert_eq!(block.text(), "");
        assert_eq!(block.block_type(), BlockType::HeaderOne);
        assert!(block.style_runs().is_empty());
        let order: Vec<&str> = typed.keys().iter().map(|k| k.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(runs_cover_text(&typed));
    }

    #[test]
    fn test_edits_share_untouched_blocks() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "keep"), ("b", BlockType::Unstyled, "x")]);
        let edited = clear_block_text(&doc, &BlockKey::new("b")).unwrap();
        assert!(edited.shares_block_with(&doc, &BlockKey::new("a")));
        assert!(!edited.shares_block_with(&doc, &BlockKey::new("b")));
        assert_eq!(doc.get_block(&BlockKey::new("b")).unwrap().text(), "x");
    }

    #[test]
    fn test_missing_block_is_an_error() {
        let doc = Document::new();
        let missing = BlockKey::new("gone");
        assert_eq!(
            clear_block_text(&doc, &missing),
            Err(EditError::BlockNotFound(missing.clone()))
        );
        assert!(set_block_type(&doc, &missing, BlockType::CodeBlock).is_err());
        assert!(split_block(&doc, &Selection::collapsed(missing, 0)).is_err());
    }

    #[test]
    fn test_split_inserts_empty_block_after_anchor() {
        let doc = doc_with(&[
            ("a", BlockType::HeaderOne, "title"),
            ("b", BlockType::Unstyled, "tail"),
        ]);
        let (next, selection) =
            split_block(&doc, &Selection::collapsed(BlockKey::new("a"), 2)).unwrap();

        assert_eq!(next.len(), doc.len() + 1);
        let inserted = next.block_after(&BlockKey::new("a")).unwrap();
        assert_eq!(inserted.block_type(), BlockType::Unstyled);
        assert_eq!(inserted.text(), "");
        assert_eq!(selection, Selection::collapsed(inserted.key().clone(), 0));
        assert!(!doc.contains(inserted.key()));
        assert_eq!(next.get_block(&BlockKey::new("a")).unwrap().text(), "title");
        assert_eq!(next.block_after(inserted.key()).unwrap().key().as_str(), "b");
    }

    #[test]
    fn test_replace_text_rejects_bad_selections() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "abc"), ("b", BlockType::Unstyled, "")]);
        let multi = Selection {
            anchor_key: BlockKey::new("a"),
            anchor_offset: 0,
            focus_key: BlockKey::new("b"),
            focus_offset: 0,
            is_backward: false,
        };
        assert!(matches!(
            replace_text_in_selection(&doc, &multi, "", &StyleSet::new()),
            Err(EditError::MultiBlockSelection { .. })
        ));
        let past_end = Selection::range(BlockKey::new("a"), 1, 9);
        assert!(matches!(
            replace_text_in_selection(&doc, &past_end, "", &StyleSet::new()),
            Err(EditError::OffsetOutOfBounds { len: 3, .. })
        ));
    }

    #[test]
    fn test_backward_range_replaces_same_span() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "hello")]);
        let backward = Selection::range(BlockKey::new("a"), 4, 1);
        assert!(backward.is_backward);
        let next = replace_text_in_selection(&doc, &backward, "EY", &StyleSet::new()).unwrap();
        assert_eq!(next.get_block(&BlockKey::new("a")).unwrap().text(), "hEYo");
    }

    #[test]
    fn test_toggle_over_selection_clears_and_sets_single_style() {
        let doc = Document::from_blocks(vec![Block::with_text(
            BlockKey::new("a"),
            BlockType::Unstyled,
            "**",
            styles(&[InlineStyle::Italic]),
        )])
        .unwrap();
        let state = state_at(doc, "a", 2);
        assert_eq!(state.current_inline_style(), styles(&[InlineStyle::Italic]));

        let next = toggle_inline_style_over_selection(&state, InlineStyle::Red).unwrap();
        assert_eq!(next.anchor_block().unwrap().text(), "");
        assert_eq!(next.current_inline_style(), styles(&[InlineStyle::Red]));
        assert_eq!(next.selection(), &Selection::collapsed(BlockKey::new("a"), 0));
    }

    #[test]
    fn test_trigger_toggle_repeated_keeps_text_empty() {
        let state = EditorState::create_empty();
        let once = toggle_inline_style_over_selection(&state, InlineStyle::Bold).unwrap();
        let twice = toggle_inline_style_over_selection(&once, InlineStyle::Bold).unwrap();
        assert_eq!(once.anchor_block().unwrap().text(), "");
        assert_eq!(twice.anchor_block().unwrap().text(), "");
        assert_eq!(twice.current_inline_style(), styles(&[InlineStyle::Bold]));
    }

    #[test]
    fn test_pending_toggle_is_its_own_inverse() {
        let state = EditorState::create_empty()
            .with_inline_style_override(styles(&[InlineStyle::Italic]));
        let once = toggle_pending_style(&state, InlineStyle::Bold);
        assert_eq!(
            once.current_inline_style(),
            styles(&[InlineStyle::Italic, InlineStyle::Bold])
        );
        let twice = toggle_pending_style(&once, InlineStyle::Bold);
        assert_eq!(twice.current_inline_style(), state.current_inline_style());
        assert_eq!(twice.anchor_block().unwrap().text(), "");
    }

    #[test]
    fn test_range_toggle_adds_then_removes() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "hello")]);
        let state = EditorState::create_with_document(doc)
            .with_selection(Selection::range(BlockKey::new("a"), 1, 3));
        let bolded = toggle_inline_style(&state, InlineStyle::Bold).unwrap();
        let block = bolded.anchor_block().unwrap();
        assert_eq!(block.style_at(0), StyleSet::new());
        assert_eq!(block.style_at(1), styles(&[InlineStyle::Bold]));
        assert_eq!(block.style_at(2), styles(&[InlineStyle::Bold]));
        assert_eq!(block.style_at(3), StyleSet::new());
        assert_eq!(bolded.last_change(), Some(EditKind::ChangeInlineStyle));

        let restored = toggle_inline_style(&bolded, InlineStyle::Bold).unwrap();
        assert_eq!(restored.anchor_block().unwrap().style_runs().len(), 1);
        assert!(runs_cover_text(restored.document()));
    }

    #[test]
    fn test_create_empty_block_drops_inherited_styles() {
        let doc = Document::from_blocks(vec![Block::with_text(
            BlockKey::new("a"),
            BlockType::Unstyled,
            "bold",
            styles(&[InlineStyle::Bold]),
        )])
        .unwrap();
        let state = state_at(doc, "a", 4);
        let next = create_empty_block(&state).unwrap();
        assert_eq!(next.document().len(), 2);
        assert_eq!(next.last_change(), Some(EditKind::SplitBlock));
        assert!(next.current_inline_style().is_empty());

        let typed = insert_text(&next, "x").unwrap();
        assert!(typed.anchor_block().unwrap().style_at(0).is_empty());
    }

    #[test]
    fn test_insert_text_consumes_override() {
        let state = EditorState::create_empty()
            .with_inline_style_override(styles(&[InlineStyle::Bold]));
        let typed = insert_text(&state, "ab").unwrap();
        assert_eq!(typed.inline_style_override(), None);
        let block = typed.anchor_block().unwrap();
        assert_eq!(block.text(), "ab");
        assert_eq!(block.style_runs().len(), 1);
        assert_eq!(typed.selection().anchor_offset, 2);

        let more = insert_text(&typed, "c").unwrap();
        assert_eq!(more.anchor_block().unwrap().style_at(2), styles(&[InlineStyle::Bold]));
    }

    #[test]
    fn test_delete_backward_joins_blocks() {
        let doc = doc_with(&[("a", BlockType::HeaderOne, "ab"), ("b", BlockType::Unstyled, "cd")]);
        let state = state_at(doc, "b", 0);
        let joined = delete_backward(&state).unwrap();
        assert_eq!(joined.document().len(), 1);
        let block = joined.anchor_block().unwrap();
        assert_eq!(block.text(), "abcd");
        assert_eq!(block.block_type(), BlockType::HeaderOne);
        assert_eq!(joined.selection(), &Selection::collapsed(BlockKey::new("a"), 2));

        let trimmed = delete_backward(&joined).unwrap();
        assert_eq!(trimmed.anchor_block().unwrap().text(), "acd");
        assert_eq!(trimmed.last_change(), Some(EditKind::BackspaceCharacter));
    }

    #[test]
    fn test_join_keeps_both_style_runs() {
        let doc = Document::from_blocks(vec![
            Block::with_text(
                BlockKey::new("a"),
                BlockType::Unstyled,
                "ab",
                styles(&[InlineStyle::Bold]),
            ),
            Block::with_text(
                BlockKey::new("b"),
                BlockType::Unstyled,
                "cd",
                styles(&[InlineStyle::Red]),
            ),
        ])
        .unwrap();
        let joined = delete_backward(&state_at(doc, "b", 0)).unwrap();
        let block = joined.anchor_block().unwrap();
        assert_eq!(block.text(), "abcd");
        assert_eq!(block.style_runs().len(), 2);
        assert_eq!(block.style_at(1), styles(&[InlineStyle::Bold]));
        assert_eq!(block.style_at(2), styles(&[InlineStyle::Red]));
        assert!(runs_cover_text(joined.document()));
    }

    #[test]
    fn test_range_toggle_inside_run_splits_it() {
        let doc = Document::from_blocks(vec![Block::with_text(
            BlockKey::new("a"),
            BlockType::Unstyled,
            "hello",
            styles(&[InlineStyle::Italic]),
        )])
        .unwrap();
        let state = EditorState::create_with_document(doc)
            .with_selection(Selection::range(BlockKey::new("a"), 1, 3));
        let next = toggle_inline_style(&state, InlineStyle::Bold).unwrap();
        let block = next.anchor_block().unwrap();
        let lengths: Vec<usize> = block.style_runs().iter().map(|r| r.length).collect();
        assert_eq!(lengths, vec![1, 2, 2]);
        assert_eq!(block.style_at(2), styles(&[InlineStyle::Italic, InlineStyle::Bold]));
        assert_eq!(block.style_at(3), styles(&[InlineStyle::Italic]));
        assert!(runs_cover_text(next.document()));
    }

    #[test]
    fn test_style_trigger_drops_styles_inherited_from_block_above() {
        let doc = Document::from_blocks(vec![
            Block::with_text(
                BlockKey::new("a"),
                BlockType::Unstyled,
                "bold",
                styles(&[InlineStyle::Bold]),
            ),
            Block::empty(BlockKey::new("b")),
        ])
        .unwrap();
        let state = state_at(doc, "b", 0);
        assert_eq!(state.current_inline_style(), styles(&[InlineStyle::Bold]));
        let typed = insert_text(&state, "**").unwrap();
        assert_eq!(typed.anchor_block().unwrap().style_at(0), styles(&[InlineStyle::Bold]));

        let toggled = toggle_inline_style_over_selection(&typed, InlineStyle::Red).unwrap();
        assert_eq!(toggled.anchor_block().unwrap().text(), "");
        assert_eq!(toggled.current_inline_style(), styles(&[InlineStyle::Red]));

        let red = insert_text(&toggled, "x").unwrap();
        let block = red.anchor_block().unwrap();
        assert_eq!(block.text(), "x");
        assert_eq!(block.style_at(0), styles(&[InlineStyle::Red]));
        assert!(runs_cover_text(red.document()));
    }

    #[test]
    fn test_delete_at_document_edges_is_noop() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "ab")]);
        let start = state_at(doc.clone(), "a", 0);
        assert_eq!(delete_backward(&start).unwrap(), start);
        let end = state_at(doc, "a", 2);
        assert_eq!(delete_forward(&end).unwrap(), end);
    }

    #[test]
    fn test_delete_forward_joins_next_block() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "ab"), ("b", BlockType::CodeBlock, "cd")]);
        let state = state_at(doc, "a", 2);
        let joined = delete_forward(&state).unwrap();
        assert_eq!(joined.anchor_block().unwrap().text(), "abcd");
        assert!(joined.document().get_block(&BlockKey::new("b")).is_none());
        assert_eq!(joined.selection().anchor_offset, 2);
    }

    #[test]
    fn test_caret_motion_crosses_blocks() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "abc"), ("b", BlockType::Unstyled, "d")]);
        let state = state_at(doc, "b", 0);
        let left = move_caret_left(&state);
        assert_eq!(left.selection(), &Selection::collapsed(BlockKey::new("a"), 3));
        let right = move_caret_right(&left);
        assert_eq!(right.selection(), &Selection::collapsed(BlockKey::new("b"), 0));
        let up = move_caret_up(&state_at(right.document().clone(), "b", 1));
        assert_eq!(up.selection(), &Selection::collapsed(BlockKey::new("a"), 1));
        let down = move_caret_down(&state_at(right.document().clone(), "a", 3));
        assert_eq!(down.selection(), &Selection::collapsed(BlockKey::new("b"), 1));
    }

    #[test]
    fn test_apply_edit_with_stale_anchor_is_noop() {
        let state = EditorState::create_empty()
            .with_selection(Selection::collapsed(BlockKey::new("gone"), 0));
        for command in [
            EditCommand::ChangeBlockType { new_type: BlockType::HeaderOne },
            EditCommand::ToggleInlineStyle { style: InlineStyle::Bold },
            EditCommand::SplitBlock,
            EditCommand::ReplaceText {
                range: Selection::collapsed(BlockKey::new("gone"), 0),
                text: "x".to_string(),
            },
            EditCommand::NoOp,
        ] {
            assert_eq!(apply_edit(&state, &command), state);
        }
    }

    #[test]
    fn test_apply_replace_text() {
        let doc = doc_with(&[("a", BlockType::Unstyled, "hello world")]);
        let state = state_at(doc, "a", 0);
        let next = apply_edit(
            &state,
            &EditCommand::ReplaceText {
                range: Selection::range(BlockKey::new("a"), 0, 5),
                text: "howdy".to_string(),
            },
        );
        assert_eq!(next.anchor_block().unwrap().text(), "howdy world");
        assert_eq!(next.selection().anchor_offset, 5);
        assert_eq!(next.last_change(), Some(EditKind::InsertCharacters));
    }
}
