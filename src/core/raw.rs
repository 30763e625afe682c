//! Flat, order-preserving persisted form of a document
//!
//! The JSON shape follows the common raw rich-text layout: a list of blocks,
//! each carrying its inline styles as `(offset, length, style)` ranges, plus an
//! entity map. Offsets and lengths count characters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::RawContentError;
use super::model::{Block, BlockKey, BlockType, Document, InlineStyle, StyleSet};

/// Serialized document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: BTreeMap<String, serde_json::Value>,
}

/// Serialized block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: String,
    pub text: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<serde_json::Value>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// One inline style applied over a character range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

/// Serialize a document
pub fn to_raw(doc: &Document) -> RawContent {
    RawContent {
        blocks: doc.blocks_in_order().map(raw_block).collect(),
        entity_map: BTreeMap::new(),
    }
}

fn raw_block(block: &Block) -> RawBlock {
    RawBlock {
        key: block.key().to_string(),
        text: block.text().to_string(),
        block_type: block.block_type(),
        depth: 0,
        inline_style_ranges: style_ranges(&block.char_styles()),
        entity_ranges: Vec::new(),
        data: serde_json::Map::new(),
    }
}

/// Maximal ranges per style, ordered by style then offset
fn style_ranges(char_styles: &[StyleSet]) -> Vec<RawStyleRange> {
    let mut styles: Vec<InlineStyle> = char_styles.iter().flat_map(|s| s.iter()).collect();
    styles.sort();
    styles.dedup();

    let mut ranges = Vec::new();
    for style in styles {
        let mut start: Option<usize> = None;
        for (offset, set) in char_styles.iter().enumerate() {
            match (set.contains(style), start) {
                (true, None) => start = Some(offset),
                (false, Some(s)) => {
                    ranges.push(RawStyleRange {
                        offset: s,
                        length: offset - s,
                        style,
                    });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            ranges.push(RawStyleRange {
                offset: s,
                length: char_styles.len() - s,
                style,
            });
        }
    }
    ranges
}

/// Restore a document
///
/// Fails on duplicate block keys or style ranges that run past the end of
/// their block. Depth, entities and block data are not part of the model and
/// are dropped.
pub fn from_raw(raw: &RawContent) -> Result<Document, RawContentError> {
    let blocks = raw
        .blocks
        .iter()
        .map(block_from_raw)
        .collect::<Result<Vec<_>, _>>()?;

    Document::from_blocks(blocks).ok_or_else(|| {
        let mut seen = std::collections::HashSet::new();
        let duplicate = raw
            .blocks
            .iter()
            .find(|b| !seen.insert(b.key.as_str()))
            .map(|b| b.key.clone())
            .unwrap_or_default();
        RawContentError::DuplicateKey(duplicate)
    })
}

fn block_from_raw(raw: &RawBlock) -> Result<Block, RawContentError> {
    let len = raw.text.chars().count();
    let mut char_styles = vec![StyleSet::new(); len];
    for range in &raw.inline_style_ranges {
        let end = range.offset.checked_add(range.length).filter(|end| *end <= len);
        let Some(end) = end else {
            return Err(RawContentError::RangeOutOfBounds {
                key: raw.key.clone(),
                offset: range.offset,
                length: range.length,
                len,
            });
        };
        for styles in &mut char_styles[range.offset..end] {
            styles.insert(range.style);
        }
    }
    Ok(Block::from_char_styles(
        BlockKey::new(raw.key.clone()),
        raw.block_type,
        raw.text.clone(),
        char_styles,
    ))
}
