//! Character-level style application and normalization.

use crate::style::Style;
use crate::tables::style_tables;

/// Combining long stroke overlay used for strikethrough.
pub const STRIKE_MARK: char = '\u{0336}';

/// Combining Diacritical Marks block, stripped by [`normalize`].
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// Apply `style` to every character of `text`.
///
/// Characters the style's table does not cover (punctuation, whitespace,
/// already-styled glyphs, combining marks) pass through unchanged.
/// Strikethrough appends [`STRIKE_MARK`] after every character instead.
pub fn apply_style(text: &str, style: Style) -> String {
    let Some(table) = style_tables().table(style) else {
        let mut out = String::with_capacity(text.len() * 3);
        for ch in text.chars() {
            out.push(ch);
            out.push(STRIKE_MARK);
        }
        return out;
    };
    let mut out = String::with_capacity(text.len() * 4);
    out.extend(text.chars().map(|ch| table.get(ch).unwrap_or(ch)));
    out
}

/// Strip styling from `text` back to plain characters.
///
/// Removes every combining diacritical mark (which undoes strikethrough) and
/// maps styled glyphs back to their base ASCII character.
pub fn normalize(text: &str) -> String {
    let tables = style_tables();
    let mut out = String::with_capacity(text.len());
    out.extend(
        text.chars()
            .filter(|ch| !COMBINING_MARKS.contains(ch))
            .map(|ch| tables.base_of(ch).unwrap_or(ch)),
    );
    out
}

/// The single table style used by every styled glyph in `text`.
///
/// Returns `None` when `text` has no styled glyphs or mixes styles. A
/// strikethrough overlay alone reports [`Style::Strikethrough`]; over table
/// glyphs it is ignored and the table style is reported.
pub fn detect_style(text: &str) -> Option<Style> {
    let tables = style_tables();
    let mut found: Option<Style> = None;
    let mut struck = false;
    for ch in text.chars() {
        if ch == STRIKE_MARK {
            struck = true;
            continue;
        }
        let Some(style) = tables.style_of(ch) else {
            continue;
        };
        match found {
            None => found = Some(style),
            Some(prev) if prev != style => return None,
            Some(_) => {}
        }
    }
    match found {
        Some(style) => Some(style),
        None if struck => Some(Style::Strikethrough),
        None => None,
    }
}
