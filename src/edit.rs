//! Splicing helpers for a text buffer with a selection.
//!
//! These mirror what an editor does around the core transforms: replace the
//! selected text with its styled (or normalized, or pasted) form and report
//! where the selection should land afterwards. Selections are `char` index
//! ranges; out-of-range or reversed bounds are clamped.

use std::ops::Range;

use crate::paste::transcode_pasted_content;
use crate::style::Style;
use crate::transform::{apply_style, normalize};

/// Result of an edit: the new buffer and the selection to restore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    /// Full buffer after the edit.
    pub text: String,
    /// Selection after the edit, in `char` indices.
    pub selection: Range<usize>,
}

impl Edit {
    fn unchanged(text: &str, selection: Range<usize>) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }
}

/// Clamp and order a selection against a buffer of `len` chars.
fn clamp(selection: Range<usize>, len: usize) -> Range<usize> {
    let start = selection.start.min(len);
    let end = selection.end.min(len);
    start.min(end)..start.max(end)
}

/// Byte offsets for a char range.
fn byte_range(text: &str, chars: &Range<usize>) -> Range<usize> {
    let mut offsets = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()));
    let start = offsets.nth(chars.start).unwrap_or(text.len());
    let end = if chars.end == chars.start {
        start
    } else {
        offsets
            .nth(chars.end - chars.start - 1)
            .unwrap_or(text.len())
    };
    start..end
}

fn splice(text: &str, chars: Range<usize>, replacement: &str) -> Edit {
    let bytes = byte_range(text, &chars);
    let mut out = String::with_capacity(text.len() - bytes.len() + replacement.len());
    out.push_str(&text[..bytes.start]);
    out.push_str(replacement);
    out.push_str(&text[bytes.end..]);
    let end = chars.start + replacement.chars().count();
    Edit {
        text: out,
        selection: chars.start..end,
    }
}

/// Apply `style` to the selected text.
///
/// An empty selection leaves the buffer untouched. The returned selection
/// spans the styled text, which is longer than the selection for
/// strikethrough.
pub fn style_selection(text: &str, selection: Range<usize>, style: Style) -> Edit {
    let selection = clamp(selection, text.chars().count());
    if selection.is_empty() {
        return Edit::unchanged(text, selection);
    }
    let bytes = byte_range(text, &selection);
    let styled = apply_style(&text[bytes], style);
    splice(text, selection, &styled)
}

/// Strip styling from the selection, or from the whole buffer when the
/// selection is empty.
pub fn clear_selection_format(text: &str, selection: Range<usize>) -> Edit {
    let selection = clamp(selection, text.chars().count());
    if selection.is_empty() {
        let normalized = normalize(text);
        let end = normalized.chars().count();
        return Edit {
            text: normalized,
            selection: end..end,
        };
    }
    let bytes = byte_range(text, &selection);
    let normalized = normalize(&text[bytes]);
    splice(text, selection, &normalized)
}

/// Replace the selection (or insert at the caret) with transcoded clipboard
/// content. The caret lands after the pasted text.
pub fn paste_at_selection(text: &str, selection: Range<usize>, html: &str, plain: &str) -> Edit {
    let selection = clamp(selection, text.chars().count());
    let pasted = transcode_pasted_content(html, plain);
    let mut edit = splice(text, selection, &pasted);
    edit.selection = edit.selection.end..edit.selection.end;
    edit
}
