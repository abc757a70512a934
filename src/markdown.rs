//! Markdown emphasis to Unicode styling.
//!
//! The transcoder runs four independent passes over the evolving text, in a
//! fixed order: inline code, bold, italic, strikethrough. Every matched span
//! loses its delimiters and is replaced by the styled rendition of its
//! content. Output of an earlier pass is locked: a later pass may enclose it
//! but never takes a delimiter from inside it, so `` `3*4` `` stays a single
//! monospace run.
//!
//! A span's content must start and end on a non-whitespace character and may
//! not cross a line break. Underscore delimiters and the single `*` must also
//! not sit inside a word, which keeps `snake_case_var` and `3*4*5` intact.

use crate::style::Style;
use crate::transform::apply_style;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    locked: bool,
}

impl Cell {
    fn open(ch: char) -> Self {
        Self { ch, locked: false }
    }

    fn locked(ch: char) -> Self {
        Self { ch, locked: true }
    }
}

#[derive(Clone, Copy, Debug)]
struct Marker {
    delim: &'static str,
    /// Reject delimiters glued to an alphanumeric on the outside.
    word_guard: bool,
}

impl Marker {
    const fn new(delim: &'static str, word_guard: bool) -> Self {
        Self { delim, word_guard }
    }

    fn width(&self) -> usize {
        self.delim.chars().count()
    }
}

#[derive(Clone, Copy, Debug)]
struct Pass {
    markers: &'static [Marker],
    style: Style,
}

const BOLD_PASS: Pass = Pass {
    markers: &[Marker::new("**", false), Marker::new("__", true)],
    style: Style::Bold,
};

const ITALIC_PASS: Pass = Pass {
    markers: &[Marker::new("*", true), Marker::new("_", true)],
    style: Style::Italic,
};

const STRIKE_PASS: Pass = Pass {
    markers: &[Marker::new("~~", false)],
    style: Style::Strikethrough,
};

/// Replace Markdown emphasis spans in `text` with styled Unicode.
///
/// Unmatched markers are left verbatim; text without markers is returned
/// unchanged.
pub fn transcode_markdown(text: &str) -> String {
    let mut cells: Vec<Cell> = text.chars().map(Cell::open).collect();
    cells = replace_code_spans(&cells);
    for pass in [BOLD_PASS, ITALIC_PASS, STRIKE_PASS] {
        cells = replace_delimited(&cells, &pass);
    }
    cells.iter().map(|cell| cell.ch).collect()
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn push_styled(out: &mut Vec<Cell>, inner: &[Cell], style: Style) {
    let inner: String = inner.iter().map(|cell| cell.ch).collect();
    out.extend(apply_style(&inner, style).chars().map(Cell::locked));
}

fn replace_code_spans(cells: &[Cell]) -> Vec<Cell> {
    let mut out = Vec::with_capacity(cells.len());
    let mut i = 0usize;
    while i < cells.len() {
        let cell = cells[i];
        if cell.ch == '`' && !cell.locked {
            let close = cells[i + 1..]
                .iter()
                .position(|c| c.ch == '`' || c.ch == '\n')
                .map(|offset| i + 1 + offset);
            if let Some(close) = close {
                if cells[close].ch == '`' && close > i + 1 {
                    push_styled(&mut out, &cells[i + 1..close], Style::Monospace);
                    i = close + 1;
                    continue;
                }
            }
        }
        out.push(cell);
        i += 1;
    }
    out
}

fn replace_delimited(cells: &[Cell], pass: &Pass) -> Vec<Cell> {
    let closers: Vec<Vec<usize>> = pass
        .markers
        .iter()
        .map(|marker| closing_positions(cells, marker))
        .collect();
    let mut out = Vec::with_capacity(cells.len());
    let mut line_end = next_line_end(cells, 0);
    let mut i = 0usize;
    while i < cells.len() {
        if line_end < i {
            line_end = next_line_end(cells, i);
        }
        let found = pass
            .markers
            .iter()
            .zip(&closers)
            .find_map(|(marker, closers)| {
                match_span(cells, i, marker, closers, line_end).map(|close| (marker, close))
            });
        if let Some((marker, close)) = found {
            let width = marker.width();
            push_styled(&mut out, &cells[i + width..close], pass.style);
            i = close + width;
            continue;
        }
        out.push(cells[i]);
        i += 1;
    }
    out
}

/// Index of the first line terminator at or after `from`, or the length.
fn next_line_end(cells: &[Cell], from: usize) -> usize {
    cells[from..]
        .iter()
        .position(|cell| is_line_terminator(cell.ch))
        .map_or(cells.len(), |offset| from + offset)
}

fn delim_at(cells: &[Cell], pos: usize, marker: &Marker) -> bool {
    let width = marker.width();
    if pos + width > cells.len() {
        return false;
    }
    cells[pos..pos + width]
        .iter()
        .zip(marker.delim.chars())
        .all(|(cell, expected)| !cell.locked && cell.ch == expected)
}

/// Ascending positions where `marker` may close a span: the delimiter
/// follows a non-whitespace character and, when guarded, is not glued to
/// an alphanumeric on its right.
fn closing_positions(cells: &[Cell], marker: &Marker) -> Vec<usize> {
    let width = marker.width();
    (1..cells.len())
        .filter(|&k| {
            !cells[k - 1].ch.is_whitespace()
                && delim_at(cells, k, marker)
                && !(marker.word_guard
                    && cells
                        .get(k + width)
                        .is_some_and(|after| after.ch.is_alphanumeric()))
        })
        .collect()
}

/// Index of the closing delimiter for a span opening at `start`, using the
/// shortest content that satisfies the boundary rules.
///
/// `line_end` is the first line terminator at or after `start`.
fn match_span(
    cells: &[Cell],
    start: usize,
    marker: &Marker,
    closers: &[usize],
    line_end: usize,
) -> Option<usize> {
    if !delim_at(cells, start, marker) {
        return None;
    }
    if marker.word_guard && start > 0 && cells[start - 1].ch.is_alphanumeric() {
        return None;
    }
    let content_start = start + marker.width();
    let first = cells.get(content_start)?;
    if first.ch.is_whitespace() {
        return None;
    }
    let idx = closers.partition_point(|&k| k <= content_start);
    closers.get(idx).copied().filter(|&k| k <= line_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(s: &str) -> String {
        apply_style(s, Style::Bold)
    }

    fn italic(s: &str) -> String {
        apply_style(s, Style::Italic)
    }

    #[test]
    fn code_span_becomes_monospace() {
        assert_eq!(
            transcode_markdown("run `cargo` now"),
            format!("run {} now", apply_style("cargo", Style::Monospace))
        );
    }

    #[test]
    fn code_span_shields_inner_asterisks() {
        assert_eq!(
            transcode_markdown("`3*4`"),
            apply_style("3*4", Style::Monospace)
        );
        assert_eq!(
            transcode_markdown("`a*b*c`"),
            apply_style("a*b*c", Style::Monospace)
        );
    }

    #[test]
    fn code_span_rejects_empty_and_multiline_content() {
        assert_eq!(transcode_markdown("``"), "``");
        assert_eq!(transcode_markdown("`a\nb`"), "`a\nb`");
        assert_eq!(
            transcode_markdown("``x`"),
            format!("`{}", apply_style("x", Style::Monospace))
        );
    }

    #[test]
    fn bold_with_either_delimiter() {
        assert_eq!(transcode_markdown("**hi**"), bold("hi"));
        assert_eq!(transcode_markdown("__hi__"), bold("hi"));
        assert_eq!(
            transcode_markdown("**a** and **b**"),
            format!("{} and {}", bold("a"), bold("b"))
        );
    }

    #[test]
    fn bold_delimiters_must_match() {
        assert_eq!(transcode_markdown("**hi__"), "**hi__");
    }

    #[test]
    fn italic_with_either_delimiter() {
        assert_eq!(transcode_markdown("*hi there*"), italic("hi there"));
        assert_eq!(transcode_markdown("_hi_"), italic("hi"));
    }

    #[test]
    fn strikethrough_span() {
        assert_eq!(
            transcode_markdown("~~gone~~ stays"),
            format!("{} stays", apply_style("gone", Style::Strikethrough))
        );
    }

    #[test]
    fn whitespace_boundaries_reject_spans() {
        assert_eq!(transcode_markdown("a * b * c"), "a * b * c");
        assert_eq!(transcode_markdown("~~ x ~~"), "~~ x ~~");
        assert_eq!(transcode_markdown("** x **y"), "** x **y");
    }

    #[test]
    fn arithmetic_and_identifiers_are_untouched() {
        assert_eq!(transcode_markdown("3*4"), "3*4");
        assert_eq!(transcode_markdown("3*4*5"), "3*4*5");
        assert_eq!(transcode_markdown("snake_case_var"), "snake_case_var");
        assert_eq!(
            transcode_markdown("call my_func_name(x)"),
            "call my_func_name(x)"
        );
    }

    #[test]
    fn spans_do_not_cross_lines() {
        assert_eq!(transcode_markdown("*a\nb*"), "*a\nb*");
        assert_eq!(transcode_markdown("**a\r\nb**"), "**a\r\nb**");
    }

    #[test]
    fn later_pass_wraps_earlier_output() {
        let inner = format!("a {} c", apply_style("b", Style::Monospace));
        assert_eq!(transcode_markdown("**a `b` c**"), bold(&inner));
        assert_eq!(
            transcode_markdown("~~**x**~~"),
            apply_style(&bold("x"), Style::Strikethrough)
        );
    }

    #[test]
    fn shortest_content_wins() {
        assert_eq!(
            transcode_markdown("*a* b*"),
            format!("{} b*", italic("a"))
        );
    }

    #[test]
    fn unclosed_openers_on_one_line_stay_verbatim() {
        let text = "*a ".repeat(2_000);
        assert_eq!(transcode_markdown(&text), text);
        let text = "_x __y ~~z ".repeat(500);
        assert_eq!(transcode_markdown(&text), text);
    }

    #[test]
    fn closer_on_a_later_line_is_ignored() {
        assert_eq!(
            transcode_markdown("*a\n*b*"),
            format!("*a\n{}", italic("b"))
        );
        assert_eq!(transcode_markdown("**a\u{2028}b**"), "**a\u{2028}b**");
    }

    #[test]
    fn text_without_markers_passes_through() {
        let text = "Plain text, with punctuation! And 100% more.";
        assert_eq!(transcode_markdown(text), text);
        assert_eq!(transcode_markdown(""), "");
    }
}
