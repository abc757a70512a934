//! Inline `style="..."` declaration parsing.
//!
//! Only the properties that carry emphasis are read: `font-weight`,
//! `font-style`, `text-decoration` (and `text-decoration-line`) and
//! `font-family`. Everything else is ignored, as are malformed declarations.

/// Font weight bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    /// 400-ish and lighter, or an explicit `normal`.
    Normal,
    /// `bold`, `bolder`, or numeric 700 and up.
    Bold,
}

/// Font style bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStyle {
    /// Upright.
    Normal,
    /// `italic` or `oblique`.
    Italic,
}

/// Emphasis-relevant subset of an inline style attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    /// Declared font weight, if any.
    pub font_weight: Option<FontWeight>,
    /// Declared font style, if any.
    pub font_style: Option<FontStyle>,
    /// Whether a text decoration includes `line-through`.
    pub line_through: bool,
    /// Whether the declared font family stack names a monospace face.
    pub monospace: bool,
}

impl InlineStyle {
    /// Whether the style asks for bold text.
    pub fn is_bold(&self) -> bool {
        self.font_weight == Some(FontWeight::Bold)
    }

    /// Whether the style asks for italic text.
    pub fn is_italic(&self) -> bool {
        self.font_style == Some(FontStyle::Italic)
    }
}

/// Faces treated as monospace in addition to the generic `monospace` family.
const MONOSPACE_FAMILIES: &[&str] = &[
    "monospace",
    "courier",
    "courier new",
    "consolas",
    "menlo",
    "monaco",
    "source code pro",
    "roboto mono",
];

/// Parse an inline style attribute value.
pub fn parse_inline_style(style_attr: &str) -> InlineStyle {
    let mut style = InlineStyle::default();
    for decl in style_attr.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = strip_important(value.trim()).to_ascii_lowercase();
        if value.is_empty() {
            continue;
        }
        match name.as_str() {
            "font-weight" => style.font_weight = parse_font_weight(&value),
            "font-style" => style.font_style = parse_font_style(&value),
            "text-decoration" | "text-decoration-line" => {
                style.line_through = value.split_whitespace().any(|v| v == "line-through");
            }
            "font-family" => style.monospace = family_is_monospace(&value),
            _ => {}
        }
    }
    style
}

fn strip_important(value: &str) -> &str {
    value
        .strip_suffix("!important")
        .map(str::trim_end)
        .unwrap_or(value)
}

fn parse_font_weight(value: &str) -> Option<FontWeight> {
    match value {
        "bold" | "bolder" => Some(FontWeight::Bold),
        "normal" | "lighter" => Some(FontWeight::Normal),
        other => {
            let numeric = other.parse::<f32>().ok()?;
            if numeric >= 700.0 {
                Some(FontWeight::Bold)
            } else {
                Some(FontWeight::Normal)
            }
        }
    }
}

fn parse_font_style(value: &str) -> Option<FontStyle> {
    match value.split_whitespace().next()? {
        "italic" | "oblique" => Some(FontStyle::Italic),
        "normal" => Some(FontStyle::Normal),
        _ => None,
    }
}

fn family_is_monospace(value: &str) -> bool {
    value
        .split(',')
        .map(normalize_family)
        .any(|family| MONOSPACE_FAMILIES.contains(&family.as_str()))
}

fn normalize_family(family: &str) -> String {
    family
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_ascii_lowercase()
}
