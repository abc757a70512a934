//! The closed set of text styles.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseStyleError;

/// A Unicode look-alike text style.
///
/// Every style except [`Style::Strikethrough`] is backed by a substitution
/// table; strikethrough is produced by overlaying a combining mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Style {
    /// Mathematical bold (serif).
    Bold,
    /// Mathematical italic (serif).
    Italic,
    /// Mathematical sans-serif bold.
    BoldSans,
    /// Mathematical sans-serif italic.
    ItalicSans,
    /// Mathematical script.
    Script,
    /// Mathematical monospace.
    Monospace,
    /// Mathematical double-struck (blackboard bold).
    DoubleStruck,
    /// Combining long stroke overlay after each character.
    Strikethrough,
}

impl Style {
    /// Every style, in toolbar order.
    pub const ALL: [Style; 8] = [
        Style::Bold,
        Style::Italic,
        Style::BoldSans,
        Style::ItalicSans,
        Style::Script,
        Style::Monospace,
        Style::DoubleStruck,
        Style::Strikethrough,
    ];

    /// Styles backed by a substitution table.
    pub const TABLE_STYLES: [Style; 7] = [
        Style::Bold,
        Style::Italic,
        Style::BoldSans,
        Style::ItalicSans,
        Style::Script,
        Style::Monospace,
        Style::DoubleStruck,
    ];

    /// Stable kebab-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::BoldSans => "bold-sans",
            Self::ItalicSans => "italic-sans",
            Self::Script => "script",
            Self::Monospace => "monospace",
            Self::DoubleStruck => "double-struck",
            Self::Strikethrough => "strikethrough",
        }
    }

    /// Whether this style is a character substitution (as opposed to an overlay).
    pub const fn has_table(self) -> bool {
        !matches!(self, Self::Strikethrough)
    }

    pub(crate) const fn table_index(self) -> Option<usize> {
        match self {
            Self::Bold => Some(0),
            Self::Italic => Some(1),
            Self::BoldSans => Some(2),
            Self::ItalicSans => Some(3),
            Self::Script => Some(4),
            Self::Monospace => Some(5),
            Self::DoubleStruck => Some(6),
            Self::Strikethrough => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "bold" => Ok(Self::Bold),
            "italic" => Ok(Self::Italic),
            "boldsans" => Ok(Self::BoldSans),
            "italicsans" => Ok(Self::ItalicSans),
            "script" => Ok(Self::Script),
            "monospace" | "mono" => Ok(Self::Monospace),
            "doublestruck" => Ok(Self::DoubleStruck),
            "strikethrough" | "strike" => Ok(Self::Strikethrough),
            _ => Err(ParseStyleError { name: s.into() }),
        }
    }
}
