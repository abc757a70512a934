//! Static substitution data between ASCII and styled code points.
//!
//! Each table-backed [`Style`] is described by the first code point of its
//! uppercase, lowercase and (optionally) digit runs in the Mathematical
//! Alphanumeric Symbols block. Letters that were encoded earlier in the
//! Letterlike Symbols block leave reserved holes in those runs; the
//! `exceptions` list points them at the Letterlike code points instead.
//!
//! Tables are built once on first use and shared read-only afterwards.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::error::TableError;
use crate::style::Style;

struct AlphabetLayout {
    style: Style,
    upper: u32,
    lower: u32,
    digits: Option<u32>,
    exceptions: &'static [(char, u32)],
}

const ALPHABETS: [AlphabetLayout; 7] = [
    AlphabetLayout {
        style: Style::Bold,
        upper: 0x1D400,
        lower: 0x1D41A,
        digits: Some(0x1D7CE),
        exceptions: &[],
    },
    AlphabetLayout {
        style: Style::Italic,
        upper: 0x1D434,
        lower: 0x1D44E,
        digits: None,
        exceptions: &[('h', 0x210E)],
    },
    AlphabetLayout {
        style: Style::BoldSans,
        upper: 0x1D5D4,
        lower: 0x1D5EE,
        digits: Some(0x1D7EC),
        exceptions: &[],
    },
    AlphabetLayout {
        style: Style::ItalicSans,
        upper: 0x1D608,
        lower: 0x1D622,
        digits: None,
        exceptions: &[],
    },
    AlphabetLayout {
        style: Style::Script,
        upper: 0x1D49C,
        lower: 0x1D4B6,
        digits: None,
        exceptions: &[
            ('B', 0x212C),
            ('E', 0x2130),
            ('F', 0x2131),
            ('H', 0x210B),
            ('I', 0x2110),
            ('L', 0x2112),
            ('M', 0x2133),
            ('R', 0x211B),
            ('e', 0x212F),
            ('g', 0x210A),
            ('o', 0x2134),
        ],
    },
    AlphabetLayout {
        style: Style::Monospace,
        upper: 0x1D670,
        lower: 0x1D68A,
        digits: Some(0x1D7F6),
        exceptions: &[],
    },
    AlphabetLayout {
        style: Style::DoubleStruck,
        upper: 0x1D538,
        lower: 0x1D552,
        digits: Some(0x1D7D8),
        exceptions: &[
            ('C', 0x2102),
            ('H', 0x210D),
            ('N', 0x2115),
            ('P', 0x2119),
            ('Q', 0x211A),
            ('R', 0x211D),
            ('Z', 0x2124),
        ],
    },
];

/// Base-character to styled-character mapping for one style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    map: BTreeMap<char, char>,
}

impl SubstitutionTable {
    fn from_layout(layout: &AlphabetLayout) -> Self {
        let mut map = BTreeMap::new();
        let runs = [
            ('A'..='Z', Some(layout.upper)),
            ('a'..='z', Some(layout.lower)),
            ('0'..='9', layout.digits),
        ];
        for (range, start) in runs {
            let Some(start) = start else {
                continue;
            };
            let first = *range.start() as u32;
            for base in range {
                let styled = layout
                    .exceptions
                    .iter()
                    .find(|(ch, _)| *ch == base)
                    .map(|(_, cp)| *cp)
                    .unwrap_or(start + (base as u32 - first));
                if let Some(styled) = char::from_u32(styled) {
                    map.insert(base, styled);
                }
            }
        }
        Self { map }
    }

    /// Styled counterpart of `base`, if this table covers it.
    pub fn get(&self, base: char) -> Option<char> {
        self.map.get(&base).copied()
    }

    /// Whether `base` has a styled counterpart.
    pub fn contains(&self, base: char) -> bool {
        self.map.contains_key(&base)
    }

    /// Number of mapped base characters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table maps nothing.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate `(base, styled)` pairs in base-character order.
    pub fn iter(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.map.iter().map(|(base, styled)| (*base, *styled))
    }
}

/// All substitution tables plus the shared inverse mapping.
#[derive(Clone, Debug)]
pub struct StyleTables {
    tables: Vec<SubstitutionTable>,
    inverse: BTreeMap<char, char>,
    styles: BTreeMap<char, Style>,
}

static TABLES: Lazy<StyleTables> = Lazy::new(StyleTables::build);

/// Process-wide read-only tables.
pub fn style_tables() -> &'static StyleTables {
    &TABLES
}

impl StyleTables {
    /// Build every table from the alphabet data.
    ///
    /// A styled character claimed by two base characters keeps its first
    /// mapping and is reported through `log::error!`; [`Self::validate`]
    /// surfaces the same defect as an error.
    pub fn build() -> Self {
        let mut tables = Vec::with_capacity(ALPHABETS.len());
        let mut inverse = BTreeMap::new();
        let mut styles = BTreeMap::new();
        for layout in &ALPHABETS {
            let table = SubstitutionTable::from_layout(layout);
            for (base, styled) in table.iter() {
                if let Some(existing) = inverse.get(&styled).copied() {
                    if existing != base {
                        log::error!(
                            "{}",
                            TableError::InverseCollision {
                                styled,
                                existing,
                                conflicting: base,
                            }
                        );
                    }
                    continue;
                }
                inverse.insert(styled, base);
                styles.insert(styled, layout.style);
            }
            tables.push(table);
        }
        Self {
            tables,
            inverse,
            styles,
        }
    }

    /// Substitution table for `style`, or `None` for strikethrough.
    pub fn table(&self, style: Style) -> Option<&SubstitutionTable> {
        style.table_index().and_then(|idx| self.tables.get(idx))
    }

    /// Base character for a styled character.
    pub fn base_of(&self, styled: char) -> Option<char> {
        self.inverse.get(&styled).copied()
    }

    /// Style that produced a styled character.
    pub fn style_of(&self, styled: char) -> Option<Style> {
        self.styles.get(&styled).copied()
    }

    /// Number of entries in the inverse mapping.
    pub fn inverse_len(&self) -> usize {
        self.inverse.len()
    }

    /// Check that the inverse mapping is a true one-sided inverse of every
    /// substitution table.
    pub fn validate(&self) -> Result<(), TableError> {
        for style in Style::TABLE_STYLES {
            let Some(table) = self.table(style) else {
                continue;
            };
            for (base, styled) in table.iter() {
                match self.base_of(styled) {
                    None => {
                        return Err(TableError::MissingInverse {
                            style,
                            base,
                            styled,
                        })
                    }
                    Some(inverse) if inverse != base => {
                        return Err(TableError::InverseMismatch {
                            style,
                            base,
                            styled,
                            inverse,
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}
