//! Error types for unistyle.
//!
//! Most operations in this crate are total. The only fallible paths are
//! document parsing ([`MalformedMarkupError`]), style-name parsing
//! ([`ParseStyleError`]) and table validation ([`TableError`]).

use std::fmt;

use crate::style::Style;

/// Processing phase where a markup error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorPhase {
    /// Byte-level tokenization of the fragment.
    Tokenize,
    /// Element tree construction (nesting, node and size budgets).
    Tree,
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Tokenize => "tokenize",
            Self::Tree => "tree",
        };
        f.write_str(label)
    }
}

/// Typed actual-vs-limit context for budget failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorLimitContext {
    /// Name of the limit that was exceeded.
    pub kind: &'static str,
    /// Observed value.
    pub actual: usize,
    /// Configured cap.
    pub limit: usize,
}

impl ErrorLimitContext {
    pub(crate) fn new(kind: &'static str, actual: usize, limit: usize) -> Self {
        Self {
            kind,
            actual,
            limit,
        }
    }
}

/// The pasted fragment could not be turned into a document tree.
///
/// Raised by [`crate::transcode_html`]. The paste dispatcher recovers from it
/// locally and falls back to Markdown transcoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedMarkupError {
    /// Processing phase where this error originated.
    pub phase: ErrorPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Byte offset into the fragment, when known.
    pub offset: Option<usize>,
    /// Optional typed actual-vs-limit context.
    pub limit: Option<Box<ErrorLimitContext>>,
}

impl MalformedMarkupError {
    pub(crate) fn new(phase: ErrorPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            offset: None,
            limit: None,
        }
    }

    pub(crate) fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn with_limit(mut self, kind: &'static str, actual: usize, limit: usize) -> Self {
        self.limit = Some(Box::new(ErrorLimitContext::new(kind, actual, limit)));
        self
    }
}

impl fmt::Display for MalformedMarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(offset) = self.offset {
            write!(f, " [offset={}]", offset)?;
        }
        if let Some(limit) = self.limit.as_deref() {
            write!(
                f,
                " [limit_kind={} actual={} limit={}]",
                limit.kind, limit.actual, limit.limit
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for MalformedMarkupError {}

/// Unknown style name passed to [`Style::from_str`](std::str::FromStr).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseStyleError {
    /// The rejected input.
    pub name: Box<str>,
}

impl fmt::Display for ParseStyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown style '{}' (expected one of: ", self.name)?;
        for (idx, style) in Style::ALL.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(style.name())?;
        }
        f.write_str(")")
    }
}

impl std::error::Error for ParseStyleError {}

/// Inconsistency in the substitution data.
///
/// These are data-entry defects, not runtime conditions; they are surfaced by
/// [`crate::StyleTables::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableError {
    /// A styled character is produced by two different base characters.
    InverseCollision {
        /// The styled character.
        styled: char,
        /// Base character already registered for it.
        existing: char,
        /// Base character that tried to claim it.
        conflicting: char,
    },
    /// A table entry has no matching inverse entry.
    MissingInverse {
        /// Style whose table holds the entry.
        style: Style,
        /// Base character.
        base: char,
        /// Styled character.
        styled: char,
    },
    /// A table entry's inverse points at another base character.
    InverseMismatch {
        /// Style whose table holds the entry.
        style: Style,
        /// Base character.
        base: char,
        /// Styled character.
        styled: char,
        /// What the inverse table resolves the styled character to.
        inverse: char,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InverseCollision {
                styled,
                existing,
                conflicting,
            } => write!(
                f,
                "styled char U+{:04X} maps back to both '{}' and '{}'",
                *styled as u32, existing, conflicting
            ),
            Self::MissingInverse {
                style,
                base,
                styled,
            } => write!(
                f,
                "{} entry '{}' -> U+{:04X} has no inverse",
                style.name(),
                base,
                *styled as u32
            ),
            Self::InverseMismatch {
                style,
                base,
                styled,
                inverse,
            } => write!(
                f,
                "{} entry '{}' -> U+{:04X} inverts to '{}'",
                style.name(),
                base,
                *styled as u32,
                inverse
            ),
        }
    }
}

impl std::error::Error for TableError {}
