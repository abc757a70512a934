//! Unicode look-alike text styling.
//!
//! `unistyle` turns plain text into "styled" text built entirely from Unicode
//! code points that mimic bold, italic, script, monospace and friends, for
//! platforms that do not render rich text. It also goes the other way
//! ([`normalize`]) and re-expresses pasted HTML or Markdown emphasis with the
//! same substitution scheme.
//!
//! # Usage
//!
//! ```rust
//! use unistyle::{apply_style, normalize, transcode_pasted_content, Style};
//!
//! let bold = apply_style("Hello", Style::Bold);
//! assert_eq!(bold, "𝐇𝐞𝐥𝐥𝐨");
//! assert_eq!(normalize(&bold), "Hello");
//!
//! // Plain-text clipboard payload with Markdown emphasis.
//! let pasted = transcode_pasted_content("", "**hi** there");
//! assert_eq!(pasted, "𝐡𝐢 there");
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod css;
pub mod document;
pub mod edit;
pub mod error;
pub mod markdown;
pub mod paste;
pub mod style;
pub mod tables;
pub mod transform;

pub use document::{
    has_formatting, transcode_html, transcode_html_with_limits, transcode_html_with_options,
    DocumentLimits, DocumentOptions, StyleContext,
};
pub use edit::{clear_selection_format, paste_at_selection, style_selection, Edit};
pub use error::{ErrorLimitContext, ErrorPhase, MalformedMarkupError, ParseStyleError, TableError};
pub use markdown::transcode_markdown;
pub use paste::{transcode_pasted_content, transcode_pasted_content_with_options, PasteOptions};
pub use style::Style;
pub use tables::{style_tables, StyleTables, SubstitutionTable};
pub use transform::{apply_style, detect_style, normalize, STRIKE_MARK};
