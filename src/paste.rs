//! Clipboard paste dispatch.
//!
//! A paste gesture usually carries two payloads: `text/html` and
//! `text/plain`. Rich editors (Google Docs, Word) put the emphasis in the
//! HTML; chat assistants put Markdown in the plain text. The dispatcher
//! prefers the HTML when it visibly carries formatting and otherwise reads
//! Markdown from the plain text. It never fails.

use crate::document::{has_formatting, transcode_html_with_options, DocumentOptions};
use crate::markdown::transcode_markdown;

/// Paste dispatch options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasteOptions {
    /// Budgets and wrapper handling for the HTML path.
    pub document: DocumentOptions,
    /// Run the Markdown transcoder on the plain-text payload. When disabled
    /// the plain text is returned verbatim whenever the HTML path is not
    /// taken.
    pub markdown_fallback: bool,
}

impl Default for PasteOptions {
    fn default() -> Self {
        Self {
            document: DocumentOptions::default(),
            markdown_fallback: true,
        }
    }
}

/// Turn a paste's clipboard payloads into styled plain text.
pub fn transcode_pasted_content(html: &str, plain: &str) -> String {
    transcode_pasted_content_with_options(html, plain, PasteOptions::default())
}

/// Turn a paste's clipboard payloads into styled plain text with explicit options.
pub fn transcode_pasted_content_with_options(
    html: &str,
    plain: &str,
    options: PasteOptions,
) -> String {
    if !html.is_empty() && has_formatting(html) {
        match transcode_html_with_options(html, options.document) {
            Ok(text) => {
                log::debug!("paste: transcoded {} bytes of formatted html", html.len());
                return text;
            }
            Err(err) => {
                log::warn!("paste: html transcode failed, falling back to plain text: {}", err);
            }
        }
    }
    if options.markdown_fallback {
        log::debug!("paste: transcoding {} bytes of plain text as markdown", plain.len());
        transcode_markdown(plain)
    } else {
        plain.to_string()
    }
}
