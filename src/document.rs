//! HTML fragment to styled plain text.
//!
//! Clipboard HTML (Google Docs, Word, browsers) is tokenized leniently with
//! `quick-xml`, assembled into a small element tree, and walked depth-first.
//! Each element may switch on bold, italic, strike or monospace for its
//! subtree, either through its tag or through its inline `style` attribute;
//! a descendant can never switch a flag back off. Text nodes are rendered
//! with the inherited flags, block elements are flattened to line breaks.
//!
//! # Usage
//!
//! ```rust
//! use unistyle::{apply_style, transcode_html, Style};
//!
//! let out = transcode_html("<p>Hello <b>world</b></p>").unwrap();
//! assert_eq!(out, format!("Hello {}", apply_style("world", Style::Bold)));
//! ```

use std::borrow::Cow;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::css::{parse_inline_style, FontStyle, FontWeight, InlineStyle};
use crate::error::{ErrorPhase, MalformedMarkupError};
use crate::style::Style;
use crate::transform::apply_style;

/// Budgets for parsing a pasted fragment.
///
/// Exceeding any of them fails the transcode with a [`MalformedMarkupError`],
/// which makes the paste dispatcher fall back to the plain-text payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentLimits {
    /// Maximum fragment size in bytes.
    pub max_input_bytes: usize,
    /// Maximum element nesting depth.
    pub max_depth: usize,
    /// Maximum number of element and text nodes.
    pub max_nodes: usize,
    /// Maximum bytes for a single inline `style="..."` attribute value.
    pub max_inline_style_bytes: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: 4 * 1024 * 1024,
            max_depth: 256,
            max_nodes: 256 * 1024,
            max_inline_style_bytes: 16 * 1024,
        }
    }
}

impl DocumentLimits {
    /// Smaller bounds for constrained hosts.
    pub fn embedded() -> Self {
        Self {
            max_input_bytes: 256 * 1024,
            max_depth: 64,
            max_nodes: 16 * 1024,
            max_inline_style_bytes: 2 * 1024,
        }
    }
}

/// HTML transcoder options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Parse budgets.
    pub limits: DocumentLimits,
    /// Let a `b`/`strong` or `i`/`em` whose own inline style says
    /// `font-weight: normal` or `font-style: normal` contribute nothing.
    ///
    /// Off by default, so the tag always contributes. Turn it on for Google
    /// Docs payloads, which wrap the whole fragment in a normal-weight `<b>`.
    pub honor_normal_wrappers: bool,
}

impl DocumentOptions {
    /// Default options with explicit limits.
    pub fn with_limits(limits: DocumentLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }
}

/// Formatting flags inherited during the document walk.
///
/// The context is a plain value: each element derives its own copy from its
/// parent's and hands that copy to its children, so sibling subtrees never
/// see each other's flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleContext {
    /// Bold requested by a `b`/`strong` ancestor or a bold font weight.
    pub bold: bool,
    /// Italic requested by an `i`/`em` ancestor or an italic font style.
    pub italic: bool,
    /// Strikethrough requested by an `s`/`strike`/`del` ancestor or `line-through`.
    pub strike: bool,
    /// Monospace requested by a `code`/`pre` ancestor or a monospace family.
    pub mono: bool,
}

impl StyleContext {
    /// Extend this context with what an element contributes.
    ///
    /// Flags are only ever added. A `b`/`strong` tag always contributes bold
    /// and an `i`/`em` tag always contributes italic, whatever its own inline
    /// style says.
    pub fn with_element(self, tag: &str, inline: Option<&InlineStyle>) -> Self {
        self.extend(tag, inline, false)
    }

    /// Like [`Self::with_element`], but a `b`/`strong` (or `i`/`em`) whose own
    /// inline style declares a normal weight (or style) adds nothing.
    ///
    /// Google Docs wraps its whole clipboard payload in
    /// `<b style="font-weight:normal">`; see
    /// [`DocumentOptions::honor_normal_wrappers`].
    pub fn with_element_honoring_wrappers(self, tag: &str, inline: Option<&InlineStyle>) -> Self {
        self.extend(tag, inline, true)
    }

    fn extend(self, tag: &str, inline: Option<&InlineStyle>, honor_wrappers: bool) -> Self {
        let inline_bold = inline.is_some_and(InlineStyle::is_bold);
        let inline_italic = inline.is_some_and(InlineStyle::is_italic);
        let inline_strike = inline.is_some_and(|s| s.line_through);
        let inline_mono = inline.is_some_and(|s| s.monospace);
        let weight_reset =
            honor_wrappers && inline.is_some_and(|s| s.font_weight == Some(FontWeight::Normal));
        let style_reset =
            honor_wrappers && inline.is_some_and(|s| s.font_style == Some(FontStyle::Normal));
        let tag_bold = matches!(tag, "b" | "strong") && !weight_reset;
        let tag_italic = matches!(tag, "i" | "em") && !style_reset;
        Self {
            bold: self.bold || tag_bold || inline_bold,
            italic: self.italic || tag_italic || inline_italic,
            strike: self.strike || matches!(tag, "s" | "strike" | "del") || inline_strike,
            mono: self.mono
                || matches!(tag, "code" | "pre" | "kbd" | "samp" | "tt")
                || inline_mono,
        }
    }

    /// The one substitution style this context selects.
    ///
    /// Monospace beats bold, bold beats italic. Strike is not part of this
    /// choice; it is layered on top by [`Self::render`].
    pub fn primary_style(self) -> Option<Style> {
        if self.mono {
            Some(Style::Monospace)
        } else if self.bold {
            Some(Style::Bold)
        } else if self.italic {
            Some(Style::Italic)
        } else {
            None
        }
    }

    /// Render a text node under this context.
    pub fn render(self, text: &str) -> String {
        let base = match self.primary_style() {
            Some(style) => Cow::Owned(apply_style(text, style)),
            None => Cow::Borrowed(text),
        };
        if self.strike {
            apply_style(&base, Style::Strikethrough)
        } else {
            base.into_owned()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Text(String),
    Element(Element),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Element {
    tag: String,
    inline: Option<InlineStyle>,
    children: Vec<Node>,
}

impl Element {
    fn new(tag: String, inline: Option<InlineStyle>) -> Self {
        Self {
            tag,
            inline,
            children: Vec::new(),
        }
    }
}

/// Transcode an HTML fragment with default limits.
pub fn transcode_html(html: &str) -> Result<String, MalformedMarkupError> {
    transcode_html_with_limits(html, DocumentLimits::default())
}

/// Transcode an HTML fragment with explicit limits.
pub fn transcode_html_with_limits(
    html: &str,
    limits: DocumentLimits,
) -> Result<String, MalformedMarkupError> {
    transcode_html_with_options(html, DocumentOptions::with_limits(limits))
}

/// Transcode an HTML fragment with explicit options.
pub fn transcode_html_with_options(
    html: &str,
    options: DocumentOptions,
) -> Result<String, MalformedMarkupError> {
    let nodes = parse_tree(html, options.limits)?;
    let mut out = String::with_capacity(html.len());
    for node in &nodes {
        walk(node, StyleContext::default(), &options, &mut out);
    }
    Ok(collapse_blank_lines(&out).trim().to_string())
}

fn walk(node: &Node, ctx: StyleContext, options: &DocumentOptions, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&ctx.render(text)),
        Node::Element(element) => {
            if element.tag == "br" {
                out.push('\n');
                return;
            }
            let inline = element.inline.as_ref();
            let ctx = if options.honor_normal_wrappers {
                ctx.with_element_honoring_wrappers(&element.tag, inline)
            } else {
                ctx.with_element(&element.tag, inline)
            };
            for child in &element.children {
                walk(child, ctx, options, out);
            }
            if let Some(brk) = block_break(&element.tag) {
                out.push_str(brk);
            }
        }
    }
}

/// Trailing break emitted after a block element's content.
fn block_break(tag: &str) -> Option<&'static str> {
    match tag {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Some("\n\n"),
        "div" | "li" | "tr" => Some("\n"),
        _ => None,
    }
}

/// Squeeze runs of three or more newlines down to a single blank line.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            run += 1;
            if run <= 2 {
                out.push(ch);
            }
        } else {
            run = 0;
            out.push(ch);
        }
    }
    out
}

fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements that stop an implied `</p>` from reaching an outer paragraph.
const PARAGRAPH_SCOPE: &[&str] = &["button", "table", "td", "th", "caption", "object"];

/// Elements that stop an implied `</li>` from reaching an outer list item.
const LIST_ITEM_SCOPE: &[&str] = &["ul", "ol", "menu", "table", "td", "th"];

/// Start tags that end an open paragraph.
fn closes_paragraph(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "dd"
            | "details"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

fn should_skip_tag(tag: &str) -> bool {
    matches!(
        tag,
        "head" | "script" | "style" | "noscript" | "title" | "template"
    )
}

struct TreeBuilder {
    stack: Vec<Element>,
    limits: DocumentLimits,
    node_count: usize,
}

impl TreeBuilder {
    fn new(limits: DocumentLimits) -> Self {
        let mut stack = Vec::with_capacity(16);
        stack.push(Element::new(String::new(), None));
        Self {
            stack,
            limits,
            node_count: 0,
        }
    }

    fn count_node(&mut self, offset: usize) -> Result<(), MalformedMarkupError> {
        self.node_count += 1;
        if self.node_count > self.limits.max_nodes {
            return Err(MalformedMarkupError::new(
                ErrorPhase::Tree,
                "DOCUMENT_NODE_LIMIT",
                format!(
                    "Document nodes exceed max_nodes ({} > {})",
                    self.node_count, self.limits.max_nodes
                ),
            )
            .with_offset(offset)
            .with_limit("max_nodes", self.node_count, self.limits.max_nodes));
        }
        Ok(())
    }

    fn current(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn open(&mut self, element: Element, offset: usize) -> Result<(), MalformedMarkupError> {
        self.count_node(offset)?;
        let depth = self.stack.len();
        if depth > self.limits.max_depth {
            return Err(MalformedMarkupError::new(
                ErrorPhase::Tree,
                "DOCUMENT_DEPTH_LIMIT",
                format!(
                    "Element nesting exceeds max_depth ({} > {})",
                    depth, self.limits.max_depth
                ),
            )
            .with_offset(offset)
            .with_limit("max_depth", depth, self.limits.max_depth));
        }
        self.stack.push(element);
        Ok(())
    }

    fn leaf(&mut self, element: Element, offset: usize) -> Result<(), MalformedMarkupError> {
        self.count_node(offset)?;
        self.current().children.push(Node::Element(element));
        Ok(())
    }

    fn text(&mut self, text: &str, offset: usize) -> Result<(), MalformedMarkupError> {
        if text.is_empty() {
            return Ok(());
        }
        if let Some(Node::Text(existing)) = self.current().children.last_mut() {
            existing.push_str(text);
            return Ok(());
        }
        self.count_node(offset)?;
        self.current().children.push(Node::Text(text.to_string()));
        Ok(())
    }

    /// Close the innermost open element named `tag`, along with everything
    /// opened inside it. Stray end tags are ignored.
    fn close(&mut self, tag: &str) {
        let Some(pos) = self.stack.iter().rposition(|el| el.tag == tag) else {
            return;
        };
        self.unwind_to(pos);
    }

    /// Close elements whose end tag may be omitted before `tag` starts: an
    /// open `p` ends at the next block, an open `li` at the next `li`.
    fn close_implied(&mut self, tag: &str) {
        if closes_paragraph(tag) {
            self.close_in_scope("p", PARAGRAPH_SCOPE);
        }
        if tag == "li" {
            self.close_in_scope("li", LIST_ITEM_SCOPE);
        }
    }

    /// Close the innermost `target` unless one of `boundaries` is open inside it.
    fn close_in_scope(&mut self, target: &str, boundaries: &[&str]) {
        let found = self
            .stack
            .iter()
            .rposition(|el| el.tag == target || boundaries.contains(&el.tag.as_str()));
        if let Some(pos) = found.filter(|&pos| self.stack[pos].tag == target) {
            self.unwind_to(pos);
        }
    }

    fn unwind_to(&mut self, pos: usize) {
        if pos == 0 {
            return;
        }
        while self.stack.len() > pos {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(done) = self.stack.pop() {
            self.current().children.push(Node::Element(done));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.pop();
        }
        self.stack
            .pop()
            .map(|root| root.children)
            .unwrap_or_default()
    }
}

fn parse_tree(html: &str, limits: DocumentLimits) -> Result<Vec<Node>, MalformedMarkupError> {
    if html.len() > limits.max_input_bytes {
        return Err(MalformedMarkupError::new(
            ErrorPhase::Tree,
            "DOCUMENT_INPUT_BYTES_LIMIT",
            format!(
                "Fragment exceeds max_input_bytes ({} > {})",
                html.len(),
                limits.max_input_bytes
            ),
        )
        .with_limit("max_input_bytes", html.len(), limits.max_input_bytes));
    }

    let html = escape_stray_markup(html);
    let mut reader = Reader::from_reader(html.as_bytes());
    {
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;
        config.expand_empty_elements = false;
    }
    let mut buf = Vec::with_capacity(64);
    let mut builder = TreeBuilder::new(limits);
    let mut skip_depth = 0usize;
    let mut entity_buf = String::with_capacity(16);

    loop {
        let offset = reader_offset(&reader);
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                if tag == "body" {
                    skip_depth = 0;
                }
                if should_skip_tag(&tag) {
                    skip_depth += 1;
                } else if skip_depth == 0 {
                    builder.close_implied(&tag);
                    let element = element_from_start(&reader, &e, tag, &limits)?;
                    if is_void_tag(&element.tag) {
                        builder.leaf(element, offset)?;
                    } else {
                        builder.open(element, offset)?;
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                if skip_depth == 0 && !should_skip_tag(&tag) {
                    builder.close_implied(&tag);
                    let element = element_from_start(&reader, &e, tag, &limits)?;
                    builder.leaf(element, offset)?;
                }
            }
            Ok(Event::End(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                if should_skip_tag(&tag) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 && !is_void_tag(&tag) {
                    builder.close(&tag);
                }
            }
            Ok(Event::Text(e)) => {
                if skip_depth == 0 {
                    let text = e
                        .decode()
                        .map_err(|err| tokenize_error(format!("Decode error: {:?}", err), offset))?;
                    builder.text(&text, offset)?;
                }
            }
            Ok(Event::CData(e)) => {
                if skip_depth == 0 {
                    let text = reader
                        .decoder()
                        .decode(&e)
                        .map_err(|err| tokenize_error(format!("Decode error: {:?}", err), offset))?;
                    builder.text(&text, offset)?;
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if skip_depth == 0 {
                    let name = e
                        .decode()
                        .map_err(|err| tokenize_error(format!("Decode error: {:?}", err), offset))?;
                    entity_buf.clear();
                    entity_buf.push('&');
                    entity_buf.push_str(&name);
                    entity_buf.push(';');
                    match unescape_with(&entity_buf, resolve_html5_entity) {
                        Ok(resolved) => builder.text(&resolved, offset)?,
                        Err(_) => builder.text(&entity_buf, offset)?,
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(tokenize_error(
                    format!("Markup error: {:?}", err),
                    reader_offset(&reader),
                ));
            }
        }
        buf.clear();
    }

    Ok(builder.finish())
}

/// Escape `&` and `<` that cannot start a reference or a tag.
///
/// Clipboard HTML from browsers is not always well formed: `R&D` or
/// `a < b` show up as raw text. Left alone, the tokenizer either fails on
/// them or swallows the text after them. Offsets reported past an escaped
/// character shift by the length of the inserted escape.
fn escape_stray_markup(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let mut escaped: Option<String> = None;
    let mut copied = 0usize;
    for (idx, _) in html.match_indices(|ch: char| ch == '&' || ch == '<') {
        let rest = &bytes[idx + 1..];
        let (stray, replacement) = if bytes[idx] == b'&' {
            (!starts_with_reference(rest), "&amp;")
        } else {
            (!starts_with_tag(rest), "&lt;")
        };
        if !stray {
            continue;
        }
        let out = escaped.get_or_insert_with(|| String::with_capacity(html.len() + 16));
        out.push_str(&html[copied..idx]);
        out.push_str(replacement);
        copied = idx + 1;
    }
    match escaped {
        Some(mut out) => {
            out.push_str(&html[copied..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(html),
    }
}

/// Whether the bytes after a `&` form `name;`, `#digits;` or `#xhex;`.
fn starts_with_reference(rest: &[u8]) -> bool {
    let (body, radix) = match rest {
        [b'#', b'x' | b'X', body @ ..] => (body, 16),
        [b'#', body @ ..] => (body, 10),
        body => (body, 36),
    };
    let len = body
        .iter()
        .take_while(|b| char::from(**b).is_digit(radix))
        .count();
    len > 0 && body.get(len) == Some(&b';')
}

/// Whether the bytes after a `<` open a tag, end tag, comment or declaration.
fn starts_with_tag(rest: &[u8]) -> bool {
    rest.first()
        .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

fn tokenize_error(message: String, offset: usize) -> MalformedMarkupError {
    MalformedMarkupError::new(ErrorPhase::Tokenize, "DOCUMENT_TOKENIZE_ERROR", message)
        .with_offset(offset)
}

fn reader_offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String, MalformedMarkupError> {
    let decoded = reader.decoder().decode(raw).map_err(|err| {
        tokenize_error(
            format!("Tag name decode error: {:?}", err),
            reader_offset(reader),
        )
    })?;
    let local_name = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Ok(local_name.to_ascii_lowercase())
}

fn element_from_start(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    tag: String,
    limits: &DocumentLimits,
) -> Result<Element, MalformedMarkupError> {
    let mut inline = None;
    for attr in e.html_attributes().flatten() {
        if !attr.key.as_ref().eq_ignore_ascii_case(b"style") {
            continue;
        }
        let Ok(raw) = reader.decoder().decode(&attr.value) else {
            continue;
        };
        let value = unescape_with(&raw, resolve_html5_entity)
            .unwrap_or_else(|_| Cow::Borrowed(raw.as_ref()));
        if value.len() > limits.max_inline_style_bytes {
            return Err(MalformedMarkupError::new(
                ErrorPhase::Tree,
                "DOCUMENT_INLINE_STYLE_LIMIT",
                format!(
                    "Inline style on <{}> exceeds max_inline_style_bytes ({} > {})",
                    tag,
                    value.len(),
                    limits.max_inline_style_bytes
                ),
            )
            .with_offset(reader_offset(reader))
            .with_limit(
                "max_inline_style_bytes",
                value.len(),
                limits.max_inline_style_bytes,
            ));
        }
        inline = Some(parse_inline_style(&value));
    }
    Ok(Element::new(tag, inline))
}

const FORMATTING_TAGS: &[&str] = &["b", "strong", "i", "em", "s", "strike", "del", "code", "pre"];
const FORMATTING_PROPERTIES: &[&str] = &["font-weight", "font-style", "text-decoration"];

/// Cheap check for whether an HTML payload carries any emphasis worth
/// transcoding.
///
/// Matches an opening emphasis, strike or code tag, or a quoted inline
/// `style` attribute that mentions `font-weight`, `font-style` or
/// `text-decoration`. Case-insensitive.
pub fn has_formatting(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    for (idx, _) in lower.match_indices('<') {
        let rest = &lower[idx + 1..];
        for tag in FORMATTING_TAGS {
            let Some(after) = rest.strip_prefix(tag) else {
                continue;
            };
            let boundary = after
                .chars()
                .next()
                .is_none_or(|ch| !(ch.is_ascii_alphanumeric() || ch == '_'));
            if boundary {
                return true;
            }
        }
    }
    for (idx, _) in lower.match_indices("style=") {
        let rest = &lower[idx + "style=".len()..];
        let Some(quote) = rest.chars().next().filter(|ch| matches!(ch, '"' | '\'')) else {
            continue;
        };
        let value = &rest[1..];
        let value = value.find(quote).map_or(value, |end| &value[..end]);
        if FORMATTING_PROPERTIES.iter().any(|prop| value.contains(prop)) {
            return true;
        }
    }
    false
}
