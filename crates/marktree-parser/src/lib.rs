//! Marktree Parser
//!
//! Streaming parse sessions over a line-oriented CommonMark/GFM grammar
//! engine. Input arrives as byte chunks in any split; the session hands
//! complete lines to the block scanner as soon as they are available, so
//! memory stays bounded by one chunk plus the tree under construction.
//!
//! # Example
//!
//! ```
//! use marktree_parser::Session;
//! use marktree_core::ParseOptions;
//!
//! let mut session = Session::new(ParseOptions::default());
//! session.feed(b"# Hello ");
//! session.feed(b"World!\n");
//! let tree = session.finish().unwrap();
//! assert_eq!(tree.len(), 3); // document, heading, text
//! ```

pub mod entities;
pub mod inline;
pub mod source;

pub use source::{ChunkSource, ReadSource};

use std::sync::LazyLock;

use log::{debug, trace};
use marktree_core::{
    Kind, ListData, ListType, MarktreeError, NodeId, NodeValue, ParseOptions, Position, Result,
    Span, Tree,
};
use regex::Regex;

// =============================================================================
// Regex patterns
// =============================================================================

/// ATX heading: 1-6 hashes, optional content
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:\s+(.*))?$").unwrap());

/// Thematic break: three or more -, *, or _ with optional interior spaces
static THEMATIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

/// Code fence open: ``` or ~~~ with optional info string
static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( {0,3})(`{3,}|~{3,})[ \t]*(.*)$").unwrap());

/// List item: -, +, * bullets or 1. / 1) ordered markers
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)([-+*]|\d{1,9}[.)])(?:[ \t]+(.*))?$").unwrap());

/// One level of block quote marker
static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}> ?(.*)$").unwrap());

/// Start of an HTML block: a tag, closing tag, comment, or declaration
static HTML_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}<(?:/?[A-Za-z]|!--|\?)").unwrap());

/// Footnote definition: [^name]: content
static FOOTNOTE_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}\[\^([^\]\s]+)\]:[ \t]*(.*)$").unwrap());

// =============================================================================
// Session state
// =============================================================================

/// An open container block on the engine's stack.
#[derive(Debug)]
enum Container {
    Quote(NodeId),
    List {
        node: NodeId,
        indent: usize,
        list_type: ListType,
    },
    Item {
        node: NodeId,
        content_indent: usize,
    },
    Footnote(NodeId),
}

/// An open paragraph accumulating source lines.
#[derive(Debug)]
struct Para {
    parent: NodeId,
    lines: Vec<String>,
    start_line: usize,
    end_line: usize,
}

/// An open fenced code block.
#[derive(Debug)]
struct OpenCode {
    node: NodeId,
    fence: char,
    len: usize,
    indent: usize,
}

/// A streaming parse session.
///
/// Created once, fed any number of times, finished exactly once. `finish`
/// consumes the session, so feeding after finish is rejected at compile
/// time. An abandoned session simply drops its partial tree.
#[derive(Debug)]
pub struct Session {
    options: ParseOptions,
    tree: Tree,
    stack: Vec<Container>,
    para: Option<Para>,
    code: Option<OpenCode>,
    html: Option<NodeId>,
    /// Holdover for a UTF-8 sequence split across chunk boundaries
    byte_tail: Vec<u8>,
    /// Current unterminated line
    line_buf: String,
    line_no: usize,
    last_nonblank: (usize, usize),
    blank_pending: bool,
}

impl Session {
    /// Create a session with the given parse options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            tree: Tree::new(),
            stack: Vec::new(),
            para: None,
            code: None,
            html: None,
            byte_tail: Vec::new(),
            line_buf: String::new(),
            line_no: 0,
            last_nonblank: (1, 1),
            blank_pending: false,
        }
    }

    /// Parse a complete in-memory document in one step.
    pub fn parse_document(text: &str, options: ParseOptions) -> Result<Tree> {
        let mut session = Session::new(options);
        session.feed(text.as_bytes());
        session.finish()
    }

    /// Incorporate one chunk of input.
    ///
    /// The chunk boundary may fall anywhere, including inside a UTF-8
    /// sequence; the split bytes are held over to the next call.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.byte_tail.extend_from_slice(bytes);
        let data = std::mem::take(&mut self.byte_tail);
        let mut rest = data.as_slice();
        let mut text = String::new();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(n) => {
                            // Invalid sequence: substitute and move on
                            text.push('\u{FFFD}');
                            rest = &after[n..];
                        }
                        None => {
                            // Incomplete tail: wait for the next chunk
                            self.byte_tail = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        self.consume_text(&text);
    }

    /// Drive the pull loop over a byte source until end of input.
    ///
    /// A transport error aborts immediately without finishing the session.
    pub fn read_from<S: ChunkSource>(&mut self, source: &mut S) -> Result<()> {
        let mut buf = [0u8; 8192];
        loop {
            let n = source.next_chunk(&mut buf)?;
            if n == 0 {
                trace!("byte source reached end of input");
                return Ok(());
            }
            self.feed(&buf[..n]);
        }
    }

    /// Flush the grammar engine and return the finished document root.
    pub fn finish(mut self) -> Result<Tree> {
        if !self.byte_tail.is_empty() {
            // Truncated UTF-8 sequence at end of input
            self.byte_tail.clear();
            self.line_buf.push('\u{FFFD}');
        }
        if !self.line_buf.is_empty() {
            let line = std::mem::take(&mut self.line_buf);
            self.line_no += 1;
            self.handle_line(&line);
        }
        self.close_code();
        self.close_html();
        self.close_paragraph();
        while !self.stack.is_empty() {
            self.close_top();
        }

        if self.tree.kind(self.tree.root()) != Some(Kind::Document) {
            return Err(MarktreeError::Parse(
                "grammar engine could not produce a document root".to_string(),
            ));
        }
        let (end_line, end_len) = self.last_nonblank;
        if let Some(root) = self.tree.get_mut(self.tree.root()) {
            root.span.end = Position::new(end_line, end_len.max(1));
        }
        debug!(
            "parsed {} nodes over {} input lines",
            self.tree.len(),
            self.line_no
        );
        Ok(self.tree)
    }

    // =========================================================================
    // Line assembly
    // =========================================================================

    fn consume_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                let mut line = std::mem::take(&mut self.line_buf);
                if line.ends_with('\r') {
                    line.pop();
                }
                self.line_no += 1;
                self.handle_line(&line);
            } else {
                self.line_buf.push(ch);
            }
        }
    }

    // =========================================================================
    // Block structure
    // =========================================================================

    fn handle_line(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.last_nonblank = (self.line_no, line.chars().count());
        }

        if self.code.is_some() {
            self.code_line(line);
            return;
        }
        if self.html.is_some() {
            self.html_line(line);
            return;
        }

        // Strip block quote markers and count the quote depth of this line
        let mut depth = 0;
        let mut rest = line.to_string();
        while let Some(caps) = QUOTE_RE.captures(&rest) {
            depth += 1;
            rest = caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string();
        }

        let open_quotes = self.quote_depth();
        if depth < open_quotes {
            let blank = rest.trim().is_empty();
            if depth == 0 && !blank && self.para.is_some() && !starts_block(&rest) {
                // Lazy continuation of a quoted paragraph
                self.push_para_line(rest.trim_start());
                return;
            }
            self.close_paragraph();
            self.close_to_quote_depth(depth);
        } else if depth > open_quotes {
            self.close_paragraph();
            self.close_lists();
            for _ in open_quotes..depth {
                let q = self.tree.add_node(NodeValue::BlockQuote, self.line_span());
                let parent = self.container();
                self.tree.append_child(parent, q);
                self.stack.push(Container::Quote(q));
            }
        }

        self.block_line(&rest);
    }

    fn block_line(&mut self, rest: &str) {
        if rest.trim().is_empty() {
            self.close_paragraph();
            if matches!(self.stack.last(), Some(Container::Footnote(_))) {
                self.close_top();
            }
            self.blank_pending = true;
            return;
        }
        let blank_before = std::mem::take(&mut self.blank_pending);
        let indent = rest.chars().take_while(|c| c.is_whitespace()).count();

        if THEMATIC_RE.is_match(rest) {
            self.close_paragraph();
            self.close_lists();
            let hr = self.tree.add_node(NodeValue::ThematicBreak, self.line_span());
            let parent = self.container();
            self.tree.append_child(parent, hr);
            return;
        }

        if let Some(caps) = LIST_ITEM_RE.captures(rest) {
            let marker = caps.get(2).map(|m| m.as_str()).unwrap_or("-").to_string();
            let content = caps.get(3).map(|m| m.as_str()).unwrap_or("").to_string();
            self.list_item(indent, &marker, &content, blank_before);
            return;
        }

        if let Some(caps) = HEADING_RE.captures(rest) {
            self.close_paragraph();
            self.close_lists();
            let level = caps.get(1).map(|m| m.as_str().len()).unwrap_or(1) as u8;
            let content = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let content = strip_closing_hashes(content);
            let h = self
                .tree
                .add_node(NodeValue::Heading { level }, self.line_span());
            let parent = self.container();
            self.tree.append_child(parent, h);
            inline::parse_into(&mut self.tree, h, content.trim(), &self.options);
            return;
        }

        if let Some(caps) = FENCE_OPEN_RE.captures(rest) {
            self.close_paragraph();
            if !self.continues_item(indent) {
                self.close_lists();
            }
            let fence_indent = caps.get(1).map(|m| m.as_str().len()).unwrap_or(0);
            let fence_str = caps.get(2).map(|m| m.as_str()).unwrap_or("```");
            let info_raw = caps.get(3).map(|m| m.as_str()).unwrap_or("").trim();
            let info = if info_raw.is_empty() {
                None
            } else if self.options.full_info_string {
                Some(info_raw.to_string())
            } else {
                Some(
                    info_raw
                        .split_whitespace()
                        .next()
                        .unwrap_or(info_raw)
                        .to_string(),
                )
            };
            let node = self.tree.add_node(
                NodeValue::CodeBlock {
                    info,
                    literal: String::new(),
                },
                self.line_span(),
            );
            let parent = self.container();
            self.tree.append_child(parent, node);
            self.code = Some(OpenCode {
                node,
                fence: fence_str.chars().next().unwrap_or('`'),
                len: fence_str.len(),
                indent: fence_indent,
            });
            return;
        }

        if self.options.footnotes {
            if let Some(caps) = FOOTNOTE_DEF_RE.captures(rest) {
                self.close_paragraph();
                self.close_lists();
                if matches!(self.stack.last(), Some(Container::Footnote(_))) {
                    self.close_top();
                }
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string();
                let content = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                let node = self
                    .tree
                    .add_node(NodeValue::FootnoteDefinition { name }, self.line_span());
                let parent = self.container();
                self.tree.append_child(parent, node);
                self.stack.push(Container::Footnote(node));
                if !content.trim().is_empty() {
                    self.open_paragraph(node, content);
                }
                return;
            }
        }

        if self.para.is_none() && HTML_BLOCK_RE.is_match(rest) {
            if !self.continues_item(indent) {
                self.close_lists();
            }
            let node = self.tree.add_node(
                NodeValue::HtmlBlock {
                    literal: format!("{}\n", rest),
                },
                self.line_span(),
            );
            let parent = self.container();
            self.tree.append_child(parent, node);
            self.html = Some(node);
            return;
        }

        // Plain text: paragraph continuation or a fresh paragraph
        if self.para.is_some() {
            self.push_para_line(rest.trim_start());
            return;
        }
        if let Some(ci) = self.item_content_indent() {
            if indent >= ci {
                if blank_before {
                    self.set_innermost_list_loose();
                }
                let content: String = rest.chars().skip(ci).collect();
                let parent = self.container();
                self.open_paragraph(parent, &content);
                return;
            }
            self.close_lists();
        }
        let parent = self.container();
        self.open_paragraph(parent, rest.trim_start());
    }

    fn list_item(&mut self, indent: usize, marker: &str, content: &str, blank_before: bool) {
        self.close_paragraph();
        if matches!(self.stack.last(), Some(Container::Footnote(_))) {
            self.close_top();
        }

        let ordered = marker.chars().next().is_some_and(|c| c.is_ascii_digit());
        let list_type = if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        };
        let start = if ordered {
            marker
                .trim_end_matches(['.', ')'])
                .parse::<usize>()
                .unwrap_or(1)
        } else {
            1
        };

        // Pop levels indented deeper than this item
        while matches!(self.top_list_indent(), Some(li) if li > indent) {
            self.close_one_list_level();
        }

        let need_push = match self.top_list_indent() {
            Some(li) => indent > li,
            None => true,
        };

        if need_push {
            let node = self.tree.add_node(
                NodeValue::List(ListData {
                    list_type,
                    start,
                    tight: true,
                }),
                self.line_span(),
            );
            let parent = self.container();
            self.tree.append_child(parent, node);
            self.stack.push(Container::List {
                node,
                indent,
                list_type,
            });
        } else {
            // Same level: the previous item ends here
            if matches!(self.stack.last(), Some(Container::Item { .. })) {
                self.close_top();
            }
            let same_type = matches!(
                self.stack.last(),
                Some(Container::List { list_type: lt, .. }) if *lt == list_type
            );
            if !same_type {
                self.close_one_list_level();
                let node = self.tree.add_node(
                    NodeValue::List(ListData {
                        list_type,
                        start,
                        tight: true,
                    }),
                    self.line_span(),
                );
                let parent = self.container();
                self.tree.append_child(parent, node);
                self.stack.push(Container::List {
                    node,
                    indent,
                    list_type,
                });
            } else if blank_before {
                // A blank line between items makes the list loose
                self.set_innermost_list_loose();
            }
        }

        let list_node = match self.stack.last() {
            Some(Container::List { node, .. }) => *node,
            _ => self.container(),
        };
        let item = self.tree.add_node(NodeValue::Item, self.line_span());
        self.tree.append_child(list_node, item);
        self.stack.push(Container::Item {
            node: item,
            content_indent: indent + marker.chars().count() + 1,
        });
        if !content.trim().is_empty() {
            self.open_paragraph(item, content);
        }
    }

    // =========================================================================
    // Leaf block state
    // =========================================================================

    fn code_line(&mut self, line: &str) {
        let closes = match &self.code {
            Some(code) => {
                let trimmed = line.trim();
                !trimmed.is_empty()
                    && trimmed.chars().all(|c| c == code.fence)
                    && trimmed.len() >= code.len
            }
            None => false,
        };
        if closes {
            self.close_code();
            return;
        }
        if let Some(code) = &self.code {
            let node = code.node;
            let indent = code.indent;
            let stripped: String = strip_indent(line, indent);
            if let Some(n) = self.tree.get_mut(node) {
                if let NodeValue::CodeBlock { literal, .. } = &mut n.value {
                    literal.push_str(&stripped);
                    literal.push('\n');
                }
            }
        }
    }

    fn close_code(&mut self) {
        if let Some(code) = self.code.take() {
            self.set_end(code.node);
        }
    }

    fn html_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.close_html();
            self.blank_pending = true;
            return;
        }
        if let Some(node) = self.html {
            if let Some(n) = self.tree.get_mut(node) {
                if let NodeValue::HtmlBlock { literal } = &mut n.value {
                    literal.push_str(line);
                    literal.push('\n');
                }
            }
        }
    }

    fn close_html(&mut self) {
        if let Some(node) = self.html.take() {
            self.set_end(node);
        }
    }

    fn open_paragraph(&mut self, parent: NodeId, first_line: &str) {
        self.para = Some(Para {
            parent,
            lines: vec![first_line.to_string()],
            start_line: self.line_no,
            end_line: self.line_no,
        });
    }

    fn push_para_line(&mut self, line: &str) {
        if let Some(para) = &mut self.para {
            para.lines.push(line.to_string());
            para.end_line = self.line_no;
        }
    }

    fn close_paragraph(&mut self) {
        if let Some(para) = self.para.take() {
            let span = Span::new(
                Position::new(para.start_line, 1),
                Position::new(
                    para.end_line,
                    para.lines.last().map(|l| l.chars().count()).unwrap_or(1).max(1),
                ),
            );
            let node = self.tree.add_node(NodeValue::Paragraph, span);
            self.tree.append_child(para.parent, node);
            inline::parse_lines(&mut self.tree, node, &para.lines, &self.options);
        }
    }

    // =========================================================================
    // Container stack
    // =========================================================================

    fn container(&self) -> NodeId {
        match self.stack.last() {
            Some(Container::Quote(id))
            | Some(Container::List { node: id, .. })
            | Some(Container::Item { node: id, .. })
            | Some(Container::Footnote(id)) => *id,
            None => self.tree.root(),
        }
    }

    fn quote_depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|c| matches!(c, Container::Quote(_)))
            .count()
    }

    fn top_list_indent(&self) -> Option<usize> {
        match self.stack.last() {
            Some(Container::List { indent, .. }) => Some(*indent),
            Some(Container::Item { .. }) => match self.stack.get(self.stack.len() - 2) {
                Some(Container::List { indent, .. }) => Some(*indent),
                _ => None,
            },
            _ => None,
        }
    }

    fn item_content_indent(&self) -> Option<usize> {
        match self.stack.last() {
            Some(Container::Item { content_indent, .. }) => Some(*content_indent),
            _ => None,
        }
    }

    fn continues_item(&self, indent: usize) -> bool {
        matches!(self.item_content_indent(), Some(ci) if indent >= ci)
    }

    fn set_innermost_list_loose(&mut self) {
        let node = self.stack.iter().rev().find_map(|c| match c {
            Container::List { node, .. } => Some(*node),
            _ => None,
        });
        if let Some(node) = node {
            if let Some(n) = self.tree.get_mut(node) {
                if let NodeValue::List(data) = &mut n.value {
                    data.tight = false;
                }
            }
        }
    }

    fn close_top(&mut self) {
        if let Some(container) = self.stack.pop() {
            let id = match container {
                Container::Quote(id)
                | Container::List { node: id, .. }
                | Container::Item { node: id, .. }
                | Container::Footnote(id) => id,
            };
            self.set_end(id);
        }
    }

    fn close_one_list_level(&mut self) {
        if matches!(self.stack.last(), Some(Container::Item { .. })) {
            self.close_top();
        }
        if matches!(self.stack.last(), Some(Container::List { .. })) {
            self.close_top();
        }
    }

    fn close_lists(&mut self) {
        while matches!(
            self.stack.last(),
            Some(Container::List { .. }) | Some(Container::Item { .. })
        ) {
            self.close_top();
        }
    }

    fn close_to_quote_depth(&mut self, depth: usize) {
        while self.quote_depth() > depth {
            while !matches!(self.stack.last(), Some(Container::Quote(_))) {
                if self.stack.is_empty() {
                    return;
                }
                self.close_top();
            }
            self.close_top();
        }
    }

    // =========================================================================
    // Source positions
    // =========================================================================

    fn line_span(&self) -> Span {
        Span::new(
            Position::new(self.line_no.max(1), 1),
            Position::new(self.line_no.max(1), self.last_nonblank.1.max(1)),
        )
    }

    fn set_end(&mut self, id: NodeId) {
        let (line, len) = self.last_nonblank;
        if let Some(node) = self.tree.get_mut(id) {
            node.span.end = Position::new(line, len.max(1));
        }
    }
}

/// Whether a line opens a non-paragraph block, for lazy-continuation checks.
fn starts_block(rest: &str) -> bool {
    THEMATIC_RE.is_match(rest)
        || LIST_ITEM_RE.is_match(rest)
        || HEADING_RE.is_match(rest)
        || FENCE_OPEN_RE.is_match(rest)
}

/// Strip an optional run of closing hashes from an ATX heading.
fn strip_closing_hashes(content: &str) -> &str {
    let trimmed = content.trim_end();
    let stripped = trimmed.trim_end_matches('#');
    if stripped.len() < trimmed.len() && (stripped.is_empty() || stripped.ends_with(char::is_whitespace)) {
        stripped.trim_end()
    } else {
        trimmed
    }
}

/// Remove up to `n` leading space characters.
fn strip_indent(line: &str, n: usize) -> String {
    let mut skipped = 0;
    line.chars()
        .skip_while(|&c| {
            if skipped < n && c == ' ' {
                skipped += 1;
                true
            } else {
                false
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Tree {
        Session::parse_document(text, ParseOptions::default()).unwrap()
    }

    fn kinds(tree: &Tree) -> Vec<Kind> {
        tree.kind_sequence()
    }

    #[test]
    fn test_round_trip_scenario_kind_sequence() {
        let input = "# Hello World!\n\nFirst test **I** _write_:\n\n- A list of three things\n- poop\n- noob";
        let tree = parse(input);
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::Heading,
                Kind::Text,
                Kind::Paragraph,
                Kind::Text,
                Kind::Strong,
                Kind::Text,
                Kind::Text,
                Kind::Emph,
                Kind::Text,
                Kind::Text,
                Kind::List,
                Kind::Item,
                Kind::Paragraph,
                Kind::Text,
                Kind::Item,
                Kind::Paragraph,
                Kind::Text,
                Kind::Item,
                Kind::Paragraph,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_bare_newline_is_softbreak() {
        let tree = parse("line one\nline two");
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::Paragraph,
                Kind::Text,
                Kind::SoftBreak,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_two_trailing_spaces_is_linebreak() {
        let tree = parse("line one  \nline two");
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::Paragraph,
                Kind::Text,
                Kind::LineBreak,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let input = "# Title\n\nPara **bold** text\n\n- a\n- b\n\n> quoted\n";
        let whole = parse(input);

        // Byte-at-a-time
        let mut session = Session::new(ParseOptions::default());
        for b in input.as_bytes() {
            session.feed(std::slice::from_ref(b));
        }
        assert_eq!(session.finish().unwrap(), whole);

        // Awkward splits
        let mut session = Session::new(ParseOptions::default());
        let bytes = input.as_bytes();
        session.feed(&bytes[..5]);
        session.feed(&bytes[5..13]);
        session.feed(&bytes[13..]);
        assert_eq!(session.finish().unwrap(), whole);
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let input = "héllo wörld";
        let whole = parse(input);
        let bytes = input.as_bytes();
        // Split inside the two-byte é sequence
        let mut session = Session::new(ParseOptions::default());
        session.feed(&bytes[..2]);
        session.feed(&bytes[2..]);
        assert_eq!(session.finish().unwrap(), whole);
    }

    #[test]
    fn test_ampersand_run_ending_in_multibyte_char() {
        let input = format!("&{}é\n", "a".repeat(30));
        let tree = parse(&input);
        let p = tree[tree.root()].first_child().unwrap();
        let t = tree[p].first_child().unwrap();
        assert_eq!(tree[t].value.literal(), Some(input.trim_end()));
    }

    #[test]
    fn test_invalid_utf8_becomes_replacement() {
        let mut session = Session::new(ParseOptions {
            validate_utf8: true,
            ..Default::default()
        });
        session.feed(b"a\xFFb");
        let tree = session.finish().unwrap();
        let p = tree[tree.root()].first_child().unwrap();
        let t = tree[p].first_child().unwrap();
        assert_eq!(tree[t].value.literal(), Some("a\u{FFFD}b"));
    }

    #[test]
    fn test_zero_feed_finish_is_empty_document() {
        let session = Session::new(ParseOptions::default());
        let tree = session.finish().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.kind(tree.root()), Some(Kind::Document));
        assert!(tree[tree.root()].first_child().is_none());
    }

    #[test]
    fn test_transport_error_aborts_session() {
        struct Failing;
        impl ChunkSource for Failing {
            fn next_chunk(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "stream gone",
                ))
            }
        }
        let mut session = Session::new(ParseOptions::default());
        let err = session.read_from(&mut Failing).unwrap_err();
        assert!(matches!(err, MarktreeError::Io(_)));
    }

    #[test]
    fn test_read_from_pulls_until_eof() {
        let input = "# Hi\n\ntext\n";
        let mut source = ReadSource::new(input.as_bytes());
        let mut session = Session::new(ParseOptions::default());
        session.read_from(&mut source).unwrap();
        let tree = session.finish().unwrap();
        assert_eq!(tree, parse(input));
    }

    #[test]
    fn test_fenced_code_block() {
        let tree = parse("```rust ignore\nlet x = 1;\nlet y = 2;\n```\n");
        let code = tree[tree.root()].first_child().unwrap();
        assert_eq!(tree.kind(code), Some(Kind::CodeBlock));
        match &tree[code].value {
            NodeValue::CodeBlock { info, literal } => {
                // Only the first word of the info string by default
                assert_eq!(info.as_deref(), Some("rust"));
                assert_eq!(literal, "let x = 1;\nlet y = 2;\n");
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_full_info_string_option() {
        let tree = Session::parse_document(
            "```rust ignore\nx\n```\n",
            ParseOptions {
                full_info_string: true,
                ..Default::default()
            },
        )
        .unwrap();
        let code = tree[tree.root()].first_child().unwrap();
        match &tree[code].value {
            NodeValue::CodeBlock { info, .. } => assert_eq!(info.as_deref(), Some("rust ignore")),
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_fence_closes_at_finish() {
        let tree = parse("```\ndangling\n");
        let code = tree[tree.root()].first_child().unwrap();
        match &tree[code].value {
            NodeValue::CodeBlock { literal, .. } => assert_eq!(literal, "dangling\n"),
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_block_quotes() {
        let tree = parse("> outer\n>> inner\n");
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::BlockQuote,
                Kind::Paragraph,
                Kind::Text,
                Kind::BlockQuote,
                Kind::Paragraph,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_quote_lazy_continuation() {
        let tree = parse("> quoted\nstill quoted\n");
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::BlockQuote,
                Kind::Paragraph,
                Kind::Text,
                Kind::SoftBreak,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_ordered_list_start() {
        let tree = parse("3. three\n4. four\n");
        let list = tree[tree.root()].first_child().unwrap();
        match &tree[list].value {
            NodeValue::List(data) => {
                assert_eq!(data.list_type, ListType::Ordered);
                assert_eq!(data.start, 3);
                assert!(data.tight);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_between_items_makes_list_loose() {
        let tree = parse("- a\n\n- b\n");
        let list = tree[tree.root()].first_child().unwrap();
        match &tree[list].value {
            NodeValue::List(data) => assert!(!data.tight),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_list_by_indent() {
        let tree = parse("- a\n  - b\n");
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::List,
                Kind::Item,
                Kind::Paragraph,
                Kind::Text,
                Kind::List,
                Kind::Item,
                Kind::Paragraph,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_thematic_break_beats_list() {
        let tree = parse("- - -\n");
        assert_eq!(kinds(&tree), vec![Kind::Document, Kind::ThematicBreak]);
    }

    #[test]
    fn test_heading_interrupts_paragraph() {
        let tree = parse("text\n# Head\n");
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::Paragraph,
                Kind::Text,
                Kind::Heading,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_heading_closing_hashes_stripped() {
        let tree = parse("## Title ##\n");
        let h = tree[tree.root()].first_child().unwrap();
        let t = tree[h].first_child().unwrap();
        assert_eq!(tree[t].value.literal(), Some("Title"));
    }

    #[test]
    fn test_html_block_collected_until_blank() {
        let tree = parse("<div>\n<span>x</span>\n</div>\n\nafter\n");
        let html = tree[tree.root()].first_child().unwrap();
        match &tree[html].value {
            NodeValue::HtmlBlock { literal } => {
                assert_eq!(literal, "<div>\n<span>x</span>\n</div>\n");
            }
            other => panic!("expected html block, got {:?}", other),
        }
        assert_eq!(
            tree.kind(tree[html].next_sibling().unwrap()),
            Some(Kind::Paragraph)
        );
    }

    #[test]
    fn test_footnote_definition_requires_option() {
        let tree = parse("[^note]: the definition\n");
        // Without the option this is a plain paragraph
        assert_eq!(
            kinds(&tree),
            vec![Kind::Document, Kind::Paragraph, Kind::Text]
        );

        let tree = Session::parse_document(
            "body[^note]\n\n[^note]: the definition\n",
            ParseOptions {
                footnotes: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::Paragraph,
                Kind::Text,
                Kind::FootnoteReference,
                Kind::FootnoteDefinition,
                Kind::Paragraph,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_normalize_flag_has_no_effect() {
        let plain = parse("a *b* c\n");
        let normalized = Session::parse_document(
            "a *b* c\n",
            ParseOptions {
                normalize: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plain, normalized);
    }

    #[test]
    fn test_crlf_line_endings() {
        let tree = parse("# Hi\r\n\r\ntext\r\n");
        assert_eq!(
            kinds(&tree),
            vec![
                Kind::Document,
                Kind::Heading,
                Kind::Text,
                Kind::Paragraph,
                Kind::Text,
            ]
        );
    }

    #[test]
    fn test_block_spans_recorded() {
        let tree = parse("# Title\n\npara line\n");
        let h = tree[tree.root()].first_child().unwrap();
        assert_eq!(tree[h].span.start.line, 1);
        let p = tree[h].next_sibling().unwrap();
        assert_eq!(tree[p].span.start.line, 3);
        assert_eq!(tree[p].span.end.line, 3);
    }
}
