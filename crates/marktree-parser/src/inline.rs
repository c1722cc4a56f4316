//! Inline grammar.
//!
//! Turns the text content of a paragraph or heading into inline nodes:
//! emphasis, strong emphasis, code spans, links, images, inline HTML,
//! footnote references, and soft/hard breaks. Entity references are decoded
//! here so renderers always see plain Unicode.

use std::sync::LazyLock;

use marktree_core::{NodeId, NodeValue, ParseOptions, Span, Tree};
use regex::Regex;

use crate::entities::decode_entities;

/// Shape of an inline HTML tag: open/close/self-closing tag or comment.
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:/?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?|!--.*--)$").unwrap()
});

/// Looser tag shape accepted under the liberal-html-tag option: anything
/// non-empty that does not open another angle bracket.
static LIBERAL_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/?[^<>\s][^<>]*$").unwrap());

/// Autolink body: a URI scheme followed by a nonempty remainder.
static AUTOLINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:[^\s<>]+$").unwrap());

/// Parse the accumulated lines of a paragraph-like block into `parent`,
/// joining lines with softbreak nodes (or linebreaks where the source asked
/// for a hard break).
pub(crate) fn parse_lines(
    tree: &mut Tree,
    parent: NodeId,
    lines: &[String],
    options: &ParseOptions,
) {
    for (i, line) in lines.iter().enumerate() {
        let last = i + 1 == lines.len();
        let (content, hard) = strip_break_suffix(line);
        parse_into(tree, parent, content, options);
        if !last {
            let brk = if hard {
                NodeValue::LineBreak
            } else {
                NodeValue::SoftBreak
            };
            let id = tree.add_node(brk, Span::default());
            tree.append_child(parent, id);
        }
    }
}

/// A trailing backslash or two trailing spaces request a hard break.
fn strip_break_suffix(line: &str) -> (&str, bool) {
    if let Some(stripped) = line.strip_suffix('\\') {
        if !stripped.ends_with('\\') {
            return (stripped, true);
        }
    }
    if line.ends_with("  ") {
        return (line.trim_end(), true);
    }
    (line.trim_end(), false)
}

/// Parse one run of inline text into children of `parent`.
pub(crate) fn parse_into(tree: &mut Tree, parent: NodeId, text: &str, options: &ParseOptions) {
    let chars: Vec<char> = text.chars().collect();
    parse_span(tree, parent, &chars, options);
}

fn parse_span(tree: &mut Tree, parent: NodeId, chars: &[char], options: &ParseOptions) {
    let mut buf = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if i + 1 < chars.len() && chars[i + 1].is_ascii_punctuation() => {
                buf.push(chars[i + 1]);
                i += 2;
            }
            '`' => {
                let n = run_len(chars, i, '`');
                if let Some(close) = find_run(chars, i + n, '`', n) {
                    flush_text(tree, parent, &mut buf, options);
                    let literal = code_span_content(&chars[i + n..close]);
                    let id = tree.add_node(NodeValue::Code(literal), Span::default());
                    tree.append_child(parent, id);
                    i = close + n;
                } else {
                    for _ in 0..n {
                        buf.push('`');
                    }
                    i += n;
                }
            }
            '*' | '_' => {
                let n = run_len(chars, i, c);
                if c == '_' && is_intraword(chars, i, n) {
                    for _ in 0..n {
                        buf.push('_');
                    }
                    i += n;
                    continue;
                }
                i = emphasis(tree, parent, chars, i, n, c, &mut buf, options);
            }
            '!' if chars.get(i + 1) == Some(&'[') => {
                if let Some(scan) = scan_link(chars, i + 1) {
                    flush_text(tree, parent, &mut buf, options);
                    let id = tree.add_node(
                        NodeValue::Image {
                            url: scan.url,
                            title: scan.title,
                        },
                        Span::default(),
                    );
                    tree.append_child(parent, id);
                    parse_span(tree, id, &chars[scan.text_start..scan.text_end], options);
                    i = scan.end;
                } else {
                    buf.push('!');
                    i += 1;
                }
            }
            '[' => {
                if options.footnotes && chars.get(i + 1) == Some(&'^') {
                    if let Some((name, end)) = scan_footnote_ref(chars, i) {
                        flush_text(tree, parent, &mut buf, options);
                        let id =
                            tree.add_node(NodeValue::FootnoteReference { name }, Span::default());
                        tree.append_child(parent, id);
                        i = end;
                        continue;
                    }
                }
                if let Some(scan) = scan_link(chars, i) {
                    flush_text(tree, parent, &mut buf, options);
                    let id = tree.add_node(
                        NodeValue::Link {
                            url: scan.url,
                            title: scan.title,
                        },
                        Span::default(),
                    );
                    tree.append_child(parent, id);
                    parse_span(tree, id, &chars[scan.text_start..scan.text_end], options);
                    i = scan.end;
                } else {
                    buf.push('[');
                    i += 1;
                }
            }
            '<' => {
                if let Some((url, end)) = scan_autolink(chars, i) {
                    flush_text(tree, parent, &mut buf, options);
                    let id = tree.add_node(
                        NodeValue::Link {
                            url: url.clone(),
                            title: None,
                        },
                        Span::default(),
                    );
                    tree.append_child(parent, id);
                    let text = tree.add_node(NodeValue::Text(url), Span::default());
                    tree.append_child(id, text);
                    i = end;
                } else if let Some((literal, end)) = scan_html_tag(chars, i, options) {
                    flush_text(tree, parent, &mut buf, options);
                    let id = tree.add_node(NodeValue::HtmlInline(literal), Span::default());
                    tree.append_child(parent, id);
                    i = end;
                } else {
                    buf.push('<');
                    i += 1;
                }
            }
            _ => {
                buf.push(c);
                i += 1;
            }
        }
    }

    flush_text(tree, parent, &mut buf, options);
}

/// Handle a run of `*` or `_` delimiters starting at `i`. Returns the next
/// scan position.
#[allow(clippy::too_many_arguments)]
fn emphasis(
    tree: &mut Tree,
    parent: NodeId,
    chars: &[char],
    i: usize,
    n: usize,
    c: char,
    buf: &mut String,
    options: &ParseOptions,
) -> usize {
    if n >= 3 {
        if let Some(close) = find_run(chars, i + 3, c, 3) {
            flush_text(tree, parent, buf, options);
            let emph = tree.add_node(NodeValue::Emph, Span::default());
            tree.append_child(parent, emph);
            let strong = tree.add_node(NodeValue::Strong, Span::default());
            tree.append_child(emph, strong);
            parse_span(tree, strong, &chars[i + 3..close], options);
            return close + 3;
        }
    }
    if n >= 2 {
        if let Some(close) = find_run(chars, i + 2, c, 2) {
            flush_text(tree, parent, buf, options);
            let strong = tree.add_node(NodeValue::Strong, Span::default());
            tree.append_child(parent, strong);
            parse_span(tree, strong, &chars[i + 2..close], options);
            return close + 2;
        }
    }
    if n == 1 {
        if let Some(close) = find_run(chars, i + 1, c, 1) {
            flush_text(tree, parent, buf, options);
            let emph = tree.add_node(NodeValue::Emph, Span::default());
            tree.append_child(parent, emph);
            parse_span(tree, emph, &chars[i + 1..close], options);
            return close + 1;
        }
    }
    for _ in 0..n {
        buf.push(c);
    }
    i + n
}

/// Length of the run of `c` starting at `i`.
fn run_len(chars: &[char], i: usize, c: char) -> usize {
    chars[i..].iter().take_while(|&&x| x == c).count()
}

/// Find the next run of exactly `count` copies of `c` at or after `from`.
/// Returns the index of the run's first character.
fn find_run(chars: &[char], from: usize, c: char, count: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        if chars[j] == '\\' {
            j += 2;
            continue;
        }
        if chars[j] == c {
            let run = run_len(chars, j, c);
            if run == count {
                return Some(j);
            }
            j += run;
        } else {
            j += 1;
        }
    }
    None
}

/// An underscore flanked by alphanumerics on both sides is literal text.
fn is_intraword(chars: &[char], i: usize, n: usize) -> bool {
    let prev = i.checked_sub(1).and_then(|p| chars.get(p));
    let next = chars.get(i + n);
    matches!(prev, Some(p) if p.is_alphanumeric()) && matches!(next, Some(x) if x.is_alphanumeric())
}

/// Code span content: one leading and trailing space are stripped when both
/// are present and the span is not all spaces.
fn code_span_content(inner: &[char]) -> String {
    let s: String = inner.iter().collect();
    if s.len() >= 2
        && s.starts_with(' ')
        && s.ends_with(' ')
        && !s.chars().all(|c| c == ' ')
    {
        s[1..s.len() - 1].to_string()
    } else {
        s
    }
}

struct LinkScan {
    text_start: usize,
    text_end: usize,
    url: String,
    title: Option<String>,
    end: usize,
}

/// Scan `[text](url "title")` starting at the opening bracket.
fn scan_link(chars: &[char], open: usize) -> Option<LinkScan> {
    debug_assert_eq!(chars.get(open), Some(&'['));
    let mut depth = 1usize;
    let mut j = open + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        j += 1;
    }
    if j >= chars.len() || chars.get(j + 1) != Some(&'(') {
        return None;
    }
    let text_end = j;

    let mut k = j + 2;
    let mut parens = 1usize;
    while k < chars.len() {
        match chars[k] {
            '\\' => k += 1,
            '(' => parens += 1,
            ')' => {
                parens -= 1;
                if parens == 0 {
                    break;
                }
            }
            _ => {}
        }
        k += 1;
    }
    if k >= chars.len() {
        return None;
    }

    let inner: String = chars[j + 2..k].iter().collect();
    let (url, title) = split_destination(inner.trim());
    Some(LinkScan {
        text_start: open + 1,
        text_end,
        url,
        title,
        end: k + 1,
    })
}

/// Split a link destination into URL and optional quoted title.
fn split_destination(inner: &str) -> (String, Option<String>) {
    let mut url = inner;
    let mut title = None;
    if inner.ends_with('"') && inner.len() >= 2 {
        if let Some(q) = inner[..inner.len() - 1].rfind('"') {
            if q > 0 && inner[..q].ends_with(char::is_whitespace) {
                title = Some(inner[q + 1..inner.len() - 1].to_string());
                url = inner[..q].trim_end();
            }
        }
    }
    let url = url
        .strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(url);
    (url.to_string(), title)
}

/// Scan `[^name]` starting at the opening bracket.
fn scan_footnote_ref(chars: &[char], open: usize) -> Option<(String, usize)> {
    let mut j = open + 2;
    let mut name = String::new();
    while j < chars.len() {
        let c = chars[j];
        if c == ']' {
            if name.is_empty() {
                return None;
            }
            return Some((name, j + 1));
        }
        if c.is_whitespace() || c == '[' {
            return None;
        }
        name.push(c);
        j += 1;
    }
    None
}

/// Scan `<scheme:rest>` as an autolink.
fn scan_autolink(chars: &[char], open: usize) -> Option<(String, usize)> {
    let close = chars[open + 1..]
        .iter()
        .position(|&c| c == '>')
        .map(|p| open + 1 + p)?;
    let body: String = chars[open + 1..close].iter().collect();
    if AUTOLINK_RE.is_match(&body) {
        Some((body, close + 1))
    } else {
        None
    }
}

/// Scan an inline HTML tag; the returned literal includes the brackets.
fn scan_html_tag(chars: &[char], open: usize, options: &ParseOptions) -> Option<(String, usize)> {
    let close = chars[open + 1..]
        .iter()
        .position(|&c| c == '>')
        .map(|p| open + 1 + p)?;
    let body: String = chars[open + 1..close].iter().collect();
    let accepted = HTML_TAG_RE.is_match(&body)
        || (options.liberal_html_tag && LIBERAL_TAG_RE.is_match(&body));
    if !accepted {
        return None;
    }
    let literal: String = chars[open..=close].iter().collect();
    Some((literal, close + 1))
}

/// Flush buffered plain text as a text node, decoding entities and applying
/// smart punctuation when enabled.
fn flush_text(tree: &mut Tree, parent: NodeId, buf: &mut String, options: &ParseOptions) {
    if buf.is_empty() {
        return;
    }
    let mut text = decode_entities(buf);
    if options.smart {
        text = smart_punctuation(&text);
    }
    buf.clear();
    let id = tree.add_node(NodeValue::Text(text), Span::default());
    tree.append_child(parent, id);
}

/// Curly quotes, dashes, and ellipses.
fn smart_punctuation(text: &str) -> String {
    let replaced = text
        .replace("---", "\u{2014}")
        .replace("--", "\u{2013}")
        .replace("...", "\u{2026}");

    let mut out = String::with_capacity(replaced.len());
    let mut prev: Option<char> = None;
    for c in replaced.chars() {
        match c {
            '"' => out.push(if opens_quote(prev) { '\u{201C}' } else { '\u{201D}' }),
            '\'' => {
                if matches!(prev, Some(p) if p.is_alphanumeric()) {
                    out.push('\u{2019}'); // apostrophe
                } else if opens_quote(prev) {
                    out.push('\u{2018}');
                } else {
                    out.push('\u{2019}');
                }
            }
            _ => out.push(c),
        }
        prev = Some(c);
    }
    out
}

fn opens_quote(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(p) => p.is_whitespace() || matches!(p, '(' | '[' | '{' | '\u{2014}' | '\u{2013}'),
    }
}
