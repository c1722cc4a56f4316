//! CommonMark renderer.
//!
//! Re-serializes a document as CommonMark source. Block prefixes (quote
//! markers, list indentation) are carried on a prefix string that every
//! physical line starts with, and paragraph text can be wrapped at a
//! display-column limit measured with `unicode-width`.

use marktree_core::{IterEvent, ListType, NodeId, NodeValue, RenderOptions, Tree, Width};
use unicode_width::UnicodeWidthStr;

pub fn render_commonmark(tree: &Tree, options: &RenderOptions, width: Width) -> String {
    let mut writer = CmarkWriter {
        options,
        width,
        out: String::new(),
        line: String::new(),
        prefix: String::new(),
        last_break: None,
        wrap_base: 0,
        pending_blank: false,
        lists: Vec::new(),
        item_indents: Vec::new(),
    };
    writer.run(tree);
    writer.out
}

struct ListState {
    ordered: bool,
    next: usize,
    tight: bool,
    first_done: bool,
}

struct CmarkWriter<'a> {
    options: &'a RenderOptions,
    width: Width,
    out: String,
    /// Current physical line, including its prefix
    line: String,
    prefix: String,
    /// Byte offset of the last wrappable space in `line`
    last_break: Option<usize>,
    /// Bytes of `line` occupied by the prefix; never wrap inside it
    wrap_base: usize,
    pending_blank: bool,
    lists: Vec<ListState>,
    /// Continuation-indent widths of open items, innermost last
    item_indents: Vec<usize>,
}

impl<'a> CmarkWriter<'a> {
    fn run(&mut self, tree: &Tree) {
        let mut iter = tree.iter();
        while let Some((event, id)) = iter.next() {
            match event {
                IterEvent::Enter => {
                    if self.autolink(tree, id) {
                        for (ev, sub) in iter.by_ref() {
                            if ev == IterEvent::Exit && sub == id {
                                break;
                            }
                        }
                        continue;
                    }
                    self.enter(tree, id);
                }
                IterEvent::Exit => self.exit(tree, id),
            }
        }
        self.end_line();
    }

    fn enter(&mut self, tree: &Tree, id: NodeId) {
        match &tree[id].value {
            NodeValue::Document => {}
            NodeValue::BlockQuote => {
                self.block_start();
                self.prefix.push_str("> ");
            }
            NodeValue::List(data) => {
                // a sublist in a tight list attaches without a blank line
                if self.lists.last().map(|s| s.tight).unwrap_or(false) {
                    self.pending_blank = false;
                }
                self.block_start();
                self.lists.push(ListState {
                    ordered: data.list_type == ListType::Ordered,
                    next: data.start,
                    tight: data.tight,
                    first_done: false,
                });
            }
            NodeValue::Item => {
                let marker = match self.lists.last_mut() {
                    Some(state) => {
                        if state.first_done && state.tight {
                            self.pending_blank = false;
                        }
                        state.first_done = true;
                        if state.ordered {
                            let m = format!("{}. ", state.next);
                            state.next += 1;
                            m
                        } else {
                            "- ".to_string()
                        }
                    }
                    None => "- ".to_string(),
                };
                self.block_start();
                self.put_raw(&marker);
                self.prefix.push_str(&" ".repeat(marker.len()));
                self.item_indents.push(marker.len());
            }
            NodeValue::Paragraph => {
                if self.lists.last().map(|s| s.tight).unwrap_or(false) {
                    self.pending_blank = false;
                }
                self.block_start();
            }
            NodeValue::Heading { level } => {
                self.block_start();
                self.put_raw(&format!("{} ", "#".repeat(*level as usize)));
            }
            NodeValue::CodeBlock { info, literal } => {
                self.block_start();
                let fence = "`".repeat(fence_len(literal));
                self.put_raw(&fence);
                if let Some(info) = info {
                    self.put_raw(info);
                }
                self.end_line();
                for line in literal.lines() {
                    self.put_raw(line);
                    self.end_line();
                }
                self.put_raw(&fence);
                self.end_line();
                self.pending_blank = true;
            }
            NodeValue::HtmlBlock { literal } => {
                self.block_start();
                for line in literal.lines() {
                    self.put_raw(line);
                    self.end_line();
                }
                self.pending_blank = true;
            }
            NodeValue::CustomBlock { on_enter, .. } => {
                self.block_start();
                self.put_raw(on_enter);
                self.end_line();
            }
            NodeValue::ThematicBreak => {
                self.block_start();
                self.put_raw("---");
                self.end_line();
                self.pending_blank = true;
            }
            NodeValue::FootnoteDefinition { name } => {
                self.block_start();
                self.put_raw(&format!("[^{}]: ", name));
                self.prefix.push_str("    ");
            }
            NodeValue::Text(text) => self.put_text(text),
            NodeValue::SoftBreak => {
                if self.options.hardbreaks {
                    self.put_raw("\\");
                    self.end_line();
                } else if self.options.nobreaks {
                    self.put_wrappable_space();
                } else {
                    match self.width {
                        Width::Columns(_) => self.put_wrappable_space(),
                        Width::Unlimited => self.end_line(),
                    }
                }
            }
            NodeValue::LineBreak => {
                self.put_raw("\\");
                self.end_line();
            }
            NodeValue::Code(literal) => {
                let ticks = "`".repeat(longest_backtick_run(literal) + 1);
                if ticks.len() > 1 {
                    self.put_raw(&format!("{ticks} {literal} {ticks}"));
                } else {
                    self.put_raw(&format!("{ticks}{literal}{ticks}"));
                }
            }
            NodeValue::HtmlInline(literal) => self.put_raw(literal),
            NodeValue::CustomInline { on_enter, .. } => self.put_raw(on_enter),
            NodeValue::Emph => self.put_raw("*"),
            NodeValue::Strong => self.put_raw("**"),
            NodeValue::Link { .. } => self.put_raw("["),
            NodeValue::Image { .. } => self.put_raw("!["),
            NodeValue::FootnoteReference { name } => self.put_raw(&format!("[^{}]", name)),
        }
    }

    fn exit(&mut self, tree: &Tree, id: NodeId) {
        match &tree[id].value {
            NodeValue::BlockQuote => {
                let cut = self.prefix.len().saturating_sub(2);
                self.prefix.truncate(cut);
                self.pending_blank = true;
            }
            NodeValue::List(_) => {
                self.lists.pop();
                self.pending_blank = true;
            }
            NodeValue::Item => {
                let indent = self.item_indents.pop().unwrap_or(2);
                let cut = self.prefix.len().saturating_sub(indent);
                self.prefix.truncate(cut);
                self.pending_blank = true;
            }
            NodeValue::Paragraph | NodeValue::Heading { .. } => {
                self.end_line();
                self.pending_blank = true;
            }
            NodeValue::FootnoteDefinition { .. } => {
                self.end_line();
                let cut = self.prefix.len().saturating_sub(4);
                self.prefix.truncate(cut);
                self.pending_blank = true;
            }
            NodeValue::CustomBlock { on_exit, .. } => {
                self.put_raw(on_exit);
                self.end_line();
                self.pending_blank = true;
            }
            NodeValue::CustomInline { on_exit, .. } => self.put_raw(on_exit),
            NodeValue::Emph => self.put_raw("*"),
            NodeValue::Strong => self.put_raw("**"),
            NodeValue::Link { url, title } => match title {
                Some(title) => self.put_raw(&format!("]({} \"{}\")", url, title)),
                None => self.put_raw(&format!("]({})", url)),
            },
            NodeValue::Image { url, title } => match title {
                Some(title) => self.put_raw(&format!("]({} \"{}\")", url, title)),
                None => self.put_raw(&format!("]({})", url)),
            },
            _ => {}
        }
    }

    /// `<url>` form for a link whose only child is a text node equal to it.
    fn autolink(&mut self, tree: &Tree, id: NodeId) -> bool {
        let url = match &tree[id].value {
            NodeValue::Link { url, title: None } => url,
            _ => return false,
        };
        let child = match tree[id].first_child() {
            Some(c) if tree[c].next_sibling().is_none() => c,
            _ => return false,
        };
        match &tree[child].value {
            NodeValue::Text(text) if text == url => {
                let formatted = format!("<{}>", url);
                self.put_raw(&formatted);
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // Line discipline
    // =========================================================================

    fn block_start(&mut self) {
        if std::mem::take(&mut self.pending_blank) && !self.out.is_empty() {
            let blank = self.prefix.trim_end().to_string();
            self.out.push_str(&blank);
            self.out.push('\n');
        }
    }

    fn ensure_line_start(&mut self) {
        if self.line.is_empty() {
            self.line.push_str(&self.prefix);
            self.wrap_base = self.line.len();
            self.last_break = None;
        }
    }

    fn put_raw(&mut self, s: &str) {
        self.ensure_line_start();
        self.line.push_str(s);
        self.maybe_wrap();
    }

    fn put_wrappable_space(&mut self) {
        self.ensure_line_start();
        self.line.push(' ');
        self.last_break = Some(self.line.len() - 1);
    }

    /// Escape and emit text, word by word so the wrapper can break it.
    fn put_text(&mut self, text: &str) {
        let escaped = escape_commonmark(text);
        if matches!(self.width, Width::Unlimited) {
            self.put_raw(&escaped);
            return;
        }
        let mut first = true;
        for word in escaped.split(' ') {
            if !first {
                self.put_wrappable_space();
            }
            first = false;
            if !word.is_empty() {
                self.put_raw(word);
            }
        }
    }

    fn maybe_wrap(&mut self) {
        let limit = match self.width {
            Width::Columns(n) => n,
            Width::Unlimited => return,
        };
        while UnicodeWidthStr::width(self.line.as_str()) > limit {
            let bp = match self.last_break {
                Some(bp) if bp > self.wrap_base => bp,
                _ => return,
            };
            let rest = self.line[bp + 1..].to_string();
            let head = self.line[..bp].trim_end().to_string();
            self.out.push_str(&head);
            self.out.push('\n');
            self.line.clear();
            self.line.push_str(&self.prefix);
            self.wrap_base = self.line.len();
            self.line.push_str(&rest);
            self.last_break = None;
        }
    }

    fn end_line(&mut self) {
        if !self.line.is_empty() {
            let trimmed = self.line.trim_end().to_string();
            self.out.push_str(&trimmed);
            self.out.push('\n');
            self.line.clear();
            self.last_break = None;
        }
    }
}

/// Backslash-escape characters that would re-parse as markup.
fn escape_commonmark(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// A code span needs one more backtick than its longest interior run.
fn longest_backtick_run(s: &str) -> usize {
    let mut max = 0;
    let mut run = 0;
    for ch in s.chars() {
        if ch == '`' {
            run += 1;
            max = max.max(run);
        } else {
            run = 0;
        }
    }
    max
}

/// Fence length for a code block: at least three, one more than any interior run.
fn fence_len(literal: &str) -> usize {
    (longest_backtick_run(literal) + 1).max(3)
}
