//! HTML renderer.
//!
//! A single pass over the document's enter/exit event stream. Block tags are
//! separated by newlines the way a hand-written serializer would emit them;
//! `cr` guarantees the output ends with a newline before a block tag opens.

use marktree_core::{IterEvent, Kind, ListType, NodeId, NodeValue, RenderOptions, Span, Tree};

use crate::escape::{dangerous_url, escape_href, escape_html};

pub fn render_html(tree: &Tree, options: &RenderOptions) -> String {
    let mut writer = HtmlWriter {
        options,
        out: String::new(),
        tight: Vec::new(),
        footnotes: Vec::new(),
    };
    writer.run(tree);
    writer.out
}

struct HtmlWriter<'a> {
    options: &'a RenderOptions,
    out: String,
    /// Tightness of each open list, innermost last
    tight: Vec<bool>,
    /// Definitions held back for the end-of-document section
    footnotes: Vec<NodeId>,
}

impl<'a> HtmlWriter<'a> {
    fn run(&mut self, tree: &Tree) {
        let mut iter = tree.iter();
        while let Some((event, id)) = iter.next() {
            match event {
                IterEvent::Enter => {
                    if tree.kind(id) == Some(Kind::Image) {
                        self.image(tree, id);
                        // The subtree became the alt attribute; skip its events
                        for (ev, sub) in iter.by_ref() {
                            if ev == IterEvent::Exit && sub == id {
                                break;
                            }
                        }
                        continue;
                    }
                    if tree.kind(id) == Some(Kind::FootnoteDefinition) {
                        // Rendered after the last block, so the section never
                        // swallows document content that follows a definition
                        self.footnotes.push(id);
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
        if !self.footnotes.is_empty() {
            self.cr();
            self.out
                .push_str("<section class=\"footnotes\" data-footnotes>\n<ol>\n");
            let defs = std::mem::take(&mut self.footnotes);
            for def in defs {
                self.enter(tree, def);
                self.subtree(tree, def);
                self.exit(tree, def);
            }
            self.out.push_str("</ol>\n</section>\n");
        }
    }

    /// Render the children of `id` depth-first. Footnote bodies are shallow,
    /// so recursion is fine here.
    fn subtree(&mut self, tree: &Tree, id: NodeId) {
        let mut child = tree[id].first_child();
        while let Some(c) = child {
            if tree.kind(c) == Some(Kind::Image) {
                self.image(tree, c);
            } else {
                self.enter(tree, c);
                self.subtree(tree, c);
                self.exit(tree, c);
            }
            child = tree[c].next_sibling();
        }
    }

    fn enter(&mut self, tree: &Tree, id: NodeId) {
        match &tree[id].value {
            NodeValue::Document => {}
            NodeValue::BlockQuote => {
                self.cr();
                self.out.push_str("<blockquote");
                self.sourcepos(&tree[id].span);
                self.out.push_str(">\n");
            }
            NodeValue::List(data) => {
                self.cr();
                self.tight.push(data.tight);
                if data.list_type == ListType::Bullet {
                    self.out.push_str("<ul");
                    self.sourcepos(&tree[id].span);
                    self.out.push_str(">\n");
                } else {
                    self.out.push_str("<ol");
                    self.sourcepos(&tree[id].span);
                    if data.start != 1 {
                        self.out.push_str(&format!(" start=\"{}\"", data.start));
                    }
                    self.out.push_str(">\n");
                }
            }
            NodeValue::Item => {
                self.cr();
                self.out.push_str("<li");
                self.sourcepos(&tree[id].span);
                self.out.push('>');
            }
            NodeValue::Paragraph => {
                if !self.tight_paragraph(tree, id) {
                    self.cr();
                    self.out.push_str("<p");
                    self.sourcepos(&tree[id].span);
                    self.out.push('>');
                }
            }
            NodeValue::Heading { level } => {
                self.cr();
                self.out.push_str(&format!("<h{}", level));
                self.sourcepos(&tree[id].span);
                self.out.push('>');
            }
            NodeValue::CodeBlock { info, literal } => {
                self.cr();
                let lang = info
                    .as_deref()
                    .and_then(|i| i.split_whitespace().next())
                    .filter(|l| !l.is_empty());
                self.out.push_str("<pre");
                self.sourcepos(&tree[id].span);
                match lang {
                    Some(lang) if self.options.github_pre_lang => {
                        self.out
                            .push_str(&format!(" lang=\"{}\"><code>", escape_html(lang)));
                    }
                    Some(lang) => {
                        self.out.push_str(&format!(
                            "><code class=\"language-{}\">",
                            escape_html(lang)
                        ));
                    }
                    None => self.out.push_str("><code>"),
                }
                self.out.push_str(&escape_html(literal));
                self.out.push_str("</code></pre>\n");
            }
            NodeValue::HtmlBlock { literal } => {
                self.cr();
                if self.options.unsafe_ {
                    self.out.push_str(literal);
                } else {
                    self.out.push_str("<!-- raw HTML omitted -->\n");
                }
            }
            NodeValue::CustomBlock { on_enter, .. } => {
                self.cr();
                self.out.push_str(on_enter);
            }
            NodeValue::ThematicBreak => {
                self.cr();
                self.out.push_str("<hr");
                self.sourcepos(&tree[id].span);
                self.out.push_str(" />\n");
            }
            NodeValue::FootnoteDefinition { name } => {
                self.out
                    .push_str(&format!("<li id=\"fn-{}\">\n", escape_html(name)));
            }
            NodeValue::Text(text) => self.out.push_str(&escape_html(text)),
            NodeValue::SoftBreak => {
                if self.options.hardbreaks {
                    self.out.push_str("<br />\n");
                } else if self.options.nobreaks {
                    self.out.push(' ');
                } else {
                    self.out.push('\n');
                }
            }
            NodeValue::LineBreak => self.out.push_str("<br />\n"),
            NodeValue::Code(literal) => {
                self.out.push_str("<code>");
                self.out.push_str(&escape_html(literal));
                self.out.push_str("</code>");
            }
            NodeValue::HtmlInline(literal) => {
                if self.options.unsafe_ {
                    self.out.push_str(literal);
                } else {
                    self.out.push_str("<!-- raw HTML omitted -->");
                }
            }
            NodeValue::CustomInline { on_enter, .. } => self.out.push_str(on_enter),
            NodeValue::Emph => self.out.push_str("<em>"),
            NodeValue::Strong => self.out.push_str("<strong>"),
            NodeValue::Link { url, title } => {
                self.out.push_str("<a href=\"");
                if self.options.unsafe_ || !dangerous_url(url) {
                    self.out.push_str(&escape_href(url));
                }
                self.out.push('"');
                if let Some(title) = title {
                    self.out
                        .push_str(&format!(" title=\"{}\"", escape_html(title)));
                }
                self.out.push('>');
            }
            NodeValue::Image { .. } => {
                // Handled in run(), where the subtree is consumed as alt text
            }
            NodeValue::FootnoteReference { name } => {
                let name = escape_html(name);
                self.out.push_str(&format!(
                    "<sup class=\"footnote-ref\"><a href=\"#fn-{name}\" id=\"fnref-{name}\">{name}</a></sup>"
                ));
            }
        }
    }

    fn exit(&mut self, tree: &Tree, id: NodeId) {
        match &tree[id].value {
            NodeValue::BlockQuote => {
                self.cr();
                self.out.push_str("</blockquote>\n");
            }
            NodeValue::List(data) => {
                self.tight.pop();
                self.cr();
                if data.list_type == ListType::Bullet {
                    self.out.push_str("</ul>\n");
                } else {
                    self.out.push_str("</ol>\n");
                }
            }
            NodeValue::Item => {
                self.out.push_str("</li>\n");
            }
            NodeValue::Paragraph => {
                if !self.tight_paragraph(tree, id) {
                    self.out.push_str("</p>\n");
                }
            }
            NodeValue::Heading { level } => {
                self.out.push_str(&format!("</h{}>\n", level));
            }
            NodeValue::CustomBlock { on_exit, .. } => {
                self.out.push_str(on_exit);
                self.cr();
            }
            NodeValue::FootnoteDefinition { .. } => {
                self.cr();
                self.out.push_str("</li>\n");
            }
            NodeValue::CustomInline { on_exit, .. } => self.out.push_str(on_exit),
            NodeValue::Emph => self.out.push_str("</em>"),
            NodeValue::Strong => self.out.push_str("</strong>"),
            NodeValue::Link { .. } => self.out.push_str("</a>"),
            _ => {}
        }
    }

    /// Emit `<img>` with the subtree flattened into the alt attribute.
    fn image(&mut self, tree: &Tree, id: NodeId) {
        if let NodeValue::Image { url, title } = &tree[id].value {
            self.out.push_str("<img src=\"");
            if self.options.unsafe_ || !dangerous_url(url) {
                self.out.push_str(&escape_href(url));
            }
            self.out.push_str("\" alt=\"");
            let mut alt = String::new();
            collect_alt(tree, id, &mut alt);
            self.out.push_str(&escape_html(&alt));
            self.out.push('"');
            if let Some(title) = title {
                self.out
                    .push_str(&format!(" title=\"{}\"", escape_html(title)));
            }
            self.out.push_str(" />");
        }
    }

    /// Paragraphs directly inside an item of a tight list render bare.
    fn tight_paragraph(&self, tree: &Tree, id: NodeId) -> bool {
        let parent = match tree[id].parent() {
            Some(p) => p,
            None => return false,
        };
        tree.kind(parent) == Some(Kind::Item) && self.tight.last().copied().unwrap_or(false)
    }

    /// Ensure the output ends at a line boundary.
    fn cr(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn sourcepos(&mut self, span: &Span) {
        if self.options.sourcepos {
            self.out.push_str(&format!(
                " data-sourcepos=\"{}:{}-{}:{}\"",
                span.start.line, span.start.column, span.end.line, span.end.column
            ));
        }
    }
}

fn collect_alt(tree: &Tree, id: NodeId, alt: &mut String) {
    let mut child = tree[id].first_child();
    while let Some(c) = child {
        match &tree[c].value {
            NodeValue::Text(text) => alt.push_str(text),
            NodeValue::Code(literal) => alt.push_str(literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => alt.push(' '),
            _ => {}
        }
        collect_alt(tree, c, alt);
        child = tree[c].next_sibling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marktree_core::ParseOptions;
    use marktree_parser::Session;
    use pretty_assertions::assert_eq;

    fn html(input: &str) -> String {
        let tree = Session::parse_document(input, ParseOptions::default()).unwrap();
        render_html(&tree, &RenderOptions::default())
    }

    #[test]
    fn test_round_trip_scenario_html() {
        let input = "# Hello World!\n\nFirst test **I** _write_:\n\n- A list of three things\n- poop\n- noob";
        assert_eq!(
            html(input),
            "<h1>Hello World!</h1>\n<p>First test <strong>I</strong> <em>write</em>:</p>\n<ul>\n<li>A list of three things</li>\n<li>poop</li>\n<li>noob</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_loose_list_keeps_paragraphs() {
        assert_eq!(
            html("- a\n\n- b\n"),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_start_attribute() {
        assert_eq!(
            html("3. three\n4. four\n"),
            "<ol start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(html("> words\n"), "<blockquote>\n<p>words</p>\n</blockquote>\n");
    }

    #[test]
    fn test_code_block_language_class() {
        assert_eq!(
            html("```rust\nlet x = 1;\n```\n"),
            "<pre><code class=\"language-rust\">let x = 1;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_github_pre_lang() {
        let tree = Session::parse_document("```rust\nx\n```\n", ParseOptions::default()).unwrap();
        let out = render_html(
            &tree,
            &RenderOptions {
                github_pre_lang: true,
                ..Default::default()
            },
        );
        assert_eq!(out, "<pre lang=\"rust\"><code>x\n</code></pre>\n");
    }

    #[test]
    fn test_raw_html_omitted_by_default() {
        assert_eq!(html("<div>x</div>\n"), "<!-- raw HTML omitted -->\n");
        assert_eq!(
            html("a <b>c</b> d\n"),
            "<p>a <!-- raw HTML omitted -->c<!-- raw HTML omitted --> d</p>\n"
        );
    }

    #[test]
    fn test_unsafe_passes_raw_html() {
        let tree = Session::parse_document("<div>x</div>\n", ParseOptions::default()).unwrap();
        let out = render_html(
            &tree,
            &RenderOptions {
                unsafe_: true,
                ..Default::default()
            },
        );
        assert_eq!(out, "<div>x</div>\n");
    }

    #[test]
    fn test_dangerous_link_href_emptied() {
        assert_eq!(
            html("[x](javascript:alert(1))\n"),
            "<p><a href=\"\">x</a></p>\n"
        );
    }

    #[test]
    fn test_image_alt_flattens_markup() {
        assert_eq!(
            html("![an *alt* text](img.png)\n"),
            "<p><img src=\"img.png\" alt=\"an alt text\" /></p>\n"
        );
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(
            html("[docs](https://example.com \"The docs\")\n"),
            "<p><a href=\"https://example.com\" title=\"The docs\">docs</a></p>\n"
        );
    }

    #[test]
    fn test_hardbreaks_option_turns_softbreaks() {
        let tree = Session::parse_document("a\nb\n", ParseOptions::default()).unwrap();
        let out = render_html(
            &tree,
            &RenderOptions {
                hardbreaks: true,
                ..Default::default()
            },
        );
        assert_eq!(out, "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn test_nobreaks_option_joins_lines() {
        let tree = Session::parse_document("a\nb\n", ParseOptions::default()).unwrap();
        let out = render_html(
            &tree,
            &RenderOptions {
                nobreaks: true,
                ..Default::default()
            },
        );
        assert_eq!(out, "<p>a b</p>\n");
    }

    #[test]
    fn test_sourcepos_attributes() {
        let tree = Session::parse_document("# Hi\n", ParseOptions::default()).unwrap();
        let out = render_html(
            &tree,
            &RenderOptions {
                sourcepos: true,
                ..Default::default()
            },
        );
        assert_eq!(out, "<h1 data-sourcepos=\"1:1-1:4\">Hi</h1>\n");
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(html("---\n"), "<hr />\n");
    }

    #[test]
    fn test_footnotes_section() {
        let tree = Session::parse_document(
            "body[^a]\n\n[^a]: note\n",
            ParseOptions {
                footnotes: true,
                ..Default::default()
            },
        )
        .unwrap();
        let out = render_html(&tree, &RenderOptions::default());
        assert_eq!(
            out,
            "<p>body<sup class=\"footnote-ref\"><a href=\"#fn-a\" id=\"fnref-a\">a</a></sup></p>\n<section class=\"footnotes\" data-footnotes>\n<ol>\n<li id=\"fn-a\">\n<p>note</p>\n</li>\n</ol>\n</section>\n"
        );
    }

    #[test]
    fn test_footnote_definition_does_not_swallow_following_blocks() {
        let tree = Session::parse_document(
            "x[^a]\n\n[^a]: note\n\ntrailing paragraph\n",
            ParseOptions {
                footnotes: true,
                ..Default::default()
            },
        )
        .unwrap();
        let out = render_html(&tree, &RenderOptions::default());
        // Content after a definition stays outside the footnotes section
        assert_eq!(
            out,
            "<p>x<sup class=\"footnote-ref\"><a href=\"#fn-a\" id=\"fnref-a\">a</a></sup></p>\n<p>trailing paragraph</p>\n<section class=\"footnotes\" data-footnotes>\n<ol>\n<li id=\"fn-a\">\n<p>note</p>\n</li>\n</ol>\n</section>\n"
        );
    }

    #[test]
    fn test_empty_document_renders_empty() {
        assert_eq!(html(""), "");
    }
}
