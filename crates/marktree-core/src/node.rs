//! Node taxonomy for the document tree.
//!
//! Every node kind belongs to exactly one of two categories: block kinds
//! form document structure, inline kinds form the text-level content inside
//! blocks. The category is derived from the kind, never stored.

use serde::{Deserialize, Serialize};

/// Discriminant of a document node.
///
/// The set is closed: 11 block kinds and 11 inline kinds. The only
/// extension points are [`Kind::CustomBlock`] and [`Kind::CustomInline`],
/// whose enter/exit literals are supplied by the grammar engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    // Block kinds
    Document,
    BlockQuote,
    List,
    Item,
    CodeBlock,
    HtmlBlock,
    CustomBlock,
    Paragraph,
    Heading,
    ThematicBreak,
    FootnoteDefinition,
    // Inline kinds
    Text,
    SoftBreak,
    LineBreak,
    Code,
    HtmlInline,
    CustomInline,
    Emph,
    Strong,
    Link,
    Image,
    FootnoteReference,
}

impl Kind {
    /// Whether this kind is a block-level kind.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Kind::Document
                | Kind::BlockQuote
                | Kind::List
                | Kind::Item
                | Kind::CodeBlock
                | Kind::HtmlBlock
                | Kind::CustomBlock
                | Kind::Paragraph
                | Kind::Heading
                | Kind::ThematicBreak
                | Kind::FootnoteDefinition
        )
    }

    /// Whether this kind is an inline kind.
    ///
    /// Exactly one of `is_block` / `is_inline` holds for every kind.
    pub fn is_inline(self) -> bool {
        !self.is_block()
    }

    /// All kinds, blocks first. Useful for exhaustive checks.
    pub fn all() -> [Kind; 22] {
        [
            Kind::Document,
            Kind::BlockQuote,
            Kind::List,
            Kind::Item,
            Kind::CodeBlock,
            Kind::HtmlBlock,
            Kind::CustomBlock,
            Kind::Paragraph,
            Kind::Heading,
            Kind::ThematicBreak,
            Kind::FootnoteDefinition,
            Kind::Text,
            Kind::SoftBreak,
            Kind::LineBreak,
            Kind::Code,
            Kind::HtmlInline,
            Kind::CustomInline,
            Kind::Emph,
            Kind::Strong,
            Kind::Link,
            Kind::Image,
            Kind::FootnoteReference,
        ]
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Document => "document",
            Kind::BlockQuote => "block_quote",
            Kind::List => "list",
            Kind::Item => "item",
            Kind::CodeBlock => "code_block",
            Kind::HtmlBlock => "html_block",
            Kind::CustomBlock => "custom_block",
            Kind::Paragraph => "paragraph",
            Kind::Heading => "heading",
            Kind::ThematicBreak => "thematic_break",
            Kind::FootnoteDefinition => "footnote_definition",
            Kind::Text => "text",
            Kind::SoftBreak => "softbreak",
            Kind::LineBreak => "linebreak",
            Kind::Code => "code",
            Kind::HtmlInline => "html_inline",
            Kind::CustomInline => "custom_inline",
            Kind::Emph => "emph",
            Kind::Strong => "strong",
            Kind::Link => "link",
            Kind::Image => "image",
            Kind::FootnoteReference => "footnote_reference",
        };
        write!(f, "{}", name)
    }
}

/// Represents the type of list being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListType {
    /// Unordered list with bullets (*, -, +)
    Bullet,
    /// Ordered list with numbers (1., 2., etc.)
    Ordered,
}

impl std::fmt::Display for ListType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListType::Bullet => write!(f, "bullet"),
            ListType::Ordered => write!(f, "ordered"),
        }
    }
}

/// Metadata attached to a list node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListData {
    /// Bullet or ordered
    pub list_type: ListType,
    /// Start number for ordered lists (1 for bullet lists)
    pub start: usize,
    /// Tight lists render item content without paragraph wrappers
    pub tight: bool,
}

impl Default for ListData {
    fn default() -> Self {
        Self {
            list_type: ListType::Bullet,
            start: 1,
            tight: true,
        }
    }
}

/// A node's kind together with its per-kind payload.
///
/// Text-bearing leaves carry an owned literal; link-like inlines carry a
/// URL and an optional title; headings carry a level; lists carry
/// [`ListData`]. Payload accessors return `None` for kinds the payload
/// does not apply to, which is distinct from an empty payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Document,
    BlockQuote,
    List(ListData),
    Item,
    CodeBlock {
        /// Fence info string (absent for info-less fences)
        info: Option<String>,
        literal: String,
    },
    HtmlBlock {
        literal: String,
    },
    CustomBlock {
        on_enter: String,
        on_exit: String,
    },
    Paragraph,
    Heading {
        /// 1 through 6
        level: u8,
    },
    ThematicBreak,
    FootnoteDefinition {
        name: String,
    },
    Text(String),
    SoftBreak,
    LineBreak,
    Code(String),
    HtmlInline(String),
    CustomInline {
        on_enter: String,
        on_exit: String,
    },
    Emph,
    Strong,
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
    },
    FootnoteReference {
        name: String,
    },
}

impl NodeValue {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> Kind {
        match self {
            NodeValue::Document => Kind::Document,
            NodeValue::BlockQuote => Kind::BlockQuote,
            NodeValue::List(_) => Kind::List,
            NodeValue::Item => Kind::Item,
            NodeValue::CodeBlock { .. } => Kind::CodeBlock,
            NodeValue::HtmlBlock { .. } => Kind::HtmlBlock,
            NodeValue::CustomBlock { .. } => Kind::CustomBlock,
            NodeValue::Paragraph => Kind::Paragraph,
            NodeValue::Heading { .. } => Kind::Heading,
            NodeValue::ThematicBreak => Kind::ThematicBreak,
            NodeValue::FootnoteDefinition { .. } => Kind::FootnoteDefinition,
            NodeValue::Text(_) => Kind::Text,
            NodeValue::SoftBreak => Kind::SoftBreak,
            NodeValue::LineBreak => Kind::LineBreak,
            NodeValue::Code(_) => Kind::Code,
            NodeValue::HtmlInline(_) => Kind::HtmlInline,
            NodeValue::CustomInline { .. } => Kind::CustomInline,
            NodeValue::Emph => Kind::Emph,
            NodeValue::Strong => Kind::Strong,
            NodeValue::Link { .. } => Kind::Link,
            NodeValue::Image { .. } => Kind::Image,
            NodeValue::FootnoteReference { .. } => Kind::FootnoteReference,
        }
    }

    /// Owned text payload, for text-bearing leaf kinds only.
    pub fn literal(&self) -> Option<&str> {
        match self {
            NodeValue::Text(s)
            | NodeValue::Code(s)
            | NodeValue::HtmlInline(s)
            | NodeValue::CodeBlock { literal: s, .. }
            | NodeValue::HtmlBlock { literal: s } => Some(s),
            _ => None,
        }
    }

    /// Target URL, for link and image kinds only.
    pub fn url(&self) -> Option<&str> {
        match self {
            NodeValue::Link { url, .. } | NodeValue::Image { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Link/image title, when one was given in the source.
    pub fn title(&self) -> Option<&str> {
        match self {
            NodeValue::Link { title, .. } | NodeValue::Image { title, .. } => title.as_deref(),
            _ => None,
        }
    }
}
