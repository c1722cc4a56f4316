//! Marktree Render
//!
//! Serializes a parsed document back out as HTML or CommonMark. Both
//! renderers walk the document's enter/exit event stream and never mutate
//! the tree, so one tree can be rendered any number of times with
//! different options.

mod commonmark;
mod escape;
mod html;

pub use escape::{dangerous_url, escape_href, escape_html};

use log::trace;
use marktree_core::{RenderOptions, Result, Tree, Width};

/// Output dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Html,
    CommonMark,
}

/// Render a document in the given dialect.
///
/// `width` applies only to the CommonMark dialect; HTML ignores it.
pub fn render(tree: &Tree, dialect: Dialect, options: &RenderOptions, width: Width) -> Result<String> {
    trace!("rendering {} nodes as {:?}", tree.len(), dialect);
    match dialect {
        Dialect::Html => render_html(tree, options),
        Dialect::CommonMark => render_commonmark(tree, options, width),
    }
}

/// Render a document as HTML.
pub fn render_html(tree: &Tree, options: &RenderOptions) -> Result<String> {
    Ok(html::render_html(tree, options))
}

/// Render a document as CommonMark source.
pub fn render_commonmark(tree: &Tree, options: &RenderOptions, width: Width) -> Result<String> {
    Ok(commonmark::render_commonmark(tree, options, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marktree_core::ParseOptions;
    use marktree_parser::Session;

    #[test]
    fn test_dispatch_selects_dialect() {
        let tree = Session::parse_document("# Hi\n", ParseOptions::default()).unwrap();
        let html = render(
            &tree,
            Dialect::Html,
            &RenderOptions::default(),
            Width::Unlimited,
        )
        .unwrap();
        assert_eq!(html, "<h1>Hi</h1>\n");
        let md = render(
            &tree,
            Dialect::CommonMark,
            &RenderOptions::default(),
            Width::Unlimited,
        )
        .unwrap();
        assert_eq!(md, "# Hi\n");
    }

    #[test]
    fn test_rendering_does_not_mutate_the_tree() {
        let tree = Session::parse_document("a *b*\n", ParseOptions::default()).unwrap();
        let before = tree.kind_sequence();
        let _ = render_html(&tree, &RenderOptions::default()).unwrap();
        let _ = render_commonmark(&tree, &RenderOptions::default(), Width::Columns(10)).unwrap();
        assert_eq!(tree.kind_sequence(), before);
    }
}
