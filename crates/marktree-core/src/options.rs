//! Behavioral switches for parsing and rendering.
//!
//! Both option sets are plain records of named booleans; every flag
//! defaults to `false`, which is the strictest posture (raw HTML disabled,
//! no smart punctuation, soft breaks kept soft). The packed-integer form
//! used at the grammar-engine boundary lives in [`crate::codec`].

use serde::{Deserialize, Serialize};

/// Options consumed by the grammar engine while parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Replace invalid UTF-8 sequences with U+FFFD instead of trusting input
    pub validate_utf8: bool,
    /// Smart punctuation: curly quotes, dashes, ellipses
    pub smart: bool,
    /// Accept a looser shape for inline HTML tags
    pub liberal_html_tag: bool,
    /// Parse footnote definitions and references
    pub footnotes: bool,
    /// Require `~~` (never a single `~`) for strikethrough
    pub strikethrough_double_tilde: bool,
    /// Emit table alignment as style attributes rather than align attributes
    pub table_prefer_style_attributes: bool,
    /// Keep the whole fence info string, not just the first word
    pub full_info_string: bool,
    /// Accepted for compatibility; has no behavioral effect
    pub normalize: bool,
}

/// Options consumed by the renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Emit `data-sourcepos` attributes on block elements
    pub sourcepos: bool,
    /// Render soft breaks as hard line breaks
    pub hardbreaks: bool,
    /// Pass raw HTML and unsafe URL schemes through verbatim
    #[serde(rename = "unsafe")]
    pub unsafe_: bool,
    /// Render soft breaks as literal spaces
    pub nobreaks: bool,
    /// Emit code fence language as `<pre lang="x">` (GitHub style)
    pub github_pre_lang: bool,
}

/// Column limit for CommonMark rendering. HTML rendering ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Width {
    /// No line wrapping
    #[default]
    Unlimited,
    /// Wrap block content at this many display columns
    Columns(usize),
}

impl Width {
    /// Build a width from a numeric argument; zero means unlimited.
    pub fn columns(n: usize) -> Self {
        if n == 0 {
            Width::Unlimited
        } else {
            Width::Columns(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_off() {
        let parse = ParseOptions::default();
        assert!(!parse.validate_utf8);
        assert!(!parse.smart);
        assert!(!parse.footnotes);
        assert!(!parse.normalize);
        let render = RenderOptions::default();
        assert!(!render.sourcepos);
        assert!(!render.hardbreaks);
        assert!(!render.unsafe_);
        assert!(!render.nobreaks);
    }

    #[test]
    fn test_width_zero_means_unlimited() {
        assert_eq!(Width::columns(0), Width::Unlimited);
        assert_eq!(Width::columns(72), Width::Columns(72));
    }

    #[test]
    fn test_render_options_toml_round_trip() {
        let toml_src = "unsafe = true\nhardbreaks = true\n";
        let opts: RenderOptions = toml::from_str(toml_src).unwrap();
        assert!(opts.unsafe_);
        assert!(opts.hardbreaks);
        assert!(!opts.sourcepos);
    }
}
