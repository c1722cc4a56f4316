//! Command-line interface for the mt binary.

use clap::{Parser, ValueEnum};
use marktree_core::{ParseOptions, RenderOptions, Width};
use marktree_render::Dialect;
use std::path::PathBuf;

/// Marktree - a streaming CommonMark/GFM document engine.
#[derive(Parser, Debug)]
#[command(
    name = "mt",
    author = "Marktree Contributors",
    version,
    about = "Parse markdown and render it as HTML or CommonMark",
    after_help = "Examples:\n  \
                  cat README.md | mt\n  \
                  mt --to commonmark --width 80 document.md\n  \
                  mt --smart --unsafe --sourcepos input.md"
)]
pub struct Cli {
    /// Input files to process (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "loglevel", default_value = "warn")]
    pub log_level: String,

    /// Output dialect
    #[arg(short = 't', long = "to", value_enum, default_value_t = OutputFormat::Html)]
    pub to: OutputFormat,

    /// Wrap CommonMark output at this many columns (0 = no wrapping)
    #[arg(short = 'w', long = "width", default_value = "0")]
    pub width: usize,

    /// Use a custom config file or inline TOML
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Smart punctuation: curly quotes, dashes, ellipses
    #[arg(long)]
    pub smart: bool,

    /// Replace invalid UTF-8 with U+FFFD
    #[arg(long = "validate-utf8")]
    pub validate_utf8: bool,

    /// Parse footnote definitions and references
    #[arg(long)]
    pub footnotes: bool,

    /// Accept a looser shape for inline HTML tags
    #[arg(long = "liberal-html-tag")]
    pub liberal_html_tag: bool,

    /// Keep the whole code fence info string
    #[arg(long = "full-info-string")]
    pub full_info_string: bool,

    /// Require two tildes for strikethrough
    #[arg(long = "strikethrough-double-tilde")]
    pub strikethrough_double_tilde: bool,

    /// Prefer style attributes over align attributes for tables
    #[arg(long = "table-prefer-style-attributes")]
    pub table_prefer_style_attributes: bool,

    /// Accepted for compatibility; no effect
    #[arg(long)]
    pub normalize: bool,

    /// Emit data-sourcepos attributes on block elements
    #[arg(long)]
    pub sourcepos: bool,

    /// Render soft breaks as hard breaks
    #[arg(long)]
    pub hardbreaks: bool,

    /// Render soft breaks as spaces
    #[arg(long)]
    pub nobreaks: bool,

    /// Pass raw HTML and unsafe URLs through verbatim
    #[arg(long = "unsafe")]
    pub unsafe_: bool,

    /// Emit code fence language as <pre lang="x">
    #[arg(long = "github-pre-lang")]
    pub github_pre_lang: bool,
}

/// Output dialect argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Commonmark,
}

impl Cli {
    pub fn should_read_stdin(&self) -> bool {
        self.files.is_empty()
    }

    pub fn dialect(&self) -> Dialect {
        match self.to {
            OutputFormat::Html => Dialect::Html,
            OutputFormat::Commonmark => Dialect::CommonMark,
        }
    }

    pub fn render_width(&self) -> Width {
        Width::columns(self.width)
    }

    /// Overlay flags given on the command line onto option records.
    pub fn apply(&self, parse: &mut ParseOptions, render: &mut RenderOptions) {
        parse.smart |= self.smart;
        parse.validate_utf8 |= self.validate_utf8;
        parse.footnotes |= self.footnotes;
        parse.liberal_html_tag |= self.liberal_html_tag;
        parse.full_info_string |= self.full_info_string;
        parse.strikethrough_double_tilde |= self.strikethrough_double_tilde;
        parse.table_prefer_style_attributes |= self.table_prefer_style_attributes;
        parse.normalize |= self.normalize;
        render.sourcepos |= self.sourcepos;
        render.hardbreaks |= self.hardbreaks;
        render.nobreaks |= self.nobreaks;
        render.unsafe_ |= self.unsafe_;
        render.github_pre_lang |= self.github_pre_lang;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["mt"]);
        assert!(cli.should_read_stdin());
        assert_eq!(cli.dialect(), Dialect::Html);
        assert_eq!(cli.render_width(), Width::Unlimited);
    }

    #[test]
    fn test_commonmark_with_width() {
        let cli = Cli::parse_from(["mt", "--to", "commonmark", "-w", "72", "in.md"]);
        assert_eq!(cli.dialect(), Dialect::CommonMark);
        assert_eq!(cli.render_width(), Width::Columns(72));
        assert!(!cli.should_read_stdin());
    }

    #[test]
    fn test_option_flags_overlay() {
        let cli = Cli::parse_from(["mt", "--smart", "--unsafe", "--sourcepos"]);
        let mut parse = ParseOptions::default();
        let mut render = RenderOptions::default();
        cli.apply(&mut parse, &mut render);
        assert!(parse.smart);
        assert!(render.unsafe_);
        assert!(render.sourcepos);
        assert!(!parse.footnotes);
    }
}
