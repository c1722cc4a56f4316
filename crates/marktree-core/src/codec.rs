//! Packed-word option codec.
//!
//! The grammar-engine boundary speaks a single `u32` of option bits. Bit
//! positions are a stable wire contract: reordering them is a breaking
//! change. Internally the rest of the system only ever sees the structured
//! [`ParseOptions`] / [`RenderOptions`] records; packing and unpacking are
//! isolated to this module.

use crate::options::{ParseOptions, RenderOptions};

pub const OPT_SOURCEPOS: u32 = 1 << 1;
pub const OPT_HARDBREAKS: u32 = 1 << 2;
pub const OPT_NOBREAKS: u32 = 1 << 4;
pub const OPT_NORMALIZE: u32 = 1 << 8;
pub const OPT_VALIDATE_UTF8: u32 = 1 << 9;
pub const OPT_SMART: u32 = 1 << 10;
pub const OPT_GITHUB_PRE_LANG: u32 = 1 << 11;
pub const OPT_LIBERAL_HTML_TAG: u32 = 1 << 12;
pub const OPT_FOOTNOTES: u32 = 1 << 13;
pub const OPT_STRIKETHROUGH_DOUBLE_TILDE: u32 = 1 << 14;
pub const OPT_TABLE_PREFER_STYLE_ATTRIBUTES: u32 = 1 << 15;
pub const OPT_FULL_INFO_STRING: u32 = 1 << 16;
pub const OPT_UNSAFE: u32 = 1 << 17;

/// Pack both option sets into one option word.
pub fn pack(parse: &ParseOptions, render: &RenderOptions) -> u32 {
    let mut bits = 0;
    let mut set = |flag: bool, bit: u32| {
        if flag {
            bits |= bit;
        }
    };
    set(render.sourcepos, OPT_SOURCEPOS);
    set(render.hardbreaks, OPT_HARDBREAKS);
    set(render.nobreaks, OPT_NOBREAKS);
    set(render.unsafe_, OPT_UNSAFE);
    set(render.github_pre_lang, OPT_GITHUB_PRE_LANG);
    set(parse.normalize, OPT_NORMALIZE);
    set(parse.validate_utf8, OPT_VALIDATE_UTF8);
    set(parse.smart, OPT_SMART);
    set(parse.liberal_html_tag, OPT_LIBERAL_HTML_TAG);
    set(parse.footnotes, OPT_FOOTNOTES);
    set(parse.strikethrough_double_tilde, OPT_STRIKETHROUGH_DOUBLE_TILDE);
    set(
        parse.table_prefer_style_attributes,
        OPT_TABLE_PREFER_STYLE_ATTRIBUTES,
    );
    set(parse.full_info_string, OPT_FULL_INFO_STRING);
    bits
}

/// Unpack an option word. Bits outside the defined set decode to disabled.
pub fn unpack(bits: u32) -> (ParseOptions, RenderOptions) {
    let on = |bit: u32| bits & bit != 0;
    let parse = ParseOptions {
        validate_utf8: on(OPT_VALIDATE_UTF8),
        smart: on(OPT_SMART),
        liberal_html_tag: on(OPT_LIBERAL_HTML_TAG),
        footnotes: on(OPT_FOOTNOTES),
        strikethrough_double_tilde: on(OPT_STRIKETHROUGH_DOUBLE_TILDE),
        table_prefer_style_attributes: on(OPT_TABLE_PREFER_STYLE_ATTRIBUTES),
        full_info_string: on(OPT_FULL_INFO_STRING),
        normalize: on(OPT_NORMALIZE),
    };
    let render = RenderOptions {
        sourcepos: on(OPT_SOURCEPOS),
        hardbreaks: on(OPT_HARDBREAKS),
        unsafe_: on(OPT_UNSAFE),
        nobreaks: on(OPT_NOBREAKS),
        github_pre_lang: on(OPT_GITHUB_PRE_LANG),
    };
    (parse, render)
}
