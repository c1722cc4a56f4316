//! HTML entity decoding
//!
//! The grammar engine resolves entity references while building text nodes,
//! so renderers always see plain Unicode and re-escape as needed for their
//! dialect.

/// Look up a named entity (without `&` and `;`).
fn named_entity(name: &str) -> Option<&'static str> {
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "mdash" => "—",
        "ndash" => "–",
        "hellip" => "…",
        "times" => "×",
        "divide" => "÷",
        "plusmn" => "±",
        "le" => "≤",
        "ge" => "≥",
        "ne" => "≠",
        "deg" => "°",
        "sect" => "§",
        "para" => "¶",
        "bull" => "•",
        "middot" => "·",
        "laquo" => "«",
        "raquo" => "»",
        "euro" => "€",
        "pound" => "£",
        "yen" => "¥",
        "cent" => "¢",
        "larr" => "←",
        "rarr" => "→",
        "uarr" => "↑",
        "darr" => "↓",
        _ => return None,
    };
    Some(decoded)
}

/// Decode `&name;`, `&#123;`, and `&#x1F;` references in `text`.
///
/// Unrecognized references are left verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match entity_at(tail) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Try to decode one entity at the start of `s` (which begins with `&`).
/// Returns the decoded text and the number of bytes consumed.
fn entity_at(s: &str) -> Option<(String, usize)> {
    // Scan at most 32 chars for the terminator; a byte cut could split a
    // multi-byte character.
    let semi = s
        .char_indices()
        .take(32)
        .find(|&(_, c)| c == ';')
        .map(|(i, _)| i)?;
    let body = &s[1..semi];
    if body.is_empty() {
        return None;
    }

    if let Some(num) = body.strip_prefix('#') {
        let codepoint = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        // U+0000 and invalid scalars become the replacement character
        let ch = match codepoint {
            0 => '\u{FFFD}',
            n => char::from_u32(n).unwrap_or('\u{FFFD}'),
        };
        return Some((ch.to_string(), semi + 1));
    }

    named_entity(body).map(|decoded| (decoded.to_string(), semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&copy; 2024"), "© 2024");
        assert_eq!(decode_entities("x &le; y"), "x ≤ y");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(decode_entities("&#169;"), "©");
        assert_eq!(decode_entities("&#x00A9;"), "©");
        assert_eq!(decode_entities("&#X2192;"), "→");
    }

    #[test]
    fn test_unknown_left_verbatim() {
        assert_eq!(decode_entities("&nosuch; &"), "&nosuch; &");
        assert_eq!(decode_entities("AT&T"), "AT&T");
    }

    #[test]
    fn test_multibyte_char_inside_scan_window() {
        // A non-ASCII char straddling the 32-byte mark must not split the scan.
        let text = format!("&{}é more", "a".repeat(30));
        assert_eq!(decode_entities(&text), text);
        assert_eq!(decode_entities("&éé;"), "&éé;");
    }

    #[test]
    fn test_invalid_codepoints_become_replacement() {
        assert_eq!(decode_entities("&#0;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#x110000;"), "\u{FFFD}");
    }
}
