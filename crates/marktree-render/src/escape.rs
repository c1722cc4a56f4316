//! Output escaping for the HTML dialect.

/// Escape text content for an HTML body or attribute value.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a URL for an href or src attribute.
///
/// Characters legal in URLs pass through; quotes and angle brackets are
/// entity-escaped, everything else non-ASCII is percent-encoded.
pub fn escape_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("%22"),
            '\'' => out.push_str("%27"),
            ' ' => out.push_str("%20"),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    out
}

/// Whether a URL scheme is suppressed in safe rendering mode.
///
/// `javascript:`, `vbscript:`, `file:`, and non-image `data:` URLs are
/// considered dangerous; `data:image/{png,gif,jpeg,webp}` is allowed.
pub fn dangerous_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("vbscript:")
        || lower.starts_with("file:")
    {
        return true;
    }
    if let Some(rest) = lower.strip_prefix("data:") {
        return !(rest.starts_with("image/png")
            || rest.starts_with("image/gif")
            || rest.starts_with("image/jpeg")
            || rest.starts_with("image/webp"));
    }
    false
}
