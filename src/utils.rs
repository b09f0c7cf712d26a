/// Drops a trailing `.mp3`/`.wav`, so `calm.mp3` and `calm` name the same track.
pub fn strip_extension(title: &str) -> &str {
    match title.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("mp3") || ext.eq_ignore_ascii_case("wav") => stem,
        _ => title,
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut res = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            _ => res.push(c),
        }
    }

    return res;
}
