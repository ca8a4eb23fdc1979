pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if max_bytes == 0 {
        return String::new();
    }
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// Lossy UTF-8 preview of a response body, capped at `max_bytes`.
pub fn body_preview(body: &[u8], max_bytes: usize) -> String {
    let text = String::from_utf8_lossy(body);
    let preview = truncate_utf8_prefix(&text, max_bytes);
    if preview.len() < text.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn first_nonblank<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}
