use crate::constants::network::{ALLOWED_SCHEMES, DEFAULT_SCHEME};

fn has_allowed_scheme(value: &str) -> bool {
    ALLOWED_SCHEMES.iter().any(|scheme| {
        value
            .get(..scheme.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .unwrap_or(false)
    })
}

/// Trims the input and prepends `https://` unless an http(s) scheme is present.
pub fn normalize_target_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_allowed_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed)
    }
}
