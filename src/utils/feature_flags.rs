pub fn is_truthy(value: impl AsRef<str>) -> bool {
    matches!(
        value.as_ref().trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn is_falsy(value: impl AsRef<str>) -> bool {
    matches!(
        value.as_ref().trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Tri-state env flag: `None` when unset or unrecognized.
pub fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    if is_truthy(&raw) {
        Some(true)
    } else if is_falsy(&raw) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{is_falsy, is_truthy};

    #[test]
    fn truthy_and_falsy_words() {
        assert!(is_truthy(" Yes "));
        assert!(is_truthy("1"));
        assert!(is_falsy("OFF"));
        assert!(!is_truthy("maybe"));
        assert!(!is_falsy("maybe"));
    }
}
