/// Literal placed in front of the visible suffix of a redacted value.
pub const MASK_PREFIX: &str = "****";

/// Masks all but the last `visible` characters of `value`.
///
/// Returns `None` when the value is not longer than the visible suffix, in
/// which case nothing of it may be emitted at all.
pub fn obfuscate(value: &str, visible: usize) -> Option<String> {
    let len = value.chars().count();
    if len <= visible {
        return None;
    }

    let suffix: String = value.chars().skip(len - visible).collect();
    Some(format!("{MASK_PREFIX}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_trailing_characters() {
        assert_eq!(obfuscate("1234567890", 4).as_deref(), Some("****7890"));
    }

    #[test]
    fn test_short_values_are_dropped() {
        assert_eq!(obfuscate("1234", 4), None);
        assert_eq!(obfuscate("12", 4), None);
        assert_eq!(obfuscate("", 0), None);
    }

    #[test]
    fn test_zero_length_suffix_masks_everything() {
        assert_eq!(obfuscate("secret", 0).as_deref(), Some("****"));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert_eq!(obfuscate("clé-ßecret-ü", 2).as_deref(), Some("****-ü"));
    }
}
