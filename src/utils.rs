use regex::Regex;

/// Turns a free-text name into the form search tags are stored in: trimmed,
/// lowercased, internal whitespace runs collapsed to a single space.
pub fn normalize_token(input: &str) -> String {
    let collapse = Regex::new(r"\s+").unwrap();

    collapse.replace_all(input.trim(), " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_token;

    #[test]
    fn test_case_and_padding() {
        assert_eq!(normalize_token("  SARAH fortune "), "sarah fortune");
        assert_eq!(normalize_token("Sarah Fortune"), "sarah fortune");
    }

    #[test]
    fn test_internal_whitespace() {
        assert_eq!(normalize_token("sarah \t fortune"), "sarah fortune");
        assert_eq!(normalize_token("sarah\n\nfortune"), "sarah fortune");
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize_token(""), "");
        assert_eq!(normalize_token("   "), "");
    }
}
