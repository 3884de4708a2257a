use unicode_normalization::UnicodeNormalization;

/// Canonical form used for matching and de-duplicating keywords:
/// NFKC, trimmed, inner whitespace collapsed to one space, lowercased.
#[must_use]
pub fn normalize_keyword(value: &str) -> String {
    let nfkc: String = value.nfkc().collect();
    nfkc.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_lowercases() {
        assert_eq!(normalize_keyword("  AI   Homework\tHelper "), "ai homework helper");
    }

    #[test]
    fn applies_nfkc() {
        // Full-width latin folds to ASCII.
        assert_eq!(normalize_keyword("ＭＡＴＨ app"), "math app");
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(normalize_keyword(" \n\t "), "");
    }
}
