//! Country -> App Store storefront and language resolution.

use std::collections::HashMap;

pub const DEFAULT_COUNTRY: &str = "US";

/// Storefront ids sent in `X-Apple-Store-Front`.
const STOREFRONT_BY_COUNTRY: &[(&str, &str)] = &[
    ("US", "143441-1,29"),
    ("GB", "143444,29"),
    ("CA", "143455-6,29"),
    ("AU", "143460,29"),
    ("CN", "143465-19,29"),
    ("TW", "143470-18,29"),
    ("HK", "143463-18,29"),
    ("JP", "143462-9,29"),
    ("KR", "143466-13,29"),
    ("FR", "143442-3,29"),
    ("DE", "143443-4,29"),
    ("IT", "143450-7,29"),
    ("ES", "143454-8,29"),
    ("PT", "143453-24,29"),
    ("BR", "143503-15,29"),
    ("RU", "143469-16,29"),
    ("TR", "143480-25,29"),
];

const LANGUAGE_BY_COUNTRY: &[(&str, &str)] = &[
    ("US", "en-US"),
    ("GB", "en-GB"),
    ("CA", "en-CA"),
    ("AU", "en-AU"),
    ("CN", "zh-CN"),
    ("TW", "zh-TW"),
    ("HK", "zh-HK"),
    ("JP", "ja-JP"),
    ("KR", "ko-KR"),
    ("FR", "fr-FR"),
    ("DE", "de-DE"),
    ("IT", "it-IT"),
    ("ES", "es-ES"),
    ("PT", "pt-PT"),
    ("BR", "pt-BR"),
    ("RU", "ru-RU"),
    ("TR", "tr-TR"),
];

fn lookup(table: &'static [(&str, &str)], country: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(country))
        .map(|(_, v)| *v)
}

/// Parse `US=143441-1,29;CN=143465-19,29`. Malformed pairs are skipped.
pub fn parse_overrides(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.trim().to_uppercase(), v.trim().to_string()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect()
}

/// Storefront for `country`: overrides first, then the built-in table,
/// then the US storefront.
pub fn resolve_storefront(country: &str, overrides: &HashMap<String, String>) -> String {
    let country = country.trim().to_uppercase();
    if let Some(sf) = overrides.get(&country) {
        return sf.clone();
    }
    lookup(STOREFRONT_BY_COUNTRY, &country)
        .or_else(|| lookup(STOREFRONT_BY_COUNTRY, DEFAULT_COUNTRY))
        .unwrap_or_default()
        .to_string()
}

pub fn accept_language(country: &str) -> &'static str {
    lookup(LANGUAGE_BY_COUNTRY, country.trim()).unwrap_or("en-US")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_override_pairs() {
        let map = parse_overrides(" us=143441-1,29 ; CN=143465-19,29;bogus;=x;");
        assert_eq!(map.len(), 2);
        assert_eq!(map["US"], "143441-1,29");
        assert_eq!(map["CN"], "143465-19,29");
    }

    #[test]
    fn override_wins_over_table() {
        let overrides = parse_overrides("JP=999999,29");
        assert_eq!(resolve_storefront("jp", &overrides), "999999,29");
    }

    #[test]
    fn unknown_country_falls_back_to_us() {
        assert_eq!(resolve_storefront("ZZ", &HashMap::new()), "143441-1,29");
    }

    #[test]
    fn language_per_country() {
        assert_eq!(accept_language("br"), "pt-BR");
        assert_eq!(accept_language("ZZ"), "en-US");
    }
}
