//! Pollen level extraction from the public forecast pages

use std::sync::LazyLock;

use regex::Regex;

/// Highest level on the published scale
const MAX_LEVEL: u8 = 4;

/// Tried in order; the first capture holding a valid level wins
static LEVEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"data-pollen-level\s*=\s*["']?(\d)"#,
        r"pollen-level-(\d)\b",
        r"(?i)\b(?:level|stufe|niveau|livello)\s*:?\s*(\d)\s*(?:/\s*4)?\b",
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Extract a 0-4 pollen level from page markup
///
/// Returns `None` when no pattern matches or the matched digit is outside
/// the scale.
pub fn extract_level(markup: &str) -> Option<u8> {
    LEVEL_PATTERNS.iter().find_map(|re| {
        re.captures_iter(markup)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u8>().ok())
            .find(|level| *level <= MAX_LEVEL)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(LEVEL_PATTERNS.len(), 3);
    }

    #[test]
    fn test_data_attribute() {
        let html = r#"<div class="pollen" data-pollen-level="3">stark</div>"#;
        assert_eq!(extract_level(html), Some(3));
    }

    #[test]
    fn test_class_name() {
        let html = r#"<span class="icon pollen-level-1"></span>"#;
        assert_eq!(extract_level(html), Some(1));
    }

    #[test]
    fn test_text_label() {
        assert_eq!(extract_level("<p>Belastung: Stufe 2/4</p>"), Some(2));
        assert_eq!(extract_level("<p>Niveau : 0</p>"), Some(0));
        assert_eq!(extract_level("<p>Level 4</p>"), Some(4));
    }

    #[test]
    fn test_attribute_takes_precedence() {
        let html = r#"<p>Level 1</p><div data-pollen-level='2'></div>"#;
        assert_eq!(extract_level(html), Some(2));
    }

    #[test]
    fn test_out_of_scale_and_missing() {
        assert_eq!(extract_level(r#"<div data-pollen-level="7"></div>"#), None);
        assert_eq!(extract_level("<html><body>Keine Daten</body></html>"), None);
    }
}
