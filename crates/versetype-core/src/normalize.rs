//! Text normalization applied to passages and submissions alike.

/// Pilcrow sign.
const PILCROW: char = '\u{00B6}';
const LINE_SEPARATOR: char = '\u{2028}';
const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// Strip control characters and paragraph/line separator marks.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() && !matches!(*c, PILCROW | LINE_SEPARATOR | PARAGRAPH_SEPARATOR))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(normalize("In the\u{0007} beginning\r\n"), "In the beginning");
        assert_eq!(normalize("tab\there"), "tabhere");
    }

    #[test]
    fn test_strips_separator_marks() {
        assert_eq!(normalize("\u{00B6} And God said"), " And God said");
        assert_eq!(normalize("light\u{2028}and\u{2029}dark"), "lightanddark");
    }

    #[test]
    fn test_keeps_ordinary_text() {
        let text = "Let there be light: and there was light.";
        assert_eq!(normalize(text), text);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(chars in prop::collection::vec(
            prop_oneof![
                Just(PILCROW),
                Just(LINE_SEPARATOR),
                Just(PARAGRAPH_SEPARATOR),
                Just('\n'),
                Just('\u{0007}'),
                any::<char>(),
            ],
            0..64,
        )) {
            let s: String = chars.into_iter().collect();
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalized_has_no_control_chars(s in any::<String>()) {
            let out = normalize(&s);
            prop_assert!(out.chars().all(|c| !c.is_control()));
        }
    }
}
