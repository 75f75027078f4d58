//! Character folding applied before pattern matching.
//!
//! Every input character maps to exactly one output character, so character
//! offsets in the folded text are offsets in the original text.

/// Fold a single character.
///
/// Look-alike braces and brackets (fullwidth, small form, ornamental) become
/// their ASCII forms, fullwidth sigils become ASCII sigils, and invisible
/// format characters and non-breaking spaces become a plain space.
pub fn fold_char(c: char) -> char {
    match c {
        '\u{FF5B}' | '\u{FE5B}' | '\u{2774}' | '\u{2983}' => '{',
        '\u{FF5D}' | '\u{FE5C}' | '\u{2775}' | '\u{2984}' => '}',
        '\u{FF3B}' | '\u{27E6}' => '[',
        '\u{FF3D}' | '\u{27E7}' => ']',
        '\u{FF04}' => '$',
        '\u{FF05}' => '%',
        '\u{FF20}' => '@',
        '\u{FF03}' => '#',
        c if is_format_or_nbsp(c) => ' ',
        c => c,
    }
}

/// Fold a whole string, preserving its character count.
///
/// # Examples
///
/// ```
/// use placeholder_oxide::pattern::normalize_text;
///
/// assert_eq!(normalize_text("｛｛name｝｝"), "{{name}}");
/// assert_eq!(normalize_text("{{\u{200B}city}}"), "{{ city}}");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Unicode "format" (Cf) characters commonly found in extracted text, plus
/// the non-breaking space family.
fn is_format_or_nbsp(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}'
            | '\u{00AD}'
            | '\u{061C}'
            | '\u{180E}'
            | '\u{2007}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202F}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookalike_braces_fold() {
        assert_eq!(normalize_text("\u{FE5B}\u{FE5B}a\u{FE5C}\u{FE5C}"), "{{a}}");
        assert_eq!(normalize_text("\u{2774}x\u{2775}"), "{x}");
        assert_eq!(normalize_text("\u{2983}x\u{2984}"), "{x}");
        assert_eq!(normalize_text("\u{FF3B}\u{FF3B}k\u{FF3D}\u{FF3D}"), "[[k]]");
        assert_eq!(normalize_text("\u{FF04}{k}"), "${k}");
    }

    #[test]
    fn test_invisible_characters_become_spaces() {
        assert_eq!(normalize_text("a\u{00A0}b\u{FEFF}c\u{200D}d"), "a b c d");
    }

    #[test]
    fn test_char_count_preserved() {
        let input = "Ad\u{00AD}ı: ｛｛ad｝｝ İstanbul";
        assert_eq!(input.chars().count(), normalize_text(input).chars().count());
    }

    #[test]
    fn test_plain_text_untouched() {
        let input = "Name: {{name}}, Şehir: {{city}}";
        assert_eq!(normalize_text(input), input);
    }
}
