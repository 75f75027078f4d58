//! Last-resort ASCII folding for fonts without Unicode coverage.

/// ASCII replacement for a Latin letter with diacritics, if one is known.
///
/// Turkish letters are covered explicitly (`ı` and `İ` have no decomposition
/// that yields a plain ASCII letter).
pub fn ascii_fold(c: char) -> Option<&'static str> {
    let s = match c {
        'ç' => "c",
        'ğ' => "g",
        'ı' => "i",
        'ö' => "o",
        'ş' => "s",
        'ü' => "u",
        'Ç' => "C",
        'Ğ' => "G",
        'İ' => "I",
        'Ö' => "O",
        'Ş' => "S",
        'Ü' => "U",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' | 'Į' => "I",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' | 'Ō' | 'Ő' => "O",
        'ù' | 'ú' | 'û' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ū' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ñ' | 'ń' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ć' | 'č' => "c",
        'Ć' | 'Č' => "C",
        'ś' | 'š' => "s",
        'Ś' | 'Š' => "S",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ý' | 'ÿ' => "y",
        'Ý' | 'Ÿ' => "Y",
        'ł' => "l",
        'Ł' => "L",
        'ď' | 'đ' => "d",
        'Ď' | 'Đ' => "D",
        'ř' => "r",
        'Ř' => "R",
        'ť' => "t",
        'Ť' => "T",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        '‘' | '’' | '‚' => "'",
        '“' | '”' | '„' => "\"",
        '–' | '—' => "-",
        '…' => "...",
        _ => return None,
    };
    Some(s)
}

/// Replace every foldable character with its ASCII equivalent.
///
/// Characters without a known equivalent are kept unchanged.
///
/// # Examples
///
/// ```
/// use placeholder_oxide::fonts::transliterate;
///
/// assert_eq!(transliterate("Özgür İstanbul'da"), "Ozgur Istanbul'da");
/// assert_eq!(transliterate("Çağrı Türkçe ğüşıöç"), "Cagri Turkce gusioc");
/// ```
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match ascii_fold(c) {
            Some(s) => out.push_str(s),
            None => out.push(c),
        }
    }
    out
}

/// True when the text contains anything outside ASCII.
pub fn needs_unicode(text: &str) -> bool {
    !text.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turkish_map_is_complete() {
        assert_eq!(transliterate("çğıöşüÇĞİÖŞÜ"), "cgiosuCGIOSU");
    }

    #[test]
    fn test_unknown_characters_kept() {
        assert_eq!(transliterate("東京 ok"), "東京 ok");
    }

    #[test]
    fn test_needs_unicode() {
        assert!(!needs_unicode("Istanbul"));
        assert!(needs_unicode("İstanbul"));
    }
}
