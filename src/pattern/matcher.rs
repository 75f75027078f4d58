//! Placeholder pattern families and the line matcher.

use super::normalize::normalize_text;
use crate::config::DetectionConfig;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    static ref DOUBLE_BRACE: Regex = Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap();
    static ref SPACED_DOUBLE_BRACE: Regex = Regex::new(r"\{\s*\{\s*([^{}]+?)\s*\}\s*\}").unwrap();
    static ref DOUBLE_BRACKET: Regex = Regex::new(r"\[\[\s*([^\[\]]+?)\s*\]\]").unwrap();
    static ref DOLLAR: Regex = Regex::new(r"\$\{\s*([^{}]+?)\s*\}").unwrap();
    static ref PERCENT: Regex = Regex::new(r"%\{\s*([^{}]+?)\s*\}%").unwrap();
    static ref AT: Regex = Regex::new(r"@\{\s*([^{}]+?)\s*\}").unwrap();
    static ref HASH: Regex = Regex::new(r"#\{\s*([^{}]+?)\s*\}").unwrap();
    static ref SINGLE_BRACE: Regex = Regex::new(r"\{\s*([^{}]+?)\s*\}").unwrap();
    static ref SINGLE_BRACKET: Regex = Regex::new(r"\[\s*([^\[\]]+?)\s*\]").unwrap();
}

/// A placeholder delimiter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternFamily {
    /// `{{key}}`
    DoubleBrace,
    /// `{ { key } }`
    SpacedDoubleBrace,
    /// `[[key]]`
    DoubleBracket,
    /// `${key}`
    Dollar,
    /// `%{key}%`
    Percent,
    /// `@{key}`
    At,
    /// `#{key}`
    Hash,
    /// `{key}` (opt-in)
    SingleBrace,
    /// `[key]` (opt-in)
    SingleBracket,
}

impl PatternFamily {
    /// All families, most specific first.
    pub const PRIORITY: [PatternFamily; 9] = [
        PatternFamily::DoubleBrace,
        PatternFamily::SpacedDoubleBrace,
        PatternFamily::DoubleBracket,
        PatternFamily::Dollar,
        PatternFamily::Percent,
        PatternFamily::At,
        PatternFamily::Hash,
        PatternFamily::SingleBrace,
        PatternFamily::SingleBracket,
    ];

    /// Single-delimiter families whose keys go through the false-positive filter.
    pub fn is_permissive(&self) -> bool {
        !matches!(
            self,
            PatternFamily::DoubleBrace
                | PatternFamily::SpacedDoubleBrace
                | PatternFamily::DoubleBracket
        )
    }

    fn regex(&self) -> &'static Regex {
        match self {
            PatternFamily::DoubleBrace => &DOUBLE_BRACE,
            PatternFamily::SpacedDoubleBrace => &SPACED_DOUBLE_BRACE,
            PatternFamily::DoubleBracket => &DOUBLE_BRACKET,
            PatternFamily::Dollar => &DOLLAR,
            PatternFamily::Percent => &PERCENT,
            PatternFamily::At => &AT,
            PatternFamily::Hash => &HASH,
            PatternFamily::SingleBrace => &SINGLE_BRACE,
            PatternFamily::SingleBracket => &SINGLE_BRACKET,
        }
    }
}

/// One placeholder occurrence inside a line.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    /// Start character offset (inclusive)
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// Trimmed key, original case
    pub key: String,
    /// Matched substring of the original line, delimiters included
    pub raw: String,
    /// Family that produced the match
    pub family: PatternFamily,
}

impl PatternMatch {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Finds placeholders in concatenated line text.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    families: Vec<PatternFamily>,
    stoplist: HashSet<String>,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

impl PatternMatcher {
    /// Build a matcher for the families enabled in `config`.
    pub fn new(config: &DetectionConfig) -> Self {
        let families = PatternFamily::PRIORITY
            .iter()
            .copied()
            .filter(|f| match f {
                PatternFamily::SingleBrace => config.allow_single_brace,
                PatternFamily::SingleBracket => config.allow_single_bracket,
                _ => true,
            })
            .collect();
        let stoplist = config.stoplist.iter().map(|w| w.trim().to_uppercase()).collect();
        Self { families, stoplist }
    }

    /// Families this matcher scans, in priority order.
    pub fn families(&self) -> &[PatternFamily] {
        &self.families
    }

    /// Find every placeholder in `line`.
    ///
    /// Offsets are character offsets into `line`. Results are
    /// non-overlapping and sorted by start; an earlier family wins any
    /// overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_oxide::pattern::{PatternFamily, PatternMatcher};
    ///
    /// let matcher = PatternMatcher::default();
    /// let found = matcher.find("Name: {{name}}, City: ${city}");
    /// assert_eq!(found.len(), 2);
    /// assert_eq!((found[0].start, found[0].end), (6, 14));
    /// assert_eq!(found[1].key, "city");
    /// assert_eq!(found[1].family, PatternFamily::Dollar);
    /// ```
    pub fn find(&self, line: &str) -> Vec<PatternMatch> {
        let normalized = normalize_text(line);
        let original: Vec<char> = line.chars().collect();
        let char_starts: Vec<usize> = normalized.char_indices().map(|(i, _)| i).collect();
        let to_char = |byte: usize| char_starts.partition_point(|&b| b < byte);

        let mut accepted: Vec<PatternMatch> = Vec::new();
        for &family in &self.families {
            for caps in family.regex().captures_iter(&normalized) {
                let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let key = group.as_str().trim();
                if !self.accepts_key(family, key) {
                    continue;
                }
                let start = to_char(whole.start());
                let end = to_char(whole.end());
                if accepted.iter().any(|m| m.overlaps(start, end)) {
                    continue;
                }
                accepted.push(PatternMatch {
                    start,
                    end,
                    key: key.to_string(),
                    raw: original[start..end].iter().collect(),
                    family,
                });
            }
        }
        accepted.sort_by_key(|m| m.start);
        accepted
    }

    /// True when `text` contains at least one placeholder.
    pub fn contains_placeholder(&self, text: &str) -> bool {
        !self.find(text).is_empty()
    }

    fn accepts_key(&self, family: PatternFamily, key: &str) -> bool {
        if key.is_empty() || key.chars().any(|c| matches!(c, '{' | '}' | '[' | ']')) {
            return false;
        }
        !(family.is_permissive() && is_false_positive(key, &self.stoplist))
    }
}

/// False-positive filter for permissive single-delimiter keys.
///
/// Rejects single characters, pure numbers, short upper-case or numeric
/// acronyms (at most four characters) and stoplisted words. `stoplist`
/// entries must be upper-case.
///
/// # Examples
///
/// ```
/// use placeholder_oxide::pattern::is_false_positive;
/// use std::collections::HashSet;
///
/// let stoplist: HashSet<String> = ["NEW".to_string()].into_iter().collect();
/// assert!(is_false_positive("NEW", &stoplist));
/// assert!(is_false_positive("PDF", &stoplist));
/// assert!(is_false_positive("2024", &stoplist));
/// assert!(!is_false_positive("name", &stoplist));
/// assert!(!is_false_positive("CUSTOMER", &stoplist));
/// ```
pub fn is_false_positive(key: &str, stoplist: &HashSet<String>) -> bool {
    let key = key.trim();
    let len = key.chars().count();
    if len <= 1 {
        return true;
    }
    if key.chars().all(|c| c.is_numeric()) {
        return true;
    }
    if key.chars().any(|c| matches!(c, '{' | '}' | '[' | ']')) {
        return true;
    }
    let alphanumeric = key.chars().all(char::is_alphanumeric);
    let upper_or_digits = key.chars().all(|c| c.is_uppercase() || c.is_numeric());
    if alphanumeric && upper_or_digits && len <= 4 {
        return true;
    }
    stoplist.contains(&key.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(found: &[PatternMatch]) -> Vec<&str> {
        found.iter().map(|m| m.key.as_str()).collect()
    }

    #[test]
    fn test_all_default_families() {
        let m = PatternMatcher::default();
        let found = m.find("{{a1}} { { b2 } } [[c3]] ${d4} %{e5}% @{f6} #{g7}");
        assert_eq!(keys(&found), vec!["a1", "b2", "c3", "d4", "e5", "f6", "g7"]);
        assert_eq!(found[1].family, PatternFamily::SpacedDoubleBrace);
        assert_eq!(found[4].family, PatternFamily::Percent);
    }

    #[test]
    fn test_single_delimiters_off_by_default() {
        let m = PatternMatcher::default();
        assert!(m.find("see {footnote} and [reference]").is_empty());
    }

    #[test]
    fn test_double_brace_wins_over_single_brace() {
        let m = PatternMatcher::new(&DetectionConfig::default().with_single_brace(true));
        let found = m.find("Hello {{customer}}!");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].family, PatternFamily::DoubleBrace);
        assert_eq!(found[0].raw, "{{customer}}");
    }

    #[test]
    fn test_key_is_trimmed_and_raw_is_exact() {
        let m = PatternMatcher::default();
        let found = m.find("x {{  full name  }} y");
        assert_eq!(found[0].key, "full name");
        assert_eq!(found[0].raw, "{{  full name  }}");
        assert_eq!(found[0].start, 2);
    }

    #[test]
    fn test_offsets_are_character_offsets() {
        let m = PatternMatcher::default();
        let line = "Şehir: ｛｛şehir｝｝";
        let found = m.find(line);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 7);
        assert_eq!(found[0].end, 16);
        assert_eq!(found[0].raw, "｛｛şehir｝｝");
        assert_eq!(found[0].key, "şehir");
    }

    #[test]
    fn test_stoplist_and_acronyms_rejected_for_permissive_families() {
        let config = DetectionConfig::default()
            .with_single_brace(true)
            .with_single_bracket(true);
        let m = PatternMatcher::new(&config);
        assert!(m.find("{NEW} [YES] ${ALL} {x} {42} [PDF] @{no}").is_empty());
        assert_eq!(keys(&m.find("{customer_name} [Company]")), vec!["customer_name", "Company"]);
    }

    #[test]
    fn test_double_families_not_filtered() {
        let m = PatternMatcher::default();
        assert_eq!(keys(&m.find("{{NEW}} [[ID]]")), vec!["NEW", "ID"]);
    }

    #[test]
    fn test_empty_keys_rejected() {
        let m = PatternMatcher::default();
        assert!(m.find("{{ }} [[   ]]").is_empty());
    }

    #[test]
    fn test_contains_placeholder() {
        let m = PatternMatcher::default();
        assert!(m.contains_placeholder("{{a}}"));
        assert!(!m.contains_placeholder("NEW"));
    }
}
