//! Text filter predicates.
//!
//! Every built-in filter mode maps to a pure predicate over a query and a
//! candidate's display text. Predicates take `Option<&str>` on both sides; a
//! missing value on either side never matches.
//!
//! The twelve built-in predicates are the product of three operations
//! ([`starts_with`], [`contains`], [`equals`] and their variants) with four
//! comparison flavours:
//!
//! | flavour | normalization | case |
//! |---------|---------------|------|
//! | culture (default) | NFC | Unicode case folding (Turkic rules in `tr`/`az` locales) |
//! | culture, case-sensitive | NFC | exact |
//! | ordinal | none | simple per-character uppercase |
//! | ordinal, case-sensitive | none | exact code points |
//!
//! # Example
//!
//! ```
//! use horizon_suggest::filter::{predicate, FilterMode};
//!
//! let pred = predicate(FilterMode::StartsWith).unwrap();
//! assert!(pred(Some("al"), Some("Alabama")));
//! assert!(!pred(Some("az"), Some("Alabama")));
//! assert!(!pred(None, Some("Alabama")));
//! ```

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use icu::casemap::CaseMapper;
use icu::normalizer::ComposingNormalizer;
use serde::{Deserialize, Serialize};

/// A predicate deciding whether a candidate's display text matches a query.
///
/// Called as `predicate(query, candidate_text)`.
pub type TextPredicate = Arc<dyn Fn(Option<&str>, Option<&str>) -> bool + Send + Sync>;

/// The named filtering behaviours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// No filtering: every candidate passes.
    None,
    /// Culture-aware, case-insensitive prefix match.
    #[default]
    StartsWith,
    /// Culture-aware, case-sensitive prefix match.
    StartsWithCaseSensitive,
    /// Ordinal, case-insensitive prefix match.
    StartsWithOrdinal,
    /// Ordinal, case-sensitive prefix match.
    StartsWithOrdinalCaseSensitive,
    /// Culture-aware, case-insensitive substring match.
    Contains,
    /// Culture-aware, case-sensitive substring match.
    ContainsCaseSensitive,
    /// Ordinal, case-insensitive substring match.
    ContainsOrdinal,
    /// Ordinal, case-sensitive substring match.
    ContainsOrdinalCaseSensitive,
    /// Culture-aware, case-insensitive equality.
    Equals,
    /// Culture-aware, case-sensitive equality.
    EqualsCaseSensitive,
    /// Ordinal, case-insensitive equality.
    EqualsOrdinal,
    /// Ordinal, case-sensitive equality.
    EqualsOrdinalCaseSensitive,
    /// Filtering through a host-supplied text predicate.
    Custom,
}

impl FilterMode {
    /// All modes, in declaration order.
    pub const ALL: [FilterMode; 14] = [
        FilterMode::None,
        FilterMode::StartsWith,
        FilterMode::StartsWithCaseSensitive,
        FilterMode::StartsWithOrdinal,
        FilterMode::StartsWithOrdinalCaseSensitive,
        FilterMode::Contains,
        FilterMode::ContainsCaseSensitive,
        FilterMode::ContainsOrdinal,
        FilterMode::ContainsOrdinalCaseSensitive,
        FilterMode::Equals,
        FilterMode::EqualsCaseSensitive,
        FilterMode::EqualsOrdinal,
        FilterMode::EqualsOrdinalCaseSensitive,
        FilterMode::Custom,
    ];

    /// Whether this mode has a built-in predicate.
    pub fn is_builtin(self) -> bool {
        !matches!(self, FilterMode::None | FilterMode::Custom)
    }
}

/// The built-in predicate for a mode.
///
/// Returns `None` for [`FilterMode::None`] and [`FilterMode::Custom`]; the
/// caller either lets everything through or supplies its own predicate.
pub fn predicate(mode: FilterMode) -> Option<TextPredicate> {
    let pred: TextPredicate = match mode {
        FilterMode::None | FilterMode::Custom => return None,
        FilterMode::StartsWith => Arc::new(starts_with),
        FilterMode::StartsWithCaseSensitive => Arc::new(starts_with_case_sensitive),
        FilterMode::StartsWithOrdinal => Arc::new(starts_with_ordinal),
        FilterMode::StartsWithOrdinalCaseSensitive => Arc::new(starts_with_ordinal_case_sensitive),
        FilterMode::Contains => Arc::new(contains),
        FilterMode::ContainsCaseSensitive => Arc::new(contains_case_sensitive),
        FilterMode::ContainsOrdinal => Arc::new(contains_ordinal),
        FilterMode::ContainsOrdinalCaseSensitive => Arc::new(contains_ordinal_case_sensitive),
        FilterMode::Equals => Arc::new(equals),
        FilterMode::EqualsCaseSensitive => Arc::new(equals_case_sensitive),
        FilterMode::EqualsOrdinal => Arc::new(equals_ordinal),
        FilterMode::EqualsOrdinalCaseSensitive => Arc::new(equals_ordinal_case_sensitive),
    };
    Some(pred)
}

/// How two strings are brought into comparable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Culture,
    CultureCaseSensitive,
    Ordinal,
    OrdinalCaseSensitive,
}

impl Comparison {
    fn prepare<'a>(self, s: &'a str) -> Cow<'a, str> {
        match self {
            Comparison::Culture => Cow::Owned(culture_fold(s)),
            Comparison::CultureCaseSensitive => Cow::Owned(nfc(s)),
            Comparison::Ordinal => Cow::Owned(s.chars().map(simple_uppercase).collect()),
            Comparison::OrdinalCaseSensitive => Cow::Borrowed(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    StartsWith,
    Contains,
    Equals,
}

fn compare(op: Operation, cmp: Comparison, query: Option<&str>, candidate: Option<&str>) -> bool {
    let (Some(query), Some(candidate)) = (query, candidate) else {
        return false;
    };
    // Two empty strings are treated as "no match" for equality, in line with
    // the missing-value rule.
    if op == Operation::Equals && query.is_empty() && candidate.is_empty() {
        return false;
    }

    let query = cmp.prepare(query);
    let candidate = cmp.prepare(candidate);
    match op {
        Operation::StartsWith => candidate.starts_with(query.as_ref()),
        Operation::Contains => candidate.contains(query.as_ref()),
        Operation::Equals => candidate == query,
    }
}

fn nfc(s: &str) -> String {
    ComposingNormalizer::new_nfc().normalize(s).to_string()
}

fn culture_fold(s: &str) -> String {
    let mapper = CaseMapper::new();
    let normalized = nfc(s);
    let folded = if uses_turkic_casing() {
        mapper.fold_turkic_string(&normalized).to_string()
    } else {
        mapper.fold_string(&normalized).to_string()
    };
    nfc(&folded)
}

fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Whether the current locale folds dotted/dotless i the Turkic way.
fn uses_turkic_casing() -> bool {
    static TURKIC: OnceLock<bool> = OnceLock::new();
    *TURKIC.get_or_init(|| {
        let locale = sys_locale::get_locale().unwrap_or_else(|| "en-US".to_string());
        is_turkic_locale(&locale)
    })
}

fn is_turkic_locale(locale: &str) -> bool {
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    language.eq_ignore_ascii_case("tr") || language.eq_ignore_ascii_case("az")
}

/// Culture-aware, case-insensitive prefix match.
pub fn starts_with(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::StartsWith, Comparison::Culture, query, candidate)
}

/// Culture-aware, case-sensitive prefix match.
pub fn starts_with_case_sensitive(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::StartsWith, Comparison::CultureCaseSensitive, query, candidate)
}

/// Ordinal, case-insensitive prefix match.
pub fn starts_with_ordinal(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::StartsWith, Comparison::Ordinal, query, candidate)
}

/// Ordinal, case-sensitive prefix match.
pub fn starts_with_ordinal_case_sensitive(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::StartsWith, Comparison::OrdinalCaseSensitive, query, candidate)
}

/// Culture-aware, case-insensitive substring match.
pub fn contains(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Contains, Comparison::Culture, query, candidate)
}

/// Culture-aware, case-sensitive substring match.
pub fn contains_case_sensitive(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Contains, Comparison::CultureCaseSensitive, query, candidate)
}

/// Ordinal, case-insensitive substring match.
pub fn contains_ordinal(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Contains, Comparison::Ordinal, query, candidate)
}

/// Ordinal, case-sensitive substring match.
pub fn contains_ordinal_case_sensitive(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Contains, Comparison::OrdinalCaseSensitive, query, candidate)
}

/// Culture-aware, case-insensitive equality.
pub fn equals(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Equals, Comparison::Culture, query, candidate)
}

/// Culture-aware, case-sensitive equality.
///
/// This is the predicate used to find an exact match for the typed text.
pub fn equals_case_sensitive(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Equals, Comparison::CultureCaseSensitive, query, candidate)
}

/// Ordinal, case-insensitive equality.
pub fn equals_ordinal(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Equals, Comparison::Ordinal, query, candidate)
}

/// Ordinal, case-sensitive equality.
pub fn equals_ordinal_case_sensitive(query: Option<&str>, candidate: Option<&str>) -> bool {
    compare(Operation::Equals, Comparison::OrdinalCaseSensitive, query, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_never_match() {
        for mode in FilterMode::ALL.into_iter().filter(|m| m.is_builtin()) {
            let pred = predicate(mode).unwrap();
            assert!(!pred(None, Some("Alabama")), "{mode:?}");
            assert!(!pred(Some("Al"), None), "{mode:?}");
            assert!(!pred(None, None), "{mode:?}");
        }
    }

    #[test]
    fn test_none_and_custom_have_no_predicate() {
        assert!(predicate(FilterMode::None).is_none());
        assert!(predicate(FilterMode::Custom).is_none());
    }

    #[test]
    fn test_starts_with_ignores_case() {
        assert!(starts_with(Some("al"), Some("Alabama")));
        assert!(starts_with(Some("ALA"), Some("alaska")));
        assert!(!starts_with(Some("ar"), Some("Alabama")));
        assert!(starts_with(Some(""), Some("Alabama")));
    }

    #[test]
    fn test_case_sensitive_variants() {
        assert!(!starts_with_case_sensitive(Some("al"), Some("Alabama")));
        assert!(starts_with_case_sensitive(Some("Al"), Some("Alabama")));
        assert!(!contains_ordinal_case_sensitive(Some("BAMA"), Some("Alabama")));
        assert!(contains_ordinal_case_sensitive(Some("bama"), Some("Alabama")));
        assert!(!equals_ordinal_case_sensitive(Some("texas"), Some("Texas")));
    }

    #[test]
    fn test_contains_variants() {
        assert!(contains(Some("BAM"), Some("Alabama")));
        assert!(contains_ordinal(Some("BAM"), Some("Alabama")));
        assert!(contains_case_sensitive(Some("bam"), Some("Alabama")));
        assert!(!contains_case_sensitive(Some("BAM"), Some("Alabama")));
    }

    #[test]
    fn test_equals_variants() {
        assert!(equals(Some("texas"), Some("Texas")));
        assert!(equals_ordinal(Some("TEXAS"), Some("texas")));
        assert!(equals_case_sensitive(Some("Texas"), Some("Texas")));
        assert!(!equals_case_sensitive(Some("Tex"), Some("Texas")));
    }

    #[test]
    fn test_equals_with_both_empty_is_no_match() {
        assert!(!equals(Some(""), Some("")));
        assert!(!equals_case_sensitive(Some(""), Some("")));
        assert!(!equals_ordinal_case_sensitive(Some(""), Some("")));
    }

    #[test]
    fn test_culture_comparison_normalizes() {
        // "é" precomposed versus "e" + combining acute accent
        let composed = "caf\u{e9}";
        let decomposed = "cafe\u{301}";
        assert!(equals_case_sensitive(Some(composed), Some(decomposed)));
        assert!(!equals_ordinal_case_sensitive(Some(composed), Some(decomposed)));
    }

    #[test]
    fn test_culture_folding_handles_multi_char_mappings() {
        assert!(equals(Some("STRASSE"), Some("stra\u{df}e")));
        // Ordinal uppercasing maps one character to one character only
        assert!(!equals_ordinal(Some("STRASSE"), Some("stra\u{df}e")));
    }

    #[test]
    fn test_turkic_locale_detection() {
        assert!(is_turkic_locale("tr-TR"));
        assert!(is_turkic_locale("az_AZ"));
        assert!(!is_turkic_locale("en-US"));
        assert!(!is_turkic_locale(""));
    }

    #[test]
    fn test_filter_mode_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: FilterMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"contains_ordinal\"").unwrap();
        assert_eq!(parsed.mode, FilterMode::ContainsOrdinal);
        assert_eq!(FilterMode::default(), FilterMode::StartsWith);
    }
}
