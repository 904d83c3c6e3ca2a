//! Transcript normalization: lowercase, vocabulary rewrite, punctuation cleanup.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::{debug, error};

use crate::rules::{PUNCTUATION, VOCABULARY, VocabularyRule};

static DEFAULT: LazyLock<TranscriptNormalizer> =
    LazyLock::new(|| TranscriptNormalizer::with_rules(VOCABULARY));

/// Normalize with the default vocabulary.
pub fn normalize_transcript(text: &str) -> String {
    DEFAULT.normalize(text)
}

struct CompiledRule {
    canonical: &'static str,
    regex: Regex,
}

/// Compiled vocabulary rules plus the cleanup pass.
///
/// Total and deterministic: every input yields a string, and normalizing an
/// already normalized transcript returns it unchanged.
pub struct TranscriptNormalizer {
    rules: Vec<CompiledRule>,
}

impl TranscriptNormalizer {
    /// Normalizer for the default [`VOCABULARY`].
    pub fn new() -> Self {
        Self::with_rules(VOCABULARY)
    }

    /// Normalizer for a custom rule table. A rule that fails to compile is
    /// logged and skipped.
    pub fn with_rules(table: &[VocabularyRule]) -> Self {
        let rules = table
            .iter()
            .filter_map(|rule| {
                let pattern = rule.pattern();
                match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(CompiledRule {
                        canonical: rule.canonical,
                        regex,
                    }),
                    Err(e) => {
                        error!(rule = rule.canonical, "invalid vocabulary rule: {e}");
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Number of active rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Normalize one transcript.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = text.trim().to_lowercase();

        for rule in &self.rules {
            let rewritten = match rule.regex.replace_all(&current, NoExpand(rule.canonical)) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(rewritten) => rewritten,
            };
            debug!(rule = rule.canonical, "vocabulary rule applied");
            current = rewritten;
        }

        strip_punctuation(&current)
    }

    /// Normalize an optional transcript; `None` yields an empty string.
    pub fn normalize_opt(&self, text: Option<&str>) -> String {
        text.map(|t| self.normalize(t)).unwrap_or_default()
    }
}

impl Default for TranscriptNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TranscriptNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptNormalizer")
            .field("rules", &self.rules.iter().map(|r| r.canonical).collect::<Vec<_>>())
            .finish()
    }
}

/// Replace [`PUNCTUATION`] with spaces, collapse whitespace runs, trim.
fn strip_punctuation(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn every_default_rule_compiles() {
        assert_eq!(TranscriptNormalizer::new().rule_count(), VOCABULARY.len());
    }

    #[test]
    fn spelled_region_code() {
        assert_eq!(
            normalize_transcript("u a e ministry of health"),
            "uae ministry of health"
        );
    }

    #[test]
    fn dotted_and_cased_abbreviations() {
        assert_eq!(normalize_transcript("Clinics in the U.A.E."), "clinics in the uae");
        assert_eq!(normalize_transcript("K.S.A. hospitals"), "ksa hospitals");
        assert_eq!(normalize_transcript("U-K universities"), "uk universities");
    }

    #[test]
    fn long_forms_collapse() {
        assert_eq!(
            normalize_transcript("United Arab Emirates health care providers"),
            "uae healthcare providers"
        );
        assert_eq!(
            normalize_transcript("gulf cooperation council fin-tech"),
            "gcc fintech"
        );
        assert_eq!(normalize_transcript("not-for-profit groups"), "nonprofit groups");
    }

    #[test]
    fn free_zone_suffixes() {
        assert_eq!(normalize_transcript("acme f z l l c"), "acme fzllc");
        assert_eq!(normalize_transcript("acme FZ-LLC"), "acme fzllc");
        assert_eq!(normalize_transcript("acme free zone l.l.c."), "acme fzllc");
        assert_eq!(normalize_transcript("acme f.z.e"), "acme fze");
        assert_eq!(normalize_transcript("acme fz co"), "acme fzco");
        assert_eq!(normalize_transcript("acme l l c"), "acme llc");
    }

    #[test]
    fn abbreviation_inside_word_is_untouched() {
        assert_eq!(normalize_transcript("education reduce"), "education reduce");
        assert_eq!(normalize_transcript("e d u portals"), "edu portals");
        assert_eq!(normalize_transcript("medtech"), "medtech");
    }

    #[test]
    fn split_words_are_not_joined_into_codes() {
        assert_eq!(normalize_transcript("tell us a story"), "tell us a story");
    }

    #[test]
    fn plain_text_only_gets_cleanup() {
        assert_eq!(
            normalize_transcript("  Dental   clinics, (Dubai)!  "),
            "dental clinics dubai"
        );
    }

    #[test]
    fn empty_and_missing_input() {
        let n = TranscriptNormalizer::new();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("  ...  "), "");
        assert_eq!(n.normalize_opt(None), "");
        assert_eq!(n.normalize_opt(Some("U A E")), "uae");
    }

    #[test]
    fn regex_syntax_in_terms_is_literal() {
        let table = [
            VocabularyRule {
                canonical: "uae",
                variants: &["UAE"],
            },
            VocabularyRule {
                canonical: "broken",
                variants: &["x", "(?P<"],
            },
        ];
        // `(?P<` is escaped as a literal term, so both rules compile
        assert_eq!(TranscriptNormalizer::with_rules(&table).rule_count(), 2);
    }

    #[test]
    fn normalized_text_is_fixed_point() {
        let once = normalize_transcript("The U.S.A.; free-zone L L C, and u k ed-tech!");
        assert_eq!(normalize_transcript(&once), once);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            text in r"[ a-gk-lnos-uzA-Z.,!?;:'()/\-_]{0,40}"
        ) {
            let once = normalize_transcript(&text);
            prop_assert_eq!(normalize_transcript(&once), once);
        }

        #[test]
        fn spelled_words_are_idempotent(
            words in prop::collection::vec(
                prop::sample::select(vec![
                    "u", "a", "e", "s", "k", "f", "z", "l", "c", "o", "d", "uae", "llc",
                    "fz", "free", "zone", "health", "care", "non", "profit", "-", ".", ",",
                ]),
                0..12,
            )
        ) {
            let text = words.join(" ");
            let once = normalize_transcript(&text);
            prop_assert_eq!(normalize_transcript(&once), once);
        }
    }
}
