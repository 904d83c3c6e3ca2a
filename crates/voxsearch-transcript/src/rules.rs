//! Vocabulary rules as data.
//!
//! A variant is a space-separated list of terms. Lowercase terms match
//! literally; uppercase terms are abbreviations that match either written
//! solid (`uae`) or spelled out letter by letter with separators between
//! every letter (`u a e`, `u.a.e.`, `u-a-e`). Terms may be joined by any run
//! of separators, including none.
//!
//! Rules run in table order. A rule whose canonical form contains another
//! rule's terms comes first (`fzllc` before `llc`), and each composite rule
//! accepts every form the smaller rule would produce, so a second pass never
//! finds new matches.

/// Characters replaced by a space in the final cleanup pass.
pub const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '/', '-'];

/// Regex class for one separator: whitespace or any [`PUNCTUATION`] char.
const SEPARATOR: &str = r#"[\s.,!?;:"'()/\-]"#;

/// Spoken variants that rewrite to one canonical token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VocabularyRule {
    /// Token written into the transcript.
    pub canonical: &'static str,
    /// Spoken forms, in term syntax.
    pub variants: &'static [&'static str],
}

/// Default rule table: region codes, institutional suffixes, sector words.
pub const VOCABULARY: &[VocabularyRule] = &[
    // Free-zone suffixes
    VocabularyRule {
        canonical: "fzllc",
        variants: &["FZ LLC", "free zone LLC"],
    },
    VocabularyRule {
        canonical: "fzco",
        variants: &["FZ CO", "free zone company"],
    },
    VocabularyRule {
        canonical: "fze",
        variants: &["FZE", "free zone establishment"],
    },
    // Regions
    VocabularyRule {
        canonical: "uae",
        variants: &["UAE", "united arab emirates"],
    },
    VocabularyRule {
        canonical: "ksa",
        variants: &["KSA", "kingdom of saudi arabia"],
    },
    VocabularyRule {
        canonical: "usa",
        variants: &["USA", "united states of america"],
    },
    VocabularyRule {
        canonical: "uk",
        variants: &["UK", "united kingdom"],
    },
    VocabularyRule {
        canonical: "gcc",
        variants: &["GCC", "gulf cooperation council"],
    },
    // Institutional suffixes
    VocabularyRule {
        canonical: "llc",
        variants: &["LLC"],
    },
    VocabularyRule {
        canonical: "pjsc",
        variants: &["PJSC", "public joint stock company"],
    },
    VocabularyRule {
        canonical: "edu",
        variants: &["EDU"],
    },
    VocabularyRule {
        canonical: "ngo",
        variants: &["NGO", "non governmental organization", "non governmental organisation"],
    },
    // Sectors
    VocabularyRule {
        canonical: "healthcare",
        variants: &["health care"],
    },
    VocabularyRule {
        canonical: "fintech",
        variants: &["fin tech"],
    },
    VocabularyRule {
        canonical: "edtech",
        variants: &["ed tech"],
    },
    VocabularyRule {
        canonical: "ecommerce",
        variants: &["e commerce"],
    },
    VocabularyRule {
        canonical: "nonprofit",
        variants: &["non profit", "not for profit"],
    },
];

impl VocabularyRule {
    /// Regex source matching any variant as a whole word.
    pub fn pattern(&self) -> String {
        let variants: Vec<String> = self.variants.iter().map(|v| compile_variant(v)).collect();
        format!(r"\b(?:{})\b", variants.join("|"))
    }
}

fn compile_term(term: &str) -> String {
    if term.chars().all(|c| c.is_ascii_uppercase()) && term.len() > 1 {
        let solid = term.to_ascii_lowercase();
        let letters: Vec<String> = solid.chars().map(String::from).collect();
        let spelled = letters.join(&format!("{SEPARATOR}+"));
        format!("(?:{solid}|{spelled})")
    } else {
        regex::escape(term)
    }
}

fn compile_variant(variant: &str) -> String {
    let terms: Vec<String> = variant.split_whitespace().map(compile_term).collect();
    terms.join(&format!("{SEPARATOR}*"))
}
