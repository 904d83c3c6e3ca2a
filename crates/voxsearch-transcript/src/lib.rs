//! # voxsearch-transcript
//!
//! Rewrites recognized transcripts so spoken variants of domain vocabulary
//! (region codes, institutional suffixes, sector keywords) match the terms
//! the search index uses.
//!
//! ```text
//! "U A E Ministry of Health." → "uae ministry of health"
//! ```
//!
//! Rules are data ([`rules::VOCABULARY`]) and can be replaced per
//! [`TranscriptNormalizer`].

#![deny(unsafe_code)]

pub mod normalizer;
pub mod rules;

pub use normalizer::{TranscriptNormalizer, normalize_transcript};
pub use rules::{VOCABULARY, VocabularyRule};
