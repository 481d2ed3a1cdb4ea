//! Pattern-based organization name extraction.
//!
//! Each matcher looks for a run of capitalized words ending in one of its
//! suffixes ("Jones Group", "Oka Seafood Shipping", "The News Buoy"). This is a
//! surface heuristic: it does not attempt real named-entity recognition.

use std::collections::HashSet;

use regex::Regex;
use slant_core::{default_matchers, MatcherCategory, MatcherConfig};

use crate::error::ExtractionError;
use crate::text::malformed_reason;

/// One or more capitalized words separated by spaces or tabs.
///
/// Capitalization is ASCII only: a word starting with a non-ASCII capital
/// such as `Über` ends the phrase, so only the words after it are reported.
const PHRASE: &str = r"[A-Z][A-Za-z0-9'&\-]*(?:[ \t]+[A-Z][A-Za-z0-9'&\-]*)*";

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntity {
    pub name: String,
    pub category: MatcherCategory,
}

#[derive(Debug, Clone)]
struct CompiledMatcher {
    category: MatcherCategory,
    regex: Regex,
}

/// Stateless extractor applying an ordered list of matchers.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    matchers: Vec<CompiledMatcher>,
    min_chars: usize,
}

impl EntityExtractor {
    /// Compile `matchers` in order. Names shorter than `min_chars` characters
    /// are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidPattern`] if a suffix list does not
    /// produce a valid regular expression.
    pub fn new(matchers: &[MatcherConfig], min_chars: usize) -> Result<Self, ExtractionError> {
        let compiled = matchers
            .iter()
            .map(|m| {
                let regex = Regex::new(&matcher_pattern(&m.suffixes)).map_err(|source| {
                    ExtractionError::InvalidPattern {
                        category: m.category.to_string(),
                        source,
                    }
                })?;
                Ok(CompiledMatcher {
                    category: m.category,
                    regex,
                })
            })
            .collect::<Result<Vec<_>, ExtractionError>>()?;

        Ok(Self {
            matchers: compiled,
            min_chars,
        })
    }

    /// Extractor over the built-in corporate, maritime and media matchers.
    ///
    /// # Panics
    ///
    /// Does not panic: the built-in suffixes are escaped literals.
    #[must_use]
    pub fn with_defaults(min_chars: usize) -> Self {
        Self::new(&default_matchers(), min_chars).expect("built-in matchers compile")
    }

    /// Extract distinct entity names with the category of the first matcher
    /// that found them.
    ///
    /// Order is matcher order, then position in the text, so the same input
    /// always yields the same sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::MalformedText`] for binary or NUL-containing input.
    pub fn extract_tagged(&self, text: &str) -> Result<Vec<ExtractedEntity>, ExtractionError> {
        if let Some(reason) = malformed_reason(text) {
            return Err(ExtractionError::MalformedText(reason));
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut entities = Vec::new();

        for matcher in &self.matchers {
            for found in matcher.regex.find_iter(text) {
                let Some(name) = clean_entity_name(found.as_str(), self.min_chars) else {
                    continue;
                };
                if seen.insert(name.clone()) {
                    entities.push(ExtractedEntity {
                        name,
                        category: matcher.category,
                    });
                }
            }
        }

        Ok(entities)
    }

    /// Distinct entity names in extraction order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::MalformedText`] for binary or NUL-containing input.
    pub fn extract(&self, text: &str) -> Result<Vec<String>, ExtractionError> {
        Ok(self
            .extract_tagged(text)?
            .into_iter()
            .map(|e| e.name)
            .collect())
    }
}

fn matcher_pattern(suffixes: &[String]) -> String {
    let alternatives: Vec<String> = suffixes
        .iter()
        .map(|suffix| {
            let escaped = regex::escape(suffix);
            // A word boundary after "Co." would demand a letter follow the dot.
            if suffix.ends_with(|c: char| c.is_alphanumeric()) {
                format!(r"{escaped}\b")
            } else {
                escaped
            }
        })
        .collect();

    format!(r"\b{PHRASE}[ \t]+(?:{})", alternatives.join("|"))
}

/// Collapse whitespace, strip trailing punctuation, and drop short names.
fn clean_entity_name(raw: &str, min_chars: usize) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = collapsed.trim_end_matches(TRAILING_PUNCTUATION).trim_end();
    if name.chars().count() < min_chars {
        return None;
    }
    Some(name.to_string())
}
