//! General-purpose lexical polarity and subjectivity scorer.

/// Word weights as `(word, polarity, subjectivity)`.
///
/// Keys are lowercase single words. Polarity lies in `[-1.0, 1.0]`,
/// subjectivity in `[0.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f64, f64)] = &[
    // Positive signals
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("positive", 0.23, 0.55),
    ("success", 0.3, 0.4),
    ("successful", 0.75, 0.95),
    ("strong", 0.43, 0.73),
    ("growth", 0.2, 0.3),
    ("profit", 0.3, 0.3),
    ("profitable", 0.5, 0.5),
    ("innovative", 0.5, 0.75),
    ("praised", 0.6, 0.6),
    ("improved", 0.4, 0.5),
    ("improve", 0.3, 0.4),
    ("benefit", 0.3, 0.3),
    ("sustainable", 0.4, 0.5),
    ("responsible", 0.2, 0.5),
    ("win", 0.8, 0.4),
    ("gains", 0.3, 0.3),
    ("robust", 0.4, 0.5),
    ("thriving", 0.5, 0.6),
    ("happy", 0.8, 1.0),
    ("love", 0.5, 0.6),
    ("safe", 0.5, 0.5),
    ("legal", 0.2, 0.2),
    ("approved", 0.4, 0.3),
    ("commended", 0.6, 0.6),
    ("transparent", 0.3, 0.5),
    // Negative signals
    ("bad", -0.7, 0.67),
    ("poor", -0.4, 0.6),
    ("terrible", -1.0, 1.0),
    ("worst", -1.0, 1.0),
    ("worse", -0.4, 0.6),
    ("negative", -0.3, 0.4),
    ("illegal", -0.5, 0.5),
    ("fraud", -0.6, 0.6),
    ("scandal", -0.6, 0.7),
    ("lawsuit", -0.4, 0.4),
    ("fined", -0.4, 0.3),
    ("violation", -0.5, 0.4),
    ("violations", -0.5, 0.4),
    ("overfishing", -0.5, 0.4),
    ("corruption", -0.7, 0.6),
    ("bribery", -0.7, 0.6),
    ("decline", -0.3, 0.4),
    ("loss", -0.4, 0.3),
    ("losses", -0.4, 0.3),
    ("weak", -0.38, 0.63),
    ("failed", -0.5, 0.3),
    ("failure", -0.5, 0.4),
    ("crisis", -0.5, 0.5),
    ("collapse", -0.6, 0.5),
    ("damage", -0.4, 0.4),
    ("harmful", -0.6, 0.6),
    ("dangerous", -0.6, 0.9),
    ("controversial", -0.3, 0.7),
    ("criticized", -0.4, 0.6),
    ("accused", -0.4, 0.5),
    ("banned", -0.5, 0.4),
    ("destructive", -0.6, 0.7),
    ("exploitation", -0.6, 0.6),
    ("pollution", -0.4, 0.4),
    ("unsustainable", -0.5, 0.6),
    ("sanctions", -0.3, 0.3),
    ("illicit", -0.6, 0.6),
];

/// Words that flip and damp the next scored word.
const NEGATORS: &[&str] = &["not", "no", "never", "cannot", "nor"];

const NEGATION_FACTOR: f64 = -0.5;

/// Words that scale the next scored word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("really", 1.2),
    ("slightly", 0.5),
    ("somewhat", 0.7),
];

/// Mean polarity and subjectivity over the scored words of a text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalScore {
    pub polarity: f64,
    pub subjectivity: f64,
}

/// Score `text` against the lexicon.
///
/// Negators and intensifiers apply to the next scored word in the same
/// sentence. Returns `0.0 / 0.0` for empty text or text with no known words.
#[must_use]
pub fn lexical_score(text: &str) -> LexicalScore {
    let mut polarities: Vec<f64> = Vec::new();
    let mut subjectivities: Vec<f64> = Vec::new();

    let mut negated = false;
    let mut multiplier = 1.0_f64;

    for token in text.split_whitespace() {
        let word = normalize_word(token);

        if is_negator(&word) {
            negated = true;
        } else if let Some(factor) = intensifier(&word) {
            multiplier *= factor;
        } else if let Some((polarity, subjectivity)) = lookup(&word) {
            let mut p = polarity * multiplier;
            if negated {
                p *= NEGATION_FACTOR;
            }
            polarities.push(p.clamp(-1.0, 1.0));
            subjectivities.push((subjectivity * multiplier).clamp(0.0, 1.0));
            negated = false;
            multiplier = 1.0;
        }

        if token.ends_with(['.', '!', '?']) {
            negated = false;
            multiplier = 1.0;
        }
    }

    LexicalScore {
        polarity: mean(&polarities).clamp(-1.0, 1.0),
        subjectivity: mean(&subjectivities).clamp(0.0, 1.0),
    }
}

/// Lowercase with surrounding punctuation removed; inner apostrophes stay.
fn normalize_word(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphabetic())
        .replace('\u{2019}', "'")
        .to_lowercase()
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

fn intensifier(word: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, factor)| factor)
}

fn lookup(word: &str) -> Option<(f64, f64)> {
    LEXICON
        .iter()
        .find(|(w, _, _)| *w == word)
        .map(|&(_, p, s)| (p, s))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = values.len() as f64;
    values.iter().sum::<f64>() / denom
}
