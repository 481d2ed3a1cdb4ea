//! Single-text commands that need no database.

use slant_core::AppConfig;
use slant_sentiment::{EntityExtractor, SentimentClassifier};

use crate::load_matcher_configs;

/// Print the sentiment label and scores for `text`.
///
/// # Errors
///
/// Returns an error if the text is malformed.
pub(crate) fn run_classify(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let score = SentimentClassifier::from_config(&config.analysis).classify(text)?;
    println!("label:        {}", score.label);
    println!("polarity:     {:.3}", score.polarity);
    println!("subjectivity: {:.3}", score.subjectivity);
    Ok(())
}

/// Print the entities found in `text` with the matcher category that found them.
///
/// # Errors
///
/// Returns an error if the matcher file cannot be loaded or compiled, or the
/// text is malformed.
pub(crate) fn run_extract(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let matchers = load_matcher_configs(config)?;
    let extractor = EntityExtractor::new(&matchers, config.analysis.min_entity_chars)?;
    let entities = extractor.extract_tagged(text)?;

    if entities.is_empty() {
        println!("no entities found");
        return Ok(());
    }

    for entity in entities
        .iter()
        .take(config.analysis.max_entities_per_article)
    {
        println!("{:<12}{}", entity.category.to_string(), entity.name);
    }
    Ok(())
}
