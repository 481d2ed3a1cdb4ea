//! Entity-level sentiment distributions, entropy and bias scores.
//!
//! Everything here is a pure function of a record snapshot: profiles are
//! recomputed on demand and never persisted. An entity listed twice in one
//! record counts once for that record.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::Serialize;
use slant_core::{ArticleRecord, BiasWeights, SentimentLabel};

/// Entities need at least this many labelled articles for an entropy profile.
pub const MIN_ENTROPY_OBSERVATIONS: u64 = 2;

const MAX_SAMPLE_DOCUMENTS: usize = 5;

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Fixed-shape label counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    #[must_use]
    pub fn get(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }

    /// Share of `label` in the total, `0.0` when empty.
    #[must_use]
    pub fn ratio(&self, label: SentimentLabel) -> f64 {
        ratio(self.get(label), self.total())
    }

    /// The label with strictly more articles than each other label;
    /// ties and empty counters are `neutral`.
    #[must_use]
    pub fn dominant(&self) -> SentimentLabel {
        SentimentLabel::ALL
            .into_iter()
            .find(|&label| {
                SentimentLabel::ALL
                    .into_iter()
                    .filter(|&other| other != label)
                    .all(|other| self.get(label) > self.get(other))
            })
            .unwrap_or(SentimentLabel::Neutral)
    }

    #[must_use]
    pub fn entropy(&self) -> f64 {
        shannon_entropy(&[self.positive, self.negative, self.neutral])
    }

    /// Label → count, zero counts omitted.
    #[must_use]
    pub fn distribution(&self) -> BTreeMap<SentimentLabel, u64> {
        SentimentLabel::ALL
            .into_iter()
            .map(|label| (label, self.get(label)))
            .filter(|&(_, count)| count > 0)
            .collect()
    }
}

/// Base-2 Shannon entropy of a frequency vector.
///
/// Zero counts contribute nothing. Returns `0.0` for an empty or all-zero input.
#[must_use]
pub fn shannon_entropy(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| ratio(c, total))
        .fold(0.0, |h, p| h - p * p.log2())
}

#[allow(clippy::cast_precision_loss)]
fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySentimentProfile {
    pub entity: String,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub total: u64,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub neutral_ratio: f64,
    pub dominant: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityEntropyProfile {
    pub entity: String,
    /// Base 2, in `[0, log2(3)]`.
    pub entropy: f64,
    pub article_count: u64,
    pub distribution: BTreeMap<SentimentLabel, u64>,
    /// Entropy of the entity's articles over publishing sources.
    pub source_entropy: f64,
    /// First few contributing document ids, in snapshot order.
    pub sample_documents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSentimentProfile {
    pub source: String,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub total: u64,
    pub dominant: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityBiasReport {
    pub entity: String,
    pub article_count: u64,
    pub positive_ratio: f64,
    pub negative_ratio: f64,
    pub entropy: f64,
    pub bias_score: f64,
    pub dominant: SentimentLabel,
}

#[derive(Debug, Default)]
struct EntityTally {
    counts: SentimentCounts,
    by_source: BTreeMap<String, SentimentCounts>,
    documents: Vec<String>,
}

/// Single pass over `records`, grouping labels by entity.
fn tally(records: &[ArticleRecord]) -> BTreeMap<String, EntityTally> {
    let mut tallies: BTreeMap<String, EntityTally> = BTreeMap::new();

    for record in records {
        let distinct: BTreeSet<&str> = record.entities.iter().map(String::as_str).collect();
        for entity in distinct {
            let entry = tallies.entry(entity.to_string()).or_default();
            entry.counts.record(record.sentiment);
            entry
                .by_source
                .entry(record.source.clone())
                .or_default()
                .record(record.sentiment);
            if entry.documents.len() < MAX_SAMPLE_DOCUMENTS {
                entry.documents.push(record.document_id.clone());
            }
        }
    }

    tallies
}

/// Label counts and ratios for every entity observed in `records`.
#[must_use]
pub fn sentiment_profile(records: &[ArticleRecord]) -> BTreeMap<String, EntitySentimentProfile> {
    tally(records)
        .into_iter()
        .map(|(entity, t)| {
            let c = t.counts;
            let profile = EntitySentimentProfile {
                entity: entity.clone(),
                positive: c.positive,
                negative: c.negative,
                neutral: c.neutral,
                total: c.total(),
                positive_ratio: c.ratio(SentimentLabel::Positive),
                negative_ratio: c.ratio(SentimentLabel::Negative),
                neutral_ratio: c.ratio(SentimentLabel::Neutral),
                dominant: c.dominant(),
            };
            (entity, profile)
        })
        .collect()
}

/// Entropy of the label distribution for entities with at least
/// [`MIN_ENTROPY_OBSERVATIONS`] articles. A single article cannot show a
/// distribution, so those entities are left out.
#[must_use]
pub fn entropy_profile(records: &[ArticleRecord]) -> BTreeMap<String, EntityEntropyProfile> {
    tally(records)
        .into_iter()
        .filter(|(_, t)| t.counts.total() >= MIN_ENTROPY_OBSERVATIONS)
        .map(|(entity, t)| {
            let source_totals: Vec<u64> = t.by_source.values().map(SentimentCounts::total).collect();
            let profile = EntityEntropyProfile {
                entity: entity.clone(),
                entropy: t.counts.entropy(),
                article_count: t.counts.total(),
                distribution: t.counts.distribution(),
                source_entropy: shannon_entropy(&source_totals),
                sample_documents: t.documents,
            };
            (entity, profile)
        })
        .collect()
}

/// Entity → publishing source → label counts.
#[must_use]
pub fn source_profile(
    records: &[ArticleRecord],
) -> BTreeMap<String, BTreeMap<String, SourceSentimentProfile>> {
    tally(records)
        .into_iter()
        .map(|(entity, t)| {
            let sources = t
                .by_source
                .into_iter()
                .map(|(source, c)| {
                    let profile = SourceSentimentProfile {
                        source: source.clone(),
                        positive: c.positive,
                        negative: c.negative,
                        neutral: c.neutral,
                        total: c.total(),
                        dominant: c.dominant(),
                    };
                    (source, profile)
                })
                .collect();
            (entity, sources)
        })
        .collect()
}

/// `skew * |positive - negative| + concentration * (1 - min(entropy, 1))`,
/// clamped to `[0, 1]`.
#[must_use]
pub fn bias_score(
    positive_ratio: f64,
    negative_ratio: f64,
    entropy: f64,
    weights: BiasWeights,
) -> f64 {
    let skew = (positive_ratio - negative_ratio).abs();
    let concentration = 1.0 - entropy.min(1.0);
    (weights.skew * skew + weights.concentration * concentration).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportOrder {
    /// Ascending entropy: most concentrated coverage first.
    #[default]
    Entropy,
    /// Descending bias score.
    BiasScore,
    /// Descending article count.
    Articles,
}

impl FromStr for ReportOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entropy" => Ok(ReportOrder::Entropy),
            "bias" | "bias_score" | "bias-score" => Ok(ReportOrder::BiasScore),
            "articles" => Ok(ReportOrder::Articles),
            other => Err(format!(
                "unknown report order '{other}' (expected entropy, bias or articles)"
            )),
        }
    }
}

/// Bias report rows for every entity with an entropy profile.
///
/// Ties are broken by entity name so the order is stable.
#[must_use]
pub fn bias_report(
    records: &[ArticleRecord],
    weights: BiasWeights,
    order: ReportOrder,
) -> Vec<EntityBiasReport> {
    let sentiment = sentiment_profile(records);
    let mut rows: Vec<EntityBiasReport> = entropy_profile(records)
        .into_values()
        .filter_map(|e| {
            let s = sentiment.get(&e.entity)?;
            Some(EntityBiasReport {
                bias_score: bias_score(s.positive_ratio, s.negative_ratio, e.entropy, weights),
                article_count: e.article_count,
                positive_ratio: s.positive_ratio,
                negative_ratio: s.negative_ratio,
                entropy: e.entropy,
                dominant: s.dominant,
                entity: e.entity,
            })
        })
        .collect();

    match order {
        ReportOrder::Entropy => rows.sort_by(|a, b| {
            a.entropy
                .total_cmp(&b.entropy)
                .then_with(|| a.entity.cmp(&b.entity))
        }),
        ReportOrder::BiasScore => rows.sort_by(|a, b| {
            b.bias_score
                .total_cmp(&a.bias_score)
                .then_with(|| a.entity.cmp(&b.entity))
        }),
        ReportOrder::Articles => rows.sort_by(|a, b| {
            b.article_count
                .cmp(&a.article_count)
                .then_with(|| a.entity.cmp(&b.entity))
        }),
    }

    rows
}

#[cfg(test)]
#[path = "bias_test.rs"]
mod tests;
