//! Batched zero-shot sentiment scoring.
//!
//! Every (article, entity) pair is turned into three entailment hypotheses,
//! one per [`SentimentLabel`]. All hypotheses from all articles are scored
//! through the injected [`EntailmentScorer`] in fixed-size mini-batches and
//! the per-label probabilities are folded back into one [`SentimentRecord`]
//! per pair.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use sentiflow_core::{ArticleId, EntityId, SentimentLabel, SentimentRecord};

use crate::error::SentimentError;

/// Default number of (premise, hypothesis) pairs per backend call.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// One premise/hypothesis input for the entailment model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntailmentPair<'a> {
    pub premise: &'a str,
    pub hypothesis: String,
}

/// A model that estimates, per pair, the probability that the hypothesis is
/// entailed by the premise.
///
/// Implementations must return exactly one score per input pair, in input
/// order. The bulk scorer never calls `score` concurrently unless
/// `max_concurrent_batches > 1`.
pub trait EntailmentScorer: Send + Sync {
    fn score(
        &self,
        pairs: &[EntailmentPair<'_>],
    ) -> impl Future<Output = Result<Vec<f32>, SentimentError>> + Send;
}

/// An entity found in an article, as handed to the scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionedEntity {
    pub id: EntityId,
    pub name: String,
}

/// All entities mentioned in one article.
#[derive(Debug, Clone)]
pub struct ScoringJob {
    pub article_id: ArticleId,
    /// Title and body, used as the entailment premise.
    pub text: String,
    pub entities: Vec<MentionedEntity>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScorerConfig {
    pub batch_size: usize,
    /// Mini-batches dispatched at once. `1` keeps the backend strictly serial.
    pub max_concurrent_batches: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent_batches: 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PairTag {
    article_id: ArticleId,
    entity_id: EntityId,
    label: SentimentLabel,
}

/// Scores many (article, entity) jobs through one shared backend.
pub struct BulkScorer<S> {
    backend: S,
    config: ScorerConfig,
}

impl<S: EntailmentScorer> BulkScorer<S> {
    /// Zero values in `config` are raised to 1.
    pub fn new(backend: S, config: ScorerConfig) -> Self {
        Self {
            backend,
            config: ScorerConfig {
                batch_size: config.batch_size.max(1),
                max_concurrent_batches: config.max_concurrent_batches.max(1),
            },
        }
    }

    #[must_use]
    pub fn config(&self) -> ScorerConfig {
        self.config
    }

    /// Score every (article, entity) pair across `jobs`.
    ///
    /// Returns one record per distinct pair, in first-appearance order. A
    /// pair repeated within or across jobs is scored once.
    ///
    /// # Errors
    ///
    /// Any failing mini-batch fails the whole call and no records are
    /// returned: [`SentimentError::Scoring`] when the backend errors,
    /// [`SentimentError::ScoreCountMismatch`] or
    /// [`SentimentError::MalformedScore`] when its output is unusable.
    pub async fn score_jobs(
        &self,
        jobs: &[ScoringJob],
    ) -> Result<Vec<SentimentRecord>, SentimentError> {
        let (pairs, tags) = build_pairs(jobs);
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = self.config.batch_size;
        tracing::info!(
            jobs = jobs.len(),
            pairs = pairs.len(),
            batches = pairs.len().div_ceil(batch_size),
            batch_size,
            "scoring entailment pairs"
        );

        let chunks: Vec<&[EntailmentPair<'_>]> = pairs.chunks(batch_size).collect();
        let batches: Vec<Vec<f32>> = stream::iter(0..chunks.len())
            .map(|batch| self.score_batch(batch, chunks[batch]))
            .buffered(self.config.max_concurrent_batches)
            .try_collect()
            .await?;

        let scores: Vec<f32> = batches.into_iter().flatten().collect();
        Ok(aggregate(&tags, &scores))
    }

    async fn score_batch(
        &self,
        batch: usize,
        chunk: &[EntailmentPair<'_>],
    ) -> Result<Vec<f32>, SentimentError> {
        let scores = self
            .backend
            .score(chunk)
            .await
            .map_err(|e| SentimentError::Scoring {
                batch,
                message: e.to_string(),
            })?;

        if scores.len() != chunk.len() {
            return Err(SentimentError::ScoreCountMismatch {
                batch,
                expected: chunk.len(),
                got: scores.len(),
            });
        }

        if let Some((index, &score)) = scores
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s < 0.0)
        {
            return Err(SentimentError::MalformedScore {
                batch,
                index,
                score,
            });
        }

        tracing::debug!(batch, pairs = chunk.len(), "scored batch");
        Ok(scores)
    }
}

/// The hypothesis sentence for one entity and label.
#[must_use]
pub fn hypothesis(entity_name: &str, label: SentimentLabel) -> String {
    format!("The news for {entity_name} is {label}.")
}

fn build_pairs(jobs: &[ScoringJob]) -> (Vec<EntailmentPair<'_>>, Vec<PairTag>) {
    let mut seen: HashSet<(ArticleId, EntityId)> = HashSet::new();
    let mut pairs = Vec::new();
    let mut tags = Vec::new();

    for job in jobs {
        for entity in &job.entities {
            if !seen.insert((job.article_id, entity.id)) {
                continue;
            }
            for label in SentimentLabel::ALL {
                pairs.push(EntailmentPair {
                    premise: job.text.as_str(),
                    hypothesis: hypothesis(&entity.name, label),
                });
                tags.push(PairTag {
                    article_id: job.article_id,
                    entity_id: entity.id,
                    label,
                });
            }
        }
    }

    (pairs, tags)
}

fn aggregate(tags: &[PairTag], scores: &[f32]) -> Vec<SentimentRecord> {
    let mut order: Vec<(ArticleId, EntityId)> = Vec::new();
    let mut by_pair: HashMap<(ArticleId, EntityId), [f64; 3]> = HashMap::new();

    for (tag, &score) in tags.iter().zip(scores) {
        let key = (tag.article_id, tag.entity_id);
        let slot = by_pair.entry(key).or_insert_with(|| {
            order.push(key);
            [0.0; 3]
        });
        slot[label_index(tag.label)] = round_score(score);
    }

    order
        .into_iter()
        .map(|(article_id, entity_id)| {
            let scores = by_pair[&(article_id, entity_id)];
            SentimentRecord {
                article_id,
                entity_id,
                positive_score: scores[0],
                neutral_score: scores[1],
                negative_score: scores[2],
                sentiment: classify(scores),
            }
        })
        .collect()
}

fn label_index(label: SentimentLabel) -> usize {
    match label {
        SentimentLabel::Positive => 0,
        SentimentLabel::Neutral => 1,
        SentimentLabel::Negative => 2,
    }
}

/// Highest score wins; ties go to the earlier label in
/// [`SentimentLabel::ALL`].
fn classify(scores: [f64; 3]) -> SentimentLabel {
    let mut best = 0;
    for i in 1..scores.len() {
        if scores[i] > scores[best] {
            best = i;
        }
    }
    SentimentLabel::ALL[best]
}

/// Round to 4 decimal places.
fn round_score(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
