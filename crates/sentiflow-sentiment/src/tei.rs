//! TEI (Text Embeddings Inference) client for NLI entailment scoring.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::scorer::{EntailmentPair, EntailmentScorer};

/// Label reported by most NLI heads for the entailment class.
pub const DEFAULT_ENTAILMENT_LABEL: &str = "entailment";

/// TEI `/predict` client for a sequence-classification NLI model.
pub struct TeiEntailmentClient {
    client: reqwest::Client,
    url: String,
    entailment_label: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: Vec<[&'a str; 2]>,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f32,
}

impl TeiEntailmentClient {
    /// Create a client for the TEI server at `tei_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Tei`] if the HTTP client cannot be built.
    pub fn new(
        tei_url: &str,
        entailment_label: &str,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SentimentError::Tei(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/predict", tei_url.trim_end_matches('/')),
            entailment_label: entailment_label.to_string(),
        })
    }

    /// Score one request's worth of pairs.
    ///
    /// Returns the entailment probability per pair, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Tei`] if the request fails, the response
    /// cannot be parsed, the prediction count differs from the input count,
    /// or a prediction lacks the entailment label.
    pub async fn predict(&self, pairs: &[EntailmentPair<'_>]) -> Result<Vec<f32>, SentimentError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let request = PredictRequest {
            inputs: pairs
                .iter()
                .map(|p| [p.premise, p.hypothesis.as_str()])
                .collect(),
            truncate: true,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SentimentError::Tei(format!("TEI request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::Tei(format!(
                "TEI returned status {}",
                response.status()
            )));
        }

        let predictions: Vec<Vec<Prediction>> = response
            .json()
            .await
            .map_err(|e| SentimentError::Tei(format!("TEI response parse error: {e}")))?;

        if predictions.len() != pairs.len() {
            return Err(SentimentError::Tei(format!(
                "TEI returned {} predictions for {} inputs",
                predictions.len(),
                pairs.len()
            )));
        }

        predictions
            .iter()
            .enumerate()
            .map(|(index, labels)| {
                labels
                    .iter()
                    .find(|p| p.label.eq_ignore_ascii_case(&self.entailment_label))
                    .map(|p| p.score)
                    .ok_or_else(|| {
                        SentimentError::Tei(format!(
                            "prediction {index} has no '{}' label",
                            self.entailment_label
                        ))
                    })
            })
            .collect()
    }
}

impl EntailmentScorer for TeiEntailmentClient {
    async fn score(&self, pairs: &[EntailmentPair<'_>]) -> Result<Vec<f32>, SentimentError> {
        self.predict(pairs).await
    }
}
