//! Domain records shared by the fetch, persistence and scoring layers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

pub type EntityId = Uuid;
pub type ArticleId = Uuid;
pub type CategoryId = i32;

/// A category (sector) that groups tracked entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A tracked business whose news mentions are scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub category_id: CategoryId,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Auxiliary search keywords. May contain blanks; consumers trim and filter.
    pub keywords: Vec<String>,
}

/// Recency bucket controlling how far back a query searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// No sentiment history yet; needs a historical backfill.
    New,
    /// Already has sentiment history; only incremental news is needed.
    Tracked,
}

impl Tier {
    #[must_use]
    pub fn lookback_days(self) -> i64 {
        match self {
            Tier::New => 30,
            Tier::Tracked => 1,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::New => write!(f, "new"),
            Tier::Tracked => write!(f, "tracked"),
        }
    }
}

/// One news search request for a (category, tier) group.
///
/// Generated fresh for every run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub tier: Tier,
    pub category_id: CategoryId,
    pub category_name: Option<String>,
    pub entity_ids: Vec<EntityId>,
    /// `"A" OR "B"` over the group's display names.
    pub name_clause: String,
    /// `"k1" OR "k2"` over the category name and entity keywords.
    pub keyword_clause: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl QuerySpec {
    /// The combined search expression sent to the news source.
    #[must_use]
    pub fn query(&self) -> String {
        format!("({}) AND ({})", self.name_clause, self.keyword_clause)
    }

    /// Length of the lookback window in days.
    #[must_use]
    pub fn window_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }

    /// Human-readable label used in logs.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.category_name {
            Some(name) => format!("{name} ({})", self.tier),
            None => format!("category:{} ({})", self.category_id, self.tier),
        }
    }
}

/// An article as returned by the fetch layer, before deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: Option<String>,
}

/// A persisted article with its assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Title and content joined into the text that is matched and scored.
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!("{}. {}", self.title, self.content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// All labels in tie-break order: the first maximum wins.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(CoreError::InvalidSentimentLabel(other.to_string())),
        }
    }
}

/// Final per-(article, entity) sentiment.
///
/// Scores are independent entailment probabilities rounded to 4 decimals;
/// they are comparable but need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub article_id: ArticleId,
    pub entity_id: EntityId,
    pub positive_score: f64,
    pub neutral_score: f64,
    pub negative_score: f64,
    pub sentiment: SentimentLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(tier: Tier, from: NaiveDate, to: NaiveDate) -> QuerySpec {
        QuerySpec {
            tier,
            category_id: 3,
            category_name: Some("Fintech".to_string()),
            entity_ids: vec![],
            name_clause: "\"Razorpay\"".to_string(),
            keyword_clause: "\"Fintech\" OR \"payments\"".to_string(),
            from,
            to,
        }
    }

    #[test]
    fn tier_lookback_days() {
        assert_eq!(Tier::New.lookback_days(), 30);
        assert_eq!(Tier::Tracked.lookback_days(), 1);
    }

    #[test]
    fn query_joins_clauses_with_and() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let s = spec(Tier::Tracked, day.pred_opt().unwrap(), day);
        assert_eq!(s.query(), "(\"Razorpay\") AND (\"Fintech\" OR \"payments\")");
        assert_eq!(s.window_days(), 1);
        assert_eq!(s.label(), "Fintech (tracked)");
    }

    #[test]
    fn combined_text_joins_title_and_content() {
        let article = Article {
            id: Uuid::nil(),
            title: "Swiggy raises funds".to_string(),
            url: "https://example.com/a".to_string(),
            content: "The round was led by...".to_string(),
            published_at: None,
        };
        assert_eq!(
            article.combined_text(),
            "Swiggy raises funds. The round was led by..."
        );
    }

    #[test]
    fn sentiment_label_round_trips_through_str() {
        for label in SentimentLabel::ALL {
            assert_eq!(label.as_str().parse::<SentimentLabel>().unwrap(), label);
        }
        assert!("mixed".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn sentiment_label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }
}
