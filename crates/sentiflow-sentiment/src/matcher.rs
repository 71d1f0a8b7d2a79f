//! Multi-pattern entity mention detection.
//!
//! A [`MentionMatcher`] is built once per catalog snapshot and then shared
//! read-only. Lookups cost O(text length + matches) regardless of how many
//! entities the catalog holds.

use std::collections::{HashMap, HashSet};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use sentiflow_core::{Entity, EntityId};

use crate::error::SentimentError;

#[derive(Debug, Clone)]
enum State {
    Unbuilt,
    Built {
        /// `None` when the catalog had no usable names.
        automaton: Option<AhoCorasick>,
        /// Entity ids per pattern index. Entities sharing a normalized name
        /// share one pattern.
        pattern_ids: Vec<Vec<EntityId>>,
    },
}

/// Immutable Aho-Corasick index over entity display names.
///
/// Matching is case-insensitive substring matching, not word-boundary
/// matching: a short name inside a longer word is reported.
#[derive(Debug, Clone)]
pub struct MentionMatcher {
    state: State,
    entities: HashMap<EntityId, Entity>,
}

impl Default for MentionMatcher {
    fn default() -> Self {
        Self::unbuilt()
    }
}

impl MentionMatcher {
    /// A placeholder matcher with no automaton. [`find`](Self::find) on it
    /// returns [`SentimentError::MatcherNotBuilt`].
    #[must_use]
    pub fn unbuilt() -> Self {
        Self {
            state: State::Unbuilt,
            entities: HashMap::new(),
        }
    }

    /// Build a matcher from the entity catalog.
    ///
    /// Names are trimmed and lowercased; blank names are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::MatcherBuild`] if the automaton cannot be
    /// constructed.
    pub fn build<'a, I>(entities: I) -> Result<Self, SentimentError>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut pattern_ids: Vec<Vec<EntityId>> = Vec::new();
        let mut pattern_index: HashMap<String, usize> = HashMap::new();
        let mut by_id = HashMap::new();

        for entity in entities {
            let normalized = normalize(&entity.name);
            if normalized.is_empty() {
                tracing::debug!(entity = %entity.id, "skipping entity with blank name");
                continue;
            }

            match pattern_index.get(&normalized) {
                Some(&idx) => pattern_ids[idx].push(entity.id),
                None => {
                    pattern_index.insert(normalized.clone(), patterns.len());
                    patterns.push(normalized);
                    pattern_ids.push(vec![entity.id]);
                }
            }
            by_id.insert(entity.id, entity.clone());
        }

        let automaton = if patterns.is_empty() {
            tracing::warn!("no entity names available; matcher will never match");
            None
        } else {
            let ac = AhoCorasickBuilder::new()
                .match_kind(MatchKind::Standard)
                .build(&patterns)
                .map_err(|e| SentimentError::MatcherBuild(e.to_string()))?;
            Some(ac)
        };

        tracing::info!(
            entities = by_id.len(),
            patterns = patterns.len(),
            "mention matcher built"
        );

        Ok(Self {
            state: State::Built {
                automaton,
                pattern_ids,
            },
            entities: by_id,
        })
    }

    /// Build a fresh matcher for an updated catalog. `self` is left untouched.
    ///
    /// # Errors
    ///
    /// See [`MentionMatcher::build`].
    pub fn rebuild<'a, I>(&self, entities: I) -> Result<Self, SentimentError>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        Self::build(entities)
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        matches!(self.state, State::Built { .. })
    }

    /// Return the ids of every entity whose name occurs in `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::MatcherNotBuilt`] if called on an
    /// [`unbuilt`](Self::unbuilt) matcher.
    pub fn find(&self, text: &str) -> Result<HashSet<EntityId>, SentimentError> {
        let State::Built {
            automaton,
            pattern_ids,
        } = &self.state
        else {
            return Err(SentimentError::MatcherNotBuilt);
        };

        let mut found = HashSet::new();
        let Some(ac) = automaton else {
            return Ok(found);
        };

        let haystack = text.to_lowercase();
        for m in ac.find_overlapping_iter(&haystack) {
            found.extend(pattern_ids[m.pattern().as_usize()].iter().copied());
        }
        Ok(found)
    }

    /// The original (non-normalized) entity for a matched id.
    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Number of entities indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
