//! Tiered news query construction.
//!
//! Entities without any sentiment history get a 30-day backfill window;
//! entities that already have history only need the last day. Each
//! (tier, category) group becomes one [`QuerySpec`].

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, NaiveDate};
use sentiflow_core::{Category, CategoryId, Entity, EntityId, QuerySpec, Tier};

/// Build the query specs for one pipeline run.
///
/// Groups are emitted `New` tier first, then `Tracked`, each ordered by
/// ascending category id. Groups without any usable keyword or display name
/// are logged and skipped. An empty result means there is nothing to fetch.
#[must_use]
pub fn build_query_specs(
    entities: &[Entity],
    categories: &[Category],
    with_prior_sentiment: &HashSet<EntityId>,
    today: NaiveDate,
) -> Vec<QuerySpec> {
    if entities.is_empty() {
        tracing::info!("entity catalog is empty; no queries to build");
        return Vec::new();
    }

    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut groups: BTreeMap<(Tier, CategoryId), Vec<&Entity>> = BTreeMap::new();
    for entity in entities {
        let tier = if with_prior_sentiment.contains(&entity.id) {
            Tier::Tracked
        } else {
            Tier::New
        };
        groups
            .entry((tier, entity.category_id))
            .or_default()
            .push(entity);
    }

    let mut specs = Vec::with_capacity(groups.len());
    for ((tier, category_id), members) in groups {
        let category_name = category_names
            .get(&category_id)
            .map(|n| n.trim())
            .filter(|n| !n.is_empty());

        let names = dedup_terms(members.iter().map(|e| e.name.as_str()));
        if names.is_empty() {
            tracing::warn!(%tier, category_id, "skipping group: no usable entity names");
            continue;
        }

        let keywords = dedup_terms(
            category_name.into_iter().chain(
                members
                    .iter()
                    .flat_map(|e| e.keywords.iter().map(String::as_str)),
            ),
        );
        if keywords.is_empty() {
            tracing::warn!(
                %tier,
                category_id,
                entities = members.len(),
                "skipping group: no keywords, query would be too broad"
            );
            continue;
        }

        let from = today
            .checked_sub_days(Days::new(tier.lookback_days().unsigned_abs()))
            .unwrap_or(NaiveDate::MIN);

        specs.push(QuerySpec {
            tier,
            category_id,
            category_name: category_name.map(str::to_string),
            entity_ids: members.iter().map(|e| e.id).collect(),
            name_clause: disjunction(&names),
            keyword_clause: disjunction(&keywords),
            from,
            to: today,
        });
    }

    tracing::info!(
        queries = specs.len(),
        new = specs.iter().filter(|s| s.tier == Tier::New).count(),
        tracked = specs.iter().filter(|s| s.tier == Tier::Tracked).count(),
        "built news queries"
    );
    specs
}

/// Trim, drop blanks, and dedupe case-insensitively keeping the first spelling.
fn dedup_terms<'a>(terms: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

/// `"a" OR "b"`, with embedded double quotes removed from each term.
fn disjunction(terms: &[&str]) -> String {
    terms
        .iter()
        .map(|t| format!("\"{}\"", t.replace('"', "")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
#[path = "query_tiers_test.rs"]
mod tests;
