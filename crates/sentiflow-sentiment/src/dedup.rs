//! URL-based deduplication of fetched articles.

use std::collections::BTreeMap;

use sentiflow_core::RawArticle;

/// Collapse fetched articles into a map keyed by URL.
///
/// The first article seen for a URL wins; later duplicates and articles with
/// a missing or blank URL are dropped. Keys are the URL with surrounding
/// whitespace removed, matching the URL later persisted for the article; the
/// kept article carries the same trimmed URL.
#[must_use]
pub fn deduplicate_articles<I>(articles: I) -> BTreeMap<String, RawArticle>
where
    I: IntoIterator<Item = RawArticle>,
{
    let mut unique = BTreeMap::new();
    let mut total = 0usize;

    for mut article in articles {
        total += 1;
        let Some(url) = article
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        article.url = Some(url.clone());
        unique.entry(url).or_insert(article);
    }

    tracing::info!(
        fetched = total,
        unique = unique.len(),
        "deduplicated articles by URL"
    );
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: Option<&str>, title: &str) -> RawArticle {
        RawArticle {
            title: Some(title.to_string()),
            url: url.map(str::to_string),
            ..RawArticle::default()
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let out = deduplicate_articles(vec![
            article(Some("a"), "A1"),
            article(Some("a"), "A2"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out["a"].title.as_deref(), Some("A1"));
    }

    #[test]
    fn missing_and_blank_urls_are_dropped() {
        let out = deduplicate_articles(vec![
            article(None, "no url"),
            article(Some("  "), "blank url"),
            article(Some("https://example.com/x"), "kept"),
        ]);
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("https://example.com/x"));
    }

    #[test]
    fn keys_are_exact_input_urls() {
        let urls = ["https://a.com/1", "https://a.com/1/", "HTTPS://A.COM/1"];
        let out = deduplicate_articles(urls.iter().map(|u| article(Some(u), "t")));
        assert_eq!(out.len(), 3);
        for (key, value) in &out {
            assert!(urls.contains(&key.as_str()));
            assert_eq!(value.url.as_deref(), Some(key.as_str()));
        }
    }

    #[test]
    fn surrounding_whitespace_does_not_split_a_url() {
        let out = deduplicate_articles(vec![
            article(Some(" https://example.com/x\n"), "padded"),
            article(Some("https://example.com/x"), "bare"),
        ]);
        assert_eq!(out.len(), 1);
        let kept = &out["https://example.com/x"];
        assert_eq!(kept.title.as_deref(), Some("padded"));
        assert_eq!(kept.url.as_deref(), Some("https://example.com/x"));
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(deduplicate_articles(Vec::new()).is_empty());
    }
}
