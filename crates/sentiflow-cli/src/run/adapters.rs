//! Bindings from the pipeline's store and source traits to Postgres and
//! NewsAPI.

use std::collections::HashSet;

use sentiflow_core::{Article, EntityId, NewArticle, QuerySpec, RawArticle, SentimentRecord};
use sentiflow_news::NewsClient;
use sentiflow_sentiment::{ArticleSource, Catalog, SentimentError, SentimentStore};
use sqlx::{PgPool, Postgres, Transaction};

/// A [`SentimentStore`] whose reads and writes all go through one transaction.
pub(crate) struct PgStore {
    tx: Transaction<'static, Postgres>,
}

impl PgStore {
    pub(crate) async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub(crate) async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    pub(crate) async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

impl SentimentStore for PgStore {
    async fn entity_catalog(&mut self) -> Result<Catalog, SentimentError> {
        let categories = sentiflow_db::list_categories(&mut *self.tx)
            .await
            .map_err(SentimentError::store)?;
        let entities = sentiflow_db::list_entities(&mut *self.tx)
            .await
            .map_err(SentimentError::store)?;

        Ok(Catalog {
            categories: categories.into_iter().map(Into::into).collect(),
            entities: entities.into_iter().map(Into::into).collect(),
        })
    }

    async fn entity_ids_with_prior_sentiment(&mut self) -> Result<HashSet<EntityId>, SentimentError> {
        sentiflow_db::entity_ids_with_sentiment(&mut *self.tx)
            .await
            .map_err(SentimentError::store)
    }

    async fn existing_article_urls(
        &mut self,
        urls: &[String],
    ) -> Result<HashSet<String>, SentimentError> {
        sentiflow_db::existing_article_urls(&mut *self.tx, urls)
            .await
            .map_err(SentimentError::store)
    }

    async fn persist_articles(&mut self, articles: &[NewArticle]) -> Result<u64, SentimentError> {
        sentiflow_db::insert_articles(&mut *self.tx, articles)
            .await
            .map_err(SentimentError::store)
    }

    async fn articles_by_urls(&mut self, urls: &[String]) -> Result<Vec<Article>, SentimentError> {
        let rows = sentiflow_db::articles_by_urls(&mut *self.tx, urls)
            .await
            .map_err(SentimentError::store)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn persist_sentiment(
        &mut self,
        records: &[SentimentRecord],
    ) -> Result<u64, SentimentError> {
        sentiflow_db::insert_sentiments(&mut *self.tx, records)
            .await
            .map_err(SentimentError::store)
    }
}

/// An [`ArticleSource`] backed by [`NewsClient::fetch_all`].
///
/// Individual query failures are tolerated; the fetch fails only when every
/// query failed.
pub(crate) struct NewsSource<'a> {
    client: &'a NewsClient,
}

impl<'a> NewsSource<'a> {
    pub(crate) fn new(client: &'a NewsClient) -> Self {
        Self { client }
    }
}

impl ArticleSource for NewsSource<'_> {
    async fn fetch(&self, specs: &[QuerySpec]) -> Result<Vec<RawArticle>, SentimentError> {
        let report = self.client.fetch_all(specs).await;

        if report.failed > 0 && report.succeeded == 0 {
            return Err(SentimentError::fetch(format!(
                "all {} news queries failed",
                report.failed
            )));
        }
        if report.failed > 0 {
            tracing::warn!(
                failed_queries = report.failed,
                total_queries = specs.len(),
                "some news queries failed; continuing with partial results"
            );
        }
        Ok(report.articles)
    }
}
