//! NewsAPI client for SentiFlow.
//!
//! Turns [`QuerySpec`](sentiflow_core::QuerySpec)s into `/v2/everything`
//! requests with round-robin API keys, retry on transient failures and
//! bounded page walking, and normalizes the results into
//! [`RawArticle`](sentiflow_core::RawArticle)s.

pub mod client;
pub mod error;
pub mod keys;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::{FetchOptions, FetchReport, NewsClient, MAX_PAGE_SIZE};
pub use error::NewsError;
pub use keys::KeyRing;
pub use normalize::{normalize_article, strip_truncation_marker};
