//! Elastico Search
//!
//! Typed repositories and query construction for Elasticsearch. Blog
//! paragraphs ([`Para`](model::Para)) with nested writers and keyword tags are
//! stored in the `blog` index and queried with match, phrase, multi-match,
//! fuzzy, regexp, nested, bool and term queries, plus terms aggregations.
//!
//! All matching, scoring and aggregation runs on the Elasticsearch node; this
//! crate only builds requests and reads responses.
//!
//! # Architecture
//!
//! - [`config`] - Client configuration (host, port, timeouts, auth)
//! - [`client`] - The long-lived client and the raw search path
//! - [`schema`] - Index mappings and the [`Document`] trait
//! - [`model`] - Entities ([`Para`](model::Para), [`Writer`](model::Writer), [`Company`](model::Company))
//! - [`query`] - Query DSL builders, aggregations, templates, derived queries
//! - [`operations`] - [`ElasticsearchTemplate`]: documents, indices and search
//! - [`repository`] - [`ElasticsearchRepository`] and [`ParaRepository`]
//! - [`types`] - Hits, aggregations and pages
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```no_run
//! use elastico_search::{
//!     ElasticClient, ElasticsearchConfig, ElasticsearchRepository, ElasticsearchTemplate,
//!     ParaRepository, PageRequest,
//! };
//! use elastico_search::model::{Para, fixtures};
//!
//! # async fn run() -> elastico_search::StorageResult<()> {
//! let client = ElasticClient::connect(ElasticsearchConfig::new("localhost", 9200)).await?;
//! let template = ElasticsearchTemplate::new(client);
//! template.create_index::<Para>().await?;
//!
//! let repository = ParaRepository::new(template)?;
//! repository.save_all(fixtures::sample_paras()).await?;
//!
//! let page = repository
//!     .find_by_writers_name("John Smith", PageRequest::of(0, 10))
//!     .await?;
//! assert_eq!(page.total_elements(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Structured queries
//!
//! ```
//! use elastico_search::query::{
//!     BucketOrder, NativeSearchQuery, Operator, match_query, terms,
//! };
//!
//! let query = NativeSearchQuery::builder()
//!     .with_query(match_query("title", "Search engines").operator(Operator::And))
//!     .with_aggregation(terms("top_tags").field("tags").order(BucketOrder::count(false)))
//!     .build();
//!
//! let body = query.to_body();
//! assert_eq!(body["query"]["match"]["title"]["operator"], "and");
//! assert_eq!(body["track_total_hits"], true);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod operations;
pub mod query;
pub mod repository;
pub mod schema;
pub mod types;

// Re-export commonly used types at crate root
pub use client::ElasticClient;
pub use config::{ElasticsearchAuth, ElasticsearchConfig};
pub use error::{StorageError, StorageResult};
pub use operations::ElasticsearchTemplate;
pub use schema::Document;
pub use types::{IndexCoordinates, Page, PageRequest, SearchHit, SearchHits};

// Re-export repositories
pub use repository::{
    DerivedResult, ElasticsearchRepository, ParaRepository, SimpleElasticsearchRepository,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
