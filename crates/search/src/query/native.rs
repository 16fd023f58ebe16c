//! Structured search requests.
//!
//! [`NativeSearchQuery`] is what the template layer executes: a query, an
//! optional post filter, paging, sorting and aggregations, rendered into one
//! `_search` body. [`SearchRequest`] and [`SearchSource`] are the thinner pair
//! used by [`ElasticClient::search`](crate::client::ElasticClient::search).

use serde_json::{Map, Value, json};

use super::aggregation::{TermsAggregation, aggregations_json};
use super::builders::{Query, bool_query};
use crate::types::PageRequest;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// Returns the DSL name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    field: String,
    order: SortOrder,
}

impl SortField {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }

    /// Sorts by relevance score, highest first.
    pub fn score() -> Self {
        Self::desc("_score")
    }

    fn to_json(&self) -> Value {
        json!({ self.field.clone(): { "order": self.order.as_str() } })
    }
}

/// A search built from query builders.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeSearchQuery {
    query: Query,
    filter: Option<Query>,
    pageable: Option<PageRequest>,
    sort: Vec<SortField>,
    aggregations: Vec<TermsAggregation>,
    min_score: Option<f32>,
}

impl NativeSearchQuery {
    /// Starts a builder.
    pub fn builder() -> NativeSearchQueryBuilder {
        NativeSearchQueryBuilder::default()
    }

    /// The main (scoring) query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The post filter, if set.
    pub fn filter(&self) -> Option<&Query> {
        self.filter.as_ref()
    }

    /// Minimum score, if set.
    pub fn min_score(&self) -> Option<f32> {
        self.min_score
    }

    /// Paging, if set.
    pub fn pageable(&self) -> Option<PageRequest> {
        self.pageable
    }

    /// Requested aggregations.
    pub fn aggregations(&self) -> &[TermsAggregation] {
        &self.aggregations
    }

    /// Renders the `_search` body.
    ///
    /// The filter goes into `post_filter`, so it narrows hits without
    /// affecting aggregations. Total hits are always tracked exactly.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_json());
        if let Some(ref filter) = self.filter {
            body.insert("post_filter".to_string(), filter.to_json());
        }
        if let Some(page) = self.pageable {
            body.insert("from".to_string(), json!(page.offset()));
            body.insert("size".to_string(), json!(page.size));
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self.sort.iter().map(SortField::to_json).collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }
        if !self.aggregations.is_empty() {
            body.insert("aggs".to_string(), aggregations_json(&self.aggregations));
        }
        if let Some(min_score) = self.min_score {
            body.insert("min_score".to_string(), json!(min_score));
        }
        body.insert("track_total_hits".to_string(), json!(true));
        Value::Object(body)
    }

    /// Renders the `_count` body.
    ///
    /// `_count` has no `post_filter`, so a filter is folded into a bool query
    /// as a non-scoring clause. The minimum score is a request parameter and
    /// not part of the body.
    pub fn to_count_body(&self) -> Value {
        let query: Query = match self.filter {
            Some(ref filter) => bool_query()
                .must(self.query.clone())
                .filter(filter.clone())
                .into(),
            None => self.query.clone(),
        };
        json!({ "query": query.to_json() })
    }
}

/// Builder for [`NativeSearchQuery`]. An unset query means match-all.
#[derive(Debug, Clone, Default)]
pub struct NativeSearchQueryBuilder {
    query: Option<Query>,
    filter: Option<Query>,
    pageable: Option<PageRequest>,
    sort: Vec<SortField>,
    aggregations: Vec<TermsAggregation>,
    min_score: Option<f32>,
}

impl NativeSearchQueryBuilder {
    /// Sets the main query.
    pub fn with_query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets a post filter.
    pub fn with_filter(mut self, filter: impl Into<Query>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets paging.
    pub fn with_pageable(mut self, page: PageRequest) -> Self {
        self.pageable = Some(page);
        self
    }

    /// Adds a sort; earlier sorts take precedence.
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Adds a terms aggregation.
    pub fn with_aggregation(mut self, aggregation: TermsAggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    /// Drops hits scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Finishes the query.
    pub fn build(self) -> NativeSearchQuery {
        NativeSearchQuery {
            query: self.query.unwrap_or(Query::MatchAll),
            filter: self.filter,
            pageable: self.pageable,
            sort: self.sort,
            aggregations: self.aggregations,
            min_score: self.min_score,
        }
    }
}

/// Body of a raw search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSource {
    query: Option<Query>,
    aggregations: Vec<TermsAggregation>,
    from: Option<u64>,
    size: Option<u32>,
}

impl SearchSource {
    /// An empty source (match-all, store-default size).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query.
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Adds an aggregation.
    pub fn aggregation(mut self, aggregation: TermsAggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    /// Offset of the first hit.
    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Maximum number of hits. `0` returns aggregations only.
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Renders the `_search` body.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(ref query) = self.query {
            body.insert("query".to_string(), query.to_json());
        }
        if !self.aggregations.is_empty() {
            body.insert("aggs".to_string(), aggregations_json(&self.aggregations));
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        Value::Object(body)
    }
}

/// A search against one or more indices with an explicit source.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    indices: Vec<String>,
    source: SearchSource,
}

impl SearchRequest {
    /// Creates a request against `index` with an empty source.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            indices: vec![index.into()],
            source: SearchSource::new(),
        }
    }

    /// Replaces the source.
    pub fn source(mut self, source: SearchSource) -> Self {
        self.source = source;
        self
    }

    /// Adds another index to search.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.indices.push(index.into());
        self
    }

    /// Indices searched.
    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    /// The request body.
    pub fn search_source(&self) -> &SearchSource {
        &self.source
    }
}
