//! Search response types.
//!
//! [`SearchHits`] is the typed view used by the template and repositories:
//! each hit's `_source` is deserialized into the entity and the `_id` written
//! back into it. [`SearchResponse`] is the untyped view returned by the raw
//! client path. Both carry parsed [`Aggregations`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{BackendError, StorageError, StorageResult};
use crate::schema::Document;

use super::pagination::{Page, PageRequest};

/// One bucket of a terms aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    key: Value,
    key_as_string: Option<String>,
    doc_count: u64,
}

impl Bucket {
    /// The raw bucket key.
    pub fn key(&self) -> &Value {
        &self.key
    }

    /// The key rendered as a string (numbers and booleans are formatted).
    pub fn key_as_string(&self) -> String {
        if let Some(ref s) = self.key_as_string {
            return s.clone();
        }
        match &self.key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Number of documents in the bucket.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }
}

/// Result of a terms aggregation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Terms {
    buckets: Vec<Bucket>,
    doc_count_error_upper_bound: u64,
    sum_other_doc_count: u64,
}

impl Terms {
    /// Buckets in the order the store returned them.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Bucket keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.buckets.iter().map(Bucket::key_as_string).collect()
    }

    /// Documents whose values fell outside the returned buckets.
    pub fn sum_other_doc_count(&self) -> u64 {
        self.sum_other_doc_count
    }

    /// Upper bound of the per-bucket count error.
    pub fn doc_count_error_upper_bound(&self) -> u64 {
        self.doc_count_error_upper_bound
    }

    fn from_json(value: &Value) -> Option<Self> {
        let buckets = value.get("buckets")?.as_array()?;
        let buckets = buckets
            .iter()
            .map(|b| Bucket {
                key: b.get("key").cloned().unwrap_or(Value::Null),
                key_as_string: b
                    .get("key_as_string")
                    .and_then(|k| k.as_str())
                    .map(String::from),
                doc_count: b.get("doc_count").and_then(|c| c.as_u64()).unwrap_or(0),
            })
            .collect();

        Some(Self {
            buckets,
            doc_count_error_upper_bound: value
                .get("doc_count_error_upper_bound")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            sum_other_doc_count: value
                .get("sum_other_doc_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
        })
    }
}

/// Aggregation results keyed by aggregation name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregations {
    raw: BTreeMap<String, Value>,
    terms: BTreeMap<String, Terms>,
}

impl Aggregations {
    /// Parses the `aggregations` object of a search response.
    pub fn from_json(value: &Value) -> Self {
        let mut aggregations = Self::default();
        if let Some(obj) = value.as_object() {
            for (name, body) in obj {
                if let Some(terms) = Terms::from_json(body) {
                    aggregations.terms.insert(name.clone(), terms);
                }
                aggregations.raw.insert(name.clone(), body.clone());
            }
        }
        aggregations
    }

    /// Returns the bucketed result of a terms aggregation.
    pub fn get_terms(&self, name: &str) -> Option<&Terms> {
        self.terms.get(name)
    }

    /// Returns the unparsed result of any aggregation.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Aggregation names present in the response.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    /// Returns true if the response carried no aggregations.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// A single typed hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<T> {
    id: String,
    index: String,
    score: Option<f64>,
    sort_values: Vec<Value>,
    seq_no: Option<i64>,
    primary_term: Option<i64>,
    content: T,
}

impl<T> SearchHit<T> {
    /// Document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Index the document was found in.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Relevance score; absent when the query does not score.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Sort values, when the search was sorted.
    pub fn sort_values(&self) -> &[Value] {
        &self.sort_values
    }

    /// Sequence number, when the store returned it.
    pub fn seq_no(&self) -> Option<i64> {
        self.seq_no
    }

    /// Primary term, when the store returned it.
    pub fn primary_term(&self) -> Option<i64> {
        self.primary_term
    }

    /// The deserialized document.
    pub fn content(&self) -> &T {
        &self.content
    }

    /// Consumes the hit, returning the document.
    pub fn into_content(self) -> T {
        self.content
    }
}

/// Typed hits of one search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHits<T> {
    total_hits: u64,
    total_hits_relation: String,
    max_score: Option<f64>,
    hits: Vec<SearchHit<T>>,
    aggregations: Option<Aggregations>,
}

impl<T: Document> SearchHits<T> {
    /// Parses a search response body into typed hits.
    pub fn from_json(body: &Value) -> StorageResult<Self> {
        let hits_obj = body.get("hits").ok_or_else(|| {
            StorageError::Backend(BackendError::Serialization {
                message: "search response has no hits".to_string(),
            })
        })?;

        let (total_hits, total_hits_relation) = parse_total(hits_obj.get("total"));
        let max_score = hits_obj.get("max_score").and_then(|s| s.as_f64());

        let mut hits = Vec::new();
        for hit in hits_obj
            .get("hits")
            .and_then(|h| h.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default()
        {
            let Some(source) = hit.get("_source") else {
                continue;
            };
            let id = hit
                .get("_id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            let mut content: T = serde_json::from_value(source.clone())?;
            content.set_id(id.clone());

            hits.push(SearchHit {
                id,
                index: hit
                    .get("_index")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                score: hit.get("_score").and_then(|s| s.as_f64()),
                sort_values: hit
                    .get("sort")
                    .and_then(|s| s.as_array())
                    .cloned()
                    .unwrap_or_default(),
                seq_no: hit.get("_seq_no").and_then(|v| v.as_i64()),
                primary_term: hit.get("_primary_term").and_then(|v| v.as_i64()),
                content,
            });
        }

        let aggregations = body.get("aggregations").map(Aggregations::from_json);

        Ok(Self {
            total_hits,
            total_hits_relation,
            max_score,
            hits,
            aggregations,
        })
    }
}

impl<T> SearchHits<T> {
    /// Total number of matching documents.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// `eq` when `total_hits` is exact, `gte` when it is a lower bound.
    pub fn total_hits_relation(&self) -> &str {
        &self.total_hits_relation
    }

    /// Highest score among the hits.
    pub fn max_score(&self) -> Option<f64> {
        self.max_score
    }

    /// The hit at position `index` of this response.
    pub fn search_hit(&self, index: usize) -> Option<&SearchHit<T>> {
        self.hits.get(index)
    }

    /// All hits of this response.
    pub fn search_hits(&self) -> &[SearchHit<T>] {
        &self.hits
    }

    /// Number of hits in this response (at most the requested size).
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if this response has no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Aggregation results, when requested.
    pub fn aggregations(&self) -> Option<&Aggregations> {
        self.aggregations.as_ref()
    }

    /// Deserialized documents, in hit order.
    pub fn contents(&self) -> Vec<&T> {
        self.hits.iter().map(SearchHit::content).collect()
    }

    /// Converts into a page, keeping the total hit count.
    pub fn into_page(self, request: PageRequest) -> Page<T> {
        let total = self.total_hits;
        let content = self.hits.into_iter().map(SearchHit::into_content).collect();
        Page::new(content, request, total)
    }
}

/// Untyped response of the raw client search path.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    took: u64,
    timed_out: bool,
    total_hits: u64,
    hits: Vec<Value>,
    aggregations: Option<Aggregations>,
}

impl SearchResponse {
    /// Parses a search response body.
    pub fn from_json(body: Value) -> StorageResult<Self> {
        let hits_obj = body.get("hits").ok_or_else(|| {
            StorageError::Backend(BackendError::Serialization {
                message: "search response has no hits".to_string(),
            })
        })?;
        let (total_hits, _) = parse_total(hits_obj.get("total"));

        Ok(Self {
            took: body.get("took").and_then(|t| t.as_u64()).unwrap_or(0),
            timed_out: body
                .get("timed_out")
                .and_then(|t| t.as_bool())
                .unwrap_or(false),
            total_hits,
            hits: hits_obj
                .get("hits")
                .and_then(|h| h.as_array())
                .cloned()
                .unwrap_or_default(),
            aggregations: body.get("aggregations").map(Aggregations::from_json),
        })
    }

    /// Milliseconds the store spent on the search.
    pub fn took(&self) -> u64 {
        self.took
    }

    /// Whether the search timed out on the store.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Total number of matching documents.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Raw hits.
    pub fn hits(&self) -> &[Value] {
        &self.hits
    }

    /// Aggregation results, when requested.
    pub fn aggregations(&self) -> Option<&Aggregations> {
        self.aggregations.as_ref()
    }
}

/// Reads `hits.total`, which is `{"value": n, "relation": "eq"}` on current
/// nodes and a bare number on 6.x nodes.
fn parse_total(total: Option<&Value>) -> (u64, String) {
    match total {
        Some(Value::Number(n)) => (n.as_u64().unwrap_or(0), "eq".to_string()),
        Some(Value::Object(obj)) => (
            obj.get("value").and_then(|v| v.as_u64()).unwrap_or(0),
            obj.get("relation")
                .and_then(|r| r.as_str())
                .unwrap_or("eq")
                .to_string(),
        ),
        _ => (0, "eq".to_string()),
    }
}
