//! Aggregation request builders.

use serde_json::{Map, Value, json};

/// Ordering of the buckets of a terms aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOrder {
    /// By document count.
    #[allow(missing_docs)]
    Count { asc: bool },
    /// By bucket key.
    #[allow(missing_docs)]
    Key { asc: bool },
}

impl BucketOrder {
    /// Orders by document count, ascending if `asc`.
    pub fn count(asc: bool) -> Self {
        BucketOrder::Count { asc }
    }

    /// Orders by key, ascending if `asc`.
    pub fn key(asc: bool) -> Self {
        BucketOrder::Key { asc }
    }

    fn to_json(self) -> Value {
        let (key, asc) = match self {
            BucketOrder::Count { asc } => ("_count", asc),
            BucketOrder::Key { asc } => ("_key", asc),
        };
        json!({ key: if asc { "asc" } else { "desc" } })
    }
}

/// `terms` aggregation: one bucket per distinct value of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsAggregation {
    name: String,
    field: Option<String>,
    size: Option<u32>,
    min_doc_count: Option<u64>,
    order: Vec<BucketOrder>,
}

impl TermsAggregation {
    /// Field whose values become bucket keys.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Maximum number of buckets returned (store default: 10).
    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Drops buckets with fewer documents.
    pub fn min_doc_count(mut self, min_doc_count: u64) -> Self {
        self.min_doc_count = Some(min_doc_count);
        self
    }

    /// Adds an ordering criterion; later calls break ties of earlier ones.
    pub fn order(mut self, order: BucketOrder) -> Self {
        self.order.push(order);
        self
    }

    /// Name the results are reported under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the aggregation body (without its name).
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(ref field) = self.field {
            body.insert("field".to_string(), json!(field));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if let Some(min_doc_count) = self.min_doc_count {
            body.insert("min_doc_count".to_string(), json!(min_doc_count));
        }
        match self.order.as_slice() {
            [] => {}
            [single] => {
                body.insert("order".to_string(), single.to_json());
            }
            many => {
                let orders: Vec<Value> = many.iter().map(|o| o.to_json()).collect();
                body.insert("order".to_string(), Value::Array(orders));
            }
        }
        json!({ "terms": body })
    }
}

/// Starts a terms aggregation reported under `name`.
pub fn terms(name: impl Into<String>) -> TermsAggregation {
    TermsAggregation {
        name: name.into(),
        field: None,
        size: None,
        min_doc_count: None,
        order: Vec::new(),
    }
}

/// Renders a list of aggregations into an `aggs` object keyed by name.
pub(crate) fn aggregations_json(aggregations: &[TermsAggregation]) -> Value {
    let map: Map<String, Value> = aggregations
        .iter()
        .map(|a| (a.name.clone(), a.to_json()))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_with_count_order() {
        let agg = terms("top_tags").field("tags").order(BucketOrder::count(false));
        assert_eq!(
            agg.to_json(),
            json!({ "terms": { "field": "tags", "order": { "_count": "desc" } } })
        );
    }

    #[test]
    fn test_terms_with_multiple_orders() {
        let agg = terms("top_tags")
            .field("tags")
            .size(5)
            .order(BucketOrder::count(false))
            .order(BucketOrder::key(true));
        assert_eq!(
            agg.to_json(),
            json!({
                "terms": {
                    "field": "tags",
                    "size": 5,
                    "order": [{ "_count": "desc" }, { "_key": "asc" }]
                }
            })
        );
    }

    #[test]
    fn test_aggregations_keyed_by_name() {
        let aggs = aggregations_json(&[terms("a").field("x"), terms("b").field("y")]);
        assert_eq!(aggs["a"]["terms"]["field"], "x");
        assert_eq!(aggs["b"]["terms"]["field"], "y");
    }
}
