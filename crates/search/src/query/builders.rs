//! Elasticsearch Query DSL builders.
//!
//! Each builder renders to the store's JSON query language with
//! [`Query::to_json`]. Nothing here interprets the query; matching, fuzziness
//! and scoring are evaluated by the node.

use serde_json::{Map, Value, json};

/// Boolean operator between the terms of an analyzed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Any term may match (store default).
    #[default]
    Or,
    /// All terms must match.
    And,
}

impl Operator {
    /// Returns the DSL name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Or => "or",
            Operator::And => "and",
        }
    }
}

/// Allowed edit distance for fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
    /// Edit distance chosen from the term length.
    Auto,
    /// Exact match.
    Zero,
    /// One edit.
    One,
    /// Two edits.
    Two,
}

impl Fuzziness {
    /// Returns the DSL value (`"AUTO"`, `0`, `1` or `2`).
    pub fn to_json(&self) -> Value {
        match self {
            Fuzziness::Auto => json!("AUTO"),
            Fuzziness::Zero => json!(0),
            Fuzziness::One => json!(1),
            Fuzziness::Two => json!(2),
        }
    }
}

/// How a multi-match query combines the per-field scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiMatchType {
    /// Score of the best matching field.
    #[default]
    BestFields,
    /// Sum of the field scores.
    MostFields,
    /// Terms may match in different fields.
    CrossFields,
    /// `match_phrase` on each field.
    Phrase,
    /// `match_phrase_prefix` on each field.
    PhrasePrefix,
    /// `match_bool_prefix` on each field.
    BoolPrefix,
}

impl MultiMatchType {
    /// Returns the DSL name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MultiMatchType::BestFields => "best_fields",
            MultiMatchType::MostFields => "most_fields",
            MultiMatchType::CrossFields => "cross_fields",
            MultiMatchType::Phrase => "phrase",
            MultiMatchType::PhrasePrefix => "phrase_prefix",
            MultiMatchType::BoolPrefix => "bool_prefix",
        }
    }
}

/// How matching nested objects contribute to the parent's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMode {
    /// Nested matches do not contribute to the score.
    None,
    /// Average of the matching nested scores.
    #[default]
    Avg,
    /// Highest nested score.
    Max,
    /// Lowest nested score.
    Min,
    /// Sum of nested scores.
    Sum,
}

impl ScoreMode {
    /// Returns the DSL name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMode::None => "none",
            ScoreMode::Avg => "avg",
            ScoreMode::Max => "max",
            ScoreMode::Min => "min",
            ScoreMode::Sum => "sum",
        }
    }
}

/// `match` query: analyzed full-text match on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    field: String,
    query: String,
    operator: Option<Operator>,
    fuzziness: Option<Fuzziness>,
    prefix_length: Option<u32>,
    minimum_should_match: Option<String>,
}

impl MatchQuery {
    /// Sets the operator between analyzed terms.
    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Allows each term to match within the given edit distance.
    pub fn fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    /// Number of leading characters that must match exactly when fuzzy.
    pub fn prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = Some(prefix_length);
        self
    }

    /// Minimum number (`"2"`) or share (`"75%"`) of terms that must match.
    pub fn minimum_should_match(mut self, value: impl Into<String>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(self.query));
        if let Some(operator) = self.operator {
            body.insert("operator".to_string(), json!(operator.as_str()));
        }
        if let Some(fuzziness) = self.fuzziness {
            body.insert("fuzziness".to_string(), fuzziness.to_json());
        }
        if let Some(prefix_length) = self.prefix_length {
            body.insert("prefix_length".to_string(), json!(prefix_length));
        }
        if let Some(ref msm) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(msm));
        }
        json!({ "match": { self.field.clone(): body } })
    }
}

/// `match_phrase` query: terms must appear in order, within `slop` moves.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhraseQuery {
    field: String,
    query: String,
    slop: Option<u32>,
}

impl MatchPhraseQuery {
    /// Number of position moves allowed between the phrase terms.
    pub fn slop(mut self, slop: u32) -> Self {
        self.slop = Some(slop);
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(self.query));
        if let Some(slop) = self.slop {
            body.insert("slop".to_string(), json!(slop));
        }
        json!({ "match_phrase": { self.field.clone(): body } })
    }
}

/// `multi_match` query: one text matched across several fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatchQuery {
    query: String,
    fields: Vec<String>,
    kind: Option<MultiMatchType>,
    operator: Option<Operator>,
}

impl MultiMatchQuery {
    /// Adds a field to match against.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Adds a field with a score boost, rendered as `field^boost`.
    pub fn field_with_boost(mut self, field: impl Into<String>, boost: f32) -> Self {
        self.fields.push(format!("{}^{}", field.into(), boost));
        self
    }

    /// Sets the multi-match type.
    pub fn kind(mut self, kind: MultiMatchType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the operator between analyzed terms.
    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(self.query));
        body.insert("fields".to_string(), json!(self.fields));
        if let Some(kind) = self.kind {
            body.insert("type".to_string(), json!(kind.as_str()));
        }
        if let Some(operator) = self.operator {
            body.insert("operator".to_string(), json!(operator.as_str()));
        }
        json!({ "multi_match": body })
    }
}

/// `fuzzy` query: a single term matched within an edit distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyQuery {
    field: String,
    value: String,
    fuzziness: Option<Fuzziness>,
    prefix_length: Option<u32>,
}

impl FuzzyQuery {
    /// Sets the allowed edit distance (store default: `AUTO`).
    pub fn fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    /// Number of leading characters that must match exactly.
    pub fn prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = Some(prefix_length);
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("value".to_string(), json!(self.value));
        if let Some(fuzziness) = self.fuzziness {
            body.insert("fuzziness".to_string(), fuzziness.to_json());
        }
        if let Some(prefix_length) = self.prefix_length {
            body.insert("prefix_length".to_string(), json!(prefix_length));
        }
        json!({ "fuzzy": { self.field.clone(): body } })
    }
}

/// `nested` query: runs the inner query against each nested object on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedQuery {
    path: String,
    query: Box<Query>,
    score_mode: ScoreMode,
}

impl NestedQuery {
    fn to_json(&self) -> Value {
        json!({
            "nested": {
                "path": self.path,
                "query": self.query.to_json(),
                "score_mode": self.score_mode.as_str()
            }
        })
    }
}

/// `bool` query: compound of must / filter / should / must_not clauses.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolQuery {
    must: Vec<Query>,
    filter: Vec<Query>,
    should: Vec<Query>,
    must_not: Vec<Query>,
    minimum_should_match: Option<String>,
}

impl BoolQuery {
    /// Adds a scoring clause that must match.
    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    /// Adds a non-scoring clause that must match.
    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    /// Adds an optional clause.
    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    /// Adds a clause that must not match.
    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    /// Minimum number of `should` clauses that must match.
    pub fn minimum_should_match(mut self, value: impl Into<String>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }

    /// Returns true if no clause has been added.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.filter.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("filter", &self.filter),
            ("should", &self.should),
            ("must_not", &self.must_not),
        ] {
            if !clauses.is_empty() {
                let rendered: Vec<Value> = clauses.iter().map(Query::to_json).collect();
                body.insert(key.to_string(), Value::Array(rendered));
            }
        }
        if let Some(ref msm) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), json!(msm));
        }
        json!({ "bool": body })
    }
}

/// A query in the store's DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Every document.
    MatchAll,
    /// See [`MatchQuery`].
    Match(MatchQuery),
    /// See [`MatchPhraseQuery`].
    MatchPhrase(MatchPhraseQuery),
    /// See [`MultiMatchQuery`].
    MultiMatch(MultiMatchQuery),
    /// Exact value on an unanalyzed field.
    #[allow(missing_docs)]
    Term { field: String, value: Value },
    /// Any of several exact values.
    #[allow(missing_docs)]
    Terms { field: String, values: Vec<Value> },
    /// Terms starting with a prefix.
    #[allow(missing_docs)]
    Prefix { field: String, value: String },
    /// Terms matching a `*`/`?` pattern.
    #[allow(missing_docs)]
    Wildcard {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    /// See [`FuzzyQuery`].
    Fuzzy(FuzzyQuery),
    /// Terms matching a regular expression.
    #[allow(missing_docs)]
    Regexp { field: String, regexp: String },
    /// See [`NestedQuery`].
    Nested(NestedQuery),
    /// See [`BoolQuery`].
    Bool(BoolQuery),
    /// Query JSON passed through unchanged.
    Raw(Value),
}

impl Query {
    /// Renders the query as DSL JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Match(q) => q.to_json(),
            Query::MatchPhrase(q) => q.to_json(),
            Query::MultiMatch(q) => q.to_json(),
            Query::Term { field, value } => json!({ "term": { field.clone(): value } }),
            Query::Terms { field, values } => json!({ "terms": { field.clone(): values } }),
            Query::Prefix { field, value } => json!({ "prefix": { field.clone(): value } }),
            Query::Wildcard {
                field,
                pattern,
                case_insensitive,
            } => {
                let mut body = Map::new();
                body.insert("value".to_string(), json!(pattern));
                if *case_insensitive {
                    body.insert("case_insensitive".to_string(), json!(true));
                }
                json!({ "wildcard": { field.clone(): body } })
            }
            Query::Fuzzy(q) => q.to_json(),
            Query::Regexp { field, regexp } => json!({ "regexp": { field.clone(): regexp } }),
            Query::Nested(q) => q.to_json(),
            Query::Bool(q) => q.to_json(),
            Query::Raw(value) => value.clone(),
        }
    }
}

macro_rules! impl_into_query {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Query {
                fn from(query: $ty) -> Self {
                    Query::$variant(query)
                }
            }
        )*
    };
}

impl_into_query! {
    MatchQuery => Match,
    MatchPhraseQuery => MatchPhrase,
    MultiMatchQuery => MultiMatch,
    FuzzyQuery => Fuzzy,
    NestedQuery => Nested,
    BoolQuery => Bool,
}

/// Matches every document.
pub fn match_all() -> Query {
    Query::MatchAll
}

/// Analyzed match of `text` against `field`.
pub fn match_query(field: impl Into<String>, text: impl Into<String>) -> MatchQuery {
    MatchQuery {
        field: field.into(),
        query: text.into(),
        operator: None,
        fuzziness: None,
        prefix_length: None,
        minimum_should_match: None,
    }
}

/// Phrase match of `text` against `field`.
pub fn match_phrase_query(field: impl Into<String>, text: impl Into<String>) -> MatchPhraseQuery {
    MatchPhraseQuery {
        field: field.into(),
        query: text.into(),
        slop: None,
    }
}

/// Match of `text` against several fields, added with [`MultiMatchQuery::field`].
pub fn multi_match_query(text: impl Into<String>) -> MultiMatchQuery {
    MultiMatchQuery {
        query: text.into(),
        fields: Vec::new(),
        kind: None,
        operator: None,
    }
}

/// Exact term on `field`.
pub fn term_query(field: impl Into<String>, value: impl Into<Value>) -> Query {
    Query::Term {
        field: field.into(),
        value: value.into(),
    }
}

/// Any of the exact `values` on `field`.
pub fn terms_query<I, V>(field: impl Into<String>, values: I) -> Query
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Query::Terms {
        field: field.into(),
        values: values.into_iter().map(Into::into).collect(),
    }
}

/// Terms on `field` starting with `value`.
pub fn prefix_query(field: impl Into<String>, value: impl Into<String>) -> Query {
    Query::Prefix {
        field: field.into(),
        value: value.into(),
    }
}

/// Terms on `field` matching a `*`/`?` pattern.
pub fn wildcard_query(field: impl Into<String>, pattern: impl Into<String>) -> Query {
    Query::Wildcard {
        field: field.into(),
        pattern: pattern.into(),
        case_insensitive: false,
    }
}

/// Terms on `field` within an edit distance of `value`.
pub fn fuzzy_query(field: impl Into<String>, value: impl Into<String>) -> FuzzyQuery {
    FuzzyQuery {
        field: field.into(),
        value: value.into(),
        fuzziness: None,
        prefix_length: None,
    }
}

/// Terms on `field` matching a regular expression.
pub fn regexp_query(field: impl Into<String>, regexp: impl Into<String>) -> Query {
    Query::Regexp {
        field: field.into(),
        regexp: regexp.into(),
    }
}

/// Runs `query` against each object under the nested `path`.
pub fn nested_query(
    path: impl Into<String>,
    query: impl Into<Query>,
    score_mode: ScoreMode,
) -> NestedQuery {
    NestedQuery {
        path: path.into(),
        query: Box::new(query.into()),
        score_mode,
    }
}

/// An empty bool query.
pub fn bool_query() -> BoolQuery {
    BoolQuery::default()
}

/// Wraps already-built query JSON.
pub fn wrapper_query(query: Value) -> Query {
    Query::Raw(query)
}
