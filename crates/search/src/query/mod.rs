//! Query construction.
//!
//! - [`builders`]: the query DSL (match, bool, nested, fuzzy, ...)
//! - [`aggregation`]: terms aggregations and bucket ordering
//! - [`native`]: complete search bodies for the template and raw client
//! - [`string_query`]: positional `?N` templates
//! - [`derived`]: queries parsed from finder method names

pub mod aggregation;
pub mod builders;
pub mod derived;
pub mod native;
pub mod string_query;

pub use aggregation::{BucketOrder, TermsAggregation, terms};
pub use builders::{
    BoolQuery, Fuzziness, FuzzyQuery, MatchPhraseQuery, MatchQuery, MultiMatchQuery,
    MultiMatchType, NestedQuery, Operator, Query, ScoreMode, bool_query, fuzzy_query, match_all,
    match_phrase_query, match_query, multi_match_query, nested_query, prefix_query, regexp_query,
    term_query, terms_query, wildcard_query, wrapper_query,
};
pub use derived::{Criterion, DerivedQuery, Keyword, Subject};
pub use native::{
    NativeSearchQuery, NativeSearchQueryBuilder, SearchRequest, SearchSource, SortField, SortOrder,
};
pub use string_query::StringQuery;
