//! Positional string-template queries.
//!
//! A template is literal query JSON with `?0`, `?1`, ... placeholders. Binding
//! substitutes each placeholder with its argument, escaped for use inside a
//! JSON string. The template is never parsed locally; a malformed one is
//! rejected by the node when the search runs.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::QueryError;
use crate::types::PageRequest;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?(\d+)").expect("placeholder pattern is valid"));

/// A query template with positional placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringQuery {
    template: String,
}

impl StringQuery {
    /// Wraps a template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The unbound template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Highest placeholder position plus one; zero if the template has none.
    pub fn arity(&self) -> usize {
        PLACEHOLDER
            .captures_iter(&self.template)
            .filter_map(|c| c[1].parse::<usize>().ok())
            .map(|p| p + 1)
            .max()
            .unwrap_or(0)
    }

    /// Substitutes every `?N` with argument `N`.
    pub fn bind(&self, args: &[&str]) -> Result<String, QueryError> {
        let mut bound = String::with_capacity(self.template.len());
        let mut last = 0;

        for captures in PLACEHOLDER.captures_iter(&self.template) {
            let whole = &captures[0];
            let start = captures.get(0).map(|m| m.start()).unwrap_or(last);
            // Too many digits for usize can never name a provided argument.
            let position: usize = captures[1].parse().unwrap_or(usize::MAX);
            let arg = args.get(position).ok_or(QueryError::MissingArgument {
                position,
                provided: args.len(),
            })?;

            bound.push_str(&self.template[last..start]);
            bound.push_str(&escape_json(arg));
            last = start + whole.len();
        }

        bound.push_str(&self.template[last..]);
        Ok(bound)
    }

    /// Binds the template and wraps it into a paged `_search` body.
    ///
    /// The bound query is spliced in as text, so the body is returned as a
    /// string rather than a `Value`.
    pub fn to_search_body(&self, args: &[&str], page: PageRequest) -> Result<String, QueryError> {
        let query = self.bind(args)?;
        Ok(format!(
            r#"{{"query":{},"from":{},"size":{},"track_total_hits":true}}"#,
            query,
            page.offset(),
            page.size
        ))
    }

    /// Binds the template and wraps it into a `_count` body.
    pub fn to_count_body(&self, args: &[&str]) -> Result<String, QueryError> {
        let query = self.bind(args)?;
        Ok(format!(r#"{{"query":{}}}"#, query))
    }
}

/// Escapes `value` for use inside a JSON string literal, without the quotes.
fn escape_json(value: &str) -> String {
    let quoted = Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FILTERED_TAG: &str =
        r#"{"bool": {"must": {"match_all": {}}, "filter": {"term": {"tags": "?0" }}}}"#;

    #[test]
    fn test_bind_single_placeholder() {
        let query = StringQuery::new(FILTERED_TAG);
        assert_eq!(
            query.bind(&["elasticsearch"]).unwrap(),
            r#"{"bool": {"must": {"match_all": {}}, "filter": {"term": {"tags": "elasticsearch" }}}}"#
        );
    }

    #[test]
    fn test_bind_two_placeholders() {
        let query = StringQuery::new(
            r#"{"bool": {"must": {"match": {"writers.name": "?0"}}, "filter": {"term": {"tags": "?1" }}}}"#,
        );
        let bound = query.bind(&["doe", "elasticsearch"]).unwrap();
        let parsed: Value = serde_json::from_str(&bound).unwrap();
        assert_eq!(parsed["bool"]["must"]["match"]["writers.name"], "doe");
        assert_eq!(parsed["bool"]["filter"]["term"]["tags"], "elasticsearch");
        assert_eq!(query.arity(), 2);
    }

    #[test]
    fn test_arguments_are_escaped() {
        let query = StringQuery::new(r#"{"term": {"tags": "?0"}}"#);
        let bound = query.bind(&[r#"say "hi"\now"#]).unwrap();
        let parsed: Value = serde_json::from_str(&bound).unwrap();
        assert_eq!(parsed["term"]["tags"], r#"say "hi"\now"#);
    }

    #[test]
    fn test_multi_digit_placeholder() {
        let template = (0..11)
            .map(|i| format!("\"?{}\"", i))
            .collect::<Vec<_>>()
            .join(",");
        let query = StringQuery::new(format!("[{}]", template));
        let args: Vec<String> = (0..11).map(|i| format!("a{}", i)).collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let parsed: Value = serde_json::from_str(&query.bind(&refs).unwrap()).unwrap();
        assert_eq!(parsed[10], "a10");
        assert_eq!(parsed[1], "a1");
    }

    #[test]
    fn test_missing_argument() {
        let query = StringQuery::new(r#"{"term": {"tags": "?1"}}"#);
        assert_eq!(
            query.bind(&["only"]).unwrap_err(),
            QueryError::MissingArgument {
                position: 1,
                provided: 1
            }
        );
    }

    #[test]
    fn test_template_is_not_validated_locally() {
        let query = StringQuery::new(r#"{"bool": {"must": ?0"#);
        assert_eq!(query.bind(&["x"]).unwrap(), r#"{"bool": {"must": x"#);
    }

    #[test]
    fn test_search_body() {
        let query = StringQuery::new(FILTERED_TAG);
        let body = query
            .to_search_body(&["tutorial"], PageRequest::of(1, 10))
            .unwrap();
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["query"]["bool"]["filter"]["term"]["tags"], "tutorial");
        assert_eq!(parsed["from"], 10);
        assert_eq!(parsed["size"], 10);
        assert_eq!(parsed["track_total_hits"], true);

        let count: Value =
            serde_json::from_str(&query.to_count_body(&["tutorial"]).unwrap()).unwrap();
        assert!(count.get("size").is_none());
        assert_eq!(count["query"]["bool"]["must"]["match_all"], json!({}));
    }
}
