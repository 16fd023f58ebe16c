//! Queries derived from finder method names.
//!
//! A name such as `findByWritersNameAndTags` is split into a subject
//! (`find`), alternatives separated by `Or`, and conjuncts separated by `And`.
//! Each conjunct names a property path in camel case plus an optional keyword
//! suffix (`StartingWith`, `Not`, ...). Property paths are resolved against the
//! entity's [`Mapping`] when the query is parsed, so an unknown property fails
//! at repository construction rather than at call time.

use crate::error::QueryError;
use crate::schema::{Field, FieldType, Mapping, PropertyPath};

use super::builders::{
    BoolQuery, Operator, Query, ScoreMode, bool_query, match_query, nested_query, prefix_query,
    regexp_query, term_query,
};

const SUBJECTS: &[(&str, Subject)] = &[
    ("find", Subject::Find),
    ("read", Subject::Find),
    ("get", Subject::Find),
    ("query", Subject::Find),
    ("search", Subject::Find),
    ("stream", Subject::Find),
    ("count", Subject::Count),
    ("exists", Subject::Exists),
];

// Longest suffixes first so `IsNot` wins over `Not`.
const KEYWORDS: &[(&str, Keyword)] = &[
    ("StartingWith", Keyword::StartingWith),
    ("EndingWith", Keyword::EndingWith),
    ("Containing", Keyword::Containing),
    ("Matches", Keyword::Matches),
    ("Equals", Keyword::Equals),
    ("Regex", Keyword::Matches),
    ("IsNot", Keyword::Not),
    ("Like", Keyword::Like),
    ("Not", Keyword::Not),
    ("Is", Keyword::Equals),
];

/// What a derived query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// Matching documents (`find`, `read`, `get`, `query`, `search`, `stream`).
    Find,
    /// Number of matching documents.
    Count,
    /// Whether any document matches.
    Exists,
}

/// How a property is compared with its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Full-text match on text fields, exact term otherwise.
    Equals,
    /// Negated [`Keyword::Equals`].
    Not,
    /// Value followed by anything.
    Like,
    /// Value as a prefix.
    StartingWith,
    /// Value as a suffix.
    EndingWith,
    /// Value anywhere.
    ///
    /// On text fields the pattern is matched against single analyzed tokens,
    /// so a multi-word value never matches.
    Containing,
    /// Value as a regular expression, lowercased on text fields.
    Matches,
}

/// One comparison in a derived query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    property: PropertyPath,
    keyword: Keyword,
}

impl Criterion {
    /// The resolved property.
    pub fn property(&self) -> &PropertyPath {
        &self.property
    }

    /// The comparison keyword.
    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    fn to_query(&self, arg: &str) -> Query {
        let field = self.property.path.clone();
        let text = self.property.field_type == FieldType::Text;

        let query = match self.keyword {
            Keyword::Equals | Keyword::Not => {
                if text {
                    match_query(field, arg).operator(Operator::And).into()
                } else {
                    term_query(field, arg)
                }
            }
            // Text is indexed as lowercased single tokens by the standard
            // analyzer, so term-level patterns on text fields are lowercased
            // and match within one token only.
            Keyword::StartingWith => {
                if text {
                    prefix_query(field, arg.to_lowercase())
                } else {
                    prefix_query(field, arg)
                }
            }
            Keyword::Like => wildcard(field, format!("{}*", arg), text),
            Keyword::EndingWith => wildcard(field, format!("*{}", arg), text),
            Keyword::Containing => wildcard(field, format!("*{}*", arg), text),
            Keyword::Matches => {
                if text {
                    regexp_query(field, arg.to_lowercase())
                } else {
                    regexp_query(field, arg)
                }
            }
        };

        match self.property.nested_path {
            Some(ref path) => nested_query(path.clone(), query, ScoreMode::None).into(),
            None => query,
        }
    }
}

fn wildcard(field: String, pattern: String, case_insensitive: bool) -> Query {
    Query::Wildcard {
        field,
        pattern,
        case_insensitive,
    }
}

/// A parsed finder method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedQuery {
    method: String,
    subject: Subject,
    alternatives: Vec<Vec<Criterion>>,
}

impl DerivedQuery {
    /// Parses `method` against the properties of `mapping`.
    pub fn parse(method: &str, mapping: &Mapping) -> Result<Self, QueryError> {
        let invalid = |message: &str| QueryError::InvalidMethodName {
            method: method.to_string(),
            message: message.to_string(),
        };

        let (subject, rest) = SUBJECTS
            .iter()
            .find_map(|(prefix, subject)| method.strip_prefix(prefix).map(|r| (*subject, r)))
            .ok_or_else(|| invalid("expected a find/count/exists prefix"))?;

        let by = find_token(rest, "By").ok_or_else(|| invalid("missing 'By'"))?;
        let predicate = &rest[by + 2..];
        if predicate.is_empty() {
            return Err(invalid("no criteria after 'By'"));
        }

        let mut alternatives = Vec::new();
        for alternative in split_token(predicate, "Or") {
            let mut conjuncts = Vec::new();
            for part in split_token(alternative, "And") {
                conjuncts.push(parse_criterion(method, part, mapping)?);
            }
            alternatives.push(conjuncts);
        }

        Ok(Self {
            method: method.to_string(),
            subject,
            alternatives,
        })
    }

    /// The method name this query was parsed from.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// What the query returns.
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Criteria grouped by `Or` alternative.
    pub fn alternatives(&self) -> &[Vec<Criterion>] {
        &self.alternatives
    }

    /// Number of arguments [`DerivedQuery::bind`] expects.
    pub fn arity(&self) -> usize {
        self.alternatives.iter().map(Vec::len).sum()
    }

    /// Builds the query for one set of arguments, consumed in criterion order.
    pub fn bind(&self, args: &[&str]) -> Result<Query, QueryError> {
        if args.len() != self.arity() {
            return Err(QueryError::ArgumentCount {
                method: self.method.clone(),
                expected: self.arity(),
                actual: args.len(),
            });
        }

        let mut args = args.iter();
        let mut groups: Vec<BoolQuery> = Vec::with_capacity(self.alternatives.len());
        for conjuncts in &self.alternatives {
            let mut group = bool_query();
            for criterion in conjuncts {
                let Some(arg) = args.next() else { break };
                let query = criterion.to_query(arg);
                group = if criterion.keyword == Keyword::Not {
                    group.must_not(query)
                } else {
                    group.must(query)
                };
            }
            groups.push(group);
        }

        if groups.len() == 1 {
            if let Some(group) = groups.pop() {
                return Ok(group.into());
            }
        }

        let combined = groups
            .into_iter()
            .fold(bool_query(), |acc, group| acc.should(group))
            .minimum_should_match("1");
        Ok(combined.into())
    }
}

fn parse_criterion(method: &str, part: &str, mapping: &Mapping) -> Result<Criterion, QueryError> {
    let (property, keyword) = KEYWORDS
        .iter()
        .find_map(|(suffix, keyword)| {
            part.strip_suffix(suffix)
                .filter(|p| !p.is_empty())
                .map(|p| (p, *keyword))
        })
        .unwrap_or((part, Keyword::Equals));

    let unknown = || QueryError::UnknownProperty {
        method: method.to_string(),
        property: property.to_string(),
    };

    let words = camel_words(property);
    let segments = resolve_segments(&words, &mapping.properties).ok_or_else(unknown)?;
    let path = mapping.resolve(&segments.join(".")).ok_or_else(unknown)?;

    Ok(Criterion {
        property: path,
        keyword,
    })
}

/// Matches camel-case words against field names, longest first, descending
/// into object properties and inner fields.
fn resolve_segments(words: &[&str], fields: &[Field]) -> Option<Vec<String>> {
    for take in (1..=words.len()).rev() {
        let candidate = lower_first(&words[..take].concat());
        let Some(field) = fields.iter().find(|f| f.name == candidate) else {
            continue;
        };

        let rest = &words[take..];
        if rest.is_empty() {
            return Some(vec![candidate]);
        }

        let inner = lower_first(&rest.concat());
        if field.inner_fields.iter().any(|i| i.suffix == inner) {
            return Some(vec![candidate, inner]);
        }

        if let Some(mut tail) = resolve_segments(rest, &field.properties) {
            tail.insert(0, candidate);
            return Some(tail);
        }
    }
    None
}

/// Position of the first `token` followed by an uppercase letter or the end
/// of input.
fn find_token(input: &str, token: &str) -> Option<usize> {
    input.match_indices(token).map(|(i, _)| i).find(|&i| {
        let after = &input[i + token.len()..];
        after.chars().next().is_none_or(|c| c.is_uppercase())
    })
}

/// Splits at every camel-case occurrence of `token` followed by an
/// uppercase letter.
fn split_token<'a>(input: &'a str, token: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, _) in input.match_indices(token) {
        if i <= start {
            continue;
        }
        let after = &input[i + token.len()..];
        if after.chars().next().is_some_and(|c| c.is_uppercase()) {
            parts.push(&input[start..i]);
            start = i + token.len();
        }
    }
    parts.push(&input[start..]);
    parts
}

fn camel_words(input: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    for (i, c) in input.char_indices().skip(1) {
        if c.is_uppercase() {
            words.push(&input[start..i]);
            start = i;
        }
    }
    if start < input.len() {
        words.push(&input[start..]);
    }
    words
}

fn lower_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
