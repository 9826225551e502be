//! Query-fragment DSL
//!
//! Each fragment serializes to a single-key JSON object whose key names the
//! query kind. Optional numeric fields are omitted when they are zero, so a
//! fragment built with defaults matches what the search service would echo
//! back for the same query.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Any query fragment accepted inside a [`BoolQuery`] clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Bool(BoolQuery),
    Exists(ExistsQuery),
    Term(TermQuery),
    Terms(TermsQuery),
    MatchPhrase(MatchPhraseQuery),
    /// Pre-built JSON, passed through untouched.
    Raw(Value),
}

impl Query {
    /// Render the `{"query": ...}` body expected by search and count APIs.
    pub fn to_body(&self) -> Value {
        serde_json::json!({ "query": self })
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(q) => q.serialize(serializer),
            Self::Exists(q) => q.serialize(serializer),
            Self::Term(q) => q.serialize(serializer),
            Self::Terms(q) => q.serialize(serializer),
            Self::MatchPhrase(q) => q.serialize(serializer),
            Self::Raw(v) => v.serialize(serializer),
        }
    }
}

/// Compound query combining clauses with boolean logic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub filter: Vec<Query>,
    pub must: Vec<Query>,
    pub must_not: Vec<Query>,
    pub should: Vec<Query>,
    pub minimum_should_match: u32,
    pub boost: f64,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    pub fn minimum_should_match(mut self, minimum: u32) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }
}

impl Serialize for BoolQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Clauses<'a> {
            #[serde(skip_serializing_if = "is_empty")]
            filter: &'a [Query],
            #[serde(skip_serializing_if = "is_empty")]
            must: &'a [Query],
            #[serde(skip_serializing_if = "is_empty")]
            must_not: &'a [Query],
            #[serde(skip_serializing_if = "is_empty")]
            should: &'a [Query],
            #[serde(skip_serializing_if = "is_zero_u32")]
            minimum_should_match: u32,
            #[serde(skip_serializing_if = "is_zero_f64")]
            boost: f64,
        }

        let clauses = Clauses {
            filter: &self.filter,
            must: &self.must,
            must_not: &self.must_not,
            should: &self.should,
            minimum_should_match: self.minimum_should_match,
            boost: self.boost,
        };
        Keyed("bool", &clauses).serialize(serializer)
    }
}

/// Matches documents that have any indexed value for `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistsQuery {
    pub field: String,
}

impl ExistsQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }
}

impl Serialize for ExistsQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Keyed("exists", &Keyed("field", &self.field)).serialize(serializer)
    }
}

/// Exact match of a single value on `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub field: String,
    pub value: Value,
    pub boost: f64,
}

impl TermQuery {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), value: value.into(), boost: 0.0 }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }
}

impl Serialize for TermQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Term<'a> {
            value: &'a Value,
            #[serde(skip_serializing_if = "is_zero_f64")]
            boost: f64,
        }

        let term = Term { value: &self.value, boost: self.boost };
        Keyed("term", &Keyed(&self.field, &term)).serialize(serializer)
    }
}

/// Exact match of any of several values on `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    pub field: String,
    pub values: Vec<Value>,
    pub boost: f64,
}

impl TermsQuery {
    pub fn new<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self { field: field.into(), values: values.into_iter().map(Into::into).collect(), boost: 0.0 }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }
}

impl Serialize for TermsQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The boost sits next to the field rather than inside it.
        struct Args<'a>(&'a TermsQuery);

        impl Serialize for Args<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let query = self.0;
                let len = if is_zero_f64(&query.boost) { 1 } else { 2 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry(&query.field, &query.values)?;
                if !is_zero_f64(&query.boost) {
                    map.serialize_entry("boost", &query.boost)?;
                }
                map.end()
            }
        }

        Keyed("terms", &Args(self)).serialize(serializer)
    }
}

/// Matches `value` as an exact phrase within `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhraseQuery {
    pub field: String,
    pub value: Value,
}

impl MatchPhraseQuery {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), value: value.into() }
    }
}

impl Serialize for MatchPhraseQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Keyed("match_phrase", &Keyed(&self.field, &self.value)).serialize(serializer)
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
    BoolQuery => Bool,
    ExistsQuery => Exists,
    TermQuery => Term,
    TermsQuery => Terms,
    MatchPhraseQuery => MatchPhrase,
    Value => Raw,
}

/// Serializes as `{key: value}`.
struct Keyed<'a, V: ?Sized>(&'a str, &'a V);

impl<V: Serialize + ?Sized> Serialize for Keyed<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

fn is_empty(queries: &&[Query]) -> bool {
    queries.is_empty()
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}
