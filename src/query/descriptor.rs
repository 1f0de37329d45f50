use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SORT_BY: &str = "sort_by";
pub const VOTE_COUNT_GTE: &str = "vote_count.gte";
pub const VOTE_AVERAGE_GTE: &str = "vote_average.gte";
pub const VOTE_AVERAGE_LTE: &str = "vote_average.lte";
pub const WITH_GENRES: &str = "with_genres";
pub const WITH_ORIGINAL_LANGUAGE: &str = "with_original_language";
pub const WITH_ORIGIN_COUNTRY: &str = "with_origin_country";
pub const RELEASE_YEAR: &str = "primary_release_year";
pub const RELEASE_DATE_GTE: &str = "primary_release_date.gte";
pub const RELEASE_DATE_LTE: &str = "primary_release_date.lte";

pub const DEFAULT_SORT: &str = "vote_average.desc";
pub const MIN_VOTE_COUNT: i64 = 50;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Discover,
    #[serde(rename = "search")]
    SearchByTitle,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Discover => "discover",
            Mode::SearchByTitle => "search",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{:?}", x),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        ParamValue::Int(i as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

pub type Parameters = BTreeMap<String, ParamValue>;

/// Base parameters every catalog request carries.
pub fn default_parameters() -> Parameters {
    let mut params = Parameters::new();
    params.insert(SORT_BY.to_string(), DEFAULT_SORT.into());
    params.insert(VOTE_COUNT_GTE.to_string(), MIN_VOTE_COUNT.into());
    params
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub mode: Mode,
    pub parameters: Parameters,
    pub limit: u32,
    pub search_term: Option<String>,
}

impl RequestDescriptor {
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    pub fn has_release_filter(&self) -> bool {
        [RELEASE_YEAR, RELEASE_DATE_GTE, RELEASE_DATE_LTE]
            .iter()
            .any(|k| self.parameters.contains_key(*k))
    }
}
