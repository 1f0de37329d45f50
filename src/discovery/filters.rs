use chrono::Datelike;

use crate::query::descriptor::*;
use crate::query::{explicit_year, year_span_bounds, Vocabulary};

/// Explicit filters the user sets next to the free-text query.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub genre: Option<String>,
    pub language: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub min_rating: Option<f64>,
    pub min_imdb_rating: Option<f64>,
}

impl Filters {
    /// Layer the filters over the parameters interpreted from `query`.
    pub fn apply(
        &self,
        query: &str,
        descriptor: &RequestDescriptor,
        vocab: &Vocabulary,
    ) -> Parameters {
        let mut params = descriptor.parameters.clone();

        if let Some(year) = explicit_year(&query.to_lowercase()) {
            let (from, to) = year_span_bounds(year, year);
            params.insert(RELEASE_DATE_GTE.to_string(), from.into());
            params.insert(RELEASE_DATE_LTE.to_string(), to.into());
        } else if !descriptor.has_release_filter() {
            if let Some((from, to)) = self.year_range() {
                let (from, to) = year_span_bounds(from, to);
                params.insert(RELEASE_DATE_GTE.to_string(), from.into());
                params.insert(RELEASE_DATE_LTE.to_string(), to.into());
            }
        }

        if !params.contains_key(WITH_ORIGINAL_LANGUAGE) {
            if let Some(code) = self
                .language
                .as_deref()
                .and_then(|name| vocab.language_code(name))
            {
                params.insert(WITH_ORIGINAL_LANGUAGE.to_string(), code.into());
            }
        }

        if let Some(id) = self
            .genre
            .as_deref()
            .filter(|g| !g.trim().is_empty() && !g.eq_ignore_ascii_case("any"))
            .and_then(|g| vocab.genre_id(g))
        {
            params.insert(WITH_GENRES.to_string(), id.into());
        }

        if let Some(min) = self.min_rating {
            params.insert(VOTE_AVERAGE_GTE.to_string(), min.into());
        }

        params
    }

    fn year_range(&self) -> Option<(i32, i32)> {
        match (self.year_from, self.year_to) {
            (None, None) => None,
            (from, to) => {
                let from = from.unwrap_or(MIN_YEAR);
                let to = to.unwrap_or_else(|| chrono::Utc::now().year());
                Some((from.min(to), from.max(to)))
            }
        }
    }
}

const MIN_YEAR: i32 = 1900;
