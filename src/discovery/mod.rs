pub mod card;
pub mod filters;
pub mod pagination;

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::catalog::{CatalogError, Movie, MovieCatalog};
use crate::query::{interpret, Mode, RequestDescriptor, Vocabulary};
use crate::ratings::RatingLookup;

pub use card::MovieCard;
pub use filters::Filters;
pub use pagination::{apply_pagination, total_pages};

#[derive(Debug, Clone, Serialize)]
pub struct ResultPage {
    pub query: String,
    pub mode: Mode,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_results: usize,
    pub movies: Vec<MovieCard>,
}

/// Query → catalog → enriched, paged cards.
pub struct Discovery {
    vocab: Arc<Vocabulary>,
    catalog: Arc<dyn MovieCatalog>,
    ratings: Arc<dyn RatingLookup>,
    fetch_limit: usize,
    page_size: usize,
}

impl Discovery {
    pub fn new(
        vocab: Arc<Vocabulary>,
        catalog: Arc<dyn MovieCatalog>,
        ratings: Arc<dyn RatingLookup>,
        fetch_limit: usize,
        page_size: usize,
    ) -> Self {
        Self {
            vocab,
            catalog,
            ratings,
            fetch_limit,
            page_size: page_size.max(1),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn catalog(&self) -> &dyn MovieCatalog {
        self.catalog.as_ref()
    }

    pub fn interpret(&self, query: &str) -> RequestDescriptor {
        interpret(query, &self.vocab)
    }

    pub async fn run(
        &self,
        query: &str,
        filters: &Filters,
        page: usize,
    ) -> Result<ResultPage, DiscoveryError> {
        let query = query.trim();
        let descriptor = self.interpret(query);
        info!(
            query = %query,
            mode = descriptor.mode.as_str(),
            params = ?descriptor.parameters,
            limit = descriptor.limit,
            search_term = ?descriptor.search_term,
            "Interpreted query"
        );

        let movies = self.fetch(query, &descriptor, filters).await.map_err(|e| {
            error!("Error processing query '{}': {}", query, e);
            DiscoveryError::QueryFailed(e)
        })?;

        let total_results = movies.len();
        let (movies, page) = apply_pagination(movies, page, self.page_size);

        // Lookups for the page run concurrently; join_all keeps page order.
        let min_imdb = filters.min_imdb_rating.unwrap_or(0.0);
        let ratings = join_all(movies.iter().map(|movie| self.imdb_rating(movie))).await;
        let cards = movies
            .iter()
            .zip(ratings)
            .map(|(movie, rating)| MovieCard::new(movie, &self.vocab).with_imdb(rating, min_imdb))
            .collect();

        Ok(ResultPage {
            query: query.to_string(),
            mode: descriptor.mode,
            page,
            total_pages: total_pages(total_results, self.page_size),
            page_size: self.page_size,
            total_results,
            movies: cards,
        })
    }

    async fn fetch(
        &self,
        query: &str,
        descriptor: &RequestDescriptor,
        filters: &Filters,
    ) -> Result<Vec<Movie>, CatalogError> {
        let limit = (descriptor.limit as usize).min(self.fetch_limit);
        match descriptor.mode {
            Mode::Discover => {
                let params = filters.apply(query, descriptor, &self.vocab);
                self.catalog.discover(&params, limit).await
            }
            Mode::SearchByTitle => {
                let term = descriptor.search_term.as_deref().unwrap_or(query);
                self.catalog.search(term, limit).await
            }
        }
    }

    /// Search and discover records carry no IMDb id; the details record does.
    async fn imdb_rating(&self, movie: &Movie) -> Option<crate::ratings::RatingInfo> {
        if !self.ratings.is_enabled() {
            return None;
        }
        let imdb_id = match movie.imdb_id.clone() {
            Some(id) => id,
            None => match self.catalog.details(movie.id).await {
                Ok(details) => details.imdb_id?,
                Err(e) => {
                    debug!("No details for movie {}: {}", movie.id, e);
                    return None;
                }
            },
        };
        self.ratings.lookup(&imdb_id).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("query failed: {0}")]
    QueryFailed(#[source] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MovieDetails;
    use crate::query::descriptor::*;
    use crate::query::GenreTable;
    use crate::ratings::RatingInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeCatalog {
        movies: Vec<Movie>,
        fail: bool,
        discover_calls: Mutex<Vec<(Parameters, usize)>>,
        search_calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl MovieCatalog for FakeCatalog {
        async fn discover(&self, params: &Parameters, limit: usize) -> Result<Vec<Movie>, CatalogError> {
            if self.fail {
                return Err(CatalogError::Status {
                    path: "/discover/movie".to_string(),
                    status: 500,
                });
            }
            self.discover_calls.lock().unwrap().push((params.clone(), limit));
            Ok(self.movies.iter().take(limit).cloned().collect())
        }

        async fn search(&self, term: &str, limit: usize) -> Result<Vec<Movie>, CatalogError> {
            self.search_calls.lock().unwrap().push((term.to_string(), limit));
            Ok(self.movies.iter().take(limit).cloned().collect())
        }

        async fn details(&self, id: u64) -> Result<MovieDetails, CatalogError> {
            Ok(MovieDetails {
                id,
                imdb_id: Some(format!("tt{}", id)),
                ..MovieDetails::default()
            })
        }
    }

    struct FixedRatings(f64);

    #[async_trait]
    impl RatingLookup for FixedRatings {
        async fn lookup(&self, imdb_id: &str) -> Option<RatingInfo> {
            Some(RatingInfo {
                rating: self.0,
                url: crate::ratings::imdb_url(imdb_id),
            })
        }
    }

    fn movies(n: u64) -> Vec<Movie> {
        (1..=n)
            .map(|id| Movie {
                id,
                title: format!("Movie {}", id),
                genre_ids: vec![28],
                ..Movie::default()
            })
            .collect()
    }

    fn discovery(catalog: Arc<FakeCatalog>, imdb: f64) -> Discovery {
        let vocab = Arc::new(Vocabulary::new(GenreTable::from_pairs([("action", 28)])));
        Discovery::new(vocab, catalog, Arc::new(FixedRatings(imdb)), 50, 12)
    }

    #[tokio::test]
    async fn test_discover_page() {
        let catalog = Arc::new(FakeCatalog {
            movies: movies(40),
            ..FakeCatalog::default()
        });
        let d = discovery(catalog.clone(), 7.9);

        let page = d.run("top 30 action", &Filters::default(), 1).await.unwrap();
        assert_eq!(page.mode, Mode::Discover);
        assert_eq!(page.total_results, 30);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 1);
        assert_eq!(page.movies.len(), 12);
        assert_eq!(page.movies[0].id, 13);
        assert_eq!(page.movies[0].genres, vec!["action"]);
        assert_eq!(page.movies[0].imdb_rating, Some(7.9));
        assert_eq!(
            page.movies[0].imdb_url.as_deref(),
            Some("https://www.imdb.com/title/tt13/")
        );

        let calls = catalog.discover_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, 30);
        assert_eq!(calls[0].0.get(WITH_GENRES), Some(&ParamValue::Int(28)));
    }

    struct SlowRatings;

    #[async_trait]
    impl RatingLookup for SlowRatings {
        async fn lookup(&self, imdb_id: &str) -> Option<RatingInfo> {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Some(RatingInfo {
                rating: 7.0,
                url: crate::ratings::imdb_url(imdb_id),
            })
        }
    }

    #[tokio::test]
    async fn test_page_lookups_run_concurrently() {
        let catalog = Arc::new(FakeCatalog {
            movies: movies(12),
            ..FakeCatalog::default()
        });
        let vocab = Arc::new(Vocabulary::new(GenreTable::from_pairs([("action", 28)])));
        let d = Discovery::new(vocab, catalog, Arc::new(SlowRatings), 50, 12);

        let started = std::time::Instant::now();
        let page = d.run("top 12 action", &Filters::default(), 0).await.unwrap();
        assert!(started.elapsed() < std::time::Duration::from_millis(1200));

        let ids: Vec<u64> = page.movies.iter().map(|c| c.id).collect();
        assert_eq!(ids, (1..=12).collect::<Vec<u64>>());
        assert!(page.movies.iter().all(|c| c.imdb_rating == Some(7.0)));
    }

    #[tokio::test]
    async fn test_title_search() {
        let catalog = Arc::new(FakeCatalog {
            movies: movies(3),
            ..FakeCatalog::default()
        });
        let d = discovery(catalog.clone(), 8.0);

        let page = d.run("search Inception", &Filters::default(), 0).await.unwrap();
        assert_eq!(page.mode, Mode::SearchByTitle);
        assert_eq!(page.movies.len(), 3);
        assert_eq!(
            catalog.search_calls.lock().unwrap()[0],
            ("inception".to_string(), DEFAULT_LIMIT as usize)
        );
    }

    #[tokio::test]
    async fn test_imdb_rating_below_minimum_is_hidden() {
        let catalog = Arc::new(FakeCatalog {
            movies: movies(2),
            ..FakeCatalog::default()
        });
        let d = discovery(catalog, 6.0);
        let filters = Filters {
            min_imdb_rating: Some(7.0),
            ..Filters::default()
        };

        let page = d.run("best action", &filters, 0).await.unwrap();
        assert_eq!(page.movies.len(), 2);
        assert!(page.movies.iter().all(|c| c.imdb_rating.is_none()));
    }

    #[tokio::test]
    async fn test_empty_result() {
        let d = discovery(Arc::new(FakeCatalog::default()), 8.0);
        let page = d.run("best action", &Filters::default(), 4).await.unwrap();
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 0);
        assert!(page.movies.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_is_query_failed() {
        let catalog = Arc::new(FakeCatalog {
            fail: true,
            ..FakeCatalog::default()
        });
        let d = discovery(catalog, 8.0);
        let err = d.run("best action", &Filters::default(), 0).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::QueryFailed(_)));
        assert!(err.to_string().starts_with("query failed"));
    }
}
