pub mod cache;
pub mod client;
pub mod types;

pub use cache::ResponseCache;
pub use client::{CatalogError, MovieCatalog, TmdbClient};
pub use types::{Movie, MovieDetails, MoviePage};
