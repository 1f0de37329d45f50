use serde::Serialize;

use crate::catalog::Movie;
use crate::query::Vocabulary;
use crate::ratings::RatingInfo;

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w200";
pub const MOVIE_BASE_URL: &str = "https://www.themoviedb.org/movie";
const OVERVIEW_SNIPPET_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub year: String,
    pub tmdb_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_url: Option<String>,
    pub genres: Vec<String>,
    pub overview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    pub tmdb_url: String,
    pub markdown: String,
}

impl MovieCard {
    pub fn new(movie: &Movie, vocab: &Vocabulary) -> Self {
        let title = if movie.title.is_empty() {
            "Untitled".to_string()
        } else {
            movie.title.clone()
        };
        let year: String = movie
            .release_date
            .as_deref()
            .unwrap_or("")
            .chars()
            .take(4)
            .collect();
        let tmdb_url = format!("{}/{}", MOVIE_BASE_URL, movie.id);

        let markdown = markdown_line(&title, &year, movie.vote_average, &tmdb_url);

        Self {
            id: movie.id,
            title,
            year,
            tmdb_rating: movie.vote_average,
            imdb_rating: None,
            imdb_url: None,
            genres: vocab.genre_names_for(&movie.genre_ids),
            overview: snippet(movie.overview.as_deref().unwrap_or("")),
            poster_url: movie
                .poster_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("{}{}", POSTER_BASE_URL, p)),
            tmdb_url,
            markdown,
        }
    }

    /// Attach the secondary rating when it reaches `min_rating`.
    pub fn with_imdb(mut self, info: Option<RatingInfo>, min_rating: f64) -> Self {
        if let Some(info) = info.filter(|i| i.rating >= min_rating) {
            self.imdb_rating = Some(info.rating);
            self.imdb_url = Some(info.url);
        }
        self
    }
}

/// `- [Title (2020) — 8.1★](url)`
pub fn markdown_line(title: &str, year: &str, rating: Option<f64>, url: &str) -> String {
    let rating = match rating {
        Some(r) => format!("{:.1}★", r),
        None => "N/A".to_string(),
    };
    if year.is_empty() {
        format!("- [{} — {}]({})", title, rating, url)
    } else {
        format!("- [{} ({}) — {}]({})", title, year, rating, url)
    }
}

fn snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(OVERVIEW_SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::GenreTable;

    fn movie() -> Movie {
        Movie {
            id: 27205,
            title: "Inception".to_string(),
            release_date: Some("2010-07-15".to_string()),
            vote_average: Some(8.369),
            genre_ids: vec![878, 28],
            overview: Some("x".repeat(130)),
            poster_path: Some("/abc.jpg".to_string()),
            ..Movie::default()
        }
    }

    #[test]
    fn test_card_fields() {
        let vocab = Vocabulary::new(GenreTable::from_pairs([("action", 28), ("sci-fi", 878)]));
        let card = MovieCard::new(&movie(), &vocab);
        assert_eq!(card.year, "2010");
        assert_eq!(card.genres, vec!["action", "sci-fi"]);
        assert_eq!(card.poster_url.as_deref(), Some("https://image.tmdb.org/t/p/w200/abc.jpg"));
        assert_eq!(card.tmdb_url, "https://www.themoviedb.org/movie/27205");
        assert_eq!(card.overview.chars().count(), 123);
        assert!(card.overview.ends_with("..."));
        assert_eq!(
            card.markdown,
            "- [Inception (2010) — 8.4★](https://www.themoviedb.org/movie/27205)"
        );
    }

    #[test]
    fn test_markdown_without_year_or_rating() {
        assert_eq!(markdown_line("Untitled", "", None, "u"), "- [Untitled — N/A](u)");
    }

    #[test]
    fn test_short_overview_is_kept() {
        assert_eq!(snippet("short"), "short");
        assert_eq!(snippet(&"y".repeat(120)), "y".repeat(120));
    }

    #[test]
    fn test_imdb_rating_threshold() {
        let vocab = Vocabulary::default();
        let info = RatingInfo {
            rating: 7.5,
            url: "https://www.imdb.com/title/tt1/".to_string(),
        };

        let card = MovieCard::new(&movie(), &vocab).with_imdb(Some(info.clone()), 7.0);
        assert_eq!(card.imdb_rating, Some(7.5));

        let card = MovieCard::new(&movie(), &vocab).with_imdb(Some(info), 8.0);
        assert_eq!(card.imdb_rating, None);
        assert_eq!(card.imdb_url, None);
    }
}
