use regex::Regex;
use std::sync::OnceLock;

use super::descriptor::*;
use super::vocabulary::Vocabulary;

struct Patterns {
    top_n: Regex,
    bare_number: Regex,
    year: Regex,
    search_prefix: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        // ASCII digits only, so every match parses.
        top_n: Regex::new(r"\btop\s*([0-9]{1,2})\b").unwrap(),
        bare_number: Regex::new(r"\b([0-9]{1,2})\b").unwrap(),
        year: Regex::new(r"\b(?:19|20)[0-9]{2}\b").unwrap(),
        search_prefix: Regex::new(r".*(?:search|find|play|watch|movie called|movie:)\s*").unwrap(),
    })
}

const SEARCH_KEYWORDS: &[&str] = &["search", "find", "play", "watch", "movie called", "movie:"];
const DISCOVER_HINTS: &[&str] = &["best", "high", "mid", "201", "199", "90s", "2010s"];

const BEST_WORDS: &[&str] = &["best", "top", "high", "very good", "excellent"];
const MID_WORDS: &[&str] = &["mid", "middle", "decent", "good"];
const LOW_WORDS: &[&str] = &["low", "bad"];

// (keywords, first year of the decade), checked in this order.
const DECADES: &[(&[&str], i32)] = &[
    (&["90s", "1990s"], 1990),
    (&["80s", "1980s"], 1980),
    (&["2000s"], 2000),
    (&["2010s"], 2010),
];

const MAX_TOP_N: u32 = 30;

/// Translate a free-text query into a catalog request.
///
/// Never fails: input with no recognizable signal becomes a title search for
/// the query itself.
pub fn interpret(query: &str, vocab: &Vocabulary) -> RequestDescriptor {
    let q = query.to_lowercase();
    let mut parameters = default_parameters();

    let limit = detect_limit(&q);

    for (key, value) in detect_rating_band(&q) {
        parameters.insert(key.to_string(), value.into());
    }

    let genre = vocab.detect_genre(&q);
    if let Some(id) = genre {
        parameters.insert(WITH_GENRES.to_string(), id.into());
    }

    if let Some(code) = vocab.detect_language(&q) {
        parameters.insert(WITH_ORIGINAL_LANGUAGE.to_string(), code.into());
    }

    if let Some(code) = vocab.detect_country(&q) {
        parameters.insert(WITH_ORIGIN_COUNTRY.to_string(), code.into());
    }

    for (key, value) in detect_release(&q) {
        parameters.insert(key.to_string(), value);
    }

    let (mode, search_term) = if contains_any(&q, SEARCH_KEYWORDS) {
        let term = patterns().search_prefix.replace_all(&q, "");
        let term = term
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == ' ');
        let term = if term.is_empty() { query.trim() } else { term };
        (Mode::SearchByTitle, Some(term.to_string()))
    } else if genre.is_some() || q.contains("top") || contains_any(&q, DISCOVER_HINTS) {
        (Mode::Discover, None)
    } else {
        (Mode::SearchByTitle, Some(query.trim().to_string()))
    };

    RequestDescriptor {
        mode,
        parameters,
        limit,
        search_term,
    }
}

/// "top N" is clamped to 1..=30; a bare number elsewhere is taken as is.
fn detect_limit(q: &str) -> u32 {
    let pats = patterns();
    if let Some(n) = capture_number(&pats.top_n, q) {
        return n.clamp(1, MAX_TOP_N);
    }
    capture_number(&pats.bare_number, q).unwrap_or(DEFAULT_LIMIT)
}

fn capture_number(re: &Regex, q: &str) -> Option<u32> {
    re.captures(q)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn detect_rating_band(q: &str) -> Vec<(&'static str, f64)> {
    if contains_any(q, BEST_WORDS) {
        vec![(VOTE_AVERAGE_GTE, 8.0)]
    } else if contains_any(q, MID_WORDS) {
        vec![(VOTE_AVERAGE_GTE, 6.5), (VOTE_AVERAGE_LTE, 8.0)]
    } else if contains_any(q, LOW_WORDS) {
        vec![(VOTE_AVERAGE_LTE, 6.0)]
    } else {
        Vec::new()
    }
}

/// An explicit year wins; otherwise the first matching decade.
fn detect_release(q: &str) -> Vec<(&'static str, ParamValue)> {
    if let Some(year) = explicit_year(q) {
        return vec![(RELEASE_YEAR, ParamValue::Int(year as i64))];
    }

    DECADES
        .iter()
        .find(|(words, _)| contains_any(q, words))
        .map(|(_, start)| {
            let (from, to) = year_span_bounds(*start, *start + 9);
            vec![(RELEASE_DATE_GTE, from.into()), (RELEASE_DATE_LTE, to.into())]
        })
        .unwrap_or_default()
}

/// First bare 19xx/20xx token in the text.
pub fn explicit_year(text: &str) -> Option<i32> {
    patterns()
        .year
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// `YYYY-01-01` and `YYYY-12-31` bounds covering `from..=to`.
pub fn year_span_bounds(from: i32, to: i32) -> (String, String) {
    (format!("{:04}-01-01", from), format!("{:04}-12-31", to))
}

fn contains_any(q: &str, words: &[&str]) -> bool {
    words.iter().any(|w| q.contains(w))
}
