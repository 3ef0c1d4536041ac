//! TMDB API response types and search parameters.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

/// Parses the year out of a TMDB `YYYY-MM-DD` date.
///
/// TMDB sends an empty string instead of `null` for some unreleased titles,
/// so anything unparsable yields `None`.
pub(crate) fn parse_year(date: Option<&str>) -> Option<i32> {
    let date = NaiveDate::parse_from_str(date?, "%Y-%m-%d").ok()?;
    Some(date.year())
}

// --- Movies ---

/// A movie as it appears inside list and search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    pub original_title: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Release date (YYYY-MM-DD or null).
    pub release_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: f64,
    /// Vote count.
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Video flag.
    #[serde(default)]
    pub video: bool,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

impl MovieSummary {
    /// Year of `release_date`, if known.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        parse_year(self.release_date.as_deref())
    }
}

/// Response from `movie/{movie_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// IMDb ID (e.g. "tt0133093").
    pub imdb_id: Option<String>,
    /// Localized title.
    pub title: String,
    /// Original title.
    pub original_title: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Tagline.
    pub tagline: Option<String>,
    /// Release date.
    pub release_date: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Status (e.g., "Released", "In Production").
    pub status: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Budget in USD.
    #[serde(default)]
    pub budget: u64,
    /// Revenue in USD.
    #[serde(default)]
    pub revenue: u64,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: f64,
    /// Vote count.
    pub vote_count: u32,
    /// Genres.
    pub genres: Vec<Genre>,
    /// Official homepage.
    pub homepage: Option<String>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Video flag.
    #[serde(default)]
    pub video: bool,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

impl MovieDetails {
    /// Year of `release_date`, if known.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        parse_year(self.release_date.as_deref())
    }
}

// --- TV ---

/// A TV series as it appears inside list and search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TvSummary {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Original name.
    pub original_name: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Origin countries (ISO 3166-1).
    #[serde(default)]
    pub origin_country: Vec<String>,
    /// First air date (YYYY-MM-DD or null).
    pub first_air_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: f64,
    /// Vote count.
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

impl TvSummary {
    /// Year of `first_air_date`, if known.
    #[must_use]
    pub fn first_air_year(&self) -> Option<i32> {
        parse_year(self.first_air_date.as_deref())
    }
}

/// Response from `tv/{series_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TvDetails {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Original name.
    pub original_name: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Origin countries (ISO 3166-1).
    pub origin_country: Vec<String>,
    /// First air date.
    pub first_air_date: Option<String>,
    /// Last air date.
    pub last_air_date: Option<String>,
    /// Total number of episodes.
    pub number_of_episodes: u32,
    /// Total number of seasons.
    pub number_of_seasons: u32,
    /// Season summaries.
    pub seasons: Vec<SeasonSummary>,
    /// Status (e.g., "Returning Series", "Ended").
    pub status: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: f64,
    /// Genres.
    pub genres: Vec<Genre>,
    /// Whether the show is still in production.
    pub in_production: bool,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

impl TvDetails {
    /// Year of `first_air_date`, if known.
    #[must_use]
    pub fn first_air_year(&self) -> Option<i32> {
        parse_year(self.first_air_date.as_deref())
    }
}

/// Season summary within TV details.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeasonSummary {
    /// TMDB season ID.
    pub id: u64,
    /// Season number (0 = specials).
    pub season_number: u32,
    /// Number of episodes in this season.
    pub episode_count: u32,
    /// Air date of this season.
    pub air_date: Option<String>,
    /// Season name.
    pub name: String,
    /// Season overview.
    pub overview: Option<String>,
    /// Vote average.
    pub vote_average: f64,
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- TV Season Details ---

/// Response from `tv/{series_id}/season/{season_number}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TvSeason {
    /// Internal `MongoDB` ID.
    #[serde(rename = "_id", default)]
    pub internal_id: Option<String>,
    /// TMDB season ID.
    pub id: u64,
    /// Season number.
    pub season_number: u32,
    /// Season name.
    pub name: Option<String>,
    /// Season overview.
    pub overview: Option<String>,
    /// Air date.
    pub air_date: Option<String>,
    /// Episodes in this season.
    pub episodes: Vec<TmdbEpisode>,
    /// Vote average.
    pub vote_average: f64,
}

/// A single episode within a season.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbEpisode {
    /// TMDB episode ID.
    pub id: u64,
    /// Episode number within the season.
    pub episode_number: u32,
    /// Episode name.
    pub name: String,
    /// Episode overview.
    pub overview: Option<String>,
    /// Air date.
    pub air_date: Option<String>,
    /// Season number.
    pub season_number: u32,
    /// Parent show ID.
    pub show_id: u64,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Vote average.
    pub vote_average: f64,
    /// Episode type (e.g., "standard", "finale").
    pub episode_type: Option<String>,
}

// --- Videos / External IDs ---

/// Response from `movie/{id}/videos` and `tv/{id}/videos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Videos {
    /// Movie or series ID.
    pub id: u64,
    /// Attached videos.
    pub results: Vec<Video>,
}

/// A trailer, teaser, clip or featurette hosted on a video site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// TMDB video ID.
    pub id: String,
    /// Site-specific key (the `YouTube` video ID for `site == "YouTube"`).
    pub key: String,
    /// Video name.
    pub name: String,
    /// Hosting site.
    pub site: String,
    /// Vertical resolution (e.g. 1080).
    pub size: Option<u32>,
    /// Kind of video (e.g. "Trailer", "Teaser").
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the video is an official release.
    #[serde(default)]
    pub official: bool,
    /// Language (ISO 639-1).
    pub iso_639_1: Option<String>,
    /// Country (ISO 3166-1).
    pub iso_3166_1: Option<String>,
    /// Publication timestamp.
    pub published_at: Option<String>,
}

/// Response from `movie/{id}/external_ids` and `tv/{id}/external_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalIds {
    /// Movie or series ID.
    pub id: u64,
    /// IMDb ID.
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// TheTVDB ID (series only).
    #[serde(default)]
    pub tvdb_id: Option<u64>,
    /// Wikidata ID.
    #[serde(default)]
    pub wikidata_id: Option<String>,
    /// Facebook handle.
    #[serde(default)]
    pub facebook_id: Option<String>,
    /// Instagram handle.
    #[serde(default)]
    pub instagram_id: Option<String>,
    /// Twitter handle.
    #[serde(default)]
    pub twitter_id: Option<String>,
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[allow(dead_code)]
    pub success: bool,
}

// --- Search Parameters ---

/// Filters for the `search/movie` endpoint.
///
/// The page number is passed to the accessor separately so that the same
/// filters can be reused for every page of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Filter by primary release year.
    pub primary_release_year: Option<u32>,
    /// Filter by year.
    pub year: Option<u32>,
    /// Region filter (ISO 3166-1).
    pub region: Option<String>,
    /// Include adult content.
    pub include_adult: Option<bool>,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            primary_release_year: None,
            year: None,
            region: None,
            include_adult: None,
        }
    }

    /// Sets the primary release year filter.
    #[must_use]
    pub const fn primary_release_year(mut self, year: u32) -> Self {
        self.primary_release_year = Some(year);
        self
    }

    /// Sets the year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the region filter.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets whether adult titles are included.
    #[must_use]
    pub const fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = Some(include);
        self
    }

    /// Query pairs for this search.
    ///
    /// Unset and falsy filters (year `0`, empty region, `include_adult`
    /// false) are left out.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = vec![("query", self.query.clone())];
        if let Some(year) = self.primary_release_year.filter(|&y| y != 0) {
            query.push(("primary_release_year", year.to_string()));
        }
        if let Some(year) = self.year.filter(|&y| y != 0) {
            query.push(("year", year.to_string()));
        }
        if let Some(region) = self.region.as_deref().filter(|r| !r.is_empty()) {
            query.push(("region", String::from(region)));
        }
        if self.include_adult == Some(true) {
            query.push(("include_adult", String::from("true")));
        }
        query
    }
}

/// Filters for the `search/tv` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTvParams {
    /// Search query (required).
    pub query: String,
    /// Filter by first air date year.
    pub first_air_date_year: Option<u32>,
    /// Filter by year (searches first air date and episode air dates).
    pub year: Option<u32>,
    /// Include adult content.
    pub include_adult: Option<bool>,
}

impl SearchTvParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            first_air_date_year: None,
            year: None,
            include_adult: None,
        }
    }

    /// Sets the first air date year filter.
    #[must_use]
    pub const fn first_air_date_year(mut self, year: u32) -> Self {
        self.first_air_date_year = Some(year);
        self
    }

    /// Sets the year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets whether adult titles are included.
    #[must_use]
    pub const fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = Some(include);
        self
    }

    /// Query pairs for this search. Unset and falsy filters are left out.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = vec![("query", self.query.clone())];
        if let Some(year) = self.first_air_date_year.filter(|&y| y != 0) {
            query.push(("first_air_date_year", year.to_string()));
        }
        if let Some(year) = self.year.filter(|&y| y != 0) {
            query.push(("year", year.to_string()));
        }
        if self.include_adult == Some(true) {
            query.push(("include_adult", String::from("true")));
        }
        query
    }
}
