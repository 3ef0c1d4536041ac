//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::page::{MovieList, Page, TvList};
use super::types::{
    ExternalIds, MovieDetails, SearchMovieParams, SearchTvParams, TvDetails, TvSeason, Videos,
};

/// TMDB API trait.
///
/// Implemented by the HTTP client and by the caching decorator, so either can
/// be handed to code that only needs the accessors. Also abstracts API
/// operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    // --- Movies ---

    /// Fetches the full details of a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_details(&self, id: u64) -> Result<MovieDetails>;

    /// Fetches a page of currently popular movies.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_popular(&self, page: u32) -> Result<Page<MovieList>>;

    /// Fetches a page of movies similar to the given one.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_similar(&self, id: u64, page: u32) -> Result<Page<MovieList>>;

    /// Fetches a page of movies recommended for the given one.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_recommended(&self, id: u64, page: u32) -> Result<Page<MovieList>>;

    /// Fetches the videos attached to a movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_videos(&self, id: u64) -> Result<Videos>;

    /// Fetches the IDs of a movie on other sites.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn movie_external_ids(&self, id: u64) -> Result<ExternalIds>;

    // --- TV ---

    /// Fetches TV series details including season list.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_details(&self, id: u64) -> Result<TvDetails>;

    /// Fetches a page of currently popular TV series.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_popular(&self, page: u32) -> Result<Page<TvList>>;

    /// Fetches a page of series similar to the given one.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_similar(&self, id: u64, page: u32) -> Result<Page<TvList>>;

    /// Fetches a page of series recommended for the given one.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_recommended(&self, id: u64, page: u32) -> Result<Page<TvList>>;

    /// Fetches TV season details including episode list.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_season(&self, id: u64, season_number: u32) -> Result<TvSeason>;

    /// Fetches the videos attached to a series.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_videos(&self, id: u64) -> Result<Videos>;

    /// Fetches the IDs of a series on other sites.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn tv_external_ids(&self, id: u64) -> Result<ExternalIds>;

    // --- Search ---

    /// Searches for movies.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn search_movie(&self, params: &SearchMovieParams, page: u32)
    -> Result<Page<MovieList>>;

    /// Searches for TV series.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn search_tv(&self, params: &SearchTvParams, page: u32) -> Result<Page<TvList>>;
}
