//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB v3 API, walks paginated list
//! endpoints and optionally memoizes responses in memory.

mod api;
mod cache;
mod client;
mod entity;
mod image;
mod page;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use cache::{CacheStats, CachedTmdbClient};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use entity::{Entity, MovieRecord, Record, TvRecord};
pub use image::{DEFAULT_IMAGE_SIZE, image_url};
pub use page::{FIRST_PAGE, ListEndpoint, MovieList, NextPage, Page, PagedResponse, TvList};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    ExternalIds, Genre, MovieDetails, MovieSummary, SearchMovieParams, SearchTvParams,
    SeasonSummary, TmdbEpisode, TmdbErrorResponse, TvDetails, TvSeason, TvSummary, Video, Videos,
};
