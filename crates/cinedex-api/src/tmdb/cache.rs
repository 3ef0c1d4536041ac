//! `CachedTmdbClient` - in-memory memoization over any [`TmdbApi`].
//!
//! Per category (movie, TV) two maps are kept:
//!
//! - a detail cache (`id` → full record), written only by `*_details`;
//! - a summary cache (`id` → [`Record`]), written by `*_details` with the
//!   full record and by every list accessor with the summaries on the page.
//!
//! TV seasons get a third map keyed by series ID and season number.
//! Nothing is ever evicted; the maps live as long as the client.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::instrument;

use super::api::TmdbApi;
use super::entity::{Entity, MovieRecord, Record, TvRecord};
use super::page::{MovieList, Page, TvList};
use super::types::{
    ExternalIds, MovieDetails, MovieSummary, SearchMovieParams, SearchTvParams, TvDetails,
    TvSeason, TvSummary, Videos,
};

/// Detail and summary maps of one entity category.
#[derive(Debug)]
struct EntityCache<F, S> {
    details: RwLock<HashMap<u64, F>>,
    summaries: RwLock<HashMap<u64, Record<F, S>>>,
}

impl<F: Clone, S: Clone + Entity> EntityCache<F, S> {
    fn new() -> Self {
        Self {
            details: RwLock::new(HashMap::new()),
            summaries: RwLock::new(HashMap::new()),
        }
    }

    async fn details(&self, id: u64) -> Option<F> {
        self.details.read().await.get(&id).cloned()
    }

    async fn summary(&self, id: u64) -> Option<Record<F, S>> {
        self.summaries.read().await.get(&id).cloned()
    }

    /// Stores a freshly fetched full record in both maps.
    async fn store_details(&self, id: u64, details: &F) {
        self.details.write().await.insert(id, details.clone());
        self.summaries
            .write()
            .await
            .insert(id, Record::Full(details.clone()));
    }

    /// Records every list item as a summary, replacing earlier entries.
    async fn store_summaries(&self, items: &[S]) {
        let mut summaries = self.summaries.write().await;
        for item in items {
            summaries.insert(item.id(), Record::Summary(item.clone()));
        }
        tracing::debug!(count = items.len(), "summary cache populated");
    }

    async fn len(&self) -> (usize, usize) {
        let details = self.details.read().await.len();
        let summaries = self.summaries.read().await.len();
        (details, summaries)
    }
}

/// Entry counts of every cache map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Movies in the detail cache.
    pub movie_details: usize,
    /// Movies in the summary cache.
    pub movie_summaries: usize,
    /// Series in the detail cache.
    pub tv_details: usize,
    /// Series in the summary cache.
    pub tv_summaries: usize,
    /// Cached seasons across all series.
    pub tv_seasons: usize,
}

/// Caching decorator for a TMDB client.
///
/// Implements [`TmdbApi`] itself, so it can stand in for the wrapped client.
/// Concurrent cold calls for the same ID are not coalesced: each performs
/// its own request and the last response to arrive wins.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CachedTmdbClient<A> {
    inner: A,
    movies: EntityCache<MovieDetails, MovieSummary>,
    tv: EntityCache<TvDetails, TvSummary>,
    seasons: RwLock<HashMap<u64, HashMap<u32, TvSeason>>>,
}

impl<A> CachedTmdbClient<A> {
    /// Wraps `inner` with empty caches.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            movies: EntityCache::new(),
            tv: EntityCache::new(),
            seasons: RwLock::new(HashMap::new()),
        }
    }

    /// Borrows the wrapped client.
    pub const fn inner(&self) -> &A {
        &self.inner
    }

    /// Unwraps the client, dropping the caches.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Returns the current entry counts.
    pub async fn stats(&self) -> CacheStats {
        let (movie_details, movie_summaries) = self.movies.len().await;
        let (tv_details, tv_summaries) = self.tv.len().await;
        let tv_seasons = self.seasons.read().await.values().map(HashMap::len).sum();
        CacheStats {
            movie_details,
            movie_summaries,
            tv_details,
            tv_summaries,
            tv_seasons,
        }
    }
}

impl<A: TmdbApi + Sync> CachedTmdbClient<A> {
    /// Returns whatever is cached for a movie, full or summary.
    ///
    /// Falls back to [`TmdbApi::movie_details`] on a miss, which caches the
    /// full record.
    ///
    /// # Errors
    ///
    /// Returns the wrapped client's error on a cache miss.
    #[instrument(skip_all, fields(id = id))]
    pub async fn movie_simple_details(&self, id: u64) -> Result<MovieRecord> {
        if let Some(record) = self.movies.summary(id).await {
            tracing::debug!(id, full = record.is_full(), "movie summary cache hit");
            return Ok(record);
        }
        self.movie_details(id).await.map(Record::Full)
    }

    /// Returns whatever is cached for a series, full or summary.
    ///
    /// Falls back to [`TmdbApi::tv_details`] on a miss, which caches the
    /// full record.
    ///
    /// # Errors
    ///
    /// Returns the wrapped client's error on a cache miss.
    #[instrument(skip_all, fields(id = id))]
    pub async fn tv_simple_details(&self, id: u64) -> Result<TvRecord> {
        if let Some(record) = self.tv.summary(id).await {
            tracing::debug!(id, full = record.is_full(), "tv summary cache hit");
            return Ok(record);
        }
        self.tv_details(id).await.map(Record::Full)
    }

    async fn remember_movies(&self, page: Page<MovieList>) -> Page<MovieList> {
        self.movies.store_summaries(page.results()).await;
        page
    }

    async fn remember_tv(&self, page: Page<TvList>) -> Page<TvList> {
        self.tv.store_summaries(page.results()).await;
        page
    }
}

impl<A: TmdbApi + Sync> TmdbApi for CachedTmdbClient<A> {
    #[instrument(skip_all, fields(id = id))]
    async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        if let Some(details) = self.movies.details(id).await {
            tracing::debug!(id, "movie details cache hit");
            return Ok(details);
        }
        tracing::debug!(id, "movie details cache miss");
        let details = self.inner.movie_details(id).await?;
        self.movies.store_details(id, &details).await;
        Ok(details)
    }

    async fn movie_popular(&self, page: u32) -> Result<Page<MovieList>> {
        let page = self.inner.movie_popular(page).await?;
        Ok(self.remember_movies(page).await)
    }

    async fn movie_similar(&self, id: u64, page: u32) -> Result<Page<MovieList>> {
        let page = self.inner.movie_similar(id, page).await?;
        Ok(self.remember_movies(page).await)
    }

    async fn movie_recommended(&self, id: u64, page: u32) -> Result<Page<MovieList>> {
        let page = self.inner.movie_recommended(id, page).await?;
        Ok(self.remember_movies(page).await)
    }

    async fn movie_videos(&self, id: u64) -> Result<Videos> {
        self.inner.movie_videos(id).await
    }

    async fn movie_external_ids(&self, id: u64) -> Result<ExternalIds> {
        self.inner.movie_external_ids(id).await
    }

    #[instrument(skip_all, fields(id = id))]
    async fn tv_details(&self, id: u64) -> Result<TvDetails> {
        if let Some(details) = self.tv.details(id).await {
            tracing::debug!(id, "tv details cache hit");
            return Ok(details);
        }
        tracing::debug!(id, "tv details cache miss");
        let details = self.inner.tv_details(id).await?;
        self.tv.store_details(id, &details).await;
        Ok(details)
    }

    async fn tv_popular(&self, page: u32) -> Result<Page<TvList>> {
        let page = self.inner.tv_popular(page).await?;
        Ok(self.remember_tv(page).await)
    }

    async fn tv_similar(&self, id: u64, page: u32) -> Result<Page<TvList>> {
        let page = self.inner.tv_similar(id, page).await?;
        Ok(self.remember_tv(page).await)
    }

    async fn tv_recommended(&self, id: u64, page: u32) -> Result<Page<TvList>> {
        let page = self.inner.tv_recommended(id, page).await?;
        Ok(self.remember_tv(page).await)
    }

    #[instrument(skip_all, fields(id = id, season = season_number))]
    async fn tv_season(&self, id: u64, season_number: u32) -> Result<TvSeason> {
        let cached = self
            .seasons
            .read()
            .await
            .get(&id)
            .and_then(|seasons| seasons.get(&season_number))
            .cloned();
        if let Some(season) = cached {
            tracing::debug!(id, season_number, "tv season cache hit");
            return Ok(season);
        }

        let season = self.inner.tv_season(id, season_number).await?;
        self.seasons
            .write()
            .await
            .entry(id)
            .or_default()
            .insert(season_number, season.clone());
        Ok(season)
    }

    async fn tv_videos(&self, id: u64) -> Result<Videos> {
        self.inner.tv_videos(id).await
    }

    async fn tv_external_ids(&self, id: u64) -> Result<ExternalIds> {
        self.inner.tv_external_ids(id).await
    }

    async fn search_movie(
        &self,
        params: &SearchMovieParams,
        page: u32,
    ) -> Result<Page<MovieList>> {
        let page = self.inner.search_movie(params, page).await?;
        Ok(self.remember_movies(page).await)
    }

    async fn search_tv(&self, params: &SearchTvParams, page: u32) -> Result<Page<TvList>> {
        let page = self.inner.search_tv(params, page).await?;
        Ok(self.remember_tv(page).await)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::tmdb::TmdbClient;
    use crate::tmdb::page::FIRST_PAGE;

    const MOVIE_DETAILS: &str = include_str!("../../../../fixtures/tmdb/movie_details_603.json");
    const MOVIE_POPULAR: &str = include_str!("../../../../fixtures/tmdb/movie_popular_p1.json");
    const TV_DETAILS: &str = include_str!("../../../../fixtures/tmdb/tv_details_1396.json");
    const TV_POPULAR: &str = include_str!("../../../../fixtures/tmdb/tv_popular_p1.json");
    const TV_SEASON: &str = include_str!("../../../../fixtures/tmdb/tv_season_1396_1.json");

    fn cached_client(server: &MockServer) -> CachedTmdbClient<TmdbClient> {
        let base_url = format!("{}/3/", server.uri());
        let client = TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();
        CachedTmdbClient::new(client)
    }

    async fn mount(server: &MockServer, route: &str, body: &str, expected: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_movie_details_fetched_once() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/movie/603", MOVIE_DETAILS, 1).await;
        let client = cached_client(&server);

        // Act
        let first = client.movie_details(603).await.unwrap();
        let second = client.movie_details(603).await.unwrap();

        // Assert
        assert_eq!(first, second);
        let stats = client.stats().await;
        assert_eq!(stats.movie_details, 1);
        assert_eq!(stats.movie_summaries, 1);
    }

    #[tokio::test]
    async fn test_simple_details_served_from_popular_page() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/movie/popular", MOVIE_POPULAR, 1).await;
        mount(&server, "/3/movie/603", MOVIE_DETAILS, 0).await;
        let client = cached_client(&server);

        // Act
        let page = client.movie_popular(FIRST_PAGE).await.unwrap();
        let record = client.movie_simple_details(603).await.unwrap();

        // Assert
        assert_eq!(page.results().len(), 2);
        assert!(!record.is_full());
        assert_eq!(record.name(), "The Matrix");
    }

    #[tokio::test]
    async fn test_simple_details_cold_cache_fetches_full_record() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/movie/603", MOVIE_DETAILS, 1).await;
        let client = cached_client(&server);

        // Act
        let record = client.movie_simple_details(603).await.unwrap();
        let again = client.movie_simple_details(603).await.unwrap();
        let details = client.movie_details(603).await.unwrap();

        // Assert
        assert!(record.is_full());
        assert_eq!(record, again);
        assert_eq!(record.into_full(), Some(details));
    }

    #[tokio::test]
    async fn test_popular_populates_summaries_only() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/movie/popular", MOVIE_POPULAR, 1).await;
        mount(&server, "/3/movie/603", MOVIE_DETAILS, 1).await;
        let client = cached_client(&server);

        // Act
        client.movie_popular(FIRST_PAGE).await.unwrap();
        let after_list = client.stats().await;
        client.movie_details(603).await.unwrap();

        // Assert
        assert_eq!(after_list.movie_summaries, 2);
        assert_eq!(after_list.movie_details, 0);
        assert_eq!(client.stats().await.movie_details, 1);
    }

    #[tokio::test]
    async fn test_list_overwrites_full_summary_entry() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/movie/603", MOVIE_DETAILS, 1).await;
        mount(&server, "/3/movie/popular", MOVIE_POPULAR, 1).await;
        let client = cached_client(&server);

        // Act
        client.movie_details(603).await.unwrap();
        client.movie_popular(FIRST_PAGE).await.unwrap();
        let record = client.movie_simple_details(603).await.unwrap();
        let details = client.movie_details(603).await.unwrap();

        // Assert
        assert!(!record.is_full());
        assert_eq!(details.id, 603);
    }

    #[tokio::test]
    async fn test_list_accessors_always_request() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/movie/popular", MOVIE_POPULAR, 2).await;
        let client = cached_client(&server);

        // Act & Assert (mock expect(2) verifies no list caching)
        client.movie_popular(FIRST_PAGE).await.unwrap();
        client.movie_popular(FIRST_PAGE).await.unwrap();
    }

    #[tokio::test]
    async fn test_continuation_through_cache_populates_summaries() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/603/recommendations"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOVIE_POPULAR))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/603/recommendations"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2,
                "results": [{
                    "id": 604,
                    "title": "The Matrix Reloaded",
                    "original_title": "The Matrix Reloaded",
                    "original_language": "en",
                    "release_date": "2003-05-15",
                    "overview": null,
                    "popularity": 40.1,
                    "vote_average": 7.1,
                    "vote_count": 11000,
                    "genre_ids": [28, 878],
                    "adult": false,
                    "video": false,
                    "poster_path": null,
                    "backdrop_path": null
                }],
                "total_pages": 3,
                "total_results": 41
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = cached_client(&server);

        // Act
        let first = client.movie_recommended(603, FIRST_PAGE).await.unwrap();
        let second = first.fetch_next(&client).await.unwrap().unwrap();
        let record = client.movie_simple_details(604).await.unwrap();

        // Assert
        assert_eq!(second.page, 2);
        assert!(second.has_next());
        assert_eq!(record.name(), "The Matrix Reloaded");
        assert_eq!(client.stats().await.movie_summaries, 3);
    }

    #[tokio::test]
    async fn test_failed_details_leaves_caches_untouched() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/603"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#,
            ))
            .expect(2)
            .mount(&server)
            .await;
        let client = cached_client(&server);

        // Act
        let first = client.movie_details(603).await;
        let second = client.movie_simple_details(603).await;

        // Assert
        assert!(first.unwrap_err().to_string().contains("could not be found"));
        assert!(second.is_err());
        assert_eq!(client.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_concurrent_cold_calls_each_request() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/603"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOVIE_DETAILS))
            .expect(2)
            .mount(&server)
            .await;
        let client = cached_client(&server);

        // Act
        let (first, second) = tokio::join!(client.movie_details(603), client.movie_details(603));

        // Assert
        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(client.stats().await.movie_details, 1);
    }

    #[tokio::test]
    async fn test_tv_details_and_popular_use_tv_namespace() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/tv/popular", TV_POPULAR, 1).await;
        mount(&server, "/3/tv/1396", TV_DETAILS, 1).await;
        let client = cached_client(&server);

        // Act
        client.tv_popular(FIRST_PAGE).await.unwrap();
        let summary = client.tv_simple_details(1396).await.unwrap();
        let details = client.tv_details(1396).await.unwrap();
        let cached = client.tv_details(1396).await.unwrap();

        // Assert
        assert!(!summary.is_full());
        assert_eq!(details, cached);
        let stats = client.stats().await;
        assert_eq!(stats.movie_summaries, 0);
        assert_eq!(stats.tv_details, 1);
    }

    #[tokio::test]
    async fn test_tv_season_cached_per_season_number() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/tv/1396/season/1", TV_SEASON, 1).await;
        let mut season_two: serde_json::Value = serde_json::from_str(TV_SEASON).unwrap();
        season_two["season_number"] = json!(2);
        Mock::given(method("GET"))
            .and(path("/3/tv/1396/season/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(season_two))
            .expect(1)
            .mount(&server)
            .await;
        let client = cached_client(&server);

        // Act
        let first = client.tv_season(1396, 1).await.unwrap();
        let again = client.tv_season(1396, 1).await.unwrap();
        let other = client.tv_season(1396, 2).await.unwrap();

        // Assert
        assert_eq!(first, again);
        assert_eq!(other.season_number, 2);
        assert_eq!(client.stats().await.tv_seasons, 2);
    }

    #[tokio::test]
    async fn test_search_results_recorded_as_summaries() {
        // Arrange
        let server = MockServer::start().await;
        mount(
            &server,
            "/3/search/movie",
            include_str!("../../../../fixtures/tmdb/search_movie_matrix.json"),
            1,
        )
        .await;
        let client = cached_client(&server);

        // Act
        client
            .search_movie(&SearchMovieParams::new("Matrix"), FIRST_PAGE)
            .await
            .unwrap();
        let record = client.movie_simple_details(603).await.unwrap();

        // Assert
        assert_eq!(record.id(), 603);
    }

    fn tv_page_with(id: u64, name: &str) -> serde_json::Value {
        let mut body: serde_json::Value = serde_json::from_str(TV_POPULAR).unwrap();
        let mut show = body["results"][0].clone();
        show["id"] = json!(id);
        show["name"] = json!(name);
        show["original_name"] = json!(name);
        body["results"] = json!([show]);
        body["total_pages"] = json!(1);
        body["total_results"] = json!(1);
        body
    }

    #[tokio::test]
    async fn test_tv_related_lists_and_search_record_summaries() {
        // Arrange
        let server = MockServer::start().await;
        mount(&server, "/3/tv/1396/similar", TV_POPULAR, 1).await;
        Mock::given(method("GET"))
            .and(path("/3/tv/1396/recommendations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tv_page_with(60059, "Better Call Saul")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/search/tv"))
            .and(query_param("query", "Sopranos"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tv_page_with(1398, "The Sopranos")),
            )
            .expect(1)
            .mount(&server)
            .await;
        for id in [1396, 1399, 60059, 1398] {
            mount(&server, &format!("/3/tv/{id}"), TV_DETAILS, 0).await;
        }
        let client = cached_client(&server);

        // Act
        client.tv_similar(1396, FIRST_PAGE).await.unwrap();
        client.tv_recommended(1396, FIRST_PAGE).await.unwrap();
        client
            .search_tv(&SearchTvParams::new("Sopranos"), FIRST_PAGE)
            .await
            .unwrap();
        let similar = client.tv_simple_details(1399).await.unwrap();
        let recommended = client.tv_simple_details(60059).await.unwrap();
        let searched = client.tv_simple_details(1398).await.unwrap();

        // Assert
        assert!(!similar.is_full());
        assert_eq!(similar.name(), "Game of Thrones");
        assert_eq!(recommended.name(), "Better Call Saul");
        assert_eq!(searched.name(), "The Sopranos");
        let stats = client.stats().await;
        assert_eq!(stats.tv_summaries, 4);
        assert_eq!(stats.tv_details, 0);
        assert_eq!(stats.movie_summaries, 0);
    }

    #[tokio::test]
    async fn test_videos_pass_through_uncached() {
        // Arrange
        let server = MockServer::start().await;
        mount(
            &server,
            "/3/movie/603/videos",
            include_str!("../../../../fixtures/tmdb/movie_videos_603.json"),
            2,
        )
        .await;
        let client = cached_client(&server);

        // Act
        client.movie_videos(603).await.unwrap();
        let videos = client.movie_videos(603).await.unwrap();

        // Assert
        assert!(!videos.results.is_empty());
    }
}
