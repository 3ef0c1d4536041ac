//! `TmdbClient` - TMDB API client implementation.

use anyhow::{Context, Result, bail};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::TmdbApi;
use super::page::{ListEndpoint, MovieList, Page, TvList};
use super::types::{
    ExternalIds, MovieDetails, SearchMovieParams, SearchTvParams, TmdbErrorResponse, TvDetails,
    TvSeason, Videos,
};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "en-US";

/// TMDB API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key sent as the `api_key` query parameter.
    api_key: String,
    /// Response language sent as the `language` query parameter.
    language: String,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            language: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the response language (default: "en-US").
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_key = self.api_key.context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let language = self
            .language
            .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_key,
            language,
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Response language sent with every request.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Sends a request to the TMDB API and decodes the JSON response.
    ///
    /// `path` is relative to the base URL; a leading `/` is accepted.
    /// `api_key` is always appended to `query`, and `language` is appended
    /// unless `query` already carries one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, the server answers
    /// with a non-success status, or the body is not the expected JSON.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<T> {
        let relative = path.trim_start_matches('/');
        let url = self
            .base_url
            .join(relative)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let mut params: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if !query.iter().any(|(k, _)| *k == "language") {
            params.push(("language", self.language.as_str()));
        }
        params.push(("api_key", self.api_key.as_str()));

        let mut builder = self.http_client.request(method, url).query(&params);
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }
        let request = builder
            .build()
            .with_context(|| format!("failed to build request: {path}"))?;

        tracing::debug!(url = %redact_api_key(request.url()), "TMDB API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            if let Ok(error_response) = serde_json::from_str::<TmdbErrorResponse>(&body) {
                bail!(
                    "TMDB API error (HTTP {}): code={}, message={}",
                    status,
                    error_response.status_code,
                    error_response.status_message,
                );
            }
            bail!("TMDB API error (HTTP {status}): {body}");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;
        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        let parsed =
            raw_result.with_context(|| format!("failed to decode JSON response: {path}"))?;
        Ok(parsed)
    }

    /// Sends a GET request.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch_json(Method::GET, path, &[], None).await
    }

    /// Fetches one page of a list endpoint.
    #[instrument(skip_all, fields(page = page))]
    async fn get_page<L: ListEndpoint>(&self, endpoint: L, page: u32) -> Result<Page<L>> {
        let mut query = endpoint.query();
        query.push(("page", page.to_string()));

        let response = self
            .fetch_json(Method::GET, &endpoint.path(), &query, None)
            .await?;
        Ok(Page::new(endpoint, page, response))
    }
}

/// Masks the `api_key` query value for logging.
fn redact_api_key(url: &Url) -> Url {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "api_key" {
                String::from("***")
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

impl TmdbApi for TmdbClient {
    #[instrument(skip_all)]
    async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        self.get_json(&format!("movie/{id}")).await
    }

    #[instrument(skip_all)]
    async fn movie_popular(&self, page: u32) -> Result<Page<MovieList>> {
        self.get_page(MovieList::Popular, page).await
    }

    #[instrument(skip_all)]
    async fn movie_similar(&self, id: u64, page: u32) -> Result<Page<MovieList>> {
        self.get_page(MovieList::Similar { id }, page).await
    }

    #[instrument(skip_all)]
    async fn movie_recommended(&self, id: u64, page: u32) -> Result<Page<MovieList>> {
        self.get_page(MovieList::Recommended { id }, page).await
    }

    #[instrument(skip_all)]
    async fn movie_videos(&self, id: u64) -> Result<Videos> {
        self.get_json(&format!("movie/{id}/videos")).await
    }

    #[instrument(skip_all)]
    async fn movie_external_ids(&self, id: u64) -> Result<ExternalIds> {
        self.get_json(&format!("movie/{id}/external_ids")).await
    }

    #[instrument(skip_all)]
    async fn tv_details(&self, id: u64) -> Result<TvDetails> {
        self.get_json(&format!("tv/{id}")).await
    }

    #[instrument(skip_all)]
    async fn tv_popular(&self, page: u32) -> Result<Page<TvList>> {
        self.get_page(TvList::Popular, page).await
    }

    #[instrument(skip_all)]
    async fn tv_similar(&self, id: u64, page: u32) -> Result<Page<TvList>> {
        self.get_page(TvList::Similar { id }, page).await
    }

    #[instrument(skip_all)]
    async fn tv_recommended(&self, id: u64, page: u32) -> Result<Page<TvList>> {
        self.get_page(TvList::Recommended { id }, page).await
    }

    #[instrument(skip_all)]
    async fn tv_season(&self, id: u64, season_number: u32) -> Result<TvSeason> {
        self.get_json(&format!("tv/{id}/season/{season_number}"))
            .await
    }

    #[instrument(skip_all)]
    async fn tv_videos(&self, id: u64) -> Result<Videos> {
        self.get_json(&format!("tv/{id}/videos")).await
    }

    #[instrument(skip_all)]
    async fn tv_external_ids(&self, id: u64) -> Result<ExternalIds> {
        self.get_json(&format!("tv/{id}/external_ids")).await
    }

    #[instrument(skip_all)]
    async fn search_movie(
        &self,
        params: &SearchMovieParams,
        page: u32,
    ) -> Result<Page<MovieList>> {
        self.get_page(MovieList::Search(params.clone()), page).await
    }

    #[instrument(skip_all)]
    async fn search_tv(&self, params: &SearchTvParams, page: u32) -> Result<Page<TvList>> {
        self.get_page(TvList::Search(params.clone()), page).await
    }
}
