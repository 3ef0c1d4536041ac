//! Paginated list endpoints and their page results.
//!
//! Every list-style endpoint (popular, similar, recommended, search) is
//! described by a [`ListEndpoint`] value. Fetching one page yields a
//! [`Page`], which carries a [`NextPage`] continuation while the server
//! reports more pages. Pagination is pull-based: nothing is fetched until
//! [`NextPage::fetch`] is awaited.

use std::fmt::Debug;
use std::future::Future;

use anyhow::Result;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::api::TmdbApi;
use super::types::{MovieSummary, SearchMovieParams, SearchTvParams, TvSummary};

/// Page requested when the caller has no cursor yet.
pub const FIRST_PAGE: u32 = 1;

/// Body shared by every paginated TMDB response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PagedResponse<T> {
    /// Page number reported by the server.
    pub page: u32,
    /// Items on this page.
    pub results: Vec<T>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    pub total_results: u32,
}

/// A list endpoint together with all of its parameters except the page.
pub trait ListEndpoint: Debug + Clone + Send + Sync + 'static {
    /// Item type of the `results` array.
    type Item: DeserializeOwned + Debug + Clone + Send + Sync + 'static;

    /// Request path relative to the API base URL.
    fn path(&self) -> String;

    /// Endpoint-specific query pairs, `page` excluded.
    fn query(&self) -> Vec<(&'static str, String)>;

    /// Calls the accessor of `api` that serves this endpoint.
    fn fetch<A: TmdbApi + Sync>(
        &self,
        api: &A,
        page: u32,
    ) -> impl Future<Output = Result<Page<Self>>> + Send;
}

/// Movie list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieList {
    /// `movie/popular`
    Popular,
    /// `movie/{id}/similar`
    Similar {
        /// Source movie ID.
        id: u64,
    },
    /// `movie/{id}/recommendations`
    Recommended {
        /// Source movie ID.
        id: u64,
    },
    /// `search/movie`
    Search(SearchMovieParams),
}

impl ListEndpoint for MovieList {
    type Item = MovieSummary;

    fn path(&self) -> String {
        match self {
            Self::Popular => String::from("movie/popular"),
            Self::Similar { id } => format!("movie/{id}/similar"),
            Self::Recommended { id } => format!("movie/{id}/recommendations"),
            Self::Search(_) => String::from("search/movie"),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Search(params) => params.to_query(),
            Self::Popular | Self::Similar { .. } | Self::Recommended { .. } => Vec::new(),
        }
    }

    async fn fetch<A: TmdbApi + Sync>(&self, api: &A, page: u32) -> Result<Page<Self>> {
        match self {
            Self::Popular => api.movie_popular(page).await,
            Self::Similar { id } => api.movie_similar(*id, page).await,
            Self::Recommended { id } => api.movie_recommended(*id, page).await,
            Self::Search(params) => api.search_movie(params, page).await,
        }
    }
}

/// TV series list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TvList {
    /// `tv/popular`
    Popular,
    /// `tv/{id}/similar`
    Similar {
        /// Source series ID.
        id: u64,
    },
    /// `tv/{id}/recommendations`
    Recommended {
        /// Source series ID.
        id: u64,
    },
    /// `search/tv`
    Search(SearchTvParams),
}

impl ListEndpoint for TvList {
    type Item = TvSummary;

    fn path(&self) -> String {
        match self {
            Self::Popular => String::from("tv/popular"),
            Self::Similar { id } => format!("tv/{id}/similar"),
            Self::Recommended { id } => format!("tv/{id}/recommendations"),
            Self::Search(_) => String::from("search/tv"),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Search(params) => params.to_query(),
            Self::Popular | Self::Similar { .. } | Self::Recommended { .. } => Vec::new(),
        }
    }

    async fn fetch<A: TmdbApi + Sync>(&self, api: &A, page: u32) -> Result<Page<Self>> {
        match self {
            Self::Popular => api.tv_popular(page).await,
            Self::Similar { id } => api.tv_similar(*id, page).await,
            Self::Recommended { id } => api.tv_recommended(*id, page).await,
            Self::Search(params) => api.search_tv(params, page).await,
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page<L: ListEndpoint> {
    /// Decoded response body.
    pub response: PagedResponse<L::Item>,
    /// 1-based page number that was requested.
    pub page: u32,
    /// Continuation to the following page; `None` on the last page.
    pub next: Option<NextPage<L>>,
}

impl<L: ListEndpoint> Page<L> {
    /// Wraps a decoded response for `page` of `endpoint`.
    ///
    /// A continuation is attached iff `page < response.total_pages`.
    #[must_use]
    pub fn new(endpoint: L, page: u32, response: PagedResponse<L::Item>) -> Self {
        let next = (page < response.total_pages).then(|| NextPage {
            endpoint,
            page: page.saturating_add(1),
        });
        Self {
            response,
            page,
            next,
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn results(&self) -> &[L::Item] {
        &self.response.results
    }

    /// Total number of pages reported by the server.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.response.total_pages
    }

    /// Returns `true` unless this is the last page.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Fetches the following page through `api`.
    ///
    /// Returns `None` on the last page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request for the next page fails.
    pub async fn fetch_next<A: TmdbApi + Sync>(&self, api: &A) -> Option<Result<Self>> {
        match self.next {
            Some(ref next) => Some(next.fetch(api).await),
            None => None,
        }
    }
}

/// Continuation to the next page of a list endpoint.
///
/// Holds the endpoint parameters by value, so fetching it repeats the
/// original request with only the page number advanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPage<L> {
    endpoint: L,
    page: u32,
}

impl<L: ListEndpoint> NextPage<L> {
    /// Page number this continuation fetches.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Endpoint this continuation fetches from.
    #[must_use]
    pub const fn endpoint(&self) -> &L {
        &self.endpoint
    }

    /// Performs the request for the next page.
    ///
    /// Passing a caching client keeps its summary cache populated.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    pub async fn fetch<A: TmdbApi + Sync>(&self, api: &A) -> Result<Page<L>> {
        self.endpoint.fetch(api, self.page).await
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

    fn response(page: u32, total_pages: u32) -> PagedResponse<MovieSummary> {
        PagedResponse {
            page,
            results: Vec::new(),
            total_pages,
            total_results: total_pages.saturating_mul(20),
        }
    }

    fn movie_page_body(page: u32, total_pages: u32, ids: &[u64]) -> serde_json::Value {
        let results: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "title": format!("Movie {id}"),
                    "original_title": format!("Movie {id}"),
                    "original_language": "en",
                    "release_date": "2001-01-01",
                    "overview": null,
                    "popularity": 1.0,
                    "vote_average": 7.0,
                    "vote_count": 10,
                    "genre_ids": [],
                    "adult": false,
                    "video": false,
                    "poster_path": null,
                    "backdrop_path": null
                })
            })
            .collect();
        json!({
            "page": page,
            "results": results,
            "total_pages": total_pages,
            "total_results": total_pages * 20
        })
    }

    fn client_for(server: &MockServer) -> TmdbClient {
        let base_url = format!("{}/3/", server.uri());
        TmdbClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("k")
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    #[test]
    fn test_page_before_last_has_next() {
        // Arrange & Act
        let page = Page::new(MovieList::Popular, 2, response(2, 3));

        // Assert
        assert!(page.has_next());
        assert_eq!(page.next.as_ref().unwrap().page(), 3);
    }

    #[test]
    fn test_last_page_has_no_next() {
        // Arrange & Act
        let page = Page::new(MovieList::Popular, 3, response(3, 3));

        // Assert
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_past_total_has_no_next() {
        // Arrange & Act
        let page = Page::new(MovieList::Popular, 7, response(7, 3));

        // Assert
        assert!(page.next.is_none());
    }

    #[test]
    fn test_empty_result_set_has_no_next() {
        // Arrange & Act
        let page = Page::new(
            MovieList::Search(SearchMovieParams::new("zzzz")),
            FIRST_PAGE,
            response(1, 0),
        );

        // Assert
        assert!(page.next.is_none());
        assert!(page.results().is_empty());
    }

    #[test]
    fn test_next_page_keeps_endpoint_parameters() {
        // Arrange
        let endpoint = MovieList::Search(SearchMovieParams::new("Matrix").year(1999));

        // Act
        let page = Page::new(endpoint.clone(), 1, response(1, 2));

        // Assert
        assert_eq!(page.next.unwrap().endpoint(), &endpoint);
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(MovieList::Popular.path(), "movie/popular");
        assert_eq!(MovieList::Similar { id: 603 }.path(), "movie/603/similar");
        assert_eq!(
            MovieList::Recommended { id: 603 }.path(),
            "movie/603/recommendations"
        );
        assert_eq!(
            MovieList::Search(SearchMovieParams::new("x")).path(),
            "search/movie"
        );
        assert_eq!(TvList::Popular.path(), "tv/popular");
        assert_eq!(TvList::Similar { id: 1396 }.path(), "tv/1396/similar");
        assert_eq!(
            TvList::Recommended { id: 1396 }.path(),
            "tv/1396/recommendations"
        );
        assert_eq!(TvList::Search(SearchTvParams::new("x")).path(), "search/tv");
    }

    #[test]
    fn test_non_search_endpoints_have_no_extra_query() {
        assert!(MovieList::Popular.query().is_empty());
        assert!(TvList::Similar { id: 1 }.query().is_empty());
    }

    #[tokio::test]
    async fn test_search_continuation_requests_next_page_with_same_query() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/search/movie"))
            .and(query_param("query", "Matrix"))
            .and(query_param("page", "1"))
            .and(query_param("api_key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_page_body(1, 3, &[1])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/search/movie"))
            .and(query_param("query", "Matrix"))
            .and(query_param("page", "2"))
            .and(query_param("api_key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_page_body(2, 3, &[2])))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);
        let params = SearchMovieParams::new("Matrix");

        // Act
        let first = client.search_movie(&params, FIRST_PAGE).await.unwrap();
        let second = first.fetch_next(&client).await.unwrap().unwrap();

        // Assert
        assert_eq!(first.page, 1);
        assert_eq!(first.results()[0].id, 1);
        assert_eq!(second.page, 2);
        assert_eq!(second.results()[0].id, 2);
        assert_eq!(second.next.as_ref().unwrap().page(), 3);
    }

    #[tokio::test]
    async fn test_continuation_stops_at_last_page() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/603/similar"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_page_body(1, 2, &[10])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/603/similar"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_page_body(2, 2, &[11])))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);

        // Act
        let first = client.movie_similar(603, FIRST_PAGE).await.unwrap();
        let last = first.next.as_ref().unwrap().fetch(&client).await.unwrap();

        // Assert
        assert!(first.has_next());
        assert!(!last.has_next());
        assert!(last.fetch_next(&client).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_continuation_leaves_previous_page_intact() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/tv/popular"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results": [],
                "total_pages": 2,
                "total_results": 20
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/tv/popular"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server);

        // Act
        let first = client.tv_popular(FIRST_PAGE).await.unwrap();
        let result = first.fetch_next(&client).await.unwrap();

        // Assert
        assert!(result.is_err());
        assert_eq!(first.page, 1);
        assert_eq!(first.next.as_ref().unwrap().page(), 2);
    }
}
