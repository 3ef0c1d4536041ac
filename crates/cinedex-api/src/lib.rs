//! API client library for cinedex.
//!
//! Provides a TMDB client with paginated list access and an in-memory
//! caching decorator.

/// TMDB API client.
pub mod tmdb;
