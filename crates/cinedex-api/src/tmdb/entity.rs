//! Shared view over full and summary entity representations.

use super::types::{MovieDetails, MovieSummary, TvDetails, TvSummary};

/// Fields every movie or TV representation carries, full or summary.
pub trait Entity {
    /// TMDB ID, unique within the entity category.
    fn id(&self) -> u64;
    /// Localized title (movies) or name (series).
    fn name(&self) -> &str;
    /// Poster image path.
    fn poster_path(&self) -> Option<&str>;
    /// Overview text.
    fn overview(&self) -> Option<&str>;
}

impl Entity for MovieSummary {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }

    fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }
}

impl Entity for MovieDetails {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }

    fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }
}

impl Entity for TvSummary {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }

    fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }
}

impl Entity for TvDetails {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }

    fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }
}

/// Either the full or the summary representation of an entity.
///
/// A full record is valid anywhere a summary is expected, which is why the
/// summary caches store this type rather than the summary alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Record<F, S> {
    /// Complete detail record.
    Full(F),
    /// Reduced record as embedded in a list response.
    Summary(S),
}

/// Movie entry of a summary cache.
pub type MovieRecord = Record<MovieDetails, MovieSummary>;

/// TV series entry of a summary cache.
pub type TvRecord = Record<TvDetails, TvSummary>;

impl<F, S> Record<F, S> {
    /// Returns `true` for [`Record::Full`].
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Borrows the full representation, if this is one.
    #[must_use]
    pub const fn as_full(&self) -> Option<&F> {
        match self {
            Self::Full(full) => Some(full),
            Self::Summary(_) => None,
        }
    }

    /// Consumes the record, returning the full representation if present.
    #[must_use]
    pub fn into_full(self) -> Option<F> {
        match self {
            Self::Full(full) => Some(full),
            Self::Summary(_) => None,
        }
    }
}

impl<F: Entity, S: Entity> Entity for Record<F, S> {
    fn id(&self) -> u64 {
        match self {
            Self::Full(full) => full.id(),
            Self::Summary(summary) => summary.id(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Full(full) => full.name(),
            Self::Summary(summary) => summary.name(),
        }
    }

    fn poster_path(&self) -> Option<&str> {
        match self {
            Self::Full(full) => full.poster_path(),
            Self::Summary(summary) => summary.poster_path(),
        }
    }

    fn overview(&self) -> Option<&str> {
        match self {
            Self::Full(full) => full.overview(),
            Self::Summary(summary) => summary.overview(),
        }
    }
}
