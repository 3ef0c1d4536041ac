//! Poster and backdrop URL construction.

/// Base URL of the TMDB image CDN.
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Size segment used when none is configured.
pub const DEFAULT_IMAGE_SIZE: &str = "w500";

/// Builds the absolute image URL for a relative poster or backdrop path.
///
/// `size` is a TMDB size segment such as `w185`, `w500` or `original`.
/// A missing leading `/` on `relative` is tolerated.
#[must_use]
pub fn image_url(relative: &str, size: &str) -> String {
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    format!("{IMAGE_BASE_URL}{size}/{relative}")
}
