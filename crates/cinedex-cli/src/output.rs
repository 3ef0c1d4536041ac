//! Human-readable output of TMDB records.
//!
//! Everything is emitted through `tracing::info!`, one event per line.

use cinedex_api::tmdb::{
    Entity, ExternalIds, MovieDetails, MovieSummary, TvDetails, TvSeason, TvSummary, Videos,
    image_url,
};

/// Placeholder for absent values.
const NONE: &str = "-";

/// Header line printed before movie rows.
pub fn movie_header() {
    tracing::info!("ID\tYear\tTitle");
}

/// One row of a movie list.
pub fn movie_row(movie: &MovieSummary) {
    tracing::info!(
        "{}\t{}\t{}",
        movie.id,
        year_or_dash(movie.release_year()),
        movie.title
    );
}

/// Header line printed before TV rows.
pub fn tv_header() {
    tracing::info!("ID\tYear\tName\tCountry");
}

/// One row of a TV list.
pub fn tv_row(tv: &TvSummary) {
    tracing::info!(
        "{}\t{}\t{}\t{}",
        tv.id,
        year_or_dash(tv.first_air_year()),
        tv.name,
        tv.origin_country.join(",")
    );
}

/// Position within a paginated listing.
pub fn page_footer(page: u32, total_pages: u32, total_results: u32) {
    tracing::info!("Page {page}/{total_pages} ({total_results} results)");
}

/// Names the entity a similar/recommended listing is relative to.
pub fn relative_to(label: &str, entity: &impl Entity) {
    tracing::info!("{label} {} ({})", entity.name(), entity.id());
}

/// Full movie record.
pub fn movie_details(details: &MovieDetails, image_size: &str) {
    tracing::info!("ID: {}", details.id);
    tracing::info!("Title: {}", details.title);
    tracing::info!("Original Title: {}", details.original_title);
    if let Some(ref tagline) = details.tagline {
        tracing::info!("Tagline: {tagline}");
    }
    tracing::info!(
        "Release Date: {}",
        details.release_date.as_deref().unwrap_or(NONE)
    );
    tracing::info!(
        "Runtime: {}",
        details
            .runtime
            .map_or_else(|| String::from(NONE), |r| format!("{r}min"))
    );
    tracing::info!(
        "Genres: {}",
        details
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("IMDb: {}", details.imdb_id.as_deref().unwrap_or(NONE));
    tracing::info!("Poster: {}", poster(details.poster_path.as_deref(), image_size));
}

/// Full TV series record including its season list.
pub fn tv_details(details: &TvDetails, image_size: &str) {
    tracing::info!("ID: {}", details.id);
    tracing::info!("Name: {}", details.name);
    tracing::info!("Original Name: {}", details.original_name);
    tracing::info!(
        "First Air Date: {}",
        details.first_air_date.as_deref().unwrap_or(NONE)
    );
    tracing::info!("Status: {}", details.status.as_deref().unwrap_or(NONE));
    tracing::info!("Seasons: {}", details.number_of_seasons);
    tracing::info!("Episodes: {}", details.number_of_episodes);
    tracing::info!("Poster: {}", poster(details.poster_path.as_deref(), image_size));
    tracing::info!("---");
    for season in &details.seasons {
        tracing::info!(
            "  Season {}: {} episodes (air_date: {})",
            season.season_number,
            season.episode_count,
            season.air_date.as_deref().unwrap_or(NONE),
        );
    }
}

/// Season header followed by its episodes.
pub fn season(season: &TvSeason) {
    tracing::info!(
        "Season {}: {}",
        season.season_number,
        season.name.as_deref().unwrap_or(NONE)
    );
    tracing::info!("Episodes:");
    for ep in &season.episodes {
        tracing::info!(
            "  E{:02}: {} (air_date: {}, runtime: {})",
            ep.episode_number,
            ep.name,
            ep.air_date.as_deref().unwrap_or(NONE),
            ep.runtime
                .map_or_else(|| String::from(NONE), |r| format!("{r}min")),
        );
    }
}

/// Video list, with a watch URL for `YouTube` entries.
pub fn videos(videos: &Videos) {
    if videos.results.is_empty() {
        tracing::info!("No videos for {}", videos.id);
        return;
    }
    for video in &videos.results {
        let link = if video.site == "YouTube" {
            format!("https://www.youtube.com/watch?v={}", video.key)
        } else {
            format!("{}:{}", video.site, video.key)
        };
        tracing::info!("{}\t{}\t{}", video.kind, video.name, link);
    }
}

/// IDs on other sites; unset ones are skipped.
pub fn external_ids(ids: &ExternalIds) {
    tracing::info!("TMDB: {}", ids.id);
    let tvdb = ids.tvdb_id.map(|id| id.to_string());
    let entries = [
        ("IMDb", ids.imdb_id.as_deref()),
        ("TVDB", tvdb.as_deref()),
        ("Wikidata", ids.wikidata_id.as_deref()),
        ("Facebook", ids.facebook_id.as_deref()),
        ("Instagram", ids.instagram_id.as_deref()),
        ("Twitter", ids.twitter_id.as_deref()),
    ];
    for (site, id) in entries {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            tracing::info!("{site}: {id}");
        }
    }
}

fn year_or_dash(year: Option<i32>) -> String {
    year.map_or_else(|| String::from(NONE), |y| y.to_string())
}

fn poster(path: Option<&str>, size: &str) -> String {
    path.map_or_else(|| String::from(NONE), |p| image_url(p, size))
}
