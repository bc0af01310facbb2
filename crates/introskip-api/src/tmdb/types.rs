use serde::Deserialize;

use crate::traits::{CatalogHit, EpisodeRef, ShowDetails};

// ── Search ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

/// Movies carry `title`/`release_date`, shows `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

impl TmdbSearchResult {
    pub fn into_hit(self) -> CatalogHit {
        CatalogHit {
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            release_date: self
                .release_date
                .filter(|d| !d.is_empty())
                .or(self.first_air_date)
                .unwrap_or_default(),
        }
    }
}

// ── Show / season ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TmdbShow {
    pub id: u64,
    #[serde(default)]
    pub number_of_seasons: u32,
}

impl From<TmdbShow> for ShowDetails {
    fn from(show: TmdbShow) -> Self {
        Self {
            id: show.id,
            season_count: show.number_of_seasons,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TmdbSeason {
    #[serde(default)]
    pub episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbEpisode {
    pub id: u64,
    pub episode_number: u32,
}

impl From<TmdbEpisode> for EpisodeRef {
    fn from(ep: TmdbEpisode) -> Self {
        Self {
            episode_id: ep.id,
            episode_number: ep.episode_number,
        }
    }
}

/// Error body TMDB returns on failure.
#[derive(Debug, Deserialize)]
pub struct TmdbErrorBody {
    pub status_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20", "popularity": 300.1},
                {"id": 603, "title": "The Matrix", "release_date": "1999-03-30"},
                {"id": 7, "title": "Undated"}
            ],
            "total_results": 3
        }"#;
        let resp: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        let hits: Vec<CatalogHit> = resp.results.into_iter().map(|r| r.into_hit()).collect();

        assert_eq!(hits[0].id, 1396);
        assert_eq!(hits[0].title, "Breaking Bad");
        assert_eq!(hits[0].release_date, "2008-01-20");
        assert_eq!(hits[1].title, "The Matrix");
        assert_eq!(hits[1].release_date, "1999-03-30");
        assert_eq!(hits[2].release_date, "");
    }

    #[test]
    fn test_deserialize_show_and_season() {
        let show: TmdbShow =
            serde_json::from_str(r#"{"id": 1399, "name": "Game of Thrones", "number_of_seasons": 8}"#)
                .unwrap();
        let details = ShowDetails::from(show);
        assert_eq!(details.season_count, 8);

        let season: TmdbSeason = serde_json::from_str(
            r#"{"season_number": 3, "episodes": [
                {"id": 63088, "episode_number": 1, "name": "Valar Dohaeris"},
                {"id": 63089, "episode_number": 2}
            ]}"#,
        )
        .unwrap();
        let eps: Vec<EpisodeRef> = season.episodes.into_iter().map(Into::into).collect();
        assert_eq!(
            eps[1],
            EpisodeRef {
                episode_id: 63089,
                episode_number: 2
            }
        );
    }

    #[test]
    fn test_empty_search() {
        let resp: TmdbSearchResponse = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(resp.results.is_empty());
    }
}
