//! Trait definitions for the external catalog and segment services.
//!
//! The resolver and the background service only see these traits, so tests
//! can swap the HTTP clients for in-memory fakes.

use std::future::Future;

use serde::{Deserialize, Serialize};

use introskip_detect::MediaKind;

/// A title/metadata catalog (TMDB-style ids).
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search by title, optionally narrowed to a release year.
    fn search(
        &self,
        title: &str,
        kind: MediaKind,
        year: Option<&str>,
    ) -> impl Future<Output = Result<Vec<CatalogHit>, Self::Error>> + Send;

    /// Show-level metadata for a TV catalog id.
    fn show_details(&self, id: u64)
        -> impl Future<Output = Result<ShowDetails, Self::Error>> + Send;

    /// Episode list of one season.
    fn season_episodes(
        &self,
        id: u64,
        season: u32,
    ) -> impl Future<Output = Result<Vec<EpisodeRef>, Self::Error>> + Send;
}

/// A segment timestamp database.
pub trait SegmentService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Raw segment payload for one title or episode. Shape varies between
    /// API revisions and is normalized by the caller.
    fn fetch_segments(
        &self,
        query: &SegmentQuery,
    ) -> impl Future<Output = Result<serde_json::Value, Self::Error>> + Send;

    /// Submit a user-measured segment. Requires a credential.
    fn submit(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Community-wide counters. No credential needed.
    fn community_stats(&self) -> impl Future<Output = Result<CommunityStats, Self::Error>> + Send;

    /// Counters for the credential's owner.
    fn user_stats(&self) -> impl Future<Output = Result<UserStats, Self::Error>> + Send;
}

/// One catalog search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogHit {
    pub id: u64,
    pub title: String,
    /// `YYYY-MM-DD` or empty when the catalog has no date.
    pub release_date: String,
}

/// Show metadata needed for reverse episode lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowDetails {
    pub id: u64,
    pub season_count: u32,
}

/// An episode's catalog id and its number within the season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub episode_id: u64,
    pub episode_number: u32,
}

/// Narrative role of a time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Intro,
    Recap,
    Credits,
    Preview,
}

impl SegmentKind {
    /// Evaluation order used by the playback monitor.
    pub const ALL: &[SegmentKind] = &[Self::Intro, Self::Recap, Self::Credits, Self::Preview];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Recap => "recap",
            Self::Credits => "credits",
            Self::Preview => "preview",
        }
    }

    /// Credits and previews may run to the end of the video.
    pub fn allows_open_end(self) -> bool {
        matches!(self, Self::Credits | Self::Preview)
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SegmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intro" => Ok(Self::Intro),
            "recap" => Ok(Self::Recap),
            "credits" => Ok(Self::Credits),
            "preview" => Ok(Self::Preview),
            other => Err(format!("unknown segment kind: {other}")),
        }
    }
}

/// Lookup key for the segment database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentQuery {
    pub catalog_id: u64,
    pub kind: MediaKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl SegmentQuery {
    /// Query parameters as sent on the wire. Season/episode only for TV.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tmdb_id", self.catalog_id.to_string())];
        if self.kind.is_tv() {
            params.push(("season", self.season.unwrap_or(1).to_string()));
            params.push(("episode", self.episode.unwrap_or(1).to_string()));
        }
        params
    }
}

/// A segment submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub tmdb_id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaKind,
    pub segment: SegmentKind,
    pub start_sec: f64,
    /// `None` means the segment runs to the end of the video.
    pub end_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl Submission {
    /// Check the submission before it goes over the wire.
    pub fn validate(&self) -> Result<(), String> {
        if !self.start_sec.is_finite() || self.start_sec < 0.0 {
            return Err("start time must be a non-negative number".into());
        }
        match self.end_sec {
            None if !self.segment.allows_open_end() => {
                return Err(format!("{} segments need an end time", self.segment));
            }
            Some(end) if end <= self.start_sec => {
                return Err("end time must be after start time".into());
            }
            _ => {}
        }
        if self.media_type.is_tv() && (self.season.is_none() || self.episode.is_none()) {
            return Err("TV submissions need a season and an episode".into());
        }
        if !self.media_type.is_tv() && (self.season.is_some() || self.episode.is_some()) {
            return Err("movie submissions cannot carry a season or episode".into());
        }
        Ok(())
    }
}

/// Community-wide submission counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityStats {
    #[serde(default)]
    pub total_submissions: u64,
}

/// Submission counters for one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub total: u64,
    pub accepted: u64,
    pub pending: u64,
    pub rejected: u64,
    pub acceptance_rate: f64,
    pub current_streak: u64,
    pub best_streak: u64,
    pub total_time_saved_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_submission() -> Submission {
        Submission {
            tmdb_id: 603,
            media_type: MediaKind::Movie,
            segment: SegmentKind::Credits,
            start_sec: 7800.0,
            end_sec: None,
            season: None,
            episode: None,
        }
    }

    #[test]
    fn test_submission_wire_shape() {
        let json = serde_json::to_value(movie_submission()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tmdb_id": 603,
                "type": "movie",
                "segment": "credits",
                "start_sec": 7800.0,
                "end_sec": null
            })
        );
    }

    #[test]
    fn test_submission_tv_fields() {
        let sub = Submission {
            media_type: MediaKind::Tv,
            segment: SegmentKind::Intro,
            start_sec: 10.0,
            end_sec: Some(70.5),
            season: Some(2),
            episode: Some(3),
            ..movie_submission()
        };
        assert!(sub.validate().is_ok());
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["season"], 2);
        assert_eq!(json["episode"], 3);
        assert_eq!(json["type"], "tv");
    }

    #[test]
    fn test_submission_validation() {
        assert!(movie_submission().validate().is_ok());

        let open_intro = Submission {
            segment: SegmentKind::Intro,
            ..movie_submission()
        };
        assert!(open_intro.validate().is_err());

        let backwards = Submission {
            end_sec: Some(10.0),
            ..movie_submission()
        };
        assert!(backwards.validate().is_err());

        let tv_missing_episode = Submission {
            media_type: MediaKind::Tv,
            season: Some(1),
            ..movie_submission()
        };
        assert!(tv_missing_episode.validate().is_err());
    }

    #[test]
    fn test_segment_query_params() {
        let movie = SegmentQuery {
            catalog_id: 603,
            kind: MediaKind::Movie,
            season: Some(9),
            episode: None,
        };
        assert_eq!(movie.params(), vec![("tmdb_id", "603".to_string())]);

        let tv = SegmentQuery {
            catalog_id: 1399,
            kind: MediaKind::Tv,
            season: Some(3),
            episode: None,
        };
        assert_eq!(
            tv.params(),
            vec![
                ("tmdb_id", "1399".to_string()),
                ("season", "3".to_string()),
                ("episode", "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_segment_kind_parse() {
        assert_eq!("Credits".parse::<SegmentKind>(), Ok(SegmentKind::Credits));
        assert!("outro".parse::<SegmentKind>().is_err());
        assert!(SegmentKind::Preview.allows_open_end());
        assert!(!SegmentKind::Recap.allows_open_end());
    }

    #[test]
    fn test_user_stats_partial() {
        let stats: UserStats = serde_json::from_str(r#"{"total": 12, "accepted": 9}"#).unwrap();
        assert_eq!(stats.total, 12);
        assert_eq!(stats.accepted, 9);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.total_time_saved_ms, None);
    }
}
