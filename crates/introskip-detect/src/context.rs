use serde::{Deserialize, Serialize};

use introskip_parse::title;

/// Movie vs. episodic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    pub fn is_tv(&self) -> bool {
        matches!(self, Self::Tv)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a page says is playing, derived once per page view.
///
/// An empty or very short `title` is valid and means "not resolved yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaContext {
    pub title: String,
    pub catalog_id: Option<u64>,
    pub kind: MediaKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Opaque per-episode id some sites put in the URL instead of season/episode.
    pub episode_id: Option<u64>,
    pub playback_seconds: f64,
    pub release_year: Option<String>,
}

impl MediaContext {
    pub fn new(title: impl Into<String>, kind: MediaKind, playback_seconds: f64) -> Self {
        Self {
            title: title.into(),
            catalog_id: None,
            kind,
            season: None,
            episode: None,
            episode_id: None,
            playback_seconds,
            release_year: None,
        }
    }

    /// Enforce kind invariants and pull a trailing `(YYYY)` out of the title.
    ///
    /// Movies never carry season, episode or episode id.
    pub fn finish(mut self) -> Self {
        if self.kind == MediaKind::Movie {
            self.season = None;
            self.episode = None;
            self.episode_id = None;
        }
        if self.release_year.is_none() {
            let (clean, year) = title::split_release_year(&self.title);
            self.title = clean;
            self.release_year = year;
        }
        self
    }

    /// Whether the title is long enough to be worth resolving.
    pub fn is_ready(&self) -> bool {
        self.title.trim().chars().count() > 2
    }
}

/// Optional page metadata gathered alongside the document title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub og_title: Option<String>,
    pub twitter_title: Option<String>,
    pub h1: Option<String>,
    /// Raw `application/ld+json` script contents.
    #[serde(default)]
    pub json_ld: Vec<String>,
}

/// Everything an extractor may look at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSignals {
    pub url: String,
    pub document_title: String,
    pub body_text: String,
    pub playback_seconds: f64,
    #[serde(default)]
    pub meta: PageMeta,
}

impl PageSignals {
    pub fn new(
        url: impl Into<String>,
        document_title: impl Into<String>,
        body_text: impl Into<String>,
        playback_seconds: f64,
    ) -> Self {
        Self {
            url: url.into(),
            document_title: document_title.into(),
            body_text: body_text.into(),
            playback_seconds,
            meta: PageMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = meta;
        self
    }
}
