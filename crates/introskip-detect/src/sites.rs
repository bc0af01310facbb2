use regex::Regex;
use serde::{Deserialize, Serialize};

use introskip_parse::season_episode::{self, Pattern, SeasonEpisode, DEFAULT_CASCADE};
use introskip_parse::title;

use crate::context::{MediaContext, MediaKind, PageSignals};

/// Embedded site database.
const EMBEDDED_DB: &str = include_str!("../data/sites.toml");

/// Media-kind rule for a site's URL layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handler {
    /// TV if the body shows a season/episode, movie otherwise.
    BodyText,
    Max,
    Hdrezka,
    ParamountPlus,
    Peacock,
    Plex,
    PrimeVideo,
}

/// Definition of a streaming site and how to read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDef {
    pub name: String,
    #[serde(default)]
    pub url_patterns: Vec<String>,
    #[serde(default)]
    pub host_contains: Option<String>,
    #[serde(default)]
    pub brand_pattern: Option<String>,
    #[serde(default = "default_true")]
    pub cut_separator: bool,
    #[serde(default)]
    pub meta_first: bool,
    #[serde(default)]
    pub brand_keyword: Option<String>,
    #[serde(default)]
    pub cascade: Option<Vec<Pattern>>,
    #[serde(default = "default_handler")]
    pub handler: Handler,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_handler() -> Handler {
    Handler::BodyText
}

/// Wrapper for TOML deserialization.
#[derive(Debug, Deserialize)]
struct SiteDbFile {
    #[serde(rename = "site")]
    sites: Vec<SiteDef>,
}

/// How a site entry decides whether it owns a URL.
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    Pattern(Regex),
    HostContains(String),
}

impl UrlMatcher {
    pub fn accepts(&self, url: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(url),
            Self::HostContains(needle) => url::Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
                .is_some_and(|host| host.contains(needle.as_str())),
        }
    }
}

/// A compiled site entry.
#[derive(Debug, Clone)]
pub struct SiteExtractor {
    def: SiteDef,
    matchers: Vec<UrlMatcher>,
    brand: Option<Regex>,
}

impl SiteExtractor {
    fn compile(def: SiteDef) -> Self {
        let mut matchers: Vec<UrlMatcher> = def
            .url_patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(UrlMatcher::Pattern(re)),
                Err(e) => {
                    tracing::warn!(site = %def.name, pattern = %p, error = %e, "Invalid URL pattern");
                    None
                }
            })
            .collect();
        if let Some(needle) = &def.host_contains {
            matchers.push(UrlMatcher::HostContains(needle.to_lowercase()));
        }
        let brand = def.brand_pattern.as_deref().and_then(|p| Regex::new(p).ok());
        Self {
            def,
            matchers,
            brand,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn accepts(&self, url: &str) -> bool {
        self.def.enabled && self.matchers.iter().any(|m| m.accepts(url))
    }

    /// Run this site's extraction over the page.
    pub fn extract(&self, signals: &PageSignals) -> MediaContext {
        let title = self.title(signals);
        let found = self.season_episode(&signals.body_text);
        let (kind, se) = classify(self.def.handler, &signals.url, found);

        let mut ctx = MediaContext::new(
            if title.is_empty() { self.def.name.clone() } else { title },
            kind,
            signals.playback_seconds,
        );
        if let Some(se) = se {
            ctx.season = Some(se.season);
            ctx.episode = Some(se.episode);
        }
        ctx.finish()
    }

    /// Cleaned title, following the site's fallback chain.
    fn title(&self, signals: &PageSignals) -> String {
        let meta = &signals.meta;
        let candidates = if self.def.meta_first {
            [
                meta.og_title.as_deref(),
                meta.twitter_title.as_deref(),
                Some(signals.document_title.as_str()),
            ]
        } else {
            [
                Some(signals.document_title.as_str()),
                meta.og_title.as_deref(),
                meta.twitter_title.as_deref(),
            ]
        };
        let mut raw = candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .unwrap_or_default()
            .to_string();

        if let Some(keyword) = &self.def.brand_keyword {
            if raw.is_empty() || raw.to_lowercase().contains(keyword.as_str()) {
                if let Some(line) = title::first_line(&signals.body_text) {
                    raw = line;
                }
            }
        }

        let stripped = match &self.brand {
            Some(re) => title::strip_brand(&raw, re),
            None => raw.trim().to_string(),
        };
        if self.def.cut_separator {
            title::cut_at_separator(&stripped).to_string()
        } else {
            stripped
        }
    }

    fn season_episode(&self, body: &str) -> Option<SeasonEpisode> {
        let cascade = self.def.cascade.as_deref().unwrap_or(DEFAULT_CASCADE);
        season_episode::parse_with(body, cascade)
    }
}

/// Decide media kind and which season/episode survives, per site layout.
fn classify(
    handler: Handler,
    url: &str,
    found: Option<SeasonEpisode>,
) -> (MediaKind, Option<SeasonEpisode>) {
    let path = url_path(url);
    let first_segment = path.split('/').find(|s| !s.is_empty()).unwrap_or_default();
    let tv_if_found = if found.is_some() {
        MediaKind::Tv
    } else {
        MediaKind::Movie
    };

    match handler {
        Handler::BodyText => (tv_if_found, found),
        Handler::Max => {
            let kind = if first_segment == "movie" {
                MediaKind::Movie
            } else {
                MediaKind::Tv
            };
            (kind, found.filter(|_| first_segment == "video"))
        }
        Handler::Hdrezka => {
            let kind = if matches!(first_segment, "series" | "animation" | "cartoons") {
                MediaKind::Tv
            } else {
                MediaKind::Movie
            };
            let media_page = matches!(
                first_segment,
                "films" | "series" | "cartoons" | "animation"
            ) && path
                .trim_start_matches('/')
                .split_once('/')
                .is_some_and(|(_, rest)| !rest.is_empty());
            (kind, found.filter(|_| media_page && kind.is_tv()))
        }
        Handler::ParamountPlus => {
            let lower = path.to_lowercase();
            let kind = if lower.contains("/movies/") {
                MediaKind::Movie
            } else {
                MediaKind::Tv
            };
            let shows_video = lower
                .find("/shows/")
                .is_some_and(|i| lower[i + "/shows/".len()..].contains("/video/"));
            (kind, found.filter(|_| shows_video))
        }
        Handler::Peacock => {
            let playback = path.contains("/watch/playback") || path.contains("/watch/asset");
            (tv_if_found, found.filter(|_| playback))
        }
        Handler::Plex => {
            let vod = url.contains("tv.plex.provider.vod") || url.contains("/server/");
            if vod {
                (tv_if_found, found)
            } else {
                (MediaKind::Movie, None)
            }
        }
        Handler::PrimeVideo => {
            if path.contains("/movie/") {
                (MediaKind::Movie, None)
            } else if path.contains("/tv/") || found.is_some() {
                (MediaKind::Tv, found)
            } else {
                (MediaKind::Movie, None)
            }
        }
    }
}

/// Path component of `url`, or empty when it does not parse.
fn url_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default()
}

/// Database of sites with dedicated extraction rules.
#[derive(Debug, Clone)]
pub struct SiteDatabase {
    sites: Vec<SiteExtractor>,
}

impl SiteDatabase {
    /// Load the embedded site database.
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_DB).expect("embedded sites.toml should be valid")
    }

    /// Load a site database from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let db: SiteDbFile = toml::from_str(toml_str)?;
        Ok(Self {
            sites: db.sites.into_iter().map(SiteExtractor::compile).collect(),
        })
    }

    /// Merge a user database into this one.
    /// Sites with matching names are replaced; new sites are appended.
    pub fn merge_user(&mut self, user_db: &SiteDatabase) {
        for user_site in &user_db.sites {
            match self.sites.iter().position(|s| s.name() == user_site.name()) {
                Some(pos) => self.sites[pos] = user_site.clone(),
                None => self.sites.push(user_site.clone()),
            }
        }
    }

    /// Find the first enabled site that accepts `url`.
    pub fn match_url(&self, url: &str) -> Option<&SiteExtractor> {
        self.sites.iter().find(|s| s.accepts(url))
    }

    /// Whether `title` is one of the site names used as a fallback title.
    pub fn is_site_name(&self, title: &str) -> bool {
        let needle = title.trim();
        self.sites
            .iter()
            .any(|s| s.name().eq_ignore_ascii_case(needle))
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
