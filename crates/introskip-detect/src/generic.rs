//! Fallback extractor for sites without a dedicated entry.
//!
//! Reads the catalog id and season/episode straight out of common URL
//! layouts used by TMDB-backed players (`/tv/<id>/<s>/<e>`,
//! `tmdb-tv-<id>-slug/<s>/<e>`, `/watch/<id>`, ...), then falls back to the
//! page text and finally to loose path fragments.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use introskip_parse::season_episode;
use introskip_parse::title;

use crate::context::{MediaContext, MediaKind, PageSignals};

/// Real-world season and episode numbers never exceed this.
const MAX_PLAUSIBLE_NUMBER: u32 = 999;

static RE_IS_TV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/tv/|tmdb-tv-\d+").unwrap());

static RE_TV_ID_SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/tv/(\d+)/(\d+)/(\d+)").unwrap());

static RE_TMDB_TV_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tmdb-tv-(\d+)(?:-[^/]*)?/(\d+)/(\d+)").unwrap());

static RE_WATCH_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/watch/(\d+)").unwrap());

static RE_KIND_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(?:tv|movie)/(\d+)").unwrap());

static RE_MOVIE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/movie/(\d+)").unwrap());

static RE_TMDB_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)tmdb[/-](\d+)").unwrap());

static RE_WATCH_SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/watch/\d+/(\d+)/(\d+)").unwrap());

static RE_EPISODE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(?:episode|e)/(\d+)").unwrap());

static RE_SXEY_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)/s\d*e(\d+)").unwrap());

static RE_TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)(?:\?|$)").unwrap());

static RE_LOW_SIGNAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:XPrime|Cineby|Watching|Online|Free)\b").unwrap());

/// Parse capture group `i` as a number.
fn group<T: std::str::FromStr>(caps: &Captures<'_>, i: usize) -> Option<T> {
    caps.get(i)?.as_str().parse().ok()
}

/// Catalog id plus the byte range it was read from.
fn id_from(re: &Regex, url: &str) -> Option<(u64, Range<usize>)> {
    let caps = re.captures(url)?;
    let m = caps.get(1)?;
    Some((m.as_str().parse().ok()?, m.range()))
}

/// Run the generic extractor.
pub fn extract(signals: &PageSignals) -> MediaContext {
    let url = signals.url.as_str();
    let is_tv = RE_IS_TV.is_match(url);

    let mut catalog_id: Option<u64> = None;
    let mut id_span: Option<Range<usize>> = None;
    let mut season: Option<u32> = None;
    let mut episode: Option<u32> = None;
    let mut episode_id: Option<u64> = None;

    if is_tv {
        if let Some(caps) = RE_TV_ID_SEASON_EPISODE.captures(url) {
            catalog_id = group(&caps, 1);
            season = group(&caps, 2);
            episode = group(&caps, 3);
        }

        if catalog_id.is_none() {
            if let Some(caps) = RE_TMDB_TV_SLUG.captures(url) {
                catalog_id = group(&caps, 1);
                let first: Option<u32> = group(&caps, 2);
                let second: Option<u64> = group(&caps, 3);
                match (first, second) {
                    (Some(a), Some(b))
                        if a <= MAX_PLAUSIBLE_NUMBER && b <= u64::from(MAX_PLAUSIBLE_NUMBER) =>
                    {
                        season = Some(a);
                        episode = u32::try_from(b).ok();
                    }
                    (_, b) => episode_id = b,
                }
            }
        }

        if catalog_id.is_none() {
            if let Some((id, span)) = id_from(&RE_WATCH_ID, url)
                .or_else(|| id_from(&RE_KIND_ID, url))
                .or_else(|| id_from(&RE_TMDB_ID, url))
            {
                catalog_id = Some(id);
                id_span = Some(span);
            }
        }

        if season.is_none() && episode.is_none() && episode_id.is_none() {
            let from_url = RE_WATCH_SEASON_EPISODE
                .captures(url)
                .and_then(|caps| Some((group(&caps, 1)?, group(&caps, 2)?)));
            let from_body = || {
                season_episode::parse_default(&signals.body_text).map(|se| (se.season, se.episode))
            };
            if let Some((s, e)) = from_url.or_else(from_body) {
                season = Some(s);
                episode = Some(e);
            }

            if episode.is_none() {
                let guess = path_episode(url).or_else(|| trailing_episode(url, id_span.clone()));
                if let Some(n) = guess {
                    episode = Some(n);
                    if (1..=MAX_PLAUSIBLE_NUMBER).contains(&n) {
                        season = season.or(Some(1));
                    }
                }
            }
        }
    } else {
        catalog_id = id_from(&RE_MOVIE_ID, url)
            .or_else(|| id_from(&RE_TMDB_ID, url))
            .map(|(id, _)| id);
    }

    let cleaned = RE_LOW_SIGNAL.replace_all(&signals.document_title, "");
    let title = title::collapse_whitespace(title::cut_at_separator(&cleaned));

    let kind = if is_tv { MediaKind::Tv } else { MediaKind::Movie };
    let mut ctx = MediaContext::new(title, kind, signals.playback_seconds);
    ctx.catalog_id = catalog_id;
    ctx.season = season;
    ctx.episode = episode;
    ctx.episode_id = episode_id;
    ctx.finish()
}

/// `/episode/<n>`, `/e/<n>` or `/s<n>e<n>` in the path.
fn path_episode(url: &str) -> Option<u32> {
    RE_EPISODE_PATH
        .captures(url)
        .or_else(|| RE_SXEY_PATH.captures(url))
        .and_then(|caps| group(&caps, 1))
}

/// Last-resort guess: a small trailing number that is not the catalog id.
fn trailing_episode(url: &str, id_span: Option<Range<usize>>) -> Option<u32> {
    let caps = RE_TRAILING_NUMBER.captures(url)?;
    let m = caps.get(1)?;
    if id_span.is_some_and(|span| span == m.range()) {
        return None;
    }
    let n: u32 = m.as_str().parse().ok()?;
    (1..=MAX_PLAUSIBLE_NUMBER).contains(&n).then_some(n)
}
