pub mod context;
pub mod generic;
pub mod json_ld;
pub mod sites;

use std::sync::LazyLock;

use introskip_parse::title;

pub use context::{MediaContext, MediaKind, PageMeta, PageSignals};
pub use sites::{Handler, SiteDatabase, SiteDef, SiteExtractor, UrlMatcher};

static EMBEDDED_SITES: LazyLock<SiteDatabase> = LazyLock::new(SiteDatabase::embedded);

/// URL schemes extensions cannot run on.
const RESTRICTED_PREFIXES: &[&str] = &["chrome://", "edge://", "about:", "moz-extension://"];

/// Extract a media context from the bare page signals.
pub fn extract(
    url: &str,
    document_title: &str,
    body_text: &str,
    playback_seconds: f64,
) -> MediaContext {
    extract_with(
        &EMBEDDED_SITES,
        &PageSignals::new(url, document_title, body_text, playback_seconds),
    )
}

/// Extract a media context from a full page snapshot.
///
/// The document title is first replaced by the best structured title the
/// page offers (JSON-LD, then `h1`, then `og:title`) and cleaned of
/// streaming-page noise before site dispatch.
pub fn extract_page(signals: &PageSignals) -> MediaContext {
    extract_page_with(&EMBEDDED_SITES, signals)
}

/// [`extract_page`] against a caller-provided site database.
pub fn extract_page_with(db: &SiteDatabase, signals: &PageSignals) -> MediaContext {
    let meta = &signals.meta;
    let preferred = json_ld::series_title(&meta.json_ld)
        .or_else(|| non_empty(meta.h1.as_deref()))
        .or_else(|| non_empty(meta.og_title.as_deref()))
        .unwrap_or_else(|| signals.document_title.clone());

    let cleaned = title::clean_page_title(&preferred);
    let mut prepared = signals.clone();
    if !cleaned.is_empty() {
        prepared.document_title = cleaned;
    }
    extract_with(db, &prepared)
}

/// Dispatch to the first site that accepts the URL, else the generic extractor.
pub fn extract_with(db: &SiteDatabase, signals: &PageSignals) -> MediaContext {
    let ctx = match db.match_url(&signals.url) {
        Some(site) => {
            tracing::debug!(site = site.name(), url = %signals.url, "Site extractor matched");
            site.extract(signals)
        }
        None => {
            tracing::debug!(url = %signals.url, "No site matched, using generic extractor");
            generic::extract(signals)
        }
    };
    tracing::debug!(
        title = %ctx.title,
        kind = %ctx.kind,
        catalog_id = ?ctx.catalog_id,
        season = ?ctx.season,
        episode = ?ctx.episode,
        episode_id = ?ctx.episode_id,
        "Extracted media context"
    );
    ctx
}

/// Whether `title` is a stand-in rather than a real show or film name:
/// a site display name returned when cleaning failed, or a loading string.
pub fn is_placeholder_title(title: &str) -> bool {
    title::is_junk_title(title) || EMBEDDED_SITES.is_site_name(title)
}

/// Browser-internal pages that never carry playable media.
pub fn is_restricted_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    RESTRICTED_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
