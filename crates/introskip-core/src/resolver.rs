//! Catalog id and episode resolution for an extracted media context.
//!
//! Every network step degrades instead of failing: a search error means no
//! match, a failed season fetch is skipped, and so on. The caller only ever
//! sees [`Resolution::Resolved`] or [`Resolution::NotFound`].

use serde::{Deserialize, Serialize};

use introskip_api::{CatalogHit, CatalogService};
use introskip_detect::{is_placeholder_title, MediaContext, MediaKind};

use crate::normalize::titles_match;

/// Catalog id plus the episode to look up. Computed per attempt, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub catalog_id: u64,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedIdentity),
    NotFound,
}

impl Resolution {
    pub fn identity(&self) -> Option<ResolvedIdentity> {
        match self {
            Self::Resolved(id) => Some(*id),
            Self::NotFound => None,
        }
    }
}

/// Resolve `ctx` against the catalog.
#[tracing::instrument(skip(catalog, ctx), fields(title = %ctx.title, kind = %ctx.kind))]
pub async fn resolve<C: CatalogService>(catalog: &C, ctx: &MediaContext) -> Resolution {
    let catalog_id = match ctx.catalog_id {
        Some(id) => Some(id),
        None => search_catalog_id(catalog, ctx).await,
    };
    let Some(catalog_id) = catalog_id else {
        tracing::debug!("No catalog match");
        return Resolution::NotFound;
    };

    if ctx.kind == MediaKind::Movie {
        return Resolution::Resolved(ResolvedIdentity {
            catalog_id,
            season: None,
            episode: None,
        });
    }

    if let Some(episode_id) = ctx.episode_id {
        return reverse_episode_lookup(catalog, catalog_id, episode_id).await;
    }

    let (season, episode) = match (ctx.season, ctx.episode) {
        (None, None) => (Some(1), Some(1)),
        other => other,
    };
    Resolution::Resolved(ResolvedIdentity {
        catalog_id,
        season,
        episode,
    })
}

/// Whether `title` is worth a catalog search.
pub fn is_searchable_title(title: &str) -> bool {
    title.trim().chars().count() > 2 && !is_placeholder_title(title)
}

async fn search_catalog_id<C: CatalogService>(catalog: &C, ctx: &MediaContext) -> Option<u64> {
    if !is_searchable_title(&ctx.title) {
        tracing::debug!("Title not searchable yet");
        return None;
    }
    let year = ctx.release_year.as_deref();
    match catalog.search(&ctx.title, ctx.kind, year).await {
        Ok(hits) => {
            let picked = pick_match(&hits, &ctx.title, year);
            tracing::debug!(results = hits.len(), picked = ?picked, "Catalog search done");
            picked
        }
        Err(e) => {
            tracing::warn!(error = %e, "Catalog search failed");
            None
        }
    }
}

/// Choose the best search hit for `title`.
///
/// With a year: first hit from that year whose title matches, then first hit
/// from that year. Then the first title match, then the top result.
pub fn pick_match(hits: &[CatalogHit], title: &str, year: Option<&str>) -> Option<u64> {
    let same_year = |hit: &&CatalogHit| {
        year.is_some_and(|y| !y.is_empty() && hit.release_date.starts_with(y))
    };
    let same_title = |hit: &&CatalogHit| titles_match(&hit.title, title);

    hits.iter()
        .find(|h| same_year(h) && same_title(h))
        .or_else(|| hits.iter().find(same_year))
        .or_else(|| hits.iter().find(same_title))
        .or_else(|| hits.first())
        .map(|h| h.id)
}

/// Find which season/episode an opaque episode id belongs to.
///
/// Seasons are scanned in order, one request at a time. A season that fails
/// to load is skipped.
async fn reverse_episode_lookup<C: CatalogService>(
    catalog: &C,
    catalog_id: u64,
    episode_id: u64,
) -> Resolution {
    let details = match catalog.show_details(catalog_id).await {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(catalog_id, error = %e, "Show details fetch failed");
            return Resolution::NotFound;
        }
    };

    for season in 1..=details.season_count {
        let episodes = match catalog.season_episodes(catalog_id, season).await {
            Ok(eps) => eps,
            Err(e) => {
                tracing::warn!(catalog_id, season, error = %e, "Season fetch failed, skipping");
                continue;
            }
        };
        if let Some(ep) = episodes.iter().find(|ep| ep.episode_id == episode_id) {
            tracing::debug!(
                catalog_id,
                episode_id,
                season,
                episode = ep.episode_number,
                "Reverse episode lookup matched"
            );
            return Resolution::Resolved(ResolvedIdentity {
                catalog_id,
                season: Some(season),
                episode: Some(ep.episode_number),
            });
        }
    }

    tracing::debug!(catalog_id, episode_id, seasons = details.season_count, "Episode id not found in any season");
    Resolution::NotFound
}
