use introskip_api::{CatalogService, SegmentQuery, SegmentService};
use introskip_detect::MediaContext;

use crate::models::DiscoveryResult;
use crate::resolver::{self, Resolution};
use crate::segments::{self, SegmentFetch};

/// Resolve `ctx` and fetch its segments, one step after the other.
#[tracing::instrument(skip_all, fields(title = %ctx.title))]
pub async fn resolve_and_fetch<C, S>(catalog: &C, segment_db: &S, ctx: &MediaContext) -> DiscoveryResult
where
    C: CatalogService,
    S: SegmentService,
{
    let identity = match resolver::resolve(catalog, ctx).await {
        Resolution::Resolved(identity) => identity,
        Resolution::NotFound => return DiscoveryResult::not_found(),
    };

    let query = SegmentQuery {
        catalog_id: identity.catalog_id,
        kind: ctx.kind,
        season: identity.season,
        episode: identity.episode,
    };
    let result = match segments::fetch_segments(segment_db, &query).await {
        SegmentFetch::Segments(segs) => DiscoveryResult::success(identity.catalog_id, segs),
        SegmentFetch::NoData => DiscoveryResult::no_data(Some(identity.catalog_id)),
    };
    tracing::info!(
        catalog_id = identity.catalog_id,
        season = ?identity.season,
        episode = ?identity.episode,
        status = %result.status,
        segments = result.segments.len(),
        "Discovery finished"
    );
    result
}
