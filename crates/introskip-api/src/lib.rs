pub mod introdb;
pub mod tmdb;
pub mod traits;

pub use introdb::{IntroDbClient, IntroDbError};
pub use tmdb::{TmdbClient, TmdbError};
pub use traits::{
    CatalogHit, CatalogService, CommunityStats, EpisodeRef, SegmentKind, SegmentQuery,
    SegmentService, ShowDetails, Submission, UserStats,
};
