pub mod discovery;
pub mod segment;
pub mod stats;

pub use discovery::{DiscoveryResult, DiscoveryStatus};
pub use segment::{NormalizedSegments, Segment, OPEN_END_SENTINEL_MS};
pub use stats::{format_duration, KindStats, SkipStats};

pub use introskip_api::SegmentKind;
pub use introskip_detect::{MediaContext, MediaKind};
