//! Messages exchanged between a page's content session and the background
//! service.

use serde::{Deserialize, Serialize};

use introskip_core::models::{DiscoveryResult, MediaContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum Request {
    /// Ask the page what is playing. Answered by the content session.
    GetPlayerInfo,
    /// Resolve the context and fetch its segments.
    ResolveAndFetch(MediaContext),
    /// Last cached result for the sender's tab.
    GetStoredIntroData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Response {
    PlayerInfo(Option<MediaContext>),
    Discovery(DiscoveryResult),
}

impl Response {
    /// The discovery result carried by this response, if any.
    pub fn into_discovery(self) -> Option<DiscoveryResult> {
        match self {
            Self::Discovery(result) => Some(result),
            Self::PlayerInfo(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use introskip_core::models::MediaKind;

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_value(Request::GetStoredIntroData).unwrap();
        assert_eq!(json["action"], "getStoredIntroData");

        let ctx = MediaContext::new("Dark", MediaKind::Tv, 12.0);
        let json = serde_json::to_value(Request::ResolveAndFetch(ctx.clone())).unwrap();
        assert_eq!(json["action"], "resolveAndFetch");
        assert_eq!(json["data"]["title"], "Dark");
        assert_eq!(json["data"]["kind"], "tv");

        let back: Request = serde_json::from_value(json).unwrap();
        assert_eq!(back, Request::ResolveAndFetch(ctx));
    }

    #[test]
    fn test_player_info_null() {
        let json = serde_json::to_value(Response::PlayerInfo(None)).unwrap();
        assert_eq!(json["type"], "playerInfo");
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_into_discovery() {
        let resp = Response::Discovery(DiscoveryResult::not_found());
        assert_eq!(resp.into_discovery(), Some(DiscoveryResult::not_found()));
        assert_eq!(Response::PlayerInfo(None).into_discovery(), None);
    }
}
