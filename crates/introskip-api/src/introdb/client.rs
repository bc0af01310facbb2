use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use url::Url;

use super::error::IntroDbError;
use super::types::error_message;
use crate::traits::{CommunityStats, SegmentQuery, SegmentService, Submission, UserStats};

/// Current API revision. Segment kinds are lists of ranges here.
pub const DEFAULT_BASE_URL: &str = "https://api.theintrodb.org/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// TheIntroDB client.
pub struct IntroDbClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl IntroDbClient {
    /// Build a client for `base_url`. A blank key is treated as no key.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, IntroDbError> {
        let parsed = Url::parse(base_url)?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            http,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("Bearer {key}")),
            None => req,
        }
    }

    fn require_auth(&self, req: RequestBuilder) -> Result<RequestBuilder, IntroDbError> {
        if self.api_key.is_none() {
            return Err(IntroDbError::Unauthorized);
        }
        Ok(self.with_auth(req))
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, IntroDbError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("IntroDB rejected the API key");
            return Err(IntroDbError::Unauthorized);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "IntroDB API error");
        Err(IntroDbError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, IntroDbError> {
        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| IntroDbError::Parse(e.to_string()))
    }
}

impl SegmentService for IntroDbClient {
    type Error = IntroDbError;

    async fn fetch_segments(&self, query: &SegmentQuery) -> Result<serde_json::Value, IntroDbError> {
        let params = query.params();
        tracing::debug!(catalog_id = query.catalog_id, kind = %query.kind, "Fetching segments");
        let req = self
            .http
            .get(self.endpoint("media"))
            .header("Accept", "application/json")
            .query(&params);
        let resp = self.with_auth(req).send().await?;
        Self::json(resp).await
    }

    async fn submit(&self, submission: &Submission) -> Result<(), IntroDbError> {
        submission.validate().map_err(IntroDbError::Invalid)?;
        let req = self.require_auth(self.http.post(self.endpoint("submit")))?;
        let resp = req.json(submission).send().await?;
        Self::check_response(resp).await?;
        tracing::info!(
            tmdb_id = submission.tmdb_id,
            segment = %submission.segment,
            "Segment submitted"
        );
        Ok(())
    }

    async fn community_stats(&self) -> Result<CommunityStats, IntroDbError> {
        let resp = self.http.get(self.endpoint("stats")).send().await?;
        Self::json(resp).await
    }

    async fn user_stats(&self) -> Result<UserStats, IntroDbError> {
        let req = self.require_auth(self.http.get(self.endpoint("user/stats")))?;
        let resp = req.send().await?;
        Self::json(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let client = IntroDbClient::new(DEFAULT_BASE_URL, None).unwrap();
        assert_eq!(client.endpoint("media"), "https://api.theintrodb.org/v2/media");
        assert_eq!(client.endpoint("/user/stats"), "https://api.theintrodb.org/v2/user/stats");

        let client = IntroDbClient::new("http://localhost:8080/v1/", None).unwrap();
        assert_eq!(client.endpoint("submit"), "http://localhost:8080/v1/submit");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            IntroDbClient::new("not a url", None),
            Err(IntroDbError::BaseUrl(_))
        ));
    }

    #[test]
    fn test_blank_key_is_no_key() {
        let client = IntroDbClient::new(DEFAULT_BASE_URL, Some("   ".into())).unwrap();
        assert!(!client.has_api_key());
        let client = IntroDbClient::new(DEFAULT_BASE_URL, Some(" k1 ".into())).unwrap();
        assert_eq!(client.api_key.as_deref(), Some("k1"));
    }

    #[tokio::test]
    async fn test_authenticated_calls_need_key() {
        let client = IntroDbClient::new(DEFAULT_BASE_URL, None).unwrap();
        assert!(matches!(
            client.user_stats().await,
            Err(IntroDbError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_submit_validates_first() {
        use crate::traits::SegmentKind;
        use introskip_detect::MediaKind;

        let client = IntroDbClient::new(DEFAULT_BASE_URL, Some("key".into())).unwrap();
        let sub = Submission {
            tmdb_id: 1,
            media_type: MediaKind::Movie,
            segment: SegmentKind::Intro,
            start_sec: 5.0,
            end_sec: None,
            season: None,
            episode: None,
        };
        assert!(matches!(client.submit(&sub).await, Err(IntroDbError::Invalid(_))));
    }
}
