use std::time::Duration;

use reqwest::Client;

use introskip_detect::MediaKind;

use super::error::TmdbError;
use super::types::{TmdbErrorBody, TmdbSearchResponse, TmdbSeason, TmdbShow};
use crate::traits::{CatalogHit, CatalogService, EpisodeRef, ShowDetails};

const BASE_URL: &str = "https://api.themoviedb.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// TMDB v3 client, authenticated with a read access token.
pub struct TmdbClient {
    token: String,
    base_url: String,
    http: Client,
}

impl TmdbClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, BASE_URL.to_string())
    }

    /// Point the client at another host (proxies, tests).
    pub fn with_base_url(token: String, base_url: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn auth_header(&self) -> Result<String, TmdbError> {
        if self.token.trim().is_empty() {
            return Err(TmdbError::MissingToken);
        }
        Ok(format!("Bearer {}", self.token.trim()))
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TmdbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TmdbErrorBody>(&body)
                .ok()
                .and_then(|b| b.status_message)
                .unwrap_or(body);
            tracing::warn!(status, "TMDB API error");
            Err(TmdbError::Api { status, message })
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("Authorization", self.auth_header()?)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))
    }
}

/// Search endpoint and query parameters for a title lookup.
///
/// TMDB filters movies by `year` and shows by `first_air_date_year`.
pub fn search_request(
    title: &str,
    kind: MediaKind,
    year: Option<&str>,
) -> (String, Vec<(&'static str, String)>) {
    let path = format!("/3/search/{}", kind.as_str());
    let mut query = vec![("query", title.to_string())];
    if let Some(year) = year.filter(|y| !y.is_empty()) {
        let key = if kind.is_tv() {
            "first_air_date_year"
        } else {
            "year"
        };
        query.push((key, year.to_string()));
    }
    (path, query)
}

impl CatalogService for TmdbClient {
    type Error = TmdbError;

    async fn search(
        &self,
        title: &str,
        kind: MediaKind,
        year: Option<&str>,
    ) -> Result<Vec<CatalogHit>, TmdbError> {
        let (path, query) = search_request(title, kind, year);
        tracing::debug!(title, kind = %kind, year, "TMDB search");
        let body: TmdbSearchResponse = self.get_json(&path, &query).await?;
        Ok(body.results.into_iter().map(|r| r.into_hit()).collect())
    }

    async fn show_details(&self, id: u64) -> Result<ShowDetails, TmdbError> {
        let show: TmdbShow = self.get_json(&format!("/3/tv/{id}"), &[]).await?;
        Ok(show.into())
    }

    async fn season_episodes(&self, id: u64, season: u32) -> Result<Vec<EpisodeRef>, TmdbError> {
        let body: TmdbSeason = self
            .get_json(&format!("/3/tv/{id}/season/{season}"), &[])
            .await?;
        Ok(body.episodes.into_iter().map(Into::into).collect())
    }
}
