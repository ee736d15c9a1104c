use crate::analyzers::types::RawTrackEntry;
use crate::error::{AnalyzerError, Result};
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, FetchError, HttpClient, RetryPolicy, fetch_json, with_retry};
use crate::infra::keys::SpotifyCredentials;
use crate::infra::spotify::identifier;
use crate::services::catalog_api::{AnalysisKind, CatalogApi, Collection};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const API_BASE: &str = "https://api.spotify.com/v1";

/// Upper bound on followed `next` links for one playlist.
const MAX_PAGES: usize = 1_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct SpotifyClient<C> {
    http: C,
    api_base: String,
    market: String,
    retry: RetryPolicy,
}

impl SpotifyClient<ApiKey<BasicClient>> {
    /// Exchanges the client credentials for an access token and returns a
    /// client that sends it with every request.
    pub async fn connect(
        credentials: &SpotifyCredentials,
        market: &str,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let basic = BasicClient::with_timeouts(REQUEST_TIMEOUT, CONNECT_TIMEOUT).map_err(|e| {
            AnalyzerError::SourceUnavailable(format!("failed to build HTTP client: {e}"))
        })?;

        let token = exchange_token(&basic, TOKEN_URL, credentials).await?;

        let http = ApiKey::bearer(basic, &token).map_err(|_| {
            AnalyzerError::Authentication("token endpoint returned an unusable access token".into())
        })?;

        Ok(Self::with_client(http, API_BASE, market, retry))
    }
}

/// Client-credentials grant against `token_url`.
///
/// 4xx answers mean the credentials were rejected; anything else that goes
/// wrong is reported as the source being unavailable.
#[tracing::instrument(skip_all, fields(client_id = %credentials.client_id))]
async fn exchange_token<H: HttpClient>(
    http: &H,
    token_url: &str,
    credentials: &SpotifyCredentials,
) -> Result<String> {
    let request = token_request(token_url, credentials).map_err(|e| {
        AnalyzerError::SourceUnavailable(format!("failed to build token request: {e}"))
    })?;

    let response = http.execute(request).await.map_err(|e| {
        AnalyzerError::SourceUnavailable(format!("failed to send token request: {e}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("token exchange failed with status {status}: {body}");
        return Err(if status.is_client_error() {
            AnalyzerError::Authentication(message)
        } else {
            AnalyzerError::SourceUnavailable(message)
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        AnalyzerError::SourceUnavailable(format!("failed to read token response: {e}"))
    })?;
    let token: TokenResponse = serde_json::from_slice(&bytes).map_err(|e| {
        AnalyzerError::SourceUnavailable(format!("failed to parse token response: {e}"))
    })?;

    debug!("Access token acquired");
    Ok(token.access_token)
}

fn token_request(
    token_url: &str,
    credentials: &SpotifyCredentials,
) -> reqwest::Result<reqwest::Request> {
    reqwest::Client::builder()
        .build()?
        .post(token_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .build()
}

impl<C: HttpClient> SpotifyClient<C> {
    /// Wraps an already authenticated HTTP client.
    pub fn with_client(http: C, api_base: &str, market: &str, retry: RetryPolicy) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            market: market.to_string(),
            retry,
        }
    }

    async fn get(&self, url: &str) -> std::result::Result<Value, FetchError> {
        with_retry(&self.retry, url, || fetch_json(&self.http, url)).await
    }

    #[tracing::instrument(skip(self))]
    async fn load_playlist(&self, identifier: &str) -> Result<Collection> {
        let kind = AnalysisKind::Playlist;
        let id = identifier::playlist_id(identifier)
            .ok_or_else(|| AnalyzerError::resolution(kind, identifier))?;

        let url = format!("{}/playlists/{}", self.api_base, id);
        let playlist = self
            .get(&url)
            .await
            .map_err(|e| lookup_error(e, kind, identifier))?;

        let name = playlist["name"].as_str().unwrap_or_default().to_string();
        let tracks = &playlist["tracks"];
        let mut entries = page_entries(tracks);
        let mut next = next_page(tracks);
        let mut pages = 1;

        while let Some(url) = next {
            if pages >= MAX_PAGES {
                return Err(AnalyzerError::SourceUnavailable(format!(
                    "playlist '{name}' has more than {MAX_PAGES} pages"
                )));
            }
            let page = self.get(&url).await.map_err(unavailable)?;
            entries.extend(page_entries(&page));
            next = next_page(&page);
            pages += 1;
        }

        info!(playlist = %name, tracks = entries.len(), pages, "Playlist loaded");

        Ok(Collection {
            kind,
            image_url: first_image(&playlist),
            name,
            entries,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn load_artist(&self, identifier: &str) -> Result<Collection> {
        let kind = AnalysisKind::Artist;

        let mut artist = None;
        if let Some(id) = identifier::artist_id(identifier) {
            match self.get(&format!("{}/artists/{}", self.api_base, id)).await {
                Ok(found) => artist = Some(found),
                Err(e) if e.is_transient() => return Err(unavailable(e)),
                Err(e) => {
                    warn!(artist_id = %id, error = %e, "Artist lookup failed, searching by name")
                }
            }
        }

        let artist = match artist {
            Some(artist) => artist,
            None => self.search_artist(identifier).await?,
        };

        let artist_id = artist["id"]
            .as_str()
            .ok_or_else(|| AnalyzerError::resolution(kind, identifier))?;
        let artist_name = artist["name"].as_str().unwrap_or_default().to_string();

        let url = format!(
            "{}/artists/{}/top-tracks?market={}",
            self.api_base, artist_id, self.market
        );
        let top = self.get(&url).await.map_err(unavailable)?;

        let entries: Vec<RawTrackEntry> = top["tracks"]
            .as_array()
            .map(|tracks| {
                tracks
                    .iter()
                    .filter_map(|t| entry_from_track(t, Some(&artist_name)))
                    .collect()
            })
            .unwrap_or_default();

        info!(artist = %artist_name, tracks = entries.len(), "Artist top tracks loaded");

        Ok(Collection {
            kind,
            name: format!("Top tracks of {artist_name}"),
            image_url: first_image(&artist),
            entries,
        })
    }

    async fn search_artist(&self, identifier: &str) -> Result<Value> {
        let kind = AnalysisKind::Artist;
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search", self.api_base),
            &[
                ("q", format!("artist:{identifier}")),
                ("type", "artist".to_string()),
                ("limit", "1".to_string()),
            ],
        )
        .map_err(|e| AnalyzerError::SourceUnavailable(format!("invalid search URL: {e}")))?;

        let results = self
            .get(url.as_str())
            .await
            .map_err(|e| lookup_error(e, kind, identifier))?;

        let first = &results["artists"]["items"][0];
        if !first.is_object() {
            return Err(AnalyzerError::resolution(kind, identifier));
        }
        Ok(first.clone())
    }
}

#[async_trait]
impl<C: HttpClient> CatalogApi for SpotifyClient<C> {
    async fn playlist(&self, identifier: &str) -> Result<Collection> {
        self.load_playlist(identifier).await
    }

    async fn artist_top_tracks(&self, identifier: &str) -> Result<Collection> {
        self.load_artist(identifier).await
    }
}

/// Converts a track object; `null` (removed or unavailable tracks) yields `None`.
fn entry_from_track(track: &Value, artist_override: Option<&str>) -> Option<RawTrackEntry> {
    if !track.is_object() {
        return None;
    }

    let artist = match artist_override {
        Some(name) => name.to_string(),
        None => track["artists"][0]["name"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    };

    Some(RawTrackEntry {
        id: track["id"].as_str().map(str::to_string),
        name: track["name"].as_str().unwrap_or_default().to_string(),
        artist,
        popularity: track["popularity"]
            .as_i64()
            .and_then(|p| i32::try_from(p).ok()),
    })
}

fn page_entries(page: &Value) -> Vec<RawTrackEntry> {
    page["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| entry_from_track(&item["track"], None))
                .collect()
        })
        .unwrap_or_default()
}

fn next_page(page: &Value) -> Option<String> {
    page["next"].as_str().map(str::to_string)
}

fn first_image(entity: &Value) -> Option<String> {
    entity["images"][0]["url"].as_str().map(str::to_string)
}

fn lookup_error(e: FetchError, kind: AnalysisKind, identifier: &str) -> AnalyzerError {
    if e.is_not_found() {
        debug!(error = %e, "Catalog lookup returned not found");
        AnalyzerError::resolution(kind, identifier)
    } else {
        unavailable(e)
    }
}

fn unavailable(e: FetchError) -> AnalyzerError {
    AnalyzerError::SourceUnavailable(e.to_string())
}
