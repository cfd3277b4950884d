//! # Music API Client
//!
//! Client for the OAuth-protected music-streaming API the app is layered on.
//!
//! The server talks to the API through the [`MusicApi`] trait so handlers can
//! be exercised against a fake. [`HttpMusicApi`] is the real implementation on
//! top of `reqwest`.
//!
//! Every authenticated call sends `Authorization: Bearer <token>`. Failures are
//! reported as [`MusicApiError`] and are never retried.

use crate::profile::UserProfile;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-top-read";

/// How many seeds of each kind a recommendation request takes.
pub const MAX_SEEDS: usize = 5;

/// Errors talking to the music API.
#[derive(Debug, Error)]
pub enum MusicApiError {
    #[error("Request to the music API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Music API answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected music API response: {0}")]
    Malformed(String),
}

/// OAuth client registration and endpoints.
#[derive(Debug, Clone)]
pub struct MusicApiConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_base: String,
    pub timeout_sec: u64,
}

impl Default for MusicApiConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            scope: DEFAULT_SCOPE.to_owned(),
            auth_url: DEFAULT_AUTH_URL.to_owned(),
            token_url: DEFAULT_TOKEN_URL.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
            timeout_sec: 10,
        }
    }
}

/// Result of the authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiArtist {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTrack {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Deserialize)]
struct Paging<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct CurrentUser {
    id: String,
}

/// Seeds for a recommendation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSeeds {
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl RecommendationSeeds {
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.tracks.is_empty() && self.genres.is_empty()
    }

    /// Query parameters for the request; empty seed lists are left out.
    pub fn query(&self, limit: u32) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = [
            ("seed_artists", &self.artists),
            ("seed_tracks", &self.tracks),
            ("seed_genres", &self.genres),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, values)| (key, values.join(",")))
        .collect();
        params.push(("limit", limit.to_string()));
        params
    }
}

/// Operations the app needs from the music API.
#[async_trait]
pub trait MusicApi: Send + Sync {
    /// URL the browser is sent to for the OAuth consent screen.
    fn authorize_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, MusicApiError>;

    async fn current_user_id(&self, token: &str) -> Result<String, MusicApiError>;

    async fn top_artists(&self, token: &str) -> Result<Vec<ApiArtist>, MusicApiError>;

    async fn top_tracks(&self, token: &str) -> Result<Vec<ApiTrack>, MusicApiError>;

    async fn recommendations(
        &self,
        token: &str,
        seeds: &RecommendationSeeds,
        limit: u32,
    ) -> Result<Value, MusicApiError>;

    async fn playlist(&self, token: &str, playlist_id: &str) -> Result<Value, MusicApiError>;

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<Value, MusicApiError>;

    async fn add_track(
        &self,
        token: &str,
        playlist_id: &str,
        track_uri: &str,
    ) -> Result<(), MusicApiError>;

    async fn remove_track(
        &self,
        token: &str,
        playlist_id: &str,
        track_uri: &str,
    ) -> Result<(), MusicApiError>;
}

/// Build a profile from the API's view of a user.
///
/// Genres are the union of the top artists' genres.
pub fn profile_from_top(user_id: &str, artists: &[ApiArtist], tracks: &[ApiTrack]) -> UserProfile {
    UserProfile::new(user_id)
        .with_artists(artists.iter().map(|a| a.name.as_str()))
        .with_songs(tracks.iter().map(|t| t.name.as_str()))
        .with_genres(artists.iter().flat_map(|a| a.genres.iter().map(String::as_str)))
}

/// Fetch the live profile of the token's owner.
pub async fn fetch_profile(api: &dyn MusicApi, token: &str) -> Result<UserProfile, MusicApiError> {
    let (user_id, artists, tracks) = tokio::try_join!(
        api.current_user_id(token),
        api.top_artists(token),
        api.top_tracks(token)
    )?;
    debug!(
        "Fetched live profile for {user_id}: {} artists, {} tracks",
        artists.len(),
        tracks.len()
    );
    Ok(profile_from_top(&user_id, &artists, &tracks))
}

/// Seeds from a user's top lists: first artist and track ids, first distinct genres.
pub fn seeds_from_top(artists: &[ApiArtist], tracks: &[ApiTrack]) -> RecommendationSeeds {
    let mut genres: Vec<String> = Vec::new();
    for genre in artists.iter().flat_map(|a| &a.genres) {
        if genres.len() == MAX_SEEDS {
            break;
        }
        if !genres.contains(genre) {
            genres.push(genre.clone());
        }
    }

    RecommendationSeeds {
        artists: artists.iter().take(MAX_SEEDS).map(|a| a.id.clone()).collect(),
        tracks: tracks.iter().take(MAX_SEEDS).map(|t| t.id.clone()).collect(),
        genres,
    }
}

/// `reqwest` implementation of [`MusicApi`].
pub struct HttpMusicApi {
    client: Client,
    config: MusicApiConfig,
}

impl HttpMusicApi {
    pub fn new(config: MusicApiConfig) -> Result<Self, MusicApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()?;
        let config = MusicApiConfig {
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            ..config
        };
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, MusicApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(MusicApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, MusicApiError> {
        let body = self.send(request).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| MusicApiError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl MusicApi for HttpMusicApi {
    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, MusicApiError> {
        let request = self.client.post(&self.config.token_url).form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ]);
        self.send_json(request).await
    }

    async fn current_user_id(&self, token: &str) -> Result<String, MusicApiError> {
        let request = self.client.get(self.url("/me")).bearer_auth(token);
        let user: CurrentUser = self.send_json(request).await?;
        Ok(user.id)
    }

    async fn top_artists(&self, token: &str) -> Result<Vec<ApiArtist>, MusicApiError> {
        let request = self.client.get(self.url("/me/top/artists")).bearer_auth(token);
        let page: Paging<ApiArtist> = self.send_json(request).await?;
        Ok(page.items)
    }

    async fn top_tracks(&self, token: &str) -> Result<Vec<ApiTrack>, MusicApiError> {
        let request = self.client.get(self.url("/me/top/tracks")).bearer_auth(token);
        let page: Paging<ApiTrack> = self.send_json(request).await?;
        Ok(page.items)
    }

    async fn recommendations(
        &self,
        token: &str,
        seeds: &RecommendationSeeds,
        limit: u32,
    ) -> Result<Value, MusicApiError> {
        let request = self
            .client
            .get(self.url("/recommendations"))
            .bearer_auth(token)
            .query(&seeds.query(limit));
        let body: Value = self.send_json(request).await?;
        if body.get("tracks").is_none() {
            return Err(MusicApiError::Malformed("No recommendations found".to_owned()));
        }
        Ok(body)
    }

    async fn playlist(&self, token: &str, playlist_id: &str) -> Result<Value, MusicApiError> {
        let path = format!("/playlists/{}", urlencoding::encode(playlist_id));
        let request = self.client.get(self.url(&path)).bearer_auth(token);
        self.send_json(request).await
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<Value, MusicApiError> {
        let path = format!("/users/{}/playlists", urlencoding::encode(user_id));
        let request = self.client.post(self.url(&path)).bearer_auth(token).json(&json!({
            "name": name,
            "description": "New playlist created through tunemates",
            "public": false,
        }));
        self.send_json(request).await
    }

    async fn add_track(
        &self,
        token: &str,
        playlist_id: &str,
        track_uri: &str,
    ) -> Result<(), MusicApiError> {
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        let request = self
            .client
            .post(self.url(&path))
            .bearer_auth(token)
            .json(&json!({ "uris": [track_uri] }));
        self.send(request).await.map(|_| ())
    }

    async fn remove_track(
        &self,
        token: &str,
        playlist_id: &str,
        track_uri: &str,
    ) -> Result<(), MusicApiError> {
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        let request = self
            .client
            .delete(self.url(&path))
            .bearer_auth(token)
            .json(&json!({ "tracks": [{ "uri": track_uri }] }));
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(id: &str, name: &str, genres: &[&str]) -> ApiArtist {
        ApiArtist {
            id: id.to_owned(),
            name: name.to_owned(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn track(id: &str, name: &str) -> ApiTrack {
        ApiTrack {
            id: id.to_owned(),
            name: name.to_owned(),
            uri: None,
        }
    }

    #[test]
    fn test_profile_uses_names_and_genre_union() {
        let artists = [
            artist("1", "Radiohead", &["art rock", "alternative"]),
            artist("2", "Bjork", &["art pop", "alternative"]),
        ];
        let tracks = [track("t1", "Reckoner")];

        let profile = profile_from_top("ana", &artists, &tracks);

        assert_eq!(profile.username, "ana");
        assert_eq!(profile.top_artists, vec!["Radiohead", "Bjork"]);
        assert_eq!(profile.top_songs, vec!["Reckoner"]);
        assert_eq!(
            profile.genres.iter().collect::<Vec<_>>(),
            vec!["alternative", "art pop", "art rock"]
        );
    }

    #[test]
    fn test_seeds_take_first_five_of_each() {
        let artists: Vec<_> = (0..7)
            .map(|i| artist(&format!("a{i}"), "x", &[format!("g{i}").as_str(), "shared"]))
            .collect();
        let tracks: Vec<_> = (0..7).map(|i| track(&format!("t{i}"), "y")).collect();

        let seeds = seeds_from_top(&artists, &tracks);

        assert_eq!(seeds.artists, vec!["a0", "a1", "a2", "a3", "a4"]);
        assert_eq!(seeds.tracks.len(), MAX_SEEDS);
        assert_eq!(seeds.genres, vec!["g0", "shared", "g1", "g2", "g3"]);
    }

    #[test]
    fn test_query_leaves_out_empty_seed_lists() {
        let seeds = RecommendationSeeds {
            artists: vec!["a".into(), "b".into()],
            tracks: vec![],
            genres: vec!["rock".into()],
        };

        assert_eq!(
            seeds.query(10),
            vec![
                ("seed_artists", "a,b".to_owned()),
                ("seed_genres", "rock".to_owned()),
                ("limit", "10".to_owned()),
            ]
        );
    }

    #[test]
    fn test_authorize_url_is_encoded() {
        let api = HttpMusicApi::new(MusicApiConfig {
            client_id: "client".into(),
            redirect_uri: "http://localhost:5000/callback".into(),
            ..MusicApiConfig::default()
        })
        .unwrap();

        let url = api.authorize_url("xyz");

        assert!(url.starts_with(DEFAULT_AUTH_URL));
        assert!(url.contains("client_id=client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fcallback"));
        assert!(url.contains("scope=user-top-read"));
        assert!(url.ends_with("state=xyz"));
    }

    #[test]
    fn test_paging_ignores_unknown_fields() {
        let raw = r#"{"items": [{"id": "1", "name": "Air", "genres": ["french"], "popularity": 60}], "total": 1}"#;
        let page: Paging<ApiArtist> = serde_json::from_str(raw).unwrap();
        assert_eq!(page.items[0].name, "Air");
    }
}
