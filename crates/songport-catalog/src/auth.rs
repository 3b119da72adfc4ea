use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use songport_core::{SongportError, SongportResult};
use tokio::sync::Mutex;
use tracing::debug;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
// Tokens count as expired this long before their reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Lazily refreshed client-credentials bearer token. The cache mutex is held
/// across the refresh await, so concurrent callers hitting an expired token
/// collapse into a single upstream call.
#[derive(Debug)]
pub struct TokenProvider {
    client: Client,
    credentials: Option<SpotifyCredentials>,
    cached: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl TokenProvider {
    pub fn new(client: Client, credentials: Option<SpotifyCredentials>) -> Self {
        Self {
            client,
            credentials,
            cached: Mutex::new(None),
        }
    }

    pub async fn bearer(&self) -> SongportResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh()
        {
            return Ok(token.value.clone());
        }
        debug!("refreshing spotify access token");
        let token = self.refresh().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn refresh(&self) -> SongportResult<CachedToken> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SongportError::Auth("spotify credentials are not configured".to_string())
        })?;
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|err| SongportError::Auth(format!("token request failed: {err}")))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(SongportError::Auth(format!(
                "token endpoint returned {status}"
            )));
        }
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|err| SongportError::Parse(format!("token response decode failed: {err}")))?;
        Ok(CachedToken {
            value: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }
}
