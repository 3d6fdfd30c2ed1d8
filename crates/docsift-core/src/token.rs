//! Access-token lifecycle for the OCR cloud API.
//!
//! Per credential pair the token is either absent or present in the cache;
//! the manager never expires anything itself. A cache read failure falls
//! through to issuance, a cache write failure is reported.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::TokenCache;
use crate::error::{DocError, DocResult, ErrorCode};

const PROVIDER: &str = "ocr-token";

/// Client-credentials pair for the token issuer.
#[derive(Debug, Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// The public client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret.
    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }
}

/// Token issuer response.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    #[allow(dead_code)]
    refresh_token: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    scope: Option<String>,
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Cache-first provider of OCR access tokens.
pub struct TokenManager {
    client: Client,
    token_url: String,
    credentials: Credentials,
    cache: Arc<dyn TokenCache>,
    cache_key: String,
}

impl TokenManager {
    /// Create a token manager for one credential pair.
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        credentials: Credentials,
        cache: Arc<dyn TokenCache>,
        key_prefix: &str,
    ) -> Self {
        let cache_key = Self::cache_key_for(key_prefix, credentials.client_id());
        Self {
            client,
            token_url: token_url.into(),
            credentials,
            cache,
            cache_key,
        }
    }

    /// Cache key for a client id: prefix plus the hex MD5 of the id.
    pub fn cache_key_for(prefix: &str, client_id: &str) -> String {
        format!("{}{:x}", prefix, md5::compute(client_id.as_bytes()))
    }

    /// The cache key this manager reads and writes.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Return a token, issuing a new one only when the cache has none.
    pub async fn access_token(&self) -> DocResult<String> {
        match self.cache.get(&self.cache_key).await {
            Ok(Some(token)) if !token.is_empty() => {
                debug!(key = %self.cache_key, "Using cached access token");
                return Ok(token);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    key = %self.cache_key,
                    error = %e,
                    "Token cache read failed, issuing a new token"
                );
            }
        }

        let response = self.issue().await?;

        self.cache
            .set(&self.cache_key, &response.access_token, response.expires_in)
            .await
            .map_err(|e| DocError::Cache {
                message: format!("Failed to store issued access token: {}", e),
                code: ErrorCode::CacheWriteFailed,
                source: Some(Box::new(e)),
            })?;

        debug!(
            key = %self.cache_key,
            expires_in = response.expires_in,
            "Stored new access token"
        );
        Ok(response.access_token)
    }

    async fn issue(&self) -> DocResult<TokenResponse> {
        debug!(client_id = %self.credentials.client_id, "Requesting access token");

        let response = self
            .client
            .post(&self.token_url)
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                (
                    "client_secret",
                    self.credentials.client_secret.expose_secret().as_str(),
                ),
                ("grant_type", "client_credentials"),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .body("")
            .send()
            .await?;

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            DocError::invalid_response(PROVIDER, format!("Failed to parse token response: {}", e))
        })?;

        if !token.error.is_empty() {
            warn!(
                error = %token.error,
                description = %token.error_description,
                "Token issuer rejected credentials"
            );
            return Err(DocError::remote(
                PROVIDER,
                format!("{}: {}", token.error, token.error_description),
            ));
        }

        if token.access_token.is_empty() {
            return Err(DocError::invalid_response(
                PROVIDER,
                "Token response carried no access_token",
            ));
        }

        Ok(token)
    }
}
