//! Firebase ID token authentication.
//!
//! [`Session`] is the extractor every handler uses: it verifies the bearer
//! token when one is sent, loads (or creates) the caller's profile and turns
//! it into a [`Principal`]. Requests without a token are anonymous.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use jobboard_models::{Caller, Principal, Profile, UserId};

use crate::error::ApiError;
use crate::i18n::Message;
use crate::state::AppState;

/// Google JWKS URL for Firebase Auth.
const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Firebase token issuer prefix.
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// JWKS cache TTL.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// Minimum gap between fetches, including those forced by an unknown `kid`.
const JWKS_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Decoded Firebase ID token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// User ID
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub iss: String,
    /// Firebase project ID
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity proven by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: Option<String>,
}

impl From<FirebaseClaims> for AuthUser {
    fn from(claims: FirebaseClaims) -> Self {
        Self {
            uid: UserId::from(claims.sub),
            email: claims.email,
        }
    }
}

/// Turns a bearer token into an identity.
#[axum::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, ApiError>;
}

/// JWKS response from Google.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

/// Cached JWKS keys.
pub struct JwksCache {
    http: Client,
    jwks_url: String,
    keys: RwLock<HashMap<String, DecodingKey>>,
    last_refresh: RwLock<Instant>,
    /// Start of the latest fetch, successful or not
    last_attempt: RwLock<Instant>,
    /// Serializes fetches so concurrent misses share one request
    refresh_lock: Mutex<()>,
    project_id: String,
}

impl JwksCache {
    /// Create a new JWKS cache and load the current keys.
    pub async fn new(project_id: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_url(project_id, GOOGLE_JWKS_URL).await
    }

    /// Cache backed by a custom key endpoint.
    pub async fn with_url(project_id: impl Into<String>, jwks_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        let cache = Self {
            http,
            jwks_url: jwks_url.into(),
            keys: RwLock::new(HashMap::new()),
            last_refresh: RwLock::new(Instant::now()),
            last_attempt: RwLock::new(Instant::now()),
            refresh_lock: Mutex::new(()),
            project_id: project_id.into(),
        };

        cache.refresh_keys().await?;
        Ok(cache)
    }

    async fn refresh_keys(&self) -> anyhow::Result<()> {
        debug!("Refreshing JWKS keys");
        *self.last_attempt.write().await = Instant::now();

        let jwks: JwksResponse = self.http.get(&self.jwks_url).send().await?.json().await?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)?;
            keys.insert(jwk.kid, key);
        }

        let key_count = keys.len();
        *self.keys.write().await = keys;
        *self.last_refresh.write().await = Instant::now();

        debug!(key_count, "Refreshed JWKS keys");
        Ok(())
    }

    /// Expired keys, or an unknown `kid` after a key rotation, trigger a
    /// fetch, but never more often than [`JWKS_MIN_REFRESH_INTERVAL`].
    async fn needs_refresh(&self, kid: &str) -> bool {
        if self.last_attempt.read().await.elapsed() < JWKS_MIN_REFRESH_INTERVAL {
            return false;
        }
        self.last_refresh.read().await.elapsed() > JWKS_CACHE_TTL || !self.keys.read().await.contains_key(kid)
    }

    async fn get_key(&self, kid: &str) -> Option<DecodingKey> {
        if self.needs_refresh(kid).await {
            let _guard = self.refresh_lock.lock().await;
            // Another request may have refreshed while this one waited
            if self.needs_refresh(kid).await {
                if let Err(e) = self.refresh_keys().await {
                    warn!(error = %e, "Failed to refresh JWKS keys");
                }
            }
        }

        self.keys.read().await.get(kid).cloned()
    }

    /// Verify a Firebase ID token.
    pub async fn verify_token(&self, token: &str) -> Result<FirebaseClaims, ApiError> {
        let invalid = |reason: &str| {
            debug!(reason, "Rejected ID token");
            ApiError::Unauthorized(Message::InvalidToken)
        };

        let header = decode_header(token).map_err(|_| invalid("malformed header"))?;
        let kid = header.kid.ok_or_else(|| invalid("missing kid"))?;
        let key = self.get_key(&kid).await.ok_or_else(|| invalid("unknown kid"))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)]);
        validation.set_audience(&[&self.project_id]);

        let token_data = decode::<FirebaseClaims>(token, &key, &validation).map_err(|_| invalid("validation failed"))?;
        Ok(token_data.claims)
    }
}

#[axum::async_trait]
impl IdentityVerifier for JwksCache {
    async fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        self.verify_token(token).await.map(AuthUser::from)
    }
}

/// Bearer token from the `Authorization` header.
///
/// `Ok(None)` when the header is absent; an error when it is present but not
/// a bearer token.
pub fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Some)
        .ok_or(ApiError::Unauthorized(Message::InvalidToken))
}

/// Caller of the current request.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            principal: Principal::Anonymous,
            user: None,
        }
    }

    pub fn from_profile(user: AuthUser, profile: &Profile) -> Self {
        Self {
            principal: Principal::User(Caller::from_profile(profile)),
            user: Some(user),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(Session::anonymous());
        };

        let user = state.verifier.verify(token).await?;
        let profile = state.profiles.ensure(&user).await?;
        Ok(Session::from_profile(user, &profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn jwks_server(expected_fetches: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [{ "kid": "k1", "n": "AQAB", "e": "AQAB" }]
            })))
            .expect(expected_fetches)
            .mount(&server)
            .await;
        server
    }

    async fn age(cache: &JwksCache, by: Duration) {
        let past = Instant::now().checked_sub(by).unwrap();
        *cache.last_attempt.write().await = past;
        *cache.last_refresh.write().await = past;
    }

    #[tokio::test]
    async fn test_unknown_kids_within_interval_do_not_refetch() {
        let server = jwks_server(1).await;
        let cache = JwksCache::with_url("p", format!("{}/jwks", server.uri())).await.unwrap();

        assert!(cache.get_key("k1").await.is_some());
        assert!(cache.get_key("forged-1").await.is_none());
        assert!(cache.get_key("forged-2").await.is_none());
        // `expect(1)` is verified when the server drops
    }

    #[tokio::test]
    async fn test_unknown_kid_refetches_once_per_interval() {
        let server = jwks_server(2).await;
        let cache = JwksCache::with_url("p", format!("{}/jwks", server.uri())).await.unwrap();
        age(&cache, JWKS_MIN_REFRESH_INTERVAL + Duration::from_secs(1)).await;

        assert!(cache.get_key("rotated").await.is_none());
        assert!(cache.get_key("rotated").await.is_none());
        assert!(cache.get_key("k1").await.is_some());
    }

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/profile");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(None)).unwrap(), None);
        assert_eq!(bearer_token(&parts(Some("Bearer abc"))).unwrap(), Some("abc"));
        assert!(bearer_token(&parts(Some("Basic abc"))).is_err());
        assert!(bearer_token(&parts(Some("Bearer  "))).is_err());
    }

    #[test]
    fn test_claims_map_to_user() {
        let claims = FirebaseClaims {
            sub: "uid-1".into(),
            email: Some("a@b.c".into()),
            email_verified: Some(true),
            iss: "https://securetoken.google.com/p".into(),
            aud: "p".into(),
            iat: 0,
            exp: 0,
        };
        let user = AuthUser::from(claims);
        assert_eq!(user.uid, UserId::from("uid-1"));
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
    }
}
