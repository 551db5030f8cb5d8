//! Session resolution for access tokens issued by the external auth provider,
//! plus sign-out through a revocation list.
//!
//! The provider signs HS256 JWTs whose `sub` is the user id. A token that is
//! missing, malformed, expired, for another audience or revoked resolves to
//! no session. Failing to reach the revocation list is an error, never "no
//! session": an outage must not look like a signed-out user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::audit::CreateAuditLog;
use crate::store::Store;

const REVOKED_KEY_PREFIX: &str = "perftrack:revoked:";

/// Claims the provider embeds in access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// An authenticated identity for the lifetime of one request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub session_id: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Raw bearer token, needed to revoke it on sign-out.
    #[serde(skip)]
    pub token: String,
}

/// Tokens ended by sign-out before their natural expiry.
#[derive(Clone)]
pub enum RevocationStore {
    Redis(redis::Client),
    /// Token digest → unix expiry. For tests and single-process demos.
    Memory(Arc<Mutex<HashMap<String, i64>>>),
}

impl std::fmt::Debug for RevocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis(_) => f.write_str("RevocationStore::Redis"),
            Self::Memory(_) => f.write_str("RevocationStore::Memory"),
        }
    }
}

impl RevocationStore {
    pub fn redis(url: &str) -> Result<Self, AppError> {
        Ok(Self::Redis(redis::Client::open(url)?))
    }

    pub fn memory() -> Self {
        Self::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    fn key(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        format!("{REVOKED_KEY_PREFIX}{}", hex::encode(digest))
    }

    /// Whether the token was revoked. Errors when the store is unreachable.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        let key = Self::key(token);
        match self {
            Self::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let exists: bool = redis::cmd("EXISTS")
                    .arg(&key)
                    .query_async(&mut conn)
                    .await?;
                Ok(exists)
            }
            Self::Memory(map) => {
                let now = Utc::now().timestamp();
                let map = map
                    .lock()
                    .map_err(|_| AppError::Internal("revocation list poisoned".to_string()))?;
                Ok(map.get(&key).is_some_and(|exp| *exp > now))
            }
        }
    }

    /// Revoke a token until `expires_at`. Returns `false` if it already was.
    pub async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> Result<bool, AppError> {
        let key = Self::key(token);
        let ttl = (expires_at - Utc::now()).num_seconds().max(1);
        match self {
            Self::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let set: Option<String> = redis::cmd("SET")
                    .arg(&key)
                    .arg(1)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl)
                    .query_async(&mut conn)
                    .await?;
                Ok(set.is_some())
            }
            Self::Memory(map) => {
                let mut map = map
                    .lock()
                    .map_err(|_| AppError::Internal("revocation list poisoned".to_string()))?;
                let now = Utc::now().timestamp();
                map.retain(|_, exp| *exp > now);
                if map.contains_key(&key) {
                    return Ok(false);
                }
                map.insert(key, now + ttl);
                Ok(true)
            }
        }
    }

    /// Readiness probe for the backing store.
    pub async fn ping(&self) -> Result<(), AppError> {
        if let Self::Redis(client) = self {
            let mut conn = client.get_multiplexed_async_connection().await?;
            redis::cmd("PING").query_async::<String>(&mut conn).await?;
        }
        Ok(())
    }
}

/// Validate a provider token. Any validation failure yields `None`.
pub fn decode_token(token: &str, jwt_secret: &str, audience: &str) -> Option<Claims> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    match jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected access token");
            None
        }
    }
}

/// Resolve the caller's session from an optional bearer token.
pub async fn resolve_session(
    bearer: Option<&str>,
    jwt_secret: &str,
    audience: &str,
    revocations: &RevocationStore,
) -> Result<Option<Session>, AppError> {
    let Some(token) = bearer else {
        return Ok(None);
    };
    let Some(claims) = decode_token(token, jwt_secret, audience) else {
        return Ok(None);
    };
    let Ok(user_id) = claims.sub.parse::<Uuid>() else {
        tracing::debug!(sub = %claims.sub, "Token subject is not a user id");
        return Ok(None);
    };
    let Some(expires_at) = DateTime::<Utc>::from_timestamp(claims.exp, 0) else {
        return Ok(None);
    };

    if revocations.is_revoked(token).await? {
        tracing::debug!(user_id = %user_id, "Token was revoked by sign-out");
        return Ok(None);
    }

    Ok(Some(Session {
        user_id,
        email: claims.email,
        session_id: claims.session_id,
        expires_at,
        token: token.to_string(),
    }))
}

/// End a session: revoke its token and record the sign-out.
pub async fn sign_out(
    store: &dyn Store,
    revocations: &RevocationStore,
    session: &Session,
) -> Result<(), AppError> {
    let newly_revoked = revocations.revoke(&session.token, session.expires_at).await?;
    if !newly_revoked {
        return Ok(());
    }

    store
        .insert_audit_log(&CreateAuditLog {
            action: "sign_out".to_string(),
            entity_type: "session".to_string(),
            entity_id: None,
            user_id: Some(session.user_id),
            details: session
                .session_id
                .as_ref()
                .map(|id| serde_json::json!({ "session_id": id })),
            ip_address: None,
        })
        .await?;

    tracing::info!(user_id = %session.user_id, "Signed out");
    Ok(())
}

/// Issue a token the way the provider does. Used by the seed binary and tests.
pub fn issue_token(
    user_id: Uuid,
    email: Option<&str>,
    jwt_secret: &str,
    audience: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        aud: audience.to_string(),
        exp: (now + chrono::Duration::seconds(ttl_secs)).timestamp(),
        iat: Some(now.timestamp()),
        session_id: Some(Uuid::new_v4().to_string()),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
}
