//! Signed session cookies
//!
//! Cookie value format: `{session_id}.{hmac_sha256_hex}`. The signature is
//! checked before the session store is ever consulted.

use super::session::SessionError;
use crate::config::SessionConfig;
use axum::http::{header::COOKIE, HeaderMap};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer for session ids
#[derive(Clone)]
pub struct CookieSigner {
    secret: Arc<SecretString>,
}

impl CookieSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::from_secret(SecretString::new(secret.into()))
    }

    pub fn from_secret(secret: SecretString) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }

    /// Produce the signed cookie value for a session id
    pub fn sign(&self, session_id: &str) -> Result<String, SessionError> {
        let mac = self.mac(session_id)?;
        Ok(format!(
            "{}.{}",
            session_id,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    /// Recover the session id from a signed value, if the signature holds
    pub fn verify(&self, value: &str) -> Option<String> {
        let (session_id, signature) = value.rsplit_once('.')?;
        if session_id.is_empty() {
            return None;
        }
        let signature = hex::decode(signature).ok()?;

        // verify_slice compares in constant time
        self.mac(session_id)
            .ok()?
            .verify_slice(&signature)
            .ok()
            .map(|_| session_id.to_string())
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, SessionError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

/// Issues and reads the session cookie
#[derive(Clone)]
pub struct SessionCookies {
    signer: CookieSigner,
    name: String,
    ttl: Duration,
    secure: bool,
}

impl SessionCookies {
    pub fn new(signer: CookieSigner, name: impl Into<String>, ttl: Duration, secure: bool) -> Self {
        Self {
            signer,
            name: name.into(),
            ttl,
            secure,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            CookieSigner::from_secret(config.secret.clone()),
            config.cookie_name.clone(),
            Duration::from_secs(config.ttl_secs),
            config.secure,
        )
    }

    /// Lifetime of both the cookie and the server-side record
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` header value for a new session
    pub fn issue(&self, session_id: &str) -> Result<String, SessionError> {
        let value = self.signer.sign(session_id)?;
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name,
            value,
            self.ttl.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        Ok(cookie)
    }

    /// Verified session id carried by the request, if any
    ///
    /// Every cookie with the session name is tried; the first one whose
    /// signature holds wins.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == self.name)
            .find_map(|(_, value)| self.signer.verify(value))
    }
}
