use std::{fmt::Display, str::FromStr, sync::Arc};

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{FromRef, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use checkbot_core::config::Config;
use hmac::{Hmac, Mac, digest::KeyInit};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::events::WebhookEvent;

pub const SIGNATURE_HEADER: &str = "x-hub-signature";
pub const EVENT_HEADER: &str = "x-github-event";

/// HMAC digest named by the `<algorithm>=` prefix of a signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl SignatureAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Compute the signature header value for `body`.
    pub fn sign(self, secret: &[u8], body: &[u8]) -> String {
        let digest = match self {
            Self::Sha1 => mac::<Hmac<Sha1>>(secret, body).finalize().into_bytes().to_vec(),
            Self::Sha256 => mac::<Hmac<Sha256>>(secret, body).finalize().into_bytes().to_vec(),
            Self::Sha512 => mac::<Hmac<Sha512>>(secret, body).finalize().into_bytes().to_vec(),
        };
        format!("{}={}", self.as_str(), hex::encode(digest))
    }

    fn verify(self, secret: &[u8], body: &[u8], digest: &[u8]) -> bool {
        match self {
            Self::Sha1 => mac::<Hmac<Sha1>>(secret, body).verify_slice(digest).is_ok(),
            Self::Sha256 => mac::<Hmac<Sha256>>(secret, body).verify_slice(digest).is_ok(),
            Self::Sha512 => mac::<Hmac<Sha512>>(secret, body).verify_slice(digest).is_ok(),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(()),
        }
    }
}

fn mac<M: Mac + KeyInit>(secret: &[u8], body: &[u8]) -> M {
    let mut mac = <M as KeyInit>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(body);
    mac
}

/// Check a `<algorithm>=<hex digest>` header against the raw request body.
///
/// A missing header is treated as `sha1=` and never verifies. Digests are
/// compared in constant time.
pub fn verify_signature(secret: &[u8], body: &[u8], header: Option<&str>) -> bool {
    let header = header.unwrap_or("sha1=");
    let Some((algorithm, digest)) = header.split_once('=') else {
        return false;
    };
    let Ok(algorithm) = algorithm.parse::<SignatureAlgorithm>() else {
        return false;
    };
    let Ok(digest) = hex::decode(digest.trim()) else {
        return false;
    };
    !digest.is_empty() && algorithm.verify(secret, body, &digest)
}

/// Verify and extract GitHub Event Payload.
#[derive(Clone)]
#[must_use]
pub struct GitHubEvent {
    pub event: WebhookEvent,
}

impl<S> FromRequest<S> for GitHubEvent
where
    Arc<Config>: FromRef<S>,
    S: Send + Sync + Clone,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        fn err(status: StatusCode, m: impl Display) -> Response {
            tracing::error!("{m}");
            (status, m.to_string()).into_response()
        }
        let (signature, event) = {
            let header = |name: &str| {
                req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
            };
            (header(SIGNATURE_HEADER), header(EVENT_HEADER))
        };
        let config = <Arc<Config>>::from_ref(state);
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::error!("Failed to read {} event body: {}", event.as_deref().unwrap_or("-"), e);
            e.into_response()
        })?;
        if !verify_signature(config.github.webhook_secret.as_bytes(), &body, signature.as_deref())
        {
            return Err(err(
                StatusCode::UNAUTHORIZED,
                format!("signature mismatch for {} event", event.as_deref().unwrap_or("-")),
            ));
        }
        let event = event
            .ok_or_else(|| err(StatusCode::BAD_REQUEST, "X-GitHub-Event header missing"))?;
        let value = WebhookEvent::try_from_header_and_body(&event, &body)
            .map_err(|e| err(StatusCode::BAD_REQUEST, format!("error parsing body: {e}")))?;
        Ok(GitHubEvent { event: value })
    }
}
