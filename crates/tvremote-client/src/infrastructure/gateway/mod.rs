//! HTTP implementation of the [`Gateway`] port.
//!
//! Talks JSON to the gateway's `api/*` routes using `reqwest`.  Routes are
//! joined onto the configured base URL, so a gateway mounted under a path
//! prefix (`http://host:7503/remote/`) works the same as one at the root.
//!
//! # Response mapping
//!
//! | Outcome                             | Result                         |
//! |-------------------------------------|--------------------------------|
//! | 2xx                                 | `Ok`                           |
//! | non-2xx with `{"error": "..."}`     | `GatewayRejected` with message |
//! | non-2xx without a usable body       | `GatewayRejected` with reason  |
//! | connect/read failure, bad JSON      | `Transport`                    |
//! | events: 204, empty body, timeout    | `Ok(None)`                     |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use tvremote_core::protocol::messages::{
    routes, DeviceEventMessage, ErrorResponse, LaunchAppRequest, PairingCodeRequest,
    SendKeyRequest, SendTextRequest,
};
use tvremote_core::{DeviceEvent, KeyCode, StatusResponse};

use crate::application::gateway::{Gateway, RemoteError};

/// Errors building an [`HttpGateway`].
#[derive(Debug, Error)]
pub enum HttpGatewayError {
    #[error("invalid gateway URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for [`HttpGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub long_poll_timeout: Duration,
}

pub struct HttpGateway {
    client: Client,
    base: Url,
    long_poll_timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &HttpGatewayConfig) -> Result<Self, HttpGatewayError> {
        let base = normalize_base(&config.base_url)?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base,
            long_poll_timeout: config.long_poll_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, route: &str) -> Result<Url, RemoteError> {
        self.base
            .join(route)
            .map_err(|e| RemoteError::Transport(format!("bad route {route}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T, RemoteError> {
        let response = self
            .client
            .get(self.url(route)?)
            .send()
            .await
            .map_err(transport)?;
        let response = check(response).await?;
        response.json::<T>().await.map_err(transport)
    }

    async fn post_json<B: Serialize + Sync + ?Sized>(&self, route: &str, body: &B) -> Result<(), RemoteError> {
        trace!(route, "POST");
        let response = self
            .client
            .post(self.url(route)?)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(drop)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn status(&self) -> Result<StatusResponse, RemoteError> {
        self.get_json(routes::STATUS).await
    }

    async fn connect(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.url(routes::CONNECT)?)
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(drop)
    }

    async fn send_key(&self, key: &KeyCode) -> Result<(), RemoteError> {
        self.post_json(routes::SEND_KEY, &SendKeyRequest { key: key.clone() })
            .await
    }

    async fn launch_app(&self, app_id: &str) -> Result<(), RemoteError> {
        self.post_json(
            routes::LAUNCH_APP,
            &LaunchAppRequest {
                app_id: app_id.to_string(),
            },
        )
        .await
    }

    async fn submit_pairing_code(&self, code: &str) -> Result<(), RemoteError> {
        self.post_json(
            routes::PAIRING_CODE,
            &PairingCodeRequest {
                code: code.to_string(),
            },
        )
        .await
    }

    async fn send_text(&self, text: &str, enter: bool) -> Result<(), RemoteError> {
        self.post_json(
            routes::SEND_TEXT,
            &SendTextRequest {
                text: text.to_string(),
                enter,
            },
        )
        .await
    }

    async fn next_event(&self) -> Result<Option<DeviceEvent>, RemoteError> {
        let sent = self
            .client
            .get(self.url(routes::EVENTS)?)
            .timeout(self.long_poll_timeout)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Ok(None),
            Err(e) => return Err(transport(e)),
        };
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let response = check(response).await?;
        match response.text().await {
            Ok(body) => parse_event(&body),
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(transport(e)),
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parses `raw` and guarantees a trailing slash so routes join under it.
fn normalize_base(raw: &str) -> Result<Url, HttpGatewayError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| HttpGatewayError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(HttpGatewayError::InvalidUrl {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

/// Passes 2xx responses through; turns anything else into `GatewayRejected`.
async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(rejection(status, &body))
}

fn rejection(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => format!("HTTP {}", status.as_u16()),
        });
    RemoteError::GatewayRejected {
        status: status.as_u16(),
        message,
    }
}

/// An empty body means the gateway's hold expired without an event.
fn parse_event(body: &str) -> Result<Option<DeviceEvent>, RemoteError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<DeviceEventMessage>(body)
        .map(|msg| Some(msg.into()))
        .map_err(|e| RemoteError::Transport(format!("malformed event: {e}")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
