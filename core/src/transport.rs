//! Request dispatch against the Pobo REST API.
//!
//! # Design
//! `Transport` holds a base URL, an optional bearer token and a shared
//! [`HttpSend`] primitive. It is cheap to clone, so the session can hand a
//! token-carrying copy to each resource client. A call either yields the
//! decoded top-level JSON object or one of three failures: the primitive
//! failed (`Transport`), the URL could not be formed (`Transport`), or the
//! body is not a JSON object (`Decode`). The status code is never
//! interpreted; the API reports failures through an `error` field.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{DecodeError, Error, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpSend};

/// A decoded top-level JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Clone)]
pub struct Transport {
    base_url: String,
    token: Option<Arc<SecretString>>,
    sender: Arc<dyn HttpSend>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Unauthenticated transport rooted at `base_url`.
    pub fn new(base_url: &str, sender: Arc<dyn HttpSend>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            sender,
        }
    }

    /// Copy of this transport that sends `Authorization: Bearer <token>`.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token: Some(Arc::new(SecretString::from(token.to_owned()))),
            sender: Arc::clone(&self.sender),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Send one request and return the response body as a JSON object.
    ///
    /// For `GET`, a non-empty `payload` is encoded into the query string and
    /// no body is sent. For every other method a non-empty `payload` becomes
    /// the JSON body.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<JsonObject> {
        let request = self.build_request(method, path, payload)?;
        debug!(url = %request.url, has_body = request.body.is_some(), "sending request");

        let response = self.sender.send(&request).map_err(|e| {
            warn!(error = %e, "transport failure");
            Error::Transport(e)
        })?;
        debug!(status = response.status, bytes = response.body.len(), "received response");

        match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(object)) => Ok(object),
            _ => {
                warn!(status = response.status, "response body is not a JSON object");
                Err(DecodeError::InvalidJson {
                    body: response.body,
                }
                .into())
            }
        }
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<HttpRequest> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|e| TransportError(format!("invalid URL {joined}: {e}")))?;

        let payload = payload.filter(|p| !is_empty_payload(p));
        let mut body = None;
        if let Some(payload) = payload {
            if method == HttpMethod::Get {
                let pairs = query_pairs(payload);
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
            } else {
                body = Some(serde_json::to_string(payload)?);
            }
        }

        let mut headers = vec![
            ("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()),
            ("Referer".to_string(), self.base_url.clone()),
        ];
        if let Some(token) = &self.token {
            headers.push((
                "Authorization".to_string(),
                format!("Bearer {}", token.expose_secret()),
            ));
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }
}

/// The server's `error` field, unless absent or `null`.
pub(crate) fn server_error(response: &JsonObject) -> Option<String> {
    match response.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Flatten a payload into `key=value` pairs using bracket notation for
/// nested arrays and objects (`categories[0]=3`). Booleans become `1`/`0`;
/// `null` and empty containers produce nothing.
fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    match payload {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_query(key, value, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_query(&index.to_string(), value, &mut pairs);
            }
        }
        scalar => flatten_query("0", scalar, &mut pairs),
    }
    pairs
}

fn flatten_query(key: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push((key.to_string(), if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => pairs.push((key.to_string(), number.to_string())),
        Value::String(text) => pairs.push((key.to_string(), text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_query(&format!("{key}[{index}]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten_query(&format!("{key}[{sub}]"), item, pairs);
            }
        }
    }
}
