//! Resource clients and the `PoboClient` facade.
//!
//! # Design
//! `CategoryClient` and `ProductClient` are stateless: each call is one
//! request through a token-carrying [`Transport`] followed by a model
//! decode. `PoboClient` owns the [`Session`] and builds a fresh resource
//! client from the session's current token on every access, so nothing can
//! be sent with a token that has already been logged out.

mod categories;
mod products;

pub use categories::CategoryClient;
pub use products::{ImportImage, ImportProduct, ProductClient, ProductListQuery};

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::HttpSend;
use crate::session::{Credentials, Session};
use crate::transport::{server_error, JsonObject};

/// Entry point bundling a session with the resource clients.
#[derive(Debug)]
pub struct PoboClient {
    session: Session,
}

impl PoboClient {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Log in and wrap the resulting session.
    pub fn login(credentials: Credentials, locale: &str, sender: Arc<dyn HttpSend>) -> Result<Self> {
        Session::new(credentials, locale, sender).map(Self::new)
    }

    pub fn from_config(config: &ClientConfig, sender: Arc<dyn HttpSend>) -> Result<Self> {
        Session::with_locale(config.credentials.clone(), config.locale, sender).map(Self::new)
    }

    pub fn categories(&self) -> Result<CategoryClient> {
        Ok(CategoryClient::new(self.session.transport()?))
    }

    pub fn products(&self) -> Result<ProductClient> {
        Ok(ProductClient::new(self.session.transport()?))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}

/// Extract `result.<key>` as an array, surfacing a server `error` first.
fn result_items<'a>(response: &'a JsonObject, key: &str) -> Result<&'a [Value]> {
    if let Some(message) = server_error(response) {
        warn!(error = %message, "server reported an error");
        return Err(Error::Api(message));
    }
    response
        .get("result")
        .and_then(|result| result.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| {
            warn!(key, "response has no result array");
            Error::unexpected_format()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthenticationError;
    use crate::testing::ScriptedSender;

    fn client(sender: &Arc<ScriptedSender>) -> PoboClient {
        sender.push_body(r#"{"token":"t-1"}"#);
        PoboClient::login(Credentials::new("u", "p"), "SPACE", sender.clone()).unwrap()
    }

    #[test]
    fn resource_clients_use_the_session_token() {
        let sender = ScriptedSender::new(&[]);
        let pobo = client(&sender);
        sender.push_body(r#"{"result":{"category":[]}}"#);

        assert!(pobo.categories().unwrap().list().unwrap().is_empty());

        let req = &sender.requests()[1];
        assert_eq!(req.url, "https://www.pobo.space/api/v2/category/grid/");
        assert_eq!(req.header("Authorization"), Some("Bearer t-1"));
    }

    #[test]
    fn resource_clients_are_unavailable_after_logout() {
        let sender = ScriptedSender::new(&[]);
        let mut pobo = client(&sender);
        sender.push_body(r#"{"result":"ok"}"#);
        pobo.logout().unwrap();

        let err = pobo.products().unwrap_err();
        assert!(matches!(
            err,
            Error::Authentication(AuthenticationError::MissingToken)
        ));
        assert_eq!(sender.requests().len(), 2);
    }

    #[test]
    fn result_items_checks_shape() {
        let ok: JsonObject = serde_json::from_str(r#"{"result":{"products":[1,2]}}"#).unwrap();
        assert_eq!(result_items(&ok, "products").unwrap().len(), 2);

        let wrong: JsonObject = serde_json::from_str(r#"{"result":{"products":{}}}"#).unwrap();
        assert_eq!(
            result_items(&wrong, "products").unwrap_err().to_string(),
            "Unexpected response format"
        );

        let failed: JsonObject =
            serde_json::from_str(r#"{"error":"Forbidden","result":{"products":[]}}"#).unwrap();
        assert_eq!(result_items(&failed, "products").unwrap_err().to_string(), "Forbidden");
    }
}
