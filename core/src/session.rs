//! Login/logout protocol and bearer-token lifecycle.
//!
//! # Design
//! A `Session` moves through `Unauthenticated -> Authenticated -> LoggedOut`.
//! The token lives inside the `Authenticated` variant, so "has a token" and
//! "is authenticated" cannot disagree. `LoggedOut` is terminal; logging in
//! again means building a new `Session`. The in-flight `Authenticating`
//! step only exists while `authenticate` holds `&mut self`, which is also
//! what serialises writers to the state.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthenticationError, Error, Result};
use crate::http::{HttpMethod, HttpSend, UreqSender};
use crate::locale::Locale;
use crate::transport::{server_error, Transport};

const TOKEN_PATH: &str = "/api/v2/user/token/";
const LOGOUT_PATH: &str = "/api/v2/user/logout/";

/// Username and password used to obtain a token.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Arc<SecretString>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Arc::new(SecretString::from(password.into())),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { token: SecretString },
    LoggedOut,
}

pub struct Session {
    credentials: Credentials,
    locale: Locale,
    transport: Transport,
    state: SessionState,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .field("locale", &self.locale)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Resolve `locale` and log in. An unsupported locale fails before any
    /// request is sent.
    pub fn new(credentials: Credentials, locale: &str, sender: Arc<dyn HttpSend>) -> Result<Self> {
        let locale: Locale = locale.parse()?;
        Self::with_locale(credentials, locale, sender)
    }

    pub fn with_locale(
        credentials: Credentials,
        locale: Locale,
        sender: Arc<dyn HttpSend>,
    ) -> Result<Self> {
        let mut session = Self::unauthenticated(credentials, locale, sender);
        session.authenticate()?;
        Ok(session)
    }

    /// Log in over HTTPS with the default `ureq` sender.
    pub fn connect(credentials: Credentials, locale: &str) -> Result<Self> {
        Self::new(credentials, locale, Arc::new(UreqSender::new()))
    }

    fn unauthenticated(credentials: Credentials, locale: Locale, sender: Arc<dyn HttpSend>) -> Self {
        Self {
            credentials,
            locale,
            transport: Transport::new(locale.base_url(), sender),
            state: SessionState::Unauthenticated,
        }
    }

    /// Exchange the credentials for a bearer token.
    ///
    /// A session that already holds a token returns immediately without
    /// contacting the server.
    #[instrument(skip(self), fields(locale = %self.locale, username = %self.credentials.username))]
    pub fn authenticate(&mut self) -> Result<()> {
        match self.state {
            SessionState::Authenticated { .. } => {
                debug!("session already authenticated");
                return Ok(());
            }
            SessionState::LoggedOut => return Err(AuthenticationError::LoggedOut.into()),
            SessionState::Unauthenticated => {}
        }

        let payload = json!({
            "username": self.credentials.username,
            "password": self.credentials.password.expose_secret(),
        });
        let response = self
            .transport
            .request(HttpMethod::Post, TOKEN_PATH, Some(&payload))?;

        if let Some(token) = response.get("token").filter(|t| !t.is_null()) {
            let token = token.as_str().ok_or_else(Error::unexpected_format)?;
            self.state = SessionState::Authenticated {
                token: SecretString::from(token.to_owned()),
            };
            info!("authenticated");
            return Ok(());
        }
        if let Some(message) = server_error(&response) {
            warn!(error = %message, "login rejected");
            return Err(AuthenticationError::LoginFailed(message).into());
        }
        warn!("token endpoint returned neither token nor error");
        Err(Error::unexpected_format())
    }

    /// Invalidate the token on the server, then forget it.
    ///
    /// If the server reports an error the session stays authenticated.
    #[instrument(skip(self), fields(locale = %self.locale))]
    pub fn logout(&mut self) -> Result<()> {
        let SessionState::Authenticated { token } = &self.state else {
            return Err(Error::Api("You are not logged in.".to_string()));
        };

        let transport = self.transport.with_token(token.expose_secret());
        let response = transport.request(HttpMethod::Get, LOGOUT_PATH, None)?;
        if let Some(message) = server_error(&response) {
            warn!(error = %message, "logout rejected");
            return Err(Error::Api(message));
        }

        self.state = SessionState::LoggedOut;
        info!("logged out");
        Ok(())
    }

    /// Current bearer token.
    pub fn token(&self) -> Result<&str> {
        match &self.state {
            SessionState::Authenticated { token } => Ok(token.expose_secret()),
            _ => Err(AuthenticationError::MissingToken.into()),
        }
    }

    /// Transport that attaches the current bearer token.
    pub fn transport(&self) -> Result<Transport> {
        Ok(self.transport.with_token(self.token()?))
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }
}
