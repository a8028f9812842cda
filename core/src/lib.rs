//! Blocking client for the Pobo e-commerce REST API.
//!
//! # Overview
//! A [`Session`] logs in with username and password against one of the
//! supported market hosts ([`Locale`]) and holds the resulting bearer token.
//! [`CategoryClient`] and [`ProductClient`] send token-carrying requests
//! through a [`Transport`] and decode the loosely-typed JSON replies into
//! immutable [`Category`] and [`Product`] values. [`PoboClient`] wires the
//! three together.
//!
//! # Design
//! - The HTTP primitive is a trait ([`HttpSend`]) so the whole client runs
//!   against closures in tests; [`UreqSender`] is the production sender.
//! - Session state is an enum; the token only exists in the
//!   `Authenticated` variant.
//! - Every failure is a typed [`Error`]; nothing is retried.
//!
//! ```no_run
//! use pobo_client::{Credentials, PoboClient, Session};
//!
//! # fn main() -> pobo_client::Result<()> {
//! let session = Session::connect(Credentials::new("shop@example.com", "secret"), "CZ")?;
//! let mut pobo = PoboClient::new(session);
//! for category in pobo.categories()?.list()? {
//!     println!("{} {:?}", category.id(), category.name());
//! }
//! let first_page = pobo.products()?.list(1, &[])?;
//! println!("{} products", first_page.len());
//! pobo.logout()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod locale;
pub mod model;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{
    CategoryClient, ImportImage, ImportProduct, PoboClient, ProductClient, ProductListQuery,
};
pub use config::{ClientConfig, ConfigError};
pub use error::{AuthenticationError, DecodeError, Error, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpSend, UreqSender};
pub use locale::Locale;
pub use model::{Category, Decode, Product};
pub use session::{Credentials, Session, SessionState};
pub use transport::{JsonObject, Transport};
