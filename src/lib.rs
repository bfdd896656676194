//! SPNEGO (Kerberos) authentication for HTTP services and SOAP clients.
//!
//! The crate covers both ends of a Kerberos-protected exchange:
//! - **Server side** ([`web`]): a read-only view over an inbound request that
//!   reports the authentication scheme, the user name without its realm, and
//!   the credential the client delegated
//! - **Client side** ([`soap`]): a SOAP connection whose calls go through an
//!   authenticated HTTP transport, with strict header negotiation and
//!   guaranteed disconnect
//!
//! The GSS machinery itself stays behind two traits,
//! [`web::Negotiator`] and [`soap::AuthenticatedHttpTransport`].
//!
//! # Core Types
//!
//! - [`KerberosPrincipal`]: the authenticated identity
//! - [`DelegatedCredential`]: an opaque, redacted handle to a forwarded credential
//! - [`web::AuthenticatedRequestView`]: identity queries over a request
//! - [`soap::SoapConnection`]: the authenticated SOAP invoker
//!
//! # Examples
//!
//! ```
//! use http::header::AUTHORIZATION;
//! use spnego_core::web::{AuthenticatedRequestView, RequestAdapter};
//! use spnego_core::KerberosPrincipal;
//!
//! let request = RequestAdapter::new().with_header(AUTHORIZATION, "Negotiate YIIFoo");
//! let view = AuthenticatedRequestView::new(
//!     request,
//!     Some(KerberosPrincipal::new("alice@CORP.LOCAL")),
//! );
//!
//! assert_eq!(view.resolve_auth_type().unwrap(), Some("Negotiate"));
//! assert_eq!(view.effective_user_name(), Some("alice"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
mod credential;
mod error;
mod principal;
pub mod soap;
pub mod web;

pub use credential::{DelegatedCredential, GssCredential, Password, ScopedCredential};
pub use error::{
    Error, MessageError, ProtocolViolation, SoapError, TransportError, ViolationKind,
};
pub use principal::KerberosPrincipal;
