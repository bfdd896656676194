//! Server side: the authenticated view over inbound requests.
//!
//! This module sits between an HTTP framework and application code. It
//! handles:
//! - Reading the request through a framework-agnostic [`InboundRequest`]
//! - Turning a [`Negotiator`]'s outcome into an [`AuthenticatedRequestView`]
//! - Answering "who is this user?" without the Kerberos realm
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: only the `http` crate's header types
//!    cross this boundary.
//!
//! 2. **Composition**: the view wraps the request and forwards whatever it
//!    does not answer itself.
//!
//! 3. **Never Break Identity Queries**: user name and credential lookups
//!    degrade to the wrapped request's defaults instead of failing.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework code builds an InboundRequest (http::Request or RequestAdapter)
//!   ↓
//! authenticate(request, &negotiator)
//!   ↓
//! AuthenticatedRequestView handed to application code
//! ```

mod adapter;
mod negotiate;
mod view;

pub use adapter::{InboundRequest, RequestAdapter};
pub use negotiate::{authenticate, Negotiator};
pub use view::{AuthScheme, AuthenticatedRequestView, BASIC, NEGOTIATE};
