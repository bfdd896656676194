//! Boundary between the negotiation step and the request view.
//!
//! The SPNEGO handshake itself (accepting the client's token, producing the
//! `WWW-Authenticate` continuation) belongs to a [`Negotiator`]. This module
//! only turns its outcome into an [`AuthenticatedRequestView`] and checks the
//! contract the view relies on.

use http::header::AUTHORIZATION;

use crate::error::{Error, TransportError};
use crate::principal::KerberosPrincipal;

use super::{AuthenticatedRequestView, InboundRequest};

/// Resolves the principal behind an inbound request.
///
/// Implementations run the GSS accept cycle on the request's `Authorization`
/// header. `Ok(None)` means the request is anonymous.
pub trait Negotiator<R: ?Sized> {
    /// Negotiates the request.
    fn negotiate(&self, request: &R) -> Result<Option<KerberosPrincipal>, TransportError>;
}

impl<R: ?Sized, F> Negotiator<R> for F
where
    F: Fn(&R) -> Result<Option<KerberosPrincipal>, TransportError>,
{
    fn negotiate(&self, request: &R) -> Result<Option<KerberosPrincipal>, TransportError> {
        self(request)
    }
}

/// Negotiates `request` and wraps it in a view.
///
/// # Errors
///
/// - [`Error::Authentication`] if the negotiator fails
/// - [`Error::MissingHeader`] if it produced a principal for a request
///   without an `Authorization` header
///
/// # Examples
///
/// ```
/// use http::header::AUTHORIZATION;
/// use spnego_core::web::{authenticate, RequestAdapter};
/// use spnego_core::{KerberosPrincipal, TransportError};
///
/// let request = RequestAdapter::new().with_header(AUTHORIZATION, "Negotiate YIIFoo");
/// let negotiator = |_: &RequestAdapter| -> Result<_, TransportError> {
///     Ok(Some(KerberosPrincipal::new("alice@CORP.LOCAL")))
/// };
///
/// let view = authenticate(request, &negotiator).unwrap();
/// assert_eq!(view.effective_user_name(), Some("alice"));
/// ```
pub fn authenticate<R, N>(request: R, negotiator: &N) -> Result<AuthenticatedRequestView<R>, Error>
where
    R: InboundRequest,
    N: Negotiator<R> + ?Sized,
{
    let principal = negotiator.negotiate(&request).map_err(|error| {
        tracing::warn!(%error, "SPNEGO negotiation failed");
        Error::Authentication(error)
    })?;

    if let Some(principal) = &principal {
        if request.header(&AUTHORIZATION).is_none() {
            tracing::warn!(
                principal = %principal,
                "negotiator produced a principal without an Authorization header"
            );
            return Err(Error::MissingHeader {
                header: "Authorization",
            });
        }
        tracing::debug!(
            principal = %principal,
            delegated = principal.delegated_credential().is_some(),
            "request authenticated"
        );
    }

    Ok(AuthenticatedRequestView::new(request, principal))
}
