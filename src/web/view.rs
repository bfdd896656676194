//! Authenticated view over an inbound request.

use std::fmt;

use http::header::AUTHORIZATION;

use crate::credential::DelegatedCredential;
use crate::error::Error;
use crate::principal::KerberosPrincipal;

use super::InboundRequest;

/// Authorization scheme token for SPNEGO.
pub const NEGOTIATE: &str = "Negotiate";

/// Authorization scheme token for HTTP Basic.
pub const BASIC: &str = "Basic";

/// The authentication scheme carried by an `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// The header starts with `Negotiate`
    Negotiate,
    /// The header starts with `Basic`
    Basic,
    /// Neither token matched
    Unset,
}

impl AuthScheme {
    /// Classifies a raw `Authorization` header value.
    ///
    /// Matching is a case-sensitive prefix match, `Negotiate` first. Values
    /// shorter than either token simply do not match.
    pub fn from_authorization(value: &[u8]) -> Self {
        if value.starts_with(NEGOTIATE.as_bytes()) {
            AuthScheme::Negotiate
        } else if value.starts_with(BASIC.as_bytes()) {
            AuthScheme::Basic
        } else {
            AuthScheme::Unset
        }
    }

    /// Returns the scheme token, or `None` for [`AuthScheme::Unset`].
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            AuthScheme::Negotiate => Some(NEGOTIATE),
            AuthScheme::Basic => Some(BASIC),
            AuthScheme::Unset => None,
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("unset"))
    }
}

/// A read-only authentication view over an inbound request.
///
/// The view is built once per request, after negotiation, and answers the
/// identity questions application code asks: which scheme authenticated the
/// request, who the caller is without their realm, and which credential they
/// delegated. Questions it cannot answer are forwarded to the wrapped request.
///
/// # Examples
///
/// ```
/// use http::header::AUTHORIZATION;
/// use spnego_core::web::{AuthenticatedRequestView, RequestAdapter};
/// use spnego_core::KerberosPrincipal;
///
/// let request = RequestAdapter::new().with_header(AUTHORIZATION, "Negotiate YIIFoo");
/// let view = AuthenticatedRequestView::new(
///     request,
///     Some(KerberosPrincipal::new("alice@CORP.LOCAL")),
/// );
///
/// assert_eq!(view.resolve_auth_type().unwrap(), Some("Negotiate"));
/// assert_eq!(view.effective_user_name(), Some("alice"));
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedRequestView<R> {
    inner: R,
    principal: Option<KerberosPrincipal>,
}

impl<R: InboundRequest> AuthenticatedRequestView<R> {
    /// Wraps `inner` with the principal produced by negotiation.
    pub fn new(inner: R, principal: Option<KerberosPrincipal>) -> Self {
        Self { inner, principal }
    }

    /// Wraps `inner` without a principal.
    pub fn anonymous(inner: R) -> Self {
        Self::new(inner, None)
    }

    /// Derives the scheme from the `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] if a principal is attached but the
    /// request carries no `Authorization` header.
    pub fn auth_scheme(&self) -> Result<AuthScheme, Error> {
        match self.inner.header(&AUTHORIZATION) {
            Some(value) => Ok(AuthScheme::from_authorization(value.as_bytes())),
            None if self.principal.is_some() => {
                tracing::warn!(
                    principal = %self.principal.as_ref().map(|p| p.name()).unwrap_or_default(),
                    "authenticated request has no Authorization header"
                );
                Err(Error::MissingHeader {
                    header: "Authorization",
                })
            }
            None => Ok(AuthScheme::Unset),
        }
    }

    /// Returns `"Negotiate"` or `"Basic"`, else the wrapped request's auth type.
    ///
    /// # Errors
    ///
    /// Same as [`auth_scheme`](Self::auth_scheme).
    pub fn resolve_auth_type(&self) -> Result<Option<&str>, Error> {
        match self.auth_scheme()?.as_str() {
            Some(token) => Ok(Some(token)),
            None => Ok(self.inner.auth_type()),
        }
    }

    /// Returns the credential the client delegated, if any.
    pub fn delegated_credential(&self) -> Option<&DelegatedCredential> {
        self.principal
            .as_ref()
            .and_then(KerberosPrincipal::delegated_credential)
    }

    /// Returns the authenticated user name without its realm.
    ///
    /// Without a principal this is whatever the wrapped request reports.
    pub fn effective_user_name(&self) -> Option<&str> {
        match &self.principal {
            Some(principal) => Some(principal.user_name()),
            None => self.inner.remote_user(),
        }
    }

    /// Returns the attached principal.
    pub fn user_principal(&self) -> Option<&KerberosPrincipal> {
        self.principal.as_ref()
    }

    /// Returns the wrapped request.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Unwraps the view, returning the request and principal.
    pub fn into_parts(self) -> (R, Option<KerberosPrincipal>) {
        (self.inner, self.principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::GssCredential;
    use crate::error::TransportError;
    use crate::web::RequestAdapter;

    struct NoopCredential;

    impl GssCredential for NoopCredential {
        fn dispose(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn request_with(authorization: &'static str) -> RequestAdapter {
        RequestAdapter::new()
            .with_header(AUTHORIZATION, authorization)
            .with_auth_type("CONTAINER")
            .with_remote_user("container-user")
    }

    #[test]
    fn scheme_matches_negotiate_prefix() {
        assert_eq!(
            AuthScheme::from_authorization(b"Negotiate YIIF"),
            AuthScheme::Negotiate
        );
    }

    #[test]
    fn scheme_matches_basic_prefix() {
        assert_eq!(
            AuthScheme::from_authorization(b"Basic dXNlcg=="),
            AuthScheme::Basic
        );
    }

    #[test]
    fn scheme_is_case_sensitive() {
        assert_eq!(
            AuthScheme::from_authorization(b"negotiate YIIF"),
            AuthScheme::Unset
        );
        assert_eq!(AuthScheme::from_authorization(b"BASIC x"), AuthScheme::Unset);
    }

    #[test]
    fn short_values_do_not_panic() {
        assert_eq!(AuthScheme::from_authorization(b""), AuthScheme::Unset);
        assert_eq!(AuthScheme::from_authorization(b"Ne"), AuthScheme::Unset);
        assert_eq!(AuthScheme::from_authorization(b"Bas"), AuthScheme::Unset);
    }

    #[test]
    fn negotiate_wins_over_container_auth_type() {
        let view = AuthenticatedRequestView::new(
            request_with("Negotiate YIIF"),
            Some(KerberosPrincipal::new("alice@CORP.LOCAL")),
        );

        assert_eq!(view.resolve_auth_type().unwrap(), Some("Negotiate"));
    }

    #[test]
    fn unknown_scheme_falls_back_to_container() {
        let view = AuthenticatedRequestView::new(
            request_with("Bearer abc"),
            Some(KerberosPrincipal::new("alice")),
        );

        assert_eq!(view.resolve_auth_type().unwrap(), Some("CONTAINER"));
    }

    #[test]
    fn unknown_scheme_without_container_default_is_none() {
        let request = RequestAdapter::new().with_header(AUTHORIZATION, "Digest x");
        let view = AuthenticatedRequestView::anonymous(request);

        assert_eq!(view.resolve_auth_type().unwrap(), None);
    }

    #[test]
    fn missing_header_with_principal_fails_fast() {
        let view = AuthenticatedRequestView::new(
            RequestAdapter::new(),
            Some(KerberosPrincipal::new("alice@CORP.LOCAL")),
        );

        assert!(matches!(
            view.resolve_auth_type(),
            Err(Error::MissingHeader {
                header: "Authorization"
            })
        ));
    }

    #[test]
    fn missing_header_without_principal_uses_default() {
        let request = RequestAdapter::new().with_auth_type("FORM");
        let view = AuthenticatedRequestView::anonymous(request);

        assert_eq!(view.resolve_auth_type().unwrap(), Some("FORM"));
    }

    #[test]
    fn effective_user_name_strips_realm() {
        let view = AuthenticatedRequestView::new(
            request_with("Negotiate x"),
            Some(KerberosPrincipal::new("jdoe@EXAMPLE.COM")),
        );

        assert_eq!(view.effective_user_name(), Some("jdoe"));
    }

    #[test]
    fn effective_user_name_defers_without_principal() {
        let view = AuthenticatedRequestView::anonymous(request_with("Basic x"));

        assert_eq!(view.effective_user_name(), Some("container-user"));
    }

    #[test]
    fn effective_user_name_of_empty_principal_is_empty() {
        let view = AuthenticatedRequestView::new(
            request_with("Negotiate x"),
            Some(KerberosPrincipal::new("")),
        );

        assert_eq!(view.effective_user_name(), Some(""));
    }

    #[test]
    fn delegated_credential_is_returned_verbatim() {
        let credential = DelegatedCredential::new(NoopCredential);
        let principal =
            KerberosPrincipal::new("alice@CORP.LOCAL").with_delegated_credential(credential.clone());
        let view = AuthenticatedRequestView::new(request_with("Negotiate x"), Some(principal));

        assert!(view.delegated_credential().unwrap().same_handle(&credential));
    }

    #[test]
    fn delegated_credential_absent_without_principal() {
        let view = AuthenticatedRequestView::anonymous(request_with("Negotiate x"));

        assert!(view.delegated_credential().is_none());
        assert!(view.user_principal().is_none());
    }

    #[test]
    fn delegated_credential_absent_when_not_delegated() {
        let view = AuthenticatedRequestView::new(
            request_with("Negotiate x"),
            Some(KerberosPrincipal::new("alice")),
        );

        assert!(view.delegated_credential().is_none());
        assert_eq!(view.user_principal().unwrap().name(), "alice");
    }

    #[test]
    fn scheme_display() {
        assert_eq!(AuthScheme::Negotiate.to_string(), "Negotiate");
        assert_eq!(AuthScheme::Basic.to_string(), "Basic");
        assert_eq!(AuthScheme::Unset.to_string(), "unset");
    }
}
