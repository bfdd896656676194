use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::header::AUTHORIZATION;
use spnego_core::web::{authenticate, AuthScheme, AuthenticatedRequestView, RequestAdapter};
use spnego_core::{
    DelegatedCredential, Error, GssCredential, KerberosPrincipal, ScopedCredential, TransportError,
};

struct CountingCredential {
    disposed: Arc<AtomicUsize>,
}

impl GssCredential for CountingCredential {
    fn dispose(&self) -> Result<(), TransportError> {
        self.disposed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn credential() -> (DelegatedCredential, Arc<AtomicUsize>) {
    let disposed = Arc::new(AtomicUsize::new(0));
    let credential = DelegatedCredential::new(CountingCredential {
        disposed: Arc::clone(&disposed),
    });
    (credential, disposed)
}

#[test]
fn negotiated_request_end_to_end() {
    let (credential, _) = credential();
    let request = RequestAdapter::new()
        .with_header(AUTHORIZATION, "Negotiate YIIFoo")
        .with_auth_type("BASIC")
        .with_remote_user("container");
    let negotiator = |_: &RequestAdapter| -> Result<_, TransportError> {
        Ok(Some(
            KerberosPrincipal::new("alice@CORP.LOCAL").with_delegated_credential(credential.clone()),
        ))
    };

    let view = authenticate(request, &negotiator).expect("negotiation succeeds");

    assert_eq!(view.resolve_auth_type().unwrap(), Some("Negotiate"));
    assert_eq!(view.effective_user_name(), Some("alice"));
    assert_eq!(view.delegated_credential(), Some(&credential));
    assert_eq!(view.user_principal().unwrap().realm(), Some("CORP.LOCAL"));
}

#[test]
fn http_request_works_as_inbound_request() {
    let request = http::Request::builder()
        .uri("/orders")
        .header(AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
        .body(())
        .unwrap();

    let view = AuthenticatedRequestView::new(request, Some(KerberosPrincipal::new("j@d@REALM")));

    assert_eq!(view.auth_scheme().unwrap(), AuthScheme::Basic);
    assert_eq!(view.effective_user_name(), Some("j@d"));
    assert_eq!(view.inner().uri(), "/orders");
}

#[test]
fn bare_http_request_has_no_container_defaults() {
    let request = http::Request::builder()
        .header(AUTHORIZATION, "Bearer token")
        .body(())
        .unwrap();

    let view = AuthenticatedRequestView::anonymous(request);

    assert_eq!(view.resolve_auth_type().unwrap(), None);
    assert_eq!(view.effective_user_name(), None);
}

#[test]
fn empty_authorization_header_falls_back() {
    let request = RequestAdapter::new()
        .with_header(AUTHORIZATION, "")
        .with_auth_type("CLIENT_CERT");
    let view = AuthenticatedRequestView::new(request, Some(KerberosPrincipal::new("jdoe")));

    assert_eq!(view.resolve_auth_type().unwrap(), Some("CLIENT_CERT"));
    assert_eq!(view.effective_user_name(), Some("jdoe"));
}

#[test]
fn principal_without_authorization_header_is_an_error() {
    let view = AuthenticatedRequestView::new(
        RequestAdapter::new(),
        Some(KerberosPrincipal::new("alice@CORP.LOCAL")),
    );

    let err = view.resolve_auth_type().unwrap_err();

    assert!(matches!(err, Error::MissingHeader { header: "Authorization" }));
    assert!(err.to_string().contains("Authorization"));
    // identity queries keep working
    assert_eq!(view.effective_user_name(), Some("alice"));
}

#[test]
fn into_parts_returns_request_and_principal() {
    let request = RequestAdapter::new().with_header(AUTHORIZATION, "Negotiate x");
    let view = AuthenticatedRequestView::new(request, Some(KerberosPrincipal::new("bob@R")));

    let (request, principal) = view.into_parts();

    assert!(request.headers().contains_key(AUTHORIZATION));
    assert_eq!(principal.unwrap().name(), "bob@R");
}

#[test]
fn credential_output_is_redacted() {
    let (credential, _) = credential();
    let principal = KerberosPrincipal::new("alice@CORP.LOCAL").with_delegated_credential(credential);

    let debug_out = format!("{:?}", principal);

    assert!(debug_out.contains("alice@CORP.LOCAL"));
    assert!(debug_out.contains("[REDACTED]"));
    assert!(!debug_out.contains("CountingCredential"));
}

#[test]
fn scoped_credential_disposes_once_on_drop() {
    let (credential, disposed) = credential();

    {
        let scoped = ScopedCredential::new(credential.clone(), true);
        assert!(scoped.credential().same_handle(&credential));
    }

    assert_eq!(disposed.load(Ordering::SeqCst), 1);
}

#[test]
fn scoped_credential_can_keep_the_credential() {
    let (credential, disposed) = credential();

    drop(ScopedCredential::new(credential, false));

    assert_eq!(disposed.load(Ordering::SeqCst), 0);
}
