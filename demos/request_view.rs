//! Authenticated request view demonstration.
//!
//! Shows what application code sees after SPNEGO negotiation:
//! 1. A Negotiate request with a delegated credential
//! 2. An anonymous request deferring to the container
//! 3. A negotiator that refuses the token
//!
//! Run with: `cargo run --example request_view`

use http::header::AUTHORIZATION;
use spnego_core::web::{authenticate, RequestAdapter};
use spnego_core::{DelegatedCredential, GssCredential, KerberosPrincipal, TransportError};

struct DemoCredential;

impl GssCredential for DemoCredential {
    fn dispose(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

fn negotiate(request: &RequestAdapter) -> Result<Option<KerberosPrincipal>, TransportError> {
    let Some(value) = request.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    match value.as_bytes() {
        b"Negotiate YIIFoo" => Ok(Some(
            KerberosPrincipal::new("alice@CORP.LOCAL")
                .with_delegated_credential(DelegatedCredential::new(DemoCredential)),
        )),
        _ => Err(TransportError::Negotiation("defective token".to_string())),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Authenticated Request View Example ===\n");

    println!("--- Scenario 1: Negotiated Request ---");
    let request = RequestAdapter::new().with_header(AUTHORIZATION, "Negotiate YIIFoo");
    match authenticate(request, &negotiate) {
        Ok(view) => {
            println!("✓ Auth type: {:?}", view.resolve_auth_type().ok().flatten());
            println!("  User name: {:?}", view.effective_user_name());
            println!("  Principal: {:?}", view.user_principal().map(|p| p.name()));
            println!("  Delegated: {:?}", view.delegated_credential());
        }
        Err(err) => println!("✗ {}", err),
    }

    println!("\n--- Scenario 2: Anonymous Request ---");
    let request = RequestAdapter::new()
        .with_auth_type("FORM")
        .with_remote_user("guest");
    match authenticate(request, &negotiate) {
        Ok(view) => {
            println!("✓ Auth type: {:?}", view.resolve_auth_type().ok().flatten());
            println!("  User name: {:?}", view.effective_user_name());
        }
        Err(err) => println!("✗ {}", err),
    }

    println!("\n--- Scenario 3: Refused Token ---");
    let request = RequestAdapter::new().with_header(AUTHORIZATION, "Negotiate garbage");
    match authenticate(request, &negotiate) {
        Ok(_) => println!("✗ Expected a refusal"),
        Err(err) => println!("✓ Refused: {}", err),
    }

    println!("\n=== Example Complete ===");
}
