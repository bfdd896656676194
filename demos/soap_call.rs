//! Authenticated SOAP call demonstration.
//!
//! This example walks through the client side against an offline transport:
//! 1. Build a request message and let the connection negotiate headers
//! 2. Read a fault from the error stream when the server answers 500
//! 3. See a duplicate Content-Type rejected before anything is sent
//!
//! Run with: `RUST_LOG=debug cargo run --example soap_call`

use spnego_core::config::ClientAuth;
use spnego_core::soap::{RecordingTransport, SoapConnection, SoapMessage, SoapVersion};
use spnego_core::{Error, TransportError};
use tracing_subscriber::EnvFilter;

const ENDPOINT: &str = "https://orders.corp.local/services/OrderService";

const RESPONSE: &str = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body><o:GetOrderResponse xmlns:o="urn:orders"><o:Status>shipped</o:Status></o:GetOrderResponse></env:Body>
</env:Envelope>"#;

const FAULT: &str = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault>
      <env:Code><env:Value>env:Receiver</env:Value></env:Code>
      <env:Reason><env:Text xml:lang="en">Order store unavailable</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;

fn get_order() -> Result<SoapMessage, Box<dyn std::error::Error>> {
    Ok(SoapMessage::new(
        SoapVersion::V1_2,
        r#"<o:GetOrder xmlns:o="urn:orders"><o:Id>7</o:Id></o:GetOrder>"#,
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Authenticated SOAP Call Example ===\n");

    // Scenario 1: successful call
    println!("--- Scenario 1: Successful Call ---");
    let factory = |auth: ClientAuth| -> Result<RecordingTransport, TransportError> {
        println!("Logging in via {:?}", auth.login_module_name());
        Ok(RecordingTransport::new().respond_with(RESPONSE))
    };
    let mut connection = SoapConnection::open(&factory, ClientAuth::login_module("orders-client"))?;

    let mut request = get_order()?;
    request
        .mime_headers_mut()
        .add_header("SOAPAction", "urn:orders/GetOrder");
    let response = connection.call(&request, ENDPOINT)?;
    println!("✓ Response operation: {:?}", response.body_operation());

    if let Some(sent) = connection.transport().and_then(|t| t.last_request()) {
        println!("  Content-Type sent: {:?}", sent.header("Content-Type"));
        println!("  SOAPAction sent:   {:?}", sent.header("SOAPAction"));
    }
    connection.close();

    // Scenario 2: server error with a fault entity
    println!("\n--- Scenario 2: Fault From Error Stream ---");
    let mut connection = SoapConnection::new(RecordingTransport::new().respond_with_error(FAULT));
    let response = connection.call(&get_order()?, ENDPOINT)?;
    match response.fault() {
        Some(fault) => println!("✓ Fault received: {}", fault),
        None => println!("✗ Expected a fault"),
    }

    // Scenario 3: malformed MIME headers
    println!("\n--- Scenario 3: Duplicate Content-Type ---");
    let mut request = get_order()?;
    request.mime_headers_mut().add_header("Content-Type", "text/xml");
    request
        .mime_headers_mut()
        .add_header("Content-Type", "application/soap+xml");
    match connection.call(&request, ENDPOINT) {
        Err(Error::Protocol(violation)) => println!("✓ Rejected: {}", violation),
        other => println!("✗ Unexpected outcome: {:?}", other.map(|_| ())),
    }
    if let Some(transport) = connection.transport() {
        println!("  Requests sent in total: {}", transport.connect_count());
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
