//! Client side: SOAP calls authenticated with SPNEGO.
//!
//! A [`SoapConnection`] owns an [`AuthenticatedHttpTransport`] and turns each
//! call into:
//!
//! ```text
//! SoapMessage MIME headers
//!   ↓ Content-Type / SOAPAction negotiation (ProtocolViolation on duplicates)
//! serialized envelope
//!   ↓ connect (Negotiate handshake)
//! input stream, or error stream once on I/O failure
//!   ↓ parse
//! SoapMessage
//! ```
//!
//! The transport is disconnected on every exit path.

mod connection;
mod message;
mod mime;
mod recording;
mod transport;

pub use connection::{SoapConnection, SOAP_11_CONTENT_TYPE, SOAP_12_CONTENT_TYPE};
pub use message::{SoapFault, SoapMessage, SoapVersion, SOAP_11_NS, SOAP_12_NS};
pub use mime::MimeHeaders;
pub use recording::{RecordedRequest, RecordingTransport};
pub use transport::{AuthenticatedHttpTransport, TransportFactory};
