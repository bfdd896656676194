//! The authenticated HTTP transport a [`SoapConnection`](super::SoapConnection)
//! drives.

use std::io::Read;

use http::{HeaderName, HeaderValue};
use url::Url;

use crate::config::ClientAuth;
use crate::error::TransportError;

/// An HTTP client that performs SPNEGO negotiation with the server.
///
/// One transport serves one logical connection and handles one request at a
/// time. The call sequence per request is:
///
/// ```text
/// add_request_header* -> connect -> input_stream | error_stream -> disconnect
/// ```
///
/// # Contract
///
/// - `connect` performs the Negotiate handshake and sends `body` as the
///   request entity.
/// - `input_stream` fails with an I/O error on non-success statuses. The
///   server's error entity is then available from `error_stream`.
/// - `disconnect` resets per-request state (pending headers, streams) and
///   may be called any number of times, connected or not.
pub trait AuthenticatedHttpTransport {
    /// Queues a header for the next request.
    fn add_request_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Negotiates with `endpoint` and sends `body`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if negotiation or sending fails.
    fn connect(&mut self, endpoint: &Url, body: &[u8]) -> Result<(), TransportError>;

    /// Returns the response entity of a successful request.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the response is not available or the server
    /// answered with an error status.
    fn input_stream(&mut self) -> std::io::Result<Box<dyn Read + '_>>;

    /// Returns the response entity of a failed request, if the server sent one.
    fn error_stream(&mut self) -> Option<Box<dyn Read + '_>>;

    /// Releases the connection.
    fn disconnect(&mut self);
}

impl<T: AuthenticatedHttpTransport + ?Sized> AuthenticatedHttpTransport for Box<T> {
    fn add_request_header(&mut self, name: HeaderName, value: HeaderValue) {
        (**self).add_request_header(name, value)
    }

    fn connect(&mut self, endpoint: &Url, body: &[u8]) -> Result<(), TransportError> {
        (**self).connect(endpoint, body)
    }

    fn input_stream(&mut self) -> std::io::Result<Box<dyn Read + '_>> {
        (**self).input_stream()
    }

    fn error_stream(&mut self) -> Option<Box<dyn Read + '_>> {
        (**self).error_stream()
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}

/// Builds a transport for a given client authentication.
///
/// Implemented for any `Fn(ClientAuth) -> Result<T, TransportError>`.
pub trait TransportFactory {
    /// Transport produced by this factory.
    type Transport: AuthenticatedHttpTransport;

    /// Creates a transport that authenticates as `auth` describes.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the client login fails.
    fn open(&self, auth: ClientAuth) -> Result<Self::Transport, TransportError>;
}

impl<F, T> TransportFactory for F
where
    F: Fn(ClientAuth) -> Result<T, TransportError>,
    T: AuthenticatedHttpTransport,
{
    type Transport = T;

    fn open(&self, auth: ClientAuth) -> Result<T, TransportError> {
        self(auth)
    }
}
