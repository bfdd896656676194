use std::io::{self, Cursor, Read};

use http::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::TransportError;

use super::AuthenticatedHttpTransport;

/// A request as it reached a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Target endpoint
    pub endpoint: Url,
    /// Headers queued before `connect`
    pub headers: HeaderMap,
    /// Request entity
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Returns the single value of `name` as text, if present and printable.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Success(Vec<u8>),
    Failure { entity: Option<Vec<u8>> },
    // input stream opens, then fails partway through
    BrokenStream { entity: Vec<u8> },
}

/// Reader that fails every read with a connection reset.
struct ResetRead;

impl Read for ResetRead {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset while reading response",
        ))
    }
}

/// An offline [`AuthenticatedHttpTransport`].
///
/// Records every request and disconnect, performs no network I/O and
/// replays a scripted reply. Intended for tests and demos.
///
/// # Examples
///
/// ```
/// use spnego_core::soap::{AuthenticatedHttpTransport, RecordingTransport};
/// use std::io::Read;
///
/// let mut transport = RecordingTransport::new().respond_with("<ok/>");
/// let endpoint = url::Url::parse("https://svc.example.com/soap").unwrap();
///
/// transport.connect(&endpoint, b"<request/>").unwrap();
/// let mut body = String::new();
/// transport.input_stream().unwrap().read_to_string(&mut body).unwrap();
/// transport.disconnect();
///
/// assert_eq!(body, "<ok/>");
/// assert_eq!(transport.requests().len(), 1);
/// assert_eq!(transport.disconnect_count(), 1);
/// ```
#[derive(Debug)]
pub struct RecordingTransport {
    pending: HeaderMap,
    requests: Vec<RecordedRequest>,
    reply: Reply,
    connect_failure: Option<TransportError>,
    connected: bool,
    disconnects: usize,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTransport {
    /// Creates a transport whose replies carry an empty entity.
    pub fn new() -> Self {
        Self {
            pending: HeaderMap::new(),
            requests: Vec::new(),
            reply: Reply::Success(Vec::new()),
            connect_failure: None,
            connected: false,
            disconnects: 0,
        }
    }

    /// Answers every request successfully with `entity`.
    pub fn respond_with(mut self, entity: impl Into<Vec<u8>>) -> Self {
        self.reply = Reply::Success(entity.into());
        self
    }

    /// Answers every request with an error status carrying `entity`.
    ///
    /// `input_stream` fails and `error_stream` yields `entity`.
    pub fn respond_with_error(mut self, entity: impl Into<Vec<u8>>) -> Self {
        self.reply = Reply::Failure {
            entity: Some(entity.into()),
        };
        self
    }

    /// Opens the response stream but fails partway through reading it.
    ///
    /// `input_stream` succeeds, its reader errors after a few bytes, and
    /// `error_stream` yields `entity`.
    pub fn respond_with_broken_stream(mut self, entity: impl Into<Vec<u8>>) -> Self {
        self.reply = Reply::BrokenStream {
            entity: entity.into(),
        };
        self
    }

    /// Answers every request with an error status and no entity.
    pub fn respond_without_entity(mut self) -> Self {
        self.reply = Reply::Failure { entity: None };
        self
    }

    /// Fails the next `connect` with `error`. The request is still recorded.
    pub fn fail_connect(mut self, error: TransportError) -> Self {
        self.connect_failure = Some(error);
        self
    }

    /// Returns every request that reached `connect`.
    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<&RecordedRequest> {
        self.requests.last()
    }

    /// Returns how many times `connect` was called.
    pub fn connect_count(&self) -> usize {
        self.requests.len()
    }

    /// Returns how many times `disconnect` was called.
    pub fn disconnect_count(&self) -> usize {
        self.disconnects
    }

    /// Returns headers queued for a request that has not been sent.
    pub fn pending_headers(&self) -> &HeaderMap {
        &self.pending
    }

    /// Returns true between a successful `connect` and the next `disconnect`.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl AuthenticatedHttpTransport for RecordingTransport {
    fn add_request_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.pending.append(name, value);
    }

    fn connect(&mut self, endpoint: &Url, body: &[u8]) -> Result<(), TransportError> {
        self.requests.push(RecordedRequest {
            endpoint: endpoint.clone(),
            headers: std::mem::take(&mut self.pending),
            body: body.to_vec(),
        });

        if let Some(error) = self.connect_failure.take() {
            return Err(error);
        }
        self.connected = true;
        Ok(())
    }

    fn input_stream(&mut self) -> io::Result<Box<dyn Read + '_>> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "not connected"));
        }
        match &self.reply {
            Reply::Success(entity) => Ok(Box::new(Cursor::new(entity.as_slice()))),
            Reply::BrokenStream { .. } => {
                Ok(Box::new(Cursor::new(b"<env:Envel".as_slice()).chain(ResetRead)))
            }
            Reply::Failure { .. } => Err(io::Error::new(
                io::ErrorKind::Other,
                "server returned HTTP 500",
            )),
        }
    }

    fn error_stream(&mut self) -> Option<Box<dyn Read + '_>> {
        if !self.connected {
            return None;
        }
        match &self.reply {
            Reply::Failure {
                entity: Some(entity),
            }
            | Reply::BrokenStream { entity } => Some(Box::new(Cursor::new(entity.as_slice()))),
            _ => None,
        }
    }

    fn disconnect(&mut self) {
        self.pending.clear();
        self.connected = false;
        self.disconnects += 1;
    }
}
