use std::error::Error as StdError;
use std::fmt;
use std::io;

use thiserror::Error;

/// Errors surfaced by the request view and the SOAP invoker.
#[derive(Debug, Error)]
pub enum Error {
    /// Outgoing MIME metadata cannot be mapped onto HTTP headers.
    ///
    /// This is a caller bug and is raised before any network I/O.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    /// An authenticated request is missing the header its principal came from.
    #[error("`{header}` header is missing from an authenticated request")]
    MissingHeader {
        /// Name of the missing header
        header: &'static str,
    },

    /// The negotiator could not authenticate an inbound request.
    #[error("inbound negotiation failed: {0}")]
    Authentication(#[source] TransportError),

    /// A SOAP call failed; the cause is carried inside.
    #[error(transparent)]
    Soap(#[from] SoapError),
}

/// Malformed outgoing MIME metadata.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ProtocolViolation {
    /// The kind of violation that occurred
    pub kind: ViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl ProtocolViolation {
    /// Creates a new violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The kind of protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// `Content-Type` appears more than once in the MIME headers
    DuplicateContentType,
    /// `SOAPAction` appears more than once in the MIME headers
    DuplicateSoapAction,
    /// A MIME header value cannot be sent as an HTTP header value
    InvalidHeaderValue {
        /// Header whose value was rejected
        header: &'static str,
    },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::DuplicateContentType => write!(f, "duplicate Content-Type"),
            ViolationKind::DuplicateSoapAction => write!(f, "duplicate SOAPAction"),
            ViolationKind::InvalidHeaderValue { header } => {
                write!(f, "invalid value for '{}'", header)
            }
        }
    }
}

/// Failures reported by an authenticated transport or a credential.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The SPNEGO handshake was refused (bad credentials, expired ticket, ...).
    #[error("SPNEGO negotiation failed: {0}")]
    Negotiation(String),

    /// The GSS layer reported a failure.
    #[error("GSS failure (major {major:#x}, minor {minor:#x}): {message}")]
    Gss {
        /// GSS major status code
        major: u32,
        /// Mechanism-specific minor status code
        minor: u32,
        /// Display text for the status
        message: String,
    },

    /// Network-level failure.
    #[error("transport I/O failure: {0}")]
    Io(#[from] io::Error),
}

/// Failures while building a [`SoapMessage`](crate::soap::SoapMessage) from bytes.
#[derive(Debug, Error)]
pub enum MessageError {
    /// Reading the underlying stream failed.
    #[error("failed to read SOAP message: {0}")]
    Io(#[from] io::Error),

    /// The content is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The content carries a DOCTYPE declaration.
    #[error("DOCTYPE declarations are not allowed in SOAP messages")]
    Doctype,

    /// No `Envelope` root element was found.
    #[error("no SOAP Envelope found")]
    MissingEnvelope,

    /// The envelope belongs to another SOAP version.
    #[error("expected a {expected} envelope, found namespace '{found}'")]
    VersionMismatch {
        /// Version the message was parsed as
        expected: crate::soap::SoapVersion,
        /// Namespace URI of the envelope that was found
        found: String,
    },

    /// The envelope has no `Body` element.
    #[error("SOAP Envelope has no Body")]
    MissingBody,

    /// Character data is not valid UTF-8.
    #[error("SOAP message text is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A second root element follows the envelope.
    #[error("unexpected element '{0}' after the SOAP Envelope")]
    ExtraRoot(String),

    /// The document ended before every element was closed.
    #[error("SOAP message is truncated")]
    Truncated,
}

/// A SOAP call failure.
///
/// Negotiation, GSS and I/O failures are collapsed into this one type. The
/// original failure is kept as the [`source`](StdError::source) and can be
/// inspected with [`SoapError::cause`] or the typed accessors.
#[derive(Debug, Error)]
#[error("SOAP call failed: {cause}")]
pub struct SoapError {
    #[source]
    cause: Box<dyn StdError + Send + Sync + 'static>,
}

impl SoapError {
    pub(crate) fn new(cause: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    /// Returns the wrapped cause.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Returns the transport failure, if that is what ended the call.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.cause.downcast_ref()
    }

    /// Returns the message failure, if the response could not be parsed.
    pub fn message_error(&self) -> Option<&MessageError> {
        self.cause.downcast_ref()
    }
}

/// Reason a call could not even start.
#[derive(Debug, Error)]
pub(crate) enum CallSetupError {
    #[error("the connection no longer owns a transport")]
    Released,
    #[error("invalid endpoint '{endpoint}': {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}
