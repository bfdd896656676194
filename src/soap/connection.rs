//! SOAP calls over an authenticated transport.

use std::ops::{Deref, DerefMut};

use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue};
use url::Url;

use crate::config::ClientAuth;
use crate::error::{
    CallSetupError, Error, MessageError, ProtocolViolation, SoapError, TransportError,
    ViolationKind,
};

use super::{AuthenticatedHttpTransport, MimeHeaders, SoapMessage, SoapVersion, TransportFactory};

/// `Content-Type` sent when the message names neither a content type nor a
/// `SOAPAction`.
pub const SOAP_12_CONTENT_TYPE: &str = "application/soap+xml; charset=UTF-8;";

/// `Content-Type` sent when the message names a `SOAPAction` but no content type.
pub const SOAP_11_CONTENT_TYPE: &str = "text/xml; charset=UTF-8;";

const SOAP_ACTION: &str = "SOAPAction";

/// A SOAP connection whose requests are authenticated with SPNEGO.
///
/// Each [`call`](Self::call) negotiates HTTP headers from the message's MIME
/// headers, sends the serialized envelope over the transport and parses the
/// response. The transport is disconnected when the call returns, whatever
/// the outcome.
///
/// # Examples
///
/// ```
/// use spnego_core::soap::{RecordingTransport, SoapConnection, SoapMessage, SoapVersion};
///
/// let transport = RecordingTransport::new().respond_with(
///     r#"<e:Envelope xmlns:e="http://www.w3.org/2003/05/soap-envelope"><e:Body><Pong/></e:Body></e:Envelope>"#,
/// );
/// let mut connection = SoapConnection::new(transport);
///
/// let request = SoapMessage::new(SoapVersion::V1_2, "<Ping/>").unwrap();
/// let response = connection.call(&request, "https://svc.example.com/soap").unwrap();
///
/// assert_eq!(response.body_operation(), Some("Pong"));
/// connection.close();
/// ```
#[derive(Debug)]
pub struct SoapConnection<T: AuthenticatedHttpTransport> {
    transport: Option<T>,
    response_version: SoapVersion,
}

impl<T: AuthenticatedHttpTransport> SoapConnection<T> {
    /// Wraps an existing transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Some(transport),
            response_version: SoapVersion::V1_2,
        }
    }

    /// Opens a transport from `factory`, logging in as `auth` describes.
    ///
    /// # Errors
    ///
    /// Returns the factory's [`TransportError`] if the client login fails.
    pub fn open<F>(factory: &F, auth: ClientAuth) -> Result<Self, TransportError>
    where
        F: TransportFactory<Transport = T> + ?Sized,
    {
        let login_module = auth.login_module_name().map(str::to_owned);

        match factory.open(auth) {
            Ok(transport) => {
                tracing::debug!(login_module = ?login_module, "authenticated transport opened");
                Ok(Self::new(transport))
            }
            Err(error) => {
                tracing::warn!(login_module = ?login_module, %error, "client login failed");
                Err(error)
            }
        }
    }

    /// Parses responses as `version` instead of SOAP 1.2.
    pub fn with_response_version(mut self, version: SoapVersion) -> Self {
        self.response_version = version;
        self
    }

    /// Returns the SOAP version responses are parsed as.
    pub fn response_version(&self) -> SoapVersion {
        self.response_version
    }

    /// Returns the transport, unless it was released.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Detaches and returns the transport.
    ///
    /// Afterwards [`close`](Self::close) does nothing and
    /// [`call`](Self::call) fails.
    pub fn release(&mut self) -> Option<T> {
        self.transport.take()
    }

    /// Sends `request` to `endpoint` and returns the parsed response.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if `Content-Type` or `SOAPAction` appears more
    ///   than once in the MIME headers, or cannot be sent as an HTTP header.
    ///   Nothing is sent.
    /// - [`Error::Soap`] for every other failure: invalid endpoint,
    ///   negotiation or GSS failure, I/O failure, unparsable response.
    pub fn call(&mut self, request: &SoapMessage, endpoint: &str) -> Result<SoapMessage, Error> {
        let version = self.response_version;
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| SoapError::new(CallSetupError::Released))?;
        let mut transport = DisconnectGuard::new(transport);

        let headers = NegotiatedHeaders::from_mime(request.mime_headers())?;
        let url = Url::parse(endpoint).map_err(|source| {
            SoapError::new(CallSetupError::Endpoint {
                endpoint: endpoint.to_string(),
                source,
            })
        })?;

        let mut body = Vec::new();
        request
            .write_to(&mut body)
            .map_err(|error| SoapError::new(TransportError::Io(error)))?;

        tracing::debug!(
            endpoint = %url,
            content_type = ?headers.content_type,
            soap_action = ?headers.soap_action,
            body_len = body.len(),
            "sending SOAP request"
        );
        headers.apply(&mut *transport);

        transport.connect(&url, &body).map_err(|error| {
            tracing::warn!(endpoint = %url, %error, "authenticated connect failed");
            SoapError::new(error)
        })?;
        drop(body);

        Ok(read_response(&mut *transport, version)?)
    }

    /// Disconnects the transport. Safe to call repeatedly, or before any call.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect();
        }
    }
}

impl<T: AuthenticatedHttpTransport> Drop for SoapConnection<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Disconnects the borrowed transport when dropped, including on unwind.
struct DisconnectGuard<'a, T: AuthenticatedHttpTransport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: AuthenticatedHttpTransport + ?Sized> DisconnectGuard<'a, T> {
    fn new(transport: &'a mut T) -> Self {
        Self { transport }
    }
}

impl<T: AuthenticatedHttpTransport + ?Sized> Deref for DisconnectGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.transport
    }
}

impl<T: AuthenticatedHttpTransport + ?Sized> DerefMut for DisconnectGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: AuthenticatedHttpTransport + ?Sized> Drop for DisconnectGuard<'_, T> {
    fn drop(&mut self) {
        self.transport.disconnect();
        tracing::debug!("transport disconnected");
    }
}

/// HTTP headers derived from a message's MIME headers.
#[derive(Debug)]
struct NegotiatedHeaders {
    content_type: HeaderValue,
    soap_action: Option<HeaderValue>,
}

impl NegotiatedHeaders {
    fn from_mime(mime: &MimeHeaders) -> Result<Self, ProtocolViolation> {
        let content_type = single_value(mime, "Content-Type", ViolationKind::DuplicateContentType)?;
        let soap_action = single_value(mime, SOAP_ACTION, ViolationKind::DuplicateSoapAction)?;

        let content_type = match content_type {
            Some(value) => value,
            None if soap_action.is_some() => HeaderValue::from_static(SOAP_11_CONTENT_TYPE),
            None => HeaderValue::from_static(SOAP_12_CONTENT_TYPE),
        };

        Ok(Self {
            content_type,
            soap_action,
        })
    }

    fn apply<T: AuthenticatedHttpTransport + ?Sized>(&self, transport: &mut T) {
        transport.add_request_header(CONTENT_TYPE, self.content_type.clone());
        if let Some(action) = &self.soap_action {
            transport.add_request_header(HeaderName::from_static("soapaction"), action.clone());
        }
    }
}

fn single_value(
    mime: &MimeHeaders,
    name: &'static str,
    duplicate: ViolationKind,
) -> Result<Option<HeaderValue>, ProtocolViolation> {
    match mime.header(name).as_slice() {
        [] => Ok(None),
        [value] => HeaderValue::from_str(value).map(Some).map_err(|_| {
            ProtocolViolation::new(
                ViolationKind::InvalidHeaderValue { header: name },
                format!("{} value cannot be sent as an HTTP header", name),
            )
        }),
        _ => Err(ProtocolViolation::new(
            duplicate,
            format!("{} defined more than once", name),
        )),
    }
}

/// Parses the response entity, falling back to the error stream once on I/O failure.
fn read_response<T: AuthenticatedHttpTransport + ?Sized>(
    transport: &mut T,
    version: SoapVersion,
) -> Result<SoapMessage, SoapError> {
    let primary = match transport.input_stream() {
        Ok(stream) => SoapMessage::read_from(version, stream),
        Err(error) => Err(MessageError::Io(error)),
    };

    match primary {
        Err(MessageError::Io(error)) => {
            tracing::debug!(%error, "input stream failed, reading error stream");
            match transport.error_stream() {
                Some(stream) => SoapMessage::read_from(version, stream).map_err(SoapError::new),
                None => Err(SoapError::new(MessageError::Io(error))),
            }
        }
        other => other.map_err(SoapError::new),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::RecordingTransport;

    const ENDPOINT: &str = "https://svc.example.com/soap";

    const PONG: &str = r#"<e:Envelope xmlns:e="http://www.w3.org/2003/05/soap-envelope"><e:Body><Pong/></e:Body></e:Envelope>"#;

    fn ping() -> SoapMessage {
        SoapMessage::new(SoapVersion::V1_2, "<Ping/>").unwrap()
    }

    #[test]
    fn negotiates_default_content_type() {
        let headers = NegotiatedHeaders::from_mime(&MimeHeaders::new()).unwrap();

        assert_eq!(headers.content_type, SOAP_12_CONTENT_TYPE);
        assert!(headers.soap_action.is_none());
    }

    #[test]
    fn soap_action_selects_soap_11_content_type() {
        let mut mime = MimeHeaders::new();
        mime.add_header("SOAPAction", "urn:Ping");

        let headers = NegotiatedHeaders::from_mime(&mime).unwrap();

        assert_eq!(headers.content_type, SOAP_11_CONTENT_TYPE);
        assert_eq!(headers.soap_action.unwrap(), "urn:Ping");
    }

    #[test]
    fn explicit_content_type_is_kept() {
        let mut mime = MimeHeaders::new();
        mime.add_header("content-type", "application/soap+xml; action=\"urn:x\"");
        mime.add_header("SOAPAction", "urn:x");

        let headers = NegotiatedHeaders::from_mime(&mime).unwrap();

        assert_eq!(headers.content_type, "application/soap+xml; action=\"urn:x\"");
    }

    #[test]
    fn content_type_duplicate_is_checked_first() {
        let mut mime = MimeHeaders::new();
        mime.add_header("Content-Type", "a");
        mime.add_header("Content-Type", "b");
        mime.add_header("SOAPAction", "c");
        mime.add_header("SOAPAction", "d");

        let violation = NegotiatedHeaders::from_mime(&mime).unwrap_err();

        assert_eq!(violation.kind, ViolationKind::DuplicateContentType);
        assert_eq!(violation.message, "Content-Type defined more than once");
    }

    #[test]
    fn unsendable_value_is_a_violation() {
        let mut mime = MimeHeaders::new();
        mime.add_header("SOAPAction", "urn:a\r\nX-Injected: 1");

        let violation = NegotiatedHeaders::from_mime(&mime).unwrap_err();

        assert_eq!(
            violation.kind,
            ViolationKind::InvalidHeaderValue {
                header: "SOAPAction"
            }
        );
    }

    #[test]
    fn call_disconnects_after_success() {
        let mut connection = SoapConnection::new(RecordingTransport::new().respond_with(PONG));

        connection.call(&ping(), ENDPOINT).unwrap();

        let transport = connection.transport().unwrap();
        assert_eq!(transport.connect_count(), 1);
        assert_eq!(transport.disconnect_count(), 1);
        assert!(!transport.is_connected());
    }

    #[test]
    fn violation_still_disconnects() {
        let mut connection = SoapConnection::new(RecordingTransport::new());
        let mut request = ping();
        request.mime_headers_mut().add_header("SOAPAction", "a");
        request.mime_headers_mut().add_header("SOAPAction", "b");

        let result = connection.call(&request, ENDPOINT);

        assert!(matches!(result, Err(Error::Protocol(_))));
        let transport = connection.transport().unwrap();
        assert_eq!(transport.connect_count(), 0);
        assert_eq!(transport.disconnect_count(), 1);
    }

    #[test]
    fn invalid_endpoint_is_a_soap_error() {
        let mut connection = SoapConnection::new(RecordingTransport::new());

        let result = connection.call(&ping(), "not a url");

        assert!(matches!(result, Err(Error::Soap(_))));
        assert_eq!(connection.transport().unwrap().connect_count(), 0);
    }

    #[test]
    fn released_connection_cannot_call() {
        let mut connection = SoapConnection::new(RecordingTransport::new().respond_with(PONG));
        let transport = connection.release().unwrap();

        connection.close();
        let result = connection.call(&ping(), ENDPOINT);

        assert!(matches!(result, Err(Error::Soap(_))));
        assert_eq!(transport.disconnect_count(), 0);
    }

    #[test]
    fn open_uses_factory() {
        let factory = |auth: ClientAuth| -> Result<RecordingTransport, TransportError> {
            assert_eq!(auth.login_module_name(), Some("svc-login"));
            Ok(RecordingTransport::new())
        };

        let connection = SoapConnection::open(&factory, ClientAuth::login_module("svc-login"));

        assert!(connection.is_ok());
    }

    #[test]
    fn open_reports_login_failure() {
        let factory = |_: ClientAuth| -> Result<RecordingTransport, TransportError> {
            Err(TransportError::Negotiation("pre-authentication failed".to_string()))
        };

        let result = SoapConnection::open(&factory, ClientAuth::login_module("svc-login"));

        assert!(matches!(result, Err(TransportError::Negotiation(_))));
    }

    #[test]
    fn response_version_is_configurable() {
        let soap11 = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><Pong/></s:Body></s:Envelope>"#;
        let mut connection = SoapConnection::new(RecordingTransport::new().respond_with(soap11))
            .with_response_version(SoapVersion::V1_1);

        let response = connection.call(&ping(), ENDPOINT).unwrap();

        assert_eq!(connection.response_version(), SoapVersion::V1_1);
        assert_eq!(response.version(), SoapVersion::V1_1);
    }
}
