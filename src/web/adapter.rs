//! The "underlying request" seen by the authenticated view.

use http::header::{HeaderMap, HeaderName, HeaderValue};

/// Read access to an inbound HTTP request.
///
/// This trait is the boundary between web frameworks and the
/// [`AuthenticatedRequestView`](super::AuthenticatedRequestView). The view
/// reads headers through it and forwards the questions it does not answer
/// itself (default auth type, default remote user) to it.
///
/// `http::Request<B>` implements it with no default auth type or remote
/// user. Framework integrations that track those can use
/// [`RequestAdapter`] or implement the trait directly.
pub trait InboundRequest {
    /// Returns the first value of the named header.
    fn header(&self, name: &HeaderName) -> Option<&HeaderValue>;

    /// The auth type the request reports on its own.
    fn auth_type(&self) -> Option<&str> {
        None
    }

    /// The remote user the request reports on its own.
    fn remote_user(&self) -> Option<&str> {
        None
    }
}

impl<B> InboundRequest for http::Request<B> {
    fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers().get(name)
    }
}

impl<R: InboundRequest + ?Sized> InboundRequest for &R {
    fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        (**self).header(name)
    }

    fn auth_type(&self) -> Option<&str> {
        (**self).auth_type()
    }

    fn remote_user(&self) -> Option<&str> {
        (**self).remote_user()
    }
}

/// An owned inbound request.
///
/// `RequestAdapter` holds simple, owned data so it does not couple to any
/// framework's request type. Integrations copy what they have (headers, the
/// container's own auth type and remote user) into it.
///
/// # Examples
///
/// ```
/// use http::header::AUTHORIZATION;
/// use spnego_core::web::{InboundRequest, RequestAdapter};
///
/// let request = RequestAdapter::new()
///     .with_header(AUTHORIZATION, "Basic YWxpY2U6cHc=")
///     .with_remote_user("alice");
///
/// assert!(request.header(&AUTHORIZATION).is_some());
/// assert_eq!(request.remote_user(), Some("alice"));
/// assert_eq!(request.auth_type(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestAdapter {
    headers: HeaderMap,
    auth_type: Option<String>,
    remote_user: Option<String>,
}

impl RequestAdapter {
    /// Creates an adapter with no headers and no defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter over existing headers.
    pub fn from_headers(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Appends a header value.
    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.append(name, HeaderValue::from_static(value));
        self
    }

    /// Appends an already validated header value.
    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Sets the auth type reported when the view cannot derive one.
    pub fn with_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = Some(auth_type.into());
        self
    }

    /// Sets the remote user reported for unauthenticated requests.
    pub fn with_remote_user(mut self, remote_user: impl Into<String>) -> Self {
        self.remote_user = Some(remote_user.into());
        self
    }

    /// Returns all headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl InboundRequest for RequestAdapter {
    fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    fn auth_type(&self) -> Option<&str> {
        self.auth_type.as_deref()
    }

    fn remote_user(&self) -> Option<&str> {
        self.remote_user.as_deref()
    }
}
