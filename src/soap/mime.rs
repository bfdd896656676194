/// MIME headers attached to a SOAP message.
///
/// Names are matched case-insensitively and a name may carry several
/// values, kept in insertion order.
///
/// # Examples
///
/// ```
/// use spnego_core::soap::MimeHeaders;
///
/// let mut headers = MimeHeaders::new();
/// headers.add_header("SOAPAction", "urn:GetUser");
/// headers.add_header("soapaction", "urn:Other");
///
/// assert_eq!(headers.header("SOAPACTION"), vec!["urn:GetUser", "urn:Other"]);
/// assert!(headers.header("Content-Type").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeHeaders {
    entries: Vec<(String, String)>,
}

impl MimeHeaders {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every value of the named header, in insertion order.
    pub fn header(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Adds a value, keeping existing values of the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces all values of the named header with `value`.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove_header(&name);
        self.entries.push((name, value.into()));
    }

    /// Removes all values of the named header.
    pub fn remove_header(&mut self, name: &str) {
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = MimeHeaders::new();
        headers.add_header("Content-Type", "text/xml");

        assert_eq!(headers.header("content-type"), vec!["text/xml"]);
    }

    #[test]
    fn set_header_replaces_all_values() {
        let mut headers = MimeHeaders::new();
        headers.add_header("Content-Type", "text/xml");
        headers.add_header("content-type", "application/xml");

        headers.set_header("CONTENT-TYPE", "application/soap+xml");

        assert_eq!(headers.header("Content-Type"), vec!["application/soap+xml"]);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn remove_header_drops_every_value() {
        let mut headers = MimeHeaders::new();
        headers.add_header("SOAPAction", "a");
        headers.add_header("SOAPAction", "b");
        headers.add_header("X-Trace", "1");

        headers.remove_header("soapaction");

        assert!(headers.header("SOAPAction").is_empty());
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("X-Trace", "1")]);
    }

    #[test]
    fn new_headers_are_empty() {
        assert!(MimeHeaders::new().is_empty());
    }
}
