//! SOAP message model and envelope parsing.
//!
//! Parsing uses quick-xml, which never expands entities. DOCTYPE
//! declarations are rejected outright.

use std::fmt;
use std::io::{Read, Write};

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::MessageError;

use super::MimeHeaders;

/// SOAP 1.1 envelope namespace.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.2 envelope namespace.
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// SOAP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoapVersion {
    /// SOAP 1.1
    V1_1,
    /// SOAP 1.2
    #[default]
    V1_2,
}

impl SoapVersion {
    /// Returns the envelope namespace URI.
    pub fn namespace(&self) -> &'static str {
        match self {
            SoapVersion::V1_1 => SOAP_11_NS,
            SoapVersion::V1_2 => SOAP_12_NS,
        }
    }
}

impl fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoapVersion::V1_1 => write!(f, "SOAP 1.1"),
            SoapVersion::V1_2 => write!(f, "SOAP 1.2"),
        }
    }
}

/// A SOAP fault carried in a message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    code: String,
    reason: String,
}

impl SoapFault {
    /// The fault code (`Code/Value` in 1.2, `faultcode` in 1.1).
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The fault reason (`Reason/Text` in 1.2, `faultstring` in 1.1).
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.reason)
    }
}

/// A SOAP message: MIME headers plus a validated envelope.
///
/// # Examples
///
/// ```
/// use spnego_core::soap::{SoapMessage, SoapVersion};
///
/// let message = SoapMessage::new(
///     SoapVersion::V1_2,
///     r#"<m:GetUser xmlns:m="urn:users"><m:Id>42</m:Id></m:GetUser>"#,
/// )
/// .unwrap();
///
/// assert_eq!(message.body_operation(), Some("GetUser"));
/// assert!(!message.is_fault());
/// ```
#[derive(Debug, Clone)]
pub struct SoapMessage {
    version: SoapVersion,
    mime_headers: MimeHeaders,
    content: Vec<u8>,
    operation: Option<String>,
    fault: Option<SoapFault>,
}

impl SoapMessage {
    /// Builds a message whose body holds `body_xml`.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageError`] if `body_xml` does not produce a
    /// well-formed envelope.
    pub fn new(version: SoapVersion, body_xml: &str) -> Result<Self, MessageError> {
        let envelope = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><env:Envelope xmlns:env="{}"><env:Body>{}</env:Body></env:Envelope>"#,
            version.namespace(),
            body_xml
        );
        Self::from_bytes(version, envelope)
    }

    /// Parses a complete envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageError`] if the content is not a well-formed
    /// envelope of `version`.
    pub fn from_bytes(version: SoapVersion, content: impl Into<Vec<u8>>) -> Result<Self, MessageError> {
        let content = content.into();
        let scanned = EnvelopeScanner::new(version).scan(&content)?;

        Ok(Self {
            version,
            mime_headers: MimeHeaders::new(),
            content,
            operation: scanned.operation,
            fault: scanned.fault,
        })
    }

    /// Reads and parses an envelope from `reader`.
    ///
    /// # Errors
    ///
    /// [`MessageError::Io`] if reading fails, otherwise as
    /// [`from_bytes`](Self::from_bytes).
    pub fn read_from<R: Read>(version: SoapVersion, mut reader: R) -> Result<Self, MessageError> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Self::from_bytes(version, content)
    }

    /// Writes the envelope to `writer`.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.content)
    }

    /// Returns the SOAP version.
    pub fn version(&self) -> SoapVersion {
        self.version
    }

    /// Returns the MIME headers.
    pub fn mime_headers(&self) -> &MimeHeaders {
        &self.mime_headers
    }

    /// Returns the MIME headers for modification.
    pub fn mime_headers_mut(&mut self) -> &mut MimeHeaders {
        &mut self.mime_headers
    }

    /// Returns the serialized envelope.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Local name of the first element in the body.
    pub fn body_operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Returns the fault, if the body carries one.
    pub fn fault(&self) -> Option<&SoapFault> {
        self.fault.as_ref()
    }

    /// Returns true if the body carries a fault.
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }
}

struct Scanned {
    operation: Option<String>,
    fault: Option<SoapFault>,
}

/// Which fault field text currently belongs to.
#[derive(Clone, Copy)]
enum FaultField {
    Code,
    Reason,
}

struct EnvelopeScanner {
    version: SoapVersion,
    // (local name, in the envelope namespace) from the root down
    path: Vec<(String, bool)>,
    saw_envelope: bool,
    saw_body: bool,
    operation: Option<String>,
    fault: Option<SoapFault>,
    // Reason/Text elements opened so far
    reason_texts: usize,
}

impl EnvelopeScanner {
    fn new(version: SoapVersion) -> Self {
        Self {
            version,
            path: Vec::new(),
            saw_envelope: false,
            saw_body: false,
            operation: None,
            fault: None,
            reason_texts: 0,
        }
    }

    fn scan(mut self, content: &[u8]) -> Result<Scanned, MessageError> {
        let mut reader = NsReader::from_reader(content);
        let mut buf = Vec::new();

        loop {
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            let uri = match &resolved {
                ResolveResult::Bound(Namespace(uri)) => Some(*uri),
                _ => None,
            };
            let in_envelope_ns = uri == Some(self.version.namespace().as_bytes());
            let namespace = uri.map(|uri| String::from_utf8_lossy(uri).into_owned());

            match event {
                Event::Start(start) => {
                    let local = local_name(&start);
                    self.open(&local, in_envelope_ns, namespace)?;
                    self.path.push((local, in_envelope_ns));
                    if matches!(self.fault_field(), Some(FaultField::Reason)) {
                        self.reason_texts += 1;
                    }
                }
                Event::Empty(start) => {
                    let local = local_name(&start);
                    self.open(&local, in_envelope_ns, namespace)?;
                }
                Event::End(_) => {
                    self.path.pop();
                }
                Event::Text(text) => {
                    if let Some(field) = self.fault_field() {
                        let text = text.unescape().map_err(quick_xml::Error::from)?;
                        self.append_fault_text(field, &text);
                    }
                }
                Event::CData(data) => {
                    if let Some(field) = self.fault_field() {
                        let text = std::str::from_utf8(&data)?;
                        self.append_fault_text(field, text);
                    }
                }
                Event::DocType(_) => return Err(MessageError::Doctype),
                Event::Eof => break,
                _ => {}
            }

            buf.clear();
        }

        if !self.path.is_empty() {
            return Err(MessageError::Truncated);
        }
        if !self.saw_envelope {
            return Err(MessageError::MissingEnvelope);
        }
        if !self.saw_body {
            return Err(MessageError::MissingBody);
        }

        let fault = self.fault.map(|fault| SoapFault {
            code: fault.code.trim().to_string(),
            reason: fault.reason.trim().to_string(),
        });

        Ok(Scanned {
            operation: self.operation,
            fault,
        })
    }

    fn open(&mut self, local: &str, in_envelope_ns: bool, namespace: Option<String>) -> Result<(), MessageError> {
        match self.path.len() {
            0 => {
                if self.saw_envelope {
                    return Err(MessageError::ExtraRoot(local.to_string()));
                }
                if local != "Envelope" {
                    return Err(MessageError::MissingEnvelope);
                }
                if !in_envelope_ns {
                    return Err(match namespace {
                        Some(found) => MessageError::VersionMismatch {
                            expected: self.version,
                            found,
                        },
                        None => MessageError::MissingEnvelope,
                    });
                }
                self.saw_envelope = true;
            }
            1 => {
                if local == "Body" && in_envelope_ns {
                    self.saw_body = true;
                }
            }
            2 if self.in_body() && self.operation.is_none() => {
                self.operation = Some(local.to_string());
                if local == "Fault" && in_envelope_ns {
                    self.fault = Some(SoapFault::default());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn in_body(&self) -> bool {
        matches!(self.path.get(1), Some((name, true)) if name == "Body")
    }

    fn fault_field(&self) -> Option<FaultField> {
        if self.fault.is_none() || !self.in_body() {
            return None;
        }
        let names: Vec<&str> = self.path.iter().skip(2).map(|(name, _)| name.as_str()).collect();
        match (self.version, names.as_slice()) {
            (SoapVersion::V1_2, ["Fault", "Code", "Value"]) => Some(FaultField::Code),
            (SoapVersion::V1_2, ["Fault", "Reason", "Text"]) => Some(FaultField::Reason),
            (SoapVersion::V1_1, ["Fault", "faultcode"]) => Some(FaultField::Code),
            (SoapVersion::V1_1, ["Fault", "faultstring"]) => Some(FaultField::Reason),
            _ => None,
        }
    }

    fn append_fault_text(&mut self, field: FaultField, text: &str) {
        if let Some(fault) = self.fault.as_mut() {
            match field {
                FaultField::Code => fault.code.push_str(text),
                // only the first Reason/Text is kept
                FaultField::Reason if self.reason_texts <= 1 => fault.reason.push_str(text),
                FaultField::Reason => {}
            }
        }
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}
