//! Header lists split into pseudo-headers and ordinary fields
//! (RFC 7540 Section 8.1.2).

use bytes::{BufMut, Bytes};

use crate::error::H2Error;
use crate::hpack::{Decoder, Encoder, HeaderField};

/// The five pseudo-headers. Each appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PseudoHeaders {
    pub method: Option<Bytes>,
    pub scheme: Option<Bytes>,
    pub authority: Option<Bytes>,
    pub path: Option<Bytes>,
    pub status: Option<Bytes>,
}

impl PseudoHeaders {
    /// Request pseudo-headers.
    pub fn request(
        method: impl Into<Bytes>,
        scheme: impl Into<Bytes>,
        authority: impl Into<Bytes>,
        path: impl Into<Bytes>,
    ) -> Self {
        Self {
            method: Some(method.into()),
            scheme: Some(scheme.into()),
            authority: Some(authority.into()),
            path: Some(path.into()),
            status: None,
        }
    }

    /// Response pseudo-headers.
    pub fn response(status: u16) -> Self {
        Self {
            status: Some(Bytes::from(status.to_string())),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.method.is_none()
            && self.scheme.is_none()
            && self.authority.is_none()
            && self.path.is_none()
            && self.status.is_none()
    }

    /// `:status` as a number, if present and well-formed.
    pub fn status_code(&self) -> Option<u16> {
        let status = self.status.as_ref()?;
        std::str::from_utf8(status).ok()?.parse().ok()
    }

    fn slot(&mut self, name: &[u8]) -> Result<&mut Option<Bytes>, H2Error> {
        let slot = match name {
            b":method" => &mut self.method,
            b":scheme" => &mut self.scheme,
            b":authority" => &mut self.authority,
            b":path" => &mut self.path,
            b":status" => &mut self.status,
            _ => return Err(H2Error::MalformedHeaders("unknown pseudo-header")),
        };
        Ok(slot)
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &Bytes)> {
        [
            (":method", &self.method),
            (":scheme", &self.scheme),
            (":authority", &self.authority),
            (":path", &self.path),
            (":status", &self.status),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name, v)))
    }
}

/// A decoded header list: pseudo-headers plus ordinary fields in order,
/// duplicates preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    pub pseudo: PseudoHeaders,
    pub fields: Vec<HeaderField>,
}

impl HeaderBlock {
    pub fn new(pseudo: PseudoHeaders) -> Self {
        Self {
            pseudo,
            fields: Vec::new(),
        }
    }

    /// Append an ordinary field.
    pub fn push(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.fields.push(HeaderField::new(name, value));
    }

    /// First value of an ordinary field, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Bytes> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name.as_bytes()))
            .map(|f| &f.value)
    }

    /// All values of an ordinary field, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Bytes> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name.eq_ignore_ascii_case(name.as_bytes()))
            .map(|f| &f.value)
    }

    /// Flatten to a field list: pseudo-headers first, then ordinary fields
    /// with lowercased names.
    pub fn to_fields(&self) -> Vec<HeaderField> {
        let mut out: Vec<HeaderField> = self
            .pseudo
            .iter()
            .map(|(name, value)| HeaderField::new(name, value.clone()))
            .collect();
        out.extend(self.fields.iter().map(HeaderField::lowercased));
        out
    }

    /// Split a decoded field list.
    ///
    /// Rejects pseudo-headers after an ordinary field, repeated or unknown
    /// pseudo-headers, and names with uppercase characters.
    pub fn from_fields(fields: Vec<HeaderField>) -> Result<Self, H2Error> {
        let mut block = HeaderBlock::default();
        for field in fields {
            if field.name.iter().any(u8::is_ascii_uppercase) {
                return Err(H2Error::MalformedHeaders("uppercase header name"));
            }
            if field.is_pseudo() {
                if !block.fields.is_empty() {
                    return Err(H2Error::MalformedHeaders(
                        "pseudo-header after regular header",
                    ));
                }
                let slot = block.pseudo.slot(&field.name)?;
                if slot.is_some() {
                    return Err(H2Error::MalformedHeaders("duplicate pseudo-header"));
                }
                *slot = Some(field.value);
            } else {
                block.fields.push(field);
            }
        }
        Ok(block)
    }

    /// HPACK-encode this block.
    pub fn encode<B: BufMut>(&self, encoder: &mut Encoder, dst: &mut B) {
        encoder.encode(&self.to_fields(), dst);
    }

    /// HPACK-decode a complete header block and split it.
    pub fn decode(decoder: &mut Decoder, block: &[u8]) -> Result<Self, H2Error> {
        Self::from_fields(decoder.decode(block)?)
    }
}
