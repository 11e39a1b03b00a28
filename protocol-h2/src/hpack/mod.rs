//! HPACK header compression (RFC 7541).
//!
//! Implements the full HPACK encoder and decoder with:
//! - 61-entry static table (RFC 7541 Appendix A)
//! - Dynamic table with size management
//! - Huffman encoding/decoding of string literals
//! - Prefix integer codec
//!
//! One [`Encoder`] and one [`Decoder`] belong to each connection; their
//! dynamic tables evolve with every header block, so blocks must be processed
//! in order.

mod table;

pub use table::{HpackTable, STATIC_TABLE_LEN, TableMatch};

use bytes::{BufMut, Bytes};

use crate::config::CodecConfig;
use crate::error::H2Error;
use crate::huffman;

/// A single header name-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: Bytes,
    pub value: Bytes,
    /// Encode as "never indexed" (RFC 7541 Section 7.1.3). Set by the
    /// decoder when the peer sent the field that way.
    pub sensitive: bool,
}

impl HeaderField {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: false,
        }
    }

    /// A field that must never enter a compression table (credentials,
    /// cookies with secrets, ...).
    pub fn sensitive(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            sensitive: true,
            ..Self::new(name, value)
        }
    }

    /// Size of this header field for dynamic table accounting (RFC 7541 Section 4.1).
    /// Size = len(name) + len(value) + 32
    pub fn size(&self) -> usize {
        self.name.len() + self.value.len() + 32
    }

    pub fn is_pseudo(&self) -> bool {
        self.name.first() == Some(&b':')
    }

    /// Same field with an ASCII-lowercased name.
    pub(crate) fn lowercased(&self) -> Self {
        if !self.name.iter().any(u8::is_ascii_uppercase) {
            return self.clone();
        }
        Self {
            name: Bytes::from(self.name.to_ascii_lowercase()),
            value: self.value.clone(),
            sensitive: self.sensitive,
        }
    }
}

/// Literal header field representations (RFC 7541 Section 6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralMode {
    /// `01xxxxxx`: add the field to the dynamic table.
    IncrementalIndexing,
    /// `0000xxxx`: leave the table untouched.
    WithoutIndexing,
    /// `0001xxxx`: leave the table untouched, and intermediaries must not
    /// index it either.
    NeverIndexed,
}

impl LiteralMode {
    fn prefix(&self) -> (u8, u8) {
        match self {
            Self::IncrementalIndexing => (6, 0x40),
            Self::WithoutIndexing => (4, 0x00),
            Self::NeverIndexed => (4, 0x10),
        }
    }
}

// -- HPACK prefix integer codec (RFC 7541 Section 5.1) --

pub(crate) fn encode_int<B: BufMut>(dst: &mut B, value: usize, prefix_bits: u8, pattern: u8) {
    let max = (1usize << prefix_bits) - 1;
    if value < max {
        dst.put_u8(pattern | value as u8);
        return;
    }
    dst.put_u8(pattern | max as u8);
    let mut remaining = value - max;
    while remaining >= 128 {
        dst.put_u8(0x80 | (remaining & 0x7f) as u8);
        remaining >>= 7;
    }
    dst.put_u8(remaining as u8);
}

/// Decode a prefix integer. Returns `(value, bytes consumed)`.
pub(crate) fn decode_int(buf: &[u8], prefix_bits: u8) -> Result<(usize, usize), H2Error> {
    let Some(&first) = buf.first() else {
        return Err(H2Error::HpackDecode("truncated integer"));
    };
    let max = (1u64 << prefix_bits) - 1;
    let value = u64::from(first) & max;
    if value < max {
        return Ok((value as usize, 1));
    }
    let mut value = max;
    let mut shift = 0u32;
    for (i, &b) in buf[1..].iter().enumerate() {
        value += u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            let value =
                usize::try_from(value).map_err(|_| H2Error::HpackDecode("integer overflow"))?;
            return Ok((value, i + 2));
        }
        shift += 7;
        if shift > 56 {
            return Err(H2Error::HpackDecode("integer overflow"));
        }
    }
    Err(H2Error::HpackDecode("truncated integer"))
}

// -- String literal encoding/decoding (RFC 7541 Section 5.2) --

/// Encode a string literal, Huffman-coded only when strictly shorter.
fn encode_string<B: BufMut>(dst: &mut B, data: &[u8], lower: bool) {
    let huf_len = huffman::encoded_len(data, lower);
    if huf_len < data.len() {
        encode_int(dst, huf_len, 7, 0x80);
        huffman::encode(data, lower, dst);
    } else {
        encode_int(dst, data.len(), 7, 0x00);
        if lower {
            dst.put_slice(&data.to_ascii_lowercase());
        } else {
            dst.put_slice(data);
        }
    }
}

/// Decode a string literal. Returns `(string, bytes consumed)`.
fn decode_string(buf: &[u8]) -> Result<(Bytes, usize), H2Error> {
    let Some(&first) = buf.first() else {
        return Err(H2Error::HpackDecode("truncated string literal"));
    };
    let (len, n) = decode_int(buf, 7)?;
    let end = n
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .ok_or(H2Error::HpackDecode("string literal past end of block"))?;
    let raw = &buf[n..end];
    let value = if first & 0x80 != 0 {
        Bytes::from(huffman::decode(raw)?)
    } else {
        Bytes::copy_from_slice(raw)
    };
    Ok((value, end))
}

// -- Encoder --

/// HPACK encoder with dynamic table.
#[derive(Debug)]
pub struct Encoder {
    table: HpackTable,
    /// Smallest and final sizes requested since the last header block.
    pending_update: Option<(usize, usize)>,
}

impl Encoder {
    pub fn new(max_table_size: usize) -> Self {
        Self {
            table: HpackTable::new(max_table_size),
            pending_update: None,
        }
    }

    pub fn table(&self) -> &HpackTable {
        &self.table
    }

    /// Change the dynamic table size, e.g. after the peer's
    /// SETTINGS_HEADER_TABLE_SIZE.
    ///
    /// The table shrinks immediately. The size update instruction is emitted
    /// at the start of the next header block; when several changes happen in
    /// between, both the smallest and the final size are signalled
    /// (RFC 7541 Section 4.2).
    pub fn set_max_table_size(&mut self, new_size: usize) {
        self.table.set_max_size(new_size);
        self.pending_update = Some(match self.pending_update {
            Some((min, _)) => (min.min(new_size), new_size),
            None => (new_size, new_size),
        });
    }

    /// Encode a list of headers into one HPACK header block.
    pub fn encode<B: BufMut>(&mut self, headers: &[HeaderField], dst: &mut B) {
        self.flush_size_update(dst);
        for header in headers {
            self.encode_field(header, dst);
        }
    }

    /// Encode one field, choosing the most compact representation.
    ///
    /// Names are lowercased. Sensitive fields are always sent as never-indexed
    /// literals.
    pub fn encode_field<B: BufMut>(&mut self, field: &HeaderField, dst: &mut B) {
        let field = field.lowercased();
        if field.sensitive {
            let name_index = match self.table.find(&field.name, &field.value) {
                Some(TableMatch::Full(i) | TableMatch::Name(i)) => Some(i),
                None => None,
            };
            self.write_literal(&field, name_index, LiteralMode::NeverIndexed, dst);
            return;
        }
        match self.table.find(&field.name, &field.value) {
            Some(TableMatch::Full(index)) => {
                // Indexed header field (Section 6.1): pattern 1xxxxxxx.
                encode_int(dst, index, 7, 0x80);
            }
            Some(TableMatch::Name(index)) => {
                self.write_literal(&field, Some(index), LiteralMode::IncrementalIndexing, dst);
            }
            None => {
                self.write_literal(&field, None, LiteralMode::IncrementalIndexing, dst);
            }
        }
    }

    /// Encode one field as a literal with an explicit representation.
    ///
    /// The name is taken from the tables when possible.
    pub fn encode_literal<B: BufMut>(&mut self, field: &HeaderField, mode: LiteralMode, dst: &mut B) {
        let field = field.lowercased();
        let name_index = match self.table.find(&field.name, &field.value) {
            Some(TableMatch::Full(i) | TableMatch::Name(i)) => Some(i),
            None => None,
        };
        self.write_literal(&field, name_index, mode, dst);
    }

    fn write_literal<B: BufMut>(
        &mut self,
        field: &HeaderField,
        name_index: Option<usize>,
        mode: LiteralMode,
        dst: &mut B,
    ) {
        let (prefix_bits, pattern) = mode.prefix();
        match name_index {
            Some(index) => encode_int(dst, index, prefix_bits, pattern),
            None => {
                dst.put_u8(pattern);
                encode_string(dst, &field.name, true);
            }
        }
        encode_string(dst, &field.value, false);
        if mode == LiteralMode::IncrementalIndexing {
            self.table.append_header(field.clone());
        }
    }

    fn flush_size_update<B: BufMut>(&mut self, dst: &mut B) {
        // Dynamic table size update (Section 6.3): pattern 001xxxxx.
        if let Some((min, last)) = self.pending_update.take() {
            if min < last {
                encode_int(dst, min, 5, 0x20);
            }
            encode_int(dst, last, 5, 0x20);
        }
    }
}

// -- Decoder --

/// HPACK decoder with dynamic table.
#[derive(Debug)]
pub struct Decoder {
    table: HpackTable,
    /// Upper bound for size updates, from our SETTINGS_HEADER_TABLE_SIZE.
    max_table_size: usize,
    max_header_list_size: Option<usize>,
}

impl Decoder {
    pub fn new(max_table_size: usize) -> Self {
        Self {
            table: HpackTable::new(max_table_size),
            max_table_size,
            max_header_list_size: None,
        }
    }

    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            max_header_list_size: config.max_header_list_size,
            ..Self::new(config.header_table_size)
        }
    }

    pub fn table(&self) -> &HpackTable {
        &self.table
    }

    /// Update the maximum dynamic table size allowed by our SETTINGS.
    ///
    /// If the current table is larger than the new limit it shrinks now;
    /// growth only happens when the peer sends a size update.
    pub fn set_max_table_size(&mut self, max_size: usize) {
        self.max_table_size = max_size;
        if self.table.max_size() > max_size {
            self.table.set_max_size(max_size);
        }
    }

    /// Decode one complete HPACK header block.
    pub fn decode(&mut self, block: &[u8]) -> Result<Vec<HeaderField>, H2Error> {
        let result = self.decode_block(block);
        if let Err(ref e) = result {
            tracing::debug!(error = %e, block_len = block.len(), "rejected header block");
        }
        result
    }

    fn decode_block(&mut self, buf: &[u8]) -> Result<Vec<HeaderField>, H2Error> {
        let mut headers = Vec::new();
        let mut list_size = 0usize;
        let mut pos = 0;

        while pos < buf.len() {
            let first = buf[pos];

            let field = if first & 0x80 != 0 {
                // Indexed header field (Section 6.1): pattern 1xxxxxxx.
                let (index, n) = decode_int(&buf[pos..], 7)?;
                pos += n;
                self.table.decode_indexed(index)?
            } else if first & 0x40 != 0 {
                // Literal with incremental indexing (Section 6.2.1): pattern 01xxxxxx.
                let (field, n) = self.decode_literal(&buf[pos..], 6)?;
                pos += n;
                self.table.append_header(field.clone());
                field
            } else if first & 0x20 != 0 {
                // Dynamic table size update (Section 6.3): pattern 001xxxxx.
                if !headers.is_empty() {
                    return Err(H2Error::HpackDecode("table size update after header field"));
                }
                let (new_size, n) = decode_int(&buf[pos..], 5)?;
                pos += n;
                if new_size > self.max_table_size {
                    return Err(H2Error::HpackDecode("table size update exceeds limit"));
                }
                self.table.set_max_size(new_size);
                continue;
            } else {
                // Literal never indexed (0001xxxx) or without indexing
                // (0000xxxx). Neither touches the dynamic table.
                let (mut field, n) = self.decode_literal(&buf[pos..], 4)?;
                pos += n;
                field.sensitive = first & 0x10 != 0;
                field
            };

            list_size += field.size();
            if let Some(limit) = self.max_header_list_size
                && list_size > limit
            {
                return Err(H2Error::HpackDecode("header list exceeds size limit"));
            }
            headers.push(field);
        }

        Ok(headers)
    }

    /// Decode a literal representation's name and value. Returns the field
    /// and bytes consumed.
    fn decode_literal(&self, buf: &[u8], prefix_bits: u8) -> Result<(HeaderField, usize), H2Error> {
        let (name_index, mut pos) = decode_int(buf, prefix_bits)?;
        let name = if name_index > 0 {
            self.table.decode_name(name_index)?
        } else {
            let (name, n) = decode_string(&buf[pos..])?;
            pos += n;
            name
        };
        let (value, n) = decode_string(&buf[pos..])?;
        pos += n;
        Ok((HeaderField::new(name, value), pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(encoder: &mut Encoder, decoder: &mut Decoder, headers: &[HeaderField]) -> Vec<u8> {
        let mut buf = Vec::new();
        encoder.encode(headers, &mut buf);
        let decoded = decoder.decode(&buf).unwrap();
        assert_eq!(decoded, headers);
        buf
    }

    #[test]
    fn prefix_int_round_trip() {
        for &(value, prefix_bits, pattern) in &[
            (0usize, 7, 0x80u8),
            (126, 7, 0x80),
            (127, 7, 0x80),
            (1000, 7, 0x80),
            (62, 6, 0x40),
            (63, 6, 0x40),
            (31, 5, 0x20),
            (4096, 5, 0x20),
            (15, 4, 0x00),
            (16, 4, 0x10),
        ] {
            let mut buf = Vec::new();
            encode_int(&mut buf, value, prefix_bits, pattern);
            let (decoded, len) = decode_int(&buf, prefix_bits).unwrap();
            assert_eq!(decoded, value, "mismatch for value={value} prefix={prefix_bits}");
            assert_eq!(len, buf.len());
            let mask = !((1u8 << prefix_bits) - 1);
            assert_eq!(buf[0] & mask, pattern & mask);
        }
    }

    #[test]
    fn rfc7541_appendix_c1_integer_examples() {
        // C.1.1: Encoding 10 using a 5-bit prefix.
        let mut buf = Vec::new();
        encode_int(&mut buf, 10, 5, 0x00);
        assert_eq!(buf, [0x0a]);

        // C.1.2: Encoding 1337 using a 5-bit prefix.
        let mut buf = Vec::new();
        encode_int(&mut buf, 1337, 5, 0x00);
        assert_eq!(buf, [0x1f, 0x9a, 0x0a]);

        // C.1.3: Encoding 42 starting at an octet boundary (8-bit prefix).
        let mut buf = Vec::new();
        encode_int(&mut buf, 42, 8, 0x00);
        assert_eq!(buf, [0x2a]);
    }

    #[test]
    fn truncated_and_overflowing_integers() {
        assert!(decode_int(&[], 7).is_err());
        assert!(decode_int(&[0x7f, 0x80], 7).is_err());
        let overflow = [0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert_eq!(
            decode_int(&overflow, 7),
            Err(H2Error::HpackDecode("integer overflow"))
        );
    }

    #[test]
    fn encode_decode_indexed() {
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::new(4096);
        let buf = round_trip(
            &mut encoder,
            &mut decoder,
            &[HeaderField::new(":method", "GET")],
        );
        assert_eq!(buf, [0x82]);
    }

    #[test]
    fn encode_decode_multiple_headers() {
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::new(4096);
        round_trip(
            &mut encoder,
            &mut decoder,
            &[
                HeaderField::new(":method", "GET"),
                HeaderField::new(":path", "/"),
                HeaderField::new(":scheme", "https"),
                HeaderField::new(":authority", "example.com"),
                HeaderField::new("accept", "*/*"),
                HeaderField::new("x-request-id", "abc123"),
            ],
        );
        assert_eq!(encoder.table().len(), 3);
        assert_eq!(decoder.table().len(), 3);
    }

    #[test]
    fn dynamic_table_reuse() {
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::new(4096);
        let headers = [
            HeaderField::new(":method", "GET"),
            HeaderField::new("x-token", "abc"),
        ];
        let first = round_trip(&mut encoder, &mut decoder, &headers);
        let second = round_trip(&mut encoder, &mut decoder, &headers);
        assert_eq!(second, [0x82, 0xbe]);
        assert!(second.len() < first.len());
    }

    #[test]
    fn names_are_lowercased() {
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::new(4096);
        let mut buf = Vec::new();
        encoder.encode(&[HeaderField::new("Content-Type", "text/plain")], &mut buf);
        let decoded = decoder.decode(&buf).unwrap();
        assert_eq!(decoded, [HeaderField::new("content-type", "text/plain")]);

        let mut buf = Vec::new();
        encoder.encode(&[HeaderField::new("X-Upper-Case", "Value")], &mut buf);
        let decoded = decoder.decode(&buf).unwrap();
        assert_eq!(decoded, [HeaderField::new("x-upper-case", "Value")]);
        assert!(encoder.table().contains(b"x-upper-case", b"Value"));
    }

    #[test]
    fn sensitive_fields_never_indexed() {
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::new(4096);
        let headers = [HeaderField::sensitive("authorization", "secret")];
        let buf = round_trip(&mut encoder, &mut decoder, &headers);
        // 0001xxxx with static name index 23 (needs a continuation octet).
        assert_eq!(buf[0], 0x1f);
        assert_eq!(buf[1], 23 - 15);
        assert!(encoder.table().is_empty());
        assert!(decoder.table().is_empty());
    }

    #[test]
    fn explicit_literal_modes() {
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::new(4096);
        let field = HeaderField::new("x-trace", "1");
        let mut buf = Vec::new();
        encoder.encode_literal(&field, LiteralMode::WithoutIndexing, &mut buf);
        assert_eq!(buf[0], 0x00);
        assert_eq!(decoder.decode(&buf).unwrap(), [field.clone()]);
        assert!(decoder.table().is_empty());

        let mut buf = Vec::new();
        encoder.encode_literal(&field, LiteralMode::IncrementalIndexing, &mut buf);
        assert_eq!(buf[0], 0x40);
        decoder.decode(&buf).unwrap();
        assert!(decoder.table().contains(b"x-trace", b"1"));
    }

    #[test]
    fn table_size_update_emitted_once() {
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::new(4096);
        encoder.set_max_table_size(0);
        encoder.set_max_table_size(256);
        let mut buf = Vec::new();
        encoder.encode(&[HeaderField::new(":method", "GET")], &mut buf);
        // 0 then 256, then the indexed field.
        assert_eq!(buf, [0x20, 0x3f, 0xe1, 0x01, 0x82]);
        decoder.decode(&buf).unwrap();
        assert_eq!(decoder.table().max_size(), 256);

        let mut buf = Vec::new();
        encoder.encode(&[HeaderField::new(":method", "GET")], &mut buf);
        assert_eq!(buf, [0x82]);
    }

    #[test]
    fn size_update_above_limit_rejected() {
        let mut decoder = Decoder::new(4096);
        let mut buf = Vec::new();
        encode_int(&mut buf, 8192, 5, 0x20);
        assert_eq!(
            decoder.decode(&buf),
            Err(H2Error::HpackDecode("table size update exceeds limit"))
        );
    }

    #[test]
    fn size_update_after_field_rejected() {
        let mut decoder = Decoder::new(4096);
        assert_eq!(
            decoder.decode(&[0x82, 0x20]),
            Err(H2Error::HpackDecode("table size update after header field"))
        );
    }

    #[test]
    fn invalid_index_rejected() {
        let mut decoder = Decoder::new(4096);
        assert!(decoder.decode(&[0x80]).is_err());
        assert!(decoder.decode(&[0xbe]).is_err());
        // Literal referencing a missing dynamic name.
        assert!(decoder.decode(&[0x7f, 0x00, 0x01, b'x']).is_err());
    }

    #[test]
    fn truncated_string_rejected() {
        let mut decoder = Decoder::new(4096);
        // Literal without indexing, new name, length 5 but 2 bytes present.
        assert!(decoder.decode(&[0x00, 0x05, b'a', b'b']).is_err());
    }

    #[test]
    fn header_list_limit() {
        let config = CodecConfig {
            max_header_list_size: Some(64),
            ..CodecConfig::default()
        };
        let mut encoder = Encoder::new(4096);
        let mut decoder = Decoder::with_config(&config);
        let mut buf = Vec::new();
        encoder.encode(
            &[
                HeaderField::new(":method", "GET"),
                HeaderField::new(":path", "/"),
            ],
            &mut buf,
        );
        assert_eq!(
            decoder.decode(&buf),
            Err(H2Error::HpackDecode("header list exceeds size limit"))
        );
    }

    #[test]
    fn shrinking_settings_limit_evicts() {
        let mut decoder = Decoder::new(4096);
        let mut encoder = Encoder::new(4096);
        let mut buf = Vec::new();
        encoder.encode(&[HeaderField::new("x-a", "1")], &mut buf);
        decoder.decode(&buf).unwrap();
        assert_eq!(decoder.table().len(), 1);
        decoder.set_max_table_size(0);
        assert!(decoder.table().is_empty());
    }
}
