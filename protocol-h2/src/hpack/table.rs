//! HPACK indexing tables (RFC 7541 Section 2.3).
//!
//! The static table (61 entries) and the dynamic table share one index
//! space: `1..=61` is static, `62..` is dynamic with the newest entry first.

use std::collections::VecDeque;

use bytes::{BufMut, Bytes};

use super::{HeaderField, encode_int};
use crate::error::H2Error;

/// Number of entries in the static table.
pub const STATIC_TABLE_LEN: usize = 61;

/// HPACK static table (RFC 7541 Appendix A), 1-indexed on the wire.
static STATIC_TABLE: [(&str, &str); STATIC_TABLE_LEN] = [
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

/// Result of looking a header up in the combined index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMatch {
    /// Name and value both match the entry at this index.
    Full(usize),
    /// Only the name matches the entry at this index.
    Name(usize),
}

/// Static table plus a size-bounded dynamic table.
///
/// Entries are stored newest-first. Index 0 of the deque is HPACK index 62.
#[derive(Debug, Clone)]
pub struct HpackTable {
    entries: VecDeque<HeaderField>,
    size: usize,
    max_size: usize,
}

impl HpackTable {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            size: 0,
            max_size,
        }
    }

    /// Number of dynamic table entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest valid index in the combined index space.
    pub fn max_index(&self) -> usize {
        STATIC_TABLE_LEN + self.entries.len()
    }

    /// Current dynamic table size (sum of entry sizes).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Dynamic table entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HeaderField> {
        self.entries.iter()
    }

    /// Change the maximum size, evicting the oldest entries until the table
    /// fits.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        let evicted = self.evict_to(max_size);
        tracing::trace!(max_size, evicted, size = self.size, "hpack table resized");
    }

    /// Insert a field at the head of the dynamic table (RFC 7541 Section 4.4).
    ///
    /// A field larger than the whole table empties it and is not inserted.
    /// Otherwise the oldest entries are evicted until the field fits.
    pub fn append_header(&mut self, field: HeaderField) {
        let entry_size = field.size();
        if entry_size > self.max_size {
            tracing::trace!(
                entry_size,
                max_size = self.max_size,
                "hpack entry exceeds table, clearing"
            );
            self.entries.clear();
            self.size = 0;
            return;
        }
        let evicted = self.evict_to(self.max_size - entry_size);
        if evicted > 0 {
            tracing::trace!(evicted, entry_size, "hpack entries evicted");
        }
        self.entries.push_front(field);
        self.size += entry_size;
    }

    /// Whether the dynamic table holds an entry with this exact name and value.
    ///
    /// The static table is not consulted.
    pub fn contains(&self, name: &[u8], value: &[u8]) -> bool {
        self.entries
            .iter()
            .any(|h| h.name == name && h.value == value)
    }

    /// Look up a header field by its 1-based index.
    pub fn decode_indexed(&self, index: usize) -> Result<HeaderField, H2Error> {
        if index == 0 {
            return Err(H2Error::HpackDecode("index 0 is not a valid entry"));
        }
        if index <= STATIC_TABLE_LEN {
            let (name, value) = STATIC_TABLE[index - 1];
            return Ok(HeaderField::new(name, value));
        }
        self.entries
            .get(index - STATIC_TABLE_LEN - 1)
            .cloned()
            .ok_or(H2Error::HpackDecode("index past end of table"))
    }

    /// Look up only the name of an indexed entry.
    pub fn decode_name(&self, index: usize) -> Result<Bytes, H2Error> {
        self.decode_indexed(index).map(|field| field.name)
    }

    /// Emit an indexed header field representation (RFC 7541 Section 6.1).
    pub fn encode_indexed<B: BufMut>(&self, index: usize, dst: &mut B) -> Result<(), H2Error> {
        if index == 0 || index > self.max_index() {
            return Err(H2Error::HpackEncode("index out of range"));
        }
        encode_int(dst, index, 7, 0x80);
        Ok(())
    }

    /// Find the best entry for a field: a full match anywhere beats a name
    /// match; the static table is searched first.
    pub fn find(&self, name: &[u8], value: &[u8]) -> Option<TableMatch> {
        let mut name_match = None;
        for (i, (n, v)) in STATIC_TABLE.iter().enumerate() {
            if n.as_bytes() == name {
                if v.as_bytes() == value {
                    return Some(TableMatch::Full(i + 1));
                }
                name_match.get_or_insert(i + 1);
            }
        }
        for (i, h) in self.entries.iter().enumerate() {
            if h.name == name {
                if h.value == value {
                    return Some(TableMatch::Full(i + STATIC_TABLE_LEN + 1));
                }
                name_match.get_or_insert(i + STATIC_TABLE_LEN + 1);
            }
        }
        name_match.map(TableMatch::Name)
    }

    /// Evict from the tail until `size <= limit`. Returns the number evicted.
    fn evict_to(&mut self, limit: usize) -> usize {
        let mut evicted = 0;
        while self.size > limit {
            let Some(oldest) = self.entries.pop_back() else {
                break;
            };
            self.size -= oldest.size();
            evicted += 1;
        }
        evicted
    }
}
