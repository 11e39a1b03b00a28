//! HTTP/2 frame header (RFC 7540 Section 4.1).
//!
//! Every frame starts with a fixed 9-byte header:
//! ```text
//! +-----------------------------------------------+
//! |                 Length (24)                    |
//! +---------------+---------------+---------------+
//! |   Type (8)    |   Flags (8)   |
//! +-+-------------+---------------+------...------+
//! |R|                 Stream Identifier (31)       |
//! +-+---------------------------------------------+
//! ```

use std::fmt;

use bytes::BufMut;

use crate::error::H2Error;

/// Frame header size in bytes.
pub const FRAME_HEADER_LEN: usize = 9;

/// Largest value the 24-bit length field can carry.
pub const MAX_FRAME_LENGTH: u32 = (1 << 24) - 1;

/// Largest 31-bit stream identifier.
pub const MAX_STREAM_ID: u32 = 0x7fff_ffff;

// Flag constants. END_STREAM and ACK share a bit.
pub const FLAG_END_STREAM: u8 = 0x1;
pub const FLAG_ACK: u8 = 0x1;
pub const FLAG_END_HEADERS: u8 = 0x4;
pub const FLAG_PADDED: u8 = 0x8;
pub const FLAG_PRIORITY: u8 = 0x20;

/// Union of every flag defined for any frame type.
pub const ALL_FLAGS: u8 = FLAG_END_STREAM | FLAG_END_HEADERS | FLAG_PADDED | FLAG_PRIORITY;

/// Frame types (RFC 7540 Section 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    Data = 0x0,
    Headers = 0x1,
    Priority = 0x2,
    RstStream = 0x3,
    Settings = 0x4,
    PushPromise = 0x5,
    Ping = 0x6,
    GoAway = 0x7,
    WindowUpdate = 0x8,
    Continuation = 0x9,
}

impl FrameType {
    /// Try to convert a type octet to a frame type.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Self::Data),
            0x1 => Some(Self::Headers),
            0x2 => Some(Self::Priority),
            0x3 => Some(Self::RstStream),
            0x4 => Some(Self::Settings),
            0x5 => Some(Self::PushPromise),
            0x6 => Some(Self::Ping),
            0x7 => Some(Self::GoAway),
            0x8 => Some(Self::WindowUpdate),
            0x9 => Some(Self::Continuation),
            _ => None,
        }
    }

    /// Flags this frame type may carry.
    pub fn allowed_flags(&self) -> u8 {
        match self {
            Self::Data => FLAG_END_STREAM | FLAG_PADDED,
            Self::Headers => ALL_FLAGS,
            Self::Settings | Self::Ping => FLAG_ACK,
            Self::PushPromise => FLAG_END_HEADERS | FLAG_PADDED,
            Self::Continuation => FLAG_END_HEADERS,
            Self::Priority | Self::RstStream | Self::GoAway | Self::WindowUpdate => 0,
        }
    }

    /// Frame type name as written in RFC 7540.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Headers => "HEADERS",
            Self::Priority => "PRIORITY",
            Self::RstStream => "RST_STREAM",
            Self::Settings => "SETTINGS",
            Self::PushPromise => "PUSH_PROMISE",
            Self::Ping => "PING",
            Self::GoAway => "GOAWAY",
            Self::WindowUpdate => "WINDOW_UPDATE",
            Self::Continuation => "CONTINUATION",
        }
    }
}

impl TryFrom<u8> for FrameType {
    type Error = H2Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(H2Error::InvalidFrameType(value))
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded, validated frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    length: u32,
    frame_type: FrameType,
    flags: u8,
    stream_id: u32,
}

impl FrameHeader {
    /// Build a header for an outbound frame.
    ///
    /// Fails if `length` does not fit in 24 bits, the stream id uses the
    /// reserved bit, or `flags` has bits no frame type defines.
    pub fn new(
        frame_type: FrameType,
        length: usize,
        flags: u8,
        stream_id: u32,
    ) -> Result<Self, H2Error> {
        if length > MAX_FRAME_LENGTH as usize {
            return Err(H2Error::InvalidFrameLength {
                length,
                reason: "exceeds 24-bit length field",
            });
        }
        if stream_id > MAX_STREAM_ID {
            return Err(H2Error::InvalidStreamId {
                stream_id,
                reason: "reserved bit set",
            });
        }
        check_known_flags(flags)?;
        Ok(Self {
            length: length as u32,
            frame_type,
            flags,
            stream_id,
        })
    }

    /// Build a header from values known to be in range.
    pub(crate) const fn from_parts(
        frame_type: FrameType,
        length: u32,
        flags: u8,
        stream_id: u32,
    ) -> Self {
        Self {
            length: length & MAX_FRAME_LENGTH,
            frame_type,
            flags: flags & ALL_FLAGS,
            stream_id: stream_id & MAX_STREAM_ID,
        }
    }

    /// Decode a 9-byte frame header from the start of `buf`.
    ///
    /// Bytes past the first nine are ignored. The reserved stream id bit is
    /// masked off.
    pub fn parse(buf: &[u8]) -> Result<Self, H2Error> {
        if buf.len() < FRAME_HEADER_LEN {
            return Err(H2Error::TruncatedInput {
                needed: FRAME_HEADER_LEN,
                available: buf.len(),
            });
        }
        let length = (u32::from(buf[0]) << 16) | (u32::from(buf[1]) << 8) | u32::from(buf[2]);
        let frame_type = FrameType::try_from(buf[3])?;
        let flags = buf[4];
        check_known_flags(flags)?;
        let stream_id = read_u32(&buf[5..9]) & MAX_STREAM_ID;
        Ok(Self {
            length,
            frame_type,
            flags,
            stream_id,
        })
    }

    /// Append the 9 header bytes to `dst`.
    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        dst.put_uint(u64::from(self.length), 3);
        dst.put_u8(self.frame_type as u8);
        dst.put_u8(self.flags);
        dst.put_u32(self.stream_id & MAX_STREAM_ID);
    }

    /// The header as a fixed byte array.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_LEN] {
        let mut out = [0u8; FRAME_HEADER_LEN];
        self.encode(&mut &mut out[..]);
        out
    }

    /// Returns true if every bit of `flag` is set.
    #[inline]
    pub fn has_flag(&self, flag: u8) -> bool {
        self.flags & flag == flag
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    // -- Checks shared by the payload codecs --

    pub(crate) fn expect_type(&self, expected: FrameType) -> Result<(), H2Error> {
        if self.frame_type != expected {
            return Err(H2Error::FrameTypeMismatch {
                expected,
                actual: self.frame_type,
            });
        }
        Ok(())
    }

    pub(crate) fn expect_payload_len(&self, len: usize) -> Result<(), H2Error> {
        if self.length as usize != len {
            return Err(H2Error::InvalidFrameLength {
                length: self.length as usize,
                reason: "payload length does not match header",
            });
        }
        Ok(())
    }

    /// Flags must be a subset of what this frame type defines.
    pub(crate) fn expect_flags(&self) -> Result<(), H2Error> {
        if self.flags & !self.frame_type.allowed_flags() != 0 {
            return Err(H2Error::InvalidFlags { flags: self.flags });
        }
        Ok(())
    }

    pub(crate) fn expect_stream_zero(&self) -> Result<(), H2Error> {
        if self.stream_id != 0 {
            return Err(H2Error::InvalidStreamId {
                stream_id: self.stream_id,
                reason: "connection-level frame on a stream",
            });
        }
        Ok(())
    }

    pub(crate) fn expect_stream_nonzero(&self) -> Result<(), H2Error> {
        if self.stream_id == 0 {
            return Err(H2Error::InvalidStreamId {
                stream_id: 0,
                reason: "stream frame on stream 0",
            });
        }
        Ok(())
    }

    /// Common prologue for every payload codec: type, length, flags.
    pub(crate) fn check(&self, expected: FrameType, payload_len: usize) -> Result<(), H2Error> {
        self.expect_type(expected)?;
        self.expect_payload_len(payload_len)?;
        self.expect_flags()
    }
}

fn check_known_flags(flags: u8) -> Result<(), H2Error> {
    if flags & !ALL_FLAGS != 0 {
        return Err(H2Error::InvalidFlags { flags });
    }
    Ok(())
}

/// Read a big-endian u32 from the first four bytes of `buf`.
#[inline]
pub(crate) fn read_u32(buf: &[u8]) -> u32 {
    u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])
}
