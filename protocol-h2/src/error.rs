//! Error types for HTTP/2 frame and HPACK processing.

use std::fmt;

use crate::header::FrameType;

/// HTTP/2 error codes (RFC 7540 Section 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    NoError = 0x0,
    ProtocolError = 0x1,
    InternalError = 0x2,
    FlowControlError = 0x3,
    SettingsTimeout = 0x4,
    StreamClosed = 0x5,
    FrameSizeError = 0x6,
    RefusedStream = 0x7,
    Cancel = 0x8,
    CompressionError = 0x9,
    ConnectError = 0xa,
    EnhanceYourCalm = 0xb,
    InadequateSecurity = 0xc,
    Http11Required = 0xd,
}

impl ErrorCode {
    /// Strict conversion: `None` for codes outside `0x0..=0xd`.
    pub fn try_from_u32(v: u32) -> Option<Self> {
        let code = match v {
            0x0 => Self::NoError,
            0x1 => Self::ProtocolError,
            0x2 => Self::InternalError,
            0x3 => Self::FlowControlError,
            0x4 => Self::SettingsTimeout,
            0x5 => Self::StreamClosed,
            0x6 => Self::FrameSizeError,
            0x7 => Self::RefusedStream,
            0x8 => Self::Cancel,
            0x9 => Self::CompressionError,
            0xa => Self::ConnectError,
            0xb => Self::EnhanceYourCalm,
            0xc => Self::InadequateSecurity,
            0xd => Self::Http11Required,
            _ => return None,
        };
        Some(code)
    }

    /// Lenient conversion. Unknown codes map to `INTERNAL_ERROR`
    /// (RFC 7540 Section 7).
    pub fn from_u32(v: u32) -> Self {
        Self::try_from_u32(v).unwrap_or(Self::InternalError)
    }

    /// Name as written in RFC 7540.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoError => "NO_ERROR",
            Self::ProtocolError => "PROTOCOL_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::FlowControlError => "FLOW_CONTROL_ERROR",
            Self::SettingsTimeout => "SETTINGS_TIMEOUT",
            Self::StreamClosed => "STREAM_CLOSED",
            Self::FrameSizeError => "FRAME_SIZE_ERROR",
            Self::RefusedStream => "REFUSED_STREAM",
            Self::Cancel => "CANCEL",
            Self::CompressionError => "COMPRESSION_ERROR",
            Self::ConnectError => "CONNECT_ERROR",
            Self::EnhanceYourCalm => "ENHANCE_YOUR_CALM",
            Self::InadequateSecurity => "INADEQUATE_SECURITY",
            Self::Http11Required => "HTTP_1_1_REQUIRED",
        }
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> u32 {
        code as u32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the frame codecs and HPACK.
///
/// Every variant is a protocol violation detected locally. None of them are
/// retryable; the transport turns them into RST_STREAM or GOAWAY using
/// [`H2Error::error_code`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum H2Error {
    /// Fewer bytes available than a fixed-size field requires.
    #[error("truncated input: need {needed} bytes, have {available}")]
    TruncatedInput { needed: usize, available: usize },

    /// Frame type octet outside `0x0..=0x9`.
    #[error("invalid frame type {0:#04x}")]
    InvalidFrameType(u8),

    /// Length field disagrees with the payload or with a type's size rule.
    #[error("invalid frame length {length}: {reason}")]
    InvalidFrameLength { length: usize, reason: &'static str },

    /// Stream identifier not allowed for this frame.
    #[error("invalid stream id {stream_id}: {reason}")]
    InvalidStreamId { stream_id: u32, reason: &'static str },

    /// Flag bits not legal for the frame (or for any frame).
    #[error("invalid flags {flags:#04x}")]
    InvalidFlags { flags: u8 },

    /// Header type does not match the codec invoked.
    #[error("frame type mismatch: expected {expected}, got {actual}")]
    FrameTypeMismatch {
        expected: FrameType,
        actual: FrameType,
    },

    /// Type-specific rule violation (padding, weight, zero increment, ...).
    #[error("malformed frame: {0}")]
    FrameStructure(&'static str),

    /// HPACK encoding failure.
    #[error("HPACK encode error: {0}")]
    HpackEncode(&'static str),

    /// HPACK decoding failure (bad index, bad Huffman data, bad size update).
    #[error("HPACK decode error: {0}")]
    HpackDecode(&'static str),

    /// Decoded header list violates HTTP/2 field rules (pseudo-header
    /// placement, duplicates, uppercase names).
    #[error("malformed header list: {0}")]
    MalformedHeaders(&'static str),

    /// A [`CodecConfig`](crate::config::CodecConfig) value is out of range.
    #[error("invalid codec config: {0}")]
    InvalidConfig(&'static str),
}

impl H2Error {
    /// Error code the transport should send when this error ends a stream or
    /// the connection.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::TruncatedInput { .. } | Self::InvalidFrameLength { .. } => {
                ErrorCode::FrameSizeError
            }
            Self::HpackEncode(_) | Self::InvalidConfig(_) => ErrorCode::InternalError,
            Self::HpackDecode(_) => ErrorCode::CompressionError,
            _ => ErrorCode::ProtocolError,
        }
    }

    /// Returns true if the error came from header compression.
    #[inline]
    pub fn is_hpack(&self) -> bool {
        matches!(self, Self::HpackEncode(_) | Self::HpackDecode(_))
    }
}
