//! HTTP/2 frame encoding/decoding (RFC 7540 Section 4).
//!
//! HTTP/2 frames have a fixed 9-byte header:
//! ```text
//! +-----------------------------------------------+
//! |                 Length (24)                    |
//! +---------------+---------------+---------------+
//! |   Type (8)    |   Flags (8)   |
//! +-+-------------+---------------+------...------+
//! |R|                 Stream Identifier (31)       |
//! +-+---------------------------------------------+
//! |                   Frame Payload ...            |
//! +-----------------------------------------------+
//! ```
//!
//! Each frame type has its own struct with a `parse(header, payload)`
//! constructor and an `encode` that is its exact inverse. [`Frame`] is the
//! closed union over all ten types.

mod control;
mod data;
mod headers;
mod priority;
mod settings;

pub use control::{GoAwayFrame, PingFrame, RstStreamFrame, WindowUpdateFrame};
pub use data::DataFrame;
pub use headers::{
    Assembled, ContinuationFrame, HeaderBlockAssembler, HeaderBlockKind, HeadersFrame,
    PushPromiseFrame, ReassembledBlock, fragment_headers, fragment_push_promise,
};
pub use priority::{Priority, PriorityFrame};
pub use settings::SettingsFrame;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::CodecConfig;
use crate::error::H2Error;
use crate::header::{FLAG_PADDED, FRAME_HEADER_LEN, FrameHeader, FrameType};

/// An HTTP/2 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// DATA frame (type 0x0): carries request or response body.
    Data(DataFrame),
    /// HEADERS frame (type 0x1): HPACK-encoded header block fragment.
    Headers(HeadersFrame),
    /// PRIORITY frame (type 0x2): stream dependency and weight.
    Priority(PriorityFrame),
    /// RST_STREAM frame (type 0x3): abnormal stream termination.
    RstStream(RstStreamFrame),
    /// SETTINGS frame (type 0x4): configuration parameters.
    Settings(SettingsFrame),
    /// PUSH_PROMISE frame (type 0x5): server push.
    PushPromise(PushPromiseFrame),
    /// PING frame (type 0x6): connection liveness check.
    Ping(PingFrame),
    /// GOAWAY frame (type 0x7): graceful shutdown.
    GoAway(GoAwayFrame),
    /// WINDOW_UPDATE frame (type 0x8): flow control window increment.
    WindowUpdate(WindowUpdateFrame),
    /// CONTINUATION frame (type 0x9): header block continuation.
    Continuation(ContinuationFrame),
}

impl Frame {
    /// Decode a frame payload with default codec settings.
    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        Self::parse_with(header, payload, &CodecConfig::default())
    }

    /// Decode a frame payload, dispatching on the header's type.
    pub fn parse_with(
        header: FrameHeader,
        payload: Bytes,
        config: &CodecConfig,
    ) -> Result<Self, H2Error> {
        let frame = match header.frame_type() {
            FrameType::Data => Frame::Data(DataFrame::parse(header, payload)?),
            FrameType::Headers => Frame::Headers(HeadersFrame::parse(header, payload)?),
            FrameType::Priority => Frame::Priority(PriorityFrame::parse(header, payload)?),
            FrameType::RstStream => Frame::RstStream(RstStreamFrame::parse(header, payload)?),
            FrameType::Settings => Frame::Settings(SettingsFrame::parse_with(
                header,
                payload,
                config.unknown_settings,
            )?),
            FrameType::PushPromise => {
                Frame::PushPromise(PushPromiseFrame::parse(header, payload)?)
            }
            FrameType::Ping => Frame::Ping(PingFrame::parse(header, payload)?),
            FrameType::GoAway => Frame::GoAway(GoAwayFrame::parse(header, payload)?),
            FrameType::WindowUpdate => {
                Frame::WindowUpdate(WindowUpdateFrame::parse(header, payload)?)
            }
            FrameType::Continuation => {
                Frame::Continuation(ContinuationFrame::parse(header, payload)?)
            }
        };
        Ok(frame)
    }

    /// The frame's header. Its type always matches the variant.
    pub fn header(&self) -> FrameHeader {
        match self {
            Frame::Data(f) => f.header(),
            Frame::Headers(f) => f.header(),
            Frame::Priority(f) => f.header(),
            Frame::RstStream(f) => f.header(),
            Frame::Settings(f) => f.header(),
            Frame::PushPromise(f) => f.header(),
            Frame::Ping(f) => f.header(),
            Frame::GoAway(f) => f.header(),
            Frame::WindowUpdate(f) => f.header(),
            Frame::Continuation(f) => f.header(),
        }
    }

    pub fn frame_type(&self) -> FrameType {
        self.header().frame_type()
    }

    pub fn stream_id(&self) -> u32 {
        self.header().stream_id()
    }

    /// Header plus payload length in bytes.
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_LEN + self.header().length() as usize
    }

    /// Encode this frame into `dst` (header + payload).
    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        match self {
            Frame::Data(f) => f.encode(dst),
            Frame::Headers(f) => f.encode(dst),
            Frame::Priority(f) => f.encode(dst),
            Frame::RstStream(f) => f.encode(dst),
            Frame::Settings(f) => f.encode(dst),
            Frame::PushPromise(f) => f.encode(dst),
            Frame::Ping(f) => f.encode(dst),
            Frame::GoAway(f) => f.encode(dst),
            Frame::WindowUpdate(f) => f.encode(dst),
            Frame::Continuation(f) => f.encode(dst),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

macro_rules! impl_from_frame {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Frame {
                fn from(frame: $ty) -> Self {
                    Frame::$variant(frame)
                }
            }
        )*
    };
}

impl_from_frame!(
    Data(DataFrame),
    Headers(HeadersFrame),
    Priority(PriorityFrame),
    RstStream(RstStreamFrame),
    Settings(SettingsFrame),
    PushPromise(PushPromiseFrame),
    Ping(PingFrame),
    GoAway(GoAwayFrame),
    WindowUpdate(WindowUpdateFrame),
    Continuation(ContinuationFrame),
);

/// Decode one frame from the front of `buf`.
///
/// Returns `Ok(None)` if the buffer does not yet hold a complete frame. On
/// success the frame's bytes are split off `buf`; the payload shares its
/// allocation. Frames longer than `config.max_frame_size` are rejected as
/// soon as the header is visible.
pub fn decode_frame(buf: &mut BytesMut, config: &CodecConfig) -> Result<Option<Frame>, H2Error> {
    if buf.len() < FRAME_HEADER_LEN {
        return Ok(None);
    }
    let header = FrameHeader::parse(&buf[..])?;
    let length = header.length() as usize;
    if header.length() > config.max_frame_size {
        tracing::debug!(
            frame_type = %header.frame_type(),
            length,
            max_frame_size = config.max_frame_size,
            "frame exceeds max frame size"
        );
        return Err(H2Error::InvalidFrameLength {
            length,
            reason: "exceeds max frame size",
        });
    }

    let total_len = FRAME_HEADER_LEN + length;
    if buf.len() < total_len {
        buf.reserve(total_len - buf.len());
        return Ok(None);
    }

    let mut raw = buf.split_to(total_len);
    raw.advance(FRAME_HEADER_LEN);
    match Frame::parse_with(header, raw.freeze(), config) {
        Ok(frame) => {
            tracing::trace!(
                frame_type = %header.frame_type(),
                stream_id = header.stream_id(),
                flags = header.flags(),
                length,
                "decoded frame"
            );
            Ok(Some(frame))
        }
        Err(e) => {
            tracing::debug!(
                frame_type = %header.frame_type(),
                stream_id = header.stream_id(),
                error = %e,
                "rejected frame"
            );
            Err(e)
        }
    }
}

// -- Padding (DATA, HEADERS, PUSH_PROMISE) --

/// Split a PADDED payload into body and padding.
///
/// Without the PADDED flag the payload is returned as-is with no padding.
pub(crate) fn strip_padding(
    header: &FrameHeader,
    mut payload: Bytes,
) -> Result<(Bytes, Option<Bytes>), H2Error> {
    if !header.has_flag(FLAG_PADDED) {
        return Ok((payload, None));
    }
    let Some(&pad_len) = payload.first() else {
        return Err(H2Error::InvalidFrameLength {
            length: 0,
            reason: "PADDED frame without pad length",
        });
    };
    let pad_len = pad_len as usize;
    if pad_len >= payload.len() {
        return Err(H2Error::FrameStructure("padding exceeds frame payload"));
    }
    let padding = payload.split_off(payload.len() - pad_len);
    payload.advance(1);
    Ok((payload, Some(padding)))
}

/// Bytes the padding adds to a payload: the pad length octet plus padding.
pub(crate) fn padding_len(padding: Option<&Bytes>) -> usize {
    padding.map_or(0, |p| 1 + p.len())
}

pub(crate) fn check_padding(padding: &Bytes) -> Result<(), H2Error> {
    if padding.len() > u8::MAX as usize {
        return Err(H2Error::FrameStructure("padding longer than 255 bytes"));
    }
    Ok(())
}

pub(crate) fn padding_flag(padding: Option<&Bytes>) -> u8 {
    if padding.is_some() { FLAG_PADDED } else { 0 }
}

/// Write the pad length octet, if any. The padding itself goes after the body.
pub(crate) fn encode_pad_len<B: BufMut>(padding: Option<&Bytes>, dst: &mut B) {
    if let Some(p) = padding {
        dst.put_u8(p.len() as u8);
    }
}
