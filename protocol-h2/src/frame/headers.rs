//! Header-bearing frames: HEADERS, PUSH_PROMISE, CONTINUATION.
//!
//! A header block may span one HEADERS or PUSH_PROMISE frame followed by any
//! number of CONTINUATION frames on the same stream, with nothing else
//! interleaved. [`fragment_headers`] splits an outbound block;
//! [`HeaderBlockAssembler`] stitches an inbound one back together.

use bytes::{BufMut, Bytes, BytesMut};

use super::priority::PRIORITY_LEN;
use super::{
    Frame, Priority, check_padding, encode_pad_len, padding_flag, padding_len, strip_padding,
};
use crate::config::CodecConfig;
use crate::error::H2Error;
use crate::header::{
    FLAG_END_HEADERS, FLAG_END_STREAM, FLAG_PRIORITY, FrameHeader, FrameType, MAX_STREAM_ID,
    read_u32,
};

/// HEADERS frame (RFC 7540 Section 6.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersFrame {
    header: FrameHeader,
    priority: Option<Priority>,
    fragment: Bytes,
    padding: Option<Bytes>,
}

impl HeadersFrame {
    pub fn new(
        stream_id: u32,
        fragment: Bytes,
        end_stream: bool,
        end_headers: bool,
    ) -> Result<Self, H2Error> {
        let mut flags = 0;
        if end_stream {
            flags |= FLAG_END_STREAM;
        }
        if end_headers {
            flags |= FLAG_END_HEADERS;
        }
        Self::build(stream_id, flags, None, fragment, None)
    }

    /// Same frame with a priority block and the PRIORITY flag.
    pub fn with_priority(self, priority: Priority) -> Result<Self, H2Error> {
        Self::build(
            self.stream_id(),
            self.header.flags(),
            Some(priority),
            self.fragment,
            self.padding,
        )
    }

    /// Same frame with the PADDED flag and `padding` appended verbatim.
    pub fn with_padding(self, padding: Bytes) -> Result<Self, H2Error> {
        check_padding(&padding)?;
        Self::build(
            self.stream_id(),
            self.header.flags(),
            self.priority,
            self.fragment,
            Some(padding),
        )
    }

    fn build(
        stream_id: u32,
        flags: u8,
        priority: Option<Priority>,
        fragment: Bytes,
        padding: Option<Bytes>,
    ) -> Result<Self, H2Error> {
        let mut flags = flags & (FLAG_END_STREAM | FLAG_END_HEADERS);
        flags |= padding_flag(padding.as_ref());
        let mut length = fragment.len() + padding_len(padding.as_ref());
        if let Some(p) = &priority {
            p.check_not_self(stream_id)?;
            flags |= FLAG_PRIORITY;
            length += PRIORITY_LEN;
        }
        let header = FrameHeader::new(FrameType::Headers, length, flags, stream_id)?;
        header.expect_stream_nonzero()?;
        Ok(Self {
            header,
            priority,
            fragment,
            padding,
        })
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::Headers, payload.len())?;
        header.expect_stream_nonzero()?;
        let (mut body, padding) = strip_padding(&header, payload)?;
        let priority = if header.has_flag(FLAG_PRIORITY) {
            if body.len() < PRIORITY_LEN {
                return Err(H2Error::InvalidFrameLength {
                    length: header.length() as usize,
                    reason: "HEADERS too short for priority block",
                });
            }
            let priority = Priority::parse(&body.split_to(PRIORITY_LEN));
            priority.check_not_self(header.stream_id())?;
            Some(priority)
        } else {
            None
        };
        Ok(Self {
            header,
            priority,
            fragment: body,
            padding,
        })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        encode_pad_len(self.padding.as_ref(), dst);
        if let Some(p) = &self.priority {
            p.encode(dst);
        }
        dst.put_slice(&self.fragment);
        if let Some(p) = &self.padding {
            dst.put_slice(p);
        }
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn stream_id(&self) -> u32 {
        self.header.stream_id()
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// HPACK header block fragment.
    pub fn fragment(&self) -> &Bytes {
        &self.fragment
    }

    pub fn padding(&self) -> Option<&Bytes> {
        self.padding.as_ref()
    }

    pub fn is_end_stream(&self) -> bool {
        self.header.has_flag(FLAG_END_STREAM)
    }

    pub fn is_end_headers(&self) -> bool {
        self.header.has_flag(FLAG_END_HEADERS)
    }
}

/// PUSH_PROMISE frame (RFC 7540 Section 6.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPromiseFrame {
    header: FrameHeader,
    promised_stream_id: u32,
    fragment: Bytes,
    padding: Option<Bytes>,
}

impl PushPromiseFrame {
    pub fn new(
        stream_id: u32,
        promised_stream_id: u32,
        fragment: Bytes,
        end_headers: bool,
    ) -> Result<Self, H2Error> {
        let flags = if end_headers { FLAG_END_HEADERS } else { 0 };
        Self::build(stream_id, promised_stream_id, flags, fragment, None)
    }

    /// Same frame with the PADDED flag and `padding` appended verbatim.
    pub fn with_padding(self, padding: Bytes) -> Result<Self, H2Error> {
        check_padding(&padding)?;
        Self::build(
            self.stream_id(),
            self.promised_stream_id,
            self.header.flags(),
            self.fragment,
            Some(padding),
        )
    }

    fn build(
        stream_id: u32,
        promised_stream_id: u32,
        flags: u8,
        fragment: Bytes,
        padding: Option<Bytes>,
    ) -> Result<Self, H2Error> {
        check_promised_id(promised_stream_id)?;
        let flags = (flags & FLAG_END_HEADERS) | padding_flag(padding.as_ref());
        let length = 4 + fragment.len() + padding_len(padding.as_ref());
        let header = FrameHeader::new(FrameType::PushPromise, length, flags, stream_id)?;
        header.expect_stream_nonzero()?;
        Ok(Self {
            header,
            promised_stream_id,
            fragment,
            padding,
        })
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::PushPromise, payload.len())?;
        header.expect_stream_nonzero()?;
        let (mut body, padding) = strip_padding(&header, payload)?;
        if body.len() < 4 {
            return Err(H2Error::InvalidFrameLength {
                length: header.length() as usize,
                reason: "PUSH_PROMISE too short for promised stream id",
            });
        }
        let promised_stream_id = read_u32(&body.split_to(4)) & MAX_STREAM_ID;
        check_promised_id(promised_stream_id)?;
        Ok(Self {
            header,
            promised_stream_id,
            fragment: body,
            padding,
        })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        encode_pad_len(self.padding.as_ref(), dst);
        dst.put_u32(self.promised_stream_id);
        dst.put_slice(&self.fragment);
        if let Some(p) = &self.padding {
            dst.put_slice(p);
        }
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn stream_id(&self) -> u32 {
        self.header.stream_id()
    }

    pub fn promised_stream_id(&self) -> u32 {
        self.promised_stream_id
    }

    pub fn fragment(&self) -> &Bytes {
        &self.fragment
    }

    pub fn padding(&self) -> Option<&Bytes> {
        self.padding.as_ref()
    }

    pub fn is_end_headers(&self) -> bool {
        self.header.has_flag(FLAG_END_HEADERS)
    }
}

fn check_promised_id(promised_stream_id: u32) -> Result<(), H2Error> {
    if promised_stream_id == 0 || promised_stream_id > MAX_STREAM_ID {
        return Err(H2Error::InvalidStreamId {
            stream_id: promised_stream_id,
            reason: "invalid promised stream id",
        });
    }
    Ok(())
}

/// CONTINUATION frame (RFC 7540 Section 6.10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationFrame {
    header: FrameHeader,
    fragment: Bytes,
}

impl ContinuationFrame {
    pub fn new(stream_id: u32, fragment: Bytes, end_headers: bool) -> Result<Self, H2Error> {
        let flags = if end_headers { FLAG_END_HEADERS } else { 0 };
        let header = FrameHeader::new(FrameType::Continuation, fragment.len(), flags, stream_id)?;
        header.expect_stream_nonzero()?;
        Ok(Self { header, fragment })
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::Continuation, payload.len())?;
        header.expect_stream_nonzero()?;
        Ok(Self {
            header,
            fragment: payload,
        })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        dst.put_slice(&self.fragment);
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn stream_id(&self) -> u32 {
        self.header.stream_id()
    }

    pub fn fragment(&self) -> &Bytes {
        &self.fragment
    }

    pub fn is_end_headers(&self) -> bool {
        self.header.has_flag(FLAG_END_HEADERS)
    }
}

// -- Fragmentation --

/// Split an encoded header block into a HEADERS frame plus as many
/// CONTINUATION frames as needed so that no payload exceeds
/// `max_frame_size`. END_HEADERS is set on the last frame only.
pub fn fragment_headers(
    stream_id: u32,
    mut block: Bytes,
    end_stream: bool,
    priority: Option<Priority>,
    max_frame_size: u32,
) -> Result<Vec<Frame>, H2Error> {
    let max = max_frame_size as usize;
    let overhead = if priority.is_some() { PRIORITY_LEN } else { 0 };
    if max <= overhead {
        return Err(H2Error::InvalidFrameLength {
            length: max,
            reason: "max frame size leaves no room for a header block",
        });
    }
    let first = block.split_to(block.len().min(max - overhead));
    let mut headers = HeadersFrame::new(stream_id, first, end_stream, block.is_empty())?;
    if let Some(p) = priority {
        headers = headers.with_priority(p)?;
    }
    let mut frames = vec![Frame::Headers(headers)];
    continuation_frames(stream_id, block, max, &mut frames)?;
    Ok(frames)
}

/// Split an encoded header block into a PUSH_PROMISE frame plus
/// CONTINUATION frames.
pub fn fragment_push_promise(
    stream_id: u32,
    promised_stream_id: u32,
    mut block: Bytes,
    max_frame_size: u32,
) -> Result<Vec<Frame>, H2Error> {
    let max = max_frame_size as usize;
    if max <= 4 {
        return Err(H2Error::InvalidFrameLength {
            length: max,
            reason: "max frame size leaves no room for a header block",
        });
    }
    let first = block.split_to(block.len().min(max - 4));
    let promise = PushPromiseFrame::new(stream_id, promised_stream_id, first, block.is_empty())?;
    let mut frames = vec![Frame::PushPromise(promise)];
    continuation_frames(stream_id, block, max, &mut frames)?;
    Ok(frames)
}

fn continuation_frames(
    stream_id: u32,
    mut rest: Bytes,
    max: usize,
    frames: &mut Vec<Frame>,
) -> Result<(), H2Error> {
    while !rest.is_empty() {
        let chunk = rest.split_to(rest.len().min(max));
        frames.push(Frame::Continuation(ContinuationFrame::new(
            stream_id,
            chunk,
            rest.is_empty(),
        )?));
    }
    Ok(())
}

// -- Reassembly --

/// Which frame opened a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderBlockKind {
    Headers {
        end_stream: bool,
        priority: Option<Priority>,
    },
    PushPromise {
        promised_stream_id: u32,
    },
}

/// A complete header block, ready for HPACK decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassembledBlock {
    pub stream_id: u32,
    pub kind: HeaderBlockKind,
    pub block: Bytes,
}

/// Result of feeding one frame to a [`HeaderBlockAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    /// Not header-related; hand it on unchanged.
    Frame(Frame),
    /// A header block finished with this frame.
    Block(ReassembledBlock),
    /// Fragment buffered; more CONTINUATION frames are expected.
    Pending,
}

#[derive(Debug)]
struct PendingBlock {
    stream_id: u32,
    kind: HeaderBlockKind,
    buf: BytesMut,
}

/// Joins HEADERS/PUSH_PROMISE and their CONTINUATION frames into complete
/// header blocks.
///
/// While a block is open, any frame other than a CONTINUATION on the same
/// stream is a connection error (RFC 7540 Section 6.10).
#[derive(Debug, Default)]
pub struct HeaderBlockAssembler {
    pending: Option<PendingBlock>,
    max_block_size: Option<usize>,
}

impl HeaderBlockAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds reassembled blocks by `max_header_list_size`.
    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            pending: None,
            max_block_size: config.max_header_list_size,
        }
    }

    /// Stream whose header block is still open, if any.
    pub fn pending_stream(&self) -> Option<u32> {
        self.pending.as_ref().map(|p| p.stream_id)
    }

    pub fn push(&mut self, frame: Frame) -> Result<Assembled, H2Error> {
        if let Some(pending) = &self.pending {
            let expected = pending.stream_id;
            return match frame {
                Frame::Continuation(cont) if cont.stream_id() == expected => {
                    self.continue_block(cont)
                }
                Frame::Continuation(cont) => Err(H2Error::InvalidStreamId {
                    stream_id: cont.stream_id(),
                    reason: "CONTINUATION for a different stream",
                }),
                other => {
                    tracing::debug!(
                        expected_stream = expected,
                        frame_type = %other.frame_type(),
                        "frame interleaved in header block"
                    );
                    Err(H2Error::FrameStructure("expected CONTINUATION frame"))
                }
            };
        }

        match frame {
            Frame::Headers(headers) => {
                let kind = HeaderBlockKind::Headers {
                    end_stream: headers.is_end_stream(),
                    priority: headers.priority(),
                };
                let end = headers.is_end_headers();
                self.open_block(headers.stream_id(), kind, headers.fragment().clone(), end)
            }
            Frame::PushPromise(promise) => {
                let kind = HeaderBlockKind::PushPromise {
                    promised_stream_id: promise.promised_stream_id(),
                };
                let end = promise.is_end_headers();
                self.open_block(promise.stream_id(), kind, promise.fragment().clone(), end)
            }
            Frame::Continuation(_) => Err(H2Error::FrameStructure(
                "CONTINUATION without an open header block",
            )),
            other => Ok(Assembled::Frame(other)),
        }
    }

    fn open_block(
        &mut self,
        stream_id: u32,
        kind: HeaderBlockKind,
        fragment: Bytes,
        end_headers: bool,
    ) -> Result<Assembled, H2Error> {
        self.check_size(fragment.len())?;
        if end_headers {
            return Ok(Assembled::Block(ReassembledBlock {
                stream_id,
                kind,
                block: fragment,
            }));
        }
        self.pending = Some(PendingBlock {
            stream_id,
            kind,
            buf: BytesMut::from(&fragment[..]),
        });
        Ok(Assembled::Pending)
    }

    fn continue_block(&mut self, cont: ContinuationFrame) -> Result<Assembled, H2Error> {
        let buffered = self.pending.as_ref().map_or(0, |p| p.buf.len());
        if let Err(e) = self.check_size(buffered + cont.fragment().len()) {
            self.pending = None;
            return Err(e);
        }
        let Some(mut pending) = self.pending.take() else {
            return Err(H2Error::FrameStructure(
                "CONTINUATION without an open header block",
            ));
        };
        pending.buf.extend_from_slice(cont.fragment());
        if !cont.is_end_headers() {
            self.pending = Some(pending);
            return Ok(Assembled::Pending);
        }
        Ok(Assembled::Block(ReassembledBlock {
            stream_id: pending.stream_id,
            kind: pending.kind,
            block: pending.buf.freeze(),
        }))
    }

    fn check_size(&self, len: usize) -> Result<(), H2Error> {
        match self.max_block_size {
            Some(max) if len > max => Err(H2Error::InvalidFrameLength {
                length: len,
                reason: "header block exceeds size limit",
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{DataFrame, PingFrame};
    use crate::header::FLAG_PADDED;

    fn round_trip<T>(
        encode: impl FnOnce(&mut Vec<u8>),
        parse: fn(FrameHeader, Bytes) -> Result<T, H2Error>,
    ) -> Result<T, H2Error> {
        let mut buf = Vec::new();
        encode(&mut buf);
        let header = FrameHeader::parse(&buf)?;
        parse(header, Bytes::copy_from_slice(&buf[9..]))
    }

    #[test]
    fn headers_frame_round_trip() {
        let frame = HeadersFrame::new(3, Bytes::from_static(&[0x82, 0x86, 0x84]), false, true)
            .unwrap();
        let decoded = round_trip(|b| frame.encode(b), HeadersFrame::parse).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.fragment(), &[0x82, 0x86, 0x84][..]);
        assert!(!decoded.is_end_stream());
        assert!(decoded.is_end_headers());
        assert!(decoded.priority().is_none());
    }

    #[test]
    fn headers_with_priority_and_padding() {
        let frame = HeadersFrame::new(1, Bytes::from_static(&[0x82]), true, true)
            .unwrap()
            .with_priority(Priority::new(0, 256, true).unwrap())
            .unwrap()
            .with_padding(Bytes::from_static(&[0, 0, 0]))
            .unwrap();
        assert_eq!(frame.header().length(), 1 + 5 + 1 + 3);
        let mut wire = Vec::new();
        frame.encode(&mut wire);
        // Pad length, then E bit + dependency, weight, fragment, padding.
        assert_eq!(wire[9..], [3, 0x80, 0, 0, 0, 0xff, 0x82, 0, 0, 0]);

        let decoded = round_trip(|b| frame.encode(b), HeadersFrame::parse).unwrap();
        assert_eq!(decoded, frame);
        let priority = decoded.priority().unwrap();
        assert!(priority.exclusive());
        assert_eq!(priority.weight(), 256);
        assert_eq!(decoded.padding().unwrap().len(), 3);
    }

    #[test]
    fn headers_priority_self_dependency_rejected() {
        let frame = HeadersFrame::new(3, Bytes::new(), false, true).unwrap();
        assert!(frame.with_priority(Priority::new(3, 16, false).unwrap()).is_err());
        let header = FrameHeader::new(FrameType::Headers, 5, FLAG_PRIORITY, 3).unwrap();
        assert_eq!(
            HeadersFrame::parse(header, Bytes::from_static(&[0, 0, 0, 3, 15])),
            Err(H2Error::FrameStructure("stream depends on itself"))
        );
    }

    #[test]
    fn headers_priority_truncated() {
        let header = FrameHeader::new(FrameType::Headers, 4, FLAG_PRIORITY, 1).unwrap();
        assert!(matches!(
            HeadersFrame::parse(header, Bytes::from_static(&[0, 0, 0, 3])),
            Err(H2Error::InvalidFrameLength { .. })
        ));
    }

    #[test]
    fn headers_padding_exceeds_payload() {
        let header = FrameHeader::new(FrameType::Headers, 3, FLAG_PADDED, 1).unwrap();
        assert_eq!(
            HeadersFrame::parse(header, Bytes::from_static(&[3, 0x82, 0])),
            Err(H2Error::FrameStructure("padding exceeds frame payload"))
        );
    }

    #[test]
    fn headers_on_stream_zero_rejected() {
        assert!(HeadersFrame::new(0, Bytes::new(), false, true).is_err());
    }

    #[test]
    fn push_promise_round_trip() {
        let frame = PushPromiseFrame::new(1, 2, Bytes::from_static(&[0x82, 0x87]), true)
            .unwrap()
            .with_padding(Bytes::from_static(&[0; 2]))
            .unwrap();
        let decoded = round_trip(|b| frame.encode(b), PushPromiseFrame::parse).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.promised_stream_id(), 2);
        assert_eq!(decoded.fragment(), &[0x82, 0x87][..]);
    }

    #[test]
    fn push_promise_rules() {
        assert!(PushPromiseFrame::new(1, 0, Bytes::new(), true).is_err());
        let header = FrameHeader::new(FrameType::PushPromise, 3, FLAG_END_HEADERS, 1).unwrap();
        assert!(matches!(
            PushPromiseFrame::parse(header, Bytes::from_static(&[0, 0, 2])),
            Err(H2Error::InvalidFrameLength { .. })
        ));
        // END_STREAM is not defined for PUSH_PROMISE.
        let header = FrameHeader::new(FrameType::PushPromise, 4, FLAG_END_STREAM, 1).unwrap();
        assert!(matches!(
            PushPromiseFrame::parse(header, Bytes::from_static(&[0, 0, 0, 2])),
            Err(H2Error::InvalidFlags { .. })
        ));
    }

    #[test]
    fn continuation_round_trip() {
        let frame = ContinuationFrame::new(5, Bytes::from_static(b"frag"), false).unwrap();
        let decoded = round_trip(|b| frame.encode(b), ContinuationFrame::parse).unwrap();
        assert_eq!(decoded, frame);
        assert!(!decoded.is_end_headers());
        assert!(ContinuationFrame::new(0, Bytes::new(), true).is_err());
    }

    #[test]
    fn small_block_is_one_frame() {
        let frames = fragment_headers(1, Bytes::from_static(&[0x82]), true, None, 16_384).unwrap();
        assert_eq!(frames.len(), 1);
        let Frame::Headers(headers) = &frames[0] else {
            panic!("expected HEADERS");
        };
        assert!(headers.is_end_headers());
        assert!(headers.is_end_stream());
    }

    #[test]
    fn large_block_split_into_continuations() {
        let block = Bytes::from((0..40u8).collect::<Vec<_>>());
        let priority = Priority::new(0, 16, false).unwrap();
        let frames = fragment_headers(3, block.clone(), false, Some(priority), 16).unwrap();
        // 11 bytes in HEADERS (16 - 5 for priority), then 16 + 13.
        let lens: Vec<_> = frames.iter().map(|f| f.header().length()).collect();
        assert_eq!(lens, [16, 16, 13]);
        let ends: Vec<_> = frames
            .iter()
            .map(|f| f.header().has_flag(FLAG_END_HEADERS))
            .collect();
        assert_eq!(ends, [false, false, true]);

        let mut assembler = HeaderBlockAssembler::new();
        let mut result = Assembled::Pending;
        for frame in frames {
            result = assembler.push(frame).unwrap();
        }
        let Assembled::Block(reassembled) = result else {
            panic!("expected complete block");
        };
        assert_eq!(reassembled.block, block);
        assert_eq!(reassembled.stream_id, 3);
        assert_eq!(
            reassembled.kind,
            HeaderBlockKind::Headers {
                end_stream: false,
                priority: Some(priority),
            }
        );
    }

    #[test]
    fn push_promise_fragmentation() {
        let block = Bytes::from(vec![0x82; 30]);
        let frames = fragment_push_promise(1, 2, block.clone(), 20).unwrap();
        assert_eq!(frames.len(), 2);
        let mut assembler = HeaderBlockAssembler::new();
        assert_eq!(assembler.push(frames[0].clone()).unwrap(), Assembled::Pending);
        assert_eq!(assembler.pending_stream(), Some(1));
        let Assembled::Block(reassembled) = assembler.push(frames[1].clone()).unwrap() else {
            panic!("expected complete block");
        };
        assert_eq!(reassembled.block, block);
        assert_eq!(
            reassembled.kind,
            HeaderBlockKind::PushPromise {
                promised_stream_id: 2
            }
        );
        assert_eq!(assembler.pending_stream(), None);
    }

    #[test]
    fn non_header_frames_pass_through() {
        let mut assembler = HeaderBlockAssembler::new();
        let ping = Frame::Ping(PingFrame::new([0; 8]));
        assert_eq!(assembler.push(ping.clone()).unwrap(), Assembled::Frame(ping));
    }

    #[test]
    fn interleaved_frame_rejected() {
        let mut assembler = HeaderBlockAssembler::new();
        let headers = HeadersFrame::new(1, Bytes::from_static(&[0x82]), false, false).unwrap();
        assert_eq!(assembler.push(headers.into()).unwrap(), Assembled::Pending);
        let data = DataFrame::new(1, Bytes::new(), false).unwrap();
        assert_eq!(
            assembler.push(data.into()),
            Err(H2Error::FrameStructure("expected CONTINUATION frame"))
        );
    }

    #[test]
    fn continuation_stream_mismatch_rejected() {
        let mut assembler = HeaderBlockAssembler::new();
        let headers = HeadersFrame::new(1, Bytes::from_static(&[0x82]), false, false).unwrap();
        assembler.push(headers.into()).unwrap();
        let cont = ContinuationFrame::new(3, Bytes::from_static(&[0x84]), true).unwrap();
        assert!(matches!(
            assembler.push(cont.into()),
            Err(H2Error::InvalidStreamId { stream_id: 3, .. })
        ));
    }

    #[test]
    fn stray_continuation_rejected() {
        let mut assembler = HeaderBlockAssembler::new();
        let cont = ContinuationFrame::new(1, Bytes::from_static(&[0x84]), true).unwrap();
        assert_eq!(
            assembler.push(cont.into()),
            Err(H2Error::FrameStructure(
                "CONTINUATION without an open header block"
            ))
        );
    }

    #[test]
    fn oversized_block_rejected() {
        let config = CodecConfig {
            max_header_list_size: Some(8),
            ..CodecConfig::default()
        };
        let mut assembler = HeaderBlockAssembler::with_config(&config);
        let headers = HeadersFrame::new(1, Bytes::from_static(&[0; 6]), false, false).unwrap();
        assembler.push(headers.into()).unwrap();
        let cont = ContinuationFrame::new(1, Bytes::from_static(&[0; 6]), true).unwrap();
        assert!(matches!(
            assembler.push(cont.into()),
            Err(H2Error::InvalidFrameLength { length: 12, .. })
        ));
        assert_eq!(assembler.pending_stream(), None);
    }
}
