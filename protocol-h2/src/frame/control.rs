//! Fixed-layout control frames: RST_STREAM, PING, GOAWAY, WINDOW_UPDATE.

use bytes::{BufMut, Bytes};

use crate::error::{ErrorCode, H2Error};
use crate::header::{FLAG_ACK, FrameHeader, FrameType, MAX_STREAM_ID, read_u32};

fn expect_exact_len(payload: &Bytes, len: usize, reason: &'static str) -> Result<(), H2Error> {
    if payload.len() != len {
        return Err(H2Error::InvalidFrameLength {
            length: payload.len(),
            reason,
        });
    }
    Ok(())
}

/// RST_STREAM frame (RFC 7540 Section 6.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RstStreamFrame {
    header: FrameHeader,
    error_code: ErrorCode,
}

impl RstStreamFrame {
    pub fn new(stream_id: u32, error_code: ErrorCode) -> Result<Self, H2Error> {
        let header = FrameHeader::new(FrameType::RstStream, 4, 0, stream_id)?;
        header.expect_stream_nonzero()?;
        Ok(Self { header, error_code })
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::RstStream, payload.len())?;
        expect_exact_len(&payload, 4, "RST_STREAM payload must be 4 bytes")?;
        header.expect_stream_nonzero()?;
        let error_code = ErrorCode::try_from_u32(read_u32(&payload))
            .ok_or(H2Error::FrameStructure("unknown RST_STREAM error code"))?;
        Ok(Self { header, error_code })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        dst.put_u32(self.error_code.into());
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn stream_id(&self) -> u32 {
        self.header.stream_id()
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }
}

/// PING frame (RFC 7540 Section 6.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingFrame {
    header: FrameHeader,
    opaque: [u8; 8],
}

impl PingFrame {
    pub fn new(opaque: [u8; 8]) -> Self {
        Self {
            header: FrameHeader::from_parts(FrameType::Ping, 8, 0, 0),
            opaque,
        }
    }

    /// The response to a received PING: same opaque data, ACK set.
    pub fn pong(opaque: [u8; 8]) -> Self {
        Self {
            header: FrameHeader::from_parts(FrameType::Ping, 8, FLAG_ACK, 0),
            opaque,
        }
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::Ping, payload.len())?;
        expect_exact_len(&payload, 8, "PING payload must be 8 bytes")?;
        header.expect_stream_zero()?;
        let mut opaque = [0u8; 8];
        opaque.copy_from_slice(&payload);
        Ok(Self { header, opaque })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        dst.put_slice(&self.opaque);
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn is_ack(&self) -> bool {
        self.header.has_flag(FLAG_ACK)
    }

    pub fn opaque(&self) -> [u8; 8] {
        self.opaque
    }
}

/// GOAWAY frame (RFC 7540 Section 6.8).
///
/// The error code is kept as the raw 32-bit value so that codes from newer
/// extensions survive a parse/encode cycle; [`GoAwayFrame::error`] maps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoAwayFrame {
    header: FrameHeader,
    last_stream_id: u32,
    error_code: u32,
    debug_data: Bytes,
}

impl GoAwayFrame {
    pub fn new(last_stream_id: u32, error_code: u32, debug_data: Bytes) -> Result<Self, H2Error> {
        if last_stream_id > MAX_STREAM_ID {
            return Err(H2Error::InvalidStreamId {
                stream_id: last_stream_id,
                reason: "last stream id uses reserved bit",
            });
        }
        let header = FrameHeader::new(FrameType::GoAway, 8 + debug_data.len(), 0, 0)?;
        Ok(Self {
            header,
            last_stream_id,
            error_code,
            debug_data,
        })
    }

    pub fn parse(header: FrameHeader, mut payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::GoAway, payload.len())?;
        if payload.len() < 8 {
            return Err(H2Error::InvalidFrameLength {
                length: payload.len(),
                reason: "GOAWAY payload shorter than 8 bytes",
            });
        }
        header.expect_stream_zero()?;
        let last_stream_id = read_u32(&payload) & MAX_STREAM_ID;
        let error_code = read_u32(&payload[4..]);
        let debug_data = payload.split_off(8);
        Ok(Self {
            header,
            last_stream_id,
            error_code,
            debug_data,
        })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        dst.put_u32(self.last_stream_id);
        dst.put_u32(self.error_code);
        dst.put_slice(&self.debug_data);
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn last_stream_id(&self) -> u32 {
        self.last_stream_id
    }

    /// Raw error code as sent.
    pub fn error_code(&self) -> u32 {
        self.error_code
    }

    /// Error code, with unknown values treated as INTERNAL_ERROR.
    pub fn error(&self) -> ErrorCode {
        ErrorCode::from_u32(self.error_code)
    }

    pub fn debug_data(&self) -> &Bytes {
        &self.debug_data
    }
}

/// WINDOW_UPDATE frame (RFC 7540 Section 6.9). Stream 0 targets the
/// connection window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowUpdateFrame {
    header: FrameHeader,
    increment: u32,
}

impl WindowUpdateFrame {
    pub fn new(stream_id: u32, increment: u32) -> Result<Self, H2Error> {
        if increment == 0 || increment > MAX_STREAM_ID {
            return Err(H2Error::FrameStructure(
                "window increment outside 1..=2^31-1",
            ));
        }
        let header = FrameHeader::new(FrameType::WindowUpdate, 4, 0, stream_id)?;
        Ok(Self { header, increment })
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::WindowUpdate, payload.len())?;
        expect_exact_len(&payload, 4, "WINDOW_UPDATE payload must be 4 bytes")?;
        let increment = read_u32(&payload) & MAX_STREAM_ID;
        if increment == 0 {
            return Err(H2Error::FrameStructure("window increment of 0"));
        }
        Ok(Self { header, increment })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        dst.put_u32(self.increment);
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn stream_id(&self) -> u32 {
        self.header.stream_id()
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_of(encode: impl FnOnce(&mut Vec<u8>)) -> (FrameHeader, Bytes) {
        let mut buf = Vec::new();
        encode(&mut buf);
        let header = FrameHeader::parse(&buf).unwrap();
        (header, Bytes::copy_from_slice(&buf[9..]))
    }

    #[test]
    fn rst_stream_round_trip() {
        let frame = RstStreamFrame::new(1, ErrorCode::Cancel).unwrap();
        let (header, payload) = wire_of(|b| frame.encode(b));
        assert_eq!(payload, &[0, 0, 0, 8][..]);
        let decoded = RstStreamFrame::parse(header, payload).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.error_code(), ErrorCode::Cancel);
    }

    #[test]
    fn rst_stream_unknown_code_rejected() {
        let header = FrameHeader::new(FrameType::RstStream, 4, 0, 1).unwrap();
        assert_eq!(
            RstStreamFrame::parse(header, Bytes::from_static(&[0, 0, 0, 0x0e])),
            Err(H2Error::FrameStructure("unknown RST_STREAM error code"))
        );
    }

    #[test]
    fn rst_stream_rules() {
        assert!(RstStreamFrame::new(0, ErrorCode::Cancel).is_err());
        let header = FrameHeader::new(FrameType::RstStream, 3, 0, 1).unwrap();
        assert!(matches!(
            RstStreamFrame::parse(header, Bytes::from_static(&[0, 0, 8])),
            Err(H2Error::InvalidFrameLength { length: 3, .. })
        ));
    }

    #[test]
    fn ping_round_trip() {
        let frame = PingFrame::new([1, 2, 3, 4, 5, 6, 7, 8]);
        let (header, payload) = wire_of(|b| frame.encode(b));
        let decoded = PingFrame::parse(header, payload).unwrap();
        assert_eq!(decoded, frame);
        assert!(!decoded.is_ack());
        assert_eq!(decoded.opaque(), [1, 2, 3, 4, 5, 6, 7, 8]);

        let pong = PingFrame::pong(decoded.opaque());
        let (header, payload) = wire_of(|b| pong.encode(b));
        assert!(PingFrame::parse(header, payload).unwrap().is_ack());
    }

    #[test]
    fn ping_rules() {
        let header = FrameHeader::new(FrameType::Ping, 8, 0, 1).unwrap();
        assert!(matches!(
            PingFrame::parse(header, Bytes::from_static(&[0; 8])),
            Err(H2Error::InvalidStreamId { stream_id: 1, .. })
        ));
        let header = FrameHeader::new(FrameType::Ping, 7, 0, 0).unwrap();
        assert!(matches!(
            PingFrame::parse(header, Bytes::from_static(&[0; 7])),
            Err(H2Error::InvalidFrameLength { length: 7, .. })
        ));
    }

    #[test]
    fn goaway_round_trip() {
        let frame = GoAwayFrame::new(5, ErrorCode::NoError.into(), Bytes::from_static(b"bye"))
            .unwrap();
        let (header, payload) = wire_of(|b| frame.encode(b));
        assert_eq!(header.length(), 11);
        let decoded = GoAwayFrame::parse(header, payload).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.last_stream_id(), 5);
        assert_eq!(decoded.error(), ErrorCode::NoError);
        assert_eq!(decoded.debug_data(), &b"bye"[..]);
    }

    #[test]
    fn goaway_keeps_unknown_code() {
        let frame = GoAwayFrame::new(0, 0xdead, Bytes::new()).unwrap();
        let (header, payload) = wire_of(|b| frame.encode(b));
        let decoded = GoAwayFrame::parse(header, payload).unwrap();
        assert_eq!(decoded.error_code(), 0xdead);
        assert_eq!(decoded.error(), ErrorCode::InternalError);
    }

    #[test]
    fn goaway_rules() {
        let header = FrameHeader::new(FrameType::GoAway, 7, 0, 0).unwrap();
        assert!(matches!(
            GoAwayFrame::parse(header, Bytes::from_static(&[0; 7])),
            Err(H2Error::InvalidFrameLength { length: 7, .. })
        ));
        let header = FrameHeader::new(FrameType::GoAway, 8, 0, 3).unwrap();
        assert!(GoAwayFrame::parse(header, Bytes::from_static(&[0; 8])).is_err());
        assert!(GoAwayFrame::new(0x8000_0000, 0, Bytes::new()).is_err());
    }

    #[test]
    fn window_update_round_trip() {
        let frame = WindowUpdateFrame::new(1, 1000).unwrap();
        let (header, payload) = wire_of(|b| frame.encode(b));
        let decoded = WindowUpdateFrame::parse(header, payload).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.increment(), 1000);

        let connection = WindowUpdateFrame::new(0, MAX_STREAM_ID).unwrap();
        let (header, payload) = wire_of(|b| connection.encode(b));
        assert_eq!(WindowUpdateFrame::parse(header, payload).unwrap(), connection);
    }

    #[test]
    fn zero_increment_rejected() {
        assert!(WindowUpdateFrame::new(1, 0).is_err());
        let header = FrameHeader::new(FrameType::WindowUpdate, 4, 0, 1).unwrap();
        assert_eq!(
            WindowUpdateFrame::parse(header, Bytes::from_static(&[0x80, 0, 0, 0])),
            Err(H2Error::FrameStructure("window increment of 0"))
        );
    }
}
