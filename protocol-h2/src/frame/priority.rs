use bytes::{BufMut, Bytes};

use crate::error::H2Error;
use crate::header::{FrameHeader, FrameType, MAX_STREAM_ID, read_u32};

/// Encoded size of a priority block: E bit + dependency (4) + weight (1).
pub(crate) const PRIORITY_LEN: usize = 5;

/// Stream dependency and weight (RFC 7540 Section 5.3).
///
/// The weight is the effective value in `1..=256`; the wire octet is one less.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    exclusive: bool,
    dependency: u32,
    weight: u16,
}

impl Priority {
    pub fn new(dependency: u32, weight: u16, exclusive: bool) -> Result<Self, H2Error> {
        if !(1..=256).contains(&weight) {
            return Err(H2Error::FrameStructure("priority weight outside 1..=256"));
        }
        if dependency > MAX_STREAM_ID {
            return Err(H2Error::InvalidStreamId {
                stream_id: dependency,
                reason: "dependency uses reserved bit",
            });
        }
        Ok(Self {
            exclusive,
            dependency,
            weight,
        })
    }

    pub fn exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn dependency(&self) -> u32 {
        self.dependency
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Decode the 5-byte block. The caller guarantees the length.
    pub(crate) fn parse(buf: &[u8]) -> Self {
        let raw = read_u32(buf);
        Self {
            exclusive: raw & 0x8000_0000 != 0,
            dependency: raw & MAX_STREAM_ID,
            weight: u16::from(buf[4]) + 1,
        }
    }

    pub(crate) fn encode<B: BufMut>(&self, dst: &mut B) {
        let e = if self.exclusive { 0x8000_0000 } else { 0 };
        dst.put_u32(e | self.dependency);
        dst.put_u8((self.weight - 1) as u8);
    }

    /// A stream cannot depend on itself (RFC 7540 Section 5.3.1).
    pub(crate) fn check_not_self(&self, stream_id: u32) -> Result<(), H2Error> {
        if self.dependency == stream_id {
            return Err(H2Error::FrameStructure("stream depends on itself"));
        }
        Ok(())
    }
}

/// PRIORITY frame (RFC 7540 Section 6.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityFrame {
    header: FrameHeader,
    priority: Priority,
}

impl PriorityFrame {
    pub fn new(stream_id: u32, priority: Priority) -> Result<Self, H2Error> {
        let header = FrameHeader::new(FrameType::Priority, PRIORITY_LEN, 0, stream_id)?;
        header.expect_stream_nonzero()?;
        priority.check_not_self(stream_id)?;
        Ok(Self { header, priority })
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::Priority, payload.len())?;
        if payload.len() != PRIORITY_LEN {
            return Err(H2Error::InvalidFrameLength {
                length: payload.len(),
                reason: "PRIORITY payload must be 5 bytes",
            });
        }
        header.expect_stream_nonzero()?;
        let priority = Priority::parse(&payload);
        priority.check_not_self(header.stream_id())?;
        Ok(Self { header, priority })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        self.priority.encode(dst);
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn stream_id(&self) -> u32 {
        self.header.stream_id()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}
