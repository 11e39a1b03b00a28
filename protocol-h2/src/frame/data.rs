use bytes::{BufMut, Bytes};

use super::{check_padding, encode_pad_len, padding_flag, padding_len, strip_padding};
use crate::error::H2Error;
use crate::header::{FLAG_END_STREAM, FrameHeader, FrameType};

/// DATA frame (RFC 7540 Section 6.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    header: FrameHeader,
    data: Bytes,
    padding: Option<Bytes>,
}

impl DataFrame {
    pub fn new(stream_id: u32, data: Bytes, end_stream: bool) -> Result<Self, H2Error> {
        Self::build(stream_id, data, None, end_stream)
    }

    /// A DATA frame with the PADDED flag. `padding` is written verbatim and
    /// may be empty (pad length 0).
    pub fn padded(
        stream_id: u32,
        data: Bytes,
        padding: Bytes,
        end_stream: bool,
    ) -> Result<Self, H2Error> {
        check_padding(&padding)?;
        Self::build(stream_id, data, Some(padding), end_stream)
    }

    fn build(
        stream_id: u32,
        data: Bytes,
        padding: Option<Bytes>,
        end_stream: bool,
    ) -> Result<Self, H2Error> {
        let mut flags = padding_flag(padding.as_ref());
        if end_stream {
            flags |= FLAG_END_STREAM;
        }
        let length = data.len() + padding_len(padding.as_ref());
        let header = FrameHeader::new(FrameType::Data, length, flags, stream_id)?;
        header.expect_stream_nonzero()?;
        Ok(Self {
            header,
            data,
            padding,
        })
    }

    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        header.check(FrameType::Data, payload.len())?;
        header.expect_stream_nonzero()?;
        let (data, padding) = strip_padding(&header, payload)?;
        Ok(Self {
            header,
            data,
            padding,
        })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        encode_pad_len(self.padding.as_ref(), dst);
        dst.put_slice(&self.data);
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

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    pub fn padding(&self) -> Option<&Bytes> {
        self.padding.as_ref()
    }

    pub fn is_end_stream(&self) -> bool {
        self.header.has_flag(FLAG_END_STREAM)
    }

    /// Bytes this frame counts against flow control windows, padding
    /// included (RFC 7540 Section 6.9.1).
    pub fn flow_controlled_len(&self) -> usize {
        self.header.length() as usize
    }
}
