use crate::error::H2Error;
use crate::header::MAX_FRAME_LENGTH;

/// Smallest legal SETTINGS_MAX_FRAME_SIZE (RFC 7540 Section 6.5.2).
pub const MIN_MAX_FRAME_SIZE: u32 = 16_384;

/// What to do with a SETTINGS entry whose identifier is not defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSettingPolicy {
    /// Keep the entry in the frame and skip it when applying
    /// (RFC 7540 Section 6.5.2).
    #[default]
    Ignore,
    /// Fail the SETTINGS frame.
    Reject,
}

/// Tunables for the frame and header-block decoders.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum HPACK dynamic table size we allow the peer to use.
    /// Default: 4096.
    pub header_table_size: usize,
    /// Largest inbound frame payload accepted by [`decode_frame`](crate::decode_frame).
    /// Must be within `16384..=2^24-1`. Default: 16384.
    pub max_frame_size: u32,
    /// Cap on a decoded header list, counted as `name + value + 32` per field.
    /// Also bounds reassembled header blocks. Default: unlimited.
    pub max_header_list_size: Option<usize>,
    /// Handling of unknown SETTINGS identifiers. Default: ignore.
    pub unknown_settings: UnknownSettingPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            header_table_size: 4096,
            max_frame_size: MIN_MAX_FRAME_SIZE,
            max_header_list_size: None,
            unknown_settings: UnknownSettingPolicy::Ignore,
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> Result<(), H2Error> {
        if !(MIN_MAX_FRAME_SIZE..=MAX_FRAME_LENGTH).contains(&self.max_frame_size) {
            return Err(H2Error::InvalidConfig(
                "max_frame_size must be within 16384..=16777215",
            ));
        }
        if self.header_table_size > u32::MAX as usize {
            return Err(H2Error::InvalidConfig(
                "header_table_size must fit in a SETTINGS value",
            ));
        }
        if self.max_header_list_size == Some(0) {
            return Err(H2Error::InvalidConfig("max_header_list_size must be nonzero"));
        }
        Ok(())
    }
}
