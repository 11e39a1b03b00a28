use bytes::{BufMut, Bytes};

use crate::config::UnknownSettingPolicy;
use crate::error::H2Error;
use crate::header::{FLAG_ACK, FrameHeader, FrameType};
use crate::settings::{SETTING_LEN, Setting, Settings};

/// SETTINGS frame (RFC 7540 Section 6.5).
///
/// Entries are kept in wire order, duplicates included; applying them in
/// order gives the RFC's "last value wins" semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFrame {
    header: FrameHeader,
    entries: Vec<Setting>,
}

impl SettingsFrame {
    pub fn new(entries: Vec<Setting>) -> Result<Self, H2Error> {
        for entry in &entries {
            entry.validate()?;
        }
        let header = FrameHeader::new(FrameType::Settings, entries.len() * SETTING_LEN, 0, 0)?;
        Ok(Self { header, entries })
    }

    /// Advertise every value in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, H2Error> {
        Self::new(settings.to_entries())
    }

    /// Acknowledge the peer's SETTINGS.
    pub fn ack() -> Self {
        Self {
            header: FrameHeader::from_parts(FrameType::Settings, 0, FLAG_ACK, 0),
            entries: Vec::new(),
        }
    }

    /// Parse with the default unknown-setting policy (ignore).
    pub fn parse(header: FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        Self::parse_with(header, payload, UnknownSettingPolicy::default())
    }

    pub fn parse_with(
        header: FrameHeader,
        payload: Bytes,
        policy: UnknownSettingPolicy,
    ) -> Result<Self, H2Error> {
        header.check(FrameType::Settings, payload.len())?;
        header.expect_stream_zero()?;
        if header.has_flag(FLAG_ACK) {
            if !payload.is_empty() {
                return Err(H2Error::InvalidFrameLength {
                    length: payload.len(),
                    reason: "SETTINGS ACK with payload",
                });
            }
            return Ok(Self {
                header,
                entries: Vec::new(),
            });
        }
        if !payload.len().is_multiple_of(SETTING_LEN) {
            return Err(H2Error::InvalidFrameLength {
                length: payload.len(),
                reason: "SETTINGS payload not a multiple of 6",
            });
        }

        let mut entries = Vec::with_capacity(payload.len() / SETTING_LEN);
        for chunk in payload.chunks_exact(SETTING_LEN) {
            let entry = Setting::parse(chunk);
            if !entry.is_known() && policy == UnknownSettingPolicy::Reject {
                return Err(H2Error::FrameStructure("unknown setting identifier"));
            }
            entry.validate()?;
            entries.push(entry);
        }
        Ok(Self { header, entries })
    }

    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        self.header.encode(dst);
        for entry in &self.entries {
            entry.encode(dst);
        }
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn is_ack(&self) -> bool {
        self.header.has_flag(FLAG_ACK)
    }

    pub fn entries(&self) -> &[Setting] {
        &self.entries
    }

    /// Fold the entries into `settings`. Unknown identifiers are skipped.
    pub fn apply_to(&self, settings: &mut Settings) -> Result<(), H2Error> {
        settings.apply(&self.entries)
    }
}
