//! HTTP/2 SETTINGS parameters (RFC 7540 Section 6.5.1).

use bytes::BufMut;

use crate::error::H2Error;

// Settings identifiers.
pub const SETTINGS_HEADER_TABLE_SIZE: u16 = 0x1;
pub const SETTINGS_ENABLE_PUSH: u16 = 0x2;
pub const SETTINGS_MAX_CONCURRENT_STREAMS: u16 = 0x3;
pub const SETTINGS_INITIAL_WINDOW_SIZE: u16 = 0x4;
pub const SETTINGS_MAX_FRAME_SIZE: u16 = 0x5;
pub const SETTINGS_MAX_HEADER_LIST_SIZE: u16 = 0x6;

/// Size of one `(id, value)` pair on the wire.
pub const SETTING_LEN: usize = 6;

/// One SETTINGS entry as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub id: u16,
    pub value: u32,
}

impl Setting {
    pub fn new(id: u16, value: u32) -> Self {
        Self { id, value }
    }

    /// Whether the identifier is one of the six defined by RFC 7540.
    pub fn is_known(&self) -> bool {
        (SETTINGS_HEADER_TABLE_SIZE..=SETTINGS_MAX_HEADER_LIST_SIZE).contains(&self.id)
    }

    /// Check the value range of a known setting. Unknown ids always pass.
    pub fn validate(&self) -> Result<(), H2Error> {
        match self.id {
            SETTINGS_ENABLE_PUSH if self.value > 1 => {
                Err(H2Error::FrameStructure("ENABLE_PUSH must be 0 or 1"))
            }
            SETTINGS_INITIAL_WINDOW_SIZE if self.value > 0x7fff_ffff => {
                Err(H2Error::FrameStructure("INITIAL_WINDOW_SIZE above 2^31-1"))
            }
            SETTINGS_MAX_FRAME_SIZE if !(16_384..=16_777_215).contains(&self.value) => {
                Err(H2Error::FrameStructure("MAX_FRAME_SIZE out of range"))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn parse(buf: &[u8]) -> Self {
        Self {
            id: u16::from_be_bytes([buf[0], buf[1]]),
            value: u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]),
        }
    }

    pub(crate) fn encode<B: BufMut>(&self, dst: &mut B) {
        dst.put_u16(self.id);
        dst.put_u32(self.value);
    }
}

/// HTTP/2 SETTINGS parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// SETTINGS_HEADER_TABLE_SIZE (0x1). Default 4096.
    pub header_table_size: u32,
    /// SETTINGS_ENABLE_PUSH (0x2). Default 1 (enabled).
    pub enable_push: bool,
    /// SETTINGS_MAX_CONCURRENT_STREAMS (0x3). Default unlimited.
    pub max_concurrent_streams: Option<u32>,
    /// SETTINGS_INITIAL_WINDOW_SIZE (0x4). Default 65535.
    pub initial_window_size: u32,
    /// SETTINGS_MAX_FRAME_SIZE (0x5). Default 16384.
    pub max_frame_size: u32,
    /// SETTINGS_MAX_HEADER_LIST_SIZE (0x6). Default unlimited.
    pub max_header_list_size: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header_table_size: 4096,
            enable_push: true,
            max_concurrent_streams: None,
            initial_window_size: 65535,
            max_frame_size: 16384,
            max_header_list_size: None,
        }
    }
}

impl Settings {
    /// Client defaults: push disabled (ENABLE_PUSH=0).
    pub fn client_default() -> Self {
        Self {
            enable_push: false,
            ..Default::default()
        }
    }

    /// Apply entries in order; later entries for the same id win.
    ///
    /// Every entry is validated before anything changes, so a failed call
    /// leaves `self` untouched. Unknown ids are skipped.
    pub fn apply(&mut self, entries: &[Setting]) -> Result<(), H2Error> {
        for entry in entries {
            entry.validate()?;
        }
        for entry in entries {
            match entry.id {
                SETTINGS_HEADER_TABLE_SIZE => self.header_table_size = entry.value,
                SETTINGS_ENABLE_PUSH => self.enable_push = entry.value == 1,
                SETTINGS_MAX_CONCURRENT_STREAMS => {
                    self.max_concurrent_streams = Some(entry.value);
                }
                SETTINGS_INITIAL_WINDOW_SIZE => self.initial_window_size = entry.value,
                SETTINGS_MAX_FRAME_SIZE => self.max_frame_size = entry.value,
                SETTINGS_MAX_HEADER_LIST_SIZE => {
                    self.max_header_list_size = Some(entry.value);
                }
                id => tracing::trace!(id, value = entry.value, "skipping unknown setting"),
            }
        }
        Ok(())
    }

    /// Entries that advertise these settings. Unlimited values are omitted.
    pub fn to_entries(&self) -> Vec<Setting> {
        let mut entries = vec![
            Setting::new(SETTINGS_HEADER_TABLE_SIZE, self.header_table_size),
            Setting::new(SETTINGS_ENABLE_PUSH, u32::from(self.enable_push)),
        ];
        if let Some(v) = self.max_concurrent_streams {
            entries.push(Setting::new(SETTINGS_MAX_CONCURRENT_STREAMS, v));
        }
        entries.push(Setting::new(
            SETTINGS_INITIAL_WINDOW_SIZE,
            self.initial_window_size,
        ));
        entries.push(Setting::new(SETTINGS_MAX_FRAME_SIZE, self.max_frame_size));
        if let Some(v) = self.max_header_list_size {
            entries.push(Setting::new(SETTINGS_MAX_HEADER_LIST_SIZE, v));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(entries: &[Setting]) -> Result<Settings, H2Error> {
        let mut settings = Settings::default();
        settings.apply(entries)?;
        Ok(settings)
    }

    #[test]
    fn default_settings_round_trip() {
        let settings = Settings::default();
        let decoded = applied(&settings.to_entries()).unwrap();
        assert_eq!(decoded, settings);
        assert_eq!(decoded.header_table_size, 4096);
        assert!(decoded.enable_push);
        assert_eq!(decoded.initial_window_size, 65535);
        assert_eq!(decoded.max_frame_size, 16384);
    }

    #[test]
    fn client_settings_disable_push() {
        let entries = Settings::client_default().to_entries();
        assert!(entries.contains(&Setting::new(SETTINGS_ENABLE_PUSH, 0)));
        assert!(!applied(&entries).unwrap().enable_push);
    }

    #[test]
    fn custom_settings_round_trip() {
        let settings = Settings {
            header_table_size: 8192,
            enable_push: false,
            max_concurrent_streams: Some(100),
            initial_window_size: 1048576,
            max_frame_size: 32768,
            max_header_list_size: Some(65536),
        };
        assert_eq!(settings.to_entries().len(), 6);
        assert_eq!(applied(&settings.to_entries()).unwrap(), settings);
    }

    #[test]
    fn later_entries_win() {
        let settings = applied(&[
            Setting::new(SETTINGS_HEADER_TABLE_SIZE, 100),
            Setting::new(SETTINGS_HEADER_TABLE_SIZE, 200),
        ])
        .unwrap();
        assert_eq!(settings.header_table_size, 200);
    }

    #[test]
    fn invalid_enable_push_rejected() {
        assert!(applied(&[Setting::new(SETTINGS_ENABLE_PUSH, 2)]).is_err());
    }

    #[test]
    fn invalid_window_size_rejected() {
        assert!(applied(&[Setting::new(SETTINGS_INITIAL_WINDOW_SIZE, 0x8000_0000)]).is_err());
        assert!(applied(&[Setting::new(SETTINGS_INITIAL_WINDOW_SIZE, 0x7fff_ffff)]).is_ok());
    }

    #[test]
    fn invalid_max_frame_size_rejected() {
        assert!(applied(&[Setting::new(SETTINGS_MAX_FRAME_SIZE, 100)]).is_err());
        assert!(applied(&[Setting::new(SETTINGS_MAX_FRAME_SIZE, 16_777_216)]).is_err());
        assert!(applied(&[Setting::new(SETTINGS_MAX_FRAME_SIZE, 16_777_215)]).is_ok());
    }

    #[test]
    fn failed_apply_leaves_settings_unchanged() {
        let mut settings = Settings::default();
        let result = settings.apply(&[
            Setting::new(SETTINGS_HEADER_TABLE_SIZE, 1),
            Setting::new(SETTINGS_ENABLE_PUSH, 7),
        ]);
        assert!(result.is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unknown_setting_ignored() {
        let entry = Setting::new(0xff, 42);
        assert!(!entry.is_known());
        assert!(entry.validate().is_ok());
        assert_eq!(applied(&[entry]).unwrap(), Settings::default());
    }

    #[test]
    fn wire_layout() {
        let mut buf = Vec::new();
        Setting::new(SETTINGS_MAX_FRAME_SIZE, 0x0001_0000).encode(&mut buf);
        assert_eq!(buf, [0x00, 0x05, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            Setting::parse(&buf),
            Setting::new(SETTINGS_MAX_FRAME_SIZE, 0x0001_0000)
        );
    }
}
