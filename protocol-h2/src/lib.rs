//! HTTP/2 wire codec: binary framing (RFC 7540) and HPACK header
//! compression (RFC 7541).
//!
//! This crate is sans-IO. It turns bytes into validated frames and header
//! lists and back again; stream state, flow control windows and the
//! transport belong to the caller.
//!
//! - **Frames**: [`FrameHeader`] plus one struct per frame type, unified as
//!   [`Frame`]. [`decode_frame`] splits complete frames off a `BytesMut`.
//! - **HPACK**: [`hpack::Encoder`] / [`hpack::Decoder`] over a shared
//!   static table and a per-connection dynamic table, with Huffman-coded
//!   string literals.
//! - **Header blocks**: [`frame::fragment_headers`] and
//!   [`frame::HeaderBlockAssembler`] handle CONTINUATION;
//!   [`HeaderBlock`] separates pseudo-headers from ordinary fields.
//!
//! Every malformed input yields an [`H2Error`]; [`H2Error::error_code`] gives
//! the RFC 7540 code to send back.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use protocol_h2::frame::{Assembled, HeaderBlockAssembler, fragment_headers};
//! use protocol_h2::hpack::{Decoder, Encoder};
//! use protocol_h2::{CodecConfig, HeaderBlock, PseudoHeaders, decode_frame};
//!
//! let config = CodecConfig::default();
//!
//! // Client: encode a request header block and frame it.
//! let mut encoder = Encoder::new(config.header_table_size);
//! let request = HeaderBlock::new(PseudoHeaders::request("GET", "https", "example.com", "/"));
//! let mut block = BytesMut::new();
//! request.encode(&mut encoder, &mut block);
//!
//! let mut wire = BytesMut::new();
//! for frame in fragment_headers(1, block.freeze(), true, None, config.max_frame_size).unwrap() {
//!     frame.encode(&mut wire);
//! }
//!
//! // Server: split frames off the buffer and decode the header block.
//! let mut decoder = Decoder::with_config(&config);
//! let mut assembler = HeaderBlockAssembler::with_config(&config);
//! while let Some(frame) = decode_frame(&mut wire, &config).unwrap() {
//!     if let Assembled::Block(done) = assembler.push(frame).unwrap() {
//!         let headers = HeaderBlock::decode(&mut decoder, &done.block).unwrap();
//!         assert_eq!(headers.pseudo.path.as_deref(), Some(&b"/"[..]));
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod header;
pub mod header_block;
pub mod hpack;
pub mod huffman;
pub mod settings;

pub use config::{CodecConfig, UnknownSettingPolicy};
pub use error::{ErrorCode, H2Error};
pub use frame::{Frame, decode_frame};
pub use header::{FrameHeader, FrameType};
pub use header_block::{HeaderBlock, PseudoHeaders};
pub use hpack::HeaderField;
pub use settings::{Setting, Settings};
