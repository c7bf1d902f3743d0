//! CI-V frame encoder/decoder.
//!
//! This module handles the byte-level shape of a frame on the CAT link. It
//! performs no I/O and knows nothing about what individual commands mean.
//!
//! # Frame format
//!
//! ```text
//! 0xFE 0xFE <dst> <src> <cmd> [<sub>] [<data>...] 0xFD
//! ```
//!
//! - Preamble: two `0xFE` bytes
//! - `dst`: addressed device (`0xA4` for this transceiver)
//! - `src`: sender, echoed back as `dst` in the response
//! - `cmd`: command byte
//! - `sub`, `data`: command-specific payload
//! - Terminator: `0xFD`
//!
//! Whether the first payload byte is a sub-command depends on the command,
//! so [`CivFrame`] keeps the payload undivided and leaves the split to the
//! command catalogue.

use std::fmt::Write as _;

use bytes::{BufMut, BytesMut};

/// Preamble byte repeated twice at the start of every CI-V frame.
pub const PREAMBLE: u8 = 0xFE;

/// Frame terminator byte.
pub const TERMINATOR: u8 = 0xFD;

/// Positive acknowledgement code.
pub const ACK: u8 = 0xFB;

/// Negative acknowledgement code.
pub const NAK: u8 = 0xFA;

/// This transceiver's fixed CI-V address.
pub const DEVICE_ADDR: u8 = 0xA4;

/// Destination of unsolicited transceive frames.
pub const BROADCAST_ADDR: u8 = 0x00;

/// Longest frame the reader will accumulate, terminator included.
pub const MAX_FRAME_LEN: usize = 256;

/// Shortest well-formed frame: preamble, addresses, command, terminator.
pub const MIN_FRAME_LEN: usize = 6;

/// A parsed CI-V frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivFrame {
    /// Destination address.
    pub dst_addr: u8,
    /// Source address.
    pub src_addr: u8,
    /// Command byte.
    pub cmd: u8,
    /// Everything between the command byte and the terminator.
    pub payload: Vec<u8>,
}

impl CivFrame {
    /// The first payload byte, for commands that carry a sub-command.
    pub fn sub_cmd(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Payload bytes after the sub-command.
    pub fn sub_data(&self) -> &[u8] {
        self.payload.get(1..).unwrap_or(&[])
    }
}

/// Why a byte sequence could not be parsed as a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than the smallest possible frame.
    #[error("frame too short ({0} bytes)")]
    TooShort(usize),

    /// The first two bytes are not the preamble.
    #[error("bad preamble {0:02X} {1:02X}")]
    BadPreamble(u8, u8),

    /// The last byte is not the terminator.
    #[error("missing terminator")]
    Unterminated,

    /// Longer than [`MAX_FRAME_LEN`].
    #[error("frame too long ({0} bytes)")]
    Oversized(usize),
}

/// Parse one complete frame, as produced by the frame reader.
///
/// ```
/// use civcat_engine::civ::parse_frame;
///
/// let frame = parse_frame(&[0xFE, 0xFE, 0xA4, 0xE0, 0x03, 0xFD]).unwrap();
/// assert_eq!(frame.cmd, 0x03);
/// assert!(frame.payload.is_empty());
/// ```
pub fn parse_frame(raw: &[u8]) -> Result<CivFrame, FrameError> {
    if raw.len() > MAX_FRAME_LEN {
        return Err(FrameError::Oversized(raw.len()));
    }
    if raw.len() < MIN_FRAME_LEN {
        return Err(FrameError::TooShort(raw.len()));
    }
    if raw[0] != PREAMBLE || raw[1] != PREAMBLE {
        return Err(FrameError::BadPreamble(raw[0], raw[1]));
    }
    let last = raw.len() - 1;
    if raw[last] != TERMINATOR {
        return Err(FrameError::Unterminated);
    }

    Ok(CivFrame {
        dst_addr: raw[2],
        src_addr: raw[3],
        cmd: raw[4],
        payload: raw[5..last].to_vec(),
    })
}

/// Encode a frame into raw bytes ready for transmission.
///
/// ```
/// use civcat_engine::civ::{encode_frame, DEVICE_ADDR};
///
/// let bytes = encode_frame(0xE0, DEVICE_ADDR, 0x19, &[0x00, 0xA4]);
/// assert_eq!(bytes, vec![0xFE, 0xFE, 0xE0, 0xA4, 0x19, 0x00, 0xA4, 0xFD]);
/// ```
pub fn encode_frame(dst_addr: u8, src_addr: u8, cmd: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(MIN_FRAME_LEN + payload.len());
    buf.put_u8(PREAMBLE);
    buf.put_u8(PREAMBLE);
    buf.put_u8(dst_addr);
    buf.put_u8(src_addr);
    buf.put_u8(cmd);
    buf.put_slice(payload);
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// Encode a [`CivFrame`] into raw bytes.
pub fn encode_civ_frame(frame: &CivFrame) -> Vec<u8> {
    encode_frame(frame.dst_addr, frame.src_addr, frame.cmd, &frame.payload)
}

/// Hex dump in the `FE:FE:A4:E0:03:FD` style used in trace logs.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{b:02X}");
    }
    out
}
