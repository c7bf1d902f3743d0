//! Unsolicited transceive announcements.
//!
//! When the operator changes something at the radio, the application can
//! tell connected controllers without waiting to be polled. Announcements
//! are queued through an [`Announcer`] and written by the protocol task
//! between frames, since only that task may touch the serial link.

use tokio::sync::mpsc;
use tracing::warn;

use civcat_core::error::{Error, Result};
use civcat_core::RadioMode;

use crate::bcd;
use crate::civ::{encode_frame, BROADCAST_ADDR};
use crate::commands::{CMD_SEND_SEL_MODE, CMD_SND_FREQ, CMD_SND_MODE};
use crate::modes::mode_to_civ;

/// Filter byte sent with mode announcements.
const DEFAULT_FILTER: u8 = 0x01;

/// An unsolicited frame addressed to every listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    /// A single-byte value under `cmd`/`sub`.
    Value { cmd: u8, sub: u8, value: u8 },
    /// A scaled level under `cmd`/`sub`, sent as 4-digit BCD.
    Level { cmd: u8, sub: u8, level: u16 },
    /// The operating frequency.
    Frequency(u64),
    /// The mode of the selected or unselected VFO.
    Mode { selected: bool, mode: RadioMode },
}

impl Announcement {
    /// Encode as a frame from `src_addr` to the broadcast address.
    pub fn encode(&self, src_addr: u8) -> Vec<u8> {
        match *self {
            Announcement::Value { cmd, sub, value } => {
                encode_frame(BROADCAST_ADDR, src_addr, cmd, &[sub, value])
            }
            Announcement::Level { cmd, sub, level } => {
                let bcd = bcd::level_to_bcd(level);
                encode_frame(BROADCAST_ADDR, src_addr, cmd, &[sub, bcd[0], bcd[1]])
            }
            Announcement::Frequency(freq_hz) => {
                encode_frame(BROADCAST_ADDR, src_addr, CMD_SND_FREQ, &bcd::freq_to_bcd(freq_hz))
            }
            Announcement::Mode { selected: true, mode } => encode_frame(
                BROADCAST_ADDR,
                src_addr,
                CMD_SND_MODE,
                &[mode_to_civ(mode), DEFAULT_FILTER],
            ),
            Announcement::Mode { selected: false, mode } => encode_frame(
                BROADCAST_ADDR,
                src_addr,
                CMD_SEND_SEL_MODE,
                &[0x01, mode_to_civ(mode), 0x00, DEFAULT_FILTER],
            ),
        }
    }
}

/// Cloneable handle for queueing announcements to the protocol task.
#[derive(Debug, Clone)]
pub struct Announcer {
    tx: mpsc::Sender<Announcement>,
}

impl Announcer {
    pub(crate) fn new(tx: mpsc::Sender<Announcement>) -> Self {
        Announcer { tx }
    }

    /// Queue an announcement without waiting.
    ///
    /// Fails with [`Error::NotConnected`] after the protocol task stopped.
    /// A full queue drops the announcement.
    pub fn announce(&self, announcement: Announcement) -> Result<()> {
        match self.tx.try_send(announcement) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(?dropped, "announcement queue full, dropping");
                Err(Error::Transport("announcement queue full".into()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(Error::NotConnected),
        }
    }
}
