//! The CI-V command subset this transceiver answers.
//!
//! [`Command::decode`] turns a parsed frame into a typed request, or a
//! [`Rejection`] explaining why it cannot be served. Every command and
//! sub-command is matched exhaustively; anything not listed here is
//! rejected and answered with NAK by the dispatcher.

use civcat_core::{DspFunction, Level, RadioMode, Vfo};

use crate::bcd;
use crate::civ::CivFrame;
use crate::modes;

// ---------------------------------------------------------------
// CI-V command/sub-command constants
// ---------------------------------------------------------------

/// Transceive frequency broadcast (cmd 0x00). Never answered.
pub const CMD_SND_FREQ: u8 = 0x00;

/// Transceive mode broadcast (cmd 0x01). Never answered.
pub const CMD_SND_MODE: u8 = 0x01;

/// Read operating frequency (cmd 0x03). No sub-command, no data.
pub const CMD_RD_FREQ: u8 = 0x03;

/// Read operating mode (cmd 0x04). No sub-command, no data.
pub const CMD_RD_MODE: u8 = 0x04;

/// Write operating frequency (cmd 0x05). Data: 5-byte BCD frequency.
pub const CMD_SET_FREQ: u8 = 0x05;

/// Set operating mode (cmd 0x06). Data: mode byte, optional filter byte.
pub const CMD_SET_MODE: u8 = 0x06;

/// VFO selection and exchange (cmd 0x07).
pub const CMD_SET_VFO: u8 = 0x07;

/// Split operation (cmd 0x0F). No sub-command.
pub const CMD_CTL_SPLT: u8 = 0x0F;

/// Attenuator (cmd 0x11). No sub-command.
pub const CMD_CTL_ATT: u8 = 0x11;

/// Level settings (cmd 0x14). Data: 2-byte BCD scaled level.
pub const CMD_CTL_LVL: u8 = 0x14;

/// Function switches (cmd 0x16).
pub const CMD_CTL_FUNC: u8 = 0x16;

/// Read transceiver ID (cmd 0x19).
pub const CMD_RD_TRXID: u8 = 0x19;

/// Memory and filter settings (cmd 0x1A).
pub const CMD_CTL_MEM: u8 = 0x1A;

/// PTT and antenna tuner (cmd 0x1C).
pub const CMD_CTL_PTT: u8 = 0x1C;

/// Selected/unselected VFO frequency (cmd 0x25).
pub const CMD_SEND_SEL_FREQ: u8 = 0x25;

/// Selected/unselected VFO mode (cmd 0x26).
pub const CMD_SEND_SEL_MODE: u8 = 0x26;

// Sub-commands for CMD_SET_VFO (0x07)
pub const SUB_VFO_EXCHANGE: u8 = 0xB0;

// Sub-commands for CMD_CTL_LVL (0x14)
pub const SUB_LVL_AF: u8 = 0x01;
pub const SUB_LVL_RF: u8 = 0x02;
pub const SUB_LVL_SQL: u8 = 0x03;
pub const SUB_LVL_NR: u8 = 0x06;
pub const SUB_LVL_TX_POWER: u8 = 0x0A;
pub const SUB_LVL_DNF: u8 = 0x0D;
pub const SUB_LVL_NB: u8 = 0x12;

// Sub-commands for CMD_CTL_FUNC (0x16)
pub const SUB_FUNC_PRE: u8 = 0x02;
pub const SUB_FUNC_AGC: u8 = 0x12;
pub const SUB_FUNC_NB: u8 = 0x22;
pub const SUB_FUNC_NR: u8 = 0x40;
pub const SUB_FUNC_DNF: u8 = 0x41;

// Sub-commands for CMD_RD_TRXID (0x19)
pub const SUB_TRXID: u8 = 0x00;

// Sub-commands for CMD_CTL_MEM (0x1A)
pub const SUB_MEM_IF_WIDTH: u8 = 0x03;

// Sub-commands for CMD_CTL_PTT (0x1C)
pub const SUB_PTT: u8 = 0x00;
pub const SUB_ATU: u8 = 0x01;

// Sub-command for CMD_SEND_SEL_FREQ / CMD_SEND_SEL_MODE meaning the
// selected VFO; any other value addresses the unselected one.
pub const SUB_SELECTED: u8 = 0x00;

/// ATU set value that starts a tuning cycle instead of toggling.
pub const ATU_START_TUNE: u8 = 0x02;

/// Whether a request reads the current value or writes a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op<T> {
    Query,
    Set(T),
}

/// A switchable function under cmd 0x16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Preamp,
    Agc,
    Dsp(DspFunction),
}

/// A decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ReadFrequency,
    ReadMode,
    SetFrequency(u64),
    SetMode(RadioMode),
    SelectVfo(Vfo),
    ExchangeVfo,
    /// Split; any set value toggles.
    Split(Op<()>),
    /// Attenuator; any set value toggles.
    Attenuator(Op<()>),
    /// Scaled level, 0..=255 on the wire (set values up to 9999 decode).
    Level(Level, Op<u32>),
    /// Function switch; any set value toggles or cycles.
    Function(Function, Op<()>),
    ReadTransceiverId,
    ReadIfWidth,
    Ptt(Op<u8>),
    Atu(Op<u8>),
    VfoFrequency { sub: u8, op: Op<u64> },
    VfoMode { sub: u8, op: Op<RadioMode> },
}

/// Why a frame was not accepted as a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("unsupported command {0:02X}")]
    UnknownCommand(u8),

    #[error("unsupported sub-command {0:02X}:{1:02X}")]
    UnknownSubCommand(u8, u8),

    #[error("command {0:02X} requires a sub-command")]
    MissingSubCommand(u8),

    #[error("malformed payload for command {0:02X}")]
    BadPayload(u8),

    #[error("unknown mode code {0:02X}")]
    UnknownMode(u8),
}

/// Level addressed by a cmd 0x14 sub-command.
pub fn level_for_sub(sub: u8) -> Option<Level> {
    match sub {
        SUB_LVL_AF => Some(Level::AfVolume),
        SUB_LVL_RF => Some(Level::RfGain),
        SUB_LVL_SQL => Some(Level::Squelch),
        SUB_LVL_NR => Some(Level::NrLevel),
        SUB_LVL_TX_POWER => Some(Level::TxPower),
        SUB_LVL_DNF => Some(Level::DnfCenter),
        SUB_LVL_NB => Some(Level::NbLevel),
        _ => None,
    }
}

/// cmd 0x14 sub-command for a level.
pub fn level_sub(level: Level) -> u8 {
    match level {
        Level::AfVolume => SUB_LVL_AF,
        Level::RfGain => SUB_LVL_RF,
        Level::Squelch => SUB_LVL_SQL,
        Level::NrLevel => SUB_LVL_NR,
        Level::TxPower => SUB_LVL_TX_POWER,
        Level::DnfCenter => SUB_LVL_DNF,
        Level::NbLevel => SUB_LVL_NB,
    }
}

/// Function addressed by a cmd 0x16 sub-command.
pub fn function_for_sub(sub: u8) -> Option<Function> {
    match sub {
        SUB_FUNC_PRE => Some(Function::Preamp),
        SUB_FUNC_AGC => Some(Function::Agc),
        SUB_FUNC_NB => Some(Function::Dsp(DspFunction::Nb)),
        SUB_FUNC_NR => Some(Function::Dsp(DspFunction::Nr)),
        SUB_FUNC_DNF => Some(Function::Dsp(DspFunction::Dnf)),
        _ => None,
    }
}

/// cmd 0x16 sub-command for a function.
pub fn function_sub(function: Function) -> u8 {
    match function {
        Function::Preamp => SUB_FUNC_PRE,
        Function::Agc => SUB_FUNC_AGC,
        Function::Dsp(DspFunction::Nb) => SUB_FUNC_NB,
        Function::Dsp(DspFunction::Nr) => SUB_FUNC_NR,
        Function::Dsp(DspFunction::Dnf) => SUB_FUNC_DNF,
    }
}

fn toggle(data: &[u8]) -> Op<()> {
    if data.is_empty() {
        Op::Query
    } else {
        Op::Set(())
    }
}

fn first_byte(data: &[u8]) -> Op<u8> {
    match data.first() {
        None => Op::Query,
        Some(&b) => Op::Set(b),
    }
}

impl Command {
    /// Decode a frame into a command.
    pub fn decode(frame: &CivFrame) -> Result<Command, Rejection> {
        let cmd = frame.cmd;
        let payload = frame.payload.as_slice();

        match cmd {
            CMD_RD_FREQ => Ok(Command::ReadFrequency),
            CMD_RD_MODE => Ok(Command::ReadMode),
            CMD_SET_FREQ => {
                if payload.len() < bcd::byte_len(bcd::FREQ_DIGITS) {
                    return Err(Rejection::BadPayload(cmd));
                }
                Ok(Command::SetFrequency(bcd::bcd_to_freq(payload)))
            }
            CMD_SET_MODE => {
                let code = *payload.first().ok_or(Rejection::BadPayload(cmd))?;
                let mode = modes::civ_to_mode(code, false).ok_or(Rejection::UnknownMode(code))?;
                Ok(Command::SetMode(mode))
            }
            CMD_CTL_SPLT => Ok(Command::Split(toggle(payload))),
            CMD_CTL_ATT => Ok(Command::Attenuator(toggle(payload))),
            _ => Self::decode_with_sub(frame),
        }
    }

    fn decode_with_sub(frame: &CivFrame) -> Result<Command, Rejection> {
        let cmd = frame.cmd;
        let sub = match cmd {
            CMD_SET_VFO | CMD_CTL_LVL | CMD_CTL_FUNC | CMD_RD_TRXID | CMD_CTL_MEM
            | CMD_CTL_PTT | CMD_SEND_SEL_FREQ | CMD_SEND_SEL_MODE => {
                frame.sub_cmd().ok_or(Rejection::MissingSubCommand(cmd))?
            }
            _ => return Err(Rejection::UnknownCommand(cmd)),
        };
        let data = frame.sub_data();
        let unknown_sub = Rejection::UnknownSubCommand(cmd, sub);

        match cmd {
            CMD_SET_VFO => match sub {
                SUB_VFO_EXCHANGE => Ok(Command::ExchangeVfo),
                _ => modes::civ_to_vfo(sub)
                    .map(Command::SelectVfo)
                    .ok_or(unknown_sub),
            },
            CMD_CTL_LVL => {
                let level = level_for_sub(sub).ok_or(unknown_sub)?;
                match data.len() {
                    0 => Ok(Command::Level(level, Op::Query)),
                    1 => Err(Rejection::BadPayload(cmd)),
                    _ => Ok(Command::Level(level, Op::Set(bcd::bcd_to_level(data)))),
                }
            }
            CMD_CTL_FUNC => {
                let function = function_for_sub(sub).ok_or(unknown_sub)?;
                Ok(Command::Function(function, toggle(data)))
            }
            CMD_RD_TRXID => match sub {
                SUB_TRXID => Ok(Command::ReadTransceiverId),
                _ => Err(unknown_sub),
            },
            CMD_CTL_MEM => match sub {
                SUB_MEM_IF_WIDTH if data.is_empty() => Ok(Command::ReadIfWidth),
                SUB_MEM_IF_WIDTH => Err(Rejection::BadPayload(cmd)),
                _ => Err(unknown_sub),
            },
            CMD_CTL_PTT => match sub {
                SUB_PTT => Ok(Command::Ptt(first_byte(data))),
                SUB_ATU => Ok(Command::Atu(first_byte(data))),
                _ => Err(unknown_sub),
            },
            CMD_SEND_SEL_FREQ => {
                if data.is_empty() {
                    Ok(Command::VfoFrequency { sub, op: Op::Query })
                } else if data.len() < bcd::byte_len(bcd::FREQ_DIGITS) {
                    Err(Rejection::BadPayload(cmd))
                } else {
                    Ok(Command::VfoFrequency {
                        sub,
                        op: Op::Set(bcd::bcd_to_freq(data)),
                    })
                }
            }
            CMD_SEND_SEL_MODE => match data {
                [] => Ok(Command::VfoMode { sub, op: Op::Query }),
                [code, rest @ ..] => {
                    let data_mode = rest.first().is_some_and(|&flag| flag != 0);
                    let mode = modes::civ_to_mode(*code, data_mode)
                        .ok_or(Rejection::UnknownMode(*code))?;
                    Ok(Command::VfoMode {
                        sub,
                        op: Op::Set(mode),
                    })
                }
            },
            _ => Err(Rejection::UnknownCommand(cmd)),
        }
    }
}
