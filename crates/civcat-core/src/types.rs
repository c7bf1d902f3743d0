//! Radio domain types shared by the engine and its collaborators.
//!
//! These mirror the transceiver's internal enumerations, not the CI-V wire
//! codes. Translation to and from wire codes lives in the engine.

use std::fmt;
use std::str::FromStr;

/// One of the two independently tunable frequency/mode slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Vfo {
    #[default]
    A,
    B,
}

impl Vfo {
    /// The VFO that is not `self`.
    pub fn other(self) -> Vfo {
        match self {
            Vfo::A => Vfo::B,
            Vfo::B => Vfo::A,
        }
    }
}

impl fmt::Display for Vfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vfo::A => write!(f, "VFO-A"),
            Vfo::B => write!(f, "VFO-B"),
        }
    }
}

/// Operating mode as the radio enumerates it.
///
/// The digital variants are the sideband modes with the data input selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioMode {
    Lsb,
    LsbDig,
    Usb,
    UsbDig,
    Cw,
    Cwr,
    Am,
    Nfm,
    /// Wide FM broadcast receive. Has no CI-V mode code.
    Wfm,
}

impl RadioMode {
    /// Returns `true` for the sideband and CW family, whose filters are
    /// narrow enough to be reported in 50/100 Hz steps.
    pub fn is_narrowband(&self) -> bool {
        matches!(
            self,
            RadioMode::Lsb
                | RadioMode::LsbDig
                | RadioMode::Usb
                | RadioMode::UsbDig
                | RadioMode::Cw
                | RadioMode::Cwr
        )
    }
}

impl fmt::Display for RadioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RadioMode::Lsb => "LSB",
            RadioMode::LsbDig => "LSB-D",
            RadioMode::Usb => "USB",
            RadioMode::UsbDig => "USB-D",
            RadioMode::Cw => "CW",
            RadioMode::Cwr => "CWR",
            RadioMode::Am => "AM",
            RadioMode::Nfm => "NFM",
            RadioMode::Wfm => "WFM",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed into a [`RadioMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mode: {}", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for RadioMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LSB" => Ok(RadioMode::Lsb),
            "LSB-D" | "LSBD" => Ok(RadioMode::LsbDig),
            "USB" => Ok(RadioMode::Usb),
            "USB-D" | "USBD" => Ok(RadioMode::UsbDig),
            "CW" => Ok(RadioMode::Cw),
            "CWR" => Ok(RadioMode::Cwr),
            "AM" => Ok(RadioMode::Am),
            "NFM" | "FM" => Ok(RadioMode::Nfm),
            "WFM" => Ok(RadioMode::Wfm),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Automatic gain control setting of the current band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AgcMode {
    Off,
    Fast,
    Slow,
    #[default]
    Auto,
}

impl AgcMode {
    /// The setting selected by one press of the AGC control.
    pub fn next(self) -> AgcMode {
        match self {
            AgcMode::Off => AgcMode::Fast,
            AgcMode::Fast => AgcMode::Slow,
            AgcMode::Slow => AgcMode::Auto,
            AgcMode::Auto => AgcMode::Off,
        }
    }
}

/// A delta-adjustable level owned by the radio.
///
/// Native units are per level: AF volume 0-55, RF gain, squelch and NB level
/// 0-100, NR level 0-60, TX power in tenths of a watt 0-100, DNF center in
/// hertz 100-3000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    AfVolume,
    RfGain,
    Squelch,
    NrLevel,
    NbLevel,
    TxPower,
    DnfCenter,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::AfVolume => "AF volume",
            Level::RfGain => "RF gain",
            Level::Squelch => "squelch",
            Level::NrLevel => "NR level",
            Level::NbLevel => "NB level",
            Level::TxPower => "TX power",
            Level::DnfCenter => "DNF center",
        };
        write!(f, "{s}")
    }
}

/// DSP functions that are switched on and off as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DspFunction {
    /// Noise reduction.
    Nr,
    /// Noise blanker.
    Nb,
    /// Digital notch filter.
    Dnf,
}

impl fmt::Display for DspFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DspFunction::Nr => "NR",
            DspFunction::Nb => "NB",
            DspFunction::Dnf => "DNF",
        };
        write!(f, "{s}")
    }
}
