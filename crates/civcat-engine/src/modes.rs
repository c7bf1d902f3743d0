//! Translation between CI-V codes and the radio's own enumerations.

use civcat_core::{AgcMode, RadioMode, Vfo};

/// CI-V mode codes.
pub const MODE_LSB: u8 = 0x00;
pub const MODE_USB: u8 = 0x01;
pub const MODE_AM: u8 = 0x02;
pub const MODE_CW: u8 = 0x03;
pub const MODE_NFM: u8 = 0x05;
pub const MODE_CWR: u8 = 0x07;

/// CI-V VFO selectors (cmd 0x07).
pub const VFO_A: u8 = 0x00;
pub const VFO_B: u8 = 0x01;

/// CI-V AGC codes (cmd 0x16 sub 0x12).
pub const AGC_OFF: u8 = 0x00;
pub const AGC_FAST: u8 = 0x01;
pub const AGC_SLOW: u8 = 0x02;
pub const AGC_AUTO: u8 = 0x03;

/// IF width code reported for modes without a width table.
pub const IF_WIDTH_UNKNOWN: u8 = 31;

/// CI-V code for a radio mode. Data variants collapse to their base mode;
/// modes CI-V cannot express report as LSB.
pub fn mode_to_civ(mode: RadioMode) -> u8 {
    match mode {
        RadioMode::Lsb | RadioMode::LsbDig => MODE_LSB,
        RadioMode::Usb | RadioMode::UsbDig => MODE_USB,
        RadioMode::Am => MODE_AM,
        RadioMode::Cw => MODE_CW,
        RadioMode::Nfm => MODE_NFM,
        RadioMode::Cwr => MODE_CWR,
        RadioMode::Wfm => MODE_LSB,
    }
}

/// Radio mode for a CI-V code. The data flag only affects LSB and USB.
///
/// Returns `None` for codes this radio has no mode for.
pub fn civ_to_mode(code: u8, data: bool) -> Option<RadioMode> {
    match code {
        MODE_LSB if data => Some(RadioMode::LsbDig),
        MODE_LSB => Some(RadioMode::Lsb),
        MODE_USB if data => Some(RadioMode::UsbDig),
        MODE_USB => Some(RadioMode::Usb),
        MODE_AM => Some(RadioMode::Am),
        MODE_CW => Some(RadioMode::Cw),
        MODE_NFM => Some(RadioMode::Nfm),
        MODE_CWR => Some(RadioMode::Cwr),
        _ => None,
    }
}

/// VFO named by a CI-V selector byte.
pub fn civ_to_vfo(code: u8) -> Option<Vfo> {
    match code {
        VFO_A => Some(Vfo::A),
        VFO_B => Some(Vfo::B),
        _ => None,
    }
}

/// CI-V code for an AGC setting.
pub fn agc_to_civ(agc: AgcMode) -> u8 {
    match agc {
        AgcMode::Off => AGC_OFF,
        AgcMode::Fast => AGC_FAST,
        AgcMode::Slow => AGC_SLOW,
        AgcMode::Auto => AGC_AUTO,
    }
}

/// CI-V IF filter width code for a filter bandwidth in hertz.
///
/// SSB and CW: 50 Hz steps up to 500 Hz, then 100 Hz steps. AM and NFM:
/// 200 Hz steps from 100 Hz.
pub fn if_width_code(mode: RadioMode, bandwidth_hz: u32) -> u8 {
    let code = if mode.is_narrowband() {
        if bandwidth_hz <= 500 {
            bandwidth_hz.saturating_sub(25) / 50
        } else {
            bandwidth_hz.saturating_sub(50) / 100 + 5
        }
    } else if matches!(mode, RadioMode::Am | RadioMode::Nfm) {
        bandwidth_hz.saturating_sub(100) / 200
    } else {
        u32::from(IF_WIDTH_UNKNOWN)
    };
    u8::try_from(code).unwrap_or(u8::MAX)
}
