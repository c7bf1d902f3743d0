//! Collaborator traits the protocol engine is written against.
//!
//! The engine reads live state through [`ParamStore`] and applies low-level
//! controls through [`RadioControl`]. Both are called from the protocol task,
//! so implementations must be safe to use from any thread. State transitions
//! that are *not* thread-safe (retuning, mode change, VFO selection) never go
//! through these traits; they are scheduled onto the UI thread instead.

use crate::types::{AgcMode, DspFunction, Level, RadioMode, Vfo};

/// Read access to the persistent parameter store, plus the two writes the
/// CAT protocol is allowed to make directly (the per-VFO frequency and mode
/// slots).
pub trait ParamStore: Send + Sync {
    /// Active VFO of the current band.
    fn vfo(&self) -> Vfo;

    /// Frequency of the active VFO, in hertz.
    fn frequency(&self) -> u64 {
        self.vfo_frequency(self.vfo())
    }

    /// Mode of the active VFO.
    fn mode(&self) -> RadioMode {
        self.vfo_mode(self.vfo())
    }

    /// Frequency stored for `vfo`, in hertz.
    fn vfo_frequency(&self, vfo: Vfo) -> u64;

    /// Overwrite the frequency stored for `vfo`.
    fn set_vfo_frequency(&self, vfo: Vfo, freq_hz: u64);

    /// Mode stored for `vfo`.
    fn vfo_mode(&self, vfo: Vfo) -> RadioMode;

    /// Overwrite the mode stored for `vfo`.
    fn set_vfo_mode(&self, vfo: Vfo, mode: RadioMode);

    /// Current native value of `level`.
    fn level(&self, level: Level) -> i32;

    /// Filter bandwidth of the current mode, in hertz.
    fn filter_bandwidth(&self) -> u32;

    /// AGC setting of the current band.
    fn agc(&self) -> AgcMode;

    /// Whether the attenuator of the current band is engaged.
    fn attenuator(&self) -> bool;

    /// Whether the preamplifier of the current band is engaged.
    fn preamp(&self) -> bool;

    /// Whether split operation is enabled on the current band.
    fn split(&self) -> bool;

    /// Whether the antenna tuner is enabled.
    fn atu(&self) -> bool;
}

/// Thread-safe radio controls.
///
/// The level calls are delta-applying: they add `delta` native steps to the
/// current value (clamping to the valid range) and return the resulting
/// native value. A delta of zero reads the value without changing it.
pub trait RadioControl: Send + Sync {
    /// Adjust `level` by `delta` control steps and return the new native value.
    ///
    /// A control step is one native unit except for NR/NB level (5 units),
    /// TX power (one tenth of a watt) and DNF center (50 Hz).
    fn change_level(&self, level: Level, delta: i32) -> i32;

    /// Whether the transmitter is currently keyed.
    fn transmitting(&self) -> bool;

    /// Key or unkey the transmitter.
    fn set_ptt(&self, on: bool);

    /// Switch the antenna tuner on or off.
    fn toggle_atu(&self);

    /// Start an antenna tuning cycle.
    fn start_atu_tune(&self);

    /// Switch the attenuator of the current band.
    fn toggle_attenuator(&self);

    /// Switch the preamplifier of the current band.
    fn toggle_preamp(&self);

    /// Advance the AGC setting of the current band by one step.
    fn cycle_agc(&self);

    /// Whether `function` is currently on.
    fn dsp_enabled(&self, function: DspFunction) -> bool;

    /// Switch `function` and return its new state.
    fn toggle_dsp(&self, function: DspFunction) -> bool;

    /// Switch split operation of the current band.
    fn toggle_split(&self);

    /// Make the inactive VFO the active one.
    fn swap_vfo(&self);
}

/// The state transitions that belong to the UI thread.
///
/// Retuning, mode changes and VFO selection update band memory, the
/// waterfall and the main screen, none of which may be touched from the
/// protocol task. The engine hands these over as queued mutations and the UI
/// thread applies them through this trait, one at a time.
pub trait StateTransitions {
    /// Retune the active VFO, switching band first if `freq_hz` lies in
    /// another band.
    fn set_frequency(&mut self, freq_hz: u64);

    /// Change the mode of the active VFO.
    fn set_mode(&mut self, mode: RadioMode);

    /// Make `vfo` the active VFO.
    fn set_vfo(&mut self, vfo: Vfo);
}
