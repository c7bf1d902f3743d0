//! In-memory transceiver for testing the protocol engine.
//!
//! [`MockRadio`] implements every collaborator trait from `civcat-core`
//! ([`ParamStore`], [`RadioControl`], [`StateTransitions`]) over a single
//! shared state, and records each state-changing call so tests can assert on
//! exactly what the engine asked the radio to do. Clones share state.

use std::sync::{Arc, Mutex, MutexGuard};

use civcat_core::radio::{ParamStore, RadioControl, StateTransitions};
use civcat_core::types::{AgcMode, DspFunction, Level, RadioMode, Vfo};

/// Amateur band plan used to pick the band on retune: (name, low, high).
const BANDS: &[(&str, u64, u64)] = &[
    ("160m", 1_800_000, 2_000_000),
    ("80m", 3_500_000, 4_000_000),
    ("60m", 5_330_000, 5_410_000),
    ("40m", 7_000_000, 7_300_000),
    ("30m", 10_100_000, 10_150_000),
    ("20m", 14_000_000, 14_350_000),
    ("17m", 18_068_000, 18_168_000),
    ("15m", 21_000_000, 21_450_000),
    ("12m", 24_890_000, 24_990_000),
    ("10m", 28_000_000, 29_700_000),
    ("6m", 50_000_000, 54_000_000),
];

/// A state-changing call made on the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ChangeLevel(Level, i32),
    SetPtt(bool),
    ToggleAtu,
    StartAtuTune,
    ToggleAttenuator,
    TogglePreamp,
    CycleAgc,
    ToggleDsp(DspFunction),
    ToggleSplit,
    SwapVfo,
    SetVfoFrequency(Vfo, u64),
    SetVfoMode(Vfo, RadioMode),
    SetFrequency(u64),
    SetMode(RadioMode),
    SetVfo(Vfo),
}

#[derive(Debug)]
struct State {
    vfo: Vfo,
    freq: [u64; 2],
    mode: [RadioMode; 2],
    band: Option<&'static str>,
    af_volume: i32,
    rf_gain: i32,
    squelch: i32,
    nr_level: i32,
    nb_level: i32,
    tx_power: i32,
    dnf_center: i32,
    filter_bw: u32,
    agc: AgcMode,
    attenuator: bool,
    preamp: bool,
    split: bool,
    atu: bool,
    ptt: bool,
    nr: bool,
    nb: bool,
    dnf: bool,
    calls: Vec<Call>,
}

impl State {
    fn level_mut(&mut self, level: Level) -> &mut i32 {
        match level {
            Level::AfVolume => &mut self.af_volume,
            Level::RfGain => &mut self.rf_gain,
            Level::Squelch => &mut self.squelch,
            Level::NrLevel => &mut self.nr_level,
            Level::NbLevel => &mut self.nb_level,
            Level::TxPower => &mut self.tx_power,
            Level::DnfCenter => &mut self.dnf_center,
        }
    }

    fn dsp_mut(&mut self, function: DspFunction) -> &mut bool {
        match function {
            DspFunction::Nr => &mut self.nr,
            DspFunction::Nb => &mut self.nb,
            DspFunction::Dnf => &mut self.dnf,
        }
    }
}

/// Native range and control step of each level: (min, max, step).
fn level_limits(level: Level) -> (i32, i32, i32) {
    match level {
        Level::AfVolume => (0, 55, 1),
        Level::RfGain => (0, 100, 1),
        Level::Squelch => (0, 100, 1),
        Level::NrLevel => (0, 60, 5),
        Level::NbLevel => (0, 100, 5),
        Level::TxPower => (0, 100, 1),
        Level::DnfCenter => (100, 3000, 50),
    }
}

fn slot(vfo: Vfo) -> usize {
    match vfo {
        Vfo::A => 0,
        Vfo::B => 1,
    }
}

fn find_band(freq_hz: u64) -> Option<&'static str> {
    BANDS
        .iter()
        .find(|(_, lo, hi)| (*lo..=*hi).contains(&freq_hz))
        .map(|(name, _, _)| *name)
}

/// A simulated transceiver.
#[derive(Debug, Clone)]
pub struct MockRadio {
    state: Arc<Mutex<State>>,
}

impl MockRadio {
    /// A receiver on 20 m: VFO A 14.074 MHz USB-D, VFO B 7.074 MHz LSB.
    pub fn new() -> Self {
        MockRadio {
            state: Arc::new(Mutex::new(State {
                vfo: Vfo::A,
                freq: [14_074_000, 7_074_000],
                mode: [RadioMode::UsbDig, RadioMode::Lsb],
                band: find_band(14_074_000),
                af_volume: 20,
                rf_gain: 100,
                squelch: 0,
                nr_level: 30,
                nb_level: 10,
                tx_power: 50,
                dnf_center: 1000,
                filter_bw: 2900,
                agc: AgcMode::Auto,
                attenuator: false,
                preamp: false,
                split: false,
                atu: false,
                ptt: false,
                nr: false,
                nb: false,
                dnf: false,
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every state-changing call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Name of the active band, if the active frequency lies in one.
    pub fn band(&self) -> Option<&'static str> {
        self.lock().band
    }

    /// Select the active VFO without recording a call.
    pub fn with_vfo(self, vfo: Vfo) -> Self {
        self.lock().vfo = vfo;
        self
    }

    /// Set a VFO's frequency without recording a call.
    pub fn with_frequency(self, vfo: Vfo, freq_hz: u64) -> Self {
        {
            let mut state = self.lock();
            state.freq[slot(vfo)] = freq_hz;
            if vfo == state.vfo {
                state.band = find_band(freq_hz);
            }
        }
        self
    }

    /// Set a VFO's mode without recording a call.
    pub fn with_mode(self, vfo: Vfo, mode: RadioMode) -> Self {
        self.lock().mode[slot(vfo)] = mode;
        self
    }

    /// Set a level's native value without recording a call.
    pub fn with_level(self, level: Level, value: i32) -> Self {
        *self.lock().level_mut(level) = value;
        self
    }

    /// Set the current filter bandwidth in hertz.
    pub fn with_filter_bandwidth(self, hz: u32) -> Self {
        self.lock().filter_bw = hz;
        self
    }

    /// Set the AGC setting.
    pub fn with_agc(self, agc: AgcMode) -> Self {
        self.lock().agc = agc;
        self
    }

    /// Key or unkey the transmitter without recording a call.
    pub fn with_ptt(self, on: bool) -> Self {
        self.lock().ptt = on;
        self
    }

    /// Switch a DSP function without recording a call.
    pub fn with_dsp(self, function: DspFunction, on: bool) -> Self {
        *self.lock().dsp_mut(function) = on;
        self
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore for MockRadio {
    fn vfo(&self) -> Vfo {
        self.lock().vfo
    }

    fn vfo_frequency(&self, vfo: Vfo) -> u64 {
        self.lock().freq[slot(vfo)]
    }

    fn set_vfo_frequency(&self, vfo: Vfo, freq_hz: u64) {
        let mut state = self.lock();
        state.freq[slot(vfo)] = freq_hz;
        state.calls.push(Call::SetVfoFrequency(vfo, freq_hz));
    }

    fn vfo_mode(&self, vfo: Vfo) -> RadioMode {
        self.lock().mode[slot(vfo)]
    }

    fn set_vfo_mode(&self, vfo: Vfo, mode: RadioMode) {
        let mut state = self.lock();
        state.mode[slot(vfo)] = mode;
        state.calls.push(Call::SetVfoMode(vfo, mode));
    }

    fn level(&self, level: Level) -> i32 {
        *self.lock().level_mut(level)
    }

    fn filter_bandwidth(&self) -> u32 {
        self.lock().filter_bw
    }

    fn agc(&self) -> AgcMode {
        self.lock().agc
    }

    fn attenuator(&self) -> bool {
        self.lock().attenuator
    }

    fn preamp(&self) -> bool {
        self.lock().preamp
    }

    fn split(&self) -> bool {
        self.lock().split
    }

    fn atu(&self) -> bool {
        self.lock().atu
    }
}

impl RadioControl for MockRadio {
    fn change_level(&self, level: Level, delta: i32) -> i32 {
        let mut state = self.lock();
        if delta != 0 {
            state.calls.push(Call::ChangeLevel(level, delta));
        }
        let (min, max, step) = level_limits(level);
        let value = state.level_mut(level);
        *value = (*value + delta * step).clamp(min, max);
        *value
    }

    fn transmitting(&self) -> bool {
        self.lock().ptt
    }

    fn set_ptt(&self, on: bool) {
        let mut state = self.lock();
        state.ptt = on;
        state.calls.push(Call::SetPtt(on));
    }

    fn toggle_atu(&self) {
        let mut state = self.lock();
        state.atu = !state.atu;
        state.calls.push(Call::ToggleAtu);
    }

    fn start_atu_tune(&self) {
        self.lock().calls.push(Call::StartAtuTune);
    }

    fn toggle_attenuator(&self) {
        let mut state = self.lock();
        state.attenuator = !state.attenuator;
        state.calls.push(Call::ToggleAttenuator);
    }

    fn toggle_preamp(&self) {
        let mut state = self.lock();
        state.preamp = !state.preamp;
        state.calls.push(Call::TogglePreamp);
    }

    fn cycle_agc(&self) {
        let mut state = self.lock();
        state.agc = state.agc.next();
        state.calls.push(Call::CycleAgc);
    }

    fn dsp_enabled(&self, function: DspFunction) -> bool {
        *self.lock().dsp_mut(function)
    }

    fn toggle_dsp(&self, function: DspFunction) -> bool {
        let mut state = self.lock();
        state.calls.push(Call::ToggleDsp(function));
        let on = state.dsp_mut(function);
        *on = !*on;
        *on
    }

    fn toggle_split(&self) {
        let mut state = self.lock();
        state.split = !state.split;
        state.calls.push(Call::ToggleSplit);
    }

    fn swap_vfo(&self) {
        let mut state = self.lock();
        state.vfo = state.vfo.other();
        state.band = find_band(state.freq[slot(state.vfo)]);
        state.calls.push(Call::SwapVfo);
    }
}

impl StateTransitions for MockRadio {
    fn set_frequency(&mut self, freq_hz: u64) {
        let mut state = self.lock();
        let active = slot(state.vfo);
        state.freq[active] = freq_hz;
        if let Some(band) = find_band(freq_hz) {
            state.band = Some(band);
        }
        state.calls.push(Call::SetFrequency(freq_hz));
    }

    fn set_mode(&mut self, mode: RadioMode) {
        let mut state = self.lock();
        let active = slot(state.vfo);
        state.mode[active] = mode;
        state.calls.push(Call::SetMode(mode));
    }

    fn set_vfo(&mut self, vfo: Vfo) {
        let mut state = self.lock();
        state.vfo = vfo;
        state.band = find_band(state.freq[slot(vfo)]);
        state.calls.push(Call::SetVfo(vfo));
    }
}
