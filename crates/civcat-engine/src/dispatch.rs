//! Frame dispatcher and command handlers.
//!
//! [`Dispatcher::handle`] takes one raw frame from the reader and produces
//! the bytes to write back: the request echoed verbatim, then exactly one
//! response addressed to the requester. Malformed frames produce nothing.
//!
//! Reads go straight to the [`ParamStore`]. Level and switch changes are
//! applied synchronously through [`RadioControl`]. Frequency, mode and VFO
//! changes are handed to the UI thread as [`Mutation`]s and acknowledged as
//! soon as they are accepted.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use civcat_core::{
    DspFunction, Level, ParamStore, RadioControl, RadioEvent, RadioMode, Vfo,
};

use crate::bcd;
use crate::civ::{self, ACK, NAK};
use crate::commands::{
    self, Command, Function, Op, ATU_START_TUNE, CMD_CTL_ATT, CMD_CTL_FUNC, CMD_CTL_LVL,
    CMD_CTL_MEM, CMD_CTL_PTT, CMD_CTL_SPLT, CMD_RD_FREQ, CMD_RD_MODE, CMD_RD_TRXID,
    CMD_SEND_SEL_FREQ, CMD_SEND_SEL_MODE, SUB_ATU, SUB_MEM_IF_WIDTH, SUB_PTT, SUB_SELECTED,
    SUB_TRXID,
};
use crate::modes;
use crate::mutation::{Mutation, Scheduler};
use crate::scale;

/// Bytes to write back for one request, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The request, unmodified.
    pub echo: Vec<u8>,
    /// The response frame.
    pub response: Vec<u8>,
}

/// Response body before it is wrapped in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Response {
    Data { cmd: u8, payload: Vec<u8> },
    Ack,
    Nak,
}

impl Response {
    fn data(cmd: u8, payload: &[u8]) -> Self {
        Response::Data {
            cmd,
            payload: payload.to_vec(),
        }
    }

    fn encode(&self, dst_addr: u8, src_addr: u8) -> Vec<u8> {
        match self {
            Response::Data { cmd, payload } => civ::encode_frame(dst_addr, src_addr, *cmd, payload),
            Response::Ack => civ::encode_frame(dst_addr, src_addr, ACK, &[]),
            Response::Nak => civ::encode_frame(dst_addr, src_addr, NAK, &[]),
        }
    }
}

/// Executes decoded requests against the radio.
pub struct Dispatcher {
    address: u8,
    store: Arc<dyn ParamStore>,
    control: Arc<dyn RadioControl>,
    scheduler: Scheduler,
    events: broadcast::Sender<RadioEvent>,
}

impl Dispatcher {
    pub fn new(
        address: u8,
        store: Arc<dyn ParamStore>,
        control: Arc<dyn RadioControl>,
        scheduler: Scheduler,
        events: broadcast::Sender<RadioEvent>,
    ) -> Self {
        Dispatcher {
            address,
            store,
            control,
            scheduler,
            events,
        }
    }

    /// Process one raw frame.
    ///
    /// Returns `None` when the bytes are not a well-formed frame; nothing is
    /// echoed or answered in that case.
    pub fn handle(&self, raw: &[u8]) -> Option<Reply> {
        trace!(frame = %civ::hex_dump(raw), len = raw.len(), "CAT frame received");

        let frame = match civ::parse_frame(raw) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(error = %e, len = raw.len(), "dropping malformed frame");
                return None;
            }
        };

        let response = match Command::decode(&frame) {
            Ok(command) => self.execute(command),
            Err(rejection) => {
                warn!(
                    cmd = format_args!("{:02X}", frame.cmd),
                    sub = ?frame.sub_cmd(),
                    len = raw.len(),
                    %rejection,
                    "unsupported request"
                );
                Response::Nak
            }
        };

        Some(Reply {
            echo: raw.to_vec(),
            response: response.encode(frame.src_addr, self.address),
        })
    }

    fn execute(&self, command: Command) -> Response {
        match command {
            Command::ReadFrequency => {
                Response::data(CMD_RD_FREQ, &bcd::freq_to_bcd(self.store.frequency()))
            }
            Command::ReadMode => {
                let code = modes::mode_to_civ(self.store.mode());
                Response::data(CMD_RD_MODE, &[code, code])
            }
            Command::SetFrequency(freq_hz) => {
                if freq_hz == self.store.frequency() {
                    return Response::Ack;
                }
                self.schedule(Mutation::SetFrequency(freq_hz))
            }
            Command::SetMode(mode) => {
                if mode == self.store.mode() {
                    return Response::Ack;
                }
                self.schedule(Mutation::SetMode(mode))
            }
            Command::SelectVfo(vfo) => {
                if vfo == self.store.vfo() {
                    return Response::Ack;
                }
                self.schedule(Mutation::SetVfo(vfo))
            }
            Command::ExchangeVfo => {
                self.control.swap_vfo();
                self.refresh_display();
                Response::Ack
            }
            Command::Split(Op::Query) => {
                Response::data(CMD_CTL_SPLT, &[u8::from(self.store.split())])
            }
            Command::Split(Op::Set(())) => {
                self.control.toggle_split();
                self.refresh_display();
                Response::data(CMD_CTL_SPLT, &[ACK])
            }
            Command::Attenuator(Op::Query) => {
                Response::data(CMD_CTL_ATT, &[u8::from(self.store.attenuator())])
            }
            Command::Attenuator(Op::Set(())) => {
                self.control.toggle_attenuator();
                self.emit(RadioEvent::ParamsChanged);
                Response::data(CMD_CTL_ATT, &[ACK])
            }
            Command::Level(level, op) => self.level(level, op),
            Command::Function(function, op) => self.function(function, op),
            Command::ReadTransceiverId => Response::data(CMD_RD_TRXID, &[SUB_TRXID, self.address]),
            Command::ReadIfWidth => {
                let code = modes::if_width_code(self.store.mode(), self.store.filter_bandwidth());
                Response::data(CMD_CTL_MEM, &[SUB_MEM_IF_WIDTH, code])
            }
            Command::Ptt(op) => self.ptt(op),
            Command::Atu(op) => self.atu(op),
            Command::VfoFrequency { sub, op } => self.vfo_frequency(sub, op),
            Command::VfoMode { sub, op } => self.vfo_mode(sub, op),
        }
    }

    fn level(&self, level: Level, op: Op<u32>) -> Response {
        let sub = commands::level_sub(level);
        let current = self.store.level(level);
        match op {
            Op::Query => {
                let digits = bcd::level_to_bcd(scale::to_scaled(level, current));
                Response::data(CMD_CTL_LVL, &[sub, digits[0], digits[1]])
            }
            Op::Set(scaled) => {
                let delta = scale::to_delta(level, scaled, current);
                let value = self.control.change_level(level, delta);
                debug!(%level, scaled, delta, value, "level changed");
                Response::Ack
            }
        }
    }

    fn function(&self, function: Function, op: Op<()>) -> Response {
        let sub = commands::function_sub(function);
        match op {
            Op::Query => {
                let value = match function {
                    Function::Preamp => u8::from(self.store.preamp()),
                    Function::Agc => modes::agc_to_civ(self.store.agc()),
                    Function::Dsp(dsp) => u8::from(self.control.dsp_enabled(dsp)),
                };
                Response::data(CMD_CTL_FUNC, &[sub, value])
            }
            Op::Set(()) => {
                match function {
                    Function::Preamp => {
                        self.control.toggle_preamp();
                        self.emit(RadioEvent::ParamsChanged);
                    }
                    Function::Agc => {
                        self.control.cycle_agc();
                        self.emit(RadioEvent::ParamsChanged);
                    }
                    Function::Dsp(dsp) => self.toggle_dsp(dsp),
                }
                Response::data(CMD_CTL_FUNC, &[sub, ACK])
            }
        }
    }

    fn toggle_dsp(&self, function: DspFunction) {
        let on = self.control.toggle_dsp(function);
        debug!(%function, on, "DSP function switched");
        self.emit(RadioEvent::FunctionToggled { function, on });
    }

    fn ptt(&self, op: Op<u8>) -> Response {
        match op {
            Op::Query => {
                Response::data(CMD_CTL_PTT, &[SUB_PTT, u8::from(self.control.transmitting())])
            }
            Op::Set(value) => {
                match value {
                    0 => self.control.set_ptt(false),
                    1 => self.control.set_ptt(true),
                    other => debug!(value = other, "ignoring PTT value"),
                }
                Response::data(CMD_CTL_PTT, &[SUB_PTT, ACK])
            }
        }
    }

    fn atu(&self, op: Op<u8>) -> Response {
        match op {
            Op::Query => Response::data(CMD_CTL_PTT, &[SUB_ATU, u8::from(self.store.atu())]),
            Op::Set(value) => {
                match value {
                    0 | 1 => {
                        self.control.toggle_atu();
                        self.emit(RadioEvent::ParamsChanged);
                    }
                    ATU_START_TUNE => self.control.start_atu_tune(),
                    other => debug!(value = other, "ignoring ATU value"),
                }
                Response::data(CMD_CTL_PTT, &[SUB_ATU, ACK])
            }
        }
    }

    /// The VFO a cmd 0x25/0x26 sub-command addresses, and whether it is the
    /// active one.
    fn target_vfo(&self, sub: u8) -> (Vfo, bool) {
        let active = self.store.vfo();
        if sub == SUB_SELECTED {
            (active, true)
        } else {
            (active.other(), false)
        }
    }

    fn vfo_frequency(&self, sub: u8, op: Op<u64>) -> Response {
        let (vfo, is_active) = self.target_vfo(sub);
        match op {
            Op::Query => {
                let digits = bcd::freq_to_bcd(self.store.vfo_frequency(vfo));
                let mut payload = Vec::with_capacity(1 + digits.len());
                payload.push(sub);
                payload.extend_from_slice(&digits);
                Response::Data {
                    cmd: CMD_SEND_SEL_FREQ,
                    payload,
                }
            }
            Op::Set(freq_hz) => {
                if self.store.vfo_frequency(vfo) == freq_hz {
                    return Response::Ack;
                }
                if is_active {
                    let response = self.schedule(Mutation::SetFrequency(freq_hz));
                    if matches!(response, Response::Nak) {
                        return response;
                    }
                }
                self.store.set_vfo_frequency(vfo, freq_hz);
                Response::Ack
            }
        }
    }

    fn vfo_mode(&self, sub: u8, op: Op<RadioMode>) -> Response {
        let (vfo, is_active) = self.target_vfo(sub);
        match op {
            Op::Query => {
                let code = modes::mode_to_civ(self.store.vfo_mode(vfo));
                Response::data(CMD_SEND_SEL_MODE, &[sub, code, 0x00, 0x01])
            }
            Op::Set(mode) => {
                if self.store.vfo_mode(vfo) == mode {
                    return Response::Ack;
                }
                if is_active {
                    return self.schedule(Mutation::SetMode(mode));
                }
                self.store.set_vfo_mode(vfo, mode);
                Response::Ack
            }
        }
    }

    fn schedule(&self, mutation: Mutation) -> Response {
        match self.scheduler.submit(mutation) {
            Ok(()) => {
                debug!(?mutation, "mutation scheduled");
                Response::Ack
            }
            Err(e) => {
                warn!(?mutation, error = %e, "mutation not accepted");
                Response::Nak
            }
        }
    }

    /// Tell the UI that the VFO layout changed under it.
    fn refresh_display(&self) {
        self.emit(RadioEvent::ParamsChanged);
        self.emit(RadioEvent::WaterfallRetune {
            freq_hz: self.store.frequency(),
        });
        self.emit(RadioEvent::SpectrumCleared);
        self.emit(RadioEvent::BandChanged);
    }

    fn emit(&self, event: RadioEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civ::DEVICE_ADDR;
    use crate::mutation::{self, MutationQueue};
    use civcat_core::AgcMode;
    use civcat_test_harness::{Call, MockRadio};

    struct Fixture {
        radio: MockRadio,
        dispatcher: Dispatcher,
        queue: MutationQueue,
        events: broadcast::Receiver<RadioEvent>,
    }

    fn fixture_with(radio: MockRadio) -> Fixture {
        let (scheduler, queue) = mutation::channel();
        let (events_tx, events) = broadcast::channel(16);
        let dispatcher = Dispatcher::new(
            DEVICE_ADDR,
            Arc::new(radio.clone()),
            Arc::new(radio.clone()),
            scheduler,
            events_tx,
        );
        Fixture {
            radio,
            dispatcher,
            queue,
            events,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockRadio::new())
    }

    impl Fixture {
        /// Dispatch and return the response, checking the echo.
        fn send(&self, raw: &[u8]) -> Vec<u8> {
            let reply = self.dispatcher.handle(raw).expect("well-formed frame");
            assert_eq!(reply.echo, raw);
            reply.response
        }

        /// Mutations handed to the UI side since the last call.
        fn scheduled(&mut self) -> Vec<Mutation> {
            let mut recorder = Recorder::default();
            self.queue.drain(&mut recorder);
            recorder.0
        }

        fn events(&mut self) -> Vec<RadioEvent> {
            let mut out = Vec::new();
            while let Ok(e) = self.events.try_recv() {
                out.push(e);
            }
            out
        }
    }

    /// Captures mutations instead of applying them.
    #[derive(Default)]
    struct Recorder(Vec<Mutation>);

    impl civcat_core::StateTransitions for Recorder {
        fn set_frequency(&mut self, freq_hz: u64) {
            self.0.push(Mutation::SetFrequency(freq_hz));
        }
        fn set_mode(&mut self, mode: RadioMode) {
            self.0.push(Mutation::SetMode(mode));
        }
        fn set_vfo(&mut self, vfo: Vfo) {
            self.0.push(Mutation::SetVfo(vfo));
        }
    }

    const ACK_E0: [u8; 6] = [0xFE, 0xFE, 0xE0, 0xA4, 0xFB, 0xFD];
    const NAK_E0: [u8; 6] = [0xFE, 0xFE, 0xE0, 0xA4, 0xFA, 0xFD];

    // ---------------------------------------------------------------
    // Framing
    // ---------------------------------------------------------------

    #[test]
    fn malformed_frames_get_no_reply() {
        let f = fixture();
        assert_eq!(f.dispatcher.handle(&[0x00, 0xFE, 0xA4, 0xE0, 0x03, 0xFD]), None);
        assert_eq!(f.dispatcher.handle(&[0xFE, 0xFE, 0xFD]), None);
        assert!(f.radio.calls().is_empty());
    }

    #[test]
    fn response_goes_back_to_requester() {
        let f = fixture();
        let response = f.send(&[0xFE, 0xFE, 0xA4, 0x42, 0x19, 0x00, 0xFD]);
        assert_eq!(response, vec![0xFE, 0xFE, 0x42, 0xA4, 0x19, 0x00, 0xA4, 0xFD]);
    }

    #[test]
    fn unknown_command_is_nak() {
        let f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0xFF, 0xFD]), NAK_E0);
        // Addressed from A4 itself, the NAK goes back to A4.
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xE0, 0xA4, 0xFF, 0xFD]),
            vec![0xFE, 0xFE, 0xA4, 0xA4, 0xFA, 0xFD]
        );
    }

    // ---------------------------------------------------------------
    // Frequency and mode
    // ---------------------------------------------------------------

    #[test]
    fn read_frequency() {
        let f = fixture();
        let response = f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x03, 0xFD]);
        assert_eq!(response.len(), 11);
        assert_eq!(&response[..5], &[0xFE, 0xFE, 0xE0, 0xA4, 0x03]);
        assert_eq!(bcd::bcd_to_freq(&response[5..10]), 14_074_000);
    }

    #[test]
    fn read_mode_repeats_code() {
        let f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x04, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x04, 0x01, 0x01, 0xFD]
        );
    }

    #[test]
    fn set_frequency_schedules_once() {
        let mut f = fixture();
        let mut raw = vec![0xFE, 0xFE, 0xA4, 0xE0, 0x05];
        raw.extend_from_slice(&bcd::freq_to_bcd(14_250_000));
        raw.push(0xFD);

        assert_eq!(f.send(&raw), ACK_E0);
        assert_eq!(f.scheduled(), vec![Mutation::SetFrequency(14_250_000)]);
        // Nothing touched the radio from the protocol side.
        assert!(f.radio.calls().is_empty());
    }

    #[test]
    fn set_same_frequency_acks_without_scheduling() {
        let mut f = fixture();
        let mut raw = vec![0xFE, 0xFE, 0xA4, 0xE0, 0x05];
        raw.extend_from_slice(&bcd::freq_to_bcd(14_074_000));
        raw.push(0xFD);

        assert_eq!(f.send(&raw), ACK_E0);
        assert!(f.scheduled().is_empty());
    }

    #[test]
    fn set_frequency_short_payload_is_nak() {
        let mut f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x05, 0x00, 0xFD]), NAK_E0);
        assert!(f.scheduled().is_empty());
    }

    #[test]
    fn set_mode() {
        let mut f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x06, 0x03, 0x01, 0xFD]), ACK_E0);
        assert_eq!(f.scheduled(), vec![Mutation::SetMode(RadioMode::Cw)]);
    }

    #[test]
    fn set_mode_unknown_code_is_nak() {
        let mut f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x06, 0x17, 0xFD]), NAK_E0);
        assert!(f.scheduled().is_empty());
    }

    #[test]
    fn scheduler_gone_is_nak() {
        let f = fixture();
        let Fixture { dispatcher, queue, .. } = f;
        drop(queue);
        let reply = dispatcher
            .handle(&[0xFE, 0xFE, 0xA4, 0xE0, 0x07, 0x01, 0xFD])
            .unwrap();
        assert_eq!(reply.response, NAK_E0);
    }

    #[test]
    fn scheduler_gone_leaves_selected_frequency_untouched() {
        let Fixture { dispatcher, queue, radio, .. } = fixture();
        drop(queue);
        let mut raw = vec![0xFE, 0xFE, 0xA4, 0xE0, 0x25, 0x00];
        raw.extend_from_slice(&bcd::freq_to_bcd(14_100_000));
        raw.push(0xFD);

        let reply = dispatcher.handle(&raw).unwrap();
        assert_eq!(reply.response, NAK_E0);
        assert_eq!(radio.frequency(), 14_074_000);
        assert!(radio.calls().is_empty());
    }

    // ---------------------------------------------------------------
    // VFO
    // ---------------------------------------------------------------

    #[test]
    fn select_vfo() {
        let mut f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x07, 0x01, 0xFD]), ACK_E0);
        assert_eq!(f.scheduled(), vec![Mutation::SetVfo(Vfo::B)]);

        // Already on A: acknowledged, nothing scheduled.
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x07, 0x00, 0xFD]), ACK_E0);
        assert!(f.scheduled().is_empty());
    }

    #[test]
    fn exchange_vfo_refreshes_display() {
        let mut f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x07, 0xB0, 0xFD]), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::SwapVfo]);
        assert_eq!(
            f.events(),
            vec![
                RadioEvent::ParamsChanged,
                RadioEvent::WaterfallRetune { freq_hz: 7_074_000 },
                RadioEvent::SpectrumCleared,
                RadioEvent::BandChanged,
            ]
        );
    }

    #[test]
    fn unknown_vfo_sub_is_nak() {
        let f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x07, 0xD1, 0xFD]), NAK_E0);
    }

    // ---------------------------------------------------------------
    // Split and attenuator
    // ---------------------------------------------------------------

    #[test]
    fn split_query_and_toggle() {
        let mut f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x0F, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x0F, 0x00, 0xFD]
        );
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x0F, 0x01, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x0F, 0xFB, 0xFD]
        );
        assert_eq!(f.radio.calls(), vec![Call::ToggleSplit]);
        assert_eq!(f.events().len(), 4);
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x0F, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x0F, 0x01, 0xFD]
        );
    }

    #[test]
    fn attenuator_toggle() {
        let mut f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x11, 0x20, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x11, 0xFB, 0xFD]
        );
        assert_eq!(f.radio.calls(), vec![Call::ToggleAttenuator]);
        assert_eq!(f.events(), vec![RadioEvent::ParamsChanged]);
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x11, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x11, 0x01, 0xFD]
        );
    }

    // ---------------------------------------------------------------
    // Levels
    // ---------------------------------------------------------------

    #[test]
    fn level_query() {
        let f = fixture_with(MockRadio::new().with_level(Level::AfVolume, 55));
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x14, 0x01, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x14, 0x01, 0x02, 0x55, 0xFD]
        );
    }

    #[test]
    fn level_set_applies_delta() {
        let f = fixture_with(MockRadio::new().with_level(Level::AfVolume, 20));
        // 128 -> native 28
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x14, 0x01, 0x01, 0x28, 0xFD]), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::ChangeLevel(Level::AfVolume, 8)]);
        assert_eq!(f.radio.level(Level::AfVolume), 28);
    }

    #[test]
    fn dnf_center_set_at_128() {
        let f = fixture_with(MockRadio::new().with_level(Level::DnfCenter, 1000));
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x14, 0x0D, 0x01, 0x28, 0xFD]), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::ChangeLevel(Level::DnfCenter, 12)]);
        assert_eq!(f.radio.level(Level::DnfCenter), 1600);
    }

    #[test]
    fn level_read_write_round_trip() {
        let f = fixture_with(MockRadio::new().with_level(Level::NrLevel, 35));
        let response = f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x14, 0x06, 0xFD]);
        let scaled = [response[6], response[7]];

        let mut set = vec![0xFE, 0xFE, 0xA4, 0xE0, 0x14, 0x06];
        set.extend_from_slice(&scaled);
        set.push(0xFD);
        assert_eq!(f.send(&set), ACK_E0);
        assert_eq!(f.radio.level(Level::NrLevel), 35);
    }

    #[test]
    fn level_set_one_byte_is_nak() {
        let f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x14, 0x02, 0x01, 0xFD]), NAK_E0);
        assert!(f.radio.calls().is_empty());
    }

    #[test]
    fn unknown_level_sub_is_nak() {
        let f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x14, 0x0B, 0xFD]), NAK_E0);
    }

    // ---------------------------------------------------------------
    // Functions
    // ---------------------------------------------------------------

    #[test]
    fn agc_query_and_cycle() {
        let mut f = fixture_with(MockRadio::new().with_agc(AgcMode::Slow));
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x16, 0x12, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x16, 0x12, 0x02, 0xFD]
        );
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x16, 0x12, 0x01, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x16, 0x12, 0xFB, 0xFD]
        );
        assert_eq!(f.radio.agc(), AgcMode::Auto);
        assert_eq!(f.events(), vec![RadioEvent::ParamsChanged]);
    }

    #[test]
    fn nr_toggle_raises_status_event() {
        let mut f = fixture();
        f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x16, 0x40, 0x01, 0xFD]);
        assert_eq!(
            f.events(),
            vec![RadioEvent::FunctionToggled {
                function: DspFunction::Nr,
                on: true
            }]
        );
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x16, 0x40, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x16, 0x40, 0x01, 0xFD]
        );
    }

    #[test]
    fn nb_toggle_off_when_already_on() {
        let mut f = fixture_with(MockRadio::new().with_dsp(DspFunction::Nb, true));
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x16, 0x22, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x16, 0x22, 0x01, 0xFD]
        );
        f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x16, 0x22, 0x01, 0xFD]);
        assert_eq!(
            f.events(),
            vec![RadioEvent::FunctionToggled {
                function: DspFunction::Nb,
                on: false
            }]
        );
    }

    #[test]
    fn preamp_toggle() {
        let f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x16, 0x02, 0x01, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x16, 0x02, 0xFB, 0xFD]
        );
        assert_eq!(f.radio.calls(), vec![Call::TogglePreamp]);
    }

    // ---------------------------------------------------------------
    // PTT and ATU
    // ---------------------------------------------------------------

    #[test]
    fn ptt_set_and_query() {
        let f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x00, 0x01, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x1C, 0x00, 0xFB, 0xFD]
        );
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x00, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x1C, 0x00, 0x01, 0xFD]
        );
        f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x00, 0x00, 0xFD]);
        assert_eq!(f.radio.calls(), vec![Call::SetPtt(true), Call::SetPtt(false)]);
    }

    #[test]
    fn ptt_query_while_transmitting() {
        let f = fixture_with(MockRadio::new().with_ptt(true));
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x00, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x1C, 0x00, 0x01, 0xFD]
        );
        f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x00, 0x00, 0xFD]);
        assert_eq!(f.radio.calls(), vec![Call::SetPtt(false)]);
    }

    #[test]
    fn ptt_other_value_is_ignored_but_acknowledged() {
        let f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x00, 0x05, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x1C, 0x00, 0xFB, 0xFD]
        );
        assert!(f.radio.calls().is_empty());
    }

    #[test]
    fn atu_toggle_and_tune() {
        let f = fixture();
        f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x01, 0x01, 0xFD]);
        f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x01, 0x02, 0xFD]);
        assert_eq!(f.radio.calls(), vec![Call::ToggleAtu, Call::StartAtuTune]);
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1C, 0x01, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x1C, 0x01, 0x01, 0xFD]
        );
    }

    // ---------------------------------------------------------------
    // Identity and filter
    // ---------------------------------------------------------------

    #[test]
    fn read_transceiver_id() {
        let f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x19, 0x00, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x19, 0x00, 0xA4, 0xFD]
        );
    }

    #[test]
    fn read_if_width() {
        let f = fixture_with(MockRadio::new().with_filter_bandwidth(2400));
        // USB-D, (2400 - 50) / 100 + 5 = 28
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x1A, 0x03, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x1A, 0x03, 28, 0xFD]
        );
    }

    // ---------------------------------------------------------------
    // Selected / unselected VFO
    // ---------------------------------------------------------------

    #[test]
    fn unselected_frequency_query() {
        let f = fixture();
        let response = f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x25, 0x01, 0xFD]);
        assert_eq!(response.len(), 12);
        assert_eq!(response[5], 0x01);
        assert_eq!(bcd::bcd_to_freq(&response[6..11]), 7_074_000);
    }

    #[test]
    fn selected_frequency_set_writes_and_schedules() {
        let mut f = fixture();
        let mut raw = vec![0xFE, 0xFE, 0xA4, 0xE0, 0x25, 0x00];
        raw.extend_from_slice(&bcd::freq_to_bcd(14_100_000));
        raw.push(0xFD);

        assert_eq!(f.send(&raw), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::SetVfoFrequency(Vfo::A, 14_100_000)]);
        assert_eq!(f.scheduled(), vec![Mutation::SetFrequency(14_100_000)]);
    }

    #[test]
    fn unselected_frequency_set_only_writes_store() {
        let mut f = fixture();
        let mut raw = vec![0xFE, 0xFE, 0xA4, 0xE0, 0x25, 0x01];
        raw.extend_from_slice(&bcd::freq_to_bcd(3_573_000));
        raw.push(0xFD);

        assert_eq!(f.send(&raw), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::SetVfoFrequency(Vfo::B, 3_573_000)]);
        assert!(f.scheduled().is_empty());
    }

    #[test]
    fn selected_mode_query() {
        let f = fixture();
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x26, 0x00, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x26, 0x00, 0x01, 0x00, 0x01, 0xFD]
        );
    }

    #[test]
    fn selected_mode_set_schedules() {
        let mut f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x26, 0x00, 0x01, 0x00, 0x01, 0xFD]), ACK_E0);
        assert_eq!(f.scheduled(), vec![Mutation::SetMode(RadioMode::Usb)]);
    }

    #[test]
    fn unselected_mode_set_writes_store() {
        let mut f = fixture();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x26, 0x01, 0x03, 0x00, 0x01, 0xFD]), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::SetVfoMode(Vfo::B, RadioMode::Cw)]);
        assert!(f.scheduled().is_empty());
    }

    #[test]
    fn selected_follows_active_vfo_b() {
        let mut f = fixture_with(MockRadio::new().with_vfo(Vfo::B));

        // Selected is B, unselected is A.
        let response = f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x25, 0x00, 0xFD]);
        assert_eq!(bcd::bcd_to_freq(&response[6..11]), 7_074_000);
        let response = f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x25, 0x01, 0xFD]);
        assert_eq!(bcd::bcd_to_freq(&response[6..11]), 14_074_000);
        assert_eq!(
            f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x26, 0x00, 0xFD]),
            vec![0xFE, 0xFE, 0xE0, 0xA4, 0x26, 0x00, 0x00, 0x00, 0x01, 0xFD]
        );

        let mut raw = vec![0xFE, 0xFE, 0xA4, 0xE0, 0x25, 0x00];
        raw.extend_from_slice(&bcd::freq_to_bcd(7_030_000));
        raw.push(0xFD);
        assert_eq!(f.send(&raw), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::SetVfoFrequency(Vfo::B, 7_030_000)]);
        assert_eq!(f.scheduled(), vec![Mutation::SetFrequency(7_030_000)]);

        f.radio.clear_calls();
        assert_eq!(f.send(&[0xFE, 0xFE, 0xA4, 0xE0, 0x26, 0x01, 0x03, 0x00, 0x01, 0xFD]), ACK_E0);
        assert_eq!(f.radio.calls(), vec![Call::SetVfoMode(Vfo::A, RadioMode::Cw)]);
        assert!(f.scheduled().is_empty());
    }
}
