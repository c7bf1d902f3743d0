//! UI notification events.
//!
//! Events are emitted through a `tokio::sync::broadcast` channel when
//! a CAT command changed something the operator can see. The UI thread
//! subscribes and redraws; the protocol engine never touches rendering state
//! itself.

use crate::types::DspFunction;

/// A notification that on-screen state has changed.
///
/// Delivery is best-effort: a UI that falls behind may miss events, and
/// should treat any event as "re-read the parameter store".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    /// Frequency, mode or VFO changed; redraw the main screen.
    ScreenUpdate,

    /// A band parameter shown in the info panel changed (ATT, PRE, AGC,
    /// ATU, split, VFO).
    ParamsChanged,

    /// A DSP function was switched; show a short status message.
    FunctionToggled {
        /// Which function changed.
        function: DspFunction,
        /// New state.
        on: bool,
    },

    /// The waterfall must be re-centred on a new frequency.
    WaterfallRetune {
        /// Frequency in hertz.
        freq_hz: u64,
    },

    /// The spectrum history is stale and must be cleared.
    SpectrumCleared,

    /// The active band changed; refresh the band display.
    BandChanged,
}
