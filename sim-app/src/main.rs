// civcat simulator -- serves the CAT protocol on a serial port against an
// in-memory transceiver, logging every request and state change.
//
// Usage:
//   civcat-sim --port /dev/ttyUSB0
//   civcat-sim --port /dev/ttyUSB0 --baud 19200 --address 0xA4 --freq 7074000
//   civcat-sim --mock
//
// With --mock no serial port is opened: a short scripted session is played
// through a mock transport and the exchanged frames are printed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use civcat_core::{ParamStore, RadioEvent, RadioMode, Vfo};
use civcat_engine::civ::{encode_frame, hex_dump};
use civcat_engine::commands::{CMD_CTL_FUNC, CMD_CTL_LVL, CMD_RD_FREQ, CMD_SET_FREQ, CMD_SET_MODE};
use civcat_engine::{bcd, mutation, Announcement, CatServer, CatServerBuilder, MutationQueue};
use civcat_test_harness::{MockRadio, MockTransport};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// civcat simulator -- a CI-V CAT endpoint backed by a simulated radio.
#[derive(Parser)]
#[command(name = "civcat-sim", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3). Required unless --mock.
    #[arg(long)]
    port: Option<String>,

    /// Serial line speed.
    #[arg(long, default_value_t = 19_200)]
    baud: u32,

    /// CI-V address to answer as (hex, e.g. 0xA4).
    #[arg(long, value_parser = parse_hex_u8, default_value = "0xA4")]
    address: u8,

    /// Initial VFO A frequency in hertz.
    #[arg(long, default_value_t = 14_074_000)]
    freq: u64,

    /// Initial VFO A mode (LSB, USB, USB-D, CW, AM, NFM, ...).
    #[arg(long, default_value = "USB")]
    mode: RadioMode,

    /// Play a scripted session through a mock transport instead of
    /// opening a serial port.
    #[arg(long)]
    mock: bool,
}

/// Parse a hex string like "0xA4" or "A4" into a u8.
fn parse_hex_u8(s: &str) -> std::result::Result<u8, String> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(s, 16).map_err(|e| format!("invalid hex byte: {e}"))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let radio = MockRadio::new()
        .with_frequency(Vfo::A, cli.freq)
        .with_mode(Vfo::A, cli.mode);
    let (scheduler, queue) = mutation::channel();
    let (events, _) = broadcast::channel(64);
    let queue = queue.with_events(events.clone());

    let builder = CatServerBuilder::new()
        .baud_rate(cli.baud)
        .address(cli.address);
    let store = Arc::new(radio.clone());
    let control = Arc::new(radio.clone());

    let ui = tokio::spawn(ui_loop(queue, radio.clone()));
    let logger = tokio::spawn(log_events(events.subscribe(), radio.clone()));

    if cli.mock {
        let mock = MockTransport::new();
        for frame in demo_script(cli.address) {
            mock.feed(&frame);
        }
        let server = builder
            .build_with_transport(Box::new(mock.clone()), store, control, scheduler, events)
            .await
            .context("failed to start CAT protocol task")?;
        server
            .announcer()
            .announce(Announcement::Frequency(radio.frequency()))
            .context("failed to queue announcement")?;

        tokio::time::sleep(Duration::from_millis(300)).await;
        stop(server).await?;

        for frame in mock.sent_data() {
            println!("{}", hex_dump(&frame));
        }
    } else {
        let port = cli
            .port
            .as_deref()
            .context("--port is required unless --mock is given")?;
        let server = builder
            .serial_port(port)
            .build(store, control, scheduler, events)
            .await
            .with_context(|| format!("failed to start CAT on {port}"))?;
        info!(port, baud = cli.baud, "serving CAT, press Ctrl-C to stop");

        tokio::signal::ctrl_c()
            .await
            .context("failed to wait for Ctrl-C")?;
        stop(server).await?;
    }

    // The queue finishes once the protocol task has dropped its scheduler.
    ui.await.context("UI task panicked")?;
    logger.abort();
    Ok(())
}

async fn stop(server: CatServer) -> Result<()> {
    let mut transport = server
        .shutdown()
        .await
        .context("failed to stop CAT protocol task")?;
    if let Err(e) = transport.close().await {
        warn!(error = %e, "failed to close transport");
    }
    Ok(())
}

/// Stand-in for the UI thread: apply scheduled mutations in order.
async fn ui_loop(mut queue: MutationQueue, mut radio: MockRadio) {
    queue.run(&mut radio).await;
}

/// Log every UI notification the way an on-screen status line would show it.
async fn log_events(mut rx: broadcast::Receiver<RadioEvent>, radio: MockRadio) {
    loop {
        match rx.recv().await {
            Ok(RadioEvent::ScreenUpdate) => info!(
                vfo = %radio.vfo(),
                freq = radio.frequency(),
                mode = %radio.mode(),
                band = radio.band().unwrap_or("-"),
                "screen update"
            ),
            Ok(RadioEvent::FunctionToggled { function, on }) => {
                info!("{function}: {}", if on { "On" } else { "Off" })
            }
            Ok(event) => info!(?event, "radio event"),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "event logger fell behind")
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// A short controller session: read, retune, change mode, set AF gain,
/// switch NR on, and one request this radio does not support.
fn demo_script(address: u8) -> Vec<Vec<u8>> {
    const CONTROLLER: u8 = 0xE0;
    vec![
        encode_frame(address, CONTROLLER, CMD_RD_FREQ, &[]),
        encode_frame(address, CONTROLLER, CMD_SET_FREQ, &bcd::freq_to_bcd(7_074_000)),
        encode_frame(address, CONTROLLER, CMD_SET_MODE, &[0x03]),
        encode_frame(address, CONTROLLER, CMD_CTL_LVL, &[0x01, 0x01, 0x28]),
        encode_frame(address, CONTROLLER, CMD_CTL_FUNC, &[0x40, 0x01]),
        encode_frame(address, CONTROLLER, 0x1B, &[]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_address_parses_with_and_without_prefix() {
        assert_eq!(parse_hex_u8("0xA4"), Ok(0xA4));
        assert_eq!(parse_hex_u8("a4"), Ok(0xA4));
        assert!(parse_hex_u8("0x1FF").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["civcat-sim", "--mock"]);
        assert_eq!(cli.baud, 19_200);
        assert_eq!(cli.address, 0xA4);
        assert_eq!(cli.freq, 14_074_000);
        assert_eq!(cli.mode, RadioMode::Usb);
        assert!(cli.port.is_none());
    }

    #[test]
    fn demo_script_is_well_formed() {
        for frame in demo_script(0xA4) {
            assert!(civcat_engine::civ::parse_frame(&frame).is_ok());
        }
    }
}
