//! The protocol task.
//!
//! One spawned task owns the transport and the frame reader. It loops over
//! read, dispatch and write until cancelled; no request, malformed input or
//! write failure ends it. Queued announcements are written between frames.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use civcat_core::error::{Error, Result};
use civcat_core::transport::Transport;

use crate::civ;
use crate::dispatch::Dispatcher;
use crate::reader::FrameReader;
use crate::transceive::{Announcement, Announcer};

/// Handle to a running protocol task.
pub struct CatServer {
    cancel: CancellationToken,
    task: JoinHandle<Box<dyn Transport>>,
    announcer: Announcer,
}

impl CatServer {
    /// A handle for queueing unsolicited announcements.
    pub fn announcer(&self) -> Announcer {
        self.announcer.clone()
    }

    /// Whether the protocol task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the protocol task and recover the transport.
    pub async fn shutdown(self) -> Result<Box<dyn Transport>> {
        self.cancel.cancel();
        self.task.await.map_err(|e| {
            warn!(error = %e, "protocol task did not finish cleanly");
            Error::NotConnected
        })
    }
}

/// Spawn the protocol task.
pub(crate) fn spawn(
    transport: Box<dyn Transport>,
    dispatcher: Dispatcher,
    reader: FrameReader,
    address: u8,
    announce_capacity: usize,
) -> CatServer {
    let (announce_tx, announce_rx) = mpsc::channel(announce_capacity);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(protocol_loop(
        transport,
        dispatcher,
        reader,
        address,
        announce_rx,
        cancel.clone(),
    ));
    info!(address = format_args!("{address:02X}"), "CAT protocol task started");

    CatServer {
        cancel,
        task,
        announcer: Announcer::new(announce_tx),
    }
}

/// Main loop. Runs as a spawned Tokio task.
///
/// Priorities, highest first: cancellation, pending announcements, the next
/// request frame.
async fn protocol_loop(
    mut transport: Box<dyn Transport>,
    dispatcher: Dispatcher,
    mut reader: FrameReader,
    address: u8,
    mut announce_rx: mpsc::Receiver<Announcement>,
    cancel: CancellationToken,
) -> Box<dyn Transport> {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("CAT protocol task cancelled");
                break;
            }

            Some(announcement) = announce_rx.recv() => {
                trace!(?announcement, "sending announcement");
                write(&mut *transport, &announcement.encode(address)).await;
            }

            frame = reader.next_frame(&mut *transport) => {
                let Some(raw) = frame else {
                    debug!("frame exceeded maximum length, discarded");
                    continue;
                };
                if let Some(reply) = dispatcher.handle(&raw) {
                    write(&mut *transport, &reply.echo).await;
                    trace!(frame = %civ::hex_dump(&reply.response), "CAT response");
                    write(&mut *transport, &reply.response).await;
                }
            }
        }
    }

    info!("CAT protocol task stopped");
    transport
}

async fn write(transport: &mut dyn Transport, bytes: &[u8]) {
    if let Err(e) = transport.send(bytes).await {
        warn!(error = %e, len = bytes.len(), "serial write failed");
    }
}
