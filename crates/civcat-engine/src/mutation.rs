//! Pending mutations and their hand-off to the UI thread.
//!
//! Retuning, mode changes and VFO selection must not run on the protocol
//! task. The dispatcher wraps them in a [`Mutation`] and submits it through
//! a [`Scheduler`]; the UI side owns the matching [`MutationQueue`] and
//! applies mutations to its [`StateTransitions`] implementation in
//! submission order, exactly once each.
//!
//! Submission never blocks. Once accepted, a mutation cannot be retracted.

use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use civcat_core::error::{Error, Result};
use civcat_core::{RadioEvent, RadioMode, StateTransitions, Vfo};

/// A state transition scheduled onto the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Retune the active VFO, activating the band that contains it.
    SetFrequency(u64),
    /// Change the mode of the active VFO.
    SetMode(RadioMode),
    /// Make the given VFO active.
    SetVfo(Vfo),
}

impl Mutation {
    /// Apply this mutation to `target`.
    pub fn apply<T: StateTransitions + ?Sized>(self, target: &mut T) {
        match self {
            Mutation::SetFrequency(freq_hz) => target.set_frequency(freq_hz),
            Mutation::SetMode(mode) => target.set_mode(mode),
            Mutation::SetVfo(vfo) => target.set_vfo(vfo),
        }
    }
}

/// Submitting half of the mutation channel, held by the dispatcher.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Mutation>,
}

impl Scheduler {
    /// Hand `mutation` to the UI thread.
    ///
    /// Fails with [`Error::SchedulerClosed`] once the [`MutationQueue`] has
    /// been dropped.
    pub fn submit(&self, mutation: Mutation) -> Result<()> {
        self.tx.send(mutation).map_err(|_| Error::SchedulerClosed)
    }

    /// Whether the UI side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Executing half of the mutation channel, owned by the UI thread.
#[derive(Debug)]
pub struct MutationQueue {
    rx: mpsc::UnboundedReceiver<Mutation>,
    events: Option<broadcast::Sender<RadioEvent>>,
}

/// Create a connected scheduler and queue.
pub fn channel() -> (Scheduler, MutationQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Scheduler { tx }, MutationQueue { rx, events: None })
}

impl MutationQueue {
    /// Emit [`RadioEvent::ScreenUpdate`] on `events` after each applied
    /// mutation.
    pub fn with_events(mut self, events: broadcast::Sender<RadioEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn apply<T: StateTransitions + ?Sized>(&self, mutation: Mutation, target: &mut T) {
        debug!(?mutation, "applying scheduled mutation");
        mutation.apply(target);
        if let Some(events) = &self.events {
            let _ = events.send(RadioEvent::ScreenUpdate);
        }
    }

    /// Apply every mutation already queued, without waiting. Returns how
    /// many were applied.
    pub fn drain<T: StateTransitions + ?Sized>(&mut self, target: &mut T) -> usize {
        let mut applied = 0;
        while let Ok(mutation) = self.rx.try_recv() {
            self.apply(mutation, target);
            applied += 1;
        }
        applied
    }

    /// Apply mutations as they arrive until every [`Scheduler`] is dropped.
    pub async fn run<T: StateTransitions + ?Sized>(&mut self, target: &mut T) {
        while let Some(mutation) = self.rx.recv().await {
            self.apply(mutation, target);
        }
        debug!("all schedulers dropped, mutation queue finished");
    }

    /// Wait for the next mutation without applying it.
    pub async fn recv(&mut self) -> Option<Mutation> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civcat_test_harness::{Call, MockRadio};

    #[test]
    fn drain_applies_in_submission_order() {
        let (scheduler, mut queue) = channel();
        let mut radio = MockRadio::new();

        scheduler.submit(Mutation::SetVfo(Vfo::B)).unwrap();
        scheduler.submit(Mutation::SetFrequency(7_150_000)).unwrap();
        scheduler.submit(Mutation::SetMode(RadioMode::Cw)).unwrap();

        assert_eq!(queue.drain(&mut radio), 3);
        assert_eq!(
            radio.calls(),
            vec![
                Call::SetVfo(Vfo::B),
                Call::SetFrequency(7_150_000),
                Call::SetMode(RadioMode::Cw),
            ]
        );
        assert_eq!(queue.drain(&mut radio), 0);
    }

    #[test]
    fn each_mutation_runs_once() {
        let (scheduler, mut queue) = channel();
        let mut radio = MockRadio::new();

        scheduler.submit(Mutation::SetFrequency(14_200_000)).unwrap();
        queue.drain(&mut radio);
        queue.drain(&mut radio);

        assert_eq!(radio.calls(), vec![Call::SetFrequency(14_200_000)]);
    }

    #[test]
    fn submit_fails_once_queue_dropped() {
        let (scheduler, queue) = channel();
        assert!(!scheduler.is_closed());
        drop(queue);
        assert!(scheduler.is_closed());
        assert!(matches!(
            scheduler.submit(Mutation::SetVfo(Vfo::A)),
            Err(Error::SchedulerClosed)
        ));
    }

    #[test]
    fn screen_update_follows_each_mutation() {
        let (events, mut rx) = broadcast::channel(8);
        let (scheduler, queue) = channel();
        let mut queue = queue.with_events(events);
        let mut radio = MockRadio::new();

        scheduler.submit(Mutation::SetMode(RadioMode::Am)).unwrap();
        scheduler.submit(Mutation::SetVfo(Vfo::B)).unwrap();
        queue.drain(&mut radio);

        assert_eq!(rx.try_recv().unwrap(), RadioEvent::ScreenUpdate);
        assert_eq!(rx.try_recv().unwrap(), RadioEvent::ScreenUpdate);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_finishes_when_schedulers_dropped() {
        let (scheduler, mut queue) = channel();
        let mut radio = MockRadio::new();

        let other = scheduler.clone();
        scheduler.submit(Mutation::SetFrequency(21_074_000)).unwrap();
        other.submit(Mutation::SetVfo(Vfo::B)).unwrap();
        drop(scheduler);
        drop(other);

        queue.run(&mut radio).await;
        assert_eq!(
            radio.calls(),
            vec![Call::SetFrequency(21_074_000), Call::SetVfo(Vfo::B)]
        );
        assert_eq!(radio.band(), Some("40m"));
    }
}
