//! Timed transitions ("show feedback, then advance") guarded by a generation counter.
//!
//! Every timer captures the generation that was live when it was scheduled. Any
//! state change that supersedes pending timers bumps the generation, so a timer
//! that fires afterwards is recognised as stale and dropped. Timers are never
//! cancelled.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Feedback is over: show the next question or finish the level.
    NextQuestion,
    /// Turn a mismatched pair of memory cards back down.
    HideCards,
    /// A board is complete: score it and record the level.
    FinishLevel,
}

/// A timer firing, stamped with the generation it was scheduled under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    pub transition: Transition,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    pub fired: Fired,
    pub delay: Duration,
}

/// Tracks the live generation and timers waiting to be armed.
#[derive(Debug, Default)]
pub struct Scheduler {
    generation: u64,
    pending: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Make every timer scheduled so far stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.pending.clear();
    }

    pub fn schedule(&mut self, transition: Transition, delay: Duration) {
        let fired = Fired { transition, generation: self.generation };
        debug!(target: "activity", ?transition, generation = self.generation, delay_ms = delay.as_millis() as u64, "Scheduled transition");
        self.pending.push(Timer { fired, delay });
    }

    /// Timers scheduled since the last call; the driver arms them.
    pub fn take_pending(&mut self) -> Vec<Timer> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_current(&self, fired: &Fired) -> bool {
        fired.generation == self.generation
    }
}

/// Sleep on the runtime, then deliver the firing. Fire-and-forget.
pub fn arm(timer: Timer, tx: UnboundedSender<Fired>) {
    tokio::spawn(async move {
        tokio::time::sleep(timer.delay).await;
        // Receiver gone means the session loop ended; nothing to do.
        let _ = tx.send(timer.fired);
    });
}
