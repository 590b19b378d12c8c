use std::time::{Duration, Instant};

/// Identifies one armed interval of the tracker.
///
/// Ticks carrying a token from a cancelled interval are ignored, so an
/// interval can never overlap with its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(u64);

/// Outcome of one tracker tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One more second was recorded.
    Advanced(u32),
    /// The ceiling was already reached; the tracker cancelled itself.
    CeilingReached(u32),
}

/// One-second elapsed-time counter that only runs while recording.
///
/// Ports the browser `setInterval` countdown: arming restarts the interval
/// from "now", cancelling drops any due ticks. The elapsed count survives
/// cancel/arm cycles (pause/resume) and is only cleared by [`reset`].
///
/// [`reset`]: ElapsedTracker::reset
#[derive(Debug)]
pub struct ElapsedTracker {
    period: Duration,
    elapsed_secs: u32,
    generation: u64,
    next_due: Option<Instant>,
}

impl ElapsedTracker {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            elapsed_secs: 0,
            generation: 0,
            next_due: None,
        }
    }

    /// Start a new interval. Any previous interval is cancelled first.
    pub fn arm(&mut self, now: Instant) -> TickToken {
        self.cancel();
        self.next_due = Some(now + self.period);
        TickToken(self.generation)
    }

    /// Cancel the running interval. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.next_due.take().is_some();
        self.generation += 1;
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn token(&self) -> Option<TickToken> {
        self.next_due.map(|_| TickToken(self.generation))
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
    }

    /// Number of whole periods that have come due by `now`, consuming them.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let mut count = 0;
        while let Some(due) = self.next_due {
            if due > now {
                break;
            }
            count += 1;
            self.next_due = Some(due + self.period);
        }
        count
    }

    /// Apply one tick of the current interval against `max_secs`.
    pub fn tick(&mut self, max_secs: u32) -> Option<TickOutcome> {
        let token = self.token()?;
        self.tick_with(token, max_secs)
    }

    /// Apply one tick if `token` still names the running interval.
    pub fn tick_with(&mut self, token: TickToken, max_secs: u32) -> Option<TickOutcome> {
        if self.token() != Some(token) {
            return None;
        }
        if self.elapsed_secs >= max_secs {
            self.cancel();
            return Some(TickOutcome::CeilingReached(self.elapsed_secs));
        }
        self.elapsed_secs += 1;
        Some(TickOutcome::Advanced(self.elapsed_secs))
    }
}

impl Default for ElapsedTracker {
    fn default() -> Self {
        Self::new()
    }
}
