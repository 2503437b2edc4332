//! Fixed-interval animation clock.
//!
//! The host owns the real timer and calls [`AnimationTimer::poll`] with the
//! current instant; a tick is produced once the interval has elapsed since
//! the last one. Time spent paused does not count towards `elapsed`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Running time since start, excluding pauses.
    pub elapsed: Duration,
    /// Time since the previous tick.
    pub delta: Duration,
    /// 1-based tick number.
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct AnimationTimer {
    interval: Duration,
    state: TimerState,
    started: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
    last_tick: Option<Instant>,
    count: u64,
}

impl AnimationTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            state: TimerState::Stopped,
            started: None,
            paused_at: None,
            paused_total: Duration::ZERO,
            last_tick: None,
            count: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Starts from zero; restarting a running timer resets it.
    pub fn start(&mut self, now: Instant) {
        self.state = TimerState::Running;
        self.started = Some(now);
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        self.last_tick = Some(now);
        self.count = 0;
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
        self.started = None;
        self.paused_at = None;
        self.last_tick = None;
    }

    pub fn pause(&mut self, now: Instant) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.state != TimerState::Paused {
            return;
        }
        if let Some(paused_at) = self.paused_at.take() {
            let paused = now.saturating_duration_since(paused_at);
            self.paused_total += paused;
            self.last_tick = self.last_tick.map(|t| t + paused);
        }
        self.state = TimerState::Running;
    }

    /// When the next tick becomes due, if running.
    pub fn next_due(&self) -> Option<Instant> {
        match self.state {
            TimerState::Running => self.last_tick.map(|t| t + self.interval),
            _ => None,
        }
    }

    /// Produces a tick if one is due at `now`. Several missed intervals
    /// collapse into one tick.
    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        let due = self.next_due()?;
        if now < due {
            return None;
        }
        let started = self.started?;
        let last = self.last_tick.unwrap_or(started);
        self.last_tick = Some(now);
        self.count += 1;
        Some(Tick {
            elapsed: now
                .saturating_duration_since(started)
                .saturating_sub(self.paused_total),
            delta: now.saturating_duration_since(last),
            count: self.count,
        })
    }
}

impl Default for AnimationTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            sketchkit_core::constants::DEFAULT_TIMER_INTERVAL_MS,
        ))
    }
}
