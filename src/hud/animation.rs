use std::time::Duration;

use egui::Color32;

use super::{Status, StyleTable, stroke_shade};

/// Drive time a session must accumulate before the standstill timer arms.
/// Filters out the stop right after ignition.
pub const STANDSTILL_ARM_DRIVE_TIME_S: f32 = 10.;

const BAND_ONE_S: f32 = 60.;
const BAND_TWO_S: f32 = 90.;
const BAND_THREE_S: f32 = 120.;

/// Turn-signal sprite animation. Frames advance on a sprite-declared
/// interval while a signal is active and restart from the first frame on
/// every idle-to-active transition.
#[derive(Debug, Default)]
pub struct TurnSignalAnimation {
    state: SignalState,
}

#[derive(Debug, Default)]
enum SignalState {
    #[default]
    Idle,
    Animating {
        frame: usize,
        last_advance: Duration,
    },
}

impl TurnSignalAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the animation and return the frame index to draw, or `None`
    /// while no signal is active. `now` is time since app start; the caller
    /// owns the clock so the machine stays testable.
    pub fn tick(
        &mut self,
        active: bool,
        frame_count: usize,
        interval: Duration,
        now: Duration,
    ) -> Option<usize> {
        if !active || frame_count == 0 {
            self.state = SignalState::Idle;
            return None;
        }
        match &mut self.state {
            SignalState::Idle => {
                self.state = SignalState::Animating {
                    frame: 0,
                    last_advance: now,
                };
                Some(0)
            }
            SignalState::Animating {
                frame,
                last_advance,
            } => {
                if interval > Duration::ZERO {
                    while now.saturating_sub(*last_advance) >= interval {
                        *frame = (*frame + 1) % frame_count;
                        *last_advance += interval;
                    }
                }
                // Sprite sets can shrink on theme change mid-blink.
                *frame %= frame_count;
                Some(*frame)
            }
        }
    }
}

/// Standstill timer. Starts counting when the vehicle stops (after enough
/// drive time this session) and resets as soon as it moves again.
#[derive(Debug, Default)]
pub struct StandstillTimer {
    stopped_at: Option<Duration>,
}

impl StandstillTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how long the vehicle has been stopped, or `None` while moving
    /// or before the timer is armed.
    pub fn tick(&mut self, standstill: bool, drive_time_s: f32, now: Duration) -> Option<Duration> {
        if !standstill || drive_time_s < STANDSTILL_ARM_DRIVE_TIME_S {
            self.stopped_at = None;
            return None;
        }
        let stopped_at = *self.stopped_at.get_or_insert(now);
        Some(now.saturating_sub(stopped_at))
    }
}

/// Tracks how long a speed-limit change has been awaiting confirmation, so
/// the sign strobe always opens in its red phase no matter when the change
/// lands relative to app start.
#[derive(Debug, Default)]
pub struct PendingLimitTimer {
    since: Option<Duration>,
}

impl PendingLimitTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how long the change has been pending, or `None` when nothing
    /// is awaiting confirmation.
    pub fn tick(&mut self, pending: bool, now: Duration) -> Option<Duration> {
        if !pending {
            self.since = None;
            return None;
        }
        let since = *self.since.get_or_insert(now);
        Some(now.saturating_sub(since))
    }
}

/// Standstill timer color. Calm for the first minute, then blends through
/// the warning colors in 30-second bands, continuous at every boundary.
pub fn standstill_color(stopped_for: Duration, style: &StyleTable) -> Color32 {
    let secs = stopped_for.as_secs_f32();
    let calm = style.color(Status::Engaged);
    let warn = style.color(Status::ConditionalOverridden);
    let urgent = style.color(Status::TrafficMode);
    if secs <= BAND_ONE_S {
        calm
    } else if secs <= BAND_TWO_S {
        stroke_shade(calm, warn, (secs - BAND_ONE_S) / (BAND_TWO_S - BAND_ONE_S))
    } else if secs <= BAND_THREE_S {
        stroke_shade(warn, urgent, (secs - BAND_TWO_S) / (BAND_THREE_S - BAND_TWO_S))
    } else {
        urgent
    }
}
