use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::balance::Wallet;

/// One wedge of the wheel.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub label: &'static str,
    pub payout: u64,
}

const fn segment(label: &'static str, payout: u64) -> Segment {
    Segment { label, payout }
}

/// Wheel layout, clockwise from 12 o'clock. Every segment is equally likely.
pub const SEGMENTS: [Segment; 10] = [
    segment("10", 10),
    segment("Try Again", 0),
    segment("50", 50),
    segment("Try Again", 0),
    segment("100", 100),
    segment("Try Again", 0),
    segment("500", 500),
    segment("Try Again", 0),
    segment("10", 10),
    segment("50", 50),
];

pub const SEGMENT_ANGLE: f64 = 360.0 / SEGMENTS.len() as f64;
pub const FULL_ROTATIONS: u32 = 5; // Full turns before the wheel comes to rest
pub const SPIN_DURATION_MS: u64 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelPhase {
    Idle,
    Spinning { segment: usize, started_at: Instant },
    Settled { segment: usize },
}

/// Why a spin request was refused.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpinRejection {
    /// A spin is already in flight; the request is ignored.
    Spinning,
    /// No spins left; the player should be offered a refill.
    OutOfSpins,
}

impl fmt::Display for SpinRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spinning => write!(f, "{}", crate::constants::ALREADY_SPINNING_ERROR),
            Self::OutOfSpins => write!(f, "{}", crate::constants::OUT_OF_SPINS_ERROR),
        }
    }
}

impl std::error::Error for SpinRejection {}

/// Everything the caller needs to animate an accepted spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinTicket {
    pub segment_index: usize,
    pub segment: Segment,
    pub rotation_target: f64,
    pub duration: Duration,
}

/// Spin-wheel session: `Idle -> Spinning -> Settled`, and back to
/// `Spinning` on the next accepted spin.
#[derive(Debug, Clone)]
pub struct WheelGame {
    phase: WheelPhase,
    rotation: f64,
    spin_duration: Duration,
}

impl Default for WheelGame {
    fn default() -> Self {
        Self::new()
    }
}

impl WheelGame {
    pub fn new() -> Self {
        Self::with_duration(Duration::from_millis(SPIN_DURATION_MS))
    }

    pub fn with_duration(spin_duration: Duration) -> Self {
        Self {
            phase: WheelPhase::Idle,
            rotation: 0.0,
            spin_duration,
        }
    }

    pub fn phase(&self) -> WheelPhase {
        self.phase
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn spin_duration(&self) -> Duration {
        self.spin_duration
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, WheelPhase::Spinning { .. })
    }

    /// Consumes one spin and picks the winning segment.
    ///
    /// Nothing is credited here; the payout happens in [`WheelGame::settle`].
    pub fn spin<W, R>(&mut self, wallet: &W, rng: &mut R, now: Instant) -> Result<SpinTicket, SpinRejection>
    where
        W: Wallet + ?Sized,
        R: Rng + ?Sized,
    {
        if self.is_spinning() {
            return Err(SpinRejection::Spinning);
        }
        if !wallet.spend_spin() {
            return Err(SpinRejection::OutOfSpins);
        }
        Ok(self.begin(pick_segment(rng), now))
    }

    fn begin(&mut self, segment_index: usize, now: Instant) -> SpinTicket {
        self.rotation = rotation_target(self.rotation, segment_index);
        self.phase = WheelPhase::Spinning {
            segment: segment_index,
            started_at: now,
        };
        log::debug!("wheel spinning towards segment {} ({:.1} deg)", segment_index, self.rotation);

        SpinTicket {
            segment_index,
            segment: SEGMENTS[segment_index],
            rotation_target: self.rotation,
            duration: self.spin_duration,
        }
    }

    /// Completes the spin in flight and credits its payout.
    ///
    /// Returns `None` unless the wheel is spinning, so a spin pays out once.
    pub fn settle<W: Wallet + ?Sized>(&mut self, wallet: &W) -> Option<Segment> {
        let WheelPhase::Spinning { segment, .. } = self.phase else {
            return None;
        };
        let won = SEGMENTS[segment];
        wallet.add_coins(won.payout);
        self.phase = WheelPhase::Settled { segment };
        log::info!("wheel settled on '{}' paying {} coins", won.label, won.payout);
        Some(won)
    }

    /// Settles once the spin duration has elapsed since the spin started.
    pub fn settle_if_elapsed<W: Wallet + ?Sized>(&mut self, now: Instant, wallet: &W) -> Option<Segment> {
        match self.phase {
            WheelPhase::Spinning { started_at, .. }
                if now.saturating_duration_since(started_at) >= self.spin_duration =>
            {
                self.settle(wallet)
            }
            _ => None,
        }
    }

    pub fn view(&self) -> WheelView {
        let (phase, segment_index) = match self.phase {
            WheelPhase::Idle => ("idle", None),
            WheelPhase::Spinning { segment, .. } => ("spinning", Some(segment)),
            WheelPhase::Settled { segment } => ("settled", Some(segment)),
        };
        WheelView {
            phase: phase.to_string(),
            segment_index,
            label: segment_index.map(|i| SEGMENTS[i].label.to_string()),
            payout: segment_index.map(|i| SEGMENTS[i].payout),
            rotation: self.rotation,
        }
    }
}

/// Uniform pick over the segment table, independent of payout.
pub fn pick_segment<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.gen_range(0..SEGMENTS.len())
}

/// Absolute rotation (degrees, clockwise) that leaves the pointer at the
/// centre of `segment_index` after [`FULL_ROTATIONS`] extra turns.
pub fn rotation_target(current: f64, segment_index: usize) -> f64 {
    let base = (current / 360.0).ceil() * 360.0;
    base + f64::from(FULL_ROTATIONS) * 360.0 + (360.0 - (segment_index as f64 + 0.5) * SEGMENT_ANGLE)
}

/// Segment under the 12 o'clock pointer for a given wheel rotation.
pub fn segment_at(rotation: f64) -> usize {
    let pointer = (360.0 - rotation.rem_euclid(360.0)).rem_euclid(360.0);
    (pointer / SEGMENT_ANGLE).floor() as usize % SEGMENTS.len()
}

// === API Types ===

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WheelView {
    pub phase: String,
    pub segment_index: Option<usize>,
    pub label: Option<String>,
    pub payout: Option<u64>,
    pub rotation: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WheelSpinResponse {
    pub segment_index: usize,
    pub label: String,
    pub payout: u64,
    pub rotation_target: f64,
    pub duration_ms: u64,
    pub spins_left: u64,
}

impl WheelSpinResponse {
    pub fn new(ticket: &SpinTicket, spins_left: u64) -> Self {
        Self {
            segment_index: ticket.segment_index,
            label: ticket.segment.label.to_string(),
            payout: ticket.segment.payout,
            rotation_target: ticket.rotation_target,
            duration_ms: ticket.duration.as_millis() as u64,
            spins_left,
        }
    }
}
