//! Pure trajectory planners for the host-side soft ramps.
//!
//! The firmware applies every setpoint instantly. Constant acceleration is
//! approximated by rewriting a setpoint at a fixed time step, and these types
//! compute what to write. They perform no I/O; [`crate::motion`] drives them
//! against a device.

use std::time::Duration;

use crate::error::{DeviceError, Result};
use crate::state::Direction;

/// Reject accelerations that are not finite and positive.
pub fn check_accel(accel: f64) -> Result<f64> {
    if accel.is_finite() && accel > 0.0 {
        Ok(accel)
    } else {
        Err(DeviceError::validation(format!(
            "accel must be > 0, got {accel}"
        )))
    }
}

/// Reject a zero ramp time step.
pub fn check_step(step: Duration) -> Result<Duration> {
    if step.is_zero() {
        Err(DeviceError::validation("ramp time step must be > 0"))
    } else {
        Ok(step)
    }
}

/// One intermediate velocity setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampStep {
    pub direction: Direction,
    pub magnitude: u16,
    /// Pause after writing this setpoint.
    pub dwell: Duration,
}

/// Constant-acceleration ramp between two signed velocities.
///
/// Signed velocity is magnitude times direction sign, so a ramp may cross
/// zero and reverse.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityRamp {
    start: i64,
    target: i64,
    accel: f64,
    step: Duration,
    steps: u64,
}

impl VelocityRamp {
    /// Plan a ramp from `start` to `target`. Returns `None` when they are equal.
    ///
    /// `accel` is a magnitude in indices/s²; its sign is taken from the
    /// direction of travel. Callers validate it with [`check_accel`] and `step`
    /// with [`check_step`].
    pub fn plan(start: i64, target: i64, accel: f64, step: Duration) -> Option<Self> {
        if start == target {
            return None;
        }
        let accel = accel.abs();
        let span = (target - start).unsigned_abs() as f64 / accel;
        let steps = (span / step.as_secs_f64()).floor() as u64;
        let accel = if target > start { accel } else { -accel };
        Some(Self {
            start,
            target,
            accel,
            step,
            steps,
        })
    }

    /// Number of scheduled intermediate setpoints.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    /// Signed acceleration toward the target.
    pub fn accel(&self) -> f64 {
        self.accel
    }

    /// Pause after the last scheduled setpoint.
    ///
    /// The step count is truncated, so the last pause covers only what remains
    /// of the ramp time.
    pub fn last_dwell(&self) -> Duration {
        let dt = self.step.as_secs_f64();
        let reached = self.start as f64 + dt * self.steps as f64 * self.accel;
        let remainder = (self.target as f64 - reached).abs() / self.accel.abs();
        Duration::try_from_secs_f64(remainder).unwrap_or(self.step)
    }

    /// The scheduled setpoints, in order.
    pub fn setpoints(&self) -> impl Iterator<Item = RampStep> + '_ {
        let dt = self.step.as_secs_f64();
        let last_dwell = self.last_dwell();
        (0..self.steps).map(move |i| {
            let v = (self.start as f64 + dt * (i + 1) as f64 * self.accel) as i64;
            RampStep {
                direction: Direction::of(v),
                magnitude: magnitude(v),
                dwell: if i + 1 < self.steps {
                    self.step
                } else {
                    last_dwell
                },
            }
        })
    }

    /// Exact final setpoint, written after the scheduled ones.
    pub fn final_setpoint(&self) -> (Direction, u16) {
        (Direction::of(self.target), magnitude(self.target))
    }
}

fn magnitude(signed: i64) -> u16 {
    u16::try_from(signed.unsigned_abs()).unwrap_or(u16::MAX)
}

/// Positioning-velocity profile for a point-to-point ramp.
///
/// The velocity is recomputed from the measured position on every poll, so
/// jitter in polling or travel does not accumulate.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionProfile {
    start: i64,
    target: i64,
    accel: f64,
    peak: u16,
    floor: u16,
    step: f64,
    dist_total: f64,
    dist_accel: f64,
}

impl PositionProfile {
    pub fn new(
        start: i32,
        target: i32,
        accel: f64,
        peak: u16,
        min_vel: u16,
        step: Duration,
    ) -> Self {
        let time_accel = f64::from(peak) / accel;
        Self {
            start: start.into(),
            target: target.into(),
            accel,
            peak,
            floor: min_vel.max(1),
            step: step.as_secs_f64(),
            dist_total: (i64::from(target) - i64::from(start)).unsigned_abs() as f64,
            dist_accel: 0.5 * accel * time_accel * time_accel,
        }
    }

    /// Absolute distance from start to target.
    pub fn distance(&self) -> u64 {
        self.dist_total as u64
    }

    /// Distance needed to reach the peak velocity.
    pub fn accel_distance(&self) -> f64 {
        self.dist_accel
    }

    /// True when the move is too short to reach the peak velocity.
    pub fn is_triangular(&self) -> bool {
        self.dist_total < 2.0 * self.dist_accel
    }

    /// Lowest velocity ever commanded. Never zero, which can stall tracking.
    pub fn floor(&self) -> u16 {
        self.floor
    }

    pub fn peak(&self) -> u16 {
        self.peak
    }

    /// Velocity to command at `position` after `polls` polls.
    ///
    /// The result is clamped into `[floor, peak]`; if the floor exceeds the
    /// peak, the floor wins.
    pub fn velocity(&self, position: i32, polls: u64) -> u16 {
        let position = i64::from(position);
        let from_start = (position - self.start).unsigned_abs() as f64;
        let to_target = (position - self.target).unsigned_abs() as f64;
        let elapsed = polls as f64 * self.step;

        let v = if self.is_triangular() {
            if from_start < 0.5 * self.dist_total {
                self.speed_after(from_start).max(self.accel * elapsed)
            } else {
                self.speed_after(to_target)
            }
        } else if to_target < self.dist_accel {
            self.speed_after(to_target)
        } else if from_start < self.dist_accel {
            self.speed_after(from_start).max(self.accel * elapsed)
        } else {
            f64::from(self.peak)
        };

        // Float casts saturate, so anything past u16::MAX lands on the peak clamp.
        let v = v as i64;
        let v = u16::try_from(v.max(0)).unwrap_or(u16::MAX);
        v.min(self.peak).max(self.floor)
    }

    /// Speed reached from rest after `distance` at constant acceleration.
    fn speed_after(&self, distance: f64) -> f64 {
        self.accel * (2.0 * distance / self.accel).sqrt()
    }
}
