//! Composite moves built from single-field accessors.
//!
//! Nothing here retries. An error aborts the move and leaves the device in
//! whatever state the last successful write produced.

use std::time::Duration;

use simplestep_frame::Update;
use simplestep_transport::RawTransport;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::device::{velocity_arg, Device};
use crate::error::{DeviceError, Result};
use crate::ramp::{check_accel, check_step, PositionProfile, VelocityRamp};
use crate::state::{Direction, Mode, Status};

impl<T: RawTransport, C: Clock> Device<T, C> {
    /// Move to `target` in position mode and block until the position error is zero.
    ///
    /// `vel` is the positioning velocity; half the cached maximum when `None`.
    /// There is no timeout: a device that never settles blocks the caller.
    pub fn move_to_pos(&mut self, target: i32, vel: Option<i64>) -> Result<()> {
        let vel = self.peak_velocity(vel)?;
        info!(target, vel, "move to position");

        self.stop()?;
        self.set_mode(Mode::Position)?;
        self.set_pos_vel(vel.into())?;
        self.set_pos_setpt(target)?;
        self.start()?;
        self.wait_for_position()?;
        self.stop()
    }

    /// Move `delta` indices from the current position.
    ///
    /// The position is read once, so a concurrent external change is not seen.
    pub fn move_by(&mut self, delta: i32, vel: Option<i64>) -> Result<()> {
        if let Some(vel) = vel {
            velocity_arg("positioning velocity", vel)?;
        }
        let pos = self.get_pos()?;
        let target = pos.checked_add(delta).ok_or_else(|| {
            DeviceError::validation(format!("position {pos} + {delta} overflows"))
        })?;
        self.move_to_pos(target, vel)
    }

    /// Run in velocity mode at `vel` in direction `dir`.
    ///
    /// Switching modes stops the device first. So does reversing while
    /// already in velocity mode.
    pub fn set_vel_and_dir(&mut self, vel: i64, dir: Direction) -> Result<()> {
        let vel = velocity_arg("velocity", vel)?;
        info!(vel, %dir, "set velocity and direction");

        if self.get_mode()? != Mode::Velocity {
            self.stop()?;
            self.set_mode(Mode::Velocity)?;
        } else if self.get_dir()? != dir {
            debug!("direction change, stopping first");
            self.stop()?;
        }
        self.set_dir_setpt(dir, Update::Stage)?;
        self.set_vel_setpt(vel.into(), Update::Apply)?;
        self.start()
    }

    /// Ramp the signed velocity to `vel` in direction `dir` at `accel` indices/s².
    ///
    /// The setpoint is rewritten every `step`. Leaves the device running in
    /// velocity mode at exactly the requested velocity.
    pub fn soft_ramp_to_vel(
        &mut self,
        vel: i64,
        dir: Direction,
        accel: f64,
        step: Duration,
    ) -> Result<()> {
        let vel = velocity_arg("velocity", vel)?;
        let accel = check_accel(accel)?;
        let step = check_step(step)?;
        let target = dir.sign() * i64::from(vel);

        if self.get_mode()? == Mode::Position {
            self.stop()?;
            self.set_vel_setpt(0, Update::Apply)?;
            self.set_mode(Mode::Velocity)?;
        }

        let current = self.get_dir()?.sign() * i64::from(self.get_vel()?);
        let Some(ramp) = VelocityRamp::plan(current, target, accel, step) else {
            debug!(current, "already at target velocity");
            return Ok(());
        };
        info!(
            from = current,
            to = target,
            accel,
            steps = ramp.steps(),
            "velocity ramp"
        );

        if self.get_status()? == Status::Stopped {
            self.start()?;
        }
        for setpoint in ramp.setpoints() {
            debug!(
                dir = %setpoint.direction,
                vel = setpoint.magnitude,
                "ramp step"
            );
            self.set_dir_setpt(setpoint.direction, Update::Stage)?;
            self.set_vel_setpt(setpoint.magnitude.into(), Update::Apply)?;
            self.clock.sleep(setpoint.dwell);
        }

        let (dir, vel) = ramp.final_setpoint();
        self.set_dir_setpt(dir, Update::Stage)?;
        self.set_vel_setpt(vel.into(), Update::Apply)?;
        Ok(())
    }

    /// Ramp to `target` with a trapezoidal velocity profile.
    ///
    /// The position setpoint is written once; the positioning velocity is then
    /// recomputed from the measured position every `step` until the position
    /// error is zero. `vel` is the peak velocity, half the cached maximum when
    /// `None`.
    pub fn soft_ramp_to_pos(
        &mut self,
        target: i32,
        accel: f64,
        vel: Option<i64>,
        step: Duration,
    ) -> Result<()> {
        let accel = check_accel(accel)?;
        let step = check_step(step)?;
        let peak = self.peak_velocity(vel)?;

        self.stop()?;
        self.set_mode(Mode::Position)?;
        self.set_pos_setpt(target)?;

        let start = self.get_pos()?;
        let profile = PositionProfile::new(start, target, accel, peak, self.min_vel(), step);
        if profile.distance() == 0 {
            debug!(target, "already at target position");
            return Ok(());
        }
        info!(
            from = start,
            to = target,
            accel,
            peak,
            triangular = profile.is_triangular(),
            "position ramp"
        );

        self.set_pos_vel(profile.floor().into())?;
        self.start()?;

        let mut polls: u64 = 0;
        while self.get_pos_err()? != 0 {
            let pos = self.get_pos()?;
            polls += 1;
            let v = profile.velocity(pos, polls);
            debug!(pos, vel = v, "ramp step");
            self.set_pos_vel(v.into())?;
            self.clock.sleep(step);
        }
        self.stop()
    }

    fn wait_for_position(&mut self) -> Result<()> {
        let interval = self.config.poll_interval;
        while self.get_pos_err()? != 0 {
            self.clock.sleep(interval);
        }
        Ok(())
    }

    /// Given velocity, or half the cached maximum. Must be non-zero.
    fn peak_velocity(&self, vel: Option<i64>) -> Result<u16> {
        let vel = match vel {
            Some(vel) => velocity_arg("positioning velocity", vel)?,
            None => self.max_vel() / 2,
        };
        if vel == 0 {
            return Err(DeviceError::validation("positioning velocity must be > 0"));
        }
        Ok(vel)
    }
}
