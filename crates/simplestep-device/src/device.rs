use simplestep_frame::{command, encode_get, Update};
use simplestep_session::Session;
use simplestep_transport::{DeviceInfo, RawTransport};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use crate::snapshot::DeviceSnapshot;
use crate::state::{Direction, Enable, Mode, Status};

/// Highest digital output pin index.
pub const MAX_DIO_PIN: u8 = 7;

/// A handle to one stepper controller.
///
/// Every accessor performs exactly one round trip; nothing is cached except
/// the minimum and maximum velocity, which are read once when the handle is
/// created. Methods take `&mut self`, so a handle serves one caller at a time.
/// Independent handles share no state and may live on different threads.
pub struct Device<T, C = SystemClock> {
    pub(crate) session: Session<T>,
    pub(crate) clock: C,
    pub(crate) config: DeviceConfig,
    max_vel: u16,
    min_vel: u16,
}

impl<T: RawTransport> Device<T> {
    /// Wrap an opened transport and read the velocity limits.
    pub fn new(transport: T, config: DeviceConfig) -> Result<Self> {
        Self::with_clock(transport, config, SystemClock)
    }
}

#[cfg(feature = "usb")]
impl Device<simplestep_transport::UsbTransport> {
    /// Open an attached controller, optionally selecting it by serial number.
    pub fn open(serial: Option<&str>, config: DeviceConfig) -> Result<Self> {
        let transport = simplestep_transport::UsbTransport::open_default(serial)?;
        Self::new(transport, config)
    }
}

impl<T: RawTransport, C: Clock> Device<T, C> {
    /// Like [`Device::new`], with an explicit clock for ramp and poll pauses.
    pub fn with_clock(transport: T, config: DeviceConfig, clock: C) -> Result<Self> {
        let mut device = Self {
            session: Session::with_config(transport, config.session),
            clock,
            config,
            max_vel: 0,
            min_vel: 0,
        };
        device.max_vel = device.get_max_vel()?;
        device.min_vel = device.get_min_vel()?;
        debug!(
            max_vel = device.max_vel,
            min_vel = device.min_vel,
            "velocity limits cached"
        );
        Ok(device)
    }

    /// Maximum velocity read when the handle was created.
    pub fn max_vel(&self) -> u16 {
        self.max_vel
    }

    /// Minimum velocity read when the handle was created.
    pub fn min_vel(&self) -> u16 {
        self.min_vel
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Manufacturer, product and serial strings reported by the transport.
    pub fn device_info(&self) -> DeviceInfo {
        self.session.get_ref().device_info()
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        self.session.get_ref()
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        self.session.get_mut()
    }

    // Position

    /// Current motor position in indices.
    pub fn get_pos(&mut self) -> Result<i32> {
        self.get_i32(command::GET_POS, "position")
    }

    /// Position setpoint tracked in position mode.
    pub fn set_pos_setpt(&mut self, pos: i32) -> Result<i32> {
        let value = self.set(command::SET_POS_SETPT, pos.into(), Update::Apply)?;
        to_i32("position setpoint", value)
    }

    pub fn get_pos_setpt(&mut self) -> Result<i32> {
        self.get_i32(command::GET_POS_SETPT, "position setpoint")
    }

    /// Position setpoint minus current position.
    pub fn get_pos_err(&mut self) -> Result<i32> {
        self.get_i32(command::GET_POS_ERR, "position error")
    }

    /// Shift the coordinate frame so that position `pos` becomes zero.
    ///
    /// The position setpoint shifts with it. The device answers with 0.
    pub fn set_zero_pos(&mut self, pos: i32) -> Result<i32> {
        let value = self.set(command::SET_ZERO_POS, pos.into(), Update::Apply)?;
        to_i32("zero position", value)
    }

    // Velocity

    /// Velocity setpoint magnitude used in velocity mode.
    ///
    /// With [`Update::Stage`] the value is held until the next applied set.
    pub fn set_vel_setpt(&mut self, vel: i64, update: Update) -> Result<u16> {
        let vel = velocity_arg("velocity setpoint", vel)?;
        let value = self.set(command::SET_VEL_SETPT, vel.into(), update)?;
        to_u16("velocity setpoint", value)
    }

    pub fn get_vel_setpt(&mut self) -> Result<u16> {
        self.get_u16(command::GET_VEL_SETPT, "velocity setpoint")
    }

    /// Actual velocity magnitude; see [`Device::get_dir`] for its sign.
    pub fn get_vel(&mut self) -> Result<u16> {
        self.get_u16(command::GET_VEL, "velocity")
    }

    /// Velocity used while tracking the position setpoint.
    pub fn set_pos_vel(&mut self, vel: i64) -> Result<u16> {
        let vel = velocity_arg("positioning velocity", vel)?;
        let value = self.set(command::SET_POS_VEL, vel.into(), Update::Apply)?;
        to_u16("positioning velocity", value)
    }

    pub fn get_pos_vel(&mut self) -> Result<u16> {
        self.get_u16(command::GET_POS_VEL, "positioning velocity")
    }

    /// Read the maximum velocity from the device (uncached).
    pub fn get_max_vel(&mut self) -> Result<u16> {
        self.get_u16(command::GET_MAX_VEL, "maximum velocity")
    }

    /// Read the minimum velocity from the device (uncached).
    pub fn get_min_vel(&mut self) -> Result<u16> {
        self.get_u16(command::GET_MIN_VEL, "minimum velocity")
    }

    // Direction

    /// Direction setpoint used in velocity mode.
    ///
    /// Staging the direction and then applying the velocity changes both
    /// without a moment where only one has taken effect.
    pub fn set_dir_setpt(&mut self, dir: Direction, update: Update) -> Result<Direction> {
        let value = self.set(command::SET_DIR_SETPT, dir.to_wire().into(), update)?;
        Direction::from_wire(value)
    }

    pub fn get_dir_setpt(&mut self) -> Result<Direction> {
        let value = self.session.get(command::GET_DIR_SETPT)?;
        Direction::from_wire(value)
    }

    /// Direction the motor is actually turning.
    pub fn get_dir(&mut self) -> Result<Direction> {
        let value = self.session.get(command::GET_DIR)?;
        Direction::from_wire(value)
    }

    // Mode and status

    pub fn set_mode(&mut self, mode: Mode) -> Result<Mode> {
        let value = self.set(command::SET_MODE, mode.to_wire().into(), Update::Apply)?;
        Mode::from_wire(value)
    }

    pub fn get_mode(&mut self) -> Result<Mode> {
        let value = self.session.get(command::GET_MODE)?;
        Mode::from_wire(value)
    }

    pub fn set_status(&mut self, status: Status) -> Result<Status> {
        let value = self.set(command::SET_STATUS, status.to_wire().into(), Update::Apply)?;
        Status::from_wire(value)
    }

    pub fn get_status(&mut self) -> Result<Status> {
        let value = self.session.get(command::GET_STATUS)?;
        Status::from_wire(value)
    }

    pub fn start(&mut self) -> Result<()> {
        self.set_status(Status::Running).map(drop)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.set_status(Status::Stopped).map(drop)
    }

    // Drive enable

    pub fn set_enable(&mut self, enable: Enable) -> Result<Enable> {
        let value = self.set(command::SET_ENABLE, enable.to_wire().into(), Update::Apply)?;
        Enable::from_wire(value)
    }

    pub fn get_enable(&mut self) -> Result<Enable> {
        let value = self.session.get(command::GET_ENABLE)?;
        Enable::from_wire(value)
    }

    pub fn enable(&mut self) -> Result<()> {
        self.set_enable(Enable::Enabled).map(drop)
    }

    pub fn disable(&mut self) -> Result<()> {
        self.set_enable(Enable::Disabled).map(drop)
    }

    // Digital outputs and external interrupts

    /// Drive digital output `pin` (0-7) high.
    pub fn set_dio_hi(&mut self, pin: u8) -> Result<()> {
        let pin = dio_pin_arg(pin)?;
        self.set(command::SET_DIO_HI, pin.into(), Update::Apply)
            .map(drop)
    }

    /// Drive digital output `pin` (0-7) low.
    pub fn set_dio_lo(&mut self, pin: u8) -> Result<()> {
        let pin = dio_pin_arg(pin)?;
        self.set(command::SET_DIO_LO, pin.into(), Update::Apply)
            .map(drop)
    }

    pub fn set_ext_int(&mut self, ext_int: Enable) -> Result<Enable> {
        let value = self.set(command::SET_EXT_INT, ext_int.to_wire().into(), Update::Apply)?;
        Enable::from_wire(value)
    }

    pub fn get_ext_int(&mut self) -> Result<Enable> {
        let value = self.session.get(command::GET_EXT_INT)?;
        Enable::from_wire(value)
    }

    // Maintenance

    /// Debug round trip; the firmware answers with 1.
    pub fn cmd_test(&mut self) -> Result<u8> {
        let value = self.set(command::TEST, 1, Update::Apply)?;
        u8::try_from(value).map_err(|_| DeviceError::UnexpectedValue {
            field: "test",
            value,
        })
    }

    /// Put the microcontroller into firmware-update (DFU) mode.
    ///
    /// The device stops answering afterwards, so the handle is consumed.
    pub fn enter_dfu_mode(mut self) -> Result<()> {
        info!("entering DFU mode");
        self.session
            .send_only(&encode_get(command::AVR_DFU_MODE))
            .map_err(Into::into)
    }

    /// Reset the microcontroller. The handle is consumed; re-open the device afterwards.
    pub fn reset(mut self) -> Result<()> {
        info!("resetting device");
        self.session
            .send_only(&encode_get(command::AVR_RESET))
            .map_err(Into::into)
    }

    /// Read every field the device exposes.
    pub fn snapshot(&mut self) -> Result<DeviceSnapshot> {
        Ok(DeviceSnapshot {
            info: self.device_info().into(),
            mode: self.get_mode()?,
            status: self.get_status()?,
            drive: self.get_enable()?,
            position: self.get_pos()?,
            velocity: self.get_vel()?,
            direction: self.get_dir()?,
            position_error: self.get_pos_err()?,
            max_velocity: self.get_max_vel()?,
            min_velocity: self.get_min_vel()?,
            external_interrupts: self.get_ext_int()?,
            position_setpoint: self.get_pos_setpt()?,
            positioning_velocity: self.get_pos_vel()?,
            velocity_setpoint: self.get_vel_setpt()?,
            direction_setpoint: self.get_dir_setpt()?,
        })
    }

    fn set(&mut self, command_id: u8, value: i64, update: Update) -> Result<i64> {
        Ok(self.session.set(command_id, value, update)?)
    }

    fn get_i32(&mut self, command_id: u8, field: &'static str) -> Result<i32> {
        let value = self.session.get(command_id)?;
        to_i32(field, value)
    }

    fn get_u16(&mut self, command_id: u8, field: &'static str) -> Result<u16> {
        let value = self.session.get(command_id)?;
        to_u16(field, value)
    }
}

impl<T, C> std::fmt::Debug for Device<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("max_vel", &self.max_vel)
            .field("min_vel", &self.min_vel)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Validate a velocity magnitude argument.
pub(crate) fn velocity_arg(name: &str, vel: i64) -> Result<u16> {
    if vel < 0 {
        return Err(DeviceError::validation(format!(
            "{name} must be >= 0, got {vel}"
        )));
    }
    u16::try_from(vel).map_err(|_| {
        DeviceError::validation(format!("{name} must be <= {}, got {vel}", u16::MAX))
    })
}

fn dio_pin_arg(pin: u8) -> Result<u8> {
    if pin > MAX_DIO_PIN {
        return Err(DeviceError::validation(format!(
            "dio pin must be in 0..={MAX_DIO_PIN}, got {pin}"
        )));
    }
    Ok(pin)
}

fn to_i32(field: &'static str, value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| DeviceError::UnexpectedValue { field, value })
}

fn to_u16(field: &'static str, value: i64) -> Result<u16> {
    u16::try_from(value).map_err(|_| DeviceError::UnexpectedValue { field, value })
}
