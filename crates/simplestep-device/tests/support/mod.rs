//! In-memory controller firmware for driving `Device` without hardware.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use simplestep_device::{Clock, Device, DeviceConfig};
use simplestep_frame::command;
use simplestep_transport::{DeviceInfo, Packet, RawTransport, Result};

pub const CTL_UPDATE: u8 = 200;
pub const CTL_NO_UPDATE: u8 = 201;

const UINT8: u8 = 0;
const UINT16: u8 = 1;
const INT32: u8 = 2;

/// One request frame as the firmware saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub cmd: u8,
    pub ctl: u8,
    pub value: i64,
}

#[derive(Debug)]
pub struct SimState {
    pub pos: i64,
    pub pos_setpt: i64,
    pub vel_setpt: u16,
    pub dir_setpt: u8,
    pub pos_vel: u16,
    pub mode: u8,
    pub status: u8,
    pub enable: u8,
    pub ext_int: u8,
    pub dio: u8,
    pub max_vel: u16,
    pub min_vel: u16,

    /// Outputs latched by the last request carrying the update flag.
    pub out_vel: u16,
    pub out_dir: u8,
    pub out_pos_vel: u16,

    pub requests: Vec<Request>,
    pub sleeps: Vec<Duration>,
    /// Number of upcoming reads that return no data.
    pub no_data: u32,
    /// Answer the next request with the wrong command id.
    pub desync: bool,
    pending: Option<Packet>,
    carry: f64,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            pos: 0,
            pos_setpt: 0,
            vel_setpt: 0,
            dir_setpt: 0,
            pos_vel: 0,
            mode: 0,
            status: 0,
            enable: 0,
            ext_int: 0,
            dio: 0,
            max_vel: 50_000,
            min_vel: 16,
            out_vel: 0,
            out_dir: 0,
            out_pos_vel: 0,
            requests: Vec::new(),
            sleeps: Vec::new(),
            no_data: 0,
            desync: false,
            pending: None,
            carry: 0.0,
        }
    }
}

impl SimState {
    fn running(&self) -> bool {
        self.status == 1
    }

    fn pos_err(&self) -> i64 {
        self.pos_setpt - self.pos
    }

    fn actual_vel(&self) -> u16 {
        match (self.running(), self.mode) {
            (false, _) => 0,
            (true, 0) => self.out_vel,
            (true, _) if self.pos_err() == 0 => 0,
            (true, _) => self.out_pos_vel,
        }
    }

    fn actual_dir(&self) -> u8 {
        if self.running() && self.mode == 1 && self.pos_err() != 0 {
            u8::from(self.pos_err() < 0)
        } else {
            self.out_dir
        }
    }

    /// Advance motor motion by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        if !self.running() {
            return;
        }
        let travel = f64::from(self.actual_vel()) * dt.as_secs_f64() + self.carry;
        let whole = travel.floor();
        self.carry = travel - whole;
        let whole = whole as i64;
        if self.mode == 0 {
            let sign = if self.out_dir == 1 { -1 } else { 1 };
            self.pos += sign * whole;
        } else {
            let err = self.pos_err();
            let step = whole.min(err.abs());
            self.pos += err.signum() * step;
            if self.pos_err() == 0 {
                self.carry = 0.0;
            }
        }
    }

    fn latch(&mut self) {
        self.out_vel = self.vel_setpt;
        self.out_dir = self.dir_setpt;
        self.out_pos_vel = self.pos_vel;
    }

    fn handle(&mut self, packet: &Packet) -> Option<Packet> {
        let cmd = packet[0];
        let ctl = packet[1];
        let u8_arg = packet[2];
        let u16_arg = u16::from_le_bytes([packet[2], packet[3]]);
        let i32_arg = i64::from(i32::from_le_bytes([packet[2], packet[3], packet[4], packet[5]]));

        let (tag, value): (u8, i64) = match cmd {
            command::GET_POS => (INT32, self.pos),
            command::SET_POS_SETPT => {
                self.pos_setpt = i32_arg;
                self.requests.push(Request { cmd, ctl, value: i32_arg });
                (INT32, self.pos_setpt)
            }
            command::GET_POS_SETPT => (INT32, self.pos_setpt),
            command::SET_VEL_SETPT => {
                self.vel_setpt = u16_arg.min(self.max_vel);
                self.requests.push(Request { cmd, ctl, value: u16_arg.into() });
                (UINT16, self.vel_setpt.into())
            }
            command::GET_VEL_SETPT => (UINT16, self.vel_setpt.into()),
            command::GET_VEL => (UINT16, self.actual_vel().into()),
            command::SET_DIR_SETPT => {
                if u8_arg <= 1 {
                    self.dir_setpt = u8_arg;
                }
                self.requests.push(Request { cmd, ctl, value: u8_arg.into() });
                (UINT8, self.dir_setpt.into())
            }
            command::GET_DIR_SETPT => (UINT8, self.dir_setpt.into()),
            command::SET_MODE => {
                if u8_arg <= 1 {
                    self.mode = u8_arg;
                }
                self.requests.push(Request { cmd, ctl, value: u8_arg.into() });
                (UINT8, self.mode.into())
            }
            command::GET_MODE => (UINT8, self.mode.into()),
            command::SET_POS_VEL => {
                self.pos_vel = u16_arg.min(self.max_vel);
                self.requests.push(Request { cmd, ctl, value: u16_arg.into() });
                (UINT16, self.pos_vel.into())
            }
            command::GET_POS_VEL => (UINT16, self.pos_vel.into()),
            command::GET_POS_ERR => (INT32, self.pos_err()),
            command::SET_ZERO_POS => {
                self.pos_setpt -= i32_arg;
                self.pos -= i32_arg;
                self.requests.push(Request { cmd, ctl, value: i32_arg });
                (INT32, 0)
            }
            command::GET_MAX_VEL => (UINT16, self.max_vel.into()),
            command::GET_MIN_VEL => (UINT16, self.min_vel.into()),
            command::GET_STATUS => (UINT8, self.status.into()),
            command::SET_STATUS => {
                if u8_arg <= 1 {
                    self.status = u8_arg;
                }
                self.requests.push(Request { cmd, ctl, value: u8_arg.into() });
                (UINT8, self.status.into())
            }
            command::GET_DIR => (UINT8, self.actual_dir().into()),
            command::SET_ENABLE => {
                if u8_arg <= 1 {
                    self.enable = u8_arg;
                }
                self.requests.push(Request { cmd, ctl, value: u8_arg.into() });
                (UINT8, self.enable.into())
            }
            command::GET_ENABLE => (UINT8, self.enable.into()),
            command::SET_DIO_HI | command::SET_DIO_LO => {
                if u8_arg < 8 {
                    if cmd == command::SET_DIO_HI {
                        self.dio |= 1 << u8_arg;
                    } else {
                        self.dio &= !(1 << u8_arg);
                    }
                }
                self.requests.push(Request { cmd, ctl, value: u8_arg.into() });
                (UINT8, 0)
            }
            command::GET_EXT_INT => (UINT8, self.ext_int.into()),
            command::SET_EXT_INT => {
                if u8_arg <= 1 {
                    self.ext_int = u8_arg;
                }
                self.requests.push(Request { cmd, ctl, value: u8_arg.into() });
                (UINT8, self.ext_int.into())
            }
            command::AVR_RESET | command::AVR_DFU_MODE => {
                self.requests.push(Request { cmd, ctl, value: 0 });
                return None;
            }
            command::TEST => (UINT8, 1),
            _ => (UINT8, 0),
        };

        if ctl == CTL_UPDATE {
            self.latch();
        }

        let mut response = [0u8; 8];
        response[0] = if self.desync {
            self.desync = false;
            cmd.wrapping_add(1)
        } else {
            cmd
        };
        response[1] = tag;
        match tag {
            UINT8 => response[2] = value as u8,
            UINT16 => response[2..4].copy_from_slice(&(value as u16).to_le_bytes()),
            _ => response[2..6].copy_from_slice(&(value as i32).to_le_bytes()),
        }
        Some(response)
    }

    /// Set requests for one command, in order.
    pub fn writes_of(&self, cmd: u8) -> Vec<Request> {
        self.requests.iter().copied().filter(|r| r.cmd == cmd).collect()
    }

    /// Command ids of every recorded set request, in order.
    pub fn commands(&self) -> Vec<u8> {
        self.requests.iter().map(|r| r.cmd).collect()
    }
}

pub type Shared = Rc<RefCell<SimState>>;

/// Transport end of the simulator.
pub struct SimTransport {
    pub state: Shared,
    /// Raw packets written, including resends and gets.
    pub frames_written: usize,
}

impl RawTransport for SimTransport {
    fn write(&mut self, packet: &Packet, _timeout: Duration) -> Result<usize> {
        self.frames_written += 1;
        let mut state = self.state.borrow_mut();
        let response = state.handle(packet);
        state.pending = response;
        Ok(packet.len())
    }

    fn read(&mut self, _timeout: Duration) -> Result<Option<Packet>> {
        let mut state = self.state.borrow_mut();
        if state.no_data > 0 {
            state.no_data -= 1;
            state.pending = None;
            return Ok(None);
        }
        Ok(state.pending.take())
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            manufacturer: Some("IO Rodeo".to_string()),
            product: Some("simple step".to_string()),
            serial_number: Some("SIM0001".to_string()),
        }
    }
}

/// Clock that advances the simulated motor instead of sleeping.
pub struct SimClock {
    pub state: Shared,
}

impl Clock for SimClock {
    fn sleep(&mut self, duration: Duration) {
        let mut state = self.state.borrow_mut();
        state.sleeps.push(duration);
        state.advance(duration);
    }
}

/// Build a device over a fresh simulator. The construction-time reads are
/// cleared from the request log.
pub fn sim_device(
    setup: impl FnOnce(&mut SimState),
) -> (Device<SimTransport, SimClock>, Shared) {
    sim_device_with(DeviceConfig::default(), setup)
}

pub fn sim_device_with(
    config: DeviceConfig,
    setup: impl FnOnce(&mut SimState),
) -> (Device<SimTransport, SimClock>, Shared) {
    let state = Shared::default();
    setup(&mut state.borrow_mut());
    let transport = SimTransport {
        state: Rc::clone(&state),
        frames_written: 0,
    };
    let clock = SimClock {
        state: Rc::clone(&state),
    };
    let mut device =
        Device::with_clock(transport, config, clock).expect("device should open on the simulator");
    device.get_mut().frames_written = 0;
    state.borrow_mut().requests.clear();
    (device, state)
}
