use serde::Serialize;
use simplestep_transport::DeviceInfo;

use crate::state::{Direction, Enable, Mode, Status};

/// USB string descriptors of the device, where readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InfoStrings {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

impl From<DeviceInfo> for InfoStrings {
    fn from(info: DeviceInfo) -> Self {
        Self {
            manufacturer: info.manufacturer,
            product: info.product,
            serial_number: info.serial_number,
        }
    }
}

/// Every readable field of a controller, read in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub info: InfoStrings,
    pub mode: Mode,
    pub status: Status,
    pub drive: Enable,
    pub position: i32,
    pub velocity: u16,
    pub direction: Direction,
    pub position_error: i32,
    pub max_velocity: u16,
    pub min_velocity: u16,
    pub external_interrupts: Enable,
    pub position_setpoint: i32,
    pub positioning_velocity: u16,
    pub velocity_setpoint: u16,
    pub direction_setpoint: Direction,
}

impl DeviceSnapshot {
    /// Labelled rows in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        vec![
            ("manufacturer", text(&self.info.manufacturer)),
            ("product", text(&self.info.product)),
            ("serial number", text(&self.info.serial_number)),
            ("mode", self.mode.to_string()),
            ("status", self.status.to_string()),
            ("drive", self.drive.to_string()),
            ("position", self.position.to_string()),
            ("velocity", self.velocity.to_string()),
            ("direction", self.direction.to_string()),
            ("position error", self.position_error.to_string()),
            ("max velocity", self.max_velocity.to_string()),
            ("min velocity", self.min_velocity.to_string()),
            ("external interrupts", self.external_interrupts.to_string()),
            ("position setpoint", self.position_setpoint.to_string()),
            ("positioning velocity", self.positioning_velocity.to_string()),
            ("velocity setpoint", self.velocity_setpoint.to_string()),
            ("direction setpoint", self.direction_setpoint.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceSnapshot {
        DeviceSnapshot {
            info: InfoStrings {
                manufacturer: Some("IO Rodeo".into()),
                product: None,
                serial_number: Some("0001".into()),
            },
            mode: Mode::Position,
            status: Status::Running,
            drive: Enable::Enabled,
            position: -120,
            velocity: 400,
            direction: Direction::Negative,
            position_error: 12,
            max_velocity: 50_000,
            min_velocity: 16,
            external_interrupts: Enable::Disabled,
            position_setpoint: -108,
            positioning_velocity: 400,
            velocity_setpoint: 0,
            direction_setpoint: Direction::Positive,
        }
    }

    #[test]
    fn serializes_symbolic_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["mode"], "position");
        assert_eq!(json["direction"], "negative");
        assert_eq!(json["position"], -120);
        assert_eq!(json["info"]["product"], serde_json::Value::Null);
    }

    #[test]
    fn rows_fill_missing_strings() {
        let rows = sample().rows();
        assert_eq!(rows[1], ("product", "-".to_string()));
        assert_eq!(rows.len(), 17);
        assert!(rows.contains(&("status", "running".to_string())));
    }
}
