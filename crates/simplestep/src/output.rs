use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use simplestep_device::DeviceSnapshot;
use simplestep_transport::DeviceInfo;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ListedDevice<'a> {
    index: usize,
    manufacturer: Option<&'a str>,
    product: Option<&'a str>,
    serial_number: Option<&'a str>,
}

pub fn print_snapshot(snapshot: &DeviceSnapshot, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(snapshot),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in snapshot.rows() {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let rows = snapshot.rows();
            let width = rows.iter().map(|(field, _)| field.len()).max().unwrap_or(0);
            for (field, value) in rows {
                println!("  {:<width$}  {value}", format!("{field}:"), width = width + 1);
            }
        }
    }
}

pub fn print_devices(devices: &[DeviceInfo], format: OutputFormat) {
    let listed: Vec<ListedDevice<'_>> = devices
        .iter()
        .enumerate()
        .map(|(index, info)| ListedDevice {
            index,
            manufacturer: info.manufacturer.as_deref(),
            product: info.product.as_deref(),
            serial_number: info.serial_number.as_deref(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&listed),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "MANUFACTURER", "PRODUCT", "SERIAL"]);
            for device in &listed {
                table.add_row(vec![
                    device.index.to_string(),
                    or_dash(device.manufacturer),
                    or_dash(device.product),
                    or_dash(device.serial_number),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if listed.is_empty() {
                println!("no devices found");
            }
            for device in &listed {
                println!(
                    "{}: {} {} (serial {})",
                    device.index,
                    or_dash(device.manufacturer),
                    or_dash(device.product),
                    or_dash(device.serial_number)
                );
            }
        }
    }
}

/// Print a single named field, e.g. the result of a get command.
pub fn print_field(name: &str, value: impl Serialize + std::fmt::Display, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut map = serde_json::Map::new();
            map.insert(
                name.to_string(),
                serde_json::to_value(&value).unwrap_or(serde_json::Value::Null),
            );
            print_json(&map);
        }
        OutputFormat::Table | OutputFormat::Pretty => println!("{name}: {value}"),
    }
}

fn print_json(value: &impl Serialize) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
