//! Serial link to the board
//!
//! Port selection order: `--port`, the config file, the only USB serial
//! port present, then an interactive choice.

use std::time::Duration;

use anyhow::{anyhow, Context};
use dialoguer::Select;
use nes260_hal::{DataBits, Parity, StopBits, UartConfig};
use serialport::{available_ports, SerialPort, SerialPortInfo, SerialPortType};

/// Read timeout; `monitor` and `load` poll in steps of this size
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial ports that look like a USB UART
pub fn usb_ports() -> anyhow::Result<Vec<SerialPortInfo>> {
    let ports = available_ports().context("failed to enumerate serial ports")?;
    Ok(ports.into_iter().filter(is_usb_port).collect())
}

fn is_usb_port(port: &SerialPortInfo) -> bool {
    matches!(port.port_type, SerialPortType::UsbPort(_))
        || port.port_name.contains("USB")
        || port.port_name.contains("usb")
        || port.port_name.contains("COM")
}

/// One-line description for `ports` and the selection prompt
pub fn describe(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => format!(
            "{} [{:04x}:{:04x}] {}",
            port.port_name,
            usb.vid,
            usb.pid,
            usb.product.as_deref().unwrap_or("")
        ),
        _ => port.port_name.clone(),
    }
}

/// Resolve the port name to use
pub fn select_port(preferred: Option<&str>) -> anyhow::Result<String> {
    if let Some(name) = preferred {
        return Ok(name.to_string());
    }

    let ports = usb_ports()?;
    match ports.as_slice() {
        [] => Err(anyhow!(
            "no USB serial ports found; connect the board or pass --port"
        )),
        [port] => {
            println!("Using {}", port.port_name);
            Ok(port.port_name.clone())
        }
        ports => {
            let items: Vec<String> = ports.iter().map(describe).collect();
            let choice = Select::new()
                .with_prompt("Select the board's serial port")
                .items(&items)
                .default(0)
                .interact()
                .context("port selection cancelled")?;
            Ok(ports[choice].port_name.clone())
        }
    }
}

/// Open `name` with the given line settings
pub fn open(name: &str, uart: &UartConfig) -> anyhow::Result<Box<dyn SerialPort>> {
    serialport::new(name, uart.baudrate)
        .data_bits(data_bits(uart.data_bits))
        .parity(parity(uart.parity))
        .stop_bits(stop_bits(uart.stop_bits))
        .timeout(READ_TIMEOUT)
        .open()
        .with_context(|| format!("failed to open {}", name))
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb(name: &str) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x0403,
                pid: 0x6011,
                serial_number: None,
                manufacturer: None,
                product: Some("KV260".to_string()),
            }),
        }
    }

    #[test]
    fn test_usb_detection() {
        assert!(is_usb_port(&usb("/dev/ttyUSB1")));
        assert!(is_usb_port(&SerialPortInfo {
            port_name: "COM4".to_string(),
            port_type: SerialPortType::Unknown,
        }));
        assert!(!is_usb_port(&SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::Unknown,
        }));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&usb("/dev/ttyUSB1")), "/dev/ttyUSB1 [0403:6011] KV260");
    }

    #[test]
    fn test_explicit_port_wins() {
        assert_eq!(select_port(Some("/dev/ttyUSB3")).unwrap(), "/dev/ttyUSB3");
    }

    #[test]
    fn test_line_settings_map() {
        assert_eq!(data_bits(DataBits::Eight), serialport::DataBits::Eight);
        assert_eq!(parity(Parity::Odd), serialport::Parity::Odd);
        assert_eq!(stop_bits(StopBits::Two), serialport::StopBits::Two);
    }
}
