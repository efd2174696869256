use std::fmt;

use apdu_core::{CardTransport, TransportError};
use apdu_transport_at::{SerialPortType, available_ports};

/// Parse an APDU typed as hex, ignoring whitespace
pub(crate) fn parse_apdu(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact)
}

/// Send one hex APDU and print the response
pub(crate) fn send_command<T>(
    transport: &mut T,
    input: &str,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: CardTransport,
    T::Error: std::error::Error + 'static,
{
    let apdu = parse_apdu(input)?;
    if apdu.is_empty() {
        return Err("Empty APDU".into());
    }

    let response = transport.transmit_raw(&apdu).map_err(describe)?;
    println!("{}", hex::encode_upper(&response));
    Ok(())
}

/// Operator-facing text for a transport failure
pub(crate) fn describe<E>(err: E) -> String
where
    E: Into<TransportError> + fmt::Display,
{
    let detail = err.to_string();
    let err = err.into();
    match err.device_code() {
        Some(code) => format!("{detail} (CME error code {code})"),
        None if err.is_link_error() => format!("{detail} (link failure)"),
        None => detail,
    }
}

/// List all available serial ports
pub(crate) fn list_ports() -> Result<(), Box<dyn std::error::Error>> {
    let ports = available_ports()?;

    if ports.is_empty() {
        println!("No serial ports found!");
        return Ok(());
    }

    println!("Available ports:");
    for (i, port) in ports.iter().enumerate() {
        let kind = match &port.port_type {
            SerialPortType::UsbPort(usb) => format!(
                "USB {:04x}:{:04x}{}",
                usb.vid,
                usb.pid,
                usb.product
                    .as_deref()
                    .map(|p| format!(" {p}"))
                    .unwrap_or_default()
            ),
            SerialPortType::PciPort => "PCI".to_string(),
            SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            SerialPortType::Unknown => "unknown".to_string(),
        };
        println!("{}. {} ({})", i + 1, port.port_name, kind);
    }

    Ok(())
}
