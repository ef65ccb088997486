//! Canned meter-protocol responder.
//!
//! No frames are decoded. Each command is matched on protocol name and
//! command prefix and answered from a fixed table; DLMS `GET` requests for
//! a handful of OBIS codes read the current measurements. Every call is
//! independent of every other call.

use metersim_types::Measurements;

/// OBIS code for cumulative active energy import.
pub const OBIS_ENERGY: &str = "1.0.1.8.0.255";
/// OBIS code for L1 voltage.
pub const OBIS_VOLTAGE: &str = "1.0.32.7.0.255";
/// OBIS code for L1 current.
pub const OBIS_CURRENT: &str = "1.0.31.7.0.255";
/// OBIS code for line frequency.
pub const OBIS_FREQUENCY: &str = "1.0.14.7.0.255";

/// Fixed Modbus RTU read-holding-registers reply.
pub const MODBUS_RTU_RESPONSE: &str = "01 03 02 0C 35 A1";
/// Fixed Modbus TCP read-holding-registers reply.
pub const MODBUS_TCP_RESPONSE: &str = "00 01 00 00 00 05 01 03 02 0C 35";
/// IEC 62056-21 identification message.
pub const IEC62056_IDENTIFICATION: &str = "/SMT5\\2@1234567890";
/// IEC 62056-21 register readout.
pub const IEC62056_READOUT: &str = "1.8.0(12345.678*kWh)\r\n2.8.0(0.000*kWh)\r\n!";

/// Generic acknowledgement for anything without a specific reply.
pub const OK_RESPONSE: &str = "OK";

/// Protocols with a dedicated response table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// DLMS/COSEM.
    Dlms,
    /// Modbus over a serial line.
    ModbusRtu,
    /// Modbus over TCP.
    ModbusTcp,
    /// IEC 62056-21 optical port.
    Iec62056,
}

impl Protocol {
    /// Look up a protocol by its wire name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dlms" => Some(Self::Dlms),
            "modbus-rtu" => Some(Self::ModbusRtu),
            "modbus-tcp" => Some(Self::ModbusTcp),
            "iec62056" => Some(Self::Iec62056),
            _ => None,
        }
    }
}

/// Compute the reply to `command` sent over `protocol`.
///
/// Unknown protocols are acknowledged with `"OK"`.
pub fn respond(protocol: &str, command: &str, measurements: &Measurements) -> String {
    match Protocol::from_name(protocol) {
        Some(Protocol::Dlms) => respond_dlms(command, measurements),
        Some(Protocol::ModbusRtu) => MODBUS_RTU_RESPONSE.to_owned(),
        Some(Protocol::ModbusTcp) => MODBUS_TCP_RESPONSE.to_owned(),
        Some(Protocol::Iec62056) => respond_iec62056(command).to_owned(),
        None => OK_RESPONSE.to_owned(),
    }
}

fn respond_dlms(command: &str, measurements: &Measurements) -> String {
    if command.starts_with("GET") {
        return command
            .split_whitespace()
            .nth(1)
            .and_then(|obis| read_obis(obis, measurements).map(|value| (obis, value)))
            .map_or_else(
                || "ERROR: OBIS code not found".to_owned(),
                |(obis, value)| format!("DLMS Response: {obis} = {value}"),
            );
    }
    if command.starts_with("SET") {
        return "OK: Value set".to_owned();
    }
    "ERROR: Invalid DLMS command".to_owned()
}

/// Format the register value for a known OBIS code as `<value>*<unit>`.
fn read_obis(obis: &str, m: &Measurements) -> Option<String> {
    match obis {
        OBIS_ENERGY => Some(format!("{:.3}*kWh", m.energy)),
        OBIS_VOLTAGE => Some(format!("{:.2}*V", m.voltage_rms)),
        OBIS_CURRENT => Some(format!("{:.3}*A", m.current_rms)),
        OBIS_FREQUENCY => Some(format!("{:.2}*Hz", m.frequency)),
        _ => None,
    }
}

fn respond_iec62056(command: &str) -> &'static str {
    if command == "/?!" {
        IEC62056_IDENTIFICATION
    } else if command.starts_with('R') {
        IEC62056_READOUT
    } else {
        OK_RESPONSE
    }
}
