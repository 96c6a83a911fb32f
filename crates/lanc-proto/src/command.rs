//! Named RMI commands and product codes.

use bytes::Bytes;

use crate::error::{ProtoError, Result};

/// Named commands as hex-encoded RMI messages.
pub const COMMANDS: &[(&str, &str)] = &[
    ("FAN_MODE_AWAY", "84150101000000000100000000"),
    ("FAN_MODE_LOW", "84150101000000000100000001"),
    ("FAN_MODE_MEDIUM", "84150101000000000100000002"),
    ("FAN_MODE_HIGH", "84150101000000000100000003"),
    ("FAN_BOOST_10M", "84150106000000005802000003"),
    ("FAN_BOOST_20M", "8415010600000000b004000003"),
    ("FAN_BOOST_30M", "84150106000000000807000003"),
    ("FAN_BOOST_60M", "8415010600000000100e000003"),
    ("FAN_BOOST_90M", "84150106000000001815000003"),
    ("FAN_BOOST", "8415010600000000ffffffff03"),
    ("FAN_BOOST_END", "85150106"),
    ("MODE_AUTO", "85150801"),
    ("MODE_MANUAL", "84150801000000000100000001"),
    ("VENTMODE_SUPPLY", "8415060100000000100e000001"),
    ("VENTMODE_BALANCE", "85150601"),
    ("VENTMODE_SUPPLY_OFF", "85150601"),
    ("VENTMODE_EXTRACT", "8415070100000000100e000001"),
    ("VENTMODE_EXTRACT_OFF", "85150701"),
    ("TEMPPROF_NORMAL", "8415030100000000ffffffff00"),
    ("TEMPPROF_COOL", "8415030100000000ffffffff01"),
    ("TEMPPROF_WARM", "8415030100000000ffffffff02"),
    ("BYPASS_ON", "8415020100000000100e000001"),
    ("BYPASS_OFF", "8415020100000000100e000002"),
    ("BYPASS_AUTO", "85150201"),
    ("SENSOR_TEMP_OFF", "031d010400"),
    ("SENSOR_TEMP_AUTO", "031d010401"),
    ("SENSOR_TEMP_ON", "031d010402"),
    ("SENSOR_HUMC_OFF", "031d010600"),
    ("SENSOR_HUMC_AUTO", "031d010601"),
    ("SENSOR_HUMC_ON", "031d010602"),
    ("SENSOR_HUMP_OFF", "031d010700"),
    ("SENSOR_HUMP_AUTO", "031d010701"),
    ("SENSOR_HUMP_ON", "031d010702"),
];

/// Resolve a command name (case-insensitive) to its RMI message bytes.
pub fn lookup_command(name: &str) -> Result<Bytes> {
    let (_, code) = COMMANDS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| ProtoError::UnknownCommand(name.to_string()))?;
    let bytes = hex::decode(code).map_err(|_| ProtoError::UnknownCommand(name.to_string()))?;
    Ok(Bytes::from(bytes))
}

const PRODUCTS: &[(u32, &str)] = &[
    (1, "ComfoAirQ"),
    (2, "ComfoSense"),
    (3, "ComfoSwitch"),
    (4, "OptionBox"),
    (5, "ZehnderGateway"),
    (6, "ComfoCool"),
    (7, "KNXGateway"),
    (8, "Service Tool"),
    (9, "Production test tool"),
    (10, "Design verification test tool"),
];

/// Product label for a node notification's `product_id`.
pub fn product_name(code: u32) -> Option<&'static str> {
    PRODUCTS
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| *name)
}
