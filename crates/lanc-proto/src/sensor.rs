//! Sensor (process data) table and value decoding.
//!
//! Each pdid has a fixed value width. The device pushes raw little-endian
//! bytes in `CnRpdoNotification::data`; [`decode_sensor_value`] turns them
//! into a number using the width from [`SENSORS`].

use std::fmt;

use bytes::Bytes;

/// Value width of a sensor, as sent in the subscription request's `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Raw,
    Int8,
    Int16,
    Int32,
    /// Signed 16-bit with one implied decimal place.
    Decimal16,
}

impl SensorKind {
    pub fn code(self) -> u32 {
        match self {
            Self::Raw => 0,
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 3,
            Self::Decimal16 => 6,
        }
    }
}

/// One entry of the sensor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorInfo {
    pub pdid: u32,
    pub kind: SensorKind,
    /// Empty for sensors without a known meaning.
    pub name: &'static str,
}

const fn s(pdid: u32, kind: SensorKind, name: &'static str) -> SensorInfo {
    SensorInfo { pdid, kind, name }
}

use SensorKind::{Decimal16, Int16, Int32, Int8, Raw};

/// Known sensors, ordered by pdid.
pub const SENSORS: &[SensorInfo] = &[
    s(16, Int8, "SENSOR_AWAY_INDICATOR"),
    s(33, Int8, ""),
    s(37, Int8, ""),
    s(49, Int8, "SENSOR_OPERATING_MODE_BIS"),
    s(53, Int8, ""),
    s(56, Int8, "SENSOR_OPERATING_MODE"),
    s(65, Int8, "SENSOR_FAN_SPEED_MODE"),
    s(66, Int8, "SENSOR_BYPASS_ACTIVATION_MODE"),
    s(67, Int8, "SENSOR_TEMPERATURE_PROFILE"),
    s(70, Int8, "SENSOR_FAN_MODE_SUPPLY"),
    s(71, Int8, "SENSOR_FAN_MODE_EXHAUST"),
    s(81, Int32, "SENSOR_FAN_NEXT_CHANGE"),
    s(82, Int32, "SENSOR_BYPASS_NEXT_CHANGE"),
    s(85, Int32, ""),
    s(86, Int32, "SENSOR_SUPPLY_NEXT_CHANGE"),
    s(87, Int32, "SENSOR_EXHAUST_NEXT_CHANGE"),
    s(117, Int8, "SENSOR_FAN_EXHAUST_DUTY"),
    s(118, Int8, "SENSOR_FAN_SUPPLY_DUTY"),
    s(119, Int16, "SENSOR_FAN_EXHAUST_FLOW"),
    s(120, Int16, "SENSOR_FAN_SUPPLY_FLOW"),
    s(121, Int16, "SENSOR_FAN_EXHAUST_SPEED"),
    s(122, Int16, "SENSOR_FAN_SUPPLY_SPEED"),
    s(128, Int16, "SENSOR_POWER_CURRENT"),
    s(129, Int16, "SENSOR_POWER_TOTAL_YEAR"),
    s(130, Int16, "SENSOR_POWER_TOTAL"),
    s(144, Int16, "SENSOR_PREHEATER_POWER_TOTAL_YEAR"),
    s(145, Int16, "SENSOR_PREHEATER_POWER_TOTAL"),
    s(146, Int16, "SENSOR_PREHEATER_POWER_CURRENT"),
    s(176, Int8, "SENSOR_SETTING_RF_PAIRING"),
    s(192, Int16, "SENSOR_DAYS_TO_REPLACE_FILTER"),
    s(208, Int8, ""),
    s(209, Decimal16, "SENSOR_CURRENT_RMOT"),
    s(210, Raw, "SENSOR_HEATING_SEASON"),
    s(211, Raw, "SENSOR_COOLING_SEASON"),
    s(212, Decimal16, "SENSOR_TARGET_TEMPERATURE"),
    s(213, Int16, "SENSOR_AVOIDED_HEATING_CURRENT"),
    s(214, Int16, "SENSOR_AVOIDED_HEATING_TOTAL_YEAR"),
    s(215, Int16, "SENSOR_AVOIDED_HEATING_TOTAL"),
    s(216, Int16, "SENSOR_AVOIDED_COOLING_CURRENT"),
    s(217, Int16, "SENSOR_AVOIDED_COOLING_TOTAL_YEAR"),
    s(218, Int16, "SENSOR_AVOIDED_COOLING_TOTAL"),
    s(219, Int16, "SENSOR_AVOIDED_COOLING_CURRENT_TARGET"),
    s(221, Decimal16, "SENSOR_TEMPERATURE_SUPPLY"),
    s(224, Int8, ""),
    s(225, Int8, "SENSOR_COMFORTCONTROL_MODE"),
    s(226, Int16, "SENSOR_FAN_SPEED_MODE_MODULATED"),
    s(227, Int8, "SENSOR_BYPASS_STATE"),
    s(228, Int8, "SENSOR_FROSTPROTECTION_UNBALANCE"),
    s(274, Decimal16, "SENSOR_TEMPERATURE_EXTRACT"),
    s(275, Decimal16, "SENSOR_TEMPERATURE_EXHAUST"),
    s(276, Decimal16, "SENSOR_TEMPERATURE_OUTDOOR"),
    s(277, Decimal16, "SENSOR_TEMPERATURE_AFTER_PREHEATER"),
    s(290, Int8, "SENSOR_HUMIDITY_EXTRACT"),
    s(291, Int8, "SENSOR_HUMIDITY_EXHAUST"),
    s(292, Int8, "SENSOR_HUMIDITY_OUTDOOR"),
    s(293, Int8, "SENSOR_HUMIDITY_AFTER_PREHEATER"),
    s(294, Int8, "SENSOR_HUMIDITY_SUPPLY"),
    s(321, Int16, ""),
    s(325, Int16, ""),
    s(337, Int32, ""),
    s(338, Int32, ""),
    s(341, Int32, ""),
    s(369, Int8, ""),
    s(370, Int8, ""),
    s(371, Int8, ""),
    s(372, Int8, ""),
    s(384, Decimal16, ""),
    s(386, Raw, ""),
    s(400, Decimal16, ""),
    s(401, Int8, ""),
    s(402, Raw, ""),
    s(416, Decimal16, ""),
    s(417, Decimal16, ""),
    s(418, Int8, ""),
    s(419, Raw, ""),
];

/// Look up a sensor by pdid.
pub fn lookup_sensor(pdid: u32) -> Option<&'static SensorInfo> {
    SENSORS
        .binary_search_by_key(&pdid, |info| info.pdid)
        .ok()
        .map(|idx| &SENSORS[idx])
}

/// A decoded sensor reading.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Integer(i64),
    Decimal(f64),
    /// Unknown width, or fewer bytes than the width needs.
    Raw(Bytes),
}

impl SensorValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Decimal(v) => Some(*v),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v:.1}"),
            Self::Raw(data) => f.write_str(&hex::encode(data)),
        }
    }
}

/// Decode a pushed sensor payload. Unknown pdids yield the raw bytes.
pub fn decode_sensor_value(pdid: u32, data: &[u8]) -> SensorValue {
    let kind = lookup_sensor(pdid).map_or(SensorKind::Raw, |info| info.kind);
    let raw = || SensorValue::Raw(Bytes::copy_from_slice(data));
    match kind {
        SensorKind::Int8 => data
            .first()
            .map_or_else(raw, |b| SensorValue::Integer(i64::from(*b as i8))),
        SensorKind::Int16 => le_i16(data).map_or_else(raw, |v| SensorValue::Integer(i64::from(v))),
        SensorKind::Int32 => data
            .get(..4)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .map_or_else(raw, |b| SensorValue::Integer(i64::from(i32::from_le_bytes(b)))),
        SensorKind::Decimal16 => {
            le_i16(data).map_or_else(raw, |v| SensorValue::Decimal(f64::from(v) / 10.0))
        }
        SensorKind::Raw => raw(),
    }
}

fn le_i16(data: &[u8]) -> Option<i16> {
    let bytes: [u8; 2] = data.get(..2)?.try_into().ok()?;
    Some(i16::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(SENSORS.windows(2).all(|w| w[0].pdid < w[1].pdid));
    }

    #[test]
    fn lookup_known_and_unknown() {
        let info = lookup_sensor(227).unwrap();
        assert_eq!(info.kind, SensorKind::Int8);
        assert_eq!(info.name, "SENSOR_BYPASS_STATE");
        assert!(lookup_sensor(1).is_none());
    }

    #[test]
    fn int8_bypass_state() {
        assert_eq!(decode_sensor_value(227, &[0x64]), SensorValue::Integer(100));
    }

    #[test]
    fn int8_is_signed() {
        assert_eq!(decode_sensor_value(56, &[0xff]), SensorValue::Integer(-1));
    }

    #[test]
    fn int16_little_endian() {
        // 0x2d04 -> 1069 rpm
        assert_eq!(decode_sensor_value(121, &[0x2d, 0x04]), SensorValue::Integer(1069));
    }

    #[test]
    fn int32_little_endian() {
        assert_eq!(
            decode_sensor_value(81, &[0x52, 0x02, 0x00, 0x00]),
            SensorValue::Integer(594)
        );
    }

    #[test]
    fn decimal_temperature() {
        // 0xab00 -> 17.1 C
        assert_eq!(decode_sensor_value(274, &[0xab, 0x00]), SensorValue::Decimal(17.1));
        assert_eq!(decode_sensor_value(276, &[0xf6, 0xff]), SensorValue::Decimal(-1.0));
    }

    #[test]
    fn raw_for_unknown_kind_or_short_data() {
        assert_eq!(
            decode_sensor_value(210, &[1, 2]),
            SensorValue::Raw(Bytes::from_static(&[1, 2]))
        );
        assert_eq!(
            decode_sensor_value(9999, &[7]),
            SensorValue::Raw(Bytes::from_static(&[7]))
        );
        assert_eq!(
            decode_sensor_value(121, &[7]),
            SensorValue::Raw(Bytes::from_static(&[7]))
        );
    }

    #[test]
    fn display_formats() {
        assert_eq!(SensorValue::Integer(42).to_string(), "42");
        assert_eq!(SensorValue::Decimal(17.1).to_string(), "17.1");
        assert_eq!(SensorValue::Raw(Bytes::from_static(&[0xab])).to_string(), "ab");
    }
}
