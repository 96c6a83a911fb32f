//! 16-byte identifiers carried in every frame header.
//!
//! Both the local app and the device are addressed by an opaque 16-byte
//! UUID. The textual form is 32 lowercase hex characters with no dashes,
//! which is how the identifiers appear in settings files and logs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FrameError;

/// Size of an identifier in bytes.
pub const UUID_SIZE: usize = 16;

/// Identifier of a LAN C endpoint (local app or device).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceUuid([u8; UUID_SIZE]);

impl DeviceUuid {
    /// The all-zero identifier.
    pub const NIL: Self = Self([0u8; UUID_SIZE]);

    /// Wrap raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; UUID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build an identifier from a slice that must be exactly 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FrameError> {
        let arr: [u8; UUID_SIZE] = bytes.try_into().map_err(|_| {
            FrameError::InvalidUuid(format!("expected {UUID_SIZE} bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Raw identifier bytes.
    pub const fn as_bytes(&self) -> &[u8; UUID_SIZE] {
        &self.0
    }

    /// Returns true for the all-zero identifier.
    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; UUID_SIZE]
    }
}

impl FromStr for DeviceUuid {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != UUID_SIZE * 2 {
            return Err(FrameError::InvalidUuid(format!(
                "expected {} hex characters, got {}",
                UUID_SIZE * 2,
                s.len()
            )));
        }
        let mut out = [0u8; UUID_SIZE];
        hex::decode_to_slice(s, &mut out).map_err(|err| FrameError::InvalidUuid(err.to_string()))?;
        Ok(Self(out))
    }
}

impl fmt::Display for DeviceUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DeviceUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceUuid({self})")
    }
}

impl From<[u8; UUID_SIZE]> for DeviceUuid {
    fn from(bytes: [u8; UUID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl Serialize for DeviceUuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceUuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let uuid: DeviceUuid = "00000000000910138001144fd71e13cb".parse().unwrap();
        assert_eq!(uuid.as_bytes()[5], 0x09);
        assert_eq!(uuid.as_bytes()[15], 0xcb);
        assert_eq!(uuid.to_string(), "00000000000910138001144fd71e13cb");
    }

    #[test]
    fn parse_accepts_uppercase() {
        let uuid: DeviceUuid = "00000000000000000000000000000ABC".parse().unwrap();
        assert_eq!(uuid.to_string(), "00000000000000000000000000000abc");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let err = "0005".parse::<DeviceUuid>().unwrap_err();
        assert!(matches!(err, FrameError::InvalidUuid(_)));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let err = "zz000000000000000000000000000005"
            .parse::<DeviceUuid>()
            .unwrap_err();
        assert!(matches!(err, FrameError::InvalidUuid(_)));
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(DeviceUuid::from_slice(&[1u8; 16]).is_ok());
        assert!(DeviceUuid::from_slice(&[1u8; 15]).is_err());
    }

    #[test]
    fn serde_uses_hex_string() {
        let uuid: DeviceUuid = "00000000000000000000000000000005".parse().unwrap();
        let json = serde_json::to_string(&uuid).unwrap();
        assert_eq!(json, "\"00000000000000000000000000000005\"");
        let back: DeviceUuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uuid);
    }

    #[test]
    fn nil_detection() {
        assert!(DeviceUuid::NIL.is_nil());
        assert!(!DeviceUuid::from_bytes([1u8; 16]).is_nil());
    }
}
