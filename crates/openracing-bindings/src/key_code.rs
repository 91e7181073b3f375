//! Keyboard fallback keys

use std::fmt;
use std::str::FromStr;

use openracing_errors::ConfigurationError;
use serde::{Deserialize, Serialize};

/// A Windows virtual-key code, written as `0xNN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCode(u8);

impl KeyCode {
    pub const W: KeyCode = KeyCode(0x57);
    pub const S: KeyCode = KeyCode(0x53);
    pub const H: KeyCode = KeyCode(0x48);
    pub const C: KeyCode = KeyCode(0x43);

    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Human readable key name, if this is one of the keys the simulator
    /// ships bindings for.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0x20 => "Space",
            0x31 => "1",
            0x32 => "2",
            0x33 => "3",
            0x34 => "4",
            0x35 => "5",
            0x41 => "A",
            0x43 => "C",
            0x44 => "D",
            0x45 => "E",
            0x47 => "G",
            0x48 => "H",
            0x49 => "I",
            0x4A => "J",
            0x4C => "L",
            0x4E => "N",
            0x50 => "P",
            0x51 => "Q",
            0x52 => "R",
            0x53 => "S",
            0x54 => "T",
            0x57 => "W",
            0x59 => "Y",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

impl FromStr for KeyCode {
    type Err = ConfigurationError;

    /// Accepts `0x57`, `0X57` or bare hex digits. A trailing `; comment` is
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.split(';').next().unwrap_or_default().trim();
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);
        u8::from_str_radix(digits, 16)
            .map(KeyCode)
            .map_err(|e| ConfigurationError::InvalidKeyCode(format!("{} ({e})", s.trim())))
    }
}

impl TryFrom<String> for KeyCode {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyCode> for String {
    fn from(key: KeyCode) -> Self {
        key.to_string()
    }
}

/// Parse an optional key value as stored on disk, where `-1` and empty mean
/// "no key".
pub fn parse_optional_key(value: &str) -> Result<Option<KeyCode>, ConfigurationError> {
    let value = value.split(';').next().unwrap_or_default().trim();
    if value.is_empty() || value == "-1" {
        return Ok(None);
    }
    value.parse().map(Some)
}
