//! Pin tags — compact identifiers binding an output slot to a physical pin.
//!
//! A tag packs a GPIO port letter and pin number into one byte. The zero
//! value is reserved as the "unset" marker that terminates sparse pin
//! lists during bank initialization.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Packed GPIO pin identifier: upper nibble = port (A = 1), lower nibble = pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PinTag(u8);

impl PinTag {
    /// The unset marker. Never resolves to hardware.
    pub const NONE: PinTag = PinTag(0);

    /// Build a tag from a port index (0 = GPIOA) and pin number (0..=15).
    pub const fn new(port: u8, pin: u8) -> Self {
        PinTag(((port + 1) << 4) | (pin & 0x0f))
    }

    /// Whether this is the unset marker.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Port index (0 = GPIOA). Meaningless for [`PinTag::NONE`].
    #[inline]
    pub fn port(self) -> u8 {
        debug_assert!(!self.is_none());
        (self.0 >> 4).wrapping_sub(1)
    }

    /// Pin number within the port (0..=15).
    #[inline]
    pub const fn pin(self) -> u8 {
        self.0 & 0x0f
    }
}

impl fmt::Display for PinTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "NONE")
        } else {
            write!(f, "{}{}", (b'A' + self.port()) as char, self.pin())
        }
    }
}

impl FromStr for PinTag {
    type Err = String;

    /// Parse `"A8"`-style tag strings (port letter A-H, pin 0-15) or `"NONE"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("NONE") {
            return Ok(PinTag::NONE);
        }
        let mut chars = s.chars();
        let port = match chars.next() {
            Some(c @ 'A'..='H') => c as u8 - b'A',
            Some(c @ 'a'..='h') => c as u8 - b'a',
            Some(c) => return Err(format!("invalid port letter '{c}' in pin tag '{s}'")),
            None => return Err("empty pin tag".to_string()),
        };
        let pin: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| format!("invalid pin number in pin tag '{s}'"))?;
        if pin > 15 {
            return Err(format!("pin {pin} out of range 0-15 in pin tag '{s}'"));
        }
        Ok(PinTag::new(port, pin))
    }
}

impl Serialize for PinTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PinTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for s in ["A0", "A8", "B10", "C15", "H1"] {
            let tag: PinTag = s.parse().unwrap();
            assert_eq!(tag.to_string(), s);
        }
    }

    #[test]
    fn parse_lowercase() {
        let tag: PinTag = "b4".parse().unwrap();
        assert_eq!(tag, PinTag::new(1, 4));
    }

    #[test]
    fn parse_none_marker() {
        let tag: PinTag = "NONE".parse().unwrap();
        assert!(tag.is_none());
        assert_eq!(tag.to_string(), "NONE");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("".parse::<PinTag>().is_err());
        assert!("X3".parse::<PinTag>().is_err());
        assert!("A16".parse::<PinTag>().is_err());
        assert!("A".parse::<PinTag>().is_err());
        assert!("8A".parse::<PinTag>().is_err());
    }

    #[test]
    fn packed_layout() {
        let tag = PinTag::new(0, 0); // A0
        assert!(!tag.is_none());
        assert_eq!(tag.port(), 0);
        assert_eq!(tag.pin(), 0);

        let tag = PinTag::new(2, 15); // C15
        assert_eq!(tag.port(), 2);
        assert_eq!(tag.pin(), 15);
    }

    #[test]
    fn default_is_unset() {
        assert!(PinTag::default().is_none());
    }

    #[test]
    fn serde_string_form() {
        #[derive(serde::Deserialize)]
        struct Wrap {
            pins: Vec<PinTag>,
        }
        let w: Wrap = toml::from_str(r#"pins = ["A0", "B3", "NONE"]"#).unwrap();
        assert_eq!(w.pins[0], PinTag::new(0, 0));
        assert_eq!(w.pins[1], PinTag::new(1, 3));
        assert!(w.pins[2].is_none());
    }
}
