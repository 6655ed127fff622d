//! Module identifiers of the form `T<tier>Q<quality>`, e.g. `T3Q5`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Highest module tier in the catalog.
pub const MAX_MODULE_TIER: u8 = 3;
/// Highest quality level a module can be crafted at.
pub const MAX_MODULE_QUALITY: u8 = 5;

/// Which bonus table an identifier is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Productivity,
    Quality,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Productivity => write!(f, "productivity"),
            Self::Quality => write!(f, "quality"),
        }
    }
}

/// A (tier, quality level) pair. `T0Q0` stands for "no productivity module".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub tier: u8,
    pub quality: u8,
}

impl ModuleId {
    pub const NONE: ModuleId = ModuleId { tier: 0, quality: 0 };

    pub const fn new(tier: u8, quality: u8) -> Self {
        Self { tier, quality }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}Q{}", self.tier, self.quality)
    }
}

/// Returned when text is not shaped like `T<digit>Q<digit>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a module identifier (expected e.g. T3Q5)")]
pub struct ParseModuleIdError(pub String);

impl FromStr for ModuleId {
    type Err = ParseModuleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let bytes = normalized.as_bytes();
        let parsed = match bytes {
            [b'T', tier @ b'0'..=b'9', b'Q', quality @ b'0'..=b'9'] => {
                Some(ModuleId::new(tier - b'0', quality - b'0'))
            }
            _ => None,
        };
        match parsed {
            Some(id) if id.is_none() => Ok(id),
            Some(id)
                if (1..=MAX_MODULE_TIER).contains(&id.tier)
                    && (1..=MAX_MODULE_QUALITY).contains(&id.quality) =>
            {
                Ok(id)
            }
            _ => Err(ParseModuleIdError(s.to_string())),
        }
    }
}

impl Serialize for ModuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("t3q5".parse::<ModuleId>(), Ok(ModuleId::new(3, 5)));
        assert_eq!(" T1Q2 ".parse::<ModuleId>(), Ok(ModuleId::new(1, 2)));
        assert_eq!("T0Q0".parse::<ModuleId>(), Ok(ModuleId::NONE));
    }

    #[test]
    fn rejects_out_of_range_and_malformed() {
        for raw in ["T4Q1", "T1Q6", "T0Q1", "T1Q0", "Q3T5", "T3Q55", "", "legendary"] {
            assert!(raw.parse::<ModuleId>().is_err(), "{raw} should not parse");
        }
        let err = "T9Q9".parse::<ModuleId>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'T9Q9' is not a module identifier (expected e.g. T3Q5)"
        );
    }

    #[test]
    fn display_round_trips_through_json() {
        let id = ModuleId::new(2, 4);
        assert_eq!(id.to_string(), "T2Q4");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"T2Q4\"");
        let back: ModuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
