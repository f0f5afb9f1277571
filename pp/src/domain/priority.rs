//! Priority levels for task scheduling

use serde::{Deserialize, Serialize};

/// Task urgency on a 0-10 scale, higher is more urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(u8);

impl Priority {
    /// Highest accepted priority
    pub const MAX: u8 = 10;

    /// Lowest priority that counts as "high"
    pub const HIGH_THRESHOLD: u8 = 8;

    /// Create a priority, clamping to the 0-10 scale
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// Raw priority value
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_high(self) -> bool {
        self.0 >= Self::HIGH_THRESHOLD
    }

    /// Whether the value is on the 0-10 scale (deserialized values are not clamped)
    pub fn is_valid(self) -> bool {
        self.0 <= Self::MAX
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(5)
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u8>() {
            Ok(value) if value <= Self::MAX => Ok(Self(value)),
            _ => Err(format!("Unknown priority: {} (expected 0-10)", s)),
        }
    }
}
