//! Tie-break policy for timed events that share a due time.
//!
//! The policy only reorders events *within* a run of equal due times; events
//! with different due times always dispatch earliest first.

use std::str::FromStr;

/// How the event queue orders timed events with identical due times.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OrderingMode {
    /// Insertion order is preserved (insert after the tied run).
    #[default]
    Fifo,
    /// Insertion order is reversed (insert before the tied run).
    Lifo,
    /// Insert at a uniformly random position within the tied run.
    Random,
}

impl OrderingMode {
    /// Human-readable label, useful for log fields and CLI values.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderingMode::Fifo   => "fifo",
            OrderingMode::Lifo   => "lifo",
            OrderingMode::Random => "random",
        }
    }
}

impl std::fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo"   => Ok(OrderingMode::Fifo),
            "lifo"   => Ok(OrderingMode::Lifo),
            "random" => Ok(OrderingMode::Random),
            other    => Err(format!("unknown ordering mode `{other}`")),
        }
    }
}
