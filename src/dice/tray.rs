//! Dice tray: the selection a user builds up before rolling.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::HudError;

/// The standard die set offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Die {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl Die {
    pub const ALL: [Self; 7] = [
        Self::D4,
        Self::D6,
        Self::D8,
        Self::D10,
        Self::D12,
        Self::D20,
        Self::D100,
    ];

    #[must_use]
    pub const fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
        }
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl FromStr for Die {
    type Err = HudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d4" => Ok(Self::D4),
            "d6" => Ok(Self::D6),
            "d8" => Ok(Self::D8),
            "d10" => Ok(Self::D10),
            "d12" => Ok(Self::D12),
            "d20" => Ok(Self::D20),
            "d100" => Ok(Self::D100),
            other => Err(HudError::Evaluation {
                formula: other.to_string(),
                details: "unknown die".to_string(),
            }),
        }
    }
}

/// Advantage state of the tray. Advantage and disadvantage are mutually
/// exclusive; activating one clears the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

/// Per-die counts plus modifier and advantage state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTray {
    counts: BTreeMap<Die, u32>,
    modifier: i64,
    mode: RollMode,
}

impl DiceTray {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one die of the given kind.
    pub fn add_die(&mut self, die: Die) {
        *self.counts.entry(die).or_insert(0) += 1;
    }

    /// Remove one die of the given kind; floors at zero.
    pub fn remove_die(&mut self, die: Die) {
        if let Some(count) = self.counts.get_mut(&die) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&die);
            }
        }
    }

    #[must_use]
    pub fn count(&self, die: Die) -> u32 {
        self.counts.get(&die).copied().unwrap_or(0)
    }

    /// Total number of selected dice across all kinds.
    #[must_use]
    pub fn total_dice(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn set_modifier(&mut self, modifier: i64) {
        self.modifier = modifier;
    }

    pub fn bump_modifier(&mut self, delta: i64) {
        self.modifier = self.modifier.saturating_add(delta);
    }

    #[must_use]
    pub const fn modifier(&self) -> i64 {
        self.modifier
    }

    /// Toggle advantage; clears disadvantage if it was active.
    pub fn toggle_advantage(&mut self) {
        self.mode = if self.mode == RollMode::Advantage {
            RollMode::Normal
        } else {
            RollMode::Advantage
        };
    }

    /// Toggle disadvantage; clears advantage if it was active.
    pub fn toggle_disadvantage(&mut self) {
        self.mode = if self.mode == RollMode::Disadvantage {
            RollMode::Normal
        } else {
            RollMode::Disadvantage
        };
    }

    #[must_use]
    pub const fn mode(&self) -> RollMode {
        self.mode
    }

    /// Clear dice, modifier, and advantage state.
    pub fn reset(&mut self) {
        self.counts.clear();
        self.modifier = 0;
        self.mode = RollMode::Normal;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Selected dice with nonzero counts, smallest die first.
    #[must_use]
    pub fn selection(&self) -> Vec<(Die, u32)> {
        self.counts.iter().map(|(die, count)| (*die, *count)).collect()
    }
}
