//! Roll formula composition and the posted roll card.

#![allow(missing_docs)]

use std::collections::HashMap;

use crate::dice::tray::{DiceTray, RollMode};
use crate::event::model::RollSummary;

/// Builds a roll formula from the tray for a particular game system.
pub trait RollComposer: Send + Sync {
    /// `None` when the tray has nothing to roll.
    fn compose(&self, tray: &DiceTray) -> Option<String>;
}

/// System-agnostic composer.
///
/// Formula shape: one term per selected die kind, smallest die first,
/// joined with `" + "`. Advantage appends `kh` and disadvantage `kl`; a
/// single die is promoted to two so keep-highest/lowest has something to
/// choose between. A nonzero modifier is appended as a final `" + {m}"`
/// term, negative values included (`" + -2"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComposer;

impl RollComposer for DefaultComposer {
    fn compose(&self, tray: &DiceTray) -> Option<String> {
        let selection = tray.selection();
        if selection.is_empty() {
            return None;
        }

        let terms: Vec<String> = selection
            .iter()
            .map(|(die, count)| match tray.mode() {
                RollMode::Normal => format!("{count}{die}"),
                RollMode::Advantage => format!("{}{die}kh", promote(*count)),
                RollMode::Disadvantage => format!("{}{die}kl", promote(*count)),
            })
            .collect();

        let mut formula = terms.join(" + ");
        if tray.modifier() != 0 {
            formula.push_str(&format!(" + {}", tray.modifier()));
        }
        Some(formula)
    }
}

const fn promote(count: u32) -> u32 {
    if count == 1 { 2 } else { count }
}

/// Maps game-system keys to composers, falling back to the default.
///
/// Registration replaces an existing entry for the same key.
pub struct ComposerRegistry {
    composers: HashMap<String, Box<dyn RollComposer>>,
    fallback: DefaultComposer,
}

impl Default for ComposerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            composers: HashMap::new(),
            fallback: DefaultComposer,
        }
    }

    pub fn register(&mut self, system_key: &str, composer: Box<dyn RollComposer>) {
        self.composers.insert(system_key.to_string(), composer);
    }

    #[must_use]
    pub fn has(&self, system_key: &str) -> bool {
        self.composers.contains_key(system_key)
    }

    /// Compose via the system's composer, or the default for unknown keys.
    pub fn compose(&self, system_key: &str, tray: &DiceTray) -> Option<String> {
        self.composers
            .get(system_key)
            .map_or_else(|| self.fallback.compose(tray), |c| c.compose(tray))
    }
}

/// The card content posted as a roll event's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollCard {
    pub title: String,
    pub description: String,
    pub dice: Vec<i64>,
    /// `None` when totals are configured hidden.
    pub total: Option<i64>,
}

impl RollCard {
    #[must_use]
    pub fn from_summary(summary: &RollSummary, hide_total: bool) -> Self {
        Self {
            title: "Dice Roll".to_string(),
            description: format!("Rolling {}", summary.formula),
            dice: summary.dice.clone(),
            total: if hide_total { None } else { Some(summary.total) },
        }
    }

    /// Render the card as an event body, one field per line.
    #[must_use]
    pub fn to_body(&self) -> String {
        let mut lines = vec![self.title.clone(), self.description.clone()];
        if !self.dice.is_empty() {
            let faces: Vec<String> = self.dice.iter().map(ToString::to_string).collect();
            lines.push(format!("Dice: {}", faces.join(", ")));
        }
        if let Some(total) = self.total {
            lines.push(format!("Total: {total}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::tray::Die;

    fn tray_with(dice: &[(Die, u32)]) -> DiceTray {
        let mut tray = DiceTray::new();
        for (die, count) in dice {
            for _ in 0..*count {
                tray.add_die(*die);
            }
        }
        tray
    }

    #[test]
    fn single_die_formula() {
        let tray = tray_with(&[(Die::D6, 1)]);
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "1d6");
    }

    #[test]
    fn mixed_dice_join_smallest_first() {
        let tray = tray_with(&[(Die::D20, 1), (Die::D4, 2)]);
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "2d4 + 1d20");
    }

    #[test]
    fn advantage_promotes_single_die() {
        let mut tray = tray_with(&[(Die::D20, 1)]);
        tray.toggle_advantage();
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "2d20kh");
    }

    #[test]
    fn advantage_keeps_larger_counts() {
        let mut tray = tray_with(&[(Die::D20, 3)]);
        tray.toggle_advantage();
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "3d20kh");
    }

    #[test]
    fn disadvantage_uses_keep_lowest() {
        let mut tray = tray_with(&[(Die::D20, 1)]);
        tray.toggle_disadvantage();
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "2d20kl");
    }

    #[test]
    fn positive_modifier_appended() {
        let mut tray = tray_with(&[(Die::D6, 2)]);
        tray.set_modifier(3);
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "2d6 + 3");
    }

    #[test]
    fn negative_modifier_renders_with_sign() {
        let mut tray = tray_with(&[(Die::D6, 2)]);
        tray.set_modifier(-2);
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "2d6 + -2");
    }

    #[test]
    fn zero_modifier_omitted() {
        let tray = tray_with(&[(Die::D8, 1)]);
        assert_eq!(DefaultComposer.compose(&tray).unwrap(), "1d8");
    }

    #[test]
    fn empty_tray_composes_nothing() {
        assert_eq!(DefaultComposer.compose(&DiceTray::new()), None);
    }

    #[test]
    fn registry_falls_back_for_unknown_system() {
        let registry = ComposerRegistry::new();
        let tray = tray_with(&[(Die::D6, 1)]);
        assert_eq!(registry.compose("dnd5e", &tray).unwrap(), "1d6");
    }

    #[test]
    fn registry_uses_registered_composer() {
        struct FlatComposer;
        impl RollComposer for FlatComposer {
            fn compose(&self, _tray: &DiceTray) -> Option<String> {
                Some("1d100".to_string())
            }
        }

        let mut registry = ComposerRegistry::new();
        registry.register("homebrew", Box::new(FlatComposer));
        assert!(registry.has("homebrew"));

        let tray = tray_with(&[(Die::D6, 1)]);
        assert_eq!(registry.compose("homebrew", &tray).unwrap(), "1d100");
        // Other systems still get the default.
        assert_eq!(registry.compose("dnd5e", &tray).unwrap(), "1d6");
    }

    #[test]
    fn roll_card_body_includes_total() {
        let summary = RollSummary {
            formula: "2d6 + 3".to_string(),
            total: 11,
            dice: vec![3, 5],
        };
        let card = RollCard::from_summary(&summary, false);
        assert_eq!(
            card.to_body(),
            "Dice Roll\nRolling 2d6 + 3\nDice: 3, 5\nTotal: 11"
        );
    }

    #[test]
    fn roll_card_body_omits_hidden_total() {
        let summary = RollSummary {
            formula: "1d20".to_string(),
            total: 17,
            dice: vec![17],
        };
        let card = RollCard::from_summary(&summary, true);
        assert_eq!(card.total, None);
        assert!(!card.to_body().contains("Total"));
    }
}
