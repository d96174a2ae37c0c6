//! Dice formula evaluation.
//!
//! Accepts the formula dialect the composer emits: `NdS` terms with an
//! optional `kh`/`kl` suffix and integer modifiers, joined by `" + "`.

#![allow(missing_docs)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::errors::{HudError, Result};
use crate::event::model::RollSummary;

/// Evaluates a composed formula into faces and a total.
pub trait RollEvaluator: Send {
    fn evaluate(&mut self, formula: &str) -> Result<RollSummary>;
}

const MAX_COUNT: u32 = 1_000;
const MAX_SIDES: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
    Highest,
    Lowest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Dice {
        count: u32,
        sides: u32,
        keep: Option<Keep>,
    },
    Modifier(i64),
}

/// RNG-backed evaluator. `kh`/`kl` keeps a single highest/lowest die; the
/// summary records every rolled face either way.
#[derive(Debug)]
pub struct DiceEvaluator {
    rng: StdRng,
}

impl Default for DiceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic evaluator for tests and scripted demos.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RollEvaluator for DiceEvaluator {
    fn evaluate(&mut self, formula: &str) -> Result<RollSummary> {
        let trimmed = formula.trim();
        let terms = parse_formula(trimmed)?;

        let mut dice = Vec::new();
        let mut total: i64 = 0;

        for term in terms {
            match term {
                Term::Modifier(modifier) => total += modifier,
                Term::Dice { count, sides, keep } => {
                    let mut faces = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        faces.push(i64::from(self.rng.random_range(1..=sides)));
                    }
                    let value = match keep {
                        None => faces.iter().sum(),
                        Some(Keep::Highest) => faces.iter().copied().max().unwrap_or(0),
                        Some(Keep::Lowest) => faces.iter().copied().min().unwrap_or(0),
                    };
                    total += value;
                    dice.extend(faces);
                }
            }
        }

        Ok(RollSummary {
            formula: trimmed.to_string(),
            total,
            dice,
        })
    }
}

fn parse_formula(formula: &str) -> Result<Vec<Term>> {
    if formula.is_empty() {
        return Err(invalid(formula, "empty formula"));
    }

    formula
        .split(" + ")
        .map(|raw| parse_term(formula, raw.trim()))
        .collect()
}

fn parse_term(formula: &str, term: &str) -> Result<Term> {
    if term.is_empty() {
        return Err(invalid(formula, "empty term"));
    }

    // Plain integers (including negative) are modifiers.
    if let Ok(modifier) = term.parse::<i64>() {
        return Ok(Term::Modifier(modifier));
    }

    let Some((count_str, rest)) = term.split_once('d') else {
        return Err(invalid(formula, &format!("unrecognized term {term:?}")));
    };

    let count = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse::<u32>()
            .map_err(|_| invalid(formula, &format!("bad die count in {term:?}")))?
    };

    let (sides_str, keep) = if let Some(stripped) = rest.strip_suffix("kh") {
        (stripped, Some(Keep::Highest))
    } else if let Some(stripped) = rest.strip_suffix("kl") {
        (stripped, Some(Keep::Lowest))
    } else {
        (rest, None)
    };

    let sides = sides_str
        .parse::<u32>()
        .map_err(|_| invalid(formula, &format!("bad die size in {term:?}")))?;

    if count == 0 || count > MAX_COUNT {
        return Err(invalid(
            formula,
            &format!("die count must be in 1..={MAX_COUNT}, got {count}"),
        ));
    }
    if sides == 0 || sides > MAX_SIDES {
        return Err(invalid(
            formula,
            &format!("die size must be in 1..={MAX_SIDES}, got {sides}"),
        ));
    }

    Ok(Term::Dice { count, sides, keep })
}

fn invalid(formula: &str, details: &str) -> HudError {
    HudError::Evaluation {
        formula: formula.to_string(),
        details: details.to_string(),
    }
}
