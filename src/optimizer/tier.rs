//! Per-tier solvers: the closed-form top tier and the split search used below it.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ChainError, ChainResult};
use crate::optimizer::numeric::Checked;
use crate::optimizer::ranking::first_best;
use crate::optimizer::transition::{retained_mass, tier_coefficients, RECYCLE_RATIO, TOP_TIER};
use crate::optimizer::RunParameters;

/// Per-module bonuses of the module kinds fitted at one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleBonuses {
    pub productivity: Decimal,
    pub quality: Decimal,
}

/// Allocation of a tier's slots between productivity and quality modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Split {
    pub productivity_modules: u32,
    pub quality_modules: u32,
}

impl Split {
    /// Every split with at least one quality module, quality count ascending.
    pub fn with_quality(slots: u32) -> impl Iterator<Item = Split> {
        (1..=slots).map(move |quality_modules| Split {
            productivity_modules: slots - quality_modules,
            quality_modules,
        })
    }

    pub fn all_productivity(slots: u32) -> Split {
        Split {
            productivity_modules: slots,
            quality_modules: 0,
        }
    }
}

/// Optimal expected output for one tier and the split achieving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierResult {
    pub tier: u8,
    pub value: Decimal,
    pub productivity_modules: u32,
    pub quality_modules: u32,
}

impl TierResult {
    fn from_split(tier: u8, value: Decimal, split: Split) -> Self {
        Self {
            tier,
            value,
            productivity_modules: split.productivity_modules,
            quality_modules: split.quality_modules,
        }
    }

    pub fn split(&self) -> Split {
        Split {
            productivity_modules: self.productivity_modules,
            quality_modules: self.quality_modules,
        }
    }
}

/// One candidate split with its convergence divisor. `value` is `None` when the
/// split is infeasible: the divisor is not positive, so the craft/recycle loop
/// diverges, or an upgrade chance exceeds 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitEvaluation {
    pub split: Split,
    pub divisor: Decimal,
    pub value: Option<Decimal>,
}

/// Values already solved, filled strictly from tier 5 downwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedTiers {
    descending: Vec<Decimal>,
}

impl SolvedTiers {
    pub fn new(top: Decimal) -> Self {
        Self {
            descending: vec![top],
        }
    }

    /// Tier whose inputs are now all available, or `None` once tier 1 is done.
    pub fn next_tier(&self) -> Option<u8> {
        let lowest = (TOP_TIER as usize + 1).saturating_sub(self.descending.len());
        (lowest > 1).then(|| lowest as u8 - 1)
    }

    pub fn value(&self, tier: u8) -> Option<Decimal> {
        let index = usize::from(TOP_TIER.checked_sub(tier)?);
        self.descending.get(index).copied()
    }

    pub fn push(&mut self, value: Decimal) {
        self.descending.push(value);
    }
}

/// Tier 5 input is already at top quality, so every slot takes productivity.
pub fn solve_top_tier(params: &RunParameters, productivity_bonus: Decimal) -> ChainResult<TierResult> {
    let checked = Checked::at(TOP_TIER);
    let bonus = checked.mul(productivity_bonus, Decimal::from(params.slots))?;
    let value = checked.add(params.base_productivity, bonus)?;
    info!(tier = TOP_TIER, %value, slots = params.slots, "solved top tier");
    Ok(TierResult::from_split(
        TOP_TIER,
        value,
        Split::all_productivity(params.slots),
    ))
}

/// Evaluate every split with at least one quality module for the next unsolved tier.
pub fn evaluate_splits(
    params: &RunParameters,
    bonuses: ModuleBonuses,
    recycling_bonus: Decimal,
    solved: &SolvedTiers,
) -> ChainResult<(u8, Vec<SplitEvaluation>)> {
    let tier = solved.next_tier().ok_or_else(|| ChainError::InvalidConfig {
        reason: "every tier is already solved".to_string(),
    })?;
    let checked = Checked::at(tier);

    let evaluations = Split::with_quality(params.slots)
        .map(|split| -> ChainResult<SplitEvaluation> {
            let evaluation =
                evaluate_split(checked, tier, split, params, bonuses, recycling_bonus, solved)?;
            match evaluation.value {
                Some(value) => debug!(
                    tier,
                    productivity_modules = split.productivity_modules,
                    quality_modules = split.quality_modules,
                    divisor = %evaluation.divisor,
                    %value,
                    "evaluated split"
                ),
                None => warn!(
                    tier,
                    productivity_modules = split.productivity_modules,
                    quality_modules = split.quality_modules,
                    divisor = %evaluation.divisor,
                    "split is infeasible"
                ),
            }
            Ok(evaluation)
        })
        .collect::<ChainResult<Vec<_>>>()?;
    Ok((tier, evaluations))
}

fn evaluate_split(
    checked: Checked,
    tier: u8,
    split: Split,
    params: &RunParameters,
    bonuses: ModuleBonuses,
    recycling_bonus: Decimal,
    solved: &SolvedTiers,
) -> ChainResult<SplitEvaluation> {
    let productivity = checked.add(
        params.base_productivity,
        checked.mul(bonuses.productivity, Decimal::from(split.productivity_modules))?,
    )?;
    let quality = checked.mul(bonuses.quality, Decimal::from(split.quality_modules))?;

    let divisor = checked.sub(
        checked.div(RECYCLE_RATIO, productivity)?,
        retained_mass(tier, quality, recycling_bonus)?,
    )?;
    if divisor <= Decimal::ZERO || quality > Decimal::ONE || recycling_bonus > Decimal::ONE {
        return Ok(SplitEvaluation {
            split,
            divisor,
            value: None,
        });
    }

    let coefficients = tier_coefficients(tier, quality, recycling_bonus)?;
    let mut numerator = Decimal::ZERO;
    for (target, weight) in &coefficients.downstream {
        let downstream = solved.value(*target).ok_or_else(|| ChainError::InvalidConfig {
            reason: format!("tier {target} must be solved before tier {tier}"),
        })?;
        numerator = checked.add(numerator, checked.mul(*weight, downstream)?)?;
    }
    numerator = checked.add(numerator, coefficients.constant)?;

    Ok(SplitEvaluation {
        split,
        divisor,
        value: Some(checked.div(numerator, divisor)?),
    })
}

/// Best split for the next unsolved tier. Ties keep the split with fewer quality
/// modules; infeasible splits never win.
pub fn solve_tier(
    params: &RunParameters,
    bonuses: ModuleBonuses,
    recycling_bonus: Decimal,
    solved: &SolvedTiers,
) -> ChainResult<TierResult> {
    let (tier, evaluations) = evaluate_splits(params, bonuses, recycling_bonus, solved)?;
    let best = first_best(&evaluations, |evaluation| evaluation.value)
        .and_then(|index| evaluations.get(index))
        .and_then(|evaluation| evaluation.value.map(|value| (value, evaluation.split)));

    match best {
        Some((value, split)) => {
            info!(
                tier,
                %value,
                productivity_modules = split.productivity_modules,
                quality_modules = split.quality_modules,
                "solved tier"
            );
            Ok(TierResult::from_split(tier, value, split))
        }
        None => Err(ChainError::InfeasibleConfiguration {
            tier,
            slots: params.slots,
            divisors: evaluations.iter().map(|evaluation| evaluation.divisor).collect(),
        }),
    }
}
