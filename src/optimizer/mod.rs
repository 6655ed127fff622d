pub mod enumerate;
pub mod grid;
pub(crate) mod numeric;
pub mod ranking;
pub mod tier;
pub mod transition;

pub use enumerate::{enumerate_setup, CandidateRecord, CandidateSet, EnumeratedSolution, TierChoice};
pub use grid::{solve_grid, GridRow, SolutionGrid};
pub use tier::{ModuleBonuses, SolvedTiers, Split, SplitEvaluation, TierResult};
pub use transition::{recycling_bonus, TOP_TIER};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::catalog::{ModuleCatalog, ModuleId};
use crate::error::{ChainError, ChainResult};
use crate::optimizer::tier::{solve_tier, solve_top_tier};

/// Slot capacity and machine base productivity shared by all five tiers of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunParameters {
    pub slots: u32,
    pub base_productivity: Decimal,
}

impl RunParameters {
    pub fn new(slots: u32, base_productivity: Decimal) -> ChainResult<Self> {
        if slots == 0 {
            return Err(ChainError::InvalidCapacity { slots });
        }
        if base_productivity < Decimal::ONE {
            return Err(ChainError::InvalidBaseProductivity {
                value: base_productivity,
            });
        }
        Ok(Self {
            slots,
            base_productivity,
        })
    }
}

/// Result of a fixed-module run: one entry per tier, tier 1 first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSolution {
    pub productivity_module: ModuleId,
    pub quality_module: ModuleId,
    pub productivity_bonus: Decimal,
    pub quality_bonus: Decimal,
    pub recycling_bonus: Decimal,
    pub tiers: Vec<TierResult>,
}

impl ChainSolution {
    pub fn tier(&self, tier: u8) -> Option<&TierResult> {
        self.tiers.iter().find(|result| result.tier == tier)
    }
}

/// Solve tiers 5 down to 1 with the same module kinds everywhere. Returns the
/// results ordered tier 1 first.
pub fn solve_chain(
    params: &RunParameters,
    bonuses: ModuleBonuses,
    recycling_bonus: Decimal,
) -> ChainResult<Vec<TierResult>> {
    let top = solve_top_tier(params, bonuses.productivity)?;
    let mut solved = SolvedTiers::new(top.value);
    let mut results = vec![top];

    while solved.next_tier().is_some() {
        let result = solve_tier(params, bonuses, recycling_bonus, &solved)?;
        solved.push(result.value);
        results.push(result);
    }

    results.reverse();
    Ok(results)
}

/// Fixed-module mode: look up the best available productivity and quality modules
/// and thread each tier's optimum into the next.
pub fn full_setup(
    catalog: &ModuleCatalog,
    params: &RunParameters,
    productivity_module: ModuleId,
    quality_module: ModuleId,
) -> ChainResult<ChainSolution> {
    let bonuses = ModuleBonuses {
        productivity: catalog.productivity(productivity_module)?,
        quality: catalog.quality(quality_module)?,
    };
    let recycling_bonus = transition::recycling_bonus(bonuses.quality)?;
    let tiers = solve_chain(params, bonuses, recycling_bonus)?;

    info!(
        productivity = %productivity_module,
        quality = %quality_module,
        slots = params.slots,
        base_productivity = %params.base_productivity,
        "chain solved"
    );

    Ok(ChainSolution {
        productivity_module,
        quality_module,
        productivity_bonus: bonuses.productivity,
        quality_bonus: bonuses.quality,
        recycling_bonus,
        tiers,
    })
}
