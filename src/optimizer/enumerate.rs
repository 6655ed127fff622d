//! Enumerate-all mode: every tier independently tries every (productivity,
//! quality) candidate pair, records all of them, and passes only the winner down.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{ModuleCatalog, ModuleId, ModuleKind};
use crate::error::{ChainError, ChainResult};
use crate::optimizer::ranking::first_best;
use crate::optimizer::tier::{solve_tier, solve_top_tier, ModuleBonuses, SolvedTiers, TierResult};
use crate::optimizer::transition::{self, TOP_TIER};
use crate::optimizer::RunParameters;

/// Module identifiers to pair up. Order is kept and decides ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub productivity: Vec<ModuleId>,
    pub quality: Vec<ModuleId>,
}

impl CandidateSet {
    pub fn new(productivity: Vec<ModuleId>, quality: Vec<ModuleId>) -> Self {
        Self {
            productivity,
            quality,
        }
    }

    pub fn singleton(productivity: ModuleId, quality: ModuleId) -> Self {
        Self::new(vec![productivity], vec![quality])
    }

    /// Every productivity and quality module in the catalog.
    pub fn whole_catalog(catalog: &ModuleCatalog) -> Self {
        Self::new(
            catalog.ids(ModuleKind::Productivity),
            catalog.ids(ModuleKind::Quality),
        )
    }
}

/// One evaluated candidate. `outcome` is `None` when every split diverged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub tier: u8,
    pub productivity_module: ModuleId,
    /// Tier 5 ignores quality modules, so its records carry none.
    pub quality_module: Option<ModuleId>,
    pub outcome: Option<TierResult>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierChoice {
    pub productivity_module: ModuleId,
    pub quality_module: Option<ModuleId>,
    pub result: TierResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumeratedSolution {
    pub recycling_bonus: Decimal,
    /// Winning choice per tier, tier 1 first.
    pub tiers: Vec<TierChoice>,
    /// Every candidate evaluated, tier 5 first, in evaluation order.
    pub records: Vec<CandidateRecord>,
}

impl EnumeratedSolution {
    pub fn tier(&self, tier: u8) -> Option<&TierChoice> {
        self.tiers.iter().find(|choice| choice.result.tier == tier)
    }

    pub fn tier_results(&self) -> Vec<TierResult> {
        self.tiers.iter().map(|choice| choice.result).collect()
    }
}

fn resolve_all(
    catalog: &ModuleCatalog,
    kind: ModuleKind,
    ids: &[ModuleId],
) -> ChainResult<Vec<(ModuleId, Decimal)>> {
    if ids.is_empty() {
        return Err(ChainError::EmptyCandidateSet { kind });
    }
    ids.iter()
        .map(|id| -> ChainResult<(ModuleId, Decimal)> { Ok((*id, catalog.bonus(kind, *id)?)) })
        .collect()
}

/// Mark the winner among `records[start..]` and return it as a choice.
fn select(records: &mut [CandidateRecord], start: usize) -> Option<TierChoice> {
    let window = &mut records[start..];
    let index = first_best(window, |record| record.outcome.map(|outcome| outcome.value))?;
    let record = &mut window[index];
    record.selected = true;
    Some(TierChoice {
        productivity_module: record.productivity_module,
        quality_module: record.quality_module,
        result: record.outcome?,
    })
}

pub fn enumerate_setup(
    catalog: &ModuleCatalog,
    params: &RunParameters,
    candidates: &CandidateSet,
) -> ChainResult<EnumeratedSolution> {
    let productivity = resolve_all(catalog, ModuleKind::Productivity, &candidates.productivity)?;
    let quality = resolve_all(catalog, ModuleKind::Quality, &candidates.quality)?;

    let best_quality = quality
        .iter()
        .map(|(_, bonus)| *bonus)
        .max()
        .unwrap_or(Decimal::ZERO);
    let recycling_bonus = transition::recycling_bonus(best_quality)?;

    let mut records = Vec::with_capacity(productivity.len() * (1 + 4 * quality.len()));
    let mut choices = Vec::with_capacity(usize::from(TOP_TIER));

    for (module, bonus) in &productivity {
        let outcome = solve_top_tier(params, *bonus)?;
        records.push(CandidateRecord {
            tier: TOP_TIER,
            productivity_module: *module,
            quality_module: None,
            outcome: Some(outcome),
            selected: false,
        });
    }
    let top = select(&mut records, 0).ok_or(ChainError::EmptyCandidateSet {
        kind: ModuleKind::Productivity,
    })?;
    let mut solved = SolvedTiers::new(top.result.value);
    choices.push(top);

    while let Some(tier) = solved.next_tier() {
        let start = records.len();
        let mut first_failure: Option<ChainError> = None;

        for (productivity_module, productivity_bonus) in &productivity {
            for (quality_module, quality_bonus) in &quality {
                let bonuses = ModuleBonuses {
                    productivity: *productivity_bonus,
                    quality: *quality_bonus,
                };
                let outcome = match solve_tier(params, bonuses, recycling_bonus, &solved) {
                    Ok(result) => Some(result),
                    Err(err @ ChainError::InfeasibleConfiguration { .. }) => {
                        warn!(
                            tier,
                            productivity = %productivity_module,
                            quality = %quality_module,
                            "candidate pair has no convergent split"
                        );
                        first_failure.get_or_insert(err);
                        None
                    }
                    Err(err) => return Err(err),
                };
                records.push(CandidateRecord {
                    tier,
                    productivity_module: *productivity_module,
                    quality_module: Some(*quality_module),
                    outcome,
                    selected: false,
                });
            }
        }

        let Some(choice) = select(&mut records, start) else {
            return Err(first_failure.unwrap_or(ChainError::InfeasibleConfiguration {
                tier,
                slots: params.slots,
                divisors: Vec::new(),
            }));
        };
        info!(
            tier,
            productivity = %choice.productivity_module,
            quality = ?choice.quality_module.map(|id| id.to_string()),
            value = %choice.result.value,
            "selected candidate pair"
        );
        solved.push(choice.result.value);
        choices.push(choice);
    }

    choices.reverse();
    Ok(EnumeratedSolution {
        recycling_bonus,
        tiers: choices,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(slots: u32) -> RunParameters {
        RunParameters::new(slots, Decimal::ONE).unwrap()
    }

    #[test]
    fn empty_candidate_lists_are_rejected() {
        let catalog = ModuleCatalog::standard();
        let candidates = CandidateSet::new(vec![], vec![ModuleId::new(1, 1)]);
        let err = enumerate_setup(&catalog, &params(2), &candidates).unwrap_err();
        assert!(matches!(
            err,
            ChainError::EmptyCandidateSet { kind: ModuleKind::Productivity }
        ));
    }

    #[test]
    fn exactly_one_record_selected_per_tier() {
        let catalog = ModuleCatalog::standard();
        let candidates = CandidateSet::new(
            vec![ModuleId::new(1, 1), ModuleId::new(3, 5)],
            vec![ModuleId::new(1, 1), ModuleId::new(2, 5), ModuleId::new(3, 5)],
        );
        let solution = enumerate_setup(&catalog, &params(4), &candidates).unwrap();

        assert_eq!(solution.records.len(), 2 + 4 * 6);
        for tier in 1..=TOP_TIER {
            let selected = solution
                .records
                .iter()
                .filter(|record| record.tier == tier && record.selected)
                .count();
            assert_eq!(selected, 1, "tier {tier}");
        }
        assert_eq!(solution.recycling_bonus, Decimal::new(248, 3));
    }

    #[test]
    fn top_tier_records_have_no_quality_module() {
        let catalog = ModuleCatalog::standard();
        let candidates = CandidateSet::singleton(ModuleId::new(2, 2), ModuleId::new(2, 2));
        let solution = enumerate_setup(&catalog, &params(3), &candidates).unwrap();
        let top = solution.tier(TOP_TIER).unwrap();
        assert_eq!(top.quality_module, None);
        assert_eq!(top.result.quality_modules, 0);
    }
}
