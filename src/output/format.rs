use crate::optimizer::TierResult;

/// Grid cell text for a pair whose chain could not be solved.
pub const INFEASIBLE_CELL: &str = "infeasible";

/// `[P:<n_p> Q:<n_q>] | E_out:<value>`
pub fn format_tier(result: &TierResult) -> String {
    format!(
        "[P:{} Q:{}] | E_out:{}",
        result.productivity_modules, result.quality_modules, result.value
    )
}

/// One line per tier, in the order given (tier 1 first for chain solutions).
pub fn format_solution(tiers: &[TierResult]) -> String {
    tiers.iter().map(format_tier).collect::<Vec<_>>().join("\n")
}
