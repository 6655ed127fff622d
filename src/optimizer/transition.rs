//! Quality transition model for the craft → recycle loop.
//!
//! An item produced at quality `i < 5` with upgrade chance `c` stays at `i` with
//! probability `1 - c`. Otherwise it climbs `d >= 1` tiers with probability
//! `c * 0.9 * 0.1^(d-1)`; whatever would overshoot tier 5 lands on tier 5.
//!
//! Crafting at tier `i` turns one input into `p_eff` products. Quality 5 products are
//! kept. Every other product is recycled at 1:4, and each returned ingredient takes a
//! second quality roll with the recycler's chance `qr` before re-entering the chain.
//! Solving that fixed point for `h_i` gives
//!
//! ```text
//! h_i = (sum_{m>i} coeff_m * h_m + 4 * P_craft(i -> 5)) / (4 / p_eff - (1 - q_eff)(1 - qr))
//! coeff_m = sum_{j=i}^{min(m,4)} P_craft(i -> j) * P_recycle(j -> m)
//! ```

use rust_decimal::Decimal;

use crate::error::ChainResult;
use crate::optimizer::numeric::Checked;

/// Terminal quality tier.
pub const TOP_TIER: u8 = 5;

/// Ingredients consumed per recycled product are returned at this ratio (1:4).
pub const RECYCLE_RATIO: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Share of upgrades that stop after exactly one tier.
const NEXT_TIER_SHARE: Decimal = Decimal::from_parts(9, 0, 0, false, 1);
/// Share of upgrades that continue past each reached tier.
const SKIP_SHARE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Number of quality modules a recycler holds.
pub const RECYCLER_SLOTS: u32 = 4;

/// Combined upgrade chance of a recycler fitted with the given quality module.
/// Overflow is reported against tier 4, the first tier that recycles.
pub fn recycling_bonus(quality_bonus: Decimal) -> ChainResult<Decimal> {
    Checked::at(TOP_TIER - 1).mul(quality_bonus, Decimal::from(RECYCLER_SLOTS))
}

fn skip_share_pow(exponent: u8) -> Decimal {
    (0..exponent).fold(Decimal::ONE, |acc, _| acc * SKIP_SHARE)
}

/// Probability that an item rolled at quality `from` ends at quality `to`.
pub fn jump_probability(from: u8, to: u8, chance: Decimal) -> ChainResult<Decimal> {
    if to < from || to > TOP_TIER {
        return Ok(Decimal::ZERO);
    }
    if from == TOP_TIER {
        return Ok(Decimal::ONE);
    }
    let checked = Checked::at(from);
    if to == from {
        return checked.sub(Decimal::ONE, chance);
    }
    if to < TOP_TIER {
        checked.mul(
            checked.mul(chance, NEXT_TIER_SHARE)?,
            skip_share_pow(to - from - 1),
        )
    } else {
        checked.mul(chance, skip_share_pow(TOP_TIER - from - 1))
    }
}

/// Weights of one tier's expected-output formula for a fixed split.
#[derive(Debug, Clone, PartialEq)]
pub struct TierCoefficients {
    pub tier: u8,
    /// Weight on each already-solved higher tier, ascending by tier.
    pub downstream: Vec<(u8, Decimal)>,
    /// Quality 5 products made directly, scaled by the recycle ratio.
    pub constant: Decimal,
}

pub fn tier_coefficients(
    tier: u8,
    quality_chance: Decimal,
    recycling_chance: Decimal,
) -> ChainResult<TierCoefficients> {
    let checked = Checked::at(tier);
    let mut downstream = Vec::with_capacity(usize::from(TOP_TIER.saturating_sub(tier)));
    for target in (tier + 1)..=TOP_TIER {
        let mut weight = Decimal::ZERO;
        for via in tier..=target.min(TOP_TIER - 1) {
            let path = checked.mul(
                jump_probability(tier, via, quality_chance)?,
                jump_probability(via, target, recycling_chance)?,
            )?;
            weight = checked.add(weight, path)?;
        }
        downstream.push((target, weight));
    }

    Ok(TierCoefficients {
        tier,
        downstream,
        constant: checked.mul(RECYCLE_RATIO, jump_probability(tier, TOP_TIER, quality_chance)?)?,
    })
}

/// Probability mass that stays at `tier` through both the craft and recycle rolls.
pub fn retained_mass(tier: u8, quality_chance: Decimal, recycling_chance: Decimal) -> ChainResult<Decimal> {
    let checked = Checked::at(tier);
    checked.mul(
        checked.sub(Decimal::ONE, quality_chance)?,
        checked.sub(Decimal::ONE, recycling_chance)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChainError;

    fn d(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn craft_distribution_sums_to_one() {
        let chance = d("0.186");
        for from in 1..=TOP_TIER {
            let total: Decimal = (from..=TOP_TIER)
                .map(|to| jump_probability(from, to, chance).unwrap())
                .sum();
            assert_eq!(total, Decimal::ONE, "from tier {from}");
        }
    }

    #[test]
    fn top_tier_never_moves() {
        assert_eq!(jump_probability(5, 5, d("0.3")).unwrap(), Decimal::ONE);
        assert_eq!(jump_probability(5, 4, d("0.3")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn tier_four_weights_match_closed_form() {
        let (q, qr) = (d("0.124"), d("0.248"));
        let c = tier_coefficients(4, q, qr).unwrap();
        assert_eq!(c.downstream, vec![(5, qr * (Decimal::ONE - q))]);
        assert_eq!(c.constant, Decimal::from(4) * q);
    }

    #[test]
    fn tier_three_weights_match_closed_form() {
        let (q, qr) = (d("0.062"), d("0.248"));
        let one = Decimal::ONE;
        let c = tier_coefficients(3, q, qr).unwrap();
        let coeff4 = d("0.9") * ((one - q) * qr + (one - qr) * q);
        let coeff5 = qr * ((one - q) * d("0.1") + q * d("0.9"));
        assert_eq!(c.downstream, vec![(4, coeff4), (5, coeff5)]);
        assert_eq!(c.constant, Decimal::from(4) * q * d("0.1"));
    }

    #[test]
    fn tier_one_weights_match_closed_form() {
        let (q, qr) = (d("0.05"), d("0.2"));
        let one = Decimal::ONE;
        let c = tier_coefficients(1, q, qr).unwrap();
        let coeff2 = d("0.9") * (qr * (one - q) + q * (one - qr));
        let coeff3 = (one - q) * qr * d("0.09") + q * qr * d("0.81") + q * (one - qr) * d("0.09");
        let coeff4 = (one - q) * qr * d("0.009")
            + Decimal::TWO * q * qr * d("0.081")
            + q * (one - qr) * d("0.009");
        let coeff5 = (one - q) * qr * d("0.001")
            + Decimal::TWO * q * qr * d("0.009")
            + q * qr * d("0.009");
        assert_eq!(
            c.downstream,
            vec![(2, coeff2), (3, coeff3), (4, coeff4), (5, coeff5)]
        );
        assert_eq!(c.constant, Decimal::from(4) * q * d("0.001"));
    }

    #[test]
    fn overflowing_chances_report_precision_loss() {
        assert!(matches!(
            recycling_bonus(Decimal::MAX),
            Err(ChainError::PrecisionLoss { tier: 4, operation: "multiplication" })
        ));
        assert!(matches!(
            tier_coefficients(1, Decimal::MAX, Decimal::MAX),
            Err(ChainError::PrecisionLoss { .. })
        ));
        assert!(matches!(
            retained_mass(2, d("1000000000000000"), d("4000000000000000")),
            Err(ChainError::PrecisionLoss { tier: 2, operation: "multiplication" })
        ));
    }
}
