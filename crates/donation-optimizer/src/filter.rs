//! Lot Filter
//!
//! Drops lots that can never contribute to the chosen objective.

use crate::models::Objective;
use crate::normalizer::NormalizedLot;

/// Whether a single lot may take part in the selection.
pub fn is_eligible(lot: &NormalizedLot, objective: Objective, budget: u64) -> bool {
    lot.shares > 0 && objective.admits(lot.unit_gain()) && lot.weight() <= budget
}

/// Remove lots with no shares, with a unit gain of the wrong sign (or zero),
/// or whose single-share price already exceeds the budget. Survivors keep
/// their relative order.
pub fn retain_eligible(lots: &mut Vec<NormalizedLot>, objective: Objective, budget: u64) {
    let before = lots.len();
    lots.retain(|lot| is_eligible(lot, objective, budget));
    tracing::debug!(
        %objective,
        before,
        after = lots.len(),
        "filtered lots"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LotIndex;

    fn lot(index: usize, shares: u64, cost: i64, price: i64) -> NormalizedLot {
        NormalizedLot {
            index: LotIndex(index),
            shares,
            cost,
            price,
        }
    }

    #[test]
    fn test_gains_mode_keeps_positive_gain_lots_in_order() {
        let mut lots = vec![
            lot(0, 13, 5055, 10022),
            lot(1, 9, 12022, 10022),
            lot(2, 50, 1000, 1235),
            lot(3, 4, 1235, 1235),
        ];
        retain_eligible(&mut lots, Objective::MaximizeGains, 20000);
        let kept: Vec<usize> = lots.iter().map(|l| l.index.0).collect();
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn test_losses_mode_keeps_only_losing_lots() {
        let mut lots = vec![lot(0, 13, 5055, 10022), lot(1, 9, 12022, 10022)];
        retain_eligible(&mut lots, Objective::MaximizeLosses, 20000);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].index, LotIndex(1));
    }

    #[test]
    fn test_zero_shares_and_unaffordable_lots_dropped() {
        let mut lots = vec![lot(0, 0, 1000, 1235), lot(1, 50, 1000, 1235)];
        retain_eligible(&mut lots, Objective::MaximizeGains, 1000);
        assert!(lots.is_empty());
    }

    #[test]
    fn test_price_equal_to_budget_is_affordable() {
        let l = lot(0, 1, 1000, 1235);
        assert!(is_eligible(&l, Objective::MaximizeGains, 1235));
    }
}
