//! Share Expander
//!
//! Turns each multi-share lot into one indivisible item per share so the
//! 0/1 selection engine can pick shares individually.

use crate::knapsack::Item;
use crate::models::{LotIndex, Objective};
use crate::normalizer::NormalizedLot;

/// One physical share of a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitShare {
    pub lot: LotIndex,
    /// Normalized share price
    pub weight: u64,
    /// Signed unit gain, already oriented for the objective
    pub value: i64,
}

impl Item for UnitShare {
    fn weight(&self) -> u64 {
        self.weight
    }

    fn value(&self) -> i64 {
        self.value
    }
}

/// Expand lots share by share. Items for one lot are contiguous and follow
/// the lot order.
pub fn expand_lots(lots: &[NormalizedLot], objective: Objective) -> Vec<UnitShare> {
    let total: u64 = lots.iter().map(|lot| lot.shares).sum();
    let mut expanded = Vec::with_capacity(total as usize);
    for lot in lots {
        let share = UnitShare {
            lot: lot.index,
            weight: lot.weight(),
            value: objective.signed_value(lot.unit_gain()),
        };
        expanded.extend(std::iter::repeat(share).take(lot.shares as usize));
    }
    expanded
}
