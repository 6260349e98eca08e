//! Lot Recombiner
//!
//! Folds the unit shares picked by the selection engine back into one entry per
//! source lot.

use crate::expander::UnitShare;
use crate::models::LotSelection;

/// Collapse consecutive shares of the same lot into one selection. Runs are
/// only merged while they are adjacent; the engine returns shares in
/// expansion order, which keeps every lot contiguous.
pub fn recombine(shares: &[UnitShare]) -> Vec<LotSelection> {
    let mut selections: Vec<LotSelection> = Vec::new();
    for share in shares {
        match selections.last_mut() {
            Some(last) if last.lot == share.lot => last.shares += 1,
            _ => selections.push(LotSelection {
                lot: share.lot,
                shares: 1,
            }),
        }
    }
    selections
}
