//! Capacity-Constrained Selection Engine
//!
//! Dynamic-programming knapsack over integer weights and signed integer values.
//! Two engines share one tie-break rule:
//!
//! - [`solve_01`] solves the classic 0/1 problem over indivisible items.
//! - [`solve_bounded`] solves the bounded-multiplicity problem directly, one
//!   row per group of identical items, and picks exactly the counts that
//!   [`solve_01`] picks when every group is expanded into contiguous items.
//!
//! Both recover the selection by walking the table backwards and only taking an
//! item when it strictly improves on leaving it out, so ties always go to the
//! lower-indexed item.
//!
//! Time and space are O(rows · capacity). The table is the dominant allocation
//! of a run, so callers pass a cell limit.

use crate::error::{DonationError, Result};

/// Something with a weight and a value.
pub trait Item {
    fn weight(&self) -> u64;
    fn value(&self) -> i64;
}

/// A group of identical items that may be taken up to `count` times.
pub trait BoundedItem: Item {
    fn count(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// Indices of chosen items, ascending
    pub chosen: Vec<usize>,
    pub value: i64,
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoundedSelection {
    /// Units taken from each group, same order as the input
    pub counts: Vec<u64>,
    pub value: i64,
    pub weight: u64,
}

/// Number of cells a table with `rows` item rows needs at this capacity.
pub fn table_cells(rows: usize, capacity: u64) -> u128 {
    (rows as u128 + 1) * (capacity as u128 + 1)
}

fn allocate_table(rows: usize, capacity: u64, limit: Option<u64>) -> Result<Vec<i64>> {
    let cells = table_cells(rows, capacity);
    if let Some(limit) = limit {
        if cells > limit as u128 {
            tracing::warn!(cells, limit, "selection table exceeds cell limit");
            return Err(DonationError::CapacityExceeded { cells, limit });
        }
    }
    let len = usize::try_from(cells).map_err(|_| DonationError::CapacityExceeded {
        cells,
        limit: usize::MAX as u64,
    })?;
    tracing::debug!(rows, capacity, cells, "allocating selection table");
    Ok(vec![0i64; len])
}

/// Reject inputs whose best value could overflow an `i64` cell.
fn check_value_range(positive_total: i128) -> Result<()> {
    if positive_total > i64::MAX as i128 {
        return Err(DonationError::Overflow(
            "sum of item values exceeds i64".to_string(),
        ));
    }
    Ok(())
}

/// Choose items with total weight at most `capacity` and maximal total value.
pub fn solve_01<T: Item>(items: &[T], capacity: u64, limit: Option<u64>) -> Result<Selection> {
    if items.is_empty() || capacity == 0 {
        return Ok(Selection::default());
    }
    check_value_range(items.iter().map(|i| i.value().max(0) as i128).sum())?;

    let rows = items.len();
    let mut table = allocate_table(rows, capacity, limit)?;
    let width = (capacity as usize) + 1;

    // table[i][w]: best value from the first i items under budget w
    for (i, item) in items.iter().enumerate() {
        let (weight, value) = (item.weight(), item.value());
        let (done, rest) = table.split_at_mut((i + 1) * width);
        let prev = &done[i * width..];
        let cur = &mut rest[..width];
        for w in 0..width {
            let exclude = prev[w];
            cur[w] = if weight <= w as u64 {
                exclude.max(prev[w - weight as usize] + value)
            } else {
                exclude
            };
        }
    }

    let mut w = capacity as usize;
    let mut chosen = Vec::new();
    for i in (1..=rows).rev() {
        if table[i * width + w] > table[(i - 1) * width + w] {
            chosen.push(i - 1);
            w -= items[i - 1].weight() as usize;
        }
    }
    chosen.reverse();

    Ok(Selection {
        chosen,
        value: table[rows * width + capacity as usize],
        weight: capacity - w as u64,
    })
}

/// Value of taking `k` units of a group on top of `base`.
fn with_units(base: i64, k: u64, value: i64) -> i128 {
    base as i128 + k as i128 * value as i128
}

/// Choose how many units of each group to take, total weight at most
/// `capacity`, maximal total value.
pub fn solve_bounded<T: BoundedItem>(
    groups: &[T],
    capacity: u64,
    limit: Option<u64>,
) -> Result<BoundedSelection> {
    if groups.is_empty() || capacity == 0 {
        return Ok(BoundedSelection {
            counts: vec![0; groups.len()],
            ..Default::default()
        });
    }
    check_value_range(
        groups
            .iter()
            .map(|g| g.value().max(0) as i128 * g.count() as i128)
            .sum(),
    )?;

    let rows = groups.len();
    let mut table = allocate_table(rows, capacity, limit)?;
    let width = (capacity as usize) + 1;

    for (j, group) in groups.iter().enumerate() {
        let (weight, value, count) = (group.weight(), group.value(), group.count());
        let (done, rest) = table.split_at_mut((j + 1) * width);
        let prev = &done[j * width..];
        let cur = &mut rest[..width];
        for w in 0..width {
            cur[w] = if weight == 0 {
                if value > 0 {
                    prev[w] + count as i64 * value
                } else {
                    prev[w]
                }
            } else {
                let most = count.min(w as u64 / weight);
                // k = 0 is always a candidate and never negative, so the max
                // fits in a cell
                (0..=most)
                    .map(|k| with_units(prev[w - (k * weight) as usize], k, value))
                    .max()
                    .unwrap_or(prev[w] as i128) as i64
            };
        }
    }

    let mut counts = vec![0u64; rows];
    let mut w = capacity as usize;
    for j in (0..rows).rev() {
        let group = &groups[j];
        let (weight, value, count) = (group.weight(), group.value(), group.count());
        let target = table[(j + 1) * width + w] as i128;
        let prev = &table[j * width..(j + 1) * width];
        // Fewest units that still reach the optimum, the same count the 0/1
        // engine settles on for a contiguous run of identical items.
        let k = if weight == 0 {
            if value > 0 {
                count
            } else {
                0
            }
        } else {
            let most = count.min(w as u64 / weight);
            (0..=most)
                .find(|&k| with_units(prev[w - (k * weight) as usize], k, value) == target)
                .unwrap_or(0)
        };
        counts[j] = k;
        w -= (k * weight) as usize;
    }

    Ok(BoundedSelection {
        counts,
        value: table[rows * width + capacity as usize],
        weight: capacity - w as u64,
    })
}
