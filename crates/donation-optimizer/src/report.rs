//! Result Assembler
//!
//! Builds donation entries and totals from the original decimals, never from
//! the normalized integers.

use rust_decimal::Decimal;

use crate::error::{DonationError, Result};
use crate::models::{DonationEntry, DonationReport, LotSelection, Portfolio, SelectionPath};

pub fn assemble(
    portfolio: &Portfolio,
    selections: &[LotSelection],
    path: SelectionPath,
) -> Result<DonationReport> {
    let mut entries = Vec::with_capacity(selections.len());
    let mut total_value = Decimal::ZERO;
    let mut total_capital_gains = Decimal::ZERO;

    for selection in selections {
        let lot = portfolio.lot(selection.lot);
        let share_price = portfolio.share_price(&lot.asset_name).ok_or_else(|| {
            DonationError::Input(format!(
                "lot has an assetName that does not appear in assetSharePrices: {}",
                lot.asset_name
            ))
        })?;

        let entry = DonationEntry {
            lot: selection.lot,
            asset_name: lot.asset_name.clone(),
            date: lot.date.clone(),
            shares: selection.shares,
            share_cost: lot.share_cost,
            share_price,
        };

        let overflow = || DonationError::Overflow(format!("totals for lot {}", lot.asset_name));
        total_value = entry
            .value()
            .and_then(|v| total_value.checked_add(v))
            .ok_or_else(overflow)?;
        total_capital_gains = entry
            .capital_gain()
            .and_then(|g| total_capital_gains.checked_add(g))
            .ok_or_else(overflow)?;

        entries.push(entry);
    }

    Ok(DonationReport {
        entries,
        total_value: total_value.normalize(),
        total_capital_gains: total_capital_gains.normalize(),
        path,
    })
}
