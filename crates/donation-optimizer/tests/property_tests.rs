//! Property tests for the donation optimizer.
//!
//! Small random portfolios are checked against a brute-force search over every
//! per-lot share count.

use std::collections::BTreeMap;

use donation_optimizer::{
    DonationOptimizer, DonationReport, Lot, Objective, OptimizerConfig, Portfolio,
    SelectionStrategy,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

const ASSETS: [&str; 3] = ["AAA", "BBB", "CCC"];

/// Prices and costs in tenths, so every run exercises a non-zero scale.
fn arb_portfolio() -> impl Strategy<Value = Portfolio> {
    let prices = prop::collection::vec(0i64..=120, ASSETS.len());
    let lots = prop::collection::vec((0usize..ASSETS.len(), 0u64..=4, 0i64..=120), 0..=4);
    (prices, lots).prop_map(|(prices, lots)| {
        let asset_share_prices: BTreeMap<String, Decimal> = ASSETS
            .iter()
            .zip(prices)
            .map(|(name, tenths)| (name.to_string(), Decimal::new(tenths, 1)))
            .collect();
        let lots = lots
            .into_iter()
            .enumerate()
            .map(|(m, (asset, shares, cost))| {
                Lot::new(ASSETS[asset], format!("lot-{}", m), shares, Decimal::new(cost, 1))
            })
            .collect();
        Portfolio::new(asset_share_prices, lots)
    })
}

fn arb_objective() -> impl Strategy<Value = Objective> {
    prop_oneof![Just(Objective::MaximizeGains), Just(Objective::MaximizeLosses)]
}

fn signed(objective: Objective, gains: Decimal) -> Decimal {
    match objective {
        Objective::MaximizeGains => gains,
        Objective::MaximizeLosses => -gains,
    }
}

/// Best objective value over every combination of per-lot share counts.
fn brute_force_best(portfolio: &Portfolio, budget: Decimal, objective: Objective) -> Decimal {
    fn walk(
        portfolio: &Portfolio,
        m: usize,
        spent: Decimal,
        gained: Decimal,
        budget: Decimal,
        objective: Objective,
        best: &mut Decimal,
    ) {
        if spent > budget {
            return;
        }
        if m == portfolio.lots.len() {
            *best = (*best).max(signed(objective, gained));
            return;
        }
        let lot = &portfolio.lots[m];
        let price = portfolio.asset_share_prices[&lot.asset_name];
        for k in 0..=lot.shares {
            let k = Decimal::from(k);
            walk(
                portfolio,
                m + 1,
                spent + price * k,
                gained + (price - lot.share_cost) * k,
                budget,
                objective,
                best,
            );
        }
    }

    let mut best = Decimal::ZERO;
    walk(portfolio, 0, Decimal::ZERO, Decimal::ZERO, budget, objective, &mut best);
    best
}

fn optimize(
    portfolio: &Portfolio,
    budget: Decimal,
    objective: Objective,
    strategy: SelectionStrategy,
) -> DonationReport {
    let config = OptimizerConfig::default()
        .with_objective(objective)
        .with_strategy(strategy);
    DonationOptimizer::new(config)
        .optimize(portfolio, budget)
        .expect("valid portfolio")
}

proptest! {
    /// The donation never exceeds the budget and never takes more shares
    /// than a lot holds.
    #[test]
    fn donation_respects_budget_and_lots(
        portfolio in arb_portfolio(),
        budget in 0i64..=400,
        objective in arb_objective(),
    ) {
        let budget = Decimal::new(budget, 1);
        let report = optimize(&portfolio, budget, objective, SelectionStrategy::UnitShares);

        prop_assert!(report.total_value <= budget);
        for entry in &report.entries {
            let lot = &portfolio.lots[entry.lot.0];
            prop_assert!(entry.shares > 0);
            prop_assert!(entry.shares <= lot.shares);
            prop_assert_eq!(&entry.asset_name, &lot.asset_name);
            prop_assert_eq!(entry.share_cost, lot.share_cost);
        }
    }

    /// No other combination of shares beats the reported objective.
    #[test]
    fn donation_is_optimal(
        portfolio in arb_portfolio(),
        budget in 0i64..=400,
        objective in arb_objective(),
    ) {
        let budget = Decimal::new(budget, 1);
        let report = optimize(&portfolio, budget, objective, SelectionStrategy::UnitShares);
        let best = brute_force_best(&portfolio, budget, objective);
        prop_assert_eq!(signed(objective, report.total_capital_gains), best);
    }

    /// A bigger budget never makes the objective worse.
    #[test]
    fn objective_is_monotone_in_budget(
        portfolio in arb_portfolio(),
        budget in 0i64..=300,
        extra in 0i64..=100,
        objective in arb_objective(),
    ) {
        let small = optimize(&portfolio, Decimal::new(budget, 1), objective, SelectionStrategy::UnitShares);
        let large = optimize(&portfolio, Decimal::new(budget + extra, 1), objective, SelectionStrategy::UnitShares);
        prop_assert!(
            signed(objective, large.total_capital_gains) >= signed(objective, small.total_capital_gains)
        );
    }

    /// The bounded engine picks exactly the shares the unit-share engine picks,
    /// ties included.
    #[test]
    fn engines_agree_share_for_share(
        portfolio in arb_portfolio(),
        budget in 0i64..=400,
        objective in arb_objective(),
    ) {
        let budget = Decimal::new(budget, 1);
        let unit = optimize(&portfolio, budget, objective, SelectionStrategy::UnitShares);
        let bounded = optimize(&portfolio, budget, objective, SelectionStrategy::BoundedLots);
        prop_assert_eq!(unit, bounded);
    }

    /// Identical input always yields an identical report.
    #[test]
    fn runs_are_repeatable(
        portfolio in arb_portfolio(),
        budget in 0i64..=400,
        objective in arb_objective(),
    ) {
        let budget = Decimal::new(budget, 1);
        let first = optimize(&portfolio, budget, objective, SelectionStrategy::UnitShares);
        let second = optimize(&portfolio, budget, objective, SelectionStrategy::UnitShares);
        prop_assert_eq!(first, second);
    }
}
