//! Allocation engine: sales, dividend accrual, rebalancing and payouts.
//!
//! The engine is the only component that correlates investor holdings with
//! farm balances. Every operation works on one day and reports what it did;
//! the caller decides the order (see [`crate::clock`]).

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use smarty_core::error::{EngineError, LedgerError};
use smarty_core::traits::RandomSource;
use smarty_core::types::{Amount, Day, DividendKind, FarmKind, TokenAmounts, TokenType};
use smarty_core::{RandomAllocator, SimulationParams, TurnoverSeries};
use smarty_ledger::{Farm, FloorOutcome};
use tracing::{debug, trace, warn};

use crate::cohort::Cohorts;
use crate::report::FarmPair;

/// Dividends accrued from one day's turnover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividendAccrual {
    pub turnover_usd: Amount,
    pub exchange_rate: f64,
    /// Turnover converted to tokens: `usd / usd_to_reserve_rate / exchange_rate`.
    pub turnover_tokens: Amount,
    pub accrued: FarmPair<Amount>,
}

/// Outcome of one rebalancing pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RebalanceSummary {
    /// Investors with at least one holding moved, per target farm.
    pub investors_moved: FarmPair<usize>,
    pub tokens_moved: FarmPair<Amount>,
    /// Whether an investor was moved into the empty dividend farm.
    pub bootstrapped: bool,
}

/// Outcome of paying one farm's dividends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutSummary {
    pub farm: FarmKind,
    /// Dividend per deposited token, fixed before any grant.
    pub rate: f64,
    pub paid: Amount,
    pub recipients: usize,
}

/// Runs the per-day economic operations against farms and cohorts.
#[derive(Debug)]
pub struct AllocationEngine<S> {
    params: Arc<SimulationParams>,
    allocator: RandomAllocator<S>,
}

impl<S: RandomSource> AllocationEngine<S> {
    pub fn new(params: Arc<SimulationParams>, allocator: RandomAllocator<S>) -> Self {
        Self { params, allocator }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Split each type's release across its cohort and grant the shares.
    ///
    /// Excluded types are skipped. Returns the number of tokens granted.
    pub fn sell_new_tokens(
        &mut self,
        cohorts: &mut Cohorts,
        amounts: &BTreeMap<TokenType, u64>,
        day: Day,
    ) -> Result<Amount, EngineError> {
        let mut sold = 0u64;
        for (&token, &amount) in amounts {
            if amount == 0 || self.params.is_excluded(token) {
                continue;
            }
            let investors = cohorts
                .get_mut(token)
                .filter(|c| !c.is_empty())
                .ok_or(EngineError::UnknownCohort(token))?;
            let shares = self.allocator.allocate(amount, investors.len())?;
            for (investor, share) in investors.iter_mut().zip(shares) {
                if share == 0 {
                    continue;
                }
                let grant = TokenAmounts::from([(token, share as Amount)]);
                investor
                    .grant_tokens(&grant, day)
                    .map_err(|source| EngineError::Investor {
                        investor: investor.id(),
                        source,
                    })?;
            }
            sold += amount;
            trace!(day, token = %token, amount, "tokens sold");
        }
        Ok(sold as Amount)
    }

    /// Accrue turnover dividends into both farms.
    ///
    /// Day `d` uses turnover index `d - 1`, so day 1 sees the flat baseline.
    pub fn compute_daily_dividends(
        &self,
        turnover: &TurnoverSeries,
        day: Day,
        yield_pool: &mut Farm,
        dividend_farm: &mut Farm,
    ) -> Result<DividendAccrual, EngineError> {
        let turnover_usd = turnover
            .for_day(day)
            .ok_or(LedgerError::DayOutOfRange {
                day,
                last_day: turnover.len() as Day,
            })?;
        let exchange_rate = yield_pool.get_exchange_rate(day)?;
        let turnover_tokens = turnover_usd / self.params.usd_to_reserve_rate / exchange_rate;
        let total = turnover_tokens * self.params.dividend_rate();

        let accrued = FarmPair {
            yield_pool: total * self.params.dividend_split,
            dividend_farm: total * (1.0 - self.params.dividend_split),
        };
        dividend_farm.accrue_dividends(day, DividendKind::Turnover, accrued.dividend_farm)?;
        yield_pool.accrue_dividends(day, DividendKind::Turnover, accrued.yield_pool)?;

        Ok(DividendAccrual {
            turnover_usd,
            exchange_rate,
            turnover_tokens,
            accrued,
        })
    }

    /// Top both farms up to the minimum index revenue.
    pub fn apply_minting_floor(
        &self,
        day: Day,
        yield_pool: &mut Farm,
        dividend_farm: &mut Farm,
    ) -> Result<FarmPair<FloorOutcome>, EngineError> {
        let rate = yield_pool.get_exchange_rate(day)?;
        let floor = self.params.min_index_revenue;
        let dividend_farm = dividend_farm.accrue_by_floor(day, floor, rate)?;
        let yield_pool = yield_pool.accrue_by_floor(day, floor, rate)?;
        Ok(FarmPair {
            yield_pool,
            dividend_farm,
        })
    }

    /// Greedy activity-ordered rebalancing of the participating cohorts.
    ///
    /// Investors are visited in descending activity, ties in cohort then
    /// creation order. Each one reads the current farm totals, so earlier
    /// moves change what later investors see. An empty dividend farm draws
    /// the investor in unconditionally; otherwise holdings go to the farm
    /// with the strictly larger dividend per token, the yield pool on a tie.
    pub fn rebalance_investors(
        &self,
        yield_pool: &mut Farm,
        dividend_farm: &mut Farm,
        cohorts: &mut Cohorts,
        day: Day,
    ) -> Result<RebalanceSummary, EngineError> {
        let mut order: Vec<(TokenType, usize, f64)> = Vec::new();
        let participating: Vec<TokenType> = cohorts
            .cohort_types()
            .filter(|t| self.params.rebalancing_cohorts.contains(t))
            .collect();
        for token in participating {
            if let Some(members) = cohorts.get(token) {
                order.extend(
                    members
                        .iter()
                        .enumerate()
                        .map(|(i, inv)| (token, i, inv.activity_coefficient())),
                );
            }
        }
        // Stable: equal activity keeps enumeration order.
        order.sort_by_key(|&(_, _, activity)| Reverse(OrderedFloat(activity)));

        let mut summary = RebalanceSummary::default();
        for (token, index, _) in order {
            let Some(investor) = cohorts.get_mut(token).and_then(|m| m.get_mut(index)) else {
                continue;
            };

            let bootstrap = dividend_farm.get_token_amount(day, false)? <= 0.0;
            let target = if bootstrap {
                FarmKind::DividendFarm
            } else {
                let pool_ratio = yield_ratio(yield_pool, day)?;
                let farm_ratio = yield_ratio(dividend_farm, day)?;
                if farm_ratio > pool_ratio {
                    FarmKind::DividendFarm
                } else {
                    FarmKind::YieldPool
                }
            };

            let (to, from) = match target {
                FarmKind::DividendFarm => (&mut *dividend_farm, &mut *yield_pool),
                FarmKind::YieldPool => (&mut *yield_pool, &mut *dividend_farm),
            };
            let outcome = investor
                .transfer_eligible_holdings(to, from, day, self.params.freeze_period)
                .map_err(|source| EngineError::Investor {
                    investor: investor.id(),
                    source,
                })?;
            if !outcome.is_empty() {
                summary.bootstrapped |= bootstrap;
                *summary.investors_moved.get_mut(target) += 1;
                *summary.tokens_moved.get_mut(target) += outcome.deposited.total();
            }
        }

        debug!(
            day,
            to_yield_pool = summary.investors_moved.yield_pool,
            to_dividend_farm = summary.investors_moved.dividend_farm,
            bootstrapped = summary.bootstrapped,
            "rebalancing done"
        );
        Ok(summary)
    }

    /// Pay `farm`'s accrued dividends to every depositor pro rata.
    ///
    /// The rate is snapshotted before the first grant. Grants are staking
    /// reward tokens credited on `day`.
    pub fn pay_dividends(
        &self,
        cohorts: &mut Cohorts,
        farm: &Farm,
        day: Day,
    ) -> Result<PayoutSummary, EngineError> {
        let tokens = farm.get_token_amount(day, false)?;
        let dividends = farm.dividends_total(day)?;
        let rate = if tokens > 0.0 { dividends / tokens } else { 0.0 };
        if rate == 0.0 && dividends > 0.0 {
            warn!(farm = %farm.kind(), day, dividends, "no depositors, dividends left unpaid");
        }

        let mut paid = 0.0;
        let mut recipients = 0;
        if rate > 0.0 {
            for investor in cohorts.iter_mut() {
                let deposited = investor.get_deposited_amount(farm.kind(), day);
                if deposited <= 0.0 {
                    continue;
                }
                let reward = deposited * rate;
                investor
                    .grant_tokens(&TokenAmounts::from([(TokenType::StakingRewards, reward)]), day)
                    .map_err(|source| EngineError::Investor {
                        investor: investor.id(),
                        source,
                    })?;
                paid += reward;
                recipients += 1;
            }
        }

        debug!(farm = %farm.kind(), day, rate, paid, recipients, "dividends paid");
        Ok(PayoutSummary {
            farm: farm.kind(),
            rate,
            paid,
            recipients,
        })
    }
}

/// Pending dividends per deposited token, genesis reserve excluded.
///
/// A farm with no deposits yields infinity when it has dividends waiting and
/// zero otherwise.
fn yield_ratio(farm: &Farm, day: Day) -> Result<f64, LedgerError> {
    let tokens = farm.get_token_amount(day, false)?;
    let dividends = farm.dividends_total(day)?;
    Ok(if tokens > 0.0 {
        dividends / tokens
    } else if dividends > 0.0 {
        f64::INFINITY
    } else {
        0.0
    })
}
