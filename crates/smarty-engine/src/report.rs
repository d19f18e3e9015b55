//! Read-only results of a run, keyed by day, for export.

use serde::Serialize;
use smarty_core::types::{Amount, Day, FarmKind, InvestorId, Month, TokenType};
use smarty_ledger::{FarmSnapshot, Investor};

/// One value per farm.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FarmPair<T> {
    pub yield_pool: T,
    pub dividend_farm: T,
}

impl<T> FarmPair<T> {
    pub fn get(&self, kind: FarmKind) -> &T {
        match kind {
            FarmKind::YieldPool => &self.yield_pool,
            FarmKind::DividendFarm => &self.dividend_farm,
        }
    }

    pub fn get_mut(&mut self, kind: FarmKind) -> &mut T {
        match kind {
            FarmKind::YieldPool => &mut self.yield_pool,
            FarmKind::DividendFarm => &mut self.dividend_farm,
        }
    }
}

impl FarmPair<Amount> {
    pub fn total(&self) -> Amount {
        self.yield_pool + self.dividend_farm
    }
}

/// What happened on one simulated day.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DayObservation {
    pub day: Day,
    pub month: Month,
    /// Yield pool exchange rate used for the day's dividend conversion.
    pub exchange_rate: f64,
    pub turnover_usd: Amount,
    /// Turnover converted to tokens.
    pub turnover_tokens: Amount,
    pub tokens_sold: Amount,
    pub turnover_dividends: FarmPair<Amount>,
    pub minted_dividends: FarmPair<Amount>,
    pub paid_dividends: FarmPair<Amount>,
    /// Investors whose holdings moved into each farm.
    pub investors_moved: FarmPair<usize>,
    pub bootstrapped: bool,
    /// Ordinary tokens held at the end of the day, genesis reserve excluded.
    pub tokens_held: FarmPair<Amount>,
}

/// End-of-run state of one investor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestorSummary {
    pub id: InvestorId,
    pub cohort: TokenType,
    pub risk_coefficient: f64,
    pub activity_coefficient: f64,
    pub total_tokens: Amount,
    pub deposited: FarmPair<Amount>,
}

impl InvestorSummary {
    pub fn of(investor: &Investor, day: Day) -> Self {
        Self {
            id: investor.id(),
            cohort: investor.cohort(),
            risk_coefficient: investor.risk_coefficient(),
            activity_coefficient: investor.activity_coefficient(),
            total_tokens: investor.total_amount(day),
            deposited: FarmPair {
                yield_pool: investor.get_deposited_amount(FarmKind::YieldPool, day),
                dividend_farm: investor.get_deposited_amount(FarmKind::DividendFarm, day),
            },
        }
    }
}

/// Everything a finished (or stopped) run exposes for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub num_months: u32,
    /// Last simulated day.
    pub horizon: Day,
    /// Last day that completed settlement.
    pub days_completed: Day,
    pub farms: FarmPair<FarmSnapshot>,
    pub observations: Vec<DayObservation>,
    pub investors: Vec<InvestorSummary>,
}

impl SimulationReport {
    pub fn total_paid(&self) -> Amount {
        self.observations.iter().map(|o| o.paid_dividends.total()).sum()
    }
}
