//! Shared builders for scenario tests.

use std::sync::Arc;

use smarty_core::types::{Amount, Day, FarmKind, TokenType};
use smarty_core::SimulationParams;
use smarty_engine::{Cohorts, SimulationClock};

/// Ten Seed investors and a 1000-token genesis pool at 0.5, with turnover
/// chosen so that day 1 accrues exactly 10 tokens of dividends
/// (`20 USD / 1 / 0.5 * 25%`).
pub fn ten_token_day_params() -> SimulationParams {
    let mut params = SimulationParams::sample();
    params.turnover.initial_usd = 20.0;
    params.turnover.annual_growth_rate = 0.0;
    params.usd_to_reserve_rate = 1.0;
    params.dividend_percent = 25.0;
    params
}

pub fn clock(params: SimulationParams) -> SimulationClock {
    SimulationClock::new(Arc::new(params)).unwrap()
}

/// Sum of what investors report as deposited in `farm` on `day`.
pub fn deposited_total(cohorts: &Cohorts, farm: FarmKind, day: Day) -> Amount {
    cohorts
        .iter()
        .map(|i| i.get_deposited_amount(farm, day))
        .sum()
}

/// Total of one token type across all investors, bought up to `day`.
pub fn held_of_type(cohorts: &Cohorts, token: TokenType, day: Day) -> Amount {
    cohorts
        .iter()
        .flat_map(|i| i.holdings())
        .filter(|(t, bought, _)| *t == token && *bought <= day)
        .map(|(_, _, h)| h.amount)
        .sum()
}

/// `a` and `b` agree to a relative tolerance of 1e-9.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
