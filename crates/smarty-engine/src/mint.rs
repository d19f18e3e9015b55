//! Monthly mint schedule and its daily release.

use std::collections::BTreeMap;

use smarty_core::calendar::{day_in_month, month_of};
use smarty_core::constants::DAYS_PER_MONTH;
use smarty_core::params::ReleasePolicy;
use smarty_core::types::{Day, Month, TokenType};
use smarty_core::SimulationParams;
use tracing::debug;

/// Tokens released for sale, per month and type.
///
/// Excluded types are dropped and the genesis seed of every sold type is
/// withheld from month 0, since those tokens went into the yield pool.
#[derive(Debug, Clone, PartialEq)]
pub struct MintSchedule {
    months: BTreeMap<TokenType, Vec<u64>>,
    release: ReleasePolicy,
}

impl MintSchedule {
    pub fn from_params(params: &SimulationParams) -> Self {
        let mut months: BTreeMap<TokenType, Vec<u64>> = params
            .mint_schedule
            .iter()
            .filter(|(token, _)| !params.is_excluded(**token))
            .map(|(token, amounts)| (*token, amounts.clone()))
            .collect();

        for (token, seeded) in &params.genesis_pool {
            if let Some(first) = months.get_mut(token).and_then(|m| m.first_mut()) {
                *first = first.saturating_sub(*seeded);
                debug!(token = %token, seeded, remaining = *first, "genesis seed withheld from month 0");
            }
        }

        Self {
            months,
            release: params.release,
        }
    }

    /// Release of month `month`; types with nothing scheduled are omitted.
    pub fn month(&self, month: Month) -> BTreeMap<TokenType, u64> {
        self.months
            .iter()
            .filter_map(|(token, amounts)| {
                let amount = amounts.get(month as usize).copied().unwrap_or(0);
                (amount > 0).then_some((*token, amount))
            })
            .collect()
    }

    /// Tokens to sell on absolute `day`.
    pub fn for_day(&self, day: Day) -> BTreeMap<TokenType, u64> {
        let position = day_in_month(day);
        self.month(month_of(day))
            .into_iter()
            .filter_map(|(token, amount)| {
                let today = daily_share(amount, position, self.release);
                (today > 0).then_some((token, today))
            })
            .collect()
    }
}

/// Portion of a monthly `amount` released on day `position` (1..=30).
fn daily_share(amount: u64, position: u32, release: ReleasePolicy) -> u64 {
    match release {
        ReleasePolicy::FirstDayOfMonth => {
            if position == 1 {
                amount
            } else {
                0
            }
        }
        ReleasePolicy::EvenlyAcrossMonth => {
            let days = u64::from(DAYS_PER_MONTH);
            let base = amount / days;
            let remainder = amount % days;
            base + u64::from(u64::from(position) <= remainder)
        }
    }
}
