//! Investor holding ledger and freeze-aware farm transfers.
//!
//! Holdings are keyed by `(token type, purchase day)`. Each one records where
//! it currently sits ([`Placement`]) and the day it last moved; a holding that
//! moved on day `D` may move again from day `D + freeze_period` on.

use std::collections::BTreeMap;

use serde::Serialize;
use smarty_core::error::LedgerError;
use smarty_core::types::{Amount, Day, FarmKind, InvestorId, TokenAmounts, TokenType};
use tracing::trace;

use crate::farm::Farm;

/// Where a holding currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Not deposited in any farm.
    #[default]
    Wallet,
    YieldPool,
    DividendFarm,
}

impl Placement {
    pub fn farm(self) -> Option<FarmKind> {
        match self {
            Self::Wallet => None,
            Self::YieldPool => Some(FarmKind::YieldPool),
            Self::DividendFarm => Some(FarmKind::DividendFarm),
        }
    }

    pub fn is_in(self, farm: FarmKind) -> bool {
        self.farm() == Some(farm)
    }
}

impl From<FarmKind> for Placement {
    fn from(kind: FarmKind) -> Self {
        match kind {
            FarmKind::YieldPool => Self::YieldPool,
            FarmKind::DividendFarm => Self::DividendFarm,
        }
    }
}

/// Tokens of one type bought on one day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Holding {
    pub amount: Amount,
    pub placement: Placement,
    /// Day the holding last moved between farms; `None` if it never moved.
    pub last_freeze_day: Option<Day>,
}

impl Holding {
    /// Whether the freeze from the last move has elapsed by `day`.
    pub fn is_unfrozen(&self, day: Day, freeze_period: u32) -> bool {
        match self.last_freeze_day {
            None => true,
            Some(frozen_on) => day >= frozen_on && day - frozen_on >= freeze_period,
        }
    }
}

/// What a call to [`Investor::transfer_eligible_holdings`] moved.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransferOutcome {
    pub holdings_moved: usize,
    /// Everything deposited into the target farm, per type.
    pub deposited: TokenAmounts,
    /// The part of `deposited` withdrawn from the source farm.
    pub withdrawn: TokenAmounts,
}

impl TransferOutcome {
    pub fn is_empty(&self) -> bool {
        self.holdings_moved == 0
    }
}

/// A single investor with fixed behavioural coefficients.
#[derive(Debug, Clone)]
pub struct Investor {
    id: InvestorId,
    cohort: TokenType,
    risk_coefficient: f64,
    activity_coefficient: f64,
    last_day: Day,
    holdings: BTreeMap<(TokenType, Day), Holding>,
}

impl Investor {
    pub fn new(
        id: InvestorId,
        cohort: TokenType,
        risk_coefficient: f64,
        activity_coefficient: f64,
        horizon: Day,
    ) -> Self {
        Self {
            id,
            cohort,
            risk_coefficient,
            activity_coefficient,
            last_day: horizon + 1,
            holdings: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> InvestorId {
        self.id
    }

    pub fn cohort(&self) -> TokenType {
        self.cohort
    }

    pub fn risk_coefficient(&self) -> f64 {
        self.risk_coefficient
    }

    pub fn activity_coefficient(&self) -> f64 {
        self.activity_coefficient
    }

    fn check_day(&self, day: Day) -> Result<(), LedgerError> {
        if day == 0 || day > self.last_day {
            return Err(LedgerError::DayOutOfRange {
                day,
                last_day: self.last_day,
            });
        }
        Ok(())
    }

    /// The holding bought on `day`, if any.
    pub fn holding(&self, token: TokenType, day: Day) -> Option<&Holding> {
        self.holdings.get(&(token, day))
    }

    /// All holdings with their `(type, purchase day)` keys.
    pub fn holdings(&self) -> impl Iterator<Item = (TokenType, Day, &Holding)> {
        self.holdings.iter().map(|((t, d), h)| (*t, *d, h))
    }

    /// Credit tokens bought (or earned) on `day`. Zero amounts are skipped.
    pub fn grant_tokens(&mut self, amounts: &TokenAmounts, day: Day) -> Result<(), LedgerError> {
        self.check_day(day)?;
        for (token, amount) in amounts.nonzero() {
            if token.is_reserve() {
                return Err(LedgerError::NotHoldable(token));
            }
            if !amount.is_finite() || amount < 0.0 {
                return Err(LedgerError::InvalidAmount { token, amount });
            }
        }
        for (token, amount) in amounts.nonzero() {
            self.holdings.entry((token, day)).or_default().amount += amount;
        }
        Ok(())
    }

    /// Tokens bought on or before `day` and currently deposited in `farm`.
    pub fn get_deposited_amount(&self, farm: FarmKind, day: Day) -> Amount {
        self.holdings
            .iter()
            .filter(|((_, bought), h)| *bought <= day && h.placement.is_in(farm))
            .map(|(_, h)| h.amount)
            .sum()
    }

    /// Tokens bought on or before `day`, wherever they sit.
    pub fn total_amount(&self, day: Day) -> Amount {
        self.holdings
            .iter()
            .filter(|((_, bought), _)| *bought <= day)
            .map(|(_, h)| h.amount)
            .sum()
    }

    /// Move every eligible holding into `target`.
    ///
    /// A holding is eligible when it was bought on or before `day`, is
    /// positive, is not already in `target`, and its freeze has elapsed.
    /// Eligible amounts are deposited into `target`; the part that sat in
    /// `source` is withdrawn from it. The withdrawal is checked before the
    /// deposit, so a failed transfer leaves both farms and all holdings
    /// untouched.
    pub fn transfer_eligible_holdings(
        &mut self,
        target: &mut Farm,
        source: &mut Farm,
        day: Day,
        freeze_period: u32,
    ) -> Result<TransferOutcome, LedgerError> {
        if target.kind() == source.kind() {
            return Err(LedgerError::SameFarm(target.kind()));
        }
        self.check_day(day)?;

        let target_place = Placement::from(target.kind());
        let mut outcome = TransferOutcome::default();
        let mut selected = Vec::new();

        for (&(token, bought), holding) in &self.holdings {
            if bought > day
                || holding.amount <= 0.0
                || holding.placement == target_place
                || !holding.is_unfrozen(day, freeze_period)
            {
                continue;
            }
            outcome.deposited.add(token, holding.amount);
            if holding.placement.is_in(source.kind()) {
                outcome.withdrawn.add(token, holding.amount);
            }
            selected.push((token, bought));
        }

        if selected.is_empty() {
            return Ok(outcome);
        }

        let withdraws = !outcome.withdrawn.is_zero();
        if withdraws {
            source.check_withdrawal(&outcome.withdrawn, day)?;
        }
        target.add_tokens(&outcome.deposited, day, None)?;
        if withdraws {
            source.remove_tokens(&outcome.withdrawn, day, None)?;
        }

        for key in &selected {
            if let Some(holding) = self.holdings.get_mut(key) {
                holding.placement = target_place;
                holding.last_freeze_day = Some(day);
            }
        }
        outcome.holdings_moved = selected.len();

        trace!(
            investor = %self.id,
            day,
            target = %target.kind(),
            holdings = outcome.holdings_moved,
            amount = outcome.deposited.total(),
            "holdings transferred"
        );
        Ok(outcome)
    }
}
