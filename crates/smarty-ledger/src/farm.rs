//! Farm ledger: pooled token and dividend balances over time.
//!
//! A farm keeps one [`DayTable`] per token type and one per dividend kind.
//! Same-day operations mutate only the column for that day; the next day is
//! filled by [`Farm::advance_day`], which must run exactly once per day after
//! every mutation for that day.
//!
//! The yield pool additionally tracks the reserve currency in the
//! [`TokenType::Reserve`] column. Every ordinary deposit or withdrawal moves
//! the reserve by `amount * rate`, where `rate` defaults to the exchange rate
//! read *before* the deposit is applied. Tokens seeded at genesis are
//! recorded in `initial_reserve` and left out of yield denominators.

use std::collections::BTreeMap;

use serde::Serialize;
use smarty_core::constants::BALANCE_EPSILON;
use smarty_core::error::LedgerError;
use smarty_core::types::{Amount, Day, DividendKind, FarmKind, TokenAmounts, TokenType};
use tracing::{debug, info};

use crate::table::DayTable;

/// Result of a minting-floor check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorOutcome {
    /// Dividend per token before minting.
    pub current_index: f64,
    /// Tokens minted into the `Minted` bucket (0 when the floor was met).
    pub minted: Amount,
    /// `minted` valued in reserve currency at the supplied exchange rate.
    pub reserve_value: Amount,
}

impl FloorOutcome {
    pub fn was_noop(&self) -> bool {
        self.minted == 0.0
    }
}

/// A pooled ledger of token and dividend balances.
#[derive(Debug, Clone)]
pub struct Farm {
    kind: FarmKind,
    balances: [DayTable; TokenType::COUNT],
    dividends: [DayTable; DividendKind::COUNT],
    initial_reserve: TokenAmounts,
}

impl Farm {
    /// An empty farm covering days `1..=horizon + 1`.
    ///
    /// The extra day receives the carry-forward of the last simulated day.
    pub fn new(kind: FarmKind, horizon: Day) -> Self {
        let last_day = horizon + 1;
        Self {
            kind,
            balances: std::array::from_fn(|_| DayTable::new(last_day)),
            dividends: std::array::from_fn(|_| DayTable::new(last_day)),
            initial_reserve: TokenAmounts::new(),
        }
    }

    pub fn kind(&self) -> FarmKind {
        self.kind
    }

    pub fn is_yield_pool(&self) -> bool {
        self.kind == FarmKind::YieldPool
    }

    pub fn last_day(&self) -> Day {
        self.balances[0].last_day()
    }

    /// Tokens seeded at genesis.
    pub fn initial_reserve(&self) -> &TokenAmounts {
        &self.initial_reserve
    }

    /// Balance of one token type on `day`.
    pub fn balance(&self, token: TokenType, day: Day) -> Result<Amount, LedgerError> {
        self.balances[token.index()].get(day)
    }

    /// Total ordinary tokens held on `day`.
    ///
    /// For the yield pool the genesis reserve is subtracted unless
    /// `include_reserve` is set.
    pub fn get_token_amount(&self, day: Day, include_reserve: bool) -> Result<Amount, LedgerError> {
        let mut total = 0.0;
        for token in TokenType::ordinary() {
            total += self.balance(token, day)?;
        }
        if self.is_yield_pool() && !include_reserve {
            total -= TokenType::ordinary()
                .map(|t| self.initial_reserve.get(t))
                .sum::<Amount>();
        }
        Ok(total)
    }

    /// Reserve-currency balance on `day`; always zero for a dividend farm.
    pub fn get_reserve_amount(&self, day: Day) -> Result<Amount, LedgerError> {
        self.balance(TokenType::Reserve, day)
    }

    /// Reserve currency per token on `day`, genesis tokens included.
    pub fn get_exchange_rate(&self, day: Day) -> Result<f64, LedgerError> {
        if !self.is_yield_pool() {
            return Err(LedgerError::NotAYieldPool(self.kind));
        }
        let tokens = self.get_token_amount(day, true)?;
        if tokens <= 0.0 {
            return Err(LedgerError::EmptyPool {
                farm: self.kind,
                day,
            });
        }
        Ok(self.get_reserve_amount(day)? / tokens)
    }

    /// Deposit tokens on `day`.
    ///
    /// For the yield pool the reserve grows by the ordinary total times
    /// `rate`, or times the pre-deposit exchange rate when `rate` is `None`.
    pub fn add_tokens(
        &mut self,
        amounts: &TokenAmounts,
        day: Day,
        rate: Option<f64>,
    ) -> Result<(), LedgerError> {
        self.apply(amounts, day, rate)
    }

    /// Withdraw tokens on `day`; the exact inverse of [`add_tokens`](Self::add_tokens).
    ///
    /// Balances may dip below zero while a day is being netted; a negative
    /// balance still present at [`advance_day`](Self::advance_day) is an error.
    pub fn remove_tokens(
        &mut self,
        amounts: &TokenAmounts,
        day: Day,
        rate: Option<f64>,
    ) -> Result<(), LedgerError> {
        self.apply(&amounts.negated(), day, rate)
    }

    /// Check that withdrawing `amounts` on `day` would succeed, without
    /// touching any column.
    pub fn check_withdrawal(&self, amounts: &TokenAmounts, day: Day) -> Result<(), LedgerError> {
        self.reserve_delta(&amounts.negated(), day, None).map(|_| ())
    }

    fn apply(&mut self, amounts: &TokenAmounts, day: Day, rate: Option<f64>) -> Result<(), LedgerError> {
        let reserve_delta = self.reserve_delta(amounts, day, rate)?;
        for (token, amount) in amounts.nonzero() {
            self.balances[token.index()].add(day, amount)?;
        }
        if reserve_delta != 0.0 {
            self.balances[TokenType::Reserve.index()].add(day, reserve_delta)?;
        }
        Ok(())
    }

    /// Validate a deposit or withdrawal and return the reserve movement it implies.
    fn reserve_delta(&self, amounts: &TokenAmounts, day: Day, rate: Option<f64>) -> Result<Amount, LedgerError> {
        self.balances[0].get(day)?;
        for (token, amount) in amounts.nonzero() {
            if !amount.is_finite() {
                return Err(LedgerError::InvalidAmount { token, amount });
            }
            if token.is_reserve() && !self.is_yield_pool() {
                return Err(LedgerError::UnsupportedToken {
                    farm: self.kind,
                    token,
                });
            }
        }

        let ordinary: Amount = amounts
            .nonzero()
            .filter(|(t, _)| !t.is_reserve())
            .map(|(_, a)| a)
            .sum();

        if !self.is_yield_pool() || ordinary == 0.0 {
            return Ok(0.0);
        }
        let rate = match rate {
            Some(r) if r.is_finite() && r >= 0.0 => r,
            Some(r) => {
                return Err(LedgerError::InvalidAmount {
                    token: TokenType::Reserve,
                    amount: r,
                });
            }
            None => self.get_exchange_rate(day)?,
        };
        Ok(ordinary * rate)
    }

    /// Seed the yield pool with genesis tokens at an explicit rate.
    ///
    /// Seeded tokens are excluded from yield denominators from then on.
    pub fn seed_genesis(&mut self, amounts: &TokenAmounts, day: Day, rate: f64) -> Result<(), LedgerError> {
        if !self.is_yield_pool() {
            return Err(LedgerError::NotAYieldPool(self.kind));
        }
        if let Some((token, _)) = amounts.nonzero().find(|(t, _)| t.is_reserve()) {
            return Err(LedgerError::InvalidAmount {
                token,
                amount: amounts.get(token),
            });
        }
        self.add_tokens(amounts, day, Some(rate))?;
        for (token, amount) in amounts.nonzero() {
            self.initial_reserve.add(token, amount);
        }
        info!(farm = %self.kind, day, tokens = amounts.total(), rate, "genesis reserve seeded");
        Ok(())
    }

    /// Accrued dividends of one kind on `day`.
    pub fn dividends(&self, kind: DividendKind, day: Day) -> Result<Amount, LedgerError> {
        self.dividends[kind.index()].get(day)
    }

    /// Add `amount` to the `kind` dividend bucket on `day`.
    pub fn accrue_dividends(&mut self, day: Day, kind: DividendKind, amount: Amount) -> Result<(), LedgerError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::InvalidAmount {
                token: TokenType::StakingRewards,
                amount,
            });
        }
        self.dividends[kind.index()].add(day, amount)
    }

    /// Mint into the `Minted` bucket so that dividends per token reach
    /// `min_index_revenue`.
    ///
    /// The index is `dividends_total / token_amount` with the genesis reserve
    /// excluded. A farm with no depositors, or one already at the floor, is
    /// left unchanged.
    pub fn accrue_by_floor(
        &mut self,
        day: Day,
        min_index_revenue: f64,
        exchange_rate: f64,
    ) -> Result<FloorOutcome, LedgerError> {
        let tokens = self.get_token_amount(day, false)?;
        let dividends = self.dividends_total(day)?;
        if tokens <= 0.0 {
            info!(farm = %self.kind, day, "no deposited tokens, minting floor skipped");
            return Ok(FloorOutcome {
                current_index: 0.0,
                minted: 0.0,
                reserve_value: 0.0,
            });
        }

        let current_index = dividends / tokens;
        if current_index >= min_index_revenue {
            info!(
                farm = %self.kind,
                day,
                current_index,
                min_index_revenue,
                "index revenue meets floor, nothing minted"
            );
            return Ok(FloorOutcome {
                current_index,
                minted: 0.0,
                reserve_value: 0.0,
            });
        }

        let minted = (min_index_revenue - current_index) * tokens;
        self.accrue_dividends(day, DividendKind::Minted, minted)?;
        let reserve_value = minted * exchange_rate;
        info!(farm = %self.kind, day, current_index, minted, reserve_value, "minted to index revenue floor");
        Ok(FloorOutcome {
            current_index,
            minted,
            reserve_value,
        })
    }

    /// Sum of all dividend buckets on `day`.
    pub fn dividends_total(&self, day: Day) -> Result<Amount, LedgerError> {
        let mut total = 0.0;
        for kind in DividendKind::ALL {
            total += self.dividends(kind, day)?;
        }
        Ok(total)
    }

    /// Zero every dividend bucket on `day`.
    pub fn clear_dividends(&mut self, day: Day) -> Result<(), LedgerError> {
        for table in self.dividends.iter_mut() {
            table.set(day, 0.0)?;
        }
        Ok(())
    }

    /// Close `day`: reject negative balances, then carry balances into
    /// `day + 1`. Dividends are carried too, or start from zero on `day + 1`
    /// when `clear_dividends` is set.
    pub fn advance_day(&mut self, day: Day, clear_dividends: bool) -> Result<(), LedgerError> {
        for token in TokenType::ALL {
            let balance = self.balance(token, day)?;
            if balance < -BALANCE_EPSILON {
                return Err(LedgerError::NegativeBalance {
                    farm: self.kind,
                    token,
                    day,
                    balance,
                });
            }
        }

        for table in self.balances.iter_mut() {
            table.carry_forward(day)?;
        }
        for table in self.dividends.iter_mut() {
            if clear_dividends {
                table.set(day + 1, 0.0)?;
            } else {
                table.carry_forward(day)?;
            }
        }
        debug!(farm = %self.kind, day, clear_dividends, "farm advanced");
        Ok(())
    }

    /// Read-only copy of every table, for reporting.
    pub fn snapshot(&self) -> FarmSnapshot {
        let balances = TokenType::ALL
            .into_iter()
            .filter(|t| self.is_yield_pool() || !t.is_reserve())
            .map(|t| (t, self.balances[t.index()].days().to_vec()))
            .collect();
        let dividends = DividendKind::ALL
            .into_iter()
            .map(|k| (k, self.dividends[k.index()].days().to_vec()))
            .collect();
        let initial_reserve = self
            .initial_reserve
            .nonzero()
            .collect();
        FarmSnapshot {
            kind: self.kind,
            last_day: self.last_day(),
            balances,
            dividends,
            initial_reserve,
        }
    }
}

/// Day-keyed balance and dividend tables of one farm.
///
/// Entry `i` of every series is day `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmSnapshot {
    pub kind: FarmKind,
    pub last_day: Day,
    pub balances: BTreeMap<TokenType, Vec<Amount>>,
    pub dividends: BTreeMap<DividendKind, Vec<Amount>>,
    pub initial_reserve: BTreeMap<TokenType, Amount>,
}
