//! Immutable simulation parameters.
//!
//! [`SimulationParams`] gathers the three configuration tables the simulator
//! consumes (initial parameters, token-type parameters, mint distribution)
//! into one structure that is validated once and then shared read-only by
//! the clock and the allocation engine. Loading it from disk is the runner's
//! job; this module only defines the shape and the checks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::calendar::horizon_days;
use crate::constants::{DEFAULT_DIVIDEND_SPLIT, DEFAULT_FREEZE_PERIOD};
use crate::error::ConfigError;
use crate::types::{Day, TokenType};

/// Normal distribution of investor risk coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub mean: f64,
    pub std_dev: f64,
}

/// Shop turnover in USD and its annual growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnoverParams {
    pub initial_usd: f64,
    pub annual_growth_rate: f64,
}

/// Per-type token metadata. Price, cliff and vesting are carried for
/// reporting only; the ledger does not act on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenParams {
    pub token_type: TokenType,
    #[serde(default)]
    pub initial_price: f64,
    #[serde(default)]
    pub cliff_months: u32,
    #[serde(default)]
    pub vesting_months: u32,
}

/// How a month's mint is released to investors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Spread every monthly amount over the month's 30 days.
    #[default]
    EvenlyAcrossMonth,
    /// Release the whole month on its first day.
    FirstDayOfMonth,
}

fn default_split() -> f64 {
    DEFAULT_DIVIDEND_SPLIT
}

fn default_freeze() -> u32 {
    DEFAULT_FREEZE_PERIOD
}

fn default_excluded() -> Vec<TokenType> {
    vec![TokenType::Community, TokenType::StakingRewards]
}

fn default_rebalancing() -> Vec<TokenType> {
    vec![TokenType::Seed]
}

/// Everything a simulation run needs, fixed for its whole duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub risk: RiskDistribution,
    pub num_months: u32,
    /// Investor count per cohort.
    pub investors: BTreeMap<TokenType, u32>,
    pub turnover: TurnoverParams,
    /// Share of turnover paid out as dividends, in percent.
    pub dividend_percent: f64,
    /// Share of daily dividends routed to the yield pool; the dividend farm
    /// receives the rest.
    #[serde(default = "default_split")]
    pub dividend_split: f64,
    /// The minting floor is applied on days divisible by this.
    pub extra_mint_period: u32,
    /// Dividends are paid out on days divisible by this.
    pub dividend_period: u32,
    #[serde(default = "default_freeze")]
    pub freeze_period: u32,
    pub min_index_revenue: f64,
    /// USD per unit of reserve currency.
    pub usd_to_reserve_rate: f64,
    /// Reserve currency per token at genesis.
    pub reserve_per_token_rate: f64,
    /// Tokens deposited into the yield pool on day 1.
    pub genesis_pool: BTreeMap<TokenType, u64>,
    /// Token types that are minted but not sold to investors.
    #[serde(default = "default_excluded")]
    pub excluded_tokens: Vec<TokenType>,
    /// Cohorts whose investors take part in daily rebalancing.
    #[serde(default = "default_rebalancing")]
    pub rebalancing_cohorts: Vec<TokenType>,
    #[serde(default)]
    pub release: ReleasePolicy,
    /// Seed for the random source; `None` draws from entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Recognized token types and their metadata.
    pub tokens: Vec<TokenParams>,
    /// Monthly release per token type, indexed by month.
    pub mint_schedule: BTreeMap<TokenType, Vec<u64>>,
}

impl SimulationParams {
    /// Last simulated day.
    pub fn horizon(&self) -> Day {
        horizon_days(self.num_months)
    }

    /// Dividend rate as a fraction of turnover.
    pub fn dividend_rate(&self) -> f64 {
        self.dividend_percent / 100.0
    }

    pub fn is_excluded(&self, token: TokenType) -> bool {
        self.excluded_tokens.contains(&token)
    }

    /// The recognized token types.
    pub fn recognized_tokens(&self) -> BTreeSet<TokenType> {
        self.tokens.iter().map(|t| t.token_type).collect()
    }

    /// Month-0 mint of `token`, or 0 if the schedule has no entry.
    pub fn month_zero_mint(&self, token: TokenType) -> u64 {
        self.mint_schedule
            .get(&token)
            .and_then(|months| months.first().copied())
            .unwrap_or(0)
    }

    /// Check every parameter before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_int("num_months", self.num_months)?;
        positive_int("extra_mint_period", self.extra_mint_period)?;
        positive_int("dividend_period", self.dividend_period)?;
        finite("risk.mean", self.risk.mean)?;
        non_negative("risk.std_dev", self.risk.std_dev)?;
        non_negative("turnover.initial_usd", self.turnover.initial_usd)?;
        finite("turnover.annual_growth_rate", self.turnover.annual_growth_rate)?;
        if self.turnover.annual_growth_rate <= -1.0 {
            return Err(invalid("turnover.annual_growth_rate", "must be greater than -1"));
        }
        non_negative("dividend_percent", self.dividend_percent)?;
        non_negative("min_index_revenue", self.min_index_revenue)?;
        positive("usd_to_reserve_rate", self.usd_to_reserve_rate)?;
        positive("reserve_per_token_rate", self.reserve_per_token_rate)?;
        if !(0.0..=1.0).contains(&self.dividend_split) {
            return Err(invalid("dividend_split", "must lie in [0, 1]"));
        }

        if self.tokens.is_empty() {
            return Err(ConfigError::MissingParameter("tokens".into()));
        }
        let recognized = self.recognized_tokens();
        if recognized.contains(&TokenType::Reserve) {
            return Err(ConfigError::ReserveNotAllowed("tokens"));
        }

        let check_known = |token: &TokenType, table: &'static str| {
            if token.is_reserve() {
                Err(ConfigError::ReserveNotAllowed(table))
            } else if !recognized.contains(token) {
                Err(ConfigError::UnknownTokenType(*token))
            } else {
                Ok(())
            }
        };
        for token in self.investors.keys() {
            check_known(token, "investors")?;
        }
        for token in self.mint_schedule.keys() {
            check_known(token, "mint_schedule")?;
        }
        for token in self.genesis_pool.keys() {
            check_known(token, "genesis_pool")?;
        }
        for token in &self.rebalancing_cohorts {
            check_known(token, "rebalancing_cohorts")?;
        }
        // Staking rewards are granted at payout, so they need to be known
        // even when nothing of that type is minted.
        if !recognized.contains(&TokenType::StakingRewards) {
            return Err(ConfigError::UnknownTokenType(TokenType::StakingRewards));
        }

        if self.genesis_pool.values().sum::<u64>() == 0 {
            return Err(ConfigError::MissingParameter("genesis_pool".into()));
        }

        // Every token type that is sold needs somebody to sell it to.
        for (token, months) in &self.mint_schedule {
            if self.is_excluded(*token) || months.iter().all(|m| *m == 0) {
                continue;
            }
            if self.investors.get(token).copied().unwrap_or(0) == 0 {
                return Err(ConfigError::MissingCohort(*token));
            }
        }

        // Genesis seed of a sold type comes out of its month-0 mint.
        for (token, seeded) in &self.genesis_pool {
            if self.is_excluded(*token) {
                continue;
            }
            let minted = self.month_zero_mint(*token);
            if *seeded > minted {
                return Err(ConfigError::GenesisExceedsMint {
                    token: *token,
                    seeded: *seeded,
                    minted,
                });
            }
        }

        Ok(())
    }
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn positive_int(name: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(invalid(name, "must be at least 1"));
    }
    Ok(())
}

fn finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(invalid(name, "must be finite"));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(invalid(name, "must not be negative"));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(invalid(name, "must be positive"));
    }
    Ok(())
}

#[cfg(any(test, feature = "testing"))]
impl SimulationParams {
    /// A small, valid parameter set: 10 Seed investors, a 1000-token genesis
    /// pool at 0.5 reserve per token and a two-month mint.
    pub fn sample() -> Self {
        let tokens = [
            TokenType::Seed,
            TokenType::PrivateSale,
            TokenType::PublicSale,
            TokenType::Team,
            TokenType::Community,
            TokenType::StakingRewards,
        ]
        .into_iter()
        .map(|token_type| TokenParams {
            token_type,
            initial_price: 0.01,
            cliff_months: 0,
            vesting_months: 0,
        })
        .collect();

        Self {
            risk: RiskDistribution {
                mean: 0.5,
                std_dev: 0.1,
            },
            num_months: 2,
            investors: BTreeMap::from([(TokenType::Seed, 10)]),
            turnover: TurnoverParams {
                initial_usd: 10_000.0,
                annual_growth_rate: 0.2,
            },
            dividend_percent: 0.3,
            dividend_split: DEFAULT_DIVIDEND_SPLIT,
            extra_mint_period: 7,
            dividend_period: 10,
            freeze_period: DEFAULT_FREEZE_PERIOD,
            min_index_revenue: 0.0001,
            usd_to_reserve_rate: 300.0,
            reserve_per_token_rate: 0.5,
            genesis_pool: BTreeMap::from([(TokenType::Seed, 1000)]),
            excluded_tokens: default_excluded(),
            rebalancing_cohorts: default_rebalancing(),
            release: ReleasePolicy::EvenlyAcrossMonth,
            rng_seed: Some(7),
            tokens,
            mint_schedule: BTreeMap::from([
                (TokenType::Seed, vec![31_000, 30_000]),
                (TokenType::Community, vec![5_000, 5_000]),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_valid() {
        SimulationParams::sample().validate().unwrap();
    }

    #[test]
    fn horizon_and_rate() {
        let p = SimulationParams::sample();
        assert_eq!(p.horizon(), 60);
        assert!((p.dividend_rate() - 0.003).abs() < 1e-15);
    }

    #[test]
    fn zero_months_rejected() {
        let mut p = SimulationParams::sample();
        p.num_months = 0;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::InvalidParameter { name, .. }) if name == "num_months"
        ));
    }

    #[test]
    fn split_out_of_range_rejected() {
        let mut p = SimulationParams::sample();
        p.dividend_split = 1.5;
        assert!(p.validate().is_err());
    }

    #[test]
    fn non_positive_rates_rejected() {
        let mut p = SimulationParams::sample();
        p.reserve_per_token_rate = 0.0;
        assert!(p.validate().is_err());

        let mut p = SimulationParams::sample();
        p.usd_to_reserve_rate = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn unrecognized_token_in_mint_rejected() {
        let mut p = SimulationParams::sample();
        p.tokens.retain(|t| t.token_type != TokenType::Community);
        assert_eq!(
            p.validate(),
            Err(ConfigError::UnknownTokenType(TokenType::Community))
        );
    }

    #[test]
    fn reserve_cannot_be_minted() {
        let mut p = SimulationParams::sample();
        p.mint_schedule.insert(TokenType::Reserve, vec![1]);
        assert_eq!(p.validate(), Err(ConfigError::ReserveNotAllowed("mint_schedule")));
    }

    #[test]
    fn sold_type_without_cohort_rejected() {
        let mut p = SimulationParams::sample();
        p.mint_schedule.insert(TokenType::Team, vec![100, 0]);
        assert_eq!(p.validate(), Err(ConfigError::MissingCohort(TokenType::Team)));
    }

    #[test]
    fn excluded_type_needs_no_cohort() {
        let p = SimulationParams::sample();
        assert!(p.is_excluded(TokenType::Community));
        assert!(!p.investors.contains_key(&TokenType::Community));
        p.validate().unwrap();
    }

    #[test]
    fn empty_genesis_rejected() {
        let mut p = SimulationParams::sample();
        p.genesis_pool.clear();
        assert_eq!(
            p.validate(),
            Err(ConfigError::MissingParameter("genesis_pool".into()))
        );
    }

    #[test]
    fn genesis_larger_than_first_mint_rejected() {
        let mut p = SimulationParams::sample();
        p.genesis_pool.insert(TokenType::Seed, 40_000);
        assert_eq!(
            p.validate(),
            Err(ConfigError::GenesisExceedsMint {
                token: TokenType::Seed,
                seeded: 40_000,
                minted: 31_000,
            })
        );
    }

    #[test]
    fn staking_rewards_must_be_recognized() {
        let mut p = SimulationParams::sample();
        p.tokens.retain(|t| t.token_type != TokenType::StakingRewards);
        p.excluded_tokens.retain(|t| *t != TokenType::StakingRewards);
        assert_eq!(
            p.validate(),
            Err(ConfigError::UnknownTokenType(TokenType::StakingRewards))
        );
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let json = serde_json::json!({
            "risk": { "mean": 0.0, "std_dev": 1.0 },
            "num_months": 1,
            "investors": { "seed": 2 },
            "turnover": { "initial_usd": 100.0, "annual_growth_rate": 0.1 },
            "dividend_percent": 0.3,
            "extra_mint_period": 5,
            "dividend_period": 5,
            "min_index_revenue": 0.0,
            "usd_to_reserve_rate": 300.0,
            "reserve_per_token_rate": 0.5,
            "genesis_pool": { "seed": 10 },
            "tokens": [{ "token_type": "seed" }, { "token_type": "staking_rewards" }],
            "mint_schedule": { "seed": [100] }
        });
        let p: SimulationParams = serde_json::from_value(json).unwrap();
        assert_eq!(p.freeze_period, DEFAULT_FREEZE_PERIOD);
        assert_eq!(p.dividend_split, DEFAULT_DIVIDEND_SPLIT);
        assert_eq!(p.rebalancing_cohorts, vec![TokenType::Seed]);
        assert_eq!(p.release, ReleasePolicy::EvenlyAcrossMonth);
        assert_eq!(p.rng_seed, None);
        p.validate().unwrap();
    }
}
