//! Error types for the Smarty simulator.
use std::fmt;

use thiserror::Error;

use crate::types::{Day, FarmKind, InvestorId, TokenType};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing parameter: {0}")] MissingParameter(String),
    #[error("invalid parameter {name}: {reason}")] InvalidParameter { name: String, reason: String },
    #[error("token type {0} is not in the recognized token list")] UnknownTokenType(TokenType),
    #[error("no investors configured for sold token type {0}")] MissingCohort(TokenType),
    #[error("genesis seed of {seeded} {token} exceeds month-0 mint of {minted}")] GenesisExceedsMint { token: TokenType, seeded: u64, minted: u64 },
    #[error("reserve currency is not allowed in {0}")] ReserveNotAllowed(&'static str),
    #[error("failed to load configuration: {0}")] Load(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("day {day} outside horizon 1..={last_day}")] DayOutOfRange { day: Day, last_day: Day },
    #[error("negative {token} balance {balance} in {farm} on day {day}")] NegativeBalance { farm: FarmKind, token: TokenType, day: Day, balance: f64 },
    #[error("{farm} holds no tokens on day {day}: exchange rate undefined")] EmptyPool { farm: FarmKind, day: Day },
    #[error("{0} does not track a reserve currency")] NotAYieldPool(FarmKind),
    #[error("{token} cannot be held by {farm}")] UnsupportedToken { farm: FarmKind, token: TokenType },
    #[error("invalid {token} amount: {amount}")] InvalidAmount { token: TokenType, amount: f64 },
    #[error("source and target are both the {0}")] SameFarm(FarmKind),
    #[error("{0} cannot be held by investors")] NotHoldable(TokenType),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("cannot split {total} into zero parts")] ZeroParts { total: u64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Allocation(#[from] AllocationError),
    #[error("investor {investor}: {source}")] Investor { investor: InvestorId, source: LedgerError },
    #[error("no cohort for token type {0}")] UnknownCohort(TokenType),
}

/// The settlement step a failed day was executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStep {
    Genesis,
    Sale,
    Dividends,
    Rebalance,
    MintingFloor,
    Payout,
    Advance,
}

impl fmt::Display for SettlementStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Genesis => "genesis seeding",
            Self::Sale => "token sale",
            Self::Dividends => "dividend accrual",
            Self::Rebalance => "rebalancing",
            Self::MintingFloor => "minting floor",
            Self::Payout => "dividend payout",
            Self::Advance => "day advance",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error("day {day}: {step} failed: {source}")] Settlement { day: Day, step: SettlementStep, source: EngineError },
    #[error("simulation horizon of {last_day} days is exhausted")] HorizonExhausted { last_day: Day },
}

#[derive(Error, Debug)]
pub enum SmartyError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Allocation(#[from] AllocationError),
    #[error(transparent)] Engine(#[from] EngineError),
    #[error(transparent)] Simulation(#[from] SimulationError),
    #[error("export: {0}")] Export(String),
}
