//! Core simulation types: token and dividend kinds, farm kinds, per-type
//! amount vectors and identifiers.
//!
//! Token types form a closed enumeration so every per-type table is a fixed
//! array indexed by [`TokenType::index`] rather than a string-keyed lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// A 1-based simulated day. Day 0 exists only as the turnover baseline.
pub type Day = u32;

/// A 0-based month index (`(day - 1) / 30`).
pub type Month = u32;

/// Token, reserve and dividend quantities.
pub type Amount = f64;

/// The recognized token types.
///
/// `Reserve` is the synthetic reserve currency tracked only inside the
/// yield pool; investors never hold it and it is never minted or sold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Seed,
    PrivateSale,
    PublicSale,
    Team,
    Community,
    StakingRewards,
    Reserve,
}

impl TokenType {
    /// Number of token types.
    pub const COUNT: usize = 7;

    /// All token types in declaration order.
    pub const ALL: [TokenType; Self::COUNT] = [
        Self::Seed,
        Self::PrivateSale,
        Self::PublicSale,
        Self::Team,
        Self::Community,
        Self::StakingRewards,
        Self::Reserve,
    ];

    /// Position of this type in per-type arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this is the synthetic reserve currency.
    pub const fn is_reserve(self) -> bool {
        matches!(self, Self::Reserve)
    }

    /// Ordinary (non-reserve) token types.
    pub fn ordinary() -> impl Iterator<Item = TokenType> {
        Self::ALL.into_iter().filter(|t| !t.is_reserve())
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seed => "Seed",
            Self::PrivateSale => "Private sale",
            Self::PublicSale => "Public sale",
            Self::Team => "Team",
            Self::Community => "Community",
            Self::StakingRewards => "Staking rewards",
            Self::Reserve => "Reserve",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Source of an accrued dividend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DividendKind {
    /// A share of the daily shop turnover.
    Turnover,
    /// Tokens minted to lift the yield up to the index revenue floor.
    Minted,
}

impl DividendKind {
    pub const COUNT: usize = 2;
    pub const ALL: [DividendKind; Self::COUNT] = [Self::Turnover, Self::Minted];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DividendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Turnover => f.write_str("Turnover"),
            Self::Minted => f.write_str("Minted"),
        }
    }
}

/// The two farm variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FarmKind {
    /// Tracks a reserve-currency balance and a genesis reserve exclusion.
    YieldPool,
    /// Plain dividend farm without reserve tracking.
    DividendFarm,
}

impl fmt::Display for FarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YieldPool => f.write_str("yield pool"),
            Self::DividendFarm => f.write_str("dividend farm"),
        }
    }
}

/// Sequential investor identifier, assigned in cohort order at creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct InvestorId(pub u32);

impl fmt::Display for InvestorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One amount per token type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TokenAmounts([Amount; TokenType::COUNT]);

impl TokenAmounts {
    /// All zeroes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: TokenType) -> Amount {
        self.0[token.index()]
    }

    /// Add `amount` to the entry for `token`.
    pub fn add(&mut self, token: TokenType, amount: Amount) {
        self.0[token.index()] += amount;
    }

    /// All `(type, amount)` pairs in declaration order, zeroes included.
    pub fn iter(&self) -> impl Iterator<Item = (TokenType, Amount)> + '_ {
        TokenType::ALL.into_iter().map(|t| (t, self.get(t)))
    }

    /// Only the entries with a nonzero amount.
    pub fn nonzero(&self) -> impl Iterator<Item = (TokenType, Amount)> + '_ {
        self.iter().filter(|(_, amount)| *amount != 0.0)
    }

    /// Every entry multiplied by -1.
    pub fn negated(&self) -> Self {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v = -*v;
        }
        out
    }

    /// Sum over all types, reserve included.
    pub fn total(&self) -> Amount {
        self.0.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl Index<TokenType> for TokenAmounts {
    type Output = Amount;

    fn index(&self, token: TokenType) -> &Amount {
        &self.0[token.index()]
    }
}

impl FromIterator<(TokenType, Amount)> for TokenAmounts {
    fn from_iter<I: IntoIterator<Item = (TokenType, Amount)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (token, amount) in iter {
            out.add(token, amount);
        }
        out
    }
}

impl<const N: usize> From<[(TokenType, Amount); N]> for TokenAmounts {
    fn from(pairs: [(TokenType, Amount); N]) -> Self {
        pairs.into_iter().collect()
    }
}
