//! # smarty-engine: Allocation engine and simulation clock.
//!
//! - **Cohorts**: investors grouped by the token type they buy, created once
//!   with fixed risk and activity coefficients.
//! - **Mint schedule**: monthly releases with excluded types dropped and the
//!   genesis seed withheld, spread over the days of each month.
//! - **Allocation engine**: token sales, turnover dividends, the minting
//!   floor, greedy activity-ordered rebalancing and pro-rata payouts.
//! - **Clock**: runs the fixed per-day settlement order and records one
//!   observation per day.

pub mod allocation;
pub mod clock;
pub mod cohort;
pub mod mint;
pub mod report;

pub use allocation::{AllocationEngine, DividendAccrual, PayoutSummary, RebalanceSummary};
pub use clock::SimulationClock;
pub use cohort::Cohorts;
pub use mint::MintSchedule;
pub use report::{DayObservation, FarmPair, InvestorSummary, SimulationReport};
