//! Simulation constants. Token amounts are in whole Smarty units, reserve
//! amounts in units of the reserve currency (BNB).

/// Every simulated month is exactly this many days long.
pub const DAYS_PER_MONTH: u32 = 30;

/// Days per year used by the turnover growth curve.
pub const DAYS_PER_YEAR: u32 = 365;

/// Balances above `-BALANCE_EPSILON` are treated as non-negative at day end.
///
/// Reserve balances move by `amount * rate` on every deposit and withdrawal,
/// so exact zero is not reachable in floating point after a round trip.
pub const BALANCE_EPSILON: f64 = 1e-6;

/// Default number of days a holding must stay in a farm before it can move.
pub const DEFAULT_FREEZE_PERIOD: u32 = 10;

/// Default share of daily dividends routed to the yield pool.
pub const DEFAULT_DIVIDEND_SPLIT: f64 = 0.5;

/// Environment prefix for configuration overrides (`SMARTY__NUM_MONTHS=12`).
pub const ENV_PREFIX: &str = "SMARTY";
