//! # smarty-ledger: Day-indexed token ledgers.
//!
//! - **Day tables**: every per-day quantity lives in a column pre-sized to the
//!   simulation horizon; moving from one day to the next is an explicit
//!   carry-forward, never an implicit reset.
//! - **Farms**: pooled token and dividend balances. The yield pool also tracks
//!   a reserve-currency balance and a genesis reserve that is excluded from
//!   yield denominators.
//! - **Investors**: per-purchase holdings tagged with their current farm and
//!   the day they last moved, which gates transfers during the freeze period.

pub mod farm;
pub mod investor;
pub mod table;

pub use farm::{Farm, FarmSnapshot, FloorOutcome};
pub use investor::{Holding, Investor, Placement, TransferOutcome};
pub use table::DayTable;
