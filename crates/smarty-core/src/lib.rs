//! # smarty-core
//! Foundation types and traits for the Smarty token economy simulator.

pub mod allocator;
pub mod calendar;
pub mod constants;
pub mod error;
pub mod params;
pub mod traits;
pub mod types;

pub use allocator::RandomAllocator;
pub use calendar::{month_of, TurnoverSeries};
pub use params::SimulationParams;
pub use traits::RandomSource;
pub use types::{Amount, Day, DividendKind, FarmKind, InvestorId, Month, TokenAmounts, TokenType};
