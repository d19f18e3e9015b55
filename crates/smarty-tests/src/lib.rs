//! Scenario test suite for the Smarty simulator.
//!
//! Integration tests that drive the ledger, engine and clock together and
//! check the accounting invariants across whole runs.

pub mod helpers;
