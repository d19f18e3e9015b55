//! Exact-sum random splitting of an integer total.
//!
//! A flat Dirichlet proportion vector is scaled by the total and rounded;
//! the rounding drift is then removed one unit at a time by nudging randomly
//! chosen entries. Entries never go below zero and the result always sums to
//! the requested total.

use tracing::trace;

use crate::error::AllocationError;
use crate::traits::RandomSource;

/// Splits integer totals into random non-negative shares.
#[derive(Debug, Clone)]
pub struct RandomAllocator<S> {
    source: S,
}

impl<S: RandomSource> RandomAllocator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Split `total` into `count` non-negative integers summing to `total`.
    pub fn allocate(&mut self, total: u64, count: usize) -> Result<Vec<u64>, AllocationError> {
        if count == 0 {
            return Err(AllocationError::ZeroParts { total });
        }
        if count == 1 {
            return Ok(vec![total]);
        }

        let proportions = self.source.flat_dirichlet(count);
        let mut shares: Vec<u64> = proportions
            .iter()
            .map(|p| (p * total as f64).round().max(0.0) as u64)
            .collect();

        let assigned: u64 = shares.iter().sum();
        let mut drift = total as i128 - assigned as i128;
        if drift != 0 {
            trace!(total, count, drift, "correcting rounding drift");
        }

        while drift != 0 {
            let i = self.source.index(count);
            if drift > 0 {
                shares[i] += 1;
                drift -= 1;
            } else if shares[i] > 0 {
                shares[i] -= 1;
                drift += 1;
            }
        }

        Ok(shares)
    }
}
