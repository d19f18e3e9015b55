//! A single day-indexed column of amounts.

use smarty_core::error::LedgerError;
use smarty_core::types::{Amount, Day};

/// Amounts for days `1..=last_day`, allocated up front.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTable {
    // Index 0 is never addressed; it keeps `values[day]` direct.
    values: Vec<Amount>,
}

impl DayTable {
    /// A zeroed table covering days `1..=last_day`.
    pub fn new(last_day: Day) -> Self {
        Self {
            values: vec![0.0; last_day as usize + 1],
        }
    }

    pub fn last_day(&self) -> Day {
        (self.values.len() - 1) as Day
    }

    fn slot(&self, day: Day) -> Result<usize, LedgerError> {
        if day == 0 || day > self.last_day() {
            return Err(LedgerError::DayOutOfRange {
                day,
                last_day: self.last_day(),
            });
        }
        Ok(day as usize)
    }

    pub fn get(&self, day: Day) -> Result<Amount, LedgerError> {
        Ok(self.values[self.slot(day)?])
    }

    pub fn set(&mut self, day: Day, value: Amount) -> Result<(), LedgerError> {
        let i = self.slot(day)?;
        self.values[i] = value;
        Ok(())
    }

    pub fn add(&mut self, day: Day, delta: Amount) -> Result<(), LedgerError> {
        let i = self.slot(day)?;
        self.values[i] += delta;
        Ok(())
    }

    /// Copy the value of `day` into `day + 1`.
    pub fn carry_forward(&mut self, day: Day) -> Result<(), LedgerError> {
        let from = self.slot(day)?;
        let to = self.slot(day + 1)?;
        self.values[to] = self.values[from];
        Ok(())
    }

    /// Values for days `1..=last_day`, in order.
    pub fn days(&self) -> &[Amount] {
        &self.values[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_is_zero() {
        let t = DayTable::new(5);
        assert_eq!(t.last_day(), 5);
        assert_eq!(t.days(), &[0.0; 5]);
    }

    #[test]
    fn day_zero_and_past_horizon_rejected() {
        let mut t = DayTable::new(3);
        assert_eq!(t.get(0), Err(LedgerError::DayOutOfRange { day: 0, last_day: 3 }));
        assert_eq!(t.add(4, 1.0), Err(LedgerError::DayOutOfRange { day: 4, last_day: 3 }));
        assert!(t.get(3).is_ok());
    }

    #[test]
    fn carry_forward_copies_value() {
        let mut t = DayTable::new(3);
        t.add(1, 7.5).unwrap();
        t.carry_forward(1).unwrap();
        assert_eq!(t.get(2).unwrap(), 7.5);
        assert_eq!(t.get(3).unwrap(), 0.0);
    }

    #[test]
    fn carry_forward_from_last_day_fails() {
        let mut t = DayTable::new(2);
        assert!(t.carry_forward(2).is_err());
    }

    #[test]
    fn set_overwrites() {
        let mut t = DayTable::new(2);
        t.add(2, 3.0).unwrap();
        t.set(2, 1.0).unwrap();
        assert_eq!(t.get(2).unwrap(), 1.0);
    }
}
