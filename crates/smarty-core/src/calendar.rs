//! Calendar math and the turnover growth curve.
//!
//! Months are a fixed 30 days. Absolute day numbering is
//! `month * 30 + day_in_month` with `day_in_month` in `1..=30`.
//!
//! Turnover grows piecewise linearly: within year `y` (1-based) the daily
//! value climbs from `initial * (1 + rate)^(y-1)` to `initial * (1 + rate)^y`
//! in 365 equal steps. Index 0 of the series is the flat baseline.

use crate::constants::{DAYS_PER_MONTH, DAYS_PER_YEAR};
use crate::types::{Day, Month};

/// Month index of an absolute day. Day 0 maps to month 0.
pub fn month_of(day: Day) -> Month {
    if day == 0 {
        0
    } else {
        (day - 1) / DAYS_PER_MONTH
    }
}

/// Position of an absolute day inside its month, in `1..=30`.
pub fn day_in_month(day: Day) -> u32 {
    if day == 0 {
        0
    } else {
        (day - 1) % DAYS_PER_MONTH + 1
    }
}

/// Absolute day for a 0-based month and a 1-based day inside it.
pub fn absolute_day(month: Month, day_in_month: u32) -> Day {
    month * DAYS_PER_MONTH + day_in_month
}

/// Last absolute day of a run spanning `num_months` months.
pub fn horizon_days(num_months: u32) -> Day {
    num_months * DAYS_PER_MONTH
}

/// Whole years of turnover needed to cover `num_months`.
pub fn years_for_months(num_months: u32) -> u32 {
    num_months / 12 + 1
}

/// Day-indexed turnover values of length `365 * num_years + 1`.
///
/// Values are computed on demand; [`TurnoverSeries::iter`] can be called any
/// number of times and always starts from index 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnoverSeries {
    initial: f64,
    annual_rate: f64,
    num_years: u32,
}

impl TurnoverSeries {
    pub fn new(initial: f64, annual_rate: f64, num_years: u32) -> Self {
        Self {
            initial,
            annual_rate,
            num_years,
        }
    }

    /// Number of values in the series.
    pub fn len(&self) -> usize {
        (DAYS_PER_YEAR * self.num_years) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.len() {
            return None;
        }
        if index == 0 {
            return Some(self.initial);
        }
        let per_year = DAYS_PER_YEAR as usize;
        let year = (index - 1) / per_year + 1;
        let step = (index - 1) % per_year + 1;

        let prev = self.initial * (1.0 + self.annual_rate).powi(year as i32 - 1);
        let next = self.initial * (1.0 + self.annual_rate).powi(year as i32);
        let delta = (next - prev) / DAYS_PER_YEAR as f64;
        Some(prev + step as f64 * delta)
    }

    /// Turnover applied to the settlement of absolute `day`.
    ///
    /// Day `d` reads index `d - 1`, so day 1 settles on the flat baseline.
    pub fn for_day(&self, day: Day) -> Option<f64> {
        self.get(day.saturating_sub(1) as usize)
    }

    pub fn iter(&self) -> TurnoverIter {
        TurnoverIter {
            series: *self,
            next: 0,
        }
    }
}

impl IntoIterator for &TurnoverSeries {
    type Item = f64;
    type IntoIter = TurnoverIter;

    fn into_iter(self) -> TurnoverIter {
        self.iter()
    }
}

/// Iterator over a [`TurnoverSeries`].
#[derive(Debug, Clone)]
pub struct TurnoverIter {
    series: TurnoverSeries,
    next: usize,
}

impl Iterator for TurnoverIter {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let value = self.series.get(self.next)?;
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.series.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TurnoverIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn month_of_boundaries() {
        assert_eq!(month_of(0), 0);
        assert_eq!(month_of(1), 0);
        assert_eq!(month_of(30), 0);
        assert_eq!(month_of(31), 1);
        assert_eq!(month_of(60), 1);
        assert_eq!(month_of(61), 2);
    }

    #[test]
    fn day_in_month_wraps() {
        assert_eq!(day_in_month(1), 1);
        assert_eq!(day_in_month(30), 30);
        assert_eq!(day_in_month(31), 1);
        assert_eq!(day_in_month(0), 0);
    }

    #[test]
    fn absolute_day_roundtrip() {
        assert_eq!(absolute_day(0, 1), 1);
        assert_eq!(absolute_day(2, 15), 75);
        assert_eq!(month_of(75), 2);
        assert_eq!(day_in_month(75), 15);
    }

    #[test]
    fn horizon_and_years() {
        assert_eq!(horizon_days(48), 1440);
        assert_eq!(years_for_months(11), 1);
        assert_eq!(years_for_months(12), 2);
        assert_eq!(years_for_months(48), 5);
    }

    #[test]
    fn series_length() {
        let s = TurnoverSeries::new(1000.0, 0.2, 3);
        assert_eq!(s.len(), 365 * 3 + 1);
        assert_eq!(s.iter().count(), s.len());
        assert_eq!(s.iter().len(), s.len());
    }

    #[test]
    fn series_flat_then_linear_within_year() {
        let s = TurnoverSeries::new(1000.0, 0.365, 1);
        assert_eq!(s.get(0), Some(1000.0));
        // 365 equal steps of 1.0 from 1000 to 1365
        assert!((s.get(1).unwrap() - 1001.0).abs() < 1e-9);
        assert!((s.get(100).unwrap() - 1100.0).abs() < 1e-9);
        assert!((s.get(365).unwrap() - 1365.0).abs() < 1e-9);
        assert_eq!(s.get(366), None);
    }

    #[test]
    fn series_second_year_starts_from_first_year_end() {
        let s = TurnoverSeries::new(100.0, 1.0, 2);
        assert!((s.get(365).unwrap() - 200.0).abs() < 1e-9);
        assert!((s.get(730).unwrap() - 400.0).abs() < 1e-9);
        let step = s.get(366).unwrap() - s.get(365).unwrap();
        assert!((step - 200.0 / 365.0).abs() < 1e-9);
    }

    #[test]
    fn series_is_restartable() {
        let s = TurnoverSeries::new(50.0, 0.1, 1);
        let a: Vec<f64> = s.iter().collect();
        let b: Vec<f64> = (&s).into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn for_day_reads_previous_index() {
        let s = TurnoverSeries::new(1000.0, 0.365, 1);
        assert_eq!(s.for_day(1), Some(1000.0));
        assert_eq!(s.for_day(2), s.get(1));
        assert_eq!(s.for_day(367), None);
    }

    #[test]
    fn zero_growth_is_flat() {
        let s = TurnoverSeries::new(42.0, 0.0, 2);
        assert!(s.iter().all(|v| (v - 42.0).abs() < 1e-12));
    }

    proptest! {
        #[test]
        fn month_of_matches_absolute_day(month in 0u32..1000, d in 1u32..=30) {
            let day = absolute_day(month, d);
            prop_assert_eq!(month_of(day), month);
            prop_assert_eq!(day_in_month(day), d);
        }

        #[test]
        fn series_monotonic_for_positive_growth(rate in 0.0f64..2.0, years in 1u32..4) {
            let s = TurnoverSeries::new(500.0, rate, years);
            let values: Vec<f64> = s.iter().collect();
            for w in values.windows(2) {
                prop_assert!(w[1] + 1e-9 >= w[0]);
            }
        }
    }
}
