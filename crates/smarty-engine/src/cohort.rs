//! Investor cohorts.

use std::collections::BTreeMap;

use smarty_core::traits::RandomSource;
use smarty_core::types::{Day, InvestorId, TokenType};
use smarty_core::SimulationParams;
use smarty_ledger::Investor;
use tracing::info;

/// Investors grouped by the token type they buy, in `TokenType` order.
#[derive(Debug, Clone, Default)]
pub struct Cohorts {
    groups: BTreeMap<TokenType, Vec<Investor>>,
}

impl Cohorts {
    /// Create every configured investor.
    ///
    /// Risk is drawn from the configured normal distribution and activity
    /// uniformly from `[0, 1)`. Ids run sequentially in cohort order.
    pub fn create<S: RandomSource + ?Sized>(
        params: &SimulationParams,
        horizon: Day,
        source: &mut S,
    ) -> Self {
        let mut groups = BTreeMap::new();
        let mut next_id = 0u32;
        for (&token, &count) in &params.investors {
            let members = (0..count)
                .map(|_| {
                    let risk = source.normal(params.risk.mean, params.risk.std_dev);
                    let activity = source.unit();
                    let investor = Investor::new(InvestorId(next_id), token, risk, activity, horizon);
                    next_id += 1;
                    investor
                })
                .collect::<Vec<_>>();
            info!(cohort = %token, investors = members.len(), "cohort created");
            groups.insert(token, members);
        }
        Self { groups }
    }

    /// Wrap pre-built investors.
    pub fn from_groups(groups: BTreeMap<TokenType, Vec<Investor>>) -> Self {
        Self { groups }
    }

    pub fn get(&self, cohort: TokenType) -> Option<&[Investor]> {
        self.groups.get(&cohort).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, cohort: TokenType) -> Option<&mut [Investor]> {
        self.groups.get_mut(&cohort).map(Vec::as_mut_slice)
    }

    /// Every investor, cohorts in order.
    pub fn iter(&self) -> impl Iterator<Item = &Investor> {
        self.groups.values().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Investor> {
        self.groups.values_mut().flatten()
    }

    pub fn cohort_types(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.groups.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ids_are_sequential_in_cohort_order() {
        let mut params = SimulationParams::sample();
        params.investors.insert(TokenType::Team, 3);
        let mut rng = StdRng::seed_from_u64(1);
        let cohorts = Cohorts::create(&params, params.horizon(), &mut rng);

        assert_eq!(cohorts.len(), 13);
        let ids: Vec<u32> = cohorts.iter().map(|i| i.id().0).collect();
        assert_eq!(ids, (0..13).collect::<Vec<_>>());
        assert!(cohorts.get(TokenType::Seed).unwrap().iter().all(|i| i.cohort() == TokenType::Seed));
        assert_eq!(cohorts.get(TokenType::Team).unwrap()[0].id(), InvestorId(10));
    }

    #[test]
    fn activity_is_unit_interval() {
        let params = SimulationParams::sample();
        let mut rng = StdRng::seed_from_u64(3);
        let cohorts = Cohorts::create(&params, params.horizon(), &mut rng);
        assert!(cohorts
            .iter()
            .all(|i| (0.0..1.0).contains(&i.activity_coefficient())));
    }

    #[test]
    fn zero_spread_risk_equals_mean() {
        let mut params = SimulationParams::sample();
        params.risk.std_dev = 0.0;
        let mut rng = StdRng::seed_from_u64(3);
        let cohorts = Cohorts::create(&params, params.horizon(), &mut rng);
        assert!(cohorts.iter().all(|i| i.risk_coefficient() == params.risk.mean));
    }

    #[test]
    fn same_seed_same_investors() {
        let params = SimulationParams::sample();
        let a = Cohorts::create(&params, 60, &mut StdRng::seed_from_u64(9));
        let b = Cohorts::create(&params, 60, &mut StdRng::seed_from_u64(9));
        let coeffs = |c: &Cohorts| {
            c.iter()
                .map(|i| (i.risk_coefficient(), i.activity_coefficient()))
                .collect::<Vec<_>>()
        };
        assert_eq!(coeffs(&a), coeffs(&b));
    }

    #[test]
    fn missing_cohort_is_none() {
        let cohorts = Cohorts::default();
        assert!(cohorts.get(TokenType::Seed).is_none());
        assert!(cohorts.is_empty());
    }
}
