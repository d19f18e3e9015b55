//! The day-stepping simulation loop.
//!
//! Every day runs the same settlement sequence:
//!
//! 1. sell the day's release to investors
//! 2. accrue turnover dividends into both farms
//! 3. rebalance investors between the farms
//! 4. on minting days, apply the index revenue floor
//! 5. on payout days, pay both farms' dividends
//! 6. advance both farms, clearing dividends if step 5 ran
//!
//! Later steps read what earlier steps wrote. A failed step stops the run
//! and reports the day and step.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use smarty_core::calendar::{day_in_month, month_of, years_for_months};
use smarty_core::error::{EngineError, SettlementStep, SimulationError};
use smarty_core::traits::RandomSource;
use smarty_core::types::{Amount, Day, FarmKind, TokenAmounts};
use smarty_core::{RandomAllocator, SimulationParams, TurnoverSeries};
use smarty_ledger::Farm;
use tracing::{debug, info};

use crate::allocation::AllocationEngine;
use crate::cohort::Cohorts;
use crate::mint::MintSchedule;
use crate::report::{DayObservation, FarmPair, InvestorSummary, SimulationReport};

fn failed_at(day: Day, step: SettlementStep) -> impl Fn(EngineError) -> SimulationError {
    move |source| SimulationError::Settlement { day, step, source }
}

/// Drives a simulation one day at a time.
#[derive(Debug)]
pub struct SimulationClock<S = StdRng> {
    params: Arc<SimulationParams>,
    engine: AllocationEngine<S>,
    mint: MintSchedule,
    turnover: TurnoverSeries,
    yield_pool: Farm,
    dividend_farm: Farm,
    cohorts: Cohorts,
    next_day: Day,
    observations: Vec<DayObservation>,
}

impl SimulationClock<StdRng> {
    /// A clock drawing from `StdRng`, seeded from `rng_seed` when set.
    pub fn new(params: Arc<SimulationParams>) -> Result<Self, SimulationError> {
        let rng = match params.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_source(params, rng)
    }
}

impl<S: RandomSource> SimulationClock<S> {
    /// Validate `params`, create investors and farms, and seed the yield
    /// pool with the genesis reserve on day 1.
    pub fn with_source(params: Arc<SimulationParams>, mut source: S) -> Result<Self, SimulationError> {
        params.validate()?;
        let horizon = params.horizon();

        let cohorts = Cohorts::create(&params, horizon, &mut source);
        let mut yield_pool = Farm::new(FarmKind::YieldPool, horizon);
        let dividend_farm = Farm::new(FarmKind::DividendFarm, horizon);

        let genesis: TokenAmounts = params
            .genesis_pool
            .iter()
            .map(|(token, amount)| (*token, *amount as Amount))
            .collect();
        yield_pool
            .seed_genesis(&genesis, 1, params.reserve_per_token_rate)
            .map_err(|e| failed_at(1, SettlementStep::Genesis)(e.into()))?;

        let turnover = TurnoverSeries::new(
            params.turnover.initial_usd,
            params.turnover.annual_growth_rate,
            years_for_months(params.num_months),
        );

        info!(
            months = params.num_months,
            horizon,
            investors = cohorts.len(),
            genesis_tokens = genesis.total(),
            "simulation initialized"
        );

        Ok(Self {
            mint: MintSchedule::from_params(&params),
            engine: AllocationEngine::new(Arc::clone(&params), RandomAllocator::new(source)),
            params,
            turnover,
            yield_pool,
            dividend_farm,
            cohorts,
            next_day: 1,
            observations: Vec::new(),
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn horizon(&self) -> Day {
        self.params.horizon()
    }

    /// The day the next call to [`step`](Self::step) settles.
    pub fn next_day(&self) -> Day {
        self.next_day
    }

    pub fn is_finished(&self) -> bool {
        self.next_day > self.horizon()
    }

    pub fn yield_pool(&self) -> &Farm {
        &self.yield_pool
    }

    pub fn dividend_farm(&self) -> &Farm {
        &self.dividend_farm
    }

    pub fn cohorts(&self) -> &Cohorts {
        &self.cohorts
    }

    pub fn observations(&self) -> &[DayObservation] {
        &self.observations
    }

    /// Settle one day.
    pub fn step(&mut self) -> Result<DayObservation, SimulationError> {
        let day = self.next_day;
        if self.is_finished() {
            return Err(SimulationError::HorizonExhausted {
                last_day: self.horizon(),
            });
        }
        let month = month_of(day);
        if day_in_month(day) == 1 {
            info!(month, day, "month started");
        }

        let mut obs = DayObservation {
            day,
            month,
            ..Default::default()
        };

        let release = self.mint.for_day(day);
        obs.tokens_sold = self
            .engine
            .sell_new_tokens(&mut self.cohorts, &release, day)
            .map_err(failed_at(day, SettlementStep::Sale))?;

        let accrual = self
            .engine
            .compute_daily_dividends(&self.turnover, day, &mut self.yield_pool, &mut self.dividend_farm)
            .map_err(failed_at(day, SettlementStep::Dividends))?;
        obs.exchange_rate = accrual.exchange_rate;
        obs.turnover_usd = accrual.turnover_usd;
        obs.turnover_tokens = accrual.turnover_tokens;
        obs.turnover_dividends = accrual.accrued;

        let rebalance = self
            .engine
            .rebalance_investors(&mut self.yield_pool, &mut self.dividend_farm, &mut self.cohorts, day)
            .map_err(failed_at(day, SettlementStep::Rebalance))?;
        obs.investors_moved = rebalance.investors_moved;
        obs.bootstrapped = rebalance.bootstrapped;

        if day % self.params.extra_mint_period == 0 {
            let floor = self
                .engine
                .apply_minting_floor(day, &mut self.yield_pool, &mut self.dividend_farm)
                .map_err(failed_at(day, SettlementStep::MintingFloor))?;
            obs.minted_dividends = FarmPair {
                yield_pool: floor.yield_pool.minted,
                dividend_farm: floor.dividend_farm.minted,
            };
        }

        let payout_day = day % self.params.dividend_period == 0;
        if payout_day {
            let payout = failed_at(day, SettlementStep::Payout);
            let farm = self
                .engine
                .pay_dividends(&mut self.cohorts, &self.dividend_farm, day)
                .map_err(&payout)?;
            let pool = self
                .engine
                .pay_dividends(&mut self.cohorts, &self.yield_pool, day)
                .map_err(&payout)?;
            obs.paid_dividends = FarmPair {
                yield_pool: pool.paid,
                dividend_farm: farm.paid,
            };
        }

        let advance = |e: smarty_core::error::LedgerError| failed_at(day, SettlementStep::Advance)(e.into());
        obs.tokens_held = FarmPair {
            yield_pool: self.yield_pool.get_token_amount(day, false).map_err(advance)?,
            dividend_farm: self.dividend_farm.get_token_amount(day, false).map_err(advance)?,
        };
        self.yield_pool.advance_day(day, payout_day).map_err(advance)?;
        self.dividend_farm.advance_day(day, payout_day).map_err(advance)?;

        debug!(
            day,
            sold = obs.tokens_sold,
            rate = obs.exchange_rate,
            dividends = obs.turnover_dividends.total(),
            minted = obs.minted_dividends.total(),
            paid = obs.paid_dividends.total(),
            "day settled"
        );

        self.next_day += 1;
        self.observations.push(obs.clone());
        Ok(obs)
    }

    /// Settle every remaining day.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        while !self.is_finished() {
            self.step()?;
        }
        info!(
            days = self.observations.len(),
            paid = self.observations.iter().map(|o| o.paid_dividends.total()).sum::<Amount>(),
            "simulation finished"
        );
        Ok(())
    }

    /// Snapshot of the run so far.
    pub fn report(&self) -> SimulationReport {
        let days_completed = self.next_day - 1;
        SimulationReport {
            num_months: self.params.num_months,
            horizon: self.horizon(),
            days_completed,
            farms: FarmPair {
                yield_pool: self.yield_pool.snapshot(),
                dividend_farm: self.dividend_farm.snapshot(),
            },
            observations: self.observations.clone(),
            investors: self
                .cohorts
                .iter()
                .map(|i| InvestorSummary::of(i, days_completed))
                .collect(),
        }
    }
}
