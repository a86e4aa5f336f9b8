#[cfg(test)]
mod tests {
    use ssc_twin::blocks::{self, FUND_REWARD};
    use ssc_twin::kpi::{self, Kpi, Stats};
    use ssc_twin::metrics::SupplyDefinition;
    use ssc_twin::scenarios::EnvironmentalScenario;
    use ssc_twin::state::STOCKS;
    use ssc_twin::subsidy::SubsidyComponent;
    use ssc_twin::units::MAX_CREDIT_ISSUANCE;
    use ssc_twin::{experiments, Experiment, Field, Params, Pipeline, Row, SimulationTable, State};

    fn seventy_days() -> SimulationTable {
        experiments::sanity_check(70.0, 1).run().expect("test: run")
    }

    fn relative_gap(a: f64, b: f64) -> f64 {
        (a - b).abs() / a.abs().max(b.abs()).max(1.0)
    }

    // ========== Deterministic Baseline ==========

    #[test]
    fn test_seventy_day_run_shape() {
        let table = seventy_days();
        assert_eq!(table.len(), 71);
        for (i, row) in table.rows().iter().enumerate() {
            assert_eq!(row.timestep, i as u64);
            assert_eq!(row.get(Field::DaysPassed), i as f64);
        }
        assert_eq!(table.rows()[0].substep, 0);
        assert_eq!(table.rows()[70].substep, blocks::default_pipeline().len());
    }

    #[test]
    fn test_sum_of_stocks_is_flat() {
        let table = seventy_days();
        let sums = table.column(Field::SumOfStocks);
        let stats = Stats::from_samples(&sums);
        assert!(stats.std_dev / stats.mean < 1e-12, "sum_of_stocks drifted: {:?}", stats);
        assert!(relative_gap(stats.mean, MAX_CREDIT_ISSUANCE) < 1e-12);
    }

    #[test]
    fn test_circulating_supply_grows() {
        let table = seventy_days();
        let circulating = table.column(Field::CirculatingSupply);
        assert!(circulating.windows(2).any(|w| w[1] > w[0]), "circulating supply never increased");
    }

    #[test]
    fn test_supply_ordering_and_non_negative_balances() {
        let table = seventy_days();
        let slack = 1e-6;
        for row in table.rows() {
            let circulating = row.get(Field::CirculatingSupply);
            let user = row.get(Field::UserSupply);
            let earned = row.get(Field::EarnedSupply);
            let total = row.get(Field::SumOfStocks);
            assert!(circulating <= user + slack, "t={}", row.timestep);
            assert!(user <= earned + slack, "t={}", row.timestep);
            assert!(earned <= total + slack, "t={}", row.timestep);
            assert!(row.get(Field::EarnedMinusBurnedSupply) <= earned + slack);
            for field in STOCKS {
                assert!(row.get(field) >= -slack, "{} negative at t={}", field, row.timestep);
            }
        }
    }

    #[test]
    fn test_allocated_tokens_never_decrease() {
        let table = seventy_days();
        let allocated = table.column(Field::AllocatedTokens);
        assert!(allocated.windows(2).all(|w| w[1] >= w[0]));
        assert!(allocated[1] > 0.0, "liquid cohorts release on the first step");
    }

    // ========== Vesting Cliff ==========

    #[test]
    fn test_locked_cohorts_unlock_at_the_cliff() {
        let params = Params::default();
        let table = Experiment::single(params.clone()).with_days(366.0).run().expect("test: run");
        let rows = table.rows();
        let before = rows[364].get(Field::AllocatedTokens);
        let at_cliff = rows[365].get(Field::AllocatedTokens);

        let locked_share: f64 = params.vesting.tranches.iter().filter(|t| t.cliff_days > 0.0).map(|t| t.share).sum();
        let expected = 0.25 * locked_share * MAX_CREDIT_ISSUANCE;
        assert!(relative_gap(at_cliff - before, expected) < 1e-9);
        assert_eq!(rows[364].get(Field::AllocatedTokensInvestors), 0.0);
        assert!(rows[365].get(Field::AllocatedTokensInvestors) > 0.0);
    }

    // ========== Staking Pool ==========

    #[test]
    fn test_pool_share_price_matches_pool_over_shares() {
        let table = Experiment::single(Params::default()).with_days(60.0).run().expect("test: run");
        let mut checked = 0;
        for row in table.rows() {
            let shares = row.get(Field::OperatorPoolShares) + row.get(Field::NominatorPoolShares);
            if shares <= 0.0 {
                continue;
            }
            let implied = row.get(Field::StakingPoolBalance) / shares;
            assert!(relative_gap(implied, row.get(Field::PoolSharePrice)) < 1e-9, "t={}", row.timestep);
            checked += 1;
        }
        assert!(checked > 0, "pool never received stake");
    }

    // ========== Pipeline Composition ==========

    #[test]
    fn test_fund_block_disabled_by_default() {
        let table = Experiment::single(Params::default()).with_days(30.0).run().expect("test: run");
        assert!(table.rows().iter().all(|r| r.get(Field::FundToFarmers) == 0.0));
        assert!(table.rows()[30].get(Field::FundBalance) > 0.0);
    }

    #[test]
    fn test_enabled_fund_block_pays_farmers() {
        let pipeline = Pipeline::builder().blocks(blocks::default_blocks()).enable(FUND_REWARD).build();
        let mut initial = State::genesis();
        initial.dsf_relative_disbursal_per_day = 0.1;
        let table = Experiment::single(Params::default())
            .with_days(30.0)
            .with_pipeline(pipeline)
            .with_initial_state(initial)
            .with_invariant_checks(true)
            .run()
            .expect("test: run");
        assert!(table.rows().iter().any(|r| r.get(Field::FundToFarmers) > 0.0));
    }

    // ========== Parallelism & Determinism ==========

    #[test]
    fn test_parallel_run_matches_sequential() {
        let experiment = experiments::sweep_credit_supply(20.0, 2).with_seed(11);
        let sequential = experiment.run().expect("test: sequential");
        let parallel = experiment.run_parallel(1).expect("test: parallel");
        assert_eq!(sequential.len(), 6 * 2 * 21);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_stochastic_runs_repeat_per_seed() {
        let run = |seed: u64| -> Vec<Row> {
            experiments::standard_stochastic(20.0, 2).with_seed(seed).run().expect("test: run").into_rows()
        };
        let first = run(7);
        assert_eq!(first, run(7));
        assert_ne!(first, run(8));

        let runs = experiments::standard_stochastic(20.0, 2).with_seed(7).run().expect("test: run");
        let samples: Vec<&Row> = runs.rows().iter().filter(|r| r.timestep == 20).collect();
        assert_eq!(samples.len(), 2);
        assert_ne!(samples[0].state, samples[1].state);
    }

    #[test]
    fn test_every_scenario_conserves_supply() {
        for scenario in EnvironmentalScenario::ALL {
            let params = scenario.applied_to(Params::default());
            let result = Experiment::single(params).with_days(30.0).with_invariant_checks(true).run();
            assert!(result.is_ok(), "{:?}: {:?}", scenario, result.err());
        }
    }

    // ========== Subsidy ==========

    #[test]
    fn test_subsidy_tail_starts_after_the_linear_phase() {
        let duration = 100.0;
        let component = SubsidyComponent::new(0.0, duration, 10_000.0, 1_000.0 / duration);
        let alpha = component.max_reference_subsidy;
        assert_eq!(component.subsidy(duration), alpha);
        let tail = component.subsidy(duration + 1.0);
        assert!(tail < alpha);
        assert!(tail > 0.0);
    }

    // ========== KPIs ==========

    #[test]
    fn test_kpis_over_a_supply_sweep() {
        let table = experiments::sweep_credit_supply(30.0, 1).run().expect("test: run");
        let kpis = kpi::trajectory_kpis(&table);
        assert_eq!(kpis.len(), 6);
        let scores = kpi::goal_scores(&kpis, &kpi::KPI_THRESHOLDS);
        assert_eq!(scores.len(), 6);
        assert!(scores.iter().all(|&s| s <= kpi::KPI_THRESHOLDS.len()));

        let rewards = kpi::summarize(&kpis, Kpi::CummRewards);
        assert_eq!(rewards.n, 6);
        assert!(rewards.mean > 0.0);
        assert!(table.rows().iter().any(|r| r.label == "supply-earned"));
        assert_eq!(Params::default().credit_supply_definition, SupplyDefinition::Issued);
    }
}
