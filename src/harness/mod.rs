//! Benchmark run coordination.
//!
//! # Data Flow
//! ```text
//! BenchConfig
//!     → Harness::new (catalog, selection, profiler, simulator)
//!     → run():
//!         for each selected router:
//!             route-set fixtures: capability check → build under MemoryProfiler
//!                 → DispatcherRegistry (router, fixture)        [Build records]
//!             selected scenarios:
//!                 route-set: registry dispatcher + target plan
//!                 single-route: fresh one-route dispatcher
//!                 → verify → time                               [timing records]
//!     → RunReport
//! ```
//!
//! # Design Decisions
//! - All builds for a router finish before any of its timing starts
//! - Failures and panics stay local to one (router, fixture, scenario)
//! - The registry lives for one `run` call and is dropped with it

pub mod registry;
pub mod scenario;
pub mod selection;

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::adapters::{self, isolate, AdapterError, Dispatcher, RouterAdapter};
use crate::config::BenchConfig;
use crate::fixtures::{Catalog, Fixture, FixtureError, Requirements};
use crate::profiler::{MemoryProfiler, ProfileError, Profiled};
use crate::report::{MemoryFigures, BUILD_SCENARIO, Outcome, Record, RunReport, TimingFigures};
use crate::simulator::{DispatchPlan, SimulationError, Simulator, TimingConfig, TimingSample};

pub use registry::{DispatcherRegistry, Unavailable};
pub use scenario::{Target, Scenario, Workload, ROUTE_SET_FIXTURES, SCENARIOS};
pub use selection::Selection;

/// Errors that prevent a run from starting.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("fixture catalog: {0}")]
    Fixture(#[from] FixtureError),

    #[error("invalid selection: {0}")]
    Selection(#[from] regex::Error),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl From<Unavailable> for Outcome {
    fn from(unavailable: Unavailable) -> Self {
        match unavailable {
            Unavailable::Excluded(reason) => Outcome::Excluded { reason },
            Unavailable::Failed(reason) => Outcome::Failed { reason },
        }
    }
}

/// Sort a contained build result into a dispatcher or the reason there is none.
fn classify(built: Result<Result<Box<dyn Dispatcher>, AdapterError>, String>) -> Result<Box<dyn Dispatcher>, Unavailable> {
    match built {
        Ok(Ok(dispatcher)) => Ok(dispatcher),
        Ok(Err(AdapterError::Unsupported { reason, .. })) => Err(Unavailable::Excluded(reason)),
        Ok(Err(err)) => Err(Unavailable::Failed(err.to_string())),
        Err(message) => Err(Unavailable::Failed(format!("panicked during build: {message}"))),
    }
}

fn check(adapter: &dyn RouterAdapter, requirements: Requirements) -> Result<(), Unavailable> {
    adapters::ensure_supported(adapter, requirements).map_err(|err| match err {
        AdapterError::Unsupported { reason, .. } => Unavailable::Excluded(reason),
        other => Unavailable::Failed(other.to_string()),
    })
}

pub struct Harness {
    catalog: Catalog,
    adapters: Vec<Box<dyn RouterAdapter>>,
    selection: Selection,
    profiler: Option<MemoryProfiler>,
    simulator: Simulator,
    query: Option<String>,
}

impl Harness {
    /// Harness over every shipped engine.
    pub fn new(config: &BenchConfig) -> Result<Self, HarnessError> {
        Self::with_adapters(config, adapters::registry())
    }

    /// Harness over a caller-chosen set of engines.
    pub fn with_adapters(config: &BenchConfig, adapters: Vec<Box<dyn RouterAdapter>>) -> Result<Self, HarnessError> {
        let selection = Selection::new(
            config.selection.routers.as_deref(),
            config.selection.scenarios.as_deref(),
        )?;
        let profiler = if config.memory.enabled {
            Some(MemoryProfiler::new(config.memory.settle_passes, selection.clone())?)
        } else {
            None
        };
        let simulator = Simulator::new(TimingConfig {
            bench_time: Duration::from_millis(config.simulator.bench_time_ms),
            max_iterations: config.simulator.max_iterations,
            fixed_iterations: config.simulator.fixed_iterations,
            warmup_passes: config.simulator.warmup_passes,
        });

        Ok(Self {
            catalog: Catalog::load()?,
            adapters,
            selection,
            profiler,
            simulator,
            query: config.simulator.query.clone(),
        })
    }

    pub fn adapters(&self) -> &[Box<dyn RouterAdapter>] {
        &self.adapters
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Measure every selected router against every selected scenario.
    pub fn run(&self) -> RunReport {
        let mut report = RunReport::new(self.profiler.as_ref().map(MemoryProfiler::settle_passes));
        let mut registry = DispatcherRegistry::new();
        info!(
            run_id = %report.run_id,
            routers = self.adapters.len(),
            memory = self.profiler.is_some(),
            "benchmark run starting"
        );

        for adapter in &self.adapters {
            let router = adapter.name();
            if !self.selection.router_selected(router) {
                debug!(router, "router not selected");
                continue;
            }

            self.build_route_sets(adapter.as_ref(), &mut registry, &mut report);

            for scenario in SCENARIOS.iter().filter(|s| self.selection.scenario_selected(s.name)) {
                let record = match self.run_scenario(adapter.as_ref(), scenario, &registry) {
                    Ok(sample) => {
                        info!(
                            router,
                            fixture = scenario.fixture(),
                            scenario = scenario.name,
                            ns_per_op = sample.ns_per_dispatch(),
                            iterations = sample.iterations,
                            "scenario measured"
                        );
                        Record::timing(
                            router,
                            scenario.fixture(),
                            scenario.name,
                            Outcome::Ok,
                            Some(TimingFigures::from(&sample)),
                        )
                    }
                    Err(unavailable) => {
                        log_unavailable(router, scenario.fixture(), scenario.name, &unavailable);
                        Record::timing(router, scenario.fixture(), scenario.name, unavailable.into(), None)
                    }
                };
                report.push(record);
            }
        }

        info!(
            run_id = %report.run_id,
            records = report.records.len(),
            failures = report.failures().count(),
            "benchmark run finished"
        );
        report
    }

    fn fixture(&self, name: &str) -> Result<&Fixture, Unavailable> {
        self.catalog
            .get(name)
            .ok_or_else(|| Unavailable::Failed(format!("unknown fixture {name}")))
    }

    fn fixture_needed(&self, fixture: &str) -> bool {
        self.profiler.is_some()
            || SCENARIOS
                .iter()
                .any(|s| s.fixture() == fixture && self.selection.scenario_selected(s.name))
    }

    /// Build every needed route-set dispatcher for `adapter`, under the profiler when enabled.
    fn build_route_sets(&self, adapter: &dyn RouterAdapter, registry: &mut DispatcherRegistry, report: &mut RunReport) {
        let router = adapter.name();
        for fixture_name in ROUTE_SET_FIXTURES {
            if !self.fixture_needed(fixture_name) {
                continue;
            }
            let fixture = match self.fixture(fixture_name) {
                Ok(fixture) => fixture,
                Err(unavailable) => {
                    registry.mark_unavailable(router, fixture_name, unavailable);
                    continue;
                }
            };

            if let Err(unavailable) = check(adapter, fixture.requirements()) {
                log_unavailable(router, fixture_name, BUILD_SCENARIO, &unavailable);
                if self.profiler.is_some() {
                    report.push(Record::memory(router, fixture_name, unavailable.clone().into(), None));
                }
                registry.mark_unavailable(router, fixture_name, unavailable);
                continue;
            }

            let build = || isolate(|| adapter.build_from_route_set(fixture));
            let (built, memory) = match &self.profiler {
                Some(profiler) => match profiler.profile(router, build) {
                    Profiled::Skipped => continue,
                    Profiled::Measured { value, sample } => (value, Some(MemoryFigures::from(sample))),
                },
                None => (build(), None),
            };

            match classify(built) {
                Ok(dispatcher) => {
                    if let Some(memory) = memory {
                        info!(router, fixture = fixture_name, bytes = memory.delta_bytes, "route table built");
                        report.push(Record::memory(router, fixture_name, Outcome::Ok, Some(memory)));
                    }
                    registry.insert(router, fixture_name, dispatcher);
                }
                Err(unavailable) => {
                    log_unavailable(router, fixture_name, BUILD_SCENARIO, &unavailable);
                    if self.profiler.is_some() {
                        report.push(Record::memory(router, fixture_name, unavailable.clone().into(), None));
                    }
                    registry.mark_unavailable(router, fixture_name, unavailable);
                }
            }
        }
    }

    fn run_scenario(
        &self,
        adapter: &dyn RouterAdapter,
        scenario: &Scenario,
        registry: &DispatcherRegistry,
    ) -> Result<TimingSample, Unavailable> {
        let router = adapter.name();
        let query = self.query.as_deref();

        match scenario.workload {
            Workload::RouteSet { fixture, target } => {
                let oracle = self.fixture(fixture)?;
                let dispatcher = match registry.get(router, fixture) {
                    Some(Ok(dispatcher)) => dispatcher,
                    Some(Err(unavailable)) => return Err(unavailable.clone()),
                    None => return Err(Unavailable::Failed(format!("no dispatcher built for {fixture}"))),
                };
                let plan = match target {
                    Target::AllRoutes => DispatchPlan::all_routes(oracle, query),
                    Target::Request { method, path } => DispatchPlan::single(method, path, query),
                };
                self.time(plan, dispatcher, oracle)
            }
            Workload::SingleRoute { route, kind } => {
                let oracle = self.fixture(route.fixture)?;
                let pattern = oracle
                    .routes()
                    .first()
                    .map(|descriptor| &descriptor.pattern)
                    .ok_or_else(|| Unavailable::Failed(format!("fixture {} is empty", route.fixture)))?;
                check(adapter, Requirements::of(pattern))?;

                let dispatcher = classify(isolate(|| adapter.build_from_single_route(route.method, pattern, kind)))?;
                let plan = DispatchPlan::single(route.method, route.request, query);
                self.time(plan, dispatcher.as_ref(), oracle)
            }
        }
    }

    /// Verify the plan against `oracle`, then time it.
    fn time(
        &self,
        plan: Result<DispatchPlan, SimulationError>,
        dispatcher: &dyn Dispatcher,
        oracle: &Fixture,
    ) -> Result<TimingSample, Unavailable> {
        let mut plan = plan.map_err(|err| Unavailable::Failed(err.to_string()))?;
        let measured = isolate(|| {
            plan.verify(dispatcher, oracle)?;
            self.simulator.measure(&mut plan, dispatcher)
        });
        match measured {
            Ok(Ok(sample)) => Ok(sample),
            Ok(Err(err)) => Err(Unavailable::Failed(err.to_string())),
            Err(message) => Err(Unavailable::Failed(format!("panicked during dispatch: {message}"))),
        }
    }
}

fn log_unavailable(router: &str, fixture: &str, scenario: &str, unavailable: &Unavailable) {
    match unavailable {
        Unavailable::Excluded(reason) => debug!(router, fixture, scenario, %reason, "excluded"),
        Unavailable::Failed(reason) => warn!(router, fixture, scenario, %reason, "measurement failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Capabilities, HandlerKind, MatchitAdapter};
    use crate::fixtures::{Method, Pattern, PatternSyntax};

    /// `matchit` restricted to literal routes.
    struct LiteralOnly;

    impl RouterAdapter for LiteralOnly {
        fn name(&self) -> &'static str {
            "literal"
        }

        fn syntax(&self) -> PatternSyntax {
            MatchitAdapter.syntax()
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                params: false,
                catch_all: false,
                max_params: Some(0),
            }
        }

        fn build_from_route_set(&self, fixture: &Fixture) -> Result<Box<dyn Dispatcher>, AdapterError> {
            MatchitAdapter.build_from_route_set(fixture)
        }

        fn build_from_single_route(
            &self,
            method: Method,
            pattern: &Pattern,
            kind: HandlerKind,
        ) -> Result<Box<dyn Dispatcher>, AdapterError> {
            MatchitAdapter.build_from_single_route(method, pattern, kind)
        }
    }

    fn quick_config() -> BenchConfig {
        let mut config = BenchConfig::default();
        config.memory.enabled = false;
        config.simulator.fixed_iterations = Some(3);
        config.simulator.warmup_passes = 0;
        config
    }

    #[test]
    fn test_memory_requires_tracking_allocator() {
        let err = Harness::new(&BenchConfig::default()).err().unwrap();
        assert!(matches!(err, HarnessError::Profile(ProfileError::HeapStatsUnavailable)));
    }

    #[test]
    fn test_invalid_selection() {
        let mut config = quick_config();
        config.selection.scenarios = Some("[".into());
        assert!(matches!(Harness::new(&config), Err(HarnessError::Selection(_))));
    }

    #[test]
    fn test_run_matchit_all_scenarios() {
        let harness = Harness::with_adapters(&quick_config(), vec![Box::new(MatchitAdapter)]).unwrap();
        let report = harness.run();
        assert_eq!(report.timing_records().count(), SCENARIOS.len());
        assert_eq!(report.memory_records().count(), 0);
        for record in &report.records {
            assert_eq!(record.outcome, Outcome::Ok, "{}", record.label());
            assert_eq!(record.timing.as_ref().unwrap().iterations, 3);
        }
    }

    #[test]
    fn test_literal_engine_excluded_from_parametric_scenarios() {
        let mut config = quick_config();
        config.selection.scenarios = Some("^(StaticAll|GithubAll|Param0|Param1)$".into());
        let harness = Harness::with_adapters(&config, vec![Box::new(LiteralOnly)]).unwrap();
        let report = harness.run();

        assert!(report.find("literal", "StaticAll").unwrap().outcome.is_ok());
        assert!(report.find("literal", "Param0").unwrap().outcome.is_ok());
        assert!(matches!(
            report.find("literal", "GithubAll").unwrap().outcome,
            Outcome::Excluded { .. }
        ));
        assert!(matches!(
            report.find("literal", "Param1").unwrap().outcome,
            Outcome::Excluded { .. }
        ));
        assert_eq!(report.failures().count(), 0);
    }
}
