//! Shared utilities for integration tests.

#![allow(dead_code)]

use route_bench::adapters::{self, RouterAdapter};
use route_bench::config::BenchConfig;
use route_bench::fixtures::{Catalog, Fixture};

/// The fixture catalog every test runs against.
pub fn catalog() -> Catalog {
    Catalog::load().unwrap()
}

pub fn fixture(catalog: &Catalog, name: &str) -> Fixture {
    catalog.get(name).unwrap().clone()
}

/// Every shipped adapter, by name.
pub fn adapter(name: &str) -> Box<dyn RouterAdapter> {
    adapters::registry()
        .into_iter()
        .find(|adapter| adapter.name() == name)
        .unwrap_or_else(|| panic!("no adapter named {name}"))
}

/// A config that finishes fast: fixed passes, no warmup, no memory profiling.
pub fn quick_config() -> BenchConfig {
    let mut config = BenchConfig::default();
    config.memory.enabled = false;
    config.simulator.fixed_iterations = Some(2);
    config.simulator.warmup_passes = 0;
    config
}
