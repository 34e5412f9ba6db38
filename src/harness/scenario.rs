//! Benchmark scenarios.
//!
//! Route-set scenarios reuse the dispatcher built (and memory-profiled) for
//! their fixture. Single-route scenarios build a fresh one-route dispatcher
//! with a fixed handler kind.

use crate::adapters::HandlerKind;
use crate::fixtures::params::{self, SingleRoute};
use crate::fixtures::{Method, GITHUB, STATIC};

/// Requests issued against a route-set dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every route of the fixture, once per pass.
    AllRoutes,
    /// One fixed request.
    Request { method: Method, path: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    RouteSet { fixture: &'static str, target: Target },
    SingleRoute { route: SingleRoute, kind: HandlerKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub name: &'static str,
    pub workload: Workload,
}

impl Scenario {
    /// Fixture the scenario's dispatcher is built from.
    pub fn fixture(&self) -> &'static str {
        match self.workload {
            Workload::RouteSet { fixture, .. } => fixture,
            Workload::SingleRoute { route, .. } => route.fixture,
        }
    }
}

const fn single(name: &'static str, route: SingleRoute, kind: HandlerKind) -> Scenario {
    Scenario {
        name,
        workload: Workload::SingleRoute { route, kind },
    }
}

/// Every scenario, in report order.
pub const SCENARIOS: [Scenario; 9] = [
    Scenario {
        name: "StaticAll",
        workload: Workload::RouteSet {
            fixture: STATIC,
            target: Target::AllRoutes,
        },
    },
    Scenario {
        name: "GithubAll",
        workload: Workload::RouteSet {
            fixture: GITHUB,
            target: Target::AllRoutes,
        },
    },
    Scenario {
        name: "GithubStatic",
        workload: Workload::RouteSet {
            fixture: GITHUB,
            target: Target::Request {
                method: Method::Get,
                path: "/user/repos",
            },
        },
    },
    Scenario {
        name: "GithubParam",
        workload: Workload::RouteSet {
            fixture: GITHUB,
            target: Target::Request {
                method: Method::Get,
                path: "/repos/julienschmidt/httprouter/stargazers",
            },
        },
    },
    single("Param0", params::PARAM0, HandlerKind::ReadParams),
    single("Param1", params::PARAM1, HandlerKind::ReadParams),
    single("Param5", params::PARAM5, HandlerKind::ReadParams),
    single("Param20", params::PARAM20, HandlerKind::ReadParams),
    single("ParamWrite", params::PARAM1, HandlerKind::ReadParamsWrite),
];

/// Route-set fixtures, in build order.
pub const ROUTE_SET_FIXTURES: [&str; 2] = [STATIC, GITHUB];
