//! Reusable request plans.
//!
//! # Responsibilities
//! - Own the one `BenchRequest` and `ResponseSink` reused by every dispatch
//! - Walk all routes of a fixture, or repeat one fixed request
//! - Check a dispatcher's answers against a fixture's resolution
//!
//! # Design Decisions
//! - The request buffer is sized for the longest path up front, so
//!   rewriting it in the loop never reallocates
//! - Capture is switched on only inside `verify`

use crate::adapters::{DispatchError, Dispatcher};
use crate::fixtures::{Fixture, Method};
use crate::http::{BenchRequest, ResponseSink};
use crate::simulator::SimulationError;

/// How a plan walks its requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// Rewrite the request for every route of a fixture on each pass.
    AllRoutes,
    /// Dispatch the same request on each pass.
    Single,
}

#[derive(Debug)]
pub struct DispatchPlan {
    mode: PlanMode,
    entries: Vec<(Method, String)>,
    request: BenchRequest,
    sink: ResponseSink,
}

impl DispatchPlan {
    /// One request per route of `fixture`, using each pattern as its own path.
    pub fn all_routes(fixture: &Fixture, query: Option<&str>) -> Result<Self, SimulationError> {
        let entries: Vec<(Method, String)> = fixture
            .routes()
            .iter()
            .map(|route| (route.method, route.pattern.as_str().to_string()))
            .collect();
        Self::with_entries(PlanMode::AllRoutes, entries, query)
    }

    /// A fixed request dispatched once per pass.
    pub fn single(method: Method, path: &str, query: Option<&str>) -> Result<Self, SimulationError> {
        Self::with_entries(PlanMode::Single, vec![(method, path.to_string())], query)
    }

    fn with_entries(
        mode: PlanMode,
        entries: Vec<(Method, String)>,
        query: Option<&str>,
    ) -> Result<Self, SimulationError> {
        let (method, longest) = entries
            .iter()
            .max_by_key(|(_, path)| path.len())
            .ok_or(SimulationError::EmptyPlan)?;

        let mut request = BenchRequest::new(*method, longest);
        if let Some(query) = query {
            request = request.with_query(query);
        }
        let (first_method, first_path) = &entries[0];
        request.set(*first_method, first_path);

        Ok(Self {
            mode,
            entries,
            request,
            sink: ResponseSink::new(),
        })
    }

    pub fn mode(&self) -> PlanMode {
        self.mode
    }

    /// Dispatches performed by one pass.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One pass over the plan. Any miss fails the pass.
    #[inline]
    pub fn run_once(&mut self, dispatcher: &dyn Dispatcher) -> Result<(), SimulationError> {
        match self.mode {
            PlanMode::Single => self.dispatch(dispatcher),
            PlanMode::AllRoutes => {
                for (method, path) in &self.entries {
                    self.request.set(*method, path);
                    self.sink.reset();
                    dispatcher
                        .serve(&self.request, &mut self.sink)
                        .map_err(|source| dispatch_error(*method, path, source))?;
                }
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, dispatcher: &dyn Dispatcher) -> Result<(), SimulationError> {
        self.sink.reset();
        dispatcher
            .serve(&self.request, &mut self.sink)
            .map_err(|source| dispatch_error(self.request.method(), self.request.path(), source))
    }

    /// Replay every request once with capture on and compare against `oracle`.
    pub fn verify(&mut self, dispatcher: &dyn Dispatcher, oracle: &Fixture) -> Result<(), SimulationError> {
        self.sink.set_capture(true);
        let outcome = self.verify_entries(dispatcher, oracle);
        self.sink.set_capture(false);
        if let Some((method, path)) = self.entries.first() {
            self.request.set(*method, path);
        }
        outcome
    }

    fn verify_entries(&mut self, dispatcher: &dyn Dispatcher, oracle: &Fixture) -> Result<(), SimulationError> {
        for (method, path) in &self.entries {
            let expected = oracle
                .resolve(*method, path)
                .ok_or_else(|| SimulationError::Unresolvable {
                    method: *method,
                    path: path.clone(),
                })?;

            self.request.set(*method, path);
            self.sink.reset();
            dispatcher
                .serve(&self.request, &mut self.sink)
                .map_err(|source| dispatch_error(*method, path, source))?;

            let actual_route = self.sink.route();
            if actual_route != Some(expected.route) || self.sink.captured() != expected.params.as_slice() {
                return Err(SimulationError::Mismatch {
                    method: *method,
                    path: path.clone(),
                    expected: describe(Some(expected.route), &expected.params),
                    actual: describe(actual_route, self.sink.captured()),
                });
            }
        }
        Ok(())
    }
}

fn dispatch_error(method: Method, path: &str, source: DispatchError) -> SimulationError {
    SimulationError::Dispatch {
        method,
        path: path.to_string(),
        source,
    }
}

fn describe(route: Option<usize>, params: &[(String, String)]) -> String {
    let route = route.map_or_else(|| "no route".to_string(), |r| format!("route #{r}"));
    let params: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{route} [{}]", params.join(", "))
}
