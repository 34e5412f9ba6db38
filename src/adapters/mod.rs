//! Router adapter contract.
//!
//! # Data Flow
//! ```text
//! Fixture (canonical routes)
//!     → Capabilities::check (declared exclusion, no build attempted)
//!     → RouterAdapter::build_from_route_set / build_from_single_route
//!         → pattern rendered in the engine's syntax
//!         → one Handler per route (route index + HandlerKind)
//!     → Box<dyn Dispatcher>
//!
//! Dispatch:
//!     BenchRequest → Dispatcher::serve → engine lookup
//!     → Handler::invoke (acknowledge, read params, maybe write body)
//!     → ResponseSink
//! ```
//!
//! # Design Decisions
//! - The harness never branches on the engine; everything goes through two traits
//! - Handlers are plain data so every engine runs identical handler logic
//! - Route-set builds always use `HandlerKind::ReadParams`
//! - Panics inside an engine are contained by `isolate` and reported as failures

pub mod axum_router;
pub mod matchit_router;
pub mod method_table;
pub mod regex_table;
pub mod routefinder_router;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::fixtures::{Fixture, Method, Pattern, PatternSyntax, Requirements};
use crate::http::{BenchRequest, ResponseSink};

pub use axum_router::AxumAdapter;
pub use matchit_router::MatchitAdapter;
pub use method_table::MethodTable;
pub use regex_table::RegexAdapter;
pub use routefinder_router::RoutefinderAdapter;

/// Fixed response body written by `HandlerKind::ReadParamsWrite`.
pub const ACK_BODY: &[u8] = b"ok";

/// What a registered handler does when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Acknowledge the route and read every path parameter.
    ReadParams,
    /// As `ReadParams`, then write [`ACK_BODY`].
    ReadParamsWrite,
}

/// Handler registered for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handler {
    pub route: usize,
    pub kind: HandlerKind,
}

impl Handler {
    pub fn new(route: usize, kind: HandlerKind) -> Self {
        Self { route, kind }
    }

    pub fn invoke<'k, 'v>(&self, params: impl IntoIterator<Item = (&'k str, &'v str)>, sink: &mut ResponseSink) {
        sink.acknowledge(self.route);
        for (name, value) in params {
            sink.observe_param(name, value);
        }
        if self.kind == HandlerKind::ReadParamsWrite {
            sink.write_body(ACK_BODY);
        }
    }
}

/// Route shapes an engine can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub params: bool,
    pub catch_all: bool,
    /// Upper bound on parameters per route, if the engine has one.
    pub max_params: Option<usize>,
}

impl Capabilities {
    /// Explain why a fixture with `requirements` cannot be registered.
    pub fn check(&self, requirements: Requirements) -> Result<(), String> {
        if requirements.max_params > 0 && !self.params {
            return Err("path parameters unsupported".to_string());
        }
        if requirements.catch_all && !self.catch_all {
            return Err("catch-all patterns unsupported".to_string());
        }
        match self.max_params {
            Some(limit) if requirements.max_params > limit => Err(format!(
                "{} parameters per route exceeds limit of {limit}",
                requirements.max_params
            )),
            _ => Ok(()),
        }
    }
}

/// Errors raised while building a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// Declared incompatibility between engine and route shape.
    #[error("{router}: unsupported: {reason}")]
    Unsupported { router: String, reason: String },

    #[error("{router}: build failed: {reason}")]
    Build { router: String, reason: String },

    #[error("{router}: panicked: {message}")]
    Panicked { router: String, message: String },
}

/// Errors raised by a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("no route matched")]
    NotFound,

    #[error("engine did not complete synchronously")]
    Pending,

    #[error("engine error: {0}")]
    Engine(String),
}

/// Built, queryable routing structure.
pub trait Dispatcher {
    /// Route `request` and run the matched handler against `sink`.
    fn serve(&self, request: &BenchRequest, sink: &mut ResponseSink) -> Result<(), DispatchError>;
}

/// Shim exposing one routing engine through a uniform contract.
pub trait RouterAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Placeholder syntax the engine expects patterns in.
    fn syntax(&self) -> PatternSyntax;

    fn capabilities(&self) -> Capabilities;

    /// Register every route of `fixture` in order with a `ReadParams` handler.
    fn build_from_route_set(&self, fixture: &Fixture) -> Result<Box<dyn Dispatcher>, AdapterError>;

    /// Register exactly one route, handled by `kind`, as route 0.
    fn build_from_single_route(
        &self,
        method: Method,
        pattern: &Pattern,
        kind: HandlerKind,
    ) -> Result<Box<dyn Dispatcher>, AdapterError>;
}

/// Every engine shipped with the harness, in report order.
pub fn registry() -> Vec<Box<dyn RouterAdapter>> {
    vec![
        Box::new(AxumAdapter),
        Box::new(MatchitAdapter),
        Box::new(RoutefinderAdapter),
        Box::new(RegexAdapter),
    ]
}

/// Run `f`, turning a panic into an error message.
pub fn isolate<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Shared helper for the single-route builds: a one-route fixture.
pub(crate) fn single_route_fixture(router: &str, method: Method, pattern: &Pattern) -> Result<Fixture, AdapterError> {
    Fixture::new(
        "single",
        vec![crate::fixtures::RouteDescriptor::new(method, pattern.clone())],
    )
    .map_err(|err| AdapterError::Build {
        router: router.to_string(),
        reason: err.to_string(),
    })
}

/// Fail early when `requirements` exceed `adapter`'s capabilities.
pub fn ensure_supported(adapter: &dyn RouterAdapter, requirements: Requirements) -> Result<(), AdapterError> {
    adapter
        .capabilities()
        .check(requirements)
        .map_err(|reason| AdapterError::Unsupported {
            router: adapter.name().to_string(),
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_read_params() {
        let mut sink = ResponseSink::capturing();
        Handler::new(3, HandlerKind::ReadParams).invoke([("name", "gordon")], &mut sink);
        assert_eq!(sink.route(), Some(3));
        assert_eq!(sink.captured(), &[("name".to_string(), "gordon".to_string())]);
        assert_eq!(sink.body_bytes(), 0);
    }

    #[test]
    fn test_handler_read_params_write() {
        let mut sink = ResponseSink::new();
        Handler::new(0, HandlerKind::ReadParamsWrite).invoke([("a", "1"), ("b", "2")], &mut sink);
        assert_eq!(sink.params_seen(), 2);
        assert_eq!(sink.body_bytes(), ACK_BODY.len() as u64);
    }

    #[test]
    fn test_capabilities_check() {
        let literal_only = Capabilities {
            params: false,
            catch_all: false,
            max_params: None,
        };
        assert!(literal_only.check(Requirements::default()).is_ok());
        assert!(literal_only
            .check(Requirements {
                max_params: 1,
                catch_all: false
            })
            .is_err());

        let bounded = Capabilities {
            params: true,
            catch_all: true,
            max_params: Some(5),
        };
        assert!(bounded
            .check(Requirements {
                max_params: 5,
                catch_all: true
            })
            .is_ok());
        let reason = bounded
            .check(Requirements {
                max_params: 20,
                catch_all: false,
            })
            .unwrap_err();
        assert!(reason.contains("20"));
    }

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<_> = registry().iter().map(|a| a.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_isolate_catches_panic() {
        assert_eq!(isolate(|| 7), Ok(7));
        let message = isolate(|| -> u8 { panic!("engine exploded") }).unwrap_err();
        assert_eq!(message, "engine exploded");
    }
}
