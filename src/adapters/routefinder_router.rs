//! `routefinder` route sets, one router per method.
//!
//! # Design Decisions
//! - `routefinder` ranks overlapping routes itself via `best_match`
//! - Its wildcard is anonymous, so named catch-all patterns are declared unsupported
//! - Parameter names are kept next to each handler and read back by name

use crate::adapters::{
    single_route_fixture, AdapterError, Capabilities, DispatchError, Dispatcher, Handler, HandlerKind, MethodTable,
    RouterAdapter,
};
use crate::fixtures::{Fixture, Method, Pattern, PatternSyntax};
use crate::http::{BenchRequest, ResponseSink};

const NAME: &str = "routefinder";

#[derive(Debug, Clone, Copy, Default)]
pub struct RoutefinderAdapter;

struct Registered {
    handler: Handler,
    names: Vec<String>,
}

struct RoutefinderDispatcher {
    routers: MethodTable<routefinder::Router<Registered>>,
}

impl RoutefinderAdapter {
    fn build(&self, fixture: &Fixture, kind: HandlerKind) -> Result<RoutefinderDispatcher, AdapterError> {
        let mut routers = MethodTable::new();
        for (index, route) in fixture.routes().iter().enumerate() {
            let registered = Registered {
                handler: Handler::new(index, kind),
                names: route.pattern.param_names().map(str::to_string).collect(),
            };
            routers
                .get_or_insert_with(route.method, routefinder::Router::new)
                .add(route.pattern.render(self.syntax()).as_str(), registered)
                .map_err(|err| AdapterError::Build {
                    router: NAME.to_string(),
                    reason: format!("{route}: {err:?}"),
                })?;
        }
        Ok(RoutefinderDispatcher { routers })
    }
}

impl RouterAdapter for RoutefinderAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn syntax(&self) -> PatternSyntax {
        PatternSyntax::Colon
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            params: true,
            catch_all: false,
            max_params: None,
        }
    }

    fn build_from_route_set(&self, fixture: &Fixture) -> Result<Box<dyn Dispatcher>, AdapterError> {
        Ok(Box::new(self.build(fixture, HandlerKind::ReadParams)?))
    }

    fn build_from_single_route(
        &self,
        method: Method,
        pattern: &Pattern,
        kind: HandlerKind,
    ) -> Result<Box<dyn Dispatcher>, AdapterError> {
        let fixture = single_route_fixture(NAME, method, pattern)?;
        Ok(Box::new(self.build(&fixture, kind)?))
    }
}

impl Dispatcher for RoutefinderDispatcher {
    fn serve(&self, request: &BenchRequest, sink: &mut ResponseSink) -> Result<(), DispatchError> {
        let router = self.routers.get(request.method()).ok_or(DispatchError::NotFound)?;
        let matched = router.best_match(request.path()).ok_or(DispatchError::NotFound)?;
        let registered = matched.handler();

        if registered.names.is_empty() {
            registered.handler.invoke(std::iter::empty::<(&str, &str)>(), sink);
            return Ok(());
        }
        let captures = matched.captures();
        let params = registered
            .names
            .iter()
            .map(|name| (name.as_str(), captures.get(name).unwrap_or("")));
        registered.handler.invoke(params, sink);
        Ok(())
    }
}
