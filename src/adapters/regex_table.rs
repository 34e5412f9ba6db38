//! Regular-expression route table.
//!
//! # Design Decisions
//! - One `RegexSet` per method selects the route; a per-route `Regex`
//!   then extracts the captures
//! - Routes are ordered by specificity before compiling, so the lowest
//!   matching set index is the route a first-match router would pick

use regex::{Regex, RegexSet};

use crate::adapters::{
    single_route_fixture, AdapterError, Capabilities, DispatchError, Dispatcher, Handler, HandlerKind, MethodTable,
    RouterAdapter,
};
use crate::fixtures::{Fixture, Method, Pattern, PatternSyntax, Segment};
use crate::http::{BenchRequest, ResponseSink};

const NAME: &str = "regex";

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexAdapter;

struct CompiledRoute {
    regex: Regex,
    names: Vec<String>,
    handler: Handler,
}

struct MethodRoutes {
    set: RegexSet,
    routes: Vec<CompiledRoute>,
}

struct RegexDispatcher {
    table: MethodTable<MethodRoutes>,
}

/// Translate a pattern into an anchored expression with one group per parameter.
fn to_regex(pattern: &Pattern) -> String {
    let mut expr = String::from("^");
    for segment in pattern.segments() {
        expr.push('/');
        match segment {
            Segment::Literal(text) => expr.push_str(&regex::escape(text)),
            Segment::Param(_) => expr.push_str("([^/]+)"),
            Segment::CatchAll(_) => expr.push_str("(.*)"),
        }
    }
    expr.push('$');
    expr
}

impl RegexAdapter {
    fn build(&self, fixture: &Fixture, kind: HandlerKind) -> Result<RegexDispatcher, AdapterError> {
        let build_err = |reason: String| AdapterError::Build {
            router: NAME.to_string(),
            reason,
        };

        let mut grouped: MethodTable<Vec<(usize, &Pattern)>> = MethodTable::new();
        for (index, route) in fixture.routes().iter().enumerate() {
            grouped
                .get_or_insert_with(route.method, Vec::new)
                .push((index, &route.pattern));
        }

        let mut table = MethodTable::new();
        for (method, routes) in grouped.iter() {
            let mut ordered = routes.clone();
            ordered.sort_by_key(|(_, pattern)| std::cmp::Reverse(pattern.specificity()));

            let exprs: Vec<String> = ordered.iter().map(|(_, pattern)| to_regex(pattern)).collect();
            let set = RegexSet::new(&exprs).map_err(|err| build_err(err.to_string()))?;
            let mut compiled = Vec::with_capacity(ordered.len());
            for ((index, pattern), expr) in ordered.iter().zip(&exprs) {
                compiled.push(CompiledRoute {
                    regex: Regex::new(expr).map_err(|err| build_err(format!("{pattern}: {err}")))?,
                    names: pattern.param_names().map(str::to_string).collect(),
                    handler: Handler::new(*index, kind),
                });
            }
            table.get_or_insert_with(method, || MethodRoutes {
                set,
                routes: compiled,
            });
        }
        Ok(RegexDispatcher { table })
    }
}

impl RouterAdapter for RegexAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn syntax(&self) -> PatternSyntax {
        PatternSyntax::Colon
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            params: true,
            catch_all: true,
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

impl Dispatcher for RegexDispatcher {
    fn serve(&self, request: &BenchRequest, sink: &mut ResponseSink) -> Result<(), DispatchError> {
        let path = request.path();
        let routes = self.table.get(request.method()).ok_or(DispatchError::NotFound)?;
        let first = routes.set.matches(path).iter().next().ok_or(DispatchError::NotFound)?;
        let route = &routes.routes[first];

        if route.names.is_empty() {
            route.handler.invoke(std::iter::empty::<(&str, &str)>(), sink);
            return Ok(());
        }
        let captures = route.regex.captures(path).ok_or(DispatchError::NotFound)?;
        let values = captures
            .iter()
            .skip(1)
            .map(|group| group.map_or("", |m| m.as_str()));
        route
            .handler
            .invoke(route.names.iter().map(String::as_str).zip(values), sink);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_regex() {
        let pattern = Pattern::parse("/repos/:owner/:repo/git/*ref").unwrap();
        assert_eq!(to_regex(&pattern), "^/repos/([^/]+)/([^/]+)/git/(.*)$");
        assert_eq!(to_regex(&Pattern::parse("/").unwrap()), "^/$");
        assert_eq!(to_regex(&Pattern::parse("/a.b").unwrap()), r"^/a\.b$");
    }

    #[test]
    fn test_specific_route_wins_regardless_of_order() {
        let fixture = Fixture::from_table(
            "overlap",
            &[(Method::Get, "/users/:user"), (Method::Get, "/users/keys")],
        )
        .unwrap();
        let dispatcher = RegexAdapter.build_from_route_set(&fixture).unwrap();

        let mut sink = ResponseSink::capturing();
        dispatcher
            .serve(&BenchRequest::new(Method::Get, "/users/keys"), &mut sink)
            .unwrap();
        assert_eq!(sink.route(), Some(1));
        assert!(sink.captured().is_empty());

        sink.reset();
        dispatcher
            .serve(&BenchRequest::new(Method::Get, "/users/gordon"), &mut sink)
            .unwrap();
        assert_eq!(sink.route(), Some(0));
        assert_eq!(sink.captured(), &[("user".to_string(), "gordon".to_string())]);
    }

    #[test]
    fn test_empty_catch_all() {
        let pattern = Pattern::parse("/src/*filepath").unwrap();
        let dispatcher = RegexAdapter
            .build_from_single_route(Method::Get, &pattern, HandlerKind::ReadParams)
            .unwrap();

        let mut sink = ResponseSink::capturing();
        dispatcher.serve(&BenchRequest::new(Method::Get, "/src/"), &mut sink).unwrap();
        assert_eq!(sink.route(), Some(0));
        assert_eq!(sink.captured(), &[("filepath".to_string(), String::new())]);
    }
}
