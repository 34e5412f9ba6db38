//! Radix tree routing via `matchit`, one tree per method.

use crate::adapters::{
    single_route_fixture, AdapterError, Capabilities, DispatchError, Dispatcher, Handler, HandlerKind, MethodTable,
    RouterAdapter,
};
use crate::fixtures::{Fixture, Method, Pattern, PatternSyntax};
use crate::http::{BenchRequest, ResponseSink};

const NAME: &str = "matchit";

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchitAdapter;

struct MatchitDispatcher {
    trees: MethodTable<matchit::Router<Handler>>,
}

impl MatchitAdapter {
    fn build(&self, fixture: &Fixture, kind: HandlerKind) -> Result<MatchitDispatcher, AdapterError> {
        let mut trees = MethodTable::new();
        for (index, route) in fixture.routes().iter().enumerate() {
            trees
                .get_or_insert_with(route.method, matchit::Router::new)
                .insert(route.pattern.render(self.syntax()), Handler::new(index, kind))
                .map_err(|err| AdapterError::Build {
                    router: NAME.to_string(),
                    reason: format!("{route}: {err}"),
                })?;
        }
        Ok(MatchitDispatcher { trees })
    }
}

impl RouterAdapter for MatchitAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn syntax(&self) -> PatternSyntax {
        PatternSyntax::Brace
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

impl Dispatcher for MatchitDispatcher {
    fn serve(&self, request: &BenchRequest, sink: &mut ResponseSink) -> Result<(), DispatchError> {
        let tree = self.trees.get(request.method()).ok_or(DispatchError::NotFound)?;
        let matched = tree.at(request.path()).map_err(|_| DispatchError::NotFound)?;
        matched.value.invoke(matched.params.iter(), sink);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_all_dispatch() {
        let pattern = Pattern::parse("/src/*filepath").unwrap();
        let dispatcher = MatchitAdapter
            .build_from_single_route(Method::Get, &pattern, HandlerKind::ReadParams)
            .unwrap();

        let mut sink = ResponseSink::capturing();
        dispatcher
            .serve(&BenchRequest::new(Method::Get, "/src/a/b/c.go"), &mut sink)
            .unwrap();
        assert_eq!(sink.captured(), &[("filepath".to_string(), "a/b/c.go".to_string())]);
    }

    #[test]
    fn test_methods_are_separate_trees() {
        let fixture = Fixture::from_table(
            "methods",
            &[(Method::Get, "/gists/:id"), (Method::Delete, "/gists/:id")],
        )
        .unwrap();
        let dispatcher = MatchitAdapter.build_from_route_set(&fixture).unwrap();

        let mut sink = ResponseSink::new();
        dispatcher
            .serve(&BenchRequest::new(Method::Delete, "/gists/7"), &mut sink)
            .unwrap();
        assert_eq!(sink.route(), Some(1));
        assert_eq!(
            dispatcher.serve(&BenchRequest::new(Method::Put, "/gists/7"), &mut sink),
            Err(DispatchError::NotFound)
        );
    }
}
