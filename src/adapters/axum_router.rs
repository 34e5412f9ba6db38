//! `axum::Router` driven synchronously.
//!
//! # Data Flow
//! ```text
//! BenchRequest
//!     → http::Request<Body> (method, cached Uri)
//!     → tower::Service::call on a cloned Router
//!     → now_or_never (handlers never await)
//!     → handler reads RawPathParams, stores RouteHit in response extensions
//!     → ResponseSink (route, params, body bytes)
//! ```
//!
//! # Design Decisions
//! - Routes sharing a path are merged into one `MethodRouter`
//! - Anything other than a 2xx carrying a `RouteHit` is a miss
//! - A future that does not complete on first poll is an engine error
//! - Request targets are parsed into a `Uri` once per dispatcher, then cloned
//! - Response bodies are only collected when the handler wrote one

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::poll_fn;

use axum::body::{self, Body};
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{RawPathParams, Request};
use axum::http::{Method as HttpMethod, Uri};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use futures_util::FutureExt;
use tower::Service;

use crate::adapters::{
    single_route_fixture, AdapterError, Capabilities, DispatchError, Dispatcher, Handler, HandlerKind, RouterAdapter,
    ACK_BODY,
};
use crate::fixtures::{Fixture, Method, Pattern, PatternSyntax};
use crate::http::{BenchRequest, ResponseSink};

const NAME: &str = "axum";

#[derive(Debug, Clone, Copy, Default)]
pub struct AxumAdapter;

/// Request extension asking the handler for owned parameter copies.
#[derive(Debug, Clone, Copy)]
struct CaptureParams;

/// Response extension naming the route that handled the request.
#[derive(Debug, Clone)]
struct RouteHit {
    route: usize,
    params_read: usize,
    captured: Option<Vec<(String, String)>>,
    wrote_body: bool,
}

struct AxumDispatcher {
    router: Router,
    /// Parsed request targets, keyed by `BenchRequest::target`.
    uris: RefCell<HashMap<String, Uri>>,
}

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Put => MethodFilter::PUT,
        Method::Patch => MethodFilter::PATCH,
        Method::Delete => MethodFilter::DELETE,
        Method::Head => MethodFilter::HEAD,
        Method::Options => MethodFilter::OPTIONS,
    }
}

fn http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::GET,
        Method::Post => HttpMethod::POST,
        Method::Put => HttpMethod::PUT,
        Method::Patch => HttpMethod::PATCH,
        Method::Delete => HttpMethod::DELETE,
        Method::Head => HttpMethod::HEAD,
        Method::Options => HttpMethod::OPTIONS,
    }
}

fn respond(handler: Handler, params: Option<RawPathParams>, request: &Request) -> Response {
    let capture = request.extensions().get::<CaptureParams>().is_some();
    let mut params_read = 0;
    let mut captured = capture.then(Vec::new);
    for (name, value) in params.iter().flat_map(|p| p.iter()) {
        params_read += 1;
        std::hint::black_box((name, value));
        if let Some(captured) = &mut captured {
            captured.push((name.to_string(), value.to_string()));
        }
    }

    let wrote_body = handler.kind == HandlerKind::ReadParamsWrite;
    let body = if wrote_body { Body::from(ACK_BODY) } else { Body::empty() };
    let mut response = Response::new(body);
    response.extensions_mut().insert(RouteHit {
        route: handler.route,
        params_read,
        captured,
        wrote_body,
    });
    response
}

impl AxumAdapter {
    fn build(&self, fixture: &Fixture, kind: HandlerKind) -> Result<AxumDispatcher, AdapterError> {
        // Paths in first-registration order, each with its per-method handlers.
        let mut paths: Vec<(String, Vec<(Method, Handler)>)> = Vec::new();
        for (index, route) in fixture.routes().iter().enumerate() {
            let path = route.pattern.render(self.syntax());
            let handler = Handler::new(index, kind);
            match paths.iter_mut().find(|(existing, _)| *existing == path) {
                Some((_, handlers)) => handlers.push((route.method, handler)),
                None => paths.push((path, vec![(route.method, handler)])),
            }
        }

        let router = crate::adapters::isolate(move || {
            paths.into_iter().fold(Router::new(), |router, (path, handlers)| {
                let methods = handlers
                    .into_iter()
                    .fold(MethodRouter::new(), |methods, (method, handler)| {
                        let on_hit = move |params: Result<RawPathParams, RawPathParamsRejection>,
                                           request: Request| async move {
                            respond(handler, params.ok(), &request)
                        };
                        methods.on(method_filter(method), on_hit)
                    });
                router.route(&path, methods)
            })
        })
        .map_err(|reason| AdapterError::Build {
            router: NAME.to_string(),
            reason,
        })?;
        Ok(AxumDispatcher {
            router,
            uris: RefCell::default(),
        })
    }
}

impl RouterAdapter for AxumAdapter {
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

fn never<T>(err: Infallible) -> T {
    match err {}
}

impl AxumDispatcher {
    fn uri(&self, target: &str) -> Result<Uri, DispatchError> {
        if let Some(uri) = self.uris.borrow().get(target) {
            return Ok(uri.clone());
        }
        let uri = target
            .parse::<Uri>()
            .map_err(|err| DispatchError::Engine(format!("{target}: {err}")))?;
        self.uris.borrow_mut().insert(target.to_string(), uri.clone());
        Ok(uri)
    }
}

impl Dispatcher for AxumDispatcher {
    fn serve(&self, request: &BenchRequest, sink: &mut ResponseSink) -> Result<(), DispatchError> {
        let mut outgoing = Request::new(Body::empty());
        *outgoing.method_mut() = http_method(request.method());
        *outgoing.uri_mut() = self.uri(request.target())?;
        if sink.is_capturing() {
            outgoing.extensions_mut().insert(CaptureParams);
        }

        let mut service = self.router.clone();
        poll_fn(|cx| Service::<Request>::poll_ready(&mut service, cx))
            .now_or_never()
            .ok_or(DispatchError::Pending)?
            .unwrap_or_else(never);
        let response = service
            .call(outgoing)
            .now_or_never()
            .ok_or(DispatchError::Pending)?
            .unwrap_or_else(never);

        if !response.status().is_success() {
            return Err(DispatchError::NotFound);
        }
        let (parts, response_body) = response.into_parts();
        let hit = parts.extensions.get::<RouteHit>().ok_or(DispatchError::NotFound)?;

        sink.acknowledge(hit.route);
        match &hit.captured {
            Some(captured) => {
                for (name, value) in captured {
                    sink.observe_param(name, value);
                }
            }
            None => sink.note_params(hit.params_read),
        }

        if !hit.wrote_body {
            return Ok(());
        }
        let bytes = body::to_bytes(response_body, usize::MAX)
            .now_or_never()
            .ok_or(DispatchError::Pending)?
            .map_err(|err| DispatchError::Engine(err.to_string()))?;
        sink.write_body(&bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_syntax_dispatch() {
        let pattern = Pattern::parse("/user/:name").unwrap();
        let dispatcher = AxumAdapter
            .build_from_single_route(Method::Get, &pattern, HandlerKind::ReadParamsWrite)
            .unwrap();

        let mut sink = ResponseSink::capturing();
        dispatcher
            .serve(&BenchRequest::new(Method::Get, "/user/gordon"), &mut sink)
            .unwrap();
        assert_eq!(sink.route(), Some(0));
        assert_eq!(sink.captured(), &[("name".to_string(), "gordon".to_string())]);
        assert_eq!(sink.body_bytes(), 2);
    }

    #[test]
    fn test_shared_path_different_methods() {
        let fixture = Fixture::from_table(
            "methods",
            &[(Method::Get, "/gists/:id"), (Method::Patch, "/gists/:id"), (Method::Get, "/gists")],
        )
        .unwrap();
        let dispatcher = AxumAdapter.build_from_route_set(&fixture).unwrap();

        let mut sink = ResponseSink::new();
        dispatcher
            .serve(&BenchRequest::new(Method::Patch, "/gists/9"), &mut sink)
            .unwrap();
        assert_eq!(sink.route(), Some(1));
        assert_eq!(sink.params_seen(), 1);

        dispatcher
            .serve(&BenchRequest::new(Method::Get, "/gists").with_query("page=2"), &mut sink)
            .unwrap();
        assert_eq!(sink.route(), Some(2));

        assert_eq!(
            dispatcher.serve(&BenchRequest::new(Method::Delete, "/gists/9"), &mut sink),
            Err(DispatchError::NotFound)
        );
        assert_eq!(
            dispatcher.serve(&BenchRequest::new(Method::Get, "/nope"), &mut sink),
            Err(DispatchError::NotFound)
        );
    }

    #[test]
    fn test_targets_parsed_once() {
        let fixture = Fixture::from_table("cache", &[(Method::Get, "/a"), (Method::Get, "/b/:c")]).unwrap();
        let dispatcher = AxumAdapter.build(&fixture, HandlerKind::ReadParams).unwrap();

        let mut sink = ResponseSink::new();
        for _ in 0..3 {
            dispatcher.serve(&BenchRequest::new(Method::Get, "/b/x"), &mut sink).unwrap();
        }
        assert_eq!(dispatcher.uris.borrow().len(), 1);
        assert_eq!(sink.route(), Some(1));
        assert_eq!(sink.body_bytes(), 0);

        dispatcher.serve(&BenchRequest::new(Method::Get, "/a"), &mut sink).unwrap();
        assert_eq!(dispatcher.uris.borrow().len(), 2);
    }
}
