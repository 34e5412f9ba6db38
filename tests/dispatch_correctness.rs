//! Every shipped engine must select the same route and extract the same
//! parameters as the fixture oracle.

use route_bench::adapters::{self, ensure_supported, AdapterError, DispatchError, HandlerKind, ACK_BODY};
use route_bench::fixtures::{params, Fixture, Method, Pattern, GITHUB, STATIC};
use route_bench::http::{BenchRequest, ResponseSink};
use route_bench::simulator::DispatchPlan;

mod common;

#[test]
fn test_route_sets_match_oracle() {
    let catalog = common::catalog();
    for adapter in adapters::registry() {
        for fixture in catalog.iter() {
            if ensure_supported(adapter.as_ref(), fixture.requirements()).is_err() {
                continue;
            }
            let dispatcher = adapter
                .build_from_route_set(fixture)
                .unwrap_or_else(|err| panic!("{} on {}: {err}", adapter.name(), fixture.name()));
            let mut plan = DispatchPlan::all_routes(fixture, None).unwrap();
            plan.verify(dispatcher.as_ref(), fixture)
                .unwrap_or_else(|err| panic!("{} on {}: {err}", adapter.name(), fixture.name()));
        }
    }
}

#[test]
fn test_query_does_not_affect_matching() {
    let catalog = common::catalog();
    let github = common::fixture(&catalog, GITHUB);
    for name in ["axum", "matchit", "routefinder", "regex"] {
        let adapter = common::adapter(name);
        let dispatcher = adapter.build_from_route_set(&github).unwrap();
        let mut plan = DispatchPlan::all_routes(&github, Some("page=2&per_page=100")).unwrap();
        plan.verify(dispatcher.as_ref(), &github)
            .unwrap_or_else(|err| panic!("{name}: {err}"));
    }
}

#[test]
fn test_github_single_requests() {
    let catalog = common::catalog();
    let github = common::fixture(&catalog, GITHUB);
    for name in ["axum", "matchit", "routefinder", "regex"] {
        let dispatcher = common::adapter(name).build_from_route_set(&github).unwrap();

        let mut sink = ResponseSink::capturing();
        let request = BenchRequest::new(Method::Get, "/repos/julienschmidt/httprouter/stargazers");
        dispatcher.serve(&request, &mut sink).unwrap();
        assert_eq!(
            sink.captured(),
            &[
                ("owner".to_string(), "julienschmidt".to_string()),
                ("repo".to_string(), "httprouter".to_string()),
            ],
            "{name}"
        );

        sink.reset();
        dispatcher
            .serve(&BenchRequest::new(Method::Get, "/user/repos"), &mut sink)
            .unwrap();
        assert!(sink.captured().is_empty(), "{name}");
        let expected = github.resolve(Method::Get, "/user/repos").unwrap().route;
        assert_eq!(sink.route(), Some(expected), "{name}");
    }
}

#[test]
fn test_unknown_path_is_not_found() {
    let catalog = common::catalog();
    let fixture = common::fixture(&catalog, STATIC);
    for adapter in adapters::registry() {
        let dispatcher = adapter.build_from_route_set(&fixture).unwrap();
        let mut sink = ResponseSink::new();
        let result = dispatcher.serve(&BenchRequest::new(Method::Get, "/no/such/file.html"), &mut sink);
        assert_eq!(result, Err(DispatchError::NotFound), "{}", adapter.name());
        assert_eq!(sink.route(), None, "{}", adapter.name());
    }
}

#[test]
fn test_wrong_method_is_not_found() {
    let catalog = common::catalog();
    let fixture = common::fixture(&catalog, STATIC);
    let path = fixture.routes()[0].pattern.as_str().to_string();
    for adapter in adapters::registry() {
        let dispatcher = adapter.build_from_route_set(&fixture).unwrap();
        let mut sink = ResponseSink::new();
        let result = dispatcher.serve(&BenchRequest::new(Method::Delete, &path), &mut sink);
        assert_eq!(result, Err(DispatchError::NotFound), "{}", adapter.name());
    }
}

#[test]
fn test_single_routes() {
    let catalog = common::catalog();
    for adapter in adapters::registry() {
        for single in params::ALL {
            let pattern = Pattern::parse(single.pattern).unwrap();
            let oracle = common::fixture(&catalog, single.fixture);
            if ensure_supported(adapter.as_ref(), oracle.requirements()).is_err() {
                continue;
            }
            let dispatcher = adapter
                .build_from_single_route(single.method, &pattern, HandlerKind::ReadParams)
                .unwrap();
            let mut plan = DispatchPlan::single(single.method, single.request, None).unwrap();
            plan.verify(dispatcher.as_ref(), &oracle)
                .unwrap_or_else(|err| panic!("{} on {}: {err}", adapter.name(), single.fixture));
        }
    }
}

#[test]
fn test_twenty_params_are_all_read() {
    let pattern = Pattern::parse(params::PARAM20.pattern).unwrap();
    for name in ["axum", "matchit", "routefinder", "regex"] {
        let dispatcher = common::adapter(name)
            .build_from_single_route(Method::Get, &pattern, HandlerKind::ReadParams)
            .unwrap();
        let mut sink = ResponseSink::new();
        dispatcher
            .serve(&BenchRequest::new(Method::Get, params::PARAM20.request), &mut sink)
            .unwrap();
        assert_eq!(sink.params_seen(), 20, "{name}");
    }
}

#[test]
fn test_write_handler_writes_ack() {
    let pattern = Pattern::parse(params::PARAM1.pattern).unwrap();
    for name in ["axum", "matchit", "routefinder", "regex"] {
        let dispatcher = common::adapter(name)
            .build_from_single_route(Method::Get, &pattern, HandlerKind::ReadParamsWrite)
            .unwrap();
        let mut sink = ResponseSink::new();
        dispatcher
            .serve(&BenchRequest::new(Method::Get, "/user/gordon"), &mut sink)
            .unwrap();
        assert_eq!(sink.params_seen(), 1, "{name}");
        assert_eq!(sink.body_bytes(), ACK_BODY.len() as u64, "{name}");
    }
}

#[test]
fn test_routefinder_refuses_catch_all() {
    let fixture = Fixture::from_table("files", &[(Method::Get, "/src/*filepath")]).unwrap();
    let adapter = common::adapter("routefinder");
    let err = ensure_supported(adapter.as_ref(), fixture.requirements()).unwrap_err();
    assert!(matches!(err, AdapterError::Unsupported { .. }), "{err}");
}
