//! Synthetic single-route fixtures with 0, 1, 5 and 20 consecutive
//! parameters, plus the request path each one is driven with.

use crate::fixtures::route::Method;

/// A one-route fixture and the request that exercises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleRoute {
    pub fixture: &'static str,
    pub method: Method,
    pub pattern: &'static str,
    pub request: &'static str,
}

pub const PARAM0: SingleRoute = SingleRoute {
    fixture: "param0",
    method: Method::Get,
    pattern: "/user/gordon",
    request: "/user/gordon",
};

pub const PARAM1: SingleRoute = SingleRoute {
    fixture: "param1",
    method: Method::Get,
    pattern: "/user/:name",
    request: "/user/gordon",
};

pub const PARAM5: SingleRoute = SingleRoute {
    fixture: "param5",
    method: Method::Get,
    pattern: "/:a/:b/:c/:d/:e",
    request: "/test/test/test/test/test",
};

pub const PARAM20: SingleRoute = SingleRoute {
    fixture: "param20",
    method: Method::Get,
    pattern: "/:a/:b/:c/:d/:e/:f/:g/:h/:i/:j/:k/:l/:m/:n/:o/:p/:q/:r/:s/:t",
    request: "/a/b/c/d/e/f/g/h/i/j/k/l/m/n/o/p/q/r/s/t",
};

pub const ALL: [SingleRoute; 4] = [PARAM0, PARAM1, PARAM5, PARAM20];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::pattern::Pattern;

    #[test]
    fn test_param_counts() {
        let counts: Vec<usize> = ALL
            .iter()
            .map(|r| Pattern::parse(r.pattern).unwrap().param_count())
            .collect();
        assert_eq!(counts, [0, 1, 5, 20]);
    }

    #[test]
    fn test_requests_match_their_pattern() {
        for route in ALL {
            let pattern = Pattern::parse(route.pattern).unwrap();
            assert!(pattern.captures(route.request).is_some(), "{}", route.fixture);
        }
    }
}
