//! Route set fixtures.
//!
//! # Data Flow
//! ```text
//! static tables of (Method, &str)
//!     → pattern.rs (parse canonical `:name` / `*name` syntax)
//!     → Fixture (duplicate check, frozen)
//!     → Catalog (built once at startup, shared read-only)
//! ```
//!
//! # Design Decisions
//! - One canonical route list per fixture; adapters translate syntax
//! - Insertion order is preserved and handed to adapters unchanged
//! - Any malformed pattern fails the whole catalog

pub mod github;
pub mod params;
pub mod pattern;
pub mod route;
pub mod static_files;

use std::collections::HashSet;

pub use pattern::{Pattern, PatternError, PatternSyntax, Segment};
pub use route::{Method, RouteDescriptor};

/// Fixture name of the static file server route set.
pub const STATIC: &str = "static";
/// Fixture name of the GitHub API route set.
pub const GITHUB: &str = "github";

/// Errors raised while constructing fixtures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureError {
    #[error("fixture {fixture}: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        fixture: String,
        pattern: String,
        source: PatternError,
    },

    #[error("fixture {fixture}: duplicate route {method} {pattern}")]
    DuplicateRoute {
        fixture: String,
        method: Method,
        pattern: String,
    },
}

/// What a router must support to register every route of a fixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Largest parameter count of any single route.
    pub max_params: usize,
    /// Whether any route ends in a catch-all.
    pub catch_all: bool,
}

impl Requirements {
    /// Requirements of a single pattern.
    pub fn of(pattern: &Pattern) -> Self {
        Self {
            max_params: pattern.param_count(),
            catch_all: pattern.has_catch_all(),
        }
    }
}

/// The route a correct router selects for a request, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub route: usize,
    pub params: Vec<(String, String)>,
}

/// A named, ordered, immutable sequence of route descriptors.
#[derive(Debug, Clone)]
pub struct Fixture {
    name: String,
    routes: Vec<RouteDescriptor>,
}

impl Fixture {
    /// Build a fixture from already parsed routes.
    pub fn new(name: impl Into<String>, routes: Vec<RouteDescriptor>) -> Result<Self, FixtureError> {
        let name = name.into();
        {
            let mut seen = HashSet::with_capacity(routes.len());
            for route in &routes {
                if !seen.insert((route.method, route.pattern.as_str())) {
                    return Err(FixtureError::DuplicateRoute {
                        fixture: name,
                        method: route.method,
                        pattern: route.pattern.as_str().to_string(),
                    });
                }
            }
        }
        Ok(Self { name, routes })
    }

    /// Parse a table of canonical (method, pattern) pairs.
    pub fn from_table(name: impl Into<String>, table: &[(Method, &str)]) -> Result<Self, FixtureError> {
        let name = name.into();
        let mut routes = Vec::with_capacity(table.len());
        for &(method, source) in table {
            let pattern = Pattern::parse(source).map_err(|source_err| FixtureError::InvalidPattern {
                fixture: name.clone(),
                pattern: source.to_string(),
                source: source_err,
            })?;
            routes.push(RouteDescriptor::new(method, pattern));
        }
        Self::new(name, routes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn requirements(&self) -> Requirements {
        self.routes.iter().fold(Requirements::default(), |acc, route| {
            let own = Requirements::of(&route.pattern);
            Requirements {
                max_params: acc.max_params.max(own.max_params),
                catch_all: acc.catch_all || own.catch_all,
            }
        })
    }

    /// Find the route a correct router must select for `method` + `path`.
    ///
    /// Among overlapping matches the most specific pattern wins; ties go to
    /// the earliest registered route.
    pub fn resolve(&self, method: Method, path: &str) -> Option<Resolved> {
        let mut best: Option<(usize, (usize, bool))> = None;
        for (index, route) in self.routes.iter().enumerate() {
            if route.method != method || !route.pattern.match_path(path, |_, _| {}) {
                continue;
            }
            let rank = route.pattern.specificity();
            if best.map_or(true, |(_, best_rank)| rank > best_rank) {
                best = Some((index, rank));
            }
        }

        let (route, _) = best?;
        let params = self.routes[route].pattern.captures(path)?;
        Some(Resolved { route, params })
    }
}

/// Every fixture used by a benchmark run, built once.
#[derive(Debug, Clone)]
pub struct Catalog {
    fixtures: Vec<Fixture>,
}

impl Catalog {
    /// Build the static-file, GitHub API and single-route fixtures.
    pub fn load() -> Result<Self, FixtureError> {
        let mut fixtures = vec![
            Fixture::from_table(STATIC, static_files::ROUTES)?,
            Fixture::from_table(GITHUB, github::ROUTES)?,
        ];
        for single in params::ALL {
            fixtures.push(Fixture::from_table(single.fixture, &[(single.method, single.pattern)])?);
        }
        Ok(Self { fixtures })
    }

    pub fn get(&self, name: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = Catalog::load().unwrap();
        assert_eq!(catalog.get(STATIC).unwrap().len(), 157);
        assert_eq!(catalog.get(GITHUB).unwrap().len(), 203);
        for single in params::ALL {
            assert_eq!(catalog.get(single.fixture).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_static_fixture_has_no_params() {
        let catalog = Catalog::load().unwrap();
        let requirements = catalog.get(STATIC).unwrap().requirements();
        assert_eq!(requirements.max_params, 0);
        assert!(!requirements.catch_all);
    }

    #[test]
    fn test_github_requirements() {
        let catalog = Catalog::load().unwrap();
        let requirements = catalog.get(GITHUB).unwrap().requirements();
        assert_eq!(requirements.max_params, 4);
        assert!(!requirements.catch_all);
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let err = Fixture::from_table("dup", &[(Method::Get, "/a"), (Method::Get, "/a")]).unwrap_err();
        assert!(matches!(err, FixtureError::DuplicateRoute { .. }));

        // Same pattern under another method is a distinct route.
        assert!(Fixture::from_table("ok", &[(Method::Get, "/a"), (Method::Post, "/a")]).is_ok());
    }

    #[test]
    fn test_malformed_pattern_rejected() {
        let err = Fixture::from_table("bad", &[(Method::Get, "/ok"), (Method::Get, "nope")]).unwrap_err();
        assert_eq!(
            err,
            FixtureError::InvalidPattern {
                fixture: "bad".into(),
                pattern: "nope".into(),
                source: PatternError::NotAbsolute,
            }
        );
    }

    #[test]
    fn test_resolve_prefers_specific_route() {
        let fixture = Fixture::from_table(
            "overlap",
            &[
                (Method::Get, "/users/:user"),
                (Method::Get, "/users/keys"),
                (Method::Get, "/files/*path"),
                (Method::Get, "/files/:name"),
            ],
        )
        .unwrap();

        assert_eq!(fixture.resolve(Method::Get, "/users/keys").unwrap().route, 1);
        assert_eq!(fixture.resolve(Method::Get, "/users/bob").unwrap().route, 0);
        assert_eq!(fixture.resolve(Method::Get, "/files/a").unwrap().route, 3);
        assert_eq!(fixture.resolve(Method::Get, "/files/a/b").unwrap().route, 2);
        assert!(fixture.resolve(Method::Post, "/users/bob").is_none());
    }

    #[test]
    fn test_resolve_github_param_request() {
        let catalog = Catalog::load().unwrap();
        let github = catalog.get(GITHUB).unwrap();
        let resolved = github
            .resolve(Method::Get, "/repos/julienschmidt/httprouter/stargazers")
            .unwrap();
        assert_eq!(github.routes()[resolved.route].pattern.as_str(), "/repos/:owner/:repo/stargazers");
        assert_eq!(
            resolved.params,
            vec![
                ("owner".to_string(), "julienschmidt".to_string()),
                ("repo".to_string(), "httprouter".to_string()),
            ]
        );
    }

    #[test]
    fn test_every_route_resolves_to_itself() {
        let catalog = Catalog::load().unwrap();
        for fixture in catalog.iter() {
            for (index, route) in fixture.routes().iter().enumerate() {
                let resolved = fixture.resolve(route.method, route.pattern.as_str()).unwrap();
                assert_eq!(resolved.route, index, "{} {}", fixture.name(), route);
            }
        }
    }
}
