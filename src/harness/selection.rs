//! Router and scenario selection filter.

use regex::Regex;

/// Which routers and scenarios a run covers. `None` selects everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    routers: Option<Regex>,
    scenarios: Option<Regex>,
}

impl Selection {
    /// Select every router and scenario.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(routers: Option<&str>, scenarios: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            routers: routers.map(Regex::new).transpose()?,
            scenarios: scenarios.map(Regex::new).transpose()?,
        })
    }

    pub fn router_selected(&self, router: &str) -> bool {
        self.routers.as_ref().map_or(true, |re| re.is_match(router))
    }

    pub fn scenario_selected(&self, scenario: &str) -> bool {
        self.scenarios.as_ref().map_or(true, |re| re.is_match(scenario))
    }
}
