//! Fluent builder for constructing a [`SimulationEngine`].

use rp_core::PlannerConfig;
use rp_network::Route;

use crate::{RouteSnapshot, SimError, SimResult, SimulationEngine};

/// Fluent builder for [`SimulationEngine`].
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                              |
/// |-------------------------|--------------------------------------|
/// | `.config(c)`            | `PlannerConfig::default()`           |
/// | `.speed_multiplier(m)`  | `config.speed_multiplier`            |
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = EngineBuilder::new(&route)
///     .config(config)
///     .speed_multiplier(10.0)
///     .build()?;
/// let handle = engine.start()?;
/// engine.tick(handle, now_secs, &mut NoopObserver);
/// ```
pub struct EngineBuilder<'r> {
    route:            &'r Route,
    config:           PlannerConfig,
    speed_multiplier: Option<f64>,
}

impl<'r> EngineBuilder<'r> {
    pub fn new(route: &'r Route) -> Self {
        Self { route, config: PlannerConfig::default(), speed_multiplier: None }
    }

    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Simulated seconds per real second.
    pub fn speed_multiplier(mut self, multiplier: f64) -> Self {
        self.speed_multiplier = Some(multiplier);
        self
    }

    /// Validate the configuration, snapshot the route and return an idle
    /// engine at the first path vertex.
    pub fn build(self) -> SimResult<SimulationEngine> {
        self.config.validate()?;
        let multiplier = self.speed_multiplier.unwrap_or(self.config.speed_multiplier);
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(SimError::InvalidSpeedMultiplier(multiplier));
        }
        let snapshot = RouteSnapshot::capture(self.route, &self.config);
        Ok(SimulationEngine::new(snapshot, multiplier))
    }
}
