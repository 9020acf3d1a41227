use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::systems::collision::DEFAULT_OMEGA;

/// Tunables for one engine instance.
///
/// Every field has a default, so a partial JSON document is valid:
///
/// ```
/// use rivulet_engine::SimulationSettings;
///
/// let settings = SimulationSettings::from_json(r#"{ "omega": 1.4 }"#).unwrap();
/// assert_eq!(settings.omega, 1.4);
/// assert_eq!(settings.batch_iterations, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Relaxation rate of the two viscous modes.
    pub omega: f32,
    /// Collide + stream iterations per macro-step.
    pub batch_iterations: u32,
    /// Wall-clock budget of one macro-step at speed 1.0.
    pub batch_budget_ms: f64,
    /// Sleep between queue drains while paused.
    pub pause_poll_ms: u64,
    pub kinematic_viscosity: f64,
    pub density: f64,
    pub speed: f64,
    pub perf_metrics: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            omega: DEFAULT_OMEGA,
            batch_iterations: 5,
            batch_budget_ms: 16.0,
            pause_poll_ms: 2,
            kinematic_viscosity: 1.0,
            density: 1.0,
            speed: 1.0,
            perf_metrics: false,
        }
    }
}

impl SimulationSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: SimulationSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.omega > 0.0 && self.omega < 2.0) {
            return Err(SimError::InvalidParameter(format!(
                "omega must lie in (0, 2), got {}",
                self.omega
            )));
        }
        if self.batch_iterations == 0 {
            return Err(SimError::InvalidParameter("batch_iterations must be positive".into()));
        }
        if !(self.batch_budget_ms.is_finite() && self.batch_budget_ms >= 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "batch_budget_ms must be finite and non-negative, got {}",
                self.batch_budget_ms
            )));
        }
        check_speed(self.speed)
    }

    /// Sleep target for one macro-step at the given speed.
    pub fn budget_ms(&self, speed: f64) -> f64 {
        self.batch_budget_ms / speed
    }
}

pub(crate) fn check_speed(speed: f64) -> Result<()> {
    if !(speed.is_finite() && speed > 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "speed must be finite and positive, got {}",
            speed
        )));
    }
    Ok(())
}
