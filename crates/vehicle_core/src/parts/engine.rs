//! Power sources driving propellers

use crate::definition::EngineDefinition;
use crate::foundation::logging::debug;

/// Rotational power delivered to a propeller
pub trait PowerSource {
    /// Crankshaft speed
    fn rpm(&self) -> f64;

    /// Highest sustained speed
    fn max_safe_rpm(&self) -> f64;

    /// Engine revolutions per propeller revolution, zero when disengaged
    fn propeller_gearbox_ratio(&self) -> f64;

    /// Producing power
    fn is_running(&self) -> bool;
}

/// Engine that spools linearly toward a throttle-set speed
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleEngine {
    definition: EngineDefinition,
    rpm: f64,
    running: bool,
}

impl SimpleEngine {
    /// Stopped engine
    pub fn new(definition: EngineDefinition) -> Self {
        Self {
            definition,
            rpm: 0.0,
            running: false,
        }
    }

    /// Definition
    pub fn definition(&self) -> &EngineDefinition {
        &self.definition
    }

    /// Start at idle
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.rpm = self.rpm.max(self.definition.idle_rpm);
        }
    }

    /// Start by spinning the propeller by hand
    pub fn hand_start(&mut self) {
        debug!("engine hand-started");
        self.start();
    }

    /// Cut power; the engine spools down
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Spool toward the speed set by `throttle`
    pub fn tick(&mut self, throttle: f64) {
        let target = if self.running {
            let idle = self.definition.idle_rpm;
            idle + (self.definition.max_safe_rpm - idle) * throttle.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let step = self.definition.spool_rate;
        if self.rpm < target {
            self.rpm = (self.rpm + step).min(target);
        } else {
            self.rpm = (self.rpm - step).max(target);
        }
    }

    /// Force a speed, used by hosts with their own engine model
    pub fn set_rpm(&mut self, rpm: f64) {
        self.rpm = rpm.max(0.0);
    }
}

impl PowerSource for SimpleEngine {
    fn rpm(&self) -> f64 {
        self.rpm
    }

    fn max_safe_rpm(&self) -> f64 {
        self.definition.max_safe_rpm
    }

    fn propeller_gearbox_ratio(&self) -> f64 {
        self.definition.propeller_gearbox_ratio
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
