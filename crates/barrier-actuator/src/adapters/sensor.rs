//! Distance-sensor adapters.
//!
//! The production time-of-flight driver runs outside this crate and pushes
//! readings into [`SharedReadingSensor`] through its [`SensorPublisher`].
//! The static and scripted variants drive simulations and tests.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::ports::DistanceSensor;

/// Latest-reading cell fed by an external ranging driver.
#[derive(Debug, Default)]
pub struct SharedReadingSensor {
    reading: Arc<RwLock<Option<f64>>>,
}

impl SharedReadingSensor {
    /// Create a sensor with no reading yet (capability unavailable until the
    /// driver publishes).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the ranging driver uses to publish readings.
    #[must_use]
    pub fn publisher(&self) -> SensorPublisher {
        SensorPublisher {
            reading: Arc::clone(&self.reading),
        }
    }
}

impl DistanceSensor for SharedReadingSensor {
    fn distance_cm(&self) -> Option<f64> {
        *self.reading.read()
    }
}

/// Writer half of [`SharedReadingSensor`].
#[derive(Debug, Clone)]
pub struct SensorPublisher {
    reading: Arc<RwLock<Option<f64>>>,
}

impl SensorPublisher {
    /// Publish a fresh reading.
    pub fn publish(&self, distance_cm: f64) {
        *self.reading.write() = Some(distance_cm);
    }

    /// Mark the capability unavailable.
    pub fn clear(&self) {
        *self.reading.write() = None;
    }
}

/// Sensor pinned to one reading (or to "unavailable").
#[derive(Debug)]
pub struct StaticSensor(pub Option<f64>);

impl DistanceSensor for StaticSensor {
    fn distance_cm(&self) -> Option<f64> {
        self.0
    }
}

/// Sensor that replays a scripted sequence of readings, then repeats the
/// last entry.
#[derive(Debug)]
pub struct ScriptedSensor {
    script: Mutex<VecDeque<Option<f64>>>,
    last: Mutex<Option<f64>>,
}

impl ScriptedSensor {
    /// Create from a reading script.
    #[must_use]
    pub fn new(readings: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: Mutex::new(readings.into_iter().collect()),
            last: Mutex::new(None),
        }
    }
}

impl DistanceSensor for ScriptedSensor {
    fn distance_cm(&self) -> Option<f64> {
        match self.script.lock().pop_front() {
            Some(reading) => {
                *self.last.lock() = reading;
                reading
            }
            None => *self.last.lock(),
        }
    }
}
