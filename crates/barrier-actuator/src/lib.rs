//! # Barrier Actuator Subsystem
//!
//! The physical state machine behind one barrier: open/close sequences,
//! obstacle-aware close retries, visual-state signalling, the auto-close
//! timer, and the service-mode override.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): configuration, state flags, error taxonomy
//! - **Ports Layer** (`ports/`): distance-sensing and signalling capabilities
//! - **Adapters** (`adapters/`): in-process sensor/lamp implementations (the
//!   real transceiver and ToF drivers live outside this crate and feed the
//!   shared-reading adapter)
//! - **Service Layer** (`service.rs`): the [`BarrierActuator`] itself
//!
//! ## Concurrency model
//!
//! Command handlers, the radio gateway, and the auto-close timer all share
//! one actuator. Admission is single-flight: each command must take the
//! motion permit before touching the mechanism, so "is this barrier already
//! moving" is the executor's own rule rather than a flag check racing a
//! lock. State flags live behind one short-critical-section mutex that is
//! never held across a sleep or a sensor poll.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::lamp::{RecordingLamp, TracingLamp};
pub use adapters::sensor::{ScriptedSensor, SensorPublisher, SharedReadingSensor, StaticSensor};
pub use domain::config::ActuatorConfig;
pub use domain::errors::ActuatorError;
pub use domain::state::{BarrierPosition, StateSnapshot};
pub use ports::{DistanceSensor, LampSignal, SignalLamp};
pub use service::BarrierActuator;
