//! Signal-lamp adapters.

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::ports::{LampSignal, SignalLamp};

/// Lamp adapter that reports signals through `tracing`.
///
/// Stands in where no LED driver is wired up; the error state is logged at
/// warn level so it survives default log filtering.
#[derive(Debug, Default)]
pub struct TracingLamp;

impl SignalLamp for TracingLamp {
    fn signal(&self, signal: LampSignal) {
        match signal {
            LampSignal::Obstacle | LampSignal::Error => {
                warn!(signal = ?signal, "barrier lamp");
            }
            _ => debug!(signal = ?signal, "barrier lamp"),
        }
    }
}

/// Lamp adapter that records every signal, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingLamp {
    signals: Mutex<Vec<LampSignal>>,
}

impl RecordingLamp {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything signalled so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<LampSignal> {
        self.signals.lock().clone()
    }
}

impl SignalLamp for RecordingLamp {
    fn signal(&self, signal: LampSignal) {
        self.signals.lock().push(signal);
    }
}
