//! # Barrier Actuator Service
//!
//! Owns the only mutable actuator state and runs every physical transition.
//!
//! ## Admission
//!
//! Commands are single-flight per barrier: each takes the motion permit up
//! front via `try_lock`, so a second command arriving during any part of a
//! running command (including the pause between close attempts) is rejected
//! with `busy` before it can touch state.
//!
//! ## Locking
//!
//! The state mutex guards only check-and-set sequences and is never held
//! across a sleep or a sensor poll; status snapshots stay cheap while a
//! 10-second close attempt is monitoring for obstacles.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use shared_types::{
    BarrierAction, BarrierEvent, BarrierId, EventSink, EventType, PrincipalId, TriggerMethod,
};

use crate::domain::config::ActuatorConfig;
use crate::domain::errors::ActuatorError;
use crate::domain::state::{ActuatorState, StateSnapshot};
use crate::ports::{DistanceSensor, LampSignal, SignalLamp};

/// Outcome of one close attempt's monitoring window.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AttemptOutcome {
    /// The window elapsed with no obstacle and no stop request.
    Clear,
    /// A reading fell strictly below the obstacle threshold.
    Obstacle(f64),
    /// `stop_requested` was raised; abort with no further retries.
    Stopped,
}

/// Clears `in_motion` on every exit path of a travel phase.
struct MotionPhase<'a> {
    state: &'a Mutex<ActuatorState>,
}

impl<'a> MotionPhase<'a> {
    fn begin(state: &'a Mutex<ActuatorState>) -> Self {
        state.lock().in_motion = true;
        Self { state }
    }
}

impl Drop for MotionPhase<'_> {
    fn drop(&mut self) {
        self.state.lock().in_motion = false;
    }
}

/// The physical barrier state machine.
///
/// Constructed once at startup and shared (`Arc`) between the command
/// handlers, the radio gateway, and the auto-close timer.
pub struct BarrierActuator {
    barrier_id: BarrierId,
    config: ActuatorConfig,
    state: Mutex<ActuatorState>,
    /// Single-flight admission: held for the whole duration of one command.
    motion: tokio::sync::Mutex<()>,
    sensor: Arc<dyn DistanceSensor>,
    lamp: Arc<dyn SignalLamp>,
    events: Arc<dyn EventSink>,
}

impl BarrierActuator {
    /// Create an actuator for one barrier. Starts closed, idle, service mode
    /// off.
    pub fn new(
        barrier_id: BarrierId,
        config: ActuatorConfig,
        sensor: Arc<dyn DistanceSensor>,
        lamp: Arc<dyn SignalLamp>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ActuatorError> {
        config
            .validate()
            .map_err(|e| ActuatorError::InvalidConfig(e.to_string()))?;
        lamp.signal(LampSignal::Closed);
        Ok(Self {
            barrier_id,
            config,
            state: Mutex::new(ActuatorState::default()),
            motion: tokio::sync::Mutex::new(()),
            sensor,
            lamp,
            events,
        })
    }

    /// The barrier this actuator drives.
    #[must_use]
    pub fn barrier_id(&self) -> &BarrierId {
        &self.barrier_id
    }

    /// Consistent point-in-time view of the state flags.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let state = self.state.lock();
        StateSnapshot {
            is_open: state.is_open,
            in_motion: state.in_motion,
            service_mode: state.service_mode,
        }
    }

    /// Request an abort of an in-progress close (shutdown path). Has no
    /// effect on an in-progress open.
    pub fn stop(&self) {
        warn!(barrier = %self.barrier_id, "stop requested");
        self.state.lock().stop_requested = true;
    }

    /// Raise the barrier.
    ///
    /// Idempotent when already open; rejected with `busy` while another
    /// command holds the mechanism. On success the auto-close timer is armed
    /// unless service mode is active.
    pub async fn open(
        self: Arc<Self>,
        trigger: TriggerMethod,
        principal: Option<PrincipalId>,
    ) -> Result<(), ActuatorError> {
        let _permit = self.motion.try_lock().map_err(|_| ActuatorError::Busy)?;

        if self.state.lock().is_open {
            debug!(barrier = %self.barrier_id, "open requested, barrier already open");
            self.record_success(EventType::BarrierOpened, trigger, principal)
                .with_details("barrier already open")
                .record(&*self.events)
                .await;
            return Ok(());
        }

        info!(barrier = %self.barrier_id, trigger = ?trigger, "opening barrier");
        let phase = MotionPhase::begin(&self.state);
        self.lamp.signal(LampSignal::Moving);
        sleep(self.config.open_duration).await;
        self.state.lock().is_open = true;
        drop(phase);
        self.lamp.signal(LampSignal::Open);
        info!(barrier = %self.barrier_id, "barrier open");

        self.record_success(EventType::BarrierOpened, trigger, principal)
            .with_details("open sequence completed")
            .record(&*self.events)
            .await;

        Self::arm_auto_close(Arc::clone(&self));
        Ok(())
    }

    /// Lower the barrier: up to `max_close_attempts` monitored attempts.
    ///
    /// A failed close never claims success: the barrier stays open after an
    /// obstacle, an external stop, or exhausted retries, and each of those is
    /// reported as its own event.
    pub async fn close(
        &self,
        trigger: TriggerMethod,
        principal: Option<PrincipalId>,
    ) -> Result<(), ActuatorError> {
        let _permit = self.motion.try_lock().map_err(|_| ActuatorError::Busy)?;

        if !self.state.lock().is_open {
            debug!(barrier = %self.barrier_id, "close requested, barrier already closed");
            self.record_success(EventType::BarrierClosed, trigger, principal)
                .with_details("barrier already closed")
                .record(&*self.events)
                .await;
            return Ok(());
        }

        let max = self.config.max_close_attempts;
        for attempt in 1..=max {
            self.state.lock().stop_requested = false;
            info!(barrier = %self.barrier_id, attempt, max_attempts = max, "close attempt");
            let phase = MotionPhase::begin(&self.state);
            self.lamp.signal(LampSignal::Moving);
            let outcome = self.monitor_for_obstacles().await;
            drop(phase);

            match outcome {
                AttemptOutcome::Clear => {
                    self.state.lock().is_open = false;
                    self.lamp.signal(LampSignal::Closed);
                    info!(barrier = %self.barrier_id, attempt, "barrier closed");
                    self.record_success(EventType::BarrierClosed, trigger, principal)
                        .with_details(format!("closed on attempt {attempt}"))
                        .record(&*self.events)
                        .await;
                    return Ok(());
                }
                AttemptOutcome::Stopped => {
                    warn!(barrier = %self.barrier_id, attempt, "close aborted by stop request");
                    self.lamp.signal(LampSignal::Open);
                    self.record_failure(
                        EventType::CloseAttemptFailed,
                        trigger,
                        principal,
                        BarrierAction::Close,
                    )
                    .with_details(format!("externally stopped (attempt {attempt}/{max})"))
                    .record(&*self.events)
                    .await;
                    return Err(ActuatorError::Stopped);
                }
                AttemptOutcome::Obstacle(distance) => {
                    warn!(
                        barrier = %self.barrier_id,
                        attempt,
                        distance_cm = distance,
                        "obstacle detected while closing"
                    );
                    self.lamp.signal(LampSignal::Obstacle);
                    self.record_failure(
                        EventType::CloseAttemptFailed,
                        trigger,
                        principal.clone(),
                        BarrierAction::Close,
                    )
                    .with_details(format!(
                        "obstacle detected at {distance:.1} cm (attempt {attempt}/{max})"
                    ))
                    .record(&*self.events)
                    .await;

                    if attempt < max {
                        self.lamp.signal(LampSignal::Open);
                        sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        warn!(barrier = %self.barrier_id, attempts = max, "close attempts exhausted, barrier remains open");
        self.lamp.signal(LampSignal::Error);
        self.record_failure(
            EventType::BarrierFailure,
            trigger,
            principal,
            BarrierAction::Close,
        )
        .with_details(format!(
            "close failed after {max} attempts, barrier remains open"
        ))
        .record(&*self.events)
        .await;
        Err(ActuatorError::AttemptsExhausted { attempts: max })
    }

    /// Switch the maintenance override on. Opens the barrier when it is
    /// closed and idle; the override counts as started regardless of how the
    /// open turns out.
    pub async fn enter_service(
        self: Arc<Self>,
        trigger: TriggerMethod,
        principal: Option<PrincipalId>,
    ) -> Result<(), ActuatorError> {
        let should_open = {
            let mut state = self.state.lock();
            if state.service_mode {
                debug!(barrier = %self.barrier_id, "service mode already active");
                return Ok(());
            }
            state.service_mode = true;
            !state.is_open && !state.in_motion
        };

        info!(barrier = %self.barrier_id, "service mode started");
        self.record_success(EventType::ServiceModeStarted, trigger, principal.clone())
            .record(&*self.events)
            .await;

        if should_open {
            if let Err(e) = Arc::clone(&self)
                .open(TriggerMethod::ServiceStart, principal)
                .await
            {
                warn!(barrier = %self.barrier_id, error = %e, "open during service start failed");
            }
        }
        Ok(())
    }

    /// Switch the maintenance override off.
    ///
    /// Fail-safe: when the barrier is open, service mode only ends after a
    /// successful close — a stuck-open barrier stays marked serviceable
    /// rather than silently leaving the override with the barrier up.
    pub async fn exit_service(
        &self,
        trigger: TriggerMethod,
        principal: Option<PrincipalId>,
    ) -> Result<(), ActuatorError> {
        enum Decision {
            NotActive,
            Motion,
            CloseFirst,
            DisableOnly,
        }

        let decision = {
            let state = self.state.lock();
            if !state.service_mode {
                Decision::NotActive
            } else if state.in_motion {
                Decision::Motion
            } else if state.is_open {
                Decision::CloseFirst
            } else {
                Decision::DisableOnly
            }
        };

        match decision {
            Decision::NotActive => {
                debug!(barrier = %self.barrier_id, "service mode was not active");
                Ok(())
            }
            Decision::Motion => {
                warn!(barrier = %self.barrier_id, "cannot end service mode while in motion");
                self.record_failure(
                    EventType::ServiceModeEnded,
                    trigger,
                    principal,
                    BarrierAction::ServiceEnd,
                )
                .with_details("cannot end service mode while barrier is in motion")
                .record(&*self.events)
                .await;
                Err(ActuatorError::MotionInProgress)
            }
            Decision::CloseFirst => {
                match self.close(TriggerMethod::ServiceEnd, principal.clone()).await {
                    Ok(()) => {
                        self.state.lock().service_mode = false;
                        info!(barrier = %self.barrier_id, "service mode ended");
                        self.record_success(EventType::ServiceModeEnded, trigger, principal)
                            .record(&*self.events)
                            .await;
                        Ok(())
                    }
                    Err(e) => {
                        warn!(
                            barrier = %self.barrier_id,
                            error = %e,
                            "close failed, staying in service mode"
                        );
                        self.record_failure(
                            EventType::ServiceModeEnded,
                            trigger,
                            principal,
                            BarrierAction::ServiceEnd,
                        )
                        .with_details(format!("failed to close barrier: {e}"))
                        .record(&*self.events)
                        .await;
                        Err(e)
                    }
                }
            }
            Decision::DisableOnly => {
                self.state.lock().service_mode = false;
                info!(barrier = %self.barrier_id, "service mode ended, barrier already closed");
                self.record_success(EventType::ServiceModeEnded, trigger, principal)
                    .with_details("barrier was already closed")
                    .record(&*self.events)
                    .await;
                Ok(())
            }
        }
    }

    /// Arm the auto-close timer, keeping at most one armed at a time.
    fn arm_auto_close(self: Arc<Self>) {
        {
            let mut state = self.state.lock();
            if state.service_mode || state.auto_close_armed || !state.is_open {
                return;
            }
            state.auto_close_armed = true;
        }

        debug!(
            barrier = %self.barrier_id,
            delay = ?self.config.auto_close_delay,
            "auto-close armed"
        );
        tokio::spawn(async move {
            sleep(self.config.auto_close_delay).await;
            {
                let mut state = self.state.lock();
                state.auto_close_armed = false;
                if state.service_mode || !state.is_open || state.in_motion {
                    debug!(barrier = %self.barrier_id, "auto-close skipped");
                    return;
                }
            }
            info!(barrier = %self.barrier_id, "auto-close firing");
            if let Err(e) = self.close(TriggerMethod::AutoClose, None).await {
                warn!(barrier = %self.barrier_id, error = %e, "auto-close failed");
            }
        });
    }

    /// Poll the distance capability for one close-duration window.
    ///
    /// An unavailable capability degrades to "assume no obstacle"; the
    /// degradation is logged once per window.
    async fn monitor_for_obstacles(&self) -> AttemptOutcome {
        let deadline = Instant::now() + self.config.close_duration;
        let mut degraded = false;

        loop {
            if self.state.lock().stop_requested {
                return AttemptOutcome::Stopped;
            }

            match self.sensor.distance_cm() {
                Some(distance) if distance < self.config.distance_threshold_cm => {
                    return AttemptOutcome::Obstacle(distance);
                }
                Some(_) => {}
                None => {
                    if !degraded {
                        warn!(
                            barrier = %self.barrier_id,
                            "distance capability unavailable, assuming no obstacle"
                        );
                        degraded = true;
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return AttemptOutcome::Clear;
            }
            sleep(self.config.poll_interval.min(deadline - now)).await;
        }
    }

    fn record_success(
        &self,
        event_type: EventType,
        trigger: TriggerMethod,
        principal: Option<PrincipalId>,
    ) -> PendingEvent {
        PendingEvent(BarrierEvent::success(
            self.barrier_id.clone(),
            event_type,
            trigger,
            principal,
        ))
    }

    fn record_failure(
        &self,
        event_type: EventType,
        trigger: TriggerMethod,
        principal: Option<PrincipalId>,
        failed_action: BarrierAction,
    ) -> PendingEvent {
        PendingEvent(BarrierEvent::failure(
            self.barrier_id.clone(),
            event_type,
            trigger,
            principal,
            Some(failed_action),
        ))
    }
}

/// Builder-ish wrapper so event construction and recording read as one
/// statement at the call sites.
struct PendingEvent(BarrierEvent);

impl PendingEvent {
    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.0.details = Some(details.into());
        self
    }

    async fn record(self, sink: &dyn EventSink) {
        sink.record(self.0).await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
