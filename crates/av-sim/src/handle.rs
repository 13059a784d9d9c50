//! Cross-thread inputs to a running [`Sim`](crate::Sim).
//!
//! Producers (perception, a light controller, an operator setting poses)
//! hold clones of [`SimHandle`] and publish into versioned cells.  The loop
//! reads every cell exactly once at the start of a tick, so an input that
//! arrives mid-tick is seen on the next one and never half-way.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use av_core::Pose;
use av_perception::{DetectedObject, SnapshotCell, TrafficLight};

// ── StepGate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct GateState {
    /// Step signals not yet consumed.
    pending: u64,
    cancelled: bool,
}

/// Counting gate for step-by-step mode: every [`signal`](Self::signal)
/// releases exactly one [`wait`](Self::wait).
#[derive(Debug, Default)]
pub struct StepGate {
    state: Mutex<GateState>,
    cv: Condvar,
}

impl StepGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow one more tick.
    pub fn signal(&self) {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        s.pending += 1;
        self.cv.notify_one();
    }

    /// Block until a step signal is available and consume it.  Returns
    /// `false` once the gate is cancelled.
    pub fn wait(&self) -> bool {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while s.pending == 0 && !s.cancelled {
            s = self.cv.wait(s).unwrap_or_else(PoisonError::into_inner);
        }
        if s.cancelled {
            return false;
        }
        s.pending -= 1;
        true
    }

    /// Wake every waiter; all later waits return `false`.
    pub fn cancel(&self) {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        s.cancelled = true;
        self.cv.notify_all();
    }

    pub fn pending(&self) -> u64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).pending
    }
}

// ── SimHandle ─────────────────────────────────────────────────────────────────

/// The input cells shared between producers and the loop.
#[derive(Default)]
pub struct SimInputs {
    pub initial_pose: SnapshotCell<Pose>,
    pub goal: SnapshotCell<Pose>,
    pub objects: SnapshotCell<Vec<DetectedObject>>,
    pub lights: SnapshotCell<Vec<TrafficLight>>,
    pub gate: StepGate,
    shutdown: AtomicBool,
    /// `f64` bits of the simulated time at the start of the current tick.
    sim_time_bits: AtomicU64,
}

/// Cloneable, thread-safe access to a simulator's inputs.
#[derive(Clone, Default)]
pub struct SimHandle {
    inner: Arc<SimInputs>,
}

impl SimHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-initialise the vehicle at `pose` on the next tick.
    pub fn publish_initial_pose(&self, pose: Pose) -> u64 {
        self.inner.initial_pose.publish(pose, self.sim_time_secs())
    }

    /// Plan to `pose` on the next tick.
    pub fn publish_goal(&self, pose: Pose) -> u64 {
        self.inner.goal.publish(pose, self.sim_time_secs())
    }

    /// Replace the detected objects.  `stamp_secs` is the simulated time the
    /// detections describe.
    pub fn publish_objects(&self, objects: Vec<DetectedObject>, stamp_secs: f64) -> u64 {
        self.inner.objects.publish(objects, stamp_secs)
    }

    pub fn publish_lights(&self, lights: Vec<TrafficLight>, stamp_secs: f64) -> u64 {
        self.inner.lights.publish(lights, stamp_secs)
    }

    /// Release one tick in step-by-step mode.
    pub fn step(&self) {
        self.inner.gate.signal();
    }

    /// Stop the loop: cancels a pending step wait and ends `Sim::run`.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.gate.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Simulated time at the start of the current tick, for stamping inputs.
    pub fn sim_time_secs(&self) -> f64 {
        f64::from_bits(self.inner.sim_time_bits.load(Ordering::Acquire))
    }

    pub(crate) fn set_sim_time(&self, secs: f64) {
        self.inner.sim_time_bits.store(secs.to_bits(), Ordering::Release);
    }

    pub fn inputs(&self) -> &SimInputs {
        &self.inner
    }
}
