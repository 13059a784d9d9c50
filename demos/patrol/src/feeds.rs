//! Producer threads standing in for perception and the signal controller.
//!
//! Each thread stamps what it publishes with the loop's simulated time and
//! exits once the handle is shut down.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use av_perception::{FakeObjectGenerator, LightState, TrafficLight};
use av_sim::SimHandle;
use tracing::debug;

/// Wall-clock publish period of the feeds.
const PUBLISH_PERIOD: Duration = Duration::from_millis(50);

/// Green, amber and red phase durations in simulated seconds.
pub const LIGHT_CYCLE_SECS: [(LightState, f64); 3] =
    [(LightState::Go, 12.0), (LightState::Caution, 3.0), (LightState::Stop, 10.0)];

/// Phase of the fixed light cycle at `t` seconds.
pub fn light_phase(t: f64) -> LightState {
    let period: f64 = LIGHT_CYCLE_SECS.iter().map(|(_, d)| d).sum();
    let mut t = t.rem_euclid(period);
    for (state, d) in LIGHT_CYCLE_SECS {
        if t < d {
            return state;
        }
        t -= d;
    }
    LightState::Unknown
}

/// Publish the fake object (and no real detections) until shutdown.
pub fn spawn_object_feed(handle: SimHandle, mut generator: FakeObjectGenerator) -> JoinHandle<()> {
    thread::spawn(move || {
        while !handle.is_shutdown() {
            let now = handle.sim_time_secs();
            handle.publish_objects(generator.merge(&[], now), now);
            thread::sleep(PUBLISH_PERIOD);
        }
    })
}

/// Cycle `light` through [`LIGHT_CYCLE_SECS`] on simulated time.
pub fn spawn_light_cycle(handle: SimHandle, light: TrafficLight) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut last = LightState::Unknown;
        while !handle.is_shutdown() {
            let now = handle.sim_time_secs();
            let state = light_phase(now);
            if state != last {
                debug!(light = %light.id, %state, now, "light phase");
                last = state;
            }
            handle.publish_lights(vec![light.with_state(state)], now);
            thread::sleep(PUBLISH_PERIOD);
        }
    })
}

/// Release ticks as fast as `period` allows in step-by-step mode.
pub fn spawn_stepper(handle: SimHandle, period: Duration) -> JoinHandle<()> {
    thread::spawn(move || {
        while !handle.is_shutdown() {
            handle.step();
            thread::sleep(period);
        }
    })
}

/// Shut the loop down once `secs` of simulated time have passed.
pub fn spawn_stop_timer(handle: SimHandle, secs: f64) -> JoinHandle<()> {
    thread::spawn(move || {
        while !handle.is_shutdown() {
            if handle.sim_time_secs() >= secs {
                handle.shutdown();
                break;
            }
            thread::sleep(PUBLISH_PERIOD);
        }
    })
}
