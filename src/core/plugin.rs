//! CorePlugin owns the scaled simulation clock and the seeded RNG.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use std::time::Duration;

use super::rng::{SimRng, DEFAULT_SEED};

const DEFAULT_TIME_SCALE: f32 = 1.0;
const MIN_TIME_SCALE: f32 = 0.001;

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Scaled game time. Extraction, regeneration and spawn delays all read from here.
#[derive(Resource, Debug)]
pub struct SimulationClock {
    time_scale: f32,
    last_real_delta: Duration,
    last_scaled_delta: Duration,
    elapsed: Duration,
}

impl SimulationClock {
    pub fn new(time_scale: f32) -> Self {
        Self {
            time_scale: time_scale.max(MIN_TIME_SCALE),
            last_real_delta: Duration::ZERO,
            last_scaled_delta: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    /// Sets the multiplier, clamped to a small positive minimum.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(MIN_TIME_SCALE);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[cfg_attr(not(feature = "core_debug"), allow(dead_code))]
    pub fn last_real_delta(&self) -> Duration {
        self.last_real_delta
    }

    pub fn last_scaled_delta(&self) -> Duration {
        self.last_scaled_delta
    }

    /// Scaled delta of the last frame in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.last_scaled_delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Scaled seconds since the clock started; used as the game timestamp.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Applies a real delta, storing both the real and scaled durations.
    pub fn tick(&mut self, real_delta: Duration) {
        self.last_real_delta = real_delta;
        self.last_scaled_delta = real_delta.mul_f32(self.time_scale);
        self.elapsed += self.last_scaled_delta;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

/// Registers the simulation clock and RNG.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    time_scale: f32,
    seed: u64,
}

impl CorePlugin {
    pub const fn with_time_scale(time_scale: f32) -> Self {
        Self {
            time_scale,
            seed: DEFAULT_SEED,
        }
    }

    /// Seeds the shared RNG. The spawning config may reseed it again on startup.
    #[cfg_attr(not(test), allow(dead_code))]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_time_scale(DEFAULT_TIME_SCALE)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimulationClock::new(self.time_scale))
            .insert_resource(SimRng::from_seed_u64(self.seed))
            .add_systems(Startup, log_startup_time_scale)
            .add_systems(Update, update_simulation_clock);

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_scaled_ticks);
        }
    }
}

/// Advances the simulation clock. Gameplay systems order themselves after this.
pub fn update_simulation_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn log_startup_time_scale(clock: Res<SimulationClock>) {
    info!(
        "CorePlugin initialised with time scale: {:.3}",
        clock.time_scale()
    );
}

#[cfg(feature = "core_debug")]
fn log_scaled_ticks(mut timer: ResMut<DebugTickTimer>, clock: Res<SimulationClock>) {
    if timer.timer.tick(clock.last_scaled_delta()).just_finished() {
        info!(
            target: "core_debug",
            "Sim elapsed: {:.2}s | scale: {:.3} | real dt: {:.4}s | scaled dt: {:.4}s",
            clock.elapsed().as_secs_f32(),
            clock.time_scale(),
            clock.last_real_delta().as_secs_f32(),
            clock.last_scaled_delta().as_secs_f32(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_scales_delta_with_multiplier() {
        let mut clock = SimulationClock::new(4.0);
        clock.tick(Duration::from_millis(500));

        assert_eq!(clock.time_scale(), 4.0);
        assert_eq!(clock.last_real_delta(), Duration::from_millis(500));
        assert_eq!(clock.last_scaled_delta(), Duration::from_secs(2));
        assert!((clock.delta_seconds() - 2.0).abs() < 1e-6);

        clock.tick(Duration::from_millis(250));
        assert!((clock.elapsed_seconds() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn clock_clamps_min_time_scale() {
        let mut clock = SimulationClock::new(0.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);

        clock.set_time_scale(-5.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn plugin_inserts_clock_and_rng() {
        let mut app = App::new();
        app.add_plugins(CorePlugin::with_time_scale(2.0).with_seed(9));

        assert!(app.world().get_resource::<SimRng>().is_some());
        let clock = app.world().resource::<SimulationClock>();
        assert_eq!(clock.time_scale(), 2.0);
    }
}
