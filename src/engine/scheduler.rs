//! Fixed-timestep frame loop.
//!
//! Real elapsed time is banked each frame and spent in constant-size simulation
//! steps. Catch-up is unbounded: after a stall every owed step runs before the
//! next render.

use std::time::{Duration, Instant};

use super::clock::Clock;
use super::core::{FixedTimestep, FrameTiming};
use super::platform::{InputEvent, Window};
use crate::game::Game;

pub struct FixedStepScheduler<W, C> {
    window: W,
    clock: C,
    timestep: FixedTimestep,
    last_sample: Instant,
}

impl<W: Window, C: Clock> FixedStepScheduler<W, C> {
    pub fn new(window: W, clock: C, step: Duration) -> Self {
        let last_sample = clock.now();
        Self {
            window,
            clock,
            timestep: FixedTimestep::new(step),
            last_sample,
        }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn step(&self) -> Duration {
        self.timestep.step()
    }

    /// Real time not yet consumed by a fixed step.
    pub fn leftover(&self) -> Duration {
        self.timestep.accumulated()
    }

    /// Runs frames until the window closes. Returns the number of frames rendered.
    pub fn run<G: Game + ?Sized>(&mut self, game: &mut G) -> u64 {
        let mut frames = 0u64;
        while self.window.is_open() {
            self.frame(game);
            frames += 1;
        }
        frames
    }

    /// One real frame: drain owed steps, then report statistics and render once.
    pub fn frame<G: Game + ?Sized>(&mut self, game: &mut G) -> FrameTiming {
        let delta = self.sample_delta();
        self.timestep.accumulate(delta);

        let step = self.timestep.step();
        let mut ticks = 0u32;
        while self.timestep.should_step() {
            self.poll_input(game);
            game.update(step);
            ticks += 1;
        }

        game.report_statistics(delta);
        game.render(&mut self.window);

        tracing::trace!(
            target: "engine",
            frame_delta_us = delta.as_micros() as u64,
            ticks,
            "frame"
        );
        FrameTiming { delta, ticks }
    }

    /// Drains every pending window event into the game.
    pub fn poll_input<G: Game + ?Sized>(&mut self, game: &mut G) {
        while let Some(event) = self.window.poll_event() {
            match event {
                InputEvent::Closed => self.window.close(),
                other => game.handle_input(other),
            }
        }
    }

    fn sample_delta(&mut self) -> Duration {
        let now = self.clock.now();
        let delta = now.saturating_duration_since(self.last_sample);
        if now > self.last_sample {
            self.last_sample = now;
        }
        delta
    }
}
