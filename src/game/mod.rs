pub mod input;
pub mod player;
pub mod stats;

use std::time::Duration;

use glam::Vec2;

use crate::engine::core::EngineConfig;
use crate::engine::platform::{Canvas, Drawable, InputEvent};
use input::{InputState, KeyBindings};
use player::Player;
use stats::StatisticsAccumulator;

pub const PLAYER_TEXTURE: &str = "player";
pub const STATS_FONT: &str = "statistics";

/// Simulation driven by the fixed-step scheduler.
pub trait Game {
    fn name(&self) -> &str;
    fn handle_input(&mut self, event: InputEvent);
    fn update(&mut self, step: Duration);
    fn report_statistics(&mut self, frame_delta: Duration);
    fn render(&self, canvas: &mut dyn Canvas);
}

/// One sprite steered with WASD, plus a frame statistics overlay.
#[derive(Debug, Clone)]
pub struct MovementGame {
    pub input: InputState,
    pub player: Player,
    pub stats: StatisticsAccumulator,
    bindings: KeyBindings,
    speed: f32,
    stats_position: Vec2,
    stats_char_size: u32,
}

impl MovementGame {
    pub fn new(config: &EngineConfig) -> Self {
        let (x, y) = config.player_start;
        let (stats_x, stats_y) = config.stats_position;
        Self {
            input: InputState::default(),
            player: Player::new(Vec2::new(x, y)),
            stats: StatisticsAccumulator::new(),
            bindings: KeyBindings::default(),
            speed: config.player_speed,
            stats_position: Vec2::new(stats_x, stats_y),
            stats_char_size: config.stats_char_size,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

impl Game for MovementGame {
    fn name(&self) -> &str {
        "Movement"
    }

    fn handle_input(&mut self, event: InputEvent) {
        let (key, pressed) = match event {
            InputEvent::KeyPressed(key) => (key, true),
            InputEvent::KeyReleased(key) => (key, false),
            InputEvent::Closed => return,
        };
        if self.bindings.apply(&mut self.input, key, pressed) {
            tracing::trace!(?key, pressed, input = ?self.input, "movement input");
        }
    }

    fn update(&mut self, step: Duration) {
        self.player.tick(&self.input, self.speed, step);
    }

    fn report_statistics(&mut self, frame_delta: Duration) {
        self.stats.record(frame_delta);
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        canvas.clear();
        canvas.draw(&Drawable::Sprite {
            texture: PLAYER_TEXTURE,
            position: self.player.position,
        });
        canvas.draw(&Drawable::Text {
            font: STATS_FONT,
            content: self.stats.text(),
            position: self.stats_position,
            size: self.stats_char_size,
        });
        canvas.display();
    }
}
