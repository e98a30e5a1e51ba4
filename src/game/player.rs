use std::time::Duration;

use glam::Vec2;

use super::input::InputState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub position: Vec2,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }

    /// Moves by one fixed step of the velocity `input` implies.
    pub fn tick(&mut self, input: &InputState, speed: f32, step: Duration) {
        self.position += velocity(input, speed) * step.as_secs_f32();
    }
}

/// Screen-space velocity; y grows downwards.
pub fn velocity(input: &InputState, speed: f32) -> Vec2 {
    let mut movement = Vec2::ZERO;
    if input.up {
        movement.y -= speed;
    }
    if input.down {
        movement.y += speed;
    }
    if input.left {
        movement.x -= speed;
    }
    if input.right {
        movement.x += speed;
    }
    movement
}
