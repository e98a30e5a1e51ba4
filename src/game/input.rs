//! Keyboard events folded into held movement directions.

use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Which directions are currently held. Any combination is valid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// Fixed table from physical key to movement direction.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    table: [(KeyCode, Direction); 4],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            table: [
                (KeyCode::KeyW, Direction::Up),
                (KeyCode::KeyS, Direction::Down),
                (KeyCode::KeyA, Direction::Left),
                (KeyCode::KeyD, Direction::Right),
            ],
        }
    }
}

impl KeyBindings {
    pub fn direction(&self, key: KeyCode) -> Option<Direction> {
        self.table
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, direction)| *direction)
    }

    /// Applies a key transition. Returns false when the key is unbound.
    pub fn apply(&self, input: &mut InputState, key: KeyCode, pressed: bool) -> bool {
        match self.direction(key) {
            Some(direction) => {
                input.set(direction, pressed);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_maps_to_directions() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.direction(KeyCode::KeyW), Some(Direction::Up));
        assert_eq!(bindings.direction(KeyCode::KeyS), Some(Direction::Down));
        assert_eq!(bindings.direction(KeyCode::KeyA), Some(Direction::Left));
        assert_eq!(bindings.direction(KeyCode::KeyD), Some(Direction::Right));
    }

    #[test]
    fn press_and_release_toggle_flag() {
        let bindings = KeyBindings::default();
        let mut input = InputState::default();

        assert!(bindings.apply(&mut input, KeyCode::KeyD, true));
        assert!(input.right);
        assert!(bindings.apply(&mut input, KeyCode::KeyD, false));
        assert!(!input.right);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let bindings = KeyBindings::default();
        let mut input = InputState::default();
        input.up = true;

        assert!(!bindings.apply(&mut input, KeyCode::ArrowUp, false));
        assert!(!bindings.apply(&mut input, KeyCode::Space, true));
        assert_eq!(
            input,
            InputState {
                up: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn opposing_directions_can_be_held_together() {
        let bindings = KeyBindings::default();
        let mut input = InputState::default();
        bindings.apply(&mut input, KeyCode::KeyW, true);
        bindings.apply(&mut input, KeyCode::KeyS, true);
        bindings.apply(&mut input, KeyCode::KeyA, true);

        assert!(input.is_held(Direction::Up));
        assert!(input.is_held(Direction::Down));
        assert!(input.is_held(Direction::Left));
        assert!(!input.is_held(Direction::Right));
    }
}
