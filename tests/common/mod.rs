#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use fixstep::engine::clock::Clock;
use fixstep::engine::core::EngineConfig;
use fixstep::engine::platform::{Canvas, Drawable, InputEvent, Window};
use fixstep::game::{Game, MovementGame};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    pub fn rewind(&self, delta: Duration) {
        self.now.set(self.now.get() - delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// In-memory window. Each input drain consumes one scripted batch of events.
#[derive(Default)]
pub struct ScriptedWindow {
    batches: VecDeque<Vec<InputEvent>>,
    current: Option<VecDeque<InputEvent>>,
    pub closed: bool,
    pub drains: usize,
    pub displays: usize,
    pub drawn: Vec<String>,
}

impl ScriptedWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&mut self, batch: Vec<InputEvent>) {
        self.batches.push_back(batch);
    }
}

impl Canvas for ScriptedWindow {
    fn clear(&mut self) {
        self.drawn.clear();
    }

    fn draw(&mut self, drawable: &Drawable<'_>) {
        let entry = match drawable {
            Drawable::Sprite { texture, position } => {
                format!("sprite {texture} {} {}", position.x, position.y)
            }
            Drawable::Text { content, .. } => format!("text {content}"),
        };
        self.drawn.push(entry);
    }

    fn display(&mut self) {
        self.displays += 1;
    }
}

impl Window for ScriptedWindow {
    fn is_open(&self) -> bool {
        !self.closed
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        let current = self.current.get_or_insert_with(|| {
            self.batches
                .pop_front()
                .map(VecDeque::from)
                .unwrap_or_default()
        });
        let event = current.pop_front();
        if event.is_none() {
            self.current = None;
            self.drains += 1;
        }
        event
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Wraps the movement game and records the order of scheduler callbacks.
pub struct TracingGame {
    pub inner: MovementGame,
    pub calls: Vec<&'static str>,
    pub updates: usize,
}

impl TracingGame {
    pub fn new() -> Self {
        Self {
            inner: MovementGame::new(&EngineConfig::default()),
            calls: Vec::new(),
            updates: 0,
        }
    }
}

impl Game for TracingGame {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn handle_input(&mut self, event: InputEvent) {
        self.calls.push("input");
        self.inner.handle_input(event);
    }

    fn update(&mut self, step: Duration) {
        self.calls.push("update");
        self.updates += 1;
        self.inner.update(step);
    }

    fn report_statistics(&mut self, frame_delta: Duration) {
        self.calls.push("statistics");
        self.inner.report_statistics(frame_delta);
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        self.inner.render(canvas);
    }
}

pub fn fixed_step() -> Duration {
    EngineConfig::default().fixed_step()
}
