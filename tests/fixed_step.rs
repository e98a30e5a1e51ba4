mod common;

use std::time::Duration;

use common::{ManualClock, ScriptedWindow, TracingGame, fixed_step};
use fixstep::engine::platform::InputEvent;
use fixstep::engine::scheduler::FixedStepScheduler;
use winit::keyboard::KeyCode;

#[test]
fn updates_match_whole_steps_and_render_once_per_frame() {
    let clock = ManualClock::new();
    let step = fixed_step();
    let mut scheduler = FixedStepScheduler::new(ScriptedWindow::new(), &clock, step);
    let mut game = TracingGame::new();

    // 7 steps of real time split unevenly over four frames.
    let deltas = [step * 2, step / 2, step * 3 + step / 2, step];
    let mut ticks = 0;
    for delta in deltas {
        clock.advance(delta);
        ticks += scheduler.frame(&mut game).ticks;
    }

    assert_eq!(ticks, 7);
    assert_eq!(game.updates, 7);
    assert_eq!(scheduler.window().displays, deltas.len());
    assert_eq!(scheduler.leftover(), Duration::ZERO);
}

#[test]
fn stalled_frame_catches_up_with_single_render() {
    let clock = ManualClock::new();
    let step = fixed_step();
    let mut scheduler = FixedStepScheduler::new(ScriptedWindow::new(), &clock, step);
    let mut game = TracingGame::new();

    clock.advance(step * 45);
    let timing = scheduler.frame(&mut game);

    assert_eq!(timing.ticks, 45);
    assert_eq!(timing.delta, step * 45);
    assert_eq!(scheduler.window().displays, 1);
    // One input drain per tick.
    assert_eq!(scheduler.window().drains, 45);
}

#[test]
fn short_frame_renders_without_ticking() {
    let clock = ManualClock::new();
    let step = fixed_step();
    let mut scheduler = FixedStepScheduler::new(ScriptedWindow::new(), &clock, step);
    let mut game = TracingGame::new();

    clock.advance(step / 3);
    let timing = scheduler.frame(&mut game);

    assert_eq!(timing.ticks, 0);
    assert_eq!(scheduler.window().displays, 1);
    assert_eq!(scheduler.window().drains, 0);
    assert_eq!(scheduler.leftover(), step / 3);
    assert_eq!(game.calls, ["statistics"]);
}

#[test]
fn input_is_polled_before_each_update() {
    let clock = ManualClock::new();
    let step = fixed_step();
    let mut window = ScriptedWindow::new();
    window.script(vec![InputEvent::KeyPressed(KeyCode::KeyW)]);
    window.script(vec![]);
    window.script(vec![InputEvent::KeyReleased(KeyCode::KeyW)]);
    let mut scheduler = FixedStepScheduler::new(window, &clock, step);
    let mut game = TracingGame::new();

    clock.advance(step * 3);
    scheduler.frame(&mut game);

    assert_eq!(
        game.calls,
        ["input", "update", "update", "input", "update", "statistics"]
    );
    assert!(!game.inner.input.up);
}

#[test]
fn polling_without_events_keeps_input() {
    let clock = ManualClock::new();
    let mut scheduler = FixedStepScheduler::new(ScriptedWindow::new(), &clock, fixed_step());
    let mut game = TracingGame::new();
    game.inner.input.left = true;
    let before = game.inner.input;

    scheduler.poll_input(&mut game);
    scheduler.poll_input(&mut game);

    assert_eq!(game.inner.input, before);
    assert!(game.calls.is_empty());
}

#[test]
fn unmapped_keys_change_nothing() {
    let clock = ManualClock::new();
    let mut window = ScriptedWindow::new();
    window.script(vec![
        InputEvent::KeyPressed(KeyCode::Space),
        InputEvent::KeyPressed(KeyCode::ArrowUp),
    ]);
    let mut scheduler = FixedStepScheduler::new(window, &clock, fixed_step());
    let mut game = TracingGame::new();
    let before = game.inner.input;

    scheduler.poll_input(&mut game);

    assert_eq!(game.inner.input, before);
}

#[test]
fn close_finishes_current_frame_before_exit() {
    let clock = ManualClock::new();
    let step = fixed_step();
    let mut window = ScriptedWindow::new();
    window.script(vec![]);
    window.script(vec![InputEvent::Closed]);
    window.script(vec![]);
    let mut scheduler = FixedStepScheduler::new(window, &clock, step);
    let mut game = TracingGame::new();

    clock.advance(step * 3);
    let frames = scheduler.run(&mut game);

    assert_eq!(frames, 1);
    assert_eq!(game.updates, 3);
    assert_eq!(scheduler.window().displays, 1);
    assert!(scheduler.window().closed);
}

#[test]
fn clock_regression_is_a_zero_delta() {
    let clock = ManualClock::new();
    let step = fixed_step();
    let mut scheduler = FixedStepScheduler::new(ScriptedWindow::new(), &clock, step);
    let mut game = TracingGame::new();

    clock.advance(step / 2);
    scheduler.frame(&mut game);

    clock.rewind(step * 10);
    let timing = scheduler.frame(&mut game);
    assert_eq!(timing.delta, Duration::ZERO);
    assert_eq!(timing.ticks, 0);
    assert_eq!(scheduler.window().displays, 2);

    // Time lost to the regression is not counted twice once the clock recovers.
    clock.advance(step * 10);
    let timing = scheduler.frame(&mut game);
    assert_eq!(timing.delta, Duration::ZERO);

    clock.advance(step / 2);
    let timing = scheduler.frame(&mut game);
    assert_eq!(timing.ticks, 1);
}

#[test]
fn render_shows_latest_state() {
    let clock = ManualClock::new();
    let step = fixed_step();
    let mut window = ScriptedWindow::new();
    window.script(vec![InputEvent::KeyPressed(KeyCode::KeyD)]);
    let mut scheduler = FixedStepScheduler::new(window, &clock, step);
    let mut game = TracingGame::new();

    clock.advance(step);
    scheduler.frame(&mut game);

    let x = game.inner.player.position.x;
    assert!(x > 100.0);
    assert_eq!(
        scheduler.window().drawn,
        [format!("sprite player {x} 100"), "text ".to_string()]
    );
}
