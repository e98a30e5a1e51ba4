use std::time::Duration;

use fixstep::game::stats::StatisticsAccumulator;

#[test]
fn sixty_frames_totaling_one_second_report_once() {
    let mut stats = StatisticsAccumulator::new();
    // 40 * 16_666_667ns + 20 * 16_666_666ns == 1s exactly.
    let mut reports = Vec::new();
    for i in 0..60 {
        let delta = if i < 40 {
            Duration::from_nanos(16_666_667)
        } else {
            Duration::from_nanos(16_666_666)
        };
        reports.extend(stats.record(delta));
    }

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].frames, 60);
    assert_eq!(reports[0].micros_per_update, 16_666);
    assert_eq!(stats.frames(), 0);
    assert_eq!(stats.elapsed(), Duration::ZERO);
    assert_eq!(
        stats.text(),
        "Frames / Second = 60\nTime / Update = 16666us"
    );
}

#[test]
fn long_frame_keeps_overshoot() {
    let mut stats = StatisticsAccumulator::new();

    let report = stats.record(Duration::from_millis(1200)).unwrap();
    assert_eq!(report.frames, 1);
    assert_eq!(report.micros_per_update, 1_200_000);
    assert_eq!(stats.elapsed(), Duration::from_millis(200));
    assert_eq!(stats.frames(), 0);

    assert_eq!(stats.record(Duration::from_millis(700)), None);
    assert_eq!(stats.record(Duration::from_millis(99)), None);
    assert_eq!(stats.last_report(), Some(report));

    let next = stats.record(Duration::from_millis(1)).unwrap();
    assert_eq!(next.frames, 3);
    assert_eq!(next.micros_per_update, 333_333);
    assert_eq!(stats.elapsed(), Duration::ZERO);
}

#[test]
fn huge_frame_drains_one_window_per_report() {
    let mut stats = StatisticsAccumulator::new();

    stats.record(Duration::from_millis(3500)).unwrap();
    assert_eq!(stats.elapsed(), Duration::from_millis(2500));

    // Still over a second, so the very next frame reports again.
    let report = stats.record(Duration::ZERO).unwrap();
    assert_eq!(report.frames, 1);
    assert_eq!(report.micros_per_update, 2_500_000);
    assert_eq!(stats.elapsed(), Duration::from_millis(1500));
}
