use std::time::Duration;

const REPORT_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsReport {
    pub frames: u64,
    pub micros_per_update: u128,
}

impl std::fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frames / Second = {}\nTime / Update = {}us",
            self.frames, self.micros_per_update
        )
    }
}

/// Frame timing summarised once per second of wall time.
#[derive(Debug, Default, Clone)]
pub struct StatisticsAccumulator {
    elapsed: Duration,
    frames: u64,
    report: Option<StatisticsReport>,
    text: String,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one real frame. Returns the new report when a full second has elapsed.
    pub fn record(&mut self, frame_delta: Duration) -> Option<StatisticsReport> {
        self.elapsed += frame_delta;
        self.frames += 1;

        if self.elapsed < REPORT_WINDOW {
            return None;
        }

        let report = StatisticsReport {
            frames: self.frames,
            micros_per_update: self.elapsed.as_micros() / u128::from(self.frames),
        };
        self.text = report.to_string();
        self.report = Some(report);
        // Overshoot carries into the next window.
        self.elapsed -= REPORT_WINDOW;
        self.frames = 0;

        tracing::debug!(
            frames = report.frames,
            micros_per_update = report.micros_per_update as u64,
            "frame statistics"
        );
        Some(report)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_report(&self) -> Option<StatisticsReport> {
        self.report
    }

    /// Text of the last report, empty until the first second has passed.
    pub fn text(&self) -> &str {
        &self.text
    }
}
