use std::fmt;
use std::time::{Duration, Instant};

/// Steps of a tick, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sample,
    Pack,
    Send,
    Preview,
}

impl Stage {
    const ALL: [Stage; 4] = [Stage::Sample, Stage::Pack, Stage::Send, Stage::Preview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Sample => "sample",
            Stage::Pack => "pack",
            Stage::Send => "send",
            Stage::Preview => "preview",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-stage durations of one tick. Fixed size, so collecting it costs no
/// allocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickTimings {
    stages: [Option<Duration>; 4],
}

impl TickTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, (stage, duration): (Stage, Duration)) {
        *self.stages[stage.index()].get_or_insert(Duration::ZERO) += duration;
    }

    pub fn get(&self, stage: Stage) -> Option<Duration> {
        self.stages[stage.index()]
    }

    pub fn total(&self) -> Duration {
        self.stages.iter().flatten().sum()
    }
}

impl fmt::Display for TickTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in Stage::ALL {
            if let Some(duration) = self.get(stage) {
                write!(f, "{}={:.3}ms ", stage.as_str(), duration.as_secs_f64() * 1000.0)?;
            }
        }
        write!(f, "total={:.3}ms", self.total().as_secs_f64() * 1000.0)
    }
}

pub struct StageTimer {
    start: Instant,
    stage: Stage,
}

impl StageTimer {
    pub fn start(stage: Stage) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    pub fn stop(self) -> (Stage, Duration) {
        (self.stage, self.start.elapsed())
    }
}
