use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct StepTiming {
    pub name: &'static str,
    pub total: Duration,
    pub count: u64,
}

/// Counters and per-step timings collected by one worker loop.
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    ticks: u64,
    completed: u64,
    failures: u64,
    steps: Vec<StepTiming>,
}

impl LoopStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    pub fn record_completed(&mut self) {
        self.completed += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn add_step(&mut self, name: &'static str, duration: Duration) {
        match self.steps.iter_mut().find(|step| step.name == name) {
            Some(step) => {
                step.total += duration;
                step.count += 1;
            }
            None => self.steps.push(StepTiming {
                name,
                total: duration,
                count: 1,
            }),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Iterations that produced output: published colors or actuator writes.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn step(&self, name: &str) -> Option<&StepTiming> {
        self.steps.iter().find(|step| step.name == name)
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.total).sum()
    }

    pub fn log_summary(&self, worker: &str) {
        info!(
            worker,
            ticks = self.ticks,
            completed = self.completed,
            failures = self.failures,
            "Worker loop finished"
        );
        for step in &self.steps {
            let average_ms = if step.count > 0 {
                step.total.as_secs_f64() * 1000.0 / step.count as f64
            } else {
                0.0
            };
            info!(
                worker,
                step = step.name,
                count = step.count,
                "{:>10.3}ms total, {:.3}ms average",
                step.total.as_secs_f64() * 1000.0,
                average_ms
            );
        }
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
