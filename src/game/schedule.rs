//! Fixed-interval tasks driven from frame deltas instead of browser timers, so
//! they share the frame loop's clock, freeze with it, and can be cancelled and
//! re-armed as one group.

use super::rules::{RuleError, RuleSet};

/// Countdown period; the clock always runs in whole seconds.
pub const COUNTDOWN_INTERVAL_MS: f64 = 1_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Spawn,
    SpeedUp,
    Countdown,
}

/// One repeating task and how far it is into its current period.
#[derive(Clone, Copy, Debug)]
struct Interval {
    task: Task,
    period_ms: f64,
    phase_ms: f64,
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    intervals: Vec<Interval>,
    armed: bool,
}

impl Scheduler {
    /// Builds an armed scheduler for `rules`. The countdown only exists when
    /// the rules put a limit on the clock. Rules with non-positive periods are
    /// rejected.
    pub fn new(rules: &RuleSet) -> Result<Self, RuleError> {
        rules.validate()?;
        let mut intervals = vec![
            Interval {
                task: Task::Spawn,
                period_ms: rules.spawn_interval_ms,
                phase_ms: 0.0,
            },
            Interval {
                task: Task::SpeedUp,
                period_ms: rules.speed_up_interval_ms,
                phase_ms: 0.0,
            },
        ];
        if rules.time_limit.is_some() {
            intervals.push(Interval {
                task: Task::Countdown,
                period_ms: COUNTDOWN_INTERVAL_MS,
                phase_ms: 0.0,
            });
        }
        Ok(Self {
            intervals,
            armed: true,
        })
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn has_task(&self, task: Task) -> bool {
        self.intervals.iter().any(|i| i.task == task)
    }

    /// Advance the clock by `dt_ms` and return every task that came due, in
    /// the order they fired. A long delta may fire the same task repeatedly.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<Task> {
        if !self.armed || !(dt_ms > 0.0) || !dt_ms.is_finite() {
            return Vec::new();
        }
        let mut due: Vec<(f64, Task)> = Vec::new();
        for interval in &mut self.intervals {
            // a period that never advances would fire forever
            if !(interval.period_ms > 0.0) || !interval.period_ms.is_finite() {
                continue;
            }
            // time (within this delta) at which the next firing happens
            let mut fire_at = interval.period_ms - interval.phase_ms;
            while fire_at <= dt_ms {
                due.push((fire_at, interval.task));
                fire_at += interval.period_ms;
            }
            interval.phase_ms = interval.period_ms - (fire_at - dt_ms);
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, task)| task).collect()
    }

    /// Stop every task; `advance` returns nothing until [`Scheduler::rearm`].
    pub fn cancel_all(&mut self) {
        self.armed = false;
    }

    /// Restart every task from the beginning of its period.
    pub fn rearm(&mut self) {
        for interval in &mut self.intervals {
            interval.phase_ms = 0.0;
        }
        self.armed = true;
    }
}
