//! Game controller: owns one session and the interval tasks that feed it, and
//! turns frame deltas into updates and task firings.

use rand::Rng;
use rand::rngs::SmallRng;

use super::rules::{RuleError, RuleSet};
use super::schedule::{Scheduler, Task};
use super::{Input, Session};
use crate::storage::HighScoreStore;

/// Longest frame delta fed to the simulation, in seconds. A tab coming back
/// from the background resumes instead of fast-forwarding.
pub const MAX_FRAME_DT: f64 = 0.25;

pub struct Game<S, R = SmallRng> {
    session: Session<S, R>,
    scheduler: Scheduler,
}

impl<S: HighScoreStore, R: Rng> Game<S, R> {
    pub fn new(rules: RuleSet, store: S, rng: R) -> Result<Self, RuleError> {
        let scheduler = Scheduler::new(&rules)?;
        let session = Session::new(rules, store, rng)?;
        Ok(Self { session, scheduler })
    }

    /// Run one frame of `dt` seconds. While paused or after the end nothing
    /// moves and no task fires.
    pub fn advance(&mut self, dt: f64, input: Input) {
        if self.session.is_over() || self.session.is_paused() {
            return;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        self.session.update(dt, input);
        if !self.session.is_over() {
            for task in self.scheduler.advance(dt * 1000.0) {
                self.run(task);
                if self.session.is_over() {
                    break;
                }
            }
        }
        if self.session.is_over() {
            self.scheduler.cancel_all();
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Spawn => {
                self.session.spawn();
            }
            Task::SpeedUp => {
                self.session.speed_up();
            }
            Task::Countdown => self.session.tick(),
        }
    }

    /// Fresh session under the same rules, timers re-armed.
    pub fn restart(&mut self) {
        self.session.reset();
        self.scheduler.rearm();
        log::info!("restarted with rules '{}'", self.session.rules().name);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.session.toggle_pause()
    }
}

impl<S, R> Game<S, R> {
    pub fn session(&self) -> &Session<S, R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<S, R> {
        &mut self.session
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
