//! Catch-the-stars gameplay.
//!
//! A basket slides along the bottom of the field. Stars and dangers fall from
//! above; catching a star scores a point, catching a danger costs one and
//! counts as a hit. The run ends when the clock runs out or the hit limit is
//! reached, and a better score replaces the stored high score.
//!
//! Everything in here is plain Rust with no browser dependency: the clock,
//! input and random source are handed in, which keeps the rules testable on
//! the host. `controller::Game` wires a [`Session`] to its interval tasks.

use rand::Rng;
use rand::rngs::SmallRng;

use crate::storage::{HighScoreStore, load_or_default};

pub mod controller;
pub mod rules;
pub mod schedule;

pub use controller::Game;
pub use rules::{PRESET_NAMES, RuleError, RuleSet, SPAWN_MARGIN};
pub use schedule::{Scheduler, Task};

/// Speeds are given in pixels per frame at this rate and scaled by `dt`.
pub const REFERENCE_FPS: f64 = 60.0;

pub const BASKET_WIDTH: f64 = 100.0;
pub const BASKET_HEIGHT: f64 = 20.0;
pub const BASKET_SPEED: f64 = 7.0;
/// Distance from the bottom edge of the field to the top of the basket.
pub const BASKET_BOTTOM_OFFSET: f64 = 30.0;

/// Collision / draw radius of a falling item.
pub const ITEM_RADIUS: f64 = 10.0;
/// Items appear this far above the visible field.
pub const SPAWN_Y: f64 = -20.0;

/// Directional input for one update. Both set means no movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub left: bool,
    pub right: bool,
}

impl Input {
    pub const NONE: Input = Input {
        left: false,
        right: false,
    };
    pub const LEFT: Input = Input {
        left: true,
        right: false,
    };
    pub const RIGHT: Input = Input {
        left: false,
        right: true,
    };

    /// Combine two sources (keyboard + pointer).
    pub fn merge(self, other: Input) -> Input {
        Input {
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basket {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
}

impl Basket {
    /// Basket centred at the bottom of the field described by `rules`.
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            x: rules.field_width / 2.0 - BASKET_WIDTH / 2.0,
            y: rules.field_height - BASKET_BOTTOM_OFFSET,
            width: BASKET_WIDTH,
            height: BASKET_HEIGHT,
            speed: BASKET_SPEED,
        }
    }

    fn steer(&mut self, input: Input, scale: f64, field_width: f64) {
        let step = self.speed * scale;
        if input.left {
            self.x -= step;
        }
        if input.right {
            self.x += step;
        }
        self.x = self.x.clamp(0.0, field_width - self.width);
    }

    /// Whether an item at column `x` falling from `from_y` to `to_y` touched
    /// the basket. Uses the whole segment so fast items can't skip over it.
    pub fn catches(&self, x: f64, from_y: f64, to_y: f64) -> bool {
        let top = self.y - ITEM_RADIUS;
        let bottom = self.y + self.height + ITEM_RADIUS;
        x >= self.x && x <= self.x + self.width && to_y >= top && from_y <= bottom
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Star,
    Danger,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallingItem {
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
}

impl FallingItem {
    pub fn new(kind: ItemKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }
}

/// Result of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub score: u32,
    pub high_score: u32,
    /// The score beat the previous best and was persisted.
    pub new_record: bool,
}

/// One play-through: basket, items, score, clock and hit count.
pub struct Session<S, R = SmallRng> {
    rules: RuleSet,
    basket: Basket,
    items: Vec<FallingItem>,
    fall_speed: f64,
    speed_ups: u32,
    score: u32,
    high_score: u32,
    remaining: Option<u32>,
    hits: u32,
    paused: bool,
    over: bool,
    new_record: bool,
    store: S,
    rng: R,
}

impl<S: HighScoreStore, R: Rng> Session<S, R> {
    /// Start a session; the best score so far is read from `store`.
    pub fn new(rules: RuleSet, store: S, rng: R) -> Result<Self, RuleError> {
        rules.validate()?;
        let high_score = load_or_default(&store);
        log::info!(
            "session ready: rules '{}', best score {}",
            rules.name,
            high_score
        );
        Ok(Self {
            basket: Basket::new(&rules),
            items: Vec::new(),
            fall_speed: rules.initial_fall_speed,
            speed_ups: 0,
            score: 0,
            high_score,
            remaining: rules.time_limit,
            hits: 0,
            paused: false,
            over: false,
            new_record: false,
            store,
            rng,
            rules,
        })
    }

    /// Advance the world by `dt` seconds: steer the basket, move every item and
    /// resolve catches. Does nothing while paused or after the session ended.
    pub fn update(&mut self, dt: f64, input: Input) {
        if self.paused || self.over || !(dt > 0.0) {
            return;
        }
        let scale = dt * REFERENCE_FPS;
        self.basket.steer(input, scale, self.rules.field_width);

        let basket = self.basket;
        let floor = self.rules.field_height;
        let star_step = self.fall_speed * scale;
        let danger_step = (self.fall_speed + self.rules.danger_speed_bonus) * scale;

        let mut i = 0;
        while i < self.items.len() {
            let item = &mut self.items[i];
            let from_y = item.y;
            item.y += match item.kind {
                ItemKind::Star => star_step,
                ItemKind::Danger => danger_step,
            };
            let caught = basket.catches(item.x, from_y, item.y);
            let fell_out = item.y > floor;
            let kind = item.kind;

            if caught {
                self.items.remove(i);
                match kind {
                    ItemKind::Star => self.score = self.score.saturating_add(1),
                    ItemKind::Danger => {
                        self.score = self.score.saturating_sub(1);
                        self.hits += 1;
                        if self.hits >= self.rules.max_hits {
                            self.end_session();
                            return;
                        }
                    }
                }
            } else if fell_out {
                self.items.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Drop one new item above the field at a random column. Dangers make up
    /// `danger_chance` of spawns when the rules allow them. Nothing spawns
    /// while paused.
    pub fn spawn(&mut self) -> Option<ItemKind> {
        if self.over || self.paused {
            return None;
        }
        let kind = if self.rules.dangers && self.rng.gen_bool(self.rules.danger_chance) {
            ItemKind::Danger
        } else {
            ItemKind::Star
        };
        let x = self
            .rng
            .gen_range(SPAWN_MARGIN..self.rules.field_width - SPAWN_MARGIN);
        self.items.push(FallingItem::new(kind, x, SPAWN_Y));
        Some(kind)
    }

    /// Raise the fall speed one step. Returns false once the cap is reached
    /// or while the session is paused or over.
    pub fn speed_up(&mut self) -> bool {
        if self.over || self.paused {
            return false;
        }
        if let Some(cap) = self.rules.max_speed_ups {
            if self.speed_ups >= cap {
                return false;
            }
        }
        self.fall_speed += self.rules.speed_step;
        self.speed_ups += 1;
        log::debug!(
            "speed up #{}: fall speed {}",
            self.speed_ups,
            self.fall_speed
        );
        true
    }

    /// One second of the countdown. Without a time limit this does nothing.
    pub fn tick(&mut self) {
        if self.over || self.paused {
            return;
        }
        let Some(remaining) = self.remaining else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        self.remaining = Some(remaining);
        if remaining == 0 {
            self.end_session();
        }
    }

    /// Finish the session and persist a new best score. Calling it again is
    /// harmless and returns the same outcome.
    pub fn end_session(&mut self) -> SessionOutcome {
        if !self.over {
            self.over = true;
            self.paused = false;
            if self.score > self.high_score {
                self.high_score = self.score;
                self.new_record = true;
                if let Err(e) = self.store.save(self.score) {
                    log::warn!("could not persist high score {}: {e}", self.score);
                }
            }
            log::info!(
                "session over: score {}, best {}, hits {}{}",
                self.score,
                self.high_score,
                self.hits,
                if self.new_record { " (new record)" } else { "" }
            );
        }
        self.outcome()
    }

    /// Back to the starting state. The best score is kept.
    pub fn reset(&mut self) {
        self.basket = Basket::new(&self.rules);
        self.items.clear();
        self.fall_speed = self.rules.initial_fall_speed;
        self.speed_ups = 0;
        self.score = 0;
        self.hits = 0;
        self.remaining = self.rules.time_limit;
        self.paused = false;
        self.over = false;
        self.new_record = false;
    }
}

impl<S, R> Session<S, R> {
    pub fn set_paused(&mut self, paused: bool) {
        if !self.over {
            self.paused = paused;
        }
    }

    /// Flip the pause flag; returns whether the session is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    /// Place an item directly, bypassing the random spawner.
    pub fn push_item(&mut self, item: FallingItem) {
        self.items.push(item);
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Seconds left, `None` in unlimited-time mode.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn fall_speed(&self) -> f64 {
        self.fall_speed
    }

    pub fn speed_ups(&self) -> u32 {
        self.speed_ups
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            score: self.score,
            high_score: self.high_score,
            new_record: self.new_record,
        }
    }
}
