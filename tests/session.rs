// Native integration tests for session rules. These exercise pure Rust logic
// with a seeded random source and an in-memory high score store.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use star_catcher::game::REFERENCE_FPS;
use star_catcher::{
    FallingItem, HighScoreStore, Input, ItemKind, MemoryStore, RuleSet, Session, StorageError,
};

const FRAME: f64 = 1.0 / REFERENCE_FPS;

fn session_with(rules: RuleSet, store: MemoryStore) -> Session<MemoryStore, StdRng> {
    Session::new(rules, store, StdRng::seed_from_u64(42)).unwrap()
}

fn session(rules: RuleSet) -> Session<MemoryStore, StdRng> {
    session_with(rules, MemoryStore::default())
}

/// Drop an item right onto the basket so the next update catches it.
fn drop_on_basket<S, R>(s: &mut Session<S, R>, kind: ItemKind) {
    let b = *s.basket();
    s.push_item(FallingItem::new(kind, b.x + b.width / 2.0, b.y));
}

#[test]
fn basket_stays_inside_the_field() {
    let mut s = session(RuleSet::hazard());
    let mut inputs = StdRng::seed_from_u64(7);
    let max_x = s.rules().field_width - s.basket().width;
    for _ in 0..3_000 {
        let input = Input {
            left: inputs.gen_bool(0.5),
            right: inputs.gen_bool(0.3),
        };
        s.update(FRAME, input);
        let x = s.basket().x;
        assert!((0.0..=max_x).contains(&x), "basket x {x} out of bounds");
    }
    // pinned against the right wall
    for _ in 0..200 {
        s.update(FRAME, Input::RIGHT);
    }
    assert_eq!(s.basket().x, max_x);
}

#[test]
fn caught_star_scores_exactly_one() {
    let mut s = session(RuleSet::classic());
    drop_on_basket(&mut s, ItemKind::Star);
    s.update(FRAME, Input::NONE);
    assert_eq!(s.score(), 1);
    assert!(s.items().is_empty());
}

#[test]
fn missed_star_leaves_through_the_bottom() {
    let mut s = session(RuleSet::classic());
    s.push_item(FallingItem::new(ItemKind::Star, 12.0, 595.0));
    s.update(FRAME, Input::NONE);
    s.update(FRAME, Input::NONE);
    assert_eq!(s.items().len(), 1);
    s.update(FRAME, Input::NONE);
    assert!(s.items().is_empty());
    assert_eq!(s.score(), 0);
}

#[test]
fn dangers_fall_faster_than_stars() {
    let mut s = session(RuleSet::hazard());
    s.push_item(FallingItem::new(ItemKind::Star, 20.0, 0.0));
    s.push_item(FallingItem::new(ItemKind::Danger, 40.0, 0.0));
    s.update(FRAME, Input::NONE);
    let star = s.items()[0].y;
    let danger = s.items()[1].y;
    assert!((star - 2.0).abs() < 1e-9);
    assert!((danger - 3.0).abs() < 1e-9);
}

#[test]
fn danger_example_from_five_to_four() {
    let mut s = session(RuleSet::hazard());
    // slide the basket from 350 to 300 in one step
    s.update(50.0 / s.basket().speed / REFERENCE_FPS, Input::LEFT);
    assert!((s.basket().x - 300.0).abs() < 1e-9);

    let y = s.basket().y;
    for _ in 0..5 {
        s.push_item(FallingItem::new(ItemKind::Star, 320.0, y));
    }
    s.update(FRAME, Input::NONE);
    assert_eq!(s.score(), 5);

    s.push_item(FallingItem::new(ItemKind::Danger, 320.0, y));
    s.update(FRAME, Input::NONE);
    assert_eq!(s.score(), 4);
    assert_eq!(s.hits(), 1);
    assert!(s.items().is_empty());
}

#[test]
fn score_never_goes_negative() {
    let mut rules = RuleSet::hazard();
    rules.max_hits = 100;
    let mut s = session(rules);
    drop_on_basket(&mut s, ItemKind::Star);
    s.update(FRAME, Input::NONE);
    for _ in 0..20 {
        drop_on_basket(&mut s, ItemKind::Danger);
        s.update(FRAME, Input::NONE);
    }
    assert_eq!(s.score(), 0);
    assert_eq!(s.hits(), 20);
    assert!(!s.is_over());
}

#[test]
fn fifth_hit_ends_the_session() {
    let mut s = session(RuleSet::hazard());
    for expected in 1..=4 {
        drop_on_basket(&mut s, ItemKind::Danger);
        s.update(FRAME, Input::NONE);
        assert_eq!(s.hits(), expected);
        assert!(!s.is_over());
    }
    drop_on_basket(&mut s, ItemKind::Danger);
    s.update(FRAME, Input::NONE);
    assert_eq!(s.hits(), 5);
    assert!(s.is_over());
}

#[test]
fn hit_count_never_exceeds_the_limit_in_one_frame() {
    let mut s = session(RuleSet::hazard());
    for _ in 0..8 {
        drop_on_basket(&mut s, ItemKind::Danger);
    }
    s.update(FRAME, Input::NONE);
    assert_eq!(s.hits(), 5);
    assert!(s.is_over());
    // the rest were never resolved
    assert_eq!(s.items().len(), 3);
}

#[test]
fn sixty_ticks_end_the_clock() {
    let mut s = session(RuleSet::classic());
    for _ in 0..59 {
        s.tick();
    }
    assert_eq!(s.remaining(), Some(1));
    assert!(!s.is_over());
    s.tick();
    assert_eq!(s.remaining(), Some(0));
    assert!(s.is_over());
    s.tick();
    assert_eq!(s.remaining(), Some(0));
}

#[test]
fn unlimited_clock_never_ends_the_session() {
    let mut s = session(RuleSet::endless());
    for _ in 0..1_000 {
        s.tick();
    }
    assert_eq!(s.remaining(), None);
    assert!(!s.is_over());
}

#[test]
fn ending_twice_is_counted_once() {
    let mut s = session(RuleSet::hazard());
    drop_on_basket(&mut s, ItemKind::Star);
    s.update(FRAME, Input::NONE);
    let first = s.end_session();
    // clock and hit limit arriving after the end change nothing
    for _ in 0..60 {
        s.tick();
    }
    drop_on_basket(&mut s, ItemKind::Danger);
    s.update(FRAME, Input::NONE);
    let second = s.end_session();
    assert_eq!(first, second);
    assert_eq!(s.store().writes(), 1);
    assert_eq!(s.hits(), 0);
}

#[test]
fn high_score_needs_a_strictly_better_score() {
    let mut s = session_with(RuleSet::classic(), MemoryStore::with_score(3));
    assert_eq!(s.high_score(), 3);
    for _ in 0..3 {
        drop_on_basket(&mut s, ItemKind::Star);
        s.update(FRAME, Input::NONE);
    }
    let outcome = s.end_session();
    assert!(!outcome.new_record);
    assert_eq!(s.store().writes(), 0);

    s.reset();
    for _ in 0..4 {
        drop_on_basket(&mut s, ItemKind::Star);
        s.update(FRAME, Input::NONE);
    }
    let outcome = s.end_session();
    assert!(outcome.new_record);
    assert_eq!(outcome.high_score, 4);
    assert_eq!(s.store().load(), Ok(Some(4)));
}

#[test]
fn malformed_stored_score_counts_as_zero() {
    let s = session_with(RuleSet::classic(), MemoryStore::with_raw("lots"));
    assert_eq!(s.high_score(), 0);
}

struct BrokenStore;

impl HighScoreStore for BrokenStore {
    fn load(&self) -> Result<Option<u32>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn save(&mut self, _score: u32) -> Result<(), StorageError> {
        Err(StorageError::Write("quota exceeded".to_string()))
    }
}

#[test]
fn failed_write_keeps_the_in_memory_record() {
    let mut s = Session::new(RuleSet::classic(), BrokenStore, StdRng::seed_from_u64(1)).unwrap();
    drop_on_basket(&mut s, ItemKind::Star);
    s.update(FRAME, Input::NONE);
    let outcome = s.end_session();
    assert!(outcome.new_record);
    assert_eq!(s.high_score(), 1);
}

#[test]
fn spawn_mix_follows_danger_chance() {
    let mut s = session(RuleSet::hazard());
    let n = 4_000;
    let dangers = (0..n)
        .filter(|_| s.spawn() == Some(ItemKind::Danger))
        .count();
    let ratio = dangers as f64 / n as f64;
    assert!((0.22..0.28).contains(&ratio), "danger ratio {ratio}");
    for item in s.items() {
        assert!(item.x >= 10.0 && item.x < 790.0);
        assert_eq!(item.y, -20.0);
    }
}

#[test]
fn classic_spawns_only_stars() {
    let mut s = session(RuleSet::classic());
    for _ in 0..500 {
        assert_eq!(s.spawn(), Some(ItemKind::Star));
    }
}

#[test]
fn nothing_spawns_after_the_end() {
    let mut s = session(RuleSet::hazard());
    s.end_session();
    assert_eq!(s.spawn(), None);
    assert!(!s.speed_up());
    assert!(s.items().is_empty());
}

#[test]
fn speed_ups_stop_at_the_cap() {
    let mut s = session(RuleSet::capped());
    let applied = (0..10).filter(|_| s.speed_up()).count();
    assert_eq!(applied, 5);
    assert_eq!(s.speed_ups(), 5);
    assert_eq!(s.fall_speed(), 7.0);

    let mut uncapped = session(RuleSet::hazard());
    assert_eq!((0..10).filter(|_| uncapped.speed_up()).count(), 10);
    assert_eq!(uncapped.fall_speed(), 12.0);
}

#[test]
fn reset_restores_start_values_but_keeps_the_best() {
    let mut s = session(RuleSet::hazard());
    for _ in 0..3 {
        drop_on_basket(&mut s, ItemKind::Star);
        s.update(FRAME, Input::NONE);
    }
    s.speed_up();
    s.spawn();
    s.tick();
    s.end_session();
    assert_eq!(s.high_score(), 3);

    s.reset();
    assert_eq!(s.score(), 0);
    assert_eq!(s.hits(), 0);
    assert_eq!(s.remaining(), Some(60));
    assert_eq!(s.fall_speed(), 2.0);
    assert!(s.items().is_empty());
    assert!(!s.is_over());
    assert!(!s.is_new_record());
    assert_eq!(s.high_score(), 3);
}

#[test]
fn pausing_an_ended_session_is_ignored() {
    let mut s = session(RuleSet::hazard());
    s.end_session();
    assert!(!s.toggle_pause());
    assert!(!s.is_paused());
}
