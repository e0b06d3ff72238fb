//! Star Catcher core crate.
//!
//! Catch falling stars in a basket, dodge the dangers, beat the clock. The
//! rules live in [`game`] as plain Rust and run under `cargo test` on the
//! host; the browser side (canvas, input, localStorage, animation loop) is a
//! thin layer on top, started from JS through the exports below.

use wasm_bindgen::prelude::*;

mod app;
pub mod game;
mod render;
pub mod storage;

pub use game::{
    FallingItem, Game, Input, ItemKind, PRESET_NAMES, RuleError, RuleSet, Session,
    SessionOutcome,
};
pub use storage::{HighScoreStore, LocalStore, MemoryStore, StorageError};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Err only if a logger is already installed, which is fine
    let _ = console_log::init_with_level(log::Level::Info);
}

// -----------------------------------------------------------------------------
// Lifecycle entrypoints
// -----------------------------------------------------------------------------

/// Start with the default (hazard) rules. Calling again replaces the running
/// game.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    app::start(RuleSet::default())
}

/// Start one of the named presets: "classic", "hazard", "capped", "endless".
#[wasm_bindgen]
pub fn start_game_variant(name: &str) -> Result<(), JsValue> {
    let rules = RuleSet::preset(name).ok_or_else(|| {
        JsValue::from_str(&format!(
            "unknown variant '{name}', expected one of {}",
            PRESET_NAMES.join(", ")
        ))
    })?;
    app::start(rules)
}

/// Start with rules given as JSON; omitted fields take the hazard defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_rules(json: &str) -> Result<(), JsValue> {
    let rules = RuleSet::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    app::start(rules)
}

/// Pause / resume. Returns whether the game is now paused.
#[wasm_bindgen]
pub fn toggle_pause() -> Result<bool, JsValue> {
    app::toggle_pause()
}

#[wasm_bindgen]
pub fn restart_game() -> Result<(), JsValue> {
    app::restart()
}

/// Best score saved in this browser, 0 if none.
#[wasm_bindgen]
pub fn stored_high_score() -> u32 {
    storage::load_or_default(&LocalStore::default())
}
