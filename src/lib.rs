//! Jewel Match core crate.
//!
//! An 8x8 match-3 board engine (generation, run detection, gravity, refill and
//! cascades) plus the two power items of the timed mode. The engine is plain
//! Rust and runs natively under `cargo test`; the browser build wires it to the
//! page through the DOM glue behind `start_game()`.

use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
mod logging;
mod web;

pub use board::{
    Accepted, Coord, Grid, Item, Jewel, MatchSet, Move, Pending, Presenter, Rejection, Resolver,
    ScorePolicy, Session, Step, detect,
};
pub use config::{GameConfig, Mode};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    logging::init(level);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start (or restart) a game in `"timed"` or `"classic"` mode.
#[wasm_bindgen]
pub fn start_game(mode: &str) -> Result<(), JsValue> {
    let mode = Mode::from_name(mode)
        .ok_or_else(|| JsValue::from_str(&format!("unknown mode '{mode}'")))?;
    web::start(GameConfig::for_mode(mode))
}

/// Start a game from a JSON `GameConfig`, e.g. `{"mode":"classic","seed":7}`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    web::start(config)
}
