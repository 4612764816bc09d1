use super::grid::{Coord, Grid};
use super::items::ItemBelt;
use super::matches::MatchSet;

/// Whether a presenter finished a request before returning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pending {
    Done,
    /// Still running; the host resumes the session later
    /// (`Session::animation_ended` per cell, or `Session::pump` after a pause).
    Deferred,
}

/// Everything the board engine needs from the page (or a test double).
///
/// The engine only reads through this trait; it never learns how cells are
/// drawn or how long an animation takes.
pub trait Presenter {
    fn render(&mut self, grid: &Grid);

    /// Play the clear animation on `cells`.
    fn animate(&mut self, cells: &MatchSet) -> Pending;

    /// Fixed pacing delay between stages.
    fn pause(&mut self, _ms: u32) -> Pending {
        Pending::Done
    }

    fn show_score(&mut self, score: u32);

    /// Timed mode only.
    fn show_time(&mut self, _seconds: u32) {}

    fn show_selection(&mut self, _selected: Option<Coord>) {}

    fn show_items(&mut self, _items: &ItemBelt) {}

    fn show_game_over(&mut self, final_score: u32);
}

/// Draws nothing and finishes every animation immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Presenter for Headless {
    fn render(&mut self, _grid: &Grid) {}

    fn animate(&mut self, _cells: &MatchSet) -> Pending {
        Pending::Done
    }

    fn show_score(&mut self, _score: u32) {}

    fn show_game_over(&mut self, _final_score: u32) {}
}
