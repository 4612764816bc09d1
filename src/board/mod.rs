//! Match-3 board engine.
//!
//! Leaves first: [`grid`] stores jewels, [`matches`] finds runs, [`scoring`]
//! prices them, [`resolver`] walks a move through swap / detect / clear /
//! gravity / refill until the board is stable, [`items`] adds the one-shot
//! power moves, and [`session`] is the gate every player input goes through.
//! Drawing is left to a [`Presenter`].

use std::fmt;

pub mod grid;
pub mod items;
pub mod matches;
pub mod presenter;
pub mod resolver;
pub mod scoring;
pub mod session;
pub mod timer;

pub use grid::{COLS, Coord, Grid, Jewel, ParseGridError, ROWS};
pub use items::{Item, ItemBelt};
pub use matches::{MatchSet, detect};
pub use presenter::{Headless, Pending, Presenter};
pub use resolver::{MatchSource, Move, Resolver, Step};
pub use scoring::ScorePolicy;
pub use session::{Accepted, Session};
pub use timer::Countdown;

/// Why an input was ignored. Board, score and timer are left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// A move is still resolving.
    Busy,
    /// The timer ran out; only restart is accepted.
    GameOver,
    OutOfBounds,
    NotAdjacent,
    NotKnightMove,
    /// Item already used this session (or not offered in this mode).
    ItemSpent,
    RefreshSpent,
    /// Ticks only apply to the timed mode.
    Untimed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rejection::Busy => "a move is still resolving",
            Rejection::GameOver => "the game is over",
            Rejection::OutOfBounds => "cell is outside the board",
            Rejection::NotAdjacent => "cells are not adjacent",
            Rejection::NotKnightMove => "cells are not a knight's move apart",
            Rejection::ItemSpent => "item already used",
            Rejection::RefreshSpent => "refresh already used",
            Rejection::Untimed => "this mode has no timer",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Rejection {}
