//! The single gate for player input.
//!
//! Clicks, item buttons, refresh, restart and clock ticks all go through
//! [`Session`]. Anything arriving while a move resolves, or after the clock
//! ran out, is rejected and leaves the board alone.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::Rejection;
use super::grid::{Coord, Grid};
use super::items::{Item, ItemBelt};
use super::presenter::{Pending, Presenter};
use super::resolver::{MatchSource, Move, Resolver, Step};
use super::timer::Countdown;
use crate::config::GameConfig;

/// What an accepted input did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accepted {
    Selected(Coord),
    Deselected,
    Armed(Item),
    Disarmed,
    /// The move started; see [`Session::pump`] for how far it got.
    Moved(Move),
    Refreshed,
    Restarted,
    Ticked(u32),
    Expired,
}

pub struct Session {
    config: GameConfig,
    resolver: Resolver,
    belt: ItemBelt,
    selection: Option<Coord>,
    clock: Option<Countdown>,
    over: bool,
    /// Waiting out the pause after a reverted swap.
    resting: bool,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let resolver = Resolver::new(config.scoring(), rng);
        Self::with_resolver(config, resolver)
    }

    /// Start from a fixed layout (puzzles, tests).
    pub fn with_grid(config: GameConfig, grid: Grid) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed.unwrap_or_default());
        let resolver = Resolver::with_grid(config.scoring(), grid, rng);
        Self::with_resolver(config, resolver)
    }

    fn with_resolver(config: GameConfig, resolver: Resolver) -> Self {
        info!("new {:?} game", config.mode);
        Self {
            belt: Self::fresh_belt(&config),
            clock: Self::fresh_clock(&config),
            config,
            resolver,
            selection: None,
            over: false,
            resting: false,
        }
    }

    fn fresh_belt(config: &GameConfig) -> ItemBelt {
        if config.is_timed() {
            ItemBelt::timed()
        } else {
            ItemBelt::classic()
        }
    }

    fn fresh_clock(config: &GameConfig) -> Option<Countdown> {
        config
            .is_timed()
            .then(|| Countdown::new(config.start_seconds, config.time_bonus))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        self.resolver.grid()
    }

    pub fn score(&self) -> u32 {
        self.resolver.score()
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.clock.as_ref().map(Countdown::remaining)
    }

    pub fn selection(&self) -> Option<Coord> {
        self.selection
    }

    pub fn items(&self) -> &ItemBelt {
        &self.belt
    }

    /// A move is in flight.
    pub fn is_processing(&self) -> bool {
        self.resting || !self.resolver.is_idle()
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Push the whole visible state to the presenter.
    pub fn present_all<P: Presenter + ?Sized>(&self, p: &mut P) {
        p.render(self.grid());
        p.show_score(self.score());
        if let Some(secs) = self.remaining_seconds() {
            p.show_time(secs);
        }
        p.show_selection(self.selection);
        p.show_items(&self.belt);
    }

    fn gate(&self) -> Result<(), Rejection> {
        if self.over {
            Err(Rejection::GameOver)
        } else if self.is_processing() {
            Err(Rejection::Busy)
        } else {
            Ok(())
        }
    }

    fn logged<T>(result: Result<T, Rejection>) -> Result<T, Rejection> {
        if let Err(why) = &result {
            debug!("input rejected: {why}");
        }
        result
    }

    /// A board cell was clicked.
    ///
    /// A second click that does not form a legal move is rejected but still
    /// drops the pending selection, as the page always has.
    pub fn cell_clicked<P: Presenter + ?Sized>(
        &mut self,
        at: Coord,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        Self::logged(self.click(at, p))
    }

    fn click<P: Presenter + ?Sized>(
        &mut self,
        at: Coord,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        self.gate()?;
        if !at.in_bounds() {
            return Err(Rejection::OutOfBounds);
        }
        let Some(from) = self.selection.take() else {
            if self.belt.active() == Some(Item::AreaClear) {
                return self.start_item(Item::AreaClear, Move::Area(at), p);
            }
            self.selection = Some(at);
            p.show_selection(Some(at));
            return Ok(Accepted::Selected(at));
        };
        p.show_selection(None);
        if from == at {
            return Ok(Accepted::Deselected);
        }
        match self.belt.active() {
            Some(Item::LongRangeSwap) => {
                let mv = Move::LongRange(from, at).validate()?;
                self.start_item(Item::LongRangeSwap, mv, p)
            }
            _ => {
                let mv = Move::Swap(from, at).validate()?;
                self.start(mv, p)
            }
        }
    }

    fn start_item<P: Presenter + ?Sized>(
        &mut self,
        item: Item,
        mv: Move,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        self.resolver.begin(mv)?;
        self.belt.consume(item);
        p.show_items(&self.belt);
        self.run(mv, p)
    }

    fn start<P: Presenter + ?Sized>(
        &mut self,
        mv: Move,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        self.resolver.begin(mv)?;
        self.run(mv, p)
    }

    fn run<P: Presenter + ?Sized>(&mut self, mv: Move, p: &mut P) -> Result<Accepted, Rejection> {
        debug!("move {mv:?}");
        self.pump(p);
        Ok(Accepted::Moved(mv))
    }

    /// Arm an item, or disarm it when it is already armed.
    pub fn item_selected<P: Presenter + ?Sized>(
        &mut self,
        item: Item,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        Self::logged(self.select_item(item, p))
    }

    fn select_item<P: Presenter + ?Sized>(
        &mut self,
        item: Item,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        self.gate()?;
        let armed = self.belt.toggle(item)?;
        self.selection = None;
        p.show_selection(None);
        p.show_items(&self.belt);
        Ok(armed.map_or(Accepted::Disarmed, Accepted::Armed))
    }

    /// Start over on a fresh board, like restart, except the refresh stays
    /// spent afterwards (timed mode only).
    pub fn refresh_requested<P: Presenter + ?Sized>(
        &mut self,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        Self::logged(self.refresh(p))
    }

    fn refresh<P: Presenter + ?Sized>(&mut self, p: &mut P) -> Result<Accepted, Rejection> {
        self.gate()?;
        if !self.belt.can_refresh() {
            return Err(Rejection::RefreshSpent);
        }
        self.reset()?;
        self.belt.consume_refresh()?;
        info!("board refreshed, new {:?} game", self.config.mode);
        self.present_all(p);
        Ok(Accepted::Refreshed)
    }

    /// Start over: new board, zero score, full clock, all items back.
    /// Accepted when idle or after game over.
    pub fn restart_requested<P: Presenter + ?Sized>(
        &mut self,
        p: &mut P,
    ) -> Result<Accepted, Rejection> {
        Self::logged(self.restart(p))
    }

    fn restart<P: Presenter + ?Sized>(&mut self, p: &mut P) -> Result<Accepted, Rejection> {
        self.reset()?;
        info!("restarted {:?} game", self.config.mode);
        self.present_all(p);
        Ok(Accepted::Restarted)
    }

    fn reset(&mut self) -> Result<(), Rejection> {
        self.resolver.restart()?;
        self.belt = Self::fresh_belt(&self.config);
        self.clock = Self::fresh_clock(&self.config);
        self.selection = None;
        self.over = false;
        Ok(())
    }

    /// One second of wall-clock time passed. Ignored while a move resolves.
    pub fn tick<P: Presenter + ?Sized>(&mut self, p: &mut P) -> Result<Accepted, Rejection> {
        self.gate()?;
        let clock = self.clock.as_mut().ok_or(Rejection::Untimed)?;
        let left = clock.tick();
        p.show_time(left);
        if left > 0 {
            return Ok(Accepted::Ticked(left));
        }
        self.over = true;
        self.selection = None;
        self.belt.disarm();
        info!("time up, final score {}", self.score());
        p.show_game_over(self.score());
        Ok(Accepted::Expired)
    }

    /// Forward a finished clear animation. Returns `true` once the barrier
    /// released; the host should then call [`Session::pump`].
    pub fn animation_ended(&mut self, at: Coord) -> bool {
        self.resolver.animation_ended(at)
    }

    /// Step the resolver until it is idle or waiting on the presenter.
    /// Returns the last step taken.
    pub fn pump<P: Presenter + ?Sized>(&mut self, p: &mut P) -> Step {
        self.resting = false;
        loop {
            let step = self.resolver.step();
            let flow = self.present(&step, p);
            if step.is_final() || flow == Pending::Deferred {
                return step;
            }
        }
    }

    fn present<P: Presenter + ?Sized>(&mut self, step: &Step, p: &mut P) -> Pending {
        match step {
            Step::Idle => Pending::Done,
            Step::Swapped { forced, .. } => {
                if !forced {
                    p.render(self.grid());
                }
                p.pause(self.config.swap_pause_ms)
            }
            Step::Reverted { .. } => {
                p.render(self.grid());
                let flow = p.pause(self.config.swap_pause_ms);
                self.resting = flow == Pending::Deferred;
                flow
            }
            Step::Matched { cells, source, .. } => {
                if *source == MatchSource::Run {
                    if let Some(clock) = self.clock.as_mut() {
                        clock.add_bonus();
                        p.show_time(clock.remaining());
                    }
                }
                p.show_score(self.score());
                match p.animate(cells) {
                    Pending::Done => {
                        self.resolver.finish_animation();
                        Pending::Done
                    }
                    Pending::Deferred => Pending::Deferred,
                }
            }
            Step::Waiting { .. } => Pending::Deferred,
            Step::Refilled { .. } => {
                // The next detection animates cells of this grid, so the
                // presenter must hold it before any further `animate`.
                p.render(self.grid());
                if self.config.cascade_pause_ms == 0 {
                    return Pending::Done;
                }
                p.pause(self.config.cascade_pause_ms)
            }
            Step::Settled { .. } => {
                p.render(self.grid());
                p.show_score(self.score());
                Pending::Done
            }
        }
    }
}
