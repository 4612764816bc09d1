//! Cascade state machine.
//!
//! A move is resolved one stage per [`Resolver::step`] call so that the host
//! can render, pause, or wait for animations between stages:
//!
//! ```text
//! Idle -> Swapping -> Detecting -> Animating -> Clearing -> Detecting ... -> Idle
//!                         \-> (no match, plain swap) revert -> Idle
//! Idle -> Detonating -> Animating -> Clearing -> Idle        (area item, no cascade)
//! ```
//!
//! `Animating` is a barrier: it only opens once every matched cell has
//! reported the end of its animation (or the host calls `finish_animation`).

use std::collections::BTreeSet;

use log::{debug, trace};
use rand::rngs::SmallRng;

use super::Rejection;
use super::grid::{Coord, Grid};
use super::items::area_cells;
use super::matches::{MatchSet, detect};
use super::scoring::ScorePolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Move {
    /// Orthogonally adjacent swap; reverted when it forms no run.
    Swap(Coord, Coord),
    /// Knight-distance swap from the long-range item; never reverted.
    LongRange(Coord, Coord),
    /// Forced 3x3 clear from the area item.
    Area(Coord),
}

impl Move {
    /// Check the geometric rule for this kind of move.
    pub fn validate(self) -> Result<Self, Rejection> {
        match self {
            Move::Swap(a, b) => {
                if !a.in_bounds() || !b.in_bounds() {
                    Err(Rejection::OutOfBounds)
                } else if !a.is_adjacent(b) {
                    Err(Rejection::NotAdjacent)
                } else {
                    Ok(self)
                }
            }
            Move::LongRange(a, b) => {
                if !a.in_bounds() || !b.in_bounds() {
                    Err(Rejection::OutOfBounds)
                } else if !a.is_knight_move(b) {
                    Err(Rejection::NotKnightMove)
                } else {
                    Ok(self)
                }
            }
            Move::Area(center) if center.in_bounds() => Ok(self),
            Move::Area(_) => Err(Rejection::OutOfBounds),
        }
    }
}

/// Where a scored set of cells came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchSource {
    Run,
    Area,
}

/// What a single [`Resolver::step`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing in flight.
    Idle,
    /// The two cells were exchanged; `forced` for item swaps.
    Swapped { a: Coord, b: Coord, forced: bool },
    /// A plain swap formed no run and was undone. The resolver is idle again.
    Reverted { a: Coord, b: Coord },
    /// Cells were scored and are waiting for their clear animation.
    Matched {
        cells: MatchSet,
        points: u32,
        chain: u32,
        source: MatchSource,
    },
    /// Still waiting on `pending` animations.
    Waiting { pending: usize },
    /// Matched cells cleared, columns compacted and refilled.
    Refilled { filled: usize },
    /// The move is fully resolved after `chain` scoring iterations.
    Settled { chain: u32 },
}

impl Step {
    /// Whether the resolver went back to idle with this step.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Step::Idle | Step::Reverted { .. } | Step::Settled { .. }
        )
    }
}

/// Cells whose clear animation has not finished yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Barrier {
    pending: BTreeSet<Coord>,
}

impl Barrier {
    fn over(cells: &MatchSet) -> Self {
        Self {
            pending: cells.clone(),
        }
    }

    /// One-shot: a second signal for the same cell is ignored.
    fn signal(&mut self, at: Coord) -> bool {
        self.pending.remove(&at)
    }

    /// Still waiting on at least one cell.
    pub fn holds(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Swapping(Coord, Coord),
    Detonating(Coord),
    Detecting,
    Animating {
        matches: MatchSet,
        barrier: Barrier,
        source: MatchSource,
    },
    Clearing {
        matches: MatchSet,
        source: MatchSource,
    },
    Settling,
}

/// Owns the grid and the score; the only thing that mutates either during play.
pub struct Resolver {
    grid: Grid,
    score: u32,
    policy: ScorePolicy,
    rng: SmallRng,
    phase: Phase,
    current: Option<Move>,
    chain: u32,
}

impl Resolver {
    /// Fresh match-free board drawn from `rng`.
    pub fn new(policy: ScorePolicy, mut rng: SmallRng) -> Self {
        let grid = Grid::generate(&mut rng);
        Self::with_grid(policy, grid, rng)
    }

    /// Start from a given layout. Refills still draw from `rng`.
    pub fn with_grid(policy: ScorePolicy, grid: Grid, rng: SmallRng) -> Self {
        Self {
            grid,
            score: 0,
            policy,
            rng,
            phase: Phase::Idle,
            current: None,
            chain: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Move currently being resolved.
    pub fn current(&self) -> Option<Move> {
        self.current
    }

    /// Animations the barrier is still waiting for (0 outside `Animating`).
    pub fn pending_animations(&self) -> usize {
        match &self.phase {
            Phase::Animating { barrier, .. } => barrier.pending(),
            _ => 0,
        }
    }

    /// Replace the board with a new match-free one. Score is kept.
    pub fn regenerate(&mut self) -> Result<(), Rejection> {
        if !self.is_idle() {
            return Err(Rejection::Busy);
        }
        self.grid = Grid::generate(&mut self.rng);
        Ok(())
    }

    /// New board and zero score.
    pub fn restart(&mut self) -> Result<(), Rejection> {
        self.regenerate()?;
        self.score = 0;
        Ok(())
    }

    /// Accept a move if nothing else is in flight.
    pub fn begin(&mut self, mv: Move) -> Result<(), Rejection> {
        if !self.is_idle() {
            return Err(Rejection::Busy);
        }
        let mv = mv.validate()?;
        self.phase = match mv {
            Move::Swap(a, b) | Move::LongRange(a, b) => Phase::Swapping(a, b),
            Move::Area(center) => Phase::Detonating(center),
        };
        self.current = Some(mv);
        self.chain = 0;
        Ok(())
    }

    /// Advance one stage.
    pub fn step(&mut self) -> Step {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => Step::Idle,
            Phase::Swapping(a, b) => {
                self.grid.swap(a, b);
                self.phase = Phase::Detecting;
                Step::Swapped {
                    a,
                    b,
                    forced: !matches!(self.current, Some(Move::Swap(..))),
                }
            }
            Phase::Detonating(center) => self.score_cells(area_cells(center), MatchSource::Area),
            Phase::Detecting => {
                let found = detect(&self.grid);
                if !found.is_empty() {
                    return self.score_cells(found, MatchSource::Run);
                }
                if let (0, Some(Move::Swap(a, b))) = (self.chain, self.current) {
                    self.grid.swap(a, b);
                    debug!("swap {a}-{b} formed no run; reverted");
                    self.current = None;
                    return Step::Reverted { a, b };
                }
                self.settle()
            }
            Phase::Animating {
                matches,
                barrier,
                source,
            } => {
                if barrier.holds() {
                    let pending = barrier.pending();
                    self.phase = Phase::Animating {
                        matches,
                        barrier,
                        source,
                    };
                    Step::Waiting { pending }
                } else {
                    self.phase = Phase::Clearing { matches, source };
                    self.step()
                }
            }
            Phase::Clearing { matches, source } => {
                self.grid.clear(matches);
                self.grid.compact();
                let filled = self.grid.refill(&mut self.rng);
                // The area clear is a single forced clear; whatever the refill
                // lines up is left for the player.
                self.phase = match source {
                    MatchSource::Run => Phase::Detecting,
                    MatchSource::Area => Phase::Settling,
                };
                Step::Refilled { filled }
            }
            Phase::Settling => self.settle(),
        }
    }

    /// Report that the clear animation of `at` finished.
    /// Returns `true` once every animated cell has reported.
    pub fn animation_ended(&mut self, at: Coord) -> bool {
        let Phase::Animating {
            matches,
            barrier,
            source,
        } = &mut self.phase
        else {
            return false;
        };
        barrier.signal(at);
        if barrier.holds() {
            return false;
        }
        self.phase = Phase::Clearing {
            matches: std::mem::take(matches),
            source: *source,
        };
        true
    }

    /// Open the barrier at once, for hosts that animate synchronously.
    pub fn finish_animation(&mut self) {
        if let Phase::Animating {
            matches, source, ..
        } = &mut self.phase
        {
            self.phase = Phase::Clearing {
                matches: std::mem::take(matches),
                source: *source,
            };
        }
    }

    /// Resolve a whole move without a presenter. Animations finish instantly.
    pub fn resolve(&mut self, mv: Move) -> Result<Vec<Step>, Rejection> {
        self.begin(mv)?;
        let mut steps = Vec::new();
        loop {
            let step = self.step();
            if matches!(step, Step::Matched { .. }) {
                self.finish_animation();
            }
            let done = step.is_final();
            steps.push(step);
            if done {
                return Ok(steps);
            }
        }
    }

    fn score_cells(&mut self, cells: MatchSet, source: MatchSource) -> Step {
        self.chain += 1;
        let points = self.policy.score(cells.len());
        self.score = self.score.saturating_add(points);
        trace!(
            "chain {}: {} cells ({:?}) +{} -> {}",
            self.chain,
            cells.len(),
            source,
            points,
            self.score
        );
        self.phase = Phase::Animating {
            matches: cells.clone(),
            barrier: Barrier::over(&cells),
            source,
        };
        Step::Matched {
            cells,
            points,
            chain: self.chain,
            source,
        }
    }

    fn settle(&mut self) -> Step {
        let chain = std::mem::take(&mut self.chain);
        self.current = None;
        self.phase = Phase::Idle;
        Step::Settled { chain }
    }
}
