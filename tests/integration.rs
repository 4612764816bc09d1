// Integration tests (native) for the `jewel-match` crate.
// These drive a `Session` through a recording presenter and avoid wasm/browser
// APIs so they run under `cargo test` on the host.

use jewel_match::board::ItemBelt;
use jewel_match::{
    Accepted, Coord, GameConfig, Grid, Item, MatchSet, Move, Pending, Presenter, Rejection,
    Session, detect,
};

// Row 0 holds "RRAR": swapping (0,2) with (0,3) lines up three rubies.
const NEAR_MATCH: &str = "
    RRARSEMA
    AESMAEMS
    SMAESMAE
    EAMSEAMS
    MSEAMSEA
    ASMEASME
    SEAMSEAM
    EMSAEMSA";

// Top-left corner is [[A,A,S],[A,S,S],[S,A,A]]; the rest is a match-free stripe.
const CORNER: &str = "
    AASREMRE
    ASSEMREM
    SAAMREMR
    REMREMRE
    EMREMREM
    MREMREMR
    REMREMRE
    EMREMREM";

#[derive(Default)]
struct Recorder {
    renders: usize,
    animated: Vec<MatchSet>,
    scores: Vec<u32>,
    times: Vec<u32>,
    pauses: Vec<u32>,
    game_over: Option<u32>,
    events: Vec<&'static str>,
    defer_animations: bool,
    defer_pauses: bool,
}

impl Presenter for Recorder {
    fn render(&mut self, _grid: &Grid) {
        self.renders += 1;
        self.events.push("render");
    }

    fn animate(&mut self, cells: &MatchSet) -> Pending {
        self.animated.push(cells.clone());
        self.events.push("animate");
        if self.defer_animations {
            Pending::Deferred
        } else {
            Pending::Done
        }
    }

    fn pause(&mut self, ms: u32) -> Pending {
        self.pauses.push(ms);
        if self.defer_pauses {
            Pending::Deferred
        } else {
            Pending::Done
        }
    }

    fn show_score(&mut self, score: u32) {
        self.scores.push(score);
    }

    fn show_time(&mut self, seconds: u32) {
        self.times.push(seconds);
    }

    fn show_items(&mut self, _items: &ItemBelt) {}

    fn show_game_over(&mut self, final_score: u32) {
        self.game_over = Some(final_score);
    }
}

fn session_on(layout: &str, config: GameConfig) -> Session {
    let grid: Grid = layout.parse().expect("test layout parses");
    assert!(detect(&grid).is_empty(), "test layout must start match-free");
    Session::with_grid(config.with_seed(17), grid)
}

fn click(s: &mut Session, p: &mut Recorder, row: u8, col: u8) -> Result<Accepted, Rejection> {
    s.cell_clicked(Coord::new(row, col), p)
}

#[test]
fn illegal_swap_restores_board_and_score() {
    let mut s = session_on(NEAR_MATCH, GameConfig::timed());
    let mut p = Recorder::default();
    let before = s.grid().clone();

    click(&mut s, &mut p, 0, 0).unwrap();
    let moved = click(&mut s, &mut p, 0, 1).unwrap();
    assert_eq!(
        moved,
        Accepted::Moved(Move::Swap(Coord::new(0, 0), Coord::new(0, 1)))
    );
    assert_eq!(s.grid(), &before);
    assert_eq!(s.score(), 0);
    assert_eq!(s.remaining_seconds(), Some(60));
    assert!(p.animated.is_empty());
    assert!(!s.is_processing());
}

#[test]
fn corner_swaps_detect_nothing_and_revert() {
    let mut s = session_on(CORNER, GameConfig::timed());
    let mut p = Recorder::default();
    let before = s.grid().clone();

    // Same color on both sides: the swap changes nothing.
    click(&mut s, &mut p, 0, 2).unwrap();
    click(&mut s, &mut p, 1, 2).unwrap();
    assert_eq!(s.grid(), &before);

    // A/S swap at (0,1)-(1,1) leaves columns AAS / SAA / SSA: still no run.
    let mut swapped = before.clone();
    swapped.swap(Coord::new(0, 1), Coord::new(1, 1));
    assert!(detect(&swapped).is_empty());
    click(&mut s, &mut p, 0, 1).unwrap();
    click(&mut s, &mut p, 1, 1).unwrap();
    assert_eq!(s.grid(), &before);
    assert_eq!(s.score(), 0);
}

#[test]
fn legal_swap_scores_cascades_and_earns_time() {
    let mut s = session_on(NEAR_MATCH, GameConfig::timed());
    let mut p = Recorder::default();

    click(&mut s, &mut p, 0, 2).unwrap();
    click(&mut s, &mut p, 0, 3).unwrap();

    let first: MatchSet = [Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]
        .into_iter()
        .collect();
    assert_eq!(p.animated.first(), Some(&first));
    let chains = p.animated.len() as u32;
    assert!(s.score() >= 30);
    assert_eq!(s.remaining_seconds(), Some(60 + 3 * chains));
    assert!(p.scores.windows(2).all(|w| w[0] <= w[1]));
    assert!(detect(s.grid()).is_empty());
    assert!(s.grid().is_full());
    assert_eq!(p.pauses.first(), Some(&100));
}

#[test]
fn classic_mode_scores_flat_and_paces_cascades() {
    let mut s = session_on(NEAR_MATCH, GameConfig::classic());
    let mut p = Recorder::default();

    click(&mut s, &mut p, 0, 2).unwrap();
    click(&mut s, &mut p, 0, 3).unwrap();

    let cleared: usize = p.animated.iter().map(|m| m.len()).sum();
    assert_eq!(s.score(), 10 * cleared as u32);
    assert_eq!(s.remaining_seconds(), None);
    let cascade_pauses = p.pauses.iter().filter(|&&ms| ms == 300).count();
    assert_eq!(cascade_pauses, p.animated.len());
}

#[test]
fn input_is_refused_until_deferred_animations_finish() {
    let mut s = session_on(NEAR_MATCH, GameConfig::timed());
    let mut p = Recorder {
        defer_animations: true,
        ..Recorder::default()
    };

    click(&mut s, &mut p, 0, 2).unwrap();
    click(&mut s, &mut p, 0, 3).unwrap();
    assert!(s.is_processing());
    let clock = s.remaining_seconds();

    assert_eq!(click(&mut s, &mut p, 5, 5), Err(Rejection::Busy));
    assert_eq!(s.tick(&mut p), Err(Rejection::Busy));
    assert_eq!(s.remaining_seconds(), clock);
    assert_eq!(
        s.item_selected(Item::AreaClear, &mut p),
        Err(Rejection::Busy)
    );
    assert_eq!(s.refresh_requested(&mut p), Err(Rejection::Busy));
    assert_eq!(s.restart_requested(&mut p), Err(Rejection::Busy));

    let mut rounds = 0;
    while s.is_processing() {
        rounds += 1;
        assert!(rounds < 50, "cascade did not drain");
        let cells: Vec<Coord> = p.animated.last().unwrap().iter().copied().collect();
        let (last, rest) = cells.split_last().unwrap();
        for &at in rest {
            assert!(!s.animation_ended(at));
        }
        assert!(s.animation_ended(*last));
        s.pump(&mut p);
    }
    assert!(detect(s.grid()).is_empty());
    assert!(s.tick(&mut p).is_ok());
}

#[test]
fn area_clear_is_single_use() {
    let mut s = session_on(NEAR_MATCH, GameConfig::timed());
    let mut p = Recorder::default();

    assert_eq!(
        s.item_selected(Item::AreaClear, &mut p),
        Ok(Accepted::Armed(Item::AreaClear))
    );
    assert_eq!(
        click(&mut s, &mut p, 3, 3),
        Ok(Accepted::Moved(Move::Area(Coord::new(3, 3))))
    );
    assert_eq!(p.animated.len(), 1);
    assert_eq!(p.animated[0].len(), 9);
    assert_eq!(s.score(), 100);
    // The forced clear earns no time.
    assert_eq!(s.remaining_seconds(), Some(60));
    assert!(!s.items().is_available(Item::AreaClear));
    assert_eq!(
        s.item_selected(Item::AreaClear, &mut p),
        Err(Rejection::ItemSpent)
    );
}

#[test]
fn long_range_swap_needs_a_knight_move_and_keeps_the_swap() {
    let mut s = session_on(NEAR_MATCH, GameConfig::timed());
    let mut p = Recorder::default();
    let before = s.grid().clone();

    s.item_selected(Item::LongRangeSwap, &mut p).unwrap();
    click(&mut s, &mut p, 0, 0).unwrap();
    assert_eq!(click(&mut s, &mut p, 1, 1), Err(Rejection::NotKnightMove));
    assert_eq!(s.items().active(), Some(Item::LongRangeSwap));
    assert_eq!(s.grid(), &before);

    click(&mut s, &mut p, 0, 0).unwrap();
    let moved = click(&mut s, &mut p, 2, 1).unwrap();
    assert_eq!(
        moved,
        Accepted::Moved(Move::LongRange(Coord::new(0, 0), Coord::new(2, 1)))
    );
    // No run formed, yet the item swap stays.
    assert_eq!(s.grid().get(Coord::new(0, 0)), before.get(Coord::new(2, 1)));
    assert_eq!(s.grid().get(Coord::new(2, 1)), before.get(Coord::new(0, 0)));
    assert_eq!(s.score(), 0);
    assert_eq!(s.items().active(), None);
    assert_eq!(
        s.item_selected(Item::LongRangeSwap, &mut p),
        Err(Rejection::ItemSpent)
    );
}

#[test]
fn clock_expiry_ends_the_game_until_restart() {
    let config = GameConfig {
        start_seconds: 2,
        ..GameConfig::timed()
    };
    let mut s = session_on(NEAR_MATCH, config);
    let mut p = Recorder::default();

    assert_eq!(s.tick(&mut p), Ok(Accepted::Ticked(1)));
    assert_eq!(s.tick(&mut p), Ok(Accepted::Expired));
    assert!(s.is_over());
    assert_eq!(p.game_over, Some(0));

    assert_eq!(click(&mut s, &mut p, 0, 2), Err(Rejection::GameOver));
    assert_eq!(s.tick(&mut p), Err(Rejection::GameOver));
    assert_eq!(
        s.item_selected(Item::LongRangeSwap, &mut p),
        Err(Rejection::GameOver)
    );

    assert_eq!(s.restart_requested(&mut p), Ok(Accepted::Restarted));
    assert!(!s.is_over());
    assert_eq!(s.remaining_seconds(), Some(2));
    assert_eq!(s.score(), 0);
    assert!(detect(s.grid()).is_empty());
}

#[test]
fn refresh_starts_over_and_stays_spent_when_timed() {
    let mut s = session_on(NEAR_MATCH, GameConfig::timed());
    let mut p = Recorder::default();

    s.item_selected(Item::AreaClear, &mut p).unwrap();
    click(&mut s, &mut p, 3, 3).unwrap();
    s.tick(&mut p).unwrap();
    assert_eq!(s.score(), 100);
    assert_eq!(s.remaining_seconds(), Some(59));
    s.item_selected(Item::LongRangeSwap, &mut p).unwrap();
    let before = s.grid().clone();

    assert_eq!(s.refresh_requested(&mut p), Ok(Accepted::Refreshed));
    assert_ne!(s.grid(), &before);
    assert!(detect(s.grid()).is_empty());
    assert_eq!(s.score(), 0);
    assert_eq!(s.remaining_seconds(), Some(60));
    assert_eq!(s.items().active(), None);
    assert!(s.items().is_available(Item::AreaClear));
    assert!(s.items().is_available(Item::LongRangeSwap));
    assert!(!s.items().can_refresh());
    assert_eq!(s.refresh_requested(&mut p), Err(Rejection::RefreshSpent));

    // Only a restart hands the refresh back.
    s.restart_requested(&mut p).unwrap();
    assert!(s.items().can_refresh());
    assert_eq!(s.refresh_requested(&mut p), Ok(Accepted::Refreshed));
}

#[test]
fn reverted_swap_holds_input_for_the_swap_pause() {
    let mut s = session_on(NEAR_MATCH, GameConfig::timed());
    let mut p = Recorder {
        defer_pauses: true,
        ..Recorder::default()
    };

    click(&mut s, &mut p, 0, 0).unwrap();
    click(&mut s, &mut p, 0, 1).unwrap();
    assert_eq!(p.pauses, vec![100]);
    s.pump(&mut p);
    assert_eq!(p.pauses, vec![100, 100]);
    assert!(s.is_processing());
    assert_eq!(click(&mut s, &mut p, 5, 5), Err(Rejection::Busy));
    assert_eq!(s.tick(&mut p), Err(Rejection::Busy));

    s.pump(&mut p);
    assert!(!s.is_processing());
    assert_eq!(click(&mut s, &mut p, 5, 5), Ok(Accepted::Selected(Coord::new(5, 5))));
}

/// First adjacent swap on the board that lines up a run.
fn legal_swap(grid: &Grid) -> Option<(Coord, Coord)> {
    for row in 0..8u8 {
        for col in 0..8u8 {
            let a = Coord::new(row, col);
            for b in [Coord::new(row, col + 1), Coord::new(row + 1, col)] {
                if !b.in_bounds() {
                    continue;
                }
                let mut trial = grid.clone();
                trial.swap(a, b);
                if !detect(&trial).is_empty() {
                    return Some((a, b));
                }
            }
        }
    }
    None
}

#[test]
fn every_cascade_animates_a_freshly_drawn_board() {
    let mut cascades = 0;
    for seed in 0..400 {
        let mut s = Session::new(GameConfig::timed().with_seed(seed));
        assert_eq!(s.config().cascade_pause_ms, 0);
        let mut p = Recorder::default();
        let Some((a, b)) = legal_swap(s.grid()) else {
            continue;
        };
        s.cell_clicked(a, &mut p).unwrap();
        s.cell_clicked(b, &mut p).unwrap();
        assert!(!s.is_processing());

        if p.animated.len() > 1 {
            cascades += 1;
        }
        let animations: Vec<usize> = p
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == "animate")
            .map(|(i, _)| i)
            .collect();
        for pair in animations.windows(2) {
            assert!(
                p.events[pair[0]..pair[1]].contains(&"render"),
                "seed {seed}: cascade animated on a stale board: {:?}",
                p.events
            );
        }
    }
    assert!(cascades > 0, "no seed produced a chained cascade");
}
