//! One-shot power items for the timed mode.

use super::Rejection;
use super::grid::Coord;
use super::matches::MatchSet;

/// Cells around the center included by the area clear (3x3).
pub const AREA_RADIUS: i8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Item {
    /// Clears the 3x3 block around a clicked cell.
    AreaClear,
    /// Swaps two cells a knight's move apart.
    LongRangeSwap,
}

impl Item {
    pub const ALL: [Item; 2] = [Item::AreaClear, Item::LongRangeSwap];

    fn slot(self) -> usize {
        match self {
            Item::AreaClear => 0,
            Item::LongRangeSwap => 1,
        }
    }
}

/// Square neighborhood of `center`, clipped to the board.
pub fn area_cells(center: Coord) -> MatchSet {
    let mut cells = MatchSet::new();
    for dr in -AREA_RADIUS..=AREA_RADIUS {
        for dc in -AREA_RADIUS..=AREA_RADIUS {
            if let Some(c) = center.offset(dr, dc) {
                cells.insert(c);
            }
        }
    }
    cells
}

/// Which items are still usable this session and which one is armed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemBelt {
    stocked: [bool; 2],
    refresh_stocked: bool,
    refresh_limited: bool,
    active: Option<Item>,
}

impl ItemBelt {
    /// Timed mode: every item once, refresh once.
    pub fn timed() -> Self {
        Self {
            stocked: [true; 2],
            refresh_stocked: true,
            refresh_limited: true,
            active: None,
        }
    }

    /// Classic mode: no items, refresh as often as wanted.
    pub fn classic() -> Self {
        Self {
            stocked: [false; 2],
            refresh_stocked: true,
            refresh_limited: false,
            active: None,
        }
    }

    pub fn is_available(&self, item: Item) -> bool {
        self.stocked[item.slot()]
    }

    pub fn active(&self) -> Option<Item> {
        self.active
    }

    /// Arm `item`, or disarm it if it is already armed. Returns the new armed item.
    pub fn toggle(&mut self, item: Item) -> Result<Option<Item>, Rejection> {
        if !self.is_available(item) {
            return Err(Rejection::ItemSpent);
        }
        self.active = if self.active == Some(item) {
            None
        } else {
            Some(item)
        };
        Ok(self.active)
    }

    pub fn disarm(&mut self) {
        self.active = None;
    }

    /// Use up `item` for the rest of the session.
    pub fn consume(&mut self, item: Item) {
        self.stocked[item.slot()] = false;
        if self.active == Some(item) {
            self.active = None;
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_stocked
    }

    pub fn consume_refresh(&mut self) -> Result<(), Rejection> {
        if !self.refresh_stocked {
            return Err(Rejection::RefreshSpent);
        }
        if self.refresh_limited {
            self.refresh_stocked = false;
        }
        Ok(())
    }
}
