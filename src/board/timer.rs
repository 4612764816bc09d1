/// Seconds countdown for the timed mode.
///
/// The host calls [`Countdown::tick`] once per second; the session skips the
/// call while a move is resolving, which is how the clock pauses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    bonus: u32,
}

impl Countdown {
    pub fn new(start_seconds: u32, bonus_seconds: u32) -> Self {
        Self {
            remaining: start_seconds,
            bonus: bonus_seconds,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// One second elapsed. Returns what is left.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn add_bonus(&mut self) {
        self.remaining = self.remaining.saturating_add(self.bonus);
    }
}
