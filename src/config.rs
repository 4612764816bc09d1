//! Game settings. Board size and palette are fixed; only the mode, the seed
//! and the pacing are configurable.

use crate::board::ScorePolicy;

pub const TIMED_START_SECONDS: u32 = 60;
pub const TIME_BONUS_SECONDS: u32 = 3;
pub const SWAP_PAUSE_MS: u32 = 100;
pub const CLASSIC_CASCADE_PAUSE_MS: u32 = 300;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Mode {
    /// Countdown, tiered scoring, power items.
    #[default]
    Timed,
    /// No clock, flat scoring, paced cascades.
    Classic,
}

impl Mode {
    pub fn from_name(name: &str) -> Option<Mode> {
        match name.trim().to_ascii_lowercase().as_str() {
            "timed" => Some(Mode::Timed),
            "classic" => Some(Mode::Classic),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GameConfig {
    pub mode: Mode,
    /// Fixed RNG seed; `None` draws one from the platform.
    pub seed: Option<u64>,
    pub start_seconds: u32,
    pub time_bonus: u32,
    /// Delay after a swap is shown, before it is checked.
    pub swap_pause_ms: u32,
    /// Delay between cascade iterations (0 renders only the settled board).
    pub cascade_pause_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::timed()
    }
}

impl GameConfig {
    pub fn timed() -> Self {
        Self {
            mode: Mode::Timed,
            seed: None,
            start_seconds: TIMED_START_SECONDS,
            time_bonus: TIME_BONUS_SECONDS,
            swap_pause_ms: SWAP_PAUSE_MS,
            cascade_pause_ms: 0,
        }
    }

    pub fn classic() -> Self {
        Self {
            mode: Mode::Classic,
            cascade_pause_ms: CLASSIC_CASCADE_PAUSE_MS,
            ..Self::timed()
        }
    }

    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Timed => Self::timed(),
            Mode::Classic => Self::classic(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn is_timed(&self) -> bool {
        self.mode == Mode::Timed
    }

    pub fn scoring(&self) -> ScorePolicy {
        match self.mode {
            Mode::Timed => ScorePolicy::Tiered,
            Mode::Classic => ScorePolicy::CLASSIC,
        }
    }

    /// Parse a JSON object; missing fields keep their timed-mode defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
