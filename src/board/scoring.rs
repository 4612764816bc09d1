/// How many points a cleared match set is worth.
///
/// The timed and classic modes disagree on this and both are kept as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScorePolicy {
    /// 5+ cells: 100, 4 cells: 50, otherwise 30.
    Tiered,
    /// A fixed amount per cleared cell.
    Flat { per_jewel: u32 },
}

impl ScorePolicy {
    pub const CLASSIC: ScorePolicy = ScorePolicy::Flat { per_jewel: 10 };

    pub fn score(self, matched: usize) -> u32 {
        match self {
            ScorePolicy::Tiered => match matched {
                n if n >= 5 => 100,
                4 => 50,
                _ => 30,
            },
            ScorePolicy::Flat { per_jewel } => {
                per_jewel.saturating_mul(u32::try_from(matched).unwrap_or(u32::MAX))
            }
        }
    }
}
