use banqi_core::{Position, SQUARE_NB};

/// Own moves we always assume are still to come.
const MIN_MOVES_LEFT: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeConfig {
    pub min_ms: u64,
    pub max_ms: u64,
    /// Largest share of the remaining clock one move may take.
    pub safety_fraction: f64,
    /// Budget used when the clock is unknown or already spent.
    pub fallback_ms: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            min_ms: 50,
            max_ms: 15_000,
            safety_fraction: 0.25,
            fallback_ms: 4_500,
        }
    }
}

impl TimeConfig {
    /// Estimated own moves left, from plies already played, pieces still on
    /// the board and how close the no-progress draw is.
    pub fn moves_left(&self, plies_played: u32, pieces_on_board: u32, no_progress: u16) -> u32 {
        let material = 10 + pieces_on_board.min(SQUARE_NB as u32);
        let tail = 40u32.saturating_sub(plies_played / 4) / 2;
        (material + tail)
            .saturating_sub(u32::from(no_progress) / 3)
            .max(MIN_MOVES_LEFT)
    }

    pub fn budget_ms(
        &self,
        clock_secs: Option<f64>,
        plies_played: u32,
        pieces_on_board: u32,
        no_progress: u16,
    ) -> u64 {
        let min = self.min_ms.min(self.max_ms);
        let Some(remaining_ms) = clock_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| secs * 1000.0)
        else {
            return self.fallback_ms.clamp(min, self.max_ms);
        };

        let moves_left = f64::from(self.moves_left(plies_played, pieces_on_board, no_progress));
        let share = (remaining_ms / moves_left).min(remaining_ms * self.safety_fraction);
        (share.max(0.0) as u64).clamp(min, self.max_ms)
    }

    pub fn budget_for(&self, position: &Position, plies_played: u32) -> u64 {
        let clock = position.clock(position.turn);
        self.budget_ms(
            (clock != 0.0).then_some(clock),
            plies_played,
            position.occupied().count(),
            position.no_progress,
        )
    }
}
