//! Offline material table: a score for every pair of remaining-material
//! combinations, stored as a flat row-major file of little-endian `i32`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use banqi_core::{Color, PieceType, Position};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_TABLE_PATH: &str = "material_scores.bin";

/// Slots in index order, weakest first.
pub const SLOTS: [PieceType; 7] = [
    PieceType::Soldier,
    PieceType::Cannon,
    PieceType::Horse,
    PieceType::Chariot,
    PieceType::Elephant,
    PieceType::Advisor,
    PieceType::General,
];

pub const MAX_COUNTS: [u8; 7] = [5, 2, 2, 2, 2, 2, 1];
pub const BASE_SCORES: [i32; 7] = [1, 10, 3, 5, 10, 15, 30];

pub const WIN_TIER_SCORES: [i32; 6] = [0, 150, 185, 220, 255, 290];
pub const ELIMINATION_SCORE: i32 = 300;
const MAX_TIER: usize = WIN_TIER_SCORES.len() - 1;

/// 6 * 3^5 * 2 material combinations per side.
pub const MATERIAL_COMBINATIONS: usize = 2916;
const TABLE_LEN: usize = MATERIAL_COMBINATIONS * MATERIAL_COMBINATIONS;

const SOLDIER: usize = 0;
const CANNON: usize = 1;
const GENERAL: usize = 6;

pub type Counts = [u8; 7];

#[derive(Debug, Error)]
pub enum MaterialTableError {
    #[error("material table i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("material table holds {actual} bytes, expected {expected}")]
    Truncated { expected: usize, actual: usize },
}

pub fn slot_of(piece_type: PieceType) -> Option<usize> {
    SLOTS.iter().position(|&slot| slot == piece_type)
}

pub fn material_index(counts: &Counts) -> usize {
    let mut index = 0usize;
    let mut radix = 1usize;
    for (slot, &count) in counts.iter().enumerate() {
        index += usize::from(count.min(MAX_COUNTS[slot])) * radix;
        radix *= usize::from(MAX_COUNTS[slot]) + 1;
    }
    index
}

pub fn counts_from_index(mut index: usize) -> Counts {
    let mut counts = [0u8; 7];
    for (slot, count) in counts.iter_mut().enumerate() {
        let radix = usize::from(MAX_COUNTS[slot]) + 1;
        *count = (index % radix) as u8;
        index /= radix;
    }
    counts
}

/// Pieces `color` still owns: face up on the board plus face down in the bag.
pub fn material_counts(position: &Position, color: Color) -> Counts {
    let mut counts = [0u8; 7];
    for (slot, &piece_type) in SLOTS.iter().enumerate() {
        let total =
            position.count(color, piece_type) + u32::from(position.bag.count(color, piece_type));
        counts[slot] = total.min(u32::from(MAX_COUNTS[slot])) as u8;
    }
    counts
}

/// Capture rule as seen by the endgame table. A Cannon needs a screen and
/// is never counted on to force anything.
fn slot_captures(attacker: usize, victim: usize) -> bool {
    match (attacker, victim) {
        (CANNON, _) => false,
        (SOLDIER, victim) => victim == GENERAL || victim == SOLDIER,
        (GENERAL, SOLDIER) => false,
        (attacker, victim) => attacker >= victim,
    }
}

/// Win tier `mine` can force against `theirs`, 0 when none.
pub fn forced_win_tier(mine: &Counts, theirs: &Counts) -> usize {
    let their_total: u32 = theirs.iter().map(|&n| u32::from(n)).sum();
    if their_total == 0 {
        return 0;
    }

    if theirs[CANNON] > 0 {
        if their_total > 1 {
            return 0;
        }
        let hunters = (0..SLOTS.len())
            .filter(|&slot| mine[slot] > 0 && slot_captures(slot, CANNON))
            .count();
        return hunters.min(MAX_TIER);
    }

    let mut forcing = 0usize;
    for attacker in 0..SLOTS.len() {
        let covers_all = (0..SLOTS.len())
            .filter(|&victim| theirs[victim] > 0)
            .all(|victim| {
                slot_captures(attacker, victim)
                    && (attacker != victim || mine[attacker] > theirs[victim])
            });
        if covers_all {
            forcing += usize::from(mine[attacker]);
        }
    }

    let tier = match forcing {
        1 if their_total == 1 => 2,
        n => n,
    };
    tier.min(MAX_TIER)
}

pub fn base_score(mine: &Counts, theirs: &Counts) -> i32 {
    (0..SLOTS.len())
        .map(|slot| (i32::from(mine[slot]) - i32::from(theirs[slot])) * BASE_SCORES[slot])
        .sum()
}

/// Table entry for the pair of material indices.
pub fn material_score(mine_index: usize, theirs_index: usize) -> i32 {
    if mine_index == theirs_index {
        return 0;
    }
    if theirs_index == 0 {
        return ELIMINATION_SCORE;
    }
    if mine_index == 0 {
        return -ELIMINATION_SCORE;
    }

    let mine = counts_from_index(mine_index);
    let theirs = counts_from_index(theirs_index);
    match (forced_win_tier(&mine, &theirs), forced_win_tier(&theirs, &mine)) {
        (0, 0) => base_score(&mine, &theirs),
        (tier, theirs_tier) => WIN_TIER_SCORES[tier] - WIN_TIER_SCORES[theirs_tier],
    }
}

/// Read-only material table. An unloaded table reads as all zeros.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    scores: Vec<i32>,
}

impl MaterialTable {
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn generate() -> Self {
        let counts: Vec<Counts> = (0..MATERIAL_COMBINATIONS).map(counts_from_index).collect();
        let tiers = |mine: usize, theirs: usize| forced_win_tier(&counts[mine], &counts[theirs]);

        let mut scores = vec![0i32; TABLE_LEN];
        for mine in 0..MATERIAL_COMBINATIONS {
            for theirs in 0..MATERIAL_COMBINATIONS {
                let score = if mine == theirs {
                    0
                } else if theirs == 0 {
                    ELIMINATION_SCORE
                } else if mine == 0 {
                    -ELIMINATION_SCORE
                } else {
                    match (tiers(mine, theirs), tiers(theirs, mine)) {
                        (0, 0) => base_score(&counts[mine], &counts[theirs]),
                        (a, b) => WIN_TIER_SCORES[a] - WIN_TIER_SCORES[b],
                    }
                };
                scores[mine * MATERIAL_COMBINATIONS + theirs] = score;
            }
        }
        Self { scores }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, MaterialTableError> {
        let expected = TABLE_LEN * 4;
        if data.len() < expected {
            return Err(MaterialTableError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        let scores = data[..expected]
            .chunks_exact(4)
            .map(|bytes| i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect();
        Ok(Self { scores })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MaterialTableError> {
        let data = fs::read(path.as_ref())?;
        let table = Self::from_bytes(&data)?;
        info!(path = %path.as_ref().display(), "loaded material table");
        Ok(table)
    }

    /// Loads the table, degrading to zeros when the file is missing or short.
    pub fn load_or_zeroed(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(table) => table,
            Err(err) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %err,
                    "material table unavailable, using zeros"
                );
                Self::zeroed()
            }
        }
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), MaterialTableError> {
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        for score in &self.scores {
            writer.write_all(&score.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        !self.scores.is_empty()
    }

    pub fn get(&self, mine: usize, theirs: usize) -> i32 {
        self.scores
            .get(mine * MATERIAL_COMBINATIONS + theirs)
            .copied()
            .unwrap_or(0)
    }

    /// Score for `color` against its opponent in `position`.
    pub fn lookup(&self, position: &Position, color: Color) -> i32 {
        let mine = material_index(&material_counts(position, color));
        let theirs = material_index(&material_counts(position, color.opposite()));
        self.get(mine, theirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(PieceType, u8)]) -> Counts {
        let mut counts = [0u8; 7];
        for &(piece_type, n) in pairs {
            counts[slot_of(piece_type).unwrap()] = n;
        }
        counts
    }

    #[test]
    fn index_round_trips() {
        assert_eq!(material_index(&[5, 2, 2, 2, 2, 2, 1]), MATERIAL_COMBINATIONS - 1);
        for index in [0, 1, 6, 17, 1457, 1458, 2915] {
            assert_eq!(material_index(&counts_from_index(index)), index);
        }
    }

    #[test]
    fn full_set_index() {
        let full = counts(&[
            (PieceType::General, 1),
            (PieceType::Advisor, 2),
            (PieceType::Elephant, 2),
            (PieceType::Chariot, 2),
            (PieceType::Horse, 2),
            (PieceType::Cannon, 2),
            (PieceType::Soldier, 5),
        ]);
        assert_eq!(material_index(&full), 2915);
    }

    #[test]
    fn soldier_forces_win_over_lone_general() {
        let soldier = counts(&[(PieceType::Soldier, 1)]);
        let general = counts(&[(PieceType::General, 1)]);
        assert_eq!(forced_win_tier(&soldier, &general), 2);
        assert_eq!(forced_win_tier(&general, &soldier), 0);
        let score = material_score(material_index(&soldier), material_index(&general));
        assert!(score > 0);
    }

    #[test]
    fn same_type_needs_more_pieces() {
        let two = counts(&[(PieceType::Chariot, 2)]);
        let one = counts(&[(PieceType::Chariot, 1)]);
        assert!(forced_win_tier(&two, &one) > 0);
        assert_eq!(forced_win_tier(&one, &one), 0);
        assert_eq!(forced_win_tier(&one, &two), 0);
    }

    #[test]
    fn lone_cannon_is_hunted_by_stronger_types() {
        let cannon = counts(&[(PieceType::Cannon, 1)]);
        let hunters = counts(&[
            (PieceType::Horse, 1),
            (PieceType::Advisor, 1),
            (PieceType::Soldier, 2),
        ]);
        assert_eq!(forced_win_tier(&hunters, &cannon), 2);
        let with_escort = counts(&[(PieceType::Cannon, 1), (PieceType::Soldier, 1)]);
        assert_eq!(forced_win_tier(&hunters, &with_escort), 0);
    }

    #[test]
    fn elimination_rows_and_columns() {
        assert_eq!(material_score(0, 0), 0);
        assert_eq!(material_score(100, 0), ELIMINATION_SCORE);
        assert_eq!(material_score(0, 100), -ELIMINATION_SCORE);
        assert_eq!(material_score(2915, 2915), 0);
    }

    #[test]
    fn sampled_pairs_are_antisymmetric() {
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        for _ in 0..50_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let i = (state % MATERIAL_COMBINATIONS as u64) as usize;
            let j = ((state >> 32) % MATERIAL_COMBINATIONS as u64) as usize;
            if i == 0 || j == 0 {
                continue;
            }
            assert_eq!(material_score(i, j), -material_score(j, i), "pair ({i}, {j})");
        }
    }

    #[test]
    fn short_bytes_are_rejected() {
        assert!(matches!(
            MaterialTable::from_bytes(&[0u8; 16]),
            Err(MaterialTableError::Truncated { actual: 16, .. })
        ));
    }

    #[test]
    fn unloaded_table_reads_zero() {
        let table = MaterialTable::zeroed();
        assert!(!table.is_loaded());
        assert_eq!(table.get(5, 7), 0);
        let position = Position::new();
        assert_eq!(table.lookup(&position, Color::Red), 0);
    }
}
