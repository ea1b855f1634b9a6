use core::mem::size_of;

use banqi_core::Move;

pub const DEFAULT_TT_BITS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Search failed high: the true score is at least `score`.
    Lower,
    /// Search failed low: the true score is at most `score`.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The stored result settles this node.
    Cutoff { score: i32, best_move: Option<Move> },
    /// Keep searching inside the (possibly narrowed) window.
    Miss {
        alpha: i32,
        beta: i32,
        best_move: Option<Move>,
    },
}

/// Direct-mapped table indexed by the low bits of the key.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<Entry>>,
    mask: u64,
}

impl TranspositionTable {
    pub fn with_bits(bits: u32) -> Self {
        let count = 1usize << bits.min(30);
        Self {
            entries: vec![None; count],
            mask: count as u64 - 1,
        }
    }

    /// Largest power-of-two table fitting in `mb` megabytes.
    pub fn with_size_mb(mb: usize) -> Self {
        let entry_size = size_of::<Option<Entry>>().max(1);
        let count = (mb.saturating_mul(1024 * 1024) / entry_size).max(1);
        Self::with_bits(count.ilog2())
    }

    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, key: u64) -> Option<&Entry> {
        self.entries[self.index(key)]
            .as_ref()
            .filter(|entry| entry.key == key)
    }

    pub fn probe(&self, key: u64, mut alpha: i32, mut beta: i32, depth: u8) -> Probe {
        let Some(entry) = self.get(key) else {
            return Probe::Miss {
                alpha,
                beta,
                best_move: None,
            };
        };

        if entry.depth >= depth {
            match entry.bound {
                Bound::Exact => {
                    return Probe::Cutoff {
                        score: entry.score,
                        best_move: entry.best_move,
                    }
                }
                Bound::Lower => alpha = alpha.max(entry.score),
                Bound::Upper => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return Probe::Cutoff {
                    score: entry.score,
                    best_move: entry.best_move,
                };
            }
        }

        Probe::Miss {
            alpha,
            beta,
            best_move: entry.best_move,
        }
    }

    /// Same-key entries are always refreshed; another key's entry is only
    /// replaced by one searched at least as deep.
    pub fn store(&mut self, entry: Entry) {
        let idx = self.index(entry.key);
        match &self.entries[idx] {
            Some(existing) if existing.key != entry.key && existing.depth > entry.depth => {}
            _ => self.entries[idx] = Some(entry),
        }
    }

    fn index(&self, key: u64) -> usize {
        (key & self.mask) as usize
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_bits(DEFAULT_TT_BITS)
    }
}
