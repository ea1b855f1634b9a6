use rand::Rng;

use crate::types::{Color, Piece, PieceType};

const MOVABLE_NB: usize = PieceType::MOVABLE.len();

/// Multiset of face-down identities still to be revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bag {
    counts: [[u8; MOVABLE_NB]; 2],
}

impl Bag {
    pub const fn empty() -> Self {
        Self {
            counts: [[0; MOVABLE_NB]; 2],
        }
    }

    /// Both full 16-piece sets.
    pub fn full() -> Self {
        let mut bag = Self::empty();
        for color in Color::ALL {
            for piece_type in PieceType::MOVABLE {
                bag.counts[color as usize][piece_type as usize] = piece_type.initial_count();
            }
        }
        bag
    }

    pub fn count(&self, color: Color, piece_type: PieceType) -> u8 {
        if !piece_type.is_movable() {
            return 0;
        }
        self.counts[color as usize][piece_type as usize]
    }

    pub fn count_color(&self, color: Color) -> u32 {
        self.counts[color as usize].iter().map(|&n| u32::from(n)).sum()
    }

    pub fn total(&self) -> u32 {
        self.count_color(Color::Red) + self.count_color(Color::Black)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn add(&mut self, piece: Piece) {
        if let Some(color) = piece.color {
            if piece.piece_type.is_movable() {
                self.counts[color as usize][piece.piece_type as usize] += 1;
            }
        }
    }

    /// Takes one `piece` out; returns false if none was left.
    pub fn remove(&mut self, piece: Piece) -> bool {
        let Some(color) = piece.color else {
            return false;
        };
        if !piece.piece_type.is_movable() {
            return false;
        }
        let slot = &mut self.counts[color as usize][piece.piece_type as usize];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Identities with a nonzero count, each paired with its count.
    pub fn iter(&self) -> impl Iterator<Item = (Piece, u8)> + '_ {
        Color::ALL.into_iter().flat_map(move |color| {
            PieceType::MOVABLE.into_iter().filter_map(move |piece_type| {
                let n = self.counts[color as usize][piece_type as usize];
                (n > 0).then(|| (Piece::new(piece_type, color), n))
            })
        })
    }

    /// Picks an identity weighted by remaining counts without removing it.
    /// An empty bag yields a uniformly random face-up identity.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Piece {
        let total = self.total();
        if total == 0 {
            return random_face_up(rng);
        }
        let mut pick = rng.gen_range(0..total);
        for (piece, n) in self.iter() {
            let n = u32::from(n);
            if pick < n {
                return piece;
            }
            pick -= n;
        }
        random_face_up(rng)
    }

    /// Lowers every count to at most the matching count in `other`.
    pub fn clamp_to(&mut self, other: &Bag) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            for (a, &b) in mine.iter_mut().zip(theirs.iter()) {
                *a = (*a).min(b);
            }
        }
    }
}

pub fn random_face_up<R: Rng + ?Sized>(rng: &mut R) -> Piece {
    let color = if rng.gen::<bool>() {
        Color::Black
    } else {
        Color::Red
    };
    let piece_type = PieceType::MOVABLE[rng.gen_range(0..MOVABLE_NB)];
    Piece::new(piece_type, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn full_bag_holds_thirty_two() {
        let bag = Bag::full();
        assert_eq!(bag.total(), 32);
        assert_eq!(bag.count(Color::Red, PieceType::Soldier), 5);
        assert_eq!(bag.count(Color::Black, PieceType::General), 1);
        assert_eq!(bag.count(Color::Black, PieceType::Decoy), 0);
    }

    #[test]
    fn remove_stops_at_zero() {
        let mut bag = Bag::empty();
        let general = Piece::new(PieceType::General, Color::Red);
        bag.add(general);
        assert!(bag.remove(general));
        assert!(!bag.remove(general));
        assert!(!bag.remove(Piece::HIDDEN));
    }

    #[test]
    fn sample_only_returns_present_identities() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut bag = Bag::empty();
        let cannon = Piece::new(PieceType::Cannon, Color::Black);
        bag.add(cannon);
        bag.add(cannon);
        for _ in 0..50 {
            assert_eq!(bag.sample(&mut rng), cannon);
        }
    }

    #[test]
    fn empty_bag_samples_a_face_up_piece() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let piece = Bag::empty().sample(&mut rng);
            assert!(piece.color.is_some());
            assert!(piece.piece_type.is_movable());
        }
    }

    #[test]
    fn clamp_keeps_minimum() {
        let mut bag = Bag::full();
        let mut seen = Bag::full();
        seen.remove(Piece::new(PieceType::Horse, Color::Red));
        bag.clamp_to(&seen);
        assert_eq!(bag.count(Color::Red, PieceType::Horse), 1);
        assert_eq!(bag.total(), 31);
    }
}
