use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::constants::{FILE_NB, RANK_NB};
use crate::types::Square;

/// Set of squares, bit `n` standing for square index `n`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u32);

impl Bitboard {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(u32::MAX);

    pub const RANK_1: Self = Self(0x0000_00FF);
    pub const FILE_A: Self = Self(0x0101_0101);

    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.index())
    }

    pub const fn rank(rank: u8) -> Self {
        Self(Self::RANK_1.0 << (rank as usize * FILE_NB))
    }

    pub const fn file(file: u8) -> Self {
        Self(Self::FILE_A.0 << file)
    }

    pub const fn contains(self, square: Square) -> bool {
        self.0 & (1 << square.index()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn set(&mut self, square: Square) {
        self.0 |= 1 << square.index();
    }

    pub fn clear(&mut self, square: Square) {
        self.0 &= !(1 << square.index());
    }

    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square::new_unchecked(self.0.trailing_zeros() as u8))
        }
    }
}

impl Iterator for Bitboard {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        let square = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(square)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Bitboard {}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Self::from_square(square)
    }
}

macro_rules! impl_bit_op {
    ($trait:ident, $fn:ident, $assign:ident, $assign_fn:ident, $op:tt) => {
        impl $trait for Bitboard {
            type Output = Self;
            fn $fn(self, rhs: Self) -> Self {
                Self(self.0 $op rhs.0)
            }
        }

        impl $assign for Bitboard {
            fn $assign_fn(&mut self, rhs: Self) {
                self.0 = self.0 $op rhs.0;
            }
        }
    };
}

impl_bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
impl_bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
impl_bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

/// Every square on the rank and file through `square`, the square itself
/// excluded.
pub fn line_mask(square: Square) -> Bitboard {
    (Bitboard::rank(square.rank()) | Bitboard::file(square.file())) & !Bitboard::from(square)
}

const _: () = assert!(FILE_NB * RANK_NB == u32::BITS as usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_index_order() {
        let bb = Bitboard(0b1010_0001);
        let squares: Vec<usize> = bb.map(Square::index).collect();
        assert_eq!(squares, vec![0, 5, 7]);
    }

    #[test]
    fn line_mask_has_ten_bits() {
        for square in Square::all() {
            let mask = line_mask(square);
            assert_eq!(mask.count(), 10, "square {square}");
            assert!(!mask.contains(square));
        }
    }

    #[test]
    fn rank_and_file_masks() {
        assert_eq!(Bitboard::rank(3).0, 0xFF00_0000);
        assert_eq!(Bitboard::file(7).count(), 4);
        assert!(Bitboard::file(3).contains(Square::D2));
    }
}
