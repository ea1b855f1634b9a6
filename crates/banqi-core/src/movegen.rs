use crate::attacks::attacks;
use crate::position::Position;
use crate::types::{Color, Move, MoveList, Piece, PieceType, Square};

/// Whether a `mover` of `color` may end on a square currently holding `target`.
fn may_land(mover: PieceType, color: Color, target: Option<Piece>) -> bool {
    match target {
        None => true,
        Some(victim) => {
            victim.color == Some(color.opposite()) && mover.can_capture(victim.piece_type)
        }
    }
}

/// All legal steps and flips for `color`, steps first.
pub fn generate_moves(position: &Position, color: Color) -> MoveList {
    let mut moves = MoveList::new();
    let occupied = position.occupied();

    for piece_type in PieceType::MOVABLE {
        for from in position.pieces_by(color, piece_type) {
            for to in attacks(piece_type, from, occupied) {
                if may_land(piece_type, color, position.piece_at(to)) {
                    moves.push(Move::step(from, to));
                }
            }
        }
    }

    for square in position.hidden() {
        moves.push(Move::flip(square));
    }
    moves
}

/// Captures available to `color`.
pub fn generate_captures(position: &Position, color: Color) -> MoveList {
    let mut moves = MoveList::new();
    let occupied = position.occupied();
    let enemies = position.pieces_of(color.opposite());

    for piece_type in PieceType::MOVABLE {
        for from in position.pieces_by(color, piece_type) {
            for to in attacks(piece_type, from, occupied) & enemies {
                if may_land(piece_type, color, position.piece_at(to)) {
                    moves.push(Move::step(from, to));
                }
            }
        }
    }
    moves
}

pub fn is_legal_step(position: &Position, color: Color, mv: Move) -> bool {
    if mv.is_flip() {
        return false;
    }
    let Some(mover) = position.piece_at(mv.from) else {
        return false;
    };
    if mover.color != Some(color) || !mover.piece_type.is_movable() {
        return false;
    }
    attacks(mover.piece_type, mv.from, position.occupied()).contains(mv.to)
        && may_land(mover.piece_type, color, position.piece_at(mv.to))
}

pub fn has_moves(position: &Position, color: Color) -> bool {
    if !position.hidden().is_empty() {
        return true;
    }
    let occupied = position.occupied();
    PieceType::MOVABLE.into_iter().any(|piece_type| {
        position.pieces_by(color, piece_type).any(|from| {
            attacks(piece_type, from, occupied)
                .any(|to| may_land(piece_type, color, position.piece_at(to)))
        })
    })
}

/// Squares a `piece_type` of `color` standing on `from` could move to.
pub fn destinations(
    position: &Position,
    color: Color,
    piece_type: PieceType,
    from: Square,
) -> MoveList {
    let mut moves = MoveList::new();
    for to in attacks(piece_type, from, position.occupied()) {
        if may_land(piece_type, color, position.piece_at(to)) {
            moves.push(Move::step(from, to));
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_offers_thirty_two_flips() {
        let position = Position::new();
        let moves = generate_moves(&position, Color::Red);
        assert_eq!(moves.len(), 32);
        assert!(moves.iter().all(|mv| mv.is_flip()));
        assert!(has_moves(&position, Color::Black));
    }

    #[test]
    fn general_cannot_take_soldier() {
        // Red General on A1, Black Soldier on B1.
        let position = Position::from_fen("kP6/8/8/8 r").unwrap();
        let b1 = Square::parse("B1").unwrap();
        assert!(!is_legal_step(&position, Color::Red, Move::step(Square::A1, b1)));
        assert!(is_legal_step(&position, Color::Black, Move::step(b1, Square::A1)));
        assert!(generate_captures(&position, Color::Red).is_empty());
    }

    #[test]
    fn cannon_jumps_a_screen() {
        // Red Cannon A1, screen B1 (Red Soldier), Black Chariot D1.
        let position = Position::from_fen("cp1R4/8/8/8 r").unwrap();
        let d1 = Square::parse("D1").unwrap();
        let captures = generate_captures(&position, Color::Red);
        assert!(captures.contains(&Move::step(Square::A1, d1)));
    }

    #[test]
    fn dead_side_has_no_moves() {
        // Black General boxed in by Red Soldiers it may not take.
        let position = Position::from_fen("Kp6/p7/8/8 b").unwrap();
        assert!(!has_moves(&position, Color::Black));
        assert!(generate_moves(&position, Color::Black).is_empty());
    }
}
