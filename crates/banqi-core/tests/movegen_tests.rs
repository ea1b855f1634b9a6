use banqi_core::{
    attacks, cannon_attacks, generate_captures, generate_moves, line_mask, sliding_attack,
    Bitboard, Color, Move, PieceType, Position, Square,
};

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

#[test]
fn cannon_table_equals_ray_scan_for_random_occupancies() {
    let mut state = 0x1234_5678u32;
    for _ in 0..20_000 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        for square in Square::all() {
            let occupancy = Bitboard(state);
            assert_eq!(
                cannon_attacks(square, occupancy),
                sliding_attack(square, occupancy)
            );
        }
    }
}

#[test]
fn every_square_mask_covers_rank_and_file() {
    for square in Square::all() {
        let mask = line_mask(square);
        for other in Square::all() {
            let shares_line = other != square
                && (other.rank() == square.rank() || other.file() == square.file());
            assert_eq!(mask.contains(other), shares_line);
        }
    }
}

#[test]
fn ordinary_pieces_step_orthogonally() {
    let position = Position::from_fen("8/3r4/8/8 r").unwrap();
    let d2 = Square::D2;
    let mut targets: Vec<String> = generate_moves(&position, Color::Red)
        .into_iter()
        .filter(|mv| mv.from == d2)
        .map(|mv| mv.to.to_string())
        .collect();
    targets.sort();
    assert_eq!(targets, vec!["C2", "D1", "D3", "E2"]);
}

#[test]
fn rank_order_governs_captures() {
    // Red Horse D2 with Black Chariot above and Black Cannon right.
    let position = Position::from_fen("8/3nC3/3R4/8 r").unwrap();
    let captures = generate_captures(&position, Color::Red);
    assert_eq!(captures.as_slice(), &[Move::step(Square::D2, sq("E2"))]);
}

#[test]
fn decoys_block_and_are_never_taken() {
    let position = Position::from_fen("kD6/8/8/8 r").unwrap();
    assert!(generate_captures(&position, Color::Red).is_empty());
    assert!(attacks(PieceType::Decoy, sq("B1"), position.occupied()).is_empty());
}

#[test]
fn hidden_pieces_screen_but_cannot_be_taken() {
    // Red Cannon A1, hidden B1 and C1, Black Soldier D1.
    let position = Position::from_fen("c??P4/8/8/8 r").unwrap();
    let captures = generate_captures(&position, Color::Red);
    assert!(captures.is_empty(), "C1 is hidden: {captures:?}");

    let moves = generate_moves(&position, Color::Red);
    assert!(moves.contains(&Move::step(Square::A1, sq("A2"))));
    assert!(moves.contains(&Move::flip(sq("B1"))));
    assert!(moves.contains(&Move::flip(sq("C1"))));
}

#[test]
fn cannon_takes_any_rank_beyond_screen() {
    let position = Position::from_fen("cP1K4/8/8/8 r").unwrap();
    let captures = generate_captures(&position, Color::Red);
    assert_eq!(captures.as_slice(), &[Move::step(Square::A1, sq("D1"))]);
}
