use banqi_core::{Piece, Position};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const MIDGAME: &str = "?aE1n3/2cCp3/PPPPP3/??r?k??K r";
const ENDGAME: &str = "c1P5/8/3k4/R3C3 b";

/// Counts leaves, expanding a flip into every identity still in the bag.
fn perft(position: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0u64;
    for mv in position.moves() {
        if mv.is_flip() {
            let identities: Vec<Piece> = position.bag.iter().map(|(piece, _)| piece).collect();
            for piece in identities {
                position.flip_as(mv.from, piece).expect("flip");
                nodes += perft(position, depth - 1);
                position.unmake_move().expect("unmake");
            }
        } else {
            let mut rng = rand::thread_rng();
            position.make_move(mv, &mut rng).expect("legal move");
            nodes += perft(position, depth - 1);
            position.unmake_move().expect("unmake");
        }
    }
    nodes
}

fn perft_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(10);

    for (name, fen) in [("midgame", MIDGAME), ("endgame", ENDGAME)] {
        for depth in [2u8, 3] {
            let mut position = Position::from_fen(fen).expect("parse");
            group.bench_function(format!("{name}_depth_{depth}"), |b| {
                b.iter(|| perft(&mut position, black_box(depth)))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, perft_benchmarks);
criterion_main!(benches);
