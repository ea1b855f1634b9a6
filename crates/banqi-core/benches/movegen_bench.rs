use banqi_core::{cannon_attacks, generate_moves, Bitboard, Color, Position, Square};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const OPENING: &str = "????????/????????/????????/???????? r";
const MIDGAME: &str = "?aE1n3/2cCp3/PPPPP3/??r?k??K r";
const ENDGAME: &str = "c1P5/8/3k4/R3C3 b";

fn movegen_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");
    group.sample_size(100);

    for (name, fen) in [("opening", OPENING), ("midgame", MIDGAME), ("endgame", ENDGAME)] {
        let position = Position::from_fen(fen).expect("parse");
        group.bench_function(name, |b| {
            b.iter(|| generate_moves(black_box(&position), Color::Red))
        });
    }

    group.bench_function("cannon_table", |b| {
        let occupancy = Bitboard(0x5A3C_81E7);
        b.iter(|| {
            Square::all()
                .map(|square| cannon_attacks(square, black_box(occupancy)).0)
                .fold(0u32, |acc, bits| acc ^ bits)
        })
    });

    group.finish();
}

criterion_group!(benches, movegen_benchmarks);
criterion_main!(benches);
