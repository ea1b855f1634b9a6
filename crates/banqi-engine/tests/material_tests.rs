use std::sync::Arc;

use banqi_core::{Color, Evaluator, Position};
use banqi_engine::material::{
    material_counts, material_index, material_score, MaterialTableError, ELIMINATION_SCORE,
    MATERIAL_COMBINATIONS,
};
use banqi_engine::{MaterialTable, TableEval};

#[test]
fn generated_table_matches_scores_and_round_trips() {
    let table = MaterialTable::generate();
    assert!(table.is_loaded());

    for mine in (1..MATERIAL_COMBINATIONS).step_by(37) {
        for theirs in (1..MATERIAL_COMBINATIONS).step_by(41) {
            assert_eq!(table.get(mine, theirs), material_score(mine, theirs));
            assert_eq!(table.get(mine, theirs), -table.get(theirs, mine));
        }
        assert_eq!(table.get(mine, 0), ELIMINATION_SCORE);
        assert_eq!(table.get(0, mine), -ELIMINATION_SCORE);
    }

    let path = std::env::temp_dir().join(format!("banqi-material-{}.bin", std::process::id()));
    table.write_to(&path).unwrap();
    let loaded = MaterialTable::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    for (mine, theirs) in [(1, 2), (2915, 17), (1000, 2000), (42, 42)] {
        assert_eq!(loaded.get(mine, theirs), table.get(mine, theirs));
    }

    // General against a lone Soldier: the Soldier's side is never losing.
    let position = Position::from_fen("p7/8/8/7K r").unwrap();
    let red = material_index(&material_counts(&position, Color::Red));
    let black = material_index(&material_counts(&position, Color::Black));
    assert!(table.get(red, black) > 0);
    assert!(TableEval::new(Arc::new(table)).evaluate(&position).0 > 0);
}

#[test]
fn truncated_file_is_an_error() {
    let path = std::env::temp_dir().join(format!("banqi-short-{}.bin", std::process::id()));
    std::fs::write(&path, [0u8; 64]).unwrap();
    let result = MaterialTable::load(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(
        result,
        Err(MaterialTableError::Truncated { actual: 64, .. })
    ));
}

#[test]
fn missing_file_loads_as_zeros() {
    let table = MaterialTable::load_or_zeroed("does-not-exist.bin");
    assert!(!table.is_loaded());
    assert_eq!(table.get(5, 9), 0);
    assert!(matches!(
        MaterialTable::load("does-not-exist.bin"),
        Err(MaterialTableError::Io(_))
    ));
}
