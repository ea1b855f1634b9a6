pub mod alphabeta;
pub mod classical;
pub mod material;
pub mod montecarlo;
pub mod ordering;
pub mod time_control;
pub mod tt;

pub use alphabeta::{
    AlphaBetaConfig, AlphaBetaResult, AlphaBetaSearcher, ChanceValue, FORCE_WIN_THRESHOLD,
    WIN_SCORE,
};
pub use classical::{MaterialEval, TableEval};
pub use material::{MaterialTable, MaterialTableError, DEFAULT_TABLE_PATH};
pub use montecarlo::{MonteCarloConfig, MonteCarloSearcher};
pub use ordering::HistoryTable;
pub use time_control::TimeConfig;
pub use tt::{Bound, Entry as TTEntry, Probe, TranspositionTable};

/// Installs a stderr `tracing` subscriber filtered by `RUST_LOG`, defaulting
/// to `info`. Stdout stays free for protocol lines.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
