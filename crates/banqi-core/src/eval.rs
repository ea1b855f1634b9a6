use crate::position::Position;
use crate::types::Score;

/// Static evaluation from Red's point of view.
pub trait Evaluator {
    fn evaluate(&self, position: &Position) -> Score;
}
