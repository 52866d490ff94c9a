//! Static evaluation of positions that the search doesn't expand further.

use crate::position::{Board, Shape};
use crate::Result;

pub use line_eval::{LineEvaluator, Weighting};

mod line_eval;

/// Heuristic scores, and terminal scores in the search.
pub type Score = i32;

pub trait Evaluator {
    /// Checks that positions of this shape can be scored. Called once per search, not per node.
    fn check_shape(&self, shape: Shape) -> Result<()>;

    /// Static score of the position from white's (player A's) perspective.
    /// Must be cheap, pure, and bounded by `max_score` in absolute value.
    fn evaluate<B: Board + ?Sized>(&self, position: &B) -> Score;

    /// The largest absolute value `evaluate` can return.
    fn max_score(&self) -> Score;
}
