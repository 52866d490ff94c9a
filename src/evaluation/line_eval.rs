use std::sync::Arc;

use board_game_traits::Color;

use crate::evaluation::{Evaluator, Score};
use crate::position::{Board, Line, LineSet, Shape};
use crate::{Error, Result};

/// How much an open line is worth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Weighting {
    /// Every open line counts 1
    #[default]
    Uniform,
    /// Every open line counts its structural weight, favoring lines through cells that lie on many diagonals
    Diagonal,
}

/// Counts the lines each player can still complete.
///
/// A line with at least one white mark and no black marks is open for white, and vice versa.
/// Lines with marks from both players are dead, and empty lines count for nobody.
/// The score is white's open lines minus black's open lines.
#[derive(Clone, Debug)]
pub struct LineEvaluator {
    lines: Arc<LineSet>,
    weighting: Weighting,
}

impl LineEvaluator {
    pub fn new(shape: Shape) -> Self {
        Self::with_weighting(shape, Weighting::Uniform)
    }

    pub fn with_weighting(shape: Shape, weighting: Weighting) -> Self {
        LineEvaluator {
            lines: LineSet::for_shape(shape),
            weighting,
        }
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    pub fn lines(&self) -> &LineSet {
        &self.lines
    }

    fn line_value(&self, line: &Line) -> Score {
        match self.weighting {
            Weighting::Uniform => 1,
            Weighting::Diagonal => line.weight(),
        }
    }
}

impl Evaluator for LineEvaluator {
    fn check_shape(&self, shape: Shape) -> Result<()> {
        if shape == self.lines.shape() {
            Ok(())
        } else {
            Err(Error::MalformedPosition {
                expected: self.lines.shape(),
                found: shape,
            })
        }
    }

    fn evaluate<B: Board + ?Sized>(&self, position: &B) -> Score {
        debug_assert_eq!(position.shape(), self.lines.shape());
        let mut score = 0;
        for line in self.lines.lines() {
            let mut has_white = false;
            let mut has_black = false;
            for square in line.squares() {
                match position.cell(*square) {
                    Some(Color::White) => has_white = true,
                    Some(Color::Black) => has_black = true,
                    None => (),
                }
            }
            match (has_white, has_black) {
                (true, false) => score += self.line_value(line),
                (false, true) => score -= self.line_value(line),
                _ => (),
            }
        }
        score
    }

    fn max_score(&self) -> Score {
        match self.weighting {
            Weighting::Uniform => self.lines.len() as Score,
            Weighting::Diagonal => self.lines.total_weight(),
        }
    }
}
