//! Hypercube tic-tac-toe positions, along with the board interface the search is written against.

use std::fmt;
use std::ops::{Deref, DerefMut, Index};
use std::sync::Arc;

use board_game_traits::{Color, GameResult};

pub use lines::{Line, LineSet};
pub use square::{Coords, Shape, Square, MAX_DIMENSIONS, MAX_SIDE, MAX_SQUARES};

use crate::{Error, Result};

mod lines;
mod square;

/// The board operations needed by the search.
///
/// White is player A ("x"), Black is player B ("o"). Implementations must enumerate moves in a
/// deterministic order, and `reverse_move` must exactly undo the latest `do_move`.
pub trait Board {
    fn shape(&self) -> Shape;

    fn cell(&self, square: Square) -> Option<Color>;

    fn side_to_move(&self) -> Color;

    /// Returns `None` while the game is still in progress.
    fn game_result(&self) -> Option<GameResult>;

    /// Adds all legal moves to the provided vector
    fn generate_moves(&self, moves: &mut Vec<Square>);

    fn do_move(&mut self, square: Square, color: Color);

    fn reverse_move(&mut self, square: Square);
}

/// A move applied to a board, which is taken back when the guard is dropped.
///
/// Dereferences to the board, so the position after the move can be inspected and searched further.
pub struct MoveGuard<'a, B: Board + ?Sized> {
    board: &'a mut B,
    square: Square,
}

impl<'a, B: Board + ?Sized> MoveGuard<'a, B> {
    pub fn new(board: &'a mut B, square: Square, color: Color) -> Self {
        board.do_move(square, color);
        MoveGuard { board, square }
    }

    pub fn square(&self) -> Square {
        self.square
    }
}

impl<B: Board + ?Sized> Deref for MoveGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.board
    }
}

impl<B: Board + ?Sized> DerefMut for MoveGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.board
    }
}

impl<B: Board + ?Sized> Drop for MoveGuard<'_, B> {
    fn drop(&mut self) {
        self.board.reverse_move(self.square);
    }
}

/// A tic-tac-toe position on a hypercube board of any supported shape.
#[derive(Clone)]
pub struct Position {
    lines: Arc<LineSet>,
    cells: Vec<Option<Color>>,
    white_count: u16,
    black_count: u16,
    winner: Option<Color>,
    // The square whose placement completed the first line, if it was played on this position.
    // Reversing that square clears the winner again.
    winning_square: Option<Square>,
}

impl Position {
    pub fn start_position(shape: Shape) -> Self {
        Position {
            lines: LineSet::for_shape(shape),
            cells: vec![None; shape.num_squares()],
            white_count: 0,
            black_count: 0,
            winner: None,
            winning_square: None,
        }
    }

    /// Builds a position from one entry per square, in index order.
    pub fn from_cells(shape: Shape, cells: &[Option<Color>]) -> Result<Self> {
        if cells.len() != shape.num_squares() {
            return Err(Error::InvalidBoardLength {
                expected: shape.num_squares(),
                got: cells.len(),
                shape,
            });
        }
        let mut position = Position::start_position(shape);
        position.cells.copy_from_slice(cells);
        position.white_count = cells.iter().filter(|c| **c == Some(Color::White)).count() as u16;
        position.black_count = cells.iter().filter(|c| **c == Some(Color::Black)).count() as u16;

        let owners: Vec<Color> = position
            .lines
            .lines()
            .iter()
            .filter_map(|line| position.line_owner(line))
            .collect();
        if owners.windows(2).any(|pair| pair[0] != pair[1]) {
            return Err(Error::MultipleWinners {
                position: position.to_compact_string(),
            });
        }
        position.winner = owners.first().copied();
        Ok(position)
    }

    /// Parses a position from a string with one character per square, in index order.
    ///
    /// `x` is white (player A), `o` is black (player B), and `.`, `_` or `-` is an empty square.
    /// Whitespace, `/` and `|` are ignored, so rows and layers can be separated freely.
    pub fn parse(shape: Shape, input: &str) -> Result<Self> {
        let cells = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '/' && *c != '|')
            .enumerate()
            .map(|(i, c)| match c {
                'x' | 'X' => Ok(Some(Color::White)),
                'o' | 'O' | '0' => Ok(Some(Color::Black)),
                '.' | '_' | '-' => Ok(None),
                _ => Err(Error::InvalidCellCharacter {
                    character: c,
                    position: i,
                    input: input.to_string(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_cells(shape, &cells)
    }

    pub fn lines(&self) -> &Arc<LineSet> {
        &self.lines
    }

    pub fn cells(&self) -> &[Option<Color>] {
        &self.cells
    }

    pub fn count(&self, color: Color) -> usize {
        match color {
            Color::White => self.white_count as usize,
            Color::Black => self.black_count as usize,
        }
    }

    pub fn empty_squares(&self) -> usize {
        self.cells.len() - self.white_count as usize - self.black_count as usize
    }

    pub fn is_full(&self) -> bool {
        self.empty_squares() == 0
    }

    /// The same position with the marks of the two players exchanged.
    pub fn swap_colors(&self) -> Self {
        Position {
            lines: self.lines.clone(),
            cells: self.cells.iter().map(|cell| cell.map(|c| !c)).collect(),
            white_count: self.black_count,
            black_count: self.white_count,
            winner: self.winner.map(|c| !c),
            winning_square: self.winning_square,
        }
    }

    /// One character per square, as accepted by `Position::parse`
    pub fn to_compact_string(&self) -> String {
        self.cells.iter().map(|cell| cell_char(*cell)).collect()
    }

    fn line_owner(&self, line: &Line) -> Option<Color> {
        let first = self.cells[line.squares()[0].index()]?;
        if line
            .squares()
            .iter()
            .all(|sq| self.cells[sq.index()] == Some(first))
        {
            Some(first)
        } else {
            None
        }
    }
}

fn cell_char(cell: Option<Color>) -> char {
    match cell {
        Some(Color::White) => 'x',
        Some(Color::Black) => 'o',
        None => '.',
    }
}

impl Board for Position {
    fn shape(&self) -> Shape {
        self.lines.shape()
    }

    fn cell(&self, square: Square) -> Option<Color> {
        self.cells[square.index()]
    }

    /// White moves first, so white is to move whenever it doesn't have more marks than black.
    fn side_to_move(&self) -> Color {
        if self.white_count > self.black_count {
            Color::Black
        } else {
            Color::White
        }
    }

    fn game_result(&self) -> Option<GameResult> {
        match self.winner {
            Some(Color::White) => Some(GameResult::WhiteWin),
            Some(Color::Black) => Some(GameResult::BlackWin),
            None if self.is_full() => Some(GameResult::Draw),
            None => None,
        }
    }

    /// Empty squares, in index order
    fn generate_moves(&self, moves: &mut Vec<Square>) {
        moves.extend(
            self.cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_none())
                .map(|(i, _)| Square::from_u16(i as u16)),
        );
    }

    fn do_move(&mut self, square: Square, color: Color) {
        debug_assert!(
            self.cells[square.index()].is_none(),
            "Tried to play on occupied square {}:\n{}",
            square,
            self
        );
        self.cells[square.index()] = Some(color);
        match color {
            Color::White => self.white_count += 1,
            Color::Black => self.black_count += 1,
        }

        if self.winner.is_none()
            && self
                .lines
                .lines_through(square)
                .any(|line| self.line_owner(line) == Some(color))
        {
            self.winner = Some(color);
            self.winning_square = Some(square);
        }
    }

    fn reverse_move(&mut self, square: Square) {
        let color = self.cells[square.index()]
            .take()
            .unwrap_or_else(|| panic!("Tried to reverse move on empty square {}", square));
        match color {
            Color::White => self.white_count -= 1,
            Color::Black => self.black_count -= 1,
        }
        if self.winning_square == Some(square) {
            self.winner = None;
            self.winning_square = None;
        }
    }
}

impl Index<Square> for Position {
    type Output = Option<Color>;

    fn index(&self, square: Square) -> &Self::Output {
        &self.cells[square.index()]
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.cells == other.cells
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    /// Prints one row per line. For three or more dimensions, each 2D layer is separated by a blank line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.shape().side() as usize;
        let layer_size = if self.shape().dimensions() > 1 {
            side * side
        } else {
            side
        };
        for (i, row) in self.cells.chunks(side).enumerate() {
            if i > 0 && (i * side) % layer_size == 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell_char(*cell))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} position, {} to move:", self.shape(), self.side_to_move())?;
        write!(f, "{}", self)
    }
}
