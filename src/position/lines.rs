//! Precomputed winning lines for hypercube boards.
//!
//! A line is K squares in a row along one direction. Directions are the vectors in {-1, 0, 1}^d whose
//! first non-zero component is +1, so that each line is generated exactly once. A line spanning one axis
//! is a row or column, a line spanning several axes is a diagonal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

use super::{Coords, Shape, Square};

lazy_static! {
    static ref LINE_SETS: Mutex<HashMap<Shape, Arc<LineSet>>> = Mutex::new(HashMap::new());
}

/// One way to win: `side` squares in a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    squares: Box<[Square]>,
    span: u8,
    weight: i32,
}

impl Line {
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Number of axes the line moves along. 1 for rows and columns, 2 or more for diagonals.
    pub fn span(&self) -> u8 {
        self.span
    }

    pub fn is_diagonal(&self) -> bool {
        self.span > 1
    }

    /// Structural weight of the line: the sum of its cells' weights.
    /// A cell's weight is one more than the number of diagonals passing through it.
    pub fn weight(&self) -> i32 {
        self.weight
    }
}

/// Every winning line of a shape, along with the lines through each square.
#[derive(Debug)]
pub struct LineSet {
    shape: Shape,
    lines: Vec<Line>,
    lines_through: Vec<Vec<u32>>,
    cell_weights: Vec<i32>,
}

impl LineSet {
    /// Returns the shared line set for `shape`, generating it on first use.
    pub fn for_shape(shape: Shape) -> Arc<LineSet> {
        // The cache is never left half-updated, so a poisoned lock is still usable
        let mut cache = LINE_SETS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(shape)
            .or_insert_with(|| Arc::new(LineSet::new(shape)))
            .clone()
    }

    pub fn new(shape: Shape) -> Self {
        let dimensions = shape.dimensions() as usize;
        let side = shape.side();

        let mut raw_lines: Vec<(Vec<Square>, u8)> = Vec::with_capacity(shape.num_lines());
        for direction in directions(dimensions) {
            let span = direction.iter().filter(|d| **d != 0).count() as u8;
            for start in start_coords(shape, &direction) {
                let squares = (0..side)
                    .map(|step| {
                        let coords: Coords = start
                            .iter()
                            .zip(&direction)
                            .map(|(c, d)| (*c as i16 + *d as i16 * step as i16) as u8)
                            .collect();
                        // Start coordinates are chosen so that every step stays on the board
                        shape
                            .square_from_coords(&coords)
                            .unwrap_or_else(|err| panic!("line left the board: {}", err))
                    })
                    .collect();
                raw_lines.push((squares, span));
            }
        }
        debug_assert_eq!(raw_lines.len(), shape.num_lines());

        let mut diagonals_through = vec![0i32; shape.num_squares()];
        let mut lines_through = vec![vec![]; shape.num_squares()];
        for (i, (squares, span)) in raw_lines.iter().enumerate() {
            for square in squares {
                lines_through[square.index()].push(i as u32);
                if *span > 1 {
                    diagonals_through[square.index()] += 1;
                }
            }
        }
        let cell_weights: Vec<i32> = diagonals_through.iter().map(|n| n + 1).collect();

        let lines = raw_lines
            .into_iter()
            .map(|(squares, span)| {
                let weight = squares.iter().map(|sq| cell_weights[sq.index()]).sum();
                Line {
                    squares: squares.into_boxed_slice(),
                    span,
                    weight,
                }
            })
            .collect();

        LineSet {
            shape,
            lines,
            lines_through,
            cell_weights,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines_through(&self, square: Square) -> impl Iterator<Item = &Line> + '_ {
        self.lines_through[square.index()]
            .iter()
            .map(move |i| &self.lines[*i as usize])
    }

    pub fn cell_weight(&self, square: Square) -> i32 {
        self.cell_weights[square.index()]
    }

    pub fn total_weight(&self) -> i32 {
        self.lines.iter().map(Line::weight).sum()
    }
}

/// All directions in {-1, 0, 1}^d whose first non-zero component is +1.
fn directions(dimensions: usize) -> Vec<Vec<i8>> {
    let mut directions = vec![];
    for n in 0..3usize.pow(dimensions as u32) {
        let mut rest = n;
        let direction: Vec<i8> = (0..dimensions)
            .map(|_| {
                let component = (rest % 3) as i8 - 1;
                rest /= 3;
                component
            })
            .collect();
        if direction.iter().find(|d| **d != 0) == Some(&1) {
            directions.push(direction);
        }
    }
    directions
}

/// Every start coordinate from which `side` steps along `direction` stay on the board.
/// Axes the direction doesn't move along are free, the others must start at an edge.
fn start_coords(shape: Shape, direction: &[i8]) -> Vec<Coords> {
    let side = shape.side();
    let mut starts: Vec<Coords> = vec![Coords::new()];
    for d in direction {
        let choices: Vec<u8> = match d {
            0 => (0..side).collect(),
            1 => vec![0],
            _ => vec![side - 1],
        };
        starts = starts
            .into_iter()
            .flat_map(|start| {
                choices.iter().map(move |c| {
                    let mut next = start.clone();
                    next.push(*c);
                    next
                })
            })
            .collect();
    }
    starts
}
