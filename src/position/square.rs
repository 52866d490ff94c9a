use std::fmt;

use arrayvec::ArrayVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MAX_DIMENSIONS: usize = 6;
pub const MAX_SIDE: u8 = 16;
pub const MAX_SQUARES: usize = 4096;

/// Coordinates of a square, one entry per dimension. The first entry varies fastest.
pub type Coords = ArrayVec<u8, MAX_DIMENSIONS>;

/// The geometry of a hypercube board: `side` cells along each of `dimensions` axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    dimensions: u8,
    side: u8,
}

impl Shape {
    /// Regular 3x3 tic-tac-toe
    pub const TIC_TAC_TOE: Shape = Shape {
        dimensions: 2,
        side: 3,
    };

    /// 4x4x4 tic-tac-toe
    pub const QUBIC: Shape = Shape {
        dimensions: 3,
        side: 4,
    };

    pub fn new(dimensions: u8, side: u8) -> Result<Self> {
        let invalid = || Error::InvalidShape { dimensions, side };
        if dimensions == 0 || dimensions as usize > MAX_DIMENSIONS || !(2..=MAX_SIDE).contains(&side)
        {
            return Err(invalid());
        }
        (side as usize)
            .checked_pow(dimensions as u32)
            .filter(|n| *n <= MAX_SQUARES)
            .ok_or_else(invalid)?;
        Ok(Shape { dimensions, side })
    }

    pub const fn dimensions(self) -> u8 {
        self.dimensions
    }

    pub const fn side(self) -> u8 {
        self.side
    }

    pub fn num_squares(self) -> usize {
        (self.side as usize).pow(self.dimensions as u32)
    }

    /// Number of distinct winning lines, `((K + 2)^d - K^d) / 2`.
    pub fn num_lines(self) -> usize {
        let k = self.side as usize;
        let d = self.dimensions as u32;
        ((k + 2).pow(d) - k.pow(d)) / 2
    }

    pub fn contains(self, square: Square) -> bool {
        (square.into_inner() as usize) < self.num_squares()
    }

    pub fn square_from_coords(self, coords: &[u8]) -> Result<Square> {
        if coords.len() != self.dimensions as usize || coords.iter().any(|c| *c >= self.side) {
            return Err(Error::InvalidCoordinates {
                coords: coords.to_vec(),
                shape: self,
            });
        }
        let index = coords
            .iter()
            .rev()
            .fold(0usize, |acc, c| acc * self.side as usize + *c as usize);
        Ok(Square::from_u16(index as u16))
    }

    pub fn coords(self, square: Square) -> Coords {
        let mut index = square.into_inner() as usize;
        let side = self.side as usize;
        (0..self.dimensions)
            .map(|_| {
                let c = index % side;
                index /= side;
                c as u8
            })
            .collect()
    }

    /// Iterates over all squares of the shape, in index order.
    pub fn squares(self) -> impl Iterator<Item = Square> {
        (0..self.num_squares()).map(|i| Square::from_u16(i as u16))
    }

    /// Parses a square either as a flat index (`"5"`) or as comma-separated coordinates (`"2,1"`).
    pub fn parse_square(self, input: &str) -> Result<Square> {
        let input = input.trim();
        let parse_error = || Error::InvalidSquare {
            input: input.to_string(),
            shape: self,
        };
        if input.contains(',') {
            let coords = input
                .split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<std::result::Result<Vec<u8>, _>>()
                .map_err(|_| parse_error())?;
            self.square_from_coords(&coords)
        } else {
            let index: u16 = input.parse().map_err(|_| parse_error())?;
            let square = Square::from_u16(index);
            if self.contains(square) {
                Ok(square)
            } else {
                Err(parse_error())
            }
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.dimensions {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{}", self.side)?;
        }
        Ok(())
    }
}

/// A cell of the board, as a flat index. Only meaningful together with a `Shape`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square {
    inner: u16,
}

impl Square {
    pub const fn from_u16(inner: u16) -> Self {
        Square { inner }
    }

    pub const fn into_inner(self) -> u16 {
        self.inner
    }

    pub const fn index(self) -> usize {
        self.inner as usize
    }

    /// Formats the square as `index (c0,c1,..)`
    pub fn display_with_shape(self, shape: Shape) -> String {
        let coords: Vec<String> = shape.coords(self).iter().map(|c| c.to_string()).collect();
        format!("{} ({})", self.inner, coords.join(","))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
