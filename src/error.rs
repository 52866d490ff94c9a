use thiserror::Error;

use crate::position::Shape;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("position has shape {found}, but the line set was built for {expected}")]
    MalformedPosition { expected: Shape, found: Shape },

    #[error("heuristic scores up to {max_score} can reach win scores of {win_score}")]
    HeuristicOutOfRange { max_score: i32, win_score: i32 },

    #[error("unsupported board shape: {dimensions} dimensions with side {side}")]
    InvalidShape { dimensions: u8, side: u8 },

    #[error("expected {expected} cells for a {shape} board, got {got}")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        shape: Shape,
    },

    #[error("invalid character '{character}' at position {position} in '{input}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        input: String,
    },

    #[error("both players have a complete line in '{position}'")]
    MultipleWinners { position: String },

    #[error("coordinates {coords:?} are outside the {shape} board")]
    InvalidCoordinates { coords: Vec<u8>, shape: Shape },

    #[error("couldn't parse square \"{input}\" on a {shape} board")]
    InvalidSquare { input: String, shape: Shape },

    #[error("square {square} is already occupied")]
    OccupiedSquare { square: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
