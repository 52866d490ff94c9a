//! Minimax search with alpha-beta pruning for tic-tac-toe on hypercube boards:
//! regular 3x3 tic-tac-toe, 4x4x4 tic-tac-toe, and any other K^d board where a full line of K marks wins.

pub mod error;
pub mod evaluation;
pub mod minmax;
pub mod position;
pub mod search;
mod tests;

pub use error::{Error, Result};
