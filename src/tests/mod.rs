#[cfg(test)]
mod lines_tests;

#[cfg(test)]
use crate::position::{Board, Position, Shape};
#[cfg(test)]
use rand::seq::SliceRandom;
#[cfg(test)]
use rand::Rng;

/// Plays up to `num_moves` random moves from the start position, stopping early if the game ends.
#[cfg(test)]
fn random_position<R: Rng>(shape: Shape, num_moves: usize, rng: &mut R) -> Position {
    let mut position = Position::start_position(shape);
    let mut moves = vec![];
    for _ in 0..num_moves {
        if position.game_result().is_some() {
            break;
        }
        moves.clear();
        position.generate_moves(&mut moves);
        let mv = *moves
            .choose(rng)
            .unwrap_or_else(|| panic!("No legal moves on board\n{:?}", position));
        let color = position.side_to_move();
        position.do_move(mv, color);
    }
    position
}

#[cfg(test)]
fn parse_3x3(input: &str) -> Position {
    Position::parse(Shape::TIC_TAC_TOE, input)
        .unwrap_or_else(|err| panic!("Failed to parse \"{}\": {}", input, err))
}
