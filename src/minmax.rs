//! A very simple implementation of the minmax search algorithm, without any pruning.
//! This is not used by the engine itself. It is the reference the alpha-beta search is tested against,
//! and it uses the same scoring, so both must always agree on the value of a position.

use board_game_traits::Color;

use crate::evaluation::{Evaluator, Score};
use crate::position::{Board, MoveGuard, Square};
use crate::search::{from_white, terminal_score, Player};

/// Returns the best move and its value, calculating up to `depth` plies deep.
/// Ties are broken in favor of the first move generated.
pub fn minmax<B: Board + ?Sized, E: Evaluator>(
    position: &mut B,
    evaluator: &E,
    player: Player,
    maximizer: Color,
    depth: u16,
) -> (Option<Square>, Score) {
    minmax_ply(position, evaluator, player, maximizer, depth, 0)
}

fn minmax_ply<B: Board + ?Sized, E: Evaluator>(
    position: &mut B,
    evaluator: &E,
    player: Player,
    maximizer: Color,
    depth: u16,
    ply: u16,
) -> (Option<Square>, Score) {
    if let Some(result) = position.game_result() {
        return (None, terminal_score(result, ply, maximizer));
    }
    if depth == 0 {
        return (None, from_white(evaluator.evaluate(position), maximizer));
    }
    let mut moves = vec![];
    position.generate_moves(&mut moves);

    let color = player.color(maximizer);
    let mut best: Option<(Square, Score)> = None;
    for mv in moves {
        let (_, eval) = {
            let mut child = MoveGuard::new(&mut *position, mv, color);
            minmax_ply(&mut *child, evaluator, player.opponent(), maximizer, depth - 1, ply + 1)
        };
        let improves = match (best, player) {
            (None, _) => true,
            (Some((_, best_eval)), Player::Maximizer) => eval > best_eval,
            (Some((_, best_eval)), Player::Minimizer) => eval < best_eval,
        };
        if improves {
            best = Some((mv, eval));
        }
    }
    match best {
        Some((mv, eval)) => (Some(mv), eval),
        None => (None, 0),
    }
}
