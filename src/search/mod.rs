//! Depth-limited minimax search with alpha-beta pruning.
//!
//! Scores are from the maximizer's point of view. Won positions are worth `WIN_SCORE` minus the number of plies
//! to reach them from the root, so the search prefers quick wins and slow losses.
//! A heuristic evaluation is used once the search depth runs out.

use std::ops;
use std::time::{Duration, Instant};

use board_game_traits::{Color, GameResult};
use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::evaluation::{Evaluator, Score};
use crate::position::{Board, MoveGuard, Shape, Square, MAX_SQUARES};
use crate::{Error, Result};

/// Value of a won position at the root. Terminal scores are reduced by one for each ply from the root.
pub const WIN_SCORE: Score = 100_000_000;

/// Bound used for the initial search window. Larger than any score.
pub const INFINITY: Score = Score::MAX;

/// Default depth for boards too large to search fully.
pub const DEFAULT_DEPTH: u16 = 3;

/// Whether the score is a forced win or loss, rather than a heuristic estimate.
pub fn is_decisive(value: Score) -> bool {
    value.abs() > WIN_SCORE - MAX_SQUARES as Score
}

/// For a decisive score, the number of plies until the game is decided.
pub fn plies_to_result(value: Score) -> Option<u16> {
    if is_decisive(value) {
        Some((WIN_SCORE - value.abs()) as u16)
    } else {
        None
    }
}

/// Score of a decided game, `ply` plies from the root, from the maximizer's point of view.
pub fn terminal_score(result: GameResult, ply: u16, maximizer: Color) -> Score {
    let white_score = match result {
        GameResult::WhiteWin => WIN_SCORE - ply as Score,
        GameResult::BlackWin => -(WIN_SCORE - ply as Score),
        GameResult::Draw => 0,
    };
    from_white(white_score, maximizer)
}

/// Converts a score from white's point of view to the maximizer's.
pub fn from_white(white_score: Score, maximizer: Color) -> Score {
    match maximizer {
        Color::White => white_score,
        Color::Black => -white_score,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Player {
    Maximizer,
    Minimizer,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Maximizer => Player::Minimizer,
            Player::Minimizer => Player::Maximizer,
        }
    }

    /// Which mark this player places, given the mark of the maximizer.
    pub fn color(self, maximizer: Color) -> Color {
        match self {
            Player::Maximizer => maximizer,
            Player::Minimizer => !maximizer,
        }
    }

    pub fn from_color(color: Color, maximizer: Color) -> Self {
        if color == maximizer {
            Player::Maximizer
        } else {
            Player::Minimizer
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchSettings {
    max_depth: u16,
    time_limit: Option<Duration>,
    maximizer: Color,
    order_root_moves: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            max_depth: DEFAULT_DEPTH,
            time_limit: None,
            maximizer: Color::White,
            order_root_moves: false,
        }
    }
}

impl SearchSettings {
    /// Searches 3x3 tic-tac-toe to the end of the game, and everything else `DEFAULT_DEPTH` plies deep.
    pub fn for_shape(shape: Shape) -> Self {
        if shape == Shape::TIC_TAC_TOE {
            SearchSettings::default().max_depth(shape.num_squares() as u16)
        } else {
            SearchSettings::default()
        }
    }

    pub fn max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Search iteratively deeper until the time runs out or `max_depth` is reached.
    /// The first iteration is always completed, regardless of time.
    pub fn time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// The mark of the player whose score is maximized. Defaults to white.
    pub fn maximizer(mut self, maximizer: Color) -> Self {
        self.maximizer = maximizer;
        self
    }

    /// Try the most promising root moves first, based on the static evaluation after each move.
    /// Among several equally good moves, this changes which one is returned.
    pub fn order_root_moves(mut self, order_root_moves: bool) -> Self {
        self.order_root_moves = order_root_moves;
        self
    }

    pub fn get_max_depth(&self) -> u16 {
        self.max_depth
    }

    pub fn get_time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    pub fn get_maximizer(&self) -> Color {
        self.maximizer
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchStats {
    pub nodes: u64,
    pub evaluations: u64,
    pub cutoffs: u64,
}

impl ops::AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
        self.evaluations += rhs.evaluations;
        self.cutoffs += rhs.cutoffs;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchResult {
    /// `None` if the position was already decided, or the search depth was 0
    pub best_move: Option<Square>,
    pub value: Score,
    pub depth_reached: u16,
    /// Totals over all completed and aborted iterations
    pub stats: SearchStats,
}

pub struct SearchEngine<E> {
    evaluator: E,
    settings: SearchSettings,
}

impl<E: Evaluator> SearchEngine<E> {
    pub fn new(evaluator: E, settings: SearchSettings) -> Self {
        SearchEngine {
            evaluator,
            settings,
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Finds the best move for `to_move`. The position is restored before returning.
    ///
    /// Among equally good moves, the first one in the board's move order is chosen.
    pub fn search<B: Board + ?Sized>(&self, position: &mut B, to_move: Color) -> Result<SearchResult> {
        self.check_position(position)?;
        let start_time = Instant::now();
        let deadline = self.settings.time_limit.map(|limit| start_time + limit);
        let player = Player::from_color(to_move, self.settings.maximizer);
        let max_depth = self.settings.max_depth;

        let mut moves = vec![];
        position.generate_moves(&mut moves);
        let last_useful_depth = moves.len() as u16;

        let first_depth = if deadline.is_some() {
            max_depth.min(1)
        } else {
            max_depth
        };
        let mut searcher = Searcher::new(self, first_depth, None);
        let (best_move, value) = without_deadline(searcher.search_root(position, player, first_depth));
        let mut result = SearchResult {
            best_move,
            value,
            depth_reached: first_depth,
            stats: searcher.stats,
        };
        self.log_iteration(&result, start_time);

        for depth in (first_depth + 1)..=max_depth {
            if is_decisive(result.value) || result.depth_reached >= last_useful_depth {
                break;
            }
            let mut searcher = Searcher::new(self, depth, deadline);
            let outcome = searcher.search_root(position, player, depth);
            result.stats += searcher.stats;
            match outcome {
                Some((best_move, value)) => {
                    result.best_move = best_move;
                    result.value = value;
                    result.depth_reached = depth;
                    self.log_iteration(&result, start_time);
                }
                None => {
                    debug!(
                        "Out of time during depth {} after {:.3}s, keeping depth {}",
                        depth,
                        start_time.elapsed().as_secs_f64(),
                        result.depth_reached
                    );
                    break;
                }
            }
        }

        info!(
            "Chose {} with value {} at depth {} in {:.3}s",
            result
                .best_move
                .map(|mv| mv.display_with_shape(position.shape()))
                .unwrap_or_else(|| "no move".to_string()),
            result.value,
            result.depth_reached,
            start_time.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    /// The minimax value of the position with `player` to move, searched `depth` plies deep.
    ///
    /// If the true value is within `(alpha, beta)` it is returned exactly. Otherwise, the result is a bound:
    /// at most `alpha` if the true value is at most `alpha`, at least `beta` if it is at least `beta`.
    pub fn search_window<B: Board + ?Sized>(
        &self,
        position: &mut B,
        player: Player,
        depth: u16,
        alpha: Score,
        beta: Score,
    ) -> Result<Score> {
        self.check_position(position)?;
        let mut searcher = Searcher::new(self, depth, None);
        Ok(without_deadline(
            searcher.alpha_beta(position, player, depth, alpha, beta),
        ))
    }

    /// Fails if the position doesn't match the evaluator, or if heuristic scores could be confused with wins.
    pub fn check_position<B: Board + ?Sized>(&self, position: &B) -> Result<()> {
        self.evaluator.check_shape(position.shape())?;
        let max_plies = position.shape().num_squares() as i64;
        let max_score = self.evaluator.max_score();
        if max_score as i64 * (max_plies + 1) >= WIN_SCORE as i64 {
            return Err(Error::HeuristicOutOfRange {
                max_score,
                win_score: WIN_SCORE,
            });
        }
        Ok(())
    }

    fn log_iteration(&self, result: &SearchResult, start_time: Instant) {
        debug!(
            "Depth {}: best move {}, value {}, {} nodes, {} evaluations, {} cutoffs, {:.3}s",
            result.depth_reached,
            result
                .best_move
                .map(|mv| mv.to_string())
                .unwrap_or_else(|| "none".to_string()),
            result.value,
            result.stats.nodes,
            result.stats.evaluations,
            result.stats.cutoffs,
            start_time.elapsed().as_secs_f64()
        );
    }
}

fn without_deadline<T>(outcome: Option<T>) -> T {
    outcome.unwrap_or_else(|| unreachable!("searches without a deadline are never aborted"))
}

/// State for a single fixed-depth search
struct Searcher<'a, E> {
    evaluator: &'a E,
    maximizer: Color,
    order_root_moves: bool,
    root_depth: u16,
    deadline: Option<Instant>,
    stats: SearchStats,
}

impl<'a, E: Evaluator> Searcher<'a, E> {
    fn new(engine: &'a SearchEngine<E>, root_depth: u16, deadline: Option<Instant>) -> Self {
        Searcher {
            evaluator: &engine.evaluator,
            maximizer: engine.settings.maximizer,
            order_root_moves: engine.settings.order_root_moves,
            root_depth,
            deadline,
            stats: SearchStats::default(),
        }
    }

    /// Searches every root move with an exact window, so that the returned move is the first one reaching the best value.
    /// Returns `None` if the deadline was reached.
    fn search_root<B: Board + ?Sized>(
        &mut self,
        position: &mut B,
        player: Player,
        depth: u16,
    ) -> Option<(Option<Square>, Score)> {
        self.stats.nodes += 1;
        if let Some(result) = position.game_result() {
            return Some((None, self.terminal_score(result, 0)));
        }
        if depth == 0 {
            self.stats.evaluations += 1;
            return Some((None, self.static_score(position)));
        }

        let mut moves = vec![];
        position.generate_moves(&mut moves);
        if moves.is_empty() {
            warn!("Board has no legal moves, but no game result. Scoring it as a draw");
            return Some((None, 0));
        }
        if self.order_root_moves {
            self.order_moves(position, player, &mut moves);
        }

        let color = player.color(self.maximizer);
        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut best_move = None;
        let mut best_value = match player {
            Player::Maximizer => -INFINITY,
            Player::Minimizer => INFINITY,
        };

        for mv in moves {
            let value = {
                let mut child = MoveGuard::new(&mut *position, mv, color);
                self.alpha_beta(&mut *child, player.opponent(), depth - 1, alpha, beta)?
            };
            match player {
                Player::Maximizer => {
                    if value > best_value {
                        best_value = value;
                        best_move = Some(mv);
                    }
                    alpha = alpha.max(best_value);
                }
                Player::Minimizer => {
                    if value < best_value {
                        best_value = value;
                        best_move = Some(mv);
                    }
                    beta = beta.min(best_value);
                }
            }
        }

        Some((best_move, best_value))
    }

    /// Fail-soft alpha-beta. Returns `None` if the deadline was reached.
    fn alpha_beta<B: Board + ?Sized>(
        &mut self,
        position: &mut B,
        player: Player,
        depth: u16,
        mut alpha: Score,
        mut beta: Score,
    ) -> Option<Score> {
        self.stats.nodes += 1;
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return None;
            }
        }

        if let Some(result) = position.game_result() {
            return Some(self.terminal_score(result, self.root_depth - depth));
        }
        if depth == 0 {
            self.stats.evaluations += 1;
            return Some(self.static_score(position));
        }

        let mut moves = vec![];
        position.generate_moves(&mut moves);
        if moves.is_empty() {
            warn!("Board has no legal moves, but no game result. Scoring it as a draw");
            return Some(0);
        }

        let color = player.color(self.maximizer);
        match player {
            Player::Maximizer => {
                let mut best_value = -INFINITY;
                for mv in moves {
                    let value = {
                        let mut child = MoveGuard::new(&mut *position, mv, color);
                        self.alpha_beta(&mut *child, Player::Minimizer, depth - 1, alpha, beta)?
                    };
                    best_value = best_value.max(value);
                    alpha = alpha.max(best_value);
                    if alpha >= beta {
                        self.stats.cutoffs += 1;
                        break;
                    }
                }
                Some(best_value)
            }
            Player::Minimizer => {
                let mut best_value = INFINITY;
                for mv in moves {
                    let value = {
                        let mut child = MoveGuard::new(&mut *position, mv, color);
                        self.alpha_beta(&mut *child, Player::Maximizer, depth - 1, alpha, beta)?
                    };
                    best_value = best_value.min(value);
                    beta = beta.min(best_value);
                    if alpha >= beta {
                        self.stats.cutoffs += 1;
                        break;
                    }
                }
                Some(best_value)
            }
        }
    }

    /// Stable sort of the root moves, by the score right after each move, best first for the player to move.
    fn order_moves<B: Board + ?Sized>(&mut self, position: &mut B, player: Player, moves: &mut Vec<Square>) {
        let color = player.color(self.maximizer);
        let mut scored_moves: Vec<(Score, Square)> = Vec::with_capacity(moves.len());
        for mv in moves.iter() {
            let child = MoveGuard::new(&mut *position, *mv, color);
            let score = match child.game_result() {
                Some(result) => self.terminal_score(result, 1),
                None => self.static_score(&*child),
            };
            scored_moves.push((score, *mv));
        }
        self.stats.evaluations += scored_moves.len() as u64;

        scored_moves.sort_by_key(|(score, _)| match player {
            Player::Maximizer => -*score,
            Player::Minimizer => *score,
        });
        moves.clear();
        moves.extend(scored_moves.into_iter().map(|(_, mv)| mv));
    }

    fn terminal_score(&self, result: GameResult, ply: u16) -> Score {
        terminal_score(result, ply, self.maximizer)
    }

    fn static_score<B: Board + ?Sized>(&self, position: &B) -> Score {
        self.from_white(self.evaluator.evaluate(position))
    }

    fn from_white(&self, white_score: Score) -> Score {
        from_white(white_score, self.maximizer)
    }
}
