//! Iterative-deepening search driver.

pub mod control;
pub mod negamax;

use cesso_core::{Board, Move};

use control::SearchControl;
use negamax::{negamax, PvTable, SearchContext, INF};

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found at the highest completed depth.
    pub best_move: Move,
    /// Second move in the PV — the expected reply.
    pub ponder_move: Option<Move>,
    /// Full principal variation line.
    pub pv: Vec<Move>,
    /// Evaluation score in centipawns from the searching side's perspective.
    pub score: i32,
    /// Total nodes visited during the search.
    pub nodes: u64,
    /// Depth reached.
    pub depth: u8,
}

/// Iterative-deepening alpha-beta searcher.
#[derive(Debug, Default)]
pub struct Searcher;

impl Searcher {
    /// Create a fresh searcher.
    pub fn new() -> Self {
        Self
    }

    /// Run iterative-deepening search up to `max_depth`.
    ///
    /// Calls `on_iter(depth, score, nodes, pv)` after each completed
    /// iteration, allowing the caller to emit UCI `info` lines. At each new
    /// depth the previous iteration's best move is searched first.
    pub fn search<F>(
        &self,
        board: &Board,
        max_depth: u8,
        control: &SearchControl,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(u8, i32, u64, &[Move]),
    {
        let mut work = board.clone();
        let mut ctx =
            SearchContext { nodes: 0, pv: PvTable::new(), control, root_hint: None };

        let mut completed_move = Move::NULL;
        let mut completed_score = -INF;
        let mut completed_depth: u8 = 0;
        let mut completed_pv: Vec<Move> = Vec::new();

        for depth in 1..=max_depth {
            if control.should_stop_iterating() {
                break;
            }

            let score = negamax(&mut work, -INF, INF, depth, 0, &mut ctx);

            if control.should_stop(ctx.nodes) {
                break;
            }

            let pv: Vec<Move> = ctx.pv.root_pv().to_vec();
            if let Some(&first) = pv.first() {
                completed_move = first;
            }
            completed_score = score;
            completed_depth = depth;
            completed_pv = pv;
            ctx.root_hint = Some(completed_move);

            on_iter(depth, score, ctx.nodes, &completed_pv);
        }

        let ponder_move = completed_pv.get(1).copied();

        SearchResult {
            best_move: completed_move,
            ponder_move,
            pv: if completed_pv.is_empty() { vec![completed_move] } else { completed_pv },
            score: completed_score,
            nodes: ctx.nodes,
            depth: completed_depth,
        }
    }
}
