//! Single-threaded, synchronous UCI command loop.

use std::io::{self, BufRead};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{debug, info, warn};

use cesso_core::Board;
use cesso_engine::{SearchControl, Searcher};

use crate::command::{parse_command, Command};
use crate::error::UciError;

/// The UCI engine, holding current board state and searcher.
///
/// Processes one command at a time on the calling thread; `go` blocks
/// until the search completes or `stop` sets the cooperative stop flag.
pub struct UciEngine {
    board: Board,
    searcher: Searcher,
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new() -> Self {
        Self { board: Board::starting_position(), searcher: Searcher::new() }
    }

    /// Run the UCI command loop, reading from stdin until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(cmd = %trimmed, "received UCI command");

            match parse_command(trimmed) {
                Ok(Command::Uci) => self.handle_uci(),
                Ok(Command::IsReady) => self.handle_isready(),
                Ok(Command::UciNewGame) => self.handle_ucinewgame(),
                Ok(Command::Position(board)) => self.handle_position(board),
                Ok(Command::GoDepth { depth }) => self.handle_go(depth),
                Ok(Command::Stop) => {}
                Ok(Command::Quit) => break,
                Ok(Command::Unknown(_)) => {}
                Err(e) => warn!(error = %e, "UCI parse error"),
            }
        }

        info!("cesso shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name cesso");
        println!("id author Nicolas Lazaro");
        println!("uciok");
    }

    fn handle_isready(&self) {
        println!("readyok");
    }

    fn handle_ucinewgame(&mut self) {
        self.board = Board::starting_position();
    }

    fn handle_position(&mut self, board: Board) {
        self.board = board;
    }

    fn handle_go(&mut self, depth: u8) {
        let stopped = Arc::new(AtomicBool::new(false));
        let control = SearchControl::new_infinite(stopped);

        let result = self.searcher.search(&self.board, depth, &control, |d, score, nodes, pv| {
            let elapsed_ms = control.elapsed().as_millis().max(1);
            let nps = (nodes as u128 * 1000) / elapsed_ms;
            let pv_str: String = pv
                .iter()
                .filter(|m| !m.is_null())
                .map(|m| m.to_uci())
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "info depth {} score cp {} nodes {} nps {} time {} pv {}",
                d, score, nodes, nps, elapsed_ms, pv_str
            );
        });

        if result.best_move.is_null() {
            println!("bestmove 0000");
        } else {
            println!("bestmove {}", result.best_move.to_uci());
        }
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}
