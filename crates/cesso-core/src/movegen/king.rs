//! King move and castling generation.

use crate::attacks::king_attacks;
use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::chess_move::Move;
use crate::color::Color;
use crate::square::Square;

use super::is_attacked;
use super::MoveList;

/// Generate legal king captures.
pub(super) fn gen_king_captures(board: &Board, king_sq: Square, list: &mut MoveList) {
    let us = board.side_to_move();
    let them = us.flip();
    let enemy = board.side(them);
    let occupied_no_king = board.occupied() ^ king_sq.bitboard();

    let mut targets = king_attacks(king_sq) & enemy;
    while let Some((dst, rest)) = targets.pop_lsb() {
        targets = rest;
        if !is_attacked(board, dst, them, occupied_no_king) {
            list.push(Move::new(king_sq, dst));
        }
    }
}

/// Generate legal king quiet moves, including castling.
pub(super) fn gen_king_quiets(board: &Board, king_sq: Square, list: &mut MoveList) {
    let us = board.side_to_move();
    let them = us.flip();
    let empty = !board.occupied();
    // Remove king from occupied so sliding pieces "see through" the king when
    // checking destination safety (prevents the king from blocking its own retreat).
    let occupied_no_king = board.occupied() ^ king_sq.bitboard();

    let mut targets = king_attacks(king_sq) & empty;
    while let Some((dst, rest)) = targets.pop_lsb() {
        targets = rest;
        if !is_attacked(board, dst, them, occupied_no_king) {
            list.push(Move::new(king_sq, dst));
        }
    }

    // Castling — only when not currently in check.
    if is_attacked(board, king_sq, them, board.occupied()) {
        return;
    }

    let castling = board.castling();
    let occupied = board.occupied();

    match us {
        Color::White => {
            if castling.contains(CastleRights::WHITE_KING) {
                let path_clear = !occupied.contains(Square::F1) && !occupied.contains(Square::G1);
                if path_clear
                    && !is_attacked(board, Square::F1, them, occupied)
                    && !is_attacked(board, Square::G1, them, occupied)
                {
                    list.push(Move::new_castle(Square::E1, Square::G1));
                }
            }
            if castling.contains(CastleRights::WHITE_QUEEN) {
                let path_clear = !occupied.contains(Square::B1)
                    && !occupied.contains(Square::C1)
                    && !occupied.contains(Square::D1);
                if path_clear
                    && !is_attacked(board, Square::C1, them, occupied)
                    && !is_attacked(board, Square::D1, them, occupied)
                {
                    list.push(Move::new_castle(Square::E1, Square::C1));
                }
            }
        }
        Color::Black => {
            if castling.contains(CastleRights::BLACK_KING) {
                let path_clear = !occupied.contains(Square::F8) && !occupied.contains(Square::G8);
                if path_clear
                    && !is_attacked(board, Square::F8, them, occupied)
                    && !is_attacked(board, Square::G8, them, occupied)
                {
                    list.push(Move::new_castle(Square::E8, Square::G8));
                }
            }
            if castling.contains(CastleRights::BLACK_QUEEN) {
                let path_clear = !occupied.contains(Square::B8)
                    && !occupied.contains(Square::C8)
                    && !occupied.contains(Square::D8);
                if path_clear
                    && !is_attacked(board, Square::C8, them, occupied)
                    && !is_attacked(board, Square::D8, them, occupied)
                {
                    list.push(Move::new_castle(Square::E8, Square::C8));
                }
            }
        }
    }
}
