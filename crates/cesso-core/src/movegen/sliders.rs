//! Sliding piece (bishop, rook, queen) move generation.

use crate::attacks::{bishop_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::pins::PinInfo;
use super::MoveList;

/// Generate legal slider moves (bishops, rooks, queens) whose destination
/// lies in `target_mask` (intersected with `check_mask`).
///
/// A slider pinned along a ray may only continue along that same ray;
/// [`PinInfo::allowed_ray`] already degenerates to `Bitboard::FULL` for an
/// unpinned piece.
pub(super) fn gen_sliders(
    board: &Board,
    pins: PinInfo,
    check_mask: Bitboard,
    target_mask: Bitboard,
    list: &mut MoveList,
) {
    gen_slider_kind(board, pins, check_mask, target_mask, list, PieceKind::Bishop, bishop_attacks);
    gen_slider_kind(board, pins, check_mask, target_mask, list, PieceKind::Rook, rook_attacks);
    gen_slider_kind(board, pins, check_mask, target_mask, list, PieceKind::Queen, |sq, occ| {
        rook_attacks(sq, occ) | bishop_attacks(sq, occ)
    });
}

#[allow(clippy::too_many_arguments)]
fn gen_slider_kind(
    board: &Board,
    pins: PinInfo,
    check_mask: Bitboard,
    target_mask: Bitboard,
    list: &mut MoveList,
    kind: PieceKind,
    attacks_fn: impl Fn(Square, Bitboard) -> Bitboard,
) {
    let us = board.side_to_move();
    let occupied = board.occupied();
    let mut pieces = board.pieces(kind) & board.side(us);

    while let Some((src, rest)) = pieces.pop_lsb() {
        pieces = rest;
        let mut targets = attacks_fn(src, occupied) & target_mask & check_mask & pins.allowed_ray(src);
        while let Some((dst, rest2)) = targets.pop_lsb() {
            targets = rest2;
            list.push(Move::new(src, dst));
        }
    }
}
