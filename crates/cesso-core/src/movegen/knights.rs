//! Knight move generation.

use crate::attacks::knight_attacks;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece_kind::PieceKind;

use super::pins::PinInfo;
use super::MoveList;

/// Generate legal knight moves whose destination lies in `target_mask`
/// (intersected with `check_mask` to honor check-evasion constraints).
///
/// A pinned knight can never move — no L-shaped step stays on a pin ray —
/// so pinned knights are skipped entirely regardless of direction.
pub(super) fn gen_knights(
    board: &Board,
    pins: PinInfo,
    check_mask: Bitboard,
    target_mask: Bitboard,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let mut knights = board.pieces(PieceKind::Knight) & board.side(us);

    while let Some((src, rest)) = knights.pop_lsb() {
        knights = rest;
        if pins.is_pinned(src) {
            continue;
        }
        let mut targets = knight_attacks(src) & target_mask & check_mask;
        while let Some((dst, rest2)) = targets.pop_lsb() {
            targets = rest2;
            list.push(Move::new(src, dst));
        }
    }
}
