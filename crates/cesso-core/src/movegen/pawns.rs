//! Pawn move generation.

use crate::attacks::{pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, PromotionPiece};
use crate::color::Color;
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::pins::PinInfo;
use super::MoveList;

/// Generate legal pawn pushes (single, double, and promotion pushes).
pub(super) fn gen_pawn_quiets(board: &Board, pins: PinInfo, check_mask: Bitboard, list: &mut MoveList) {
    let us = board.side_to_move();
    let occupied = board.occupied();
    let empty = !occupied;
    let our_pawns = board.pieces(PieceKind::Pawn) & board.side(us);

    let (push_dir, promo_rank): (i8, Bitboard) = match us {
        Color::White => (8, Bitboard::RANK_8),
        Color::Black => (-8, Bitboard::RANK_1),
    };

    let single_push = if us == Color::White {
        (our_pawns << 8) & empty
    } else {
        (our_pawns >> 8) & empty
    };

    let mut quiet_singles = single_push & !promo_rank & check_mask;
    while let Some((dst, rest)) = quiet_singles.pop_lsb() {
        quiet_singles = rest;
        let src = Square::from_index_unchecked((dst.index() as i8 - push_dir) as u8);
        if pins.allowed_ray(src).contains(dst) {
            list.push(Move::new(src, dst));
        }
    }

    let mut promo_singles = single_push & promo_rank & check_mask;
    while let Some((dst, rest)) = promo_singles.pop_lsb() {
        promo_singles = rest;
        let src = Square::from_index_unchecked((dst.index() as i8 - push_dir) as u8);
        if pins.allowed_ray(src).contains(dst) {
            for promo in PromotionPiece::ALL {
                list.push(Move::new_promotion(src, dst, promo));
            }
        }
    }

    let intermediate = single_push;
    let double_push = if us == Color::White {
        (intermediate << 8) & empty & Bitboard::RANK_4 & check_mask
    } else {
        (intermediate >> 8) & empty & Bitboard::RANK_5 & check_mask
    };

    let mut doubles = double_push;
    while let Some((dst, rest)) = doubles.pop_lsb() {
        doubles = rest;
        let src = Square::from_index_unchecked((dst.index() as i8 - push_dir * 2) as u8);
        if pins.allowed_ray(src).contains(dst) {
            list.push(Move::new(src, dst));
        }
    }
}

/// Generate legal pawn captures, including promotion captures and en passant.
pub(super) fn gen_pawn_captures(
    board: &Board,
    king_sq: Square,
    pins: PinInfo,
    check_mask: Bitboard,
    in_check: bool,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let them = us.flip();
    let enemy = board.side(them);
    let occupied = board.occupied();
    let our_pawns = board.pieces(PieceKind::Pawn) & board.side(us);
    let promo_rank = match us {
        Color::White => Bitboard::RANK_8,
        Color::Black => Bitboard::RANK_1,
    };

    let mut capturing_pawns = our_pawns;
    while let Some((src, rest)) = capturing_pawns.pop_lsb() {
        capturing_pawns = rest;
        let mut targets = pawn_attacks(us, src) & enemy & check_mask & pins.allowed_ray(src);
        while let Some((dst, rest2)) = targets.pop_lsb() {
            targets = rest2;
            if promo_rank.contains(dst) {
                for promo in PromotionPiece::ALL {
                    list.push(Move::new_promotion(src, dst, promo));
                }
            } else {
                list.push(Move::new(src, dst));
            }
        }
    }

    if let Some(ep_sq) = board.en_passant() {
        let mut ep_pawns = pawn_attacks(them, ep_sq) & our_pawns;
        while let Some((src, rest)) = ep_pawns.pop_lsb() {
            ep_pawns = rest;

            let captured_sq = Square::from_index_unchecked(if us == Color::White {
                (ep_sq.index() as u8) - 8
            } else {
                (ep_sq.index() as u8) + 8
            });

            if in_check {
                let resolves = check_mask.contains(ep_sq) || check_mask.contains(captured_sq);
                if !resolves {
                    continue;
                }
            }

            if !pins.allowed_ray(src).contains(ep_sq) {
                continue;
            }

            // Removing both the capturing and captured pawn simultaneously can
            // reveal a rank attack on the king — the one case a per-piece pin
            // ray cannot catch.
            let after_occ = (occupied ^ src.bitboard() ^ captured_sq.bitboard()) | ep_sq.bitboard();
            let their_rook_queen = (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen)) & board.side(them);
            if (rook_attacks(king_sq, after_occ) & their_rook_queen).is_nonempty() {
                continue;
            }

            list.push(Move::new_en_passant(src, ep_sq));
        }
    }
}
