//! Move execution via in-place mutation with a reversible undo stack.

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::{Board, Undo};
use crate::castle_rights::CastleRights;
use crate::chess_move::{Move, MoveKind};
use crate::color::Color;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;
use crate::zobrist;

/// Maps each square index to the castling rights that must be removed when
/// that square is the source or destination of any move.
const CASTLE_RIGHTS_REVOKE: [CastleRights; 64] = {
    let mut table = [CastleRights::NONE; 64];
    // E1 (index 4): White king moves — remove both white rights.
    table[Square::E1.index()] = CastleRights::WHITE_BOTH;
    // A1 (index 0): White queenside rook.
    table[Square::A1.index()] = CastleRights::WHITE_QUEEN;
    // H1 (index 7): White kingside rook.
    table[Square::H1.index()] = CastleRights::WHITE_KING;
    // E8 (index 60): Black king moves — remove both black rights.
    table[Square::E8.index()] = CastleRights::BLACK_BOTH;
    // A8 (index 56): Black queenside rook.
    table[Square::A8.index()] = CastleRights::BLACK_QUEEN;
    // H8 (index 63): Black kingside rook.
    table[Square::H8.index()] = CastleRights::BLACK_KING;
    table
};

/// Given a castling move's king destination, return the rook's source/destination squares.
fn castle_rook_squares(king_dst: Square) -> Option<(Square, Square)> {
    match king_dst.index() {
        6 => Some((Square::H1, Square::F1)),  // White kingside
        2 => Some((Square::A1, Square::D1)),  // White queenside
        62 => Some((Square::H8, Square::F8)), // Black kingside
        58 => Some((Square::A8, Square::D8)), // Black queenside
        _ => None,
    }
}

impl Board {
    /// Return `true` if `sq` is attacked by any piece of `by_color`.
    ///
    /// Uses reverse-attack lookup: attack patterns are cast from the target
    /// square and intersected with the attacker's pieces of each type.
    pub fn is_square_attacked(&self, sq: Square, by_color: Color) -> bool {
        self.is_square_attacked_with_occ(sq, by_color, self.occupied())
    }

    /// Return `true` if `sq` is attacked by `by_color`, using a custom `occupied` bitboard.
    ///
    /// Useful for king-move legality checks where the king is temporarily
    /// removed from the occupied set.
    pub(crate) fn is_square_attacked_with_occ(
        &self,
        sq: Square,
        by_color: Color,
        occupied: Bitboard,
    ) -> bool {
        let them = self.side(by_color);

        if (knight_attacks(sq) & them & self.pieces(PieceKind::Knight)).is_nonempty() {
            return true;
        }

        if (king_attacks(sq) & them & self.pieces(PieceKind::King)).is_nonempty() {
            return true;
        }

        // A white pawn on X attacks Y iff pawn_attacks(Black, Y) contains X, so
        // to find attacking pawns of `by_color` we cast from `sq` with the
        // opposite color.
        let opp_color = by_color.flip();
        if (pawn_attacks(opp_color, sq) & them & self.pieces(PieceKind::Pawn)).is_nonempty() {
            return true;
        }

        let rook_queen = (self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen)) & them;
        if (rook_attacks(sq, occupied) & rook_queen).is_nonempty() {
            return true;
        }

        let bishop_queen = (self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen)) & them;
        if (bishop_attacks(sq, occupied) & bishop_queen).is_nonempty() {
            return true;
        }

        false
    }

    /// Apply `mv` in place, pushing enough state onto `history` for a
    /// matching [`Board::unmake`] call to reverse it exactly.
    ///
    /// # Panics
    ///
    /// Panics if the source square is empty.
    pub fn make(&mut self, mv: Move) {
        let us = self.side_to_move();
        let them = us.flip();
        let src = mv.source();
        let dst = mv.dest();

        let moving_piece = self
            .piece_on(src)
            .expect("make: no piece on move source square");

        let is_capture = self.occupied().contains(dst) && !mv.is_castle();
        let captured = if mv.is_en_passant() {
            Some(PieceKind::Pawn)
        } else if is_capture {
            self.piece_on(dst)
        } else {
            None
        };

        let undo = Undo {
            moving_piece,
            captured,
            castling: self.castling(),
            en_passant: self.en_passant(),
            halfmove_clock: self.halfmove_clock(),
            hash: self.hash(),
            cached_pins: self.cached_pins.take(),
            cached_checks: self.cached_checks.take(),
        };

        if let Some(old_ep) = self.en_passant() {
            self.set_hash(self.hash() ^ zobrist::EN_PASSANT_FILE[old_ep.file().index()]);
        }
        self.set_hash(self.hash() ^ zobrist::CASTLING[self.castling().bits() as usize]);
        self.set_en_passant(None);

        match mv.kind() {
            MoveKind::Normal => {
                if is_capture && let Some(captured_kind) = self.piece_on(dst) {
                    self.toggle_piece(dst, captured_kind, them);
                    self.set_hash(
                        self.hash() ^ zobrist::PIECE_SQUARE[Piece::new(captured_kind, them).index()][dst.index()],
                    );
                }

                self.toggle_piece(src, moving_piece, us);
                self.toggle_piece(dst, moving_piece, us);
                let piece_idx = Piece::new(moving_piece, us).index();
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[piece_idx][src.index()]);
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[piece_idx][dst.index()]);

                if moving_piece == PieceKind::Pawn && dst.index().abs_diff(src.index()) == 16 {
                    let ep_idx = if us == Color::White {
                        src.index() + 8
                    } else {
                        src.index() - 8
                    };
                    self.set_en_passant(Square::from_index(ep_idx as u8));
                }
            }

            MoveKind::Promotion => {
                if is_capture && let Some(captured_kind) = self.piece_on(dst) {
                    self.toggle_piece(dst, captured_kind, them);
                    self.set_hash(
                        self.hash() ^ zobrist::PIECE_SQUARE[Piece::new(captured_kind, them).index()][dst.index()],
                    );
                }

                self.toggle_piece(src, PieceKind::Pawn, us);
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[Piece::new(PieceKind::Pawn, us).index()][src.index()]);

                let promo_kind = mv.promotion_piece().to_piece_kind();
                self.toggle_piece(dst, promo_kind, us);
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[Piece::new(promo_kind, us).index()][dst.index()]);
            }

            MoveKind::EnPassant => {
                self.toggle_piece(src, PieceKind::Pawn, us);
                self.toggle_piece(dst, PieceKind::Pawn, us);
                let pawn_idx = Piece::new(PieceKind::Pawn, us).index();
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[pawn_idx][src.index()]);
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[pawn_idx][dst.index()]);

                let captured_idx = if us == Color::White {
                    dst.index() - 8
                } else {
                    dst.index() + 8
                };
                let captured_sq = Square::from_index_unchecked(captured_idx as u8);
                self.toggle_piece(captured_sq, PieceKind::Pawn, them);
                self.set_hash(
                    self.hash() ^ zobrist::PIECE_SQUARE[Piece::new(PieceKind::Pawn, them).index()][captured_sq.index()],
                );
            }

            MoveKind::Castling => {
                self.toggle_piece(src, PieceKind::King, us);
                self.toggle_piece(dst, PieceKind::King, us);
                let king_idx = Piece::new(PieceKind::King, us).index();
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[king_idx][src.index()]);
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[king_idx][dst.index()]);

                let (rook_src, rook_dst) =
                    castle_rook_squares(dst).expect("make: malformed castling move");
                self.toggle_piece(rook_src, PieceKind::Rook, us);
                self.toggle_piece(rook_dst, PieceKind::Rook, us);
                let rook_idx = Piece::new(PieceKind::Rook, us).index();
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[rook_idx][rook_src.index()]);
                self.set_hash(self.hash() ^ zobrist::PIECE_SQUARE[rook_idx][rook_dst.index()]);
            }
        }

        let new_castling = self
            .castling()
            .remove(CASTLE_RIGHTS_REVOKE[src.index()])
            .remove(CASTLE_RIGHTS_REVOKE[dst.index()]);
        self.set_castling(new_castling);
        self.set_hash(self.hash() ^ zobrist::CASTLING[new_castling.bits() as usize]);

        if let Some(ep_sq) = self.en_passant() {
            self.set_hash(self.hash() ^ zobrist::EN_PASSANT_FILE[ep_sq.file().index()]);
        }

        if moving_piece == PieceKind::Pawn || is_capture || mv.kind() == MoveKind::EnPassant {
            self.set_halfmove_clock(0);
        } else {
            self.set_halfmove_clock(self.halfmove_clock() + 1);
        }

        self.set_side_to_move(them);
        self.set_hash(self.hash() ^ zobrist::SIDE_TO_MOVE);

        if us == Color::Black {
            self.set_fullmove_number(self.fullmove_number() + 1);
        }

        self.history.push(undo);
    }

    /// Reverse the most recent [`Board::make`] call.
    ///
    /// `mv` must be exactly the move passed to the matching `make` call —
    /// callers are expected to unmake moves in strict LIFO order.
    ///
    /// # Panics
    ///
    /// Panics if `history` is empty (unmake called without a matching make).
    pub fn unmake(&mut self, mv: Move) {
        let undo = self
            .history
            .pop()
            .expect("unmake called with no matching make");

        let us = self.side_to_move().flip();
        let them = us.flip();
        let src = mv.source();
        let dst = mv.dest();

        match mv.kind() {
            MoveKind::Normal => {
                self.toggle_piece(dst, undo.moving_piece, us);
                self.toggle_piece(src, undo.moving_piece, us);
                if let Some(captured_kind) = undo.captured {
                    self.toggle_piece(dst, captured_kind, them);
                }
            }

            MoveKind::Promotion => {
                let promo_kind = mv.promotion_piece().to_piece_kind();
                self.toggle_piece(dst, promo_kind, us);
                self.toggle_piece(src, PieceKind::Pawn, us);
                if let Some(captured_kind) = undo.captured {
                    self.toggle_piece(dst, captured_kind, them);
                }
            }

            MoveKind::EnPassant => {
                self.toggle_piece(dst, PieceKind::Pawn, us);
                self.toggle_piece(src, PieceKind::Pawn, us);
                let captured_idx = if us == Color::White {
                    dst.index() - 8
                } else {
                    dst.index() + 8
                };
                let captured_sq = Square::from_index_unchecked(captured_idx as u8);
                self.toggle_piece(captured_sq, PieceKind::Pawn, them);
            }

            MoveKind::Castling => {
                self.toggle_piece(dst, PieceKind::King, us);
                self.toggle_piece(src, PieceKind::King, us);
                let (rook_src, rook_dst) =
                    castle_rook_squares(dst).expect("unmake: malformed castling move");
                self.toggle_piece(rook_dst, PieceKind::Rook, us);
                self.toggle_piece(rook_src, PieceKind::Rook, us);
            }
        }

        self.set_castling(undo.castling);
        self.set_en_passant(undo.en_passant);
        self.set_halfmove_clock(undo.halfmove_clock);
        self.set_hash(undo.hash);
        self.cached_pins = undo.cached_pins;
        self.cached_checks = undo.cached_checks;
        self.set_side_to_move(us);

        if us == Color::Black {
            self.set_fullmove_number(self.fullmove_number() - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::Board;
    use crate::castle_rights::CastleRights;
    use crate::chess_move::{Move, PromotionPiece};
    use crate::color::Color;
    use crate::piece_kind::PieceKind;
    use crate::square::Square;

    fn starting() -> Board {
        Board::starting_position()
    }

    /// Apply each move in sequence, returning the resulting board — a small
    /// helper so move-chain tests read the same as the old copy-make style.
    fn play(board: &mut Board, moves: &[Move]) {
        for mv in moves {
            board.make(*mv);
        }
    }

    #[test]
    fn normal_pawn_push_e2e4() {
        let mut board = starting();
        let mv = Move::new(Square::E2, Square::E4);
        board.make(mv);

        assert_eq!(board.piece_on(Square::E4), Some(PieceKind::Pawn));
        assert_eq!(board.color_on(Square::E4), Some(Color::White));
        assert_eq!(board.piece_on(Square::E2), None);
        assert_eq!(board.en_passant(), Some(Square::E3));
        assert_eq!(board.side_to_move(), Color::Black);
    }

    #[test]
    fn capture_resets_clock() {
        // 1.e4 d5 2.exd5
        let mut board = starting();
        play(
            &mut board,
            &[
                Move::new(Square::E2, Square::E4),
                Move::new(Square::D7, Square::D5),
                Move::new(Square::E4, Square::D5),
            ],
        );

        assert_eq!(board.piece_on(Square::D5), Some(PieceKind::Pawn));
        assert_eq!(board.color_on(Square::D5), Some(Color::White));
        assert_eq!(board.piece_on(Square::E4), None);
        assert_eq!(board.halfmove_clock(), 0);
    }

    #[test]
    fn en_passant_capture() {
        // 1.e4 a6 2.e5 d5 3.exd6 e.p.
        let mut board = starting();
        play(
            &mut board,
            &[
                Move::new(Square::E2, Square::E4),
                Move::new(Square::A7, Square::A6),
                Move::new(Square::E4, Square::E5),
                Move::new(Square::D7, Square::D5),
            ],
        );
        assert_eq!(board.en_passant(), Some(Square::D6));

        board.make(Move::new_en_passant(Square::E5, Square::D6));
        assert_eq!(board.piece_on(Square::D6), Some(PieceKind::Pawn));
        assert_eq!(board.color_on(Square::D6), Some(Color::White));
        assert_eq!(board.piece_on(Square::D5), None);
        assert_eq!(board.piece_on(Square::E5), None);
    }

    #[test]
    fn promotion() {
        let mut board: Board = "4k3/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = Move::new_promotion(Square::E7, Square::E8, PromotionPiece::Queen);
        board.make(mv);

        assert_eq!(board.piece_on(Square::E8), Some(PieceKind::Queen));
        assert_eq!(board.color_on(Square::E8), Some(Color::White));
        assert_eq!(board.piece_on(Square::E7), None);
    }

    #[test]
    fn capture_promotion() {
        let mut board: Board = "3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let mv = Move::new_promotion(Square::E7, Square::D8, PromotionPiece::Queen);
        board.make(mv);

        assert_eq!(board.piece_on(Square::D8), Some(PieceKind::Queen));
        assert_eq!(board.color_on(Square::D8), Some(Color::White));
        assert_eq!(board.piece_on(Square::E7), None);
    }

    #[test]
    fn kingside_castling_white() {
        let mut board: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        board.make(Move::new_castle(Square::E1, Square::G1));

        assert_eq!(board.piece_on(Square::G1), Some(PieceKind::King));
        assert_eq!(board.piece_on(Square::F1), Some(PieceKind::Rook));
        assert_eq!(board.piece_on(Square::E1), None);
        assert_eq!(board.piece_on(Square::H1), None);
        assert!(!board.castling().contains(CastleRights::WHITE_KING));
        assert!(!board.castling().contains(CastleRights::WHITE_QUEEN));
        assert!(board.castling().contains(CastleRights::BLACK_KING));
        assert!(board.castling().contains(CastleRights::BLACK_QUEEN));
    }

    #[test]
    fn queenside_castling_white() {
        let mut board: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        board.make(Move::new_castle(Square::E1, Square::C1));

        assert_eq!(board.piece_on(Square::C1), Some(PieceKind::King));
        assert_eq!(board.piece_on(Square::D1), Some(PieceKind::Rook));
        assert_eq!(board.piece_on(Square::E1), None);
        assert_eq!(board.piece_on(Square::A1), None);
    }

    #[test]
    fn rook_move_revokes_castling() {
        let mut board: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        board.make(Move::new(Square::H1, Square::G1));

        assert!(!board.castling().contains(CastleRights::WHITE_KING));
        assert!(board.castling().contains(CastleRights::WHITE_QUEEN));
    }

    #[test]
    fn halfmove_clock_increments_on_quiet() {
        let mut board = starting();
        board.make(Move::new(Square::G1, Square::F3));
        assert_eq!(board.halfmove_clock(), 1);
    }

    #[test]
    fn fullmove_increments_after_black() {
        let mut board = starting();
        assert_eq!(board.fullmove_number(), 1);
        board.make(Move::new(Square::E2, Square::E4));
        assert_eq!(board.fullmove_number(), 1);
        board.make(Move::new(Square::E7, Square::E5));
        assert_eq!(board.fullmove_number(), 2);
    }

    #[test]
    fn is_square_attacked_starting() {
        let board = starting();
        assert!(board.is_square_attacked(Square::E2, Color::White));
        assert!(!board.is_square_attacked(Square::E4, Color::White));
        assert!(!board.is_square_attacked(Square::E4, Color::Black));
    }

    #[test]
    fn is_square_attacked_knight() {
        let board = starting();
        assert!(board.is_square_attacked(Square::F3, Color::White));
        assert!(board.is_square_attacked(Square::F6, Color::Black));
    }

    // --- Incremental Zobrist hash tests ---

    #[test]
    fn incremental_hash_normal_move() {
        let mut board = starting();
        board.make(Move::new(Square::E2, Square::E4));
        assert_eq!(board.hash(), crate::zobrist::hash_from_scratch(&board));
    }

    #[test]
    fn incremental_hash_capture() {
        let mut board = starting();
        play(
            &mut board,
            &[
                Move::new(Square::E2, Square::E4),
                Move::new(Square::D7, Square::D5),
                Move::new(Square::E4, Square::D5),
            ],
        );
        assert_eq!(board.hash(), crate::zobrist::hash_from_scratch(&board));
    }

    #[test]
    fn incremental_hash_en_passant() {
        let mut board = starting();
        play(
            &mut board,
            &[
                Move::new(Square::E2, Square::E4),
                Move::new(Square::A7, Square::A6),
                Move::new(Square::E4, Square::E5),
                Move::new(Square::D7, Square::D5),
            ],
        );
        assert_eq!(board.hash(), crate::zobrist::hash_from_scratch(&board));
        board.make(Move::new_en_passant(Square::E5, Square::D6));
        assert_eq!(board.hash(), crate::zobrist::hash_from_scratch(&board));
    }

    #[test]
    fn incremental_hash_kingside_castling() {
        let mut board: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        board.make(Move::new_castle(Square::E1, Square::G1));
        assert_eq!(board.hash(), crate::zobrist::hash_from_scratch(&board));
    }

    #[test]
    fn incremental_hash_promotion() {
        for promo in crate::chess_move::PromotionPiece::ALL {
            let mut board: Board = "4k3/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
            board.make(Move::new_promotion(Square::E7, Square::E8, promo));
            assert_eq!(
                board.hash(),
                crate::zobrist::hash_from_scratch(&board),
                "hash mismatch for promotion to {:?}",
                promo
            );
        }
    }

    #[test]
    fn transposition_same_hash() {
        let mut path_a = starting();
        play(
            &mut path_a,
            &[
                Move::new(Square::G1, Square::F3),
                Move::new(Square::G8, Square::F6),
                Move::new(Square::B1, Square::C3),
                Move::new(Square::B8, Square::C6),
            ],
        );

        let mut path_b = starting();
        play(
            &mut path_b,
            &[
                Move::new(Square::B1, Square::C3),
                Move::new(Square::B8, Square::C6),
                Move::new(Square::G1, Square::F3),
                Move::new(Square::G8, Square::F6),
            ],
        );

        assert_eq!(path_a.hash(), path_b.hash(), "transposed positions should have equal hashes");
    }

    // --- Unmake round-trip tests ---

    #[test]
    fn unmake_restores_normal_move() {
        let before = starting();
        let mut board = before.clone();
        let mv = Move::new(Square::G1, Square::F3);
        board.make(mv);
        board.unmake(mv);
        assert_eq!(board, before);
    }

    #[test]
    fn unmake_restores_capture() {
        let mut board = starting();
        let before_capture = {
            let mut b = board.clone();
            b.make(Move::new(Square::E2, Square::E4));
            b.make(Move::new(Square::D7, Square::D5));
            b
        };
        board = before_capture.clone();
        let mv = Move::new(Square::E4, Square::D5);
        board.make(mv);
        board.unmake(mv);
        assert_eq!(board, before_capture);
    }

    #[test]
    fn unmake_restores_en_passant() {
        let mut board = starting();
        play(
            &mut board,
            &[
                Move::new(Square::E2, Square::E4),
                Move::new(Square::A7, Square::A6),
                Move::new(Square::E4, Square::E5),
                Move::new(Square::D7, Square::D5),
            ],
        );
        let before = board.clone();
        let mv = Move::new_en_passant(Square::E5, Square::D6);
        board.make(mv);
        board.unmake(mv);
        assert_eq!(board, before);
    }

    #[test]
    fn unmake_restores_promotion_capture() {
        let before: Board = "3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let mut board = before.clone();
        let mv = Move::new_promotion(Square::E7, Square::D8, PromotionPiece::Queen);
        board.make(mv);
        board.unmake(mv);
        assert_eq!(board, before);
    }

    #[test]
    fn unmake_restores_castling() {
        let before: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let mut board = before.clone();
        let mv = Move::new_castle(Square::E1, Square::G1);
        board.make(mv);
        board.unmake(mv);
        assert_eq!(board, before);
    }

    #[test]
    fn unmake_restores_fullmove_and_castling_rights() {
        let before: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let mut board = before.clone();
        let mv = Move::new(Square::H1, Square::G1);
        board.make(mv);
        assert!(!board.castling().contains(CastleRights::WHITE_KING));
        board.unmake(mv);
        assert_eq!(board.castling(), before.castling());
        assert_eq!(board.fullmove_number(), before.fullmove_number());
    }

    #[test]
    fn unmake_stack_is_lifo_over_long_sequence() {
        let before = starting();
        let moves = [
            Move::new(Square::E2, Square::E4),
            Move::new(Square::E7, Square::E5),
            Move::new(Square::G1, Square::F3),
            Move::new(Square::B8, Square::C6),
            Move::new(Square::F1, Square::B5),
            Move::new(Square::A7, Square::A6),
        ];
        let mut board = before.clone();
        for mv in &moves {
            board.make(*mv);
        }
        for mv in moves.iter().rev() {
            board.unmake(*mv);
        }
        assert_eq!(board, before);
        assert!(board.history.is_empty());
    }
}
