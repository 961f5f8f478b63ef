//! Standard chess rules.
//!
//! The functions in this module are the shared algorithm every variant
//! builds on. They are generic over the calling [`RuleSet`] so that piece
//! creation and legality probing go through the variant that asked.

use chess_core::{CastlingSide, Color, MoveRequest, PieceKind, Square};

use super::{EnPassantInfo, GameOver, MoveError, MoveInfo, MoveOutcome, RuleSet, TerminalReason, Variant};
use crate::attacks::is_in_check;
use crate::moves::{castling_plan, possible_moves, requested_castling};
use crate::{Board, Piece};

/// Standard chess rules (FIDE).
///
/// - Standard piece movement
/// - Castling (kingside and queenside)
/// - En passant
/// - Pawn promotion, optionally deferred until a choice is made
/// - Checkmate, stalemate and insufficient material detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classic;

impl RuleSet for Classic {
    fn variant(&self) -> Variant {
        Variant::Classic
    }

    fn initial_board(&self) -> Board {
        Board::standard()
    }

    fn validate_move(&self, board: &Board, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
        validate_with(self, board, request)
    }

    fn create_piece(&self, board: &mut Board, kind: PieceKind, color: Color) -> Piece {
        new_piece(board, kind, color)
    }

    fn check_game_over(&self, board: &Board, to_move: Color) -> Option<GameOver> {
        classic_outcome(self, board, to_move)
    }
}

/// Creates a piece with the next free id of `board`.
pub(crate) fn new_piece(board: &mut Board, kind: PieceKind, color: Color) -> Piece {
    Piece::new(kind, color, board.allocate_id())
}

/// Validates a move with the standard algorithm, rejecting any move that
/// leaves the mover's king in check.
pub(crate) fn validate_with<R: RuleSet + ?Sized>(
    rules: &R,
    board: &Board,
    request: &MoveRequest,
) -> Result<MoveOutcome, MoveError> {
    let outcome = apply_unchecked(rules, board, request)?;
    if is_in_check(&outcome.board, request.color) {
        return Err(MoveError::LeavesKingInCheck(request.color));
    }
    Ok(outcome)
}

/// Plays a move on a clone of `board` without the final king safety test.
///
/// Castling is still refused out of, through or into check. Variants whose
/// captures have side effects run those first and judge king safety on the
/// result.
pub(crate) fn apply_unchecked<R: RuleSet + ?Sized>(
    rules: &R,
    board: &Board,
    request: &MoveRequest,
) -> Result<MoveOutcome, MoveError> {
    let MoveRequest {
        from,
        to,
        color,
        promotion_choice,
    } = *request;

    let piece = *board.piece_at(from).ok_or(MoveError::NoPiece(from))?;
    if piece.color != color {
        return Err(MoveError::WrongColor {
            square: from,
            owner: piece.color,
        });
    }
    if let Some(kind) = promotion_choice {
        if !kind.is_promotion_target() {
            return Err(MoveError::InvalidPromotion(kind));
        }
    }

    if piece.kind == PieceKind::King {
        if let Some(side) = requested_castling(board, color, from, to) {
            return castle(board, color, side);
        }
    }

    let unreachable = MoveError::Unreachable {
        kind: piece.kind,
        from,
        to,
    };
    if !possible_moves(board, from).contains(&to) {
        return Err(unreachable);
    }

    let mut next = board.clone();
    let mut captured = next.remove(to);

    let en_passant_capture =
        piece.kind == PieceKind::Pawn && captured.is_none() && from.file() != to.file();
    if en_passant_capture {
        // The passed pawn stands beside the mover, on the rank it left from.
        let passed = Square::new(to.file(), from.rank());
        match next.piece_at(passed) {
            Some(p) if p.kind == PieceKind::Pawn && p.color != color && p.en_passant_vulnerable => {
                captured = next.remove(passed);
            }
            _ => return Err(unreachable),
        }
    }

    next.clear_en_passant();
    next.remove(from);

    let mut moving = piece;
    moving.has_moved = true;
    let rank_delta = to.rank().index() as i8 - from.rank().index() as i8;
    let double_advance = piece.kind == PieceKind::Pawn && rank_delta.abs() == 2;
    if double_advance {
        moving.en_passant_vulnerable = true;
        next.set_en_passant(from.offset(0, color.pawn_direction()));
    }
    next.place(to, moving);
    next.revoke_stale_castling();

    let mut info = MoveInfo {
        captured: captured.map(|p| p.id),
        ..MoveInfo::default()
    };
    if en_passant_capture || double_advance {
        info.en_passant = Some(EnPassantInfo {
            capture: en_passant_capture,
            target: next.en_passant(),
        });
    }

    if piece.kind == PieceKind::Pawn && to.rank().index() == color.promotion_rank() {
        match promotion_choice {
            Some(kind) => {
                promote(rules, &mut next, to, kind, color)?;
            }
            None => {
                info.promotion_pending = true;
                info.promotion_position = Some(to);
            }
        }
    }

    Ok(MoveOutcome {
        board: next,
        info,
        captured,
        irreversible: piece.kind == PieceKind::Pawn || captured.is_some(),
    })
}

fn castle(board: &Board, color: Color, side: CastlingSide) -> Result<MoveOutcome, MoveError> {
    let plan = castling_plan(board, color, side)
        .map_err(|reason| MoveError::CastlingUnavailable { side, reason })?;

    let mut next = board.clone();
    next.clear_en_passant();
    let (Some(mut king), Some(mut rook)) = (next.remove(plan.king_from), next.remove(plan.rook_from)) else {
        return Err(MoveError::CastlingUnavailable {
            side,
            reason: "king or rook is missing",
        });
    };
    king.has_moved = true;
    rook.has_moved = true;
    next.place(plan.king_to, king);
    next.place(plan.rook_to, rook);

    let mut rights = next.castling_rights();
    rights.remove_color(color);
    next.set_castling_rights(rights);

    Ok(MoveOutcome {
        board: next,
        info: MoveInfo {
            castling: Some(side),
            ..MoveInfo::default()
        },
        captured: None,
        irreversible: false,
    })
}

/// Replaces the pawn on `square` with a freshly created piece of `kind`.
pub(crate) fn promote<R: RuleSet + ?Sized>(
    rules: &R,
    board: &mut Board,
    square: Square,
    kind: PieceKind,
    color: Color,
) -> Result<Piece, MoveError> {
    if !kind.is_promotion_target() {
        return Err(MoveError::InvalidPromotion(kind));
    }
    let mut piece = rules.create_piece(board, kind, color);
    piece.has_moved = true;
    board.place(square, piece);
    Ok(piece)
}

/// Checkmate or stalemate for the side to move, if it has no legal move.
pub(crate) fn standard_outcome<R: RuleSet + ?Sized>(
    rules: &R,
    board: &Board,
    to_move: Color,
) -> Option<GameOver> {
    if rules.has_legal_move(board, to_move) {
        return None;
    }
    if is_in_check(board, to_move) {
        Some(GameOver::win(TerminalReason::Checkmate, to_move.opposite()))
    } else {
        Some(GameOver::draw(TerminalReason::Stalemate))
    }
}

/// Checkmate, then stalemate, then insufficient material.
pub(crate) fn classic_outcome<R: RuleSet + ?Sized>(
    rules: &R,
    board: &Board,
    to_move: Color,
) -> Option<GameOver> {
    standard_outcome(rules, board, to_move).or_else(|| {
        is_insufficient_material(board).then(|| GameOver::draw(TerminalReason::InsufficientMaterial))
    })
}

/// Returns true if neither side can possibly deliver mate.
///
/// That is the case with bare kings, a single knight or bishop against a
/// bare king, or any number of bishops that all stand on one square color.
/// Opposite-colored bishops are not a draw by themselves.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut minors = Vec::new();
    for (sq, piece) in board.pieces() {
        match piece.kind {
            PieceKind::King => {}
            kind if kind.is_minor() => minors.push((kind, sq)),
            _ => return false,
        }
    }
    match minors.as_slice() {
        [] | [_] => true,
        [(_, first), ..] => minors
            .iter()
            .all(|&(kind, sq)| kind == PieceKind::Bishop && sq.is_light() == first.is_light()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn mv(from: &str, to: &str, color: Color) -> MoveRequest {
        MoveRequest::new(sq(from), sq(to), color)
    }

    fn play(board: &Board, moves: &[(&str, &str)]) -> Board {
        let mut board = board.clone();
        let mut color = Color::White;
        for &(from, to) in moves {
            board = Classic
                .validate_move(&board, &mv(from, to, color))
                .unwrap_or_else(|e| panic!("{}{} rejected: {}", from, to, e))
                .board;
            color = color.opposite();
        }
        board
    }

    fn kings() -> Board {
        let mut board = Board::empty();
        board.spawn(Square::E1, PieceKind::King, Color::White);
        board.spawn(Square::E8, PieceKind::King, Color::Black);
        board
    }

    #[test]
    fn simple_pawn_push() {
        let board = Board::standard();
        let outcome = Classic.validate_move(&board, &mv("e2", "e4", Color::White)).unwrap();
        assert!(outcome.board.piece_at(sq("e2")).is_none());
        let pawn = outcome.board.piece_at(sq("e4")).unwrap();
        assert!(pawn.has_moved);
        assert!(pawn.en_passant_vulnerable);
        assert_eq!(outcome.board.en_passant(), Some(sq("e3")));
        assert!(outcome.irreversible);
        assert_eq!(
            outcome.info.en_passant,
            Some(EnPassantInfo {
                capture: false,
                target: Some(sq("e3"))
            })
        );
        // The original board is untouched.
        assert_eq!(board, Board::standard());
    }

    #[test]
    fn rejections() {
        let board = Board::standard();
        assert_eq!(
            Classic.validate_move(&board, &mv("e4", "e5", Color::White)),
            Err(MoveError::NoPiece(sq("e4")))
        );
        assert_eq!(
            Classic.validate_move(&board, &mv("e7", "e5", Color::White)),
            Err(MoveError::WrongColor {
                square: sq("e7"),
                owner: Color::Black
            })
        );
        assert!(matches!(
            Classic.validate_move(&board, &mv("e2", "e5", Color::White)),
            Err(MoveError::Unreachable { .. })
        ));
        assert_eq!(
            Classic.validate_move(&board, &mv("g1", "f3", Color::White).promoting_to(PieceKind::King)),
            Err(MoveError::InvalidPromotion(PieceKind::King))
        );
    }

    #[test]
    fn knight_move_is_reversible() {
        let outcome = Classic
            .validate_move(&Board::standard(), &mv("g1", "f3", Color::White))
            .unwrap();
        assert!(!outcome.irreversible);
        assert_eq!(outcome.info, MoveInfo::default());
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut board = kings();
        board.spawn(sq("e2"), PieceKind::Bishop, Color::White);
        board.spawn(sq("e7"), PieceKind::Rook, Color::Black);
        assert_eq!(
            Classic.validate_move(&board, &mv("e2", "d3", Color::White)),
            Err(MoveError::LeavesKingInCheck(Color::White))
        );
    }

    #[test]
    fn en_passant_capture_removes_passed_pawn() {
        let board = play(
            &Board::standard(),
            &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")],
        );
        let outcome = Classic.validate_move(&board, &mv("e5", "d6", Color::White)).unwrap();
        assert!(outcome.board.piece_at(sq("d5")).is_none());
        assert_eq!(outcome.captured.map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(outcome.board.en_passant(), None);
        assert_eq!(
            outcome.info.en_passant,
            Some(EnPassantInfo {
                capture: true,
                target: None
            })
        );
    }

    #[test]
    fn en_passant_expires_after_one_ply() {
        let board = play(
            &Board::standard(),
            &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5"), ("h2", "h3"), ("h7", "h6")],
        );
        assert!(Classic.validate_move(&board, &mv("e5", "d6", Color::White)).is_err());
    }

    #[test]
    fn castling_by_landing_square_and_by_rook() {
        let mut board = kings();
        board.spawn(Square::H1, PieceKind::Rook, Color::White);
        board.set_castling_rights(crate::CastlingRights::ALL);
        board.revoke_stale_castling();

        for target in [Square::G1, Square::H1] {
            let outcome = Classic
                .validate_move(&board, &MoveRequest::new(Square::E1, target, Color::White))
                .unwrap();
            assert_eq!(outcome.info.castling, Some(CastlingSide::Kingside));
            let king = outcome.board.piece_at(Square::G1).unwrap();
            assert_eq!(king.kind, PieceKind::King);
            assert!(king.has_moved);
            assert_eq!(outcome.board.piece_at(Square::F1).unwrap().kind, PieceKind::Rook);
            assert!(outcome.board.piece_at(Square::H1).is_none());
            assert!(!outcome.board.castling_rights().has(Color::White, CastlingSide::Kingside));
        }
    }

    #[test]
    fn castling_without_right_is_reported() {
        let mut board = kings();
        board.spawn(Square::A1, PieceKind::Rook, Color::White);
        // Rights were never granted.
        assert_eq!(
            Classic.validate_move(&board, &mv("e1", "c1", Color::White)),
            Err(MoveError::CastlingUnavailable {
                side: CastlingSide::Queenside,
                reason: "castling right has been lost"
            })
        );
    }

    #[test]
    fn king_move_revokes_castling_permanently() {
        let board = play(
            &Board::standard(),
            &[("e2", "e4"), ("e7", "e5"), ("e1", "e2"), ("e8", "e7"), ("e2", "e1"), ("e7", "e8")],
        );
        assert!(board.castling_rights().is_empty());
    }

    #[test]
    fn rook_capture_revokes_right() {
        let mut board = kings();
        board.spawn(Square::H1, PieceKind::Rook, Color::White);
        board.spawn(Square::H8, PieceKind::Rook, Color::Black);
        board.set_castling_rights(crate::CastlingRights::ALL);
        board.revoke_stale_castling();
        let outcome = Classic.validate_move(&board, &mv("h1", "h8", Color::White)).unwrap();
        assert!(outcome.board.castling_rights().is_empty());
    }

    #[test]
    fn promotion_with_and_without_choice() {
        let mut board = kings();
        board.spawn(sq("a7"), PieceKind::Pawn, Color::White);

        let pending = Classic.validate_move(&board, &mv("a7", "a8", Color::White)).unwrap();
        assert!(pending.info.promotion_pending);
        assert_eq!(pending.info.promotion_position, Some(sq("a8")));
        assert_eq!(pending.board.piece_at(sq("a8")).unwrap().kind, PieceKind::Pawn);

        let request = mv("a7", "a8", Color::White).promoting_to(PieceKind::Knight);
        let done = Classic.validate_move(&board, &request).unwrap();
        assert!(!done.info.promotion_pending);
        let knight = done.board.piece_at(sq("a8")).unwrap();
        assert_eq!(knight.kind, PieceKind::Knight);
        let old_ids: Vec<_> = board.pieces().map(|(_, p)| p.id).collect();
        assert!(!old_ids.contains(&knight.id));
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let board = play(
            &Board::standard(),
            &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
        );
        assert_eq!(
            Classic.check_game_over(&board, Color::White),
            Some(GameOver::win(TerminalReason::Checkmate, Color::Black))
        );
        assert_eq!(
            Classic.check_game_over(&board, Color::White),
            Classic.check_game_over(&board, Color::White)
        );
    }

    #[test]
    fn stalemate() {
        let mut board = Board::empty();
        board.spawn(Square::H8, PieceKind::King, Color::Black);
        board.spawn(sq("f7"), PieceKind::King, Color::White);
        board.spawn(sq("g6"), PieceKind::Queen, Color::White);
        assert_eq!(
            Classic.check_game_over(&board, Color::Black),
            Some(GameOver::draw(TerminalReason::Stalemate))
        );
        assert_eq!(Classic.check_game_over(&board, Color::White), None);
    }

    #[test]
    fn insufficient_material_cases() {
        let board = kings();
        assert!(is_insufficient_material(&board));

        let mut knight = kings();
        knight.spawn(sq("b1"), PieceKind::Knight, Color::White);
        assert!(is_insufficient_material(&knight));

        let mut two_knights = knight.clone();
        two_knights.spawn(sq("g8"), PieceKind::Knight, Color::Black);
        assert!(!is_insufficient_material(&two_knights));

        let mut same_color = kings();
        same_color.spawn(sq("c1"), PieceKind::Bishop, Color::White);
        same_color.spawn(sq("f8"), PieceKind::Bishop, Color::Black);
        assert!(is_insufficient_material(&same_color));

        let mut opposite = kings();
        opposite.spawn(sq("c1"), PieceKind::Bishop, Color::White);
        opposite.spawn(sq("c8"), PieceKind::Bishop, Color::Black);
        assert!(!is_insufficient_material(&opposite));

        let mut pawn = kings();
        pawn.spawn(sq("a2"), PieceKind::Pawn, Color::White);
        assert!(!is_insufficient_material(&pawn));

        assert_eq!(
            Classic.check_game_over(&same_color, Color::White),
            Some(GameOver::draw(TerminalReason::InsufficientMaterial))
        );
    }
}
