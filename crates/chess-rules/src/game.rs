//! Game sessions.
//!
//! The [`Game`] struct drives one game through its lifecycle:
//! - turn order and pending promotions
//! - move and position history
//! - half-move clock and full-move number
//! - game end detection, including the history-based draws
//!
//! Every rule question is delegated to the session's [`Rules`]. A rejected
//! move leaves the session exactly as it was.

use chess_core::{CastlingSide, Color, MoveRequest, PieceKind, Square};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::attacks::is_in_check;
use crate::config::{ConfigError, DrawRules, SessionConfig};
use crate::rules::{promote, GameOver, MoveError, MoveInfo, MoveOutcome, RuleSet, Rules, TerminalReason, Variant};
use crate::snapshot::{board_to_snapshot, BoardSnapshot};
use crate::zobrist::{fingerprint, Fingerprint};
use crate::{Board, PieceId};

/// Error type for session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The rules rejected the move.
    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveError),
    /// The request came from the side not on move.
    #[error("it is {expected}'s turn")]
    NotYourTurn { expected: Color },
    /// The game has already ended.
    #[error("the game is already over")]
    GameAlreadyOver,
    /// A promotion must be completed before anything else.
    #[error("the pawn on {0} must be promoted first")]
    PromotionRequired(Square),
    /// Only queen, rook, bishop and knight are promotion choices.
    #[error("cannot promote to {0}")]
    InvalidPromotionChoice(PieceKind),
    /// A promotion choice was given while no promotion is pending.
    #[error("no promotion is pending")]
    NoPromotionPending,
    /// A move in a replayed history was rejected.
    #[error("move {index} of the history is invalid: {source}")]
    InvalidReplayMove {
        index: usize,
        source: Box<GameError>,
    },
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    PromotionPending { square: Square },
    Over(GameOver),
}

/// A move in the game history. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castling: Option<CastlingSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
    #[serde(default)]
    pub en_passant: bool,
    pub timestamp: DateTime<Utc>,
}

impl MoveRecord {
    /// The request that replays this move.
    pub fn request(&self) -> MoveRequest {
        MoveRequest {
            from: self.from,
            to: self.to,
            color: self.color,
            promotion_choice: self.promotion,
        }
    }
}

/// Result of [`Game::submit`], in the shape sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub success: bool,
    pub message: String,
    pub board: BoardSnapshot,
    pub info: MoveInfo,
}

/// A move waiting for its promotion choice.
#[derive(Debug, Clone)]
struct PendingPromotion {
    record: MoveRecord,
    info: MoveInfo,
    irreversible: bool,
}

/// One game under one rule set.
#[derive(Debug, Clone)]
pub struct Game {
    rules: Rules,
    draw_rules: DrawRules,
    board: Board,
    active: Color,
    moves: Vec<MoveRecord>,
    /// Fingerprints of every position reached, the start included.
    positions: Vec<Fingerprint>,
    half_move_clock: u32,
    full_move_number: u32,
    status: GameStatus,
    pending: Option<PendingPromotion>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a classic game from the standard starting position.
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a game from the initial board of `rules`.
    pub fn with_rules(rules: Rules) -> Self {
        let board = rules.initial_board();
        Self::from_board(rules, board, Color::White)
    }

    /// Creates a game from the configured variant and draw rules.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        let mut game = Self::with_rules(config.rules()?);
        game.draw_rules = config.draw_rules();
        Ok(game)
    }

    /// Creates a game from an arbitrary board with `active` to move.
    ///
    /// The position is checked for a finished game right away.
    pub fn from_board(rules: Rules, board: Board, active: Color) -> Self {
        let mut game = Game {
            positions: vec![fingerprint(&board, active)],
            rules,
            draw_rules: DrawRules::default(),
            board,
            active,
            moves: Vec::new(),
            half_move_clock: 0,
            full_move_number: 1,
            status: GameStatus::Playing,
            pending: None,
        };
        if let Some(over) = game.detect_game_over() {
            game.status = GameStatus::Over(over);
        }
        game
    }

    /// Replaces the draw rules.
    pub fn with_draw_rules(mut self, draw_rules: DrawRules) -> Self {
        self.draw_rules = draw_rules;
        self
    }

    /// Rebuilds a session by replaying `moves` from the initial board of
    /// `rules`.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected move with [`GameError::InvalidReplayMove`].
    pub fn load_from_history(rules: Rules, moves: &[MoveRequest]) -> Result<Self, GameError> {
        Self::with_rules(rules).replay(moves)
    }

    /// Plays `moves` on this session in order.
    pub fn replay(mut self, moves: &[MoveRequest]) -> Result<Self, GameError> {
        for (index, request) in moves.iter().enumerate() {
            if let Err(e) = self.make_move(*request) {
                info!(index, error = %e, "replay stopped");
                return Err(GameError::InvalidReplayMove {
                    index,
                    source: Box::new(e),
                });
            }
        }
        info!(moves = moves.len(), variant = %self.rules.variant(), "replayed history");
        Ok(self)
    }

    /// Attempts a move.
    ///
    /// While a promotion is pending, only the pending move itself carrying a
    /// promotion choice is accepted; it completes the promotion.
    pub fn make_move(&mut self, request: MoveRequest) -> Result<MoveInfo, GameError> {
        if let GameStatus::Over(_) = self.status {
            return Err(GameError::GameAlreadyOver);
        }
        if let Some((from, to)) = self.pending.as_ref().map(|p| (p.record.from, p.record.to)) {
            return match request.promotion_choice {
                Some(choice) if request.from == from && request.to == to => self.handle_promotion(choice),
                _ => Err(GameError::PromotionRequired(to)),
            };
        }
        if request.color != self.active {
            return Err(GameError::NotYourTurn {
                expected: self.active,
            });
        }

        let promotes = self.board.piece_at(request.from).map_or(false, |p| {
            p.kind == PieceKind::Pawn && request.to.rank().index() == p.color.promotion_rank()
        });
        let outcome = self.rules.validate_move(&self.board, &request).map_err(|e| {
            debug!(%request, error = %e, "move rejected");
            GameError::from(e)
        })?;
        debug!(%request, "move accepted");
        Ok(self.commit(request, promotes, outcome))
    }

    /// Completes a pending promotion with `choice`.
    pub fn handle_promotion(&mut self, choice: PieceKind) -> Result<MoveInfo, GameError> {
        if let GameStatus::Over(_) = self.status {
            return Err(GameError::GameAlreadyOver);
        }
        let Some(pending) = &self.pending else {
            return Err(GameError::NoPromotionPending);
        };
        if !choice.is_promotion_target() {
            return Err(GameError::InvalidPromotionChoice(choice));
        }

        let mut board = self.board.clone();
        promote(&self.rules, &mut board, pending.record.to, choice, pending.record.color)?;
        let Some(pending) = self.pending.take() else {
            return Err(GameError::NoPromotionPending);
        };
        self.board = board;
        debug!(square = %pending.record.to, %choice, "promotion completed");

        let mut record = pending.record;
        record.promotion = Some(choice);
        let mut info = pending.info;
        info.promotion_pending = false;
        Ok(self.finish_move(record, pending.irreversible, info))
    }

    /// Attempts a move and reports the outcome in client form.
    pub fn submit(&mut self, request: MoveRequest) -> MoveResult {
        match self.make_move(request) {
            Ok(info) => MoveResult {
                success: true,
                message: "move accepted".to_string(),
                board: self.snapshot(),
                info,
            },
            Err(e) => MoveResult {
                success: false,
                message: e.to_string(),
                board: self.snapshot(),
                info: MoveInfo::default(),
            },
        }
    }

    fn commit(&mut self, request: MoveRequest, promotes: bool, outcome: MoveOutcome) -> MoveInfo {
        let MoveOutcome {
            board,
            info,
            irreversible,
            ..
        } = outcome;
        self.board = board;

        let record = MoveRecord {
            from: request.from,
            to: request.to,
            color: request.color,
            captured: info.captured,
            castling: info.castling,
            promotion: request.promotion_choice.filter(|_| promotes),
            en_passant: info.en_passant.map_or(false, |ep| ep.capture),
            timestamp: Utc::now(),
        };

        if info.promotion_pending {
            self.status = GameStatus::PromotionPending { square: request.to };
            self.pending = Some(PendingPromotion {
                record,
                info: info.clone(),
                irreversible,
            });
            debug!(square = %request.to, "promotion pending");
            return info;
        }
        self.finish_move(record, irreversible, info)
    }

    fn finish_move(&mut self, record: MoveRecord, irreversible: bool, mut info: MoveInfo) -> MoveInfo {
        self.moves.push(record);
        if irreversible {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock += 1;
        }
        if self.active == Color::Black {
            self.full_move_number += 1;
        }
        self.active = self.active.opposite();
        self.positions.push(fingerprint(&self.board, self.active));
        self.status = GameStatus::Playing;

        if let Some(over) = self.detect_game_over() {
            info!(result = %over, moves = self.moves.len(), "game over");
            self.status = GameStatus::Over(over);
            info.game_over = Some(over);
        }
        info
    }

    /// Variant and board conditions first, then the history-based draws.
    fn detect_game_over(&self) -> Option<GameOver> {
        if let Some(over) = self.rules.check_game_over(&self.board, self.active) {
            return Some(over);
        }
        if self.draw_rules.fifty_move_rule && self.half_move_clock >= 100 {
            return Some(GameOver::draw(TerminalReason::FiftyMoveRule));
        }
        if self.draw_rules.threefold_repetition && self.repetition_count() >= 3 {
            return Some(GameOver::draw(TerminalReason::ThreefoldRepetition));
        }
        None
    }

    /// Returns the rule set.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Returns the variant being played.
    pub fn variant(&self) -> Variant {
        self.rules.variant()
    }

    /// Returns the draw rules in effect.
    pub fn draw_rules(&self) -> DrawRules {
        self.draw_rules
    }

    /// Returns the current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the current board in snapshot form.
    pub fn snapshot(&self) -> BoardSnapshot {
        board_to_snapshot(&self.board)
    }

    /// Returns the side to move.
    pub fn active_color(&self) -> Color {
        self.active
    }

    /// Returns the lifecycle state.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the result if the game has ended.
    pub fn result(&self) -> Option<GameOver> {
        match self.status {
            GameStatus::Over(over) => Some(over),
            _ => None,
        }
    }

    /// Returns true if the game has ended.
    pub fn is_over(&self) -> bool {
        self.result().is_some()
    }

    /// Returns the square of a pawn waiting for promotion.
    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending.as_ref().map(|p| p.record.to)
    }

    /// Returns the move history.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Returns the move history as replayable requests.
    pub fn move_requests(&self) -> Vec<MoveRequest> {
        self.moves.iter().map(MoveRecord::request).collect()
    }

    /// Returns the half-move clock (plies since the last pawn move or capture).
    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    /// Returns the full-move number, starting at 1.
    pub fn full_move_number(&self) -> u32 {
        self.full_move_number
    }

    /// Returns the fingerprint of the current position.
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.board, self.active)
    }

    /// Returns how many times the current position has occurred.
    pub fn repetition_count(&self) -> usize {
        let current = self.fingerprint();
        self.positions.iter().filter(|&&fp| fp == current).count()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        is_in_check(&self.board, self.active)
    }

    /// Returns every legal move for the side to move. Empty once the game is
    /// over or while a promotion is pending.
    pub fn legal_moves(&self) -> Vec<MoveRequest> {
        match self.status {
            GameStatus::Playing => self.rules.legal_moves(&self.board, self.active),
            _ => Vec::new(),
        }
    }
}
