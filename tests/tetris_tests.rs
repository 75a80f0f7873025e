//! Tetris engine tests
//!
//! Test categories:
//! - Piece movement and collision
//! - Rotation and kicks
//! - Line clearing
//! - Scoring and leveling
//! - Hard drop
//! - Game over detection
//! - Pause and cadence
//! - Render consistency

use arcade::tetris::{
    empty_board, test_helpers::*, Board, Cell, MoveOutcome, PieceProvider, Position,
    SequencePieceProvider, Tetris, TetrisConfig, TetrisEvent, TetrisState, Tetromino,
    TetrominoType, BOARD_HEIGHT, BOARD_WIDTH, LINE_SCORES,
};
use arcade::{Point, TetrisError};

fn game_with(board: Board, piece: Tetromino) -> Tetris {
    Tetris::with_grid(board, piece, sequence(&[TetrominoType::O]))
}

fn fill_row_except(board: &mut Board, y: usize, gaps: &[usize]) {
    for x in 0..BOARD_WIDTH {
        if !gaps.contains(&x) {
            board.set(Point::new(x, y), Cell::Locked(TetrominoType::T));
        }
    }
}

fn locked(board: &Board, x: usize, y: usize) -> bool {
    matches!(board.get(Point::new(x, y)), Some(Cell::Locked(_)))
}

// ============================================================================
// Piece Movement Tests
// ============================================================================

mod piece_movement {
    use super::*;

    #[test]
    fn piece_moves_left_and_right() {
        let mut game = game_with(empty_board(), Tetromino::new(TetrominoType::O));
        let x = game.current_piece().position.x;

        assert_eq!(game.move_piece(-1, 0), Ok(MoveOutcome::Moved));
        assert_eq!(game.current_piece().position.x, x - 1);
        assert_eq!(game.move_piece(1, 0), Ok(MoveOutcome::Moved));
        assert_eq!(game.current_piece().position.x, x);
    }

    #[test]
    fn piece_cannot_move_through_left_wall() {
        // O occupies matrix columns 1 and 2, so x = -1 puts it flush left
        let mut game = game_with(empty_board(), Tetromino::new_at(TetrominoType::O, -1, 5));

        assert_eq!(game.move_piece(-1, 0), Err(TetrisError::Blocked));
        assert_eq!(game.current_piece().position.x, -1);
    }

    #[test]
    fn piece_cannot_move_through_right_wall() {
        let x = BOARD_WIDTH as i16 - 3;
        let mut game = game_with(empty_board(), Tetromino::new_at(TetrominoType::O, x, 5));

        assert_eq!(game.move_piece(1, 0), Err(TetrisError::Blocked));
        assert_eq!(game.current_piece().position.x, x);
    }

    #[test]
    fn piece_cannot_move_sideways_into_locked_cell() {
        let mut board = empty_board();
        board.set(Point::new(6, 10), Cell::Locked(TetrominoType::Z));
        // O cells at (4..=5, 9..=10)
        let mut game = game_with(board, Tetromino::new_at(TetrominoType::O, 3, 8));

        assert_eq!(game.move_piece(1, 0), Err(TetrisError::Blocked));
        assert_eq!(game.current_piece().position, Position { x: 3, y: 8 });
    }

    #[test]
    fn blocked_downward_move_lands_piece() {
        let y = BOARD_HEIGHT as i16 - 3;
        let mut game = game_with(empty_board(), Tetromino::new_at(TetrominoType::O, 3, y));

        match game.move_piece(0, 1) {
            Ok(MoveOutcome::Landed(report)) => {
                assert_eq!(report.lines_cleared, 0);
                assert!(!report.game_over);
            }
            other => panic!("expected landing, got {other:?}"),
        }
        assert!(locked(game.board(), 4, BOARD_HEIGHT - 1));
        assert!(locked(game.board(), 5, BOARD_HEIGHT - 2));
    }

    #[test]
    fn move_emits_event() {
        let mut game = game_with(empty_board(), Tetromino::new(TetrominoType::O));
        game.take_events();

        game.move_piece(-1, 0).unwrap();

        assert!(game.take_events().contains(&TetrisEvent::PieceMoved));
    }
}

// ============================================================================
// Rotation Tests
// ============================================================================

mod rotation {
    use super::*;

    #[test]
    fn piece_rotates_clockwise_in_open_space() {
        let mut game = game_with(empty_board(), Tetromino::new_at(TetrominoType::T, 4, 5));

        game.rotate().unwrap();

        let piece = game.current_piece();
        assert_eq!(piece.rotation, 1);
        assert_eq!(piece.position, Position { x: 4, y: 5 });
        assert_eq!(piece.shape, TetrominoType::T.shape().rotated_cw());
    }

    #[test]
    fn four_rotations_return_to_spawn_shape() {
        let mut game = game_with(empty_board(), Tetromino::new_at(TetrominoType::J, 4, 5));
        for _ in 0..4 {
            game.rotate().unwrap();
        }
        assert_eq!(game.current_piece().rotation, 0);
        assert_eq!(game.current_piece().shape, TetrominoType::J.shape());
    }

    #[test]
    fn vertical_i_against_left_wall_kicks_right() {
        // three quarter turns put the I in matrix column 1
        let piece = Tetromino::new_at(TetrominoType::I, -1, 5)
            .rotated_cw()
            .rotated_cw()
            .rotated_cw();
        let mut game = game_with(empty_board(), piece);
        assert!(game.is_valid_position(game.current_piece()));

        game.rotate().unwrap();

        let piece = game.current_piece();
        assert_eq!(piece.position, Position { x: 0, y: 5 });
        assert_eq!(piece.rotation, 0);
        let xs: Vec<i16> = piece.blocks().iter().map(|b| b.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn rotation_rejected_when_no_kick_fits() {
        // one quarter turn puts the I in matrix column 2, flush with the wall
        let piece = Tetromino::new_at(TetrominoType::I, -2, 5).rotated_cw();
        let mut game = game_with(empty_board(), piece.clone());

        assert_eq!(game.rotate(), Err(TetrisError::Blocked));
        assert_eq!(game.current_piece(), &piece);
    }

    /// First cell of `candidate` that neither `piece` nor `keep_free` covers.
    fn blocker(candidate: &Tetromino, piece: &Tetromino, keep_free: &Tetromino) -> Position {
        let own = piece.blocks();
        let free = keep_free.blocks();
        candidate
            .blocks()
            .into_iter()
            .find(|b| !own.contains(b) && !free.contains(b))
            .expect("candidate has a cell outside both pieces")
    }

    #[test]
    fn locked_cells_push_rotation_to_the_next_kick() {
        let piece = Tetromino::new_at(TetrominoType::T, 4, 5);
        let rotated = piece.rotated_cw();
        let right = rotated.moved(1, 0);

        let mut board = empty_board();
        for candidate in [rotated.clone(), rotated.moved(-1, 0)] {
            let b = blocker(&candidate, &piece, &right);
            board.set(Point::new(b.x as usize, b.y as usize), Cell::Locked(TetrominoType::Z));
        }
        let mut game = game_with(board, piece);
        assert!(!game.is_valid_position(&rotated));
        assert!(!game.is_valid_position(&rotated.moved(-1, 0)));

        game.rotate().unwrap();

        assert_eq!(game.current_piece(), &right);
        assert_eq!(game.current_piece().position, Position { x: 5, y: 5 });
        assert_eq!(game.current_piece().rotation, 1);
    }

    #[test]
    fn boxed_in_piece_cannot_rotate() {
        let piece = Tetromino::new_at(TetrominoType::T, 4, 5);
        let own = piece.blocks();
        let mut board = empty_board();
        for y in 0..BOARD_HEIGHT {
            for x in 0..BOARD_WIDTH {
                if !own.contains(&Position { x: x as i16, y: y as i16 }) {
                    board.set(Point::new(x, y), Cell::Locked(TetrominoType::T));
                }
            }
        }
        let mut game = game_with(board, piece.clone());
        game.take_events();

        assert_eq!(game.rotate(), Err(TetrisError::Blocked));
        assert_eq!(game.current_piece(), &piece);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn rotation_emits_event() {
        let mut game = game_with(empty_board(), Tetromino::new_at(TetrominoType::T, 4, 5));
        game.take_events();

        game.rotate().unwrap();

        assert!(game.take_events().contains(&TetrisEvent::PieceRotated));
    }
}

// ============================================================================
// Line Clearing Tests
// ============================================================================

mod line_clearing {
    use super::*;

    #[test]
    fn single_complete_row_is_cleared() {
        let mut board = empty_board();
        fill_row(&mut board, BOARD_HEIGHT - 1);
        let mut game = game_with(board, Tetromino::new(TetrominoType::O));

        assert_eq!(game.clear_lines(), 1);
        assert_eq!(game.total_filled_cells(), 0);
    }

    #[test]
    fn incomplete_row_not_cleared() {
        let mut board = empty_board();
        fill_row_with_gap(&mut board, BOARD_HEIGHT - 1, 3);
        let mut game = game_with(board, Tetromino::new(TetrominoType::O));

        assert_eq!(game.clear_lines(), 0);
        assert_eq!(game.total_filled_cells(), BOARD_WIDTH - 1);
    }

    #[test]
    fn adjacent_full_rows_are_all_cleared() {
        let mut board = empty_board();
        for y in BOARD_HEIGHT - 4..BOARD_HEIGHT {
            fill_row(&mut board, y);
        }
        let mut game = game_with(board, Tetromino::new(TetrominoType::O));

        assert_eq!(game.clear_lines(), 4);
        assert_eq!(game.total_filled_cells(), 0);
    }

    #[test]
    fn non_contiguous_rows_cleared_and_rest_falls() {
        let mut board = empty_board();
        fill_row(&mut board, 19);
        fill_row_with_gap(&mut board, 18, 0);
        fill_row(&mut board, 17);
        board.set(Point::new(2, 16), Cell::Locked(TetrominoType::S));
        let mut game = game_with(board, Tetromino::new(TetrominoType::O));

        assert_eq!(game.clear_lines(), 2);
        // the gapped row sits on the floor, the lone cell right above it
        assert!(!game.is_row_complete(19));
        assert!(!locked(game.board(), 0, 19));
        assert!(locked(game.board(), 1, 19));
        assert!(locked(game.board(), 2, 18));
        assert_eq!(game.total_filled_cells(), BOARD_WIDTH);
    }

    #[test]
    fn landing_clears_line_and_scores_per_level() {
        let mut board = empty_board();
        fill_row_except(&mut board, BOARD_HEIGHT - 1, &[4, 5]);
        // O cells at (4..=5, 18..=19)
        let mut game = game_with(board, Tetromino::new_at(TetrominoType::O, 3, 17));

        let report = game.hard_drop().unwrap();

        assert_eq!(report.lines_cleared, 1);
        assert_eq!(report.points, 100);
        assert_eq!(game.score(), 100);
        assert_eq!(game.lines_cleared(), 1);
        // the upper half of the O dropped into the floor row
        assert!(locked(game.board(), 4, BOARD_HEIGHT - 1));
        assert!(locked(game.board(), 5, BOARD_HEIGHT - 1));
        assert_eq!(game.total_filled_cells(), 2);
    }

    #[test]
    fn clear_lines_emits_event() {
        let mut board = empty_board();
        fill_row(&mut board, 10);
        fill_row(&mut board, 11);
        let mut game = game_with(board, Tetromino::new(TetrominoType::O));
        game.take_events();

        game.clear_lines();

        assert!(game.take_events().contains(&TetrisEvent::LinesCleared(2)));
    }
}

// ============================================================================
// Scoring Tests
// ============================================================================

mod scoring {
    use super::*;

    #[test]
    fn line_scores_at_level_one() {
        for lines in 1..=4u32 {
            let mut game = game_with(empty_board(), Tetromino::new(TetrominoType::O));
            assert_eq!(game.add_score(lines), LINE_SCORES[lines as usize]);
            assert_eq!(game.score(), LINE_SCORES[lines as usize]);
        }
    }

    #[test]
    fn score_multiplied_by_level() {
        let config = TetrisConfig { start_level: 3 };
        let mut game = Tetris::with_provider(config, sequence(&[TetrominoType::T]));
        game.start();

        assert_eq!(game.add_score(1), 300);
        assert_eq!(game.add_score(4), 2400);
    }

    #[test]
    fn level_increases_every_ten_lines() {
        let mut game = game_with(empty_board(), Tetromino::new(TetrominoType::O));
        game.take_events();

        game.add_score(4);
        game.add_score(4);
        assert_eq!(game.level(), 1);
        game.add_score(4);

        assert_eq!(game.lines_cleared(), 12);
        assert_eq!(game.level(), 2);
        assert!(game.take_events().contains(&TetrisEvent::LevelUp(2)));
    }

    #[test]
    fn level_counts_from_start_level() {
        let mut game = Tetris::with_provider(
            TetrisConfig { start_level: 5 },
            sequence(&[TetrominoType::T]),
        );
        game.start();
        assert_eq!(game.level(), 5);

        for _ in 0..3 {
            game.add_score(4);
        }
        assert_eq!(game.level(), 6);
    }

    #[test]
    fn start_level_is_clamped() {
        let game = Tetris::with_provider(
            TetrisConfig { start_level: 42 },
            sequence(&[TetrominoType::T]),
        );
        assert_eq!(game.start_level(), 10);
    }
}

// ============================================================================
// Hard Drop Tests
// ============================================================================

mod hard_drop {
    use super::*;

    #[test]
    fn hard_drop_scores_two_points_per_row() {
        // O cells start on rows 1 and 2 and end on rows 18 and 19
        let mut game = game_with(empty_board(), Tetromino::new_at(TetrominoType::O, 3, 0));

        let report = game.hard_drop().unwrap();

        assert_eq!(report.dropped_rows, 17);
        assert_eq!(game.score(), 34);
        assert!(game.take_events().contains(&TetrisEvent::HardDropped(17)));
    }

    #[test]
    fn hard_drop_locks_at_ghost_and_spawns_next() {
        let mut game = Tetris::with_grid(
            empty_board(),
            Tetromino::new(TetrominoType::T),
            sequence(&[TetrominoType::I, TetrominoType::S]),
        );
        let ghost = game.ghost();

        let report = game.hard_drop().unwrap();

        let mut expected = ghost.blocks();
        expected.sort_by_key(|p| (p.y, p.x));
        let mut cells = report.cells.clone();
        cells.sort_by_key(|p| (p.y, p.x));
        assert_eq!(cells, expected);
        assert_eq!(game.current_piece().kind, TetrominoType::I);
        assert_eq!(game.next_piece().kind, TetrominoType::S);
    }
}

// ============================================================================
// Game Over Tests
// ============================================================================

mod game_over {
    use super::*;

    fn blocked_spawn_game() -> Tetris {
        let mut board = empty_board();
        for y in 3..BOARD_HEIGHT {
            fill_row_with_gap(&mut board, y, 9);
        }
        // the I lands on row 2 over the O's spawn cells
        Tetris::with_grid(
            board,
            Tetromino::new_at(TetrominoType::I, 3, 1),
            sequence(&[TetrominoType::O]),
        )
    }

    #[test]
    fn game_over_when_spawn_blocked() {
        let mut game = blocked_spawn_game();

        let report = game.hard_drop().unwrap();

        assert!(report.game_over);
        assert!(game.is_game_over());
        assert_eq!(game.state(), TetrisState::Over);
    }

    #[test]
    fn game_over_emits_final_score() {
        let mut game = blocked_spawn_game();
        game.take_events();

        game.hard_drop().unwrap();

        assert!(game
            .take_events()
            .contains(&TetrisEvent::GameOver { score: 0, level: 1 }));
    }

    #[test]
    fn no_commands_after_game_over() {
        let mut game = blocked_spawn_game();
        game.hard_drop().unwrap();
        let board = game.board().clone();

        assert_eq!(game.move_piece(-1, 0), Err(TetrisError::InvalidPhase));
        assert_eq!(game.rotate(), Err(TetrisError::InvalidPhase));
        assert_eq!(game.tick(), Err(TetrisError::InvalidPhase));
        assert!(game.hard_drop().is_err());
        assert_eq!(game.board(), &board);
    }

    #[test]
    fn start_after_game_over_resets() {
        let mut game = blocked_spawn_game();
        game.hard_drop().unwrap();

        game.start();

        assert_eq!(game.state(), TetrisState::Running);
        assert_eq!(game.score(), 0);
        assert_eq!(game.total_filled_cells(), 0);
    }
}

// ============================================================================
// Pause and Cadence Tests
// ============================================================================

mod pause_and_cadence {
    use super::*;

    #[test]
    fn paused_game_rejects_moves() {
        let mut game = Tetris::with_provider(TetrisConfig::default(), sequence(&[TetrominoType::T]));
        assert_eq!(game.move_piece(1, 0), Err(TetrisError::InvalidPhase));

        game.start();
        game.pause().unwrap();
        let before = game.current_piece().clone();

        assert_eq!(game.move_piece(1, 0), Err(TetrisError::InvalidPhase));
        assert_eq!(game.tick(), Err(TetrisError::InvalidPhase));
        assert_eq!(game.current_piece(), &before);

        game.toggle_pause().unwrap();
        assert_eq!(game.state(), TetrisState::Running);
        assert!(game.move_piece(1, 0).is_ok());
    }

    #[test]
    fn drop_interval_shrinks_with_level_down_to_floor() {
        let mut game = Tetris::with_provider(
            TetrisConfig { start_level: 1 },
            sequence(&[TetrominoType::T]),
        );
        assert_eq!(game.drop_interval_ms(), 1000);

        game.set_start_level(10);
        assert_eq!(game.drop_interval_ms(), 550);

        game.start();
        for _ in 0..28 {
            game.add_score(4);
        }
        assert!(game.level() > 20);
        assert_eq!(game.drop_interval_ms(), 50);
    }

    #[test]
    fn tick_moves_piece_down() {
        let mut game = game_with(empty_board(), Tetromino::new(TetrominoType::O));
        let y = game.current_piece().position.y;

        assert_eq!(game.tick(), Ok(MoveOutcome::Moved));
        assert_eq!(game.current_piece().position.y, y + 1);
    }
}

// ============================================================================
// Render Consistency Tests
// ============================================================================

mod render_consistency {
    use super::*;

    #[test]
    fn render_grid_overlays_current_piece_on_locked_cells() {
        let mut board = empty_board();
        fill_row_with_gap(&mut board, BOARD_HEIGHT - 1, 0);
        let game = game_with(board, Tetromino::new_at(TetrominoType::O, 3, 5));

        let visual = game.render_grid();

        for block in game.current_piece().blocks() {
            assert_eq!(
                visual.get(Point::new(block.x as usize, block.y as usize)),
                Some(Cell::Locked(TetrominoType::O))
            );
        }
        assert_eq!(
            visual.count(|c| c != Cell::Empty),
            game.total_filled_cells() + 4
        );
    }

    #[test]
    fn snapshot_matches_queries() {
        let mut game = game_with(empty_board(), Tetromino::new(TetrominoType::T));
        game.move_piece(1, 0).unwrap();

        let snapshot = game.snapshot();

        assert_eq!(&snapshot.current, game.current_piece());
        assert_eq!(&snapshot.next, game.next_piece());
        assert_eq!(snapshot.ghost, game.ghost());
        assert_eq!(snapshot.score, game.score());
        assert_eq!(snapshot.state, TetrisState::Running);
    }

    #[test]
    fn queries_leave_the_game_unchanged() {
        let mut board = empty_board();
        fill_row_except(&mut board, BOARD_HEIGHT - 1, &[0]);
        let mut game = game_with(board, Tetromino::new_at(TetrominoType::T, 3, 2));
        game.take_events();

        let before = game.snapshot();
        let ghost = game.ghost();

        assert_eq!(game.ghost(), ghost);
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.render_grid(), game.render_grid());
        assert_eq!(game.current_piece().position, Position { x: 3, y: 2 });
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn ghost_display_toggles_and_survives_restart() {
        let mut game = game_with(empty_board(), Tetromino::new(TetrominoType::T));
        assert!(game.ghost_enabled());

        assert!(!game.toggle_ghost());
        assert!(!game.ghost_enabled());
        let ghost = game.ghost();
        assert_eq!(game.snapshot().ghost, ghost);

        game.start();
        assert!(!game.ghost_enabled());
        assert!(game.toggle_ghost());
    }

    #[test]
    fn piece_above_the_top_row_is_still_bounded_by_the_walls() {
        let game = game_with(empty_board(), Tetromino::new(TetrominoType::T));
        // spawn row 0 of the T matrix is empty, so y = -2 puts cells at -1 and 0
        let high = Tetromino::new_at(TetrominoType::T, 3, -2);
        assert!(game.is_valid_position(&high));
        assert!(!game.is_valid_position(&Tetromino::new_at(TetrominoType::T, -1, -2)));
        assert!(!game.is_valid_position(&Tetromino::new_at(
            TetrominoType::T,
            BOARD_WIDTH as i16 - 2,
            -2
        )));
    }

    #[test]
    fn ghost_rests_on_stack() {
        let mut board = empty_board();
        fill_row(&mut board, 15);
        let game = game_with(board, Tetromino::new_at(TetrominoType::O, 3, 0));

        // O cells occupy matrix rows 1 and 2, so it rests with y + 2 = 14
        assert_eq!(game.ghost().position.y, 12);
    }
}

// ============================================================================
// Piece Provider Tests
// ============================================================================

mod piece_provider {
    use super::*;

    #[test]
    fn sequence_provider_cycles() {
        let mut provider = SequencePieceProvider::new(vec![TetrominoType::I, TetrominoType::Z]);
        let drawn: Vec<_> = (0..4).map(|_| provider.next_piece()).collect();
        assert_eq!(
            drawn,
            vec![
                TetrominoType::I,
                TetrominoType::Z,
                TetrominoType::I,
                TetrominoType::Z
            ]
        );
    }

    #[test]
    fn spawn_position_is_centered() {
        let o = Tetromino::new(TetrominoType::O);
        assert_eq!(o.position, Position { x: 3, y: 0 });
        let t = Tetromino::new(TetrominoType::T);
        assert_eq!(t.position, Position { x: 4, y: 0 });
    }
}
