//! Go engine tests
//!
//! Test categories:
//! - Captures
//! - Suicide
//! - Ko
//! - Territory and scoring
//! - Handicap and setup
//! - Passing and resignation
//! - Rejected commands

use arcade::go::{
    group_at, liberties, territory, Board, BoardSize, Cell, GoConfig, GoEvent, GoGame,
    GoOutcome, GoPhase, Stone, DEFAULT_KOMI,
};
use arcade::{GoError, Point};

fn nine() -> GoConfig {
    GoConfig {
        size: BoardSize::Nine,
        handicap: 0,
        komi: DEFAULT_KOMI,
    }
}

fn position(black: &[(usize, usize)], white: &[(usize, usize)]) -> Board {
    let mut board = Board::square(9, Cell::Empty);
    for &(x, y) in black {
        board.set(Point::new(x, y), Cell::Black);
    }
    for &(x, y) in white {
        board.set(Point::new(x, y), Cell::White);
    }
    board
}

fn game(black: &[(usize, usize)], white: &[(usize, usize)], to_move: Stone) -> GoGame {
    GoGame::from_position(nine(), position(black, white), to_move)
}

/// Black wall on column 3, White wall on column 5, column 4 shared.
fn walls() -> Board {
    let black: Vec<_> = (0..9).map(|y| (3, y)).collect();
    let white: Vec<_> = (0..9).map(|y| (5, y)).collect();
    position(&black, &white)
}

fn p(x: usize, y: usize) -> Point {
    Point::new(x, y)
}

// ============================================================================
// Capture Tests
// ============================================================================

mod captures {
    use super::*;

    #[test]
    fn surrounded_stone_is_removed() {
        let mut g = game(&[(0, 1), (2, 1), (1, 0)], &[(1, 1)], Stone::Black);

        let report = g.play(p(1, 2)).unwrap();

        assert_eq!(report.captured, vec![p(1, 1)]);
        assert_eq!(g.board().get(p(1, 1)), Some(Cell::Empty));
        assert_eq!(g.captures().black, 1);
        assert_eq!(g.captures().white, 0);
        assert_eq!(g.to_move(), Stone::White);
    }

    #[test]
    fn whole_group_on_the_edge_is_captured() {
        let mut g = game(&[(2, 0), (0, 1)], &[(0, 0), (1, 0)], Stone::Black);

        let mut captured = g.play(p(1, 1)).unwrap().captured;
        captured.sort();

        assert_eq!(captured, vec![p(0, 0), p(1, 0)]);
        assert_eq!(g.captures().by(Stone::Black), 2);
    }

    #[test]
    fn capture_emits_events() {
        let mut g = game(&[(0, 1), (2, 1), (1, 0)], &[(1, 1)], Stone::Black);
        g.play(p(1, 2)).unwrap();

        let events = g.take_events();
        assert!(events.contains(&GoEvent::StonePlaced {
            point: p(1, 2),
            stone: Stone::Black
        }));
        assert!(events.contains(&GoEvent::StonesCaptured {
            color: Stone::White,
            points: vec![p(1, 1)]
        }));
        assert!(g.take_events().is_empty());
    }

    #[test]
    fn group_and_liberties_helpers() {
        let board = position(&[(4, 4), (4, 5)], &[(4, 3)]);

        let mut group = group_at(&board, p(4, 5));
        group.sort();
        assert_eq!(group, vec![p(4, 4), p(4, 5)]);
        assert_eq!(liberties(&board, &group), 5);
        assert!(group_at(&board, p(0, 0)).is_empty());
    }
}

// ============================================================================
// Suicide Tests
// ============================================================================

mod suicide {
    use super::*;

    #[test]
    fn suicide_is_rejected_without_changing_state() {
        let mut g = game(&[], &[(1, 0), (0, 1)], Stone::Black);
        let before = g.snapshot();

        assert_eq!(g.play(p(0, 0)), Err(GoError::Suicide));
        assert_eq!(g.snapshot(), before);
        assert_eq!(
            g.take_events(),
            vec![GoEvent::MoveRejected {
                point: p(0, 0),
                reason: GoError::Suicide
            }]
        );
    }

    #[test]
    fn filling_last_liberty_is_legal_when_it_captures() {
        // White (1,0) has (0,0) as its only liberty.
        let mut g = game(&[(2, 0), (1, 1), (0, 2)], &[(1, 0), (0, 1)], Stone::Black);

        let report = g.play(p(0, 0)).unwrap();

        assert!(report.captured.contains(&p(1, 0)));
        assert_eq!(g.board().get(p(0, 0)), Some(Cell::Black));
    }
}

// ============================================================================
// Ko Tests
// ============================================================================

mod ko {
    use super::*;

    /// Black to retake at (2,1) right after White captured there.
    fn ko_fight() -> GoGame {
        let mut g = game(
            &[(1, 0), (0, 1), (1, 2), (2, 1)],
            &[(2, 0), (3, 1), (2, 2)],
            Stone::White,
        );
        let report = g.play(p(1, 1)).unwrap();
        assert_eq!(report.captured, vec![p(2, 1)]);
        g
    }

    #[test]
    fn single_stone_capture_marks_ko_point() {
        let g = ko_fight();
        assert_eq!(g.ko_point(), Some(p(2, 1)));
    }

    #[test]
    fn immediate_retake_is_rejected() {
        let mut g = ko_fight();
        let before = g.snapshot();

        assert_eq!(g.check_move(p(2, 1), Stone::Black), Err(GoError::Ko));
        assert_eq!(g.play(p(2, 1)), Err(GoError::Ko));
        assert_eq!(g.snapshot(), before);
        assert_eq!(g.to_move(), Stone::Black);
    }

    #[test]
    fn retake_is_legal_after_an_exchange_elsewhere() {
        let mut g = ko_fight();
        g.play(p(8, 8)).unwrap();
        g.play(p(8, 0)).unwrap();

        let report = g.play(p(2, 1)).unwrap();

        assert_eq!(report.captured, vec![p(1, 1)]);
        assert_eq!(g.ko_point(), Some(p(1, 1)));
    }

    #[test]
    fn pass_clears_ko_point() {
        let mut g = ko_fight();
        g.pass().unwrap();
        assert_eq!(g.ko_point(), None);
    }
}

// ============================================================================
// Territory and Scoring Tests
// ============================================================================

mod scoring {
    use super::*;

    #[test]
    fn empty_board_has_no_territory() {
        let t = territory(&Board::square(9, Cell::Empty));
        assert_eq!((t.black, t.white), (0, 0));
    }

    #[test]
    fn region_touching_one_colour_belongs_to_it() {
        let t = territory(&position(&[(4, 4)], &[]));
        assert_eq!(t.black, 80);
        assert_eq!(t.owners.get(p(0, 0)), Some(Some(Stone::Black)));
        assert_eq!(t.owners.get(p(4, 4)), Some(None));
    }

    #[test]
    fn region_touching_both_colours_is_neutral() {
        let t = territory(&walls());

        assert_eq!(t.black, 27);
        assert_eq!(t.white, 27);
        assert_eq!(t.owners.get(p(4, 0)), Some(None));
        assert_eq!(t.owners.get(p(0, 8)), Some(Some(Stone::Black)));
        assert_eq!(t.owners.get(p(8, 8)), Some(Some(Stone::White)));
    }

    #[test]
    fn komi_decides_an_even_position() {
        let g = GoGame::from_position(nine(), walls(), Stone::Black);
        let score = g.score();

        assert_eq!(score.black_total(), 27.0);
        assert_eq!(score.white_total(), 33.5);
        assert_eq!(score.winner(), Some(Stone::White));
        assert_eq!(score.margin(), 6.5);
    }

    #[test]
    fn captures_count_towards_the_score() {
        let mut g = game(&[(0, 1), (2, 1), (1, 0)], &[(1, 1)], Stone::Black);
        g.play(p(1, 2)).unwrap();
        assert_eq!(g.score().black_captures, 1);
    }

    #[test]
    fn zero_komi_tie_is_a_draw() {
        let config = GoConfig { komi: 0.0, ..nine() };
        let mut g = GoGame::from_position(config, walls(), Stone::Black);

        let score = g.score();
        assert_eq!(score.black_total(), score.white_total());
        assert_eq!(score.winner(), None);

        g.pass().unwrap();
        let outcome = g.pass().unwrap().unwrap();

        assert_eq!(outcome.winner(), None);
        assert_eq!(outcome.to_string(), "Draw");
    }

    #[test]
    fn score_queries_do_not_mutate() {
        let g = GoGame::from_position(nine(), walls(), Stone::Black);
        let before = g.snapshot();

        assert_eq!(g.score(), g.score());
        assert_eq!(g.territory(), g.territory());
        assert_eq!(g.snapshot(), before);
    }
}

// ============================================================================
// Handicap and Setup Tests
// ============================================================================

mod setup {
    use super::*;

    #[test]
    fn new_game_waits_in_setup() {
        let mut g = GoGame::new(nine());
        assert_eq!(g.phase(), GoPhase::Setup);
        assert_eq!(g.play(p(4, 4)), Err(GoError::InvalidPhase));
    }

    #[test]
    fn handicap_stones_are_placed_and_black_moves_first() {
        let mut g = GoGame::new(GoConfig { handicap: 3, ..nine() });
        g.start();

        for point in [p(2, 2), p(6, 6), p(2, 6)] {
            assert_eq!(g.board().get(point), Some(Cell::Black));
        }
        assert_eq!(g.board().get(p(6, 2)), Some(Cell::Empty));
        assert_eq!(g.to_move(), Stone::Black);
        assert_eq!(
            g.take_events(),
            vec![GoEvent::GameStarted {
                size: BoardSize::Nine,
                handicap: 3
            }]
        );
    }

    #[test]
    fn handicap_is_capped() {
        let mut g = GoGame::new(nine());
        g.set_handicap(9).unwrap();
        assert_eq!(g.config().handicap, 5);
    }

    #[test]
    fn handicap_locked_during_play() {
        let mut g = GoGame::new(nine());
        g.start();
        assert_eq!(g.set_handicap(2), Err(GoError::HandicapLocked));
        assert_eq!(g.set_board_size(BoardSize::Nineteen), Err(GoError::InvalidPhase));
    }

    #[test]
    fn board_size_changes_before_start() {
        let mut g = GoGame::new(nine());
        g.set_board_size(BoardSize::Nineteen).unwrap();
        g.start();
        assert_eq!(g.size(), 19);
    }

    #[test]
    fn star_points_match_board_size() {
        assert_eq!(
            BoardSize::Nine.star_points(),
            vec![p(2, 2), p(6, 2), p(2, 6), p(6, 6), p(4, 4)]
        );
        assert!(BoardSize::Nineteen.star_points().contains(&p(15, 3)));
        assert_eq!(BoardSize::from_dimension(13), Some(BoardSize::Thirteen));
        assert_eq!(BoardSize::from_dimension(10), None);
    }
}

// ============================================================================
// Passing and Resignation Tests
// ============================================================================

mod ending {
    use super::*;

    #[test]
    fn two_passes_end_with_a_score() {
        let mut g = GoGame::from_position(nine(), walls(), Stone::Black);

        assert_eq!(g.pass(), Ok(None));
        assert_eq!(g.pass_streak(), 1);
        let outcome = g.pass().unwrap().unwrap();

        assert!(matches!(outcome, GoOutcome::Scored(_)));
        assert_eq!(outcome.to_string(), "White wins by 6.5 points");
        assert_eq!(g.phase(), GoPhase::Finished);
        assert_eq!(g.outcome(), Some(outcome));
    }

    #[test]
    fn a_move_resets_the_pass_streak() {
        let mut g = GoGame::from_position(nine(), walls(), Stone::Black);
        g.pass().unwrap();
        g.play(p(0, 0)).unwrap();
        assert_eq!(g.pass_streak(), 0);
        assert_eq!(g.pass(), Ok(None));
        assert_eq!(g.phase(), GoPhase::InProgress);
    }

    #[test]
    fn player_to_move_resigns() {
        let mut g = GoGame::new(nine());
        g.start();

        let outcome = g.resign().unwrap();

        assert_eq!(outcome, GoOutcome::Resignation { winner: Stone::White });
        assert_eq!(outcome.to_string(), "White wins by resignation");
        assert!(g.take_events().contains(&GoEvent::Resigned(Stone::Black)));
    }

    #[test]
    fn finished_game_rejects_commands() {
        let mut g = GoGame::new(nine());
        g.start();
        g.resign().unwrap();

        assert_eq!(g.play(p(0, 0)), Err(GoError::InvalidPhase));
        assert_eq!(g.pass(), Err(GoError::InvalidPhase));
        assert_eq!(g.resign(), Err(GoError::InvalidPhase));
    }
}

// ============================================================================
// Rejected Command Tests
// ============================================================================

mod rejections {
    use super::*;

    #[test]
    fn occupied_point() {
        let mut g = game(&[(4, 4)], &[], Stone::White);
        assert_eq!(g.play(p(4, 4)), Err(GoError::Occupied));
        assert_eq!(g.to_move(), Stone::White);
    }

    #[test]
    fn off_the_board() {
        let mut g = game(&[], &[], Stone::Black);
        assert_eq!(g.play(p(9, 0)), Err(GoError::OutOfBounds));
        assert_eq!(g.move_count(), 0);
    }

    #[test]
    fn wrong_player() {
        let mut g = game(&[], &[], Stone::Black);
        let before = g.snapshot();

        assert_eq!(
            g.attempt_move(p(0, 0), Stone::White),
            Err(GoError::WrongPlayer {
                expected: Stone::Black
            })
        );
        assert_eq!(g.snapshot(), before);
    }
}
