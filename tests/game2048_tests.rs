//! 2048 engine tests
//!
//! Test categories:
//! - Line compression and merging
//! - Sliding in every direction
//! - Spawning
//! - Winning and game over
//! - Undo

use arcade::game2048::{
    slide_line, Direction, Game2048, Game2048Event, Phase, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE,
    UNDOS_PER_GAME, WIN_TILE,
};
use arcade::{Game2048Error, Grid, Point};

fn game(rows: &[&[u32]]) -> Game2048 {
    Game2048::from_grid(Grid::from_rows(rows), 42)
}

fn tiles(game: &Game2048) -> usize {
    game.grid().count(|v| v != 0)
}

/// Every slide from here moves tiles, none of them merge, and the grid
/// ends full with no move left.
fn one_move_from_the_end() -> Game2048 {
    game(&[&[2, 4, 2], &[4, 2, 32], &[0, 8, 16]])
}

// ============================================================================
// Line Tests
// ============================================================================

mod lines {
    use super::*;

    #[test]
    fn tiles_compress_toward_the_edge() {
        let (line, merged) = slide_line(&[0, 2, 0, 4]);
        assert_eq!(line, vec![2, 4, 0, 0]);
        assert!(merged.is_empty());
    }

    #[test]
    fn pairs_merge_once_each() {
        let (line, merged) = slide_line(&[2, 2, 2, 2]);
        assert_eq!(line, vec![4, 4, 0, 0]);
        assert_eq!(merged, vec![4, 4]);
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        let (line, merged) = slide_line(&[2, 2, 4, 0]);
        assert_eq!(line, vec![4, 4, 0, 0]);
        assert_eq!(merged, vec![4]);
    }

    #[test]
    fn gaps_do_not_block_merges() {
        assert_eq!(slide_line(&[4, 0, 4, 8]).0, vec![8, 8, 0, 0]);
    }

    #[test]
    fn odd_run_leaves_the_far_tile() {
        assert_eq!(slide_line(&[2, 2, 2]).0, vec![4, 2, 0]);
    }
}

// ============================================================================
// Slide Tests
// ============================================================================

mod sliding {
    use super::*;

    #[test]
    fn slide_left_scores_merges() {
        let mut g = game(&[&[2, 2, 0, 0], &[4, 0, 4, 0], &[0; 4], &[0; 4]]);

        let report = g.slide(Direction::Left).unwrap();

        assert_eq!(g.grid().row(0)[0], 4);
        assert_eq!(g.grid().row(1)[0], 8);
        assert_eq!(report.gained, 12);
        assert_eq!(report.merged, vec![4, 8]);
        assert_eq!(g.score(), 12);
        assert_eq!(g.moves(), 1);
    }

    #[test]
    fn slide_right_merges_from_the_right() {
        let mut g = game(&[&[2, 2, 2], &[0; 3], &[0; 3]]);
        g.slide(Direction::Right).unwrap();
        assert_eq!(&g.grid().row(0)[1..], &[2, 4]);
    }

    #[test]
    fn slide_down_moves_columns() {
        let mut g = game(&[&[2, 0, 0], &[0, 0, 0], &[0, 0, 0]]);
        g.slide(Direction::Down).unwrap();
        assert_eq!(g.grid().get(Point::new(0, 2)), Some(2));
    }

    #[test]
    fn slide_up_merges_toward_the_top() {
        let mut g = game(&[&[0, 0, 0], &[8, 0, 0], &[8, 0, 0]]);
        g.slide(Direction::Up).unwrap();
        assert_eq!(g.grid().get(Point::new(0, 0)), Some(16));
        assert_eq!(g.score(), 16);
    }

    #[test]
    fn no_change_is_rejected_without_side_effects() {
        let mut g = game(&[&[2, 4, 0], &[8, 0, 0], &[0, 0, 0]]);
        let grid = g.grid().clone();

        assert_eq!(g.slide(Direction::Left), Err(Game2048Error::NoChange));
        assert_eq!(g.grid(), &grid);
        assert_eq!(g.moves(), 0);
        assert!(!g.can_undo());
        assert!(g.take_events().is_empty());
    }

    #[test]
    fn slide_before_start_is_rejected() {
        let mut g = Game2048::seeded(DEFAULT_SIZE, 1);
        assert_eq!(g.phase(), Phase::Idle);
        assert_eq!(g.slide(Direction::Up), Err(Game2048Error::InvalidPhase));
    }
}

// ============================================================================
// Spawn Tests
// ============================================================================

mod spawning {
    use super::*;

    #[test]
    fn start_places_two_tiles() {
        let mut g = Game2048::seeded(DEFAULT_SIZE, 7);
        g.start();

        assert_eq!(tiles(&g), 2);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.score(), 0);
        assert_eq!(g.undos_left(), UNDOS_PER_GAME);
        assert!(g.grid().cells().iter().all(|&v| matches!(v, 0 | 2 | 4)));
    }

    #[test]
    fn each_slide_spawns_one_tile() {
        let mut g = game(&[&[0, 0, 2], &[0; 3], &[0; 3]]);

        let report = g.slide(Direction::Left).unwrap();

        let (point, value) = report.spawned.unwrap();
        assert!(value == 2 || value == 4);
        assert_eq!(g.grid().get(point), Some(value));
        assert_eq!(tiles(&g), 2);
        assert!(g
            .take_events()
            .contains(&Game2048Event::TileSpawned { point, value }));
    }

    #[test]
    fn same_seed_same_game() {
        let mut a = Game2048::seeded(DEFAULT_SIZE, 99);
        let mut b = Game2048::seeded(DEFAULT_SIZE, 99);
        a.start();
        b.start();
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn resize_is_clamped_and_restarts() {
        let mut g = Game2048::seeded(DEFAULT_SIZE, 3);
        g.start();

        g.resize(9);
        assert_eq!(g.size(), MAX_SIZE);
        assert_eq!(tiles(&g), 2);

        g.resize(1);
        assert_eq!(g.size(), MIN_SIZE);
    }
}

// ============================================================================
// Win and Game Over Tests
// ============================================================================

mod ending {
    use super::*;

    #[test]
    fn reaching_2048_wins_and_play_continues() {
        let mut g = game(&[&[1024, 1024, 0, 0], &[0; 4], &[0; 4], &[0; 4]]);

        let report = g.slide(Direction::Left).unwrap();

        assert!(report.won);
        assert!(g.has_won());
        assert_eq!(g.best_tile(), WIN_TILE);
        assert_eq!(g.phase(), Phase::Running);
        assert!(g.take_events().contains(&Game2048Event::Won));
    }

    #[test]
    fn win_is_announced_once() {
        let mut g = game(&[&[2048, 0, 0, 0], &[1024, 1024, 0, 0], &[0; 4], &[0; 4]]);
        assert!(g.has_won());

        let report = g.slide(Direction::Left).unwrap();

        assert!(!report.won);
        assert!(!g.take_events().contains(&Game2048Event::Won));
    }

    #[test]
    fn full_grid_without_merges_ends_the_game() {
        let mut g = one_move_from_the_end();

        let report = g.slide(Direction::Left).unwrap();

        assert!(report.game_over);
        assert_eq!(g.phase(), Phase::Over);
        assert!(g.take_events().contains(&Game2048Event::GameOver {
            score: 0,
            best_tile: 32
        }));
        assert_eq!(g.slide(Direction::Right), Err(Game2048Error::InvalidPhase));
        assert_eq!(g.undo(), Err(Game2048Error::InvalidPhase));
    }
}

// ============================================================================
// Undo Tests
// ============================================================================

mod undo {
    use super::*;

    fn fresh() -> Game2048 {
        game(&[&[0, 0, 0, 2], &[0, 0, 2, 2], &[0; 4], &[0; 4]])
    }

    #[test]
    fn undo_restores_grid_score_and_moves() {
        let mut g = fresh();
        let grid = g.grid().clone();
        g.slide(Direction::Left).unwrap();

        g.undo().unwrap();

        assert_eq!(g.grid(), &grid);
        assert_eq!(g.score(), 0);
        assert_eq!(g.moves(), 0);
        assert_eq!(g.undos_left(), UNDOS_PER_GAME - 1);
        assert!(g.take_events().contains(&Game2048Event::Undone));
    }

    #[test]
    fn nothing_to_undo_before_a_slide() {
        let mut g = fresh();
        assert_eq!(g.undo(), Err(Game2048Error::NothingToUndo));
        assert_eq!(g.undos_left(), UNDOS_PER_GAME);
    }

    #[test]
    fn undos_run_out() {
        let mut g = fresh();
        for _ in 0..UNDOS_PER_GAME {
            g.slide(Direction::Left).unwrap();
            g.undo().unwrap();
        }
        g.slide(Direction::Left).unwrap();

        assert!(!g.can_undo());
        assert_eq!(g.undo(), Err(Game2048Error::NothingToUndo));
        assert_eq!(g.moves(), 1);
    }
}
