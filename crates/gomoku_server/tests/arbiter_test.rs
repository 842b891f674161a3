//! Tests for move arbitration.

mod common;

use common::{FullBoardEngine, poison};
use gomoku_agents::{AgentType, LearnedPolicy, PolicySet, RandomPolicy};
use gomoku_rules::{EngineError, GameEngine, GameStatus, Gomoku, Move, Stone};
use gomoku_server::{
    Action, ClientKey, EngineFactory, ExchangeError, MoveArbiter, SessionHandle, SessionRegistry,
};
use std::sync::Arc;
use std::time::Duration;

fn arbiter() -> MoveArbiter {
    MoveArbiter::new(Arc::new(PolicySet::new(
        RandomPolicy::with_seed(42),
        LearnedPolicy::default(),
    )))
}

fn session_with(factory: EngineFactory) -> SessionHandle {
    SessionRegistry::new(4, Duration::from_secs(60), factory)
        .get_or_create(&ClientKey::from("127.0.0.1/test"), true)
        .expect("slot")
}

fn fresh_session() -> SessionHandle {
    session_with(Arc::new(|| Box::new(Gomoku::default()) as Box<dyn GameEngine>))
}

/// Black holds (0,0)..(0,3), white four scattered stones; black to play.
fn black_about_to_win() -> Box<dyn GameEngine> {
    let mut game = Gomoku::default();
    let white = [Move::new(5, 5), Move::new(5, 7), Move::new(9, 9), Move::new(12, 12)];
    for (col, reply) in white.into_iter().enumerate() {
        game.step(Move::new(0, col)).expect("black");
        game.step(reply).expect("white");
    }
    Box::new(game)
}

/// White holds (10,0)..(10,3); black to play with no threat of its own.
fn white_about_to_win() -> Box<dyn GameEngine> {
    let mut game = Gomoku::default();
    let black = [Move::new(2, 2), Move::new(2, 6), Move::new(6, 2), Move::new(6, 10)];
    for (col, opening) in black.into_iter().enumerate() {
        game.step(opening).expect("black");
        game.step(Move::new(10, col)).expect("white");
    }
    Box::new(game)
}

fn move_count(session: &SessionHandle) -> usize {
    session.lock().expect("lock").engine().move_count()
}

#[test]
fn test_reset_with_random_agent_first() {
    let session = fresh_session();
    let result = arbiter()
        .reset(&session, AgentType::Random, true)
        .expect("reset");

    assert!(!result.done);
    let mv = result.action.to_move().expect("agent opened");
    assert!(mv.in_bounds(15));

    let board = result.board.expect("reset returns the board");
    assert_eq!(board.len(), 15);
    let stones: Vec<(usize, usize, u8)> = board
        .iter()
        .enumerate()
        .flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, code)| **code != 0)
                .map(move |(c, code)| (r, c, *code))
        })
        .collect();
    assert_eq!(stones, vec![(mv.row(), mv.col(), Stone::Black.code())]);
}

#[test]
fn test_reset_with_human_first_leaves_board_empty() {
    let session = fresh_session();
    let result = arbiter()
        .reset(&session, AgentType::RuleBased, false)
        .expect("reset");

    assert!(result.action.is_none());
    assert!(!result.done);
    let board = result.board.expect("board");
    assert!(board.iter().flatten().all(|code| *code == 0));
    assert_eq!(move_count(&session), 0);
}

#[test]
fn test_step_plays_human_and_reply() {
    let session = fresh_session();
    let arbiter = arbiter();
    arbiter
        .reset(&session, AgentType::RuleBased, false)
        .expect("reset");

    let result = arbiter
        .step(&session, Move::new(7, 7), AgentType::RuleBased)
        .expect("step");

    assert!(!result.done);
    assert!(result.board.is_none());
    let reply = result.action.to_move().expect("reply");
    assert_ne!(reply, Move::new(7, 7));
    assert_eq!(move_count(&session), 2);

    let info = result.info.expect("info");
    assert_eq!(info.status, GameStatus::InProgress);
    assert_eq!(info.move_count, 2);
    assert_eq!(info.agent_type, AgentType::RuleBased);
}

#[test]
fn test_occupied_cell_is_rejected_without_change() {
    let session = fresh_session();
    let arbiter = arbiter();
    let opening = arbiter
        .reset(&session, AgentType::RuleBased, true)
        .expect("reset")
        .action
        .to_move()
        .expect("agent opened");

    let err = arbiter
        .step(&session, opening, AgentType::RuleBased)
        .expect_err("occupied");
    assert_eq!(
        err,
        ExchangeError::IllegalMove(EngineError::Occupied { mv: opening })
    );
    assert_eq!(move_count(&session), 1);
}

#[test]
fn test_out_of_bounds_is_rejected_without_change() {
    let session = fresh_session();
    let err = arbiter()
        .step(&session, Move::new(15, 3), AgentType::Random)
        .expect_err("off board");
    assert!(matches!(
        err,
        ExchangeError::IllegalMove(EngineError::OutOfBounds { .. })
    ));
    assert_eq!(move_count(&session), 0);
}

#[test]
fn test_human_win_ends_game_and_next_step_starts_fresh() {
    let session = session_with(Arc::new(black_about_to_win));
    let arbiter = arbiter();

    let result = arbiter
        .step(&session, Move::new(0, 4), AgentType::RuleBased)
        .expect("winning move");
    assert!(result.done);
    assert_eq!(result.action, Action::NONE);
    let info = result.info.expect("info");
    assert_eq!(info.winner, Some(Stone::Black));
    assert_eq!(info.move_count, 9);

    // The board was cleared when the game ended.
    assert_eq!(move_count(&session), 0);
    assert_eq!(session.lock().expect("lock").games_finished(), 1);

    let next = arbiter
        .step(&session, Move::new(0, 0), AgentType::RuleBased)
        .expect("fresh game");
    assert!(!next.done);
    assert_eq!(move_count(&session), 2);
}

#[test]
fn test_agent_win_ends_game() {
    let session = session_with(Arc::new(white_about_to_win));
    let arbiter = arbiter();

    let result = arbiter
        .step(&session, Move::new(14, 14), AgentType::RuleBased)
        .expect("exchange");
    assert!(result.done);
    assert_eq!(result.action, Action::from(Move::new(10, 4)));
    assert_eq!(result.info.expect("info").winner, Some(Stone::White));
    assert_eq!(move_count(&session), 0);
}

#[test]
fn test_game_played_to_the_end_restarts() {
    let session = fresh_session();
    let arbiter = arbiter();
    arbiter
        .reset(&session, AgentType::RuleBased, false)
        .expect("reset");

    let mut finished = false;
    for _ in 0..(15 * 15) {
        let next = session.lock().expect("lock").engine().legal_moves()[0];
        let result = arbiter
            .step(&session, next, AgentType::RuleBased)
            .expect("legal exchange");
        if result.done {
            finished = true;
            break;
        }
    }
    assert!(finished, "game never ended");

    let result = arbiter
        .step(&session, Move::new(7, 7), AgentType::RuleBased)
        .expect("fresh game");
    assert!(!result.done);
    assert_eq!(move_count(&session), 2);
}

#[test]
fn test_concurrent_steps_are_serialized() {
    let session = fresh_session();
    let arbiter = arbiter();
    let corners = [
        Move::new(0, 0),
        Move::new(0, 14),
        Move::new(14, 0),
        Move::new(14, 14),
    ];

    let handles: Vec<_> = corners
        .into_iter()
        .map(|mv| {
            let session = Arc::clone(&session);
            let arbiter = arbiter.clone();
            std::thread::spawn(move || arbiter.step(&session, mv, AgentType::Random))
        })
        .collect();

    let succeeded = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .filter(Result::is_ok)
        .count();

    let session = session.lock().expect("lock");
    let board = session.engine().board();
    let count = |code: u8| board.to_matrix().iter().flatten().filter(|c| **c == code).count();
    assert!(succeeded >= 1);
    assert_eq!(session.engine().move_count(), 2 * succeeded);
    assert_eq!(count(Stone::Black.code()), count(Stone::White.code()));
}

#[test]
fn test_agent_failure_keeps_human_move() {
    let session = session_with(Arc::new(FullBoardEngine::boxed));
    let err = arbiter()
        .step(&session, Move::new(7, 7), AgentType::RuleBased)
        .expect_err("agent sees no moves");

    assert!(matches!(err, ExchangeError::PolicyFailure(_)));
    assert_eq!(move_count(&session), 1);
    assert!(!session.lock().expect("lock").engine().board().is_empty(Move::new(7, 7)));
}

#[test]
fn test_poisoned_session_recovers_on_reset() {
    let registry = SessionRegistry::new(
        4,
        Duration::from_secs(60),
        Arc::new(|| Box::new(Gomoku::default()) as Box<dyn GameEngine>),
    );
    let key = ClientKey::from("127.0.0.1/crash");
    let arbiter = arbiter();

    let session = registry.get_or_create(&key, true).expect("slot");
    poison(&session);

    let err = arbiter
        .step(&session, Move::new(7, 7), AgentType::RuleBased)
        .expect_err("poisoned");
    assert_eq!(err, ExchangeError::SessionPoisoned);
    assert_eq!(
        arbiter
            .reset(&session, AgentType::RuleBased, false)
            .expect_err("still poisoned"),
        ExchangeError::SessionPoisoned
    );

    // A registry reset installs a new session in place of the broken one.
    let session = registry.get_or_create(&key, true).expect("reset");
    arbiter
        .reset(&session, AgentType::RuleBased, false)
        .expect("reset works");
    arbiter
        .step(&session, Move::new(7, 7), AgentType::RuleBased)
        .expect("step works");
    assert_eq!(move_count(&session), 2);
}
