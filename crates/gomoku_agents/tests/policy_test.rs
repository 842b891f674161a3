//! Tests for the move-selection policies.

use std::io::Write;

use gomoku_agents::{
    AgentPolicy, AgentType, LearnedPolicy, ModelWeights, PolicyError, PolicySet, RandomPolicy,
    RuleBasedPolicy,
};
use gomoku_rules::{GameEngine, Gomoku, Move, Observation};
use tempfile::NamedTempFile;

/// Black holds (0,0)..(0,3); the returned game has `black_to_play` to move.
fn four_in_a_row(black_to_play: bool) -> Gomoku {
    let mut game = Gomoku::default();
    let white = [Move::new(5, 5), Move::new(5, 7), Move::new(9, 9), Move::new(12, 12)];
    for col in 0..4 {
        game.step(Move::new(0, col)).expect("black move");
        if col < 3 || black_to_play {
            game.step(white[col]).expect("white move");
        }
    }
    game
}

fn full_board_observation() -> Observation {
    // 3x3 needing four in a row always ends in a draw.
    let mut game = Gomoku::new(3, 4);
    for idx in 0..9 {
        game.step(Move::from_index(idx, 3).expect("index")).expect("legal");
    }
    game.observation()
}

#[test]
fn test_rule_based_opens_in_centre() {
    let game = Gomoku::default();
    let mv = RuleBasedPolicy::new()
        .select_move(&game.observation())
        .expect("move");
    assert_eq!(mv, Move::new(7, 7));
}

#[test]
fn test_rule_based_takes_win() {
    let game = four_in_a_row(true);
    let mv = RuleBasedPolicy::new()
        .select_move(&game.observation())
        .expect("move");
    assert_eq!(mv, Move::new(0, 4));
}

#[test]
fn test_rule_based_blocks_win() {
    let game = four_in_a_row(false);
    let mv = RuleBasedPolicy::new()
        .select_move(&game.observation())
        .expect("move");
    assert_eq!(mv, Move::new(0, 4));
}

#[test]
fn test_learned_takes_win_and_blocks() {
    let policy = LearnedPolicy::default();
    let win = policy
        .select_move(&four_in_a_row(true).observation())
        .expect("move");
    assert_eq!(win, Move::new(0, 4));

    let block = policy
        .select_move(&four_in_a_row(false).observation())
        .expect("move");
    assert_eq!(block, Move::new(0, 4));
}

#[test]
fn test_random_picks_empty_cell() {
    let mut game = Gomoku::default();
    game.step(Move::new(7, 7)).expect("move");
    let policy = RandomPolicy::with_seed(42);
    for _ in 0..50 {
        let mv = policy.select_move(&game.observation()).expect("move");
        assert!(game.board().is_empty(mv));
    }
}

#[test]
fn test_seeded_random_is_reproducible() {
    let obs = Gomoku::default().observation();
    let a = RandomPolicy::with_seed(9).select_move(&obs).expect("move");
    let b = RandomPolicy::with_seed(9).select_move(&obs).expect("move");
    assert_eq!(a, b);
}

#[test]
fn test_full_board_has_no_moves() {
    let obs = full_board_observation();
    assert_eq!(
        RandomPolicy::with_seed(1).select_move(&obs),
        Err(PolicyError::NoLegalMoves)
    );
    assert_eq!(
        RuleBasedPolicy::new().select_move(&obs),
        Err(PolicyError::NoLegalMoves)
    );
    assert_eq!(
        LearnedPolicy::default().select_move(&obs),
        Err(PolicyError::NoLegalMoves)
    );
}

#[test]
fn test_policy_set_dispatches_by_agent_type() {
    let set = PolicySet::new(RandomPolicy::with_seed(3), LearnedPolicy::default());
    assert_eq!(set.policy(AgentType::Random).name(), "random");
    assert_eq!(set.policy(AgentType::RuleBased).name(), "rule_based");
    assert_eq!(set.policy(AgentType::Learned).name(), "learned");

    let game = four_in_a_row(true);
    let mv = set
        .select_move(AgentType::RuleBased, &game.observation())
        .expect("move");
    assert_eq!(mv, Move::new(0, 4));
}

#[test]
fn test_model_weights_partial_file() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "name = \"tuned\"\ncentrality = 1.5\n\n[attack]\nfive = 500000.0\n"
    )
    .expect("write");

    let weights = ModelWeights::from_file(file.path()).expect("load");
    assert_eq!(weights.name(), "tuned");
    assert_eq!(*weights.centrality(), 1.5);
    assert_eq!(weights.attack().five, 500_000.0);
    // Unspecified values keep their defaults.
    assert_eq!(*weights.search_radius(), 2);

    let policy = LearnedPolicy::load(file.path()).expect("load policy");
    assert_eq!(policy.weights().name(), "tuned");
}

#[test]
fn test_model_weights_rejects_bad_input() {
    assert!(ModelWeights::from_toml_str("centrality = [").is_err());
    assert!(ModelWeights::from_toml_str("centrality = nan").is_err());
    assert!(ModelWeights::from_toml_str("search_radius = 0").is_err());
    assert!(ModelWeights::from_file("/definitely/not/here.toml").is_err());
}
