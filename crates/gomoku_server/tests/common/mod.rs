//! Helpers shared by the server integration tests.

use gomoku_rules::{
    Board, EngineError, GameEngine, GameStatus, Gomoku, Move, Observation, StepOutcome,
};
use gomoku_server::SessionHandle;
use std::sync::Arc;

/// Plays real moves but shows the agent a board with no empty cell.
#[derive(Debug)]
pub struct FullBoardEngine {
    inner: Gomoku,
    shown: Observation,
}

impl FullBoardEngine {
    pub fn boxed() -> Box<dyn GameEngine> {
        // 3x3 needing four in a row fills up without a winner.
        let mut filled = Gomoku::new(3, 4);
        for index in 0..9 {
            filled
                .step(Move::from_index(index, 3).expect("index"))
                .expect("legal");
        }
        Box::new(Self {
            inner: Gomoku::default(),
            shown: filled.observation(),
        })
    }
}

impl GameEngine for FullBoardEngine {
    fn board_size(&self) -> usize {
        self.inner.board_size()
    }

    fn reset(&mut self) -> Observation {
        self.inner.reset()
    }

    fn step(&mut self, mv: Move) -> Result<StepOutcome, EngineError> {
        self.inner.step(mv)?;
        Ok(StepOutcome::new(
            self.shown.clone(),
            0.0,
            false,
            GameStatus::InProgress,
        ))
    }

    fn observation(&self) -> Observation {
        self.shown.clone()
    }

    fn status(&self) -> GameStatus {
        self.inner.status()
    }

    fn move_count(&self) -> usize {
        self.inner.move_count()
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.inner.legal_moves()
    }

    fn board(&self) -> &Board {
        self.inner.board()
    }
}

/// Leaves `session`'s lock poisoned by a panicking holder.
pub fn poison(session: &SessionHandle) {
    let session = Arc::clone(session);
    let crashed = std::thread::spawn(move || {
        let _guard = session.lock().expect("lock");
        panic!("exchange crashed mid-move");
    })
    .join();
    assert!(crashed.is_err());
}
