//! Blackjack round engine - card entities and the deterministic state
//! machine both peers replay.

pub mod entities;
pub mod state_machine;

pub use state_machine::{ActionError, Outcome, Round, RoundState, Session, TableView};
