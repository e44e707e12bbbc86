//! # Blackjack Duel
//!
//! A two-player blackjack game played over a direct peer-to-peer TCP link.
//!
//! There is no central authority: each peer runs its own copy of the same
//! deterministic round state machine and the two copies are kept identical
//! by replicating small action messages instead of state snapshots. A local
//! action is applied to the local [`Session`] and sent to the peer; a remote
//! action is applied on arrival. Because every transition is deterministic,
//! total over (state, action), and tolerant of redundant delivery, both
//! sessions converge to the same state from the same per-sender-ordered
//! action sequence.
//!
//! ## Architecture
//!
//! - [`game`]: card entities and the round state machine (bets, turns,
//!   bust/stand, showdown, payout). Pure logic, no I/O.
//! - [`net`]: the replication channel — host/connector establishment,
//!   length-prefixed JSON action frames, and the background receive loop.
//! - [`table`]: the dispatcher wiring one session to one channel, and the
//!   snapshot interface the presentation layer polls.
//!
//! ## Example
//!
//! ```no_run
//! use blackjack_duel::{Action, Listener, Seat, Session, Table};
//!
//! // Host side: wait for the one peer, then open the table.
//! let listener = Listener::bind(blackjack_duel::DEFAULT_PORT)?;
//! let channel = listener.accept()?;
//! let mut table = Table::new(Session::new(Seat::One), channel)?;
//! table.act(Action::NewRound)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Core game logic: entities and the round state machine.
pub mod game;

/// Networking components for peer-to-peer replication.
pub mod net;

/// The action dispatcher joining the two.
pub mod table;

pub use game::{
    ActionError, Outcome, Round, RoundState, Session, TableView,
    entities::{self, Card, Chips, Color, Hand, PerSeat, Rank, STARTING_STAKE, Seat, Shoe, Suit},
};
pub use net::{
    errors::NetError,
    messages::Action,
    peer::{CONNECT_TIMEOUT, DEFAULT_PORT, Listener, PeerChannel},
    utils,
};
pub use table::Table;
