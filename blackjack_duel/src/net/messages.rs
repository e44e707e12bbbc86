use serde::{Deserialize, Serialize};
use std::fmt;

use super::super::game::entities::{Chips, Seat};

/// A replicated player action. Every state change on either peer is one of
/// these four records, applied locally and sent to the other side.
///
/// The wire shape is the tagged JSON record itself, e.g.
/// `{"type":"bet","player":1,"amount":100}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A seat stakes chips on the round.
    Bet { player: Seat, amount: Chips },
    /// A seat draws another card.
    Hit { player: Seat },
    /// A seat ends its turn.
    Stand { player: Seat },
    /// Reset the finished round and reopen bets.
    NewRound,
}

impl Action {
    /// The seat the action acts for, if it carries one.
    #[must_use]
    pub const fn player(&self) -> Option<Seat> {
        match self {
            Self::Bet { player, .. } | Self::Hit { player } | Self::Stand { player } => {
                Some(*player)
            }
            Self::NewRound => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Bet { player, amount } => &format!("player {player} bets ${amount}"),
            Self::Hit { player } => &format!("player {player} hits"),
            Self::Stand { player } => &format!("player {player} stands"),
            Self::NewRound => "new round",
        };
        write!(f, "{repr}")
    }
}
