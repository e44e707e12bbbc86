//! Deterministic round state machine.
//!
//! Both peers run one [`Session`] each and apply the same actions to it, so
//! every transition here must be a total function over (state, action):
//! an action that arrives for a state that does not expect it is declined
//! with a typed error and changes nothing. Replicated actions may arrive
//! redundantly, and a rejection on one side is a rejection on both.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::entities::{Chips, Hand, PerSeat, STARTING_STAKE, Seat, Shoe};

/// Errors that decline a player action. Every variant leaves the session
/// untouched.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("bets aren't open")]
    BettingClosed,
    #[error("bet already placed")]
    BetAlreadyPlaced,
    #[error("bet must be at least 1 chip")]
    EmptyBet,
    #[error("bet exceeds balance of ${balance}")]
    InsufficientChips { balance: Chips },
    #[error("not your turn")]
    OutOfTurn,
    #[error("round still in progress")]
    RoundInProgress,
}

/// Discrete phase of the active round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RoundState {
    /// Before the table opens. No cards, no bets.
    Waiting,
    /// Bets are open. Once both seats have bet, the deal fires.
    Betting,
    /// The given seat may hit or stand.
    Turn(Seat),
    /// Terminal until the next `new_round`.
    Ended,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Betting => "betting",
            Self::Turn(seat) => &format!("player {seat}'s turn"),
            Self::Ended => "round over",
        };
        write!(f, "{repr}")
    }
}

/// How a finished round settled.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Outcome {
    Winner(Seat),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Winner(seat) => &format!("player {seat} wins"),
            Self::Draw => "draw",
        };
        write!(f, "{repr}")
    }
}

/// One unit of play: bets, hands, phase, and settlement.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Round {
    pub state: RoundState,
    pub bets: PerSeat<Chips>,
    pub hands: PerSeat<Hand>,
    pub outcome: Option<Outcome>,
    /// Presentational only. Never part of convergence-relevant state.
    pub message: String,
}

impl Default for Round {
    fn default() -> Self {
        Self {
            state: RoundState::Waiting,
            bets: PerSeat::default(),
            hands: PerSeat::default(),
            outcome: None,
            message: "Waiting for an opponent...".to_string(),
        }
    }
}

/// The long-lived game container for one peer: balances that persist across
/// rounds, the active round, the card source, and which seat this peer
/// occupies.
#[derive(Debug)]
pub struct Session {
    seat: Seat,
    balances: PerSeat<Chips>,
    round: Round,
    shoe: Shoe,
}

impl Session {
    #[must_use]
    pub fn new(seat: Seat) -> Self {
        Self::with_shoe(seat, Shoe::default())
    }

    /// A session drawing from the given shoe. Tests use this to rig exact
    /// hands or vary the seed.
    #[must_use]
    pub fn with_shoe(seat: Seat, shoe: Shoe) -> Self {
        Self {
            seat,
            balances: PerSeat::new(STARTING_STAKE, STARTING_STAKE),
            round: Round::default(),
            shoe,
        }
    }

    #[must_use]
    pub const fn seat(&self) -> Seat {
        self.seat
    }

    #[must_use]
    pub const fn balance(&self, seat: Seat) -> Chips {
        match seat {
            Seat::One => self.balances.one,
            Seat::Two => self.balances.two,
        }
    }

    #[must_use]
    pub const fn round(&self) -> &Round {
        &self.round
    }

    /// Record a bet for `seat`, debiting its balance. When the second bet
    /// lands, the deal fires and naturals settle immediately.
    ///
    /// # Errors
    ///
    /// Declined without a state change if bets aren't open, the seat already
    /// bet this round, the amount is zero, or the amount exceeds the seat's
    /// balance.
    pub fn place_bet(&mut self, seat: Seat, amount: Chips) -> Result<(), ActionError> {
        match self.round.state {
            RoundState::Waiting | RoundState::Betting => {}
            _ => return Err(ActionError::BettingClosed),
        }
        if self.round.bets[seat] > 0 {
            return Err(ActionError::BetAlreadyPlaced);
        }
        if amount == 0 {
            return Err(ActionError::EmptyBet);
        }
        let balance = self.balances[seat];
        if amount > balance {
            return Err(ActionError::InsufficientChips { balance });
        }
        self.balances[seat] -= amount;
        self.round.bets[seat] = amount;
        if self.round.bets.one > 0 && self.round.bets.two > 0 {
            self.deal();
        }
        Ok(())
    }

    /// Draw one more card for `seat`. Returns `true` when the draw busts the
    /// hand and the round is over, so callers can stop offering actions.
    ///
    /// # Errors
    ///
    /// Declined without a state change when it isn't `seat`'s turn.
    pub fn hit(&mut self, seat: Seat) -> Result<bool, ActionError> {
        if self.round.state != RoundState::Turn(seat) {
            return Err(ActionError::OutOfTurn);
        }
        let card = self.shoe.draw();
        self.round.hands[seat].push(card);
        if self.round.hands[seat].is_busted() {
            self.end_round(Outcome::Winner(seat.other()), format!("Player {seat} busts!"));
            return Ok(true);
        }
        Ok(false)
    }

    /// End `seat`'s turn. Seat one passes play across the table; seat two
    /// standing triggers the showdown.
    ///
    /// # Errors
    ///
    /// Declined without a state change when it isn't `seat`'s turn, which
    /// also makes a redundantly delivered stand a no-op.
    pub fn stand(&mut self, seat: Seat) -> Result<(), ActionError> {
        if self.round.state != RoundState::Turn(seat) {
            return Err(ActionError::OutOfTurn);
        }
        match seat {
            Seat::One => {
                self.round.state = RoundState::Turn(Seat::Two);
                self.round.message = "Player 2's turn".to_string();
            }
            Seat::Two => self.showdown(),
        }
        Ok(())
    }

    /// Reset hands, bets, and outcome, and open bets for the next round.
    /// Valid from the terminal state, and from `Waiting` so the first
    /// replicated `new_round` opens the table on both peers.
    ///
    /// # Errors
    ///
    /// Declined without a state change while a round is in progress.
    pub fn new_round(&mut self) -> Result<(), ActionError> {
        match self.round.state {
            RoundState::Waiting | RoundState::Ended => {}
            _ => return Err(ActionError::RoundInProgress),
        }
        self.round = Round {
            state: RoundState::Betting,
            message: "Place your bets!".to_string(),
            ..Round::default()
        };
        Ok(())
    }

    /// A read-only snapshot for presentation. Scores are computed here, not
    /// stored.
    #[must_use]
    pub fn view(&self) -> TableView {
        TableView {
            state: self.round.state,
            balances: self.balances,
            bets: self.round.bets,
            hands: self.round.hands.clone(),
            scores: PerSeat::new(self.round.hands.one.score(), self.round.hands.two.score()),
            outcome: self.round.outcome,
            message: self.round.message.clone(),
        }
    }

    /// Two cards to each hand, seat one first, then settle naturals. Draw
    /// order is fixed so identically seeded shoes replay identically.
    fn deal(&mut self) {
        for seat in [Seat::One, Seat::Two] {
            let card = self.shoe.draw();
            self.round.hands[seat].push(card);
            let card = self.shoe.draw();
            self.round.hands[seat].push(card);
        }
        let one = self.round.hands.one.is_natural();
        let two = self.round.hands.two.is_natural();
        match (one, two) {
            (true, true) => self.end_round(Outcome::Draw, "Both have blackjack! Draw!".to_string()),
            (true, false) => {
                self.end_round(Outcome::Winner(Seat::One), "Player 1 has blackjack!".to_string());
            }
            (false, true) => {
                self.end_round(Outcome::Winner(Seat::Two), "Player 2 has blackjack!".to_string());
            }
            (false, false) => {
                self.round.state = RoundState::Turn(Seat::One);
                self.round.message = "Player 1's turn".to_string();
            }
        }
    }

    /// Compare both standing hands; higher score wins, equal scores draw.
    fn showdown(&mut self) {
        let one = self.round.hands.one.score();
        let two = self.round.hands.two.score();
        if one > two {
            self.end_round(Outcome::Winner(Seat::One), format!("{one} vs {two}. Player 1 wins!"));
        } else if two > one {
            self.end_round(Outcome::Winner(Seat::Two), format!("{one} vs {two}. Player 2 wins!"));
        } else {
            self.end_round(Outcome::Draw, format!("Draw at {one}!"));
        }
    }

    /// Terminal transition: settle the pot and freeze the round. The winner
    /// takes both bets; a draw refunds each seat its own bet. Either way the
    /// chips debited at bet time all land back on a balance, conserving the
    /// table total.
    fn end_round(&mut self, outcome: Outcome, message: String) {
        let pot = self.round.bets.one + self.round.bets.two;
        match outcome {
            Outcome::Winner(seat) => self.balances[seat] += pot,
            Outcome::Draw => {
                self.balances.one += self.round.bets.one;
                self.balances.two += self.round.bets.two;
            }
        }
        self.round.outcome = Some(outcome);
        self.round.state = RoundState::Ended;
        self.round.message = message;
    }
}

/// The game state as pulled by the presentation layer: everything it may
/// render, nothing it may mutate.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableView {
    pub state: RoundState,
    pub balances: PerSeat<Chips>,
    pub bets: PerSeat<Chips>,
    pub hands: PerSeat<Hand>,
    pub scores: PerSeat<u32>,
    pub outcome: Option<Outcome>,
    pub message: String,
}
