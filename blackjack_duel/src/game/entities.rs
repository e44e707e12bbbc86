use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    fmt,
    ops::{Index, IndexMut},
};
use thiserror::Error;

pub const SUITS: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Club | Self::Spade => Color::Black,
            Self::Diamond | Self::Heart => Color::Red,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Color {
    Black,
    Red,
}

pub const RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Blackjack card value. Aces count 11 here; the soft downgrade to 1
    /// happens during hand scoring, not per card.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten | Self::Jack | Self::Queen | Self::King => 10,
            Self::Ace => 11,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
            rank => &rank.value().to_string(),
        };
        write!(f, "{repr}")
    }
}

/// An immutable card value. Created once by a draw, owned by the hand
/// holding it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.rank.value()
    }

    #[must_use]
    pub const fn color(self) -> Color {
        self.suit.color()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Type alias for whole chips. All bets and balances are whole chips
/// (there's no point arguing over fractions of one).
pub type Chips = u32;

/// Balance each player starts a session with.
pub const STARTING_STAKE: Chips = 1000;

/// Seat identity, fixed for the lifetime of a connection: the host plays
/// seat one, the joiner seat two. On the wire a seat is the integer 1 or 2.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    /// The seat across the table.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::One => "1",
            Self::Two => "2",
        };
        write!(f, "{repr}")
    }
}

#[derive(Debug, Error)]
#[error("seat must be 1 or 2, got {0}")]
pub struct InvalidSeat(pub u8);

impl From<Seat> for u8 {
    fn from(value: Seat) -> Self {
        match value {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }
}

impl TryFrom<u8> for Seat {
    type Error = InvalidSeat;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(InvalidSeat(other)),
        }
    }
}

/// A pair of per-player slots indexable by [`Seat`]. Bets, hands, and
/// balances all live in one of these.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PerSeat<T> {
    pub one: T,
    pub two: T,
}

impl<T> PerSeat<T> {
    pub const fn new(one: T, two: T) -> Self {
        Self { one, two }
    }
}

impl<T> Index<Seat> for PerSeat<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &T {
        match seat {
            Seat::One => &self.one,
            Seat::Two => &self.two,
        }
    }
}

impl<T> IndexMut<Seat> for PerSeat<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut T {
        match seat {
            Seat::One => &mut self.one,
            Seat::Two => &mut self.two,
        }
    }
}

/// An ordered sequence of cards belonging to one player. Grows only via
/// deals and hits; its score is always derived, never stored.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Sum of card values with every ace initially counted as 11; while the
    /// total busts and a soft ace remains, one ace drops to 1. Pure over the
    /// card multiset, so re-evaluation can never change a reported score.
    #[must_use]
    pub fn score(&self) -> u32 {
        let mut total = 0;
        let mut soft_aces = 0;
        for card in &self.cards {
            if card.rank == Rank::Ace {
                soft_aces += 1;
            }
            total += card.value();
        }
        while total > 21 && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }
        total
    }

    /// A two-card 21 at deal time.
    #[must_use]
    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && self.score() == 21
    }

    #[must_use]
    pub fn is_busted(&self) -> bool {
        self.score() > 21
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = self
            .cards
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{repr}")
    }
}

/// Draw one card from an explicit random source: a uniform rank and a
/// uniform suit, with replacement.
pub fn draw_card<R: Rng>(rng: &mut R) -> Card {
    let rank = RANKS[rng.random_range(0..RANKS.len())];
    let suit = SUITS[rng.random_range(0..SUITS.len())];
    Card::new(rank, suit)
}

// Peers exchange no entropy on connect, yet both must deal identical cards,
// so every shoe derives from the same fixed seed.
const SHOE_SEED: u64 = 21;

/// An infinite shoe: cards come from an owned seedable source, drawn with
/// replacement, so the nth draw is a pure function of the seed.
#[derive(Debug)]
pub struct Shoe {
    rng: StdRng,
    /// Cards dealt ahead of any random draw. Lets tests rig exact hands.
    stacked: VecDeque<Card>,
}

impl Shoe {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            stacked: VecDeque::new(),
        }
    }

    /// A shoe that deals the given cards first, then falls back to the
    /// default seeded source.
    #[must_use]
    pub fn stacked<I>(cards: I) -> Self
    where
        I: IntoIterator<Item = Card>,
    {
        Self {
            rng: StdRng::seed_from_u64(SHOE_SEED),
            stacked: cards.into_iter().collect(),
        }
    }

    pub fn draw(&mut self) -> Card {
        self.stacked
            .pop_front()
            .unwrap_or_else(|| draw_card(&mut self.rng))
    }
}

impl Default for Shoe {
    fn default() -> Self {
        Self::seeded(SHOE_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_of(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::default();
        for rank in ranks {
            hand.push(Card::new(*rank, Suit::Spade));
        }
        hand
    }

    #[test]
    fn face_cards_are_worth_ten() {
        for rank in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King] {
            assert_eq!(rank.value(), 10);
        }
    }

    #[test]
    fn suit_colors() {
        assert_eq!(Suit::Heart.color(), Color::Red);
        assert_eq!(Suit::Diamond.color(), Color::Red);
        assert_eq!(Suit::Club.color(), Color::Black);
        assert_eq!(Suit::Spade.color(), Color::Black);
    }

    #[test]
    fn empty_hand_scores_zero() {
        assert_eq!(Hand::default().score(), 0);
    }

    #[test]
    fn soft_ace_downgrades_once() {
        // A + A + 9: the first ace drops to 1, the second need not.
        let hand = hand_of(&[Rank::Ace, Rank::Ace, Rank::Nine]);
        assert_eq!(hand.score(), 21);
    }

    #[test]
    fn score_is_idempotent() {
        let hand = hand_of(&[Rank::Ace, Rank::Seven, Rank::Ace, Rank::Five]);
        let first = hand.score();
        for _ in 0..10 {
            assert_eq!(hand.score(), first);
        }
    }

    #[test]
    fn score_ignores_card_order() {
        assert_eq!(
            hand_of(&[Rank::Ace, Rank::Nine, Rank::Ace]).score(),
            hand_of(&[Rank::Ace, Rank::Ace, Rank::Nine]).score(),
        );
    }

    #[test]
    fn bust_over_twenty_one() {
        let hand = hand_of(&[Rank::King, Rank::Queen, Rank::Five]);
        assert_eq!(hand.score(), 25);
        assert!(hand.is_busted());
    }

    #[test]
    fn natural_is_two_card_twenty_one() {
        assert!(hand_of(&[Rank::Ace, Rank::King]).is_natural());
        assert!(!hand_of(&[Rank::Ace, Rank::Five, Rank::Five]).is_natural());
        assert!(!hand_of(&[Rank::King, Rank::Nine]).is_natural());
    }

    #[test]
    fn seat_round_trips_through_wire_integers() {
        assert_eq!(serde_json::to_string(&Seat::One).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Seat::Two).unwrap(), "2");
        assert_eq!(serde_json::from_str::<Seat>("2").unwrap(), Seat::Two);
        assert!(serde_json::from_str::<Seat>("3").is_err());
    }

    #[test]
    fn seat_other_flips_sides() {
        assert_eq!(Seat::One.other(), Seat::Two);
        assert_eq!(Seat::Two.other(), Seat::One);
    }

    #[test]
    fn per_seat_indexes_by_seat() {
        let mut slots = PerSeat::new(10u32, 20);
        slots[Seat::One] += 1;
        assert_eq!(slots[Seat::One], 11);
        assert_eq!(slots[Seat::Two], 20);
    }

    #[test]
    fn identically_seeded_shoes_deal_identical_cards() {
        let mut a = Shoe::seeded(7);
        let mut b = Shoe::seeded(7);
        for _ in 0..100 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn stacked_shoe_deals_rigged_cards_first() {
        let rigged = [
            Card::new(Rank::Ace, Suit::Heart),
            Card::new(Rank::King, Suit::Spade),
        ];
        let mut shoe = Shoe::stacked(rigged);
        assert_eq!(shoe.draw(), rigged[0]);
        assert_eq!(shoe.draw(), rigged[1]);
        // Falls back to the seeded source afterwards.
        let _ = shoe.draw();
    }

    #[test]
    fn card_display() {
        assert_eq!(Card::new(Rank::Ace, Suit::Heart).to_string(), "A♥");
        assert_eq!(Card::new(Rank::Ten, Suit::Club).to_string(), "10♣");
    }
}
