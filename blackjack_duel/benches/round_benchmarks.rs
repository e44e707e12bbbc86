use criterion::{Criterion, criterion_group, criterion_main};

use blackjack_duel::{Card, Hand, Rank, Seat, Session, Shoe, Suit};

/// A hand with two soft aces, the worst case for the score adjustment loop.
fn soft_hand() -> Hand {
    let mut hand = Hand::default();
    for rank in [Rank::Ace, Rank::Seven, Rank::Ace, Rank::Five, Rank::Three] {
        hand.push(Card::new(rank, Suit::Heart));
    }
    hand
}

fn bench_hand_scoring(c: &mut Criterion) {
    let hand = soft_hand();
    c.bench_function("score_soft_hand", |b| b.iter(|| hand.score()));
}

fn bench_scripted_round(c: &mut Criterion) {
    let stack = [
        Card::new(Rank::Nine, Suit::Club),
        Card::new(Rank::Seven, Suit::Club),
        Card::new(Rank::Ten, Suit::Club),
        Card::new(Rank::Six, Suit::Club),
        Card::new(Rank::Five, Suit::Club),
    ];
    c.bench_function("scripted_round", |b| {
        b.iter(|| {
            let mut session = Session::with_shoe(Seat::One, Shoe::stacked(stack));
            session.new_round().unwrap();
            session.place_bet(Seat::One, 100).unwrap();
            session.place_bet(Seat::Two, 100).unwrap();
            session.hit(Seat::One).unwrap();
            session.stand(Seat::One).unwrap();
            session.stand(Seat::Two).unwrap();
            session.view()
        });
    });
}

criterion_group!(benches, bench_hand_scoring, bench_scripted_round);
criterion_main!(benches);
