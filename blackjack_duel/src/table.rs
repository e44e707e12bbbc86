//! The action dispatcher.
//!
//! One [`Table`] per peer bridges local intent and the replication channel
//! to the single [`Session`] both sides keep in sync. Local actions are
//! applied and then replicated; remote actions are drained from the receive
//! queue by the owning thread and applied, never re-sent. Presentation pulls
//! [`TableView`] snapshots after either path.

use log::{debug, warn};
use std::sync::mpsc;

use super::{
    game::{ActionError, Session, TableView, entities::Seat},
    net::{errors::NetError, messages::Action, peer::PeerChannel},
};

/// Translate one wire action into the session operation it names.
fn apply(session: &mut Session, action: &Action) -> Result<(), ActionError> {
    match *action {
        Action::Bet { player, amount } => session.place_bet(player, amount),
        Action::Hit { player } => session.hit(player).map(|_round_over| ()),
        Action::Stand { player } => session.stand(player),
        Action::NewRound => session.new_round(),
    }
}

/// A session wired to its peer channel.
#[derive(Debug)]
pub struct Table {
    session: Session,
    channel: PeerChannel,
    remote: mpsc::Receiver<Action>,
}

impl Table {
    /// Wire a session to an established channel and start the channel's
    /// receive loop.
    ///
    /// # Errors
    ///
    /// Returns a link error if the receive loop can't be started.
    pub fn new(session: Session, channel: PeerChannel) -> Result<Self, NetError> {
        let remote = channel.start_receiver()?;
        Ok(Self {
            session,
            channel,
            remote,
        })
    }

    /// The seat this peer occupies.
    #[must_use]
    pub const fn seat(&self) -> Seat {
        self.session.seat()
    }

    /// A read-only snapshot for presentation.
    #[must_use]
    pub fn view(&self) -> TableView {
        self.session.view()
    }

    /// Apply a locally originated action and replicate it to the peer.
    ///
    /// The send is fire-and-forget: the local transition stands even when
    /// the send fails (the link flag reports the loss). A declined action
    /// is not replicated — the peer's converged session would decline it
    /// the same way.
    ///
    /// # Errors
    ///
    /// Returns the session's rejection, which left state unchanged.
    pub fn act(&mut self, action: Action) -> Result<(), ActionError> {
        apply(&mut self.session, &action)?;
        if let Err(error) = self.channel.send(&action) {
            warn!("couldn't replicate {action}: {error}");
        }
        Ok(())
    }

    /// Drain and apply every queued remote action. Returns how many were
    /// applied, so callers know whether to refresh their rendering.
    /// Redundant or stale deliveries are expected and ignored.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.remote.try_recv() {
            match apply(&mut self.session, &action) {
                Ok(()) => applied += 1,
                Err(error) => debug!("ignoring remote {action}: {error}"),
            }
        }
        applied
    }

    /// Whether the peer link is still believed up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }
}
