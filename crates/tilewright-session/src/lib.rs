//! Networked map sessions: leaf requests out, leaf deliveries in.
#![forbid(unsafe_code)]

mod remote;

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use tilewright_map::{LeafDelivery, LeafFetcher, LeafRequest, MapIndex};

pub use remote::{RemoteEndpoint, band_snapshot};
pub use tilewright_map::Offline as LocalSession;

/// Client side of a live session. Requests go out over a channel; deliveries
/// queue up until [`LiveSession::pump`] applies them to a map.
pub struct LiveSession {
    req_tx: Sender<LeafRequest>,
    delivery_rx: Receiver<LeafDelivery>,
    sent: usize,
    received: usize,
}

impl LiveSession {
    pub fn new(req_tx: Sender<LeafRequest>, delivery_rx: Receiver<LeafDelivery>) -> Self {
        Self {
            req_tx,
            delivery_rx,
            sent: 0,
            received: 0,
        }
    }

    /// In-process session with its far side.
    pub fn loopback() -> (LiveSession, RemoteEndpoint) {
        let (req_tx, req_rx) = unbounded::<LeafRequest>();
        let (delivery_tx, delivery_rx) = unbounded::<LeafDelivery>();
        (
            LiveSession::new(req_tx, delivery_rx),
            RemoteEndpoint::new(req_rx, delivery_tx),
        )
    }

    /// Apply every delivery that has arrived. Returns how many leaves landed.
    pub fn pump(&mut self, map: &mut MapIndex) -> usize {
        let mut landed = 0usize;
        for delivery in self.delivery_rx.try_iter() {
            apply(map, delivery);
            landed += 1;
        }
        self.received += landed;
        landed
    }

    /// Like [`pump`](Self::pump), but waits up to `timeout` for the first
    /// delivery when none is queued.
    pub fn pump_wait(&mut self, map: &mut MapIndex, timeout: Duration) -> usize {
        match self.delivery_rx.recv_timeout(timeout) {
            Ok(first) => {
                apply(map, first);
                self.received += 1;
                1 + self.pump(map)
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!(target: "session", "remote side hung up");
                0
            }
        }
    }

    /// (requests sent, deliveries applied)
    pub fn counts(&self) -> (usize, usize) {
        (self.sent, self.received)
    }
}

fn apply(map: &mut MapIndex, delivery: LeafDelivery) {
    let (key, band) = (delivery.key, delivery.band);
    let stored = map.receive_leaf(delivery);
    log::debug!(target: "session", "delivery ({}, {}) {:?}: {} tiles", key.x, key.y, band, stored);
}

impl LeafFetcher for LiveSession {
    fn is_live(&self) -> bool {
        true
    }

    fn request_leaf(&mut self, request: LeafRequest) {
        if self.req_tx.send(request).is_err() {
            // Nobody is listening: the leaf stays requested.
            log::warn!(
                target: "session",
                "request for ({}, {}) dropped, remote side is gone",
                request.key.x,
                request.key.y
            );
            return;
        }
        self.sent += 1;
    }
}

/// Either kind of session, for hosts that pick at startup.
pub enum Session {
    Local(LocalSession),
    Live(LiveSession),
}

impl Session {
    /// Apply pending deliveries; a local session has none.
    pub fn pump(&mut self, map: &mut MapIndex) -> usize {
        match self {
            Session::Local(_) => 0,
            Session::Live(live) => live.pump(map),
        }
    }
}

impl LeafFetcher for Session {
    fn is_live(&self) -> bool {
        match self {
            Session::Local(s) => s.is_live(),
            Session::Live(s) => s.is_live(),
        }
    }

    fn request_leaf(&mut self, request: LeafRequest) {
        match self {
            Session::Local(s) => s.request_leaf(request),
            Session::Live(s) => s.request_leaf(request),
        }
    }
}
