use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tilewright_map::{LeafDelivery, LeafRequest, MapIndex};

/// Content of one band of one leaf of `source`, as a delivery. An unknown
/// leaf yields an empty delivery.
pub fn band_snapshot(source: &MapIndex, request: LeafRequest) -> LeafDelivery {
    let tiles = source
        .get_leaf(request.key.x, request.key.y)
        .map(|leaf| {
            leaf.tiles()
                .filter(|(pos, _)| pos.band() == request.band)
                .map(|(pos, tile)| (pos, tile.clone()))
                .collect()
        })
        .unwrap_or_default();
    LeafDelivery {
        key: request.key,
        band: request.band,
        tiles,
    }
}

/// Far side of a session: receives leaf requests, sends deliveries.
pub struct RemoteEndpoint {
    req_rx: Receiver<LeafRequest>,
    delivery_tx: Sender<LeafDelivery>,
}

impl RemoteEndpoint {
    pub fn new(req_rx: Receiver<LeafRequest>, delivery_tx: Sender<LeafDelivery>) -> Self {
        Self {
            req_rx,
            delivery_tx,
        }
    }

    /// Requests received so far and not yet answered.
    pub fn pending_requests(&self) -> Vec<LeafRequest> {
        self.req_rx.try_iter().collect()
    }

    /// Send a delivery. False when the client is gone.
    pub fn deliver(&self, delivery: LeafDelivery) -> bool {
        self.delivery_tx.send(delivery).is_ok()
    }

    /// Answer every queued request from `source`. Returns how many were
    /// answered.
    pub fn answer_pending(&self, source: &MapIndex) -> usize {
        let mut answered = 0usize;
        for request in self.req_rx.try_iter() {
            if !self.deliver(band_snapshot(source, request)) {
                break;
            }
            answered += 1;
        }
        answered
    }

    /// Serve `source` on a background thread until the client hangs up.
    /// The handle yields the number of requests answered.
    pub fn spawn(self, source: MapIndex) -> std::io::Result<JoinHandle<usize>> {
        thread::Builder::new()
            .name("tilewright-remote".into())
            .spawn(move || {
                let mut answered = 0usize;
                while let Ok(request) = self.req_rx.recv() {
                    if !self.deliver(band_snapshot(&source, request)) {
                        break;
                    }
                    answered += 1;
                }
                log::debug!(target: "session", "remote done after {} requests", answered);
                answered
            })
    }
}
