use std::time::Duration;

use proptest::prelude::*;
use tilewright_geom::{Band, Position};
use tilewright_map::{BlockView, LeafFetcher, LeafKey, LeafRequest, MapIndex, Tile};
use tilewright_session::{LiveSession, LocalSession, Session, band_snapshot};

fn source_map() -> MapIndex {
    let mut map = MapIndex::new();
    for (x, y, z) in [(0, 0, 7), (1, 2, 7), (5, 1, 7), (0, 0, 9)] {
        map.set_tile(Position::new(x, y, z), Some(Tile::with_ground(100)));
    }
    map
}

#[test]
fn pending_until_delivered() {
    let (mut live, remote) = LiveSession::loopback();
    let mut view = MapIndex::new();

    assert!(view.resolve_block(1, 1, 7, &mut live).is_pending());
    assert!(view.resolve_block(2, 3, 7, &mut live).is_pending());
    assert_eq!(live.counts(), (1, 0));
    // Nothing arrives until the remote answers.
    assert_eq!(live.pump(&mut view), 0);

    let source = source_map();
    assert_eq!(remote.answer_pending(&source), 1);
    assert_eq!(live.pump(&mut view), 1);

    match view.resolve_block(1, 1, 7, &mut live) {
        BlockView::Ready(leaf) => assert_eq!(leaf.tiles().count(), 2),
        other => panic!("expected ready leaf, got {other:?}"),
    }
    // The underground band is still unknown and gets its own request.
    assert!(view.resolve_block(1, 1, 9, &mut live).is_pending());
    assert_eq!(live.counts(), (2, 1));
    assert_eq!(view.get_tile(Position::new(0, 0, 9)), None);
}

#[test]
fn snapshot_keeps_only_the_band() {
    let source = source_map();
    let delivery = band_snapshot(
        &source,
        LeafRequest {
            key: LeafKey::containing(0, 0),
            band: Band::Underground,
        },
    );
    assert_eq!(delivery.tiles.len(), 1);
    assert_eq!(delivery.tiles[0].0, Position::new(0, 0, 9));

    let empty = band_snapshot(
        &source,
        LeafRequest {
            key: LeafKey::containing(100, 100),
            band: Band::Aboveground,
        },
    );
    assert!(empty.tiles.is_empty());
}

#[test]
fn threaded_remote_serves_until_hangup() {
    let (mut live, remote) = LiveSession::loopback();
    let server = remote.spawn(source_map()).expect("spawn remote");
    let mut view = MapIndex::new();

    assert!(view.resolve_block(5, 1, 7, &mut live).is_pending());
    assert_eq!(live.pump_wait(&mut view, Duration::from_secs(5)), 1);
    assert!(view.resolve_block(5, 1, 7, &mut live).is_ready());
    assert!(view.get_tile(Position::new(5, 1, 7)).is_some());

    drop(live);
    assert_eq!(server.join().expect("remote thread"), 1);
}

#[test]
fn request_without_remote_stays_requested() {
    let (mut live, remote) = LiveSession::loopback();
    drop(remote);
    let mut view = MapIndex::new();
    assert!(view.resolve_block(0, 0, 7, &mut live).is_pending());
    assert_eq!(live.counts(), (0, 0));
    // Still pending, and not re-requested.
    assert!(view.resolve_block(0, 0, 7, &mut live).is_pending());
    assert!(view.get_leaf(0, 0).unwrap().is_requested(Band::Aboveground));
}

#[test]
fn local_session_reads_straight_through() {
    let mut session = Session::Local(LocalSession);
    assert!(!session.is_live());
    let mut map = source_map();
    assert!(map.resolve_block(0, 0, 7, &mut session).is_ready());
    assert!(matches!(
        map.resolve_block(40, 40, 7, &mut session),
        BlockView::Absent
    ));
    assert_eq!(session.pump(&mut map), 0);
}

proptest! {
    // However often blocks are looked at, each (leaf, band) is requested once.
    #[test]
    fn one_request_per_leaf_band(
        lookups in proptest::collection::vec((-20i32..20, -20i32..20, 0i32..16), 1..60)
    ) {
        let (mut live, remote) = LiveSession::loopback();
        let mut view = MapIndex::new();
        for &(x, y, z) in &lookups {
            view.resolve_block(x, y, z, &mut live);
        }
        let requests = remote.pending_requests();
        let mut unique: Vec<_> = lookups
            .iter()
            .map(|&(x, y, z)| (LeafKey::containing(x, y), Band::of_floor(z)))
            .collect();
        unique.sort_by_key(|(k, b)| (k.x, k.y, b.index()));
        unique.dedup();
        prop_assert_eq!(requests.len(), unique.len());
        prop_assert_eq!(live.counts().0, unique.len());
    }
}
