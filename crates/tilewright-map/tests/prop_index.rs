use proptest::prelude::*;
use tilewright_geom::{Band, MAP_LAYERS, Position};
use tilewright_map::{
    BlockView, LEAF_SIZE, LeafDelivery, LeafFetcher, LeafKey, LeafRequest, MapIndex, Offline,
    Tile,
};

#[derive(Default)]
struct RecordingFetcher {
    requests: Vec<LeafRequest>,
}

impl LeafFetcher for RecordingFetcher {
    fn is_live(&self) -> bool {
        true
    }

    fn request_leaf(&mut self, request: LeafRequest) {
        self.requests.push(request);
    }
}

fn coord() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

proptest! {
    // Every position falls in exactly the leaf whose origin is its 4-aligned floor.
    #[test]
    fn leaf_key_is_aligned_and_contains(x in coord(), y in coord()) {
        let key = LeafKey::containing(x, y);
        prop_assert_eq!(key.x.rem_euclid(LEAF_SIZE), 0);
        prop_assert_eq!(key.y.rem_euclid(LEAF_SIZE), 0);
        prop_assert!(key.contains(x, y));
        prop_assert!(x - key.x < LEAF_SIZE && y - key.y < LEAF_SIZE);
    }

    // A tile written anywhere reads back from the same position only.
    #[test]
    fn stored_tile_reads_back(x in coord(), y in coord(), z in 0..MAP_LAYERS, ground in 1u16..) {
        let mut map = MapIndex::new();
        let pos = Position::new(x, y, z);
        map.set_tile(pos, Some(Tile::with_ground(ground)));
        prop_assert_eq!(map.get_tile(pos).and_then(Tile::ground_id), Some(ground));
        prop_assert!(map.get_tile(pos.offset(1, 0)).is_none());
        prop_assert_eq!(map.leaf_count(), 1);
    }

    // Repeated resolution of a pending leaf issues one request per band.
    #[test]
    fn live_leaf_is_requested_once(x in coord(), y in coord(), tries in 1usize..8) {
        let mut map = MapIndex::new();
        let mut fetcher = RecordingFetcher::default();
        for _ in 0..tries {
            prop_assert!(map.resolve_block(x, y, 7, &mut fetcher).is_pending());
            prop_assert!(map.resolve_block(x, y, 9, &mut fetcher).is_pending());
        }
        prop_assert_eq!(fetcher.requests.len(), 2);
        prop_assert_eq!(fetcher.requests[0].band, Band::Aboveground);
        prop_assert_eq!(fetcher.requests[1].band, Band::Underground);
    }
}

#[test]
fn offline_map_never_requests() {
    let mut map = MapIndex::new();
    assert!(matches!(
        map.resolve_block(0, 0, 7, &mut Offline),
        BlockView::Absent
    ));
    map.set_tile(Position::new(1, 1, 7), Some(Tile::with_ground(100)));
    assert!(map.resolve_block(0, 0, 7, &mut Offline).is_ready());
}

#[test]
fn delivery_makes_band_visible() {
    let mut map = MapIndex::new();
    let mut fetcher = RecordingFetcher::default();
    assert!(map.resolve_block(5, 5, 7, &mut fetcher).is_pending());
    let request = fetcher.requests[0];
    assert_eq!(request.key, LeafKey { x: 4, y: 4 });

    let stored = map.receive_leaf(LeafDelivery {
        key: request.key,
        band: request.band,
        tiles: vec![
            (Position::new(5, 5, 7), Tile::with_ground(100)),
            // Wrong leaf and wrong band are dropped.
            (Position::new(9, 5, 7), Tile::with_ground(100)),
            (Position::new(5, 5, 9), Tile::with_ground(100)),
        ],
    });
    assert_eq!(stored, 1);
    match map.resolve_block(5, 5, 7, &mut fetcher) {
        BlockView::Ready(leaf) => assert!(leaf.tile(Position::new(5, 5, 7)).is_some()),
        other => panic!("expected ready leaf, got {other:?}"),
    }
    // Underground band is still unknown and gets its own request.
    assert!(map.resolve_block(5, 5, 9, &mut fetcher).is_pending());
    assert_eq!(fetcher.requests.len(), 2);
}

#[test]
fn waypoint_counters_follow_moves() {
    let mut map = MapIndex::new();
    let a = Position::new(1, 1, 7);
    let b = Position::new(10, 1, 7);
    assert_eq!(map.set_waypoint("temple", a), None);
    assert_eq!(map.get_tile_location(a).unwrap().waypoint_count(), 1);
    assert_eq!(map.set_waypoint("temple", b), Some(a));
    assert_eq!(map.get_tile_location(a).unwrap().waypoint_count(), 0);
    assert_eq!(map.get_tile_location(b).unwrap().waypoint_count(), 1);
    assert_eq!(map.remove_waypoint("temple"), Some(b));
    assert_eq!(map.get_tile_location(b).unwrap().waypoint_count(), 0);
}

#[test]
fn one_exit_per_house() {
    let mut map = MapIndex::new();
    let a = Position::new(2, 2, 7);
    let b = Position::new(3, 2, 7);
    map.set_house_exit(5, a);
    assert!(map.get_tile(a).unwrap().has_house_exit(5));
    assert_eq!(map.set_house_exit(5, b), Some(a));
    assert!(map.get_tile(a).is_none());
    assert!(map.get_tile(b).unwrap().has_house_exit(5));
    assert_eq!(map.house_exit(5), Some(b));
}

#[test]
fn clear_drops_everything() {
    let mut map = MapIndex::new();
    map.set_tile(Position::new(0, 0, 7), Some(Tile::with_ground(1)));
    map.set_waypoint("a", Position::new(0, 0, 7));
    map.clear();
    assert_eq!(map.leaf_count(), 0);
    assert_eq!(map.waypoint("a"), None);
    assert_eq!(map.revisions().current(), 0);
}
