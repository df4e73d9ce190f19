use hashbrown::HashMap;
use tilewright_geom::{Band, Position};

use crate::TileMap;
use crate::fetch::{BlockView, LeafDelivery, LeafFetcher, LeafRequest};
use crate::leaf::{Leaf, LeafKey, TileLocation};
use crate::revisions::LeafRevisions;
use crate::tile::{HouseId, Tile};

/// Sparse map storage keyed by 4x4 leaf.
#[derive(Default, Debug, Clone)]
pub struct MapIndex {
    leaves: HashMap<LeafKey, Leaf>,
    waypoints: HashMap<String, Position>,
    house_exits: HashMap<HouseId, Position>,
    revisions: LeafRevisions,
}

impl MapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_leaf(&self, x: i32, y: i32) -> Option<&Leaf> {
        self.leaves.get(&LeafKey::containing(x, y))
    }

    pub fn get_leaf_mut(&mut self, x: i32, y: i32) -> Option<&mut Leaf> {
        self.leaves.get_mut(&LeafKey::containing(x, y))
    }

    /// The leaf containing `(x, y)`, created empty (and Unknown on both bands)
    /// when missing.
    pub fn create_leaf(&mut self, x: i32, y: i32) -> &mut Leaf {
        let key = LeafKey::containing(x, y);
        self.leaves.entry(key).or_insert_with(|| Leaf::new(key))
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.values()
    }

    pub fn get_tile_location(&self, pos: Position) -> Option<&TileLocation> {
        self.get_leaf(pos.x, pos.y)?.location(pos)
    }

    /// Location at `pos`, creating its leaf. None only for floors outside
    /// the map.
    pub fn location_mut(&mut self, pos: Position) -> Option<&mut TileLocation> {
        if !pos.is_valid() {
            return None;
        }
        self.create_leaf(pos.x, pos.y).location_mut(pos)
    }

    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        self.get_tile_location(pos)?.tile()
    }

    /// Tile at `pos`, created empty when missing.
    pub fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.location_mut(pos).map(TileLocation::tile_or_default)
    }

    /// Swaps the tile at `pos` and stamps the affected leaves.
    pub fn set_tile(&mut self, pos: Position, tile: Option<Tile>) -> Option<Tile> {
        let old = self.location_mut(pos)?.set_tile(tile);
        self.revisions.bump_around(pos);
        old
    }

    /// Records that the tile at `pos` changed. Returns the new stamp.
    pub fn mark_changed(&mut self, pos: Position) -> u64 {
        if let Some(loc) = self
            .leaves
            .get_mut(&LeafKey::of(pos))
            .and_then(|leaf| leaf.location_mut(pos))
        {
            loc.prune();
        }
        self.revisions.bump_around(pos)
    }

    #[inline]
    pub fn revisions(&self) -> &LeafRevisions {
        &self.revisions
    }

    #[inline]
    pub fn revisions_mut(&mut self) -> &mut LeafRevisions {
        &mut self.revisions
    }

    /// All tiles, in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.leaves.values().flat_map(Leaf::tiles)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    /// Gate a consumer's access to the leaf holding `(x, y, z)`.
    ///
    /// On a live session a missing leaf gets an Unknown placeholder, and a
    /// leaf that is not yet visible on the band of `z` is requested exactly
    /// once; later calls report `Pending` until the delivery lands.
    pub fn resolve_block<F>(&mut self, x: i32, y: i32, z: i32, fetcher: &mut F) -> BlockView<'_>
    where
        F: LeafFetcher + ?Sized,
    {
        let key = LeafKey::containing(x, y);
        if !fetcher.is_live() {
            return match self.leaves.get(&key) {
                Some(leaf) => BlockView::Ready(leaf),
                None => BlockView::Absent,
            };
        }
        let band = Band::of_floor(z);
        let leaf = self.leaves.entry(key).or_insert_with(|| Leaf::new(key));
        if leaf.is_visible(band) {
            return BlockView::Ready(leaf);
        }
        if leaf.mark_requested(band) {
            log::debug!(target: "fetch", "request leaf ({}, {}) {:?}", key.x, key.y, band);
            fetcher.request_leaf(LeafRequest { key, band });
        }
        BlockView::Pending
    }

    /// Store delivered content. Replaces whatever the band held and flips the
    /// band to visible in the same step. Returns how many tiles were stored.
    pub fn receive_leaf(&mut self, delivery: LeafDelivery) -> usize {
        let LeafDelivery { key, band, tiles } = delivery;
        let key = LeafKey::containing(key.x, key.y);
        let leaf = self.leaves.entry(key).or_insert_with(|| Leaf::new(key));
        leaf.clear_band(band);
        let mut stored = 0usize;
        for (pos, tile) in tiles {
            if pos.band() != band {
                log::warn!(target: "fetch", "delivery for {:?} carries tile at {} on another band", band, pos);
                continue;
            }
            match leaf.location_mut(pos) {
                Some(loc) => {
                    loc.set_tile(Some(tile));
                    stored += 1;
                }
                None => {
                    log::warn!(target: "fetch", "delivery for leaf ({}, {}) carries tile at {}", key.x, key.y, pos);
                }
            }
        }
        leaf.mark_visible(band);
        let z = match band {
            Band::Aboveground => tilewright_geom::GROUND_LAYER,
            Band::Underground => tilewright_geom::GROUND_LAYER + 1,
        };
        // Interior cell: stamps just this leaf.
        self.revisions.bump_around(Position::new(key.x + 1, key.y + 1, z));
        log::debug!(target: "fetch", "leaf ({}, {}) {:?} visible, {} tiles", key.x, key.y, band, stored);
        stored
    }

    pub fn waypoint(&self, name: &str) -> Option<Position> {
        self.waypoints.get(name).copied()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = (&str, Position)> {
        self.waypoints.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Places (or moves) a named waypoint, keeping location counters in step.
    /// Returns the previous position.
    pub fn set_waypoint(&mut self, name: &str, pos: Position) -> Option<Position> {
        self.location_mut(pos)?.increase_waypoint_count();
        let old = self.waypoints.insert(name.to_string(), pos);
        if let Some(prev) = old {
            if let Some(loc) = self.location_mut(prev) {
                loc.decrease_waypoint_count();
            }
        }
        old
    }

    pub fn remove_waypoint(&mut self, name: &str) -> Option<Position> {
        let old = self.waypoints.remove(name)?;
        if let Some(loc) = self.location_mut(old) {
            loc.decrease_waypoint_count();
        }
        Some(old)
    }

    pub fn house_exit(&self, house: HouseId) -> Option<Position> {
        self.house_exits.get(&house).copied()
    }

    /// Moves the exit of `house` to `pos`. Each house has at most one exit.
    pub fn set_house_exit(&mut self, house: HouseId, pos: Position) -> Option<Position> {
        if house == 0 {
            return None;
        }
        let old = self.remove_house_exit(house);
        let tile = self.tile_mut(pos)?;
        tile.house_exits.push(house);
        self.house_exits.insert(house, pos);
        self.revisions.bump_around(pos);
        old
    }

    pub fn remove_house_exit(&mut self, house: HouseId) -> Option<Position> {
        let old = self.house_exits.remove(&house)?;
        if let Some(tile) = self.tile_mut(old) {
            tile.house_exits.retain(|h| *h != house);
        }
        self.mark_changed(old);
        Some(old)
    }

    /// Drops every leaf and side table.
    pub fn clear(&mut self) {
        self.leaves.clear();
        self.waypoints.clear();
        self.house_exits.clear();
        self.revisions.clear();
    }
}

impl TileMap for MapIndex {
    fn get_tile(&self, pos: Position) -> Option<&Tile> {
        MapIndex::get_tile(self, pos)
    }

    fn get_leaf(&self, x: i32, y: i32) -> Option<&Leaf> {
        MapIndex::get_leaf(self, x, y)
    }

    fn create_leaf(&mut self, x: i32, y: i32) -> &mut Leaf {
        MapIndex::create_leaf(self, x, y)
    }
}
