//! Sparse tile map: 4x4 leaves, per-band fetch state, and change stamps.
#![forbid(unsafe_code)]

mod fetch;
mod index;
mod leaf;
mod revisions;
mod tile;

pub use fetch::{BlockView, LeafDelivery, LeafFetcher, LeafRequest, Offline};
pub use index::MapIndex;
pub use leaf::{LEAF_SIZE, Leaf, LeafKey, LeafState, TileLocation};
pub use revisions::LeafRevisions;
pub use tile::{HouseId, Item, ItemId, MapFlags, Spawn, Tile};

use tilewright_geom::Position;

/// Read access to stored tiles plus leaf creation.
pub trait TileMap {
    fn get_tile(&self, pos: Position) -> Option<&Tile>;
    fn get_leaf(&self, x: i32, y: i32) -> Option<&Leaf>;
    fn create_leaf(&mut self, x: i32, y: i32) -> &mut Leaf;
}
