use tilewright_geom::{Band, MAP_LAYERS, Position};

use crate::tile::Tile;

/// Edge length of a leaf block, in tiles.
pub const LEAF_SIZE: i32 = 4;
const LEAF_CELLS: usize = (LEAF_SIZE * LEAF_SIZE) as usize;

/// Origin of a 4x4 leaf block: both coordinates are multiples of 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafKey {
    pub x: i32,
    pub y: i32,
}

impl LeafKey {
    /// Key of the leaf containing `(x, y)`.
    #[inline]
    pub const fn containing(x: i32, y: i32) -> Self {
        Self {
            x: x.div_euclid(LEAF_SIZE) * LEAF_SIZE,
            y: y.div_euclid(LEAF_SIZE) * LEAF_SIZE,
        }
    }

    #[inline]
    pub const fn of(pos: Position) -> Self {
        Self::containing(pos.x, pos.y)
    }

    /// Neighbor leaf, `dx`/`dy` counted in leaves.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx.saturating_mul(LEAF_SIZE)),
            y: self.y.saturating_add(dy.saturating_mul(LEAF_SIZE)),
        }
    }

    #[inline]
    pub fn contains(self, x: i32, y: i32) -> bool {
        (x.wrapping_sub(self.x) as u32) < LEAF_SIZE as u32
            && (y.wrapping_sub(self.y) as u32) < LEAF_SIZE as u32
    }

    /// Local cell of `(x, y)` inside this leaf, if it lies within.
    #[inline]
    pub fn local(self, x: i32, y: i32) -> Option<(usize, usize)> {
        if !self.contains(x, y) {
            return None;
        }
        Some((x.wrapping_sub(self.x) as usize, y.wrapping_sub(self.y) as usize))
    }
}

impl From<(i32, i32)> for LeafKey {
    fn from(value: (i32, i32)) -> Self {
        Self::containing(value.0, value.1)
    }
}

/// Per-band fetch state of a leaf in a networked session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LeafState {
    /// Neither requested nor received.
    #[default]
    Unknown,
    /// A fetch was issued; no content yet.
    Requested,
    /// Content has been received.
    Visible,
}

impl LeafState {
    #[inline]
    pub fn is_visible(self) -> bool {
        matches!(self, LeafState::Visible)
    }

    #[inline]
    pub fn is_requested(self) -> bool {
        matches!(self, LeafState::Requested)
    }
}

/// A cell slot plus the counters the editor keeps alongside the tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLocation {
    position: Position,
    tile: Option<Tile>,
    spawn_count: u32,
    waypoint_count: u32,
}

impl TileLocation {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            tile: None,
            spawn_count: 0,
            waypoint_count: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn tile(&self) -> Option<&Tile> {
        self.tile.as_ref()
    }

    #[inline]
    pub fn tile_mut(&mut self) -> Option<&mut Tile> {
        self.tile.as_mut()
    }

    pub fn tile_or_default(&mut self) -> &mut Tile {
        self.tile.get_or_insert_with(Tile::default)
    }

    pub fn set_tile(&mut self, tile: Option<Tile>) -> Option<Tile> {
        std::mem::replace(&mut self.tile, tile)
    }

    /// Drops the tile if nothing is left on it.
    pub fn prune(&mut self) {
        if self.tile.as_ref().is_some_and(Tile::is_empty) {
            self.tile = None;
        }
    }

    #[inline]
    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    pub fn increase_spawn_count(&mut self) {
        self.spawn_count += 1;
    }

    pub fn decrease_spawn_count(&mut self) {
        self.spawn_count = self.spawn_count.saturating_sub(1);
    }

    #[inline]
    pub fn waypoint_count(&self) -> u32 {
        self.waypoint_count
    }

    pub fn increase_waypoint_count(&mut self) {
        self.waypoint_count += 1;
    }

    pub fn decrease_waypoint_count(&mut self) {
        self.waypoint_count = self.waypoint_count.saturating_sub(1);
    }
}

/// 4x4 block of tile locations over every floor. Floors are allocated on
/// first write.
#[derive(Clone, Debug)]
pub struct Leaf {
    key: LeafKey,
    floors: Vec<Option<Box<[TileLocation]>>>,
    bands: [LeafState; 2],
}

impl Leaf {
    pub fn new(key: LeafKey) -> Self {
        Self {
            key,
            floors: vec![None; MAP_LAYERS as usize],
            bands: [LeafState::Unknown; 2],
        }
    }

    #[inline]
    pub fn key(&self) -> LeafKey {
        self.key
    }

    #[inline]
    pub fn idx(lx: usize, ly: usize) -> usize {
        ly * LEAF_SIZE as usize + lx
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.is_valid() && self.key.contains(pos.x, pos.y)
    }

    pub fn location(&self, pos: Position) -> Option<&TileLocation> {
        if !self.contains(pos) {
            return None;
        }
        let (lx, ly) = self.key.local(pos.x, pos.y)?;
        self.floors[pos.z as usize]
            .as_ref()
            .map(|floor| &floor[Self::idx(lx, ly)])
    }

    /// Location at `pos`, allocating its floor when needed.
    pub fn location_mut(&mut self, pos: Position) -> Option<&mut TileLocation> {
        if !self.contains(pos) {
            return None;
        }
        let (lx, ly) = self.key.local(pos.x, pos.y)?;
        let key = self.key;
        let floor = self.floors[pos.z as usize].get_or_insert_with(|| {
            (0..LEAF_CELLS)
                .map(|i| {
                    let lx = (i % LEAF_SIZE as usize) as i32;
                    let ly = (i / LEAF_SIZE as usize) as i32;
                    TileLocation::new(Position::new(key.x + lx, key.y + ly, pos.z))
                })
                .collect()
        });
        Some(&mut floor[Self::idx(lx, ly)])
    }

    #[inline]
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.location(pos).and_then(TileLocation::tile)
    }

    pub fn has_floor(&self, z: i32) -> bool {
        (0..MAP_LAYERS).contains(&z) && self.floors[z as usize].is_some()
    }

    /// Every allocated location, floor by floor.
    pub fn locations(&self) -> impl Iterator<Item = &TileLocation> {
        self.floors.iter().flatten().flat_map(|floor| floor.iter())
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.locations()
            .filter_map(|loc| loc.tile().map(|t| (loc.position(), t)))
    }

    /// Drops all tiles on the band's floors. Counters survive.
    pub fn clear_band(&mut self, band: Band) {
        for z in band.floors() {
            if let Some(floor) = self.floors[z as usize].as_mut() {
                for loc in floor.iter_mut() {
                    loc.set_tile(None);
                }
            }
        }
    }

    #[inline]
    pub fn state(&self, band: Band) -> LeafState {
        self.bands[band.index()]
    }

    #[inline]
    pub fn is_visible(&self, band: Band) -> bool {
        self.state(band).is_visible()
    }

    #[inline]
    pub fn is_requested(&self, band: Band) -> bool {
        self.state(band).is_requested()
    }

    /// Unknown -> Requested. Returns false when a request is already out or
    /// the content has arrived.
    pub fn mark_requested(&mut self, band: Band) -> bool {
        let state = &mut self.bands[band.index()];
        if *state != LeafState::Unknown {
            return false;
        }
        *state = LeafState::Requested;
        true
    }

    /// Any state -> Visible. Clears the pending request in the same step.
    pub fn mark_visible(&mut self, band: Band) {
        self.bands[band.index()] = LeafState::Visible;
    }

    /// Back to Unknown, e.g. for a placeholder created ahead of a fetch.
    pub fn mark_unknown(&mut self, band: Band) {
        self.bands[band.index()] = LeafState::Unknown;
    }
}
