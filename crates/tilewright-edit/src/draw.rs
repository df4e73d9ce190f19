//! Per-kind brush behavior over the map.
//!
//! Every brush kind answers three questions: may it be drawn here
//! (`can_draw`, no side effects), what does drawing do (`draw`), and how is
//! the last draw taken back (`undraw`). Dispatch is a match on
//! [`BrushKind`]. Every position whose content may have changed is recorded
//! in a [`ChangeSet`] so the caller can restamp leaves and recompute borders.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tilewright_brushes::{
    Brush, BrushId, BrushKind, BrushRegistry, DoodadBrush, DoodadPiece, TerrainBrush, WallBrush,
};
use tilewright_geom::{Direction, Position};
use tilewright_map::{Item, ItemId, MapFlags, MapIndex, Spawn, Tile, TileMap};

pub const DEFAULT_SPAWN_RADIUS: u32 = 3;

/// Brush-specific option passed along with a draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawParam {
    #[default]
    Default,
    /// Alternate placement: open doors, erase keeping ground.
    Alternate,
    /// Spawn radius.
    Radius(u32),
    /// Pick this variant instead of one derived from the position.
    Variation(u32),
}

/// Positions touched by a stroke, in first-touched order.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    order: Vec<Position>,
    seen: HashSet<Position>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pos: Position) {
        if self.seen.insert(pos) {
            self.order.push(pos);
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }
}

/// Stable per-position hash used to pick look-alike variants.
pub fn position_seed(pos: Position) -> u32 {
    let mut h = (pos.x as u32).wrapping_mul(0x85eb_ca6b)
        ^ (pos.y as u32).wrapping_mul(0xc2b2_ae35)
        ^ (pos.z as u32).wrapping_mul(0x27d4_eb2d);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

/// Terrain brush owning the ground at `pos`, if any.
pub fn terrain_at<M: TileMap + ?Sized>(
    registry: &BrushRegistry,
    map: &M,
    pos: Position,
) -> Option<BrushId> {
    let ground = map.get_tile(pos)?.ground_id()?;
    registry.terrain_of_item(ground)
}

fn has_ground(map: &MapIndex, pos: Position) -> bool {
    map.get_tile(pos).is_some_and(|t| t.ground.is_some())
}

fn is_wall_item(registry: &BrushRegistry, item: ItemId) -> bool {
    registry
        .owner_of_item(item)
        .and_then(|id| registry.brush(id))
        .is_some_and(|b| matches!(b.kind, BrushKind::Wall(_)))
}

pub fn can_draw(registry: &BrushRegistry, brush: &Brush, map: &MapIndex, pos: Position) -> bool {
    if !pos.is_valid() {
        return false;
    }
    match &brush.kind {
        BrushKind::Terrain(_) | BrushKind::Eraser | BrushKind::Raw { .. } => true,
        BrushKind::Wall(_)
        | BrushKind::Table { .. }
        | BrushKind::Carpet { .. }
        | BrushKind::Flag { .. }
        | BrushKind::House { .. }
        | BrushKind::Waypoint { .. } => has_ground(map, pos),
        BrushKind::Door { .. } => map
            .get_tile(pos)
            .is_some_and(|t| t.items.iter().any(|i| is_wall_item(registry, i.id))),
        BrushKind::OptionalBorder => can_draw_optional(registry, map, pos),
        BrushKind::Creature { .. } => map
            .get_tile(pos)
            .is_some_and(|t| t.ground.is_some() && t.creature.is_none()),
        BrushKind::Spawn => map
            .get_tile(pos)
            .is_some_and(|t| t.ground.is_some() && t.spawn.is_none()),
        BrushKind::HouseExit { .. } => map
            .get_tile(pos)
            .is_some_and(|t| t.ground.is_some() && !t.is_house_tile()),
        BrushKind::Doodad(d) => {
            d.on_blocking
                || doodad_alternate(d, pos, DrawParam::Default)
                    .iter()
                    .all(|p| has_ground(map, pos.offset(p.dx, p.dy)))
        }
    }
}

fn can_draw_optional(registry: &BrushRegistry, map: &MapIndex, pos: Position) -> bool {
    let Some(own) = terrain_at(registry, map, pos).and_then(|id| registry.terrain(id)) else {
        return false;
    };
    if own.optional_border.is_some() {
        return false;
    }
    Direction::ALL.iter().any(|&d| {
        terrain_at(registry, map, pos.neighbor(d))
            .and_then(|id| registry.terrain(id))
            .is_some_and(|t| t.optional_border.is_some())
    })
}

/// Apply `brush` at `pos`. Callers check [`can_draw`] first.
pub fn draw(
    registry: &BrushRegistry,
    brush: &Brush,
    map: &mut MapIndex,
    pos: Position,
    param: DrawParam,
    changes: &mut ChangeSet,
) {
    match &brush.kind {
        BrushKind::Terrain(t) => draw_terrain(registry, brush.id, t, map, pos, param, changes),
        BrushKind::Wall(w) => {
            let piece = wall_piece(w, map, pos);
            let Some(tile) = map.tile_mut(pos) else {
                return;
            };
            if tile.put_item(|i| is_wall_item(registry, i.id), piece) {
                changes.insert(pos);
            }
            realign_walls(w, map, pos, changes);
        }
        BrushKind::Door { closed, open } => {
            let Some(tile) = map.tile_mut(pos) else {
                return;
            };
            let door = if param == DrawParam::Alternate {
                *open
            } else {
                *closed
            };
            if tile.put_item(|i| i.id == *closed || i.id == *open, door) {
                changes.insert(pos);
            }
        }
        BrushKind::Table { item } | BrushKind::Carpet { item } => {
            let Some(tile) = map.tile_mut(pos) else {
                return;
            };
            if tile.put_item(|i| i.id == *item, *item) {
                changes.insert(pos);
            }
        }
        BrushKind::OptionalBorder => set_flag(map, pos, MapFlags::OPTIONAL_BORDER, true, changes),
        BrushKind::Eraser => erase(map, pos, param, changes),
        BrushKind::Flag { flag } => set_flag(map, pos, *flag, true, changes),
        BrushKind::Creature { creature } => {
            if let Some(tile) = map.tile_mut(pos) {
                tile.creature = Some(creature.clone());
                changes.insert(pos);
            }
        }
        BrushKind::Spawn => {
            let radius = match param {
                DrawParam::Radius(r) => r,
                _ => DEFAULT_SPAWN_RADIUS,
            };
            place_spawn(map, pos, radius, changes);
        }
        BrushKind::House { house_id } => {
            if let Some(tile) = map.tile_mut(pos) {
                tile.house_id = *house_id;
                changes.insert(pos);
            }
        }
        BrushKind::HouseExit { house_id } => {
            if let Some(old) = map.set_house_exit(*house_id, pos) {
                changes.insert(old);
            }
            if map.house_exit(*house_id) == Some(pos) {
                changes.insert(pos);
            }
        }
        BrushKind::Waypoint { waypoint } => {
            if let Some(old) = map.set_waypoint(waypoint, pos) {
                changes.insert(old);
            }
            changes.insert(pos);
        }
        BrushKind::Doodad(d) => {
            for piece in doodad_alternate(d, pos, param) {
                let target = pos.offset(piece.dx, piece.dy);
                if let Some(tile) = map.tile_mut(target) {
                    if !tile.has_item(piece.item) {
                        tile.add_item(Item::new(piece.item));
                    }
                    changes.insert(target);
                }
            }
        }
        BrushKind::Raw { item, ground } => {
            let Some(tile) = map.tile_mut(pos) else {
                return;
            };
            if *ground {
                if tile.ground_id() != Some(*item) {
                    tile.replace_ground(Item::new(*item));
                }
            } else if !tile.has_item(*item) {
                tile.add_item(Item::new(*item));
            }
            changes.insert(pos);
        }
    }
}

/// Take back what `draw` did at `pos`.
pub fn undraw(
    registry: &BrushRegistry,
    brush: &Brush,
    map: &mut MapIndex,
    pos: Position,
    param: DrawParam,
    changes: &mut ChangeSet,
) {
    match &brush.kind {
        BrushKind::Terrain(t) => {
            let Some(tile) = map.tile_mut(pos) else {
                return;
            };
            if tile.ground_id().is_some_and(|g| t.has_item(g)) {
                tile.restore_ground();
                changes.insert(pos);
            }
        }
        BrushKind::Wall(w) => {
            if let Some(tile) = map.tile_mut(pos) {
                if tile.remove_items(|i| is_wall_item(registry, i.id)) > 0 {
                    changes.insert(pos);
                }
            }
            realign_walls(w, map, pos, changes);
        }
        BrushKind::Door { closed, open } => {
            remove_items(map, pos, |i| i == *closed || i == *open, changes);
        }
        BrushKind::Table { item } | BrushKind::Carpet { item } => {
            remove_items(map, pos, |i| i == *item, changes);
        }
        BrushKind::OptionalBorder => set_flag(map, pos, MapFlags::OPTIONAL_BORDER, false, changes),
        BrushKind::Eraser => erase(map, pos, param, changes),
        BrushKind::Flag { flag } => set_flag(map, pos, *flag, false, changes),
        BrushKind::Creature { .. } => {
            if let Some(tile) = map.tile_mut(pos) {
                tile.creature = None;
                changes.insert(pos);
            }
        }
        BrushKind::Spawn => remove_spawn(map, pos, changes),
        BrushKind::House { house_id } => {
            if let Some(tile) = map.tile_mut(pos) {
                if tile.house_id == *house_id {
                    tile.house_id = 0;
                    changes.insert(pos);
                }
            }
        }
        BrushKind::HouseExit { house_id } => {
            if map.house_exit(*house_id) == Some(pos) {
                map.remove_house_exit(*house_id);
                changes.insert(pos);
            }
        }
        BrushKind::Waypoint { waypoint } => {
            if map.waypoint(waypoint) == Some(pos) {
                map.remove_waypoint(waypoint);
                changes.insert(pos);
            }
        }
        BrushKind::Doodad(d) => {
            for piece in d.alternates.iter().flatten() {
                let target = pos.offset(piece.dx, piece.dy);
                remove_items(map, target, |i| i == piece.item, changes);
            }
        }
        BrushKind::Raw { item, ground } => {
            let Some(tile) = map.tile_mut(pos) else {
                return;
            };
            if *ground {
                if tile.ground_id() == Some(*item) {
                    tile.restore_ground();
                }
            } else {
                tile.remove_items(|i| i.id == *item);
            }
            changes.insert(pos);
        }
    }
}

/// Toggle the door at `pos` between open and closed. False when there is no
/// door.
pub fn switch_door(registry: &BrushRegistry, map: &mut MapIndex, pos: Position) -> bool {
    let Some(tile) = map.get_tile(pos) else {
        return false;
    };
    let swap = tile.items.iter().enumerate().find_map(|(idx, item)| {
        let brush = registry.owner_of_item(item.id).and_then(|id| registry.brush(id))?;
        match brush.kind {
            BrushKind::Door { closed, open } if item.id == closed => Some((idx, open)),
            BrushKind::Door { closed, open } if item.id == open => Some((idx, closed)),
            _ => None,
        }
    });
    let Some((idx, next)) = swap else {
        return false;
    };
    if let Some(tile) = map.tile_mut(pos) {
        tile.items[idx].id = next;
    }
    map.mark_changed(pos);
    true
}

fn draw_terrain(
    registry: &BrushRegistry,
    id: BrushId,
    terrain: &TerrainBrush,
    map: &mut MapIndex,
    pos: Position,
    param: DrawParam,
    changes: &mut ChangeSet,
) {
    if terrain_at(registry, &*map, pos) == Some(id) {
        return;
    }
    let item = match param {
        DrawParam::Variation(n) => terrain
            .items
            .get(n as usize)
            .or(terrain.items.last())
            .map(|v| v.item),
        _ => terrain.pick(position_seed(pos)),
    };
    let Some(item) = item else {
        return;
    };
    if let Some(tile) = map.tile_mut(pos) {
        tile.replace_ground(Item::new(item));
        changes.insert(pos);
    }
}

fn wall_piece(wall: &WallBrush, map: &MapIndex, pos: Position) -> ItemId {
    let holds = |d: Direction| {
        map.get_tile(pos.neighbor(d))
            .is_some_and(|t| t.items.iter().any(|i| wall.has_item(i.id)))
    };
    let vertical = holds(Direction::North) || holds(Direction::South);
    let horizontal = holds(Direction::East) || holds(Direction::West);
    wall.aligned(vertical, horizontal)
}

/// Re-pick the pieces of `wall` around `pos` (and at `pos`) after a change.
fn realign_walls(wall: &WallBrush, map: &mut MapIndex, pos: Position, changes: &mut ChangeSet) {
    let mut cells = vec![pos];
    cells.extend(Direction::STRAIGHT.iter().map(|&d| pos.neighbor(d)));
    for cell in cells {
        let holds = map
            .get_tile(cell)
            .is_some_and(|t| t.items.iter().any(|i| wall.has_item(i.id)));
        if !holds {
            continue;
        }
        let piece = wall_piece(wall, map, cell);
        if let Some(tile) = map.tile_mut(cell) {
            for item in tile.items.iter_mut().filter(|i| !i.border) {
                if wall.has_item(item.id) && item.id != piece {
                    item.id = piece;
                    changes.insert(cell);
                }
            }
        }
    }
}

fn set_flag(map: &mut MapIndex, pos: Position, flag: MapFlags, on: bool, changes: &mut ChangeSet) {
    let Some(tile) = map.tile_mut(pos) else {
        return;
    };
    if on {
        tile.flags.insert(flag);
    } else {
        tile.flags.remove(flag);
    }
    changes.insert(pos);
}

fn remove_items<F>(map: &mut MapIndex, pos: Position, pred: F, changes: &mut ChangeSet)
where
    F: Fn(ItemId) -> bool,
{
    if map.get_tile(pos).is_none() {
        return;
    }
    if let Some(tile) = map.tile_mut(pos) {
        if tile.remove_items(|i| pred(i.id)) > 0 {
            changes.insert(pos);
        }
    }
}

fn erase(map: &mut MapIndex, pos: Position, param: DrawParam, changes: &mut ChangeSet) {
    if map.get_tile(pos).is_none() {
        return;
    }
    remove_spawn(map, pos, changes);
    if let Some(tile) = map.tile_mut(pos) {
        tile.remove_items(|_| true);
        tile.creature = None;
        if param != DrawParam::Alternate {
            tile.clear_ground();
        }
        changes.insert(pos);
    }
}

fn spawn_area(pos: Position, radius: u32) -> impl Iterator<Item = Position> {
    let r = radius as i32;
    (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| pos.offset(dx, dy)))
}

fn place_spawn(map: &mut MapIndex, pos: Position, radius: u32, changes: &mut ChangeSet) {
    match map.tile_mut(pos) {
        Some(tile) if tile.spawn.is_none() => tile.spawn = Some(Spawn { radius }),
        _ => return,
    }
    for cell in spawn_area(pos, radius) {
        if let Some(loc) = map.location_mut(cell) {
            loc.increase_spawn_count();
        }
    }
    changes.insert(pos);
}

fn remove_spawn(map: &mut MapIndex, pos: Position, changes: &mut ChangeSet) {
    let Some(Spawn { radius }) = map.get_tile(pos).and_then(|t| t.spawn) else {
        return;
    };
    if let Some(tile) = map.tile_mut(pos) {
        tile.spawn = None;
    }
    for cell in spawn_area(pos, radius) {
        if let Some(loc) = map.location_mut(cell) {
            loc.decrease_spawn_count();
        }
    }
    changes.insert(pos);
}

fn doodad_alternate(doodad: &DoodadBrush, pos: Position, param: DrawParam) -> &[DoodadPiece] {
    let len = doodad.alternates.len();
    if len == 0 {
        return &[];
    }
    let idx = match param {
        DrawParam::Variation(n) => n as usize % len,
        _ => position_seed(pos) as usize % len,
    };
    &doodad.alternates[idx]
}

/// Whether `tile` holds anything this brush would have placed.
pub fn tile_shows_brush(brush: &Brush, tile: &Tile) -> bool {
    match &brush.kind {
        BrushKind::Terrain(t) => tile.ground_id().is_some_and(|g| t.has_item(g)),
        BrushKind::Flag { flag } => tile.flags.contains(*flag),
        BrushKind::House { house_id } => tile.house_id == *house_id,
        BrushKind::HouseExit { house_id } => tile.has_house_exit(*house_id),
        BrushKind::Spawn => tile.spawn.is_some(),
        BrushKind::Creature { creature } => tile.creature.as_deref() == Some(creature.as_str()),
        BrushKind::OptionalBorder => tile.flags.contains(MapFlags::OPTIONAL_BORDER),
        BrushKind::Raw { item, ground: true } => tile.ground_id() == Some(*item),
        kind => {
            let items = kind.items();
            tile.items.iter().any(|i| !i.border && items.contains(&i.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_stable_and_spread() {
        let a = position_seed(Position::new(10, 20, 7));
        assert_eq!(a, position_seed(Position::new(10, 20, 7)));
        assert_ne!(a, position_seed(Position::new(11, 20, 7)));
        assert_ne!(a, position_seed(Position::new(10, 20, 6)));
    }

    #[test]
    fn change_set_keeps_first_order() {
        let mut c = ChangeSet::new();
        c.insert(Position::new(1, 0, 7));
        c.insert(Position::new(0, 0, 7));
        c.insert(Position::new(1, 0, 7));
        assert_eq!(
            c.positions(),
            &[Position::new(1, 0, 7), Position::new(0, 0, 7)]
        );
    }
}
