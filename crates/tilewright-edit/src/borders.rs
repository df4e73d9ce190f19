//! Auto-border engine.
//!
//! A tile's border pieces come from the border refs of its own terrain. For
//! each ref the eight neighbors are classified *same* or *different*, the
//! signature is mapped onto the 13 slots, same-group sets are thinned to one
//! per slot, and the surviving pieces replace whatever border pieces the tile
//! carried before. Tiles whose pieces come out unchanged are left alone.

use hashbrown::HashSet;
use tilewright_brushes::{
    AutoBorder, BORDER_SLOTS, BorderSlot, BorderTarget, BrushId, BrushRegistry, EngineConfig,
    GroupPrecedence, HateFriendsScope, TerrainBrush,
};
use tilewright_geom::{Direction, Position};
use tilewright_map::{ItemId, MapFlags, MapIndex, TileMap};

use crate::draw::terrain_at;

/// Slot selection for one border set at one tile.
pub type SlotMask = [bool; BORDER_SLOTS];

/// Map an eight-neighbor "different" signature (indexed by
/// [`Direction::index`]) onto the slots `border` can fill.
pub fn select_slots(border: &AutoBorder, different: [bool; 8]) -> SlotMask {
    let mut mask = [false; BORDER_SLOTS];
    if different.iter().all(|d| *d) && border.has_piece(BorderSlot::Center) {
        mask[BorderSlot::Center.index()] = true;
        return mask;
    }
    for dir in Direction::STRAIGHT {
        if !different[dir.index()] {
            continue;
        }
        if let Some(slot) = BorderSlot::straight(dir) {
            mask[slot.index()] = true;
        }
    }
    for dir in Direction::DIAGONAL {
        let Some((outer, inner)) = BorderSlot::corners(dir) else {
            continue;
        };
        let (a, b) = dir.flanks();
        let (da, db) = (different[a.index()], different[b.index()]);
        if da && db {
            mask[outer.index()] = true;
        } else if !da && !db && different[dir.index()] {
            mask[inner.index()] = true;
        }
    }
    for slot in BorderSlot::ALL {
        if !border.has_piece(slot) {
            mask[slot.index()] = false;
        }
    }
    mask
}

struct Candidate<'r> {
    border: &'r AutoBorder,
    target: BorderTarget,
    mask: SlotMask,
}

/// Border recomputation bound to a registry and a policy.
#[derive(Clone, Copy)]
pub struct BorderEngine<'r> {
    registry: &'r BrushRegistry,
    config: EngineConfig,
}

impl<'r> BorderEngine<'r> {
    pub fn new(registry: &'r BrushRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    #[inline]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Whether `neighbor` blends with the center terrain under `border`.
    /// An empty neighbor never does.
    pub fn is_same(
        &self,
        center_id: BrushId,
        center: &TerrainBrush,
        border: &AutoBorder,
        neighbor: Option<BrushId>,
    ) -> bool {
        let Some(n) = neighbor else {
            return false;
        };
        if n == center_id {
            return true;
        }
        let other = self.registry.terrain(n);
        if let (Some(eq), Some(other)) = (border.ground_equivalent, other) {
            if other.equivalence == Some(eq) {
                return true;
            }
        }
        if !self.registry.are_friends(center_id, n) {
            return false;
        }
        let hated = match self.config.hate_friends {
            HateFriendsScope::DeclaringCenter => center.hate_friends,
            HateFriendsScope::Mutual => {
                center.hate_friends || other.is_some_and(|t| t.hate_friends)
            }
        };
        !hated
    }

    fn neighbors<M: TileMap + ?Sized>(&self, map: &M, pos: Position) -> [Option<BrushId>; 8] {
        Direction::ALL.map(|d| terrain_at(self.registry, map, pos.neighbor(d)))
    }

    /// Border pieces the tile at `pos` should carry, bottom to top.
    /// `initiator` is the brush whose stroke caused the recompute.
    pub fn compute<M: TileMap + ?Sized>(
        &self,
        map: &M,
        pos: Position,
        initiator: Option<BrushId>,
    ) -> Vec<ItemId> {
        let Some(tile) = map.get_tile(pos) else {
            return Vec::new();
        };
        let center_id = tile
            .ground_id()
            .and_then(|g| self.registry.terrain_of_item(g));
        let neighbors = self.neighbors(map, pos);
        let mut out: Vec<ItemId> = Vec::new();

        let center = center_id.and_then(|id| self.registry.terrain(id).map(|t| (id, t)));
        if let Some((center_id, center)) = center {
            let mut candidates: Vec<Candidate<'r>> = Vec::with_capacity(center.borders.len());
            for r in &center.borders {
                let Some(border) = self.registry.border(r.border) else {
                    continue;
                };
                let different = neighbors.map(|n| {
                    !self.is_same(center_id, center, border, n) && r.target.matches(n)
                });
                candidates.push(Candidate {
                    border,
                    target: r.target,
                    mask: select_slots(border, different),
                });
            }
            self.resolve_groups(&mut candidates, initiator);
            for c in &candidates {
                emit(&mut out, c.border, &c.mask);
            }
        }

        if tile.flags.contains(MapFlags::OPTIONAL_BORDER) {
            self.optional_pieces(center_id, &neighbors, &mut out);
        }
        out
    }

    fn optional_pieces(
        &self,
        center_id: Option<BrushId>,
        neighbors: &[Option<BrushId>; 8],
        out: &mut Vec<ItemId>,
    ) {
        let declared = |n: Option<BrushId>| {
            n.filter(|&id| Some(id) != center_id)
                .and_then(|id| self.registry.terrain(id))
                .and_then(|t| t.optional_border)
        };
        let Some(border_id) = neighbors.iter().find_map(|&n| declared(n)) else {
            return;
        };
        let Some(border) = self.registry.border(border_id) else {
            return;
        };
        let different = neighbors.map(|n| declared(n) == Some(border_id));
        emit(out, border, &select_slots(border, different));
    }

    /// Thin same-group candidates so each slot keeps at most one of them.
    fn resolve_groups(&self, candidates: &mut [Candidate<'r>], initiator: Option<BrushId>) {
        let favored = |c: &Candidate<'r>| match initiator {
            Some(id) => c.border.owner == Some(id) || c.target == BorderTarget::Brush(id),
            None => false,
        };
        for slot in BorderSlot::ALL {
            let s = slot.index();
            let groups: HashSet<u16> = candidates
                .iter()
                .filter(|c| c.mask[s] && c.border.group != 0)
                .map(|c| c.border.group)
                .collect();
            for group in groups {
                let contenders = || {
                    candidates
                        .iter()
                        .enumerate()
                        .filter(move |(_, c)| c.mask[s] && c.border.group == group)
                };
                let winner = match self.config.group_precedence {
                    GroupPrecedence::InitiatingBrush => contenders()
                        .min_by_key(|(_, c)| (!favored(*c), c.border.seq()))
                        .map(|(i, _)| i),
                    GroupPrecedence::FirstRegistered => contenders()
                        .min_by_key(|(_, c)| c.border.seq())
                        .map(|(i, _)| i),
                };
                let losers: Vec<usize> = contenders()
                    .map(|(i, _)| i)
                    .filter(|&i| Some(i) != winner)
                    .collect();
                for i in losers {
                    candidates[i].mask[s] = false;
                }
            }
        }
    }

    /// Recompute the tile at `pos` and write the result if it differs.
    /// Returns whether the tile was rewritten.
    pub fn apply(&self, map: &mut MapIndex, pos: Position, initiator: Option<BrushId>) -> bool {
        if map.get_tile(pos).is_none() {
            return false;
        }
        let pieces = self.compute(&*map, pos, initiator);
        let changed = map
            .tile_mut(pos)
            .is_some_and(|tile| tile.set_borders(&pieces));
        if changed {
            map.mark_changed(pos);
        }
        changed
    }

    /// Recompute every tile in the 3x3 neighborhoods of `changed`, each
    /// once. Returns how many tiles were rewritten.
    pub fn recompute_region(
        &self,
        map: &mut MapIndex,
        changed: &[Position],
        initiator: Option<BrushId>,
    ) -> usize {
        let mut seen: HashSet<Position> = HashSet::new();
        let mut rewritten = 0usize;
        for &center in changed {
            for pos in center.neighborhood() {
                if seen.insert(pos) && self.apply(map, pos, initiator) {
                    rewritten += 1;
                }
            }
        }
        log::debug!(
            target: "borders",
            "recomputed {} tiles around {} changes, {} rewritten",
            seen.len(),
            changed.len(),
            rewritten
        );
        rewritten
    }
}

fn emit(out: &mut Vec<ItemId>, border: &AutoBorder, mask: &SlotMask) {
    for slot in BorderSlot::ALL {
        if !mask[slot.index()] {
            continue;
        }
        if let Some(piece) = border.piece(slot) {
            if !out.contains(&piece) {
                out.push(piece);
            }
        }
    }
}
