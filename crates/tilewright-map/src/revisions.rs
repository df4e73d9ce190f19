use hashbrown::HashMap;
use tilewright_geom::Position;

use crate::leaf::{LEAF_SIZE, LeafKey};

/// Per-leaf change stamps. A leaf needs redrawing while its latest stamp is
/// newer than the one last marked drawn.
#[derive(Default, Debug, Clone)]
pub struct LeafRevisions {
    rev: HashMap<LeafKey, u64>,
    drawn: HashMap<LeafKey, u64>,
    counter: u64,
}

impl LeafRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    fn edge_offsets(pos: Position) -> (Vec<i32>, Vec<i32>) {
        let key = LeafKey::of(pos);
        let lx = pos.x - key.x;
        let ly = pos.y - key.y;
        let mut ox = vec![0];
        let mut oy = vec![0];
        if lx == 0 {
            ox.push(-1);
        }
        if lx == LEAF_SIZE - 1 {
            ox.push(1);
        }
        if ly == 0 {
            oy.push(-1);
        }
        if ly == LEAF_SIZE - 1 {
            oy.push(1);
        }
        (ox, oy)
    }

    /// Leaves whose drawing can change when the tile at `pos` changes: its
    /// own leaf plus any neighbor it touches across an edge.
    pub fn affected_leaves(pos: Position) -> Vec<LeafKey> {
        let key = LeafKey::of(pos);
        let (ox, oy) = Self::edge_offsets(pos);
        let mut out = Vec::with_capacity(ox.len() * oy.len());
        for dy in &oy {
            for dx in &ox {
                out.push(key.offset(*dx, *dy));
            }
        }
        out
    }

    /// Stamps every leaf affected by a change at `pos`. Returns the new stamp.
    pub fn bump_around(&mut self, pos: Position) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        let stamp = self.counter;
        for key in Self::affected_leaves(pos) {
            self.rev.insert(key, stamp);
        }
        stamp
    }

    pub fn get_rev(&self, key: LeafKey) -> u64 {
        self.rev.get(&key).copied().unwrap_or(0)
    }

    pub fn drawn_rev(&self, key: LeafKey) -> u64 {
        self.drawn.get(&key).copied().unwrap_or(0)
    }

    pub fn mark_drawn(&mut self, key: LeafKey, rev: u64) {
        let e = self.drawn.entry(key).or_insert(0);
        if rev > *e {
            *e = rev;
        }
    }

    pub fn needs_redraw(&self, key: LeafKey) -> bool {
        self.get_rev(key) > self.drawn_rev(key)
    }

    /// Latest stamp handed out; 0 before any change.
    #[inline]
    pub fn current(&self) -> u64 {
        self.counter
    }

    pub fn clear(&mut self) {
        self.rev.clear();
        self.drawn.clear();
        self.counter = 0;
    }
}
