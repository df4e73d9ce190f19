use tilewright_geom::Direction;
use tilewright_map::ItemId;

use crate::brush::BrushId;
use crate::config::PiecesDef;

pub type BorderId = u32;

pub const BORDER_SLOTS: usize = 13;
/// Configured border ids live below this; runtime ids count up from it.
pub const RUNTIME_BORDER_BASE: BorderId = 0x1_0000;

/// The 13 border piece positions, in storage and output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BorderSlot {
    North,
    East,
    South,
    West,
    CornerNE,
    CornerSE,
    CornerSW,
    CornerNW,
    DiagonalNE,
    DiagonalSE,
    DiagonalSW,
    DiagonalNW,
    Center,
}

impl BorderSlot {
    pub const ALL: [BorderSlot; BORDER_SLOTS] = [
        BorderSlot::North,
        BorderSlot::East,
        BorderSlot::South,
        BorderSlot::West,
        BorderSlot::CornerNE,
        BorderSlot::CornerSE,
        BorderSlot::CornerSW,
        BorderSlot::CornerNW,
        BorderSlot::DiagonalNE,
        BorderSlot::DiagonalSE,
        BorderSlot::DiagonalSW,
        BorderSlot::DiagonalNW,
        BorderSlot::Center,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BorderSlot::North => "n",
            BorderSlot::East => "e",
            BorderSlot::South => "s",
            BorderSlot::West => "w",
            BorderSlot::CornerNE => "cne",
            BorderSlot::CornerSE => "cse",
            BorderSlot::CornerSW => "csw",
            BorderSlot::CornerNW => "cnw",
            BorderSlot::DiagonalNE => "dne",
            BorderSlot::DiagonalSE => "dse",
            BorderSlot::DiagonalSW => "dsw",
            BorderSlot::DiagonalNW => "dnw",
            BorderSlot::Center => "center",
        }
    }

    /// Straight edge facing `dir`; None for diagonals.
    pub fn straight(dir: Direction) -> Option<BorderSlot> {
        match dir {
            Direction::North => Some(BorderSlot::North),
            Direction::East => Some(BorderSlot::East),
            Direction::South => Some(BorderSlot::South),
            Direction::West => Some(BorderSlot::West),
            _ => None,
        }
    }

    /// Outer corner and inner diagonal slots for a diagonal direction.
    pub fn corners(dir: Direction) -> Option<(BorderSlot, BorderSlot)> {
        match dir {
            Direction::NorthEast => Some((BorderSlot::CornerNE, BorderSlot::DiagonalNE)),
            Direction::SouthEast => Some((BorderSlot::CornerSE, BorderSlot::DiagonalSE)),
            Direction::SouthWest => Some((BorderSlot::CornerSW, BorderSlot::DiagonalSW)),
            Direction::NorthWest => Some((BorderSlot::CornerNW, BorderSlot::DiagonalNW)),
            _ => None,
        }
    }
}

/// A set of border pieces. Slot value 0 means the set has no piece there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoBorder {
    pub id: BorderId,
    /// 0 = ungrouped. Sets sharing a nonzero group exclude each other per slot.
    pub group: u16,
    pub ground_equivalent: Option<u32>,
    /// Terrain that defined this set inline, if any.
    pub owner: Option<BrushId>,
    pub tiles: [ItemId; BORDER_SLOTS],
    pub(crate) seq: usize,
}

impl AutoBorder {
    pub fn new(id: BorderId, tiles: [ItemId; BORDER_SLOTS]) -> Self {
        Self {
            id,
            group: 0,
            ground_equivalent: None,
            owner: None,
            tiles,
            seq: 0,
        }
    }

    pub fn with_group(mut self, group: u16) -> Self {
        self.group = group;
        self
    }

    #[inline]
    pub fn piece(&self, slot: BorderSlot) -> Option<ItemId> {
        match self.tiles[slot.index()] {
            0 => None,
            id => Some(id),
        }
    }

    pub fn has_piece(&self, slot: BorderSlot) -> bool {
        self.piece(slot).is_some()
    }

    pub fn contains_item(&self, item: ItemId) -> bool {
        item != 0 && self.tiles.contains(&item)
    }

    /// Registration order within the registry.
    #[inline]
    pub fn seq(&self) -> usize {
        self.seq
    }
}

/// Which differing neighbors a border reference reacts to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BorderTarget {
    /// Any different neighbor, including an empty one.
    #[default]
    Any,
    /// Only neighbors without terrain.
    Void,
    /// Only neighbors of this terrain.
    Brush(BrushId),
}

impl BorderTarget {
    #[inline]
    pub fn matches(self, neighbor: Option<BrushId>) -> bool {
        match self {
            BorderTarget::Any => true,
            BorderTarget::Void => neighbor.is_none(),
            BorderTarget::Brush(id) => neighbor == Some(id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BorderRef {
    pub border: BorderId,
    pub target: BorderTarget,
}

/// Turn configured pieces into the 13 slots, or explain why not.
pub(crate) fn compile_pieces(def: &PiecesDef) -> Result<[ItemId; BORDER_SLOTS], String> {
    match def {
        PiecesDef::Slots(v) => {
            <[ItemId; BORDER_SLOTS]>::try_from(v.as_slice()).map_err(|_| {
                format!("expected {BORDER_SLOTS} border pieces, got {}", v.len())
            })
        }
        PiecesDef::Named(n) => Ok([
            n.n, n.e, n.s, n.w, n.cne, n.cse, n.csw, n.cnw, n.dne, n.dse, n.dsw, n.dnw, n.center,
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamedPieces;

    #[test]
    fn slot_names_follow_storage_order() {
        for (i, slot) in BorderSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
        assert_eq!(BorderSlot::Center.name(), "center");
    }

    #[test]
    fn piece_arrays_must_be_complete() {
        let short = PiecesDef::Slots(vec![1; 12]);
        assert!(compile_pieces(&short).is_err());
        let full = PiecesDef::Slots((1..=13).collect());
        let tiles = compile_pieces(&full).unwrap();
        assert_eq!(tiles[BorderSlot::Center.index()], 13);
        let named = PiecesDef::Named(NamedPieces {
            n: 301,
            w: 304,
            ..NamedPieces::default()
        });
        let tiles = compile_pieces(&named).unwrap();
        let border = AutoBorder::new(1, tiles);
        assert_eq!(border.piece(BorderSlot::North), Some(301));
        assert_eq!(border.piece(BorderSlot::West), Some(304));
        assert_eq!(border.piece(BorderSlot::East), None);
    }

    #[test]
    fn targets_match_neighbors() {
        assert!(BorderTarget::Any.matches(None));
        assert!(BorderTarget::Any.matches(Some(3)));
        assert!(BorderTarget::Void.matches(None));
        assert!(!BorderTarget::Void.matches(Some(3)));
        assert!(BorderTarget::Brush(3).matches(Some(3)));
        assert!(!BorderTarget::Brush(3).matches(Some(4)));
    }
}
