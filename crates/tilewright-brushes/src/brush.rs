use tilewright_map::{HouseId, ItemId, MapFlags};

use crate::border::{BorderId, BorderRef};

pub type BrushId = u32;

/// Static per-kind behavior switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub needs_borders: bool,
    pub can_drag: bool,
    pub can_smear: bool,
    pub one_size_fits_all: bool,
}

impl Capabilities {
    const fn new(
        needs_borders: bool,
        can_drag: bool,
        can_smear: bool,
        one_size_fits_all: bool,
    ) -> Self {
        Self {
            needs_borders,
            can_drag,
            can_smear,
            one_size_fits_all,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundVariant {
    pub item: ItemId,
    pub chance: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainBrush {
    pub items: Vec<GroundVariant>,
    /// Applied in order; earlier refs put their pieces lower in the stack.
    pub borders: Vec<BorderRef>,
    pub optional_border: Option<BorderId>,
    pub hate_friends: bool,
    pub equivalence: Option<u32>,
}

impl TerrainBrush {
    pub fn has_item(&self, item: ItemId) -> bool {
        self.items.iter().any(|v| v.item == item)
    }

    /// Weighted pick of a ground variant. The same seed always yields the
    /// same item.
    pub fn pick(&self, seed: u32) -> Option<ItemId> {
        let total: u64 = self.items.iter().map(|v| u64::from(v.chance.max(1))).sum();
        if total == 0 {
            return None;
        }
        let mut roll = u64::from(seed) % total;
        for v in &self.items {
            let w = u64::from(v.chance.max(1));
            if roll < w {
                return Some(v.item);
            }
            roll -= w;
        }
        self.items.last().map(|v| v.item)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallBrush {
    pub pole: ItemId,
    pub horizontal: ItemId,
    pub vertical: ItemId,
    pub corner: ItemId,
}

impl WallBrush {
    pub fn items(&self) -> [ItemId; 4] {
        [self.pole, self.horizontal, self.vertical, self.corner]
    }

    pub fn has_item(&self, item: ItemId) -> bool {
        self.items().contains(&item)
    }

    /// Piece for a wall whose vertical (N/S) and horizontal (E/W) runs are
    /// continued by the same wall.
    pub fn aligned(&self, vertical: bool, horizontal: bool) -> ItemId {
        match (vertical, horizontal) {
            (true, true) => self.corner,
            (true, false) => self.vertical,
            (false, true) => self.horizontal,
            (false, false) => self.pole,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoodadPiece {
    pub dx: i32,
    pub dy: i32,
    pub item: ItemId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoodadBrush {
    pub alternates: Vec<Vec<DoodadPiece>>,
    pub on_blocking: bool,
}

impl DoodadBrush {
    pub fn has_item(&self, item: ItemId) -> bool {
        self.alternates.iter().flatten().any(|p| p.item == item)
    }
}

/// What a brush does, with the data each kind needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrushKind {
    Terrain(TerrainBrush),
    Wall(WallBrush),
    Door { closed: ItemId, open: ItemId },
    Table { item: ItemId },
    Carpet { item: ItemId },
    OptionalBorder,
    Eraser,
    Flag { flag: MapFlags },
    Creature { creature: String },
    Spawn,
    House { house_id: HouseId },
    HouseExit { house_id: HouseId },
    Waypoint { waypoint: String },
    Doodad(DoodadBrush),
    Raw { item: ItemId, ground: bool },
}

impl BrushKind {
    pub fn capabilities(&self) -> Capabilities {
        use BrushKind::*;
        match self {
            Terrain(_) => Capabilities::new(true, true, true, false),
            Wall(_) => Capabilities::new(false, true, false, false),
            Door { .. } => Capabilities::new(false, false, true, true),
            Table { .. } | Carpet { .. } => Capabilities::new(false, true, true, false),
            OptionalBorder | Eraser => Capabilities::new(true, true, true, false),
            Flag { .. } => Capabilities::new(false, true, true, false),
            Creature { .. } => Capabilities::new(false, false, true, true),
            Spawn => Capabilities::new(false, false, false, true),
            House { .. } => Capabilities::new(false, true, true, false),
            HouseExit { .. } | Waypoint { .. } => Capabilities::new(false, false, false, true),
            Doodad(_) => Capabilities::new(false, false, true, false),
            Raw { .. } => Capabilities::new(false, true, true, false),
        }
    }

    /// Number of look-alike variants beyond the first.
    pub fn max_variation(&self) -> u32 {
        match self {
            BrushKind::Terrain(t) => t.items.len().saturating_sub(1) as u32,
            BrushKind::Doodad(d) => d.alternates.len().saturating_sub(1) as u32,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BrushKind::Terrain(_) => "terrain",
            BrushKind::Wall(_) => "wall",
            BrushKind::Door { .. } => "door",
            BrushKind::Table { .. } => "table",
            BrushKind::Carpet { .. } => "carpet",
            BrushKind::OptionalBorder => "optional_border",
            BrushKind::Eraser => "eraser",
            BrushKind::Flag { .. } => "flag",
            BrushKind::Creature { .. } => "creature",
            BrushKind::Spawn => "spawn",
            BrushKind::House { .. } => "house",
            BrushKind::HouseExit { .. } => "house_exit",
            BrushKind::Waypoint { .. } => "waypoint",
            BrushKind::Doodad(_) => "doodad",
            BrushKind::Raw { .. } => "raw",
        }
    }

    /// Every item id this brush can place, for owner lookups.
    pub fn items(&self) -> Vec<ItemId> {
        match self {
            BrushKind::Terrain(t) => t.items.iter().map(|v| v.item).collect(),
            BrushKind::Wall(w) => w.items().to_vec(),
            BrushKind::Door { closed, open } => vec![*closed, *open],
            BrushKind::Table { item } | BrushKind::Carpet { item } | BrushKind::Raw { item, .. } => {
                vec![*item]
            }
            BrushKind::Doodad(d) => d.alternates.iter().flatten().map(|p| p.item).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Brush {
    /// Assigned by the registry; 0 until registered.
    pub id: BrushId,
    pub name: String,
    pub look: ItemId,
    pub visible: bool,
    pub kind: BrushKind,
}

impl Brush {
    pub fn new(name: impl Into<String>, kind: BrushKind) -> Self {
        let look = kind.items().first().copied().unwrap_or(0);
        Self {
            id: 0,
            name: name.into(),
            look,
            visible: false,
            kind,
        }
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    #[inline]
    pub fn needs_borders(&self) -> bool {
        self.capabilities().needs_borders
    }

    #[inline]
    pub fn can_drag(&self) -> bool {
        self.capabilities().can_drag
    }

    #[inline]
    pub fn can_smear(&self) -> bool {
        self.capabilities().can_smear
    }

    #[inline]
    pub fn one_size_fits_all(&self) -> bool {
        self.capabilities().one_size_fits_all
    }

    #[inline]
    pub fn max_variation(&self) -> u32 {
        self.kind.max_variation()
    }

    pub fn as_terrain(&self) -> Option<&TerrainBrush> {
        match &self.kind {
            BrushKind::Terrain(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_wall(&self) -> Option<&WallBrush> {
        match &self.kind {
            BrushKind::Wall(w) => Some(w),
            _ => None,
        }
    }

    /// House id carried by house and house-exit brushes.
    pub fn house_id(&self) -> Option<HouseId> {
        match self.kind {
            BrushKind::House { house_id } | BrushKind::HouseExit { house_id } => Some(house_id),
            _ => None,
        }
    }
}
