use serde::Deserialize;
use tilewright_map::ItemId;

use crate::border::BorderId;

/// One `[[borders]]` entry.
#[derive(Deserialize, Clone, Debug)]
pub struct BorderDef {
    pub id: BorderId,
    #[serde(default)]
    pub group: u16,
    pub ground_equivalent: Option<u32>,
    pub pieces: PiecesDef,
}

/// Border pieces: either named slots or a full array in slot order.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum PiecesDef {
    Slots(Vec<ItemId>),
    Named(NamedPieces),
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields, default)]
pub struct NamedPieces {
    pub n: ItemId,
    pub e: ItemId,
    pub s: ItemId,
    pub w: ItemId,
    pub cne: ItemId,
    pub cse: ItemId,
    pub csw: ItemId,
    pub cnw: ItemId,
    pub dne: ItemId,
    pub dse: ItemId,
    pub dsw: ItemId,
    pub dnw: ItemId,
    pub center: ItemId,
}

/// One `[[brushes]]` entry. Fields shared by every kind live here; the rest
/// is selected by `kind`.
#[derive(Deserialize, Clone, Debug)]
pub struct BrushDef {
    pub name: String,
    pub look: Option<ItemId>,
    #[serde(default)]
    pub visible: bool,
    #[serde(flatten)]
    pub kind: BrushKindDef,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrushKindDef {
    Terrain(TerrainDef),
    Wall(WallDef),
    Door {
        closed: ItemId,
        open: ItemId,
    },
    Table {
        item: ItemId,
    },
    Carpet {
        item: ItemId,
    },
    OptionalBorder,
    Eraser,
    Flag {
        flag: String,
    },
    Creature {
        creature: String,
    },
    Spawn,
    House {
        house_id: u32,
    },
    HouseExit {
        house_id: u32,
    },
    Waypoint {
        waypoint: String,
    },
    Doodad(DoodadDef),
    Raw {
        item: ItemId,
        #[serde(default)]
        ground: bool,
    },
}

#[derive(Deserialize, Clone, Debug)]
pub struct TerrainDef {
    pub items: Vec<GroundItemDef>,
    #[serde(default)]
    pub borders: Vec<BorderRefDef>,
    pub optional_border: Option<BorderRefDef>,
    #[serde(default)]
    pub friends: Vec<String>,
    #[serde(default)]
    pub hate_friends: bool,
    pub equivalence: Option<u32>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum GroundItemDef {
    Id(ItemId),
    Weighted {
        id: ItemId,
        #[serde(default = "default_chance")]
        chance: u32,
    },
}

fn default_chance() -> u32 {
    1
}

impl GroundItemDef {
    pub fn id_and_chance(&self) -> (ItemId, u32) {
        match *self {
            GroundItemDef::Id(id) => (id, 1),
            GroundItemDef::Weighted { id, chance } => (id, chance),
        }
    }
}

/// A terrain's border reference. With `pieces` it defines an inline set
/// owned by the terrain; without, `id` names a top-level set.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct BorderRefDef {
    pub id: Option<BorderId>,
    /// `"all"` (or absent), `"none"` for empty neighbors only, or a brush name.
    pub to: Option<String>,
    #[serde(default)]
    pub group: u16,
    pub ground_equivalent: Option<u32>,
    pub pieces: Option<PiecesDef>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WallDef {
    pub horizontal: ItemId,
    pub vertical: ItemId,
    pub pole: Option<ItemId>,
    pub corner: Option<ItemId>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DoodadDef {
    pub alternates: Vec<DoodadAlternateDef>,
    #[serde(default)]
    pub on_blocking: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DoodadAlternateDef {
    pub pieces: Vec<DoodadPieceDef>,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct DoodadPieceDef {
    #[serde(default)]
    pub dx: i32,
    #[serde(default)]
    pub dy: i32,
    pub item: ItemId,
}

/// One `[[tilesets]]` entry: a named palette page.
#[derive(Deserialize, Clone, Debug)]
pub struct TilesetDef {
    pub name: String,
    #[serde(default)]
    pub brushes: Vec<String>,
}
