use serde::{Deserialize, Serialize};

pub type ItemId = u16;
pub type HouseId = u32;

/// One stacked item. Border pieces are tagged so they can be replaced as a set.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub border: bool,
}

impl Item {
    #[inline]
    pub const fn new(id: ItemId) -> Self {
        Self { id, border: false }
    }

    #[inline]
    pub const fn border(id: ItemId) -> Self {
        Self { id, border: true }
    }
}

/// Per-tile map flag bits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
pub struct MapFlags(pub u32);

impl MapFlags {
    pub const NONE: MapFlags = MapFlags(0);
    pub const PROTECTION_ZONE: MapFlags = MapFlags(0x0001);
    pub const NO_PVP: MapFlags = MapFlags(0x0004);
    pub const NO_LOGOUT: MapFlags = MapFlags(0x0008);
    pub const PVP_ZONE: MapFlags = MapFlags(0x0010);
    pub const OPTIONAL_BORDER: MapFlags = MapFlags(0x0020);

    pub fn from_name(name: &str) -> Option<MapFlags> {
        match name {
            "protection_zone" | "pz" => Some(Self::PROTECTION_ZONE),
            "no_pvp" => Some(Self::NO_PVP),
            "no_logout" => Some(Self::NO_LOGOUT),
            "pvp_zone" => Some(Self::PVP_ZONE),
            "optional_border" => Some(Self::OPTIONAL_BORDER),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(self, other: MapFlags) -> bool {
        other.0 != 0 && (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: MapFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: MapFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Spawn {
    pub radius: u32,
}

/// Content of a single cell.
#[derive(Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
pub struct Tile {
    pub ground: Option<Item>,
    /// Bottom to top. Border pieces always sit below every other item.
    pub items: Vec<Item>,
    pub creature: Option<String>,
    pub spawn: Option<Spawn>,
    /// 0 = not part of a house.
    pub house_id: HouseId,
    pub house_exits: Vec<HouseId>,
    pub flags: MapFlags,
    #[serde(skip)]
    replaced_ground: Option<Item>,
}

impl Tile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ground(id: ItemId) -> Self {
        Self {
            ground: Some(Item::new(id)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ground.is_none()
            && self.items.is_empty()
            && self.creature.is_none()
            && self.spawn.is_none()
            && self.house_id == 0
            && self.house_exits.is_empty()
            && self.flags.is_empty()
    }

    #[inline]
    pub fn ground_id(&self) -> Option<ItemId> {
        self.ground.map(|g| g.id)
    }

    /// Replace the ground, remembering what was there so a later undraw can
    /// put it back.
    pub fn replace_ground(&mut self, ground: Item) {
        self.replaced_ground = self.ground.replace(ground);
    }

    /// Undo the most recent `replace_ground`.
    pub fn restore_ground(&mut self) {
        self.ground = self.replaced_ground.take();
    }

    pub fn clear_ground(&mut self) {
        self.ground = None;
        self.replaced_ground = None;
    }

    pub fn border_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|i| i.border)
            .map(|i| i.id)
            .collect()
    }

    pub fn has_borders(&self) -> bool {
        self.items.iter().any(|i| i.border)
    }

    /// Swap the border pieces for `pieces`, in order. Returns false and leaves
    /// the tile untouched when the pieces are already exactly these.
    pub fn set_borders(&mut self, pieces: &[ItemId]) -> bool {
        let unchanged = {
            let mut current = self.items.iter().filter(|i| i.border).map(|i| i.id);
            pieces.iter().all(|p| current.next() == Some(*p)) && current.next().is_none()
        };
        if unchanged {
            return false;
        }
        self.items.retain(|i| !i.border);
        let rest = std::mem::take(&mut self.items);
        self.items = pieces.iter().map(|&id| Item::border(id)).collect();
        self.items.extend(rest);
        true
    }

    pub fn has_item(&self, id: ItemId) -> bool {
        self.items.iter().any(|i| !i.border && i.id == id)
    }

    /// Pushes a regular item on top of the stack.
    pub fn add_item(&mut self, item: Item) {
        self.items.push(Item {
            border: false,
            ..item
        });
    }

    /// Rewrites the first regular item matching `pred` to `id` where it sits,
    /// or pushes `id` when none matches. Returns whether the stack changed.
    pub fn put_item<F>(&mut self, mut pred: F, id: ItemId) -> bool
    where
        F: FnMut(&Item) -> bool,
    {
        match self.items.iter_mut().find(|i| !i.border && pred(i)) {
            Some(item) if item.id == id => false,
            Some(item) => {
                item.id = id;
                true
            }
            None => {
                self.add_item(Item::new(id));
                true
            }
        }
    }

    /// Removes regular items matching `pred`; border pieces are never touched.
    pub fn remove_items<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Item) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|i| i.border || !pred(i));
        before - self.items.len()
    }

    #[inline]
    pub fn is_house_tile(&self) -> bool {
        self.house_id != 0
    }

    #[inline]
    pub fn has_house_exit(&self, house: HouseId) -> bool {
        self.house_exits.contains(&house)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borders_stay_below_items() {
        let mut t = Tile::with_ground(100);
        t.add_item(Item::new(500));
        assert!(t.set_borders(&[301, 302]));
        assert_eq!(t.items[0], Item::border(301));
        assert_eq!(t.items[1], Item::border(302));
        assert_eq!(t.items[2], Item::new(500));
        assert_eq!(t.border_ids(), vec![301, 302]);
    }

    #[test]
    fn identical_borders_are_not_rewritten() {
        let mut t = Tile::with_ground(100);
        assert!(t.set_borders(&[301]));
        let before = t.clone();
        assert!(!t.set_borders(&[301]));
        assert_eq!(t, before);
        assert!(t.set_borders(&[]));
        assert!(!t.has_borders());
    }

    #[test]
    fn put_item_rewrites_in_place() {
        let mut t = Tile::with_ground(100);
        t.add_item(Item::new(510));
        t.add_item(Item::new(520));
        assert!(!t.put_item(|i| i.id == 510, 510));
        assert!(t.put_item(|i| i.id == 510, 511));
        assert_eq!(t.items, vec![Item::new(511), Item::new(520)]);
        assert!(t.put_item(|i| i.id == 999, 530));
        assert_eq!(t.items[2], Item::new(530));
    }

    #[test]
    fn ground_replacement_round_trip() {
        let mut t = Tile::with_ground(100);
        t.replace_ground(Item::new(200));
        assert_eq!(t.ground_id(), Some(200));
        t.restore_ground();
        assert_eq!(t.ground_id(), Some(100));
    }

    #[test]
    fn flag_bits() {
        let mut f = MapFlags::NONE;
        f.insert(MapFlags::PROTECTION_ZONE);
        f.insert(MapFlags::NO_LOGOUT);
        assert!(f.contains(MapFlags::PROTECTION_ZONE));
        assert!(!f.contains(MapFlags::PVP_ZONE));
        f.remove(MapFlags::PROTECTION_ZONE);
        assert_eq!(f, MapFlags::NO_LOGOUT);
        assert_eq!(MapFlags::from_name("no_pvp"), Some(MapFlags::NO_PVP));
    }
}
