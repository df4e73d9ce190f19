use std::collections::{BTreeMap, HashMap, HashSet};
use std::error::Error;
use std::fs;
use std::path::Path;

use tilewright_map::{ItemId, MapFlags};

use crate::border::{
    AutoBorder, BorderId, BorderRef, BorderTarget, RUNTIME_BORDER_BASE,
    compile_pieces,
};
use crate::brush::{
    Brush, BrushId, BrushKind, DoodadBrush, DoodadPiece, GroundVariant, TerrainBrush, WallBrush,
};
use crate::config::{BorderDef, BorderRefDef, BrushDef, BrushKindDef, TerrainDef, TilesetDef};
use crate::policy::EngineConfig;
use crate::warnings::Warnings;

/// Every brush and border set known to an editing session.
#[derive(Clone, Debug)]
pub struct BrushRegistry {
    brushes: Vec<Brush>,
    by_name: HashMap<String, Vec<BrushId>>,
    borders: BTreeMap<BorderId, AutoBorder>,
    friends: HashSet<(BrushId, BrushId)>,
    item_terrain: HashMap<ItemId, BrushId>,
    item_owner: HashMap<ItemId, BrushId>,
    tilesets: BTreeMap<String, Vec<BrushId>>,
    engine: EngineConfig,
    next_runtime_border: BorderId,
}

impl Default for BrushRegistry {
    fn default() -> Self {
        Self {
            brushes: Vec::new(),
            by_name: HashMap::new(),
            borders: BTreeMap::new(),
            friends: HashSet::new(),
            item_terrain: HashMap::new(),
            item_owner: HashMap::new(),
            tilesets: BTreeMap::new(),
            engine: EngineConfig::default(),
            next_runtime_border: RUNTIME_BORDER_BASE,
        }
    }
}

#[inline]
fn pair(a: BrushId, b: BrushId) -> (BrushId, BrushId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn entries<'a>(doc: &'a toml::Value, key: &str, warnings: &mut Warnings) -> &'a [toml::Value] {
    match doc.get(key) {
        None => &[],
        Some(toml::Value::Array(items)) => items.as_slice(),
        Some(_) => {
            warnings.push(format!("`{key}` must be an array of tables; ignored"));
            &[]
        }
    }
}

fn entry_label(key: &str, index: usize, entry: &toml::Value) -> String {
    match entry.get("name").and_then(toml::Value::as_str) {
        Some(name) => format!("{key}[{index}] `{name}`"),
        None => match entry.get("id").and_then(toml::Value::as_integer) {
            Some(id) => format!("{key}[{index}] id {id}"),
            None => format!("{key}[{index}]"),
        },
    }
}

impl BrushRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the brushes every session has regardless of
    /// configuration.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        let builtins = [
            ("eraser", BrushKind::Eraser),
            ("optional_border", BrushKind::OptionalBorder),
            ("spawn", BrushKind::Spawn),
            (
                "protection_zone",
                BrushKind::Flag {
                    flag: MapFlags::PROTECTION_ZONE,
                },
            ),
            (
                "no_pvp",
                BrushKind::Flag {
                    flag: MapFlags::NO_PVP,
                },
            ),
            (
                "no_logout",
                BrushKind::Flag {
                    flag: MapFlags::NO_LOGOUT,
                },
            ),
            (
                "pvp_zone",
                BrushKind::Flag {
                    flag: MapFlags::PVP_ZONE,
                },
            ),
        ];
        for (name, kind) in builtins {
            let mut brush = Brush::new(name, kind);
            brush.visible = true;
            reg.add_brush(brush);
        }
        reg
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<(Self, Warnings), Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Builtins plus everything in `src`. Only a document that is not valid
    /// TOML fails; bad entries end up in the returned warnings.
    pub fn from_toml_str(src: &str) -> Result<(Self, Warnings), Box<dyn Error>> {
        let doc: toml::Value = toml::from_str(src)?;
        let mut reg = Self::with_builtins();
        let mut warnings = Warnings::new();
        reg.load(&doc, &mut warnings);
        Ok((reg, warnings))
    }

    /// Merge a configuration document into the registry: borders, then
    /// brushes, then tilesets. A malformed entry is skipped with a warning.
    pub fn load(&mut self, doc: &toml::Value, warnings: &mut Warnings) {
        if let Some(engine) = doc.get("engine") {
            let parsed: Result<EngineConfig, _> = engine.clone().try_into();
            match parsed {
                Ok(cfg) => self.engine = cfg,
                Err(e) => warnings.push(format!("engine: {e}")),
            }
        }

        for (i, entry) in entries(doc, "borders", warnings).iter().enumerate() {
            let label = entry_label("borders", i, entry);
            let parsed: Result<BorderDef, _> = entry.clone().try_into();
            match parsed {
                Ok(def) => {
                    if let Err(e) = self.load_border(def) {
                        warnings.push(format!("{label}: {e}"));
                    }
                }
                Err(e) => warnings.push(format!("{label}: {e}")),
            }
        }

        // Ids are handed out before compiling so brushes can name each
        // other regardless of order in the file.
        let mut accepted: Vec<(BrushId, BrushDef)> = Vec::new();
        for (i, entry) in entries(doc, "brushes", warnings).iter().enumerate() {
            let label = entry_label("brushes", i, entry);
            let parsed: Result<BrushDef, _> = entry.clone().try_into();
            let def = match parsed {
                Ok(def) => def,
                Err(e) => {
                    warnings.push(format!("{label}: {e}"));
                    continue;
                }
            };
            if let Err(e) = validate(&def) {
                warnings.push(format!("{label}: {e}"));
                continue;
            }
            let id = (self.brushes.len() + accepted.len() + 1) as BrushId;
            accepted.push((id, def));
        }

        let mut terrain_names: HashMap<String, BrushId> = HashMap::new();
        for b in &self.brushes {
            if matches!(b.kind, BrushKind::Terrain(_)) {
                terrain_names.entry(b.name.clone()).or_insert(b.id);
            }
        }
        for (id, def) in &accepted {
            if matches!(def.kind, BrushKindDef::Terrain(_)) {
                terrain_names.entry(def.name.clone()).or_insert(*id);
            }
        }

        for (id, def) in accepted {
            let brush = self.compile(id, def, &terrain_names, warnings);
            let assigned = self.add_brush(brush);
            debug_assert_eq!(assigned, id);
        }

        for (i, entry) in entries(doc, "tilesets", warnings).iter().enumerate() {
            let label = entry_label("tilesets", i, entry);
            let parsed: Result<TilesetDef, _> = entry.clone().try_into();
            match parsed {
                Ok(def) => self.load_tileset(def, &label, warnings),
                Err(e) => warnings.push(format!("{label}: {e}")),
            }
        }

        log::info!(
            target: "brushes",
            "loaded {} brushes, {} borders, {} tilesets ({} warnings)",
            self.brushes.len(),
            self.borders.len(),
            self.tilesets.len(),
            warnings.len()
        );
    }

    fn load_border(&mut self, def: BorderDef) -> Result<BorderId, String> {
        let tiles = compile_pieces(&def.pieces)?;
        let mut border = AutoBorder::new(def.id, tiles).with_group(def.group);
        border.ground_equivalent = def.ground_equivalent;
        self.add_border(border)
    }

    fn load_tileset(&mut self, def: TilesetDef, label: &str, warnings: &mut Warnings) {
        let mut ids = Vec::with_capacity(def.brushes.len());
        for name in &def.brushes {
            match self.by_name.get(name) {
                Some(found) => {
                    for &id in found {
                        if let Some(b) = id
                            .checked_sub(1)
                            .and_then(|i| self.brushes.get_mut(i as usize))
                        {
                            b.visible = true;
                        }
                    }
                    ids.extend(found.iter().copied());
                }
                None => warnings.push(format!("{label}: unknown brush `{name}`")),
            }
        }
        self.tilesets.entry(def.name).or_default().extend(ids);
    }

    fn compile(
        &mut self,
        id: BrushId,
        def: BrushDef,
        terrain_names: &HashMap<String, BrushId>,
        warnings: &mut Warnings,
    ) -> Brush {
        let BrushDef {
            name,
            look,
            visible,
            kind,
        } = def;
        let kind = match kind {
            BrushKindDef::Terrain(t) => {
                BrushKind::Terrain(self.compile_terrain(id, &name, t, terrain_names, warnings))
            }
            BrushKindDef::Wall(w) => BrushKind::Wall(WallBrush {
                pole: w.pole.unwrap_or(w.horizontal),
                horizontal: w.horizontal,
                vertical: w.vertical,
                corner: w.corner.or(w.pole).unwrap_or(w.horizontal),
            }),
            BrushKindDef::Door { closed, open } => BrushKind::Door { closed, open },
            BrushKindDef::Table { item } => BrushKind::Table { item },
            BrushKindDef::Carpet { item } => BrushKind::Carpet { item },
            BrushKindDef::OptionalBorder => BrushKind::OptionalBorder,
            BrushKindDef::Eraser => BrushKind::Eraser,
            BrushKindDef::Flag { flag } => BrushKind::Flag {
                flag: MapFlags::from_name(&flag).unwrap_or(MapFlags::NONE),
            },
            BrushKindDef::Creature { creature } => BrushKind::Creature { creature },
            BrushKindDef::Spawn => BrushKind::Spawn,
            BrushKindDef::House { house_id } => BrushKind::House { house_id },
            BrushKindDef::HouseExit { house_id } => BrushKind::HouseExit { house_id },
            BrushKindDef::Waypoint { waypoint } => BrushKind::Waypoint { waypoint },
            BrushKindDef::Doodad(d) => BrushKind::Doodad(DoodadBrush {
                alternates: d
                    .alternates
                    .into_iter()
                    .filter(|alt| !alt.pieces.is_empty())
                    .map(|alt| {
                        alt.pieces
                            .into_iter()
                            .map(|p| DoodadPiece {
                                dx: p.dx,
                                dy: p.dy,
                                item: p.item,
                            })
                            .collect()
                    })
                    .collect(),
                on_blocking: d.on_blocking,
            }),
            BrushKindDef::Raw { item, ground } => BrushKind::Raw { item, ground },
        };
        let mut brush = Brush::new(name, kind);
        if let Some(look) = look {
            brush.look = look;
        }
        brush.visible = visible;
        brush
    }

    fn compile_terrain(
        &mut self,
        id: BrushId,
        name: &str,
        def: TerrainDef,
        terrain_names: &HashMap<String, BrushId>,
        warnings: &mut Warnings,
    ) -> TerrainBrush {
        let items = def
            .items
            .iter()
            .map(|g| {
                let (item, chance) = g.id_and_chance();
                GroundVariant { item, chance }
            })
            .collect();

        let mut borders = Vec::with_capacity(def.borders.len());
        for (i, r) in def.borders.iter().enumerate() {
            let label = format!("brush `{name}` border {i}");
            let target = match r.to.as_deref() {
                None | Some("all") => BorderTarget::Any,
                Some("none") => BorderTarget::Void,
                Some(other) => match terrain_names.get(other) {
                    Some(&t) => BorderTarget::Brush(t),
                    None => {
                        warnings.push(format!("{label}: unknown terrain `{other}`"));
                        continue;
                    }
                },
            };
            match self.resolve_border(id, r) {
                Ok(border) => borders.push(BorderRef { border, target }),
                Err(e) => warnings.push(format!("{label}: {e}")),
            }
        }

        let optional_border = match &def.optional_border {
            Some(r) => match self.resolve_border(id, r) {
                Ok(border) => Some(border),
                Err(e) => {
                    warnings.push(format!("brush `{name}` optional border: {e}"));
                    None
                }
            },
            None => None,
        };

        for friend in &def.friends {
            match terrain_names.get(friend) {
                Some(&other) if other != id => {
                    self.friends.insert(pair(id, other));
                }
                Some(_) => {}
                None => warnings.push(format!("brush `{name}`: unknown friend `{friend}`")),
            }
        }

        TerrainBrush {
            items,
            borders,
            optional_border,
            hate_friends: def.hate_friends,
            equivalence: def.equivalence,
        }
    }

    /// Inline pieces define a new set owned by `owner`; otherwise the ref
    /// names an existing one.
    fn resolve_border(&mut self, owner: BrushId, r: &BorderRefDef) -> Result<BorderId, String> {
        match &r.pieces {
            Some(pieces) => {
                let tiles = compile_pieces(pieces)?;
                let mut border = AutoBorder::new(0, tiles).with_group(r.group);
                border.ground_equivalent = r.ground_equivalent;
                border.owner = Some(owner);
                match r.id {
                    Some(id) => {
                        border.id = id;
                        self.add_border(border)
                    }
                    None => Ok(self.add_runtime_border(border)),
                }
            }
            None => match r.id {
                Some(id) if self.borders.contains_key(&id) => Ok(id),
                Some(id) => Err(format!("unknown border id {id}")),
                None => Err("border reference needs `id` or `pieces`".to_string()),
            },
        }
    }

    /// Register a brush under its name. Returns the new id; ids are
    /// sequential from 1.
    pub fn add_brush(&mut self, mut brush: Brush) -> BrushId {
        let id = (self.brushes.len() + 1) as BrushId;
        brush.id = id;
        for item in brush.kind.items() {
            if item == 0 {
                continue;
            }
            self.item_owner.entry(item).or_insert(id);
            if matches!(brush.kind, BrushKind::Terrain(_)) {
                let owner = *self.item_terrain.entry(item).or_insert(id);
                if owner != id {
                    log::debug!(target: "brushes", "item {} already grounds brush {}", item, owner);
                }
            }
        }
        self.by_name.entry(brush.name.clone()).or_default().push(id);
        self.brushes.push(brush);
        id
    }

    /// Register a configured border set. Its id must be unused and below
    /// `RUNTIME_BORDER_BASE`.
    pub fn add_border(&mut self, mut border: AutoBorder) -> Result<BorderId, String> {
        if border.id == 0 || border.id >= RUNTIME_BORDER_BASE {
            return Err(format!(
                "border id {} outside 1..{}",
                border.id, RUNTIME_BORDER_BASE
            ));
        }
        if self.borders.contains_key(&border.id) {
            return Err(format!("duplicate border id {}", border.id));
        }
        border.seq = self.borders.len();
        let id = border.id;
        self.borders.insert(id, border);
        Ok(id)
    }

    /// Register a set that has no configured identity.
    pub fn add_runtime_border(&mut self, mut border: AutoBorder) -> BorderId {
        let id = self.next_runtime_border;
        self.next_runtime_border += 1;
        border.id = id;
        border.seq = self.borders.len();
        self.borders.insert(id, border);
        id
    }

    pub fn add_friends(&mut self, a: BrushId, b: BrushId) {
        if a != b {
            self.friends.insert(pair(a, b));
        }
    }

    #[inline]
    pub fn brush(&self, id: BrushId) -> Option<&Brush> {
        self.brushes.get(id.checked_sub(1)? as usize)
    }

    /// First brush registered under `name`.
    pub fn get_brush(&self, name: &str) -> Option<&Brush> {
        self.by_name
            .get(name)
            .and_then(|ids| ids.first())
            .and_then(|&id| self.brush(id))
    }

    pub fn brushes_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Brush> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(move |&id| self.brush(id))
    }

    pub fn brushes(&self) -> impl Iterator<Item = &Brush> {
        self.brushes.iter()
    }

    #[inline]
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    pub fn terrain(&self, id: BrushId) -> Option<&TerrainBrush> {
        self.brush(id)?.as_terrain()
    }

    #[inline]
    pub fn border(&self, id: BorderId) -> Option<&AutoBorder> {
        self.borders.get(&id)
    }

    /// Border sets ordered by id.
    pub fn borders(&self) -> impl Iterator<Item = &AutoBorder> {
        self.borders.values()
    }

    #[inline]
    pub fn border_count(&self) -> usize {
        self.borders.len()
    }

    /// Terrain brush whose ground variants include `item`.
    pub fn terrain_of_item(&self, item: ItemId) -> Option<BrushId> {
        self.item_terrain.get(&item).copied()
    }

    /// First brush that places `item`, of any kind.
    pub fn owner_of_item(&self, item: ItemId) -> Option<BrushId> {
        self.item_owner.get(&item).copied()
    }

    /// Declared friendship, symmetric. `hate_friends` is applied by the
    /// border engine, not here.
    pub fn are_friends(&self, a: BrushId, b: BrushId) -> bool {
        a != b && self.friends.contains(&pair(a, b))
    }

    pub fn tileset(&self, name: &str) -> Option<&[BrushId]> {
        self.tilesets.get(name).map(Vec::as_slice)
    }

    pub fn tilesets(&self) -> impl Iterator<Item = (&str, &[BrushId])> {
        self.tilesets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[inline]
    pub fn engine(&self) -> EngineConfig {
        self.engine
    }

    pub fn set_engine(&mut self, engine: EngineConfig) {
        self.engine = engine;
    }

    /// Forget everything, including id counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Checks that would otherwise surface only while compiling a brush.
fn validate(def: &BrushDef) -> Result<(), String> {
    match &def.kind {
        BrushKindDef::Terrain(t) if t.items.is_empty() => {
            Err("terrain needs at least one ground item".to_string())
        }
        BrushKindDef::Flag { flag } if MapFlags::from_name(flag).is_none() => {
            Err(format!("unknown flag `{flag}`"))
        }
        BrushKindDef::Doodad(d) if d.alternates.iter().all(|a| a.pieces.is_empty()) => {
            Err("doodad needs at least one non-empty alternate".to_string())
        }
        _ => Ok(()),
    }
}
