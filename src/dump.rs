use std::fmt::Write as _;

use tilewright_brushes::BrushRegistry;
use tilewright_geom::{MAP_LAYERS, Position};
use tilewright_map::{BlockView, LeafFetcher, MapIndex, Tile};

/// Rectangle of one floor, corners inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub z: i32,
}

impl Region {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32, z: i32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
            z,
        }
    }

    /// `x0,y0,x1,y1,z`
    pub fn parse(s: &str) -> Result<Region, String> {
        let parts: Vec<i32> = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("bad region `{s}`: {e}"))?;
        let [x0, y0, x1, y1, z] = parts[..] else {
            return Err(format!("bad region `{s}`: expected x0,y0,x1,y1,z"));
        };
        if !(0..MAP_LAYERS).contains(&z) {
            return Err(format!("floor {z} outside 0..{MAP_LAYERS}"));
        }
        Ok(Region::new(x0, y0, x1, y1, z))
    }
}

/// Two characters per cell: terrain initial (`#` for non-terrain ground,
/// `_` for no ground) and border piece count. `.` is empty, `??` pending.
pub fn render<F>(registry: &BrushRegistry, map: &mut MapIndex, fetcher: &mut F, region: Region) -> String
where
    F: LeafFetcher + ?Sized,
{
    let mut out = String::new();
    for y in region.y0..=region.y1 {
        for x in region.x0..=region.x1 {
            let pos = Position::new(x, y, region.z);
            let cell = match map.resolve_block(x, y, region.z, fetcher) {
                BlockView::Pending => "??".to_string(),
                BlockView::Absent => ". ".to_string(),
                BlockView::Ready(leaf) => match leaf.tile(pos) {
                    Some(tile) => cell(registry, tile),
                    None => ". ".to_string(),
                },
            };
            out.push_str(&cell);
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out.push('\n');
    }
    out
}

fn cell(registry: &BrushRegistry, tile: &Tile) -> String {
    let initial = match tile.ground_id() {
        None => '_',
        Some(g) => registry
            .terrain_of_item(g)
            .and_then(|id| registry.brush(id))
            .and_then(|b| b.name.chars().next())
            .unwrap_or('#'),
    };
    let borders = tile.items.iter().filter(|i| i.border).count();
    let mut s = String::with_capacity(2);
    s.push(initial);
    match borders {
        0 => s.push(' '),
        n if n < 10 => {
            let _ = write!(s, "{n}");
        }
        _ => s.push('+'),
    }
    s
}
