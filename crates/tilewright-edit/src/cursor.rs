use tilewright_brushes::{Brush, BrushKind, BrushRegistry};
use tilewright_geom::{Position, floor_adjustment};
use tilewright_map::{HouseId, MapIndex};

use crate::draw::can_draw;
use crate::footprint::{BrushShape, footprint};

/// Color family of the cursor for the selected brush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorTint {
    Brush,
    HouseBrush,
    FlagBrush,
    SpawnBrush,
    Eraser,
    /// Nothing selected.
    Blank,
}

impl CursorTint {
    pub fn for_brush(brush: Option<&Brush>) -> CursorTint {
        let Some(brush) = brush else {
            return CursorTint::Blank;
        };
        match brush.kind {
            BrushKind::House { .. } | BrushKind::HouseExit { .. } => CursorTint::HouseBrush,
            BrushKind::Flag { .. } => CursorTint::FlagBrush,
            BrushKind::Spawn => CursorTint::SpawnBrush,
            BrushKind::Eraser => CursorTint::Eraser,
            _ => CursorTint::Brush,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

pub fn validity(registry: &BrushRegistry, brush: &Brush, map: &MapIndex, pos: Position) -> Validity {
    if can_draw(registry, brush, map, pos) {
        Validity::Valid
    } else {
        Validity::Invalid
    }
}

/// House the brush paints or exits, if it is a house brush.
pub fn current_house_id(brush: Option<&Brush>) -> Option<HouseId> {
    brush.and_then(Brush::house_id)
}

/// One highlighted cell under the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorCell {
    pub position: Position,
    pub tint: CursorTint,
    pub validity: Validity,
    /// Screen offset of the cell's floor, in pixels.
    pub floor_offset: i32,
}

/// Preview of a click at `center`.
pub fn cursor_cells(
    registry: &BrushRegistry,
    brush: &Brush,
    map: &MapIndex,
    center: Position,
    shape: BrushShape,
    size: u32,
) -> Vec<CursorCell> {
    let tint = CursorTint::for_brush(Some(brush));
    footprint(brush, center, shape, size)
        .into_iter()
        .map(|position| CursorCell {
            position,
            tint,
            validity: validity(registry, brush, map, position),
            floor_offset: floor_adjustment(position.z),
        })
        .collect()
}
