//! Brush application, auto-bordering, and the editing facade.
#![forbid(unsafe_code)]

pub mod borders;
pub mod cursor;
pub mod draw;
pub mod editor;
pub mod footprint;

pub use borders::{BorderEngine, SlotMask, select_slots};
pub use cursor::{CursorCell, CursorTint, Validity, current_house_id, cursor_cells, validity};
pub use draw::{
    ChangeSet, DEFAULT_SPAWN_RADIUS, DrawParam, can_draw, draw, position_seed, switch_door,
    terrain_at, tile_shows_brush, undraw,
};
pub use editor::{EditReport, Editor};
pub use footprint::{BrushShape, drag_area, footprint};
