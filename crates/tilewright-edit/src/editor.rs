use std::sync::Arc;

use tilewright_brushes::{BrushId, BrushRegistry, EngineConfig};
use tilewright_geom::Position;
use tilewright_map::MapIndex;

use crate::borders::BorderEngine;
use crate::cursor::{CursorCell, cursor_cells};
use crate::draw::{ChangeSet, DrawParam, can_draw, draw, switch_door, undraw};
use crate::footprint::{BrushShape, drag_area, footprint};

/// Outcome of one stroke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Positions the brush was applied to.
    pub drawn: usize,
    /// Positions rejected by `can_draw` (or empty, when removing).
    pub skipped: usize,
    /// Tiles whose content may have changed, borders excluded.
    pub changed: usize,
    /// Tiles whose border pieces were rewritten.
    pub borders_rewritten: usize,
}

impl EditReport {
    pub fn merge(&mut self, other: EditReport) {
        self.drawn += other.drawn;
        self.skipped += other.skipped;
        self.changed += other.changed;
        self.borders_rewritten += other.borders_rewritten;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Draw,
    Undraw,
}

/// A map being edited with a fixed brush catalog.
pub struct Editor {
    map: MapIndex,
    registry: Arc<BrushRegistry>,
    config: EngineConfig,
}

impl Editor {
    /// Empty map; border policy taken from the registry's `[engine]` table.
    pub fn new(registry: Arc<BrushRegistry>) -> Self {
        let config = registry.engine();
        Self::with_map(registry, MapIndex::new(), config)
    }

    pub fn with_map(registry: Arc<BrushRegistry>, map: MapIndex, config: EngineConfig) -> Self {
        Self {
            map,
            registry,
            config,
        }
    }

    #[inline]
    pub fn map(&self) -> &MapIndex {
        &self.map
    }

    #[inline]
    pub fn map_mut(&mut self) -> &mut MapIndex {
        &mut self.map
    }

    pub fn into_map(self) -> MapIndex {
        self.map
    }

    #[inline]
    pub fn registry(&self) -> &BrushRegistry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Id of the first brush named `name`.
    pub fn brush_id(&self, name: &str) -> Option<BrushId> {
        self.registry.get_brush(name).map(|b| b.id)
    }

    /// Draw `brush` on every position where it may be drawn, then recompute
    /// borders once around everything that changed.
    pub fn apply(&mut self, brush: BrushId, positions: &[Position], param: DrawParam) -> EditReport {
        self.stroke(brush, positions, param, Mode::Draw)
    }

    /// Undraw `brush` on every position holding a tile.
    pub fn remove(
        &mut self,
        brush: BrushId,
        positions: &[Position],
        param: DrawParam,
    ) -> EditReport {
        self.stroke(brush, positions, param, Mode::Undraw)
    }

    /// One click with the brush's footprint.
    pub fn paint(
        &mut self,
        brush: BrushId,
        center: Position,
        shape: BrushShape,
        size: u32,
        param: DrawParam,
    ) -> EditReport {
        let Some(b) = self.registry.brush(brush) else {
            log::warn!(target: "edit", "unknown brush id {}", brush);
            return EditReport::default();
        };
        let cells = footprint(b, center, shape, size);
        self.apply(brush, &cells, param)
    }

    /// A click-drag rectangle from `from` to `to`.
    pub fn drag(
        &mut self,
        brush: BrushId,
        from: Position,
        to: Position,
        param: DrawParam,
    ) -> EditReport {
        let Some(b) = self.registry.brush(brush) else {
            log::warn!(target: "edit", "unknown brush id {}", brush);
            return EditReport::default();
        };
        let cells = drag_area(b, from, to);
        self.apply(brush, &cells, param)
    }

    pub fn switch_door(&mut self, pos: Position) -> bool {
        switch_door(&self.registry, &mut self.map, pos)
    }

    /// Cursor preview for `brush` at `center`.
    pub fn cursor(
        &self,
        brush: BrushId,
        center: Position,
        shape: BrushShape,
        size: u32,
    ) -> Vec<CursorCell> {
        match self.registry.brush(brush) {
            Some(b) => cursor_cells(&self.registry, b, &self.map, center, shape, size),
            None => Vec::new(),
        }
    }

    /// Recompute the borders of every tile, e.g. after loading content that
    /// was not painted through brushes.
    pub fn settle(&mut self) -> usize {
        let mut positions: Vec<Position> = self.map.tiles().map(|(p, _)| p).collect();
        positions.sort();
        let engine = BorderEngine::new(&self.registry, self.config);
        let rewritten = positions
            .into_iter()
            .filter(|&pos| engine.apply(&mut self.map, pos, None))
            .count();
        log::info!(target: "borders", "settled map, {} tiles rewritten", rewritten);
        rewritten
    }

    /// Reset the map; the registry is untouched.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    fn stroke(
        &mut self,
        id: BrushId,
        positions: &[Position],
        param: DrawParam,
        mode: Mode,
    ) -> EditReport {
        let registry = Arc::clone(&self.registry);
        let Some(brush) = registry.brush(id) else {
            log::warn!(target: "edit", "unknown brush id {}", id);
            return EditReport {
                skipped: positions.len(),
                ..EditReport::default()
            };
        };
        let mut report = EditReport::default();
        let mut changes = ChangeSet::new();
        for &pos in positions {
            let allowed = match mode {
                Mode::Draw => can_draw(&registry, brush, &self.map, pos),
                Mode::Undraw => self.map.get_tile(pos).is_some(),
            };
            if !allowed {
                report.skipped += 1;
                continue;
            }
            match mode {
                Mode::Draw => draw(&registry, brush, &mut self.map, pos, param, &mut changes),
                Mode::Undraw => undraw(&registry, brush, &mut self.map, pos, param, &mut changes),
            }
            report.drawn += 1;
        }
        for &pos in changes.positions() {
            self.map.mark_changed(pos);
        }
        report.changed = changes.len();
        if brush.needs_borders() && !changes.is_empty() {
            let engine = BorderEngine::new(&registry, self.config);
            report.borders_rewritten =
                engine.recompute_region(&mut self.map, changes.positions(), Some(brush.id));
        }
        log::debug!(
            target: "edit",
            "{:?} `{}` over {} cells: {:?}",
            mode,
            brush.name,
            positions.len(),
            report
        );
        report
    }
}
