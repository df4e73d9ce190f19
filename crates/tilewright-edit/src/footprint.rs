use serde::{Deserialize, Serialize};
use tilewright_brushes::{Brush, BrushKind};
use tilewright_geom::Position;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushShape {
    #[default]
    Square,
    Circle,
}

/// Cells covered by one click of `brush` centered on `center`.
pub fn footprint(brush: &Brush, center: Position, shape: BrushShape, size: u32) -> Vec<Position> {
    if brush.one_size_fits_all() || size == 0 {
        return vec![center];
    }
    let n = size as i32;
    let mut out = Vec::with_capacity(((2 * n + 1) * (2 * n + 1)) as usize);
    for dy in -n..=n {
        for dx in -n..=n {
            let inside = match shape {
                BrushShape::Square => true,
                BrushShape::Circle => {
                    let dist = f64::from(dx * dx + dy * dy).sqrt();
                    dist < f64::from(n) + 0.005
                }
            };
            if inside {
                out.push(center.offset(dx, dy));
            }
        }
    }
    out
}

/// Cells covered by dragging from `from` to `to` on `from`'s floor.
/// Brushes that cannot drag only touch `to`; walls only get the outline.
pub fn drag_area(brush: &Brush, from: Position, to: Position) -> Vec<Position> {
    if !brush.can_drag() {
        return vec![Position::new(to.x, to.y, from.z)];
    }
    let (x0, x1) = (from.x.min(to.x), from.x.max(to.x));
    let (y0, y1) = (from.y.min(to.y), from.y.max(to.y));
    let outline = matches!(brush.kind, BrushKind::Wall(_));
    let mut out = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            if outline && x != x0 && x != x1 && y != y0 && y != y1 {
                continue;
            }
            out.push(Position::new(x, y, from.z));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewright_brushes::WallBrush;

    fn raw() -> Brush {
        Brush::new("raw", BrushKind::Raw { item: 1, ground: false })
    }

    #[test]
    fn square_and_circle_sizes() {
        let c = Position::new(0, 0, 7);
        assert_eq!(footprint(&raw(), c, BrushShape::Square, 1).len(), 9);
        assert_eq!(footprint(&raw(), c, BrushShape::Square, 2).len(), 25);
        // Radius 1 disc drops the diagonals (sqrt 2 > 1.005).
        assert_eq!(footprint(&raw(), c, BrushShape::Circle, 1).len(), 5);
        assert_eq!(footprint(&raw(), c, BrushShape::Circle, 2).len(), 13);
    }

    #[test]
    fn uniform_brushes_ignore_size() {
        let spawn = Brush::new("spawn", BrushKind::Spawn);
        let c = Position::new(3, 3, 7);
        assert_eq!(footprint(&spawn, c, BrushShape::Square, 4), vec![c]);
    }

    #[test]
    fn wall_drag_is_outline() {
        let wall = Brush::new(
            "wall",
            BrushKind::Wall(WallBrush {
                pole: 1,
                horizontal: 2,
                vertical: 3,
                corner: 4,
            }),
        );
        let cells = drag_area(&wall, Position::new(0, 0, 7), Position::new(3, 2, 7));
        assert_eq!(cells.len(), 10);
        assert!(!cells.contains(&Position::new(1, 1, 7)));
        assert_eq!(
            drag_area(&raw(), Position::new(3, 2, 7), Position::new(0, 0, 7)).len(),
            12
        );
    }
}
