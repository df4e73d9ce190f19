use std::sync::Arc;

use tilewright_brushes::BrushRegistry;
use tilewright_edit::{
    BrushShape, CursorTint, DrawParam, Editor, Validity, can_draw, tile_shows_brush,
};
use tilewright_geom::{MAP_MAX_COORD, Position};
use tilewright_map::MapFlags;

const BRUSHES: &str = r#"
[[brushes]]
kind = "terrain"
name = "grass"
items = [100]

[[brushes]]
kind = "wall"
name = "stone wall"
pole = 510
horizontal = 500
vertical = 501
corner = 502

[[brushes]]
kind = "door"
name = "wooden door"
closed = 520
open = 521

[[brushes]]
kind = "raw"
name = "barrel"
item = 530

[[brushes]]
kind = "table"
name = "oak table"
item = 550

[[brushes]]
kind = "creature"
name = "rat"
creature = "rat"

[[brushes]]
kind = "house"
name = "house 4"
house_id = 4

[[brushes]]
kind = "house_exit"
name = "house 4 exit"
house_id = 4

[[brushes]]
kind = "waypoint"
name = "temple"
waypoint = "temple"

[[brushes]]
kind = "doodad"
name = "fallen tree"
alternates = [{ pieces = [{ dx = 0, dy = 0, item = 540 }, { dx = 1, dy = 0, item = 541 }] }]
"#;

fn editor() -> Editor {
    let (reg, warnings) = BrushRegistry::from_toml_str(BRUSHES).expect("fixture parses");
    assert!(warnings.is_empty(), "{warnings}");
    let mut ed = Editor::new(Arc::new(reg));
    let grass = ed.brush_id("grass").unwrap();
    ed.drag(grass, at(0, 0), at(7, 7), DrawParam::Default);
    ed
}

fn at(x: i32, y: i32) -> Position {
    Position::new(x, y, 7)
}

fn items_at(ed: &Editor, pos: Position) -> Vec<u16> {
    ed.map()
        .get_tile(pos)
        .map(|t| t.items.iter().filter(|i| !i.border).map(|i| i.id).collect())
        .unwrap_or_default()
}

#[test]
fn walls_follow_their_neighbors() {
    let mut ed = editor();
    let wall = ed.brush_id("stone wall").unwrap();
    ed.drag(wall, at(0, 0), at(2, 0), DrawParam::Default);
    assert_eq!(items_at(&ed, at(0, 0)), vec![500]);
    assert_eq!(items_at(&ed, at(1, 0)), vec![500]);

    ed.drag(wall, at(2, 0), at(2, 2), DrawParam::Default);
    assert_eq!(items_at(&ed, at(2, 0)), vec![502]);
    assert_eq!(items_at(&ed, at(2, 1)), vec![501]);
    assert_eq!(items_at(&ed, at(2, 2)), vec![501]);

    ed.apply(wall, &[at(5, 5)], DrawParam::Default);
    assert_eq!(items_at(&ed, at(5, 5)), vec![510]);

    ed.remove(wall, &[at(2, 1)], DrawParam::Default);
    assert_eq!(items_at(&ed, at(2, 0)), vec![500]);
    assert_eq!(items_at(&ed, at(2, 2)), vec![510]);
}

#[test]
fn doors_need_a_wall_and_toggle() {
    let mut ed = editor();
    let door = ed.brush_id("wooden door").unwrap();
    assert_eq!(ed.apply(door, &[at(1, 0)], DrawParam::Default).drawn, 0);

    let wall = ed.brush_id("stone wall").unwrap();
    ed.drag(wall, at(0, 0), at(2, 0), DrawParam::Default);
    ed.apply(door, &[at(1, 0)], DrawParam::Default);
    assert!(items_at(&ed, at(1, 0)).contains(&520));

    assert!(ed.switch_door(at(1, 0)));
    assert!(items_at(&ed, at(1, 0)).contains(&521));
    assert!(!ed.switch_door(at(4, 4)));
}

#[test]
fn redrawing_keeps_the_item_stack() {
    let mut ed = editor();
    let wall = ed.brush_id("stone wall").unwrap();
    let door = ed.brush_id("wooden door").unwrap();
    let barrel = ed.brush_id("barrel").unwrap();
    let table = ed.brush_id("oak table").unwrap();

    ed.apply(wall, &[at(3, 3)], DrawParam::Default);
    ed.apply(door, &[at(3, 3)], DrawParam::Default);
    ed.apply(barrel, &[at(3, 3)], DrawParam::Default);
    assert_eq!(items_at(&ed, at(3, 3)), vec![510, 520, 530]);

    for brush in [wall, door] {
        let report = ed.apply(brush, &[at(3, 3)], DrawParam::Default);
        assert_eq!(report.changed, 0);
        assert_eq!(items_at(&ed, at(3, 3)), vec![510, 520, 530]);
    }

    // Opening swaps the door where it stands.
    let report = ed.apply(door, &[at(3, 3)], DrawParam::Alternate);
    assert_eq!(report.changed, 1);
    assert_eq!(items_at(&ed, at(3, 3)), vec![510, 521, 530]);

    ed.apply(table, &[at(5, 5)], DrawParam::Default);
    ed.apply(barrel, &[at(5, 5)], DrawParam::Default);
    let report = ed.apply(table, &[at(5, 5)], DrawParam::Default);
    assert_eq!(report.changed, 0);
    assert_eq!(items_at(&ed, at(5, 5)), vec![550, 530]);
}

#[test]
fn wall_realigns_where_it_stands() {
    let mut ed = editor();
    let wall = ed.brush_id("stone wall").unwrap();
    let door = ed.brush_id("wooden door").unwrap();
    ed.apply(wall, &[at(3, 3)], DrawParam::Default);
    ed.apply(door, &[at(3, 3)], DrawParam::Default);
    ed.apply(wall, &[at(4, 3)], DrawParam::Default);
    assert_eq!(items_at(&ed, at(3, 3)), vec![500, 520]);
    assert_eq!(items_at(&ed, at(4, 3)), vec![500]);
}

#[test]
fn far_coordinates_are_off_the_map() {
    let mut ed = editor();
    let grass = ed.brush_id("grass").unwrap();
    let far = [
        Position::new(i32::MAX, 0, 7),
        Position::new(0, i32::MIN, 7),
        Position::new(MAP_MAX_COORD + 1, 0, 7),
    ];
    for pos in far {
        let brush = ed.registry().brush(grass).unwrap();
        assert!(!can_draw(ed.registry(), brush, ed.map(), pos));
        assert!(ed.map_mut().tile_mut(pos).is_none());
        assert!(ed.map().get_tile(pos).is_none());
    }
    let report = ed.apply(grass, &far, DrawParam::Default);
    assert_eq!(report.drawn, 0);
    assert_eq!(report.skipped, far.len());
}

#[test]
fn spawn_counts_cover_the_radius() {
    let mut ed = editor();
    let spawn = ed.brush_id("spawn").unwrap();
    ed.apply(spawn, &[at(3, 3)], DrawParam::Radius(1));
    let count = |ed: &Editor, x, y| {
        ed.map()
            .get_tile_location(at(x, y))
            .map_or(0, |l| l.spawn_count())
    };
    assert_eq!(count(&ed, 2, 2), 1);
    assert_eq!(count(&ed, 4, 4), 1);
    assert_eq!(count(&ed, 5, 3), 0);

    // One spawn per tile.
    assert_eq!(ed.apply(spawn, &[at(3, 3)], DrawParam::Radius(2)).drawn, 0);

    ed.remove(spawn, &[at(3, 3)], DrawParam::Default);
    assert_eq!(count(&ed, 2, 2), 0);
    assert!(ed.map().get_tile(at(3, 3)).unwrap().spawn.is_none());
}

#[test]
fn eraser_clears_and_optionally_keeps_ground() {
    let mut ed = editor();
    let barrel = ed.brush_id("barrel").unwrap();
    let rat = ed.brush_id("rat").unwrap();
    let eraser = ed.brush_id("eraser").unwrap();
    ed.apply(barrel, &[at(1, 1), at(2, 2)], DrawParam::Default);
    ed.apply(rat, &[at(1, 1)], DrawParam::Default);

    ed.apply(eraser, &[at(2, 2)], DrawParam::Alternate);
    let kept = ed.map().get_tile(at(2, 2)).unwrap();
    assert_eq!(kept.ground_id(), Some(100));
    assert!(kept.items.is_empty());

    ed.apply(eraser, &[at(1, 1)], DrawParam::Default);
    assert!(ed.map().get_tile(at(1, 1)).is_none());
}

#[test]
fn house_exit_moves_and_stays_unique() {
    let mut ed = editor();
    let house = ed.brush_id("house 4").unwrap();
    let exit = ed.brush_id("house 4 exit").unwrap();
    ed.apply(house, &[at(1, 1)], DrawParam::Default);

    // Exits go outside the house.
    assert_eq!(ed.apply(exit, &[at(1, 1)], DrawParam::Default).drawn, 0);
    ed.apply(exit, &[at(1, 2)], DrawParam::Default);
    ed.apply(exit, &[at(2, 2)], DrawParam::Default);
    assert_eq!(ed.map().house_exit(4), Some(at(2, 2)));
    assert!(!ed.map().get_tile(at(1, 2)).unwrap().has_house_exit(4));
    assert!(ed.map().get_tile(at(2, 2)).unwrap().has_house_exit(4));
}

#[test]
fn waypoint_and_flags() {
    let mut ed = editor();
    let temple = ed.brush_id("temple").unwrap();
    ed.apply(temple, &[at(4, 4)], DrawParam::Default);
    ed.apply(temple, &[at(5, 4)], DrawParam::Default);
    assert_eq!(ed.map().waypoint("temple"), Some(at(5, 4)));

    let pz = ed.brush_id("protection_zone").unwrap();
    ed.paint(pz, at(4, 4), BrushShape::Square, 1, DrawParam::Default);
    assert!(
        ed.map()
            .get_tile(at(3, 3))
            .unwrap()
            .flags
            .contains(MapFlags::PROTECTION_ZONE)
    );
    // Nothing to flag off the painted ground.
    assert_eq!(
        ed.apply(pz, &[at(20, 20)], DrawParam::Default).skipped,
        1
    );
}

#[test]
fn doodad_stamps_every_piece() {
    let mut ed = editor();
    let tree = ed.brush_id("fallen tree").unwrap();
    ed.apply(tree, &[at(3, 3)], DrawParam::Default);
    assert_eq!(items_at(&ed, at(3, 3)), vec![540]);
    assert_eq!(items_at(&ed, at(4, 3)), vec![541]);

    // The right half would hang off the ground.
    assert_eq!(ed.apply(tree, &[at(7, 7)], DrawParam::Default).drawn, 0);

    let brush = ed.registry().brush(tree).unwrap();
    assert!(tile_shows_brush(brush, ed.map().get_tile(at(4, 3)).unwrap()));
    ed.remove(tree, &[at(3, 3)], DrawParam::Default);
    assert!(items_at(&ed, at(4, 3)).is_empty());
}

#[test]
fn cursor_previews_validity() {
    let ed = editor();
    let rat = ed.brush_id("rat").unwrap();
    let cells = ed.cursor(rat, at(7, 7), BrushShape::Square, 3);
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].validity, Validity::Valid);

    let barrel = ed.brush_id("barrel").unwrap();
    let cells = ed.cursor(barrel, at(7, 7), BrushShape::Circle, 1);
    assert_eq!(cells.len(), 5);
    assert!(cells.iter().all(|c| c.tint == CursorTint::Brush));

    let exit = ed.brush_id("house 4 exit").unwrap();
    let cells = ed.cursor(exit, at(9, 9), BrushShape::Square, 0);
    assert_eq!(cells[0].validity, Validity::Invalid);
    assert_eq!(cells[0].tint, CursorTint::HouseBrush);
}
