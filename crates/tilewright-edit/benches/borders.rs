use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tilewright_brushes::BrushRegistry;
use tilewright_edit::{BorderEngine, BrushShape, DrawParam, Editor};
use tilewright_geom::Position;

fn load_registry() -> BrushRegistry {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let (reg, _warnings) =
        BrushRegistry::load_from_path(root.join("../../assets/brushes.toml")).unwrap();
    reg
}

/// 64x64 grass field with sand blobs every few tiles.
fn painted_field(reg: Arc<BrushRegistry>) -> Editor {
    let mut ed = Editor::new(reg);
    let grass = ed.brush_id("grass").unwrap();
    let sand = ed.brush_id("sand").unwrap();
    ed.drag(grass, Position::new(0, 0, 7), Position::new(63, 63, 7), DrawParam::Default);
    for y in (4..60).step_by(7) {
        for x in (4..60).step_by(5) {
            ed.paint(sand, Position::new(x, y, 7), BrushShape::Circle, 1, DrawParam::Default);
        }
    }
    ed
}

fn bench_recompute(c: &mut Criterion) {
    let reg = Arc::new(load_registry());
    let mut group = c.benchmark_group("borders");

    let field = painted_field(Arc::clone(&reg));
    let positions: Vec<Position> = field.map().tiles().map(|(p, _)| p).collect();
    group.bench_function("compute_64x64", |b| {
        let engine = BorderEngine::new(&reg, reg.engine());
        b.iter(|| {
            for &pos in &positions {
                black_box(engine.compute(field.map(), pos, None));
            }
        })
    });

    group.bench_function("paint_sand_stroke", |b| {
        let sand = field.brush_id("sand").unwrap();
        let grass = field.brush_id("grass").unwrap();
        let mut ed = painted_field(Arc::clone(&reg));
        let center = Position::new(31, 31, 7);
        b.iter(|| {
            black_box(ed.paint(sand, center, BrushShape::Square, 2, DrawParam::Default));
            black_box(ed.paint(grass, center, BrushShape::Square, 2, DrawParam::Default));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_recompute);
criterion_main!(benches);
