use std::error::Error;
use std::path::Path;

use serde::Deserialize;
use tilewright_edit::{BrushShape, DrawParam, EditReport, Editor, drag_area, footprint};
use tilewright_geom::Position;

/// A scripted sequence of brush strokes.
#[derive(Deserialize, Debug, Default)]
pub struct Scene {
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

#[derive(Deserialize, Debug)]
pub struct Stroke {
    pub brush: String,
    /// x, y, z of the click.
    pub at: [i32; 3],
    /// Opposite drag corner on the same floor.
    pub to: Option<[i32; 2]>,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub shape: BrushShape,
    #[serde(default)]
    pub erase: bool,
    #[serde(default)]
    pub alternate: bool,
    pub radius: Option<u32>,
    pub variation: Option<u32>,
}

impl Stroke {
    fn param(&self) -> DrawParam {
        if self.alternate {
            DrawParam::Alternate
        } else if let Some(r) = self.radius {
            DrawParam::Radius(r)
        } else if let Some(v) = self.variation {
            DrawParam::Variation(v)
        } else {
            DrawParam::Default
        }
    }
}

impl Scene {
    pub fn load(path: impl AsRef<Path>) -> Result<Scene, Box<dyn Error>> {
        let src = std::fs::read_to_string(path)?;
        Scene::from_toml_str(&src)
    }

    pub fn from_toml_str(src: &str) -> Result<Scene, Box<dyn Error>> {
        Ok(toml::from_str(src)?)
    }

    /// Play every stroke on `editor`. Strokes naming unknown brushes are
    /// skipped with a warning.
    pub fn run(&self, editor: &mut Editor) -> EditReport {
        let mut total = EditReport::default();
        for (i, stroke) in self.strokes.iter().enumerate() {
            let Some(brush) = editor.registry().get_brush(&stroke.brush) else {
                log::warn!(target: "edit", "strokes[{}]: unknown brush `{}`", i, stroke.brush);
                continue;
            };
            let [x, y, z] = stroke.at;
            let at = Position::new(x, y, z);
            let cells = match stroke.to {
                Some([tx, ty]) => drag_area(brush, at, Position::new(tx, ty, z)),
                None => footprint(brush, at, stroke.shape, stroke.size),
            };
            let id = brush.id;
            let report = if stroke.erase {
                editor.remove(id, &cells, stroke.param())
            } else {
                editor.apply(id, &cells, stroke.param())
            };
            total.merge(report);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tilewright_brushes::BrushRegistry;

    const BRUSHES: &str = r#"
[[borders]]
id = 1
pieces = { n = 301, e = 302, s = 303, w = 304 }

[[brushes]]
kind = "terrain"
name = "grass"
items = [100]

[[brushes]]
kind = "terrain"
name = "sand"
items = [200]
borders = [{ id = 1, to = "grass" }]
"#;

    const SCENE: &str = r#"
[[strokes]]
brush = "grass"
at = [0, 0, 7]
to = [2, 2]

[[strokes]]
brush = "sand"
at = [1, 1, 7]

[[strokes]]
brush = "lava"
at = [0, 0, 7]

[[strokes]]
brush = "sand"
at = [1, 1, 7]
erase = true
"#;

    #[test]
    fn strokes_play_in_order() {
        let (reg, _) = BrushRegistry::from_toml_str(BRUSHES).unwrap();
        let mut editor = Editor::new(Arc::new(reg));
        let scene = Scene::from_toml_str(SCENE).unwrap();
        assert_eq!(scene.strokes.len(), 4);
        assert_eq!(scene.strokes[0].param(), DrawParam::Default);

        let report = scene.run(&mut editor);
        assert_eq!(report.drawn, 11);
        let center = editor.map().get_tile(Position::new(1, 1, 7)).unwrap();
        assert_eq!(center.ground_id(), Some(100));
        assert!(!center.has_borders());
    }

    #[test]
    fn stroke_params() {
        let scene = Scene::from_toml_str(
            "[[strokes]]\nbrush = \"spawn\"\nat = [0, 0, 7]\nradius = 2\n\n\
             [[strokes]]\nbrush = \"eraser\"\nat = [0, 0, 7]\nalternate = true\nshape = \"circle\"\n",
        )
        .unwrap();
        assert_eq!(scene.strokes[0].param(), DrawParam::Radius(2));
        assert_eq!(scene.strokes[1].param(), DrawParam::Alternate);
        assert_eq!(scene.strokes[1].shape, BrushShape::Circle);
    }
}
