mod cli;
mod dump;
mod logging;
mod scene;

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tilewright_brushes::BrushRegistry;
use tilewright_edit::Editor;
use tilewright_map::MapIndex;
use tilewright_session::{LiveSession, LocalSession};

use cli::{Cli, Command, PaintArgs};
use scene::Scene;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.log_level, cli.log_file.as_deref()) {
        eprintln!("logging setup failed: {e}");
    }
    let result = match &cli.command {
        Command::Check { brushes } => check(brushes),
        Command::Paint(args) => paint(args),
    };
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn load_registry(path: &Path) -> Result<BrushRegistry, Box<dyn Error>> {
    let (reg, warnings) = BrushRegistry::load_from_path(path)?;
    if !warnings.is_empty() {
        eprint!("{warnings}");
    }
    Ok(reg)
}

fn check(path: &Path) -> Result<(), Box<dyn Error>> {
    let reg = load_registry(path)?;
    println!(
        "{}: {} brushes, {} border sets, {} tilesets",
        path.display(),
        reg.brush_count(),
        reg.border_count(),
        reg.tilesets().count()
    );
    for (name, members) in reg.tilesets() {
        println!("  tileset {name}: {} brushes", members.len());
    }
    Ok(())
}

fn paint(args: &PaintArgs) -> Result<(), Box<dyn Error>> {
    let reg = load_registry(&args.brushes)?;
    let config = args.engine(reg.engine());
    let registry = Arc::new(reg);
    let scene = Scene::load(&args.scene)?;

    let mut editor = Editor::with_map(Arc::clone(&registry), MapIndex::new(), config);
    let report = scene.run(&mut editor);
    println!(
        "{} strokes: {} cells drawn, {} skipped, {} changed, {} border rewrites",
        scene.strokes.len(),
        report.drawn,
        report.skipped,
        report.changed,
        report.borders_rewritten
    );

    let Some(region) = args.dump else {
        return Ok(());
    };
    if !args.live {
        print!(
            "{}",
            dump::render(&registry, editor.map_mut(), &mut LocalSession, region)
        );
        return Ok(());
    }

    // Read the painted map back through a loopback session.
    let (mut live, remote) = LiveSession::loopback();
    let mut view = MapIndex::new();
    println!("before sync:");
    print!("{}", dump::render(&registry, &mut view, &mut live, region));
    let answered = remote.answer_pending(editor.map());
    let landed = live.pump(&mut view);
    log::info!(target: "session", "{} requests answered, {} leaves landed", answered, landed);
    println!("after sync:");
    print!("{}", dump::render(&registry, &mut view, &mut live, region));
    Ok(())
}
