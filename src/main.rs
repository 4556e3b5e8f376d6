//! Headless front end for the sketch sandbox: create, run, watch and export
//! project files from the command line. Frames are driven with synthetic
//! timestamps (one interval per callback) so runs are deterministic.

use clap::{Parser, Subcommand};
use log::{error, info};
use notify::{EventKind, RecursiveMode, Watcher};
use sketch_core::asset::AssetRegistry;
use sketch_core::clock::RunnerClock;
use sketch_core::console::Console;
use sketch_core::editor::EditorPanes;
use sketch_core::export::export_html;
use sketch_core::input::InputState;
use sketch_core::program::Sources;
use sketch_core::project::{load_project, save_project, ProjectRecord};
use sketch_core::runner::Runner;
use sketch_core::surface::Surface;
use sketch_scripting::LuaProgramBuilder;
use std::cell::RefCell;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "sketch_studio", version, about = "Live-coding sketch sandbox")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty project file.
    New { path: PathBuf },
    /// Build a project and run it for a fixed number of frames.
    Run {
        path: PathBuf,
        /// Number of frame callbacks to drive.
        #[arg(long, default_value_t = 300)]
        frames: u32,
        #[arg(long, default_value_t = 640)]
        width: u32,
        #[arg(long, default_value_t = 480)]
        height: u32,
        /// Write the final surface to this PNG.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Re-run whenever the project file changes.
        #[arg(long)]
        watch: bool,
    },
    /// Write a standalone HTML page that replays the project in a browser.
    Export {
        path: PathBuf,
        /// Defaults to the project path with an .html extension.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value = "sketch")]
        title: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::New { path } => new_project(&path),
        Command::Run {
            path,
            frames,
            width,
            height,
            out,
            watch,
        } => {
            if watch {
                watch_project(&path, frames, width, height, out.as_deref())
            } else {
                run_project(&path, frames, width, height, out.as_deref())
            }
        }
        Command::Export { path, out, title } => export_project(&path, out.as_deref(), &title),
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }
}

fn new_project(path: &Path) -> Result<(), Box<dyn Error>> {
    let record = ProjectRecord::from_parts(&Sources::default(), &AssetRegistry::new());
    save_project(&record, path)?;
    info!("created {}", path.display());
    Ok(())
}

fn run_project(
    path: &Path,
    frames: u32,
    width: u32,
    height: u32,
    out: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let record = load_project(path)?;

    let mut registry = AssetRegistry::new();
    let mut panes = EditorPanes::new();
    record.apply(&mut panes, &mut registry)?;
    registry.resolve_loads();

    let surface = Rc::new(RefCell::new(Surface::new(width, height)));
    let assets = Rc::new(RefCell::new(registry));
    let console = Rc::new(RefCell::new(Console::new()));
    let builder = LuaProgramBuilder::new(
        Rc::clone(&surface),
        Rc::clone(&assets),
        Rc::clone(&console),
    );

    let mut runner = Runner::with_default_interval(Rc::clone(&console));
    let mut input = InputState::new();

    // Sources are locked against edits for the duration of the run, matching
    // the editor contract even though nothing types into them here.
    panes.set_read_only(true);
    let sources = panes.sources();

    let epoch = Instant::now();
    let started = runner.start(&builder, &sources, epoch).is_ok();
    if started {
        let interval = runner.frame_interval();
        for i in 1..=frames {
            if !runner.frame(epoch + interval * i, width, height, &mut input) {
                break;
            }
        }
        if let Some(fps) = runner.fps() {
            info!("effective rate: {fps:.1} fps");
        }
        runner.stop(true);
    }
    panes.set_read_only(false);

    for line in console.borrow().lines() {
        println!("{line}");
    }
    if let Some(status) = console.borrow().status() {
        return Err(status.to_string().into());
    }

    if let Some(out) = out {
        let surface = surface.borrow();
        image::save_buffer(
            out,
            surface.as_bytes(),
            surface.width(),
            surface.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        info!("wrote {}", out.display());
    }
    Ok(())
}

/// Runs the project, then re-runs it every time the file on disk changes.
/// A run that fails to build keeps the watch alive.
fn watch_project(
    path: &Path,
    frames: u32,
    width: u32,
    height: u32,
    out: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    if let Err(err) = run_project(path, frames, width, height, out) {
        error!("{err}");
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    info!("watching {}", path.display());

    for event in rx {
        let event = event?;
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            continue;
        }
        if !event.paths.iter().any(|p| p.file_name() == path.file_name()) {
            continue;
        }
        info!("{} changed, re-running", path.display());
        if let Err(err) = run_project(path, frames, width, height, out) {
            error!("{err}");
        }
    }
    Ok(())
}

fn export_project(path: &Path, out: Option<&Path>, title: &str) -> Result<(), Box<dyn Error>> {
    let record = load_project(path)?;
    let interval_ms = RunnerClock::DEFAULT_INTERVAL.as_secs_f64() * 1000.0;
    let html = export_html(title, &record, interval_ms);

    let out = match out {
        Some(out) => out.to_path_buf(),
        None => path.with_extension("html"),
    };
    std::fs::write(&out, html)?;
    info!("exported {}", out.display());
    Ok(())
}
