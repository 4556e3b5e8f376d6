//! Core of the sketch_studio live-coding sandbox.
//!
//! Users write start/update/draw sketch code in three panes; a program builder
//! assembles them into one runnable unit and a fixed-timestep runner drives it
//! against an RGBA drawing surface. Projects (sources plus embedded assets)
//! save to a flat JSON record and export to a standalone HTML document.
//!
//! # Architecture
//!
//! - [`input::InputState`]: keyboard/pointer state with edge-triggered flags
//! - [`clock::RunnerClock`]: accumulator clock decoupling simulation rate from
//!   display refresh
//! - [`runner::Runner`]: the Stopped/Running state machine and frame loop
//! - [`program`]: the language-neutral `Program`/`ProgramBuilder` seam
//! - [`asset::AssetRegistry`]: named image/sound assets with deferred loads
//! - [`surface::Surface`]: immediate-mode pixel buffer
//! - [`project`]: the persisted project record
//! - [`export`]: the standalone HTML exporter
//!
//! Everything is single-threaded and callback-driven; shared handles are
//! `Rc<RefCell<..>>`, never locks.

pub mod asset;
pub mod clock;
pub mod console;
pub mod editor;
pub mod error;
pub mod export;
pub mod input;
pub mod program;
pub mod project;
pub mod runner;
pub mod surface;

pub use asset::{AssetEntry, AssetHandle, AssetKind, AssetRegistry};
pub use clock::RunnerClock;
pub use console::Console;
pub use editor::{BufferEditor, EditorPanes, TextSurface};
pub use error::{ErrorKind, SketchError, SketchResult};
pub use export::export_html;
pub use input::{InputState, KeyCode, PointerState};
pub use program::{Program, ProgramBuilder, Sources};
pub use project::{load_project, save_project, AssetDescriptor, ProjectIoError, ProjectRecord};
pub use runner::Runner;
pub use surface::{Bitmap, Rgba, Surface};
