//! Lua program builder for the sketch sandbox.
//!
//! Start, update, and draw sources are assembled into a single chunk so that
//! locals declared in start are lexically visible to the update and draw
//! bodies. Every build runs in a fresh Lua state: nothing survives a
//! stop/start cycle.

mod bindings;

pub use bindings::{CanvasHandle, ImageHandle, SoundHandle};

use mlua::{Function, Lua, Value, Variadic};
use sketch_core::asset::AssetRegistry;
use sketch_core::console::Console;
use sketch_core::error::{SketchError, SketchResult};
use sketch_core::input::InputState;
use sketch_core::program::{Program, ProgramBuilder, Sources};
use sketch_core::surface::Surface;
use std::cell::RefCell;
use std::f64::consts::{PI, TAU};
use std::rc::Rc;

/// Compiles the three source panes into a runnable Lua program.
pub struct LuaProgramBuilder {
    surface: Rc<RefCell<Surface>>,
    assets: Rc<RefCell<AssetRegistry>>,
    console: Rc<RefCell<Console>>,
}

impl LuaProgramBuilder {
    pub fn new(
        surface: Rc<RefCell<Surface>>,
        assets: Rc<RefCell<AssetRegistry>>,
        console: Rc<RefCell<Console>>,
    ) -> Self {
        Self {
            surface,
            assets,
            console,
        }
    }

    fn install_globals(&self, lua: &Lua) -> mlua::Result<()> {
        let globals = lua.globals();
        globals.set("PI", PI)?;
        globals.set("PI2", TAU)?;
        globals.set("width", self.surface.borrow().width())?;
        globals.set("height", self.surface.borrow().height())?;
        globals.set("canvas", CanvasHandle::new(Rc::clone(&self.surface)))?;

        // The surface size is fixed while a program runs; set_size only
        // matters in exported pages, so here it is accepted and ignored.
        globals.set(
            "set_size",
            lua.create_function(|_, (_w, _h): (u32, u32)| Ok(()))?,
        )?;

        // Accessors look the asset up per call, so a name removed from the
        // registry mid-run starts failing on the next call.
        let assets = Rc::clone(&self.assets);
        globals.set(
            "image",
            lua.create_function(move |_, name: String| {
                let registry = assets.borrow();
                match registry.image(&name) {
                    Ok(entry) => Ok(ImageHandle {
                        name: entry.name.clone(),
                        bitmap: entry.bitmap(),
                    }),
                    Err(err) => Err(mlua::Error::RuntimeError(err.message)),
                }
            })?,
        )?;

        let assets = Rc::clone(&self.assets);
        globals.set(
            "sound",
            lua.create_function(move |_, name: String| {
                let registry = assets.borrow();
                match registry.sound(&name) {
                    Ok(entry) => Ok(SoundHandle {
                        name: entry.name.clone(),
                        byte_len: entry.sound_info().map(|info| info.byte_len),
                    }),
                    Err(err) => Err(mlua::Error::RuntimeError(err.message)),
                }
            })?,
        )?;

        let console = Rc::clone(&self.console);
        globals.set(
            "print",
            lua.create_function(move |_, args: Variadic<Value>| {
                let line = args
                    .iter()
                    .map(format_value)
                    .collect::<Vec<_>>()
                    .join("\t");
                console.borrow_mut().log(line);
                Ok(())
            })?,
        )?;

        Ok(())
    }
}

impl ProgramBuilder for LuaProgramBuilder {
    fn build(&self, sources: &Sources) -> SketchResult<Box<dyn Program>> {
        let lua = Lua::new();
        self.install_globals(&lua)
            .map_err(|e| SketchError::compile(e.to_string()))?;

        let chunk = assemble(sources);
        lua.load(&chunk)
            .set_name("sketch")
            .exec()
            .map_err(|e| SketchError::compile(e.to_string()))?;

        let update_fn: Function = lua
            .globals()
            .get("update")
            .map_err(|e| SketchError::compile(e.to_string()))?;
        let draw_fn: Function = lua
            .globals()
            .get("draw")
            .map_err(|e| SketchError::compile(e.to_string()))?;

        Ok(Box::new(LuaProgram {
            lua,
            update_fn,
            draw_fn,
        }))
    }
}

/// One compiled sketch. The start body has already executed by the time this
/// exists; update and draw are called per step/frame by the runner.
struct LuaProgram {
    lua: Lua,
    update_fn: Function,
    draw_fn: Function,
}

impl LuaProgram {
    fn input_tables(&self, input: &InputState) -> mlua::Result<(mlua::Table, mlua::Table)> {
        let mouse = self.lua.create_table()?;
        mouse.set("x", input.pointer.x)?;
        mouse.set("y", input.pointer.y)?;
        mouse.set("pressed", input.pointer.pressed)?;
        mouse.set("released", input.pointer.released)?;

        let key = self.lua.create_table()?;
        let down = Rc::new(input.keys_down_snapshot());
        let released = Rc::new(input.keys_released_snapshot());
        key.set(
            "pressed",
            self.lua
                .create_function(move |_, code: u32| Ok(down.contains(&code)))?,
        )?;
        key.set(
            "released",
            self.lua
                .create_function(move |_, code: u32| Ok(released.contains(&code)))?,
        )?;

        Ok((mouse, key))
    }
}

impl Program for LuaProgram {
    fn update(
        &mut self,
        delta_time: f64,
        width: u32,
        height: u32,
        input: &InputState,
    ) -> SketchResult<()> {
        let (mouse, key) = self
            .input_tables(input)
            .map_err(|e| SketchError::runtime(e.to_string()))?;
        self.update_fn
            .call::<()>((delta_time, width, height, mouse, key))
            .map_err(|e| SketchError::runtime(e.to_string()))
    }

    fn draw(&mut self, width: u32, height: u32) -> SketchResult<()> {
        self.draw_fn
            .call::<()>((width, height))
            .map_err(|e| SketchError::runtime(e.to_string()))
    }
}

fn assemble(sources: &Sources) -> String {
    format!(
        "{}\n\nfunction update(deltaTime, width, height, mouse, key)\n{}\nend\n\nfunction draw(width, height)\n{}\nend\n",
        sources.start, sources.update, sources.draw
    )
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.to_string_lossy().to_string(),
        other => other.type_name().to_string(),
    }
}
