//! End-to-end checks for the Lua builder: shared chunk scope, clean-slate
//! rebuilds, asset accessors, and the input bridge.

use sketch_core::asset::{AssetKind, AssetRegistry};
use sketch_core::console::Console;
use sketch_core::error::ErrorKind;
use sketch_core::input::InputState;
use sketch_core::program::{ProgramBuilder, Sources};
use sketch_core::surface::Surface;
use sketch_scripting::LuaProgramBuilder;
use std::cell::RefCell;
use std::rc::Rc;

struct Harness {
    surface: Rc<RefCell<Surface>>,
    assets: Rc<RefCell<AssetRegistry>>,
    console: Rc<RefCell<Console>>,
    builder: LuaProgramBuilder,
}

fn harness() -> Harness {
    let surface = Rc::new(RefCell::new(Surface::new(8, 8)));
    let assets = Rc::new(RefCell::new(AssetRegistry::new()));
    let console = Rc::new(RefCell::new(Console::new()));
    let builder = LuaProgramBuilder::new(
        Rc::clone(&surface),
        Rc::clone(&assets),
        Rc::clone(&console),
    );
    Harness {
        surface,
        assets,
        console,
        builder,
    }
}

// 1x1 transparent PNG.
fn tiny_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

fn red_at(surface: &Rc<RefCell<Surface>>, x: i32, y: i32) -> u8 {
    surface.borrow().get_pixel(x, y)[0]
}

#[test]
fn start_locals_are_shared_with_update_and_draw() {
    let h = harness();
    let sources = Sources::new(
        "local count = 0",
        "count = count + 1",
        "canvas:set_pixel(0, 0, count, 0, 0, 255)",
    );
    let mut program = h.builder.build(&sources).unwrap();

    let input = InputState::new();
    for _ in 0..3 {
        program.update(0.02, 8, 8, &input).unwrap();
    }
    program.draw(8, 8).unwrap();

    assert_eq!(red_at(&h.surface, 0, 0), 3);
}

#[test]
fn rebuild_starts_from_a_clean_slate() {
    let h = harness();
    let first = Sources::new("leak = 123", "", "canvas:clear()");
    h.builder.build(&first).unwrap();

    let second = Sources::new(
        "",
        "",
        "if leak == nil then canvas:set_pixel(0, 0, 255, 0, 0, 255) end",
    );
    let mut program = h.builder.build(&second).unwrap();
    program.draw(8, 8).unwrap();

    assert_eq!(red_at(&h.surface, 0, 0), 255);
}

#[test]
fn syntax_error_reports_compile_kind() {
    let h = harness();
    let err = h
        .builder
        .build(&Sources::new("", "local = 5", ""))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Compile);
}

#[test]
fn error_raised_in_start_is_a_compile_failure() {
    let h = harness();
    let err = h
        .builder
        .build(&Sources::new("error('bad start')", "x = 1", ""))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Compile);
    assert!(err.message.contains("bad start"));
}

#[test]
fn update_error_is_runtime_and_does_not_poison_the_program() {
    let h = harness();
    let sources = Sources::new(
        "local tripped = false",
        "if not tripped then tripped = true error('boom') end",
        "",
    );
    let mut program = h.builder.build(&sources).unwrap();

    let input = InputState::new();
    let err = program.update(0.02, 8, 8, &input).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert!(err.message.contains("boom"));

    // The same program keeps running after a guarded error.
    program.update(0.02, 8, 8, &input).unwrap();
}

#[test]
fn missing_image_raises_a_runtime_error() {
    let h = harness();
    let sources = Sources::new("", "", "local img = image('missing')");
    let mut program = h.builder.build(&sources).unwrap();

    let err = program.draw(8, 8).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert!(err.message.contains("Image not found: missing"));
}

#[test]
fn resolved_image_exposes_dimensions() {
    let h = harness();
    {
        let mut registry = h.assets.borrow_mut();
        registry
            .register("hero", AssetKind::Image, tiny_png())
            .unwrap();
        registry.resolve_loads();
    }

    let sources = Sources::new(
        "",
        "",
        "local img = image('hero')\n\
         canvas:set_pixel(0, 0, img.width, img.height, 0, 255)\n\
         canvas:draw_image(img, 2, 2)",
    );
    let mut program = h.builder.build(&sources).unwrap();
    program.draw(8, 8).unwrap();

    let px = h.surface.borrow().get_pixel(0, 0);
    assert_eq!((px[0], px[1]), (1, 1));
}

#[test]
fn unready_image_is_usable_but_not_ready() {
    let h = harness();
    h.assets
        .borrow_mut()
        .register("hero", AssetKind::Image, tiny_png())
        .unwrap();
    // No resolve_loads: the handle stays pending.

    let sources = Sources::new(
        "",
        "",
        "local img = image('hero')\n\
         if not img.ready then canvas:set_pixel(0, 0, 9, 0, 0, 255) end",
    );
    let mut program = h.builder.build(&sources).unwrap();
    program.draw(8, 8).unwrap();

    assert_eq!(red_at(&h.surface, 0, 0), 9);
}

#[test]
fn removal_is_observed_on_the_next_accessor_call() {
    let h = harness();
    {
        let mut registry = h.assets.borrow_mut();
        registry
            .register("hero", AssetKind::Image, tiny_png())
            .unwrap();
        registry.resolve_loads();
    }

    let sources = Sources::new("", "", "local img = image('hero')");
    let mut program = h.builder.build(&sources).unwrap();
    program.draw(8, 8).unwrap();

    h.assets.borrow_mut().remove("hero");
    let err = program.draw(8, 8).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert!(err.message.contains("Image not found: hero"));
}

#[test]
fn sound_handle_reports_size_and_plays() {
    let h = harness();
    {
        let mut registry = h.assets.borrow_mut();
        registry
            .register("jump", AssetKind::Sound, vec![1, 2, 3])
            .unwrap();
        registry.resolve_loads();
    }

    let sources = Sources::new(
        "",
        "",
        "local s = sound('jump')\n\
         s:play()\n\
         canvas:set_pixel(0, 0, s.size, 0, 0, 255)",
    );
    let mut program = h.builder.build(&sources).unwrap();
    program.draw(8, 8).unwrap();

    assert_eq!(red_at(&h.surface, 0, 0), 3);
}

#[test]
fn key_and_mouse_state_cross_the_bridge() {
    let h = harness();
    let sources = Sources::new(
        "local hit = false",
        "if key.pressed(32) and mouse.x > 5 then hit = true end",
        "if hit then canvas:set_pixel(1, 1, 255, 0, 0, 255) end",
    );
    let mut program = h.builder.build(&sources).unwrap();

    let mut input = InputState::new();
    input.key_down(32);
    input.pointer_moved(10.0, 0.0);
    program.update(0.02, 8, 8, &input).unwrap();
    program.draw(8, 8).unwrap();

    assert_eq!(red_at(&h.surface, 1, 1), 255);
}

#[test]
fn print_goes_to_the_console() {
    let h = harness();
    let sources = Sources::new("print('hello', 42, true, nil)", "x = 1", "");
    h.builder.build(&sources).unwrap();

    let console = h.console.borrow();
    assert_eq!(console.lines(), ["hello\t42\ttrue\tnil"]);
}

#[test]
fn builder_constants_match_the_surface() {
    let h = harness();
    let sources = Sources::new(
        "",
        "",
        "if width == canvas.width and height == canvas.height and PI2 == 2 * PI then\n\
         canvas:set_pixel(0, 0, 77, 0, 0, 255)\n\
         end\n\
         set_size(640, 480)",
    );
    let mut program = h.builder.build(&sources).unwrap();
    program.draw(8, 8).unwrap();

    assert_eq!(red_at(&h.surface, 0, 0), 77);
}
