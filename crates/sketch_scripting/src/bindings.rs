//! Userdata bridging sandbox state into Lua.
//!
//! The canvas handle shares the drawing surface through `Rc<RefCell<..>>`
//! (single-threaded, no locks); asset handles are snapshots of one accessor
//! call and carry the decoded resource when the load has completed.

use log::debug;
use mlua::{UserData, UserDataFields, UserDataMethods, UserDataRef};
use sketch_core::surface::{Bitmap, Surface};
use std::cell::RefCell;
use std::rc::Rc;

/// The drawing surface as seen by sketch code, injected as `canvas`.
pub struct CanvasHandle {
    surface: Rc<RefCell<Surface>>,
}

impl CanvasHandle {
    pub fn new(surface: Rc<RefCell<Surface>>) -> Self {
        Self { surface }
    }
}

impl UserData for CanvasHandle {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("width", |_, this| Ok(this.surface.borrow().width()));
        fields.add_field_method_get("height", |_, this| Ok(this.surface.borrow().height()));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("clear", |_, this, ()| {
            this.surface.borrow_mut().clear();
            Ok(())
        });

        methods.add_method("fill", |_, this, (r, g, b, a): (u8, u8, u8, Option<u8>)| {
            this.surface.borrow_mut().fill([r, g, b, a.unwrap_or(255)]);
            Ok(())
        });

        methods.add_method(
            "set_pixel",
            |_, this, (x, y, r, g, b, a): (i32, i32, u8, u8, u8, Option<u8>)| {
                this.surface
                    .borrow_mut()
                    .set_pixel(x, y, [r, g, b, a.unwrap_or(255)]);
                Ok(())
            },
        );

        methods.add_method("get_pixel", |_, this, (x, y): (i32, i32)| {
            let px = this.surface.borrow().get_pixel(x, y);
            Ok((px[0], px[1], px[2], px[3]))
        });

        methods.add_method(
            "blend_pixel",
            |_, this, (x, y, r, g, b, a): (i32, i32, u8, u8, u8, Option<u8>)| {
                this.surface
                    .borrow_mut()
                    .blend_pixel(x, y, [r, g, b, a.unwrap_or(255)]);
                Ok(())
            },
        );

        methods.add_method(
            "fill_rect",
            |_, this, (x, y, w, h, r, g, b, a): (i32, i32, i32, i32, u8, u8, u8, Option<u8>)| {
                this.surface
                    .borrow_mut()
                    .fill_rect(x, y, w, h, [r, g, b, a.unwrap_or(255)]);
                Ok(())
            },
        );

        methods.add_method(
            "fill_circle",
            |_, this, (cx, cy, radius, r, g, b, a): (i32, i32, i32, u8, u8, u8, Option<u8>)| {
                this.surface
                    .borrow_mut()
                    .fill_circle(cx, cy, radius, [r, g, b, a.unwrap_or(255)]);
                Ok(())
            },
        );

        methods.add_method(
            "line",
            |_, this, (x0, y0, x1, y1, r, g, b, a): (i32, i32, i32, i32, u8, u8, u8, Option<u8>)| {
                this.surface
                    .borrow_mut()
                    .line(x0, y0, x1, y1, [r, g, b, a.unwrap_or(255)]);
                Ok(())
            },
        );

        // Drawing an unready image is a no-op, not an error.
        methods.add_method(
            "draw_image",
            |_, this, (img, x, y): (UserDataRef<ImageHandle>, i32, i32)| {
                if let Some(bitmap) = &img.bitmap {
                    this.surface.borrow_mut().blit(bitmap, x, y);
                }
                Ok(())
            },
        );
    }
}

/// Result of one `image(name)` accessor call. `bitmap` is `None` until the
/// registry resolves the load.
pub struct ImageHandle {
    pub name: String,
    pub bitmap: Option<Rc<Bitmap>>,
}

impl UserData for ImageHandle {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("name", |_, this| Ok(this.name.clone()));
        fields.add_field_method_get("ready", |_, this| Ok(this.bitmap.is_some()));
        fields.add_field_method_get("width", |_, this| {
            Ok(this.bitmap.as_ref().map_or(0, |b| b.width))
        });
        fields.add_field_method_get("height", |_, this| {
            Ok(this.bitmap.as_ref().map_or(0, |b| b.height))
        });
    }
}

/// Result of one `sound(name)` accessor call. Playback is outside the
/// sandbox; `play` only logs.
pub struct SoundHandle {
    pub name: String,
    pub byte_len: Option<usize>,
}

impl UserData for SoundHandle {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("name", |_, this| Ok(this.name.clone()));
        fields.add_field_method_get("ready", |_, this| Ok(this.byte_len.is_some()));
        fields.add_field_method_get("size", |_, this| Ok(this.byte_len.unwrap_or(0)));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("play", |_, this, ()| {
            debug!("sound '{}' play requested", this.name);
            Ok(())
        });
    }
}
