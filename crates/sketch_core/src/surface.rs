//! Immediate-mode RGBA drawing surface.
//!
//! The sketch's canvas: a plain pixel buffer with a small drawing API. No
//! retained scene graph, no pixel-density assumptions — every operation writes
//! pixels right away and out-of-bounds writes are silently dropped.

/// RGBA color, 8 bits per channel.
pub type Rgba = [u8; 4];

/// A decoded RGBA image, ready to blit onto a [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long.
    pub rgba: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            rgba,
        }
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }
}

/// RGBA pixel buffer with immediate-mode drawing operations.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Creates a surface filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Resizes the surface, clearing it to transparent black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data = vec![0; (width * height * 4) as usize];
    }

    /// Clears to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Fills the whole surface with one color.
    pub fn fill(&mut self, color: Rgba) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            None
        } else {
            Some(((y as u32 * self.width + x as u32) * 4) as usize)
        }
    }

    /// Writes one pixel; off-surface coordinates are a no-op.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx..idx + 4].copy_from_slice(&color);
        }
    }

    /// Reads one pixel; transparent black off-surface.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Rgba {
        match self.index(x, y) {
            Some(idx) => [
                self.data[idx],
                self.data[idx + 1],
                self.data[idx + 2],
                self.data[idx + 3],
            ],
            None => [0, 0, 0, 0],
        }
    }

    /// Source-over alpha composite of `color` onto the pixel at (x, y).
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if self.index(x, y).is_none() {
            return;
        }

        let src_a = color[3] as f32 / 255.0;
        if src_a == 0.0 {
            return;
        }
        if src_a == 1.0 {
            self.set_pixel(x, y, color);
            return;
        }

        let dst = self.get_pixel(x, y);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a == 0.0 {
            self.set_pixel(x, y, [0, 0, 0, 0]);
            return;
        }

        let blend = |s: u8, d: u8| -> u8 {
            let s = s as f32 / 255.0;
            let d = d as f32 / 255.0;
            let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            (out * 255.0).clamp(0.0, 255.0) as u8
        };

        self.set_pixel(
            x,
            y,
            [
                blend(color[0], dst[0]),
                blend(color[1], dst[1]),
                blend(color[2], dst[2]),
                (out_a * 255.0) as u8,
            ],
        );
    }

    /// Fills an axis-aligned rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        if w <= 0 || h <= 0 {
            return;
        }
        for py in y..y.saturating_add(h) {
            for px in x..x.saturating_add(w) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Fills a circle centered at (cx, cy).
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        if radius <= 0 {
            return;
        }
        let r2 = (radius as i64) * (radius as i64);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = (dx as i64) * (dx as i64) + (dy as i64) * (dy as i64);
                if d2 <= r2 {
                    self.blend_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draws a one-pixel line with Bresenham's algorithm.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.blend_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Composites a bitmap with its top-left corner at (x, y).
    pub fn blit(&mut self, bitmap: &Bitmap, x: i32, y: i32) {
        for by in 0..bitmap.height {
            for bx in 0..bitmap.width {
                self.blend_pixel(
                    x + bx as i32,
                    y + by as i32,
                    bitmap.pixel(bx, by),
                );
            }
        }
    }
}
