//! Drawing surfaces.
//!
//! `Surface` is the small set of fill/stroke primitives shapes are drawn
//! with. `PixmapSurface` rasterizes them with tiny-skia; the app uploads the
//! pixmap to egui as a texture.

use crate::error::{FileError, Result};
use crate::shape::{Point, Rgb, Shape};
use image::RgbaImage;
use std::f64::consts::PI;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Cubic Bezier handle length for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Segments used to flatten an arc.
const ARC_SEGMENTS: usize = 64;

/// Everything a shape needs from whatever it is drawn on.
///
/// Coordinates are y-down. Angles are degrees, counter-clockwise from
/// 3 o'clock as seen on screen. Boxes with zero or negative width or height
/// draw nothing.
pub trait Surface {
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb);
    /// `arc` is the corner diameter, clamped to the box.
    fn fill_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, arc: f64, color: Rgb);
    fn fill_oval(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb);
    /// Filled arc of the ellipse inscribed in the box, closed by its chord.
    #[allow(clippy::too_many_arguments)]
    fn fill_arc(&mut self, x: f64, y: f64, w: f64, h: f64, start: f64, extent: f64, color: Rgb);
    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb);

    /// Clear, then draw every shape in order.
    fn redraw(&mut self, shapes: &[Shape])
    where
        Self: Sized,
    {
        self.clear();
        for shape in shapes {
            shape.draw(self);
        }
    }
}

/// Raster surface backed by a tiny-skia pixmap on a white background.
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or(FileError::CanvasSize { width, height })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// RGBA at a pixel, or None outside the surface.
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        // tiny-skia indexes width * y + x, so x past the edge would wrap
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    pub fn to_color_image(&self) -> egui::ColorImage {
        let size = [self.width() as usize, self.height() as usize];
        egui::ColorImage::from_rgba_premultiplied(size, self.pixmap.data())
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RgbaImage::from_raw(self.width(), self.height(), data)
    }

    fn paint(color: Rgb) -> Paint<'static> {
        let [r, g, b, a] = color.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint
    }

    fn fill(&mut self, path: Option<Path>, color: Rgb) {
        if let Some(path) = path {
            self.pixmap
                .fill_path(&path, &Self::paint(color), FillRule::Winding, Transform::identity(), None);
        }
    }
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> Option<Rect> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Rect::from_xywh(x as f32, y as f32, w as f32, h as f32)
}

fn round_rect_path(r: Rect, arc: f64) -> Option<Path> {
    let rx = (arc as f32 / 2.0).clamp(0.0, r.width() / 2.0);
    let ry = (arc as f32 / 2.0).clamp(0.0, r.height() / 2.0);
    if rx == 0.0 || ry == 0.0 {
        return Some(PathBuilder::from_rect(r));
    }
    let (l, t, rt, b) = (r.left(), r.top(), r.right(), r.bottom());
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);

    let mut pb = PathBuilder::new();
    pb.move_to(l + rx, t);
    pb.line_to(rt - rx, t);
    pb.cubic_to(rt - rx + kx, t, rt, t + ry - ky, rt, t + ry);
    pb.line_to(rt, b - ry);
    pb.cubic_to(rt, b - ry + ky, rt - rx + kx, b, rt - rx, b);
    pb.line_to(l + rx, b);
    pb.cubic_to(l + rx - kx, b, l, b - ry + ky, l, b - ry);
    pb.line_to(l, t + ry);
    pb.cubic_to(l, t + ry - ky, l + rx - kx, t, l + rx, t);
    pb.close();
    pb.finish()
}

/// Points along the arc of the ellipse inscribed in the box, from `start`
/// through `extent` degrees.
pub fn arc_points(x: f64, y: f64, w: f64, h: f64, start: f64, extent: f64) -> Vec<Point> {
    let (rx, ry) = (w / 2.0, h / 2.0);
    let (cx, cy) = (x + rx, y + ry);
    (0..=ARC_SEGMENTS)
        .map(|i| {
            let rad = (start + extent * i as f64 / ARC_SEGMENTS as f64) * PI / 180.0;
            // y is flipped: positive angles go up the screen
            Point::new(cx + rx * rad.cos(), cy - ry * rad.sin())
        })
        .collect()
}

fn arc_path(x: f64, y: f64, w: f64, h: f64, start: f64, extent: f64) -> Option<Path> {
    let points = arc_points(x, y, w, h, start, extent);
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    pb.finish()
}

impl Surface for PixmapSurface {
    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::WHITE);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        if let Some(r) = rect(x, y, w, h) {
            self.pixmap.fill_rect(r, &Self::paint(color), Transform::identity(), None);
        }
    }

    fn fill_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, arc: f64, color: Rgb) {
        let path = rect(x, y, w, h).and_then(|r| round_rect_path(r, arc));
        self.fill(path, color);
    }

    fn fill_oval(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let path = rect(x, y, w, h).and_then(PathBuilder::from_oval);
        self.fill(path, color);
    }

    fn fill_arc(&mut self, x: f64, y: f64, w: f64, h: f64, start: f64, extent: f64, color: Rgb) {
        if rect(x, y, w, h).is_some() {
            self.fill(arc_path(x, y, w, h, start, extent), color);
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        if let Some(path) = pb.finish() {
            let stroke = Stroke { width: 1.0, ..Stroke::default() };
            self.pixmap
                .stroke_path(&path, &Self::paint(color), &stroke, Transform::identity(), None);
        }
    }
}
