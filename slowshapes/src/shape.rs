//! Shape model: the closed set of primitives a drawing is made of.
//!
//! Every shape is a kind tag, a box given by two corner points, and a fill
//! color. Rendering is one `match` over the kind.

use crate::surface::Surface;
use serde::{Deserialize, Serialize};

/// Diameter of the corner arcs on rounded rectangles and squares.
pub const CORNER_ARC: f64 = 50.0;

/// Arc start angle in degrees (counter-clockwise from 3 o'clock).
pub const ARC_START: f64 = 20.0;
/// Arc sweep in degrees.
pub const ARC_EXTENT: f64 = 140.0;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_negative(&self) -> bool {
        self.x < 0.0 || self.y < 0.0
    }
}

/// RGB color, each channel in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// 8-bit channels, clamped.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), 255]
    }

    /// From display (sRGB) bytes, as the color picker edits them. Channels
    /// are stored as display values, not linear light.
    pub fn from_srgb8([r, g, b]: [u8; 3]) -> Self {
        let c = |v: u8| f64::from(v) / 255.0;
        Self::new(c(r), c(g), c(b))
    }

    pub fn to_srgb8(self) -> [u8; 3] {
        let [r, g, b, _] = self.to_rgba8();
        [r, g, b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLUE
    }
}

/// Which primitive a shape is.
///
/// The discriminants are the record tags of the `.g` file format and must
/// not be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle = 0,
    Square = 1,
    RoundedRectangle = 2,
    RoundedSquare = 3,
    Circle = 4,
    Arc = 5,
    Oval = 6,
    Line = 7,
}

impl ShapeKind {
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Rectangle,
            ShapeKind::Square,
            ShapeKind::RoundedRectangle,
            ShapeKind::RoundedSquare,
            ShapeKind::Circle,
            ShapeKind::Arc,
            ShapeKind::Oval,
            ShapeKind::Line,
        ]
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<ShapeKind> {
        ShapeKind::all().get(usize::from(tag)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Square => "square",
            ShapeKind::RoundedRectangle => "rounded rectangle",
            ShapeKind::RoundedSquare => "rounded square",
            ShapeKind::Circle => "circle",
            ShapeKind::Arc => "arc",
            ShapeKind::Oval => "oval",
            ShapeKind::Line => "line",
        }
    }

    pub fn family(self) -> ShapeFamily {
        match self {
            ShapeKind::Rectangle
            | ShapeKind::Square
            | ShapeKind::RoundedRectangle
            | ShapeKind::RoundedSquare => ShapeFamily::Rectangles,
            ShapeKind::Circle | ShapeKind::Oval | ShapeKind::Arc => ShapeFamily::Ellipses,
            ShapeKind::Line => ShapeFamily::Lines,
        }
    }

    /// Lines keep the raw press/release points; everything else gets a
    /// normalized box.
    pub fn is_line(self) -> bool {
        matches!(self, ShapeKind::Line)
    }
}

/// Menu grouping of shape kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeFamily {
    Rectangles,
    Ellipses,
    Lines,
}

impl ShapeFamily {
    pub fn all() -> &'static [ShapeFamily] {
        &[ShapeFamily::Rectangles, ShapeFamily::Ellipses, ShapeFamily::Lines]
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeFamily::Rectangles => "rectangles",
            ShapeFamily::Ellipses => "ellipses",
            ShapeFamily::Lines => "lines",
        }
    }

    /// Kinds in this family, in menu order.
    pub fn kinds(self) -> &'static [ShapeKind] {
        match self {
            ShapeFamily::Rectangles => &[
                ShapeKind::Rectangle,
                ShapeKind::Square,
                ShapeKind::RoundedRectangle,
                ShapeKind::RoundedSquare,
            ],
            ShapeFamily::Ellipses => &[ShapeKind::Circle, ShapeKind::Oval, ShapeKind::Arc],
            ShapeFamily::Lines => &[ShapeKind::Line],
        }
    }
}

/// A placed shape. Immutable once it is in a drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: Rgb,
}

impl Shape {
    pub fn new(kind: ShapeKind, start: Point, end: Point, color: Rgb) -> Self {
        Self { kind, start, end, color }
    }

    pub fn width(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn height(&self) -> f64 {
        self.end.y - self.start.y
    }

    /// Side of squares and diameter of circles: the smaller box dimension.
    pub fn side(&self) -> f64 {
        self.width().min(self.height())
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        let Point { x, y } = self.start;
        let color = self.color;
        match self.kind {
            ShapeKind::Rectangle => surface.fill_rect(x, y, self.width(), self.height(), color),
            ShapeKind::RoundedRectangle => {
                surface.fill_round_rect(x, y, self.width(), self.height(), CORNER_ARC, color)
            }
            ShapeKind::Square => surface.fill_rect(x, y, self.side(), self.side(), color),
            ShapeKind::RoundedSquare => {
                surface.fill_round_rect(x, y, self.side(), self.side(), CORNER_ARC, color)
            }
            ShapeKind::Circle => surface.fill_oval(x, y, self.side(), self.side(), color),
            ShapeKind::Oval => surface.fill_oval(x, y, self.width(), self.height(), color),
            // box is twice as tall as the drag: the chord sits on the drag's bottom edge
            ShapeKind::Arc => surface.fill_arc(
                x,
                y,
                self.width(),
                self.height() * 2.0,
                ARC_START,
                ARC_EXTENT,
                color,
            ),
            ShapeKind::Line => surface.stroke_line(self.start, self.end, color),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Surface that records calls instead of rasterizing.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub calls: Vec<String>,
    }

    impl Surface for Recorder {
        fn clear(&mut self) {
            self.calls.push("clear".into());
        }
        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, _color: Rgb) {
            self.calls.push(format!("rect {x} {y} {w} {h}"));
        }
        fn fill_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, arc: f64, _color: Rgb) {
            self.calls.push(format!("round {x} {y} {w} {h} {arc}"));
        }
        fn fill_oval(&mut self, x: f64, y: f64, w: f64, h: f64, _color: Rgb) {
            self.calls.push(format!("oval {x} {y} {w} {h}"));
        }
        fn fill_arc(&mut self, x: f64, y: f64, w: f64, h: f64, start: f64, extent: f64, _color: Rgb) {
            self.calls.push(format!("arc {x} {y} {w} {h} {start} {extent}"));
        }
        fn stroke_line(&mut self, from: Point, to: Point, _color: Rgb) {
            self.calls.push(format!("line {} {} {} {}", from.x, from.y, to.x, to.y));
        }
    }

    fn drawn(kind: ShapeKind, x1: f64, y1: f64, x2: f64, y2: f64) -> String {
        let mut rec = Recorder::default();
        Shape::new(kind, Point::new(x1, y1), Point::new(x2, y2), Rgb::RED).draw(&mut rec);
        assert_eq!(rec.calls.len(), 1);
        rec.calls.remove(0)
    }

    #[test]
    fn test_tags_are_stable() {
        let expected = [
            (ShapeKind::Rectangle, 0),
            (ShapeKind::Square, 1),
            (ShapeKind::RoundedRectangle, 2),
            (ShapeKind::RoundedSquare, 3),
            (ShapeKind::Circle, 4),
            (ShapeKind::Arc, 5),
            (ShapeKind::Oval, 6),
            (ShapeKind::Line, 7),
        ];
        for (kind, tag) in expected {
            assert_eq!(kind.tag(), tag);
            assert_eq!(ShapeKind::from_tag(tag), Some(kind));
        }
        assert_eq!(ShapeKind::from_tag(8), None);
        assert_eq!(ShapeKind::from_tag(0xFF), None);
    }

    #[test]
    fn test_families_cover_every_kind_once() {
        let mut seen: Vec<ShapeKind> = ShapeFamily::all()
            .iter()
            .flat_map(|f| f.kinds().iter().copied())
            .collect();
        assert_eq!(seen.len(), ShapeKind::all().len());
        for family in ShapeFamily::all() {
            assert!(family.kinds().iter().all(|k| k.family() == *family));
        }
        seen.sort_by_key(|k| k.tag());
        assert_eq!(seen, ShapeKind::all());
    }

    #[test]
    fn test_rectangle_fills_box() {
        assert_eq!(drawn(ShapeKind::Rectangle, 10.0, 10.0, 50.0, 30.0), "rect 10 10 40 20");
        assert_eq!(drawn(ShapeKind::RoundedRectangle, 10.0, 10.0, 50.0, 30.0), "round 10 10 40 20 50");
    }

    #[test]
    fn test_square_uses_smaller_side() {
        assert_eq!(drawn(ShapeKind::Square, 10.0, 10.0, 50.0, 30.0), "rect 10 10 20 20");
        assert_eq!(drawn(ShapeKind::Square, 0.0, 0.0, 15.0, 90.0), "rect 0 0 15 15");
        assert_eq!(drawn(ShapeKind::RoundedSquare, 10.0, 10.0, 50.0, 30.0), "round 10 10 20 20 50");
        assert_eq!(drawn(ShapeKind::Circle, 10.0, 10.0, 50.0, 30.0), "oval 10 10 20 20");
    }

    #[test]
    fn test_oval_and_arc_geometry() {
        assert_eq!(drawn(ShapeKind::Oval, 10.0, 10.0, 50.0, 30.0), "oval 10 10 40 20");
        assert_eq!(drawn(ShapeKind::Arc, 10.0, 10.0, 50.0, 30.0), "arc 10 10 40 40 20 140");
    }

    #[test]
    fn test_line_strokes_raw_points() {
        assert_eq!(drawn(ShapeKind::Line, 50.0, 30.0, 10.0, 10.0), "line 50 30 10 10");
    }

    #[test]
    fn test_rgba8_clamps() {
        assert_eq!(Rgb::RED.to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(Rgb::new(-0.5, 0.5, 2.0).to_rgba8(), [0, 128, 255, 255]);
    }

    #[test]
    fn test_picked_color_is_stored_as_shown() {
        let picked = egui::Color32::from_rgb(128, 128, 128);
        let rgb = Rgb::from_srgb8([picked.r(), picked.g(), picked.b()]);
        assert!((rgb.r - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(rgb.to_rgba8(), picked.to_array());
        assert_eq!(rgb.to_srgb8(), [128, 128, 128]);
    }

    #[test]
    fn test_srgb8_round_trips_every_level() {
        for v in 0..=255u8 {
            let rgb = Rgb::from_srgb8([v, 255 - v, v / 2]);
            assert_eq!(rgb.to_srgb8(), [v, 255 - v, v / 2]);
        }
    }

    #[test]
    fn test_default_color_is_blue() {
        assert_eq!(Rgb::default(), Rgb::BLUE);
        assert_eq!(ShapeKind::default(), ShapeKind::Rectangle);
    }
}
