//! Canvas controller: the press/release state machine and the drawing it
//! builds.

use crate::error::{FileError, Result};
use crate::format;
use crate::shape::{Point, Rgb, Shape, ShapeKind};
use crate::surface::Surface;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Where the pointer interaction is.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { start: Point },
}

/// The ordered shape list plus the file it belongs to.
///
/// Insertion order is paint order. Shapes are only ever appended, and the
/// list is only ever cleared as a whole.
#[derive(Clone, Debug, Default)]
pub struct Drawing {
    shapes: Vec<Shape>,
    pub path: Option<PathBuf>,
    pub modified: bool,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
        self.modified = true;
    }

    pub fn display_title(&self) -> String {
        let name = self.path.as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        if self.modified { format!("{}*", name) } else { name }
    }
}

/// Owns the drawing and the current tool selection.
#[derive(Debug, Default)]
pub struct Controller {
    drawing: Drawing,
    kind: ShapeKind,
    color: Rgb,
    drag: DragState,
}

impl Controller {
    pub fn with_selection(kind: ShapeKind, color: Rgb) -> Self {
        Self { kind, color, ..Self::default() }
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    /// Affects only shapes placed from now on.
    pub fn select_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
    }

    /// Affects only shapes placed from now on.
    pub fn select_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Pointer down. A point left of or above the canvas origin is not a
    /// valid start and cancels any drag in progress.
    pub fn press(&mut self, at: Point) {
        self.drag = if at.is_negative() {
            DragState::Idle
        } else {
            DragState::Dragging { start: at }
        };
    }

    /// The shape that `release(at)` would place, without placing it.
    pub fn preview(&self, at: Point) -> Option<Shape> {
        let DragState::Dragging { start } = self.drag else {
            return None;
        };
        if start == at {
            return None;
        }
        let (start, end) = if self.kind.is_line() {
            (start, at)
        } else {
            (
                Point::new(start.x.min(at.x), start.y.min(at.y)),
                Point::new(start.x.max(at.x), start.y.max(at.y)),
            )
        };
        Some(Shape::new(self.kind, start, end, self.color))
    }

    /// Pointer up. Places the current kind in the current color, draws it on
    /// `surface` and appends it. Returns None, changing nothing, when there
    /// was no valid press or the pointer did not move.
    pub fn release(&mut self, at: Point, surface: &mut impl Surface) -> Option<&Shape> {
        let shape = self.preview(at);
        self.drag = DragState::Idle;
        let Some(shape) = shape else {
            tracing::debug!(x = at.x, y = at.y, "no press or zero-size drag, nothing placed");
            return None;
        };
        shape.draw(surface);
        self.drawing.push(shape);
        tracing::debug!(kind = shape.kind.name(), count = self.drawing.len(), "placed shape");
        self.drawing.shapes.last()
    }

    /// Start an empty, untitled drawing.
    pub fn clear(&mut self, surface: &mut impl Surface) {
        self.drawing = Drawing::new();
        self.drag = DragState::Idle;
        surface.clear();
    }

    /// Write to the drawing's own file.
    pub fn save(&mut self) -> Result<()> {
        let path = self.drawing.path.clone().ok_or(FileError::NoPath)?;
        self.save_as(&path)
    }

    /// Write to `path`, adding the `.g` extension if it is missing, and
    /// adopt it as the drawing's file.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let path = format::with_extension(path);
        let file = File::create(&path)?;
        format::write_shapes(BufWriter::new(file), self.drawing.shapes())?;
        tracing::info!(path = %path.display(), shapes = self.drawing.len(), "saved drawing");
        self.drawing.path = Some(path);
        self.drawing.modified = false;
        Ok(())
    }

    /// Replace the drawing with the file's contents and repaint everything.
    ///
    /// The file is decoded completely before anything is replaced, so on
    /// error the current shapes are kept. The surface is repainted either way.
    pub fn load(&mut self, path: &Path, surface: &mut impl Surface) -> Result<usize> {
        let result = File::open(path)
            .map_err(FileError::from)
            .and_then(|file| format::read_shapes(BufReader::new(file)));
        if let Ok(shapes) = result.as_ref() {
            self.drawing = Drawing {
                shapes: shapes.clone(),
                path: Some(path.to_path_buf()),
                modified: false,
            };
            self.drag = DragState::Idle;
            tracing::info!(path = %path.display(), shapes = shapes.len(), "opened drawing");
        }
        surface.redraw(self.drawing.shapes());
        result.map(|shapes| shapes.len())
    }
}
