//! Dither pattern drawing for overlays.
//!
//! Selections and highlights are drawn as a checkerboard of single pixels
//! instead of an opaque box, so whatever sits underneath stays visible.

use egui::{Color32, Painter, Pos2, Rect, Vec2};

/// Checkerboard cells covering `rect`. `density` is the cell pitch:
/// 1 = every other pixel, 2 = sparser, and so on. Zero is treated as 1.
pub fn dither_cells(rect: Rect, density: u32) -> Vec<Rect> {
    let step = density.max(1) as i32;
    let x0 = rect.min.x as i32;
    let y0 = rect.min.y as i32;
    let x1 = rect.max.x as i32;
    let y1 = rect.max.y as i32;

    let mut cells = Vec::new();
    let mut y = y0;
    while y < y1 {
        let shifted = (y - y0) % (step * 2) >= step;
        let mut x = x0 + if shifted { step } else { 0 };
        while x < x1 {
            let (px, py) = (x as f32, y as f32);
            if rect.contains(Pos2::new(px, py)) && px < rect.max.x && py < rect.max.y {
                cells.push(Rect::from_min_size(Pos2::new(px, py), Vec2::splat(1.0)));
            }
            x += step * 2;
        }
        y += step;
    }
    cells
}

/// Paint a checkerboard dither over `rect`.
pub fn draw_dither_rect(painter: &Painter, rect: Rect, color: Color32, density: u32) {
    for cell in dither_cells(rect, density) {
        painter.rect_filled(cell, 0.0, color);
    }
}

/// Dense dither used for pressed and selected widgets.
pub fn draw_dither_selection(painter: &Painter, rect: Rect) {
    draw_dither_rect(painter, rect, Color32::BLACK, 1);
}

/// Lighter dither for hover states.
pub fn draw_dither_hover(painter: &Painter, rect: Rect) {
    draw_dither_rect(painter, rect, Color32::BLACK, 2);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: f32, h: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(w, h))
    }

    #[test]
    fn test_dense_dither_covers_half() {
        let cells = dither_cells(rect(4.0, 4.0), 1);
        assert_eq!(cells.len(), 8);
        // row 0 starts at x=0, row 1 is shifted by one pixel
        assert_eq!(cells[0].min, Pos2::new(0.0, 0.0));
        assert_eq!(cells[2].min, Pos2::new(1.0, 1.0));
    }

    #[test]
    fn test_sparse_dither() {
        let cells = dither_cells(rect(8.0, 4.0), 2);
        // rows 0 and 2, two cells each
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| c.min.y == 0.0 || c.min.y == 2.0));
    }

    #[test]
    fn test_zero_density_is_dense() {
        assert_eq!(dither_cells(rect(4.0, 4.0), 0).len(), 8);
    }

    #[test]
    fn test_empty_rect() {
        assert!(dither_cells(rect(0.0, 0.0), 1).is_empty());
    }
}
