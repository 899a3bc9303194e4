//! Custom widgets - black and white chrome, dithered highlights

use egui::{Color32, Response, Sense, Stroke, Ui, Widget};
use crate::theme::SlowColors;
use crate::dither;

/// Status bar: white bg, 1px black top border
pub fn status_bar(ui: &mut Ui, text: &str) {
    egui::Frame::none()
        .fill(SlowColors::WHITE)
        .stroke(Stroke::new(1.0, SlowColors::BLACK))
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(text);
        });
}

/// A square showing a color, outlined in black. Clickable.
pub struct ColorSwatch {
    color: Color32,
    size: f32,
}

impl ColorSwatch {
    pub fn new(color: Color32) -> Self {
        Self { color, size: 20.0 }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

impl Widget for ColorSwatch {
    fn ui(self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(egui::Vec2::splat(self.size), Sense::click());
        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, self.color);
            painter.rect_stroke(rect, 0.0, Stroke::new(1.0, SlowColors::BLACK));
            if response.hovered() {
                dither::draw_dither_hover(painter, rect.shrink(2.0));
            }
        }
        response
    }
}

/// File list item for open/save dialogs.
/// Selected items get a dithered overlay instead of solid black.
pub struct FileListItem<'a> {
    name: &'a str,
    is_directory: bool,
    selected: bool,
}

impl<'a> FileListItem<'a> {
    pub fn new(name: &'a str, is_directory: bool) -> Self {
        Self { name, is_directory, selected: false }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl<'a> Widget for FileListItem<'a> {
    fn ui(self, ui: &mut Ui) -> Response {
        let height = 20.0;
        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), height),
            Sense::click(),
        );

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, SlowColors::WHITE);

            let text_color = if self.selected {
                dither::draw_dither_selection(painter, rect);
                SlowColors::WHITE
            } else {
                if response.hovered() {
                    dither::draw_dither_hover(painter, rect);
                }
                SlowColors::BLACK
            };

            let label = if self.is_directory {
                format!("{}/", self.name)
            } else {
                self.name.to_string()
            };
            painter.text(
                egui::pos2(rect.min.x + 6.0, rect.center().y),
                egui::Align2::LEFT_CENTER,
                label,
                egui::FontId::proportional(12.0),
                text_color,
            );
        }

        response
    }
}
