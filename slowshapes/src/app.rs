//! slowShapes application
//!
//! Pick a shape from the settings menu and a color from the bottom bar, then
//! drag on the canvas. Drawings are saved as `.g` files.

use crate::config::{self, Settings};
use crate::controller::{Controller, DragState};
use crate::error::{FileError, Result};
use crate::format;
use crate::shape::{Point, Rgb, ShapeFamily};
use crate::surface::{arc_points, PixmapSurface, Surface};
use egui::{Color32, Context, Key, Painter, Pos2, Rect, Sense, Stroke, TextureHandle, Vec2};
use slowcore::storage::{documents_dir, FileBrowser, RecentFiles};
use slowcore::theme::{menu_bar, SlowColors};
use slowcore::widgets::{status_bar, ColorSwatch, FileListItem};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

fn color32(color: Rgb) -> Color32 {
    let [r, g, b, _] = color.to_rgba8();
    Color32::from_rgb(r, g, b)
}

/// Strokes shapes as 1px outlines on an egui painter. Used for the live drag
/// preview, which is never stored.
struct OutlinePainter<'a> {
    painter: &'a Painter,
    origin: Pos2,
}

impl OutlinePainter<'_> {
    fn pos(&self, x: f64, y: f64) -> Pos2 {
        self.origin + Vec2::new(x as f32, y as f32)
    }

    fn rect(&self, x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_min_size(self.pos(x, y), Vec2::new(w as f32, h as f32))
    }

    fn polygon(&self, points: &[Point], color: Rgb) {
        let points = points.iter().map(|p| self.pos(p.x, p.y)).collect();
        self.painter
            .add(egui::Shape::closed_line(points, Stroke::new(1.0, color32(color))));
    }
}

impl Surface for OutlinePainter<'_> {
    fn clear(&mut self) {}

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        self.painter
            .rect_stroke(self.rect(x, y, w, h), 0.0, Stroke::new(1.0, color32(color)));
    }

    fn fill_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, arc: f64, color: Rgb) {
        let r = self.rect(x, y, w, h);
        let rounding = (arc as f32 / 2.0).min(r.width() / 2.0).min(r.height() / 2.0);
        self.painter
            .rect_stroke(r, rounding.max(0.0), Stroke::new(1.0, color32(color)));
    }

    fn fill_oval(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        self.polygon(&arc_points(x, y, w, h, 0.0, 360.0), color);
    }

    fn fill_arc(&mut self, x: f64, y: f64, w: f64, h: f64, start: f64, extent: f64, color: Rgb) {
        self.polygon(&arc_points(x, y, w, h, start, extent), color);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb) {
        self.painter.line_segment(
            [self.pos(from.x, from.y), self.pos(to.x, to.y)],
            Stroke::new(1.0, color32(color)),
        );
    }
}

#[derive(Clone, Copy, PartialEq)]
enum FileBrowserMode { Open, Save, Export }

pub struct SlowShapesApp {
    controller: Controller,
    surface: PixmapSurface,
    texture: Option<TextureHandle>,
    texture_dirty: bool,
    settings: Settings,
    recent: RecentFiles,
    recent_path: PathBuf,
    /// Pointer position in canvas coordinates, possibly outside the canvas
    hover_canvas_pos: Option<Point>,
    /// Last failed file operation, shown in the status bar
    last_error: Option<String>,
    // Dialogs
    show_file_browser: bool,
    file_browser: FileBrowser,
    file_browser_mode: FileBrowserMode,
    save_filename: String,
    show_close_confirm: bool,
    close_confirmed: bool,
    /// Close the window once the current save succeeds
    close_after_save: bool,
    /// Close requested from outside a frame, sent on the next update
    pending_close: bool,
}

impl SlowShapesApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings, surface: PixmapSurface) -> Self {
        Self::with_recent_path(settings, surface, config::recent_path())
    }

    fn with_recent_path(settings: Settings, surface: PixmapSurface, recent_path: PathBuf) -> Self {
        let recent = RecentFiles::load_or_new(&recent_path, settings.recent_limit);
        Self {
            controller: Controller::with_selection(settings.default_kind, settings.default_color),
            surface,
            texture: None,
            texture_dirty: true,
            settings,
            recent,
            recent_path,
            hover_canvas_pos: None,
            last_error: None,
            show_file_browser: false,
            file_browser: FileBrowser::new(documents_dir())
                .with_filter(vec![format::EXTENSION.into()]),
            file_browser_mode: FileBrowserMode::Open,
            save_filename: String::new(),
            show_close_confirm: false,
            close_confirmed: false,
            close_after_save: false,
            pending_close: false,
        }
    }

    fn report(&mut self, action: &str, e: FileError) {
        tracing::warn!(error = %e, "{} failed", action);
        self.last_error = Some(format!("{} failed: {}", action, e));
    }

    fn remember(&mut self, path: PathBuf) {
        self.recent.add(path);
        if let Err(e) = self.recent.save(&self.recent_path) {
            tracing::warn!(error = %e, "could not save recent files");
        }
    }

    fn new_drawing(&mut self) {
        self.controller.clear(&mut self.surface);
        self.texture_dirty = true;
        self.last_error = None;
    }

    pub fn open_file(&mut self, path: PathBuf) {
        let result = self.controller.load(&path, &mut self.surface);
        self.texture_dirty = true;
        match result {
            Ok(_) => {
                self.last_error = None;
                self.remember(path);
            }
            Err(e) => self.report("open", e),
        }
    }

    fn save(&mut self) {
        if self.controller.drawing().path.is_none() {
            self.show_dialog(FileBrowserMode::Save);
            return;
        }
        match self.controller.save() {
            Ok(()) => self.saved(),
            Err(e) => {
                self.close_after_save = false;
                self.report("save", e);
            }
        }
    }

    fn save_as(&mut self, path: PathBuf) {
        match self.controller.save_as(&path) {
            Ok(()) => {
                if let Some(path) = self.controller.drawing().path.clone() {
                    self.remember(path);
                }
                self.saved();
            }
            Err(e) => {
                self.close_after_save = false;
                self.report("save", e);
            }
        }
    }

    fn saved(&mut self) {
        self.last_error = None;
        if self.close_after_save && !self.controller.drawing().modified {
            self.close_after_save = false;
            self.close_confirmed = true;
            self.pending_close = true;
        }
    }

    /// "save" in the unsaved-changes prompt. An untitled drawing goes through
    /// the save dialog first and the window closes when that save succeeds.
    fn save_and_close(&mut self) {
        self.show_close_confirm = false;
        self.close_after_save = true;
        self.save();
    }

    fn export_png(&mut self, path: PathBuf) {
        let path = path.with_extension("png");
        let result = self
            .surface
            .to_rgba_image()
            .ok_or_else(|| FileError::Export(path.clone()))
            .and_then(|image| Ok(image.save(&path)?));
        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "exported png");
                self.last_error = None;
            }
            Err(e) => self.report("export", e),
        }
    }

    fn copy_image(&mut self) {
        match self.copy_to_clipboard() {
            Ok(()) => self.last_error = None,
            Err(e) => self.report("copy", e),
        }
    }

    fn copy_to_clipboard(&self) -> Result<()> {
        let image = self
            .surface
            .to_rgba_image()
            .ok_or_else(|| FileError::Export(PathBuf::from("clipboard")))?;
        let (width, height) = image.dimensions();
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_image(arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(image.into_raw()),
        })?;
        Ok(())
    }

    /// Store the current shape and color as what new windows start with.
    fn save_defaults(&mut self) {
        self.settings.default_kind = self.controller.kind();
        self.settings.default_color = self.controller.color();
        if let Err(e) = self.settings.save(&config::settings_path()) {
            tracing::warn!(error = %e, "could not save settings");
            self.last_error = Some(format!("settings not saved: {}", e));
        }
    }

    fn dialog_dir(&self) -> PathBuf {
        self.controller
            .drawing()
            .path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(documents_dir)
    }

    fn show_dialog(&mut self, mode: FileBrowserMode) {
        let filter = match mode {
            FileBrowserMode::Open | FileBrowserMode::Save => format::EXTENSION,
            FileBrowserMode::Export => "png",
        };
        self.file_browser = FileBrowser::new(self.dialog_dir()).with_filter(vec![filter.into()]);
        if let Some(name) = self.controller.drawing().path.as_deref().and_then(Path::file_name) {
            self.file_browser.select_by_name(&name.to_string_lossy());
        }
        self.file_browser_mode = mode;
        let stem = self
            .controller
            .drawing()
            .path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        self.save_filename = match mode {
            FileBrowserMode::Open => String::new(),
            FileBrowserMode::Save => format!("{}.{}", stem, format::EXTENSION),
            FileBrowserMode::Export => format!("{}.png", stem),
        };
        self.show_file_browser = true;
    }

    fn update_texture(&mut self, ctx: &Context) {
        if self.texture_dirty {
            let image = self.surface.to_color_image();
            self.texture = Some(ctx.load_texture("canvas", image, egui::TextureOptions::NEAREST));
            self.texture_dirty = false;
        }
    }

    fn screen_to_canvas(screen_pos: Pos2, canvas_rect: Rect) -> Point {
        let rel = screen_pos - canvas_rect.min;
        Point::new(f64::from(rel.x.round()), f64::from(rel.y.round()))
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, canvas_rect: Rect, response: &egui::Response) {
        let (pressed, released, pos) = ui.input(|i| {
            (i.pointer.primary_pressed(), i.pointer.primary_released(), i.pointer.interact_pos())
        });
        self.hover_canvas_pos = pos.map(|p| Self::screen_to_canvas(p, canvas_rect));
        let Some(at) = self.hover_canvas_pos else { return };

        if pressed && response.hovered() {
            self.controller.press(at);
        }
        // release counts anywhere in the window
        if released && matches!(self.controller.drag(), DragState::Dragging { .. })
            && self.controller.release(at, &mut self.surface).is_some()
        {
            self.texture_dirty = true;
        }
    }

    fn handle_keyboard(&mut self, ctx: &Context) {
        slowcore::theme::consume_special_keys(ctx);

        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw.dropped_files.iter()
                .filter_map(|f| f.path.clone())
                .find(|p| p.extension().map(|e| e.eq_ignore_ascii_case(format::EXTENSION)).unwrap_or(false))
        });
        if let Some(path) = dropped {
            self.open_file(path);
        }

        let (new, open, save, save_as) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let s = cmd && i.key_pressed(Key::S);
            (
                cmd && i.key_pressed(Key::N),
                cmd && i.key_pressed(Key::O),
                s && !i.modifiers.shift,
                s && i.modifiers.shift,
            )
        });
        if new { self.new_drawing(); }
        if open { self.show_dialog(FileBrowserMode::Open); }
        if save { self.save(); }
        if save_as { self.show_dialog(FileBrowserMode::Save); }
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        menu_bar(ui, |ui| {
            ui.menu_button("file", |ui| {
                if ui.button("new         ⌘n").clicked() { self.new_drawing(); ui.close_menu(); }
                if ui.button("open...     ⌘o").clicked() { self.show_dialog(FileBrowserMode::Open); ui.close_menu(); }
                ui.menu_button("open recent", |ui| {
                    if self.recent.files.is_empty() {
                        ui.label("no recent drawings");
                    }
                    let mut chosen = None;
                    for path in &self.recent.files {
                        let name = path.file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| path.display().to_string());
                        if ui.button(name).on_hover_text(path.display().to_string()).clicked() {
                            chosen = Some(path.clone());
                            ui.close_menu();
                        }
                    }
                    if let Some(path) = chosen { self.open_file(path); }
                });
                ui.separator();
                if ui.button("save        ⌘s").clicked() { self.save(); ui.close_menu(); }
                if ui.button("save as...  ⇧⌘s").clicked() { self.show_dialog(FileBrowserMode::Save); ui.close_menu(); }
                ui.separator();
                if ui.button("export png...").clicked() { self.show_dialog(FileBrowserMode::Export); ui.close_menu(); }
                if ui.button("copy image").clicked() { self.copy_image(); ui.close_menu(); }
            });

            ui.menu_button("settings", |ui| {
                ui.menu_button("shapes", |ui| {
                    for family in ShapeFamily::all() {
                        let label = if self.controller.kind().family() == *family {
                            format!("• {}", family.name())
                        } else {
                            family.name().to_string()
                        };
                        ui.menu_button(label, |ui| {
                            let mut kind = self.controller.kind();
                            for k in family.kinds() {
                                if ui.radio_value(&mut kind, *k, k.name()).clicked() {
                                    ui.close_menu();
                                }
                            }
                            self.controller.select_kind(kind);
                        });
                    }
                });
                ui.separator();
                if ui.button("use as default").clicked() { self.save_defaults(); ui.close_menu(); }
            });
        });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("color:");
            let mut srgb = self.controller.color().to_srgb8();
            if ui.color_edit_button_srgb(&mut srgb).changed() {
                self.controller.select_color(Rgb::from_srgb8(srgb));
            }
            ui.add(ColorSwatch::new(color32(self.controller.color())).size(16.0));
            ui.separator();
            for preset in [Rgb::BLACK, Rgb::WHITE, Rgb::RED, Rgb::BLUE] {
                if ui.add(ColorSwatch::new(color32(preset)).size(16.0)).clicked() {
                    self.controller.select_color(preset);
                }
            }
        });
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui, ctx: &Context) {
        self.update_texture(ctx);

        let size = Vec2::new(self.surface.width() as f32, self.surface.height() as f32);
        let (canvas_rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        let painter = ui.painter_at(canvas_rect);

        if let Some(ref texture) = self.texture {
            painter.image(
                texture.id(),
                canvas_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        ui.painter().rect_stroke(canvas_rect.expand(1.0), 0.0, Stroke::new(1.0, SlowColors::BLACK));

        self.handle_pointer(ui, canvas_rect, &response);

        if let Some(shape) = self.hover_canvas_pos.and_then(|at| self.controller.preview(at)) {
            shape.draw(&mut OutlinePainter { painter: &painter, origin: canvas_rect.min });
        }
    }

    fn render_file_browser(&mut self, ctx: &Context) {
        let title = match self.file_browser_mode {
            FileBrowserMode::Open => "open drawing",
            FileBrowserMode::Save => "save drawing",
            FileBrowserMode::Export => "export png",
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("location:");
                    ui.label(self.file_browser.current_dir.to_string_lossy().to_string());
                });
                ui.separator();

                egui::ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                    let entries = self.file_browser.entries.clone();
                    for (idx, entry) in entries.iter().enumerate() {
                        let selected = self.file_browser.selected_index == Some(idx);
                        let response = ui.add(FileListItem::new(&entry.name, entry.is_directory).selected(selected));
                        if response.clicked() {
                            self.file_browser.selected_index = Some(idx);
                            if !entry.is_directory && self.file_browser_mode != FileBrowserMode::Open {
                                self.save_filename = entry.name.clone();
                            }
                        }
                        if response.double_clicked() {
                            if entry.is_directory {
                                self.file_browser.navigate_to(entry.path.clone());
                            } else if self.file_browser_mode == FileBrowserMode::Open {
                                self.open_file(entry.path.clone());
                                self.show_file_browser = false;
                            }
                        }
                    }
                });

                if self.file_browser_mode != FileBrowserMode::Open {
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.label("filename:");
                        ui.text_edit_singleline(&mut self.save_filename);
                    });
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("cancel").clicked() {
                        self.show_file_browser = false;
                        self.close_after_save = false;
                    }
                    let action = match self.file_browser_mode {
                        FileBrowserMode::Open => "open",
                        FileBrowserMode::Save => "save",
                        FileBrowserMode::Export => "export",
                    };
                    if ui.button(action).clicked() {
                        match self.file_browser_mode {
                            FileBrowserMode::Open => {
                                let chosen = self.file_browser.selected_entry()
                                    .filter(|entry| !entry.is_directory)
                                    .map(|entry| entry.path.clone());
                                if let Some(path) = chosen {
                                    self.open_file(path);
                                    self.show_file_browser = false;
                                }
                            }
                            FileBrowserMode::Save | FileBrowserMode::Export => {
                                if !self.save_filename.trim().is_empty() {
                                    let path = self.file_browser.save_directory().join(self.save_filename.trim());
                                    if self.file_browser_mode == FileBrowserMode::Save {
                                        self.save_as(path);
                                    } else {
                                        self.export_png(path);
                                    }
                                    self.show_file_browser = false;
                                }
                            }
                        }
                    }
                });
            });
    }

    fn render_close_confirm(&mut self, ctx: &Context) {
        egui::Window::new("unsaved changes")
            .collapsible(false)
            .resizable(false)
            .default_width(300.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("this drawing has unsaved changes.");
                ui.label("do you want to save before closing?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("don't save").clicked() {
                        self.close_confirmed = true;
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.button("cancel").clicked() {
                        self.show_close_confirm = false;
                    }
                    if ui.button("save").clicked() {
                        self.save_and_close();
                    }
                });
            });
    }

    fn status_text(&self) -> String {
        let pos = self.hover_canvas_pos
            .filter(|p| {
                !p.is_negative()
                    && p.x < f64::from(self.surface.width())
                    && p.y < f64::from(self.surface.height())
            })
            .map(|p| format!("{}, {}", p.x, p.y))
            .unwrap_or_else(|| "-".into());
        let drawing = self.controller.drawing();
        let count = if drawing.is_empty() { "empty".to_string() } else { format!("{} shapes", drawing.len()) };
        let mut text = format!(
            "{}  |  {}  |  {}  |  pos: {}",
            drawing.display_title(),
            self.controller.kind().name(),
            count,
            pos,
        );
        if let Some(ref e) = self.last_error {
            text.push_str("  |  ");
            text.push_str(e);
        }
        text
    }
}

impl eframe::App for SlowShapesApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard(ctx);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| { self.render_menu_bar(ui); });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            status_bar(ui, &self.status_text());
        });
        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| { self.render_toolbar(ui); });
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(SlowColors::WHITE).inner_margin(12.0))
            .show(ctx, |ui| { self.render_canvas(ui, ctx); });

        // live preview follows the pointer
        if matches!(self.controller.drag(), DragState::Dragging { .. }) {
            ctx.request_repaint();
        }

        if self.show_file_browser { self.render_file_browser(ctx); }
        if self.show_close_confirm { self.render_close_confirm(ctx); }

        if self.pending_close {
            self.pending_close = false;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if ctx.input(|i| i.viewport().close_requested())
            && self.controller.drawing().modified
            && !self.close_confirmed
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_close_confirm = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("slowshapes-app-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn app_with_shape(dir: &Path) -> SlowShapesApp {
        let surface = PixmapSurface::new(60, 40).unwrap();
        let mut app = SlowShapesApp::with_recent_path(Settings::default(), surface, dir.join("recent.json"));
        app.controller.press(Point::new(5.0, 5.0));
        app.controller.release(Point::new(20.0, 15.0), &mut app.surface);
        assert!(app.controller.drawing().modified);
        app
    }

    #[test]
    fn test_untitled_save_on_close_closes_after_dialog() {
        let dir = scratch_dir("untitled");
        let mut app = app_with_shape(&dir);
        app.show_close_confirm = true;

        app.save_and_close();
        assert!(app.show_file_browser);
        assert!(app.file_browser_mode == FileBrowserMode::Save);
        assert!(!app.pending_close);

        app.save_as(dir.join("picture"));
        assert!(app.pending_close);
        assert!(app.close_confirmed);
        assert!(!app.controller.drawing().modified);
        assert_eq!(app.recent.files, vec![dir.join("picture.g")]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_titled_save_on_close_closes_at_once() {
        let dir = scratch_dir("titled");
        let mut app = app_with_shape(&dir);
        app.save_as(dir.join("first.g"));
        assert!(!app.pending_close);

        app.controller.press(Point::new(1.0, 1.0));
        app.controller.release(Point::new(9.0, 9.0), &mut app.surface);
        app.save_and_close();
        assert!(!app.show_file_browser);
        assert!(app.pending_close);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_save_keeps_window_open() {
        let dir = scratch_dir("failed");
        let mut app = app_with_shape(&dir);
        app.save_and_close();
        app.save_as(dir.join("missing").join("picture.g"));
        assert!(!app.pending_close);
        assert!(!app.close_after_save);
        assert!(app.last_error.is_some());
        assert!(app.controller.drawing().modified);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
