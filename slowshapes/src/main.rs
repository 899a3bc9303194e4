//! slowShapes - a minimal shape painter for the Slow Computer
//!
//! Rectangles, squares, rounded boxes, circles, ovals, arcs and lines,
//! dragged out on a fixed canvas and saved as `.g` drawings.

mod app;
mod config;
mod controller;
mod error;
mod format;
mod shape;
mod surface;

use app::SlowShapesApp;
use config::Settings;
use eframe::NativeOptions;
use surface::PixmapSurface;

/// Window sized to fit the canvas plus menu, toolbar and status bar. The
/// platform picks the position.
fn viewport(settings: &Settings) -> egui::ViewportBuilder {
    egui::ViewportBuilder::default()
        .with_inner_size([settings.canvas_width as f32 + 40.0, settings.canvas_height as f32 + 120.0])
        .with_title("slowShapes")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = Settings::load_or_default(&config::settings_path());
    let surface = PixmapSurface::new(settings.canvas_width, settings.canvas_height)?;

    let options = NativeOptions {
        viewport: viewport(&settings),
        ..Default::default()
    };
    eframe::run_native("slowShapes", options, Box::new(move |cc| {
        slowcore::SlowTheme::default().apply(&cc.egui_ctx);
        Box::new(SlowShapesApp::new(cc, settings, surface))
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_fits_canvas() {
        let vp = viewport(&Settings::default());
        assert_eq!(vp.inner_size, Some(egui::vec2(640.0, 420.0)));
        assert_eq!(vp.title.as_deref(), Some("slowShapes"));
    }

    #[test]
    fn test_viewport_position_ignores_environment() {
        std::env::set_var("SLOWOS_CASCADE", "3");
        let vp = viewport(&Settings::default());
        std::env::remove_var("SLOWOS_CASCADE");
        assert_eq!(vp.position, None);
    }
}
