//! slowcore - shared library for slow computer applications

pub mod dither;
pub mod storage;
pub mod theme;
pub mod widgets;

pub use theme::SlowTheme;
